// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::cell::Cell;

use ferrum_core::{UUID4, UnixNanos};
use rust_decimal::Decimal;

use crate::{
    enums::{
        ContingencyType, OrderSide, OrderType, TimeInForce, TrailingOffsetType, TriggerType,
    },
    events::order::OrderInitialized,
    identifiers::{
        ClientOrderId, ExecAlgorithmId, InstrumentId, OrderListId, StrategyId, TraderId,
    },
    orders::order::Order,
    types::{Price, Quantity},
};

thread_local! {
    static ORDER_COUNT: Cell<u64> = const { Cell::new(0) };
}

/// Provides a default order builder for testing purposes.
///
/// Identity fields default to deterministic test values; a fresh client
/// order ID is generated per built order unless one is set explicitly.
#[derive(Debug)]
pub struct OrderTestBuilder {
    order_type: OrderType,
    trader_id: TraderId,
    strategy_id: StrategyId,
    instrument_id: Option<InstrumentId>,
    client_order_id: Option<ClientOrderId>,
    side: OrderSide,
    quantity: Option<Quantity>,
    time_in_force: TimeInForce,
    expire_time: Option<UnixNanos>,
    price: Option<Price>,
    trigger_price: Option<Price>,
    activation_price: Option<Price>,
    trailing_offset: Option<Decimal>,
    trailing_offset_type: TrailingOffsetType,
    limit_offset: Option<Decimal>,
    emulation_trigger: TriggerType,
    trigger_instrument_id: Option<InstrumentId>,
    contingency_type: ContingencyType,
    order_list_id: Option<OrderListId>,
    linked_order_ids: Option<Vec<ClientOrderId>>,
    parent_order_id: Option<ClientOrderId>,
    exec_algorithm_id: Option<ExecAlgorithmId>,
    exec_spawn_id: Option<ClientOrderId>,
    ts_init: UnixNanos,
}

impl OrderTestBuilder {
    /// Creates a new builder for the given order type.
    #[must_use]
    pub fn new(order_type: OrderType) -> Self {
        Self {
            order_type,
            trader_id: TraderId::from("TRADER-001"),
            strategy_id: StrategyId::from("S-001"),
            instrument_id: None,
            client_order_id: None,
            side: OrderSide::Buy,
            quantity: None,
            time_in_force: TimeInForce::Gtc,
            expire_time: None,
            price: None,
            trigger_price: None,
            activation_price: None,
            trailing_offset: None,
            trailing_offset_type: TrailingOffsetType::NoTrailingOffset,
            limit_offset: None,
            emulation_trigger: TriggerType::NoTrigger,
            trigger_instrument_id: None,
            contingency_type: ContingencyType::NoContingency,
            order_list_id: None,
            linked_order_ids: None,
            parent_order_id: None,
            exec_algorithm_id: None,
            exec_spawn_id: None,
            ts_init: UnixNanos::default(),
        }
    }

    #[must_use]
    pub fn trader_id(mut self, value: TraderId) -> Self {
        self.trader_id = value;
        self
    }

    #[must_use]
    pub fn strategy_id(mut self, value: StrategyId) -> Self {
        self.strategy_id = value;
        self
    }

    #[must_use]
    pub fn instrument_id(mut self, value: InstrumentId) -> Self {
        self.instrument_id = Some(value);
        self
    }

    #[must_use]
    pub fn client_order_id(mut self, value: ClientOrderId) -> Self {
        self.client_order_id = Some(value);
        self
    }

    #[must_use]
    pub fn side(mut self, value: OrderSide) -> Self {
        self.side = value;
        self
    }

    #[must_use]
    pub fn quantity(mut self, value: Quantity) -> Self {
        self.quantity = Some(value);
        self
    }

    #[must_use]
    pub fn time_in_force(mut self, value: TimeInForce) -> Self {
        self.time_in_force = value;
        self
    }

    #[must_use]
    pub fn expire_time(mut self, value: UnixNanos) -> Self {
        self.expire_time = Some(value);
        self
    }

    #[must_use]
    pub fn price(mut self, value: Price) -> Self {
        self.price = Some(value);
        self
    }

    #[must_use]
    pub fn trigger_price(mut self, value: Price) -> Self {
        self.trigger_price = Some(value);
        self
    }

    #[must_use]
    pub fn activation_price(mut self, value: Price) -> Self {
        self.activation_price = Some(value);
        self
    }

    #[must_use]
    pub fn trailing_offset(mut self, value: Decimal) -> Self {
        self.trailing_offset = Some(value);
        self
    }

    #[must_use]
    pub fn trailing_offset_type(mut self, value: TrailingOffsetType) -> Self {
        self.trailing_offset_type = value;
        self
    }

    #[must_use]
    pub fn limit_offset(mut self, value: Decimal) -> Self {
        self.limit_offset = Some(value);
        self
    }

    #[must_use]
    pub fn emulation_trigger(mut self, value: TriggerType) -> Self {
        self.emulation_trigger = value;
        self
    }

    #[must_use]
    pub fn trigger_instrument_id(mut self, value: InstrumentId) -> Self {
        self.trigger_instrument_id = Some(value);
        self
    }

    #[must_use]
    pub fn contingency_type(mut self, value: ContingencyType) -> Self {
        self.contingency_type = value;
        self
    }

    #[must_use]
    pub fn order_list_id(mut self, value: OrderListId) -> Self {
        self.order_list_id = Some(value);
        self
    }

    #[must_use]
    pub fn linked_order_ids(mut self, value: Vec<ClientOrderId>) -> Self {
        self.linked_order_ids = Some(value);
        self
    }

    #[must_use]
    pub fn parent_order_id(mut self, value: ClientOrderId) -> Self {
        self.parent_order_id = Some(value);
        self
    }

    #[must_use]
    pub fn exec_algorithm_id(mut self, value: ExecAlgorithmId) -> Self {
        self.exec_algorithm_id = Some(value);
        self
    }

    #[must_use]
    pub fn exec_spawn_id(mut self, value: ClientOrderId) -> Self {
        self.exec_spawn_id = Some(value);
        self
    }

    #[must_use]
    pub fn ts_init(mut self, value: UnixNanos) -> Self {
        self.ts_init = value;
        self
    }

    /// Builds the order.
    ///
    /// # Panics
    ///
    /// Panics if a required field for the order type is missing.
    #[must_use]
    pub fn build(self) -> Order {
        let instrument_id = self.instrument_id.expect("`instrument_id` was not set");
        let quantity = self.quantity.expect("`quantity` was not set");

        let requires_price = matches!(
            self.order_type,
            OrderType::Limit
                | OrderType::StopLimit
                | OrderType::LimitIfTouched
                | OrderType::TrailingStopLimit
        );
        if requires_price && self.price.is_none() {
            panic!("`price` was not set for {}", self.order_type);
        }
        let requires_trigger = matches!(
            self.order_type,
            OrderType::StopMarket
                | OrderType::StopLimit
                | OrderType::MarketIfTouched
                | OrderType::LimitIfTouched
        );
        if requires_trigger && self.trigger_price.is_none() {
            panic!("`trigger_price` was not set for {}", self.order_type);
        }

        let client_order_id = self.client_order_id.unwrap_or_else(|| {
            let count = ORDER_COUNT.with(|c| {
                c.set(c.get() + 1);
                c.get()
            });
            ClientOrderId::new(format!("O-19700101-000000-001-001-{count}"))
        });

        let init = OrderInitialized {
            trader_id: self.trader_id,
            strategy_id: self.strategy_id,
            instrument_id,
            client_order_id,
            order_side: self.side,
            order_type: self.order_type,
            quantity,
            time_in_force: self.time_in_force,
            expire_time: self.expire_time,
            price: self.price,
            trigger_price: self.trigger_price,
            activation_price: self.activation_price,
            trailing_offset: self.trailing_offset,
            trailing_offset_type: self.trailing_offset_type,
            limit_offset: self.limit_offset,
            emulation_trigger: self.emulation_trigger,
            trigger_instrument_id: self.trigger_instrument_id,
            contingency_type: self.contingency_type,
            order_list_id: self.order_list_id,
            linked_order_ids: self.linked_order_ids,
            parent_order_id: self.parent_order_id,
            exec_algorithm_id: self.exec_algorithm_id,
            exec_spawn_id: self.exec_spawn_id,
            tags: None,
            event_id: UUID4::new(),
            ts_event: self.ts_init,
            ts_init: self.ts_init,
        };

        Order::new(init)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_builder_generates_unique_client_order_ids() {
        let build = || {
            OrderTestBuilder::new(OrderType::Market)
                .instrument_id(InstrumentId::from("AUD/USD.SIM"))
                .quantity(Quantity::from(1_u64))
                .build()
        };

        assert_ne!(build().client_order_id, build().client_order_id);
    }

    #[rstest]
    #[should_panic(expected = "`trigger_price` was not set")]
    fn test_builder_stop_market_requires_trigger_price() {
        let _ = OrderTestBuilder::new(OrderType::StopMarket)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .quantity(Quantity::from(1_u64))
            .build();
    }

    #[rstest]
    fn test_builder_trailing_stop_without_trigger_allowed() {
        let order = OrderTestBuilder::new(OrderType::TrailingStopMarket)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .quantity(Quantity::from(1_u64))
            .trailing_offset(Decimal::new(100, 2))
            .trailing_offset_type(TrailingOffsetType::Price)
            .build();

        assert!(order.trigger_price.is_none());
        assert_eq!(order.order_type, OrderType::TrailingStopMarket);
    }
}
