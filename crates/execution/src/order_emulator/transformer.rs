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

//! Rewrites triggered emulated orders into plain orders for release.

use ferrum_core::{UUID4, UnixNanos};
use ferrum_model::{
    enums::{OrderType, TriggerType},
    events::order::{OrderEventAny, OrderInitialized},
    orders::Order,
    types::Price,
};

/// Transforms the given order into a plain MARKET order preserving its
/// identity, with `ts_init` re-stamped to `ts_now`.
///
/// The transformed order keeps the full prior event history, ending with a
/// fresh `OrderInitialized` describing the released order.
#[must_use]
pub fn transform_to_market_order(order: &Order, ts_now: UnixNanos) -> Order {
    transform(order, OrderType::Market, None, ts_now)
}

/// Transforms the given order into a plain LIMIT order at `price` preserving
/// its identity, with `ts_init` re-stamped to `ts_now`.
#[must_use]
pub fn transform_to_limit_order(order: &Order, price: Price, ts_now: UnixNanos) -> Order {
    transform(order, OrderType::Limit, Some(price), ts_now)
}

fn transform(order: &Order, order_type: OrderType, price: Option<Price>, ts_now: UnixNanos) -> Order {
    let init = OrderInitialized {
        trader_id: order.trader_id,
        strategy_id: order.strategy_id,
        instrument_id: order.instrument_id,
        client_order_id: order.client_order_id,
        order_side: order.side,
        order_type,
        quantity: order.quantity,
        time_in_force: order.time_in_force,
        expire_time: order.expire_time,
        price,
        trigger_price: None,
        activation_price: None,
        trailing_offset: None,
        trailing_offset_type: order.trailing_offset_type,
        limit_offset: None,
        emulation_trigger: TriggerType::NoTrigger,
        trigger_instrument_id: Some(order.trigger_instrument_id()),
        contingency_type: order.contingency_type,
        order_list_id: order.order_list_id,
        linked_order_ids: order.linked_order_ids.clone(),
        parent_order_id: order.parent_order_id,
        exec_algorithm_id: order.exec_algorithm_id,
        exec_spawn_id: order.exec_spawn_id,
        tags: order.tags.clone(),
        event_id: UUID4::new(),
        ts_event: ts_now,
        ts_init: ts_now,
    };

    let mut transformed = Order::new(init.clone());

    // Keep the prior history, ending with the fresh initialization
    let mut events = order.events.clone();
    events.push(OrderEventAny::Initialized(init));
    transformed.events = events;

    transformed
}

#[cfg(test)]
mod tests {
    use ferrum_model::{
        enums::{OrderSide, OrderStatus, TriggerType},
        identifiers::{ClientOrderId, InstrumentId},
        orders::OrderTestBuilder,
        types::Quantity,
    };
    use rstest::rstest;

    use super::*;

    fn stop_limit_order() -> Order {
        OrderTestBuilder::new(OrderType::StopLimit)
            .instrument_id(InstrumentId::from("ETHUSDT-PERP.BINANCE"))
            .client_order_id(ClientOrderId::from("O-123"))
            .side(OrderSide::Sell)
            .trigger_price(Price::from("5000.00"))
            .price(Price::from("4999.00"))
            .quantity(Quantity::from(2_u64))
            .emulation_trigger(TriggerType::BidAsk)
            .build()
    }

    #[rstest]
    fn test_transform_to_market_preserves_identity() {
        let order = stop_limit_order();

        let transformed = transform_to_market_order(&order, 42.into());

        assert_eq!(transformed.client_order_id, order.client_order_id);
        assert_eq!(transformed.strategy_id, order.strategy_id);
        assert_eq!(transformed.quantity, order.quantity);
        assert_eq!(transformed.order_type, OrderType::Market);
        assert_eq!(transformed.emulation_trigger, TriggerType::NoTrigger);
        assert_eq!(transformed.trigger_price, None);
        assert_eq!(transformed.ts_init, UnixNanos::from(42_u64));
        assert_eq!(transformed.status, OrderStatus::Initialized);
    }

    #[rstest]
    fn test_transform_to_limit_keeps_price_and_history() {
        let order = stop_limit_order();

        let transformed = transform_to_limit_order(&order, Price::from("4999.00"), 42.into());

        assert_eq!(transformed.order_type, OrderType::Limit);
        assert_eq!(transformed.price, Some(Price::from("4999.00")));
        // Prior history retained, fresh initialization last
        assert_eq!(transformed.events.len(), order.events.len() + 1);
        assert!(matches!(
            transformed.last_event(),
            OrderEventAny::Initialized(init) if init.order_type == OrderType::Limit
        ));
    }
}
