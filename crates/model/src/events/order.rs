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

//! Order lifecycle events.

use std::fmt::{Display, Formatter};

use ferrum_core::{UUID4, UnixNanos};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{
    enums::{
        ContingencyType, OrderSide, OrderType, TimeInForce, TrailingOffsetType, TriggerType,
    },
    identifiers::{
        AccountId, ClientOrderId, ExecAlgorithmId, InstrumentId, OrderListId, PositionId,
        StrategyId, TradeId, TraderId, VenueOrderId,
    },
    types::{Price, Quantity},
};

/// An event indicating an order was initialized, carrying its full configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInitialized {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub order_side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub expire_time: Option<UnixNanos>,
    pub price: Option<Price>,
    pub trigger_price: Option<Price>,
    pub activation_price: Option<Price>,
    pub trailing_offset: Option<Decimal>,
    pub trailing_offset_type: TrailingOffsetType,
    pub limit_offset: Option<Decimal>,
    pub emulation_trigger: TriggerType,
    pub trigger_instrument_id: Option<InstrumentId>,
    pub contingency_type: ContingencyType,
    pub order_list_id: Option<OrderListId>,
    pub linked_order_ids: Option<Vec<ClientOrderId>>,
    pub parent_order_id: Option<ClientOrderId>,
    pub exec_algorithm_id: Option<ExecAlgorithmId>,
    pub exec_spawn_id: Option<ClientOrderId>,
    pub tags: Option<Vec<Ustr>>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl Display for OrderInitialized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderInitialized(instrument_id={}, client_order_id={}, side={}, type={}, quantity={})",
            self.instrument_id,
            self.client_order_id,
            self.order_side,
            self.order_type,
            self.quantity,
        )
    }
}

macro_rules! impl_lifecycle_event {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub trader_id: TraderId,
            pub strategy_id: StrategyId,
            pub instrument_id: InstrumentId,
            pub client_order_id: ClientOrderId,
            pub venue_order_id: Option<VenueOrderId>,
            pub account_id: Option<AccountId>,
            pub event_id: UUID4,
            pub ts_event: UnixNanos,
            pub ts_init: UnixNanos,
        }

        impl $name {
            /// Creates a new event instance.
            #[allow(clippy::too_many_arguments)]
            #[must_use]
            pub const fn new(
                trader_id: TraderId,
                strategy_id: StrategyId,
                instrument_id: InstrumentId,
                client_order_id: ClientOrderId,
                event_id: UUID4,
                ts_event: UnixNanos,
                ts_init: UnixNanos,
                venue_order_id: Option<VenueOrderId>,
                account_id: Option<AccountId>,
            ) -> Self {
                Self {
                    trader_id,
                    strategy_id,
                    instrument_id,
                    client_order_id,
                    venue_order_id,
                    account_id,
                    event_id,
                    ts_event,
                    ts_init,
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "{}(instrument_id={}, client_order_id={}, ts_event={})",
                    stringify!($name),
                    self.instrument_id,
                    self.client_order_id,
                    self.ts_event,
                )
            }
        }
    };
}

impl_lifecycle_event!(OrderCanceled, "An event indicating an order was canceled.");
impl_lifecycle_event!(OrderExpired, "An event indicating an order expired.");
impl_lifecycle_event!(
    OrderTriggered,
    "An event indicating an orders stop trigger fired."
);

/// An event indicating an order is now being emulated locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEmulated {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl OrderEmulated {
    /// Creates a new [`OrderEmulated`] instance.
    #[must_use]
    pub const fn new(
        trader_id: TraderId,
        strategy_id: StrategyId,
        instrument_id: InstrumentId,
        client_order_id: ClientOrderId,
        event_id: UUID4,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            trader_id,
            strategy_id,
            instrument_id,
            client_order_id,
            event_id,
            ts_event,
            ts_init,
        }
    }
}

impl Display for OrderEmulated {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderEmulated(instrument_id={}, client_order_id={})",
            self.instrument_id, self.client_order_id,
        )
    }
}

/// An event indicating an emulated order was released as a real order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReleased {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    /// The opposite-side top-of-book price at release (ask for BUY, bid for SELL).
    pub released_price: Price,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl OrderReleased {
    /// Creates a new [`OrderReleased`] instance.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        trader_id: TraderId,
        strategy_id: StrategyId,
        instrument_id: InstrumentId,
        client_order_id: ClientOrderId,
        released_price: Price,
        event_id: UUID4,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            trader_id,
            strategy_id,
            instrument_id,
            client_order_id,
            released_price,
            event_id,
            ts_event,
            ts_init,
        }
    }
}

impl Display for OrderReleased {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderReleased(instrument_id={}, client_order_id={}, released_price={})",
            self.instrument_id, self.client_order_id, self.released_price,
        )
    }
}

/// An event indicating an order was submitted to an execution venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub account_id: AccountId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl Display for OrderSubmitted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderSubmitted(instrument_id={}, client_order_id={}, account_id={})",
            self.instrument_id, self.client_order_id, self.account_id,
        )
    }
}

/// An event indicating an order was accepted by an execution venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAccepted {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub venue_order_id: VenueOrderId,
    pub account_id: AccountId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl Display for OrderAccepted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderAccepted(instrument_id={}, client_order_id={}, venue_order_id={})",
            self.instrument_id, self.client_order_id, self.venue_order_id,
        )
    }
}

/// An event indicating an order was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub account_id: Option<AccountId>,
    pub reason: Ustr,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl Display for OrderRejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderRejected(instrument_id={}, client_order_id={}, reason={})",
            self.instrument_id, self.client_order_id, self.reason,
        )
    }
}

/// An event indicating an order was updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub quantity: Quantity,
    pub price: Option<Price>,
    pub trigger_price: Option<Price>,
    pub venue_order_id: Option<VenueOrderId>,
    pub account_id: Option<AccountId>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl OrderUpdated {
    /// Creates a new [`OrderUpdated`] instance.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        trader_id: TraderId,
        strategy_id: StrategyId,
        instrument_id: InstrumentId,
        client_order_id: ClientOrderId,
        quantity: Quantity,
        event_id: UUID4,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
        venue_order_id: Option<VenueOrderId>,
        account_id: Option<AccountId>,
        price: Option<Price>,
        trigger_price: Option<Price>,
    ) -> Self {
        Self {
            trader_id,
            strategy_id,
            instrument_id,
            client_order_id,
            quantity,
            price,
            trigger_price,
            venue_order_id,
            account_id,
            event_id,
            ts_event,
            ts_init,
        }
    }
}

impl Display for OrderUpdated {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderUpdated(instrument_id={}, client_order_id={}, quantity={}, price={:?}, trigger_price={:?})",
            self.instrument_id,
            self.client_order_id,
            self.quantity,
            self.price.map(|p| p.to_string()),
            self.trigger_price.map(|p| p.to_string()),
        )
    }
}

/// An event indicating an order was filled (partially or completely).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub venue_order_id: VenueOrderId,
    pub account_id: Option<AccountId>,
    pub trade_id: TradeId,
    pub order_side: OrderSide,
    pub last_qty: Quantity,
    pub last_px: Price,
    pub position_id: Option<PositionId>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl Display for OrderFilled {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderFilled(instrument_id={}, client_order_id={}, side={}, last_qty={}, last_px={})",
            self.instrument_id, self.client_order_id, self.order_side, self.last_qty, self.last_px,
        )
    }
}

/// A sum type covering every order event variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEventAny {
    Initialized(OrderInitialized),
    Emulated(OrderEmulated),
    Released(OrderReleased),
    Submitted(OrderSubmitted),
    Accepted(OrderAccepted),
    Rejected(OrderRejected),
    Canceled(OrderCanceled),
    Expired(OrderExpired),
    Triggered(OrderTriggered),
    Updated(OrderUpdated),
    Filled(OrderFilled),
}

impl OrderEventAny {
    /// Returns the client order ID for the event.
    #[must_use]
    pub const fn client_order_id(&self) -> ClientOrderId {
        match self {
            Self::Initialized(event) => event.client_order_id,
            Self::Emulated(event) => event.client_order_id,
            Self::Released(event) => event.client_order_id,
            Self::Submitted(event) => event.client_order_id,
            Self::Accepted(event) => event.client_order_id,
            Self::Rejected(event) => event.client_order_id,
            Self::Canceled(event) => event.client_order_id,
            Self::Expired(event) => event.client_order_id,
            Self::Triggered(event) => event.client_order_id,
            Self::Updated(event) => event.client_order_id,
            Self::Filled(event) => event.client_order_id,
        }
    }

    /// Returns the strategy ID for the event.
    #[must_use]
    pub const fn strategy_id(&self) -> StrategyId {
        match self {
            Self::Initialized(event) => event.strategy_id,
            Self::Emulated(event) => event.strategy_id,
            Self::Released(event) => event.strategy_id,
            Self::Submitted(event) => event.strategy_id,
            Self::Accepted(event) => event.strategy_id,
            Self::Rejected(event) => event.strategy_id,
            Self::Canceled(event) => event.strategy_id,
            Self::Expired(event) => event.strategy_id,
            Self::Triggered(event) => event.strategy_id,
            Self::Updated(event) => event.strategy_id,
            Self::Filled(event) => event.strategy_id,
        }
    }

    /// Returns the instrument ID for the event.
    #[must_use]
    pub const fn instrument_id(&self) -> InstrumentId {
        match self {
            Self::Initialized(event) => event.instrument_id,
            Self::Emulated(event) => event.instrument_id,
            Self::Released(event) => event.instrument_id,
            Self::Submitted(event) => event.instrument_id,
            Self::Accepted(event) => event.instrument_id,
            Self::Rejected(event) => event.instrument_id,
            Self::Canceled(event) => event.instrument_id,
            Self::Expired(event) => event.instrument_id,
            Self::Triggered(event) => event.instrument_id,
            Self::Updated(event) => event.instrument_id,
            Self::Filled(event) => event.instrument_id,
        }
    }

    /// Returns the UNIX timestamp (nanoseconds) when the event occurred.
    #[must_use]
    pub const fn ts_event(&self) -> UnixNanos {
        match self {
            Self::Initialized(event) => event.ts_event,
            Self::Emulated(event) => event.ts_event,
            Self::Released(event) => event.ts_event,
            Self::Submitted(event) => event.ts_event,
            Self::Accepted(event) => event.ts_event,
            Self::Rejected(event) => event.ts_event,
            Self::Canceled(event) => event.ts_event,
            Self::Expired(event) => event.ts_event,
            Self::Triggered(event) => event.ts_event,
            Self::Updated(event) => event.ts_event,
            Self::Filled(event) => event.ts_event,
        }
    }
}

impl Display for OrderEventAny {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(event) => event.fmt(f),
            Self::Emulated(event) => event.fmt(f),
            Self::Released(event) => event.fmt(f),
            Self::Submitted(event) => event.fmt(f),
            Self::Accepted(event) => event.fmt(f),
            Self::Rejected(event) => event.fmt(f),
            Self::Canceled(event) => event.fmt(f),
            Self::Expired(event) => event.fmt(f),
            Self::Triggered(event) => event.fmt(f),
            Self::Updated(event) => event.fmt(f),
            Self::Filled(event) => event.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn released_event() -> OrderReleased {
        OrderReleased::new(
            TraderId::from("TRADER-001"),
            StrategyId::from("S-001"),
            InstrumentId::from("ETHUSDT-PERP.BINANCE"),
            ClientOrderId::from("O-001"),
            Price::from("5070.00"),
            UUID4::new(),
            0.into(),
            0.into(),
        )
    }

    #[rstest]
    fn test_event_any_accessors() {
        let event = OrderEventAny::Released(released_event());

        assert_eq!(event.client_order_id(), ClientOrderId::from("O-001"));
        assert_eq!(event.strategy_id(), StrategyId::from("S-001"));
        assert_eq!(
            event.instrument_id(),
            InstrumentId::from("ETHUSDT-PERP.BINANCE")
        );
    }

    #[rstest]
    fn test_released_display_includes_price() {
        let event = released_event();

        assert!(event.to_string().contains("released_price=5070.00"));
    }
}
