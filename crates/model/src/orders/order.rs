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

use std::fmt::{Display, Formatter};

use ferrum_core::{UUID4, UnixNanos};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{
    enums::{
        ContingencyType, OrderSide, OrderStatus, OrderType, TimeInForce, TrailingOffsetType,
        TriggerType,
    },
    events::order::{OrderEventAny, OrderInitialized},
    identifiers::{
        AccountId, ClientOrderId, ExecAlgorithmId, InstrumentId, OrderListId, PositionId,
        StrategyId, TraderId, VenueOrderId,
    },
    types::{Price, Quantity},
};

/// Errors raised when applying events to an order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order was already initialized")]
    AlreadyInitialized,
    #[error("Invalid state transition from {status} on {event}")]
    InvalidStateTransition {
        status: OrderStatus,
        event: &'static str,
    },
    #[error("Order invariant failed: must have a side for this operation")]
    NoOrderSide,
}

impl OrderStatus {
    /// Returns the status resulting from applying `event` in this status.
    ///
    /// `Updated` and `Filled` events are handled outside this table because
    /// their resulting status depends on order state, not just the variant.
    #[rustfmt::skip]
    pub fn transition(self, event: &OrderEventAny) -> Result<Self, OrderError> {
        let new_status = match (self, event) {
            (Self::Initialized, OrderEventAny::Emulated(_)) => Self::Emulated,
            (Self::Initialized, OrderEventAny::Released(_)) => Self::Released,
            (Self::Initialized, OrderEventAny::Submitted(_)) => Self::Submitted,
            (Self::Initialized, OrderEventAny::Rejected(_)) => Self::Rejected,
            (Self::Initialized, OrderEventAny::Accepted(_)) => Self::Accepted,
            (Self::Initialized, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Initialized, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::Initialized, OrderEventAny::Triggered(_)) => Self::Triggered,
            (Self::Emulated, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Emulated, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::Emulated, OrderEventAny::Released(_)) => Self::Released,
            (Self::Released, OrderEventAny::Submitted(_)) => Self::Submitted,
            (Self::Released, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Released, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::Submitted, OrderEventAny::Rejected(_)) => Self::Rejected,
            (Self::Submitted, OrderEventAny::Accepted(_)) => Self::Accepted,
            (Self::Submitted, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Accepted, OrderEventAny::Rejected(_)) => Self::Rejected,
            (Self::Accepted, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Accepted, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::Accepted, OrderEventAny::Triggered(_)) => Self::Triggered,
            (Self::Triggered, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::Triggered, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::PendingUpdate | Self::PendingCancel, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::PendingUpdate | Self::PendingCancel, OrderEventAny::Expired(_)) => Self::Expired,
            (Self::PartiallyFilled, OrderEventAny::Canceled(_)) => Self::Canceled,
            (Self::PartiallyFilled, OrderEventAny::Expired(_)) => Self::Expired,
            _ => {
                return Err(OrderError::InvalidStateTransition {
                    status: self,
                    event: event_name(event),
                });
            }
        };
        Ok(new_status)
    }
}

const fn event_name(event: &OrderEventAny) -> &'static str {
    match event {
        OrderEventAny::Initialized(_) => "OrderInitialized",
        OrderEventAny::Emulated(_) => "OrderEmulated",
        OrderEventAny::Released(_) => "OrderReleased",
        OrderEventAny::Submitted(_) => "OrderSubmitted",
        OrderEventAny::Accepted(_) => "OrderAccepted",
        OrderEventAny::Rejected(_) => "OrderRejected",
        OrderEventAny::Canceled(_) => "OrderCanceled",
        OrderEventAny::Expired(_) => "OrderExpired",
        OrderEventAny::Triggered(_) => "OrderTriggered",
        OrderEventAny::Updated(_) => "OrderUpdated",
        OrderEventAny::Filled(_) => "OrderFilled",
    }
}

/// An order aggregate covering every supported order type.
///
/// The order is event-sourced: it is created from an [`OrderInitialized`]
/// event and every subsequent lifecycle event is validated and recorded by
/// [`Order::apply`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub events: Vec<OrderEventAny>,
    pub previous_status: Option<OrderStatus>,
    pub status: OrderStatus,
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub venue_order_id: Option<VenueOrderId>,
    pub position_id: Option<PositionId>,
    pub account_id: Option<AccountId>,
    pub side: OrderSide,
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
    pub filled_qty: Quantity,
    pub leaves_qty: Quantity,
    pub init_id: UUID4,
    pub ts_init: UnixNanos,
    pub ts_last: UnixNanos,
}

impl Order {
    /// Creates a new [`Order`] instance from an initialization event.
    #[must_use]
    pub fn new(init: OrderInitialized) -> Self {
        Self {
            previous_status: None,
            status: OrderStatus::Initialized,
            trader_id: init.trader_id,
            strategy_id: init.strategy_id,
            instrument_id: init.instrument_id,
            client_order_id: init.client_order_id,
            venue_order_id: None,
            position_id: None,
            account_id: None,
            side: init.order_side,
            order_type: init.order_type,
            quantity: init.quantity,
            time_in_force: init.time_in_force,
            expire_time: init.expire_time,
            price: init.price,
            trigger_price: init.trigger_price,
            activation_price: init.activation_price,
            trailing_offset: init.trailing_offset,
            trailing_offset_type: init.trailing_offset_type,
            limit_offset: init.limit_offset,
            emulation_trigger: init.emulation_trigger,
            trigger_instrument_id: init.trigger_instrument_id,
            contingency_type: init.contingency_type,
            order_list_id: init.order_list_id,
            linked_order_ids: init.linked_order_ids.clone(),
            parent_order_id: init.parent_order_id,
            exec_algorithm_id: init.exec_algorithm_id,
            exec_spawn_id: init.exec_spawn_id,
            tags: init.tags.clone(),
            filled_qty: Quantity::zero(init.quantity.precision),
            leaves_qty: init.quantity,
            init_id: init.event_id,
            ts_init: init.ts_event,
            ts_last: init.ts_event,
            events: vec![OrderEventAny::Initialized(init)],
        }
    }

    /// Returns the initialization event the order was created from.
    ///
    /// # Panics
    ///
    /// Panics if the event log does not start with `OrderInitialized`
    /// (impossible by construction).
    #[must_use]
    pub fn init_event(&self) -> OrderInitialized {
        match self.events.first() {
            Some(OrderEventAny::Initialized(init)) => init.clone(),
            _ => panic!("order event log must start with `OrderInitialized`"),
        }
    }

    /// Returns the last event applied to the order.
    ///
    /// # Panics
    ///
    /// Panics if the event log is empty (impossible by construction).
    #[must_use]
    pub fn last_event(&self) -> &OrderEventAny {
        self.events.last().expect("order must have events")
    }

    /// Returns the orders trigger instrument, defaulting to its own instrument.
    #[must_use]
    pub fn trigger_instrument_id(&self) -> InstrumentId {
        self.trigger_instrument_id.unwrap_or(self.instrument_id)
    }

    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.side == OrderSide::Sell
    }

    #[must_use]
    pub fn is_emulated(&self) -> bool {
        self.status == OrderStatus::Emulated
    }

    /// Returns whether the order is active locally (not yet with a venue).
    #[must_use]
    pub fn is_active_local(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Initialized | OrderStatus::Emulated | OrderStatus::Released
        )
    }

    /// Returns whether the order is open at a venue.
    #[must_use]
    pub fn is_open(&self) -> bool {
        if self.emulation_trigger != TriggerType::NoTrigger {
            return false;
        }
        matches!(
            self.status,
            OrderStatus::Accepted
                | OrderStatus::Triggered
                | OrderStatus::PendingCancel
                | OrderStatus::PendingUpdate
                | OrderStatus::PartiallyFilled
        )
    }

    /// Returns whether the order is in a terminal status.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Denied
                | OrderStatus::Rejected
                | OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::Filled
        )
    }

    #[must_use]
    pub fn is_pending_cancel(&self) -> bool {
        self.status == OrderStatus::PendingCancel
    }

    #[must_use]
    pub fn is_contingency(&self) -> bool {
        self.contingency_type != ContingencyType::NoContingency
    }

    #[must_use]
    pub fn is_child_order(&self) -> bool {
        self.parent_order_id.is_some()
    }

    /// Returns whether the order is the primary of an exec-spawn group.
    #[must_use]
    pub fn is_spawn_primary(&self) -> bool {
        self.exec_algorithm_id.is_some() && self.exec_spawn_id == Some(self.client_order_id)
    }

    /// Returns whether the order was spawned by an execution algorithm from
    /// another primary order.
    #[must_use]
    pub fn is_spawn_secondary(&self) -> bool {
        self.exec_algorithm_id.is_some()
            && self
                .exec_spawn_id
                .is_some_and(|spawn_id| spawn_id != self.client_order_id)
    }

    /// Applies `event` to the order, validating the status transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not valid in the current status.
    pub fn apply(&mut self, event: OrderEventAny) -> Result<(), OrderError> {
        debug_assert_eq!(self.client_order_id, event.client_order_id());

        let new_status = match &event {
            OrderEventAny::Initialized(_) => return Err(OrderError::AlreadyInitialized),
            // Updates preserve the current status
            OrderEventAny::Updated(_) if !self.is_closed() => self.status,
            // Fill residue decides the resulting status
            OrderEventAny::Filled(inner) if !self.is_closed() => {
                if self.leaves_qty.saturating_sub(inner.last_qty).is_zero() {
                    OrderStatus::Filled
                } else {
                    OrderStatus::PartiallyFilled
                }
            }
            _ => self.status.transition(&event)?,
        };
        self.previous_status = Some(self.status);
        self.status = new_status;

        match &event {
            OrderEventAny::Initialized(_) => unreachable!("handled above"),
            OrderEventAny::Emulated(_) | OrderEventAny::Triggered(_) => {}
            OrderEventAny::Released(_) => self.emulation_trigger = TriggerType::NoTrigger,
            OrderEventAny::Submitted(inner) => self.account_id = Some(inner.account_id),
            OrderEventAny::Accepted(inner) => self.venue_order_id = Some(inner.venue_order_id),
            OrderEventAny::Rejected(_)
            | OrderEventAny::Canceled(_)
            | OrderEventAny::Expired(_) => {}
            OrderEventAny::Updated(inner) => {
                self.quantity = inner.quantity;
                self.leaves_qty = self.quantity.saturating_sub(self.filled_qty);
                if inner.price.is_some() {
                    self.price = inner.price;
                }
                if inner.trigger_price.is_some() {
                    self.trigger_price = inner.trigger_price;
                }
            }
            OrderEventAny::Filled(inner) => {
                self.venue_order_id = Some(inner.venue_order_id);
                if inner.position_id.is_some() {
                    self.position_id = inner.position_id;
                }
                self.filled_qty += inner.last_qty;
                self.leaves_qty = self.quantity.saturating_sub(self.filled_qty);
            }
        }

        self.ts_last = event.ts_event();
        self.events.push(event);
        Ok(())
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.client_order_id == other.client_order_id
    }
}

impl Eq for Order {}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order({} {} {} {}, price={}, trigger_price={}, status={}, client_order_id={})",
            self.side,
            self.quantity,
            self.instrument_id,
            self.order_type,
            self.price.map_or_else(|| "None".to_string(), |p| p.to_string()),
            self.trigger_price
                .map_or_else(|| "None".to_string(), |p| p.to_string()),
            self.status,
            self.client_order_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        events::order::{OrderCanceled, OrderEmulated, OrderFilled, OrderReleased, OrderUpdated},
        identifiers::TradeId,
        orders::builder::OrderTestBuilder,
    };

    fn stop_market_order() -> Order {
        OrderTestBuilder::new(OrderType::StopMarket)
            .instrument_id(InstrumentId::from("ETHUSDT-PERP.BINANCE"))
            .side(OrderSide::Buy)
            .trigger_price(Price::from("5100.00"))
            .quantity(Quantity::from(1_u64))
            .emulation_trigger(TriggerType::BidAsk)
            .build()
    }

    fn emulated_event(order: &Order) -> OrderEventAny {
        OrderEventAny::Emulated(OrderEmulated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            UUID4::new(),
            0.into(),
            0.into(),
        ))
    }

    fn released_event(order: &Order) -> OrderEventAny {
        OrderEventAny::Released(OrderReleased::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            Price::from("5101.00"),
            UUID4::new(),
            0.into(),
            0.into(),
        ))
    }

    #[rstest]
    fn test_order_initial_state() {
        let order = stop_market_order();

        assert_eq!(order.status, OrderStatus::Initialized);
        assert_eq!(order.events.len(), 1);
        assert_eq!(order.filled_qty, Quantity::zero(0));
        assert_eq!(order.leaves_qty, order.quantity);
        assert!(order.is_active_local());
        assert!(!order.is_closed());
    }

    #[rstest]
    fn test_order_emulated_then_released_clears_trigger() {
        let mut order = stop_market_order();

        order.apply(emulated_event(&order)).unwrap();
        assert_eq!(order.status, OrderStatus::Emulated);
        assert!(order.is_emulated());

        order.apply(released_event(&order)).unwrap();
        assert_eq!(order.status, OrderStatus::Released);
        assert_eq!(order.emulation_trigger, TriggerType::NoTrigger);
    }

    #[rstest]
    fn test_order_canceled_from_emulated_is_closed() {
        let mut order = stop_market_order();
        order.apply(emulated_event(&order)).unwrap();

        let event = OrderEventAny::Canceled(OrderCanceled::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            UUID4::new(),
            0.into(),
            0.into(),
            None,
            None,
        ));
        order.apply(event).unwrap();

        assert_eq!(order.status, OrderStatus::Canceled);
        assert!(order.is_closed());
    }

    #[rstest]
    fn test_order_invalid_transition_rejected() {
        let mut order = stop_market_order();
        order.apply(emulated_event(&order)).unwrap();

        // A second emulation is not a valid transition
        let result = order.apply(emulated_event(&order));
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[rstest]
    fn test_order_updated_adjusts_quantity_and_prices() {
        let mut order = stop_market_order();
        order.apply(emulated_event(&order)).unwrap();

        let event = OrderEventAny::Updated(OrderUpdated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            Quantity::from(2_u64),
            UUID4::new(),
            0.into(),
            0.into(),
            None,
            None,
            None,
            Some(Price::from("5200.00")),
        ));
        order.apply(event).unwrap();

        assert_eq!(order.status, OrderStatus::Emulated);
        assert_eq!(order.quantity, Quantity::from(2_u64));
        assert_eq!(order.leaves_qty, Quantity::from(2_u64));
        assert_eq!(order.trigger_price, Some(Price::from("5200.00")));
    }

    #[rstest]
    fn test_order_partial_then_full_fill() {
        let mut order = OrderTestBuilder::new(OrderType::Limit)
            .instrument_id(InstrumentId::from("ETHUSDT-PERP.BINANCE"))
            .side(OrderSide::Sell)
            .price(Price::from("5000.00"))
            .quantity(Quantity::from(10_u64))
            .build();

        let fill = |qty: u64, order: &Order| {
            OrderEventAny::Filled(OrderFilled {
                trader_id: order.trader_id,
                strategy_id: order.strategy_id,
                instrument_id: order.instrument_id,
                client_order_id: order.client_order_id,
                venue_order_id: VenueOrderId::from("V-001"),
                account_id: None,
                trade_id: TradeId::from("T-001"),
                order_side: order.side,
                last_qty: Quantity::from(qty),
                last_px: Price::from("5000.00"),
                position_id: Some(PositionId::from("P-001")),
                event_id: UUID4::new(),
                ts_event: 0.into(),
                ts_init: 0.into(),
            })
        };

        order.apply(fill(4, &order)).unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.leaves_qty, Quantity::from(6_u64));

        order.apply(fill(6, &order)).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.leaves_qty.is_zero());
        assert_eq!(order.position_id, Some(PositionId::from("P-001")));
        assert!(order.is_closed());
    }
}
