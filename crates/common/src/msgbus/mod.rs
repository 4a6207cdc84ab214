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

//! A common in-memory `MessageBus` supporting point-to-point and pub/sub
//! messaging patterns.
//!
//! The bus is designed for single-threaded use: thread-local storage gives
//! each thread its own instance, so no locking is required. Dispatch clones
//! handlers out of the registries before invoking them, so handlers are free
//! to publish or subscribe re-entrantly without holding the bus borrow.

pub mod handler;
pub mod stubs;
pub mod switchboard;

use std::{
    cell::{OnceCell, RefCell},
    rc::Rc,
};

use ferrum_model::{
    data::{QuoteTick, TradeTick},
    events::{OrderEventAny, PositionEvent},
};
use indexmap::IndexMap;
use ustr::Ustr;

use crate::messages::execution::TradingCommand;
pub use crate::msgbus::handler::{CallbackHandler, Handler, TypedHandler};

thread_local! {
    static MESSAGE_BUS: OnceCell<Rc<RefCell<MessageBus>>> = const { OnceCell::new() };
}

/// A single-threaded in-memory message bus.
#[derive(Debug, Default)]
pub struct MessageBus {
    endpoints_commands: IndexMap<Ustr, TypedHandler<TradingCommand>>,
    endpoints_order_events: IndexMap<Ustr, TypedHandler<OrderEventAny>>,
    topics_order_events: IndexMap<Ustr, Vec<TypedHandler<OrderEventAny>>>,
    topics_position_events: IndexMap<Ustr, Vec<TypedHandler<PositionEvent>>>,
    topics_quotes: IndexMap<Ustr, Vec<TypedHandler<QuoteTick>>>,
    topics_trades: IndexMap<Ustr, Vec<TypedHandler<TradeTick>>>,
    /// The count of messages sent through endpoints.
    pub sent_count: u64,
    /// The count of messages published to topics.
    pub pub_count: u64,
}

/// Gets the thread-local message bus, creating a default instance on first use.
pub fn get_message_bus() -> Rc<RefCell<MessageBus>> {
    MESSAGE_BUS.with(|bus| {
        bus.get_or_init(|| Rc::new(RefCell::new(MessageBus::default())))
            .clone()
    })
}

fn subscribe_topic<T: 'static>(
    topics: &mut IndexMap<Ustr, Vec<TypedHandler<T>>>,
    topic: Ustr,
    handler: TypedHandler<T>,
) {
    let handlers = topics.entry(topic).or_default();
    if handlers.contains(&handler) {
        log::warn!("Handler {} already subscribed to '{topic}'", handler.id());
        return;
    }
    handlers.push(handler);
}

// -- ENDPOINTS ---------------------------------------------------------------

/// Registers a trading command handler at an endpoint.
pub fn register_trading_command_endpoint(endpoint: Ustr, handler: TypedHandler<TradingCommand>) {
    log::debug!("Registering endpoint '{endpoint}'");
    get_message_bus()
        .borrow_mut()
        .endpoints_commands
        .insert(endpoint, handler);
}

/// Registers an order event handler at an endpoint.
pub fn register_order_event_endpoint(endpoint: Ustr, handler: TypedHandler<OrderEventAny>) {
    log::debug!("Registering endpoint '{endpoint}'");
    get_message_bus()
        .borrow_mut()
        .endpoints_order_events
        .insert(endpoint, handler);
}

/// Deregisters any handler at an endpoint.
pub fn deregister_endpoint(endpoint: Ustr) {
    log::debug!("Deregistering endpoint '{endpoint}'");
    let bus = get_message_bus();
    let mut bus = bus.borrow_mut();
    bus.endpoints_commands.shift_remove(&endpoint);
    bus.endpoints_order_events.shift_remove(&endpoint);
}

/// Sends a trading command to an endpoint.
pub fn send_trading_command(endpoint: Ustr, command: TradingCommand) {
    let handler = {
        let bus = get_message_bus();
        let mut bus = bus.borrow_mut();
        bus.sent_count += 1;
        bus.endpoints_commands.get(&endpoint).cloned()
    };
    match handler {
        Some(handler) => handler.handle(&command),
        None => log::error!("send_trading_command: no registered endpoint '{endpoint}'"),
    }
}

/// Sends an order event to an endpoint.
pub fn send_order_event(endpoint: Ustr, event: &OrderEventAny) {
    let handler = {
        let bus = get_message_bus();
        let mut bus = bus.borrow_mut();
        bus.sent_count += 1;
        bus.endpoints_order_events.get(&endpoint).cloned()
    };
    match handler {
        Some(handler) => handler.handle(event),
        None => log::error!("send_order_event: no registered endpoint '{endpoint}'"),
    }
}

// -- PUB/SUB -----------------------------------------------------------------

/// Subscribes a handler to order events on a topic.
pub fn subscribe_order_events(topic: Ustr, handler: TypedHandler<OrderEventAny>) {
    let bus = get_message_bus();
    subscribe_topic(&mut bus.borrow_mut().topics_order_events, topic, handler);
}

/// Subscribes a handler to position events on a topic.
pub fn subscribe_position_events(topic: Ustr, handler: TypedHandler<PositionEvent>) {
    let bus = get_message_bus();
    subscribe_topic(&mut bus.borrow_mut().topics_position_events, topic, handler);
}

/// Subscribes a handler to quote ticks on a topic.
pub fn subscribe_quotes(topic: Ustr, handler: TypedHandler<QuoteTick>) {
    let bus = get_message_bus();
    subscribe_topic(&mut bus.borrow_mut().topics_quotes, topic, handler);
}

/// Subscribes a handler to trade ticks on a topic.
pub fn subscribe_trades(topic: Ustr, handler: TypedHandler<TradeTick>) {
    let bus = get_message_bus();
    subscribe_topic(&mut bus.borrow_mut().topics_trades, topic, handler);
}

macro_rules! publish_fn {
    ($name:ident, $topics:ident, $ty:ty, $doc:expr) => {
        #[doc = $doc]
        pub fn $name(topic: Ustr, message: &$ty) {
            let handlers = {
                let bus = get_message_bus();
                let mut bus = bus.borrow_mut();
                bus.pub_count += 1;
                bus.$topics.get(&topic).cloned().unwrap_or_default()
            };
            for handler in &handlers {
                handler.handle(message);
            }
        }
    };
}

publish_fn!(
    publish_order_event,
    topics_order_events,
    OrderEventAny,
    "Publishes an order event to all subscribers of a topic."
);
publish_fn!(
    publish_position_event,
    topics_position_events,
    PositionEvent,
    "Publishes a position event to all subscribers of a topic."
);
publish_fn!(
    publish_quote,
    topics_quotes,
    QuoteTick,
    "Publishes a quote tick to all subscribers of a topic."
);
publish_fn!(
    publish_trade,
    topics_trades,
    TradeTick,
    "Publishes a trade tick to all subscribers of a topic."
);

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ferrum_model::{
        identifiers::{InstrumentId, StrategyId, TraderId},
        types::{Price, Quantity},
    };
    use rstest::rstest;

    use super::{stubs::get_message_saving_handler, *};

    #[rstest]
    fn test_send_to_unregistered_endpoint_is_noop() {
        // Must not panic
        send_order_event(
            Ustr::from("Nobody.process"),
            &OrderEventAny::Emulated(ferrum_model::events::OrderEmulated::new(
                TraderId::from("TRADER-001"),
                StrategyId::from("S-001"),
                InstrumentId::from("AUD/USD.SIM"),
                ferrum_model::identifiers::ClientOrderId::from("O-001"),
                ferrum_core::UUID4::new(),
                0.into(),
                0.into(),
            )),
        );
    }

    #[rstest]
    fn test_publish_quote_reaches_subscriber() {
        let (handler, messages) = get_message_saving_handler::<QuoteTick>("test-quote-saver");
        let topic = Ustr::from("data.quotes.AUD/USD.SIM");
        subscribe_quotes(topic, handler);

        let quote = QuoteTick::new(
            InstrumentId::from("AUD/USD.SIM"),
            Price::from("0.99000"),
            Price::from("0.99010"),
            Quantity::from(1_u64),
            Quantity::from(1_u64),
            0.into(),
            0.into(),
        );
        publish_quote(topic, &quote);

        assert_eq!(messages.borrow().len(), 1);
        assert_eq!(messages.borrow()[0], quote);
    }

    #[rstest]
    fn test_duplicate_subscription_is_ignored() {
        let (handler, messages) = get_message_saving_handler::<QuoteTick>("dup-saver");
        let topic = Ustr::from("data.quotes.GBP/USD.SIM");
        subscribe_quotes(topic, handler.clone());
        subscribe_quotes(topic, handler);

        let quote = QuoteTick::new(
            InstrumentId::from("GBP/USD.SIM"),
            Price::from("1.30000"),
            Price::from("1.30010"),
            Quantity::from(1_u64),
            Quantity::from(1_u64),
            0.into(),
            0.into(),
        );
        publish_quote(topic, &quote);

        assert_eq!(messages.borrow().len(), 1);
    }

    #[rstest]
    fn test_reentrant_publish_does_not_deadlock() {
        let count = Rc::new(Cell::new(0_u32));
        let count_clone = count.clone();
        let inner_topic = Ustr::from("data.trades.INNER.SIM");
        let outer_topic = Ustr::from("data.trades.OUTER.SIM");

        let inner = TypedHandler::from_with_id("inner", move |_: &TradeTick| {
            count_clone.set(count_clone.get() + 1);
        });
        subscribe_trades(inner_topic, inner);

        let outer = TypedHandler::from_with_id("outer", move |trade: &TradeTick| {
            publish_trade(inner_topic, trade);
        });
        subscribe_trades(outer_topic, outer);

        let trade = TradeTick::new(
            InstrumentId::from("OUTER.SIM"),
            Price::from("1.00"),
            Quantity::from(1_u64),
            ferrum_model::enums::AggressorSide::Buyer,
            ferrum_model::identifiers::TradeId::from("T-1"),
            0.into(),
            0.into(),
        );
        publish_trade(outer_topic, &trade);

        assert_eq!(count.get(), 1);
    }
}
