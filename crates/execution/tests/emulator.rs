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

//! Integration tests driving the order emulator over the message bus.

use std::{cell::RefCell, rc::Rc};

use ferrum_common::{
    cache::Cache,
    clock::{Clock, TestClock},
    messages::execution::{SubmitOrder, SubmitOrderList, TradingCommand},
    msgbus::{
        self,
        stubs::get_message_saving_handler,
        switchboard::{MessagingSwitchboard, get_order_events_topic, get_quotes_topic},
    },
};
use ferrum_core::{UUID4, UnixNanos};
use ferrum_execution::order_emulator::OrderEmulatorAdapter;
use ferrum_model::{
    data::QuoteTick,
    enums::{ContingencyType, OrderSide, OrderStatus, OrderType, TriggerType},
    events::order::{OrderEventAny, OrderFilled, OrderUpdated},
    identifiers::{
        ClientOrderId, OrderListId, StrategyId, TradeId, TraderId, VenueOrderId,
    },
    instruments::{Instrument, stubs::ethusdt_perp_binance},
    orders::{Order, OrderList, OrderTestBuilder},
    types::{Price, Quantity},
};

const STRATEGY: &str = "S-001";

struct TestHarness {
    adapter: OrderEmulatorAdapter,
    clock: Rc<RefCell<TestClock>>,
    cache: Rc<RefCell<Cache>>,
    instrument: Instrument,
    risk_commands: Rc<RefCell<Vec<TradingCommand>>>,
    exec_commands: Rc<RefCell<Vec<TradingCommand>>>,
    exec_events: Rc<RefCell<Vec<OrderEventAny>>>,
    risk_events: Rc<RefCell<Vec<OrderEventAny>>>,
    order_events: Rc<RefCell<Vec<OrderEventAny>>>,
}

impl TestHarness {
    fn new() -> Self {
        let clock = Rc::new(RefCell::new(TestClock::new()));
        let clock_dyn: Rc<RefCell<dyn Clock>> = clock.clone();
        let cache = Rc::new(RefCell::new(Cache::new()));
        let instrument = ethusdt_perp_binance();
        cache.borrow_mut().add_instrument(instrument.clone());

        let (handler, risk_commands) = get_message_saving_handler::<TradingCommand>("risk-execute");
        msgbus::register_trading_command_endpoint(
            MessagingSwitchboard::risk_engine_execute(),
            handler,
        );
        let (handler, exec_commands) = get_message_saving_handler::<TradingCommand>("exec-execute");
        msgbus::register_trading_command_endpoint(
            MessagingSwitchboard::exec_engine_execute(),
            handler,
        );
        let (handler, exec_events) = get_message_saving_handler::<OrderEventAny>("exec-process");
        msgbus::register_order_event_endpoint(MessagingSwitchboard::exec_engine_process(), handler);
        let (handler, risk_events) = get_message_saving_handler::<OrderEventAny>("risk-process");
        msgbus::register_order_event_endpoint(MessagingSwitchboard::risk_engine_process(), handler);
        let (handler, order_events) = get_message_saving_handler::<OrderEventAny>("order-events");
        msgbus::subscribe_order_events(
            get_order_events_topic(StrategyId::from(STRATEGY)),
            handler,
        );

        let adapter = OrderEmulatorAdapter::new(clock_dyn, cache.clone());

        Self {
            adapter,
            clock,
            cache,
            instrument,
            risk_commands,
            exec_commands,
            exec_events,
            risk_events,
            order_events,
        }
    }

    fn submit_order(&self, order: &Order) {
        self.cache
            .borrow_mut()
            .add_order(order.clone(), None, None, false)
            .unwrap();
        let command = SubmitOrder::new(
            order.trader_id,
            None,
            order.strategy_id,
            order.instrument_id,
            order.clone(),
            order.exec_algorithm_id,
            None,
            UUID4::new(),
            self.clock.borrow().timestamp_ns(),
        );
        msgbus::send_trading_command(
            MessagingSwitchboard::order_emulator_execute(),
            TradingCommand::SubmitOrder(command),
        );
    }

    fn push_quote(&self, bid: &str, ask: &str) {
        let quote = QuoteTick::new(
            self.instrument.id,
            Price::from(bid),
            Price::from(ask),
            Quantity::from(10_u64),
            Quantity::from(10_u64),
            self.clock.borrow().timestamp_ns(),
            self.clock.borrow().timestamp_ns(),
        );
        msgbus::publish_quote(get_quotes_topic(self.instrument.id), &quote);
    }

    /// Applies a full fill to the cached order then distributes the event.
    fn fill_order(&self, client_order_id: ClientOrderId, last_px: &str) {
        let mut order = self
            .cache
            .borrow()
            .order(&client_order_id)
            .cloned()
            .unwrap();
        let event = OrderFilled {
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            instrument_id: order.instrument_id,
            client_order_id,
            venue_order_id: VenueOrderId::from("V-001"),
            account_id: None,
            trade_id: TradeId::from("T-001"),
            order_side: order.side,
            last_qty: order.leaves_qty,
            last_px: Price::from(last_px),
            position_id: None,
            event_id: UUID4::new(),
            ts_event: self.clock.borrow().timestamp_ns(),
            ts_init: self.clock.borrow().timestamp_ns(),
        };
        // A repeated fill signal is not applicable to an already closed order,
        // but is still distributed to exercise idempotence downstream
        if order.apply(OrderEventAny::Filled(event.clone())).is_ok() {
            self.cache.borrow_mut().update_order(&order).unwrap();
        }
        msgbus::publish_order_event(
            get_order_events_topic(order.strategy_id),
            &OrderEventAny::Filled(event),
        );
    }

    fn stop_market(&self, side: OrderSide, trigger: &str) -> Order {
        OrderTestBuilder::new(OrderType::StopMarket)
            .instrument_id(self.instrument.id)
            .strategy_id(StrategyId::from(STRATEGY))
            .side(side)
            .trigger_price(Price::from(trigger))
            .quantity(Quantity::from(1_u64))
            .emulation_trigger(TriggerType::BidAsk)
            .build()
    }
}

#[test]
fn test_stop_buy_triggered_by_quote_releases_in_order() {
    let harness = TestHarness::new();
    let order = harness.stop_market(OrderSide::Buy, "101.00");

    harness.submit_order(&order);
    harness.push_quote("100.90", "101.10");

    // Event ordering on the order events topic: emulated, transformed
    // initialization, then the release
    let events = harness.order_events.borrow();
    let relevant: Vec<&OrderEventAny> = events
        .iter()
        .filter(|event| event.client_order_id() == order.client_order_id)
        .collect();
    assert!(matches!(relevant[0], OrderEventAny::Emulated(_)));
    assert!(matches!(
        relevant[1],
        OrderEventAny::Initialized(init) if init.order_type == OrderType::Market
    ));
    assert!(matches!(
        relevant[2],
        OrderEventAny::Released(released) if released.released_price == Price::from("101.10")
    ));

    // The submit command is routed to the execution engine
    let commands = harness.exec_commands.borrow();
    assert_eq!(commands.len(), 1);
    assert!(matches!(&commands[0], TradingCommand::SubmitOrder(submit)
        if submit.client_order_id == order.client_order_id
            && submit.order.order_type == OrderType::Market));

    // Emulator bookkeeping is cleared
    let emulator = harness.adapter.get_emulator();
    assert!(emulator.get_submit_order_commands().is_empty());
    assert!(
        !emulator
            .get_matching_core(&harness.instrument.id)
            .unwrap()
            .order_exists(order.client_order_id)
    );
}

#[test]
fn test_released_order_state_in_cache() {
    let harness = TestHarness::new();
    let order = harness.stop_market(OrderSide::Sell, "99.00");

    harness.submit_order(&order);
    harness.push_quote("98.90", "99.10");

    let released = harness
        .cache
        .borrow()
        .order(&order.client_order_id)
        .cloned()
        .unwrap();
    assert_eq!(released.status, OrderStatus::Released);
    assert_eq!(released.emulation_trigger, TriggerType::NoTrigger);
    assert_eq!(released.order_type, OrderType::Market);
}

#[test]
fn test_oco_leg_fill_cancels_other_leg_exactly_once() {
    let harness = TestHarness::new();
    let id_a = ClientOrderId::from("O-OCO-A");
    let id_b = ClientOrderId::from("O-OCO-B");

    let order_a = OrderTestBuilder::new(OrderType::StopMarket)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(id_a)
        .side(OrderSide::Buy)
        .trigger_price(Price::from("101.00"))
        .quantity(Quantity::from(1_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .contingency_type(ContingencyType::Oco)
        .linked_order_ids(vec![id_b])
        .build();
    let order_b = OrderTestBuilder::new(OrderType::StopMarket)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(id_b)
        .side(OrderSide::Sell)
        .trigger_price(Price::from("90.00"))
        .quantity(Quantity::from(1_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .contingency_type(ContingencyType::Oco)
        .linked_order_ids(vec![id_a])
        .build();

    harness.submit_order(&order_a);
    harness.submit_order(&order_b);

    // Leg A triggers and releases, then fills downstream
    harness.push_quote("100.90", "101.10");
    harness.fill_order(id_a, "101.10");

    let exec_events = harness.exec_events.borrow();
    let canceled: Vec<&OrderEventAny> = exec_events
        .iter()
        .filter(|event| matches!(event, OrderEventAny::Canceled(_)))
        .collect();
    assert_eq!(canceled.len(), 1);
    assert_eq!(canceled[0].client_order_id(), id_b);
    drop(exec_events);

    // Both command cache entries are gone
    assert!(
        harness
            .adapter
            .get_emulator()
            .get_submit_order_commands()
            .is_empty()
    );
}

#[test]
fn test_oto_parent_fill_arms_child_exactly_once() {
    let harness = TestHarness::new();
    let parent_id = ClientOrderId::from("O-OTO-PARENT");
    let child_id = ClientOrderId::from("O-OTO-CHILD");

    let parent = OrderTestBuilder::new(OrderType::StopMarket)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(parent_id)
        .side(OrderSide::Buy)
        .trigger_price(Price::from("101.00"))
        .quantity(Quantity::from(1_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .contingency_type(ContingencyType::Oto)
        .linked_order_ids(vec![child_id])
        .build();
    let child = OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(child_id)
        .side(OrderSide::Sell)
        .price(Price::from("110.00"))
        .quantity(Quantity::from(1_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .parent_order_id(parent_id)
        .build();

    harness.submit_order(&parent);
    // The child is known to the cache but deferred until the parent fills
    harness
        .cache
        .borrow_mut()
        .add_order(child.clone(), None, None, false)
        .unwrap();

    harness.push_quote("100.90", "101.10");
    harness.fill_order(parent_id, "101.10");

    // The child is now armed in the matching core with a cached command
    let emulator = harness.adapter.get_emulator();
    assert!(
        emulator
            .get_submit_order_commands()
            .contains_key(&child_id)
    );
    assert!(
        emulator
            .get_matching_core(&harness.instrument.id)
            .unwrap()
            .order_exists(child_id)
    );
    drop(emulator);

    // A duplicate fill signal does not arm the child twice
    harness.fill_order(parent_id, "101.10");
    let emulated_count = harness
        .order_events
        .borrow()
        .iter()
        .filter(|event| {
            matches!(event, OrderEventAny::Emulated(inner) if inner.client_order_id == child_id)
        })
        .count();
    assert_eq!(emulated_count, 1);
}

#[test]
fn test_ouo_quantity_update_propagates_to_sibling() {
    let harness = TestHarness::new();
    let id_a = ClientOrderId::from("O-OUO-A");
    let id_b = ClientOrderId::from("O-OUO-B");

    let order_a = OrderTestBuilder::new(OrderType::StopMarket)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(id_a)
        .side(OrderSide::Buy)
        .trigger_price(Price::from("101.00"))
        .quantity(Quantity::from(10_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .contingency_type(ContingencyType::Ouo)
        .linked_order_ids(vec![id_b])
        .build();
    let order_b = OrderTestBuilder::new(OrderType::StopMarket)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .client_order_id(id_b)
        .side(OrderSide::Sell)
        .trigger_price(Price::from("90.00"))
        .quantity(Quantity::from(10_u64))
        .emulation_trigger(TriggerType::BidAsk)
        .contingency_type(ContingencyType::Ouo)
        .linked_order_ids(vec![id_a])
        .build();

    harness.submit_order(&order_a);
    harness.submit_order(&order_b);

    // Reduce leg A's quantity and distribute the update
    let mut updated_a = harness.cache.borrow().order(&id_a).cloned().unwrap();
    let event = OrderUpdated::new(
        updated_a.trader_id,
        updated_a.strategy_id,
        updated_a.instrument_id,
        id_a,
        Quantity::from(6_u64),
        UUID4::new(),
        0.into(),
        0.into(),
        None,
        None,
        None,
        None,
    );
    updated_a
        .apply(OrderEventAny::Updated(event.clone()))
        .unwrap();
    harness.cache.borrow_mut().update_order(&updated_a).unwrap();
    msgbus::publish_order_event(
        get_order_events_topic(StrategyId::from(STRATEGY)),
        &OrderEventAny::Updated(event),
    );

    // Leg B now carries the reduced quantity
    let sibling = harness.cache.borrow().order(&id_b).cloned().unwrap();
    assert_eq!(sibling.quantity, Quantity::from(6_u64));
    assert!(harness.risk_events.borrow().iter().any(|event| {
        matches!(event, OrderEventAny::Updated(inner)
            if inner.client_order_id == id_b && inner.quantity == Quantity::from(6_u64))
    }));
}

#[test]
fn test_submit_order_list_forwards_untagged_orders_to_risk_engine() {
    let harness = TestHarness::new();

    let emulated = harness.stop_market(OrderSide::Buy, "105.00");
    let plain = OrderTestBuilder::new(OrderType::Limit)
        .instrument_id(harness.instrument.id)
        .strategy_id(StrategyId::from(STRATEGY))
        .side(OrderSide::Buy)
        .price(Price::from("95.00"))
        .quantity(Quantity::from(1_u64))
        .build();

    let order_list = OrderList::new(
        OrderListId::from("OL-001"),
        harness.instrument.id,
        StrategyId::from(STRATEGY),
        vec![emulated.clone(), plain.clone()],
        UnixNanos::default(),
    );
    let command = SubmitOrderList {
        trader_id: TraderId::from("TRADER-001"),
        client_id: None,
        strategy_id: StrategyId::from(STRATEGY),
        instrument_id: harness.instrument.id,
        order_list,
        position_id: None,
        command_id: UUID4::new(),
        ts_init: UnixNanos::default(),
    };
    msgbus::send_trading_command(
        MessagingSwitchboard::order_emulator_execute(),
        TradingCommand::SubmitOrderList(command),
    );

    // The tagged order rests in a core, the untagged one goes to risk
    let emulator = harness.adapter.get_emulator();
    assert!(
        emulator
            .get_matching_core(&harness.instrument.id)
            .unwrap()
            .order_exists(emulated.client_order_id)
    );
    let risk = harness.risk_commands.borrow();
    assert_eq!(risk.len(), 1);
    assert!(matches!(&risk[0], TradingCommand::SubmitOrder(submit)
        if submit.client_order_id == plain.client_order_id));
}

#[test]
fn test_release_is_idempotent_under_repeated_ticks() {
    let harness = TestHarness::new();
    let order = harness.stop_market(OrderSide::Buy, "101.00");

    harness.submit_order(&order);
    harness.push_quote("100.90", "101.10");
    harness.push_quote("100.95", "101.20");

    let commands = harness.exec_commands.borrow();
    let submits = commands
        .iter()
        .filter(|command| matches!(command, TradingCommand::SubmitOrder(_)))
        .count();
    assert_eq!(submits, 1);
}

#[test]
fn test_reset_leaves_no_state() {
    let harness = TestHarness::new();
    let buy = harness.stop_market(OrderSide::Buy, "105.00");
    let sell = harness.stop_market(OrderSide::Sell, "95.00");
    harness.submit_order(&buy);
    harness.submit_order(&sell);

    let mut emulator = harness.adapter.get_emulator_mut();
    emulator.on_reset();

    assert!(emulator.get_submit_order_commands().is_empty());
    assert!(emulator.get_matching_core(&harness.instrument.id).is_none());
    assert_eq!(emulator.command_count(), 0);
    assert_eq!(emulator.event_count(), 0);
}
