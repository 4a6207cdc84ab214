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

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use ahash::{AHashMap, AHashSet};
use ferrum_common::{
    cache::Cache,
    clock::Clock,
    logging::{CMD, EVT, RECV},
    messages::execution::{
        CancelAllOrders, CancelOrder, ModifyOrder, SubmitOrder, SubmitOrderList, TradingCommand,
    },
    msgbus::{
        self, TypedHandler,
        switchboard::{
            get_order_events_topic, get_position_events_topic, get_quotes_topic, get_trades_topic,
        },
    },
};
use ferrum_core::{UUID4, UnixNanos, WeakCell};
use ferrum_model::{
    data::{QuoteTick, TradeTick},
    enums::{ContingencyType, OrderSide, OrderStatus, OrderType, TriggerType},
    events::{
        PositionEvent,
        order::{OrderCanceled, OrderEmulated, OrderEventAny, OrderExpired, OrderReleased, OrderUpdated},
    },
    identifiers::{ClientOrderId, InstrumentId, PositionId, StrategyId},
    orders::Order,
    types::{Price, Quantity},
};

use super::transformer::{transform_to_limit_order, transform_to_market_order};
use crate::{
    matching_core::{MatchOrderSink, OrderMatchingCore},
    trailing::trailing_stop_calculate,
};

/// Emulates orders against live market data, releasing them downstream as
/// plain orders once their trigger conditions are met.
pub struct OrderEmulator {
    pub(super) clock: Rc<RefCell<dyn Clock>>,
    pub(super) cache: Rc<RefCell<Cache>>,
    pub(super) commands_submit_order: AHashMap<ClientOrderId, SubmitOrder>,
    matching_cores: AHashMap<InstrumentId, OrderMatchingCore>,
    subscribed_quotes: AHashSet<InstrumentId>,
    subscribed_trades: AHashSet<InstrumentId>,
    subscribed_strategies: AHashSet<StrategyId>,
    monitored_positions: AHashSet<PositionId>,
    command_count: u64,
    event_count: u64,
    self_ref: Option<WeakCell<Self>>,
}

impl Debug for OrderEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(OrderEmulator))
            .field("cores", &self.matching_cores.len())
            .field("pending_commands", &self.commands_submit_order.len())
            .field("subscribed_quotes", &self.subscribed_quotes.len())
            .finish()
    }
}

impl OrderEmulator {
    /// Creates a new [`OrderEmulator`] instance.
    pub fn new(clock: Rc<RefCell<dyn Clock>>, cache: Rc<RefCell<Cache>>) -> Self {
        Self {
            clock,
            cache,
            commands_submit_order: AHashMap::new(),
            matching_cores: AHashMap::new(),
            subscribed_quotes: AHashSet::new(),
            subscribed_trades: AHashSet::new(),
            subscribed_strategies: AHashSet::new(),
            monitored_positions: AHashSet::new(),
            command_count: 0,
            event_count: 0,
            self_ref: None,
        }
    }

    /// Sets the weak self-reference used to create subscription handlers.
    pub fn set_self_ref(&mut self, self_ref: WeakCell<Self>) {
        self.self_ref = Some(self_ref);
    }

    #[must_use]
    pub fn subscribed_quotes(&self) -> Vec<InstrumentId> {
        let mut quotes: Vec<InstrumentId> = self.subscribed_quotes.iter().copied().collect();
        quotes.sort();
        quotes
    }

    #[must_use]
    pub fn subscribed_trades(&self) -> Vec<InstrumentId> {
        let mut trades: Vec<InstrumentId> = self.subscribed_trades.iter().copied().collect();
        trades.sort();
        trades
    }

    /// Returns a copy of all cached submit order commands.
    #[must_use]
    pub fn get_submit_order_commands(&self) -> AHashMap<ClientOrderId, SubmitOrder> {
        self.commands_submit_order.clone()
    }

    /// Returns a copy of the matching core for the given instrument.
    #[must_use]
    pub fn get_matching_core(&self, instrument_id: &InstrumentId) -> Option<OrderMatchingCore> {
        self.matching_cores.get(instrument_id).cloned()
    }

    #[must_use]
    pub const fn command_count(&self) -> u64 {
        self.command_count
    }

    #[must_use]
    pub const fn event_count(&self) -> u64 {
        self.event_count
    }

    // -- LIFECYCLE -----------------------------------------------------------

    /// Reactivates emulated orders from the cache on start.
    ///
    /// # Errors
    ///
    /// Returns an error if reactivation fails.
    pub fn on_start(&mut self) -> anyhow::Result<()> {
        let emulated_orders = self.cache.borrow().orders_emulated();
        if emulated_orders.is_empty() {
            log::info!("No emulated orders to reactivate");
            return Ok(());
        }

        for order in emulated_orders {
            if !matches!(
                order.status,
                OrderStatus::Initialized | OrderStatus::Emulated
            ) {
                continue; // No longer emulated
            }

            if let Some(parent_order_id) = order.parent_order_id {
                let parent_order = self.cache.borrow().order(&parent_order_id).cloned();
                let Some(parent_order) = parent_order else {
                    log::error!("Cannot handle order: parent {parent_order_id} not found");
                    continue;
                };

                let is_position_closed = parent_order
                    .position_id
                    .is_some_and(|id| self.cache.borrow().is_position_closed(&id));
                if parent_order.is_closed() && is_position_closed {
                    self.cancel_order(&order);
                    continue; // Parent already closed
                }

                if parent_order.contingency_type == ContingencyType::Oto
                    && (parent_order.is_active_local() || parent_order.filled_qty.is_zero())
                {
                    continue; // Process contingent order later once parent triggered
                }
            }

            let position_id = self.cache.borrow().position_id(&order.client_order_id);
            let client_id = self.cache.borrow().client_id(&order.client_order_id);

            let command = SubmitOrder::new(
                order.trader_id,
                client_id,
                order.strategy_id,
                order.instrument_id,
                order.clone(),
                order.exec_algorithm_id,
                position_id,
                UUID4::new(),
                self.clock.borrow().timestamp_ns(),
            );

            self.handle_submit_order(command);
        }

        Ok(())
    }

    pub const fn on_stop(&self) {}

    /// Clears all matching cores, cached commands, subscriptions bookkeeping
    /// and counters.
    pub fn on_reset(&mut self) {
        self.commands_submit_order.clear();
        self.matching_cores.clear();
        self.subscribed_quotes.clear();
        self.subscribed_trades.clear();
        self.subscribed_strategies.clear();
        self.monitored_positions.clear();
        self.command_count = 0;
        self.event_count = 0;
    }

    pub const fn on_dispose(&self) {}

    // -- COMMAND HANDLING ----------------------------------------------------

    /// Executes the given trading command.
    pub fn execute(&mut self, command: TradingCommand) {
        log::info!("{RECV}{CMD} {command}");
        self.command_count += 1;

        match command {
            TradingCommand::SubmitOrder(command) => self.handle_submit_order(command),
            TradingCommand::SubmitOrderList(command) => self.handle_submit_order_list(command),
            TradingCommand::ModifyOrder(command) => self.handle_modify_order(command),
            TradingCommand::CancelOrder(command) => self.handle_cancel_order(command),
            TradingCommand::CancelAllOrders(command) => self.handle_cancel_all_orders(command),
        }
    }

    /// Arms the given submit order for emulation.
    ///
    /// Unsupported trigger types, unknown trigger instruments, and trailing
    /// stops with no derivable trigger price all degrade to a local cancel.
    pub fn handle_submit_order(&mut self, command: SubmitOrder) {
        let mut order = command.order.clone();
        let emulation_trigger = order.emulation_trigger;
        debug_assert_ne!(
            emulation_trigger,
            TriggerType::NoTrigger,
            "`command.order.emulation_trigger` must not be `NoTrigger`",
        );

        if !matches!(
            emulation_trigger,
            TriggerType::Default | TriggerType::BidAsk | TriggerType::LastTrade
        ) {
            log::error!("Cannot emulate order: `TriggerType` {emulation_trigger} not supported");
            self.cancel_order(&order);
            return;
        }

        self.check_monitoring(command.strategy_id, command.position_id);

        let trigger_instrument_id = order.trigger_instrument_id();

        // Get or create the matching core, holding it out of the map while
        // this path runs against it
        let mut matching_core = match self.matching_cores.remove(&trigger_instrument_id) {
            Some(matching_core) => matching_core,
            None => {
                let price_increment = if trigger_instrument_id.is_synthetic() {
                    let increment = self
                        .cache
                        .borrow()
                        .synthetic(&trigger_instrument_id)
                        .map(|synthetic| synthetic.price_increment);
                    if increment.is_none() {
                        log::error!(
                            "Cannot emulate order: no synthetic instrument {trigger_instrument_id} for trigger"
                        );
                    }
                    increment
                } else {
                    let increment = self
                        .cache
                        .borrow()
                        .instrument(&trigger_instrument_id)
                        .map(|instrument| instrument.price_increment);
                    if increment.is_none() {
                        log::error!(
                            "Cannot emulate order: no instrument {trigger_instrument_id} for trigger"
                        );
                    }
                    increment
                };
                let Some(price_increment) = price_increment else {
                    self.cancel_order(&order);
                    return;
                };
                log::info!("Creating matching core for {trigger_instrument_id}");
                OrderMatchingCore::new(trigger_instrument_id, price_increment)
            }
        };

        if order.order_type.is_trailing() {
            self.update_trailing_stop_order(&mut matching_core, &mut order);
            if order.trigger_price.is_none() {
                log::error!(
                    "Cannot handle trailing stop order with no trigger_price and no market updates"
                );
                self.matching_cores
                    .insert(trigger_instrument_id, matching_core);
                self.cancel_order(&order);
                return;
            }
        }

        // Cache command
        self.commands_submit_order
            .insert(order.client_order_id, command);

        // Check if immediately marketable
        matching_core.match_order(&order, true, self);

        // Handle data subscriptions
        match emulation_trigger {
            TriggerType::Default | TriggerType::BidAsk => {
                if !self.subscribed_quotes.contains(&trigger_instrument_id) {
                    self.subscribe_quotes_for_instrument(trigger_instrument_id);
                    self.subscribed_quotes.insert(trigger_instrument_id);
                }
            }
            TriggerType::LastTrade => {
                if !self.subscribed_trades.contains(&trigger_instrument_id) {
                    self.subscribe_trades_for_instrument(trigger_instrument_id);
                    self.subscribed_trades.insert(trigger_instrument_id);
                }
            }
            _ => unreachable!("trigger type validated above"),
        }

        // The initial match may have already released the order, in which
        // case its command entry is gone and no emulation event is emitted
        if !self
            .commands_submit_order
            .contains_key(&order.client_order_id)
        {
            self.matching_cores
                .insert(trigger_instrument_id, matching_core);
            return;
        }

        if order.status == OrderStatus::Initialized {
            let ts_now = self.clock.borrow().timestamp_ns();
            let event = OrderEmulated::new(
                order.trader_id,
                order.strategy_id,
                order.instrument_id,
                order.client_order_id,
                UUID4::new(),
                ts_now,
                ts_now,
            );
            if let Err(e) = order.apply(OrderEventAny::Emulated(event.clone())) {
                log::error!("Cannot apply order event: {e}");
                self.matching_cores
                    .insert(trigger_instrument_id, matching_core);
                return;
            }
            if let Err(e) = self.cache.borrow_mut().update_order(&order) {
                log::error!("Cannot update order: {e}");
                self.matching_cores
                    .insert(trigger_instrument_id, matching_core);
                return;
            }

            self.send_risk_event(OrderEventAny::Emulated(event.clone()));
            msgbus::publish_order_event(
                get_order_events_topic(order.strategy_id),
                &OrderEventAny::Emulated(event),
            );
        }

        // Hold in the matching core
        if let Err(e) = matching_core.add_order(order.clone()) {
            log::error!("Cannot add order: {e}");
        }
        self.matching_cores
            .insert(trigger_instrument_id, matching_core);

        log::info!("Emulating {order}");
    }

    fn handle_submit_order_list(&mut self, command: SubmitOrderList) {
        self.check_monitoring(command.strategy_id, command.position_id);

        for order in &command.order_list.orders {
            if let Some(parent_order_id) = order.parent_order_id {
                let parent_contingency = self
                    .cache
                    .borrow()
                    .order(&parent_order_id)
                    .map(|parent| parent.contingency_type);
                let Some(parent_contingency) = parent_contingency else {
                    log::error!("Parent order for {} not found", order.client_order_id);
                    continue;
                };
                if parent_contingency == ContingencyType::Oto {
                    continue; // Process contingent order later once parent triggered
                }
            }

            if let Err(e) =
                self.create_new_submit_order(order, command.position_id, command.client_id)
            {
                log::error!("Error creating new submit order: {e}");
            }
        }
    }

    fn handle_modify_order(&mut self, command: ModifyOrder) {
        let order = self.cache.borrow().order(&command.client_order_id).cloned();
        let Some(order) = order else {
            log::error!("Cannot modify order: {} not found", command.client_order_id);
            return;
        };

        let price = command.price.or(order.price);
        let trigger_price = command.trigger_price.or(order.trigger_price);
        let quantity = command.quantity.unwrap_or(order.quantity);

        let ts_now = self.clock.borrow().timestamp_ns();
        let event = OrderUpdated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            quantity,
            UUID4::new(),
            ts_now,
            ts_now,
            order.venue_order_id,
            order.account_id,
            price,
            trigger_price,
        );

        let mut updated = order;
        if let Err(e) = updated.apply(OrderEventAny::Updated(event.clone())) {
            log::error!("Cannot apply order event: {e}");
            return;
        }
        if let Err(e) = self.cache.borrow_mut().update_order(&updated) {
            log::error!("Cannot update order: {e}");
            return;
        }
        self.send_exec_event(OrderEventAny::Updated(event));

        let trigger_instrument_id = updated.trigger_instrument_id();
        let Some(mut matching_core) = self.matching_cores.remove(&trigger_instrument_id) else {
            log::error!(
                "Cannot handle `ModifyOrder`: no matching core for trigger instrument {trigger_instrument_id}"
            );
            return;
        };

        if matching_core.order_exists(updated.client_order_id) {
            matching_core.update_order(&updated);
            match updated.side {
                OrderSide::Buy => matching_core.sort_bid_orders(),
                OrderSide::Sell => matching_core.sort_ask_orders(),
                OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", updated.side),
            }
        }
        matching_core.match_order(&updated, false, self);
        self.matching_cores
            .insert(trigger_instrument_id, matching_core);
    }

    /// Handles a cancel command: orders not held in a matching core but open
    /// downstream have the cancel forwarded; all others cancel locally.
    pub fn handle_cancel_order(&mut self, command: CancelOrder) {
        let order = self.cache.borrow().order(&command.client_order_id).cloned();
        let Some(order) = order else {
            log::error!("Cannot cancel order: {} not found", command.client_order_id);
            return;
        };

        let trigger_instrument_id = order.trigger_instrument_id();
        let Some(matching_core) = self.matching_cores.get(&trigger_instrument_id) else {
            self.cancel_order(&order);
            return;
        };

        if !matching_core.order_exists(order.client_order_id)
            && order.is_open()
            && !order.is_pending_cancel()
        {
            // Order not held in the emulator
            self.send_exec_command(TradingCommand::CancelOrder(command));
        } else {
            self.cancel_order(&order);
        }
    }

    fn handle_cancel_all_orders(&mut self, command: CancelAllOrders) {
        let Some(matching_core) = self.matching_cores.get(&command.instrument_id) else {
            return; // No orders to cancel
        };

        let orders_to_cancel: Vec<Order> = match command.order_side {
            OrderSide::NoOrderSide => matching_core.get_orders(),
            OrderSide::Buy => matching_core.get_orders_bid().to_vec(),
            OrderSide::Sell => matching_core.get_orders_ask().to_vec(),
        };

        for order in orders_to_cancel {
            self.cancel_order(&order);
        }
    }

    /// Updates the quantity of the given order, recording and distributing
    /// an `OrderUpdated` event.
    pub fn update_order(&mut self, order: &mut Order, new_quantity: Quantity) {
        log::info!(
            "Updating order {} quantity to {new_quantity}",
            order.client_order_id,
        );

        let ts_now = self.clock.borrow().timestamp_ns();
        let event = OrderUpdated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            new_quantity,
            UUID4::new(),
            ts_now,
            ts_now,
            order.venue_order_id,
            order.account_id,
            None,
            None,
        );

        if let Err(e) = order.apply(OrderEventAny::Updated(event.clone())) {
            log::error!("Cannot apply order event: {e}");
            return;
        }
        if let Err(e) = self.cache.borrow_mut().update_order(order) {
            log::error!("Cannot update order: {e}");
            return;
        }

        self.send_risk_event(OrderEventAny::Updated(event));
    }

    // -- EVENT HANDLING ------------------------------------------------------

    /// Handles an inbound order event, coordinating any contingent orders.
    pub fn on_event(&mut self, event: OrderEventAny) {
        log::info!("{RECV}{EVT} {event}");
        self.event_count += 1;

        self.handle_event(event.clone());

        // Sweep closed orders out of their matching core
        let order = self.cache.borrow().order(&event.client_order_id()).cloned();
        if let Some(order) = order
            && order.is_closed()
            && let Some(matching_core) = self.matching_cores.get_mut(&order.trigger_instrument_id())
        {
            matching_core.delete_order(&order.client_order_id);
        }
    }

    /// Handles an inbound position event.
    pub fn on_position_event(&mut self, event: &PositionEvent) {
        // TBC: no position-event handling is currently defined
        log::debug!("{RECV}{EVT} {event}");
    }

    // -- MARKET DATA ---------------------------------------------------------

    pub fn on_quote_tick(&mut self, quote: QuoteTick) {
        log::debug!("Processing {quote}");

        let Some(mut matching_core) = self.matching_cores.remove(&quote.instrument_id) else {
            log::error!(
                "Cannot handle `QuoteTick`: no matching core for instrument {}",
                quote.instrument_id
            );
            return;
        };

        matching_core.set_bid_raw(quote.bid_price);
        matching_core.set_ask_raw(quote.ask_price);

        self.iterate_orders(&mut matching_core);
        self.matching_cores
            .insert(matching_core.instrument_id, matching_core);
    }

    pub fn on_trade_tick(&mut self, trade: TradeTick) {
        log::debug!("Processing {trade}");

        let Some(mut matching_core) = self.matching_cores.remove(&trade.instrument_id) else {
            log::error!(
                "Cannot handle `TradeTick`: no matching core for instrument {}",
                trade.instrument_id
            );
            return;
        };

        matching_core.set_last_raw(trade.price);
        if !self.subscribed_quotes.contains(&trade.instrument_id) {
            // Only trade prices are known: seed the top of book from last
            matching_core.set_bid_raw(trade.price);
            matching_core.set_ask_raw(trade.price);
        }

        self.iterate_orders(&mut matching_core);
        self.matching_cores
            .insert(matching_core.instrument_id, matching_core);
    }

    fn iterate_orders(&mut self, matching_core: &mut OrderMatchingCore) {
        let ts_now = self.clock.borrow().timestamp_ns();
        matching_core.iterate(ts_now, self);

        // TODO: index trailing stops separately to avoid the full scan per tick
        let orders = matching_core.get_orders();
        for mut order in orders {
            if order.is_closed() || !matching_core.order_exists(order.client_order_id) {
                continue;
            }
            if order.order_type.is_trailing() {
                self.update_trailing_stop_order(matching_core, &mut order);
            }
        }
    }

    fn update_trailing_stop_order(
        &mut self,
        matching_core: &mut OrderMatchingCore,
        order: &mut Order,
    ) {
        let mut bid = matching_core.bid;
        let mut ask = matching_core.ask;
        let mut last = matching_core.last;

        // Backfill from the latest cached ticks where the core is uninitialized
        if bid.is_none() || ask.is_none() || last.is_none() {
            let quote = self.cache.borrow().quote(&matching_core.instrument_id).copied();
            if let Some(quote) = quote {
                bid.get_or_insert(quote.bid_price);
                ask.get_or_insert(quote.ask_price);
            }
            let trade = self.cache.borrow().trade(&matching_core.instrument_id).copied();
            if let Some(trade) = trade {
                last.get_or_insert(trade.price);
            }
        }

        let (new_trigger_price, new_price) =
            match trailing_stop_calculate(matching_core.price_increment, order, bid, ask, last) {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("Cannot calculate trailing stop update: {e}");
                    return;
                }
            };

        if new_trigger_price.is_none() && new_price.is_none() {
            return; // No updates
        }

        let ts_now = self.clock.borrow().timestamp_ns();
        let event = OrderUpdated::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            order.quantity,
            UUID4::new(),
            ts_now,
            ts_now,
            order.venue_order_id,
            order.account_id,
            new_price,
            new_trigger_price,
        );

        if let Err(e) = order.apply(OrderEventAny::Updated(event.clone())) {
            log::error!("Cannot apply order event: {e}");
            return;
        }
        if let Err(e) = self.cache.borrow_mut().update_order(order) {
            log::error!("Cannot update order: {e}");
            return;
        }

        // Keep the resting copy and the side-list geometry current
        if matching_core.order_exists(order.client_order_id) {
            matching_core.update_order(order);
            match order.side {
                OrderSide::Buy => matching_core.sort_bid_orders(),
                OrderSide::Sell => matching_core.sort_ask_orders(),
                OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
            }
        }

        self.send_risk_event(OrderEventAny::Updated(event));
    }

    // -- RELEASE AND CANCEL PATHS --------------------------------------------

    /// Releases the given order along the market path, transforming it into
    /// a plain MARKET order. Release is idempotent: a second fill signal for
    /// the same order is a no-op.
    pub fn fill_market_order(&mut self, matching_core: &mut OrderMatchingCore, order: &Order) {
        let released_price = match order.side {
            OrderSide::Buy => matching_core.ask,
            OrderSide::Sell => matching_core.bid,
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        };
        let Some(released_price) = released_price else {
            log::warn!(
                "Cannot release order {} yet: no market data available for {}, will retry on next update",
                order.client_order_id,
                matching_core.instrument_id,
            );
            return; // Order stays resting for retry
        };

        let Some(mut command) = self.commands_submit_order.remove(&order.client_order_id) else {
            log::debug!("Order {} already released", order.client_order_id);
            return;
        };

        matching_core.delete_order(&order.client_order_id);

        let mut order = order.clone();
        order.emulation_trigger = TriggerType::NoTrigger;

        let ts_now = self.clock.borrow().timestamp_ns();
        let transformed = transform_to_market_order(&order, ts_now);

        self.release_order(transformed, &mut command, released_price, ts_now);
    }

    /// Releases the given order along the limit path, transforming it into a
    /// plain LIMIT order at its limit price. Plain MARKET and LIMIT orders
    /// collapse to the market path.
    ///
    /// # Panics
    ///
    /// Panics if a stop-limit class order has no limit price (a caller-side
    /// logic error).
    pub fn fill_limit_order(&mut self, matching_core: &mut OrderMatchingCore, order: &Order) {
        if matches!(order.order_type, OrderType::Market | OrderType::Limit) {
            self.fill_market_order(matching_core, order);
            return;
        }

        let released_price = match order.side {
            OrderSide::Buy => matching_core.ask,
            OrderSide::Sell => matching_core.bid,
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        };
        let Some(released_price) = released_price else {
            log::warn!(
                "Cannot release order {} yet: no market data available for {}, will retry on next update",
                order.client_order_id,
                matching_core.instrument_id,
            );
            return; // Order stays resting for retry
        };

        let Some(mut command) = self.commands_submit_order.remove(&order.client_order_id) else {
            log::debug!("Order {} already released", order.client_order_id);
            return;
        };

        matching_core.delete_order(&order.client_order_id);

        let mut order = order.clone();
        order.emulation_trigger = TriggerType::NoTrigger;

        let price = order
            .price
            .expect("stop-limit class order must have a limit price");

        let ts_now = self.clock.borrow().timestamp_ns();
        let transformed = transform_to_limit_order(&order, price, ts_now);

        self.release_order(transformed, &mut command, released_price, ts_now);
    }

    /// Dispatches a fired stop trigger to the release path for the order type.
    ///
    /// # Panics
    ///
    /// Panics if called for a non stop-limit class order type (a caller-side
    /// logic error).
    pub fn trigger_stop_order(&mut self, matching_core: &mut OrderMatchingCore, order: &Order) {
        match order.order_type {
            OrderType::StopLimit | OrderType::LimitIfTouched | OrderType::TrailingStopLimit => {
                self.fill_limit_order(matching_core, order);
            }
            _ => panic!("invalid `OrderType`, was {}", order.order_type),
        }
    }

    fn release_order(
        &mut self,
        mut transformed: Order,
        command: &mut SubmitOrder,
        released_price: Price,
        ts_now: UnixNanos,
    ) {
        if let Err(e) = self.cache.borrow_mut().add_order(
            transformed.clone(),
            command.position_id,
            command.client_id,
            true,
        ) {
            log::error!("Cannot add order: {e}");
        }

        // Rebind the command to the transformed order
        command.order = transformed.clone();

        let topic = get_order_events_topic(transformed.strategy_id);
        msgbus::publish_order_event(topic, transformed.last_event());

        let event = OrderReleased::new(
            transformed.trader_id,
            transformed.strategy_id,
            transformed.instrument_id,
            transformed.client_order_id,
            released_price,
            UUID4::new(),
            ts_now,
            ts_now,
        );

        if let Err(e) = transformed.apply(OrderEventAny::Released(event.clone())) {
            log::error!("Cannot apply order event: {e}");
        }
        if let Err(e) = self.cache.borrow_mut().update_order(&transformed) {
            log::error!("Cannot update order: {e}");
        }

        self.send_risk_event(OrderEventAny::Released(event.clone()));

        log::info!("Releasing order {}", transformed.client_order_id);

        msgbus::publish_order_event(topic, &OrderEventAny::Released(event));

        let command = command.clone();
        match command.exec_algorithm_id {
            Some(exec_algorithm_id) => self.send_algo_command(command, exec_algorithm_id),
            None => self.send_exec_command(TradingCommand::SubmitOrder(command)),
        }
    }

    /// Expires the given GTD order, removing it from emulation and notifying
    /// the execution engine.
    pub fn expire_order(&mut self, matching_core: &mut OrderMatchingCore, order: &Order) {
        log::info!("Expiring order {}", order.client_order_id);

        let mut order = order.clone();
        order.emulation_trigger = TriggerType::NoTrigger;

        matching_core.delete_order(&order.client_order_id);
        self.commands_submit_order.remove(&order.client_order_id);

        let ts_now = self.clock.borrow().timestamp_ns();
        let event = OrderExpired::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            UUID4::new(),
            ts_now,
            ts_now,
            order.venue_order_id,
            order.account_id,
        );
        self.send_exec_event(OrderEventAny::Expired(event));
    }

    /// Cancels the given order locally: clears its trigger, removes it from
    /// its matching core and the command cache, and notifies the execution
    /// engine.
    pub fn cancel_order(&mut self, order: &Order) {
        if self
            .cache
            .borrow()
            .is_order_pending_cancel_local(&order.client_order_id)
        {
            return;
        }
        if order.is_closed() {
            log::warn!("Cannot cancel order: already closed");
            return;
        }

        log::info!("Canceling order {}", order.client_order_id);

        let mut order = order.clone();
        order.emulation_trigger = TriggerType::NoTrigger;

        let trigger_instrument_id = order.trigger_instrument_id();
        if let Some(matching_core) = self.matching_cores.get_mut(&trigger_instrument_id) {
            matching_core.delete_order(&order.client_order_id);
        }

        self.commands_submit_order.remove(&order.client_order_id);
        self.cache
            .borrow_mut()
            .update_order_pending_cancel_local(&order);

        let ts_now = self.clock.borrow().timestamp_ns();
        let event = OrderCanceled::new(
            order.trader_id,
            order.strategy_id,
            order.instrument_id,
            order.client_order_id,
            UUID4::new(),
            ts_now,
            ts_now,
            order.venue_order_id,
            order.account_id,
        );
        self.send_exec_event(OrderEventAny::Canceled(event));
    }

    // -- MONITORING ----------------------------------------------------------

    fn check_monitoring(&mut self, strategy_id: StrategyId, position_id: Option<PositionId>) {
        if !self.subscribed_strategies.contains(&strategy_id)
            && let Some(self_ref) = self.self_ref.clone()
        {
            let weak = self_ref.clone();
            let order_handler = TypedHandler::from_with_id(
                format!("OrderEmulator-order-events-{strategy_id}"),
                move |event: &OrderEventAny| {
                    if let Some(emulator) = weak.upgrade() {
                        match emulator.try_borrow_mut() {
                            Ok(mut emulator) => emulator.on_event(event.clone()),
                            // Events the emulator publishes from within its own
                            // call frame were already handled internally
                            Err(_) => log::debug!("Skipping re-entrant order event {event}"),
                        }
                    }
                },
            );
            msgbus::subscribe_order_events(get_order_events_topic(strategy_id), order_handler);

            let weak = self_ref;
            let position_handler = TypedHandler::from_with_id(
                format!("OrderEmulator-position-events-{strategy_id}"),
                move |event: &PositionEvent| {
                    if let Some(emulator) = weak.upgrade()
                        && let Ok(mut emulator) = emulator.try_borrow_mut()
                    {
                        emulator.on_position_event(event);
                    }
                },
            );
            msgbus::subscribe_position_events(
                get_position_events_topic(strategy_id),
                position_handler,
            );

            self.subscribed_strategies.insert(strategy_id);
            log::info!("Subscribed to strategy {strategy_id} order and position events");
        }

        if let Some(position_id) = position_id
            && !self.monitored_positions.contains(&position_id)
        {
            self.monitored_positions.insert(position_id);
        }
    }

    fn subscribe_quotes_for_instrument(&mut self, instrument_id: InstrumentId) {
        let Some(self_ref) = self.self_ref.clone() else {
            log::warn!("Cannot subscribe to quotes: self_ref not set");
            return;
        };

        let handler = TypedHandler::from_with_id(
            format!("OrderEmulator-quotes-{instrument_id}"),
            move |quote: &QuoteTick| {
                if let Some(emulator) = self_ref.upgrade() {
                    emulator.borrow_mut().on_quote_tick(*quote);
                }
            },
        );
        msgbus::subscribe_quotes(get_quotes_topic(instrument_id), handler);
    }

    fn subscribe_trades_for_instrument(&mut self, instrument_id: InstrumentId) {
        let Some(self_ref) = self.self_ref.clone() else {
            log::warn!("Cannot subscribe to trades: self_ref not set");
            return;
        };

        let handler = TypedHandler::from_with_id(
            format!("OrderEmulator-trades-{instrument_id}"),
            move |trade: &TradeTick| {
                if let Some(emulator) = self_ref.upgrade() {
                    emulator.borrow_mut().on_trade_tick(*trade);
                }
            },
        );
        msgbus::subscribe_trades(get_trades_topic(instrument_id), handler);
    }
}

impl MatchOrderSink for OrderEmulator {
    fn trigger_stop_order(&mut self, core: &mut OrderMatchingCore, order: &Order) {
        Self::trigger_stop_order(self, core, order);
    }

    fn fill_market_order(&mut self, core: &mut OrderMatchingCore, order: &Order) {
        Self::fill_market_order(self, core, order);
    }

    fn fill_limit_order(&mut self, core: &mut OrderMatchingCore, order: &Order) {
        Self::fill_limit_order(self, core, order);
    }

    fn expire_order(&mut self, core: &mut OrderMatchingCore, order: &Order) {
        Self::expire_order(self, core, order);
    }
}
