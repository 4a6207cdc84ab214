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

//! A generic order matching core for a single instrument.

use ahash::AHashMap;
use anyhow::bail;
use ferrum_core::UnixNanos;
use ferrum_model::{
    enums::{OrderSide, OrderStatus, OrderType, TimeInForce},
    identifiers::{ClientOrderId, InstrumentId},
    orders::Order,
    types::Price,
};

/// The consumer of match outcomes produced by an [`OrderMatchingCore`].
///
/// The sink is passed at call time rather than stored, so the core holds no
/// reference back to its owner.
pub trait MatchOrderSink {
    /// Called when a stop-limit class order's trigger condition fires.
    fn trigger_stop_order(&mut self, core: &mut OrderMatchingCore, order: &Order);

    /// Called when an order should be released along the market path.
    fn fill_market_order(&mut self, core: &mut OrderMatchingCore, order: &Order);

    /// Called when an order should be released along the limit path.
    fn fill_limit_order(&mut self, core: &mut OrderMatchingCore, order: &Order);

    /// Called when a GTD order's expire time has passed.
    fn expire_order(&mut self, core: &mut OrderMatchingCore, order: &Order);
}

/// A matching core holding resting orders and reference prices for a single
/// (trigger) instrument.
///
/// Bid orders are kept sorted descending by trigger price and ask orders
/// ascending, so the best-priced order on each side is first.
#[derive(Clone, Debug)]
pub struct OrderMatchingCore {
    /// The instrument for the matching core.
    pub instrument_id: InstrumentId,
    /// The minimum price increment for the instrument.
    pub price_increment: Price,
    /// The current best bid price, if initialized.
    pub bid: Option<Price>,
    /// The current best ask price, if initialized.
    pub ask: Option<Price>,
    /// The last traded price, if initialized.
    pub last: Option<Price>,
    /// Whether the bid price has been initialized.
    pub is_bid_initialized: bool,
    /// Whether the ask price has been initialized.
    pub is_ask_initialized: bool,
    /// Whether the last price has been initialized.
    pub is_last_initialized: bool,
    orders_bid: Vec<Order>,
    orders_ask: Vec<Order>,
    index: AHashMap<ClientOrderId, OrderSide>,
}

impl OrderMatchingCore {
    /// Creates a new [`OrderMatchingCore`] instance.
    #[must_use]
    pub fn new(instrument_id: InstrumentId, price_increment: Price) -> Self {
        Self {
            instrument_id,
            price_increment,
            bid: None,
            ask: None,
            last: None,
            is_bid_initialized: false,
            is_ask_initialized: false,
            is_last_initialized: false,
            orders_bid: Vec::new(),
            orders_ask: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Returns the price precision for the instrument.
    #[must_use]
    pub const fn price_precision(&self) -> u8 {
        self.price_increment.precision
    }

    /// Resets the matching core to its initial state.
    pub fn reset(&mut self) {
        self.bid = None;
        self.ask = None;
        self.last = None;
        self.is_bid_initialized = false;
        self.is_ask_initialized = false;
        self.is_last_initialized = false;
        self.orders_bid.clear();
        self.orders_ask.clear();
        self.index.clear();
    }

    // -- QUERIES -------------------------------------------------------------

    /// Returns all resting orders (bids then asks).
    #[must_use]
    pub fn get_orders(&self) -> Vec<Order> {
        self.orders_bid
            .iter()
            .chain(self.orders_ask.iter())
            .cloned()
            .collect()
    }

    /// Returns the resting BUY orders, best priced first.
    #[must_use]
    pub fn get_orders_bid(&self) -> &[Order] {
        &self.orders_bid
    }

    /// Returns the resting SELL orders, best priced first.
    #[must_use]
    pub fn get_orders_ask(&self) -> &[Order] {
        &self.orders_ask
    }

    /// Returns whether an order with the given ID rests in the core.
    #[must_use]
    pub fn order_exists(&self, client_order_id: ClientOrderId) -> bool {
        self.index.contains_key(&client_order_id)
    }

    // -- PRICE STATE ---------------------------------------------------------

    /// Sets the bid price and marks it initialized.
    pub fn set_bid_raw(&mut self, bid: Price) {
        self.bid = Some(bid);
        self.is_bid_initialized = true;
    }

    /// Sets the ask price and marks it initialized.
    pub fn set_ask_raw(&mut self, ask: Price) {
        self.ask = Some(ask);
        self.is_ask_initialized = true;
    }

    /// Sets the last price and marks it initialized.
    pub fn set_last_raw(&mut self, last: Price) {
        self.last = Some(last);
        self.is_last_initialized = true;
    }

    // -- ORDER STATE ---------------------------------------------------------

    /// Places the order into the side list for its side, maintaining sort
    /// order, and indexes it by client order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is already in the core.
    ///
    /// # Panics
    ///
    /// Panics if the order has no side (a caller-side logic error).
    pub fn add_order(&mut self, order: Order) -> anyhow::Result<()> {
        if self.index.contains_key(&order.client_order_id) {
            bail!("order {} already in the matching core", order.client_order_id);
        }
        self.index.insert(order.client_order_id, order.side);
        match order.side {
            OrderSide::Buy => {
                self.orders_bid.push(order);
                self.sort_bid_orders();
            }
            OrderSide::Sell => {
                self.orders_ask.push(order);
                self.sort_ask_orders();
            }
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        }
        Ok(())
    }

    /// Removes the order from its side list and the index. No-op if absent.
    pub fn delete_order(&mut self, client_order_id: &ClientOrderId) {
        let Some(side) = self.index.remove(client_order_id) else {
            return;
        };
        let orders = match side {
            OrderSide::Buy => &mut self.orders_bid,
            OrderSide::Sell => &mut self.orders_ask,
            OrderSide::NoOrderSide => unreachable!("sides validated on insert"),
        };
        orders.retain(|order| order.client_order_id != *client_order_id);
    }

    /// Replaces the resting copy of the given order in place.
    ///
    /// The caller restores the side-list sort with [`Self::sort_bid_orders`]
    /// or [`Self::sort_ask_orders`] after a price or trigger change.
    pub fn update_order(&mut self, order: &Order) {
        let orders = match order.side {
            OrderSide::Buy => &mut self.orders_bid,
            OrderSide::Sell => &mut self.orders_ask,
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        };
        if let Some(resting) = orders
            .iter_mut()
            .find(|resting| resting.client_order_id == order.client_order_id)
        {
            *resting = order.clone();
        }
    }

    /// Restores the descending sort of the bid side.
    pub fn sort_bid_orders(&mut self) {
        self.orders_bid.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    }

    /// Restores the ascending sort of the ask side.
    pub fn sort_ask_orders(&mut self) {
        self.orders_ask.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    }

    // -- MATCHING ------------------------------------------------------------

    /// Classifies the order against the current price state, invoking the
    /// appropriate sink callback synchronously if a condition is satisfied.
    ///
    /// `initial` is `true` when run at submission time to honor orders which
    /// are immediately marketable.
    pub fn match_order(&mut self, order: &Order, initial: bool, sink: &mut dyn MatchOrderSink) {
        match order.order_type {
            OrderType::Market | OrderType::Limit => self.match_limit_order(order, sink),
            OrderType::StopMarket | OrderType::MarketIfTouched | OrderType::TrailingStopMarket => {
                self.match_stop_market_order(order, sink);
            }
            OrderType::StopLimit | OrderType::LimitIfTouched | OrderType::TrailingStopLimit => {
                self.match_stop_limit_order(order, initial, sink);
            }
        }
    }

    fn match_limit_order(&mut self, order: &Order, sink: &mut dyn MatchOrderSink) {
        // A plain MARKET order is always marketable
        if order.order_type == OrderType::Market || self.is_limit_matched(order) {
            sink.fill_limit_order(self, order);
        }
    }

    fn match_stop_market_order(&mut self, order: &Order, sink: &mut dyn MatchOrderSink) {
        if self.is_stop_matched(order) {
            sink.fill_market_order(self, order);
        }
    }

    fn match_stop_limit_order(
        &mut self,
        order: &Order,
        _initial: bool,
        sink: &mut dyn MatchOrderSink,
    ) {
        if order.status == OrderStatus::Triggered {
            if self.is_limit_matched(order) {
                sink.fill_limit_order(self, order);
            }
            return;
        }
        if self.is_stop_matched(order) {
            sink.trigger_stop_order(self, order);
        }
    }

    /// Returns whether the order's limit price is marketable against the
    /// current prices. An uninitialized reference defers matching.
    #[must_use]
    pub fn is_limit_matched(&self, order: &Order) -> bool {
        let Some(price) = order.price else {
            return false;
        };
        match order.side {
            OrderSide::Buy => self.ask.is_some_and(|ask| ask <= price),
            OrderSide::Sell => self.bid.is_some_and(|bid| bid >= price),
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        }
    }

    /// Returns whether the order's trigger price has been reached. An
    /// uninitialized reference defers triggering.
    #[must_use]
    pub fn is_stop_matched(&self, order: &Order) -> bool {
        let Some(trigger_price) = order.trigger_price else {
            return false;
        };
        match order.side {
            OrderSide::Buy => self.ask.is_some_and(|ask| ask >= trigger_price),
            OrderSide::Sell => self.bid.is_some_and(|bid| bid <= trigger_price),
            OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {}", order.side),
        }
    }

    /// Scans the resting orders, expiring GTD orders whose time has passed
    /// and firing triggers whose conditions are satisfied.
    pub fn iterate(&mut self, now_ns: UnixNanos, sink: &mut dyn MatchOrderSink) {
        let orders = self.get_orders();
        for order in &orders {
            // A callback earlier in this pass may have removed the order
            if !self.order_exists(order.client_order_id) {
                continue;
            }
            if order.is_closed() {
                continue;
            }
            if order.time_in_force == TimeInForce::Gtd
                && order.expire_time.is_some_and(|expire_time| expire_time <= now_ns)
            {
                sink.expire_order(self, order);
                continue;
            }
            self.match_order(order, false, sink);
        }
    }
}

/// Resting orders sort on their trigger price, falling back to the limit
/// price for plain limit orders.
fn sort_key(order: &Order) -> Price {
    order
        .trigger_price
        .or(order.price)
        .expect("resting order must have a trigger or limit price")
}
