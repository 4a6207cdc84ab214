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

//! A common in-memory cache for orders, instruments and market data.

use ahash::{AHashMap, AHashSet};
use anyhow::bail;
use ferrum_model::{
    data::{QuoteTick, TradeTick},
    enums::{OrderStatus, TriggerType},
    identifiers::{ClientId, ClientOrderId, InstrumentId, PositionId},
    instruments::{Instrument, SyntheticInstrument},
    orders::Order,
    types::Quantity,
};

/// The shared state store for the trading node.
///
/// Orders are conceptually owned by the cache; components hold them by
/// `client_order_id` and write back through the documented mutations only.
#[derive(Debug, Default)]
pub struct Cache {
    orders: AHashMap<ClientOrderId, Order>,
    index_order_position: AHashMap<ClientOrderId, PositionId>,
    index_order_client: AHashMap<ClientOrderId, ClientId>,
    index_pending_cancel_local: AHashSet<ClientOrderId>,
    instruments: AHashMap<InstrumentId, Instrument>,
    synthetics: AHashMap<InstrumentId, SyntheticInstrument>,
    quotes: AHashMap<InstrumentId, QuoteTick>,
    trades: AHashMap<InstrumentId, TradeTick>,
    positions_closed: AHashSet<PositionId>,
}

impl Cache {
    /// Creates a new empty [`Cache`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- ORDERS --------------------------------------------------------------

    /// Adds the given order to the cache, indexing its position and client.
    ///
    /// # Errors
    ///
    /// Returns an error if the order already exists and `replace_existing`
    /// is `false`.
    pub fn add_order(
        &mut self,
        order: Order,
        position_id: Option<PositionId>,
        client_id: Option<ClientId>,
        replace_existing: bool,
    ) -> anyhow::Result<()> {
        let client_order_id = order.client_order_id;
        if !replace_existing && self.orders.contains_key(&client_order_id) {
            bail!("order {client_order_id} already exists in the cache");
        }

        if let Some(position_id) = position_id {
            self.index_order_position.insert(client_order_id, position_id);
        }
        if let Some(client_id) = client_id {
            self.index_order_client.insert(client_order_id, client_id);
        }
        self.orders.insert(client_order_id, order);
        Ok(())
    }

    /// Updates the cached copy of the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not in the cache.
    pub fn update_order(&mut self, order: &Order) -> anyhow::Result<()> {
        if !self.orders.contains_key(&order.client_order_id) {
            bail!("order {} not found in the cache", order.client_order_id);
        }
        self.orders.insert(order.client_order_id, order.clone());
        Ok(())
    }

    /// Marks the given order as having a local cancel in flight.
    pub fn update_order_pending_cancel_local(&mut self, order: &Order) {
        self.index_pending_cancel_local.insert(order.client_order_id);
    }

    /// Returns whether a local cancel is in flight for the given order.
    #[must_use]
    pub fn is_order_pending_cancel_local(&self, client_order_id: &ClientOrderId) -> bool {
        self.index_pending_cancel_local.contains(client_order_id)
    }

    /// Returns a reference to the order for the given client order ID.
    #[must_use]
    pub fn order(&self, client_order_id: &ClientOrderId) -> Option<&Order> {
        self.orders.get(client_order_id)
    }

    /// Returns all orders currently under emulation.
    #[must_use]
    pub fn orders_emulated(&self) -> Vec<Order> {
        self.orders
            .values()
            .filter(|order| {
                order.emulation_trigger != TriggerType::NoTrigger
                    && matches!(
                        order.status,
                        OrderStatus::Initialized | OrderStatus::Emulated
                    )
            })
            .cloned()
            .collect()
    }

    /// Returns the position ID indexed for the given client order ID.
    #[must_use]
    pub fn position_id(&self, client_order_id: &ClientOrderId) -> Option<PositionId> {
        self.index_order_position.get(client_order_id).copied()
    }

    /// Returns the client ID indexed for the given client order ID.
    #[must_use]
    pub fn client_id(&self, client_order_id: &ClientOrderId) -> Option<ClientId> {
        self.index_order_client.get(client_order_id).copied()
    }

    // -- EXEC SPAWN GROUPS ---------------------------------------------------

    /// Returns all orders in the given exec-spawn group (primary included).
    #[must_use]
    pub fn orders_for_exec_spawn(&self, exec_spawn_id: &ClientOrderId) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|order| order.exec_spawn_id.as_ref() == Some(exec_spawn_id))
            .collect()
    }

    /// Returns the total quantity of the given exec-spawn group, or `None`
    /// if the group is unknown.
    #[must_use]
    pub fn exec_spawn_total_quantity(
        &self,
        exec_spawn_id: &ClientOrderId,
        active_only: bool,
    ) -> Option<Quantity> {
        self.exec_spawn_sum(exec_spawn_id, active_only, |order| order.quantity)
    }

    /// Returns the total filled quantity of the given exec-spawn group, or
    /// `None` if the group is unknown.
    #[must_use]
    pub fn exec_spawn_total_filled_qty(
        &self,
        exec_spawn_id: &ClientOrderId,
        active_only: bool,
    ) -> Option<Quantity> {
        self.exec_spawn_sum(exec_spawn_id, active_only, |order| order.filled_qty)
    }

    /// Returns the total leaves quantity of the given exec-spawn group, or
    /// `None` if the group is unknown.
    #[must_use]
    pub fn exec_spawn_total_leaves_qty(
        &self,
        exec_spawn_id: &ClientOrderId,
        active_only: bool,
    ) -> Option<Quantity> {
        self.exec_spawn_sum(exec_spawn_id, active_only, |order| order.leaves_qty)
    }

    fn exec_spawn_sum<F>(
        &self,
        exec_spawn_id: &ClientOrderId,
        active_only: bool,
        field: F,
    ) -> Option<Quantity>
    where
        F: Fn(&Order) -> Quantity,
    {
        let orders = self.orders_for_exec_spawn(exec_spawn_id);
        if orders.is_empty() {
            return None;
        }
        let precision = field(orders[0]).precision;
        let mut total = Quantity::zero(precision);
        for order in orders {
            if !active_only || !order.is_closed() {
                total += field(order);
            }
        }
        Some(total)
    }

    // -- INSTRUMENTS ---------------------------------------------------------

    /// Adds the given instrument to the cache.
    pub fn add_instrument(&mut self, instrument: Instrument) {
        self.instruments.insert(instrument.id, instrument);
    }

    /// Adds the given synthetic instrument to the cache.
    pub fn add_synthetic(&mut self, synthetic: SyntheticInstrument) {
        self.synthetics.insert(synthetic.id, synthetic);
    }

    /// Returns the instrument for the given ID.
    #[must_use]
    pub fn instrument(&self, instrument_id: &InstrumentId) -> Option<&Instrument> {
        self.instruments.get(instrument_id)
    }

    /// Returns the synthetic instrument for the given ID.
    #[must_use]
    pub fn synthetic(&self, instrument_id: &InstrumentId) -> Option<&SyntheticInstrument> {
        self.synthetics.get(instrument_id)
    }

    // -- MARKET DATA ---------------------------------------------------------

    /// Adds the given quote tick as the latest for its instrument.
    pub fn add_quote(&mut self, quote: QuoteTick) {
        self.quotes.insert(quote.instrument_id, quote);
    }

    /// Adds the given trade tick as the latest for its instrument.
    pub fn add_trade(&mut self, trade: TradeTick) {
        self.trades.insert(trade.instrument_id, trade);
    }

    /// Returns the latest quote tick for the given instrument.
    #[must_use]
    pub fn quote(&self, instrument_id: &InstrumentId) -> Option<&QuoteTick> {
        self.quotes.get(instrument_id)
    }

    /// Returns the latest trade tick for the given instrument.
    #[must_use]
    pub fn trade(&self, instrument_id: &InstrumentId) -> Option<&TradeTick> {
        self.trades.get(instrument_id)
    }

    // -- POSITIONS -----------------------------------------------------------

    /// Marks the given position as closed.
    pub fn mark_position_closed(&mut self, position_id: PositionId) {
        self.positions_closed.insert(position_id);
    }

    /// Returns whether the given position is closed.
    #[must_use]
    pub fn is_position_closed(&self, position_id: &PositionId) -> bool {
        self.positions_closed.contains(position_id)
    }

    // -- LIFECYCLE -----------------------------------------------------------

    /// Resets the cache to an empty state.
    pub fn reset(&mut self) {
        self.orders.clear();
        self.index_order_position.clear();
        self.index_order_client.clear();
        self.index_pending_cancel_local.clear();
        self.instruments.clear();
        self.synthetics.clear();
        self.quotes.clear();
        self.trades.clear();
        self.positions_closed.clear();
    }
}

#[cfg(test)]
mod tests {
    use ferrum_model::{
        enums::{OrderSide, OrderType, TriggerType},
        identifiers::InstrumentId,
        orders::OrderTestBuilder,
        types::{Price, Quantity},
    };
    use rstest::rstest;

    use super::*;

    fn emulated_stop(instrument_id: InstrumentId) -> Order {
        OrderTestBuilder::new(OrderType::StopMarket)
            .instrument_id(instrument_id)
            .side(OrderSide::Buy)
            .trigger_price(Price::from("1.00050"))
            .quantity(Quantity::from(100_000_u64))
            .emulation_trigger(TriggerType::BidAsk)
            .build()
    }

    #[rstest]
    fn test_add_order_rejects_duplicate_without_replace() {
        let mut cache = Cache::new();
        let order = emulated_stop(InstrumentId::from("AUD/USD.SIM"));

        cache.add_order(order.clone(), None, None, false).unwrap();
        assert!(cache.add_order(order.clone(), None, None, false).is_err());
        assert!(cache.add_order(order, None, None, true).is_ok());
    }

    #[rstest]
    fn test_order_indexes() {
        let mut cache = Cache::new();
        let order = emulated_stop(InstrumentId::from("AUD/USD.SIM"));
        let client_order_id = order.client_order_id;

        cache
            .add_order(
                order,
                Some(PositionId::from("P-001")),
                Some(ClientId::from("SIM")),
                false,
            )
            .unwrap();

        assert_eq!(
            cache.position_id(&client_order_id),
            Some(PositionId::from("P-001"))
        );
        assert_eq!(cache.client_id(&client_order_id), Some(ClientId::from("SIM")));
    }

    #[rstest]
    fn test_orders_emulated_filters_triggerless() {
        let mut cache = Cache::new();
        let emulated = emulated_stop(InstrumentId::from("AUD/USD.SIM"));
        let plain = OrderTestBuilder::new(OrderType::Market)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .side(OrderSide::Buy)
            .quantity(Quantity::from(1_u64))
            .build();

        cache.add_order(emulated.clone(), None, None, false).unwrap();
        cache.add_order(plain, None, None, false).unwrap();

        let orders = cache.orders_emulated();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].client_order_id, emulated.client_order_id);
    }

    #[rstest]
    fn test_exec_spawn_totals() {
        let mut cache = Cache::new();
        let spawn_id = ClientOrderId::from("O-PRIMARY");
        let exec_algorithm_id =
            ferrum_model::identifiers::ExecAlgorithmId::from("TWAP");

        let primary = OrderTestBuilder::new(OrderType::Market)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .client_order_id(spawn_id)
            .quantity(Quantity::from(6_u64))
            .exec_algorithm_id(exec_algorithm_id)
            .exec_spawn_id(spawn_id)
            .build();
        let spawned = OrderTestBuilder::new(OrderType::Market)
            .instrument_id(InstrumentId::from("AUD/USD.SIM"))
            .quantity(Quantity::from(4_u64))
            .exec_algorithm_id(exec_algorithm_id)
            .exec_spawn_id(spawn_id)
            .build();

        cache.add_order(primary, None, None, false).unwrap();
        cache.add_order(spawned, None, None, false).unwrap();

        assert_eq!(
            cache.exec_spawn_total_quantity(&spawn_id, false),
            Some(Quantity::from(10_u64))
        );
        assert_eq!(
            cache.exec_spawn_total_filled_qty(&spawn_id, true),
            Some(Quantity::zero(0))
        );
        assert_eq!(
            cache.exec_spawn_total_leaves_qty(&spawn_id, true),
            Some(Quantity::from(10_u64))
        );
        assert_eq!(
            cache.exec_spawn_total_quantity(&ClientOrderId::from("O-OTHER"), false),
            None
        );
    }

    #[rstest]
    fn test_reset_clears_state() {
        let mut cache = Cache::new();
        cache
            .add_order(emulated_stop(InstrumentId::from("AUD/USD.SIM")), None, None, false)
            .unwrap();
        cache.mark_position_closed(PositionId::from("P-001"));

        cache.reset();

        assert!(cache.orders_emulated().is_empty());
        assert!(!cache.is_position_closed(&PositionId::from("P-001")));
    }
}
