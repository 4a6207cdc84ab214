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

use ferrum_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{InstrumentId, OrderListId, StrategyId},
    orders::order::Order,
};

/// A list of orders submitted together, forming a contingency group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderList {
    /// The order list ID.
    pub id: OrderListId,
    /// The instrument for the list.
    pub instrument_id: InstrumentId,
    /// The strategy the list belongs to.
    pub strategy_id: StrategyId,
    /// The orders in the list, primary first.
    pub orders: Vec<Order>,
    /// UNIX timestamp (nanoseconds) when the instance was created.
    pub ts_init: UnixNanos,
}

impl OrderList {
    /// Creates a new [`OrderList`] instance.
    ///
    /// # Panics
    ///
    /// Panics if `orders` is empty.
    #[must_use]
    pub fn new(
        id: OrderListId,
        instrument_id: InstrumentId,
        strategy_id: StrategyId,
        orders: Vec<Order>,
        ts_init: UnixNanos,
    ) -> Self {
        assert!(!orders.is_empty(), "`orders` must not be empty");
        Self {
            id,
            instrument_id,
            strategy_id,
            orders,
            ts_init,
        }
    }
}

impl Display for OrderList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderList(id={}, instrument_id={}, strategy_id={}, orders={})",
            self.id,
            self.instrument_id,
            self.strategy_id,
            self.orders.len(),
        )
    }
}
