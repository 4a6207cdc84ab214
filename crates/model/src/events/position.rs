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

//! Position lifecycle events.

use std::fmt::{Display, Formatter};

use ferrum_core::{UUID4, UnixNanos};
use serde::{Deserialize, Serialize};

use crate::identifiers::{InstrumentId, PositionId, StrategyId, TraderId};

/// A position lifecycle event published on the position events topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionEvent {
    Opened(PositionState),
    Changed(PositionState),
    Closed(PositionState),
}

/// The position identity and timing snapshot carried by every position event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub position_id: PositionId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

impl PositionEvent {
    /// Returns the position ID for the event.
    #[must_use]
    pub const fn position_id(&self) -> PositionId {
        match self {
            Self::Opened(state) | Self::Changed(state) | Self::Closed(state) => state.position_id,
        }
    }

    /// Returns the strategy ID for the event.
    #[must_use]
    pub const fn strategy_id(&self) -> StrategyId {
        match self {
            Self::Opened(state) | Self::Changed(state) | Self::Closed(state) => state.strategy_id,
        }
    }
}

impl Display for PositionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (name, state) = match self {
            Self::Opened(state) => ("PositionOpened", state),
            Self::Changed(state) => ("PositionChanged", state),
            Self::Closed(state) => ("PositionClosed", state),
        };
        write!(
            f,
            "{}(instrument_id={}, position_id={})",
            name, state.instrument_id, state.position_id,
        )
    }
}
