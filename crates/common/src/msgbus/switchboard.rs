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

//! The canonical endpoint and topic names for system components.

use ferrum_model::identifiers::{ExecAlgorithmId, InstrumentId, StrategyId};
use ustr::Ustr;

/// Provides the messaging addresses used across the trading system.
#[derive(Debug)]
pub struct MessagingSwitchboard;

impl MessagingSwitchboard {
    /// The endpoint accepting trading commands for the order emulator.
    #[must_use]
    pub fn order_emulator_execute() -> Ustr {
        Ustr::from("OrderEmulator.execute")
    }

    /// The endpoint accepting trading commands for the risk engine.
    #[must_use]
    pub fn risk_engine_execute() -> Ustr {
        Ustr::from("RiskEngine.execute")
    }

    /// The endpoint accepting order events for the risk engine.
    #[must_use]
    pub fn risk_engine_process() -> Ustr {
        Ustr::from("RiskEngine.process")
    }

    /// The endpoint accepting trading commands for the execution engine.
    #[must_use]
    pub fn exec_engine_execute() -> Ustr {
        Ustr::from("ExecEngine.execute")
    }

    /// The endpoint accepting order events for the execution engine.
    #[must_use]
    pub fn exec_engine_process() -> Ustr {
        Ustr::from("ExecEngine.process")
    }

    /// The endpoint accepting trading commands for an execution algorithm.
    #[must_use]
    pub fn exec_algorithm_execute(exec_algorithm_id: ExecAlgorithmId) -> Ustr {
        Ustr::from(&format!("{exec_algorithm_id}.execute"))
    }
}

/// Returns the topic for quote ticks for the given instrument.
#[must_use]
pub fn get_quotes_topic(instrument_id: InstrumentId) -> Ustr {
    Ustr::from(&format!("data.quotes.{instrument_id}"))
}

/// Returns the topic for trade ticks for the given instrument.
#[must_use]
pub fn get_trades_topic(instrument_id: InstrumentId) -> Ustr {
    Ustr::from(&format!("data.trades.{instrument_id}"))
}

/// Returns the topic for order events for the given strategy.
#[must_use]
pub fn get_order_events_topic(strategy_id: StrategyId) -> Ustr {
    Ustr::from(&format!("events.order.{strategy_id}"))
}

/// Returns the topic for position events for the given strategy.
#[must_use]
pub fn get_position_events_topic(strategy_id: StrategyId) -> Ustr {
    Ustr::from(&format!("events.position.{strategy_id}"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_switchboard_addresses() {
        assert_eq!(
            MessagingSwitchboard::order_emulator_execute().as_str(),
            "OrderEmulator.execute"
        );
        assert_eq!(
            MessagingSwitchboard::exec_algorithm_execute(ExecAlgorithmId::from("TWAP")).as_str(),
            "TWAP.execute"
        );
        assert_eq!(
            get_order_events_topic(StrategyId::from("S-001")).as_str(),
            "events.order.S-001"
        );
        assert_eq!(
            get_quotes_topic(InstrumentId::from("AUD/USD.SIM")).as_str(),
            "data.quotes.AUD/USD.SIM"
        );
    }
}
