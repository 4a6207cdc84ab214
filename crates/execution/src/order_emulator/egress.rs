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

//! Typed sends to the risk engine, execution engine and execution-algorithm
//! endpoints.

use ferrum_common::{
    logging::{CMD, EVT, SEND},
    messages::execution::{SubmitOrder, TradingCommand},
    msgbus::{self, switchboard::MessagingSwitchboard},
};
use ferrum_model::{events::order::OrderEventAny, identifiers::ExecAlgorithmId};

use super::emulator::OrderEmulator;

impl OrderEmulator {
    /// Sends a submit order command to its execution algorithm's endpoint.
    pub fn send_algo_command(&self, command: SubmitOrder, exec_algorithm_id: ExecAlgorithmId) {
        let strategy_id = command.strategy_id;
        log::info!("{strategy_id} {CMD}{SEND} {command}");

        let endpoint = MessagingSwitchboard::exec_algorithm_execute(exec_algorithm_id);
        msgbus::send_trading_command(endpoint, TradingCommand::SubmitOrder(command));
    }

    /// Sends a trading command to the risk engine.
    pub fn send_risk_command(&self, command: TradingCommand) {
        log_cmd_send(&command);
        let endpoint = MessagingSwitchboard::risk_engine_execute();
        msgbus::send_trading_command(endpoint, command);
    }

    /// Sends a trading command to the execution engine.
    pub fn send_exec_command(&self, command: TradingCommand) {
        log_cmd_send(&command);
        let endpoint = MessagingSwitchboard::exec_engine_execute();
        msgbus::send_trading_command(endpoint, command);
    }

    /// Sends an order event to the risk engine.
    pub fn send_risk_event(&self, event: OrderEventAny) {
        log_evt_send(&event);
        let endpoint = MessagingSwitchboard::risk_engine_process();
        msgbus::send_order_event(endpoint, &event);
    }

    /// Sends an order event to the execution engine.
    pub fn send_exec_event(&self, event: OrderEventAny) {
        log_evt_send(&event);
        let endpoint = MessagingSwitchboard::exec_engine_process();
        msgbus::send_order_event(endpoint, &event);
    }
}

#[inline(always)]
fn log_cmd_send(command: &TradingCommand) {
    let strategy_id = command.strategy_id();
    log::info!("{strategy_id} {CMD}{SEND} {command}");
}

#[inline(always)]
fn log_evt_send(event: &OrderEventAny) {
    let strategy_id = event.strategy_id();
    log::info!("{strategy_id} {EVT}{SEND} {event}");
}
