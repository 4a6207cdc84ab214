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

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use ferrum_common::{
    cache::Cache,
    clock::Clock,
    messages::execution::TradingCommand,
    msgbus::{self, TypedHandler, switchboard::MessagingSwitchboard},
};
use ferrum_core::WeakCell;

use super::emulator::OrderEmulator;

/// Owns an [`OrderEmulator`] and wires it to the message bus.
#[derive(Debug)]
pub struct OrderEmulatorAdapter {
    emulator: Rc<RefCell<OrderEmulator>>,
}

impl OrderEmulatorAdapter {
    /// Creates a new [`OrderEmulatorAdapter`] instance, registering the
    /// emulator's execute endpoint with the message bus.
    #[must_use]
    pub fn new(clock: Rc<RefCell<dyn Clock>>, cache: Rc<RefCell<Cache>>) -> Self {
        let emulator = Rc::new(RefCell::new(OrderEmulator::new(clock, cache)));

        Self::initialize_self_ref(&emulator);
        Self::initialize_execute_handler(&emulator);

        Self { emulator }
    }

    fn initialize_self_ref(emulator: &Rc<RefCell<OrderEmulator>>) {
        let self_ref = WeakCell::from(Rc::downgrade(emulator));
        emulator.borrow_mut().set_self_ref(self_ref);
    }

    fn initialize_execute_handler(emulator: &Rc<RefCell<OrderEmulator>>) {
        let emulator_weak = WeakCell::from(Rc::downgrade(emulator));
        let handler = TypedHandler::from_with_id(
            MessagingSwitchboard::order_emulator_execute().as_str(),
            move |command: &TradingCommand| {
                if let Some(emulator) = emulator_weak.upgrade() {
                    emulator.borrow_mut().execute(command.clone());
                }
            },
        );

        msgbus::register_trading_command_endpoint(
            MessagingSwitchboard::order_emulator_execute(),
            handler,
        );
    }

    #[must_use]
    pub fn get_emulator(&self) -> Ref<'_, OrderEmulator> {
        self.emulator.borrow()
    }

    #[must_use]
    pub fn get_emulator_mut(&self) -> RefMut<'_, OrderEmulator> {
        self.emulator.borrow_mut()
    }
}
