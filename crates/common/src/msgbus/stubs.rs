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

//! Stub handlers for testing message flows.

use std::{cell::RefCell, rc::Rc};

use ustr::Ustr;

use crate::msgbus::handler::{Handler, TypedHandler};

/// A handler which saves every message it receives.
pub struct MessageSavingHandler<T> {
    id: Ustr,
    messages: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone + 'static> Handler<T> for MessageSavingHandler<T> {
    fn id(&self) -> Ustr {
        self.id
    }

    fn handle(&self, message: &T) {
        self.messages.borrow_mut().push(message.clone());
    }
}

/// Returns a message-saving handler together with its message store.
#[must_use]
pub fn get_message_saving_handler<T: Clone + 'static>(
    id: &str,
) -> (TypedHandler<T>, Rc<RefCell<Vec<T>>>) {
    let messages: Rc<RefCell<Vec<T>>> = Rc::new(RefCell::new(Vec::new()));
    let handler = MessageSavingHandler {
        id: Ustr::from(id),
        messages: messages.clone(),
    };
    (TypedHandler::new(handler), messages)
}
