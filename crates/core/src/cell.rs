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
    cell::RefCell,
    fmt::Debug,
    rc::{Rc, Weak},
};

/// A weak reference to a shared mutable cell.
///
/// Handlers hold a `WeakCell` back to their owning component so that the
/// component graph contains no strong reference cycles: dropping the owner
/// invalidates every outstanding handler.
#[repr(transparent)]
pub struct WeakCell<T>(Weak<RefCell<T>>);

impl<T> WeakCell<T> {
    /// Attempts to upgrade to a strong reference, returning `None` if the
    /// referent has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<Rc<RefCell<T>>> {
        self.0.upgrade()
    }
}

impl<T> From<Weak<RefCell<T>>> for WeakCell<T> {
    fn from(value: Weak<RefCell<T>>) -> Self {
        Self(value)
    }
}

impl<T> Clone for WeakCell<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T> Debug for WeakCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(WeakCell))
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_weak_cell_upgrade_while_alive() {
        let strong = Rc::new(RefCell::new(42));
        let weak = WeakCell::from(Rc::downgrade(&strong));

        let upgraded = weak.upgrade().unwrap();
        assert_eq!(*upgraded.borrow(), 42);
    }

    #[rstest]
    fn test_weak_cell_upgrade_after_drop() {
        let strong = Rc::new(RefCell::new(42));
        let weak = WeakCell::from(Rc::downgrade(&strong));
        drop(strong);

        assert!(weak.upgrade().is_none());
    }
}
