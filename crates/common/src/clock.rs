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

//! Real-time and static clocks, shared as `Rc<RefCell<dyn Clock>>`.

use std::{
    fmt::Debug,
    time::{SystemTime, UNIX_EPOCH},
};

use ferrum_core::UnixNanos;

/// A read-only clock producing UNIX nanosecond timestamps.
pub trait Clock: Debug {
    /// Returns the current UNIX timestamp in nanoseconds.
    fn timestamp_ns(&self) -> UnixNanos;
}

/// A static test clock whose time is advanced manually.
#[derive(Clone, Debug, Default)]
pub struct TestClock {
    time: UnixNanos,
}

impl TestClock {
    /// Creates a new [`TestClock`] instance at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clock to the given time.
    pub fn set_time(&mut self, to_time_ns: UnixNanos) {
        self.time = to_time_ns;
    }

    /// Advances the clock by the given number of nanoseconds.
    pub fn advance_time(&mut self, by_ns: u64) {
        self.time += by_ns;
    }
}

impl Clock for TestClock {
    fn timestamp_ns(&self) -> UnixNanos {
        self.time
    }
}

/// A live wall clock backed by the system time.
#[derive(Clone, Debug, Default)]
pub struct LiveClock;

impl LiveClock {
    /// Creates a new [`LiveClock`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for LiveClock {
    /// # Panics
    ///
    /// Panics if the system time is before the UNIX epoch.
    fn timestamp_ns(&self) -> UnixNanos {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX epoch");
        UnixNanos::from(u64::try_from(duration.as_nanos()).expect("timestamp overflow"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_test_clock_set_and_advance() {
        let mut clock = TestClock::new();
        assert_eq!(clock.timestamp_ns(), UnixNanos::default());

        clock.set_time(UnixNanos::from(1_000));
        clock.advance_time(500);

        assert_eq!(clock.timestamp_ns(), UnixNanos::from(1_500));
    }

    #[rstest]
    fn test_live_clock_is_monotonic_enough() {
        let clock = LiveClock::new();
        let a = clock.timestamp_ns();
        let b = clock.timestamp_ns();

        assert!(b >= a);
    }
}
