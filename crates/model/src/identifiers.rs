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

//! Identifiers for the trading domain, backed by interned strings.

use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// The venue string designating a synthetic instrument.
pub const SYNTHETIC_VENUE: &str = "SYNTH";

macro_rules! impl_identifier {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[repr(transparent)]
        #[derive(
            Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(Ustr);

        impl $name {
            /// Creates a new identifier from the given value.
            #[must_use]
            pub fn new<T: AsRef<str>>(value: T) -> Self {
                Self(Ustr::from(value.as_ref()))
            }

            /// Returns the inner interned string.
            #[must_use]
            pub const fn inner(&self) -> Ustr {
                self.0
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<Ustr> for $name {
            fn from(value: Ustr) -> Self {
                Self(value)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_identifier!(TraderId, "A valid trader ID.");
impl_identifier!(StrategyId, "A valid strategy ID.");
impl_identifier!(ClientId, "A valid client ID for an execution client.");
impl_identifier!(ClientOrderId, "A valid client order ID.");
impl_identifier!(VenueOrderId, "A valid venue-assigned order ID.");
impl_identifier!(AccountId, "A valid account ID.");
impl_identifier!(PositionId, "A valid position ID.");
impl_identifier!(OrderListId, "A valid order list ID.");
impl_identifier!(ExecAlgorithmId, "A valid execution algorithm ID.");
impl_identifier!(TradeId, "A valid trade match ID.");
impl_identifier!(ActorId, "A valid actor ID for a system component.");
impl_identifier!(Symbol, "A valid ticker symbol.");

/// A valid trading venue ID.
#[repr(transparent)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Venue(Ustr);

impl Venue {
    /// Creates a new [`Venue`] instance.
    #[must_use]
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self(Ustr::from(value.as_ref()))
    }

    /// Returns the venue designating synthetic instruments.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(SYNTHETIC_VENUE)
    }

    /// Returns whether this is the synthetic instrument venue.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.0.as_str() == SYNTHETIC_VENUE
    }

    /// Returns the venue as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Venue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Debug for Venue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Venue({})", self.0)
    }
}

impl Display for Venue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A valid instrument ID, composed of a symbol and a venue.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId {
    /// The instruments ticker symbol.
    pub symbol: Symbol,
    /// The instruments trading venue.
    pub venue: Venue,
}

impl InstrumentId {
    /// Creates a new [`InstrumentId`] instance.
    #[must_use]
    pub const fn new(symbol: Symbol, venue: Venue) -> Self {
        Self { symbol, venue }
    }

    /// Returns whether the instrument is synthetic (has the `SYNTH` venue).
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.venue.is_synthetic()
    }
}

impl From<&str> for InstrumentId {
    /// Parses an instrument ID from a `{symbol}.{venue}` string.
    ///
    /// # Panics
    ///
    /// Panics if the value contains no `.` separator.
    fn from(value: &str) -> Self {
        let (symbol, venue) = value
            .rsplit_once('.')
            .unwrap_or_else(|| panic!("invalid `InstrumentId` value, was '{value}'"));
        Self::new(Symbol::new(symbol), Venue::new(venue))
    }
}

impl Debug for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstrumentId({}.{})", self.symbol, self.venue)
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.symbol, self.venue)
    }
}
