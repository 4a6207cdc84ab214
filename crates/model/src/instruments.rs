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

//! Instrument definitions sufficient for trigger-instrument resolution.

use ferrum_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::InstrumentId,
    types::{Price, Quantity},
};

/// A tradable instrument definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// The instrument ID.
    pub id: InstrumentId,
    /// The price decimal precision.
    pub price_precision: u8,
    /// The minimum price increment (tick size).
    pub price_increment: Price,
    /// The size decimal precision.
    pub size_precision: u8,
    /// The minimum size increment.
    pub size_increment: Quantity,
    /// UNIX timestamp (nanoseconds) when the instance was created.
    pub ts_init: UnixNanos,
}

impl Instrument {
    /// Creates a new [`Instrument`] instance.
    #[must_use]
    pub const fn new(
        id: InstrumentId,
        price_precision: u8,
        price_increment: Price,
        size_precision: u8,
        size_increment: Quantity,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            id,
            price_precision,
            price_increment,
            size_precision,
            size_increment,
            ts_init,
        }
    }
}

/// A synthetic instrument with a value derived from component instruments.
///
/// Synthetic instruments exist only as trigger references: they carry a
/// price increment for their derived price stream but are never traded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticInstrument {
    /// The synthetic instrument ID (always on the `SYNTH` venue).
    pub id: InstrumentId,
    /// The price decimal precision.
    pub price_precision: u8,
    /// The minimum price increment for the derived price.
    pub price_increment: Price,
    /// The component instruments the price is derived from.
    pub components: Vec<InstrumentId>,
    /// The derivation formula over the component prices.
    pub formula: String,
    /// UNIX timestamp (nanoseconds) when the instance was created.
    pub ts_init: UnixNanos,
}

impl SyntheticInstrument {
    /// Creates a new [`SyntheticInstrument`] instance.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not on the synthetic venue.
    #[must_use]
    pub fn new(
        id: InstrumentId,
        price_precision: u8,
        price_increment: Price,
        components: Vec<InstrumentId>,
        formula: String,
        ts_init: UnixNanos,
    ) -> Self {
        assert!(
            id.is_synthetic(),
            "`id` must be on the synthetic venue, was {id}"
        );
        Self {
            id,
            price_precision,
            price_increment,
            components,
            formula,
            ts_init,
        }
    }
}

pub mod stubs {
    //! Instrument fixtures for testing.

    use super::*;

    /// An AUD/USD spot FX instrument on a simulated venue.
    #[must_use]
    pub fn audusd_sim() -> Instrument {
        Instrument::new(
            InstrumentId::from("AUD/USD.SIM"),
            5,
            Price::from("0.00001"),
            0,
            Quantity::from(1_u64),
            UnixNanos::default(),
        )
    }

    /// An ETHUSDT perpetual swap instrument.
    #[must_use]
    pub fn ethusdt_perp_binance() -> Instrument {
        Instrument::new(
            InstrumentId::from("ETHUSDT-PERP.BINANCE"),
            2,
            Price::from("0.01"),
            3,
            Quantity::from("0.001"),
            UnixNanos::default(),
        )
    }

    /// A two-legged synthetic spread over BTC and ETH perpetuals.
    #[must_use]
    pub fn btc_eth_synth() -> SyntheticInstrument {
        SyntheticInstrument::new(
            InstrumentId::from("BTC-ETH.SYNTH"),
            2,
            Price::from("0.01"),
            vec![
                InstrumentId::from("BTCUSDT-PERP.BINANCE"),
                InstrumentId::from("ETHUSDT-PERP.BINANCE"),
            ],
            "(BTCUSDT-PERP + ETHUSDT-PERP) / 2".to_string(),
            UnixNanos::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{stubs::*, *};

    #[rstest]
    fn test_instrument_stub_attributes() {
        let instrument = audusd_sim();

        assert_eq!(instrument.id, InstrumentId::from("AUD/USD.SIM"));
        assert_eq!(instrument.price_precision, 5);
        assert_eq!(instrument.price_increment, Price::from("0.00001"));
    }

    #[rstest]
    fn test_synthetic_stub_is_synthetic() {
        let synth = btc_eth_synth();

        assert!(synth.id.is_synthetic());
        assert_eq!(synth.components.len(), 2);
    }

    #[rstest]
    #[should_panic(expected = "must be on the synthetic venue")]
    fn test_synthetic_requires_synth_venue() {
        let _ = SyntheticInstrument::new(
            InstrumentId::from("ETHUSDT-PERP.BINANCE"),
            2,
            Price::from("0.01"),
            vec![],
            String::new(),
            UnixNanos::default(),
        );
    }
}
