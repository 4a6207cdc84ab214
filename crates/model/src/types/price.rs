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
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use super::{FIXED_PRECISION, FIXED_SCALAR};

/// Represents a price in a market, with a fixed precision.
///
/// The raw value is the price scaled by `10^FIXED_PRECISION`, so comparisons
/// and trigger arithmetic are exact integer operations regardless of the
/// display precision.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Price {
    /// The raw fixed-point value.
    pub raw: i64,
    /// The display precision (decimal places).
    pub precision: u8,
}

impl Price {
    /// Creates a new [`Price`] from a floating-point value.
    ///
    /// # Panics
    ///
    /// Panics if `precision` exceeds [`FIXED_PRECISION`] or `value` is not finite.
    #[must_use]
    pub fn new(value: f64, precision: u8) -> Self {
        assert!(
            precision <= FIXED_PRECISION,
            "`precision` exceeded maximum {FIXED_PRECISION}, was {precision}"
        );
        assert!(value.is_finite(), "`value` was not finite, was {value}");

        let pow = 10_f64.powi(i32::from(FIXED_PRECISION - precision));
        let raw = ((value * FIXED_SCALAR / pow).round() * pow) as i64;
        Self { raw, precision }
    }

    /// Creates a new [`Price`] from a raw fixed-point value.
    #[must_use]
    pub const fn from_raw(raw: i64, precision: u8) -> Self {
        Self { raw, precision }
    }

    /// Creates a zero-valued [`Price`] with the given precision.
    #[must_use]
    pub const fn zero(precision: u8) -> Self {
        Self { raw: 0, precision }
    }

    /// Returns whether the price is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns the value as `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR
    }

    /// Returns the value as a `Decimal`.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.raw), u32::from(FIXED_PRECISION))
            .normalize()
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value)
            .map_err(|e| format!("cannot parse `Price` from '{value}': {e}"))?;
        let precision = u8::try_from(decimal.scale())
            .ok()
            .filter(|p| *p <= FIXED_PRECISION)
            .ok_or_else(|| format!("precision exceeded maximum {FIXED_PRECISION} for '{value}'"))?;
        let raw = (decimal * Decimal::from(FIXED_SCALAR as i64))
            .to_i64()
            .ok_or_else(|| format!("value out of range for `Price`: '{value}'"))?;
        Ok(Self { raw, precision })
    }
}

impl From<&str> for Price {
    /// # Panics
    ///
    /// Panics if the value is not a valid decimal string.
    fn from(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw + rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw - rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Neg for Price {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            raw: -self.raw,
            precision: self.precision,
        }
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_price_from_str_precision_and_raw() {
        let price = Price::from("1.00050");

        assert_eq!(price.precision, 5);
        assert_eq!(price.raw, 1_000_500_000);
        assert_eq!(price.to_string(), "1.00050");
    }

    #[rstest]
    fn test_price_raw_ordering() {
        let low = Price::from("100.90");
        let high = Price::from("101.10");

        assert!(low < high);
        assert_eq!(low.max(high), high);
        // Differing precision, equal raw value
        assert_eq!(Price::from("101.1"), Price::from("101.100"));
    }

    #[rstest]
    fn test_price_arithmetic() {
        let a = Price::from("100.00");
        let b = Price::from("0.25");

        assert_eq!(a + b, Price::from("100.25"));
        assert_eq!(a - b, Price::from("99.75"));
        assert_eq!((-b).raw, -250_000_000);
    }

    #[rstest]
    fn test_price_as_decimal() {
        let price = Price::from("5070.25");

        assert_eq!(price.as_decimal(), dec!(5070.25));
    }

    #[rstest]
    #[should_panic(expected = "cannot parse `Price`")]
    fn test_price_from_invalid_str_panics() {
        let _ = Price::from("not-a-price");
    }
}
