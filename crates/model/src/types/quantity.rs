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
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use super::{FIXED_PRECISION, FIXED_SCALAR};

/// Represents a quantity with a non-negative value and fixed precision.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Quantity {
    /// The raw fixed-point value.
    pub raw: u64,
    /// The display precision (decimal places).
    pub precision: u8,
}

impl Quantity {
    /// Creates a new [`Quantity`] from a floating-point value.
    ///
    /// # Panics
    ///
    /// Panics if `precision` exceeds [`FIXED_PRECISION`] or `value` is negative.
    #[must_use]
    pub fn new(value: f64, precision: u8) -> Self {
        assert!(
            precision <= FIXED_PRECISION,
            "`precision` exceeded maximum {FIXED_PRECISION}, was {precision}"
        );
        assert!(
            value.is_finite() && value >= 0.0,
            "`value` was invalid, was {value}"
        );

        let pow = 10_f64.powi(i32::from(FIXED_PRECISION - precision));
        let raw = ((value * FIXED_SCALAR / pow).round() * pow) as u64;
        Self { raw, precision }
    }

    /// Creates a new [`Quantity`] from a raw fixed-point value.
    #[must_use]
    pub const fn from_raw(raw: u64, precision: u8) -> Self {
        Self { raw, precision }
    }

    /// Creates a zero-valued [`Quantity`] with the given precision.
    #[must_use]
    pub const fn zero(precision: u8) -> Self {
        Self { raw: 0, precision }
    }

    /// Returns whether the quantity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Returns whether the quantity is positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.raw > 0
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

    /// Returns the saturating difference `self - other` at this precision.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self {
            raw: self.raw.saturating_sub(other.raw),
            precision: self.precision,
        }
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value)
            .map_err(|e| format!("cannot parse `Quantity` from '{value}': {e}"))?;
        if decimal.is_sign_negative() {
            return Err(format!("`Quantity` cannot be negative, was '{value}'"));
        }
        let precision = u8::try_from(decimal.scale())
            .ok()
            .filter(|p| *p <= FIXED_PRECISION)
            .ok_or_else(|| format!("precision exceeded maximum {FIXED_PRECISION} for '{value}'"))?;
        let raw = (decimal * Decimal::from(FIXED_SCALAR as i64))
            .to_u64()
            .ok_or_else(|| format!("value out of range for `Quantity`: '{value}'"))?;
        Ok(Self { raw, precision })
    }
}

impl From<&str> for Quantity {
    /// # Panics
    ///
    /// Panics if the value is not a valid non-negative decimal string.
    fn from(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self {
            raw: value * FIXED_SCALAR as u64,
            precision: 0,
        }
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw + rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw - rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.raw += rhs.raw;
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        self.raw -= rhs.raw;
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_quantity_from_integer() {
        let qty = Quantity::from(100_000_u64);

        assert_eq!(qty.precision, 0);
        assert_eq!(qty.as_f64(), 100_000.0);
        assert_eq!(qty.to_string(), "100000");
    }

    #[rstest]
    fn test_quantity_fill_bookkeeping() {
        let mut filled = Quantity::zero(0);
        let mut leaves = Quantity::from(10_u64);

        filled += Quantity::from(4_u64);
        leaves -= Quantity::from(4_u64);

        assert_eq!(filled, Quantity::from(4_u64));
        assert_eq!(leaves, Quantity::from(6_u64));
        assert!(leaves.is_positive());
    }

    #[rstest]
    fn test_quantity_saturating_sub() {
        let a = Quantity::from(1_u64);
        let b = Quantity::from(2_u64);

        assert!(a.saturating_sub(b).is_zero());
    }

    #[rstest]
    #[should_panic(expected = "cannot be negative")]
    fn test_quantity_negative_str_panics() {
        let _ = Quantity::from("-1");
    }
}
