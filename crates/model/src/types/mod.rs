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

//! Value types for the trading domain, backed by fixed-precision integers.

pub mod price;
pub mod quantity;

pub use price::Price;
pub use quantity::Quantity;

/// The maximum fixed-point precision for value types.
pub const FIXED_PRECISION: u8 = 9;

/// The scalar for converting between raw integers and floating-point values.
pub const FIXED_SCALAR: f64 = 1_000_000_000.0;
