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

//! Enumerations for the trading domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The side for an order.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// No order side is specified.
    #[default]
    NoOrderSide = 0,
    /// The order is a BUY.
    Buy = 1,
    /// The order is a SELL.
    Sell = 2,
}

impl OrderSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
            Self::NoOrderSide => Self::NoOrderSide,
        }
    }
}

/// The type for an order.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market = 1,
    Limit = 2,
    StopMarket = 3,
    StopLimit = 4,
    MarketIfTouched = 5,
    LimitIfTouched = 6,
    TrailingStopMarket = 7,
    TrailingStopLimit = 8,
}

impl OrderType {
    /// Returns whether the order type carries a trailing offset.
    #[must_use]
    pub const fn is_trailing(&self) -> bool {
        matches!(self, Self::TrailingStopMarket | Self::TrailingStopLimit)
    }
}

/// The status for an order.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Initialized = 1,
    Denied = 2,
    Emulated = 3,
    Released = 4,
    Submitted = 5,
    Accepted = 6,
    Rejected = 7,
    Canceled = 8,
    Expired = 9,
    Triggered = 10,
    PendingUpdate = 11,
    PendingCancel = 12,
    PartiallyFilled = 13,
    Filled = 14,
}

/// The time in force for an order.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-till-canceled.
    #[default]
    Gtc = 1,
    /// Good-till-date, expires at the order's `expire_time`.
    Gtd = 2,
    /// Immediate-or-cancel.
    Ioc = 3,
    /// Fill-or-kill.
    Fok = 4,
    /// Good for the trading session.
    Day = 5,
}

/// The type of price trigger for an order.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    /// No trigger type is assigned (the order is not emulated).
    #[default]
    NoTrigger = 0,
    /// The default trigger type for the venue (treated as bid/ask).
    Default = 1,
    /// Triggered against the top-of-book bid and ask.
    BidAsk = 2,
    /// Triggered against the last traded price.
    LastTrade = 3,
    /// Triggered against two consecutive last traded prices.
    DoubleLast = 4,
    /// Triggered against two consecutive bid/ask prices.
    DoubleBidAsk = 5,
    /// Triggered against an index price.
    IndexPrice = 6,
    /// Triggered against the mark price.
    MarkPrice = 7,
    /// Triggered against the mid-point price.
    MidPoint = 8,
}

/// The contingency relationship between linked orders.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ContingencyType {
    /// The order has no contingency.
    #[default]
    NoContingency = 0,
    /// One-Triggers-Other: filling the primary arms the linked orders.
    Oto = 1,
    /// One-Cancels-Others: filling any leg cancels the others.
    Oco = 2,
    /// One-Updates-Others: quantity changes propagate to the others.
    Ouo = 3,
}

/// The unit for a trailing stop offset.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrailingOffsetType {
    /// No trailing offset type is assigned.
    #[default]
    NoTrailingOffset = 0,
    /// The offset is an absolute price amount.
    Price = 1,
    /// The offset is in basis points of the market price.
    BasisPoints = 2,
    /// The offset is a number of price increments.
    Ticks = 3,
}

/// The aggressor side for a trade.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AggressorSide {
    /// There was no specific aggressor for the trade.
    #[default]
    NoAggressor = 0,
    /// The BUY order was the aggressor.
    Buyer = 1,
    /// The SELL order was the aggressor.
    Seller = 2,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(OrderSide::Buy, OrderSide::Sell)]
    #[case(OrderSide::Sell, OrderSide::Buy)]
    #[case(OrderSide::NoOrderSide, OrderSide::NoOrderSide)]
    fn test_order_side_opposite(#[case] side: OrderSide, #[case] expected: OrderSide) {
        assert_eq!(side.opposite(), expected);
    }

    #[rstest]
    fn test_enum_round_trip_strings() {
        assert_eq!(OrderType::StopMarket.to_string(), "STOP_MARKET");
        assert_eq!(
            OrderType::from_str("TRAILING_STOP_LIMIT").unwrap(),
            OrderType::TrailingStopLimit
        );
        assert_eq!(TriggerType::LastTrade.to_string(), "LAST_TRADE");
        assert_eq!(
            ContingencyType::from_str("OCO").unwrap(),
            ContingencyType::Oco
        );
    }

    #[rstest]
    fn test_order_type_is_trailing() {
        assert!(OrderType::TrailingStopMarket.is_trailing());
        assert!(OrderType::TrailingStopLimit.is_trailing());
        assert!(!OrderType::StopMarket.is_trailing());
    }
}
