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

//! Trailing stop price calculation.

use ferrum_model::{
    enums::{OrderSide, OrderType, TrailingOffsetType, TriggerType},
    orders::Order,
    types::Price,
};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Errors raised by trailing stop calculation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrailingStopError {
    #[error("insufficient market data to calculate trailing stop: no {0}")]
    InsufficientMarketData(&'static str),
    #[error("invalid order type for trailing stop calculation: {0}")]
    InvalidOrderType(OrderType),
    #[error("order has no trailing offset")]
    NoTrailingOffset,
    #[error("invalid order side: {0}")]
    InvalidOrderSide(OrderSide),
}

/// Calculates the updated `(trigger_price, price)` pair for a trailing stop
/// order against the given market prices.
///
/// Returns `(None, None)` when the market has not moved favorably enough for
/// any update. Each component is `Some` only when it improves on the order's
/// current value: a BUY trigger only ever ratchets down and a SELL trigger
/// only ever ratchets up.
///
/// # Errors
///
/// Returns an error if the order is not a trailing stop type, carries no
/// trailing offset, or the reference price required by its trigger mode is
/// unavailable.
pub fn trailing_stop_calculate(
    price_increment: Price,
    order: &Order,
    bid: Option<Price>,
    ask: Option<Price>,
    last: Option<Price>,
) -> Result<(Option<Price>, Option<Price>), TrailingStopError> {
    if !order.order_type.is_trailing() {
        return Err(TrailingStopError::InvalidOrderType(order.order_type));
    }
    let trailing_offset = order
        .trailing_offset
        .ok_or(TrailingStopError::NoTrailingOffset)?;

    // The reference price follows the order's emulation trigger mode
    let market = match order.emulation_trigger {
        TriggerType::LastTrade => {
            last.ok_or(TrailingStopError::InsufficientMarketData("last price"))?
        }
        _ => match order.side {
            OrderSide::Buy => ask.ok_or(TrailingStopError::InsufficientMarketData("ask price"))?,
            OrderSide::Sell => bid.ok_or(TrailingStopError::InsufficientMarketData("bid price"))?,
            OrderSide::NoOrderSide => {
                return Err(TrailingStopError::InvalidOrderSide(order.side));
            }
        },
    };

    let precision = price_increment.precision;
    let trigger_offset = offset_value(order, trailing_offset, market, price_increment, precision);
    let candidate_trigger = apply_offset(order.side, market, trigger_offset);
    let new_trigger_price = improves_trigger(order.side, order.trigger_price, candidate_trigger);

    let new_price = if order.order_type == OrderType::TrailingStopLimit {
        let limit_offset = order.limit_offset.unwrap_or(trailing_offset);
        let limit_offset = offset_value(order, limit_offset, market, price_increment, precision);
        let candidate_price = apply_offset(order.side, market, limit_offset);
        improves_trigger(order.side, order.price, candidate_price)
    } else {
        None
    };

    Ok((new_trigger_price, new_price))
}

fn offset_value(
    order: &Order,
    offset: Decimal,
    market: Price,
    price_increment: Price,
    precision: u8,
) -> Price {
    let offset = offset.to_f64().unwrap_or(0.0);
    match order.trailing_offset_type {
        TrailingOffsetType::Price | TrailingOffsetType::NoTrailingOffset => {
            Price::new(offset, precision)
        }
        TrailingOffsetType::BasisPoints => {
            Price::new(market.as_f64() * (offset / 10_000.0), precision)
        }
        TrailingOffsetType::Ticks => Price::new(offset * price_increment.as_f64(), precision),
    }
}

fn apply_offset(side: OrderSide, market: Price, offset: Price) -> Price {
    match side {
        // A BUY trails the market down: the trigger sits above the market
        OrderSide::Buy => market + offset,
        // A SELL trails the market up: the trigger sits below the market
        OrderSide::Sell => market - offset,
        OrderSide::NoOrderSide => panic!("invalid `OrderSide`, was {side}"),
    }
}

fn improves_trigger(side: OrderSide, current: Option<Price>, candidate: Price) -> Option<Price> {
    match current {
        None => Some(candidate),
        Some(current) => match side {
            OrderSide::Buy if candidate < current => Some(candidate),
            OrderSide::Sell if candidate > current => Some(candidate),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use ferrum_model::{
        enums::{OrderSide, OrderType, TriggerType},
        identifiers::InstrumentId,
        orders::OrderTestBuilder,
        types::Quantity,
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn trailing_order(
        order_type: OrderType,
        side: OrderSide,
        trigger_price: Option<Price>,
        trigger_mode: TriggerType,
    ) -> Order {
        let mut builder = OrderTestBuilder::new(order_type)
            .instrument_id(InstrumentId::from("ETHUSDT-PERP.BINANCE"))
            .side(side)
            .quantity(Quantity::from(1_u64))
            .trailing_offset(dec!(1.00))
            .trailing_offset_type(TrailingOffsetType::Price)
            .emulation_trigger(trigger_mode);
        if let Some(trigger_price) = trigger_price {
            builder = builder.trigger_price(trigger_price);
        }
        if order_type == OrderType::TrailingStopLimit {
            builder = builder.price(Price::from("5000.00")).limit_offset(dec!(0.50));
        }
        builder.build()
    }

    #[rstest]
    fn test_initial_trigger_set_from_market() {
        let order = trailing_order(
            OrderType::TrailingStopMarket,
            OrderSide::Sell,
            None,
            TriggerType::BidAsk,
        );

        let (new_trigger, new_price) = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("5000.00")),
            Some(Price::from("5001.00")),
            None,
        )
        .unwrap();

        assert_eq!(new_trigger, Some(Price::from("4999.00")));
        assert_eq!(new_price, None);
    }

    #[rstest]
    fn test_sell_trigger_ratchets_up_only() {
        let order = trailing_order(
            OrderType::TrailingStopMarket,
            OrderSide::Sell,
            Some(Price::from("4999.00")),
            TriggerType::BidAsk,
        );

        // Market moves up: trigger follows
        let (new_trigger, _) = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("5010.00")),
            Some(Price::from("5011.00")),
            None,
        )
        .unwrap();
        assert_eq!(new_trigger, Some(Price::from("5009.00")));

        // Market moves down: no update
        let (new_trigger, _) = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("4990.00")),
            Some(Price::from("4991.00")),
            None,
        )
        .unwrap();
        assert_eq!(new_trigger, None);
    }

    #[rstest]
    fn test_buy_trigger_ratchets_down_only() {
        let order = trailing_order(
            OrderType::TrailingStopMarket,
            OrderSide::Buy,
            Some(Price::from("5001.00")),
            TriggerType::BidAsk,
        );

        let (new_trigger, _) = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("4989.00")),
            Some(Price::from("4990.00")),
            None,
        )
        .unwrap();

        assert_eq!(new_trigger, Some(Price::from("4991.00")));
    }

    #[rstest]
    fn test_last_trade_mode_requires_last_price() {
        let order = trailing_order(
            OrderType::TrailingStopMarket,
            OrderSide::Sell,
            None,
            TriggerType::LastTrade,
        );

        let result = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("5000.00")),
            Some(Price::from("5001.00")),
            None,
        );

        assert_eq!(
            result,
            Err(TrailingStopError::InsufficientMarketData("last price"))
        );
    }

    #[rstest]
    fn test_missing_bid_ask_is_insufficient_data() {
        let order = trailing_order(
            OrderType::TrailingStopMarket,
            OrderSide::Sell,
            None,
            TriggerType::BidAsk,
        );

        let result = trailing_stop_calculate(Price::from("0.01"), &order, None, None, None);

        assert_eq!(
            result,
            Err(TrailingStopError::InsufficientMarketData("bid price"))
        );
    }

    #[rstest]
    fn test_trailing_stop_limit_updates_both_prices() {
        let order = trailing_order(
            OrderType::TrailingStopLimit,
            OrderSide::Sell,
            None,
            TriggerType::BidAsk,
        );
        let mut order = order;
        order.price = None; // No limit price yet

        let (new_trigger, new_price) = trailing_stop_calculate(
            Price::from("0.01"),
            &order,
            Some(Price::from("5000.00")),
            Some(Price::from("5001.00")),
            None,
        )
        .unwrap();

        assert_eq!(new_trigger, Some(Price::from("4999.00")));
        assert_eq!(new_price, Some(Price::from("4999.50")));
    }

    #[rstest]
    fn test_non_trailing_order_type_is_invalid() {
        let order = OrderTestBuilder::new(OrderType::StopMarket)
            .instrument_id(InstrumentId::from("ETHUSDT-PERP.BINANCE"))
            .side(OrderSide::Buy)
            .trigger_price(Price::from("5100.00"))
            .quantity(Quantity::from(1_u64))
            .build();

        let result = trailing_stop_calculate(Price::from("0.01"), &order, None, None, None);

        assert_eq!(
            result,
            Err(TrailingStopError::InvalidOrderType(OrderType::StopMarket))
        );
    }
}
