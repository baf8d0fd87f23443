//! Supply-driven repricing.
//!
//! After a trade executes, the seller's offer is re-listed at a price that
//! reflects how much of the product's total supply the trade consumed.
//! Buying a small slice of a deep book barely moves the price; buying the
//! last units doubles it.

use crate::config::MIN_LISTED_PRICE;

/// Compute the new listed price after a trade.
///
/// * `execution_price` - the listed price the trade executed at
/// * `bought` - units bought in this trade
/// * `remaining` - units left across all of the product's offers after the trade
pub fn reprice(execution_price: f64, bought: u32, remaining: u32) -> f64 {
    if bought == 0 {
        return round_to_cents(execution_price.max(MIN_LISTED_PRICE));
    }

    let total = u64::from(bought) + u64::from(remaining);
    let pressure = f64::from(bought) / total as f64;
    let raw = execution_price * (1.0 + pressure);
    round_to_cents(raw.max(MIN_LISTED_PRICE))
}

fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_trade_barely_moves_price() {
        // 1 of 100 remaining after the trade
        let new_price = reprice(10.0, 1, 99);
        assert_eq!(new_price, 10.1);
    }

    #[test]
    fn test_buying_half_the_supply() {
        let new_price = reprice(10.0, 50, 50);
        assert_eq!(new_price, 15.0);
    }

    #[test]
    fn test_buying_out_the_supply_doubles_price() {
        let new_price = reprice(10.0, 5, 0);
        assert_eq!(new_price, 20.0);
    }

    #[test]
    fn test_price_floor() {
        let new_price = reprice(0.0, 3, 7);
        assert_eq!(new_price, MIN_LISTED_PRICE);
    }

    #[test]
    fn test_rounding_to_cents() {
        let new_price = reprice(9.99, 1, 2);
        // 9.99 * (1 + 1/3) = 13.32
        assert_eq!(new_price, 13.32);
    }

    #[test]
    fn test_zero_bought_keeps_price() {
        assert_eq!(reprice(12.34, 0, 10), 12.34);
    }

    #[test]
    fn test_large_supply_does_not_overflow() {
        // bought + remaining exceeds u32::MAX; pressure is exactly 1/2
        assert_eq!(reprice(10.0, u32::MAX, u32::MAX), 15.0);
    }
}
