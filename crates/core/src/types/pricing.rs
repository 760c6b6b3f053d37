//! Exact price arithmetic.
//!
//! Prices are `rust_decimal::Decimal` end to end so DECIMAL(12,2) columns
//! round-trip without float drift.

use rust_decimal::Decimal;

/// Percentage discount implied by an original and a current price.
///
/// Computed as `(original - new) / original * 100`. Negative when the
/// current price exceeds the original (a markup). Returns `None` when
/// `original <= 0`, which callers must reject at the validation boundary.
#[must_use]
pub fn percentage_discount(original_price: Decimal, new_price: Decimal) -> Option<Decimal> {
    if original_price <= Decimal::ZERO {
        return None;
    }
    Some((original_price - new_price) / original_price * Decimal::ONE_HUNDRED)
}

/// Total price of an order: the product's current price times the
/// requested quantity, snapshotted at creation time.
#[must_use]
pub fn order_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_discount_exact() {
        // (100 - 75) / 100 * 100 = 25
        assert_eq!(
            percentage_discount(d("100"), d("75")),
            Some(d("25"))
        );
    }

    #[test]
    fn test_discount_fractional() {
        assert_eq!(percentage_discount(d("40"), d("30")), Some(d("25")));
        let repeating = percentage_discount(d("3"), d("2")).unwrap();
        assert_eq!(repeating.round_dp(4), d("33.3333"));
    }

    #[test]
    fn test_discount_negative_when_marked_up() {
        // new price above original yields a negative discount
        assert_eq!(percentage_discount(d("50"), d("60")), Some(d("-20")));
    }

    #[test]
    fn test_discount_rejects_nonpositive_original() {
        assert_eq!(percentage_discount(Decimal::ZERO, d("10")), None);
        assert_eq!(percentage_discount(d("-1"), d("10")), None);
    }

    #[test]
    fn test_order_total() {
        assert_eq!(order_total(d("19.99"), 2), d("39.98"));
        assert_eq!(order_total(d("5"), 0), Decimal::ZERO);
    }
}
