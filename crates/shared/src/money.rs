//! Money helpers for XOF amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of days a plan's monthly price is quoted for.
pub const BILLING_PERIOD_DAYS: i64 = 30;

/// Price owed for `days` of a plan priced per 30 days.
///
/// Rounded to the unit, halves away from zero.
pub fn prorated_price(monthly_price: Decimal, days: i64) -> Decimal {
    (monthly_price * Decimal::from(days) / Decimal::from(BILLING_PERIOD_DAYS))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_period_is_monthly_price() {
        assert_eq!(prorated_price(Decimal::from(5000), 30), Decimal::from(5000));
    }

    #[test]
    fn test_multiple_periods() {
        assert_eq!(prorated_price(Decimal::from(5000), 90), Decimal::from(15000));
    }

    #[test]
    fn test_partial_period_rounds() {
        // 5000 * 7 / 30 = 1166.66..
        assert_eq!(prorated_price(Decimal::from(5000), 7), Decimal::from(1167));
        // 1000 * 1 / 30 = 33.33..
        assert_eq!(prorated_price(Decimal::from(1000), 1), Decimal::from(33));
    }

    #[test]
    fn test_midpoint_rounds_up() {
        // 45 * 10 / 30 = 15, 3 * 5 / 30 = 0.5
        assert_eq!(prorated_price(Decimal::from(45), 10), Decimal::from(15));
        assert_eq!(prorated_price(Decimal::from(3), 5), Decimal::from(1));
    }

    #[test]
    fn test_decimal_price() {
        // 2500.50 * 30 / 30
        assert_eq!(
            prorated_price(Decimal::new(250050, 2), 30),
            Decimal::from(2501)
        );
    }
}
