//! Pricing
//!
//! Shared minor-unit arithmetic for carts, fees, vouchers and tax. Derived
//! amounts are rounded half-up only at the point they are produced, never at
//! intermediate steps.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur during price arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No cart lines were provided, so currency could not be determined.
    #[error("no cart lines provided; cannot determine currency")]
    NoLines,

    /// A line total or running total overflowed the minor-unit range.
    #[error("amount overflowed the representable minor-unit range")]
    AmountOverflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total price of a single cart line (unit price × quantity).
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the multiplication overflows.
pub fn line_total<'a>(line: &CartLine<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let minor = line
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Money::from_minor(minor, line.unit_price().currency()))
}

/// Calculates the subtotal of a list of cart lines.
///
/// # Errors
///
/// - [`PricingError::NoLines`]: No lines were provided, so currency could not be determined.
/// - [`PricingError::AmountOverflow`]: A line total overflowed.
/// - [`PricingError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn subtotal<'a>(lines: &[CartLine<'a>]) -> Result<Money<'a, Currency>, PricingError> {
    let first = lines.first().ok_or(PricingError::NoLines)?;

    lines.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, line| Ok(acc.add(line_total(line)?)?),
    )
}

/// Calculates a percentage of a minor-unit amount, rounded half-up.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the product cannot be
/// represented or converted back to minor units.
pub fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    (percent * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Clamps a money amount at zero; totals are never negative.
pub fn clamp_non_negative<'a>(amount: Money<'a, Currency>) -> Money<'a, Currency> {
    if amount.to_minor_units() < 0 {
        Money::from_minor(0, amount.currency())
    } else {
        amount
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::MYR;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::menu::MenuItemKey;

    use super::*;

    fn key() -> MenuItemKey {
        let mut keys = SlotMap::<MenuItemKey, ()>::with_key();
        keys.insert(())
    }

    #[test]
    fn line_total_multiplies_by_quantity() -> TestResult {
        let line = CartLine::new(key(), Money::from_minor(3800, MYR), 2);

        assert_eq!(line_total(&line)?, Money::from_minor(7600, MYR));

        Ok(())
    }

    #[test]
    fn line_total_overflow_errors() {
        let line = CartLine::new(key(), Money::from_minor(i64::MAX, MYR), 2);

        assert_eq!(line_total(&line), Err(PricingError::AmountOverflow));
    }

    #[test]
    fn subtotal_sums_line_totals() -> TestResult {
        let lines = [
            CartLine::new(key(), Money::from_minor(3800, MYR), 2),
            CartLine::new(key(), Money::from_minor(4200, MYR), 1),
        ];

        assert_eq!(subtotal(&lines)?, Money::from_minor(11800, MYR));

        Ok(())
    }

    #[test]
    fn subtotal_empty_errors() {
        let lines: [CartLine<'static>; 0] = [];

        assert!(matches!(subtotal(&lines), Err(PricingError::NoLines)));
    }

    #[test]
    fn percent_of_minor_rounds_half_up() -> TestResult {
        // 6% of RM1.25 = 7.5 sen, rounds up to 8.
        let rate = Percentage::from(Decimal::new(6, 2));

        assert_eq!(percent_of_minor(rate, 125)?, 8);

        Ok(())
    }

    #[test]
    fn percent_of_minor_exact_amounts() -> TestResult {
        // 7% of RM118.00.
        let rate = Percentage::from(Decimal::new(7, 2));

        assert_eq!(percent_of_minor(rate, 11800)?, 826);

        Ok(())
    }

    #[test]
    fn clamp_non_negative_floors_at_zero() {
        let negative = Money::from_minor(-500, MYR);
        let positive = Money::from_minor(500, MYR);

        assert_eq!(clamp_non_negative(negative), Money::from_minor(0, MYR));
        assert_eq!(clamp_non_negative(positive), Money::from_minor(500, MYR));
    }
}
