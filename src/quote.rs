//! Quote
//!
//! Deterministic price breakdown for a cart: subtotal, delivery fee, voucher
//! discount, tax and grand total.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    fees::delivery_fee,
    orders::OrderType,
    pricing::{PricingError, clamp_non_negative, percent_of_minor},
    vouchers::Voucher,
};

/// Tax policy for a checkout flow.
///
/// Different flows charge different rates; the caller picks the one that
/// matches its flow rather than the engine hard-coding a single policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxRate(Percentage);

impl TaxRate {
    /// No tax (fee-only flows).
    pub fn none() -> Self {
        Self(Percentage::from(Decimal::ZERO))
    }

    /// 6% service tax.
    pub fn service() -> Self {
        Self(Percentage::from(Decimal::new(6, 2)))
    }

    /// 7% sales tax.
    pub fn sales() -> Self {
        Self(Percentage::from(Decimal::new(7, 2)))
    }

    /// A custom rate, as a fraction.
    pub fn new(rate: Percentage) -> Self {
        Self(rate)
    }

    /// The rate as a decimal fraction (e.g. 0.07).
    pub fn as_fraction(&self) -> Decimal {
        self.0 * Decimal::ONE
    }

    /// The rate as a percentage.
    pub fn percentage(&self) -> Percentage {
        self.0
    }
}

/// Price breakdown for a cart at a given order type and voucher selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote<'a> {
    subtotal: Money<'a, Currency>,
    delivery_fee: Money<'a, Currency>,
    fee_waived: bool,
    discount: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> Quote<'a> {
    /// Sum of line totals before fees, tax or discount.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Delivery fee after any voucher waiver.
    #[must_use]
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Whether a voucher waived an otherwise non-zero delivery fee.
    #[must_use]
    pub fn fee_waived(&self) -> bool {
        self.fee_waived
    }

    /// Voucher discount taken off the order.
    #[must_use]
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Tax charged on the subtotal.
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Grand total; never negative.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Compute the price breakdown for a cart.
///
/// The voucher, if given, is applied as selected; callers are responsible for
/// re-validating eligibility when the cart has changed since selection.
///
/// # Errors
///
/// Returns a [`PricingError`] if there was a money arithmetic, overflow or
/// percentage conversion error.
pub fn quote<'a>(
    cart: &'a Cart<'a>,
    order_type: OrderType,
    voucher: Option<&Voucher<'a>>,
    tax_rate: TaxRate,
) -> Result<Quote<'a>, PricingError> {
    let currency = cart.currency();
    let subtotal = cart.subtotal()?;

    let raw_fee = delivery_fee(order_type, &subtotal);

    let (fee, discount) = match voucher {
        Some(voucher) => {
            let application = voucher.apply(order_type, &subtotal, raw_fee)?;
            (application.delivery_fee, application.discount)
        }
        None => (raw_fee, Money::from_minor(0, currency)),
    };

    let tax_minor = percent_of_minor(tax_rate.percentage(), subtotal.to_minor_units())?;
    let tax = Money::from_minor(tax_minor, currency);

    let total = clamp_non_negative(subtotal.add(fee)?.add(tax)?.sub(discount)?);

    Ok(Quote {
        subtotal,
        delivery_fee: fee,
        fee_waived: raw_fee.to_minor_units() > 0 && fee.to_minor_units() == 0,
        discount,
        tax,
        total,
        currency,
    })
}
