//! Fees
//!
//! Tiered flat delivery-fee policy. The fee is not proportional to the
//! subtotal: a base rate applies, stepping up once for large orders.

use rusty_money::{Money, iso::Currency};

use crate::orders::OrderType;

/// Base delivery fee, in minor units (RM10.00).
pub const DELIVERY_FEE_BASE_MINOR: i64 = 1000;

/// Delivery fee for large orders, in minor units (RM15.00).
pub const DELIVERY_FEE_LARGE_ORDER_MINOR: i64 = 1500;

/// Subtotal at which the large-order fee applies, in minor units (RM200.00).
pub const LARGE_ORDER_THRESHOLD_MINOR: i64 = 20000;

/// Calculates the delivery fee for an order.
///
/// Zero unless the order type is [`OrderType::Delivery`]; the large-order fee
/// once the subtotal reaches the threshold, the base fee below it.
pub fn delivery_fee<'a>(
    order_type: OrderType,
    subtotal: &Money<'a, Currency>,
) -> Money<'a, Currency> {
    let currency = subtotal.currency();

    if order_type != OrderType::Delivery {
        return Money::from_minor(0, currency);
    }

    if subtotal.to_minor_units() >= LARGE_ORDER_THRESHOLD_MINOR {
        Money::from_minor(DELIVERY_FEE_LARGE_ORDER_MINOR, currency)
    } else {
        Money::from_minor(DELIVERY_FEE_BASE_MINOR, currency)
    }
}
