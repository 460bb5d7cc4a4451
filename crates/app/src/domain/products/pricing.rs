//! Product Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Largest discount a product may carry, in percent.
pub const MAX_DISCOUNT_PERCENT: u16 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("discount of {0}% is outside 0..=100")]
    DiscountOutOfRange(u16),

    #[error("price calculation overflowed")]
    Overflow,
}

/// Price after applying a whole-percent discount.
///
/// The discount amount is rounded half away from zero to the nearest minor
/// unit before it is subtracted, so `special_price(999, 50)` is `499`.
///
/// # Errors
///
/// Returns [`PricingError::DiscountOutOfRange`] for a discount above 100%.
pub fn special_price(price: u64, discount: u16) -> Result<u64, PricingError> {
    if discount > MAX_DISCOUNT_PERCENT {
        return Err(PricingError::DiscountOutOfRange(discount));
    }

    let reduction = Decimal::from(price)
        .checked_mul(Decimal::from(discount))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(PricingError::Overflow)?;

    price.checked_sub(reduction).ok_or(PricingError::Overflow)
}
