//! Cart Data

use std::fmt;

use serde::Serialize;

use crate::domain::{
    carts::{errors::CartsServiceError, models::CartUuid},
    products::records::ProductUuid,
};

/// A requested product and quantity for a bulk cart replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn new(product_uuid: ProductUuid, quantity: u32) -> Self {
        Self {
            product_uuid,
            quantity,
        }
    }
}

/// Collapse lines for the same product into one, keeping first-seen order.
///
/// # Errors
///
/// Returns [`CartsServiceError::InvalidQuantity`] if any line has a zero
/// quantity or a merged quantity overflows.
pub fn merge_lines(lines: Vec<CartLine>) -> Result<Vec<CartLine>, CartsServiceError> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());

    for line in lines {
        if line.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        match merged
            .iter_mut()
            .find(|existing| existing.product_uuid == line.product_uuid)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CartsServiceError::InvalidQuantity)?;
            }
            None => merged.push(line),
        }
    }

    Ok(merged)
}

/// Confirmation returned after an item is taken out of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedCartItem {
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
}

impl fmt::Display for RemovedCartItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Product {} removed from the cart", self.product_name)
    }
}
