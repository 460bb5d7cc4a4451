//! Cart Models

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{products::records::ProductUuid, users::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Cart Model
///
/// One per user, created on first use. `total_price` always equals the sum
/// of `quantity * unit_price` over `items` once a mutation has completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,

    /// Total in minor units.
    pub total_price: u64,

    /// Optimistic concurrency token, bumped on every persisted change.
    #[serde(skip)]
    pub version: i64,

    /// Items in the order they were first added.
    pub items: Vec<CartItem>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u32,

    /// Discount percent captured with `unit_price`.
    pub discount: u16,

    /// Locked unit price in minor units.
    pub unit_price: u64,
}
