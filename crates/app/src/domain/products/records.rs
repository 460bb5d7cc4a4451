//! Product Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{domain::categories::records::CategoryUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub category_uuid: CategoryUuid,
    pub name: String,
    pub description: String,

    /// Units in stock.
    pub quantity: u32,

    /// Base price in minor units.
    pub price: u64,

    /// Whole-percent discount, `0..=100`.
    pub discount: u16,

    /// `price` after `discount`, in minor units.
    pub special_price: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}
