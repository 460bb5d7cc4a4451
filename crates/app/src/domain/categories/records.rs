//! Category Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryRecord>;

/// Category Record
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRecord {
    pub uuid: CategoryUuid,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
