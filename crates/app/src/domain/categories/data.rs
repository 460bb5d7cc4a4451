//! Category Data

use crate::domain::{categories::records::CategoryUuid, paging::PageRequest};

/// Shortest accepted category name, in characters.
pub const MIN_CATEGORY_NAME_CHARS: usize = 5;

/// New Category Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub uuid: CategoryUuid,
    pub name: String,
}

/// Category Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub name: String,
}

/// Columns categories can be listed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySort {
    #[default]
    Name,
    CreatedAt,
}

impl CategorySort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }
}

pub type CategoryPageRequest = PageRequest<CategorySort>;

/// Whether `name` is long enough to be a category name.
#[must_use]
pub fn is_valid_category_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_CATEGORY_NAME_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_rejected() {
        assert!(!is_valid_category_name("Toys"));
        assert!(!is_valid_category_name("  ab  "));
    }

    #[test]
    fn five_characters_is_enough() {
        assert!(is_valid_category_name("Books"));
        assert!(is_valid_category_name("Électronique"));
    }
}
