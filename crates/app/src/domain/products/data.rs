//! Products Data

use crate::domain::{paging::PageRequest, products::records::ProductUuid};

/// Shortest accepted product name, in characters.
pub const MIN_PRODUCT_NAME_CHARS: usize = 3;

/// Shortest accepted product description, in characters.
pub const MIN_PRODUCT_DESCRIPTION_CHARS: usize = 6;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub price: u64,
    pub discount: u16,
}

/// Product Update Data
///
/// Replaces every editable field; the special price is always recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub price: u64,
    pub discount: u16,
}

/// Columns products can be listed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    SpecialPrice,
    CreatedAt,
}

impl ProductSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::SpecialPrice => "p.special_price",
            Self::CreatedAt => "p.created_at",
        }
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name.
    pub keyword: Option<String>,

    /// Exact category name.
    pub category: Option<String>,

    pub page: PageRequest<ProductSort>,
}

impl ProductQuery {
    /// The keyword as a lower-cased `LIKE` pattern with wildcards escaped.
    #[must_use]
    pub fn keyword_pattern(&self) -> Option<String> {
        let keyword = self.keyword.as_deref()?.trim();

        if keyword.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(keyword.len() + 2);

        pattern.push('%');

        for ch in keyword.to_lowercase().chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }

            pattern.push(ch);
        }

        pattern.push('%');

        Some(pattern)
    }

    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().filter(|name| !name.is_empty())
    }
}

/// Whether a name/description pair meets the catalog's minimum lengths.
#[must_use]
pub fn has_valid_details(name: &str, description: &str) -> bool {
    name.trim().chars().count() >= MIN_PRODUCT_NAME_CHARS
        && description.trim().chars().count() >= MIN_PRODUCT_DESCRIPTION_CHARS
}

#[cfg(test)]
mod tests {
    use crate::domain::paging::SortOrder;

    use super::*;

    fn query(keyword: Option<&str>, category: Option<&str>) -> ProductQuery {
        ProductQuery {
            keyword: keyword.map(str::to_string),
            category: category.map(str::to_string),
            page: PageRequest {
                page_number: 0,
                page_size: 20,
                sort_by: ProductSort::Name,
                sort_order: SortOrder::Asc,
            },
        }
    }

    #[test]
    fn keyword_becomes_lowercase_substring_pattern() {
        assert_eq!(
            query(Some("Lamp"), None).keyword_pattern().as_deref(),
            Some("%lamp%")
        );
    }

    #[test]
    fn like_wildcards_in_keyword_are_escaped() {
        assert_eq!(
            query(Some("50%_off"), None).keyword_pattern().as_deref(),
            Some("%50\\%\\_off%")
        );
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = query(Some("   "), Some(""));

        assert_eq!(query.keyword_pattern(), None);
        assert_eq!(query.category_name(), None);
    }

    #[test]
    fn details_require_minimum_lengths() {
        assert!(has_valid_details("Mug", "Stoneware"));
        assert!(!has_valid_details("Mu", "Stoneware"));
        assert!(!has_valid_details("Mug", "Short"));
    }
}
