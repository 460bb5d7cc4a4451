//! Storefront Domain Concerns

pub mod carts;
pub mod categories;
pub mod paging;
pub mod products;
pub mod users;
