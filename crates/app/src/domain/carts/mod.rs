//! Carts

pub mod data;
pub mod engine;
pub mod errors;
pub mod models;
mod repositories;
pub mod service;
pub(crate) mod store;

pub use errors::CartsServiceError;
pub use service::*;
