//! Storefront backend: catalog, pricing and the shopping-cart consistency engine.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;

pub mod uuids;
