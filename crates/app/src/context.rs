//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    config::DatabaseConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        categories::{CategoriesService, PgCategoriesService},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("no database URL configured (set DATABASE_URL or pass --database-url)")]
    MissingDatabaseUrl,

    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub pool: PgPool,
    pub categories: Arc<dyn CategoriesService>,
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
}

impl AppContext {
    /// Build application context from database settings.
    ///
    /// # Errors
    ///
    /// Returns an error when no URL is configured or connecting fails.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, AppInitError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(AppInitError::MissingDatabaseUrl)?;

        let pool = database::connect(url, config.max_connections)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool))
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        let db = Db::new(pool.clone());

        Self {
            pool,
            categories: Arc::new(PgCategoriesService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db)),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
