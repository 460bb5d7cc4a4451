//! Database connection management

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    migrate::MigrateError,
    postgres::{PgPoolOptions, PgRow},
};

/// Schema migrations shipped with the crate.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin the transaction that bounds a single service call.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or `BEGIN` fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply any pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Read a non-negative `BIGINT` column (prices, stock, totals) as `u64`.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount: i64 = row.try_get(col)?;

    to_u64(amount, col)
}

pub(crate) fn to_u64(value: i64, col: &str) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert an amount for binding into a `BIGINT` parameter.
pub(crate) fn to_i64(value: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a non-negative `BIGINT` quantity column as `u32`.
pub(crate) fn try_get_quantity(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let quantity: i64 = row.try_get(col)?;

    u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a `SMALLINT` percentage column as `u16`.
pub(crate) fn try_get_percent(row: &PgRow, col: &str) -> Result<u16, sqlx::Error> {
    let percent: i16 = row.try_get(col)?;

    u16::try_from(percent).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn to_i16(value: u16, col: &str) -> Result<i16, sqlx::Error> {
    i16::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
