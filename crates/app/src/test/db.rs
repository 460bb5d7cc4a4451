//! Per-test Postgres databases inside one shared container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

use crate::database::MIGRATOR;

const PG_USER: &str = "storefront_test";
const PG_PASSWORD: &str = "storefront_test_password";

/// Postgres identifiers we are willing to splice into `CREATE`/`DROP DATABASE`.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("database name must be 1-63 characters long".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err("database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("database name may only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(PG_USER)
        .with_password(PG_PASSWORD)
        .with_db_name(PG_USER)
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

static DROP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_drop_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = drop_database(&db_name).await {
                eprintln!("Failed to drop test database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> Option<String> {
    let container = POSTGRES_CONTAINER.get()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;
    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    Some(format!(
        "postgresql://{PG_USER}:{PG_PASSWORD}@{host}:{port}/{database}"
    ))
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    if validate_database_name(db_name).is_err() {
        return Ok(());
    }

    if let Some(url) = server_url("postgres").await {
        let mut conn = PgConnection::connect(&url).await?;

        sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\""))
            .execute(&mut conn)
            .await?;

        conn.close().await?;
    }

    Ok(())
}

/// A freshly migrated database, dropped in the background once the value is.
///
/// Every test gets its own database, so services commit normally and no
/// state leaks between tests.
#[derive(Debug)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROP_SENDER.get() {
            drop(sender.send(self.name.clone()));
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let name = format!("storefront_test_{}", uuid::Uuid::now_v7().simple());

        DROP_SENDER.get_or_init(init_drop_task).await;
        POSTGRES_CONTAINER
            .get_or_init(init_postgres_container)
            .await;

        let admin_url = server_url("postgres")
            .await
            .expect("Failed to resolve container address");

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let database_url = server_url(&name)
            .await
            .expect("Failed to resolve container address");

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to create pool for database");

        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self { pool, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_valid() {
        let name = format!("storefront_test_{}", uuid::Uuid::now_v7().simple());

        assert!(validate_database_name(&name).is_ok());
    }

    #[test]
    fn unsafe_names_are_rejected() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("1st_db").is_err());
        assert!(validate_database_name("db\"; DROP TABLE carts; --").is_err());
        assert!(validate_database_name("has-hyphen").is_err());
    }

    #[tokio::test]
    async fn migrated_database_has_cart_tables() {
        let test_db = TestDb::new().await;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(&test_db.pool)
            .await
            .expect("Failed to query carts");

        assert_eq!(count, 0);
    }
}
