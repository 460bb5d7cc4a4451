//! Categories Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow, query, query_as,
    query_scalar,
};

use crate::{
    database::{to_i64, to_u64},
    domain::categories::{
        data::{CategoryPageRequest, NewCategory},
        records::{CategoryRecord, CategoryUuid},
    },
};

const LIST_CATEGORIES_SQL: &str = include_str!("sql/list_categories.sql");
const COUNT_CATEGORIES_SQL: &str = include_str!("sql/count_categories.sql");
const GET_CATEGORY_SQL: &str = include_str!("sql/get_category.sql");
const CREATE_CATEGORY_SQL: &str = include_str!("sql/create_category.sql");
const UPDATE_CATEGORY_SQL: &str = include_str!("sql/update_category.sql");
const COUNT_LIVE_PRODUCTS_SQL: &str = include_str!("sql/count_live_products.sql");
const DELETE_CATEGORY_SQL: &str = include_str!("sql/delete_category.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &CategoryPageRequest,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(LIST_CATEGORIES_SQL);

        builder
            .push(" ORDER BY ")
            .push(page.sort_by.column())
            .push(" ")
            .push(page.sort_order.as_sql())
            .push(", uuid LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(to_i64(page.offset(), "offset")?);

        builder
            .build_query_as::<CategoryRecord>()
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_CATEGORIES_SQL)
            .fetch_one(&mut **tx)
            .await?;

        to_u64(count, "count")
    }

    pub(crate) async fn get_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_CATEGORY_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: NewCategory,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(CREATE_CATEGORY_SQL)
            .bind(category.uuid.into_uuid())
            .bind(category.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        name: &str,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(UPDATE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn count_live_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_LIVE_PRODUCTS_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        to_u64(count, "count")
    }

    pub(crate) async fn delete_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
