//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow, query, query_as,
    query_scalar,
};

use crate::{
    database::{to_i16, to_i64, to_u64, try_get_amount, try_get_percent, try_get_quantity},
    domain::{
        categories::records::CategoryUuid,
        products::{
            data::{NewProduct, ProductQuery, ProductUpdate},
            records::{ProductRecord, ProductUuid},
        },
    },
};

const PRODUCT_COLUMNS_SQL: &str = include_str!("sql/product_columns.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CATEGORY_EXISTS_SQL: &str = include_str!("sql/category_exists.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductQuery,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_COLUMNS_SQL);

        push_filters(&mut builder, filter);

        builder
            .push(" ORDER BY ")
            .push(filter.page.sort_by.column())
            .push(" ")
            .push(filter.page.sort_order.as_sql())
            .push(", p.uuid LIMIT ")
            .push_bind(i64::from(filter.page.limit()))
            .push(" OFFSET ")
            .push_bind(to_i64(filter.page.offset(), "offset")?);

        builder
            .build_query_as::<ProductRecord>()
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductQuery,
    ) -> Result<u64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(COUNT_PRODUCTS_SQL);

        push_filters(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&mut **tx)
            .await?;

        to_u64(count, "count")
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn category_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(CATEGORY_EXISTS_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        product: NewProduct,
        special_price: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(category.into_uuid())
            .bind(product.name)
            .bind(product.description)
            .bind(i64::from(product.quantity))
            .bind(to_i64(product.price, "price")?)
            .bind(to_i16(product.discount, "discount")?)
            .bind(to_i64(special_price, "special_price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: ProductUpdate,
        special_price: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.name)
            .bind(update.description)
            .bind(i64::from(update.quantity))
            .bind(to_i64(update.price, "price")?)
            .bind(to_i16(update.discount, "discount")?)
            .bind(to_i64(special_price, "special_price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductQuery) {
    if let Some(pattern) = filter.keyword_pattern() {
        builder
            .push(" AND lower(p.name) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
    }

    if let Some(category) = filter.category_name() {
        builder.push(" AND c.name = ").push_bind(category.to_string());
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            category_uuid: CategoryUuid::from_uuid(row.try_get("category_uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            quantity: try_get_quantity(row, "quantity")?,
            price: try_get_amount(row, "price")?,
            discount: try_get_percent(row, "discount")?,
            special_price: try_get_amount(row, "special_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
