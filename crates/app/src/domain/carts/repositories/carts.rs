//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_amount},
    domain::{
        carts::models::{Cart, CartUuid},
        products::records::ProductUuid,
        users::UserUuid,
    },
};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const GET_USER_CART_SQL: &str = include_str!("../sql/get_user_cart.sql");
const LIST_CARTS_SQL: &str = include_str!("../sql/list_carts.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const UPDATE_CART_TOTAL_SQL: &str = include_str!("../sql/update_cart_total.sql");
const CARTS_WITH_PRODUCT_SQL: &str = include_str!("../sql/carts_with_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<Cart>, sqlx::Error> {
        query_as::<Postgres, Cart>(GET_USER_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Cart>, sqlx::Error> {
        query_as::<Postgres, Cart>(LIST_CARTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        user: UserUuid,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write a new total if the cart is still at `version`.
    ///
    /// Returns the bumped version and update time, or `None` when another
    /// transaction got there first.
    pub(crate) async fn update_cart_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        version: i64,
        total_price: u64,
    ) -> Result<Option<(i64, Timestamp)>, sqlx::Error> {
        let updated: Option<(i64, SqlxTimestamp)> = query_as(UPDATE_CART_TOTAL_SQL)
            .bind(cart.into_uuid())
            .bind(version)
            .bind(to_i64(total_price, "total_price")?)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(updated.map(|(version, updated_at)| (version, updated_at.to_jiff())))
    }

    pub(crate) async fn carts_with_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<CartUuid>, sqlx::Error> {
        let carts: Vec<Uuid> = query_scalar(CARTS_WITH_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(carts.into_iter().map(CartUuid::from_uuid).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            total_price: try_get_amount(row, "total_price")?,
            version: row.try_get("version")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
