//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{to_i16, to_i64, try_get_amount, try_get_percent, try_get_quantity},
    domain::{
        carts::models::{CartItem, CartItemUuid, CartUuid},
        products::records::ProductUuid,
    },
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("../sql/create_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("../sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Items for each of `carts`, grouped by cart in insertion order.
    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        carts: &[CartUuid],
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        let carts: Vec<Uuid> = carts.iter().copied().map(CartUuid::into_uuid).collect();

        query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(carts)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: &CartItem,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_CART_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(item.cart_uuid.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(i64::from(item.quantity))
            .bind(to_i16(item.discount, "discount")?)
            .bind(to_i64(item.unit_price, "unit_price")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: &CartItem,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(i64::from(item.quantity))
            .bind(to_i16(item.discount, "discount")?)
            .bind(to_i64(item.unit_price, "unit_price")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            quantity: try_get_quantity(row, "quantity")?,
            discount: try_get_percent(row, "discount")?,
            unit_price: try_get_amount(row, "unit_price")?,
        })
    }
}
