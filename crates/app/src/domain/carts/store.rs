//! Cart Store
//!
//! Loads whole carts (row plus items) and writes engine results back. Shared
//! by the carts service and by product updates that reach into carts.

use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::domain::{
    carts::{
        engine::ItemChange,
        errors::CartsServiceError,
        models::{Cart, CartUuid},
        repositories::{PgCartItemsRepository, PgCartsRepository},
    },
    products::records::ProductUuid,
    users::UserUuid,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartStore {
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
}

impl PgCartStore {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
        }
    }

    pub(crate) async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.carts.get_cart(tx, cart).await?;

        cart.items = self.items.get_cart_items(tx, &[cart.uuid]).await?;

        Ok(cart)
    }

    pub(crate) async fn load_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<Cart>, CartsServiceError> {
        let Some(mut cart) = self.carts.find_user_cart(tx, user).await? else {
            return Ok(None);
        };

        cart.items = self.items.get_cart_items(tx, &[cart.uuid]).await?;

        Ok(Some(cart))
    }

    /// The user's cart, creating an empty one on first use.
    pub(crate) async fn load_or_create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Cart, CartsServiceError> {
        if let Some(cart) = self.load_for_user(tx, user).await? {
            return Ok(cart);
        }

        match self.carts.create_cart(tx, CartUuid::new(), user).await {
            Ok(cart) => {
                debug!(cart_uuid = %cart.uuid, "created cart");

                Ok(cart)
            }
            // A concurrent first use created it; the caller can retry.
            Err(error) => match CartsServiceError::from(error) {
                CartsServiceError::AlreadyExists => Err(CartsServiceError::Conflict),
                other => Err(other),
            },
        }
    }

    pub(crate) async fn list(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Cart>, CartsServiceError> {
        let mut carts = self.carts.list_carts(tx).await?;

        let uuids: Vec<CartUuid> = carts.iter().map(|cart| cart.uuid).collect();

        let mut items_by_cart: FxHashMap<CartUuid, Vec<_>> = FxHashMap::default();

        for item in self.items.get_cart_items(tx, &uuids).await? {
            items_by_cart.entry(item.cart_uuid).or_default().push(item);
        }

        for cart in &mut carts {
            cart.items = items_by_cart.remove(&cart.uuid).unwrap_or_default();
        }

        Ok(carts)
    }

    pub(crate) async fn carts_with_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<CartUuid>, CartsServiceError> {
        Ok(self.carts.carts_with_product(tx, product).await?)
    }

    /// Write `changes` and the cart's new total.
    ///
    /// The total is written first, guarded by the version the cart was loaded
    /// at; if that row has moved on the whole call fails with
    /// [`CartsServiceError::Conflict`].
    pub(crate) async fn persist(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &mut Cart,
        changes: &[ItemChange],
    ) -> Result<(), CartsServiceError> {
        let (version, updated_at) = self
            .carts
            .update_cart_total(tx, cart.uuid, cart.version, cart.total_price)
            .await?
            .ok_or(CartsServiceError::Conflict)?;

        for change in changes {
            match change {
                ItemChange::Inserted(item) => self.items.create_cart_item(tx, item).await?,
                ItemChange::Updated(item) => {
                    if self.items.update_cart_item(tx, item).await? == 0 {
                        return Err(CartsServiceError::Conflict);
                    }
                }
                ItemChange::Removed(item) => {
                    if self.items.delete_cart_item(tx, item.uuid).await? == 0 {
                        return Err(CartsServiceError::Conflict);
                    }
                }
            }
        }

        cart.version = version;
        cart.updated_at = updated_at;

        debug!(
            cart_uuid = %cart.uuid,
            total_price = cart.total_price,
            changes = changes.len(),
            "persisted cart"
        );

        Ok(())
    }
}
