//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{CartLine, RemovedCartItem, merge_lines},
            errors::CartsServiceError,
            models::{Cart, CartUuid},
            store::PgCartStore,
        },
        products::{records::ProductUuid, repository::PgProductsRepository},
        users::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    store: PgCartStore,
    products: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            store: PgCartStore::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .store
            .load_for_user(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let carts = self.store.list(&mut tx).await?;

        tx.commit().await?;

        Ok(carts)
    }

    #[tracing::instrument(
        name = "carts.add_item",
        skip(self, user, product),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.products.get_product(&mut tx, product).await?;
        let mut cart = self.store.load_or_create(&mut tx, user).await?;

        let change = cart.add_item(&product, quantity)?;

        self.store.persist(&mut tx, &mut cart, &[change]).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, total_price = cart.total_price, "added item to cart");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.change_quantity",
        skip(self, user, product),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn change_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        delta: i64,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self
            .store
            .load_for_user(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let product = self.products.get_product(&mut tx, product).await?;

        let change = cart.change_quantity(&product, delta)?;

        self.store.persist(&mut tx, &mut cart, &[change]).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, total_price = cart.total_price, "changed cart quantity");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.remove_item",
        skip(self, cart, product),
        fields(cart_uuid = %cart, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<RemovedCartItem, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.store.load(&mut tx, cart).await?;

        let product_name = cart
            .item(product)
            .map(|item| item.product_name.clone())
            .ok_or(CartsServiceError::NotFound)?;

        let change = cart.remove_item(product)?;

        self.store.persist(&mut tx, &mut cart, &[change]).await?;

        tx.commit().await?;

        let removed = RemovedCartItem {
            cart_uuid: cart.uuid,
            product_uuid: product,
            product_name,
        };

        info!(total_price = cart.total_price, "{removed}");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "carts.propagate_price_change",
        skip(self, cart, product),
        fields(cart_uuid = %cart, product_uuid = %product),
        err
    )]
    async fn propagate_price_change(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.store.load(&mut tx, cart).await?;
        let product = self.products.get_product(&mut tx, product).await?;

        let change = cart.propagate_price_change(&product)?;

        self.store.persist(&mut tx, &mut cart, &[change]).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.replace_contents",
        skip(self, user, lines),
        fields(user_uuid = %user, lines = lines.len()),
        err
    )]
    async fn replace_contents(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<Cart, CartsServiceError> {
        let lines = merge_lines(lines)?;

        let mut tx = self.db.begin().await?;

        let mut resolved = Vec::with_capacity(lines.len());

        for line in lines {
            let product = self.products.get_product(&mut tx, line.product_uuid).await?;

            resolved.push((product, line.quantity));
        }

        let mut cart = self.store.load_or_create(&mut tx, user).await?;

        let changes = cart.replace_contents(&resolved)?;

        self.store.persist(&mut tx, &mut cart, &changes).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, total_price = cart.total_price, "replaced cart contents");

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The user's cart with its items.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Every cart, oldest first.
    async fn list_carts(&self) -> Result<Vec<Cart>, CartsServiceError>;

    /// Add units of a product to the user's cart, creating the cart if needed.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Change an item's quantity by a signed amount; zero or less removes it.
    async fn change_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        delta: i64,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a product's item from a cart.
    async fn remove_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<RemovedCartItem, CartsServiceError>;

    /// Re-lock a cart item to the product's current special price.
    async fn propagate_price_change(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Replace the user's cart contents wholesale.
    async fn replace_contents(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<Cart, CartsServiceError>;
}
