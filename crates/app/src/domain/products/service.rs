//! Products service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::store::PgCartStore,
        categories::records::CategoryUuid,
        paging::Page,
        products::{
            data::{NewProduct, ProductQuery, ProductUpdate, has_valid_details},
            errors::ProductsServiceError,
            pricing::{MAX_DISCOUNT_PERCENT, special_price},
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
    carts: PgCartStore,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
            carts: PgCartStore::new(),
        }
    }

    /// Re-lock every cart line for `product` to its current price.
    async fn reprice_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &ProductRecord,
    ) -> Result<usize, ProductsServiceError> {
        let carts = self.carts.carts_with_product(tx, product.uuid).await?;

        for cart in &carts {
            let mut cart = self.carts.load(tx, *cart).await?;
            let change = cart.propagate_price_change(product)?;

            self.carts.persist(tx, &mut cart, &[change]).await?;
        }

        Ok(carts.len())
    }

    async fn remove_from_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<usize, ProductsServiceError> {
        let carts = self.carts.carts_with_product(tx, product).await?;

        for cart in &carts {
            let mut cart = self.carts.load(tx, *cart).await?;
            let change = cart.remove_item(product)?;

            self.carts.persist(tx, &mut cart, &[change]).await?;
        }

        Ok(carts.len())
    }
}

fn validate(name: &str, description: &str, discount: u16) -> Result<(), ProductsServiceError> {
    if !has_valid_details(name, description) || discount > MAX_DISCOUNT_PERCENT {
        return Err(ProductsServiceError::InvalidData);
    }

    Ok(())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        query: ProductQuery,
    ) -> Result<Page<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx, &query).await?;
        let total = self.repository.count_products(&mut tx, &query).await?;

        tx.commit().await?;

        Ok(Page::new(products, &query.page, total))
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "products.create",
        skip(self, category, product),
        fields(category_uuid = %category, product_uuid = %product.uuid),
        err
    )]
    async fn create_product(
        &self,
        category: CategoryUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        validate(&product.name, &product.description, product.discount)?;

        let special = special_price(product.price, product.discount)?;

        let mut tx = self.db.begin().await?;

        if !self.repository.category_exists(&mut tx, category).await? {
            return Err(ProductsServiceError::NotFound);
        }

        let created = self
            .repository
            .create_product(&mut tx, category, product, special)
            .await?;

        tx.commit().await?;

        info!(name = %created.name, special_price = created.special_price, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "products.update",
        skip(self, product, update),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        validate(&update.name, &update.description, update.discount)?;

        let special = special_price(update.price, update.discount)?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, update, special)
            .await?;

        let carts = self.reprice_carts(&mut tx, &updated).await?;

        tx.commit().await?;

        info!(special_price = updated.special_price, carts, "updated product");

        Ok(updated)
    }

    #[tracing::instrument(name = "products.delete", skip(self, product), fields(product_uuid = %product), err)]
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let carts = self.remove_from_carts(&mut tx, product).await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(carts, "deleted product");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Search the catalog by keyword and category, one page at a time.
    async fn list_products(
        &self,
        query: ProductQuery,
    ) -> Result<Page<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single live product.
    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product in a category, computing its special price.
    async fn create_product(
        &self,
        category: CategoryUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Updates a product and re-prices every cart holding it.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Takes a product out of every cart, then soft-deletes it.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}
