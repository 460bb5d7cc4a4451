//! Categories service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        categories::{
            data::{CategoryPageRequest, CategoryUpdate, NewCategory, is_valid_category_name},
            errors::CategoriesServiceError,
            records::{CategoryRecord, CategoryUuid},
            repository::PgCategoriesRepository,
        },
        paging::Page,
    },
};

#[derive(Debug, Clone)]
pub struct PgCategoriesService {
    db: Db,
    repository: PgCategoriesRepository,
}

impl PgCategoriesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl CategoriesService for PgCategoriesService {
    async fn list_categories(
        &self,
        page: CategoryPageRequest,
    ) -> Result<Page<CategoryRecord>, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let categories = self.repository.list_categories(&mut tx, &page).await?;
        let total = self.repository.count_categories(&mut tx).await?;

        tx.commit().await?;

        Ok(Page::new(categories, &page, total))
    }

    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let category = self.repository.get_category(&mut tx, category).await?;

        tx.commit().await?;

        Ok(category)
    }

    #[tracing::instrument(name = "categories.create", skip(self, category), fields(category_uuid = %category.uuid), err)]
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        if !is_valid_category_name(&category.name) {
            return Err(CategoriesServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_category(&mut tx, category).await?;

        tx.commit().await?;

        info!(name = %created.name, "created category");

        Ok(created)
    }

    #[tracing::instrument(name = "categories.update", skip(self, update), err)]
    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        if !is_valid_category_name(&update.name) {
            return Err(CategoriesServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_category(&mut tx, category, &update.name)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(name = "categories.delete", skip(self), err)]
    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        if self.repository.count_live_products(&mut tx, category).await? > 0 {
            return Err(CategoriesServiceError::InvalidReference);
        }

        let rows_affected = self.repository.delete_category(&mut tx, category).await?;

        if rows_affected == 0 {
            return Err(CategoriesServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted category");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CategoriesService: Send + Sync {
    /// Retrieves one page of categories.
    async fn list_categories(
        &self,
        page: CategoryPageRequest,
    ) -> Result<Page<CategoryRecord>, CategoriesServiceError>;

    /// Retrieve a single category.
    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Creates a new category; names are unique.
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Renames a category.
    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Deletes a category that no live product belongs to.
    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError>;
}
