//! Test Helpers

use crate::{
    domain::{
        categories::{
            CategoriesService, CategoriesServiceError,
            data::NewCategory,
            records::{CategoryRecord, CategoryUuid},
        },
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    test::TestContext,
};

pub(crate) async fn create_category(
    ctx: &TestContext,
    name: &str,
) -> Result<CategoryRecord, CategoriesServiceError> {
    ctx.categories
        .create_category(NewCategory {
            uuid: CategoryUuid::new(),
            name: name.to_string(),
        })
        .await
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    category: CategoryUuid,
    name: &str,
    quantity: u32,
    price: u64,
    discount: u16,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(
            category,
            NewProduct {
                uuid: ProductUuid::new(),
                name: name.to_string(),
                description: format!("{name} for testing"),
                quantity,
                price,
                discount,
            },
        )
        .await
}

/// An undiscounted product in a category of its own.
pub(crate) async fn create_stocked_product(
    ctx: &TestContext,
    name: &str,
    quantity: u32,
    price: u64,
) -> testresult::TestResult<ProductRecord> {
    let category = create_category(ctx, &format!("{name} Category")).await?;

    Ok(create_product(ctx, category.uuid, name, quantity, price, 0).await?)
}
