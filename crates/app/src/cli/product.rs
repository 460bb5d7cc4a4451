use clap::{Args, Subcommand, ValueEnum};
use storefront_app::{
    context::AppContext,
    domain::{
        categories::records::CategoryUuid,
        products::{
            data::{NewProduct, ProductQuery, ProductSort, ProductUpdate},
            records::ProductUuid,
        },
    },
};

use super::{PageArgs, describe, print_json};

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

/// Editable product fields; prices are in minor units.
#[derive(Debug, Args)]
struct ProductFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    /// Units in stock
    #[arg(long)]
    quantity: u32,

    #[arg(long)]
    price: u64,

    /// Whole-percent discount
    #[arg(long, default_value_t = 0)]
    discount: u16,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Create a product in a category
    Create {
        #[arg(long)]
        category: CategoryUuid,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Show one product
    Get { uuid: ProductUuid },

    /// Search the catalog
    List {
        /// Case-insensitive name fragment
        #[arg(long)]
        keyword: Option<String>,

        /// Exact category name
        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Replace a product's details and re-price carts holding it
    Update {
        uuid: ProductUuid,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Remove a product from all carts and delete it
    Delete { uuid: ProductUuid },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Price,
    SpecialPrice,
    CreatedAt,
}

impl From<SortArg> for ProductSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => Self::Name,
            SortArg::Price => Self::Price,
            SortArg::SpecialPrice => Self::SpecialPrice,
            SortArg::CreatedAt => Self::CreatedAt,
        }
    }
}

pub(crate) async fn run(app: &AppContext, command: ProductCommand) -> Result<(), String> {
    let products = &app.products;

    match command.command {
        ProductSubcommand::Create { category, fields } => {
            let product = products
                .create_product(
                    category,
                    NewProduct {
                        uuid: ProductUuid::new(),
                        name: fields.name,
                        description: fields.description,
                        quantity: fields.quantity,
                        price: fields.price,
                        discount: fields.discount,
                    },
                )
                .await
                .map_err(|error| format!("failed to create product: {}", describe(&error)))?;

            print_json(&product)
        }
        ProductSubcommand::Get { uuid } => {
            let product = products
                .get_product(uuid)
                .await
                .map_err(|error| format!("failed to get product: {}", describe(&error)))?;

            print_json(&product)
        }
        ProductSubcommand::List {
            keyword,
            category,
            sort,
            page,
        } => {
            let page = products
                .list_products(ProductQuery {
                    keyword,
                    category,
                    page: page.into_request(sort.into()),
                })
                .await
                .map_err(|error| format!("failed to list products: {}", describe(&error)))?;

            print_json(&page)
        }
        ProductSubcommand::Update { uuid, fields } => {
            let product = products
                .update_product(
                    uuid,
                    ProductUpdate {
                        name: fields.name,
                        description: fields.description,
                        quantity: fields.quantity,
                        price: fields.price,
                        discount: fields.discount,
                    },
                )
                .await
                .map_err(|error| format!("failed to update product: {}", describe(&error)))?;

            print_json(&product)
        }
        ProductSubcommand::Delete { uuid } => {
            products
                .delete_product(uuid)
                .await
                .map_err(|error| format!("failed to delete product: {}", describe(&error)))?;

            print_json(&serde_json::json!({ "deleted": uuid }))
        }
    }
}
