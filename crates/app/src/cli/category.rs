use clap::{Args, Subcommand, ValueEnum};
use storefront_app::{
    context::AppContext,
    domain::categories::{
        data::{CategorySort, CategoryUpdate, NewCategory},
        records::CategoryUuid,
    },
};

use super::{PageArgs, describe, print_json};

#[derive(Debug, Args)]
pub(crate) struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Debug, Subcommand)]
enum CategorySubcommand {
    /// Create a category
    Create {
        /// Display name, at least 5 characters and unique
        #[arg(long)]
        name: String,
    },

    /// List categories one page at a time
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Rename a category
    Update {
        uuid: CategoryUuid,

        #[arg(long)]
        name: String,
    },

    /// Delete a category with no live products
    Delete { uuid: CategoryUuid },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    CreatedAt,
}

impl From<SortArg> for CategorySort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => Self::Name,
            SortArg::CreatedAt => Self::CreatedAt,
        }
    }
}

pub(crate) async fn run(app: &AppContext, command: CategoryCommand) -> Result<(), String> {
    let categories = &app.categories;

    match command.command {
        CategorySubcommand::Create { name } => {
            let category = categories
                .create_category(NewCategory {
                    uuid: CategoryUuid::new(),
                    name,
                })
                .await
                .map_err(|error| format!("failed to create category: {}", describe(&error)))?;

            print_json(&category)
        }
        CategorySubcommand::List { sort, page } => {
            let page = categories
                .list_categories(page.into_request(sort.into()))
                .await
                .map_err(|error| format!("failed to list categories: {}", describe(&error)))?;

            print_json(&page)
        }
        CategorySubcommand::Update { uuid, name } => {
            let category = categories
                .update_category(uuid, CategoryUpdate { name })
                .await
                .map_err(|error| format!("failed to update category: {}", describe(&error)))?;

            print_json(&category)
        }
        CategorySubcommand::Delete { uuid } => {
            categories
                .delete_category(uuid)
                .await
                .map_err(|error| format!("failed to delete category: {}", describe(&error)))?;

            print_json(&serde_json::json!({ "deleted": uuid }))
        }
    }
}
