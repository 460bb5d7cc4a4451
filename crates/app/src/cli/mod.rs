use std::error::Error;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use storefront_app::{
    config::{DatabaseConfig, LoggingConfig},
    context::AppContext,
    domain::paging::{PageRequest, SortOrder},
    observability,
};

mod cart;
mod category;
mod migrate;
mod product;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    Category(category::CategoryCommand),
    Product(product::ProductCommand),
    Cart(cart::CartCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.logging).map_err(|error| describe(&error))?;

        let app = AppContext::from_config(&self.database)
            .await
            .map_err(|error| describe(&error))?;

        match self.command {
            Commands::Migrate => migrate::run(&app).await,
            Commands::Category(command) => category::run(&app, command).await,
            Commands::Product(command) => product::run(&app, command).await,
            Commands::Cart(command) => cart::run(&app, command).await,
        }
    }
}

/// Paging flags shared by the list commands.
#[derive(Debug, Args)]
pub(crate) struct PageArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Results per page
    #[arg(long, default_value_t = 20)]
    size: u32,

    /// Sort direction; anything but `asc` sorts descending
    #[arg(long, default_value = "asc")]
    order: String,
}

impl PageArgs {
    pub(crate) fn into_request<S>(self, sort_by: S) -> PageRequest<S> {
        PageRequest {
            page_number: self.page,
            page_size: self.size,
            sort_by,
            sort_order: SortOrder::parse_lenient(&self.order),
        }
    }
}

/// Render an error and its sources as one line.
pub(crate) fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}
