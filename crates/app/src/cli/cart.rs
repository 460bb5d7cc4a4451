use clap::{Args, Subcommand};
use storefront_app::{
    context::AppContext,
    domain::{
        carts::{data::CartLine, models::CartUuid},
        products::records::ProductUuid,
        users::UserUuid,
    },
};

use super::{describe, print_json};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show a user's cart
    Show {
        #[arg(long)]
        user: UserUuid,
    },

    /// List every cart
    List,

    /// Add units of a product, creating the cart on first use
    Add {
        #[arg(long)]
        user: UserUuid,

        #[arg(long)]
        product: ProductUuid,

        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change a line by a signed number of units
    Change {
        #[arg(long)]
        user: UserUuid,

        #[arg(long)]
        product: ProductUuid,

        #[arg(long, allow_negative_numbers = true)]
        delta: i64,
    },

    /// Take a product out of a cart
    Remove {
        #[arg(long)]
        cart: CartUuid,

        #[arg(long)]
        product: ProductUuid,
    },

    /// Re-lock a cart line to the product's current price
    Propagate {
        #[arg(long)]
        cart: CartUuid,

        #[arg(long)]
        product: ProductUuid,
    },

    /// Replace a user's cart with the given lines
    Replace {
        #[arg(long)]
        user: UserUuid,

        /// `<product-uuid>:<quantity>`, repeatable
        #[arg(long = "line", value_parser = parse_line)]
        lines: Vec<CartLine>,
    },
}

fn parse_line(value: &str) -> Result<CartLine, String> {
    let (product, quantity) = value
        .split_once(':')
        .ok_or_else(|| format!("expected <product-uuid>:<quantity>, got `{value}`"))?;

    let product = product
        .parse::<ProductUuid>()
        .map_err(|error| format!("invalid product uuid `{product}`: {error}"))?;

    let quantity = quantity
        .parse::<u32>()
        .map_err(|error| format!("invalid quantity `{quantity}`: {error}"))?;

    Ok(CartLine::new(product, quantity))
}

pub(crate) async fn run(app: &AppContext, command: CartCommand) -> Result<(), String> {
    let carts = &app.carts;

    match command.command {
        CartSubcommand::Show { user } => {
            let cart = carts
                .get_cart(user)
                .await
                .map_err(|error| format!("failed to get cart: {}", describe(&error)))?;

            print_json(&cart)
        }
        CartSubcommand::List => {
            let carts = carts
                .list_carts()
                .await
                .map_err(|error| format!("failed to list carts: {}", describe(&error)))?;

            print_json(&carts)
        }
        CartSubcommand::Add {
            user,
            product,
            quantity,
        } => {
            let cart = carts
                .add_item(user, product, quantity)
                .await
                .map_err(|error| format!("failed to add item: {}", describe(&error)))?;

            print_json(&cart)
        }
        CartSubcommand::Change {
            user,
            product,
            delta,
        } => {
            let cart = carts
                .change_quantity(user, product, delta)
                .await
                .map_err(|error| format!("failed to change quantity: {}", describe(&error)))?;

            print_json(&cart)
        }
        CartSubcommand::Remove { cart, product } => {
            let removed = carts
                .remove_item(cart, product)
                .await
                .map_err(|error| format!("failed to remove item: {}", describe(&error)))?;

            print_json(&serde_json::json!({
                "message": removed.to_string(),
                "removed": removed,
            }))
        }
        CartSubcommand::Propagate { cart, product } => {
            let cart = carts
                .propagate_price_change(cart, product)
                .await
                .map_err(|error| format!("failed to propagate price: {}", describe(&error)))?;

            print_json(&cart)
        }
        CartSubcommand::Replace { user, lines } => {
            let cart = carts
                .replace_contents(user, lines)
                .await
                .map_err(|error| format!("failed to replace cart: {}", describe(&error)))?;

            print_json(&cart)
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_product_and_quantity() -> TestResult {
        let product = ProductUuid::new();

        let line = parse_line(&format!("{product}:3"))?;

        assert_eq!(line, CartLine::new(product, 3));

        Ok(())
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("no-separator").is_err());
        assert!(parse_line("not-a-uuid:1").is_err());
        assert!(parse_line(&format!("{}:-1", ProductUuid::new())).is_err());
    }
}
