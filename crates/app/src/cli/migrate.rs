use storefront_app::{context::AppContext, database};
use tracing::info;

use super::describe;

pub(crate) async fn run(app: &AppContext) -> Result<(), String> {
    database::migrate(&app.pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {}", describe(&error)))?;

    info!("migrations applied");

    Ok(())
}
