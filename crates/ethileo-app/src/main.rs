//! Ethileo events engine entry point.

use ethileo_app::app::App;
use ethileo_app::config::Config;
use ethileo_app::error::AppError;
use ethileo_app::logging::init_tracing;
use ethileo_core::page::Page;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting Ethileo events engine");

    let app = App::connect(&config).await?;

    let events = app.events.count_all().await?;
    let first_page = app.events.find_all(Page::events_default()).await?;
    tracing::info!(
        events_table = %config.tables.events,
        guests_table = %config.tables.guests,
        events,
        listed = first_page.len(),
        "events engine ready"
    );

    Ok(())
}
