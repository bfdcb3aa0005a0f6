#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use resale_market::{
    api::{self, AppState},
    config::{database, seed, settings},
    core::{analytics::LanguageModelAdvisor, seed::seed_marketplace},
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings from config.toml plus environment overrides
    let settings = settings::load_app_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure the tables exist
    database::ensure_database_dir(&settings.database.url)?;
    let db = database::create_connection(&settings.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed demo data if a seed file is configured
    if let Some(path) = &settings.seed_file {
        let config = seed::load_seed_config(path)?;
        seed_marketplace(&db, &config)
            .await
            .inspect_err(|e| error!("Failed to seed marketplace: {}", e))?;
    }

    // 6. Build the advisory generator; OPENAI_API_KEY is read here, never stored in settings
    let advisor = LanguageModelAdvisor::from_env(&settings.analytics)?;

    // 7. Serve
    let address = format!("{}:{}", settings.server.bind_address, settings.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!("Listening on {}", address);

    let app = api::router(AppState::new(db, advisor, settings));
    axum::serve(listener, app).await?;

    Ok(())
}
