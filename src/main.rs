use dotenvy::dotenv;
use mess_manager::api::{self, AppState};
use mess_manager::config;
use mess_manager::core::member;
use mess_manager::errors::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed initial members from config.toml, if present
    match config::members::load_default_config() {
        Ok(seed_config) => {
            let seeded = member::seed_initial_members(&db, &seed_config).await?;
            info!("Seeded {} members from config.toml.", seeded);
        }
        Err(e) => warn!("No member seed applied: {}", e),
    }

    // 5. Serve the API
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    api::serve(AppState::new(db), &bind_addr).await?;

    Ok(())
}
