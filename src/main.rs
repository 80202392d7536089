use tracing::{error, info};

use asset_manager::{AppState, Config, Database, ObjectStorage, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = asset_manager::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        asset_manager::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> asset_manager::Result<()> {
    config.validate()?;

    info!("Asset Manager starting");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let db = Database::open(&config.database.path).await?;
    let storage = ObjectStorage::from_config(&config.storage)?;
    info!(backend = ?storage.backend(), "Object storage ready");

    let state = AppState::new(db, storage)
        .with_max_upload_size(config.storage.max_upload_size_bytes());

    WebServer::new(&config.server, state)?.run().await
}
