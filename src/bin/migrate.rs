use anyhow::{Context, Result};
use tracing::info;
use zordon::config::Config;
use zordon::db::Database;
use zordon::logging;

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logging::init(&config.log_filter)?;

    std::fs::create_dir_all(&config.storage_directory).context(format!(
        "Failed to create storage directory {}",
        config.storage_directory.display()
    ))?;

    // Opening applies every pending migration
    let db = Database::open(config.database_path())?;
    info!("Database schema is at version {}", db.schema_version()?);

    Ok(())
}
