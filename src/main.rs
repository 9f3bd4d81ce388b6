use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{info, warn};
use zordon::config::Config;
use zordon::i18n::TranslationsUpdater;
use zordon::logging;

fn main() -> Result<ExitCode> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logging::init(&config.log_filter)?;

    let updater = TranslationsUpdater::from_config(&config);

    if config.skip_if_generated && updater.is_already_generated() {
        info!("Compiled catalogs already present, skipping synchronization");
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        locale_dir = %config.locale_dir.display(),
        sources_dir = %config.sources_dir.display(),
        "Synchronizing translation catalogs"
    );
    let report = updater
        .regenerate_all_with_report()
        .context("Translation synchronization failed")?;

    if let Some(path) = &config.sync_report_path {
        std::fs::write(path, report.to_json()?)
            .context(format!("Failed to write sync report to {}", path.display()))?;
        info!("Sync report written to {}", path.display());
    }

    if report.complete {
        info!("All translations are complete");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(
            "{} translation problem(s) need attention",
            report.diagnostics.len()
        );
        Ok(ExitCode::FAILURE)
    }
}
