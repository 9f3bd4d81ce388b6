use crate::i18n::{CorruptCatalogPolicy, Language, DEFAULT_DOMAIN};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Catalogs
    pub locale_dir: PathBuf,
    pub domain: String,
    pub corrupt_catalog_policy: CorruptCatalogPolicy,
    pub languages: Vec<Language>,

    // Sources
    pub sources_dir: PathBuf,
    pub source_extensions: Vec<String>,

    // Run behavior
    pub sync_report_path: Option<PathBuf>,
    pub skip_if_generated: bool,

    // Storage
    pub storage_directory: PathBuf,

    // Logging
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Catalogs
            locale_dir: std::env::var("LOCALE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("app/i18n")),
            domain: std::env::var("TRANSLATION_DOMAIN")
                .unwrap_or_else(|_| DEFAULT_DOMAIN.to_string()),
            corrupt_catalog_policy: match std::env::var("CORRUPT_CATALOG_POLICY") {
                Ok(value) => value
                    .parse::<CorruptCatalogPolicy>()
                    .context("Invalid CORRUPT_CATALOG_POLICY")?,
                Err(_) => CorruptCatalogPolicy::default(),
            },
            languages: match std::env::var("LANGUAGES") {
                Ok(value) => parse_languages(&value).context("Invalid LANGUAGES")?,
                Err(_) => Language::supported(),
            },

            // Sources
            sources_dir: std::env::var("SOURCES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("app")),
            source_extensions: std::env::var("SOURCE_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .unwrap_or_else(|_| vec!["py".to_string()]),

            // Run behavior
            sync_report_path: std::env::var("SYNC_REPORT_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            skip_if_generated: std::env::var("SKIP_IF_GENERATED")
                .ok()
                .map(|v| parse_bool(&v))
                .transpose()
                .context("Invalid SKIP_IF_GENERATED")?
                .unwrap_or(false),

            // Storage
            storage_directory: std::env::var("STORAGE_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage")),

            // Logging
            log_filter: std::env::var("LOG_FILTER").unwrap_or_else(|_| "zordon=info".to_string()),
        })
    }

    /// SQLite file holding users and pending actions.
    pub fn database_path(&self) -> PathBuf {
        self.storage_directory.join("storage.db")
    }
}

/// Comma separated, leading dots optional: `py, .pyi` → `["py", "pyi"]`
fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma separated language codes, e.g. `ru,en`. Duplicates are dropped.
fn parse_languages(value: &str) -> Result<Vec<Language>> {
    let mut languages = Vec::new();
    for code in value.split(',').map(str::trim).filter(|code| !code.is_empty()) {
        let language = Language::from_code(code)?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    if languages.is_empty() {
        anyhow::bail!("no language codes given");
    }
    Ok(languages)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "LOCALE_DIR",
        "TRANSLATION_DOMAIN",
        "CORRUPT_CATALOG_POLICY",
        "LANGUAGES",
        "SOURCES_DIR",
        "SOURCE_EXTENSIONS",
        "SYNC_REPORT_PATH",
        "SKIP_IF_GENERATED",
        "STORAGE_DIRECTORY",
        "LOG_FILTER",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // ==================== Default Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("Defaults should load");

        assert_eq!(config.locale_dir, PathBuf::from("app/i18n"));
        assert_eq!(config.domain, "zordon");
        assert_eq!(config.corrupt_catalog_policy, CorruptCatalogPolicy::Fail);
        assert_eq!(config.languages, Language::supported());
        assert_eq!(config.sources_dir, PathBuf::from("app"));
        assert_eq!(config.source_extensions, vec!["py"]);
        assert!(config.sync_report_path.is_none());
        assert!(!config.skip_if_generated);
        assert_eq!(config.database_path(), PathBuf::from("storage/storage.db"));
        assert_eq!(config.log_filter, "zordon=info");
    }

    // ==================== Override Tests ====================

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("LOCALE_DIR", "/srv/i18n");
        std::env::set_var("TRANSLATION_DOMAIN", "bot");
        std::env::set_var("CORRUPT_CATALOG_POLICY", "reset");
        std::env::set_var("LANGUAGES", "en, ru");
        std::env::set_var("SOURCE_EXTENSIONS", "py, .pyi,");
        std::env::set_var("SYNC_REPORT_PATH", "report.json");
        std::env::set_var("SKIP_IF_GENERATED", "yes");
        std::env::set_var("STORAGE_DIRECTORY", "/var/lib/zordon");

        let config = Config::from_env().expect("Overrides should load");
        clear_env();

        assert_eq!(config.locale_dir, PathBuf::from("/srv/i18n"));
        assert_eq!(config.domain, "bot");
        assert_eq!(config.corrupt_catalog_policy, CorruptCatalogPolicy::Reset);
        assert_eq!(config.languages, vec![Language::ENGLISH, Language::RUSSIAN]);
        assert_eq!(config.source_extensions, vec!["py", "pyi"]);
        assert_eq!(config.sync_report_path, Some(PathBuf::from("report.json")));
        assert!(config.skip_if_generated);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/zordon/storage.db")
        );
    }

    #[test]
    #[serial]
    fn test_invalid_policy_is_rejected() {
        clear_env();
        std::env::set_var("CORRUPT_CATALOG_POLICY", "ignore");
        let result = Config::from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_unknown_language_is_rejected() {
        clear_env();
        std::env::set_var("LANGUAGES", "ru,fr");
        let result = Config::from_env();
        clear_env();

        let err = result.expect_err("fr is not supported");
        assert!(format!("{:#}", err).contains("Unknown language code: 'fr'"));
    }

    #[test]
    #[serial]
    fn test_invalid_bool_is_rejected() {
        clear_env();
        std::env::set_var("SKIP_IF_GENERATED", "maybe");
        let result = Config::from_env();
        clear_env();

        assert!(result.is_err());
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("2").is_err());
    }

    #[test]
    fn test_parse_languages_drops_duplicates() {
        assert_eq!(parse_languages("ru, ru ,en").unwrap(), vec![Language::RUSSIAN, Language::ENGLISH]);
        assert!(parse_languages(" , ").is_err());
    }

    #[test]
    fn test_parse_extensions_empty() {
        assert!(parse_extensions(" , ").is_empty());
    }
}
