//! Catalog synchronization across all supported languages.

use crate::config::Config;
use crate::i18n::builder::build_reference_catalog;
use crate::i18n::error::SyncError;
use crate::i18n::extract::{default_keywords, StringExtractor};
use crate::i18n::merge::CatalogMerger;
use crate::i18n::metrics::SyncReport;
use crate::i18n::store::{CatalogStore, CorruptCatalogPolicy};
use crate::i18n::validator::TranslationValidator;
use crate::i18n::Language;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Keeps every language's catalogs in sync with the source tree.
#[derive(Debug, Clone)]
pub struct TranslationsUpdater {
    store: CatalogStore,
    sources_dir: PathBuf,
    extractor: StringExtractor,
    languages: Vec<Language>,
}

impl TranslationsUpdater {
    /// Create an updater for all supported languages with the default
    /// extractor and catalog domain.
    pub fn new(locale_dir: impl Into<PathBuf>, sources_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: CatalogStore::new(locale_dir),
            sources_dir: sources_dir.into(),
            extractor: StringExtractor::default(),
            languages: Language::supported(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store = CatalogStore::new(&config.locale_dir)
            .with_domain(&config.domain)
            .with_corrupt_policy(config.corrupt_catalog_policy);
        Self {
            store,
            sources_dir: config.sources_dir.clone(),
            extractor: StringExtractor::new(config.source_extensions.clone(), default_keywords()),
            languages: config.languages.clone(),
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_extractor(mut self, extractor: StringExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptCatalogPolicy) -> Self {
        self.store = self.store.with_corrupt_policy(policy);
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// True when every language already has a compiled catalog.
    pub fn is_already_generated(&self) -> bool {
        self.languages
            .iter()
            .all(|language| self.store.has_compiled(*language))
    }

    /// Synchronize all catalogs. Returns whether every language is complete.
    pub fn regenerate_all(&self) -> Result<bool, SyncError> {
        self.regenerate_all_with_report().map(|report| report.complete)
    }

    /// Synchronize all catalogs and return the per-language details.
    ///
    /// Languages are processed in order; each is read, merged, validated and
    /// written before the next one starts. The first fatal error aborts the
    /// run, leaving already written languages in place.
    pub fn regenerate_all_with_report(&self) -> Result<SyncReport, SyncError> {
        let extraction = self.extractor.extract_from_dir(&self.sources_dir)?;
        let reference = build_reference_catalog(extraction);
        info!(
            sources = %self.sources_dir.display(),
            messages = reference.len(),
            "Extracted translatable strings"
        );

        let mut report = SyncReport::new();

        for &language in &self.languages {
            let existing = self.store.read(language)?;
            let outcome = CatalogMerger::new(language).merge(existing, &reference);

            if let Some(warning) = &outcome.obsolete_warning {
                warn!("{}", warning);
                report.warnings.push(warning.clone());
            }

            let validation = TranslationValidator::validate(language, &outcome.catalog);
            for diagnostic in &validation.diagnostics {
                error!("{}", diagnostic);
            }

            self.store.write(language, &outcome.catalog)?;

            info!(
                language = %language,
                name = language.name(),
                total = validation.metrics.total,
                translated = validation.metrics.translated,
                obsolete = validation.metrics.obsolete,
                complete = validation.complete,
                "Catalog synchronized"
            );

            report.complete &= validation.complete;
            report.diagnostics.extend(validation.diagnostics);
            report.languages.push(validation.metrics);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_updater() -> (TranslationsUpdater, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sources = temp_dir.path().join("app");
        fs::create_dir_all(&sources).unwrap();
        let updater = TranslationsUpdater::new(temp_dir.path().join("i18n"), &sources);
        (updater, temp_dir)
    }

    #[test]
    fn test_not_generated_initially() {
        let (updater, _temp_dir) = create_test_updater();
        assert!(!updater.is_already_generated());
    }

    #[test]
    fn test_empty_sources_are_complete() {
        let (updater, _temp_dir) = create_test_updater();

        let complete = updater.regenerate_all().expect("Should sync");

        assert!(complete);
        assert!(updater.is_already_generated());
    }

    #[test]
    fn test_new_string_is_incomplete_for_every_language() {
        let (updater, temp_dir) = create_test_updater();
        fs::write(temp_dir.path().join("app/bot.py"), "print(_(\"Hello\"))\n").unwrap();

        let report = updater.regenerate_all_with_report().expect("Should sync");

        assert!(!report.complete);
        assert_eq!(report.languages.len(), Language::supported().len());
        assert!(report
            .diagnostics
            .contains(&"Translation for Hello(ru) is missing!".to_string()));
        assert!(report
            .diagnostics
            .contains(&"Translation for Hello(en) is missing!".to_string()));
    }

    #[test]
    fn test_with_languages_limits_processing() {
        let (updater, temp_dir) = create_test_updater();
        let updater = updater.with_languages(vec![Language::RUSSIAN]);
        fs::write(temp_dir.path().join("app/bot.py"), "_(\"Hello\")\n").unwrap();

        let report = updater.regenerate_all_with_report().expect("Should sync");

        assert_eq!(report.languages.len(), 1);
        assert!(updater.store().po_path(Language::RUSSIAN).is_file());
        assert!(!updater.store().po_path(Language::ENGLISH).exists());
        assert!(updater.is_already_generated());
    }

    #[test]
    fn test_from_config_uses_configured_languages() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sources = temp_dir.path().join("app");
        fs::create_dir_all(&sources).unwrap();
        fs::write(sources.join("bot.txt"), "_(\"Hello\")\n").unwrap();
        let config = Config {
            locale_dir: temp_dir.path().join("i18n"),
            domain: "bot".to_string(),
            corrupt_catalog_policy: CorruptCatalogPolicy::Fail,
            languages: vec![Language::ENGLISH],
            sources_dir: sources,
            source_extensions: vec!["txt".to_string()],
            sync_report_path: None,
            skip_if_generated: false,
            storage_directory: temp_dir.path().join("storage"),
            log_filter: "zordon=info".to_string(),
        };

        let updater = TranslationsUpdater::from_config(&config);
        let report = updater.regenerate_all_with_report().expect("Should sync");

        assert_eq!(report.languages.len(), 1);
        assert_eq!(
            report.diagnostics,
            vec!["Translation for Hello(en) is missing!".to_string()]
        );
        assert!(temp_dir.path().join("i18n/en/bot.po").is_file());
        assert!(!temp_dir.path().join("i18n/ru").exists());
    }

    #[test]
    fn test_missing_sources_dir_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let updater =
            TranslationsUpdater::new(temp_dir.path().join("i18n"), temp_dir.path().join("missing"));

        let result = updater.regenerate_all();
        assert!(matches!(result, Err(SyncError::Extraction { .. })));
    }
}
