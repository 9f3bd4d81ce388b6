//! Catalog statistics and the per-run synchronization report.
//!
//! The report is what the `update-translations` binary optionally writes as
//! JSON so CI jobs can track translation coverage over time.

use crate::i18n::Language;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Message counts for one language after a merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogMetrics {
    #[serde(serialize_with = "serialize_language")]
    pub language: Language,

    /// Live messages
    pub total: usize,

    /// Live messages that passed validation
    pub translated: usize,

    pub missing: usize,

    pub fuzzy: usize,

    pub check_failed: usize,

    pub obsolete: usize,
}

impl CatalogMetrics {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            total: 0,
            translated: 0,
            missing: 0,
            fuzzy: 0,
            check_failed: 0,
            obsolete: 0,
        }
    }

    /// Share of live messages that passed validation, as a percentage (0-100).
    /// An empty catalog counts as fully translated.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.translated as f64 / self.total as f64) * 100.0
        }
    }
}

fn serialize_language<S: Serializer>(language: &Language, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(language.code())
}

/// Outcome of one synchronization run over all languages.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub generated_at: DateTime<Utc>,

    /// True when every language validated clean
    pub complete: bool,

    pub languages: Vec<CatalogMetrics>,

    /// Diagnostics of all languages, in processing order
    pub diagnostics: Vec<String>,

    /// Obsolete-entry warnings, one per affected language
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            complete: true,
            languages: Vec::new(),
            diagnostics: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Metrics of one language, if it was processed.
    pub fn language(&self, language: Language) -> Option<&CatalogMetrics> {
        self.languages.iter().find(|metrics| metrics.language == language)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize sync report")
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}
