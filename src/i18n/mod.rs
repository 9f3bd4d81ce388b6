//! Translation catalog synchronization.
//!
//! Keeps one gettext catalog per supported language in step with the
//! translatable strings of a source tree, preserving earlier human
//! translations and reporting whatever still needs a translator.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe handle onto a registry entry
//! - `catalog`: In-memory message model
//! - `extract`: Marker scanning over the source tree
//! - `builder`: Reference catalog from an extraction
//! - `po` / `mo`: Editable and compiled catalog formats
//! - `store`: On-disk catalog layout and atomic writes
//! - `merge`: Reference into existing, with obsolete tracking
//! - `validator`: Missing / fuzzy / check-failed classification
//! - `metrics`: Per-language counts and the run report
//! - `updater`: The whole pipeline over every language
//!
//! # Example
//!
//! ```rust,ignore
//! use zordon::i18n::TranslationsUpdater;
//!
//! let updater = TranslationsUpdater::new("app/i18n", "app");
//! if !updater.is_already_generated() {
//!     let complete = updater.regenerate_all()?;
//! }
//! ```

mod builder;
mod catalog;
mod error;
mod extract;
mod language;
mod merge;
mod metrics;
pub mod mo;
pub mod po;
mod registry;
mod store;
mod updater;
mod validator;

pub use builder::build_reference_catalog;
pub use catalog::{Catalog, Location, Message};
pub use error::{MoParseError, PoParseError, SyncError};
pub use extract::{
    default_keywords, ExtractedMessage, Extraction, Keyword, Occurrence, SourceSyntaxError,
    StringExtractor,
};
pub use language::Language;
pub use merge::{CatalogMerger, MergeOutcome};
pub use metrics::{CatalogMetrics, SyncReport};
pub use mo::CompiledCatalog;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::{CatalogStore, CorruptCatalogPolicy, DEFAULT_DOMAIN};
pub use updater::TranslationsUpdater;
pub use validator::{MessageStatus, TranslationValidator, ValidationReport};
