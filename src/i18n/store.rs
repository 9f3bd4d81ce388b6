//! On-disk catalog storage.
//!
//! For language `L` and domain `D` under the locale directory:
//! - `L/D.po` is the editable catalog
//! - `L/LC_MESSAGES/D.mo` is the compiled catalog
//!
//! Both files are replaced atomically (temp file + rename in the target
//! directory), editable first, so a crash never leaves a compiled catalog
//! newer than its editable source.

use crate::i18n::catalog::Catalog;
use crate::i18n::error::SyncError;
use crate::i18n::{mo, po, Language};
use anyhow::bail;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// Default catalog domain (base file name).
pub const DEFAULT_DOMAIN: &str = "zordon";

/// What to do with an existing editable catalog that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptCatalogPolicy {
    /// Abort the run
    #[default]
    Fail,
    /// Back the file up as `D.po.corrupt` and start from an empty catalog
    Reset,
}

impl FromStr for CorruptCatalogPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "reset" => Ok(Self::Reset),
            other => bail!("Unknown corrupt catalog policy '{}' (expected 'fail' or 'reset')", other),
        }
    }
}

/// Reads and writes the per-language catalog files.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    locale_dir: PathBuf,
    domain: String,
    corrupt_policy: CorruptCatalogPolicy,
}

impl CatalogStore {
    pub fn new(locale_dir: impl Into<PathBuf>) -> Self {
        Self {
            locale_dir: locale_dir.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            corrupt_policy: CorruptCatalogPolicy::default(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptCatalogPolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    pub fn locale_dir(&self) -> &Path {
        &self.locale_dir
    }

    /// Path of the editable catalog.
    pub fn po_path(&self, language: Language) -> PathBuf {
        self.locale_dir
            .join(language.code())
            .join(format!("{}.po", self.domain))
    }

    /// Path of the compiled catalog.
    pub fn mo_path(&self, language: Language) -> PathBuf {
        self.locale_dir
            .join(language.code())
            .join("LC_MESSAGES")
            .join(format!("{}.mo", self.domain))
    }

    /// Whether the compiled catalog exists.
    pub fn has_compiled(&self, language: Language) -> bool {
        self.mo_path(language).is_file()
    }

    /// Load the editable catalog, or an empty one if there is none yet.
    pub fn read(&self, language: Language) -> Result<Catalog, SyncError> {
        let path = self.po_path(language);
        if !path.is_file() {
            debug!(language = %language, path = %path.display(), "No existing catalog");
            return Ok(Catalog::new());
        }

        let parsed = File::open(&path)
            .map_err(Into::into)
            .and_then(po::read_po);

        match parsed {
            Ok(catalog) => Ok(catalog),
            Err(source) if source.is_corruption() && self.corrupt_policy == CorruptCatalogPolicy::Reset => {
                let backup = path.with_extension("po.corrupt");
                error!(
                    language = %language,
                    path = %path.display(),
                    backup = %backup.display(),
                    "Existing catalog is corrupt ({}); starting from an empty catalog",
                    source
                );
                fs::copy(&path, &backup).map_err(|source| SyncError::StoreWrite {
                    path: backup.clone(),
                    source,
                })?;
                Ok(Catalog::new())
            }
            Err(source) => Err(SyncError::StoreRead { path, source }),
        }
    }

    /// Persist the editable catalog, then the compiled catalog derived from
    /// the same in-memory object.
    pub fn write(&self, language: Language, catalog: &Catalog) -> Result<(), SyncError> {
        let mo_path = self.mo_path(language);
        let mo_dir = mo_path.parent().unwrap_or(&self.locale_dir);
        fs::create_dir_all(mo_dir).map_err(|source| SyncError::StoreWrite {
            path: mo_dir.to_path_buf(),
            source,
        })?;

        let po_path = self.po_path(language);
        replace_file(&po_path, po::write_po(catalog).as_bytes())?;
        replace_file(&mo_path, &mo::compile(catalog, language))?;

        debug!(
            language = %language,
            po = %po_path.display(),
            mo = %mo_path.display(),
            "Catalog written"
        );
        Ok(())
    }
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<(), SyncError> {
    let write_error = |source: io::Error| SyncError::StoreWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::catalog::{Location, Message};
    use crate::i18n::mo::CompiledCatalog;
    use tempfile::TempDir;

    fn create_test_store() -> (CatalogStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = CatalogStore::new(temp_dir.path().join("i18n"));
        (store, temp_dir)
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            Message::new("Hi")
                .with_translation("Привет")
                .with_location(Location::new("a.py", 1)),
        );
        catalog.insert_obsolete(Message::new("Bye").with_translation("Пока"));
        catalog
    }

    // ==================== Path Tests ====================

    #[test]
    fn test_paths_follow_gettext_layout() {
        let store = CatalogStore::new("/app/i18n");
        assert_eq!(store.po_path(Language::RUSSIAN), PathBuf::from("/app/i18n/ru/zordon.po"));
        assert_eq!(
            store.mo_path(Language::RUSSIAN),
            PathBuf::from("/app/i18n/ru/LC_MESSAGES/zordon.mo")
        );
    }

    #[test]
    fn test_custom_domain() {
        let store = CatalogStore::new("/app/i18n").with_domain("bot");
        assert_eq!(store.po_path(Language::ENGLISH), PathBuf::from("/app/i18n/en/bot.po"));
    }

    // ==================== Read Tests ====================

    #[test]
    fn test_read_missing_catalog_is_empty() {
        let (store, _temp_dir) = create_test_store();
        let catalog = store.read(Language::RUSSIAN).expect("Should read");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let (store, _temp_dir) = create_test_store();
        let catalog = sample_catalog();

        store.write(Language::RUSSIAN, &catalog).expect("Should write");
        let read_back = store.read(Language::RUSSIAN).expect("Should read");

        assert_eq!(read_back, catalog);
    }

    #[test]
    fn test_read_corrupt_catalog_fails_by_default() {
        let (store, _temp_dir) = create_test_store();
        let path = store.po_path(Language::RUSSIAN);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "msgid \"Hi\"\nthis is not a catalog\n").unwrap();

        let result = store.read(Language::RUSSIAN);
        assert!(matches!(result, Err(SyncError::StoreRead { .. })));
    }

    #[test]
    fn test_read_corrupt_catalog_reset_policy() {
        let (store, _temp_dir) = create_test_store();
        let store = store.with_corrupt_policy(CorruptCatalogPolicy::Reset);
        let path = store.po_path(Language::RUSSIAN);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "garbage\n").unwrap();

        let catalog = store.read(Language::RUSSIAN).expect("Should fall back");

        assert!(catalog.is_empty());
        let backup = path.with_extension("po.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "garbage\n");
    }

    // ==================== Write Tests ====================

    #[test]
    fn test_write_creates_directories_and_both_files() {
        let (store, _temp_dir) = create_test_store();
        assert!(!store.has_compiled(Language::RUSSIAN));

        store.write(Language::RUSSIAN, &sample_catalog()).expect("Should write");

        assert!(store.po_path(Language::RUSSIAN).is_file());
        assert!(store.has_compiled(Language::RUSSIAN));

        let bytes = fs::read(store.mo_path(Language::RUSSIAN)).unwrap();
        let compiled = CompiledCatalog::parse(&bytes).expect("Should parse");
        assert_eq!(compiled.get("Hi"), Some("Привет"));
    }

    #[test]
    fn test_write_overwrites_previous_files() {
        let (store, _temp_dir) = create_test_store();
        store.write(Language::RUSSIAN, &sample_catalog()).expect("Should write");
        store.write(Language::RUSSIAN, &Catalog::new()).expect("Should write");

        let text = fs::read_to_string(store.po_path(Language::RUSSIAN)).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_write_fails_when_locale_dir_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("i18n");
        fs::write(&blocker, "not a directory").unwrap();

        let store = CatalogStore::new(&blocker);
        let result = store.write(Language::RUSSIAN, &sample_catalog());
        assert!(matches!(result, Err(SyncError::StoreWrite { .. })));
    }

    // ==================== Policy Parsing Tests ====================

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fail".parse::<CorruptCatalogPolicy>().unwrap(), CorruptCatalogPolicy::Fail);
        assert_eq!(" Reset ".parse::<CorruptCatalogPolicy>().unwrap(), CorruptCatalogPolicy::Reset);
        assert!("ignore".parse::<CorruptCatalogPolicy>().is_err());
    }
}
