//! Language registry: Single source of truth for all supported languages.
//!
//! Every language listed here gets its own catalog directory under the locale
//! directory. The registry is immutable and initialized once with `OnceLock`.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ru")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Russian")
    pub name: &'static str,

    /// Whether catalogs are maintained for this language
    pub enabled: bool,

    /// Number of plural forms a plural message needs in this language
    pub plural_forms: usize,

    /// C expression selecting the plural form for `n`
    pub plural_expression: &'static str,
}

impl LanguageConfig {
    /// Value of the `Plural-Forms` catalog header for this language.
    pub fn plural_forms_header(&self) -> String {
        format!(
            "nplurals={}; plural={};",
            self.plural_forms, self.plural_expression
        )
    }
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }
}

/// Default language configurations.
///
/// English is the source language of the identifiers; it still gets its own
/// catalog so wording can be adjusted without touching the sources.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "ru",
            name: "Russian",
            enabled: true,
            plural_forms: 3,
            plural_expression: "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        },
        LanguageConfig {
            code: "en",
            name: "English",
            enabled: true,
            plural_forms: 2,
            plural_expression: "(n != 1)",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LanguageRegistry::get()
            .get_by_code("en")
            .expect("English should be registered");

        assert_eq!(config.name, "English");
        assert!(config.enabled);
        assert_eq!(config.plural_forms, 2);
    }

    #[test]
    fn test_get_by_code_russian() {
        let config = LanguageRegistry::get()
            .get_by_code("ru")
            .expect("Russian should be registered");

        assert_eq!(config.name, "Russian");
        assert!(config.enabled);
        assert_eq!(config.plural_forms, 3);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("fr").is_none());
    }

    #[test]
    fn test_list_enabled_contains_russian_and_english() {
        let enabled = LanguageRegistry::get().list_enabled();

        assert_eq!(enabled.len(), 2);
        assert!(enabled.iter().any(|lang| lang.code == "ru"));
        assert!(enabled.iter().any(|lang| lang.code == "en"));
    }

    #[test]
    fn test_plural_forms_header() {
        let english = LanguageRegistry::get().get_by_code("en").unwrap();
        assert_eq!(english.plural_forms_header(), "nplurals=2; plural=(n != 1);");
    }
}
