//! Translation completeness and quality validation.
//!
//! Every live message of a merged catalog is classified as ok, missing,
//! fuzzy or check-failed. Checks compare the placeholders of the source text
//! with those of each translated form, so a translator who drops or mistypes
//! a `%s` or `{name}` is caught before the catalog ships.

use crate::i18n::catalog::{Catalog, Message};
use crate::i18n::metrics::CatalogMetrics;
use crate::i18n::Language;
use regex::Regex;
use std::sync::OnceLock;

/// Classification of one message. Earlier variants take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    Ok,
    /// At least one form is untranslated
    Missing,
    /// Translated but flagged fuzzy
    Fuzzy,
    /// Translated and confirmed, but checks found problems
    CheckFailed(Vec<String>),
}

/// Validation outcome for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub language: Language,

    /// True when every message is ok
    pub complete: bool,

    /// One line per non-ok message, in identifier order
    pub diagnostics: Vec<String>,

    pub metrics: CatalogMetrics,
}

impl ValidationReport {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Validator for merged catalogs.
pub struct TranslationValidator;

static PERCENT_PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static BRACE_PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Classify a message. `plural_forms` is the form count of the catalog's
    /// language.
    pub fn classify(message: &Message, plural_forms: usize) -> MessageStatus {
        if !message.is_translated() {
            return MessageStatus::Missing;
        }
        if message.fuzzy {
            return MessageStatus::Fuzzy;
        }
        let errors = Self::check_message(message, plural_forms);
        if errors.is_empty() {
            MessageStatus::Ok
        } else {
            MessageStatus::CheckFailed(errors)
        }
    }

    /// Run the quality checks on a message and describe every failure.
    ///
    /// Untranslated forms are not checked.
    pub fn check_message(message: &Message, plural_forms: usize) -> Vec<String> {
        let mut errors = Vec::new();

        if message.is_plural() && message.translations.len() != plural_forms {
            errors.push(format!(
                "expected {} plural forms, found {}",
                plural_forms,
                message.translations.len()
            ));
        }

        for (index, translation) in message.translations.iter().enumerate() {
            if translation.is_empty() {
                continue;
            }
            let source = match (&message.plural_id, index) {
                (Some(plural_id), i) if i > 0 => plural_id.as_str(),
                _ => message.id.as_str(),
            };

            let expected = Self::extract_placeholders(source);
            let found = Self::extract_placeholders(translation);
            if expected != found {
                errors.push(format!(
                    "placeholders in form {} do not match: expected {:?}, found {:?}",
                    index, expected, found
                ));
            }
        }

        errors
    }

    /// Validate every live message of `catalog`.
    pub fn validate(language: Language, catalog: &Catalog) -> ValidationReport {
        let plural_forms = language.plural_forms();
        let mut metrics = CatalogMetrics::new(language);
        let mut diagnostics = Vec::new();

        for message in catalog.messages() {
            metrics.total += 1;
            match Self::classify(message, plural_forms) {
                MessageStatus::Ok => metrics.translated += 1,
                MessageStatus::Missing => {
                    metrics.missing += 1;
                    diagnostics.push(format!(
                        "Translation for {}({}) is missing!",
                        message.id, language
                    ));
                }
                MessageStatus::Fuzzy => {
                    metrics.fuzzy += 1;
                    diagnostics.push(format!(
                        "Translation for {}({}) is fuzzy!",
                        message.id, language
                    ));
                }
                MessageStatus::CheckFailed(errors) => {
                    metrics.check_failed += 1;
                    diagnostics.push(format!(
                        "{}({}): check failed: {}",
                        message.id,
                        language,
                        errors.join(", ")
                    ));
                }
            }
        }
        metrics.obsolete = catalog.obsolete_len();

        ValidationReport {
            language,
            complete: diagnostics.is_empty(),
            diagnostics,
            metrics,
        }
    }

    /// All `%`-style and `{}`-style placeholders of `text`, sorted.
    fn extract_placeholders(text: &str) -> Vec<String> {
        let mut placeholders = Self::extract_percent_placeholders(text);
        placeholders.extend(Self::extract_brace_placeholders(text));
        placeholders.sort();
        placeholders
    }

    /// printf / Python `%` conversions, `%%` excluded
    fn extract_percent_placeholders(text: &str) -> Vec<String> {
        let regex = PERCENT_PLACEHOLDER_REGEX.get_or_init(|| {
            Regex::new(r"%(?:\([^)]*\))?[#0+\-]*(?:\*|\d+)?(?:\.(?:\*|\d+))?[hlL]?[diouxXeEfFgGcrsa%]")
                .unwrap()
        });

        regex
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|placeholder| *placeholder != "%%")
            .map(str::to_string)
            .collect()
    }

    /// `str.format` fields, `{{` and `}}` escapes excluded
    fn extract_brace_placeholders(text: &str) -> Vec<String> {
        let regex = BRACE_PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{[^{}]*\}").unwrap());
        let unescaped = text.replace("{{", "").replace("}}", "");

        regex
            .find_iter(&unescaped)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Message {
    /// Quality check failures of this message for a language with
    /// `plural_forms` forms.
    pub fn check(&self, plural_forms: usize) -> Vec<String> {
        TranslationValidator::check_message(self, plural_forms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Placeholder Extraction Tests ====================

    #[test]
    fn test_extract_percent_placeholders() {
        let placeholders = TranslationValidator::extract_percent_placeholders("%s has %d items");
        assert_eq!(placeholders, vec!["%s", "%d"]);
    }

    #[test]
    fn test_extract_named_percent_placeholders() {
        let placeholders =
            TranslationValidator::extract_percent_placeholders("%(name)s scored %(score).2f");
        assert_eq!(placeholders, vec!["%(name)s", "%(score).2f"]);
    }

    #[test]
    fn test_extract_percent_ignores_escaped_percent() {
        let placeholders = TranslationValidator::extract_percent_placeholders("100%% done");
        assert!(placeholders.is_empty());
    }

    #[test]
    fn test_extract_percent_ignores_percent_followed_by_space() {
        let placeholders = TranslationValidator::extract_percent_placeholders("50% off");
        assert!(placeholders.is_empty());
    }

    #[test]
    fn test_extract_brace_placeholders() {
        let placeholders = TranslationValidator::extract_brace_placeholders("Hi {name}, see {0}");
        assert_eq!(placeholders, vec!["{name}", "{0}"]);
    }

    #[test]
    fn test_extract_brace_ignores_escapes() {
        let placeholders = TranslationValidator::extract_brace_placeholders("{{literal}} and {real}");
        assert_eq!(placeholders, vec!["{real}"]);
    }

    #[test]
    fn test_extract_placeholders_sorted_multiset() {
        let a = TranslationValidator::extract_placeholders("%s and {x} and %s");
        let b = TranslationValidator::extract_placeholders("{x} %s %s");
        assert_eq!(a, b);
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_classify_ok() {
        let message = Message::new("Hi %s").with_translation("Привет %s");
        assert_eq!(TranslationValidator::classify(&message, 3), MessageStatus::Ok);
    }

    #[test]
    fn test_classify_missing() {
        let message = Message::new("Hi");
        assert_eq!(TranslationValidator::classify(&message, 3), MessageStatus::Missing);
    }

    #[test]
    fn test_classify_missing_beats_fuzzy() {
        let message = Message::new("Hi").with_fuzzy(true);
        assert_eq!(TranslationValidator::classify(&message, 3), MessageStatus::Missing);
    }

    #[test]
    fn test_classify_fuzzy_beats_check_failed() {
        let message = Message::new("Hi %s").with_translation("Привет").with_fuzzy(true);
        assert_eq!(TranslationValidator::classify(&message, 3), MessageStatus::Fuzzy);
    }

    #[test]
    fn test_classify_check_failed() {
        let message = Message::new("Hi %s").with_translation("Привет");
        match TranslationValidator::classify(&message, 3) {
            MessageStatus::CheckFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("%s"));
            }
            other => panic!("Expected CheckFailed, got {:?}", other),
        }
    }

    // ==================== Plural Check Tests ====================

    #[test]
    fn test_check_plural_forms_against_plural_id() {
        let message = Message::plural("%d file", "%(count)d files", 3).with_translations([
            "%d файл",
            "%(count)d файла",
            "%(count)d файлов",
        ]);
        assert!(message.check(3).is_empty());
    }

    #[test]
    fn test_check_plural_form_count_mismatch() {
        let message =
            Message::plural("%d file", "%d files", 2).with_translations(["%d файл", "%d файлов"]);
        let errors = message.check(3);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("expected 3 plural forms, found 2"));
    }

    #[test]
    fn test_check_singular_ignores_form_count() {
        let message = Message::new("Hi").with_translation("Привет");
        assert!(message.check(3).is_empty());
    }

    // ==================== Catalog Validation Tests ====================

    #[test]
    fn test_validate_complete_catalog() {
        let mut catalog = Catalog::new();
        catalog.insert(Message::new("Hi").with_translation("Привет"));

        let report = TranslationValidator::validate(Language::RUSSIAN, &catalog);

        assert!(report.complete);
        assert!(!report.has_diagnostics());
        assert_eq!(report.metrics.total, 1);
        assert_eq!(report.metrics.translated, 1);
    }

    #[test]
    fn test_validate_diagnostic_texts() {
        let mut catalog = Catalog::new();
        catalog.insert(Message::new("Hello"));
        catalog.insert(Message::new("Hi").with_translation("Привет").with_fuzzy(true));
        catalog.insert(Message::new("Score %d").with_translation("Счёт"));

        let report = TranslationValidator::validate(Language::RUSSIAN, &catalog);

        assert!(!report.complete);
        assert_eq!(report.diagnostics.len(), 3);
        assert_eq!(report.diagnostics[0], "Translation for Hello(ru) is missing!");
        assert_eq!(report.diagnostics[1], "Translation for Hi(ru) is fuzzy!");
        assert!(report.diagnostics[2].starts_with("Score %d(ru): check failed: placeholders in form 0"));
        assert_eq!(report.metrics.missing, 1);
        assert_eq!(report.metrics.fuzzy, 1);
        assert_eq!(report.metrics.check_failed, 1);
    }

    #[test]
    fn test_validate_ignores_obsolete_messages() {
        let mut catalog = Catalog::new();
        catalog.insert_obsolete(Message::new("Gone"));

        let report = TranslationValidator::validate(Language::RUSSIAN, &catalog);

        assert!(report.complete);
        assert_eq!(report.metrics.total, 0);
        assert_eq!(report.metrics.obsolete, 1);
    }

    #[test]
    fn test_validate_empty_catalog_is_complete() {
        let report = TranslationValidator::validate(Language::ENGLISH, &Catalog::new());
        assert!(report.complete);
    }
}
