//! Merging the reference catalog into a language's existing catalog.
//!
//! Identifiers are matched by exact string equality. Locations always come
//! from the reference (current sources); translations, fuzzy state, flags and
//! translator comments always come from the existing catalog (human work).

use crate::i18n::catalog::{Catalog, Message};
use crate::i18n::Language;

/// Result of merging one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub catalog: Catalog,
    /// Set when the merged catalog has obsolete entries
    pub obsolete_warning: Option<String>,
}

/// Merges a reference catalog into existing catalogs of one language.
#[derive(Debug, Clone, Copy)]
pub struct CatalogMerger {
    language: Language,
}

impl CatalogMerger {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Merge `reference` into `existing`.
    ///
    /// - reference ids already live keep their translations, with refreshed
    ///   locations
    /// - reference ids found among the obsolete entries come back with their
    ///   old translation, marked fuzzy
    /// - new reference ids are added untranslated
    /// - live ids missing from the reference become obsolete; previously
    ///   obsolete ids that are still missing stay obsolete
    pub fn merge(&self, existing: Catalog, reference: &Catalog) -> MergeOutcome {
        let (mut live, mut obsolete) = existing.into_parts();
        let mut merged = Catalog::new();

        for template in reference.messages() {
            let message = if let Some(mut current) = live.remove(&template.id) {
                current.locations = template.locations.clone();
                self.reconcile_plural(&mut current, template);
                current
            } else if let Some(mut revived) = obsolete.remove(&template.id) {
                revived.locations = template.locations.clone();
                revived.fuzzy = revived.has_any_translation();
                self.reconcile_plural(&mut revived, template);
                revived
            } else {
                self.untranslated(template)
            };
            merged.insert(message);
        }

        for (_, mut stale) in live {
            stale.locations.clear();
            merged.insert_obsolete(stale);
        }
        for (_, stale) in obsolete {
            merged.insert_obsolete(stale);
        }

        let obsolete_warning = if merged.obsolete_len() > 0 {
            Some(format!(
                "Obsolete lines found in {}: {}",
                self.language,
                merged.obsolete_ids().join(", ")
            ))
        } else {
            None
        };

        MergeOutcome {
            catalog: merged,
            obsolete_warning,
        }
    }

    fn forms_for(&self, template: &Message) -> usize {
        if template.is_plural() {
            self.language.plural_forms()
        } else {
            1
        }
    }

    fn untranslated(&self, template: &Message) -> Message {
        let mut message = match &template.plural_id {
            Some(plural_id) => Message::plural(&template.id, plural_id, self.forms_for(template)),
            None => Message::new(&template.id),
        };
        message.locations = template.locations.clone();
        message
    }

    /// A message whose plural identifier changed keeps whatever translation
    /// still fits and needs review.
    fn reconcile_plural(&self, message: &mut Message, template: &Message) {
        if message.plural_id == template.plural_id {
            return;
        }
        message.plural_id = template.plural_id.clone();
        message
            .translations
            .resize(self.forms_for(template), String::new());
        if message.has_any_translation() {
            message.fuzzy = true;
        }
    }
}
