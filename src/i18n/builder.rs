//! Reference catalog construction.

use crate::i18n::catalog::{Catalog, Message};
use crate::i18n::extract::Extraction;

/// Source-language plural messages carry a singular and a plural form.
const REFERENCE_PLURAL_FORMS: usize = 2;

/// Build the reference catalog for a run: every extracted identifier becomes
/// an untranslated, non-fuzzy message with the extracted locations.
///
/// The reference is only ever used as merge input and is never written.
pub fn build_reference_catalog(extraction: Extraction) -> Catalog {
    let mut catalog = Catalog::new();
    for (id, extracted) in extraction {
        let mut message = match extracted.plural_id {
            Some(plural_id) => Message::plural(id, plural_id, REFERENCE_PLURAL_FORMS),
            None => Message::new(id),
        };
        message.locations = extracted.locations;
        catalog.insert(message);
    }
    catalog
}
