//! Compiled `.mo` catalog format (GNU gettext machine object).
//!
//! Layout: a 28-byte header, a table of (length, offset) descriptors for the
//! original strings, a matching table for the translations, then the string
//! data, each string NUL-terminated. Originals are sorted bytewise so readers
//! can binary-search. No hash table is emitted.

use crate::i18n::catalog::{Catalog, Message};
use crate::i18n::error::MoParseError;
use crate::i18n::Language;

/// Magic number of a little-endian `.mo` file.
pub const MO_MAGIC_LE: u32 = 0x950412de;

/// The same magic as seen when reading a big-endian file as little-endian.
const MO_MAGIC_BE: u32 = 0xde120495;

const HEADER_SIZE: u32 = 28;

/// Metadata stored under the empty identifier.
pub fn catalog_header(language: Language) -> String {
    format!(
        "Language: {}\nMIME-Version: 1.0\nContent-Type: text/plain; charset=UTF-8\nContent-Transfer-Encoding: 8bit\nPlural-Forms: {}\n",
        language.code(),
        language.config().plural_forms_header()
    )
}

/// Whether a message belongs in the compiled catalog.
///
/// Untranslated and fuzzy messages are left out so lookups fall back to the
/// source-language identifier.
pub fn is_compilable(message: &Message) -> bool {
    message.is_translated() && !message.fuzzy
}

/// Compile the live messages of `catalog` into `.mo` bytes.
pub fn compile(catalog: &Catalog, language: Language) -> Vec<u8> {
    let mut entries: Vec<(String, String)> = catalog
        .messages()
        .filter(|message| is_compilable(message))
        .map(|message| match &message.plural_id {
            Some(plural_id) => (
                format!("{}\0{}", message.id, plural_id),
                message.translations.join("\0"),
            ),
            None => (message.id.clone(), message.translation().to_string()),
        })
        .collect();
    entries.push((String::new(), catalog_header(language)));
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    encode(&entries)
}

fn encode(entries: &[(String, String)]) -> Vec<u8> {
    let count = entries.len() as u32;
    let originals_offset = HEADER_SIZE;
    let translations_offset = originals_offset + count * 8;
    let strings_offset = translations_offset + count * 8;

    let mut original_descriptors = Vec::with_capacity(entries.len());
    let mut translation_descriptors = Vec::with_capacity(entries.len());
    let mut string_data: Vec<u8> = Vec::new();

    for (original, translation) in entries {
        original_descriptors.push((
            original.len() as u32,
            strings_offset + string_data.len() as u32,
        ));
        string_data.extend_from_slice(original.as_bytes());
        string_data.push(0);

        translation_descriptors.push((
            translation.len() as u32,
            strings_offset + string_data.len() as u32,
        ));
        string_data.extend_from_slice(translation.as_bytes());
        string_data.push(0);
    }

    let mut out = Vec::with_capacity(strings_offset as usize + string_data.len());
    for word in [
        MO_MAGIC_LE,
        0, // revision
        count,
        originals_offset,
        translations_offset,
        0, // hash table size
        0, // hash table offset
    ] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for (length, offset) in original_descriptors.iter().chain(&translation_descriptors) {
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
    }
    out.extend_from_slice(&string_data);
    out
}

/// A compiled catalog loaded for lookups.
#[derive(Debug, Clone, Default)]
pub struct CompiledCatalog {
    /// (original, translation), sorted by original
    entries: Vec<(String, String)>,
}

impl CompiledCatalog {
    /// Parse `.mo` bytes of either endianness.
    pub fn parse(bytes: &[u8]) -> Result<Self, MoParseError> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(MoParseError::TooShort);
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let big_endian = match magic {
            MO_MAGIC_LE => false,
            MO_MAGIC_BE => true,
            other => return Err(MoParseError::BadMagic(other)),
        };
        let word = |offset: usize| -> Result<u32, MoParseError> {
            let chunk: [u8; 4] = bytes
                .get(offset..offset + 4)
                .and_then(|slice| slice.try_into().ok())
                .ok_or(MoParseError::TooShort)?;
            Ok(if big_endian {
                u32::from_be_bytes(chunk)
            } else {
                u32::from_le_bytes(chunk)
            })
        };

        let count = word(8)? as usize;
        let originals_offset = word(12)? as usize;
        let translations_offset = word(16)? as usize;

        // Both descriptor tables must fit before `count` is trusted.
        let table_fits = |table: usize| {
            count
                .checked_mul(8)
                .and_then(|size| size.checked_add(table))
                .map_or(false, |end| end <= bytes.len())
        };
        if !table_fits(originals_offset) || !table_fits(translations_offset) {
            return Err(MoParseError::TooShort);
        }

        let string_at = |table: usize, index: usize| -> Result<String, MoParseError> {
            let descriptor = table + index * 8;
            let length = word(descriptor)? as usize;
            let offset = word(descriptor + 4)? as usize;
            let raw = offset
                .checked_add(length)
                .and_then(|end| bytes.get(offset..end))
                .ok_or(MoParseError::OutOfBounds(index))?;
            String::from_utf8(raw.to_vec()).map_err(|_| MoParseError::InvalidUtf8(index))
        };

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            entries.push((
                string_at(originals_offset, index)?,
                string_at(translations_offset, index)?,
            ));
        }
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        Ok(Self { entries })
    }

    fn find(&self, key: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|(original, _)| original.as_bytes().cmp(key.as_bytes()))
            .ok()
            .map(|index| self.entries[index].1.as_str())
    }

    /// Translation of a singular message.
    pub fn get(&self, id: &str) -> Option<&str> {
        if id.is_empty() {
            return None;
        }
        self.find(id)
    }

    /// All plural forms of a plural message.
    pub fn get_plural(&self, id: &str, plural_id: &str) -> Option<Vec<&str>> {
        self.find(&format!("{}\0{}", id, plural_id))
            .map(|forms| forms.split('\0').collect())
    }

    /// Catalog metadata (the translation of the empty identifier).
    pub fn header(&self) -> Option<&str> {
        self.find("")
    }

    /// Number of messages, header excluded.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|(original, _)| !original.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
