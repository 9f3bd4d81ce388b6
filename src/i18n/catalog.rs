//! In-memory message catalog model.
//!
//! A [`Catalog`] holds the live messages of one language keyed by identifier,
//! plus the obsolete messages that used to be live but no longer appear in
//! the sources. Both maps are `BTreeMap`s so iteration is always sorted by
//! identifier, which keeps written catalogs stable across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A place in the sources where a message identifier is used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// Path relative to the sources root, `/`-separated
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One translatable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Source-language text, unique within a catalog
    pub id: String,

    /// Source-language plural text for `ngettext` messages
    pub plural_id: Option<String>,

    /// One entry for singular messages, one per plural form otherwise.
    /// Empty strings mean "not translated yet".
    pub translations: Vec<String>,

    pub locations: Vec<Location>,

    /// Translation is a stale near-match waiting for confirmation
    pub fuzzy: bool,

    /// gettext flags other than `fuzzy`, kept as read
    pub flags: BTreeSet<String>,

    /// Translator comments
    pub comments: Vec<String>,
}

impl Message {
    /// Create an untranslated singular message.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plural_id: None,
            translations: vec![String::new()],
            locations: Vec::new(),
            fuzzy: false,
            flags: BTreeSet::new(),
            comments: Vec::new(),
        }
    }

    /// Create an untranslated plural message with `forms` empty translations.
    pub fn plural(id: impl Into<String>, plural_id: impl Into<String>, forms: usize) -> Self {
        Self {
            plural_id: Some(plural_id.into()),
            translations: vec![String::new(); forms],
            ..Self::new(id)
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translations = vec![translation.into()];
        self
    }

    pub fn with_translations<I, S>(mut self, translations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translations = translations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn is_plural(&self) -> bool {
        self.plural_id.is_some()
    }

    /// The (singular) translated string, empty when untranslated.
    pub fn translation(&self) -> &str {
        self.translations.first().map(String::as_str).unwrap_or("")
    }

    /// True when every form carries a non-empty translation.
    pub fn is_translated(&self) -> bool {
        !self.translations.is_empty() && self.translations.iter().all(|t| !t.is_empty())
    }

    /// True when at least one form has been translated.
    pub fn has_any_translation(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }
}

/// The messages of one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: BTreeMap<String, Message>,
    obsolete: BTreeMap<String, Message>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a live message, replacing any message with the same identifier.
    ///
    /// An identifier that is currently obsolete is taken out of the obsolete
    /// set so it never lives in both maps.
    pub fn insert(&mut self, message: Message) -> Option<Message> {
        debug_assert!(!message.id.is_empty(), "message identifiers are non-empty");
        self.obsolete.remove(&message.id);
        self.messages.insert(message.id.clone(), message)
    }

    /// Record an obsolete message. Ignored if the identifier is live.
    pub fn insert_obsolete(&mut self, message: Message) {
        if !self.messages.contains_key(&message.id) {
            self.obsolete.insert(message.id.clone(), message);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.messages.contains_key(id)
    }

    pub fn is_obsolete(&self, id: &str) -> bool {
        self.obsolete.contains_key(id)
    }

    /// Live messages sorted by identifier.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Obsolete messages sorted by identifier.
    pub fn obsolete(&self) -> impl Iterator<Item = &Message> {
        self.obsolete.values()
    }

    pub fn obsolete_ids(&self) -> Vec<&str> {
        self.obsolete.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn obsolete_len(&self) -> usize {
        self.obsolete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.obsolete.is_empty()
    }

    /// Split into (live, obsolete) maps.
    pub(crate) fn into_parts(self) -> (BTreeMap<String, Message>, BTreeMap<String, Message>) {
        (self.messages, self.obsolete)
    }
}
