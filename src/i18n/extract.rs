//! Translatable string extraction from a source tree.
//!
//! Markers are calls such as `_("Hello")` or `ngettext("%d day", "%d days", n)`
//! whose leading arguments are string literals. Literal syntax follows Python:
//! single, double and triple quotes, `r`/`u`/`b` prefixes, adjacent literals
//! concatenated, backslash escapes decoded unless the literal is raw.
//!
//! Each file is scanned token by token: string literals and `#` comments are
//! skipped whole, so marker-looking text inside them is never extracted.

use crate::i18n::catalog::Location;
use crate::i18n::error::SyncError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A function name that marks its string arguments as translatable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    /// Takes a singular and a plural identifier
    pub plural: bool,
}

impl Keyword {
    pub fn singular(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural: false,
        }
    }

    pub fn plural(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural: true,
        }
    }
}

/// `_`, `gettext`, `N_` and `ngettext`.
pub fn default_keywords() -> Vec<Keyword> {
    vec![
        Keyword::singular("_"),
        Keyword::singular("gettext"),
        Keyword::singular("N_"),
        Keyword::plural("ngettext"),
    ]
}

/// Everything known about one identifier after scanning the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub plural_id: Option<String>,
    /// Every occurrence, in walk order
    pub locations: Vec<Location>,
}

/// Identifier → occurrences.
pub type Extraction = BTreeMap<String, ExtractedMessage>;

/// A marker found in a single source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub line: u32,
    pub id: String,
    pub plural_id: Option<String>,
}

/// Malformed marker arguments in a source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SourceSyntaxError {
    pub line: usize,
    pub message: String,
}

/// Scans source files for translation markers.
#[derive(Debug, Clone)]
pub struct StringExtractor {
    extensions: Vec<String>,
    keywords: Vec<Keyword>,
}

impl Default for StringExtractor {
    fn default() -> Self {
        Self::new(vec!["py".to_string()], default_keywords())
    }
}

impl StringExtractor {
    /// Create an extractor for files with the given extensions (without the
    /// leading dot).
    pub fn new(extensions: Vec<String>, keywords: Vec<Keyword>) -> Self {
        Self {
            extensions,
            keywords,
        }
    }

    /// Extract every marker under `root`.
    ///
    /// Fails on the first unreadable or malformed file: a partial extraction
    /// would turn live strings into obsolete ones.
    pub fn extract_from_dir(&self, root: &Path) -> Result<Extraction, SyncError> {
        let mut extraction = Extraction::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|err| SyncError::Extraction {
                path: err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source: err.into(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_source_file(path) {
                continue;
            }

            let source = fs::read_to_string(path).map_err(|source| SyncError::Extraction {
                path: path.to_path_buf(),
                source,
            })?;

            let occurrences =
                self.extract_from_source(&source)
                    .map_err(|err| SyncError::ExtractionParse {
                        path: path.to_path_buf(),
                        line: err.line,
                        message: err.message,
                    })?;

            if occurrences.is_empty() {
                continue;
            }

            let file = relative_name(root, path);
            debug!(file = %file, count = occurrences.len(), "Extracted strings");

            for occurrence in occurrences {
                let extracted = extraction.entry(occurrence.id).or_default();
                if extracted.plural_id.is_none() {
                    extracted.plural_id = occurrence.plural_id;
                }
                extracted
                    .locations
                    .push(Location::new(file.clone(), occurrence.line));
            }
        }

        Ok(extraction)
    }

    /// Extract markers from one source text, in order of appearance.
    ///
    /// Only a malformed literal argument of a marker is an error; stray
    /// quotes elsewhere are tolerated.
    pub fn extract_from_source(&self, source: &str) -> Result<Vec<Occurrence>, SourceSyntaxError> {
        let mut occurrences = Vec::new();
        let mut cursor = Cursor::new(source, 0);
        let mut line = 1usize;
        let mut counted_to = 0usize;

        while let Some(c) = cursor.peek() {
            match c {
                '#' => cursor.skip_comment(),
                '"' | '\'' => cursor.skip_literal(),
                c if is_identifier_char(c) => {
                    let start = cursor.pos;
                    let word = cursor.identifier();
                    if matches!(cursor.peek(), Some('"' | '\'')) && is_string_prefix(word) {
                        cursor.skip_literal();
                        continue;
                    }
                    let Some(keyword) = self.keywords.iter().find(|k| k.name == word) else {
                        continue;
                    };

                    let mut call = cursor;
                    call.skip_whitespace();
                    if !call.eat('(') {
                        continue;
                    }
                    line += source[counted_to..start].matches('\n').count();
                    counted_to = start;
                    // Arguments are rescanned as ordinary tokens afterwards.
                    cursor = call;

                    if let Some(occurrence) = marker_occurrence(source, call.pos, keyword, line)? {
                        occurrences.push(occurrence);
                    }
                }
                _ => {
                    cursor.bump();
                }
            }
        }

        Ok(occurrences)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false)
    }
}

fn marker_occurrence(
    source: &str,
    args_start: usize,
    keyword: &Keyword,
    line: usize,
) -> Result<Option<Occurrence>, SourceSyntaxError> {
    let wanted = if keyword.plural { 2 } else { 1 };
    let args = parse_string_args(source, args_start, wanted)
        .map_err(|message| SourceSyntaxError { line, message })?;

    let Some(mut args) = args else {
        debug!(line, keyword = %keyword.name, "Skipping marker without literal arguments");
        return Ok(None);
    };

    let plural_id = if keyword.plural { args.pop() } else { None };
    let id = args.swap_remove(0);
    if id.is_empty() {
        warn!(line, "Skipping marker with an empty message identifier");
        return Ok(None);
    }

    Ok(Some(Occurrence {
        line: u32::try_from(line).unwrap_or(u32::MAX),
        id,
        plural_id,
    }))
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// `r`, `b`, `f` and `u` prefixes in any case, including the two-letter combinations.
fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

/// Directories named `.git`, `__pycache__` and the like are never scanned.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.') || name.starts_with('_'))
            .unwrap_or(false)
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse `wanted` comma-separated string arguments starting right after the
/// opening parenthesis. `Ok(None)` means an argument was not a literal.
fn parse_string_args(
    source: &str,
    start: usize,
    wanted: usize,
) -> Result<Option<Vec<String>>, String> {
    let mut cursor = Cursor::new(source, start);
    let mut args = Vec::with_capacity(wanted);

    for index in 0..wanted {
        if index > 0 {
            cursor.skip_trivia();
            if !cursor.eat(',') {
                return Ok(None);
            }
        }
        match cursor.concatenated_literal()? {
            Some(value) => args.push(value),
            None => return Ok(None),
        }
    }

    Ok(Some(args))
}

#[derive(Clone, Copy)]
struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str, pos: usize) -> Self {
        Self { source, pos }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().map_or(false, is_identifier_char) {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Skip a literal starting at its opening quote. An unterminated literal
    /// ends at the line break, or at end of input when triple-quoted.
    fn skip_literal(&mut self) {
        let Some(quote) = self.bump() else {
            return;
        };
        let closing: String = [quote, quote].iter().collect();
        let triple = self.rest().starts_with(&closing);
        if triple {
            self.pos += closing.len();
        }

        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '\n' if !triple => return,
                c if c == quote => {
                    if !triple {
                        return;
                    }
                    if self.rest().starts_with(&closing) {
                        self.pos += closing.len();
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip whitespace, line continuations and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('\\') if self.rest()[1..].starts_with('\n') => {
                    self.pos += 2;
                }
                Some('#') => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Length of a string prefix at the cursor and whether it makes the
    /// literal raw, or `None` when no plain string literal starts here.
    fn literal_start(&self) -> Option<(usize, bool)> {
        for (i, c) in self.rest().char_indices() {
            if c == '"' || c == '\'' {
                let prefix = self.rest()[..i].to_ascii_lowercase();
                return match prefix.as_str() {
                    "" | "u" | "b" => Some((i, false)),
                    "r" | "br" | "rb" => Some((i, true)),
                    _ => None,
                };
            }
            if !c.is_ascii_alphabetic() || i >= 2 {
                return None;
            }
        }
        None
    }

    fn concatenated_literal(&mut self) -> Result<Option<String>, String> {
        let mut value: Option<String> = None;
        loop {
            self.skip_trivia();
            let Some((prefix_len, raw)) = self.literal_start() else {
                break;
            };
            self.pos += prefix_len;
            let part = self.string_literal(raw)?;
            value.get_or_insert_with(String::new).push_str(&part);
        }
        Ok(value)
    }

    fn string_literal(&mut self, raw: bool) -> Result<String, String> {
        const UNTERMINATED: &str = "unterminated string literal";

        let quote = self.bump().ok_or(UNTERMINATED)?;
        let closing: String = [quote, quote].iter().collect();
        let triple = self.rest().starts_with(&closing);
        if triple {
            self.pos += closing.len();
        }

        let mut value = String::new();
        loop {
            let c = self.bump().ok_or(UNTERMINATED)?;
            if c == quote {
                if !triple {
                    return Ok(value);
                }
                if self.rest().starts_with(&closing) {
                    self.pos += closing.len();
                    return Ok(value);
                }
                value.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(UNTERMINATED.to_string());
            }
            if c != '\\' {
                value.push(c);
                continue;
            }

            let next = self.bump().ok_or(UNTERMINATED)?;
            if raw {
                value.push('\\');
                value.push(next);
                continue;
            }
            match next {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                '\\' | '\'' | '"' => value.push(next),
                '\n' => {}
                'x' => self.push_code_point(&mut value, 2, next),
                'u' => self.push_code_point(&mut value, 4, next),
                'U' => self.push_code_point(&mut value, 8, next),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }
    }

    /// Decode `\xHH`, `\uHHHH` or `\UHHHHHHHH`; malformed escapes are kept as written.
    fn push_code_point(&mut self, value: &mut String, digits: usize, escape: char) {
        let decoded = self
            .rest()
            .get(..digits)
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                self.pos += digits;
                value.push(c);
            }
            None => {
                value.push('\\');
                value.push(escape);
            }
        }
    }
}
