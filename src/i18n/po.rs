//! Editable `.po` catalog format.
//!
//! Output is deterministic: live messages sorted by identifier, then obsolete
//! messages (`#~`) sorted by identifier, no header and no line wrapping. The
//! reader also accepts what other gettext tools produce: a header entry,
//! `msgctxt`, extracted and previous-msgid comments, CRLF line endings.

use crate::i18n::catalog::{Catalog, Location, Message};
use crate::i18n::error::PoParseError;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::mem;

/// Render a catalog as `.po` text.
pub fn write_po(catalog: &Catalog) -> String {
    let mut out = String::new();
    let entries = catalog
        .messages()
        .map(|message| (message, false))
        .chain(catalog.obsolete().map(|message| (message, true)));

    for (index, (message, obsolete)) in entries.enumerate() {
        if index > 0 {
            out.push('\n');
        }
        write_entry(&mut out, message, obsolete);
    }
    out
}

fn write_entry(out: &mut String, message: &Message, obsolete: bool) {
    for comment in &message.comments {
        if comment.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str(&format!("# {}\n", comment));
        }
    }

    if !obsolete {
        for location in &message.locations {
            out.push_str(&format!("#: {}\n", location));
        }
    }

    let flags: Vec<&str> = message
        .fuzzy
        .then_some("fuzzy")
        .into_iter()
        .chain(message.flags.iter().map(String::as_str))
        .collect();
    if !flags.is_empty() {
        out.push_str(&format!("#, {}\n", flags.join(", ")));
    }

    let prefix = if obsolete { "#~ " } else { "" };
    write_field(out, prefix, "msgid", &message.id);
    match &message.plural_id {
        Some(plural_id) => {
            write_field(out, prefix, "msgid_plural", plural_id);
            for (index, translation) in message.translations.iter().enumerate() {
                write_field(out, prefix, &format!("msgstr[{}]", index), translation);
            }
        }
        None => write_field(out, prefix, "msgstr", message.translation()),
    }
}

fn write_field(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let lines: Vec<&str> = value.split_inclusive('\n').collect();
    if lines.len() > 1 {
        out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
        for line in lines {
            out.push_str(&format!("{}\"{}\"\n", prefix, escape(line)));
        }
    } else {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escape(value)));
    }
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(ch),
        }
    }
    result
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Read a `.po` catalog. Invalid UTF-8 surfaces as an `InvalidData` I/O error.
pub fn read_po<R: Read>(mut reader: R) -> Result<Catalog, PoParseError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_po(&input)
}

/// Parse `.po` text into a catalog.
pub fn parse_po(input: &str) -> Result<Catalog, PoParseError> {
    let mut parser = Parser::default();

    for (index, raw_line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            parser.finish()?;
        } else if let Some(rest) = line.strip_prefix("#~") {
            let rest = rest.trim_start();
            if !rest.is_empty() && !rest.starts_with('|') {
                parser.keyword_line(rest, line_no, true)?;
            }
        } else if let Some(rest) = line.strip_prefix("#:") {
            parser.before_comment()?;
            parser
                .entry
                .locations
                .extend(rest.split_whitespace().map(parse_location));
        } else if let Some(rest) = line.strip_prefix("#,") {
            parser.before_comment()?;
            for flag in rest.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                if flag == "fuzzy" {
                    parser.entry.fuzzy = true;
                } else {
                    parser.entry.flags.insert(flag.to_string());
                }
            }
        } else if line.starts_with("#.") || line.starts_with("#|") {
            parser.before_comment()?;
        } else if let Some(rest) = line.strip_prefix('#') {
            parser.before_comment()?;
            let comment = rest.strip_prefix(' ').unwrap_or(rest);
            parser.entry.comments.push(comment.to_string());
        } else {
            parser.keyword_line(line, line_no, false)?;
        }
    }

    parser.finish()?;
    Ok(parser.catalog)
}

fn parse_location(token: &str) -> Location {
    match token.rsplit_once(':') {
        Some((file, line)) => match line.parse::<u32>() {
            Ok(line) => Location::new(file, line),
            Err(_) => Location::new(token, 0),
        },
        None => Location::new(token, 0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    Plural,
    Str(usize),
}

#[derive(Debug, Default)]
struct PendingEntry {
    comments: Vec<String>,
    locations: Vec<Location>,
    flags: BTreeSet<String>,
    fuzzy: bool,
    obsolete: bool,
    id: Option<String>,
    plural_id: Option<String>,
    strings: BTreeMap<usize, String>,
    field: Option<Field>,
    start_line: usize,
}

#[derive(Debug, Default)]
struct Parser {
    catalog: Catalog,
    entry: PendingEntry,
}

impl Parser {
    /// Comments always open a new entry.
    fn before_comment(&mut self) -> Result<(), PoParseError> {
        if self.entry.id.is_some() {
            self.finish()?;
        }
        Ok(())
    }

    fn keyword_line(&mut self, line: &str, line_no: usize, obsolete: bool) -> Result<(), PoParseError> {
        if self.entry.id.is_some() && self.entry.obsolete != obsolete {
            self.finish()?;
        }
        self.entry.obsolete = obsolete;

        if line.starts_with('"') {
            let value = parse_quoted(line, line_no)?;
            return self.append(value, line_no);
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| syntax(line_no, format!("expected a quoted value after '{}'", line)))?;
        let value = parse_quoted(rest.trim(), line_no)?;

        match keyword {
            "msgctxt" => {
                if self.entry.id.is_some() {
                    self.finish()?;
                    self.entry.obsolete = obsolete;
                }
                self.entry.field = Some(Field::Context);
            }
            "msgid" => {
                if self.entry.id.is_some() {
                    self.finish()?;
                    self.entry.obsolete = obsolete;
                }
                self.entry.id = Some(value);
                self.entry.start_line = line_no;
                self.entry.field = Some(Field::Id);
            }
            "msgid_plural" => {
                self.require_id(keyword, line_no)?;
                self.entry.plural_id = Some(value);
                self.entry.field = Some(Field::Plural);
            }
            "msgstr" => {
                self.require_id(keyword, line_no)?;
                self.entry.strings.insert(0, value);
                self.entry.field = Some(Field::Str(0));
            }
            _ => {
                let index = keyword
                    .strip_prefix("msgstr[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .and_then(|index| index.parse::<usize>().ok())
                    .ok_or_else(|| syntax(line_no, format!("unknown keyword '{}'", keyword)))?;
                self.require_id(keyword, line_no)?;
                self.entry.strings.insert(index, value);
                self.entry.field = Some(Field::Str(index));
            }
        }
        Ok(())
    }

    fn require_id(&self, keyword: &str, line_no: usize) -> Result<(), PoParseError> {
        if self.entry.id.is_none() {
            return Err(syntax(line_no, format!("'{}' without a preceding msgid", keyword)));
        }
        Ok(())
    }

    fn append(&mut self, value: String, line_no: usize) -> Result<(), PoParseError> {
        match self.entry.field {
            Some(Field::Context) => {}
            Some(Field::Id) => {
                if let Some(id) = self.entry.id.as_mut() {
                    id.push_str(&value);
                }
            }
            Some(Field::Plural) => {
                if let Some(plural_id) = self.entry.plural_id.as_mut() {
                    plural_id.push_str(&value);
                }
            }
            Some(Field::Str(index)) => {
                self.entry.strings.entry(index).or_default().push_str(&value);
            }
            None => return Err(syntax(line_no, "string continuation without a keyword")),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PoParseError> {
        let mut entry = mem::take(&mut self.entry);

        // Stray comments and the header entry carry no message.
        let Some(id) = entry.id.take() else {
            return Ok(());
        };
        if id.is_empty() {
            return Ok(());
        }

        let translations = if entry.plural_id.is_some() {
            let count = entry.strings.keys().next_back().map(|max| max + 1).unwrap_or(0);
            (0..count)
                .map(|index| entry.strings.remove(&index).unwrap_or_default())
                .collect()
        } else {
            vec![entry.strings.remove(&0).unwrap_or_default()]
        };

        let duplicate = if entry.obsolete {
            self.catalog.is_obsolete(&id)
        } else {
            self.catalog.contains(&id)
        };
        if duplicate {
            return Err(syntax(entry.start_line, format!("duplicate message '{}'", id)));
        }

        let message = Message {
            id,
            plural_id: entry.plural_id,
            translations,
            locations: entry.locations,
            fuzzy: entry.fuzzy,
            flags: entry.flags,
            comments: entry.comments,
        };

        if entry.obsolete {
            self.catalog.insert_obsolete(message);
        } else {
            self.catalog.insert(message);
        }
        Ok(())
    }
}

fn parse_quoted(s: &str, line_no: usize) -> Result<String, PoParseError> {
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Err(syntax(line_no, format!("expected a quoted string, found '{}'", s)));
    }
    Ok(unescape(&s[1..s.len() - 1]))
}

fn syntax(line: usize, message: impl Into<String>) -> PoParseError {
    PoParseError::Syntax {
        line,
        message: message.into(),
    }
}
