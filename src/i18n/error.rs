//! Error taxonomy for catalog synchronization.
//!
//! Validation findings (missing, fuzzy or check-failed translations) are not
//! errors; they live in [`crate::i18n::ValidationReport`].

use std::io;
use std::path::PathBuf;

/// Errors raised while parsing an editable `.po` catalog.
#[derive(Debug, thiserror::Error)]
pub enum PoParseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl PoParseError {
    /// Whether the file content itself is broken, as opposed to the file
    /// being inaccessible.
    pub fn is_corruption(&self) -> bool {
        match self {
            PoParseError::Io(err) => err.kind() == io::ErrorKind::InvalidData,
            PoParseError::Syntax { .. } => true,
        }
    }
}

/// Errors raised while reading a compiled `.mo` catalog.
#[derive(Debug, thiserror::Error)]
pub enum MoParseError {
    #[error("file is too short to be a compiled catalog")]
    TooShort,
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),
    #[error("string table entry {0} points outside the file")]
    OutOfBounds(usize),
    #[error("string table entry {0} is not valid UTF-8")]
    InvalidUtf8(usize),
}

/// Fatal errors that abort a synchronization run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to read source file {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract strings from {}:{line}: {message}", .path.display())]
    ExtractionParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to read catalog {}: {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: PoParseError,
    },

    #[error("failed to write catalog {}: {source}", .path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
