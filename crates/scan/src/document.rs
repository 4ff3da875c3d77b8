//! The document supplier interface.
//!
//! The scanner asks three things of a document: a stable name, a hint about
//! what kind of thing it is, and line-based read access. Where documents come
//! from (a filesystem walk, archive members, test fixtures) is entirely the
//! supplier's business.

use std::io::{self, BufRead, Cursor};

/// Supplier-decided document kind.
///
/// Only [`DocumentHint::Standard`] documents get their headers scanned; the
/// other kinds are recorded as-is. Deciding which is which (binary sniffing,
/// notice filename conventions, generated-file markers) happens in the
/// supplier, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentHint {
    /// A source file whose header should be scanned.
    Standard,
    /// A license or notice file (LICENSE, NOTICE, ...).
    Notice,
    /// A composite file whose members arrive as separate documents.
    Archive,
    /// Binary content; nothing to scan.
    Binary,
    /// Machine-generated content; headers are not meaningful.
    Generated,
}

/// One scannable unit of work.
pub trait Document {
    /// Stable name used in claims and reports.
    fn name(&self) -> &str;

    fn hint(&self) -> DocumentHint;

    /// Open the content for one pass of line-based reading.
    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>>;
}

/// An in-memory document, mostly useful for embedding and tests.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    name: String,
    hint: DocumentHint,
    text: String,
}

impl MemoryDocument {
    pub fn new(name: &str, text: &str) -> Self {
        MemoryDocument {
            name: name.to_string(),
            hint: DocumentHint::Standard,
            text: text.to_string(),
        }
    }

    pub fn with_hint(mut self, hint: DocumentHint) -> Self {
        self.hint = hint;
        self
    }
}

impl Document for MemoryDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn hint(&self) -> DocumentHint {
        self.hint
    }

    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(Cursor::new(self.text.as_bytes())))
    }
}
