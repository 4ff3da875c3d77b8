//! Document scanning layer.
//!
//! Turns a stream of [`Document`]s into per-document [`Claim`]s and
//! run-level [`RunStatistics`]. Scanning is strictly sequential within a
//! run; the only state a document leaves behind is its claim.

mod claim;
mod document;
mod scanner;

pub use crate::claim::{Claim, FamilyCount, OutcomeKind, RunStatistics, ThresholdCheck};
pub use crate::document::{Document, DocumentHint, MemoryDocument};
pub use crate::scanner::{Scanner, DEFAULT_HEADER_LINES};
