//! License catalog layer.
//!
//! Builds the run-wide [`Registry`] out of declarative [`CatalogDef`]
//! sources: families keyed by normalized category, licenses ordered for
//! deterministic classification, `derived-from` chains resolved eagerly, and
//! every matcher compiled into one shared arena. The [`ApprovalFilter`]
//! selects which slice of the catalog a scan works against; the approved
//! category set then decides whether a match passes or fails.

mod defs;
mod error;
mod filter;
mod license;
mod registry;

pub use crate::defs::{CatalogDef, FamilyDef, LicenseDef};
pub use crate::error::CatalogError;
pub use crate::filter::{ApprovalFilter, UnknownFilter};
pub use crate::license::License;
pub use crate::registry::{Registry, RegistryBuilder};
