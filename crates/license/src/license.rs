//! A fully resolved license.

use std::cmp::Ordering;

use matcher::{LicenseFamily, NodeId};

/// One license after registry resolution: its identity, the family it
/// belongs to, and the arena node that decides whether a document
/// carries it.
#[derive(Debug, Clone)]
pub struct License {
    pub(crate) id: String,
    pub(crate) family: LicenseFamily,
    pub(crate) node: NodeId,
    pub(crate) notes: Option<String>,
    pub(crate) derived_from: Option<String>,
}

impl License {
    /// Stable identifier, unique within a registry.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The family this license belongs to.
    pub fn family(&self) -> &LicenseFamily {
        &self.family
    }

    /// Root arena node for this license. Feeding document lines through
    /// this node answers whether the license is present.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Free-form commentary carried from the definition, if any.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// The license this one was derived from, if any.
    pub fn derived_from(&self) -> Option<&str> {
        self.derived_from.as_deref()
    }
}

impl PartialEq for License {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.family == other.family
    }
}

impl Eq for License {}

// Reports walk licenses in a stable order: family category first, then id.
impl Ord for License {
    fn cmp(&self, other: &Self) -> Ordering {
        self.family
            .category()
            .cmp(other.family.category())
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for License {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
