//! Declarative matcher definitions.
//!
//! [`MatcherSpec`] is the serde-facing tree form a catalog source yields:
//! nested combinators (`and`, `or`, `not`) over leaf definitions (`text`,
//! `phrases`, `copyright`, `spdx`) plus `ref`, which names a matcher defined
//! elsewhere, possibly later or in another merged source. It is also the
//! target of re-serialization: a resolved arena subtree converts back into a
//! `MatcherSpec` of the same shape.

use serde::{Deserialize, Serialize};

/// One matcher definition as it appears in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherSpec {
    /// Full license text, matched cumulatively across header lines.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
    },
    /// Literal phrases; any one occurring in a line matches.
    Phrases {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        phrases: Vec<String>,
    },
    /// Copyright statement with optional years and owner.
    Copyright {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner: Option<String>,
    },
    /// An SPDX short identifier tag.
    Spdx {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
    },
    /// Every child must match by the end of the header window.
    And {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        children: Vec<MatcherSpec>,
    },
    /// Any matching child suffices.
    Or {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        children: Vec<MatcherSpec>,
    },
    /// Matches exactly when the child does not.
    Not {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        child: Box<MatcherSpec>,
    },
    /// Reference to a matcher or license defined under `id` in any merged
    /// source. `license_ref` is accepted as a spelling for readers that want
    /// to make a license target explicit; both namespaces are one table.
    Ref {
        #[serde(rename = "ref", alias = "license_ref")]
        target: String,
    },
}

impl MatcherSpec {
    pub fn text(text: &str) -> Self {
        MatcherSpec::Text {
            id: None,
            text: text.to_string(),
        }
    }

    pub fn phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MatcherSpec::Phrases {
            id: None,
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn copyright(start: Option<&str>, end: Option<&str>, owner: Option<&str>) -> Self {
        MatcherSpec::Copyright {
            id: None,
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            owner: owner.map(str::to_string),
        }
    }

    pub fn spdx(name: &str) -> Self {
        MatcherSpec::Spdx {
            id: None,
            name: name.to_string(),
        }
    }

    pub fn and(children: Vec<MatcherSpec>) -> Self {
        MatcherSpec::And { id: None, children }
    }

    pub fn or(children: Vec<MatcherSpec>) -> Self {
        MatcherSpec::Or { id: None, children }
    }

    pub fn not(child: MatcherSpec) -> Self {
        MatcherSpec::Not {
            id: None,
            child: Box::new(child),
        }
    }

    pub fn reference(target: &str) -> Self {
        MatcherSpec::Ref {
            target: target.to_string(),
        }
    }

    /// Attach an id, making the definition referenceable. No effect on `ref`.
    pub fn with_id(mut self, new_id: &str) -> Self {
        if let Some(slot) = self.id_slot() {
            *slot = Some(new_id.to_string());
        }
        self
    }

    /// The declared id, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            MatcherSpec::Text { id, .. }
            | MatcherSpec::Phrases { id, .. }
            | MatcherSpec::Copyright { id, .. }
            | MatcherSpec::Spdx { id, .. }
            | MatcherSpec::And { id, .. }
            | MatcherSpec::Or { id, .. }
            | MatcherSpec::Not { id, .. } => id.as_deref(),
            MatcherSpec::Ref { .. } => None,
        }
    }

    fn id_slot(&mut self) -> Option<&mut Option<String>> {
        match self {
            MatcherSpec::Text { id, .. }
            | MatcherSpec::Phrases { id, .. }
            | MatcherSpec::Copyright { id, .. }
            | MatcherSpec::Spdx { id, .. }
            | MatcherSpec::And { id, .. }
            | MatcherSpec::Or { id, .. }
            | MatcherSpec::Not { id, .. } => Some(id),
            MatcherSpec::Ref { .. } => None,
        }
    }
}
