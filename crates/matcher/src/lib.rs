//! License header matcher layer.
//!
//! Everything needed to decide whether a block of header lines carries a
//! known license: leaf matchers (full text, phrases, copyright statements,
//! SPDX tags), combinators over them, and the arena that ties definitions
//! from many configuration sources into one resolved, immutable graph.
//!
//! ## How matching works
//!
//! - Definitions parse into [`MatcherSpec`] trees; references by id stay
//!   symbolic until every source has loaded.
//! - [`ArenaBuilder::resolve`] binds all references eagerly, rejecting
//!   unknown ids, duplicates, and cycles before any document is scanned.
//! - Scanning threads an explicit [`ScanState`] through
//!   [`MatcherArena::feed_line`]; definitions stay immutable and shared.
//!
//! ## Cumulative semantics
//!
//! Headers arrive one line at a time. A matcher may only become satisfied
//! after several lines (full text spread over a comment block), and once
//! satisfied it stays satisfied until the state is reset. A fresh state and
//! a reset state behave identically.

mod arena;
mod copyright;
mod error;
mod family;
mod spdx;
mod spec;
mod state;
mod text;

pub use crate::arena::{ArenaBuilder, MatcherArena, NodeId};
pub use crate::copyright::CopyrightPattern;
pub use crate::error::ConfigError;
pub use crate::family::{FamilyCategory, LicenseFamily, CATEGORY_WIDTH};
pub use crate::spdx::SpdxTag;
pub use crate::spec::MatcherSpec;
pub use crate::state::ScanState;
pub use crate::text::{prune, FullText, PhraseSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_to_decision_round_trip() {
        let spec = MatcherSpec::or(vec![
            MatcherSpec::spdx("Apache-2.0"),
            MatcherSpec::text("Licensed to the\nApache Software Foundation"),
        ])
        .with_id("apache");
        let mut builder = ArenaBuilder::new();
        let root = builder.insert(&spec).unwrap();
        let arena = builder.resolve().unwrap();

        let mut state = arena.new_state();
        assert!(!arena.is_satisfied(root, &state));
        assert!(arena.feed_line(
            root,
            &mut state,
            "// SPDX-License-Identifier: Apache-2.0"
        ));
        assert_eq!(arena.to_spec(root), spec);
    }
}
