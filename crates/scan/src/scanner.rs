//! The bounded-window header scanner.
//!
//! One scanner is built per run from the resolved registry and drives every
//! document through the same candidate licenses in classification order.
//! Matcher state is an explicit value created fresh per document, so nothing
//! carries over between documents and nothing needs resetting between them.

use std::collections::BTreeSet;
use std::io::BufRead;

use license::{ApprovalFilter, License, Registry};
use matcher::{FamilyCategory, NodeId};
use tracing::{warn, Level};

use crate::claim::Claim;
use crate::document::{Document, DocumentHint};

/// Default number of leading lines offered to the matchers.
pub const DEFAULT_HEADER_LINES: usize = 50;

/// Longest sample excerpt captured into a claim, in characters.
const SAMPLE_LENGTH: usize = 120;

pub struct Scanner<'a> {
    registry: &'a Registry,
    candidates: Vec<&'a License>,
    roots: Vec<NodeId>,
    approved: BTreeSet<FamilyCategory>,
    window: usize,
}

impl<'a> Scanner<'a> {
    /// A scanner over the licenses `filter` selects, with the approved set
    /// widened by `allow` and narrowed by `deny`.
    pub fn new(
        registry: &'a Registry,
        filter: ApprovalFilter,
        allow: &[String],
        deny: &[String],
    ) -> Self {
        let approved = registry.approved_set(allow, deny);
        let candidates = registry.selected(filter, &approved);
        let roots = candidates.iter().map(|license| license.node()).collect();
        Scanner {
            registry,
            candidates,
            roots,
            approved,
            window: DEFAULT_HEADER_LINES,
        }
    }

    /// Override the header window size.
    pub fn with_window(mut self, lines: usize) -> Self {
        self.window = lines;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Classify one document. Never fails the run: unreadable documents
    /// classify as unknown and scanning continues.
    pub fn scan(&self, document: &mut dyn Document) -> Claim {
        let name = document.name().to_string();
        let span = tracing::span!(Level::DEBUG, "scan.document", name = %name);
        let _guard = span.enter();

        match document.hint() {
            DocumentHint::Standard => self.scan_header(&name, document),
            hint => Claim::from_hint(&name, hint),
        }
    }

    fn scan_header(&self, name: &str, document: &mut dyn Document) -> Claim {
        let reader = match document.reader() {
            Ok(reader) => reader,
            Err(err) => {
                warn!(name = %name, error = %err, "document_read_failure");
                return Claim::unknown(name);
            }
        };
        let arena = self.registry.arena();
        let mut state = arena.new_state();
        for line in reader.lines().take(self.window) {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(name = %name, error = %err, "document_read_failure");
                    return Claim::unknown(name);
                }
            };
            if let Some(position) = arena.first_match(&self.roots, &mut state, &line) {
                let license = self.candidates[position];
                let approved = self.approved.contains(license.family().category());
                return Claim::matched(name, license, approved, Some(sample_of(&line)));
            }
        }
        Claim::unknown(name)
    }
}

fn sample_of(line: &str) -> String {
    line.trim().chars().take(SAMPLE_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use license::{CatalogDef, RegistryBuilder};

    use crate::claim::OutcomeKind;
    use crate::document::MemoryDocument;

    fn registry() -> Registry {
        let catalog: CatalogDef = serde_yaml::from_str(
            r#"
families:
  - category: AL
    name: Apache License Version 2.0
  - category: MIT
    name: The MIT License
  - category: GPL3
    name: GNU General Public License, version 3
licenses:
  - id: Apache-2.0
    family: AL
    matcher:
      type: or
      children:
        - type: spdx
          name: Apache-2.0
        - type: text
          text: "Licensed under the\nApache License Version 2.0"
  - id: MIT
    family: MIT
    matcher:
      type: spdx
      name: MIT
  - id: GPL-3.0
    family: GPL3
    matcher:
      type: spdx
      name: GPL-3.0
approved:
  - AL
  - MIT
"#,
        )
        .unwrap();
        let mut builder = RegistryBuilder::new();
        builder.add_catalog(catalog);
        builder.build().unwrap()
    }

    fn scanner(registry: &Registry) -> Scanner<'_> {
        Scanner::new(registry, ApprovalFilter::All, &[], &[])
    }

    #[test]
    fn spdx_header_classifies_approved() {
        let registry = registry();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new(
            "src/lib.rs",
            "// SPDX-License-Identifier: MIT\nfn main() {}\n",
        );
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Approved);
        assert_eq!(claim.family().unwrap().name(), "The MIT License");
        assert_eq!(claim.license_id(), Some("MIT"));
        assert_eq!(claim.sample(), Some("// SPDX-License-Identifier: MIT"));
    }

    #[test]
    fn unapproved_family_classifies_unapproved() {
        let registry = registry();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new("gpl.c", "/* SPDX-License-Identifier: GPL-3.0 */\n");
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Unapproved);
        assert_eq!(claim.license_id(), Some("GPL-3.0"));
    }

    #[test]
    fn header_spread_over_lines_still_matches() {
        let registry = registry();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new(
            "spread.rs",
            "// Licensed under the\n// Apache License Version 2.0\n// provided as is\n",
        );
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Approved);
        assert_eq!(claim.license_id(), Some("Apache-2.0"));
    }

    #[test]
    fn no_recognizable_header_is_unknown() {
        let registry = registry();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new("plain.rs", "just code\nno header here\n");
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Unknown);
        assert!(claim.family().is_none());
    }

    #[test]
    fn match_outside_the_window_is_missed() {
        let registry = registry();
        let text = "one\ntwo\n// SPDX-License-Identifier: MIT\n";
        let mut doc = MemoryDocument::new("late.rs", text);
        let narrow = Scanner::new(&registry, ApprovalFilter::All, &[], &[]).with_window(2);
        assert_eq!(narrow.scan(&mut doc).kind(), OutcomeKind::Unknown);
        let wide = Scanner::new(&registry, ApprovalFilter::All, &[], &[]).with_window(3);
        assert_eq!(wide.scan(&mut doc).kind(), OutcomeKind::Approved);
    }

    #[test]
    fn hinted_documents_bypass_header_scanning() {
        let registry = registry();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new("dist.tar", "SPDX-License-Identifier: MIT\n")
            .with_hint(DocumentHint::Archive);
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Archive);
        assert!(claim.family().is_none());
    }

    #[test]
    fn classification_order_breaks_ties() {
        // Both licenses satisfy on the same line; the (category, id) order
        // decides, and AL sorts before MIT.
        let catalog: CatalogDef = serde_yaml::from_str(
            r#"
families:
  - category: AL
    name: Apache License Version 2.0
  - category: MIT
    name: The MIT License
licenses:
  - id: Apache-2.0
    family: AL
    matcher:
      type: phrases
      phrases: ["SPDX-License-Identifier"]
  - id: MIT
    family: MIT
    matcher:
      type: spdx
      name: MIT
"#,
        )
        .unwrap();
        let mut builder = RegistryBuilder::new();
        builder.add_catalog(catalog);
        let registry = builder.build().unwrap();
        let scanner = scanner(&registry);
        let mut doc = MemoryDocument::new("tie.rs", "// SPDX-License-Identifier: MIT\n");
        assert_eq!(scanner.scan(&mut doc).license_id(), Some("Apache-2.0"));
    }

    struct UnreadableDocument;

    impl Document for UnreadableDocument {
        fn name(&self) -> &str {
            "locked.rs"
        }

        fn hint(&self) -> DocumentHint {
            DocumentHint::Standard
        }

        fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }
    }

    #[test]
    fn unreadable_document_is_unknown_and_run_continues() {
        let registry = registry();
        let scanner = scanner(&registry);
        let claim = scanner.scan(&mut UnreadableDocument);
        assert_eq!(claim.kind(), OutcomeKind::Unknown);
        assert_eq!(claim.name(), "locked.rs");
    }

    struct FailsAfterOneLine {
        fed: bool,
    }

    impl io::Read for FailsAfterOneLine {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fed {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"));
            }
            self.fed = true;
            let data = b"plain first line\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    struct TruncatedDocument;

    impl Document for TruncatedDocument {
        fn name(&self) -> &str {
            "truncated.rs"
        }

        fn hint(&self) -> DocumentHint {
            DocumentHint::Standard
        }

        fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
            Ok(Box::new(io::BufReader::new(FailsAfterOneLine {
                fed: false,
            })))
        }
    }

    #[test]
    fn mid_read_failure_is_unknown() {
        let registry = registry();
        let scanner = scanner(&registry);
        let claim = scanner.scan(&mut TruncatedDocument);
        assert_eq!(claim.kind(), OutcomeKind::Unknown);
    }
}
