//! Catalog sources merge before anything resolves, so definition order
//! across files never matters.

use std::fs;
use std::path::{Path, PathBuf};

use lichen::{
    registry_from_config, ApprovalFilter, AuditConfig, MemoryDocument, OutcomeKind, Registry,
    RegistryBuilder, Scanner,
};

const CORP_LICENSES: &str = r#"
families:
  - category: CORP
    name: Example Corp Internal License
licenses:
  - id: Corp-1.0
    family: CORP
    matcher:
      type: or
      children:
        - type: ref
          ref: corp-tag
        - type: text
          text: Internal use only. Property of Example Corp.
  - id: Corp-2.0
    derived-from: Corp-1.0
    notes: Successor text, same terms.
approved:
  - CORP
"#;

const CORP_MATCHERS: &str = r#"
matchers:
  - type: spdx
    id: corp-tag
    name: LicenseRef-Corp
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write catalog");
    path
}

fn corp_registry(dir: &Path, order: [&str; 2]) -> Registry {
    let licenses = write(dir, "licenses.yaml", CORP_LICENSES);
    let matchers = write(dir, "matchers.yaml", CORP_MATCHERS);
    let by_name = |name: &str| match name {
        "licenses" => licenses.clone(),
        _ => matchers.clone(),
    };
    let mut config = AuditConfig::default();
    config.use_default_catalog = false;
    config.catalogs = order.iter().map(|name| by_name(name)).collect();
    registry_from_config(&config).expect("registry")
}

fn scan_one(registry: &Registry, text: &str) -> lichen::Claim {
    let scanner = Scanner::new(registry, ApprovalFilter::All, &[], &[]);
    let mut doc = MemoryDocument::new("a.rs", text);
    scanner.scan(&mut doc)
}

#[test]
fn references_resolve_across_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = corp_registry(dir.path(), ["licenses", "matchers"]);

    let claim = scan_one(&registry, "// SPDX-License-Identifier: LicenseRef-Corp\n");
    assert_eq!(claim.kind(), OutcomeKind::Approved);
    assert_eq!(claim.license_id(), Some("Corp-1.0"));
    assert_eq!(claim.family().expect("family").name(), "Example Corp Internal License");
}

#[test]
fn merge_order_does_not_matter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let forward = corp_registry(dir.path(), ["matchers", "licenses"]);

    let claim = scan_one(&forward, "/* Internal use only. Property of Example Corp. */\n");
    assert_eq!(claim.kind(), OutcomeKind::Approved);
    assert_eq!(claim.license_id(), Some("Corp-1.0"));
}

#[test]
fn derived_licenses_inherit_matcher_and_family() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = corp_registry(dir.path(), ["licenses", "matchers"]);

    let derived = registry.license("Corp-2.0").expect("Corp-2.0");
    assert_eq!(derived.family().category().trimmed(), "CORP");
    assert_eq!(derived.derived_from(), Some("Corp-1.0"));
    assert_eq!(derived.notes(), Some("Successor text, same terms."));
    let base = registry.license("Corp-1.0").expect("Corp-1.0");
    assert_eq!(derived.family(), base.family());
}

#[test]
fn reserialized_catalogs_classify_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = corp_registry(dir.path(), ["licenses", "matchers"]);

    let mut builder = RegistryBuilder::new();
    builder.add_catalog(registry.to_catalog());
    let rebuilt = builder.build().expect("rebuild");

    for text in [
        "// SPDX-License-Identifier: LicenseRef-Corp\n",
        "# Internal use only. Property of Example Corp.\n",
        "fn nothing_here() {}\n",
    ] {
        let before = scan_one(&registry, text);
        let after = scan_one(&rebuilt, text);
        assert_eq!(before.kind(), after.kind(), "{text}");
        assert_eq!(before.license_id(), after.license_id(), "{text}");
    }
}

#[test]
fn extra_catalogs_merge_with_the_default_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let licenses = write(dir.path(), "licenses.yaml", CORP_LICENSES);
    let matchers = write(dir.path(), "matchers.yaml", CORP_MATCHERS);
    let mut config = AuditConfig::default();
    config.catalogs = vec![licenses, matchers];
    let registry = registry_from_config(&config).expect("registry");

    assert!(registry.license("MIT").is_some());
    assert!(registry.license("Corp-1.0").is_some());

    let corp = scan_one(&registry, "// SPDX-License-Identifier: LicenseRef-Corp\n");
    assert_eq!(corp.kind(), OutcomeKind::Approved);
    let mit = scan_one(&registry, "// SPDX-License-Identifier: MIT\n");
    assert_eq!(mit.license_id(), Some("MIT"));
}
