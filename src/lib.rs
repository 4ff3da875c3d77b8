//! Workspace umbrella crate for the Lichen license auditor.
//!
//! Stitches the engine crates together so callers can run a whole audit
//! through one entry point: catalog definitions compile into a [`Registry`],
//! a [`Scanner`] turns each [`Document`] into a [`Claim`], and a
//! [`ClaimReporter`] streams every claim through a report [`Transform`] while
//! [`RunStatistics`] accumulate the run-level verdict.

pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod walk;

pub use license::{
    ApprovalFilter, CatalogDef, CatalogError, FamilyDef, License, LicenseDef, Registry,
    RegistryBuilder, UnknownFilter,
};
pub use matcher::{ConfigError, FamilyCategory, LicenseFamily, MatcherSpec, CATEGORY_WIDTH};
pub use report::{
    transform_to, ClaimReporter, PipelineError, Transform, TransformKind, UnknownTransform,
    WriteError, XmlTransform, XmlWriter, UNKNOWN_HEADER,
};
pub use scan::{
    Claim, Document, DocumentHint, FamilyCount, MemoryDocument, OutcomeKind, RunStatistics,
    Scanner, ThresholdCheck, DEFAULT_HEADER_LINES,
};

pub use crate::config::{AuditConfig, ConfigLoadError};
pub use crate::defaults::default_catalog;
#[cfg(feature = "cli")]
pub use crate::walk::{walk_documents, FileDocument};

use std::error::Error;
use std::fmt;
use std::io::Write;

use tracing::{info, Level};

/// Errors that can end an audit run.
#[derive(Debug)]
pub enum AuditError {
    Config(ConfigLoadError),
    Report(PipelineError),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Config(err) => write!(f, "configuration failure: {err}"),
            AuditError::Report(err) => write!(f, "report failure: {err}"),
        }
    }
}

impl Error for AuditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AuditError::Config(err) => Some(err),
            AuditError::Report(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for AuditError {
    fn from(value: ConfigLoadError) -> Self {
        AuditError::Config(value)
    }
}

impl From<PipelineError> for AuditError {
    fn from(value: PipelineError) -> Self {
        AuditError::Report(value)
    }
}

/// Scan-side knobs for one audit run.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Which slice of the catalog documents are scanned against.
    pub filter: ApprovalFilter,
    /// Family categories approved on top of the catalog's own list.
    pub approve: Vec<String>,
    /// Family categories removed from the approved set.
    pub unapprove: Vec<String>,
    /// How many header lines each document contributes.
    pub window: usize,
    /// Unapproved-document count above which the run fails.
    pub threshold: u64,
}

impl Default for AuditOptions {
    fn default() -> Self {
        AuditOptions {
            filter: ApprovalFilter::All,
            approve: Vec::new(),
            unapprove: Vec::new(),
            window: DEFAULT_HEADER_LINES,
            threshold: 0,
        }
    }
}

/// What a finished run adds up to.
#[derive(Debug)]
pub struct AuditSummary {
    pub statistics: RunStatistics,
    pub verdict: ThresholdCheck,
}

/// Build the registry an audit configuration describes: the built-in catalog
/// (unless disabled) merged with every catalog file listed, compiled in one
/// resolution pass.
pub fn registry_from_config(config: &AuditConfig) -> Result<Registry, ConfigLoadError> {
    let mut builder = RegistryBuilder::new();
    if config.use_default_catalog {
        builder.add_catalog(defaults::default_catalog());
    }
    for path in &config.catalogs {
        builder.add_catalog(config::load_catalog(path)?);
    }
    builder.build().map_err(ConfigLoadError::from)
}

/// Scan `documents` against `registry` and stream every claim through
/// `transform`. The report consumer runs on its own thread; its errors win
/// over producer-side disconnects because they explain them.
pub fn run_audit<I, D>(
    registry: &Registry,
    options: &AuditOptions,
    documents: I,
    transform: Box<dyn Transform>,
) -> Result<AuditSummary, AuditError>
where
    I: IntoIterator<Item = D>,
    D: Document,
{
    let span = tracing::span!(Level::INFO, "audit.run", filter = %options.filter);
    let _guard = span.enter();

    let scanner = Scanner::new(registry, options.filter, &options.approve, &options.unapprove)
        .with_window(options.window);
    let reporter = ClaimReporter::new(transform)?;

    let mut statistics = RunStatistics::new();
    let mut lost_consumer = None;
    for mut document in documents {
        let claim = scanner.scan(&mut document);
        statistics.record(&claim);
        if let Err(err) = reporter.report(&claim) {
            lost_consumer = Some(err);
            break;
        }
    }
    match (lost_consumer, reporter.finish(&statistics)) {
        (_, Err(err)) => return Err(AuditError::Report(err)),
        (Some(err), Ok(())) => return Err(AuditError::Report(err)),
        (None, Ok(())) => {}
    }

    let verdict = statistics.check(options.threshold);
    info!(
        scanned = statistics.count(OutcomeKind::Standard),
        unapproved = verdict.unapproved,
        passed = verdict.passed(),
        "audit_complete"
    );
    Ok(AuditSummary { statistics, verdict })
}

/// Run a whole audit from a configuration: build the registry, pick the
/// report transform, scan, and write the report to `out`.
pub fn run_audit_with_config<I, D, W>(
    config: &AuditConfig,
    documents: I,
    out: W,
) -> Result<AuditSummary, AuditError>
where
    I: IntoIterator<Item = D>,
    D: Document,
    W: Write + Send + 'static,
{
    let registry = registry_from_config(config)?;
    let transform = transform_to(config.transform_kind()?, out);
    run_audit(&registry, &config.options(), documents, transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_catalog(default_catalog());
        builder.build().unwrap()
    }

    fn documents() -> Vec<MemoryDocument> {
        vec![
            MemoryDocument::new("src/good.rs", "// SPDX-License-Identifier: MIT\nfn a() {}\n"),
            MemoryDocument::new(
                "src/viral.c",
                "/* This program is free software; you can redistribute it and/or modify\n \
                 * it under the terms of the GNU General Public License as published by\n \
                 * the Free Software Foundation; either version 2 of the License, or\n \
                 * (at your option) any later version.\n */\n",
            ),
            MemoryDocument::new("src/bare.rs", "fn b() {}\n"),
            MemoryDocument::new("logo.png", "").with_hint(DocumentHint::Binary),
        ]
    }

    #[test]
    fn run_audit_tallies_every_outcome() {
        let registry = registry();
        let options = AuditOptions::default();
        let transform = transform_to(TransformKind::Xml, io::sink());

        let summary = run_audit(&registry, &options, documents(), transform).unwrap();

        assert_eq!(summary.statistics.count(OutcomeKind::Approved), 1);
        assert_eq!(summary.statistics.count(OutcomeKind::Unapproved), 1);
        assert_eq!(summary.statistics.count(OutcomeKind::Unknown), 1);
        assert_eq!(summary.statistics.count(OutcomeKind::Binary), 1);
        assert_eq!(summary.statistics.count(OutcomeKind::Standard), 3);
        assert!(!summary.verdict.passed());
        assert_eq!(summary.verdict.unapproved, 1);
    }

    #[test]
    fn thresholds_allow_a_known_amount_of_debt() {
        let registry = registry();
        let options = AuditOptions {
            threshold: 1,
            ..AuditOptions::default()
        };
        let transform = transform_to(TransformKind::Xml, io::sink());

        let summary = run_audit(&registry, &options, documents(), transform).unwrap();
        assert!(summary.verdict.passed());
        assert_eq!(summary.verdict.threshold, 1);
    }

    #[test]
    fn unapproving_a_family_flips_its_documents() {
        let registry = registry();
        let options = AuditOptions {
            unapprove: vec!["MIT".to_string()],
            ..AuditOptions::default()
        };
        let transform = transform_to(TransformKind::Xml, io::sink());
        let docs = vec![MemoryDocument::new(
            "src/good.rs",
            "// SPDX-License-Identifier: MIT\n",
        )];

        let summary = run_audit(&registry, &options, docs, transform).unwrap();
        assert_eq!(summary.statistics.count(OutcomeKind::Approved), 0);
        assert_eq!(summary.statistics.count(OutcomeKind::Unapproved), 1);
    }

    #[test]
    fn config_driven_runs_use_the_configured_transform() {
        let config = AuditConfig::default();
        let summary = run_audit_with_config(&config, documents(), io::sink()).unwrap();
        assert_eq!(summary.statistics.count(OutcomeKind::Standard), 3);
    }

    #[test]
    fn registry_from_config_respects_the_default_catalog_switch() {
        let mut config = AuditConfig::default();
        config.use_default_catalog = false;
        let registry = registry_from_config(&config).unwrap();
        assert!(registry.licenses().is_empty());
    }
}
