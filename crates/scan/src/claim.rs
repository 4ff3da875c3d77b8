//! Claims and run statistics.
//!
//! A [`Claim`] records the outcome for one document. [`RunStatistics`]
//! accumulates claims over a run and answers the pass/fail question at the
//! end; crossing the unapproved threshold is an expected run outcome, a
//! value, not an error.

use std::collections::BTreeMap;
use std::fmt;

use license::License;
use matcher::{FamilyCategory, LicenseFamily};

use crate::document::DocumentHint;

/// How one document was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutcomeKind {
    /// A license matched and its family is in the approved set.
    Approved,
    /// A license matched but its family is not approved.
    Unapproved,
    /// No known license matched within the header window.
    Unknown,
    /// Counted for every scanned document, whatever the header held.
    Standard,
    Notice,
    Archive,
    Binary,
    Generated,
}

impl OutcomeKind {
    /// Outcomes produced by actually scanning a header.
    pub fn is_scan_outcome(self) -> bool {
        matches!(
            self,
            OutcomeKind::Approved | OutcomeKind::Unapproved | OutcomeKind::Unknown
        )
    }

    /// The document type a report shows for this outcome.
    pub fn document_type(self) -> &'static str {
        match self {
            OutcomeKind::Approved
            | OutcomeKind::Unapproved
            | OutcomeKind::Unknown
            | OutcomeKind::Standard => "standard",
            OutcomeKind::Notice => "notice",
            OutcomeKind::Archive => "archive",
            OutcomeKind::Binary => "binary",
            OutcomeKind::Generated => "generated",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeKind::Approved => "approved",
            OutcomeKind::Unapproved => "unapproved",
            OutcomeKind::Unknown => "unknown",
            OutcomeKind::Standard => "standard",
            OutcomeKind::Notice => "notice",
            OutcomeKind::Archive => "archive",
            OutcomeKind::Binary => "binary",
            OutcomeKind::Generated => "generated",
        })
    }
}

/// The recorded classification of one document.
#[derive(Debug, Clone)]
pub struct Claim {
    name: String,
    kind: OutcomeKind,
    family: Option<LicenseFamily>,
    license_id: Option<String>,
    sample: Option<String>,
    notes: Option<String>,
}

impl Claim {
    /// A scanned document whose header matched `license`.
    pub fn matched(name: &str, license: &License, approved: bool, sample: Option<String>) -> Self {
        Claim {
            name: name.to_string(),
            kind: if approved {
                OutcomeKind::Approved
            } else {
                OutcomeKind::Unapproved
            },
            family: Some(license.family().clone()),
            license_id: Some(license.id().to_string()),
            sample,
            notes: license.notes().map(str::to_string),
        }
    }

    /// A scanned document with no recognizable header.
    pub fn unknown(name: &str) -> Self {
        Claim {
            name: name.to_string(),
            kind: OutcomeKind::Unknown,
            family: None,
            license_id: None,
            sample: None,
            notes: None,
        }
    }

    /// A document the supplier hinted out of header scanning. A standard
    /// hint recorded this way counts as a standard document with no scan
    /// outcome.
    pub fn from_hint(name: &str, hint: DocumentHint) -> Self {
        let kind = match hint {
            DocumentHint::Standard => OutcomeKind::Standard,
            DocumentHint::Notice => OutcomeKind::Notice,
            DocumentHint::Archive => OutcomeKind::Archive,
            DocumentHint::Binary => OutcomeKind::Binary,
            DocumentHint::Generated => OutcomeKind::Generated,
        };
        Claim {
            name: name.to_string(),
            kind,
            family: None,
            license_id: None,
            sample: None,
            notes: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn family(&self) -> Option<&LicenseFamily> {
        self.family.as_ref()
    }

    pub fn license_id(&self) -> Option<&str> {
        self.license_id.as_deref()
    }

    pub fn sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Per-family tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyCount {
    pub name: String,
    pub count: u64,
}

/// Run-scoped counters, created fresh per run and finalized at its end.
#[derive(Debug, Default)]
pub struct RunStatistics {
    kinds: BTreeMap<OutcomeKind, u64>,
    families: BTreeMap<FamilyCategory, FamilyCount>,
}

impl RunStatistics {
    pub fn new() -> Self {
        RunStatistics::default()
    }

    /// Fold one claim into the counters.
    pub fn record(&mut self, claim: &Claim) {
        *self.kinds.entry(claim.kind()).or_insert(0) += 1;
        if claim.kind().is_scan_outcome() {
            *self.kinds.entry(OutcomeKind::Standard).or_insert(0) += 1;
        }
        if let Some(family) = claim.family() {
            self.families
                .entry(family.category().clone())
                .or_insert_with(|| FamilyCount {
                    name: family.name().to_string(),
                    count: 0,
                })
                .count += 1;
        }
    }

    pub fn count(&self, kind: OutcomeKind) -> u64 {
        self.kinds.get(&kind).copied().unwrap_or(0)
    }

    /// Non-zero outcome counters in stable order.
    pub fn kinds(&self) -> impl Iterator<Item = (OutcomeKind, u64)> + '_ {
        self.kinds.iter().map(|(kind, count)| (*kind, *count))
    }

    /// Per-family tallies in category order.
    pub fn families(&self) -> impl Iterator<Item = (&FamilyCategory, &FamilyCount)> {
        self.families.iter()
    }

    /// The run's pass/fail verdict under `threshold`.
    pub fn check(&self, threshold: u64) -> ThresholdCheck {
        ThresholdCheck {
            unapproved: self.count(OutcomeKind::Unapproved),
            threshold,
        }
    }
}

/// Verdict value: the run fails when unapproved documents exceed the
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdCheck {
    pub unapproved: u64,
    pub threshold: u64,
}

impl ThresholdCheck {
    pub fn passed(&self) -> bool {
        self.unapproved <= self.threshold
    }
}

impl fmt::Display for ThresholdCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(
                f,
                "{} unapproved documents within threshold {}",
                self.unapproved, self.threshold
            )
        } else {
            write!(
                f,
                "{} unapproved documents exceed threshold {}",
                self.unapproved, self.threshold
            )
        }
    }
}
