//! The ALL / APPROVED / NONE partition of the catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which part of the catalog a scan works against.
///
/// The filter decides which licenses are even tried against each document;
/// approval of a match is a separate question answered by the approved
/// category set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalFilter {
    /// Every known license.
    All,
    /// Only licenses whose family is in the approved set.
    #[default]
    Approved,
    /// No licenses; every scanned document classifies as unknown.
    None,
}

impl fmt::Display for ApprovalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApprovalFilter::All => "all",
            ApprovalFilter::Approved => "approved",
            ApprovalFilter::None => "none",
        })
    }
}

#[derive(Debug, Error)]
#[error("unknown approval filter `{0}`, expected `all`, `approved` or `none`")]
pub struct UnknownFilter(String);

impl FromStr for ApprovalFilter {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(ApprovalFilter::All),
            "approved" => Ok(ApprovalFilter::Approved),
            "none" => Ok(ApprovalFilter::None),
            _ => Err(UnknownFilter(value.to_string())),
        }
    }
}
