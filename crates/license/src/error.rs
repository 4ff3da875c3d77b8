//! Catalog-level configuration errors. Like matcher resolution errors these
//! are fatal and surface while the registry builds, never during a scan.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A matcher definition inside the catalog failed to build or resolve.
    #[error(transparent)]
    Matcher(#[from] matcher::ConfigError),

    /// Two definitions claimed the same license id.
    #[error("duplicate license id `{0}`")]
    DuplicateLicense(String),

    /// Two definitions claimed the same family category.
    #[error("duplicate family category `{0}`")]
    DuplicateFamily(String),

    /// A license names a family category no source defined.
    #[error("license `{license}` names unknown family `{family}`")]
    UnknownFamily { license: String, family: String },

    /// A `derived-from` names a license no source defined.
    #[error("license `{license}` is derived from unknown license `{target}`")]
    UnknownLicense { license: String, target: String },

    /// `derived-from` edges form a cycle through the named license.
    #[error("cyclic `derived-from` chain through license `{0}`")]
    DerivedCycle(String),

    /// A license defines neither a matcher nor a derivation to inherit one.
    #[error("license `{0}` defines neither a matcher nor `derived-from`")]
    MissingMatcher(String),

    /// A license defines neither a family nor a derivation to inherit one.
    #[error("license `{0}` names no family and derives from nothing")]
    MissingFamily(String),
}
