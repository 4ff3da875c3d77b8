//! Matcher configuration errors. All of these are fatal and raised while the
//! catalog loads, before any document is scanned.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two definitions claimed the same matcher id.
    #[error("duplicate matcher id `{0}`")]
    DuplicateId(String),

    /// A `ref` names an id no merged source ever defined.
    #[error("reference to unknown matcher id `{0}`")]
    UnknownReference(String),

    /// Reference edges form a cycle through the named node.
    #[error("cyclic matcher reference through `{0}`")]
    CyclicReference(String),

    /// A definition is structurally unusable (empty text, no children, ...).
    #[error("invalid matcher definition: {0}")]
    InvalidMatcher(String),

    /// A configured date or owner fragment did not compile as a pattern.
    #[error("invalid pattern `{pattern}`: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
