//! Report-side failures.
//!
//! [`WriteError`] variants other than `Io` indicate a structural misuse of
//! the writer, a logic defect in the caller rather than a runtime condition.
//! [`PipelineError`] wraps whatever ended the consumer side; it is surfaced
//! only after both pipeline stages have terminated.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Any write attempted once the root element has closed.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(&'static str),

    /// The name is not acceptable for an XML element or attribute.
    #[error("`{0}` is not a valid XML name")]
    InvalidName(String),

    /// Attributes are legal only directly after opening an element, before
    /// any content or child.
    #[error("attribute `{0}` written after content on the open element")]
    AttributeAfterContent(String),

    /// Each attribute may be written once per element.
    #[error("attribute `{0}` written twice on one element")]
    DuplicateAttribute(String),

    /// Content, attributes or a close with no element open.
    #[error("no element is open")]
    NoOpenElement,

    /// The document was closed before any element was opened.
    #[error("document closed before any element was opened")]
    NothingWritten,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The consumer stage failed while writing or transforming.
    #[error("report stage failed: {0}")]
    Consumer(#[from] WriteError),

    /// The consumer stage panicked; its output is unreliable.
    #[error("report stage panicked")]
    ConsumerPanicked,

    /// The consumer hung up before end of stream. The cause surfaces from
    /// the join, not from this value.
    #[error("report stage disconnected before end of stream")]
    Disconnected,
}
