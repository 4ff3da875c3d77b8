//! Audit report generation.
//!
//! The report is produced by two cooperating stages joined by a bounded
//! channel of typed [`ReportEvent`]s: the scan thread serializes each claim
//! through [`ClaimReporter`] while a consumer thread drives a [`Transform`]
//! over the stream. The default transform writes validated XML through
//! [`XmlWriter`]; the text transforms reinterpret the same stream as
//! summaries and worklists, so every output format sees identical data.

mod error;
mod events;
mod pipeline;
mod serializer;
mod transform;
mod xml;

pub use crate::error::{PipelineError, WriteError};
pub use crate::events::ReportEvent;
pub use crate::pipeline::{ReportPipeline, EVENT_CHANNEL_CAPACITY};
pub use crate::serializer::{ClaimReporter, UNKNOWN_HEADER};
pub use crate::transform::{
    transform_to, TextTransform, Transform, TransformKind, UnknownTransform, XmlTransform,
};
pub use crate::xml::XmlWriter;
