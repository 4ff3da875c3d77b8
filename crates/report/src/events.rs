//! Typed XML write events, the payload of the report channel.
//!
//! The producer serializes claims into these; the consumer replays them into
//! an [`XmlWriter`] or interprets them in a transform. Keeping the stream
//! typed means the consumer cannot de-sync on partially written markup.

use std::io::Write;

use crate::error::WriteError;
use crate::xml::XmlWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// Open an element.
    Open(String),
    /// Attribute on the element just opened.
    Attr { name: String, value: String },
    /// Text content inside the current element.
    Content(String),
    /// Close the current element.
    Close,
    /// Close every pending element and finish the document.
    CloseDocument,
}

impl ReportEvent {
    pub fn open(name: &str) -> Self {
        ReportEvent::Open(name.to_string())
    }

    pub fn attr(name: &str, value: &str) -> Self {
        ReportEvent::Attr {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn content(text: &str) -> Self {
        ReportEvent::Content(text.to_string())
    }

    /// Replay this event into a writer.
    pub fn apply<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<(), WriteError> {
        match self {
            ReportEvent::Open(name) => writer.open_element(name),
            ReportEvent::Attr { name, value } => writer.attribute(name, value),
            ReportEvent::Content(text) => writer.content(text),
            ReportEvent::Close => writer.close_element(),
            ReportEvent::CloseDocument => writer.close_document(),
        }
    }
}
