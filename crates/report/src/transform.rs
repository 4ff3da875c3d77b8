//! Report transforms.
//!
//! A [`Transform`] is the consumer end of the report pipeline: it receives
//! the typed XML event stream and renders it somewhere. [`XmlTransform`]
//! replays events into the validating writer verbatim; the text transforms
//! interpret the stream back into per-resource records and print
//! human-oriented lines. User-supplied transforms implement the same trait.

use std::io::Write;
use std::str::FromStr;

use thiserror::Error;

use crate::error::WriteError;
use crate::events::ReportEvent;
use crate::xml::XmlWriter;

pub trait Transform: Send {
    /// Consume one event.
    fn event(&mut self, event: ReportEvent) -> Result<(), WriteError>;

    /// Called once after end of stream, whether or not the stream completed
    /// with a `CloseDocument`.
    fn finish(&mut self) -> Result<(), WriteError>;
}

/// Passes the event stream through to XML output unchanged.
pub struct XmlTransform<W: Write> {
    writer: XmlWriter<W>,
}

impl<W: Write> XmlTransform<W> {
    pub fn new(out: W) -> Self {
        XmlTransform {
            writer: XmlWriter::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Transform for XmlTransform<W> {
    fn event(&mut self, event: ReportEvent) -> Result<(), WriteError> {
        event.apply(&mut self.writer)
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        // An interrupted stream still leaves well-formed output behind.
        if self.writer.started() {
            self.writer.close_document()?;
        }
        Ok(())
    }
}

/// Per-resource view reconstructed from the event stream.
#[derive(Debug, Default, Clone)]
struct ResourceRecord {
    name: String,
    doc_type: String,
    header: Option<String>,
    approved: Option<bool>,
}

impl ResourceRecord {
    fn outcome(&self) -> &str {
        match self.approved {
            Some(true) => "approved",
            Some(false) => "unapproved",
            None if self.doc_type == "standard" => "unknown",
            None => &self.doc_type,
        }
    }

    fn is_unknown(&self) -> bool {
        self.doc_type == "standard" && self.approved.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum TextMode {
    Plain,
    MissingHeaders,
    Unapproved,
}

/// Streaming text renderings of the report.
///
/// `plain` prints a line per resource as it closes, then an
/// unapproved-document list and the run counters; `missing_headers` and
/// `unapproved` print only the matching resource names.
pub struct TextTransform<W: Write> {
    out: W,
    mode: TextMode,
    stack: Vec<String>,
    resource: Option<ResourceRecord>,
    stat_name: Option<String>,
    counts: Vec<(String, u64)>,
    unapproved: Vec<String>,
}

impl<W: Write> TextTransform<W> {
    pub fn plain(out: W) -> Self {
        Self::with_mode(out, TextMode::Plain)
    }

    pub fn missing_headers(out: W) -> Self {
        Self::with_mode(out, TextMode::MissingHeaders)
    }

    pub fn unapproved(out: W) -> Self {
        Self::with_mode(out, TextMode::Unapproved)
    }

    fn with_mode(out: W, mode: TextMode) -> Self {
        TextTransform {
            out,
            mode,
            stack: Vec::new(),
            resource: None,
            stat_name: None,
            counts: Vec::new(),
            unapproved: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn attribute(&mut self, name: &str, value: String) -> Result<(), WriteError> {
        let element = match self.stack.last() {
            Some(element) => element.clone(),
            None => return Ok(()),
        };
        match (element.as_str(), name) {
            ("audit-report", "timestamp") => {
                if let TextMode::Plain = self.mode {
                    writeln!(self.out, "Lichen audit report")?;
                    writeln!(self.out, "generated at {value}")?;
                    writeln!(self.out)?;
                }
            }
            ("resource", "name") => {
                if let Some(record) = self.resource.as_mut() {
                    record.name = value;
                }
            }
            ("type", "name") => {
                if let Some(record) = self.resource.as_mut() {
                    record.doc_type = value;
                }
            }
            ("header-type", "name") => {
                if let Some(record) = self.resource.as_mut() {
                    record.header = Some(value);
                }
            }
            ("license-approval", "name") => {
                if let Some(record) = self.resource.as_mut() {
                    record.approved = Some(value == "true");
                }
            }
            ("statistic", "name") => self.stat_name = Some(value),
            ("statistic", "count") => {
                if let Some(stat) = self.stat_name.take() {
                    self.counts.push((stat, value.parse().unwrap_or(0)));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_one(&mut self) -> Result<(), WriteError> {
        let element = match self.stack.pop() {
            Some(element) => element,
            None => return Ok(()),
        };
        if element == "resource" {
            if let Some(record) = self.resource.take() {
                self.deliver(record)?;
            }
        }
        Ok(())
    }

    fn deliver(&mut self, record: ResourceRecord) -> Result<(), WriteError> {
        match self.mode {
            TextMode::Plain => {
                if record.approved == Some(false) {
                    self.unapproved.push(record.name.clone());
                }
                let header = record.header.as_deref().unwrap_or("");
                writeln!(self.out, "{:<12}{:<7}{}", record.outcome(), header, record.name)?;
            }
            TextMode::MissingHeaders => {
                if record.is_unknown() {
                    writeln!(self.out, "{}", record.name)?;
                }
            }
            TextMode::Unapproved => {
                if record.approved == Some(false) {
                    writeln!(self.out, "{}", record.name)?;
                }
            }
        }
        Ok(())
    }

    fn write_summary(&mut self) -> Result<(), WriteError> {
        writeln!(self.out)?;
        if !self.unapproved.is_empty() {
            writeln!(self.out, "Unapproved documents:")?;
            for name in &self.unapproved {
                writeln!(self.out, "  {name}")?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "Counts:")?;
        for (name, count) in &self.counts {
            writeln!(self.out, "  {name:<12}{count}")?;
        }
        Ok(())
    }
}

impl<W: Write + Send> Transform for TextTransform<W> {
    fn event(&mut self, event: ReportEvent) -> Result<(), WriteError> {
        match event {
            ReportEvent::Open(name) => {
                if name == "resource" {
                    self.resource = Some(ResourceRecord::default());
                }
                self.stack.push(name);
            }
            ReportEvent::Attr { name, value } => self.attribute(&name, value)?,
            ReportEvent::Content(_) => {}
            ReportEvent::Close => self.close_one()?,
            ReportEvent::CloseDocument => {
                while !self.stack.is_empty() {
                    self.close_one()?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        while !self.stack.is_empty() {
            self.close_one()?;
        }
        if let TextMode::Plain = self.mode {
            self.write_summary()?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// The named built-in transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformKind {
    /// The raw XML report.
    #[default]
    Xml,
    /// Human-readable summary.
    Plain,
    /// Only resources with no recognizable header.
    MissingHeaders,
    /// Only resources whose license is not approved.
    Unapproved,
}

#[derive(Debug, Error)]
#[error("unknown transform `{0}`, expected `xml`, `plain`, `missing-headers` or `unapproved`")]
pub struct UnknownTransform(String);

impl FromStr for TransformKind {
    type Err = UnknownTransform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "xml" => Ok(TransformKind::Xml),
            "plain" => Ok(TransformKind::Plain),
            "missing-headers" => Ok(TransformKind::MissingHeaders),
            "unapproved" => Ok(TransformKind::Unapproved),
            _ => Err(UnknownTransform(value.to_string())),
        }
    }
}

/// Build the consumer for `kind` writing to `out`.
pub fn transform_to<W>(kind: TransformKind, out: W) -> Box<dyn Transform>
where
    W: Write + Send + 'static,
{
    match kind {
        TransformKind::Xml => Box::new(XmlTransform::new(out)),
        TransformKind::Plain => Box::new(TextTransform::plain(out)),
        TransformKind::MissingHeaders => Box::new(TextTransform::missing_headers(out)),
        TransformKind::Unapproved => Box::new(TextTransform::unapproved(out)),
    }
}
