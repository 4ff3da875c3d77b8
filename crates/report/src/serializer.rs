//! Claim serialization, the producer half of the report pipeline.
//!
//! [`ClaimReporter`] turns each [`Claim`] into one `resource` element as an
//! explicit event sequence. Every field maps to a fixed child element; there
//! is no reflective walk over the claim, so the report shape is stable
//! under refactors of the claim type.

use chrono::{SecondsFormat, Utc};
use tracing::Level;

use scan::{Claim, OutcomeKind, RunStatistics};

use crate::error::PipelineError;
use crate::events::ReportEvent;
use crate::pipeline::ReportPipeline;
use crate::transform::Transform;

/// Header category reported when no license matched a scanned document.
pub const UNKNOWN_HEADER: &str = "?????";

/// Serializes claims into `resource` elements on a running pipeline.
pub struct ClaimReporter {
    pipeline: ReportPipeline,
}

impl ClaimReporter {
    /// Open an `audit-report` stamped with the current time.
    pub fn new(transform: Box<dyn Transform>) -> Result<Self, PipelineError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Self::with_timestamp(transform, &timestamp)
    }

    /// Open an `audit-report` with a caller-chosen timestamp.
    pub fn with_timestamp(
        transform: Box<dyn Transform>,
        timestamp: &str,
    ) -> Result<Self, PipelineError> {
        let pipeline = ReportPipeline::spawn(transform);
        pipeline.send(ReportEvent::open("audit-report"))?;
        pipeline.send(ReportEvent::attr("timestamp", timestamp))?;
        Ok(ClaimReporter { pipeline })
    }

    /// Serialize one claim.
    pub fn report(&self, claim: &Claim) -> Result<(), PipelineError> {
        let span = tracing::span!(Level::DEBUG, "report.claim", name = %claim.name());
        let _guard = span.enter();
        self.pipeline.send(ReportEvent::open("resource"))?;
        self.pipeline.send(ReportEvent::attr("name", claim.name()))?;
        self.named_element("type", claim.kind().document_type())?;
        if claim.kind().is_scan_outcome() {
            let category = claim
                .family()
                .map(|family| family.category().trimmed().to_string());
            self.named_element("header-type", category.as_deref().unwrap_or(UNKNOWN_HEADER))?;
        }
        if let Some(family) = claim.family() {
            self.named_element("license-family", family.name())?;
            let approved = claim.kind() == OutcomeKind::Approved;
            self.named_element("license-approval", if approved { "true" } else { "false" })?;
        }
        if let Some(sample) = claim.sample() {
            self.content_element("header-sample", sample)?;
        }
        if let Some(notes) = claim.notes() {
            self.content_element("license-notes", notes)?;
        }
        self.pipeline.send(ReportEvent::Close)
    }

    fn named_element(&self, element: &str, name: &str) -> Result<(), PipelineError> {
        self.pipeline.send(ReportEvent::open(element))?;
        self.pipeline.send(ReportEvent::attr("name", name))?;
        self.pipeline.send(ReportEvent::Close)
    }

    fn content_element(&self, element: &str, text: &str) -> Result<(), PipelineError> {
        self.pipeline.send(ReportEvent::open(element))?;
        self.pipeline.send(ReportEvent::content(text))?;
        self.pipeline.send(ReportEvent::Close)
    }

    fn write_statistics(&self, stats: &RunStatistics) -> Result<(), PipelineError> {
        self.pipeline.send(ReportEvent::open("statistics"))?;
        for (kind, count) in stats.kinds() {
            self.pipeline.send(ReportEvent::open("statistic"))?;
            self.pipeline
                .send(ReportEvent::attr("name", &kind.to_string()))?;
            self.pipeline
                .send(ReportEvent::attr("count", &count.to_string()))?;
            self.pipeline.send(ReportEvent::Close)?;
        }
        for (category, tally) in stats.families() {
            self.pipeline.send(ReportEvent::open("family"))?;
            self.pipeline
                .send(ReportEvent::attr("category", category.trimmed()))?;
            self.pipeline.send(ReportEvent::attr("name", &tally.name))?;
            self.pipeline
                .send(ReportEvent::attr("count", &tally.count.to_string()))?;
            self.pipeline.send(ReportEvent::Close)?;
        }
        self.pipeline.send(ReportEvent::Close)
    }

    /// Append the statistics block, end the document and wait for the
    /// consumer to drain.
    pub fn finish(self, stats: &RunStatistics) -> Result<(), PipelineError> {
        let produced = self
            .write_statistics(stats)
            .and_then(|()| self.pipeline.send(ReportEvent::CloseDocument));
        let drained = self.pipeline.finish();
        // A consumer-side error explains any producer-side disconnect, so it
        // wins when both halves failed.
        match (produced, drained) {
            (_, Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}
