//! Bounded producer/consumer pipeline for report events.
//!
//! The serializer produces [`ReportEvent`]s on the caller's thread while a
//! dedicated consumer thread drains them into a [`Transform`]. The channel
//! is bounded, so a slow consumer applies backpressure to the scan instead
//! of buffering the whole report in memory.

use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::{debug, Level};

use crate::error::{PipelineError, WriteError};
use crate::events::ReportEvent;
use crate::transform::Transform;

/// Events buffered between producer and consumer before `send` blocks.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A running report consumer and the sending half feeding it.
pub struct ReportPipeline {
    sender: SyncSender<ReportEvent>,
    consumer: JoinHandle<Result<(), WriteError>>,
}

impl ReportPipeline {
    /// Spawn the consumer thread with the default channel capacity.
    pub fn spawn(transform: Box<dyn Transform>) -> Self {
        Self::spawn_with_capacity(transform, EVENT_CHANNEL_CAPACITY)
    }

    pub fn spawn_with_capacity(mut transform: Box<dyn Transform>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let consumer = thread::spawn(move || {
            let span = tracing::span!(Level::DEBUG, "report.consume");
            let _guard = span.enter();
            while let Ok(event) = receiver.recv() {
                transform.event(event)?;
            }
            transform.finish()
        });
        debug!(capacity = capacity, "report_pipeline_spawned");
        ReportPipeline { sender, consumer }
    }

    /// Send one event to the consumer, blocking while the channel is full.
    ///
    /// `Disconnected` here means the consumer already stopped; the error it
    /// stopped with is surfaced by [`finish`](Self::finish).
    pub fn send(&self, event: ReportEvent) -> Result<(), PipelineError> {
        self.sender
            .send(event)
            .map_err(|_| PipelineError::Disconnected)
    }

    /// Close the channel and wait for the consumer to drain and finish.
    pub fn finish(self) -> Result<(), PipelineError> {
        let ReportPipeline { sender, consumer } = self;
        drop(sender);
        match consumer.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(PipelineError::Consumer(err)),
            Err(_) => Err(PipelineError::ConsumerPanicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_sink::SharedSink;
    use crate::transform::XmlTransform;

    struct FailingTransform;

    impl Transform for FailingTransform {
        fn event(&mut self, _event: ReportEvent) -> Result<(), WriteError> {
            Err(WriteError::NoOpenElement)
        }

        fn finish(&mut self) -> Result<(), WriteError> {
            Ok(())
        }
    }

    struct PanickingTransform;

    impl Transform for PanickingTransform {
        fn event(&mut self, _event: ReportEvent) -> Result<(), WriteError> {
            panic!("consumer blew up");
        }

        fn finish(&mut self) -> Result<(), WriteError> {
            Ok(())
        }
    }

    #[test]
    fn events_flow_through_to_the_transform() {
        let sink = SharedSink::new();
        let pipeline = ReportPipeline::spawn(Box::new(XmlTransform::new(sink.clone())));
        pipeline.send(ReportEvent::open("audit-report")).unwrap();
        pipeline.send(ReportEvent::open("resource")).unwrap();
        pipeline.send(ReportEvent::attr("name", "src/lib.rs")).unwrap();
        pipeline.send(ReportEvent::Close).unwrap();
        pipeline.send(ReportEvent::CloseDocument).unwrap();
        pipeline.finish().unwrap();
        assert_eq!(
            sink.contents(),
            "<?xml version='1.0'?>\
             <audit-report><resource name='src/lib.rs'/></audit-report>"
        );
    }

    #[test]
    fn consumer_error_surfaces_at_finish() {
        let pipeline = ReportPipeline::spawn_with_capacity(Box::new(FailingTransform), 1);
        // The first send is accepted; once the consumer bails, later sends
        // see a closed channel. Either way the real error comes from finish.
        let mut disconnected = false;
        for _ in 0..16 {
            if pipeline.send(ReportEvent::open("audit-report")).is_err() {
                disconnected = true;
                break;
            }
        }
        assert!(disconnected);
        match pipeline.finish() {
            Err(PipelineError::Consumer(WriteError::NoOpenElement)) => {}
            other => panic!("expected consumer error, got {other:?}"),
        }
    }

    #[test]
    fn consumer_panic_is_reported() {
        let pipeline = ReportPipeline::spawn_with_capacity(Box::new(PanickingTransform), 1);
        let _ = pipeline.send(ReportEvent::open("audit-report"));
        match pipeline.finish() {
            Err(PipelineError::ConsumerPanicked) => {}
            other => panic!("expected panic report, got {other:?}"),
        }
    }
}
