//! Opaque platform capabilities.
//!
//! The camera provider, preview surface, and recorder are supplied by the
//! host platform and modeled as traits here. All recorder lifecycle events
//! are posted onto a channel and reduced by the controller task, so no
//! platform callback ever mutates session state from its own executor.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::output::TargetDescriptor;
use crate::types::{CameraFacing, RecordingId, RecordingOutcome};

/// Quality selector for the recorder use case. The binder always asks for
/// the highest quality the device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderQuality {
    Highest,
}

/// Asynchronous lifecycle events for one recording handle.
///
/// Platform guarantees assumed here: `Started`, if delivered, precedes
/// `Finalized` for the same id, and `Finalized` arrives at most once per id.
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    Started {
        id: RecordingId,
    },
    Finalized {
        id: RecordingId,
        outcome: RecordingOutcome,
    },
}

impl RecorderEvent {
    pub fn id(&self) -> RecordingId {
        match self {
            RecorderEvent::Started { id } => *id,
            RecorderEvent::Finalized { id, .. } => *id,
        }
    }
}

/// Channel end the platform posts recorder events into.
pub type RecorderEventSender = mpsc::UnboundedSender<RecorderEvent>;

/// Host-supplied surface that renders the live preview. Opaque to the core;
/// the binder only attaches it to the camera alongside the recorder.
pub trait PreviewSink: Send + Sync {}

/// An in-progress recording transaction against an allocated target.
pub trait ActiveRecording: Send {
    fn id(&self) -> RecordingId;

    /// Ask the platform to stop capturing and finalize the output. The
    /// terminal `Finalized` event still arrives asynchronously. Safe to
    /// call more than once.
    fn stop(&mut self);
}

/// Bound recorder capability produced by a successful bind.
pub trait VideoRecorder: Send + Sync {
    /// Begin recording into `target`, with an audio track when `with_audio`
    /// is set. A failure here means capture never began and no handle was
    /// created; errors are reason strings converted to
    /// `CaptureError::StartFailed` by the session.
    fn begin(
        &self,
        target: &TargetDescriptor,
        with_audio: bool,
        events: RecorderEventSender,
    ) -> Result<Box<dyn ActiveRecording>, String>;
}

/// The platform camera provider.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Bind the preview sink and a recorder of the requested quality to the
    /// chosen camera. Suspends until the provider itself is ready; this is
    /// the binder's only suspension point. Errors are reason strings
    /// converted to `CaptureError::BindFailed` by the binder.
    async fn bind(
        &self,
        facing: CameraFacing,
        preview: Arc<dyn PreviewSink>,
        quality: RecorderQuality,
    ) -> Result<Arc<dyn VideoRecorder>, String>;

    /// Release every use case currently bound. Idempotent; safe to call
    /// when nothing is bound.
    fn unbind_all(&self);
}
