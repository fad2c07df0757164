//! Core data model shared across the capture pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CaptureError;

/// Which physical camera a binding targets. Exactly one facing is active at
/// a time; the default is the back camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    /// Pure toggle between the two facings. Callers that want the switch to
    /// take effect must follow it with a rebind.
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::Front => write!(f, "front"),
        }
    }
}

/// Identity of one in-progress recording transaction. Events carry this id
/// so stale deliveries for an already-cleared handle can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingId(Uuid);

impl RecordingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal result of finalizing a recording handle. Produced exactly once
/// per handle and forwarded to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingOutcome {
    /// The clip was written and indexed; `location` is the sink-assigned
    /// descriptor of where it landed.
    Success { location: String },
    /// The recording ended with an error and no usable clip.
    Failure { error: CaptureError },
}

impl RecordingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecordingOutcome::Success { .. })
    }
}

/// Label on the single capture affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLabel {
    Start,
    Stop,
}

/// UI-facing state of the capture affordance. This is always derived from
/// the session state, never mutated independently, so the label cannot
/// drift from what the session will actually do on the next press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub label: ControlLabel,
    pub enabled: bool,
}

impl ControlSurface {
    pub fn ready() -> Self {
        Self {
            label: ControlLabel::Start,
            enabled: true,
        }
    }
}
