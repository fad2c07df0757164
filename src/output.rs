//! Output sink contract and clip naming.
//!
//! The core never writes media bytes itself. It asks the host's
//! [`OutputSink`] for a named, typed target and hands the resulting
//! descriptor to the platform recorder.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;

/// MIME type for every generated clip.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Display-name timestamp format, millisecond precision.
pub const CLIP_NAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

/// What the core asks the sink to allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
}

/// A sink-allocated write target. `location` is the sink's opaque
/// descriptor of where the finished clip will be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    pub location: String,
}

/// External media storage/indexing service.
pub trait OutputSink: Send + Sync {
    /// Allocate a new write target. Errors are reported as a reason string
    /// and converted to `CaptureError::OutputSinkFailed` by the caller.
    fn allocate_target(&self, request: TargetRequest) -> Result<TargetDescriptor, String>;
}

/// Timestamp-derived display name for a clip started at `at`.
pub fn clip_display_name(at: DateTime<Local>) -> String {
    at.format(CLIP_NAME_FORMAT).to_string()
}

/// Build the allocation request for a clip starting now.
pub fn new_clip_request(storage: &StorageConfig) -> TargetRequest {
    TargetRequest {
        display_name: clip_display_name(Local::now()),
        mime_type: VIDEO_MIME_TYPE.to_string(),
        relative_path: storage.relative_path(),
    }
}
