use crate::permissions::Capability;

/// Crate-wide error taxonomy.
///
/// Every platform-level failure is converted into one of these kinds at the
/// boundary where it occurs (permission check, use-case binding, recorder
/// start, finalize). None of them is process-fatal: each leaves the
/// controller in a retryable state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CaptureError {
    /// A required capability is not granted. Terminal for the current
    /// attempt; the user must re-invoke after granting.
    #[error("permission denied: missing {0:?}")]
    PermissionDenied(Vec<Capability>),

    /// The camera provider could not bind the requested use cases.
    /// No binding is left active; the next start re-attempts the bind.
    #[error("use case binding failed: {0}")]
    BindFailed(String),

    /// The recorder refused to begin before the first frame. No recording
    /// handle exists when this is returned.
    #[error("recording failed to start: {0}")]
    StartFailed(String),

    /// The recording ended with an error mid-stream, reported through the
    /// finalize event. The handle has been released.
    #[error("recording failed: {0}")]
    RecordingFailed(String),

    /// The output sink could not allocate a target for a new clip.
    #[error("output target allocation failed: {0}")]
    OutputSinkFailed(String),

    /// Configuration file could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
