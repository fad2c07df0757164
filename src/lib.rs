//! clipcap: capture-session lifecycle controller for video clips
//!
//! This crate owns the camera device binding, the active recording handle,
//! and the legal transitions between idle, recording, and finalizing.
//! Everything host-specific is an external collaborator behind a trait:
//! the preview surface, the camera provider, the OS permission prompts,
//! the media storage index, and the UI.
//!
//! # Features
//! - Permission-gated startup with a fresh capability set per attempt
//! - Exclusive capture binding, replaced atomically on camera switch
//! - A single recording handle driven by a four-state session machine
//! - All platform callbacks serialized onto one controller task
//! - Timestamp-named `video/mp4` clips under a conventional media path
//!
//! # Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use clipcap::{CaptureController, ClipCapConfig};
//!
//! let (controller, handle) = CaptureController::new(
//!     ClipCapConfig::load_or_default(),
//!     permission_host,
//!     camera_provider,
//!     preview,
//!     output_sink,
//!     presenter,
//! );
//! tokio::spawn(controller.run());
//! handle.on_capture_button_pressed();
//! ```

pub mod binder;
pub mod config;
pub mod controller;
pub mod errors;
pub mod output;
pub mod permissions;
pub mod platform;
pub mod session;
pub mod types;

// Testing utilities - in-memory fakes for offline testing
pub mod testing;

// Re-exports for convenience
pub use binder::{CaptureBinding, DeviceBinder};
pub use config::ClipCapConfig;
pub use controller::{CaptureController, ControllerHandle, Presenter};
pub use errors::CaptureError;
pub use output::{OutputSink, TargetDescriptor, TargetRequest};
pub use permissions::{Capability, PermissionGate, PermissionHost, PermissionSet};
pub use platform::{
    ActiveRecording, CameraProvider, PreviewSink, RecorderEvent, VideoRecorder,
};
pub use session::{RecordingSession, SessionState};
pub use types::{CameraFacing, ControlLabel, ControlSurface, RecordingId, RecordingOutcome};
