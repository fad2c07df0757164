//! The recording-session state machine.
//!
//! [`RecordingSession`] owns at most one recording handle at a time and
//! reduces the platform's asynchronous lifecycle events into UI-facing
//! state. The single capture affordance toggles: whether a press means
//! "start" or "stop" is decided by handle existence, never by the label
//! currently shown.

use serde::{Deserialize, Serialize};

use crate::errors::CaptureError;
use crate::output::TargetDescriptor;
use crate::platform::{ActiveRecording, RecorderEvent, RecorderEventSender, VideoRecorder};
use crate::types::{ControlLabel, ControlSurface, RecordingId, RecordingOutcome};

/// Lifecycle states of the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// `start` was accepted; waiting for the platform to confirm capture
    /// has begun. The control surface is disabled in this window, which is
    /// the only re-entrancy guard the UI needs.
    Starting,
    Recording,
    /// Stop was requested; waiting for the terminal finalize event.
    Finalizing,
}

/// What a capture-button press means right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressIntent {
    /// A handle exists: stop it.
    StopActive,
    /// Idle with no handle: begin a new recording.
    StartNew,
    /// Finalizing with the handle already cleared: nothing to do.
    Ignore,
}

/// Owns the active recording handle and the legal transitions between
/// `Idle`, `Starting`, `Recording`, and `Finalizing`.
pub struct RecordingSession {
    state: SessionState,
    /// The in-progress handle. Cleared immediately on explicit stop so a
    /// second press cannot double-operate on it.
    active: Option<Box<dyn ActiveRecording>>,
    /// Id of the recording still awaiting its finalize event. Outlives
    /// `active` between an explicit stop and the finalize delivery.
    pending: Option<RecordingId>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            active: None,
            pending: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a recording handle exists in session ownership.
    pub fn has_active_handle(&self) -> bool {
        self.active.is_some()
    }

    /// True from a successful `start` until the finalize event lands,
    /// including the window after an explicit stop.
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// UI state of the capture affordance, derived purely from the session
    /// state so the two cannot drift apart.
    pub fn control_surface(&self) -> ControlSurface {
        match self.state {
            SessionState::Idle => ControlSurface {
                label: ControlLabel::Start,
                enabled: true,
            },
            SessionState::Starting => ControlSurface {
                label: ControlLabel::Start,
                enabled: false,
            },
            SessionState::Recording => ControlSurface {
                label: ControlLabel::Stop,
                enabled: true,
            },
            SessionState::Finalizing => ControlSurface {
                label: ControlLabel::Stop,
                enabled: false,
            },
        }
    }

    /// Decide what the capture button should do. Checked against handle
    /// existence first: pressing while a handle exists is always a stop.
    pub fn press_intent(&self) -> PressIntent {
        if self.active.is_some() {
            PressIntent::StopActive
        } else if self.state == SessionState::Idle {
            PressIntent::StartNew
        } else {
            PressIntent::Ignore
        }
    }

    /// Begin a new recording into `target`. Legal only from `Idle` with no
    /// handle in flight; the caller is expected to have routed presses
    /// through [`press_intent`](Self::press_intent) first.
    ///
    /// A failure here means capture never began: no handle exists and the
    /// session stays `Idle`.
    pub fn start(
        &mut self,
        recorder: &dyn VideoRecorder,
        target: &TargetDescriptor,
        with_audio: bool,
        events: RecorderEventSender,
    ) -> Result<(), CaptureError> {
        debug_assert!(self.active.is_none() && self.pending.is_none());

        let handle = recorder
            .begin(target, with_audio, events)
            .map_err(CaptureError::StartFailed)?;

        let id = handle.id();
        log::info!(
            "Recording {} started toward {} (audio: {})",
            id,
            target.display_name,
            with_audio
        );
        self.pending = Some(id);
        self.active = Some(handle);
        self.state = SessionState::Starting;
        Ok(())
    }

    /// Stop the active handle, clearing it from session ownership
    /// immediately. No-op when no handle exists.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.active.take() {
            log::info!("Stopping recording {}", handle.id());
            handle.stop();
            self.state = SessionState::Finalizing;
        }
    }

    /// Reduce one platform event. Events whose id does not match the
    /// in-flight recording are stale replays and are discarded.
    ///
    /// Returns the terminal outcome when the event finalized the session.
    pub fn handle_event(&mut self, event: RecorderEvent) -> Option<RecordingOutcome> {
        if self.pending != Some(event.id()) {
            log::debug!("Discarding stale recorder event for {}", event.id());
            return None;
        }

        match event {
            RecorderEvent::Started { id } => {
                if self.state == SessionState::Starting {
                    log::debug!("Capture confirmed for recording {}", id);
                    self.state = SessionState::Recording;
                }
                None
            }
            RecorderEvent::Finalized { id, outcome } => {
                match &outcome {
                    RecordingOutcome::Success { location } => {
                        log::info!("Video capture succeeded: {}", location);
                    }
                    RecordingOutcome::Failure { error } => {
                        log::error!("Video capture ends with error: {}", error);
                    }
                }
                // Release the handle if an internal error finalized it
                // before any explicit stop. Idempotent when already cleared.
                self.active = None;
                self.pending = None;
                self.state = SessionState::Idle;
                log::debug!("Recording {} finalized, session idle", id);
                Some(outcome)
            }
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
