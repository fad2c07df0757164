//! The capture controller: single owner of all session and binding state.
//!
//! The controller runs as one task. User commands arrive through a
//! [`ControllerHandle`] and recorder callbacks through a dedicated event
//! channel; both are reduced in order by [`CaptureController::run`], so no
//! platform executor ever mutates session or binding state directly.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::binder::DeviceBinder;
use crate::config::ClipCapConfig;
use crate::errors::CaptureError;
use crate::output::{new_clip_request, OutputSink};
use crate::permissions::{Capability, GrantResults, PermissionGate, PermissionHost};
use crate::platform::{CameraProvider, PreviewSink, RecorderEvent, RecorderEventSender};
use crate::session::{PressIntent, RecordingSession};
use crate::types::{CameraFacing, ControlSurface, RecordingOutcome};

/// Callbacks into the presentation layer. All of them are invoked from the
/// controller task; implementations marshal onto their own UI thread as
/// needed.
pub trait Presenter: Send + Sync {
    /// The capture affordance changed label or enablement.
    fn on_control_changed(&self, surface: ControlSurface);
    /// A recording finalized, successfully or not.
    fn on_recording_finished(&self, outcome: RecordingOutcome);
    /// A bind attempt failed; nothing is bound.
    fn on_binding_failed(&self, error: CaptureError);
    /// Required capabilities were denied; the flow ends for this attempt.
    fn on_permission_denied(&self, missing: Vec<Capability>);
    /// Toast-style informational message.
    fn on_notice(&self, message: String);
}

enum Command {
    CapturePressed,
    SwitchCameraPressed,
    PermissionResult(GrantResults),
    Shutdown,
}

/// Cloneable entry point the presentation layer drives the controller with.
/// Messages sent after shutdown are dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    pub fn on_capture_button_pressed(&self) {
        let _ = self.tx.send(Command::CapturePressed);
    }

    pub fn on_switch_camera_pressed(&self) {
        let _ = self.tx.send(Command::SwitchCameraPressed);
    }

    /// Out-of-band delivery of the OS prompt result.
    pub fn on_permission_result(&self, grants: GrantResults) {
        let _ = self.tx.send(Command::PermissionResult(grants));
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Owns the permission gate, device binder, and recording session, and
/// reduces every command and platform event on one task.
pub struct CaptureController {
    config: ClipCapConfig,
    gate: PermissionGate,
    binder: DeviceBinder,
    session: RecordingSession,
    sink: Arc<dyn OutputSink>,
    presenter: Arc<dyn Presenter>,
    facing: CameraFacing,
    commands: mpsc::UnboundedReceiver<Command>,
    events_rx: mpsc::UnboundedReceiver<RecorderEvent>,
    events_tx: RecorderEventSender,
    last_surface: Option<ControlSurface>,
}

impl CaptureController {
    pub fn new(
        config: ClipCapConfig,
        permission_host: Arc<dyn PermissionHost>,
        provider: Arc<dyn CameraProvider>,
        preview: Arc<dyn PreviewSink>,
        sink: Arc<dyn OutputSink>,
        presenter: Arc<dyn Presenter>,
    ) -> (Self, ControllerHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let gate = PermissionGate::new(permission_host, config.platform.clone());
        let binder = DeviceBinder::new(provider, preview);

        let controller = Self {
            config,
            gate,
            binder,
            session: RecordingSession::new(),
            sink,
            presenter,
            facing: CameraFacing::default(),
            commands,
            events_rx,
            events_tx,
            last_surface: None,
        };
        (controller, ControllerHandle { tx })
    }

    /// Run until shutdown. Binds immediately when permissions are already
    /// granted, otherwise fires the OS prompt and waits for the result to
    /// arrive through the handle.
    pub async fn run(mut self) {
        if self.gate.check_granted() {
            self.bind_current().await;
        } else {
            self.gate.request_grant();
        }
        self.push_surface();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.events_rx.recv() => self.handle_recorder_event(event),
            }
        }

        self.binder.release();
        log::info!("Capture controller shut down");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::CapturePressed => self.handle_capture_pressed().await,
            Command::SwitchCameraPressed => self.handle_switch_camera().await,
            Command::PermissionResult(grants) => self.handle_permission_result(grants).await,
            Command::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    async fn handle_capture_pressed(&mut self) {
        match self.session.press_intent() {
            PressIntent::StopActive => {
                self.session.stop();
            }
            PressIntent::StartNew => {
                self.try_start().await;
            }
            PressIntent::Ignore => {
                log::debug!("Capture press ignored while finalizing");
            }
        }
        self.push_surface();
    }

    async fn try_start(&mut self) {
        let missing = self.gate.missing_now();
        if !missing.is_empty() {
            log::warn!("Capture refused, missing capabilities: {:?}", missing);
            self.presenter.on_permission_denied(missing);
            return;
        }

        // A failed or never-attempted bind leaves the binder unbound;
        // starting re-attempts it instead of reusing stale state.
        if !self.binder.is_bound() && !self.bind_current().await {
            return;
        }

        let Some(binding) = self.binder.binding() else {
            return;
        };
        let recorder = binding.recorder();

        let target = match self.sink.allocate_target(new_clip_request(&self.config.storage)) {
            Ok(target) => target,
            Err(reason) => {
                let error = CaptureError::OutputSinkFailed(reason);
                log::error!("{}", error);
                self.presenter.on_notice(error.to_string());
                return;
            }
        };

        let with_audio = self.config.recording.audio_when_granted
            && self.gate.is_granted(Capability::Microphone);

        if let Err(error) =
            self.session
                .start(recorder.as_ref(), &target, with_audio, self.events_tx.clone())
        {
            log::error!("{}", error);
            self.presenter.on_notice(error.to_string());
        }
    }

    async fn handle_switch_camera(&mut self) {
        if self.session.has_active_handle() || self.session.in_flight() {
            log::warn!("Camera switch rejected while a recording is in flight");
            self.presenter
                .on_notice("Cannot switch camera while recording".to_string());
            return;
        }

        self.facing = self.facing.toggled();
        log::info!("Switching to {} camera", self.facing);

        if self.gate.check_granted() {
            self.bind_current().await;
        }
        self.push_surface();
    }

    async fn handle_permission_result(&mut self, grants: GrantResults) {
        let missing = self.gate.missing_after(&grants);
        if missing.is_empty() {
            self.bind_current().await;
        } else {
            log::warn!("Permissions not granted by the user: {:?}", missing);
            self.presenter.on_permission_denied(missing);
        }
        self.push_surface();
    }

    fn handle_recorder_event(&mut self, event: RecorderEvent) {
        if let Some(outcome) = self.session.handle_event(event) {
            self.presenter.on_recording_finished(outcome);
        }
        self.push_surface();
    }

    async fn bind_current(&mut self) -> bool {
        match self.binder.bind(self.facing).await {
            Ok(()) => true,
            Err(error) => {
                self.presenter.on_binding_failed(error);
                false
            }
        }
    }

    /// Forward the derived control surface, suppressing duplicates.
    fn push_surface(&mut self) {
        let surface = self.session.control_surface();
        if self.last_surface != Some(surface) {
            self.last_surface = Some(surface);
            self.presenter.on_control_changed(surface);
        }
    }
}
