//! Scriptable fakes for the platform, storage, permission, and presentation
//! seams. Failure modes are injected per call site (`fail_next_*`), and
//! every interaction is logged so tests can assert on exact call sequences.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::controller::Presenter;
use crate::errors::CaptureError;
use crate::output::{OutputSink, TargetDescriptor, TargetRequest, VIDEO_MIME_TYPE};
use crate::permissions::{Capability, PermissionHost, PermissionSet};
use crate::platform::{
    ActiveRecording, CameraProvider, PreviewSink, RecorderEvent, RecorderEventSender,
    RecorderQuality, VideoRecorder,
};
use crate::types::{CameraFacing, ControlSurface, RecordingId, RecordingOutcome};

/// Preview surface that renders nothing.
pub struct NullPreview;

impl PreviewSink for NullPreview {}

/// A ready-made target descriptor for session-level tests that skip the
/// output sink.
pub fn fake_target() -> TargetDescriptor {
    TargetDescriptor {
        display_name: "2024-01-01-00-00-00-000".to_string(),
        mime_type: VIDEO_MIME_TYPE.to_string(),
        relative_path: "Movies/ClipCap-Video".to_string(),
        location: "mediastore://video/2024-01-01-00-00-00-000".to_string(),
    }
}

/// Collect everything currently queued on a recorder-event receiver.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<RecorderEvent>) -> Vec<RecorderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

struct CurrentRecording {
    id: RecordingId,
    location: String,
    events: RecorderEventSender,
}

#[derive(Default)]
struct RecorderInner {
    fail_begin: Mutex<Option<String>>,
    fail_finalize: Mutex<Option<String>>,
    current: Mutex<Option<CurrentRecording>>,
    begin_log: Mutex<Vec<(RecordingId, bool)>>,
}

impl RecorderInner {
    fn finalize(&self, id: RecordingId) {
        let mut current = self.current.lock().expect("lock poisoned");
        let Some(cur) = current.take() else {
            return;
        };
        if cur.id != id {
            *current = Some(cur);
            return;
        }
        let outcome = match self.fail_finalize.lock().expect("lock poisoned").take() {
            Some(reason) => RecordingOutcome::Failure {
                error: CaptureError::RecordingFailed(reason),
            },
            None => RecordingOutcome::Success {
                location: cur.location.clone(),
            },
        };
        let _ = cur.events.send(RecorderEvent::Finalized { id, outcome });
    }
}

/// Recorder capability whose recordings live entirely in memory.
///
/// By default a `begin` emits `Started` immediately; disable `auto_start`
/// to confirm capture manually with [`confirm_started`](Self::confirm_started).
#[derive(Clone)]
pub struct FakeVideoRecorder {
    inner: Arc<RecorderInner>,
    auto_start: Arc<AtomicBool>,
}

impl FakeVideoRecorder {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RecorderInner::default()),
            auto_start: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Make the next `begin` fail before the first frame.
    pub fn fail_next_begin(&self, reason: &str) {
        *self.inner.fail_begin.lock().expect("lock poisoned") = Some(reason.to_string());
    }

    /// Make the next finalize report a mid-stream failure.
    pub fn fail_next_finalize(&self, reason: &str) {
        *self.inner.fail_finalize.lock().expect("lock poisoned") = Some(reason.to_string());
    }

    /// Suppress the automatic `Started` emission on `begin`.
    pub fn set_auto_start(&self, auto: bool) {
        self.auto_start.store(auto, Ordering::SeqCst);
    }

    /// Emit `Started` for the in-flight recording, if any.
    pub fn confirm_started(&self) {
        let current = self.inner.current.lock().expect("lock poisoned");
        if let Some(cur) = current.as_ref() {
            let _ = cur.events.send(RecorderEvent::Started { id: cur.id });
        }
    }

    /// Finalize the in-flight recording with an error, as the platform does
    /// when output fails mid-stream.
    pub fn abort_current(&self, reason: &str) {
        let mut current = self.inner.current.lock().expect("lock poisoned");
        if let Some(cur) = current.take() {
            let _ = cur.events.send(RecorderEvent::Finalized {
                id: cur.id,
                outcome: RecordingOutcome::Failure {
                    error: CaptureError::RecordingFailed(reason.to_string()),
                },
            });
        }
    }

    /// Every `begin` call as `(id, with_audio)`.
    pub fn begin_log(&self) -> Vec<(RecordingId, bool)> {
        self.inner.begin_log.lock().expect("lock poisoned").clone()
    }

    pub fn has_current(&self) -> bool {
        self.inner.current.lock().expect("lock poisoned").is_some()
    }
}

impl Default for FakeVideoRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoRecorder for FakeVideoRecorder {
    fn begin(
        &self,
        target: &TargetDescriptor,
        with_audio: bool,
        events: RecorderEventSender,
    ) -> Result<Box<dyn ActiveRecording>, String> {
        let id = RecordingId::new();
        self.inner
            .begin_log
            .lock()
            .expect("lock poisoned")
            .push((id, with_audio));

        if let Some(reason) = self.inner.fail_begin.lock().expect("lock poisoned").take() {
            return Err(reason);
        }

        *self.inner.current.lock().expect("lock poisoned") = Some(CurrentRecording {
            id,
            location: target.location.clone(),
            events: events.clone(),
        });

        if self.auto_start.load(Ordering::SeqCst) {
            let _ = events.send(RecorderEvent::Started { id });
        }

        Ok(Box::new(FakeRecording {
            id,
            inner: self.inner.clone(),
        }))
    }
}

struct FakeRecording {
    id: RecordingId,
    inner: Arc<RecorderInner>,
}

impl ActiveRecording for FakeRecording {
    fn id(&self) -> RecordingId {
        self.id
    }

    fn stop(&mut self) {
        self.inner.finalize(self.id);
    }
}

/// Camera provider with a scriptable bind failure and call log.
pub struct FakeCameraProvider {
    recorder: FakeVideoRecorder,
    fail_next: Mutex<Option<String>>,
    bind_log: Mutex<Vec<CameraFacing>>,
    unbind_count: AtomicUsize,
}

impl FakeCameraProvider {
    pub fn new() -> Self {
        Self {
            recorder: FakeVideoRecorder::new(),
            fail_next: Mutex::new(None),
            bind_log: Mutex::new(Vec::new()),
            unbind_count: AtomicUsize::new(0),
        }
    }

    /// Make the next `bind` fail with the given reason.
    pub fn fail_next_bind(&self, reason: &str) {
        *self.fail_next.lock().expect("lock poisoned") = Some(reason.to_string());
    }

    /// The recorder capability every successful bind hands out.
    pub fn recorder(&self) -> FakeVideoRecorder {
        self.recorder.clone()
    }

    pub fn bind_log(&self) -> Vec<CameraFacing> {
        self.bind_log.lock().expect("lock poisoned").clone()
    }

    pub fn unbind_count(&self) -> usize {
        self.unbind_count.load(Ordering::SeqCst)
    }
}

impl Default for FakeCameraProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraProvider for FakeCameraProvider {
    async fn bind(
        &self,
        facing: CameraFacing,
        _preview: Arc<dyn PreviewSink>,
        _quality: RecorderQuality,
    ) -> Result<Arc<dyn VideoRecorder>, String> {
        if let Some(reason) = self.fail_next.lock().expect("lock poisoned").take() {
            return Err(reason);
        }
        self.bind_log.lock().expect("lock poisoned").push(facing);
        Ok(Arc::new(self.recorder.clone()))
    }

    fn unbind_all(&self) {
        self.unbind_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Output sink that indexes targets in memory under `mediastore://` ids.
pub struct MemoryOutputSink {
    allocated: Mutex<Vec<TargetDescriptor>>,
    fail_next: Mutex<Option<String>>,
}

impl MemoryOutputSink {
    pub fn new() -> Self {
        Self {
            allocated: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    pub fn fail_next_allocation(&self, reason: &str) {
        *self.fail_next.lock().expect("lock poisoned") = Some(reason.to_string());
    }

    pub fn allocated(&self) -> Vec<TargetDescriptor> {
        self.allocated.lock().expect("lock poisoned").clone()
    }
}

impl Default for MemoryOutputSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for MemoryOutputSink {
    fn allocate_target(&self, request: TargetRequest) -> Result<TargetDescriptor, String> {
        if let Some(reason) = self.fail_next.lock().expect("lock poisoned").take() {
            return Err(reason);
        }
        let descriptor = TargetDescriptor {
            location: format!("mediastore://video/{}", request.display_name),
            display_name: request.display_name,
            mime_type: request.mime_type,
            relative_path: request.relative_path,
        };
        self.allocated
            .lock()
            .expect("lock poisoned")
            .push(descriptor.clone());
        Ok(descriptor)
    }
}

/// Permission host backed by an in-memory grant set.
pub struct StaticPermissionHost {
    granted: Mutex<HashSet<Capability>>,
    requests: Mutex<Vec<Vec<Capability>>>,
}

impl StaticPermissionHost {
    pub fn granting(caps: &[Capability]) -> Self {
        Self {
            granted: Mutex::new(caps.iter().copied().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn all_granted() -> Self {
        Self::granting(&[
            Capability::Camera,
            Capability::Microphone,
            Capability::ExternalStorage,
        ])
    }

    pub fn grant(&self, capability: Capability) {
        self.granted.lock().expect("lock poisoned").insert(capability);
    }

    pub fn revoke(&self, capability: Capability) {
        self.granted.lock().expect("lock poisoned").remove(&capability);
    }

    /// Capability sets the host has been asked to prompt for.
    pub fn requests(&self) -> Vec<Vec<Capability>> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

impl PermissionHost for StaticPermissionHost {
    fn is_granted(&self, capability: Capability) -> bool {
        self.granted.lock().expect("lock poisoned").contains(&capability)
    }

    fn request(&self, set: &PermissionSet) {
        self.requests
            .lock()
            .expect("lock poisoned")
            .push(set.capabilities().to_vec());
    }
}

/// One observed presentation callback.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    ControlChanged(ControlSurface),
    RecordingFinished(RecordingOutcome),
    BindingFailed(CaptureError),
    PermissionDenied(Vec<Capability>),
    Notice(String),
}

/// Presenter that records every callback for assertions.
#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    pub fn last_surface(&self) -> Option<ControlSurface> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                PresenterCall::ControlChanged(surface) => Some(surface),
                _ => None,
            })
    }

    pub fn finished(&self) -> Vec<RecordingOutcome> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::RecordingFinished(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    pub fn binding_failures(&self) -> Vec<CaptureError> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::BindingFailed(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn denials(&self) -> Vec<Vec<Capability>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::PermissionDenied(missing) => Some(missing),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn on_control_changed(&self, surface: ControlSurface) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(PresenterCall::ControlChanged(surface));
    }

    fn on_recording_finished(&self, outcome: RecordingOutcome) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(PresenterCall::RecordingFinished(outcome));
    }

    fn on_binding_failed(&self, error: CaptureError) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(PresenterCall::BindingFailed(error));
    }

    fn on_permission_denied(&self, missing: Vec<Capability>) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(PresenterCall::PermissionDenied(missing));
    }

    fn on_notice(&self, message: String) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(PresenterCall::Notice(message));
    }
}
