//! Testing utilities for clipcap
//!
//! In-memory stand-ins for every host-supplied collaborator (camera
//! provider, recorder, output sink, permission host, presenter), enabling
//! reliable offline testing of the full capture lifecycle without hardware.

pub mod fakes;

pub use fakes::{
    drain_events, fake_target, FakeCameraProvider, FakeVideoRecorder, MemoryOutputSink,
    NullPreview, PresenterCall, RecordingPresenter, StaticPermissionHost,
};
