//! Device binding: associating a camera facing with the preview sink and a
//! recorder capability.
//!
//! At most one [`CaptureBinding`] exists at any instant. Rebinding (on
//! camera switch or retry after a failure) always releases the previous
//! binding before establishing the new one, so a failed bind leaves the
//! binder explicitly unbound rather than holding a stale binding.

use std::sync::Arc;

use crate::errors::CaptureError;
use crate::platform::{CameraProvider, PreviewSink, RecorderQuality, VideoRecorder};
use crate::types::CameraFacing;

/// The live association between a camera facing, the preview sink, and a
/// bound recorder capability. Owned exclusively by [`DeviceBinder`].
pub struct CaptureBinding {
    facing: CameraFacing,
    recorder: Arc<dyn VideoRecorder>,
}

impl CaptureBinding {
    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn recorder(&self) -> Arc<dyn VideoRecorder> {
        self.recorder.clone()
    }
}

/// Establishes and replaces the capture binding for a requested facing.
///
/// The provider handle is scoped to this binder: dropping the binder
/// releases whatever is bound, so no use case outlives the controller that
/// created it.
pub struct DeviceBinder {
    provider: Arc<dyn CameraProvider>,
    preview: Arc<dyn PreviewSink>,
    binding: Option<CaptureBinding>,
}

impl DeviceBinder {
    pub fn new(provider: Arc<dyn CameraProvider>, preview: Arc<dyn PreviewSink>) -> Self {
        Self {
            provider,
            preview,
            binding: None,
        }
    }

    /// Bind the preview and a highest-quality recorder to `facing`,
    /// releasing any prior binding first. Suspends until the camera
    /// provider is ready. On failure nothing is left bound.
    pub async fn bind(&mut self, facing: CameraFacing) -> Result<(), CaptureError> {
        self.release();

        match self
            .provider
            .bind(facing, self.preview.clone(), RecorderQuality::Highest)
            .await
        {
            Ok(recorder) => {
                log::info!("Bound {} camera with preview and recorder", facing);
                self.binding = Some(CaptureBinding { facing, recorder });
                Ok(())
            }
            Err(reason) => {
                log::error!("Use case binding failed: {}", reason);
                Err(CaptureError::BindFailed(reason))
            }
        }
    }

    /// Release the current binding. Idempotent.
    pub fn release(&mut self) {
        if let Some(old) = self.binding.take() {
            log::debug!("Releasing {} camera binding", old.facing());
        }
        self.provider.unbind_all();
    }

    pub fn binding(&self) -> Option<&CaptureBinding> {
        self.binding.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Facing of the current binding, if any.
    pub fn facing(&self) -> Option<CameraFacing> {
        self.binding.as_ref().map(|b| b.facing())
    }
}

impl Drop for DeviceBinder {
    fn drop(&mut self) {
        self.release();
    }
}
