//! Capability gating for the capture pipeline.
//!
//! The OS permission subsystem is an external collaborator behind the
//! [`PermissionHost`] trait. [`PermissionGate`] evaluates the required
//! [`PermissionSet`] fresh on every startup or retry and never touches the
//! capture session itself; the controller decides whether to proceed to
//! binding based on the result.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PlatformConfig;

/// An OS-mediated permission gating access to a device capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Camera,
    Microphone,
    /// Legacy external-storage write access, required only on platform
    /// versions at or below the configured threshold.
    ExternalStorage,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Camera => write!(f, "camera"),
            Capability::Microphone => write!(f, "microphone"),
            Capability::ExternalStorage => write!(f, "external-storage"),
        }
    }
}

/// Per-capability grant results delivered out-of-band after a prompt.
pub type GrantResults = HashMap<Capability, bool>;

/// The set of capabilities that must be authorized before any binding.
///
/// Immutable per platform-version policy; rebuilt from config on each
/// evaluation rather than cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    capabilities: Vec<Capability>,
}

impl PermissionSet {
    /// Build the required set for the given platform policy.
    pub fn required(platform: &PlatformConfig) -> Self {
        let mut capabilities = vec![Capability::Camera, Capability::Microphone];
        if platform.api_level <= platform.legacy_storage_max_level {
            capabilities.push(Capability::ExternalStorage);
        }
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Seam to the OS permission subsystem.
pub trait PermissionHost: Send + Sync {
    /// Whether the capability is currently authorized.
    fn is_granted(&self, capability: Capability) -> bool;

    /// Trigger the asynchronous OS-level prompt for the whole set. The
    /// result is delivered out-of-band through the controller's
    /// `on_permission_result` entry point, not returned here.
    fn request(&self, set: &PermissionSet);
}

/// Evaluates and requests the required capability set.
pub struct PermissionGate {
    host: Arc<dyn PermissionHost>,
    platform: PlatformConfig,
}

impl PermissionGate {
    pub fn new(host: Arc<dyn PermissionHost>, platform: PlatformConfig) -> Self {
        Self { host, platform }
    }

    /// The set required under the current platform policy.
    pub fn required_set(&self) -> PermissionSet {
        PermissionSet::required(&self.platform)
    }

    /// True when every required capability is currently authorized.
    pub fn check_granted(&self) -> bool {
        self.required_set()
            .capabilities()
            .iter()
            .all(|&c| self.host.is_granted(c))
    }

    /// Whether a single capability is authorized right now. Used at start
    /// time to decide whether the handle captures an audio track.
    pub fn is_granted(&self, capability: Capability) -> bool {
        self.host.is_granted(capability)
    }

    /// Fire the OS prompt for the full required set.
    pub fn request_grant(&self) {
        let set = self.required_set();
        log::info!("Requesting capability grants: {:?}", set.capabilities());
        self.host.request(&set);
    }

    /// Which required capabilities are missing right now.
    pub fn missing_now(&self) -> Vec<Capability> {
        self.required_set()
            .capabilities()
            .iter()
            .copied()
            .filter(|&c| !self.host.is_granted(c))
            .collect()
    }

    /// Which required capabilities a grant-result map leaves missing.
    ///
    /// The prompt result may not cover every required capability, so
    /// anything absent from the map is re-checked against the host's
    /// current state rather than counted as denied.
    pub fn missing_after(&self, results: &GrantResults) -> Vec<Capability> {
        self.required_set()
            .capabilities()
            .iter()
            .copied()
            .filter(|c| match results.get(c) {
                Some(granted) => !granted,
                None => !self.host.is_granted(*c),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct TestHost {
        granted: Mutex<HashSet<Capability>>,
        requests: Mutex<usize>,
    }

    impl TestHost {
        fn granting(caps: &[Capability]) -> Self {
            Self {
                granted: Mutex::new(caps.iter().copied().collect()),
                requests: Mutex::new(0),
            }
        }
    }

    impl PermissionHost for TestHost {
        fn is_granted(&self, capability: Capability) -> bool {
            self.granted.lock().unwrap().contains(&capability)
        }

        fn request(&self, _set: &PermissionSet) {
            *self.requests.lock().unwrap() += 1;
        }
    }

    fn platform(api_level: u32) -> PlatformConfig {
        PlatformConfig {
            api_level,
            legacy_storage_max_level: 28,
        }
    }

    #[test]
    fn modern_platform_needs_no_storage_grant() {
        let set = PermissionSet::required(&platform(33));
        assert!(set.contains(Capability::Camera));
        assert!(set.contains(Capability::Microphone));
        assert!(!set.contains(Capability::ExternalStorage));
    }

    #[test]
    fn legacy_platform_needs_storage_grant() {
        let set = PermissionSet::required(&platform(28));
        assert!(set.contains(Capability::ExternalStorage));
    }

    #[test]
    fn check_granted_requires_full_set() {
        let host = Arc::new(TestHost::granting(&[Capability::Camera]));
        let gate = PermissionGate::new(host, platform(33));
        assert!(!gate.check_granted());

        let host = Arc::new(TestHost::granting(&[
            Capability::Camera,
            Capability::Microphone,
        ]));
        let gate = PermissionGate::new(host, platform(33));
        assert!(gate.check_granted());
    }

    #[test]
    fn missing_after_reports_denied_capabilities() {
        let gate = PermissionGate::new(Arc::new(TestHost::granting(&[])), platform(33));
        let mut results = GrantResults::new();
        results.insert(Capability::Camera, true);
        results.insert(Capability::Microphone, false);

        assert_eq!(gate.missing_after(&results), vec![Capability::Microphone]);
    }

    #[test]
    fn missing_after_falls_back_to_host_state_for_absent_entries() {
        // The mic was granted before the prompt, so the result map only
        // carries the camera. Already-held grants must not count as denied.
        let host = Arc::new(TestHost::granting(&[Capability::Microphone]));
        let gate = PermissionGate::new(host, platform(33));

        let mut results = GrantResults::new();
        results.insert(Capability::Camera, true);
        assert!(gate.missing_after(&results).is_empty());

        // An absent capability the host does not hold is still missing.
        let gate = PermissionGate::new(Arc::new(TestHost::granting(&[])), platform(33));
        let mut results = GrantResults::new();
        results.insert(Capability::Camera, true);
        assert_eq!(gate.missing_after(&results), vec![Capability::Microphone]);
    }

    #[test]
    fn request_grant_reaches_the_host() {
        let host = Arc::new(TestHost::granting(&[]));
        let gate = PermissionGate::new(host.clone(), platform(33));
        gate.request_grant();
        assert_eq!(*host.requests.lock().unwrap(), 1);
    }
}
