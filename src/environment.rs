use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Read-only view of the platform capabilities the profiler inspects.
///
/// Every query is best-effort. Implementations return an error when the
/// underlying platform API is missing or throws; the profiler treats the
/// failure as a negative answer for that query alone.
pub trait EnvironmentProbe {
    fn user_agent(&self) -> Result<String, ProbeError>;

    /// Viewport width in CSS pixels.
    fn viewport_width(&self) -> Result<u32, ProbeError>;

    /// Logical CPU core count.
    fn cpu_cores(&self) -> Result<u32, ProbeError>;

    /// Approximate device memory in gigabytes.
    fn memory_gb(&self) -> Result<f64, ProbeError>;

    /// Whether a WebGL rendering context can be acquired.
    fn supports_webgl(&self) -> Result<bool, ProbeError>;
}

impl<T> EnvironmentProbe for Arc<T>
where
    T: EnvironmentProbe + ?Sized,
{
    fn user_agent(&self) -> Result<String, ProbeError> {
        (**self).user_agent()
    }

    fn viewport_width(&self) -> Result<u32, ProbeError> {
        (**self).viewport_width()
    }

    fn cpu_cores(&self) -> Result<u32, ProbeError> {
        (**self).cpu_cores()
    }

    fn memory_gb(&self) -> Result<f64, ProbeError> {
        (**self).memory_gb()
    }

    fn supports_webgl(&self) -> Result<bool, ProbeError> {
        (**self).supports_webgl()
    }
}

/// Plain captured values of every capability query. `None` means the
/// platform did not expose the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub viewport_width: Option<u32>,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    #[serde(default)]
    pub memory_gb: Option<f64>,
    #[serde(default)]
    pub supports_webgl: Option<bool>,
}

impl EnvironmentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> Self {
        self.cpu_cores = Some(cores);
        self
    }

    pub fn with_memory_gb(mut self, memory: f64) -> Self {
        self.memory_gb = Some(memory);
        self
    }

    pub fn with_webgl(mut self, supported: bool) -> Self {
        self.supports_webgl = Some(supported);
        self
    }
}

/// Probe that always answers from the same snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticEnvironment {
    snapshot: EnvironmentSnapshot,
}

impl StaticEnvironment {
    pub fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.snapshot
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn user_agent(&self) -> Result<String, ProbeError> {
        answer(&self.snapshot.user_agent, "userAgent")
    }

    fn viewport_width(&self) -> Result<u32, ProbeError> {
        answer(&self.snapshot.viewport_width, "innerWidth")
    }

    fn cpu_cores(&self) -> Result<u32, ProbeError> {
        answer(&self.snapshot.cpu_cores, "hardwareConcurrency")
    }

    fn memory_gb(&self) -> Result<f64, ProbeError> {
        answer(&self.snapshot.memory_gb, "deviceMemory")
    }

    fn supports_webgl(&self) -> Result<bool, ProbeError> {
        answer(&self.snapshot.supports_webgl, "WebGLRenderingContext")
    }
}

fn answer<T: Clone>(value: &Option<T>, name: &'static str) -> Result<T, ProbeError> {
    value.clone().ok_or(ProbeError::Unsupported(name))
}

/// Snapshot-backed probe whose values can change between evaluations,
/// e.g. when the host observes a viewport resize.
#[derive(Debug, Default)]
pub struct SharedEnvironment {
    snapshot: RwLock<EnvironmentSnapshot>,
}

impl SharedEnvironment {
    pub fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    pub fn set_viewport_width(&self, width: u32) {
        self.snapshot.write().viewport_width = Some(width);
    }

    pub fn replace(&self, snapshot: EnvironmentSnapshot) {
        *self.snapshot.write() = snapshot;
    }

    pub fn snapshot(&self) -> EnvironmentSnapshot {
        self.snapshot.read().clone()
    }
}

impl EnvironmentProbe for SharedEnvironment {
    fn user_agent(&self) -> Result<String, ProbeError> {
        answer(&self.snapshot.read().user_agent, "userAgent")
    }

    fn viewport_width(&self) -> Result<u32, ProbeError> {
        answer(&self.snapshot.read().viewport_width, "innerWidth")
    }

    fn cpu_cores(&self) -> Result<u32, ProbeError> {
        answer(&self.snapshot.read().cpu_cores, "hardwareConcurrency")
    }

    fn memory_gb(&self) -> Result<f64, ProbeError> {
        answer(&self.snapshot.read().memory_gb, "deviceMemory")
    }

    fn supports_webgl(&self) -> Result<bool, ProbeError> {
        answer(&self.snapshot.read().supports_webgl, "WebGLRenderingContext")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_environment_reports_missing_values() {
        let env = StaticEnvironment::new(EnvironmentSnapshot::new().with_cpu_cores(8));
        assert_eq!(env.cpu_cores(), Ok(8));
        assert_eq!(
            env.memory_gb(),
            Err(ProbeError::Unsupported("deviceMemory"))
        );
    }

    #[test]
    fn shared_environment_tracks_viewport_updates() {
        let env = Arc::new(SharedEnvironment::new(
            EnvironmentSnapshot::new().with_viewport_width(1280),
        ));
        assert_eq!(env.viewport_width(), Ok(1280));
        env.set_viewport_width(600);
        assert_eq!(env.viewport_width(), Ok(600));
        assert_eq!(env.snapshot().viewport_width, Some(600));
    }

    #[test]
    fn shared_environment_replace_swaps_every_field() {
        let env = SharedEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent("Desktop")
                .with_cpu_cores(16),
        );
        env.replace(EnvironmentSnapshot::new().with_viewport_width(390));
        assert_eq!(env.viewport_width(), Ok(390));
        assert_eq!(env.cpu_cores(), Err(ProbeError::Unsupported("hardwareConcurrency")));
        assert!(env.user_agent().is_err());
    }
}
