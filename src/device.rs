use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentProbe;
use crate::error::ProbeError;

/// User-agent fragments that identify a handheld device (matched case-insensitively).
const MOBILE_SIGNATURES: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "windows phone",
    "opera mini",
];

const ANDROID_SIGNATURE: &str = "android";

/// Coarse ability of a device to sustain real-time 3D rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    Low,
    Medium,
    High,
}

impl CapabilityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Classification of the current environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_android: bool,
    pub cpu_cores: u32,
    pub memory_gb: f64,
    pub supports_webgl: bool,
    pub viewport_width: u32,
    pub capability_level: CapabilityLevel,
}

impl DeviceProfile {
    /// Whole sections (icon grids, decorative scenes) switch to static 2D
    /// content on any handheld and on low-end hardware.
    pub fn prefers_simplified_ui(&self) -> bool {
        self.is_mobile || self.capability_level == CapabilityLevel::Low
    }
}

/// Thresholds used by [`DeviceProfiler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Viewports at most this wide (CSS px) count as mobile.
    pub mobile_breakpoint: u32,
    pub min_cpu_cores: u32,
    pub min_memory_gb: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768,
            min_cpu_cores: 4,
            min_memory_gb: 4.0,
        }
    }
}

/// Classifies an environment into a [`DeviceProfile`].
#[derive(Debug, Clone, Default)]
pub struct DeviceProfiler {
    config: ProfilerConfig,
}

impl DeviceProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Queries every probe once and classifies the result. Never fails: a
    /// probe error only affects its own field.
    pub fn profile(&self, probe: &dyn EnvironmentProbe) -> DeviceProfile {
        let user_agent = probe
            .user_agent()
            .map(|ua| ua.to_ascii_lowercase())
            .unwrap_or_else(|err| {
                report_probe_error(&err, "assuming an unrecognized user agent");
                String::new()
            });
        let viewport_width = probe.viewport_width().unwrap_or_else(|err| {
            report_probe_error(&err, "ignoring viewport width");
            0
        });
        let cpu_cores = probe.cpu_cores().unwrap_or_else(|err| {
            report_probe_error(&err, "treating CPU core count as unknown");
            0
        });
        let memory_gb = match probe.memory_gb() {
            Ok(memory) if memory.is_finite() && memory > 0.0 => memory,
            Ok(_) => 0.0,
            Err(err) => {
                report_probe_error(&err, "treating device memory as unknown");
                0.0
            }
        };
        let supports_webgl = probe.supports_webgl().unwrap_or_else(|err| {
            report_probe_error(&err, "treating WebGL as unavailable");
            false
        });

        let is_android = user_agent.contains(ANDROID_SIGNATURE);
        let small_viewport = viewport_width > 0 && viewport_width <= self.config.mobile_breakpoint;
        let is_mobile = small_viewport
            || MOBILE_SIGNATURES
                .iter()
                .any(|signature| user_agent.contains(signature));

        let capability_level = self.classify(is_android, is_mobile, cpu_cores, memory_gb);
        debug!(
            "device profile: mobile={is_mobile} android={is_android} cores={cpu_cores} memory={memory_gb}GB webgl={supports_webgl} -> {}",
            capability_level.as_str()
        );

        DeviceProfile {
            is_mobile,
            is_android,
            cpu_cores,
            memory_gb,
            supports_webgl,
            viewport_width,
            capability_level,
        }
    }

    /// Capability level for the given signals. Unknown metrics are passed as zero.
    pub fn classify(
        &self,
        is_android: bool,
        is_mobile: bool,
        cpu_cores: u32,
        memory_gb: f64,
    ) -> CapabilityLevel {
        // Android is treated as uniformly too weak for the 3D scenes.
        if is_android {
            return CapabilityLevel::Low;
        }
        if !is_mobile {
            return CapabilityLevel::High;
        }
        if cpu_cores < self.config.min_cpu_cores || memory_gb < self.config.min_memory_gb {
            CapabilityLevel::Low
        } else {
            CapabilityLevel::Medium
        }
    }
}

// Missing APIs are routine (e.g. deviceMemory outside Chromium); only real failures warn.
fn report_probe_error(err: &ProbeError, fallback: &str) {
    match err {
        ProbeError::Unsupported(_) => debug!("{err}; {fallback}"),
        ProbeError::Failed { .. } => warn!("{err}; {fallback}"),
    }
}
