use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::{DeviceProfiler, ProfilerConfig};
use crate::error::ConfigError;
use crate::policy::{FallbackContent, PolicyTable, RenderPolicySelector};

/// Timer bounds for a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Longest time a loading placeholder stays up.
    pub loading_timeout_ms: u64,
    /// Delay between a render fault and the redirect to root. `null`
    /// disables the redirect.
    pub redirect_delay_ms: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loading_timeout_ms: 5_000,
            redirect_delay_ms: Some(3_000),
        }
    }
}

impl TimingConfig {
    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }

    pub fn redirect_delay(&self) -> Option<Duration> {
        self.redirect_delay_ms.map(Duration::from_millis)
    }
}

/// Everything a host needs to profile devices and drive its surfaces.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub profiler: ProfilerConfig,
    pub policy: PolicyTable,
    pub timing: TimingConfig,
    pub fallback: FallbackContent,
}

impl AdaptiveConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiler.mobile_breakpoint == 0 {
            return Err(ConfigError::Invalid(
                "profiler.mobile_breakpoint must be positive".into(),
            ));
        }
        if !self.profiler.min_memory_gb.is_finite() || self.profiler.min_memory_gb < 0.0 {
            return Err(ConfigError::Invalid(
                "profiler.min_memory_gb must be a non-negative number".into(),
            ));
        }
        for (level, settings) in self.policy.tiers() {
            if !settings.resolution.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "policy.{}.resolution must satisfy 0 < min <= max (got {} .. {})",
                    level.as_str(),
                    settings.resolution.min,
                    settings.resolution.max
                )));
            }
        }
        if self.timing.loading_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.loading_timeout_ms must be positive".into(),
            ));
        }
        if self.timing.redirect_delay_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timing.redirect_delay_ms must be positive or null".into(),
            ));
        }
        Ok(())
    }

    pub fn profiler(&self) -> DeviceProfiler {
        DeviceProfiler::new(self.profiler.clone())
    }

    pub fn selector(&self) -> RenderPolicySelector {
        RenderPolicySelector::with_table(self.policy.clone()).with_fallback(self.fallback)
    }
}
