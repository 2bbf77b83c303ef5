//! Device capability profiling and adaptive render policy for the
//! portfolio's 3D surfaces.
//!
//! The crate decides, for the device it runs on, whether a surface shows a
//! full 3D scene, a static image or a simplified 2D fragment, and with which
//! engine parameters. Drawing the scene is left to the graphics engine; the
//! decision logic is platform independent so it can be tested natively and
//! embedded in the browser through the `web` module.

pub mod config;
pub mod device;
pub mod environment;
pub mod error;
pub mod isolation;
pub mod loading;
pub mod policy;
pub mod schedule;
pub mod shim;
pub mod surface;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{AdaptiveConfig, TimingConfig};
pub use device::{CapabilityLevel, DeviceProfile, DeviceProfiler, ProfilerConfig};
pub use environment::{EnvironmentProbe, EnvironmentSnapshot, SharedEnvironment, StaticEnvironment};
pub use error::{ConfigError, ProbeError, ShimError};
pub use isolation::{GuardState, NavigationIntent, RenderFault, RenderGuard};
pub use loading::{LoadState, LoadingGate};
pub use policy::{
    EngineConfig, FallbackContent, FrameLoopMode, PolicyTable, PowerPreference, RenderPolicy,
    RenderPolicySelector, RenderVariant, ResolutionRange, ShaderPrecision, TierSettings,
};
pub use schedule::TimerSlot;
pub use shim::{CompatibilityShims, GraphicsNamespace, ShimReport};
pub use surface::{SurfaceController, SurfaceEffect};
pub use tuning::SceneTuning;

use serde::Serialize;

/// One complete decision for the current environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub profile: DeviceProfile,
    pub policy: RenderPolicy,
    pub engine: Option<EngineConfig>,
    pub tuning: SceneTuning,
    /// Sections outside the 3D surfaces should use their static 2D content.
    pub simplified_ui: bool,
}

/// Profiles `probe` and derives the policy, engine bundle and scene tuning.
pub fn evaluate(config: &AdaptiveConfig, probe: &dyn EnvironmentProbe) -> Evaluation {
    let profile = config.profiler().profile(probe);
    let policy = config.selector().select_presentable(&profile);
    let engine = policy.engine_config();
    let tuning = SceneTuning::for_profile(&profile);
    let simplified_ui = profile.prefers_simplified_ui();
    Evaluation {
        profile,
        policy,
        engine,
        tuning,
        simplified_ui,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::tests::{DESKTOP_UA, IPHONE_UA};

    #[test]
    fn evaluation_flags_simplified_ui_for_handhelds() {
        let phone = StaticEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(IPHONE_UA)
                .with_viewport_width(390)
                .with_cpu_cores(6)
                .with_memory_gb(6.0)
                .with_webgl(true),
        );
        let evaluation = evaluate(&AdaptiveConfig::default(), &phone);
        assert_eq!(evaluation.profile.capability_level, CapabilityLevel::Medium);
        assert_eq!(evaluation.policy.variant, RenderVariant::Full3d);
        assert!(evaluation.simplified_ui);

        let desktop = StaticEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(DESKTOP_UA)
                .with_viewport_width(1920)
                .with_webgl(true),
        );
        assert!(!evaluate(&AdaptiveConfig::default(), &desktop).simplified_ui);
    }
}
