use std::time::Duration;

use log::debug;
use serde::Serialize;

use crate::config::AdaptiveConfig;
use crate::device::{DeviceProfile, DeviceProfiler};
use crate::environment::EnvironmentProbe;
use crate::isolation::{GuardState, NavigationIntent, RenderFault, RenderGuard};
use crate::loading::LoadingGate;
use crate::policy::{EngineConfig, RenderPolicy, RenderPolicySelector, RenderVariant};
use crate::tuning::SceneTuning;

/// Instruction for the host that renders a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceEffect {
    /// Create (or reconfigure) the 3D canvas.
    Configure {
        engine: EngineConfig,
        tuning: SceneTuning,
    },
    ShowPlaceholder,
    HidePlaceholder,
    /// Loading took too long; drop the placeholder and stop waiting.
    AbandonLoading,
    /// Tear down any canvas and show static content instead.
    ShowFallback { variant: RenderVariant },
    Navigate { intent: NavigationIntent },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unmounted,
    Mounted,
    TornDown,
}

/// Drives one 3D-capable surface through mount, resize, load, fault and
/// teardown. All timers are deadlines checked by [`SurfaceController::tick`].
#[derive(Debug)]
pub struct SurfaceController {
    profiler: DeviceProfiler,
    selector: RenderPolicySelector,
    loading_timeout: Duration,
    lifecycle: Lifecycle,
    profile: Option<DeviceProfile>,
    policy: Option<RenderPolicy>,
    presented: Option<RenderVariant>,
    loading: LoadingGate,
    guard: RenderGuard,
}

impl SurfaceController {
    pub fn new(config: &AdaptiveConfig) -> Self {
        Self::with_parts(
            config.profiler(),
            config.selector(),
            config.timing.loading_timeout(),
            config.timing.redirect_delay(),
        )
    }

    pub fn with_parts(
        profiler: DeviceProfiler,
        selector: RenderPolicySelector,
        loading_timeout: Duration,
        redirect_delay: Option<Duration>,
    ) -> Self {
        Self {
            profiler,
            selector,
            loading_timeout,
            lifecycle: Lifecycle::Unmounted,
            profile: None,
            policy: None,
            presented: None,
            loading: LoadingGate::new(),
            guard: RenderGuard::new(redirect_delay),
        }
    }

    pub fn profile(&self) -> Option<&DeviceProfile> {
        self.profile.as_ref()
    }

    pub fn policy(&self) -> Option<&RenderPolicy> {
        self.policy.as_ref()
    }

    /// Variant currently on screen.
    pub fn presented(&self) -> Option<RenderVariant> {
        self.presented
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_pending()
    }

    /// Earliest pending deadline, for hosts that arm a single timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.lifecycle != Lifecycle::Mounted {
            return None;
        }
        match (self.loading.deadline(), self.guard.redirect_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn mount(&mut self, probe: &dyn EnvironmentProbe, now: Duration) -> Vec<SurfaceEffect> {
        if self.lifecycle != Lifecycle::Unmounted {
            debug!("surface already mounted; ignoring mount");
            return Vec::new();
        }
        self.lifecycle = Lifecycle::Mounted;
        self.evaluate(probe, now)
    }

    /// Re-profiles after a viewport change. Emits effects only when the
    /// presentation changes.
    pub fn resize(&mut self, probe: &dyn EnvironmentProbe, now: Duration) -> Vec<SurfaceEffect> {
        if self.lifecycle != Lifecycle::Mounted || self.guard.has_failed() {
            return Vec::new();
        }
        self.evaluate(probe, now)
    }

    pub fn loaded(&mut self, _now: Duration) -> Vec<SurfaceEffect> {
        if self.lifecycle != Lifecycle::Mounted || self.guard.has_failed() {
            return Vec::new();
        }
        if self.loading.loaded() {
            vec![SurfaceEffect::HidePlaceholder]
        } else {
            Vec::new()
        }
    }

    pub fn fault(&mut self, fault: RenderFault, now: Duration) -> Vec<SurfaceEffect> {
        if self.lifecycle != Lifecycle::Mounted {
            return Vec::new();
        }
        if !self.guard.report(fault, now) {
            return Vec::new();
        }
        self.loading.cancel();
        let variant = self.selector.fallback().variant();
        self.presented = Some(variant);
        vec![SurfaceEffect::ShowFallback { variant }]
    }

    /// Fires every deadline that has passed.
    pub fn tick(&mut self, now: Duration) -> Vec<SurfaceEffect> {
        if self.lifecycle != Lifecycle::Mounted {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if self.loading.poll(now) {
            effects.push(SurfaceEffect::AbandonLoading);
        }
        if let Some(intent) = self.guard.poll(now) {
            effects.push(SurfaceEffect::Navigate { intent });
        }
        effects
    }

    /// Cancels every timer. The controller is inert afterwards.
    pub fn unmount(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.loading.cancel();
        self.guard.cancel();
        self.lifecycle = Lifecycle::TornDown;
        debug!("surface torn down");
    }

    fn evaluate(&mut self, probe: &dyn EnvironmentProbe, now: Duration) -> Vec<SurfaceEffect> {
        let profile = self.profiler.profile(probe);
        let policy = self.selector.select_presentable(&profile);
        let variant = policy.variant;
        let tuning = SceneTuning::for_profile(&profile);

        let previous_policy = self.policy.replace(policy);
        let previous_tuning = self
            .profile
            .replace(profile)
            .map(|previous| SceneTuning::for_profile(&previous));
        let previous_variant = self.presented.replace(variant);

        let mut effects = Vec::new();
        match policy.engine_config() {
            Some(engine) => {
                let unchanged = previous_variant == Some(variant)
                    && previous_policy == Some(policy)
                    && previous_tuning == Some(tuning);
                if unchanged {
                    return effects;
                }
                effects.push(SurfaceEffect::Configure { engine, tuning });
                if previous_variant != Some(variant) {
                    self.loading = LoadingGate::start(now, self.loading_timeout);
                    effects.push(SurfaceEffect::ShowPlaceholder);
                }
            }
            None => {
                if previous_variant != Some(variant) {
                    self.loading.cancel();
                    effects.push(SurfaceEffect::ShowFallback { variant });
                }
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::device::tests::{ANDROID_UA, DESKTOP_UA};
    use crate::device::CapabilityLevel;
    use crate::environment::{EnvironmentSnapshot, SharedEnvironment, StaticEnvironment};

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    fn desktop() -> StaticEnvironment {
        StaticEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(DESKTOP_UA)
                .with_viewport_width(1920)
                .with_cpu_cores(16)
                .with_memory_gb(32.0)
                .with_webgl(true),
        )
    }

    fn controller() -> SurfaceController {
        SurfaceController::new(&AdaptiveConfig::default())
    }

    #[test]
    fn desktop_mount_configures_scene_and_placeholder() {
        let mut surface = controller();
        let effects = surface.mount(&desktop(), Duration::ZERO);
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], SurfaceEffect::Configure { .. }));
        assert_eq!(effects[1], SurfaceEffect::ShowPlaceholder);
        assert_eq!(surface.presented(), Some(RenderVariant::Full3d));
        assert!(surface.is_loading());
        assert_eq!(surface.next_deadline(), Some(secs(5)));

        assert_eq!(surface.loaded(secs(1)), vec![SurfaceEffect::HidePlaceholder]);
        assert!(surface.tick(secs(10)).is_empty());
        assert_eq!(
            surface.profile().map(|profile| profile.capability_level),
            Some(CapabilityLevel::High)
        );
    }

    #[test]
    fn android_mount_shows_fallback() {
        let env = StaticEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(ANDROID_UA)
                .with_cpu_cores(8)
                .with_memory_gb(8.0)
                .with_webgl(true),
        );
        let mut surface = controller();
        let effects = surface.mount(&env, Duration::ZERO);
        assert_eq!(
            effects,
            vec![SurfaceEffect::ShowFallback {
                variant: RenderVariant::StaticImage
            }]
        );
        assert!(!surface.is_loading());
    }

    #[test]
    fn missing_webgl_falls_back_even_on_desktop() {
        let env = StaticEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(DESKTOP_UA)
                .with_viewport_width(1920),
        );
        let mut surface = controller();
        let effects = surface.mount(&env, Duration::ZERO);
        assert_eq!(
            effects,
            vec![SurfaceEffect::ShowFallback {
                variant: RenderVariant::StaticImage
            }]
        );
    }

    #[test]
    fn loading_is_abandoned_after_wait_bound() {
        let mut surface = controller();
        surface.mount(&desktop(), Duration::ZERO);
        assert!(surface.tick(secs(4)).is_empty());
        assert_eq!(surface.tick(secs(5)), vec![SurfaceEffect::AbandonLoading]);
        assert!(surface.tick(secs(6)).is_empty());
        assert!(surface.loaded(secs(7)).is_empty());
    }

    #[test]
    fn fault_shows_fallback_then_redirects_once() {
        let mut surface = controller();
        surface.mount(&desktop(), Duration::ZERO);
        surface.loaded(secs(1));

        let effects = surface.fault(RenderFault::ContextLost, secs(2));
        assert_eq!(
            effects,
            vec![SurfaceEffect::ShowFallback {
                variant: RenderVariant::StaticImage
            }]
        );
        assert_eq!(surface.guard_state(), GuardState::Error);
        assert!(surface.fault(RenderFault::ContextLost, secs(3)).is_empty());
        assert!(surface
            .fault(RenderFault::Engine("draw failed".into()), secs(4))
            .is_empty());

        assert!(surface.tick(secs(4)).is_empty());
        assert_eq!(
            surface.tick(secs(5)),
            vec![SurfaceEffect::Navigate {
                intent: NavigationIntent::Root
            }]
        );
        assert!(surface.tick(secs(6)).is_empty());
        assert!(surface.tick(secs(60)).is_empty());
        assert_eq!(surface.guard_state(), GuardState::RedirectIssued);
    }

    #[test]
    fn fault_during_loading_cancels_the_loading_timeout() {
        let mut surface = controller();
        surface.mount(&desktop(), Duration::ZERO);
        surface.fault(
            RenderFault::ResourceFetch {
                url: "./desktop_pc/scene.gltf".into(),
            },
            secs(1),
        );
        assert!(!surface.is_loading());
        assert_eq!(surface.next_deadline(), Some(secs(4)));
        let effects = surface.tick(secs(10));
        assert_eq!(
            effects,
            vec![SurfaceEffect::Navigate {
                intent: NavigationIntent::Root
            }]
        );
    }

    #[test]
    fn unmount_while_loading_silences_timers() {
        let mut surface = controller();
        surface.mount(&desktop(), Duration::ZERO);
        surface.unmount();
        assert_eq!(surface.next_deadline(), None);
        assert!(surface.tick(secs(60)).is_empty());
        assert!(surface.loaded(secs(61)).is_empty());
        assert!(surface.fault(RenderFault::ContextLost, secs(62)).is_empty());
        assert!(surface.mount(&desktop(), secs(63)).is_empty());
    }

    #[test]
    fn unmount_after_fault_cancels_redirect() {
        let mut surface = controller();
        surface.mount(&desktop(), Duration::ZERO);
        surface.fault(RenderFault::ContextLost, secs(1));
        surface.unmount();
        assert!(surface.tick(secs(60)).is_empty());
    }

    #[test]
    fn resize_switches_presentation_only_when_it_changes() {
        let env = Arc::new(SharedEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(DESKTOP_UA)
                .with_viewport_width(1920)
                .with_webgl(true),
        ));
        let mut surface = controller();
        surface.mount(&env, Duration::ZERO);
        surface.loaded(secs(1));

        env.set_viewport_width(1600);
        assert!(surface.resize(&env, secs(2)).is_empty());

        // A narrow desktop window is "mobile" with unknown metrics, hence low.
        env.set_viewport_width(500);
        let effects = surface.resize(&env, secs(3));
        assert_eq!(
            effects,
            vec![SurfaceEffect::ShowFallback {
                variant: RenderVariant::StaticImage
            }]
        );
        assert_eq!(
            surface.profile().map(|profile| profile.capability_level),
            Some(CapabilityLevel::Low)
        );
        assert_eq!(
            surface.policy().map(|policy| policy.variant),
            Some(RenderVariant::StaticImage)
        );

        env.set_viewport_width(1920);
        let effects = surface.resize(&env, secs(4));
        assert!(matches!(effects[0], SurfaceEffect::Configure { .. }));
        assert_eq!(effects[1], SurfaceEffect::ShowPlaceholder);
        assert_eq!(surface.next_deadline(), Some(secs(9)));
    }

    #[test]
    fn resize_is_ignored_after_a_fault() {
        let env = Arc::new(SharedEnvironment::new(
            EnvironmentSnapshot::new()
                .with_user_agent(DESKTOP_UA)
                .with_viewport_width(1920)
                .with_webgl(true),
        ));
        let mut surface = controller();
        surface.mount(&env, Duration::ZERO);
        surface.fault(RenderFault::ContextLost, secs(1));
        env.set_viewport_width(400);
        assert!(surface.resize(&env, secs(2)).is_empty());
        assert_eq!(surface.presented(), Some(RenderVariant::StaticImage));
    }

    #[test]
    fn effects_serialize_for_the_host() {
        let json = serde_json::to_value(SurfaceEffect::Navigate {
            intent: NavigationIntent::Root,
        })
        .unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["intent"], "Root");
    }
}
