use log::debug;
use serde::{Deserialize, Serialize};

use crate::device::{CapabilityLevel, DeviceProfile};

/// Presentation mode of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderVariant {
    #[serde(rename = "full-3d")]
    Full3d,
    StaticImage,
    #[serde(rename = "simplified-2d")]
    Simplified2d,
}

impl RenderVariant {
    pub fn is_3d(self) -> bool {
        self == Self::Full3d
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full3d => "full-3d",
            Self::StaticImage => "static-image",
            Self::Simplified2d => "simplified-2d",
        }
    }
}

/// Fallback content a surface can show in place of its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackContent {
    #[default]
    StaticImage,
    Simplified,
}

impl FallbackContent {
    pub fn variant(self) -> RenderVariant {
        match self {
            Self::StaticImage => RenderVariant::StaticImage,
            Self::Simplified => RenderVariant::Simplified2d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameLoopMode {
    #[serde(rename = "always")]
    Continuous,
    #[serde(rename = "demand")]
    OnDemand,
}

impl FrameLoopMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "always",
            Self::OnDemand => "demand",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    LowPower,
    Default,
    HighPerformance,
}

impl PowerPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowPower => "low-power",
            Self::Default => "default",
            Self::HighPerformance => "high-performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderPrecision {
    #[serde(rename = "lowp")]
    Low,
    #[serde(rename = "mediump")]
    Medium,
    #[serde(rename = "highp")]
    High,
}

impl ShaderPrecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "lowp",
            Self::Medium => "mediump",
            Self::High => "highp",
        }
    }
}

/// Device-pixel-ratio clamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRange {
    pub min: f32,
    pub max: f32,
}

impl ResolutionRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamps a reported device pixel ratio into the range.
    pub fn clamp(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.clamp(self.min, self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

/// Engine parameters for one capability level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    pub resolution: ResolutionRange,
    pub antialiasing: bool,
    pub frame_loop: FrameLoopMode,
    pub power_preference: PowerPreference,
    pub precision: ShaderPrecision,
    pub alpha: bool,
    pub stencil: bool,
}

/// Per-level settings used by [`RenderPolicySelector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub low: TierSettings,
    pub medium: TierSettings,
    pub high: TierSettings,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            low: TierSettings {
                resolution: ResolutionRange::new(0.5, 1.0),
                antialiasing: false,
                frame_loop: FrameLoopMode::OnDemand,
                power_preference: PowerPreference::LowPower,
                precision: ShaderPrecision::Low,
                alpha: false,
                stencil: false,
            },
            medium: TierSettings {
                resolution: ResolutionRange::new(0.8, 1.5),
                antialiasing: false,
                frame_loop: FrameLoopMode::OnDemand,
                power_preference: PowerPreference::Default,
                precision: ShaderPrecision::Medium,
                alpha: false,
                stencil: false,
            },
            high: TierSettings {
                resolution: ResolutionRange::new(1.0, 2.0),
                antialiasing: true,
                frame_loop: FrameLoopMode::Continuous,
                power_preference: PowerPreference::HighPerformance,
                precision: ShaderPrecision::High,
                alpha: true,
                stencil: true,
            },
        }
    }
}

impl PolicyTable {
    pub fn settings(&self, level: CapabilityLevel) -> &TierSettings {
        match level {
            CapabilityLevel::Low => &self.low,
            CapabilityLevel::Medium => &self.medium,
            CapabilityLevel::High => &self.high,
        }
    }

    pub(crate) fn tiers(&self) -> [(CapabilityLevel, &TierSettings); 3] {
        [
            (CapabilityLevel::Low, &self.low),
            (CapabilityLevel::Medium, &self.medium),
            (CapabilityLevel::High, &self.high),
        ]
    }
}

/// Rendering configuration chosen for a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPolicy {
    pub variant: RenderVariant,
    pub resolution: ResolutionRange,
    pub antialiasing: bool,
    pub frame_loop: FrameLoopMode,
    pub power_preference: PowerPreference,
    pub precision: ShaderPrecision,
    pub alpha: bool,
    pub stencil: bool,
}

impl RenderPolicy {
    /// Configuration bundle for the graphics engine, or `None` when the
    /// policy does not render a scene.
    pub fn engine_config(&self) -> Option<EngineConfig> {
        if !self.variant.is_3d() {
            return None;
        }
        Some(EngineConfig {
            dpr: [self.resolution.min, self.resolution.max],
            antialias: self.antialiasing,
            alpha: self.alpha,
            stencil: self.stencil,
            precision: self.precision,
            frameloop: self.frame_loop,
            power_preference: self.power_preference,
            preserve_drawing_buffer: true,
        })
    }
}

/// Canvas attributes in the shape the graphics engine expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub dpr: [f32; 2],
    pub antialias: bool,
    pub alpha: bool,
    pub stencil: bool,
    pub precision: ShaderPrecision,
    pub frameloop: FrameLoopMode,
    pub power_preference: PowerPreference,
    pub preserve_drawing_buffer: bool,
}

/// Maps a [`DeviceProfile`] to a [`RenderPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RenderPolicySelector {
    table: PolicyTable,
    fallback: FallbackContent,
}

impl RenderPolicySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: PolicyTable) -> Self {
        Self {
            table,
            fallback: FallbackContent::default(),
        }
    }

    /// Sets the content shown by low-end devices.
    pub fn with_fallback(mut self, fallback: FallbackContent) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> FallbackContent {
        self.fallback
    }

    pub fn select(&self, profile: &DeviceProfile) -> RenderPolicy {
        let level = profile.capability_level;
        let settings = self.table.settings(level);
        let variant = match level {
            CapabilityLevel::Low => self.fallback.variant(),
            CapabilityLevel::Medium | CapabilityLevel::High => RenderVariant::Full3d,
        };
        RenderPolicy {
            variant,
            resolution: settings.resolution,
            antialiasing: settings.antialiasing,
            frame_loop: settings.frame_loop,
            power_preference: settings.power_preference,
            precision: settings.precision,
            alpha: settings.alpha,
            stencil: settings.stencil,
        }
    }

    /// Like [`select`](Self::select), but swaps a 3D variant for the
    /// fallback when the device cannot create a WebGL context.
    pub fn select_presentable(&self, profile: &DeviceProfile) -> RenderPolicy {
        let mut policy = self.select(profile);
        if policy.variant.is_3d() && !profile.supports_webgl {
            debug!("WebGL unavailable; using {:?} instead of a scene", self.fallback);
            policy.variant = self.fallback.variant();
        }
        policy
    }
}
