use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::device::DeviceProfile;

/// Scene parameters that scale with the device, independent of the engine
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneTuning {
    /// Points in the starfield.
    pub particle_count: u32,
    /// Multiplier applied to rotation and float speeds.
    pub motion_scale: f32,
    /// Subdivision level of the icon balls.
    pub geometry_detail: u32,
    pub auto_rotate: bool,
    pub model_scale: f32,
    pub model_offset: Vec3,
}

impl SceneTuning {
    pub fn for_profile(profile: &DeviceProfile) -> Self {
        if profile.is_mobile {
            Self::handheld()
        } else {
            Self::desktop()
        }
    }

    pub fn handheld() -> Self {
        Self {
            particle_count: 2000,
            motion_scale: 0.5,
            geometry_detail: 0,
            auto_rotate: false,
            model_scale: 0.7,
            model_offset: Vec3::new(0.0, -3.0, -2.2),
        }
    }

    pub fn desktop() -> Self {
        Self {
            particle_count: 5000,
            motion_scale: 1.0,
            geometry_detail: 1,
            auto_rotate: true,
            model_scale: 0.75,
            model_offset: Vec3::new(0.0, -3.25, -1.5),
        }
    }
}
