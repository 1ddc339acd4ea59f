use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables for the simulation world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_gravity")]
    pub gravity: Vec3,
    /// Length of one internal simulation step, in seconds.
    #[serde(default = "default_fixed_time_step")]
    pub fixed_time_step: f32,
    /// Upper bound on internal steps per `update` call. Zero steps the
    /// world once by the raw frame delta instead of using fixed steps.
    #[serde(default = "default_max_substeps")]
    pub max_substeps: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            fixed_time_step: default_fixed_time_step(),
            max_substeps: default_max_substeps(),
        }
    }
}

fn default_gravity() -> Vec3 {
    Vec3::new(0.0, -100.0, 0.0)
}

fn default_fixed_time_step() -> f32 {
    1.0 / 60.0
}

fn default_max_substeps() -> usize {
    10
}
