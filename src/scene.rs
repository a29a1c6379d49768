//! Scene configuration for the demo application.
//!
//! A [`SceneConfig`] bundles everything a session needs: simulation
//! parameters, display settings, the initial particle block and the bowl
//! geometry. It loads from JSON; any field left out keeps its default.
//!
//! ```json
//! {
//!     "simulation": { "gravity": 9.81, "collision_damping": 0.8 },
//!     "display": { "gradient_resolution": 128 },
//!     "spawn": { "particles_per_axis": [24, 12, 24], "jitter": 0.01 },
//!     "container_half_extents": [1.0, 0.8, 1.0]
//! }
//! ```

use std::path::Path;

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::container::ContainerFrame;
use crate::error::{FluidError, Result};
use crate::spawn::BoxSpawner;
use crate::tilt::{TiltController, TiltSettings};
use crate::visuals::DisplaySettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub simulation: SimulationConfig,
    pub display: DisplaySettings,
    pub spawn: BoxSpawner,
    pub container_center: Vec3,
    pub container_half_extents: Vec3,
    pub tilt: TiltSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            display: DisplaySettings::default(),
            spawn: BoxSpawner::new(Vec3::new(0.0, -0.3, 0.0), Vec3::new(1.6, 1.0, 1.6))
                .with_particles_per_axis(UVec3::new(20, 12, 20))
                .with_jitter(0.01),
            container_center: Vec3::ZERO,
            container_half_extents: Vec3::ONE,
            tilt: TiltSettings::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut scene: Self = serde_json::from_str(json)
            .map_err(|e| FluidError::config(format!("invalid scene config: {}", e)))?;
        scene.simulation = scene.simulation.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| FluidError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// The bowl at rest.
    pub fn container_frame(&self) -> ContainerFrame {
        ContainerFrame::axis_aligned(self.container_center, self.container_half_extents)
    }

    /// Tilt controller for this bowl.
    pub fn tilt_controller(&self) -> TiltController {
        TiltController::new(self.container_center, self.container_half_extents).with_settings(self.tilt)
    }
}
