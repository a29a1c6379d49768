//! Designer-facing simulation parameters.
//!
//! ```ignore
//! let config = SimulationConfig::default()
//!     .with_gravity(9.81)
//!     .with_collision_damping(0.9)
//!     .with_iterations_per_frame(2);
//! ```
//!
//! Values are plain scalars. The only cross-checks are the ones in
//! [`SimulationConfig::validate`]: collision damping is clamped into `[0, 1]`,
//! the iteration count must be non-zero and every scalar must be finite.

use serde::{Deserialize, Serialize};

use crate::error::{FluidError, Result};

/// Scalar parameters for the particle integrator.
///
/// Changing a value while the simulation runs takes effect on the next tick.
///
/// `smoothing_radius`, `pressure_multiplier` and `near_pressure_multiplier`
/// are carried for a pressure solver and are not read by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Gravity magnitude, applied along world -Y.
    pub gravity: f32,
    /// Per-second velocity damping coefficient.
    ///
    /// Applied as `v *= 1 - viscosity * dt`. This is only stable while
    /// `viscosity * dt < 2`; larger products flip or amplify velocity.
    pub viscosity: f32,
    /// Seed value written into every particle's density slot.
    pub target_density: f32,
    /// Kernel radius reserved for neighbor-based pressure.
    pub smoothing_radius: f32,
    /// Pressure stiffness reserved for neighbor-based pressure.
    pub pressure_multiplier: f32,
    /// Near-pressure stiffness reserved for neighbor-based pressure.
    pub near_pressure_multiplier: f32,
    /// Fraction of axis speed kept after hitting a wall, in `[0, 1]`.
    pub collision_damping: f32,
    /// Integration passes per external frame.
    pub iterations_per_frame: u32,
    /// Multiplier applied to the frame delta before it is split into passes.
    pub time_scale: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            viscosity: 0.2,
            target_density: 1000.0,
            smoothing_radius: 0.15,
            pressure_multiplier: 100.0,
            near_pressure_multiplier: 5.0,
            collision_damping: 0.9,
            iterations_per_frame: 2,
            time_scale: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_viscosity(mut self, viscosity: f32) -> Self {
        self.viscosity = viscosity;
        self
    }

    pub fn with_target_density(mut self, density: f32) -> Self {
        self.target_density = density;
        self
    }

    pub fn with_smoothing_radius(mut self, radius: f32) -> Self {
        self.smoothing_radius = radius;
        self
    }

    /// Set both pressure stiffness values.
    pub fn with_pressure(mut self, pressure: f32, near_pressure: f32) -> Self {
        self.pressure_multiplier = pressure;
        self.near_pressure_multiplier = near_pressure;
        self
    }

    pub fn with_collision_damping(mut self, damping: f32) -> Self {
        self.collision_damping = damping;
        self
    }

    pub fn with_iterations_per_frame(mut self, iterations: u32) -> Self {
        self.iterations_per_frame = iterations;
        self
    }

    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Check the configuration and return a normalized copy.
    ///
    /// Collision damping is clamped into `[0, 1]`. Non-finite scalars and a
    /// zero iteration count are rejected.
    pub fn validate(mut self) -> Result<Self> {
        let scalars = [
            ("gravity", self.gravity),
            ("viscosity", self.viscosity),
            ("target_density", self.target_density),
            ("smoothing_radius", self.smoothing_radius),
            ("pressure_multiplier", self.pressure_multiplier),
            ("near_pressure_multiplier", self.near_pressure_multiplier),
            ("collision_damping", self.collision_damping),
            ("time_scale", self.time_scale),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FluidError::config(format!("{} must be finite, got {}", name, value)));
        }
        if self.iterations_per_frame == 0 {
            return Err(FluidError::config("iterations_per_frame must be at least 1"));
        }
        self.collision_damping = self.collision_damping.clamp(0.0, 1.0);
        Ok(self)
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FluidError::config(format!("invalid simulation config: {}", e)))?;
        config.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FluidError::config(format!("failed to serialize config: {}", e)))
    }
}
