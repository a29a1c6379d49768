//! Tilting bowl controller.
//!
//! Integrates a two-axis tilt input into an orientation and exposes it as a
//! [`ContainerFrameProvider`]. The controller knows nothing about keys or
//! gamepads; the caller maps its input device onto [`TiltInput`].

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::container::{ContainerFrame, ContainerFrameProvider};

/// Tilt request for one frame, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltInput {
    /// Tilt about the X axis (positive tips the far edge down).
    pub forward: f32,
    /// Tilt about the Z axis (positive tips the left edge down).
    pub side: f32,
}

impl TiltInput {
    pub fn new(forward: f32, side: f32) -> Self {
        Self {
            forward: forward.clamp(-1.0, 1.0),
            side: side.clamp(-1.0, 1.0),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.side == 0.0
    }
}

/// Tilt limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltSettings {
    /// Maximum tilt per axis in degrees.
    pub max_tilt_degrees: f32,
    /// Tilt rate in degrees per second at full input.
    pub tilt_speed_degrees: f32,
}

impl Default for TiltSettings {
    fn default() -> Self {
        Self {
            max_tilt_degrees: 25.0,
            tilt_speed_degrees: 70.0,
        }
    }
}

/// Container frame provider driven by tilt input.
#[derive(Debug, Clone)]
pub struct TiltController {
    center: Vec3,
    half_extents: Vec3,
    settings: TiltSettings,
    /// Current tilt in degrees: x about X, y about Z.
    tilt: Vec2,
    input: TiltInput,
}

impl TiltController {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            settings: TiltSettings::default(),
            tilt: Vec2::ZERO,
            input: TiltInput::default(),
        }
    }

    pub fn with_settings(mut self, settings: TiltSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Input to apply on the next `advance`.
    pub fn set_input(&mut self, input: TiltInput) {
        self.input = input;
    }

    /// Current tilt in degrees as `(about X, about Z)`.
    pub fn tilt_degrees(&self) -> Vec2 {
        self.tilt
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.tilt.x.to_radians(),
            0.0,
            self.tilt.y.to_radians(),
        )
    }
}

impl ContainerFrameProvider for TiltController {
    fn frame(&self) -> ContainerFrame {
        ContainerFrame::axis_aligned(self.center, self.half_extents).with_orientation(self.orientation())
    }

    fn advance(&mut self, dt: f32) {
        if self.input.is_idle() {
            return;
        }
        let max = self.settings.max_tilt_degrees;
        let delta = self.settings.tilt_speed_degrees * dt;
        self.tilt.x = (self.tilt.x + self.input.forward * delta).clamp(-max, max);
        self.tilt.y = (self.tilt.y + self.input.side * delta).clamp(-max, max);
    }

    fn reset(&mut self) {
        self.tilt = Vec2::ZERO;
        self.input = TiltInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_level() {
        let c = TiltController::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(c.frame().orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_tilt_rate_and_clamp() {
        let mut c = TiltController::new(Vec3::ZERO, Vec3::ONE);
        c.set_input(TiltInput::new(1.0, -1.0));
        c.advance(0.1);
        assert!((c.tilt_degrees().x - 7.0).abs() < 1e-4);
        assert!((c.tilt_degrees().y + 7.0).abs() < 1e-4);

        c.advance(10.0);
        assert_eq!(c.tilt_degrees(), Vec2::new(25.0, -25.0));
    }

    #[test]
    fn test_reset_levels_bowl() {
        let mut c = TiltController::new(Vec3::ZERO, Vec3::ONE);
        c.set_input(TiltInput::new(1.0, 0.0));
        c.advance(0.2);
        c.reset();
        assert_eq!(c.tilt_degrees(), Vec2::ZERO);
        c.advance(0.2);
        assert_eq!(c.tilt_degrees(), Vec2::ZERO);
    }

    #[test]
    fn test_input_is_clamped() {
        let input = TiltInput::new(3.0, -2.0);
        assert_eq!(input.forward, 1.0);
        assert_eq!(input.side, -1.0);
    }
}
