//! The box that holds the fluid.
//!
//! A [`ContainerFrame`] is a snapshot of the container for one tick: a world
//! center, an orientation and half-extents describing an axis-aligned box in
//! the container's local frame. Something outside the simulation (a tilt
//! controller, a scripted animation, a test) implements
//! [`ContainerFrameProvider`] and hands the engine a fresh frame every tick.

use glam::{Quat, Vec3};

/// Container pose and bounds for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerFrame {
    /// World-space center of the box.
    pub center: Vec3,
    /// Half the box size along each local axis.
    pub half_extents: Vec3,
    /// Rotation from container-local to world space.
    pub orientation: Quat,
}

impl Default for ContainerFrame {
    fn default() -> Self {
        Self::axis_aligned(Vec3::ZERO, Vec3::ONE)
    }
}

impl ContainerFrame {
    /// An untilted box.
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// World-space point to container-local coordinates (origin at center).
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.center)
    }

    /// Whether `point` lies inside the box, faces included, within `tolerance`.
    pub fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        let local = if self.orientation == Quat::IDENTITY {
            point - self.center
        } else {
            self.to_local(point)
        };
        local.abs().cmple(self.half_extents + Vec3::splat(tolerance)).all()
    }

    /// Clamp a particle into the box and reflect the velocity on each axis it crossed.
    ///
    /// Every axis is tested on its own, so a corner hit reflects two or three
    /// components in the same call. A reflected component becomes
    /// `-damping * v`.
    ///
    /// With an identity orientation the test runs directly on world
    /// coordinates; otherwise position and velocity are rotated into the
    /// container frame, resolved there, and rotated back.
    pub fn resolve_collision(&self, position: &mut Vec3, velocity: &mut Vec3, damping: f32) {
        if self.orientation == Quat::IDENTITY {
            reflect_axes(position, velocity, self.center, self.half_extents, damping);
            return;
        }

        let inverse = self.orientation.inverse();
        let mut local_pos = inverse * (*position - self.center);
        let mut local_vel = inverse * *velocity;
        if reflect_axes(&mut local_pos, &mut local_vel, Vec3::ZERO, self.half_extents, damping) {
            *position = self.center + self.orientation * local_pos;
            *velocity = self.orientation * local_vel;
        }
    }
}

/// Returns `true` when any axis was clamped.
fn reflect_axes(
    position: &mut Vec3,
    velocity: &mut Vec3,
    center: Vec3,
    half_extents: Vec3,
    damping: f32,
) -> bool {
    let min = center - half_extents;
    let max = center + half_extents;
    let mut hit = false;

    for axis in 0..3 {
        if position[axis] < min[axis] {
            position[axis] = min[axis];
            velocity[axis] *= -damping;
            hit = true;
        }
        if position[axis] > max[axis] {
            position[axis] = max[axis];
            velocity[axis] *= -damping;
            hit = true;
        }
    }
    hit
}

/// Supplies the container frame for each tick.
pub trait ContainerFrameProvider {
    /// Current container frame.
    fn frame(&self) -> ContainerFrame;

    /// Advance any internal motion by `dt` seconds.
    fn advance(&mut self, _dt: f32) {}

    /// Return to the rest pose.
    fn reset(&mut self) {}
}

/// A container that never moves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaticContainer(pub ContainerFrame);

impl ContainerFrameProvider for StaticContainer {
    fn frame(&self) -> ContainerFrame {
        self.0
    }
}
