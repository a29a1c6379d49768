//! Particle storage owned by the simulation engine.
//!
//! [`ParticleSet`] keeps positions, velocities and densities as parallel
//! arrays of identical length. The arrays are only ever created, replaced or
//! released together, so a length mismatch cannot be observed.
//!
//! Readers outside the engine get a [`ParticleView`], which borrows the
//! engine immutably. The borrow ends before the next `step` or `reset`, so a
//! view cannot outlive a resize.

use glam::Vec3;

use crate::spawn::SpawnData;

/// Structure-of-arrays particle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    densities: Vec<f32>,
}

impl ParticleSet {
    /// Build a set from spawn data, seeding every density with `density`.
    pub fn from_spawn(data: &SpawnData, density: f32) -> Self {
        Self {
            positions: data.positions().to_vec(),
            velocities: data.velocities().to_vec(),
            densities: vec![density; data.len()],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn densities(&self) -> &[f32] {
        &self.densities
    }

    /// Mutable position/velocity pairs for the integrator.
    pub(crate) fn motion_mut(&mut self) -> impl Iterator<Item = (&mut Vec3, &mut Vec3)> {
        self.positions.iter_mut().zip(self.velocities.iter_mut())
    }

    pub fn view(&self) -> ParticleView<'_> {
        ParticleView {
            positions: &self.positions,
            velocities: &self.velocities,
            densities: &self.densities,
        }
    }
}

/// Read-only window onto the engine's live particle buffers.
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    positions: &'a [Vec3],
    velocities: &'a [Vec3],
    densities: &'a [f32],
}

impl<'a> ParticleView<'a> {
    /// A view with no particles.
    pub fn empty() -> Self {
        Self {
            positions: &[],
            velocities: &[],
            densities: &[],
        }
    }

    /// Live particle count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.positions.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &'a [Vec3] {
        self.positions
    }

    pub fn velocities(&self) -> &'a [Vec3] {
        self.velocities
    }

    pub fn densities(&self) -> &'a [f32] {
        self.densities
    }
}
