//! Particle sources for simulation initialization.
//!
//! A [`ParticleSource`] hands the engine a one-shot [`SpawnData`] snapshot of
//! positions and velocities. The engine copies it verbatim and keeps it so
//! `reset` can reproduce the initial condition bit for bit.
//!
//! ```ignore
//! // Jittered block of particles in the lower half of the bowl
//! let source = BoxSpawner::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(1.6, 0.8, 1.6))
//!     .with_particles_per_axis(UVec3::new(24, 12, 24))
//!     .with_jitter(0.02);
//!
//! // Or write your own layout
//! let source = FnSpawner::new(1000, |ctx| (ctx.random_in_box(Vec3::splat(0.5)), Vec3::ZERO));
//! ```

use glam::{UVec3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, Result};

/// Initial particle state: one position and one velocity per particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnData {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
}

impl SpawnData {
    /// Pair positions with velocities. Both arrays must have the same length.
    pub fn new(positions: Vec<Vec3>, velocities: Vec<Vec3>) -> Result<Self> {
        if positions.len() != velocities.len() {
            return Err(FluidError::config(format!(
                "spawn data has {} positions but {} velocities",
                positions.len(),
                velocities.len()
            )));
        }
        Ok(Self { positions, velocities })
    }

    /// Particles at the given positions with zero velocity.
    pub fn at_rest(positions: Vec<Vec3>) -> Self {
        let velocities = vec![Vec3::ZERO; positions.len()];
        Self { positions, velocities }
    }

    pub fn empty() -> Self {
        Self::default()
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
}

/// Supplies the initial particle distribution.
pub trait ParticleSource {
    /// Produce the initial positions and velocities.
    fn spawn_data(&self) -> Result<SpawnData>;
}

impl ParticleSource for SpawnData {
    fn spawn_data(&self) -> Result<SpawnData> {
        Ok(self.clone())
    }
}

/// Context provided to [`FnSpawner`] closures with helpers for common layouts.
///
/// The RNG is seeded from the spawner seed and the particle index, so the same
/// spawner always produces the same particles.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: u32,
    /// Total number of particles being spawned.
    pub count: u32,
    rng: SmallRng,
}

impl SpawnContext {
    pub(crate) fn new(index: u32, count: u32, seed: u64) -> Self {
        let mixed = seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(mixed),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count <= 1 {
            0.0
        } else {
            self.index as f32 / (self.count - 1) as f32
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random point inside an origin-centered box with the given half-extents.
    pub fn random_in_box(&mut self, half_extents: Vec3) -> Vec3 {
        Vec3::new(
            self.random_range(-half_extents.x, half_extents.x),
            self.random_range(-half_extents.y, half_extents.y),
            self.random_range(-half_extents.z, half_extents.z),
        )
    }

    /// Random offset with each component in `[-strength, strength)`.
    pub fn jitter(&mut self, strength: f32) -> Vec3 {
        self.random_in_box(Vec3::splat(strength))
    }

    /// Position of this particle in a regular lattice filling `size` around `center`.
    ///
    /// Lattice points sit at cell centers, so no particle starts on the box face.
    pub fn grid_position(&self, dims: UVec3, center: Vec3, size: Vec3) -> Vec3 {
        let dims = dims.max(UVec3::ONE);
        let idx = lattice_len(dims).map_or(self.index, |len| self.index % len);
        let cell = UVec3::new(idx % dims.x, (idx / dims.x) % dims.y, idx / dims.x / dims.y);
        let t = (cell.as_vec3() + 0.5) / dims.as_vec3();
        center - size * 0.5 + t * size
    }
}

/// Closure-backed source: `f(ctx)` returns `(position, velocity)` per particle.
pub struct FnSpawner<F> {
    count: u32,
    seed: u64,
    f: F,
}

impl<F> FnSpawner<F>
where
    F: Fn(&mut SpawnContext) -> (Vec3, Vec3),
{
    pub fn new(count: u32, f: F) -> Self {
        Self { count, seed: 0, f }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl<F> ParticleSource for FnSpawner<F>
where
    F: Fn(&mut SpawnContext) -> (Vec3, Vec3),
{
    fn spawn_data(&self) -> Result<SpawnData> {
        let (positions, velocities) = (0..self.count)
            .map(|i| (self.f)(&mut SpawnContext::new(i, self.count, self.seed)))
            .unzip();
        SpawnData::new(positions, velocities)
    }
}

/// Fills an axis-aligned block with a jittered particle lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxSpawner {
    /// Block center in world space.
    pub center: Vec3,
    /// Full block size along each axis.
    pub size: Vec3,
    /// Lattice resolution; the particle count is the product of the components.
    pub particles_per_axis: UVec3,
    /// Maximum per-axis random offset applied to each lattice point.
    pub jitter: f32,
    /// Velocity given to every particle.
    pub initial_velocity: Vec3,
    /// RNG seed for the jitter.
    pub seed: u64,
}

impl BoxSpawner {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            size,
            particles_per_axis: UVec3::splat(16),
            jitter: 0.0,
            initial_velocity: Vec3::ZERO,
            seed: 0,
        }
    }

    pub fn with_particles_per_axis(mut self, dims: UVec3) -> Self {
        self.particles_per_axis = dims;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    pub fn with_initial_velocity(mut self, velocity: Vec3) -> Self {
        self.initial_velocity = velocity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of lattice points, or `None` if it does not fit in a `u32`.
    pub fn particle_count(&self) -> Option<u32> {
        lattice_len(self.particles_per_axis)
    }
}

fn lattice_len(dims: UVec3) -> Option<u32> {
    dims.x.checked_mul(dims.y)?.checked_mul(dims.z)
}

impl Default for BoxSpawner {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE)
    }
}

impl ParticleSource for BoxSpawner {
    fn spawn_data(&self) -> Result<SpawnData> {
        if !self.size.is_finite() || self.size.min_element() < 0.0 {
            return Err(FluidError::config(format!("invalid spawn box size {}", self.size)));
        }
        let count = self.particle_count().ok_or_else(|| {
            FluidError::config(format!("spawn lattice {} has too many particles", self.particles_per_axis))
        })?;
        let positions = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, count, self.seed);
                let base = ctx.grid_position(self.particles_per_axis, self.center, self.size);
                base + ctx.jitter(self.jitter)
            })
            .collect();
        let velocities = vec![self.initial_velocity; count as usize];
        SpawnData::new(positions, velocities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = SpawnData::new(vec![Vec3::ZERO; 3], vec![Vec3::ZERO; 2]);
        assert!(matches!(err, Err(FluidError::Configuration(_))));
    }

    #[test]
    fn test_box_spawner_count_and_bounds() {
        let spawner = BoxSpawner::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(1.0, 0.5, 1.0))
            .with_particles_per_axis(UVec3::new(4, 3, 2))
            .with_jitter(0.01);
        let data = spawner.spawn_data().unwrap();
        assert_eq!(data.len(), 24);
        for p in data.positions() {
            assert!(p.x >= -0.5 && p.x <= 0.5);
            assert!(p.y >= -0.75 && p.y <= -0.25);
            assert!(p.z >= -0.5 && p.z <= 0.5);
        }
    }

    #[test]
    fn test_box_spawner_is_deterministic() {
        let spawner = BoxSpawner::new(Vec3::ZERO, Vec3::ONE).with_jitter(0.05).with_seed(7);
        assert_eq!(spawner.spawn_data().unwrap(), spawner.spawn_data().unwrap());
    }

    #[test]
    fn test_grid_position_cell_centers() {
        let ctx = SpawnContext::new(0, 8, 0);
        let p = ctx.grid_position(UVec3::splat(2), Vec3::ZERO, Vec3::splat(2.0));
        assert!((p - Vec3::splat(-0.5)).length() < 1e-6);
    }

    #[test]
    fn test_oversized_lattice_rejected() {
        let spawner = BoxSpawner::default().with_particles_per_axis(UVec3::new(70_000, 70_000, 1));
        assert_eq!(spawner.particle_count(), None);
        assert!(matches!(spawner.spawn_data(), Err(FluidError::Configuration(_))));
    }

    #[test]
    fn test_grid_position_with_wide_lattice() {
        let ctx = SpawnContext::new(70_001, 1, 0);
        let p = ctx.grid_position(UVec3::new(70_000, 70_000, 1), Vec3::ZERO, Vec3::splat(70_000.0));
        assert!((p - Vec3::new(-34_998.5, -34_998.5, 0.0)).length() < 1e-2);
    }

    #[test]
    fn test_fn_spawner() {
        let source = FnSpawner::new(5, |ctx| (Vec3::X * ctx.index as f32, Vec3::Y));
        let data = source.spawn_data().unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data.positions()[3], Vec3::new(3.0, 0.0, 0.0));
        assert!(data.velocities().iter().all(|v| *v == Vec3::Y));
    }

    #[test]
    fn test_random_range_empty() {
        let mut ctx = SpawnContext::new(0, 1, 0);
        assert_eq!(ctx.random_range(0.5, 0.5), 0.5);
    }
}
