//! The particle simulation engine.
//!
//! [`FluidSim`] owns the [`ParticleSet`] and advances it under gravity,
//! velocity damping and container collision. Every particle is integrated
//! independently; densities are seeded at initialization and left untouched
//! by the integrator so a neighbor-based pressure pass can be added later
//! without changing the buffer contract.
//!
//! ```ignore
//! let mut sim = FluidSim::new();
//! sim.initialize(Some(&spawner), SimulationConfig::default())?;
//!
//! // once per frame, before rendering
//! sim.advance(frame_dt, &provider.frame())?;
//! renderer.render_frame(&mut backend, sim.view()?)?;
//! ```

use glam::Vec3;

use crate::config::SimulationConfig;
use crate::container::ContainerFrame;
use crate::error::{FluidError, Result};
use crate::lifecycle::Lifecycle;
use crate::particles::{ParticleSet, ParticleView};
use crate::spawn::{ParticleSource, SpawnData};

/// Particle integrator with an explicit `Uninitialized → Ready → TornDown` lifecycle.
#[derive(Debug, Default)]
pub struct FluidSim {
    state: Lifecycle,
    config: SimulationConfig,
    particles: Option<ParticleSet>,
    /// Initial condition kept for `reset`.
    snapshot: Option<SpawnData>,
    elapsed: f32,
    steps: u64,
}

impl FluidSim {
    /// Create an uninitialized engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and initialize in one call.
    pub fn with_source(source: &dyn ParticleSource, config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::new();
        sim.initialize(Some(source), config)?;
        Ok(sim)
    }

    /// Allocate particle buffers from `source` and enter `Ready`.
    ///
    /// The source's positions and velocities are copied verbatim and every
    /// density is set to `config.target_density`. A source with zero
    /// particles is accepted; the engine is then idle and `step` does
    /// nothing.
    ///
    /// Calling this on a `Ready` engine replaces its buffers: the old set is
    /// released before the new one is allocated. On error the engine keeps
    /// whatever state it had.
    ///
    /// # Errors
    ///
    /// - [`FluidError::Configuration`] if `source` is `None`, the config does
    ///   not validate, or the source produces inconsistent data
    /// - [`FluidError::Lifecycle`] after `teardown`
    pub fn initialize(
        &mut self,
        source: Option<&dyn ParticleSource>,
        config: SimulationConfig,
    ) -> Result<()> {
        self.state.ensure_alive("initialize")?;
        let source = source.ok_or_else(|| FluidError::config("no particle source provided"))?;
        let config = config.validate()?;
        let data = source.spawn_data()?;

        self.config = config;
        self.install(data);
        self.state = Lifecycle::Ready;

        if self.is_idle() {
            log::warn!("particle source produced no particles; simulation is idle");
        } else {
            log::info!("initialized {} particles", self.particles.as_ref().map_or(0, ParticleSet::len));
        }
        Ok(())
    }

    /// Replace the particle set with one built from `data` and keep `data` for `reset`.
    fn install(&mut self, data: SpawnData) {
        self.particles = None;
        self.particles = Some(ParticleSet::from_spawn(&data, self.config.target_density));
        self.snapshot = Some(data);
        self.elapsed = 0.0;
        self.steps = 0;
    }

    /// Run one integration pass of length `dt` against `frame`.
    ///
    /// Per particle, in order:
    /// 1. `v += (0, -gravity, 0) * dt`
    /// 2. `v *= 1 - viscosity * dt`
    /// 3. `p += v * dt`
    /// 4. clamp into the container, reflecting each crossed axis with
    ///    `-collision_damping`
    ///
    /// Step 2 is a first-order damping approximation and diverges once
    /// `viscosity * dt` exceeds 2.
    ///
    /// An idle engine, a zero delta and a non-finite delta leave the state
    /// unchanged.
    pub fn step(&mut self, dt: f32, frame: &ContainerFrame) -> Result<()> {
        self.state.ensure_ready("step")?;
        if !(dt.is_finite() && dt > 0.0) {
            return Ok(());
        }
        let Some(particles) = self.particles.as_mut() else {
            return Ok(());
        };
        if particles.is_empty() {
            return Ok(());
        }

        let config = &self.config;
        let gravity = Vec3::new(0.0, -config.gravity, 0.0);
        let damping = 1.0 - config.viscosity * dt;

        for (position, velocity) in particles.motion_mut() {
            *velocity += gravity * dt;
            *velocity *= damping;
            *position += *velocity * dt;
            frame.resolve_collision(position, velocity, config.collision_damping);
        }

        self.elapsed += dt;
        self.steps += 1;
        Ok(())
    }

    /// Advance one external frame.
    ///
    /// The frame delta is multiplied by `time_scale` and split evenly over
    /// `iterations_per_frame` calls to [`step`](Self::step).
    pub fn advance(&mut self, frame_dt: f32, frame: &ContainerFrame) -> Result<()> {
        self.state.ensure_ready("advance")?;
        let iterations = self.config.iterations_per_frame;
        let dt = frame_dt * self.config.time_scale / iterations as f32;
        for _ in 0..iterations {
            self.step(dt, frame)?;
        }
        Ok(())
    }

    /// Restore the initial condition captured at `initialize` and zero the clock.
    ///
    /// Calling it repeatedly yields identical state each time.
    pub fn reset(&mut self) -> Result<()> {
        self.state.ensure_ready("reset")?;
        let data = self
            .snapshot
            .take()
            .ok_or_else(|| FluidError::config("no initial condition recorded"))?;
        self.install(data);
        log::debug!("simulation reset to {} particles", self.particle_count()?);
        Ok(())
    }

    /// Release all particle buffers. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if let Some(particles) = self.particles.take() {
            log::debug!("releasing {} particles", particles.len());
        }
        self.snapshot = None;
        self.state = Lifecycle::TornDown;
    }

    fn live(&self, operation: &'static str) -> Result<&ParticleSet> {
        self.state.ensure_ready(operation)?;
        self.particles.as_ref().ok_or(FluidError::Lifecycle {
            operation,
            state: self.state,
        })
    }

    /// Number of live particles.
    pub fn particle_count(&self) -> Result<u32> {
        Ok(self.live("particle_count")?.len() as u32)
    }

    pub fn positions(&self) -> Result<&[Vec3]> {
        Ok(self.live("positions")?.positions())
    }

    pub fn velocities(&self) -> Result<&[Vec3]> {
        Ok(self.live("velocities")?.velocities())
    }

    pub fn densities(&self) -> Result<&[f32]> {
        Ok(self.live("densities")?.densities())
    }

    /// Read-only view for the renderer. Re-fetch after every `step` or `reset`.
    pub fn view(&self) -> Result<ParticleView<'_>> {
        Ok(self.live("view")?.view())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the configuration. The new values apply from the next step.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<()> {
        self.config = config.validate()?;
        Ok(())
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// `true` when the engine holds no particles.
    pub fn is_idle(&self) -> bool {
        self.particles.as_ref().map_or(true, ParticleSet::is_empty)
    }

    /// Simulated seconds since the last `initialize` or `reset`.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Integration passes since the last `initialize` or `reset`.
    pub fn step_count(&self) -> u64 {
        self.steps
    }
}
