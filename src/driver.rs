//! Explicit per-frame tick loop.
//!
//! [`FrameDriver`] is wired once, at construction, with the simulation, the
//! renderer, the container frame provider and the render backend. Each
//! [`tick`](FrameDriver::tick) runs, in this order:
//!
//! 1. advance the container provider and read its frame
//! 2. advance the simulation (all sub-steps commit before rendering)
//! 3. render the simulation's freshly borrowed view
//!
//! Everything happens on the calling thread; the ordering is what keeps the
//! renderer from reading a half-updated particle buffer.

use crate::container::ContainerFrameProvider;
use crate::error::Result;
use crate::renderer::{FrameStatus, ParticleRenderer, RenderBackend};
use crate::simulation::FluidSim;

/// Owns the simulation, renderer, frame provider and backend for one session.
pub struct FrameDriver<P, B>
where
    P: ContainerFrameProvider,
    B: RenderBackend,
{
    sim: FluidSim,
    renderer: ParticleRenderer<B>,
    provider: P,
    backend: B,
}

impl<P, B> FrameDriver<P, B>
where
    P: ContainerFrameProvider,
    B: RenderBackend,
{
    pub fn new(sim: FluidSim, renderer: ParticleRenderer<B>, provider: P, backend: B) -> Self {
        Self {
            sim,
            renderer,
            provider,
            backend,
        }
    }

    /// Simulate then render one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<FrameStatus> {
        self.provider.advance(dt);
        let frame = self.provider.frame();
        self.sim.advance(dt, &frame)?;
        let view = self.sim.view()?;
        self.renderer.render_frame(&mut self.backend, view)
    }

    /// Level the container and restore the initial particle state.
    pub fn reset(&mut self) -> Result<()> {
        self.provider.reset();
        self.sim.reset()
    }

    /// Release renderer resources, then particle buffers. Repeatable.
    pub fn teardown(&mut self) {
        self.renderer.teardown();
        self.sim.teardown();
    }

    pub fn sim(&self) -> &FluidSim {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut FluidSim {
        &mut self.sim
    }

    pub fn renderer(&self) -> &ParticleRenderer<B> {
        &self.renderer
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
