//! # soup - a particle fluid in a tilting bowl
//!
//! Particles fall under gravity, lose energy to viscosity and bounce off the
//! walls of a box-shaped bowl the user can tilt. Integration runs on the CPU;
//! every frame the live particles are drawn with one instanced, indexed,
//! indirect GPU draw, coloured through a gradient lookup ramp.
//!
//! ## Quick Start
//!
//! ```ignore
//! use soup::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     let scene = SceneConfig::default();
//!     soup::run(scene)
//! }
//! ```
//!
//! ## Headless use
//!
//! The engine and renderer do not need a window. Drive them through any
//! [`RenderBackend`]:
//!
//! ```ignore
//! let spawner = BoxSpawner::new(Vec3::new(0.0, -0.3, 0.0), Vec3::new(1.6, 1.0, 1.6));
//! let sim = FluidSim::with_source(&spawner, SimulationConfig::default())?;
//!
//! let mut renderer = ParticleRenderer::new(DisplaySettings::default());
//! renderer.initialize_from_settings(&mut backend)?;
//!
//! let bowl = StaticContainer(ContainerFrame::axis_aligned(Vec3::ZERO, Vec3::ONE));
//! let mut driver = FrameDriver::new(sim, renderer, bowl, backend);
//! driver.tick(1.0 / 60.0)?;
//! driver.teardown();
//! ```
//!
//! ## Core Concepts
//!
//! | Piece | Role |
//! |-------|------|
//! | [`FluidSim`] | Owns the particle buffers and integrates them |
//! | [`ContainerFrameProvider`] | Supplies the bowl's pose each frame |
//! | [`ParticleRenderer`] | Builds the colour ramp and draw arguments, draws the particles |
//! | [`FrameDriver`] | Runs simulate-then-render once per tick |
//!
//! Both the engine and the renderer follow `Uninitialized -> Ready -> TornDown`;
//! see [`Lifecycle`].

pub mod config;
pub mod container;
pub mod driver;
pub mod error;
pub mod gpu;
pub mod lifecycle;
pub mod mesh;
pub mod particles;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod simulation;
pub mod spawn;
pub mod tilt;
pub mod time;
pub mod visuals;
mod window;

pub use bytemuck;
pub use config::SimulationConfig;
pub use container::{ContainerFrame, ContainerFrameProvider, StaticContainer};
pub use driver::FrameDriver;
pub use error::{FluidError, GpuError, Result, RunError};
pub use glam::{Quat, Vec2, Vec3, Vec4};
pub use gpu::{Camera, WgpuBackend};
pub use lifecycle::Lifecycle;
pub use mesh::{MeshTemplate, MeshVertex};
pub use particles::{ParticleSet, ParticleView};
pub use renderer::{DrawArguments, FrameStatus, ParticleInstance, ParticleRenderer, RenderBackend};
pub use scene::SceneConfig;
pub use simulation::FluidSim;
pub use spawn::{BoxSpawner, FnSpawner, ParticleSource, SpawnContext, SpawnData};
pub use tilt::{TiltController, TiltInput, TiltSettings};
pub use time::Time;
pub use visuals::{ColorMapping, ColorRamp, DisplayMode, DisplaySettings, Gradient, Palette};
pub use window::{run, App};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use soup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SimulationConfig;
    pub use crate::container::{ContainerFrame, ContainerFrameProvider, StaticContainer};
    pub use crate::driver::FrameDriver;
    pub use crate::error::{FluidError, RunError};
    pub use crate::lifecycle::Lifecycle;
    pub use crate::renderer::{FrameStatus, ParticleRenderer, RenderBackend};
    pub use crate::scene::SceneConfig;
    pub use crate::simulation::FluidSim;
    pub use crate::spawn::{BoxSpawner, FnSpawner, ParticleSource, SpawnData};
    pub use crate::tilt::{TiltController, TiltInput};
    pub use crate::visuals::{ColorMapping, DisplayMode, DisplaySettings, Gradient, Palette};
    pub use crate::{Vec2, Vec3, Vec4};
}
