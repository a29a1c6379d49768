//! Instanced particle renderer.
//!
//! The renderer draws the simulation's live particles with one indexed,
//! instanced, indirect draw per frame. The argument record is built once at
//! initialization from the mesh's static index metadata; every frame only
//! its `instance_count` field is patched, and nothing is reallocated.
//!
//! GPU work goes through a [`RenderBackend`]. Resources the backend hands
//! out are owned by the renderer and released by dropping them, so teardown
//! frees each one exactly once.
//!
//! ```ignore
//! let mut renderer = ParticleRenderer::new(DisplaySettings::default());
//! renderer.initialize(&mut backend, MeshTemplate::quad(), &gradient, 64)?;
//!
//! // every frame, after the simulation step
//! renderer.render_frame(&mut backend, sim.view()?)?;
//! ```

use bytemuck::{Pod, Zeroable};

use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::mesh::MeshTemplate;
use crate::particles::ParticleView;
use crate::visuals::{ColorMapping, ColorRamp, DisplaySettings, Gradient};

/// Indexed indirect draw record, laid out as the GPU reads it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawArguments {
    /// Byte offset of `instance_count` within the record.
    pub const INSTANCE_COUNT_OFFSET: u64 = 4;
}

/// Per-instance vertex data: particle position plus its ramp coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub ramp_t: f32,
}

/// GPU operations the renderer needs.
///
/// Handles are owned by the caller; dropping one releases the resource.
pub trait RenderBackend {
    /// Compiled shading program bound to a mesh.
    type Program;
    /// Colour ramp uploaded as a lookup texture.
    type RampTexture;
    /// Buffer holding one [`DrawArguments`] record.
    type ArgsBuffer;

    /// Build the shading program for `mesh`.
    ///
    /// Returns [`FluidError::RenderResource`](crate::FluidError::RenderResource)
    /// when no usable program can be produced.
    fn create_program(&mut self, mesh: &MeshTemplate, display: &DisplaySettings) -> Result<Self::Program>;

    fn create_ramp_texture(&mut self, ramp: &ColorRamp) -> Result<Self::RampTexture>;

    fn create_args_buffer(&mut self, args: &DrawArguments) -> Result<Self::ArgsBuffer>;

    /// Overwrite the `instance_count` field of an argument buffer in place.
    fn write_instance_count(&mut self, buffer: &Self::ArgsBuffer, instance_count: u32);

    /// Issue one indexed, instanced, indirect draw.
    fn draw_indexed_indirect(
        &mut self,
        program: &Self::Program,
        ramp: &Self::RampTexture,
        args: &Self::ArgsBuffer,
        instances: &[ParticleInstance],
    );
}

struct GpuResources<B: RenderBackend> {
    program: B::Program,
    ramp_texture: B::RampTexture,
    args_buffer: B::ArgsBuffer,
}

/// Outcome of [`ParticleRenderer::render_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// No live particles; no draw call was issued.
    Skipped,
    /// One draw call was issued.
    Drawn { instances: u32 },
}

/// Draws the simulation's particles.
pub struct ParticleRenderer<B: RenderBackend> {
    state: Lifecycle,
    settings: DisplaySettings,
    mesh: Option<MeshTemplate>,
    ramp: Option<ColorRamp>,
    args: DrawArguments,
    resources: Option<GpuResources<B>>,
    instances: Vec<ParticleInstance>,
    draw_calls: u64,
}

impl<B: RenderBackend> ParticleRenderer<B> {
    pub fn new(settings: DisplaySettings) -> Self {
        Self {
            state: Lifecycle::Uninitialized,
            settings,
            mesh: None,
            ramp: None,
            args: DrawArguments::default(),
            resources: None,
            instances: Vec::new(),
            draw_calls: 0,
        }
    }

    /// Initialize from the mesh, gradient and resolution held in `settings`.
    pub fn initialize_from_settings(&mut self, backend: &mut B) -> Result<()> {
        let mesh = MeshTemplate::for_mode(self.settings.mode, self.settings.mesh_resolution);
        let gradient = self.settings.gradient.clone();
        let resolution = self.settings.gradient_resolution;
        self.initialize(backend, mesh, &gradient, resolution)
    }

    /// Build the colour ramp, shading program and draw-argument buffer.
    ///
    /// Re-initializing a `Ready` renderer releases its old resources first.
    ///
    /// # Errors
    ///
    /// - [`FluidError::Configuration`](crate::FluidError::Configuration) when
    ///   `resolution < 2`
    /// - [`FluidError::RenderResource`](crate::FluidError::RenderResource) when
    ///   the backend cannot provide a shading program or buffer
    /// - [`FluidError::Lifecycle`](crate::FluidError::Lifecycle) after teardown
    pub fn initialize(
        &mut self,
        backend: &mut B,
        mesh: MeshTemplate,
        gradient: &Gradient,
        resolution: u32,
    ) -> Result<()> {
        self.state.ensure_alive("initialize")?;
        if self.resources.take().is_some() {
            log::debug!("releasing renderer resources before re-initialization");
        }
        self.mesh = None;
        self.ramp = None;
        self.args = DrawArguments::default();
        self.state = Lifecycle::Uninitialized;

        let ramp = ColorRamp::build(gradient, resolution)?;
        let args = mesh.draw_arguments();

        let program = backend.create_program(&mesh, &self.settings)?;
        let ramp_texture = backend.create_ramp_texture(&ramp)?;
        let args_buffer = backend.create_args_buffer(&args)?;

        log::info!(
            "renderer ready: {} ({} indices), {}-entry colour ramp",
            mesh.name,
            args.index_count,
            ramp.len()
        );

        self.resources = Some(GpuResources {
            program,
            ramp_texture,
            args_buffer,
        });
        self.mesh = Some(mesh);
        self.ramp = Some(ramp);
        self.args = args;
        self.state = Lifecycle::Ready;
        Ok(())
    }

    /// Draw the particles in `view`.
    ///
    /// Sets `instance_count` to the live count, writes that one field to the
    /// GPU argument buffer and issues exactly one draw. With no live
    /// particles nothing is written or drawn.
    pub fn render_frame(&mut self, backend: &mut B, view: ParticleView<'_>) -> Result<FrameStatus> {
        self.state.ensure_ready("render_frame")?;
        let count = view.count();
        self.args.instance_count = count;
        if count == 0 {
            return Ok(FrameStatus::Skipped);
        }
        let Some(resources) = self.resources.as_ref() else {
            return Ok(FrameStatus::Skipped);
        };

        fill_instances(&mut self.instances, view, self.settings.color_mapping);

        backend.write_instance_count(&resources.args_buffer, count);
        backend.draw_indexed_indirect(
            &resources.program,
            &resources.ramp_texture,
            &resources.args_buffer,
            &self.instances,
        );
        self.draw_calls += 1;
        Ok(FrameStatus::Drawn { instances: count })
    }

    /// Release the ramp texture, argument buffer and program. Repeatable.
    pub fn teardown(&mut self) {
        if self.resources.take().is_some() {
            log::debug!("renderer resources released");
        }
        self.ramp = None;
        self.mesh = None;
        self.instances = Vec::new();
        self.state = Lifecycle::TornDown;
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Current argument record; only `instance_count` changes between frames.
    pub fn draw_arguments(&self) -> &DrawArguments {
        &self.args
    }

    pub fn color_ramp(&self) -> Option<&ColorRamp> {
        self.ramp.as_ref()
    }

    pub fn mesh(&self) -> Option<&MeshTemplate> {
        self.mesh.as_ref()
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Draw calls issued since construction.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }
}

/// Refill `out` with one instance per particle, reusing its allocation.
fn fill_instances(out: &mut Vec<ParticleInstance>, view: ParticleView<'_>, mapping: ColorMapping) {
    out.clear();
    out.extend(
        view.positions()
            .iter()
            .zip(view.velocities())
            .map(|(&p, &v)| ParticleInstance {
                position: p.to_array(),
                ramp_t: mapping.scalar(p, v),
            }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluidError;
    use crate::particles::ParticleSet;
    use crate::spawn::SpawnData;
    use glam::Vec3;

    /// Backend that records calls; handles carry an id.
    #[derive(Default)]
    struct Recorder {
        next_id: u32,
        fail_program: bool,
        count_writes: Vec<u32>,
        draws: Vec<(u32, usize)>,
    }

    impl RenderBackend for Recorder {
        type Program = u32;
        type RampTexture = u32;
        type ArgsBuffer = u32;

        fn create_program(&mut self, _: &MeshTemplate, _: &DisplaySettings) -> Result<u32> {
            if self.fail_program {
                return Err(FluidError::render("no shader"));
            }
            self.next_id += 1;
            Ok(self.next_id)
        }

        fn create_ramp_texture(&mut self, _: &ColorRamp) -> Result<u32> {
            self.next_id += 1;
            Ok(self.next_id)
        }

        fn create_args_buffer(&mut self, _: &DrawArguments) -> Result<u32> {
            self.next_id += 1;
            Ok(self.next_id)
        }

        fn write_instance_count(&mut self, _: &u32, instance_count: u32) {
            self.count_writes.push(instance_count);
        }

        fn draw_indexed_indirect(&mut self, _: &u32, _: &u32, args: &u32, instances: &[ParticleInstance]) {
            self.draws.push((*args, instances.len()));
        }
    }

    fn ready_renderer(backend: &mut Recorder) -> ParticleRenderer<Recorder> {
        let mut r = ParticleRenderer::new(DisplaySettings::default());
        r.initialize(backend, MeshTemplate::quad(), &Gradient::default(), 64).unwrap();
        r
    }

    #[test]
    fn test_args_layout() {
        assert_eq!(std::mem::size_of::<DrawArguments>(), 20);
        let args = DrawArguments {
            instance_count: 0xAABBCCDD,
            ..Default::default()
        };
        let bytes = bytemuck::bytes_of(&args);
        let offset = DrawArguments::INSTANCE_COUNT_OFFSET as usize;
        assert_eq!(&bytes[offset..offset + 4], &0xAABBCCDDu32.to_ne_bytes());
    }

    #[test]
    fn test_render_patches_only_instance_count() {
        let mut backend = Recorder::default();
        let mut r = ready_renderer(&mut backend);
        let before = *r.draw_arguments();

        let set = ParticleSet::from_spawn(&SpawnData::at_rest(vec![Vec3::ZERO; 5]), 1.0);
        let status = r.render_frame(&mut backend, set.view()).unwrap();

        assert_eq!(status, FrameStatus::Drawn { instances: 5 });
        let after = *r.draw_arguments();
        assert_eq!(after, DrawArguments { instance_count: 5, ..before });
        assert_eq!(backend.count_writes, vec![5]);
        assert_eq!(backend.draws, vec![(3, 5)]);
    }

    #[test]
    fn test_empty_view_skips_draw() {
        let mut backend = Recorder::default();
        let mut r = ready_renderer(&mut backend);
        let status = r.render_frame(&mut backend, ParticleView::empty()).unwrap();
        assert_eq!(status, FrameStatus::Skipped);
        assert!(backend.draws.is_empty());
        assert!(backend.count_writes.is_empty());
        assert_eq!(r.draw_calls(), 0);
    }

    #[test]
    fn test_missing_program_is_render_resource_error() {
        let mut backend = Recorder {
            fail_program: true,
            ..Default::default()
        };
        let mut r = ParticleRenderer::new(DisplaySettings::default());
        let err = r.initialize(&mut backend, MeshTemplate::quad(), &Gradient::default(), 64);
        assert!(matches!(err, Err(FluidError::RenderResource(_))));
        assert_eq!(r.state(), Lifecycle::Uninitialized);
    }

    #[test]
    fn test_render_before_initialize() {
        let mut backend = Recorder::default();
        let mut r: ParticleRenderer<Recorder> = ParticleRenderer::new(DisplaySettings::default());
        let err = r.render_frame(&mut backend, ParticleView::empty());
        assert!(matches!(err, Err(FluidError::Lifecycle { .. })));
    }

    #[test]
    fn test_instances_carry_speed() {
        let mut out = Vec::new();
        let set = ParticleSet::from_spawn(
            &SpawnData::new(vec![Vec3::ONE], vec![Vec3::new(0.0, 7.5, 0.0)]).unwrap(),
            1.0,
        );
        fill_instances(&mut out, set.view(), ColorMapping::Speed { max: 15.0 });
        assert_eq!(out, vec![ParticleInstance { position: [1.0, 1.0, 1.0], ramp_t: 0.5 }]);
    }
}
