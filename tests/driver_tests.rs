use std::cell::RefCell;
use std::rc::Rc;

use glam::UVec3;
use soup::prelude::*;
use soup::{ColorRamp, DrawArguments, MeshTemplate, ParticleInstance};

type Log = Rc<RefCell<Vec<String>>>;

/// Static bowl that logs when the driver touches it.
struct LoggingProvider {
    log: Log,
    frame: ContainerFrame,
}

impl ContainerFrameProvider for LoggingProvider {
    fn frame(&self) -> ContainerFrame {
        self.log.borrow_mut().push("frame".into());
        self.frame
    }

    fn advance(&mut self, dt: f32) {
        self.log.borrow_mut().push(format!("advance {}", dt));
    }

    fn reset(&mut self) {
        self.log.borrow_mut().push("reset".into());
    }
}

/// Backend that keeps the instances of the last draw.
struct CaptureBackend {
    log: Log,
    last_instances: Vec<ParticleInstance>,
}

impl RenderBackend for CaptureBackend {
    type Program = ();
    type RampTexture = ();
    type ArgsBuffer = ();

    fn create_program(&mut self, _: &MeshTemplate, _: &DisplaySettings) -> soup::Result<()> {
        Ok(())
    }

    fn create_ramp_texture(&mut self, _: &ColorRamp) -> soup::Result<()> {
        Ok(())
    }

    fn create_args_buffer(&mut self, _: &DrawArguments) -> soup::Result<()> {
        Ok(())
    }

    fn write_instance_count(&mut self, _: &(), instance_count: u32) {
        self.log.borrow_mut().push(format!("count {}", instance_count));
    }

    fn draw_indexed_indirect(&mut self, _: &(), _: &(), _: &(), instances: &[ParticleInstance]) {
        self.log.borrow_mut().push("draw".into());
        self.last_instances = instances.to_vec();
    }
}

fn falling_block() -> BoxSpawner {
    BoxSpawner::new(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.5)).with_particles_per_axis(UVec3::splat(3))
}

fn logging_driver(log: &Log) -> FrameDriver<LoggingProvider, CaptureBackend> {
    let mut backend = CaptureBackend {
        log: log.clone(),
        last_instances: Vec::new(),
    };
    let sim = FluidSim::with_source(&falling_block(), SimulationConfig::default()).unwrap();
    let mut renderer = ParticleRenderer::new(DisplaySettings::default());
    renderer.initialize_from_settings(&mut backend).unwrap();
    let provider = LoggingProvider {
        log: log.clone(),
        frame: ContainerFrame::axis_aligned(Vec3::ZERO, Vec3::ONE),
    };
    FrameDriver::new(sim, renderer, provider, backend)
}

#[test]
fn test_tick_runs_provider_then_sim_then_render() {
    let log = Log::default();
    let mut driver = logging_driver(&log);

    let status = driver.tick(0.5).unwrap();
    assert_eq!(status, FrameStatus::Drawn { instances: 27 });
    assert_eq!(*log.borrow(), vec!["advance 0.5", "frame", "count 27", "draw"]);
}

#[test]
fn test_render_sees_committed_step() {
    let log = Log::default();
    let mut driver = logging_driver(&log);
    let before = driver.sim().positions().unwrap().to_vec();

    driver.tick(1.0 / 30.0).unwrap();

    let after = driver.sim().positions().unwrap();
    assert_ne!(after, before.as_slice());
    let drawn: Vec<Vec3> = driver
        .backend()
        .last_instances
        .iter()
        .map(|i| Vec3::from_array(i.position))
        .collect();
    assert_eq!(drawn.as_slice(), after);
    assert_eq!(
        driver.sim().step_count(),
        SimulationConfig::default().iterations_per_frame as u64
    );
}

#[test]
fn test_reset_restores_particles_and_provider() {
    let log = Log::default();
    let mut driver = logging_driver(&log);
    let initial = driver.sim().positions().unwrap().to_vec();

    for _ in 0..10 {
        driver.tick(1.0 / 60.0).unwrap();
    }
    driver.reset().unwrap();

    assert_eq!(driver.sim().positions().unwrap(), initial.as_slice());
    assert_eq!(log.borrow().last().map(String::as_str), Some("reset"));
}

#[test]
fn test_tilt_controller_levels_on_reset() {
    let log = Log::default();
    let mut backend = CaptureBackend {
        log,
        last_instances: Vec::new(),
    };
    let scene = SceneConfig::default();
    let sim = FluidSim::with_source(&falling_block(), scene.simulation).unwrap();
    let mut renderer = ParticleRenderer::new(scene.display.clone());
    renderer.initialize_from_settings(&mut backend).unwrap();
    let mut driver = FrameDriver::new(sim, renderer, scene.tilt_controller(), backend);

    driver.provider_mut().set_input(TiltInput::new(1.0, -1.0));
    for _ in 0..60 {
        driver.tick(1.0 / 60.0).unwrap();
    }
    let tilt = driver.provider().tilt_degrees();
    assert!((tilt.x - scene.tilt.max_tilt_degrees).abs() < 1e-3);
    assert!((tilt.y + scene.tilt.max_tilt_degrees).abs() < 1e-3);

    let frame = driver.provider().frame();
    assert!(driver.sim().positions().unwrap().iter().all(|p| frame.contains(*p, 1e-4)));

    driver.reset().unwrap();
    assert_eq!(driver.provider().tilt_degrees(), Vec2::ZERO);
    assert_eq!(driver.sim().step_count(), 0);
}

#[test]
fn test_teardown_then_tick_fails() {
    let log = Log::default();
    let mut driver = logging_driver(&log);
    driver.teardown();
    driver.teardown();

    assert_eq!(driver.sim().state(), Lifecycle::TornDown);
    assert_eq!(driver.renderer().state(), Lifecycle::TornDown);
    assert!(matches!(driver.tick(1.0 / 60.0), Err(FluidError::Lifecycle { .. })));
}
