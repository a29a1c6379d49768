use soup::prelude::*;
use soup::{Quat, SpawnContext};

const DT: f32 = 1.0 / 60.0;

fn unit_bowl() -> ContainerFrame {
    ContainerFrame::axis_aligned(Vec3::ZERO, Vec3::ONE)
}

fn scattered(count: u32) -> FnSpawner<impl Fn(&mut SpawnContext) -> (Vec3, Vec3)> {
    FnSpawner::new(count, |ctx| (ctx.random_in_box(Vec3::splat(0.9)), ctx.jitter(2.0))).with_seed(42)
}

#[test]
fn test_initialize_copies_source_verbatim() {
    for count in [0, 1, 7, 256] {
        let source = scattered(count);
        let expected = source.spawn_data().unwrap();
        let sim = FluidSim::with_source(&source, SimulationConfig::default()).unwrap();

        assert_eq!(sim.particle_count().unwrap(), count);
        assert_eq!(sim.positions().unwrap(), expected.positions());
        assert_eq!(sim.velocities().unwrap(), expected.velocities());
        assert!(sim.densities().unwrap().iter().all(|&d| d == 1000.0));
    }
}

#[test]
fn test_particles_stay_inside_container() {
    let config = SimulationConfig::default().with_gravity(30.0);
    let mut sim = FluidSim::with_source(&scattered(500), config).unwrap();
    let bowl = unit_bowl();

    for _ in 0..300 {
        sim.step(DT, &bowl).unwrap();
        assert!(sim.positions().unwrap().iter().all(|p| bowl.contains(*p, 1e-5)));
    }
}

#[test]
fn test_particles_stay_inside_tilted_container() {
    let bowl = unit_bowl().with_orientation(Quat::from_rotation_z(20f32.to_radians()));
    let mut sim = FluidSim::with_source(&scattered(200), SimulationConfig::default()).unwrap();

    for _ in 0..240 {
        sim.step(DT, &bowl).unwrap();
    }
    assert!(sim.positions().unwrap().iter().all(|p| bowl.contains(*p, 1e-4)));
}

#[test]
fn test_reset_is_bit_identical_and_repeatable() {
    let mut sim = FluidSim::with_source(&scattered(64), SimulationConfig::default()).unwrap();
    let initial_positions = sim.positions().unwrap().to_vec();
    let initial_velocities = sim.velocities().unwrap().to_vec();

    for _ in 0..3 {
        for _ in 0..50 {
            sim.step(DT, &unit_bowl()).unwrap();
        }
        assert_ne!(sim.positions().unwrap(), initial_positions.as_slice());

        sim.reset().unwrap();
        assert_eq!(sim.positions().unwrap(), initial_positions.as_slice());
        assert_eq!(sim.velocities().unwrap(), initial_velocities.as_slice());
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.elapsed(), 0.0);
    }
}

#[test]
fn test_floor_hit_scales_velocity_by_damping() {
    let config = SimulationConfig::default()
        .with_gravity(0.0)
        .with_viscosity(0.0)
        .with_collision_damping(0.5);
    let data = SpawnData::new(vec![Vec3::new(0.0, -0.99, 0.0)], vec![Vec3::new(0.0, -6.0, 0.0)]).unwrap();
    let mut sim = FluidSim::with_source(&data, config).unwrap();

    sim.step(DT, &unit_bowl()).unwrap();

    assert_eq!(sim.positions().unwrap()[0].y, -1.0);
    assert_eq!(sim.velocities().unwrap()[0].y, 3.0);
}

#[test]
fn test_four_particles_settle_without_tunnelling() {
    let positions = vec![
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(0.5, 0.9, 0.5),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.3, -0.8, -0.2),
    ];
    let config = SimulationConfig::default()
        .with_gravity(9.81)
        .with_viscosity(0.2)
        .with_collision_damping(0.9);
    let mut sim = FluidSim::with_source(&SpawnData::at_rest(positions), config).unwrap();
    let bowl = StaticContainer(unit_bowl());

    for _ in 0..60 {
        sim.step(DT, &bowl.frame()).unwrap();
    }

    // One second of free fall from rest is the fastest any particle can go
    let bound = 9.81 + 1e-3;
    for (p, v) in sim.positions().unwrap().iter().zip(sim.velocities().unwrap()) {
        assert!(p.y >= -1.0, "particle below floor: {}", p);
        assert!(v.y.abs() <= bound, "velocity {} exceeds {}", v.y, bound);
    }
}

#[test]
fn test_empty_source_is_idle() {
    let mut sim = FluidSim::with_source(&SpawnData::empty(), SimulationConfig::default()).unwrap();
    assert_eq!(sim.particle_count().unwrap(), 0);
    assert!(sim.is_idle());

    sim.step(DT, &unit_bowl()).unwrap();
    sim.advance(DT, &unit_bowl()).unwrap();
    sim.reset().unwrap();

    assert!(sim.view().unwrap().is_empty());
    assert_eq!(sim.step_count(), 0);
}

#[test]
fn test_lifecycle_after_teardown() {
    let mut sim = FluidSim::with_source(&scattered(8), SimulationConfig::default()).unwrap();
    sim.teardown();
    sim.teardown();

    assert_eq!(sim.state(), Lifecycle::TornDown);
    assert!(matches!(sim.step(DT, &unit_bowl()), Err(FluidError::Lifecycle { .. })));
    assert!(matches!(sim.view(), Err(FluidError::Lifecycle { .. })));
    assert!(matches!(
        sim.initialize(Some(&scattered(8) as &dyn ParticleSource), SimulationConfig::default()),
        Err(FluidError::Lifecycle { .. })
    ));
}

#[test]
fn test_scene_spawn_drives_simulation() {
    let scene = SceneConfig::default();
    let mut sim = FluidSim::with_source(&scene.spawn, scene.simulation).unwrap();
    assert_eq!(sim.particle_count().ok(), scene.spawn.particle_count());

    let frame = scene.container_frame();
    for _ in 0..30 {
        sim.advance(DT, &frame).unwrap();
    }
    assert_eq!(sim.step_count(), 30 * scene.simulation.iterations_per_frame as u64);
}
