use glam::DVec3;
use molsim_core::{
    Config, MoleculeKind, Simulation,
    collision::CollisionEngine,
    engine::POLL_INTERVAL,
    integrator::Integrator,
    store::ParticleStore,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn arena(count: usize) -> Config {
    Config {
        arena_width: 300.0,
        arena_height: 300.0,
        integration_interval_ms: 1,
        collision_interval_ms: 2,
        gravity_factor: 0.0,
        particle_count: count,
        ..Config::default()
    }
}

/// Polls `condition` until it holds or `timeout` passes.
fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Both engines running against one store: molecules keep moving, the
/// collision counter advances, and every state stays finite.
#[test]
fn engines_run_concurrently_on_a_shared_store() {
    let mut sim = Simulation::new(arena(200)).unwrap();
    sim.populate(&mut StdRng::seed_from_u64(2024));
    let before = sim.store().snapshot();

    sim.start().unwrap();

    let mut collisions = 0;
    let collided = wait_for(Duration::from_secs(5), || {
        collisions += sim.collisions_since_last_call();
        collisions > 0
    });
    thread::sleep(Duration::from_millis(50));
    sim.shutdown().unwrap();

    assert!(collided, "no collisions observed in a dense arena");
    let after = sim.store().snapshot();
    assert_eq!(after.len(), before.len());
    assert!(after.iter().zip(&before).any(|(a, b)| a.position() != b.position()));
    for obj in &after {
        assert!(obj.position().is_finite() && obj.particle.velocity.is_finite());
    }
}

/// Two molecules on a collision course get their velocities exchanged by
/// the collider thread while the integrator moves them.
#[test]
fn approaching_pair_bounces_apart() {
    let mut sim = Simulation::new(arena(0)).unwrap();
    sim.add_particle(MoleculeKind::N2, DVec3::new(100.0, 150.0, 0.0), DVec3::new(40.0, 0.0, 0.0));
    sim.add_particle(MoleculeKind::N2, DVec3::new(200.0, 150.0, 0.0), DVec3::new(-40.0, 0.0, 0.0));

    sim.start().unwrap();
    let bounced = wait_for(Duration::from_secs(10), || {
        let objs = sim.store().snapshot();
        objs[0].particle.velocity.x < 0.0 && objs[1].particle.velocity.x > 0.0
    });
    sim.shutdown().unwrap();

    assert!(bounced, "pair never exchanged velocities");
    assert!(sim.collider().total_collisions() >= 1);
}

/// Commands issued from the controller thread interleave with both engine
/// loops without deadlocking.
#[test]
fn commands_interleave_with_running_engines() {
    let mut sim = Simulation::new(arena(100)).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    sim.populate(&mut rng);
    sim.start().unwrap();

    for _ in 0..20 {
        sim.add_pair(&mut rng);
        sim.heat();
        let mut drawn = 0;
        sim.for_each_visual(|_| drawn += 1);
        assert!(drawn > 0);
        sim.cool();
        assert!(sim.remove_pair());
        thread::sleep(Duration::from_millis(1));
    }

    sim.shutdown().unwrap();
    assert_eq!(sim.particle_count(), 100);
}

/// After the stop request an engine exits within roughly one interval plus
/// the polling granularity.
#[test]
fn stopped_engines_join_promptly() {
    let store = Arc::new(ParticleStore::new());
    let cfg = Config {
        integration_interval_ms: 20,
        collision_interval_ms: 20,
        ..arena(0)
    };
    let integrator = Integrator::new(Arc::clone(&store), &cfg).spawn().unwrap();
    let collider = Arc::new(CollisionEngine::new(Arc::clone(&store), &cfg)).spawn().unwrap();
    thread::sleep(Duration::from_millis(30));

    let started = Instant::now();
    integrator.stop();
    collider.stop();
    integrator.join().unwrap();
    collider.join().unwrap();

    // Generous slack for scheduler noise on loaded machines.
    let bound = cfg.integration_interval() + POLL_INTERVAL + Duration::from_millis(250);
    assert!(started.elapsed() < bound, "took {:?}", started.elapsed());
}

/// Dropping a running simulation stops and joins its engines.
#[test]
fn dropping_a_running_simulation_joins_its_engines() {
    let store;
    {
        let mut sim = Simulation::new(arena(50)).unwrap();
        sim.populate(&mut StdRng::seed_from_u64(5));
        sim.start().unwrap();
        store = Arc::clone(sim.store());
        thread::sleep(Duration::from_millis(10));
    }

    let frozen = store.snapshot();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(store.snapshot(), frozen);
}
