//! Kinematic integration plus arena boundary reflection.

use crate::{
    config::Config, engine::EngineHandle, error::Result, molecule::SimulationObject,
    store::ParticleStore,
};
use std::sync::Arc;
use std::time::Duration;

/// Advances every object in the store and keeps it inside the arena.
#[derive(Debug)]
pub struct Integrator {
    store: Arc<ParticleStore>,
    arena_width: f64,
    arena_height: f64,
    interval: Duration,
}

impl Integrator {
    pub fn new(store: Arc<ParticleStore>, cfg: &Config) -> Self {
        Self {
            store,
            arena_width: cfg.arena_width,
            arena_height: cfg.arena_height,
            interval: cfg.integration_interval(),
        }
    }

    /// One integration tick over the whole store, in a single traversal.
    ///
    /// ### Parameters
    /// - `duration` - Elapsed time since the previous tick, in seconds.
    pub fn tick(&self, duration: f64) {
        let (width, height) = (self.arena_width, self.arena_height);
        self.store.map(|obj, _| {
            obj.particle.integrate(duration);
            reflect(obj, width, height);
            false
        });
    }

    /// Runs [`Integrator::tick`] on its own thread until stopped.
    pub fn spawn(self) -> Result<EngineHandle> {
        let interval = self.interval;
        EngineHandle::spawn_periodic("integrator", interval, move |dt| self.tick(dt))
    }
}

/// Reflects an object off the arena walls.
///
/// An axis is violated when the position is `<= 0` or `> extent`; the
/// velocity component along it is negated and the position is clamped to
/// the violated edge. x and y are handled independently.
///
/// ### Returns
/// `true` if any wall was hit.
pub fn reflect(obj: &mut SimulationObject, width: f64, height: f64) -> bool {
    let p = &mut obj.particle;
    let mut hit = false;

    if p.position.x <= 0.0 {
        p.position.x = 0.0;
        p.velocity.x = -p.velocity.x;
        hit = true;
    } else if p.position.x > width {
        p.position.x = width;
        p.velocity.x = -p.velocity.x;
        hit = true;
    }

    if p.position.y <= 0.0 {
        p.position.y = 0.0;
        p.velocity.y = -p.velocity.y;
        hit = true;
    } else if p.position.y > height {
        p.position.y = height;
        p.velocity.y = -p.velocity.y;
        hit = true;
    }

    hit
}
