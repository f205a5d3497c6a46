//! Budgeted all-pairs overlap detection and 2-D elastic collision response.
//!
//! A sweep walks every ordered pair `(i, j)`, `i != j`, of the store under
//! one lock acquisition. Each comparison counts against the configured
//! budget; when the budget is reached the sweep ends on the spot and the
//! remaining pairs wait for the next tick.
//!
//! Overlapping pairs are resolved in two steps:
//! 1. [`separate`] pushes the boxes apart along the overlap extents,
//!    scaled by [`DEPENETRATION_SCALE`] on each side.
//! 2. [`exchange_normal_velocity`] applies the 1-D elastic formula to the
//!    velocity components along the line between the two positions; the
//!    tangential components are left as they are.

use crate::{
    config::Config, engine::EngineHandle, error::Result, molecule::SimulationObject,
    particle::Particle, store::ParticleStore,
};
use glam::DVec3;
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Fraction of the overlap each object of a pair is moved by.
///
/// Slightly above one half so that the boxes end up strictly apart
/// rather than touching.
pub const DEPENETRATION_SCALE: f64 = 0.501;

/// Separations shorter than this have no usable collision normal.
const NORMAL_EPSILON: f64 = 1e-9;

/// Outcome of one detection sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Ordered pairs compared.
    pub comparisons: u64,
    /// Ordered pairs found overlapping.
    pub collisions: u64,
    /// `true` if the sweep ended because the budget was reached.
    pub exhausted: bool,
}

/// Detects and resolves collisions between objects in a shared store.
#[derive(Debug)]
pub struct CollisionEngine {
    store: Arc<ParticleStore>,
    budget: u64,
    interval: Duration,
    since_last_call: AtomicU64,
    total: AtomicU64,
}

impl CollisionEngine {
    pub fn new(store: Arc<ParticleStore>, cfg: &Config) -> Self {
        Self {
            store,
            budget: cfg.collision_budget,
            interval: cfg.collision_interval(),
            since_last_call: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Runs one budgeted sweep over all ordered pairs.
    ///
    /// Every overlapping pair bumps the collision counters by one and is
    /// handed to [`resolve`]. Pairs whose velocities cannot be resolved are
    /// still counted.
    pub fn detect_and_resolve(&self) -> SweepStats {
        let budget = self.budget;
        let mut stats = SweepStats::default();

        self.store.map_pairs(|a, b, _, _| {
            if stats.comparisons >= budget {
                stats.exhausted = true;
                return true;
            }
            stats.comparisons += 1;
            if a.overlaps(b) {
                stats.collisions += 1;
                resolve(a, b);
            }
            stats.exhausted = stats.comparisons >= budget;
            stats.exhausted
        });

        if stats.collisions > 0 {
            self.since_last_call.fetch_add(stats.collisions, Ordering::Relaxed);
            self.total.fetch_add(stats.collisions, Ordering::Relaxed);
        }
        if stats.exhausted {
            trace!("collision sweep stopped at budget of {budget} comparisons");
        }
        stats
    }

    /// Multiplies the velocity of every energy-sensitive object by `factor`.
    ///
    /// ### Returns
    /// The number of objects affected.
    pub fn change_energy(&self, factor: f64) -> usize {
        let mut changed = 0;
        self.store.map(|obj, _| {
            if obj.is_sensitive() {
                obj.particle.velocity *= factor;
                changed += 1;
            }
            false
        });
        changed
    }

    /// Returns the collisions counted since the previous call and restarts
    /// the count.
    pub fn collisions_since_last_call(&self) -> u64 {
        self.since_last_call.swap(0, Ordering::AcqRel)
    }

    /// Collisions counted since the engine was created.
    pub fn total_collisions(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Runs [`CollisionEngine::detect_and_resolve`] on its own thread until
    /// stopped.
    pub fn spawn(self: Arc<Self>) -> Result<EngineHandle> {
        let interval = self.interval;
        EngineHandle::spawn_periodic("collider", interval, move |_| {
            self.detect_and_resolve();
        })
    }
}

/// Resolves one overlapping pair: positional correction first, then the
/// elastic velocity exchange.
///
/// The collision normal is taken from the positions before correction.
/// When it is undefined (coincident positions) or the exchange produces a
/// non-finite value, both velocities are left exactly as they were.
///
/// ### Returns
/// `true` if the velocities were updated.
pub fn resolve(a: &mut SimulationObject, b: &mut SimulationObject) -> bool {
    let separation = b.position() - a.position();
    separate(a, b);
    exchange_normal_velocity(&mut a.particle, &mut b.particle, separation)
}

/// Moves `a` and `b` apart by [`DEPENETRATION_SCALE`] times the overlap
/// extents each.
///
/// On each axis `a` moves away from `b` (in `+` direction when their
/// corners coincide) and `b` moves the opposite way.
pub fn separate(a: &mut SimulationObject, b: &mut SimulationObject) {
    let (a_min, a_max) = a.bounds();
    let (b_min, b_max) = b.bounds();

    let extent = (a_max.min(b_max) - a_min.max(b_min)).max(DVec3::ZERO);
    let away = DVec3::new(
        if a_min.x >= b_min.x { 1.0 } else { -1.0 },
        if a_min.y >= b_min.y { 1.0 } else { -1.0 },
        0.0,
    );
    let displacement = extent * away * DEPENETRATION_SCALE;

    a.particle.position += displacement;
    b.particle.position -= displacement;
}

/// Exchanges the velocity components along `separation` (from `p1` to
/// `p2`) using the 1-D elastic collision formula.
///
/// Only the x/y plane is considered: the normal is the normalized planar
/// separation and the tangent is its left perpendicular. Tangential
/// components are preserved.
///
/// ### Returns
/// `false`, with both particles untouched, if the separation is too short
/// to define a normal or any intermediate value is not finite.
pub fn exchange_normal_velocity(p1: &mut Particle, p2: &mut Particle, separation: DVec3) -> bool {
    let planar = DVec3::new(separation.x, separation.y, 0.0);
    let distance = planar.length();
    if !(distance > NORMAL_EPSILON) {
        return false;
    }

    let normal = planar / distance;
    let tangent = DVec3::new(-normal.y, normal.x, 0.0);

    let (m1, m2) = (p1.mass(), p2.mass());
    let (v1n, v1t) = (p1.velocity.dot(normal), p1.velocity.dot(tangent));
    let (v2n, v2t) = (p2.velocity.dot(normal), p2.velocity.dot(tangent));

    let total = m1 + m2;
    let v1n_after = (v1n * (m1 - m2) + 2.0 * m2 * v2n) / total;
    let v2n_after = (v2n * (m2 - m1) + 2.0 * m1 * v1n) / total;

    let v1 = normal * v1n_after + tangent * v1t;
    let v2 = normal * v2n_after + tangent * v2t;
    if !(v1.is_finite() && v2.is_finite()) {
        return false;
    }

    p1.velocity = v1;
    p2.velocity = v2;
    true
}
