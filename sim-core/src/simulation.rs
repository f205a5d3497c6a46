//! Controller-facing facade: owns the store and the engines, and exposes
//! the render, command and metrics contracts to a front end.

use crate::{
    collision::CollisionEngine,
    config::Config,
    engine::EngineHandle,
    error::{Error, Result},
    integrator::Integrator,
    molecule::{MoleculeKind, SimulationObject},
    store::ParticleStore,
    types::{ParticleId, Rgba},
};
use glam::DVec3;
use log::{info, warn};
use rand::Rng;
use std::sync::Arc;

/// Velocity factor applied by [`Simulation::heat`].
pub const HEAT_FACTOR: f64 = 2.0;
/// Velocity factor applied by [`Simulation::cool`].
pub const COOL_FACTOR: f64 = 0.5;

/// What a renderer needs to draw one molecule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    pub position: DVec3,
    pub size: f64,
    pub color: Rgba,
    pub kind: MoleculeKind,
}

impl From<&SimulationObject> for RenderItem {
    fn from(obj: &SimulationObject) -> Self {
        Self {
            position: obj.position(),
            size: obj.size,
            color: obj.color,
            kind: obj.kind,
        }
    }
}

/// A gas of molecules driven by an integrator and a collision engine,
/// each on its own thread.
///
/// The typical lifecycle is:
/// 1. [`Simulation::new`] with a validated [`Config`].
/// 2. [`Simulation::populate`] to place the initial molecules.
/// 3. [`Simulation::start`] to launch both engines.
/// 4. Per frame: [`Simulation::for_each_visual`] and the command methods.
/// 5. [`Simulation::shutdown`] (or drop) to stop and join the engines.
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    store: Arc<ParticleStore>,
    collider: Arc<CollisionEngine>,
    engines: Vec<EngineHandle>,
}

impl Simulation {
    /// ### Errors
    /// [`crate::error::Error::InvalidConfig`] if `config` fails validation.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(ParticleStore::with_capacity(config.particle_count));
        let collider = Arc::new(CollisionEngine::new(Arc::clone(&store), &config));
        Ok(Self {
            config,
            store,
            collider,
            engines: Vec::with_capacity(2),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<ParticleStore> {
        &self.store
    }

    pub fn collider(&self) -> &CollisionEngine {
        &self.collider
    }

    /// Launches the integrator and collision threads. Does nothing if they
    /// are already running.
    ///
    /// ### Errors
    /// [`crate::error::Error::Spawn`] if a thread cannot be created; any
    /// engine already started is stopped again.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let integrator = Integrator::new(Arc::clone(&self.store), &self.config).spawn()?;
        self.engines.push(integrator);
        let collider = match Arc::clone(&self.collider).spawn() {
            Ok(handle) => handle,
            Err(e) => return Err(self.abort_start(e)),
        };
        self.engines.push(collider);
        Ok(())
    }

    /// Stops whatever [`Simulation::start`] already launched and hands back
    /// the error that made it fail. A failure while stopping is only logged.
    fn abort_start(&mut self, cause: Error) -> Error {
        if let Err(cleanup) = self.shutdown() {
            warn!("stopping engines after failed start: {cleanup}");
        }
        cause
    }

    pub fn is_running(&self) -> bool {
        !self.engines.is_empty()
    }

    /// Signals every engine to stop, then waits for all of them.
    ///
    /// ### Errors
    /// The first [`crate::error::Error::EnginePanicked`] encountered; the
    /// remaining engines are still joined.
    pub fn shutdown(&mut self) -> Result<()> {
        for engine in &self.engines {
            engine.stop();
        }
        let mut outcome = Ok(());
        for engine in self.engines.drain(..) {
            let joined = engine.join();
            if outcome.is_ok() {
                outcome = joined;
            }
        }
        outcome
    }

    /// Places `config.particle_count` molecules: 78 % N2, 21 % O2 and at
    /// least one CO2, at random positions with random velocities.
    ///
    /// ### Returns
    /// The number of molecules placed.
    pub fn populate(&self, rng: &mut impl Rng) -> usize {
        let count = self.config.particle_count;
        let n2 = count * 78 / 100;
        let o2 = count * 21 / 100;
        let co2 = (count / 100).max(1);

        let plan = [(MoleculeKind::N2, n2), (MoleculeKind::O2, o2), (MoleculeKind::CO2, co2)];
        for (kind, n) in plan {
            for _ in 0..n {
                let velocity = self.random_velocity(rng);
                self.place_molecule(kind, velocity, rng);
            }
        }

        info!("placed {n2} N2, {o2} O2 and {co2} CO2 molecules");
        n2 + o2 + co2
    }

    /// Places one molecule at a random position inside the arena.
    pub fn place_molecule(&self, kind: MoleculeKind, velocity: DVec3, rng: &mut impl Rng) -> ParticleId {
        let position = DVec3::new(
            rng.random_range(0.0..=self.config.arena_width),
            rng.random_range(0.0..=self.config.arena_height),
            0.0,
        );
        self.add_particle(kind, position, velocity)
    }

    /// Adds one molecule with the configured gravity and damping.
    pub fn add_particle(&self, kind: MoleculeKind, position: DVec3, velocity: DVec3) -> ParticleId {
        let mut obj = SimulationObject::molecule(kind);
        obj.particle.position = position;
        obj.particle.velocity = velocity;
        obj.particle.acceleration = self.config.gravity();
        obj.particle.damping = self.config.damping;
        self.store.push_back(obj)
    }

    /// Adds an N2 and an O2 molecule at rest at random positions.
    pub fn add_pair(&self, rng: &mut impl Rng) -> (ParticleId, ParticleId) {
        let n2 = self.place_molecule(MoleculeKind::N2, DVec3::ZERO, rng);
        let o2 = self.place_molecule(MoleculeKind::O2, DVec3::ZERO, rng);
        (n2, o2)
    }

    /// Removes the most recently added molecule.
    ///
    /// ### Returns
    /// `false` if the store was already empty.
    pub fn remove_last_particle(&self) -> bool {
        self.store.pop_back().is_some()
    }

    /// Removes the two most recently added molecules, as long as more than
    /// two remain.
    pub fn remove_pair(&self) -> bool {
        if self.store.len() <= 2 {
            return false;
        }
        self.remove_last_particle() && self.remove_last_particle()
    }

    /// Scales the velocity of every energy-sensitive molecule.
    ///
    /// ### Returns
    /// The number of molecules affected.
    pub fn set_energy_factor(&self, factor: f64) -> usize {
        self.collider.change_energy(factor)
    }

    pub fn heat(&self) -> usize {
        self.set_energy_factor(HEAT_FACTOR)
    }

    pub fn cool(&self) -> usize {
        self.set_energy_factor(COOL_FACTOR)
    }

    pub fn collisions_since_last_call(&self) -> u64 {
        self.collider.collisions_since_last_call()
    }

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Total kinetic energy of all molecules.
    pub fn kinetic_energy(&self) -> f64 {
        let mut energy = 0.0;
        self.store.inspect(|obj, _| {
            energy += obj.particle.kinetic_energy();
            false
        });
        energy
    }

    /// Hands every `render_stride`-th molecule to `draw`, in store order,
    /// under the store lock.
    ///
    /// ### Returns
    /// The number of items handed out.
    pub fn for_each_visual<F>(&self, mut draw: F) -> usize
    where
        F: FnMut(RenderItem),
    {
        let stride = self.config.render_stride.max(1);
        let mut drawn = 0;
        self.store.inspect(|obj, id| {
            if (id + 1) % stride == 0 {
                draw(RenderItem::from(obj));
                drawn += 1;
            }
            false
        });
        drawn
    }

    fn random_velocity(&self, rng: &mut impl Rng) -> DVec3 {
        let range = self.config.velocity_range;
        DVec3::new(
            rng.random_range(-range..=range),
            rng.random_range(-range..=range),
            0.0,
        )
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("simulation shutdown: {e}");
        }
    }
}
