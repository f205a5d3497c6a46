use crate::error::{Error, Result};
use glam::DVec3;
use std::time::Duration;

/// Standard gravity in arena units per second squared.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Per-run parameters consumed by the engines and the controller.
///
/// The value is copied into each engine when it is built and never read
/// back, so changing a `Config` after `Simulation::new` has no effect on a
/// running simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Arena extent along x; positions are kept in `[0, arena_width]`.
    pub arena_width: f64,
    /// Arena extent along y; y grows downward.
    pub arena_height: f64,
    /// Target time between two integration ticks, in milliseconds.
    pub integration_interval_ms: u64,
    /// Target time between two collision sweeps, in milliseconds.
    pub collision_interval_ms: u64,
    /// Maximum number of pair comparisons in one collision sweep.
    pub collision_budget: u64,
    /// Velocity retained per second, in `(0, 1]`.
    pub damping: f64,
    /// Multiplier on [`STANDARD_GRAVITY`]; `0.0` disables gravity.
    pub gravity_factor: f64,
    /// Initial velocity components are drawn from `[-range, range]`.
    pub velocity_range: f64,
    /// Number of molecules placed by `Simulation::populate`.
    pub particle_count: usize,
    /// Frames per second the front end aims for.
    pub fps: u32,
    /// Render every n-th molecule; `1` draws all of them.
    pub render_stride: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            integration_interval_ms: 1,
            collision_interval_ms: 5,
            collision_budget: 2_000_000,
            damping: 1.0,
            gravity_factor: 1.0,
            velocity_range: 50.0,
            particle_count: 300,
            fps: 60,
            render_stride: 1,
        }
    }
}

impl Config {
    /// Checks the numeric contract once, at the controller boundary.
    ///
    /// ### Errors
    /// [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(Error::InvalidConfig(msg.to_string()))
        }

        if !(self.arena_width.is_finite() && self.arena_width > 0.0) {
            return invalid("arena_width must be finite and > 0");
        }
        if !(self.arena_height.is_finite() && self.arena_height > 0.0) {
            return invalid("arena_height must be finite and > 0");
        }
        if self.integration_interval_ms == 0 {
            return invalid("integration_interval_ms must be >= 1");
        }
        if self.collision_interval_ms == 0 {
            return invalid("collision_interval_ms must be >= 1");
        }
        if self.collision_budget == 0 {
            return invalid("collision_budget must be >= 1");
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return invalid("damping must be in (0, 1]");
        }
        if !self.gravity_factor.is_finite() {
            return invalid("gravity_factor must be finite");
        }
        if !(self.velocity_range.is_finite() && self.velocity_range >= 0.0) {
            return invalid("velocity_range must be finite and >= 0");
        }
        if self.fps == 0 {
            return invalid("fps must be >= 1");
        }
        if self.render_stride == 0 {
            return invalid("render_stride must be >= 1");
        }
        Ok(())
    }

    pub fn integration_interval(&self) -> Duration {
        Duration::from_millis(self.integration_interval_ms)
    }

    pub fn collision_interval(&self) -> Duration {
        Duration::from_millis(self.collision_interval_ms)
    }

    /// Target duration of one rendered frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    /// Constant acceleration applied to every placed molecule.
    pub fn gravity(&self) -> DVec3 {
        DVec3::new(0.0, STANDARD_GRAVITY * self.gravity_factor, 0.0)
    }
}
