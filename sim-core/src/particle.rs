use crate::error::{Error, Result};
use glam::DVec3;

/// Point-mass physical state advanced by the integrator.
///
/// The simulation is planar; `z` is carried and integrated like the other
/// components but never read by boundary or collision logic.
///
/// An `inverse_mass` of `0.0` means the particle has no assigned mass and
/// is skipped by [`Particle::integrate`]. The field is never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Constant external acceleration (gravity).
    pub acceleration: DVec3,
    /// Forces added since the last integration; cleared by each step.
    pub force_accum: DVec3,
    inverse_mass: f64,
    /// Fraction of velocity retained per second, in `(0, 1]`.
    pub damping: f64,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            force_accum: DVec3::ZERO,
            inverse_mass: 0.0,
            damping: 1.0,
        }
    }
}

impl Particle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero state with a preset, known-positive mass.
    pub(crate) fn with_mass(mass: f64) -> Self {
        debug_assert!(mass > 0.0);
        Self {
            inverse_mass: 1.0 / mass,
            ..Self::default()
        }
    }

    /// Advances the particle by `duration` seconds.
    ///
    /// Position is advanced with the current velocity, then velocity is
    /// advanced with `acceleration + force_accum * inverse_mass` and decayed
    /// by `damping ^ duration`. The force accumulator is cleared afterwards.
    ///
    /// Nothing happens (the accumulator included) when the particle has no
    /// mass or when `duration <= 0`.
    ///
    /// ### Parameters
    /// - `duration` - Elapsed simulated time in seconds.
    pub fn integrate(&mut self, duration: f64) {
        if self.inverse_mass <= 0.0 || duration <= 0.0 {
            return;
        }

        self.position += self.velocity * duration;

        let resulting_acc = self.acceleration + self.force_accum * self.inverse_mass;
        self.velocity += resulting_acc * duration;
        self.velocity *= self.damping.powf(duration);

        self.clear_accumulator();
    }

    /// Sets the mass, storing its reciprocal.
    ///
    /// ### Errors
    /// [`Error::InvalidMass`] if `mass` is zero, negative or NaN. An
    /// infinite mass is accepted and makes the particle immovable.
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        if mass.is_nan() || mass <= 0.0 {
            return Err(Error::InvalidMass);
        }
        self.inverse_mass = 1.0 / mass;
        Ok(())
    }

    /// Returns the mass, or `f64::MAX` when no mass has been assigned.
    pub fn mass(&self) -> f64 {
        if self.inverse_mass == 0.0 {
            f64::MAX
        } else {
            1.0 / self.inverse_mass
        }
    }

    /// ### Errors
    /// [`Error::InvalidMass`] if `inverse_mass` is negative or NaN.
    pub fn set_inverse_mass(&mut self, inverse_mass: f64) -> Result<()> {
        if inverse_mass.is_nan() || inverse_mass < 0.0 {
            return Err(Error::InvalidMass);
        }
        self.inverse_mass = inverse_mass;
        Ok(())
    }

    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    #[inline]
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    #[inline]
    pub fn add_force(&mut self, force: DVec3) {
        self.force_accum += force;
    }

    #[inline]
    pub fn clear_accumulator(&mut self) {
        self.force_accum = DVec3::ZERO;
    }

    /// 1/2 m |v|^2, or `0.0` for a particle without mass.
    pub fn kinetic_energy(&self) -> f64 {
        if self.has_finite_mass() {
            0.5 * self.mass() * self.velocity.length_squared()
        } else {
            0.0
        }
    }

    /// m v, or zero for a particle without mass.
    pub fn momentum(&self) -> DVec3 {
        if self.has_finite_mass() {
            self.velocity * self.mass()
        } else {
            DVec3::ZERO
        }
    }
}
