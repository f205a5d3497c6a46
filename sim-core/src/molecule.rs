//! Molecule presets and the object type stored in the particle store.
//!
//! Kinds differ only in their preset data (colour, box size, mass and
//! energy sensitivity); there is no per-kind behaviour.

use crate::{particle::Particle, types::Rgba};
use glam::DVec3;

/// Atomic mass of nitrogen, the unit the preset masses are expressed in.
const NITROGEN_MASS: f64 = 14.0067;

/// Whether an object reacts to external energy injection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

/// The closed set of gas species in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoleculeKind {
    N2,
    O2,
    CO2,
}

impl MoleculeKind {
    pub const ALL: [MoleculeKind; 3] = [MoleculeKind::N2, MoleculeKind::O2, MoleculeKind::CO2];

    pub fn name(&self) -> &'static str {
        match self {
            MoleculeKind::N2 => "N2",
            MoleculeKind::O2 => "O2",
            MoleculeKind::CO2 => "CO2",
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            MoleculeKind::N2 => Rgba::new(0, 102, 153, 255),
            MoleculeKind::O2 => Rgba::new(255, 102, 52, 255),
            MoleculeKind::CO2 => Rgba::new(0, 0, 0, 255),
        }
    }

    /// Side length of the bounding square.
    pub fn size(&self) -> f64 {
        match self {
            MoleculeKind::N2 => 6.0,
            MoleculeKind::O2 => 4.0,
            MoleculeKind::CO2 => 10.0,
        }
    }

    pub fn mass(&self) -> f64 {
        match self {
            MoleculeKind::N2 => 50.0 * NITROGEN_MASS,
            MoleculeKind::O2 => 10.0 * NITROGEN_MASS,
            MoleculeKind::CO2 => 100.0 * NITROGEN_MASS,
        }
    }

    pub fn sensitivity(&self) -> Sensitivity {
        match self {
            MoleculeKind::CO2 => Sensitivity::Sensitive,
            MoleculeKind::N2 | MoleculeKind::O2 => Sensitivity::Insensitive,
        }
    }
}

/// A [`Particle`] plus the metadata needed to draw it and collide it.
///
/// The bounding box is the axis-aligned square
/// `[position, position + size]` in x and y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationObject {
    pub particle: Particle,
    pub kind: MoleculeKind,
    pub size: f64,
    pub color: Rgba,
    pub sensitivity: Sensitivity,
}

impl SimulationObject {
    /// Creates an object at the origin, at rest, with the preset data of `kind`.
    pub fn molecule(kind: MoleculeKind) -> Self {
        Self {
            particle: Particle::with_mass(kind.mass()),
            kind,
            size: kind.size(),
            color: kind.color(),
            sensitivity: kind.sensitivity(),
        }
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.particle.position
    }

    /// Returns the `(min, max)` corners of the bounding square.
    #[inline]
    pub fn bounds(&self) -> (DVec3, DVec3) {
        let min = self.particle.position;
        (min, min + DVec3::new(self.size, self.size, 0.0))
    }

    /// Closed-interval overlap test of the two bounding squares.
    ///
    /// Boxes that merely touch along an edge count as overlapping.
    pub fn overlaps(&self, other: &SimulationObject) -> bool {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
    }

    #[inline]
    pub fn is_sensitive(&self) -> bool {
        self.sensitivity == Sensitivity::Sensitive
    }
}
