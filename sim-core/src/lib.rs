//! Concurrent 2-D molecule collision simulation core.
//!
//! Main components:
//! - [`particle`] — point-mass state and its integration step.
//! - [`molecule`] — molecule kinds and the stored simulation object.
//! - [`store`] — lock-protected arena shared by all threads.
//! - [`stop`] — cooperative cancellation signal.
//! - [`engine`] — periodic loop driver and engine thread handles.
//! - [`integrator`] — kinematic integration and wall reflection.
//! - [`collision`] — budgeted overlap sweep and elastic response.
//! - [`simulation`] — controller-facing facade over all of the above.
//! - [`config`] — per-run numeric parameters.
//! - [`error`] — crate-wide error type.
//! - [`types`] — shared type aliases and small value types.

pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod molecule;
pub mod particle;
pub mod simulation;
pub mod stop;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use molecule::{MoleculeKind, Sensitivity, SimulationObject};
pub use simulation::{RenderItem, Simulation};
