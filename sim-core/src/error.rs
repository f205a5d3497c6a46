use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures the simulation core reports to its controller.
///
/// Per-pair anomalies inside a collision sweep (coincident positions,
/// non-finite intermediates) are recovered locally and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// A mass of exactly zero was assigned to a particle.
    #[error("invalid mass: mass must be non-zero")]
    InvalidMass,

    /// A configuration value is outside the numeric contract.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start an engine thread.
    #[error("failed to spawn engine thread")]
    Spawn(#[from] std::io::Error),

    /// An engine thread panicked before it could be joined.
    #[error("engine `{0}` panicked")]
    EnginePanicked(&'static str),
}
