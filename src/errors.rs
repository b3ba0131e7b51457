//! Shared error types used across submodules.

use thiserror::Error;

use crate::circuits::block::BlockId;
use crate::circuits::component::ComponentKind;
use crate::simulation::SimulationError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Wraps oscilloscope and waveform errors.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// Raised when a component kind tag is not one of R, L, C or G.
    #[error("invalid component kind: {0:?}")]
    InvalidComponentKind(String),
    /// Raised when a unit does not belong to the component kind.
    #[error("unit {unit:?} is not valid for {kind}")]
    InvalidUnit {
        /// Kind the unit was offered for.
        kind: ComponentKind,
        /// Offending unit symbol.
        unit: String,
    },
    /// Raised when a component value is negative or not finite.
    #[error("component value must be a non-negative number, got {0}")]
    InvalidValue(f64),
    /// Raised when a component removal index is past the end of its list.
    #[error("no {kind} at index {index} (block holds {len})")]
    IndexOutOfRange {
        /// Kind of the list addressed.
        kind: ComponentKind,
        /// Requested index.
        index: usize,
        /// Length of the list.
        len: usize,
    },
    /// Raised when a block id is not part of the topology.
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),
    /// Raised when a session has no topology by that name.
    #[error("topology not found: {0}")]
    TopologyNotFound(String),
    /// Raised when sweep bounds cannot be log-spaced.
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    /// Raised when reading or writing files fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Raised when a configuration file cannot be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, FilterError>;
