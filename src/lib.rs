#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Numeric constants and unit conversions.
pub mod constants;
/// Shared scalar aliases and helpers.
pub mod math;
/// Filter topologies, netlists and two-port networks.
pub mod circuits;
/// Frequency grids and Bode helpers.
pub mod sweep;
/// Waveforms and the oscilloscope loop.
pub mod simulation;
/// TOML configuration.
pub mod config;
/// Editor session state.
pub mod session;
/// Error types shared between modules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
