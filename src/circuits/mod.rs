//! Filter topologies, netlists and the two-port RLC evaluator.

/// Two-port frequency analysis.
pub mod analysis;
/// Filter blocks and their identities.
pub mod block;
/// Leaf component kinds, units and values.
pub mod component;
/// Graphviz block diagrams.
pub mod diagram;
/// Netlist compilation and export.
pub mod netlist;
/// Switchable parallel RLC networks.
pub mod network;
/// Block tree container.
pub mod topology;
/// Divider transfer function.
pub mod twoport;

pub use analysis::{FrequencyPoint, FrequencyResponse, TwoPortModel};
pub use block::{BlockId, FilterBlock};
pub use component::{Component, ComponentKind, Unit};
pub use netlist::{Netlist, NetlistEntry};
pub use network::{Branch, RlcNetwork};
pub use topology::FilterTopology;
pub use twoport::transfer_function;
