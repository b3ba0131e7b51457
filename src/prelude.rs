//! Convenience re-exports for building and analysing filters.

pub use crate::circuits::{
    analysis::{write_frequency_response_csv, FrequencyPoint, FrequencyResponse, TwoPortModel},
    block::{BlockId, FilterBlock},
    component::{Component, ComponentKind, Unit},
    diagram::to_dot,
    netlist::{write_netlist, Netlist, NetlistEntry},
    network::{Branch, RlcNetwork},
    topology::{default_topologies, FilterTopology},
    twoport::transfer_function,
};
pub use crate::config::{AnalysisConfig, TopologyConfig};
pub use crate::constants::*;
pub use crate::errors::{FilterError, Result};
pub use crate::math::{CScalar, Scalar};
pub use crate::session::Session;
pub use crate::simulation::{
    sine_wave, CancelToken, Clock, ManualClock, Oscilloscope, ScopeConfig, ScopeFrame, ScopeReport,
    SimulationError, StopReason, SystemClock,
};
pub use crate::sweep::{bode, linspace, logspace_hz, mag_db, phase_deg, sweep_map};
