//! TOML configuration for analyses and topologies.
//!
//! ```toml
//! [input]
//! resistance = { enabled = true, value = 1000.0 }
//!
//! [output]
//! capacitance = { enabled = true, value = 1.0 }
//!
//! [sweep]
//! min_hz = 1.0
//! max_hz = 100000.0
//!
//! [scope]
//! frequency_hz = 159.0
//! max_frames = 20
//! ```
//!
//! Topologies are described as nested blocks:
//!
//! ```toml
//! name = "Ladder Network"
//!
//! [[blocks]]
//! name = "Stage 1"
//! components = [{ kind = "R", value = 100.0, unit = "Ω" }, { kind = "G" }]
//!
//! [[blocks.children]]
//! name = "Stage 1a"
//! components = [{ kind = "C", value = 10.0, unit = "nF" }]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::circuits::analysis::TwoPortModel;
use crate::circuits::block::BlockId;
use crate::circuits::network::RlcNetwork;
use crate::circuits::topology::FilterTopology;
use crate::errors::Result;
use crate::math::Scalar;
use crate::simulation::ScopeConfig;

/// Root analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Series network.
    #[serde(default)]
    pub input: RlcNetwork,
    /// Shunt network.
    #[serde(default)]
    pub output: RlcNetwork,
    /// Frequency-response bounds.
    #[serde(default)]
    pub sweep: SweepSection,
    /// Oscilloscope settings.
    #[serde(default)]
    pub scope: ScopeSection,
}

/// `[sweep]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSection {
    /// Lower bound in Hz.
    #[serde(default = "default_min_hz")]
    pub min_hz: Scalar,
    /// Upper bound in Hz.
    #[serde(default = "default_max_hz")]
    pub max_hz: Scalar,
}

fn default_min_hz() -> Scalar {
    1.0
}

fn default_max_hz() -> Scalar {
    100_000.0
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            min_hz: default_min_hz(),
            max_hz: default_max_hz(),
        }
    }
}

/// `[scope]` table; durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSection {
    /// Source frequency in Hz.
    pub frequency_hz: Scalar,
    /// Peak amplitude in volts.
    pub amplitude: Scalar,
    /// Visible window in seconds.
    pub time_window: Scalar,
    /// Samples per trace.
    pub samples: usize,
    /// Delay between frames.
    pub update_interval_ms: u64,
    /// Frame bound.
    pub max_frames: Option<usize>,
    /// Wall-clock bound.
    pub max_duration_ms: Option<u64>,
}

impl Default for ScopeSection {
    fn default() -> Self {
        let scope = ScopeConfig::default();
        Self {
            frequency_hz: scope.frequency_hz,
            amplitude: scope.amplitude,
            time_window: scope.time_window,
            samples: scope.samples,
            update_interval_ms: scope.update_interval.as_millis() as u64,
            max_frames: scope.max_frames,
            max_duration_ms: None,
        }
    }
}

impl From<ScopeSection> for ScopeConfig {
    fn from(s: ScopeSection) -> Self {
        Self {
            frequency_hz: s.frequency_hz,
            amplitude: s.amplitude,
            time_window: s.time_window,
            samples: s.samples,
            update_interval: Duration::from_millis(s.update_interval_ms),
            max_frames: s.max_frames,
            max_duration: s.max_duration_ms.map(Duration::from_millis),
        }
    }
}

impl AnalysisConfig {
    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Two-port model described by `[input]` and `[output]`.
    #[must_use]
    pub fn model(&self) -> TwoPortModel {
        TwoPortModel::new(self.input, self.output)
    }
}

/// Serialized topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Topology name.
    pub name: String,
    /// Top-level blocks.
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// Serialized block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Block name.
    pub name: String,
    /// Explicit position; defaults to the index in the list.
    #[serde(default)]
    pub position: Option<usize>,
    /// Components in declaration order.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
    /// Nested blocks.
    #[serde(default)]
    pub children: Vec<BlockConfig>,
}

/// Serialized component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Kind tag (`R`, `L`, `C`, `G` or the full name).
    pub kind: String,
    /// Value in `unit`.
    #[serde(default)]
    pub value: Scalar,
    /// Unit symbol.
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    String::from("-")
}

impl TopologyConfig {
    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Builds the topology through the block and component mutation API.
    pub fn build(&self) -> Result<FilterTopology> {
        let mut topology = FilterTopology::new(&self.name);
        for (idx, block) in self.blocks.iter().enumerate() {
            let id = topology.add_block(&block.name, block.position.unwrap_or(idx));
            populate(&mut topology, id, block)?;
        }
        Ok(topology)
    }
}

fn populate(topology: &mut FilterTopology, id: BlockId, block: &BlockConfig) -> Result<()> {
    for component in &block.components {
        topology.add_component_tagged(id, &component.kind, component.value, &component.unit)?;
    }
    for (idx, child) in block.children.iter().enumerate() {
        let child_id = topology.add_sub_block(id, &child.name, child.position.unwrap_or(idx))?;
        populate(topology, child_id, child)?;
    }
    Ok(())
}
