//! Editor session state: the named topologies and the block counter.

use tracing::debug;

use crate::circuits::block::BlockId;
use crate::circuits::topology::{default_topologies, FilterTopology};
use crate::errors::{FilterError, Result};

/// State owned by one editing session and passed to every command handler.
#[derive(Debug, Clone)]
pub struct Session {
    topologies: Vec<FilterTopology>,
    current: usize,
    block_counter: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session over the default presets with `Custom` selected.
    #[must_use]
    pub fn new() -> Self {
        Self::with_topologies(default_topologies())
    }

    /// Session over the given topologies (an empty list gets a `Custom` one).
    #[must_use]
    pub fn with_topologies(mut topologies: Vec<FilterTopology>) -> Self {
        if topologies.is_empty() {
            topologies.push(FilterTopology::new("Custom"));
        }
        let block_counter = topologies[0].root_ids().len();
        Self {
            topologies,
            current: 0,
            block_counter,
        }
    }

    /// Names of every topology in the session.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.topologies.iter().map(FilterTopology::name)
    }

    /// Switches the active topology and resets the block counter to its
    /// number of top-level blocks.
    pub fn select(&mut self, name: &str) -> Result<()> {
        let idx = self
            .topologies
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| FilterError::TopologyNotFound(name.to_string()))?;
        if idx != self.current {
            self.current = idx;
            self.block_counter = self.topologies[idx].root_ids().len();
            debug!(topology = name, block_counter = self.block_counter, "selected topology");
        }
        Ok(())
    }

    /// Active topology.
    #[must_use]
    pub fn current(&self) -> &FilterTopology {
        &self.topologies[self.current]
    }

    /// Active topology for mutation.
    pub fn current_mut(&mut self) -> &mut FilterTopology {
        &mut self.topologies[self.current]
    }

    /// Position the next added block will take.
    #[must_use]
    pub fn block_counter(&self) -> usize {
        self.block_counter
    }

    /// Default name offered for the next block.
    #[must_use]
    pub fn next_block_name(&self) -> String {
        format!("Block {}", self.block_counter + 1)
    }

    /// Adds a block to the active topology, at top level or under `parent`,
    /// positioned by the block counter.
    pub fn add_block(&mut self, name: impl Into<String>, parent: Option<BlockId>) -> Result<BlockId> {
        let position = self.block_counter;
        let topology = &mut self.topologies[self.current];
        let id = match parent {
            None => topology.add_block(name, position),
            Some(parent) => topology.add_sub_block(parent, name, position)?,
        };
        self.block_counter += 1;
        Ok(id)
    }

    /// Removes a block anywhere in the active topology and decrements the
    /// block counter.
    pub fn remove_block(&mut self, id: BlockId) -> Result<()> {
        self.topologies[self.current].remove_any(id)?;
        self.block_counter = self.block_counter.saturating_sub(1);
        Ok(())
    }

    /// Compiles the active topology.
    pub fn netlist(&mut self) -> String {
        self.current_mut().generate_netlist().to_string()
    }
}
