//! SPICE-like netlist compilation for filter topologies.
//!
//! Node 1 is the topology input. Components directly inside a block share the
//! block's entry node and each get a fresh exit node; child blocks and sibling
//! top-level blocks are chained in series. Node 0 is ground.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use tracing::{debug, info_span};

use crate::math::Scalar;

use super::block::{BlockId, FilterBlock};
use super::component::{format_value, ComponentKind, Unit};
use super::topology::FilterTopology;

/// Node every compilation starts from.
pub const INPUT_NODE: usize = 1;

/// One emitted netlist line.
#[derive(Debug, Clone, PartialEq)]
pub enum NetlistEntry {
    /// Two-terminal R, L or C element.
    Element {
        /// Component kind.
        kind: ComponentKind,
        /// Global line label.
        index: usize,
        /// Entry node.
        node1: usize,
        /// Exit node.
        node2: usize,
        /// Value in `unit`.
        value: Scalar,
        /// Unit tag.
        unit: Unit,
    },
    /// Ground reference tied to `node`.
    Ground {
        /// Global line label.
        index: usize,
        /// Referenced node.
        node: usize,
    },
}

impl fmt::Display for NetlistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { kind, index, node1, node2, value, unit } => write!(
                f,
                "{}{} {} {} {}{}",
                kind.letter(),
                index,
                node1,
                node2,
                format_value(*value),
                unit
            ),
            Self::Ground { index, node } => write!(f, "V{index} {node} 0 GND"),
        }
    }
}

/// Compiled netlist: a title plus ordered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Netlist {
    title: String,
    entries: Vec<NetlistEntry>,
    output_node: usize,
}

impl Netlist {
    /// Topology name the netlist was built from.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Entries in emission order.
    #[must_use]
    pub fn entries(&self) -> &[NetlistEntry] {
        &self.entries
    }

    /// Node the last block in the chain ends on.
    #[must_use]
    pub fn output_node(&self) -> usize {
        self.output_node
    }

    /// Number of entry lines (header excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no component lines were emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "* Netlist for {}", self.title)?;
        for entry in &self.entries {
            write!(f, "\n{entry}")?;
        }
        Ok(())
    }
}

/// Writes the netlist text (newline terminated), e.g. to a `.sp` file.
pub fn write_netlist<W: Write>(mut w: W, netlist: &Netlist) -> io::Result<()> {
    writeln!(w, "{netlist}")
}

struct Compiler<'a> {
    blocks: &'a mut BTreeMap<BlockId, FilterBlock>,
    node_counter: &'a mut usize,
    entries: Vec<NetlistEntry>,
    line: usize,
}

impl Compiler<'_> {
    fn compile_block(&mut self, id: BlockId, input_node: usize) -> usize {
        let Some(block) = self.blocks.get_mut(&id) else {
            return input_node;
        };
        block.start_node = input_node;

        let mut end_node = input_node;
        let mut emitted = Vec::new();
        for component in block.iter_components_mut() {
            let index = self.line;
            self.line += 1;
            if component.kind().is_branch() {
                *self.node_counter += 1;
                let node2 = *self.node_counter;
                component.node1 = input_node;
                component.node2 = node2;
                end_node = end_node.max(node2);
                emitted.push(NetlistEntry::Element {
                    kind: component.kind(),
                    index,
                    node1: input_node,
                    node2,
                    value: component.value(),
                    unit: component.unit(),
                });
            } else {
                component.node1 = input_node;
                component.node2 = 0;
                emitted.push(NetlistEntry::Ground { index, node: input_node });
            }
        }
        block.end_node = end_node;
        let children = block.children.clone();
        debug!(block = %id, input_node, end_node, lines = emitted.len(), "compiled block");
        self.entries.extend(emitted);

        let mut current = end_node;
        for child in children {
            current = self.compile_block(child, current);
        }
        current
    }
}

impl FilterTopology {
    /// Assigns node numbers to every block and component and returns the netlist.
    ///
    /// The node counter is reset on each call, so compiling an unchanged
    /// topology twice yields identical output.
    pub fn generate_netlist(&mut self) -> Netlist {
        let _span = info_span!("generate_netlist", topology = %self.name(), blocks = self.len()).entered();
        self.node_counter = INPUT_NODE;
        let roots = self.roots.clone();
        let mut compiler = Compiler {
            blocks: &mut self.blocks,
            node_counter: &mut self.node_counter,
            entries: Vec::new(),
            line: 1,
        };
        let mut current = INPUT_NODE;
        for root in roots {
            current = compiler.compile_block(root, current);
        }
        let entries = compiler.entries;
        Netlist {
            title: self.name().to_string(),
            entries,
            output_node: current,
        }
    }
}
