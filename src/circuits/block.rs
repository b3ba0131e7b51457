//! Named containers that group components inside a filter topology.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{FilterError, Result};
use crate::math::Scalar;

use super::component::{Component, ComponentKind, Unit};

/// Stable identity of a block within its topology.
///
/// Ids come from a per-topology counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) u64);

impl BlockId {
    /// Raw counter value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block_{}", self.0)
    }
}

/// A node of the topology tree.
///
/// Children are stored as ids into the owning [`FilterTopology`](super::topology::FilterTopology),
/// which keeps them sorted by `position`.
#[derive(Debug, Clone)]
pub struct FilterBlock {
    id: BlockId,
    name: String,
    pub(crate) position: usize,
    pub(crate) parent: Option<BlockId>,
    components: BTreeMap<ComponentKind, Vec<Component>>,
    pub(crate) children: Vec<BlockId>,
    pub(crate) start_node: usize,
    pub(crate) end_node: usize,
}

impl FilterBlock {
    pub(crate) fn new(id: BlockId, name: impl Into<String>, position: usize) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            parent: None,
            components: ComponentKind::ALL.iter().map(|&k| (k, Vec::new())).collect(),
            children: Vec::new(),
            start_node: 0,
            end_node: 0,
        }
    }

    /// Block id.
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sibling order key.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Id of the parent block, `None` for top-level blocks.
    #[must_use]
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    /// Child ids in position order.
    #[must_use]
    pub fn children(&self) -> &[BlockId] {
        &self.children
    }

    /// Entry node from the last netlist compilation.
    #[must_use]
    pub fn start_node(&self) -> usize {
        self.start_node
    }

    /// Exit node of the block's own parallel section from the last compilation.
    #[must_use]
    pub fn end_node(&self) -> usize {
        self.end_node
    }

    /// Appends a component and returns its index within its kind.
    pub fn add_component(&mut self, kind: ComponentKind, value: Scalar, unit: Unit) -> Result<usize> {
        let component = if kind == ComponentKind::Ground {
            Component::ground()
        } else {
            Component::new(kind, value, unit)?
        };
        let list = self.components.entry(kind).or_default();
        list.push(component);
        Ok(list.len() - 1)
    }

    /// Removes the component at `index` of the `kind` list.
    pub fn remove_component(&mut self, kind: ComponentKind, index: usize) -> Result<Component> {
        let list = self.components.entry(kind).or_default();
        if index >= list.len() {
            return Err(FilterError::IndexOutOfRange {
                kind,
                index,
                len: list.len(),
            });
        }
        Ok(list.remove(index))
    }

    /// Components of one kind in insertion order.
    #[must_use]
    pub fn components(&self, kind: ComponentKind) -> &[Component] {
        self.components.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// All components grouped by kind (C, L, R, G), each group in insertion order.
    pub fn iter_components(&self) -> impl Iterator<Item = &Component> {
        self.components.values().flatten()
    }

    pub(crate) fn iter_components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.values_mut().flatten()
    }

    /// Total number of components of every kind.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    /// True when the block holds at least one non-ground component.
    #[must_use]
    pub fn has_branches(&self) -> bool {
        self.iter_components().any(|c| c.kind().is_branch())
    }
}
