//! Tree of filter blocks stored in an id-addressed arena.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{FilterError, Result};
use crate::math::Scalar;

use super::block::{BlockId, FilterBlock};
use super::component::{Component, ComponentKind, Unit};

/// Root container of a hierarchical filter.
#[derive(Debug, Clone)]
pub struct FilterTopology {
    name: String,
    pub(crate) blocks: BTreeMap<BlockId, FilterBlock>,
    pub(crate) roots: Vec<BlockId>,
    next_block_id: u64,
    pub(crate) node_counter: usize,
}

impl FilterTopology {
    /// Creates an empty topology.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: BTreeMap::new(),
            roots: Vec::new(),
            next_block_id: 1,
            node_counter: 1,
        }
    }

    /// Topology name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of blocks at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the topology holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level block ids in position order.
    #[must_use]
    pub fn root_ids(&self) -> &[BlockId] {
        &self.roots
    }

    /// Top-level blocks in position order.
    pub fn roots(&self) -> impl Iterator<Item = &FilterBlock> {
        self.roots.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Direct children of `id` in position order.
    pub fn children(&self, id: BlockId) -> Result<impl Iterator<Item = &FilterBlock>> {
        let block = self.block(id)?;
        Ok(block.children.iter().filter_map(|c| self.blocks.get(c)))
    }

    /// Looks up a block.
    pub fn block(&self, id: BlockId) -> Result<&FilterBlock> {
        self.blocks.get(&id).ok_or(FilterError::BlockNotFound(id))
    }

    /// Looks up a block for mutation.
    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut FilterBlock> {
        self.blocks.get_mut(&id).ok_or(FilterError::BlockNotFound(id))
    }

    /// Adds a top-level block and returns its id.
    pub fn add_block(&mut self, name: impl Into<String>, position: usize) -> BlockId {
        let id = self.allocate_id();
        self.blocks.insert(id, FilterBlock::new(id, name, position));
        self.roots.push(id);
        sort_by_position(&self.blocks, &mut self.roots);
        debug!(block = %id, position, "added top-level block");
        id
    }

    /// Adds a block under `parent` and returns its id.
    pub fn add_sub_block(&mut self, parent: BlockId, name: impl Into<String>, position: usize) -> Result<BlockId> {
        if !self.blocks.contains_key(&parent) {
            return Err(FilterError::BlockNotFound(parent));
        }
        let id = self.allocate_id();
        let mut block = FilterBlock::new(id, name, position);
        block.parent = Some(parent);
        self.blocks.insert(id, block);

        let mut children = std::mem::take(&mut self.block_mut(parent)?.children);
        children.push(id);
        sort_by_position(&self.blocks, &mut children);
        self.block_mut(parent)?.children = children;
        debug!(block = %id, parent = %parent, position, "added sub-block");
        Ok(id)
    }

    /// Removes a top-level block and its subtree, then renumbers the remaining
    /// top-level positions to `0..n`.
    pub fn remove_block(&mut self, id: BlockId) -> Result<FilterBlock> {
        if !self.roots.contains(&id) {
            return Err(FilterError::BlockNotFound(id));
        }
        self.detach(id)
    }

    /// Removes child `id` of `parent` and its subtree, then renumbers the
    /// parent's remaining children to `0..n`.
    pub fn remove_sub_block(&mut self, parent: BlockId, id: BlockId) -> Result<FilterBlock> {
        if !self.block(parent)?.children.contains(&id) {
            return Err(FilterError::BlockNotFound(id));
        }
        self.detach(id)
    }

    /// Removes a block wherever it sits in the tree.
    pub fn remove_any(&mut self, id: BlockId) -> Result<FilterBlock> {
        if !self.blocks.contains_key(&id) {
            return Err(FilterError::BlockNotFound(id));
        }
        self.detach(id)
    }

    /// Adds a component to a block.
    pub fn add_component(&mut self, block: BlockId, kind: ComponentKind, value: Scalar, unit: Unit) -> Result<usize> {
        self.block_mut(block)?.add_component(kind, value, unit)
    }

    /// Adds a component from its textual kind tag and unit symbol.
    pub fn add_component_tagged(&mut self, block: BlockId, kind: &str, value: Scalar, unit: &str) -> Result<usize> {
        let kind: ComponentKind = kind.parse()?;
        let unit = match kind {
            ComponentKind::Ground => Unit::Dimensionless,
            _ => unit.parse().map_err(|unit| FilterError::InvalidUnit { kind, unit })?,
        };
        self.add_component(block, kind, value, unit)
    }

    /// Removes a component from a block.
    pub fn remove_component(&mut self, block: BlockId, kind: ComponentKind, index: usize) -> Result<Component> {
        self.block_mut(block)?.remove_component(kind, index)
    }

    /// Pre-order listing of every block with its depth (top level is 0).
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &FilterBlock)> {
        let mut out = Vec::with_capacity(self.blocks.len());
        let mut stack: Vec<(usize, BlockId)> = self.roots.iter().rev().map(|&id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            if let Some(block) = self.blocks.get(&id) {
                out.push((depth, block));
                stack.extend(block.children.iter().rev().map(|&c| (depth + 1, c)));
            }
        }
        out
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }

    /// Detaches `id` from its owner, renumbers the siblings, drops the subtree
    /// and scrubs any stray references to removed ids.
    fn detach(&mut self, id: BlockId) -> Result<FilterBlock> {
        let parent = self.block(id)?.parent;

        let mut siblings = match parent {
            Some(p) => std::mem::take(&mut self.block_mut(p)?.children),
            None => std::mem::take(&mut self.roots),
        };
        siblings.retain(|&s| s != id);
        for (idx, sibling) in siblings.iter().enumerate() {
            if let Some(b) = self.blocks.get_mut(sibling) {
                b.position = idx;
            }
        }
        match parent {
            Some(p) => self.block_mut(p)?.children = siblings,
            None => self.roots = siblings,
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            if let Some(b) = self.blocks.get(&doomed[cursor]) {
                doomed.extend(b.children.iter().copied());
            }
            cursor += 1;
        }
        let mut removed = None;
        for gone in &doomed {
            let block = self.blocks.remove(gone);
            if *gone == id {
                removed = block;
            }
        }
        for block in self.blocks.values_mut() {
            block.children.retain(|c| !doomed.contains(c));
        }
        self.roots.retain(|c| !doomed.contains(c));

        debug!(block = %id, subtree = doomed.len(), "removed block");
        removed.ok_or(FilterError::BlockNotFound(id))
    }
}

fn sort_by_position(blocks: &BTreeMap<BlockId, FilterBlock>, ids: &mut [BlockId]) {
    ids.sort_by_key(|id| blocks.get(id).map_or(usize::MAX, FilterBlock::position));
}

/// Named empty topologies offered when a session starts.
#[must_use]
pub fn default_topologies() -> Vec<FilterTopology> {
    ["Custom", "T-Network", "Pi-Network", "Ladder Network"]
        .into_iter()
        .map(FilterTopology::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(topology: &FilterTopology, parent: BlockId) -> Vec<(String, usize)> {
        topology
            .children(parent)
            .unwrap()
            .map(|b| (b.name().to_string(), b.position()))
            .collect()
    }

    #[test]
    fn top_level_blocks_sorted_by_position() {
        let mut t = FilterTopology::new("t");
        t.add_block("second", 1);
        t.add_block("first", 0);
        let names: Vec<&str> = t.roots().map(FilterBlock::name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn sub_block_records_parent_and_sorts() {
        let mut t = FilterTopology::new("t");
        let root = t.add_block("root", 0);
        let b = t.add_sub_block(root, "b", 5).unwrap();
        let a = t.add_sub_block(root, "a", 2).unwrap();
        assert_eq!(t.block(a).unwrap().parent(), Some(root));
        assert_eq!(t.block(root).unwrap().children(), &[a, b]);
    }

    #[test]
    fn removing_middle_child_renumbers_remaining() {
        let mut t = FilterTopology::new("t");
        let root = t.add_block("root", 0);
        t.add_sub_block(root, "x", 0).unwrap();
        let middle = t.add_sub_block(root, "y", 1).unwrap();
        t.add_sub_block(root, "z", 2).unwrap();

        t.remove_sub_block(root, middle).unwrap();

        assert_eq!(
            positions(&t, root),
            vec![("x".to_string(), 0), ("z".to_string(), 1)]
        );
        assert!(t.block(middle).is_err());
    }

    #[test]
    fn removing_block_drops_its_subtree() {
        let mut t = FilterTopology::new("t");
        let root = t.add_block("root", 0);
        let child = t.add_sub_block(root, "child", 0).unwrap();
        let grandchild = t.add_sub_block(child, "grandchild", 0).unwrap();
        let other = t.add_block("other", 1);

        t.remove_block(root).unwrap();

        assert!(t.block(child).is_err());
        assert!(t.block(grandchild).is_err());
        assert_eq!(t.root_ids(), &[other]);
        assert_eq!(t.block(other).unwrap().position(), 0);
    }

    #[test]
    fn remove_sub_block_rejects_non_child() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        let b = t.add_block("b", 1);
        let err = t.remove_sub_block(a, b).unwrap_err();
        assert!(matches!(err, FilterError::BlockNotFound(id) if id == b));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn remove_any_scrubs_stray_references() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        let b = t.add_block("b", 1);
        let child = t.add_sub_block(a, "child", 0).unwrap();
        t.block_mut(b).unwrap().children.push(child);

        t.remove_any(child).unwrap();

        assert!(t.block(a).unwrap().children().is_empty());
        assert!(t.block(b).unwrap().children().is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        t.remove_block(a).unwrap();
        let b = t.add_block("b", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn tagged_component_errors() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        assert!(matches!(
            t.add_component_tagged(a, "Q", 1.0, "Ω").unwrap_err(),
            FilterError::InvalidComponentKind(_)
        ));
        assert!(matches!(
            t.add_component_tagged(a, "R", 1.0, "parsec").unwrap_err(),
            FilterError::InvalidUnit { .. }
        ));
        assert_eq!(t.add_component_tagged(a, "R", 1.0, "kΩ").unwrap(), 0);
        assert_eq!(t.block(a).unwrap().component_count(), 1);
    }

    #[test]
    fn tagged_ground_ignores_its_unit() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        assert_eq!(t.add_component_tagged(a, "G", 3.0, "volts").unwrap(), 0);
        assert_eq!(t.add_component_tagged(a, "ground", 0.0, "").unwrap(), 1);
        let grounds = t.block(a).unwrap().components(ComponentKind::Ground);
        assert!(grounds.iter().all(|g| g.unit() == Unit::Dimensionless && g.value() == 0.0));
    }

    #[test]
    fn walk_is_pre_order_with_depth() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        t.add_block("b", 1);
        let a1 = t.add_sub_block(a, "a1", 0).unwrap();
        t.add_sub_block(a1, "a1x", 0).unwrap();
        t.add_sub_block(a, "a2", 1).unwrap();

        let listing: Vec<(usize, &str)> = t.walk().into_iter().map(|(d, b)| (d, b.name())).collect();
        assert_eq!(
            listing,
            vec![(0, "a"), (1, "a1"), (2, "a1x"), (1, "a2"), (0, "b")]
        );
    }

    #[test]
    fn default_presets() {
        let names: Vec<String> = default_topologies().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["Custom", "T-Network", "Pi-Network", "Ladder Network"]);
    }
}
