//! The block registry: a name-keyed arena of blocks.
//!
//! Blocks live in a `StableDiGraph` so indices survive removal; edges go
//! from a block's local parent to the block. Insertion order is kept
//! separately and drives iteration, `find(i)` and resolution order.

use crate::block::Block;
use crate::error::LayoutError;
use crate::geometry::Rect;
use crate::id::BlockId;
use crate::model::{Align, AlignKey, BlockLayout};
use crate::units::Bounds;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Blocks {
    graph: StableDiGraph<Block, ()>,
    index: HashMap<BlockId, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl Blocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, name: BlockId) -> Option<&Block> {
        self.index.get(&name).map(|idx| &self.graph[*idx])
    }

    pub fn get_mut(&mut self, name: BlockId) -> Option<&mut Block> {
        self.index
            .get(&name)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Like `get_mut`, but an absent block is an error.
    pub fn require_mut(&mut self, name: BlockId) -> Result<&mut Block, LayoutError> {
        self.get_mut(name)
            .ok_or_else(|| LayoutError::unknown_block(name))
    }

    pub fn contains(&self, name: BlockId) -> bool {
        self.index.contains_key(&name)
    }

    /// The `i`-th block in insertion order.
    pub fn find(&self, i: usize) -> Option<&Block> {
        self.order.get(i).map(|idx| &self.graph[*idx])
    }

    /// Insertion position of a block.
    pub fn position(&self, name: BlockId) -> Option<usize> {
        let idx = self.index.get(&name)?;
        self.order.iter().position(|i| i == idx)
    }

    /// All blocks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.order.iter().map(|idx| &self.graph[*idx])
    }

    pub fn names(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.iter().map(Block::name)
    }

    /// Blocks on `layer`, in insertion order.
    pub fn layers(&self, layer: i32) -> impl Iterator<Item = &Block> + '_ {
        self.iter().filter(move |b| b.layer == layer)
    }

    // ─── Create / update ─────────────────────────────────────────────────

    /// Create or update the block named by `layout`.
    ///
    /// The new layout is resolved first; on error the registry is
    /// left untouched. Updates keep insertion position, z-index, visibility
    /// and metadata.
    pub fn set(&mut self, layout: &BlockLayout, bounds: &Bounds) -> Result<BlockId, LayoutError> {
        let target = layout.align.as_ref().and_then(|a| self.align_target(a));

        match self.index.get(&layout.name).copied() {
            Some(idx) => {
                let mut updated = self.graph[idx].clone();
                updated.update_layout(layout);
                updated.resolve(bounds, target)?;
                self.graph[idx] = updated;
            }
            None => {
                let mut block = Block::new(layout);
                block.resolve(bounds, target)?;
                let idx = self.graph.add_node(block);
                self.index.insert(layout.name, idx);
                self.order.push(idx);
                log::debug!("created block {}", layout.name);
            }
        }
        Ok(layout.name)
    }

    // ─── Resolution ──────────────────────────────────────────────────────

    /// Current rect of the block an alignment points at.
    pub fn align_target(&self, align: &Align) -> Option<Rect> {
        self.target_index(align).map(|idx| self.graph[idx].rect())
    }

    fn target_for(&self, name: BlockId) -> Result<Option<Rect>, LayoutError> {
        let block = self.get(name).ok_or_else(|| LayoutError::unknown_block(name))?;
        Ok(block.align().and_then(|a| self.align_target(a)))
    }

    pub fn resolve_one(&mut self, name: BlockId, bounds: &Bounds) -> Result<Rect, LayoutError> {
        let target = self.target_for(name)?;
        self.require_mut(name)?.resolve(bounds, target)
    }

    fn target_index(&self, align: &Align) -> Option<NodeIndex> {
        match align.key {
            AlignKey::Name(name) => self.index.get(&name).copied(),
            AlignKey::Index(i) => self.order.get(i).copied(),
        }
    }

    /// Re-resolve every block: unaligned blocks first, then aligned ones,
    /// each group in insertion order. Aligned blocks see the freshly
    /// computed rects of their targets.
    ///
    /// Nothing is committed until every rect has been computed, so an error
    /// leaves all blocks as they were.
    pub fn resolve_all(&mut self, bounds: &Bounds) -> Result<(), LayoutError> {
        let (aligned, free): (Vec<NodeIndex>, Vec<NodeIndex>) = self
            .order
            .iter()
            .copied()
            .partition(|idx| self.graph[*idx].align().is_some());

        let mut pending: HashMap<NodeIndex, Rect> = HashMap::with_capacity(self.order.len());
        for idx in free {
            pending.insert(idx, self.graph[idx].compute(bounds, None)?);
        }
        for idx in aligned {
            let block = &self.graph[idx];
            let target = block
                .align()
                .and_then(|a| self.target_index(a))
                .map(|t| pending.get(&t).copied().unwrap_or(self.graph[t].rect()));
            pending.insert(idx, block.compute(bounds, target)?);
        }

        for (idx, rect) in pending {
            self.graph[idx].set_rect(rect);
            log::trace!("resolved {} -> {rect:?}", self.graph[idx].name());
        }
        Ok(())
    }

    /// Move a block to `rect`, rewriting its location.
    pub fn apply_rect(&mut self, name: BlockId, rect: Rect, bounds: &Bounds) -> Result<(), LayoutError> {
        let target = self.target_for(name)?;
        self.require_mut(name)?.apply_rect(rect, bounds, target)
    }

    // ─── Local parents ───────────────────────────────────────────────────

    /// Set (or with `None`, clear) the container a block is dragged within.
    pub fn set_local_parent(&mut self, child: BlockId, parent: Option<BlockId>) -> Result<(), LayoutError> {
        let child_idx = *self
            .index
            .get(&child)
            .ok_or_else(|| LayoutError::unknown_block(child))?;

        let parent_idx = match parent {
            Some(p) => Some(
                *self
                    .index
                    .get(&p)
                    .ok_or_else(|| LayoutError::unknown_block(p))?,
            ),
            None => None,
        };

        if let Some(old) = self.parent_index(child_idx)
            && let Some(edge) = self.graph.find_edge(old, child_idx)
        {
            self.graph.remove_edge(edge);
        }
        if let Some(p) = parent_idx {
            self.graph.add_edge(p, child_idx, ());
        }
        Ok(())
    }

    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    pub fn local_parent(&self, name: BlockId) -> Option<BlockId> {
        let idx = self.index.get(&name)?;
        self.parent_index(*idx).map(|p| self.graph[p].name())
    }

    /// Blocks whose local parent is `name`, in insertion order.
    pub fn children(&self, name: BlockId) -> Vec<BlockId> {
        let Some(idx) = self.index.get(&name) else {
            return Vec::new();
        };
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(*idx, Direction::Outgoing)
            .collect();
        children.sort_by_key(|c| self.order.iter().position(|o| o == c));
        children.into_iter().map(|c| self.graph[c].name()).collect()
    }

    /// Drop every block.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
        self.order.clear();
    }
}
