//! Undo/Redo command stack.
//!
//! Every edit is recorded as a snapshot of the rects it is about to change.
//! Undo restores the snapshot and records what it overwrote on the redo
//! stack, so undo and redo are the same operation run against opposite
//! stacks.
//!
//! Drag gestures use **batching**: the rects are captured when the gesture
//! starts and pushed as a single step when it ends, and only if something
//! actually moved.

use lg_core::{BlockId, Blocks, Bounds, LayoutError, Rect};
use smallvec::SmallVec;

/// One block's rect at the time of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedRect {
    pub name: BlockId,
    pub rect: Rect,
}

/// The rects of every block touched by one edit.
pub type Snapshot = SmallVec<[SavedRect; 4]>;

/// Capture the current rect of each named block. Unknown names are skipped.
pub fn snapshot(blocks: &Blocks, names: &[BlockId]) -> Snapshot {
    names
        .iter()
        .filter_map(|n| blocks.get(*n).map(|b| SavedRect { name: *n, rect: b.rect() }))
        .collect()
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
#[derive(Debug, Default)]
pub struct CommandStack {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; `None` keeps everything.
    max_depth: Option<usize>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<Snapshot>,
}

impl CommandStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Record the state before an edit. Clears the redo stack.
    ///
    /// Inside a batch this is a no-op: the batch snapshot already covers it.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.batch_depth > 0 {
            return;
        }
        self.push_undo(snapshot);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if let Some(max) = self.max_depth
            && self.undo_stack.len() > max
        {
            self.undo_stack.remove(0);
        }
    }

    /// Start a batch group, capturing the rects of `names`.
    pub fn begin_batch(&mut self, blocks: &Blocks, names: &[BlockId]) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(snapshot(blocks, names));
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and any captured
    /// rect changed, the captured state becomes one undo step.
    pub fn end_batch(&mut self, blocks: &Blocks) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }

        let Some(before) = self.batch_snapshot.take() else {
            return;
        };
        let moved = before
            .iter()
            .any(|s| blocks.get(s.name).is_some_and(|b| b.rect() != s.rect));
        if moved {
            self.push_undo(before);
            self.redo_stack.clear();
        } else {
            log::trace!("batch closed without changes");
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Undo the last step. Returns the restored block names, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self, blocks: &mut Blocks, bounds: &Bounds) -> Result<Option<Vec<BlockId>>, LayoutError> {
        let Some(saved) = self.undo_stack.pop() else {
            return Ok(None);
        };
        let (names, previous) = restore(blocks, bounds, &saved)?;
        self.redo_stack.push(previous);
        log::debug!("undo: restored {} block(s)", names.len());
        Ok(Some(names))
    }

    /// Redo the last undone step.
    pub fn redo(&mut self, blocks: &mut Blocks, bounds: &Bounds) -> Result<Option<Vec<BlockId>>, LayoutError> {
        let Some(saved) = self.redo_stack.pop() else {
            return Ok(None);
        };
        let (names, previous) = restore(blocks, bounds, &saved)?;
        self.push_undo(previous);
        log::debug!("redo: restored {} block(s)", names.len());
        Ok(Some(names))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
    }
}

/// Write every saved rect back, returning the restored names and the rects
/// they replaced. Blocks that no longer exist are skipped.
fn restore(blocks: &mut Blocks, bounds: &Bounds, saved: &Snapshot) -> Result<(Vec<BlockId>, Snapshot), LayoutError> {
    let mut names = Vec::with_capacity(saved.len());
    let mut previous = Snapshot::new();
    for s in saved {
        let Some(block) = blocks.get(s.name) else {
            log::trace!("restore: {} no longer exists", s.name);
            continue;
        };
        previous.push(SavedRect {
            name: s.name,
            rect: block.rect(),
        });
        blocks.apply_rect(s.name, s.rect, bounds)?;
        names.push(s.name);
    }
    Ok((names, previous))
}
