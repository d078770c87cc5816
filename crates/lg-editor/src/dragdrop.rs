//! Drag and drop between containers.
//!
//! Containers opt in by storing capabilities in their block data:
//!
//! | Key         | Value       | Called                                      |
//! |-------------|-------------|---------------------------------------------|
//! | `DragData`  | `Provider`  | on start, on the source container           |
//! | `CanDrop`   | `Predicate` | on every move, on each candidate            |
//! | `DragEnter` | `Notify`    | when a candidate becomes droppable          |
//! | `DragLeave` | `Notify`    | when it stops being droppable               |
//! | `Drop`      | `Predicate` | on end, on the single droppable target      |
//! | `EndDrop`   | `Action`    | after a successful drop, on the source      |
//!
//! The payload is a list of block names; this module never looks inside it.

use crate::hit::drop_candidates;
use lg_core::{BlockId, Blocks, DataKey, DataValue, LayoutError, Point, Rect};

#[derive(Debug, Clone)]
struct DragState {
    name: BlockId,
    parent: Option<BlockId>,
    start_rect: Rect,
    start_pointer: Point,
    rect: Rect,
    data: Vec<BlockId>,
    droppable: Vec<BlockId>,
}

#[derive(Debug, Clone)]
pub struct DragDrop {
    boundary: Rect,
    /// Constrain moves to the dominant axis.
    pub axis_lock: bool,
    state: Option<DragState>,
}

fn capability(blocks: &Blocks, name: BlockId, key: DataKey) -> Option<DataValue> {
    blocks.get(name).and_then(|b| b.data(&key)).cloned()
}

fn accepts(blocks: &Blocks, name: BlockId, key: DataKey, data: &[BlockId]) -> bool {
    match capability(blocks, name, key) {
        Some(DataValue::Predicate(f)) => f(data),
        _ => false,
    }
}

fn notify(blocks: &Blocks, name: BlockId, key: DataKey) {
    if let Some(DataValue::Notify(f)) = capability(blocks, name, key) {
        f();
    }
}

impl DragDrop {
    /// A drag that keeps the dragged rect inside `boundary`.
    pub fn new(boundary: Rect) -> Self {
        Self {
            boundary,
            axis_lock: false,
            state: None,
        }
    }

    pub fn set_boundary(&mut self, boundary: Rect) {
        self.boundary = boundary;
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    /// Block being dragged.
    pub fn source(&self) -> Option<BlockId> {
        self.state.as_ref().map(|s| s.name)
    }

    /// Current rect of the drag image.
    pub fn rect(&self) -> Option<Rect> {
        self.state.as_ref().map(|s| s.rect)
    }

    /// Names carried by the drag.
    pub fn data(&self) -> &[BlockId] {
        self.state.as_ref().map(|s| s.data.as_slice()).unwrap_or(&[])
    }

    /// Containers that would currently accept the drop.
    pub fn droppable(&self) -> &[BlockId] {
        self.state.as_ref().map(|s| s.droppable.as_slice()).unwrap_or(&[])
    }

    /// Begin dragging `name`, shown at `start_rect`, from pointer position
    /// `pointer`.
    ///
    /// The payload comes from the source container's `DragData` provider,
    /// falling back to the block itself.
    pub fn start(&mut self, blocks: &Blocks, name: BlockId, start_rect: Rect, pointer: Point) -> Result<(), LayoutError> {
        if !blocks.contains(name) {
            return Err(LayoutError::unknown_block(name));
        }
        let parent = blocks.local_parent(name);

        let mut data = match parent.and_then(|p| capability(blocks, p, DataKey::DragData)) {
            Some(DataValue::Provider(f)) => f(name),
            _ => Vec::new(),
        };
        if data.is_empty() {
            data.push(name);
        }
        log::debug!("drag {name} from {parent:?} carrying {data:?}");

        self.state = Some(DragState {
            name,
            parent,
            start_rect,
            start_pointer: pointer,
            rect: start_rect,
            data,
            droppable: Vec::new(),
        });
        Ok(())
    }

    /// Follow the pointer to `(x, y)`. Fires `DragLeave` on containers that
    /// stopped accepting and `DragEnter` on those that started, once per
    /// transition. Returns the new drag rect.
    pub fn move_to(&mut self, blocks: &Blocks, x: f32, y: f32) -> Option<Rect> {
        let boundary = self.boundary;
        let axis_lock = self.axis_lock;
        let state = self.state.as_mut()?;

        let mut dx = x - state.start_pointer.x;
        let mut dy = y - state.start_pointer.y;
        if axis_lock {
            if dx.abs() > dy.abs() {
                dy = 0.0;
            } else {
                dx = 0.0;
            }
        }
        let moved = Rect {
            x: state.start_rect.x + dx,
            y: state.start_rect.y + dy,
            ..state.start_rect
        };
        state.rect = moved.pinned_within(&boundary);

        let droppable: Vec<BlockId> = drop_candidates(blocks, &state.rect, state.parent)
            .into_iter()
            .filter(|c| accepts(blocks, *c, DataKey::CanDrop, &state.data))
            .collect();

        for left in state.droppable.iter().filter(|n| !droppable.contains(n)) {
            log::trace!("drag leave {left}");
            notify(blocks, *left, DataKey::DragLeave);
        }
        for entered in droppable.iter().filter(|n| !state.droppable.contains(n)) {
            log::trace!("drag enter {entered}");
            notify(blocks, *entered, DataKey::DragEnter);
        }
        state.droppable = droppable;
        Some(state.rect)
    }

    /// Finish the drag. When exactly one candidate lies under the drag
    /// rect and it both accepts and takes the payload, the source
    /// container's `EndDrop` is told. Returns the target on success.
    pub fn end(&mut self, blocks: &Blocks) -> Option<BlockId> {
        let state = self.state.take()?;
        let candidates = drop_candidates(blocks, &state.rect, state.parent);
        let [target] = candidates.as_slice() else {
            log::debug!("drop of {} missed: {} candidates", state.name, candidates.len());
            return None;
        };
        let target = *target;

        if !accepts(blocks, target, DataKey::CanDrop, &state.data)
            || !accepts(blocks, target, DataKey::Drop, &state.data)
        {
            log::debug!("{target} refused {:?}", state.data);
            return None;
        }

        match state.parent.and_then(|p| capability(blocks, p, DataKey::EndDrop)) {
            Some(DataValue::Action(f)) => f(&state.data),
            _ => log::warn!("drag container for {} has no end-drop handler", state.name),
        }
        log::debug!("dropped {:?} on {target}", state.data);
        Some(target)
    }

    /// Abandon the drag without dropping.
    pub fn cancel(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!("drag of {} cancelled", state.name);
        }
    }
}
