//! The generator: one layout's blocks, params, bounds, queues and hooks,
//! advanced one tick at a time.
//!
//! A tick takes a single bounds snapshot, re-resolves every block against
//! it and then runs the registered hooks in registration order. Everything
//! is owned by the generator and mutated through `&mut self`, so the bounds
//! cannot change halfway through a tick.

use crate::block::Block;
use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size};
use crate::id::BlockId;
use crate::model::{AnchoredRect, BlockLayout};
use crate::params::{ParamValue, Params};
use crate::queue::Queue;
use crate::registry::Blocks;
use crate::stacking::{self, z_index_key};
use crate::units::Bounds;
use std::collections::HashMap;
use std::fmt;

/// Per-tick inputs from the animation clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    /// Milliseconds since the previous tick.
    pub delta_time: f32,
    /// False freezes animations in place.
    pub animate: bool,
}

impl TickContext {
    pub fn new(delta_time: f32, animate: bool) -> Self {
        Self {
            delta_time,
            animate,
        }
    }

    /// A layout-only tick: resolve, but advance nothing.
    pub fn paused() -> Self {
        Self::default()
    }
}

/// Per-tick behaviour attached to a generator (e.g. path animation).
pub trait Hook {
    /// Called once when the hook is registered.
    fn attach(&mut self, _g: &mut Generator) {}

    fn run(&mut self, g: &mut Generator, ctx: &TickContext) -> Result<(), LayoutError>;
}

/// Host callback that builds a block the registry does not know yet. It
/// sees the generator's params for sizing and spacing.
pub type CreateFn = Box<
    dyn FnMut(&BlockLayout, &Params, &mut Blocks, &Bounds) -> Result<Option<BlockId>, LayoutError>,
>;

pub struct Generator {
    name: String,
    params: Params,
    blocks: Blocks,
    bounds: Bounds,
    left_top: Point,
    container_change_count: u32,
    queues: HashMap<String, Queue<BlockId>>,
    hooks: Vec<(String, Box<dyn Hook>)>,
    create: Option<CreateFn>,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("blocks", &self.blocks.len())
            .field("hooks", &self.hooks.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Generator {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let params = Params::new(name.clone());
        Self::with_params(name, params)
    }

    pub fn with_params(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
            blocks: Blocks::new(),
            bounds: Bounds::default(),
            left_top: Point::ZERO,
            container_change_count: 0,
            queues: HashMap::new(),
            hooks: Vec::new(),
            create: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Blocks {
        &mut self.blocks
    }

    // ─── Bounds ──────────────────────────────────────────────────────────

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn left_top(&self) -> Point {
        self.left_top
    }

    pub fn set_container(&mut self, size: Size) {
        if self.bounds.container != size {
            log::debug!("{}: container {:?} -> {:?}", self.name, self.bounds.container, size);
            self.bounds.container = size;
            self.container_change_count += 1;
        }
    }

    pub fn set_viewport(&mut self, size: Size) {
        if self.bounds.viewport != size {
            self.bounds.viewport = size;
            self.container_change_count += 1;
        }
    }

    /// Position of the container within the viewport.
    pub fn set_left_top(&mut self, point: Point) {
        if self.left_top != point {
            self.left_top = point;
            self.container_change_count += 1;
        }
    }

    /// True if container, viewport or left-top changed since the last call.
    pub fn container_changed(&mut self) -> bool {
        let changed = self.container_change_count != 0;
        self.container_change_count = 0;
        changed
    }

    // ─── Blocks ──────────────────────────────────────────────────────────

    pub fn lookup(&self, name: BlockId) -> Option<&Block> {
        self.blocks.get(name)
    }

    /// Create or update a block. A newly created block picks up its
    /// persisted location (or align offset) and z-index.
    pub fn set_block(&mut self, layout: &BlockLayout) -> Result<BlockId, LayoutError> {
        if self.blocks.contains(layout.name) {
            return self.blocks.set(layout, &self.bounds);
        }
        let restored = restored_layout(&self.params, layout);
        let name = self.blocks.set(&restored, &self.bounds)?;
        self.restore_z_index(name);
        Ok(name)
    }

    fn restore_z_index(&mut self, name: BlockId) {
        let Some(z) = self.params.number(&z_index_key(name)) else {
            return;
        };
        if let Some(block) = self.blocks.get_mut(name) {
            block.z_index = z as i32;
        }
    }

    pub fn set_create(&mut self, create: Option<CreateFn>) {
        self.create = create;
    }

    /// The block named by `layout`: the existing one, else whatever the
    /// create callback builds, else `None`.
    pub fn reference(&mut self, layout: &BlockLayout) -> Result<Option<BlockId>, LayoutError> {
        if self.blocks.contains(layout.name) {
            return Ok(Some(layout.name));
        }
        let Some(create) = self.create.as_mut() else {
            return Ok(None);
        };
        let restored = restored_layout(&self.params, layout);
        let created = create(&restored, &self.params, &mut self.blocks, &self.bounds)?;
        if let Some(name) = created {
            self.restore_z_index(name);
        }
        Ok(created)
    }

    /// Build a fresh block named `{prefix}_{n}` through the create callback.
    pub fn create_next(&mut self, prefix: &str) -> Result<Option<BlockId>, LayoutError> {
        self.reference(&BlockLayout::new(BlockId::with_prefix(prefix), AnchoredRect::new()))
    }

    /// Move a block to `rect`, rewriting its location and persisting it.
    pub fn apply_rect(&mut self, name: BlockId, rect: Rect) -> Result<(), LayoutError> {
        self.blocks.apply_rect(name, rect, &self.bounds)?;
        self.save_edit(name);
        Ok(())
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Write a block's location to the params, or its align offset when
    /// the block is aligned.
    pub fn save_edit(&mut self, name: BlockId) {
        let Some(block) = self.blocks.get(name) else {
            return;
        };
        let changed = match block.align() {
            Some(align) => self
                .params
                .set(&offset_key(name), ParamValue::Point(align.offset)),
            None => self
                .params
                .set(&location_key(name), ParamValue::ExRect(*block.location())),
        };
        if changed {
            log::debug!("{}: saved edit of {name}", self.name);
        }
    }

    // ─── Stacking ────────────────────────────────────────────────────────

    pub fn bring_forward(&mut self, name: BlockId) -> Result<i32, LayoutError> {
        stacking::bring_forward(&mut self.blocks, &mut self.params, name)
    }

    pub fn send_backward(&mut self, name: BlockId) -> Result<i32, LayoutError> {
        stacking::send_backward(&mut self.blocks, &mut self.params, name)
    }

    pub fn bring_front(&mut self, names: &[BlockId]) -> Result<(), LayoutError> {
        stacking::bring_front(&mut self.blocks, &mut self.params, names)
    }

    pub fn send_back(&mut self, names: &[BlockId]) -> Result<(), LayoutError> {
        stacking::send_back(&mut self.blocks, &mut self.params, names)
    }

    // ─── Queues ──────────────────────────────────────────────────────────

    pub fn queue(&self, name: &str) -> Option<&Queue<BlockId>> {
        self.queues.get(name)
    }

    /// The named queue, created empty on first use.
    pub fn queue_mut(&mut self, name: &str) -> &mut Queue<BlockId> {
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| Queue::new(name))
    }

    // ─── Hooks ───────────────────────────────────────────────────────────

    /// Register a hook under `name`, replacing any hook of the same name.
    pub fn set_hook(&mut self, name: impl Into<String>, mut hook: Box<dyn Hook>) {
        hook.attach(self);
        insert_hook(&mut self.hooks, name.into(), hook);
    }

    pub fn remove_hook(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(n, _)| n != name);
        self.hooks.len() != before
    }

    pub fn hook_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.hooks.iter().map(|(n, _)| n.as_str())
    }

    /// Drop every block and empty every queue.
    pub fn clear(&mut self) {
        self.blocks.clear();
        for queue in self.queues.values_mut() {
            queue.clear();
        }
    }

    // ─── Tick ────────────────────────────────────────────────────────────

    /// Resolve every block against the current bounds, then run the hooks.
    ///
    /// Resolution is skipped while the container has no area; hooks still
    /// run and decide for themselves.
    pub fn tick(&mut self, ctx: &TickContext) -> Result<(), LayoutError> {
        let bounds = self.bounds;
        if bounds.container.is_empty() {
            log::trace!("{}: empty container, skipping resolution", self.name);
        } else {
            self.blocks.resolve_all(&bounds)?;
        }

        let mut hooks = std::mem::take(&mut self.hooks);
        let mut result = Ok(());
        for (name, hook) in hooks.iter_mut() {
            log::trace!("{}: running hook {name}", self.name);
            if let Err(e) = hook.run(self, ctx) {
                result = Err(e);
                break;
            }
        }

        // Hooks registered while running go after the existing ones.
        for (name, hook) in std::mem::take(&mut self.hooks) {
            insert_hook(&mut hooks, name, hook);
        }
        self.hooks = hooks;
        result
    }
}

/// Params key holding a block's edited location.
pub fn location_key(name: BlockId) -> String {
    format!("{name}Location")
}

/// Params key holding an aligned block's edited offset.
pub fn offset_key(name: BlockId) -> String {
    format!("{name}Offset")
}

/// `layout` with any persisted location or align offset swapped in.
fn restored_layout(params: &Params, layout: &BlockLayout) -> BlockLayout {
    let mut restored = layout.clone();
    let name = layout.name;
    match restored.align.as_mut() {
        Some(align) => {
            if let Some(ParamValue::Point(offset)) = params.get_loaded(&offset_key(name)) {
                log::debug!("restored align offset of {name}");
                align.offset = offset;
            }
        }
        None => {
            if let Some(ParamValue::ExRect(location)) = params.get_loaded(&location_key(name)) {
                log::debug!("restored location of {name}");
                restored.location = location;
            }
        }
    }
    restored
}

fn insert_hook(hooks: &mut Vec<(String, Box<dyn Hook>)>, name: String, hook: Box<dyn Hook>) {
    match hooks.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = hook,
        None => hooks.push((name, hook)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    }

    impl Hook for Recorder {
        fn attach(&mut self, _g: &mut Generator) {
            self.log.borrow_mut().push(format!("attach {}", self.tag));
        }

        fn run(&mut self, g: &mut Generator, ctx: &TickContext) -> Result<(), LayoutError> {
            self.log
                .borrow_mut()
                .push(format!("run {} {} {}", self.tag, g.bounds().container.width, ctx.delta_time));
            Ok(())
        }
    }

    fn generator() -> Generator {
        let mut g = Generator::new("test");
        g.set_container(Size::new(100.0, 100.0));
        g.set_viewport(Size::new(100.0, 100.0));
        g
    }

    #[test]
    fn container_changed_reads_and_resets() {
        let mut g = generator();
        assert!(g.container_changed());
        assert!(!g.container_changed());
        g.set_container(Size::new(100.0, 100.0));
        assert!(!g.container_changed());
        g.set_left_top(Point::new(5.0, 5.0));
        assert!(g.container_changed());
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = generator();
        g.set_hook("a", Box::new(Recorder { log: log.clone(), tag: "a" }));
        g.set_hook("b", Box::new(Recorder { log: log.clone(), tag: "b" }));
        g.tick(&TickContext::new(16.0, true)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["attach a", "attach b", "run a 100 16", "run b 100 16"]
        );
        assert_eq!(g.hook_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn set_block_restores_persisted_z_index() {
        let mut g = generator();
        g.params_mut().set("cardZIndex", ParamValue::Number(4.0));
        let id = g
            .set_block(&BlockLayout::new("card", AnchoredRect::px(0.0, 0.0, 10.0, 10.0)))
            .unwrap();
        assert_eq!(g.lookup(id).unwrap().z_index, 4);
    }

    #[test]
    fn reference_uses_create_callback() {
        let mut g = generator();
        let missing = BlockLayout::new("lazy", AnchoredRect::px(0.0, 0.0, 1.0, 1.0));
        assert_eq!(g.reference(&missing).unwrap(), None);

        g.set_create(Some(Box::new(
            |layout: &BlockLayout, _: &Params, blocks: &mut Blocks, bounds: &Bounds| {
                blocks.set(layout, bounds).map(Some)
            },
        )));
        let id = g.reference(&missing).unwrap();
        assert_eq!(id, Some(BlockId::intern("lazy")));
        assert!(g.lookup(BlockId::intern("lazy")).is_some());
    }

    #[test]
    fn create_callback_sees_restored_location() {
        let mut g = generator();
        let moved = AnchoredRect::px(30.0, 40.0, 1.0, 1.0);
        g.params_mut().set("draftLocation", ParamValue::ExRect(moved));
        g.set_create(Some(Box::new(
            |layout: &BlockLayout, _: &Params, blocks: &mut Blocks, bounds: &Bounds| {
                blocks.set(layout, bounds).map(Some)
            },
        )));
        let draft = BlockLayout::new("draft", AnchoredRect::px(0.0, 0.0, 1.0, 1.0));
        let id = g.reference(&draft).unwrap().unwrap();
        assert_eq!(g.lookup(id).unwrap().rect(), Rect::new(30.0, 40.0, 1.0, 1.0));
    }

    #[test]
    fn tick_skips_resolution_for_empty_container() {
        let mut g = Generator::new("empty");
        g.blocks_mut()
            .set(
                &BlockLayout::new("half", AnchoredRect::new().left(0).right(0).top(0).height(1)),
                &Bounds::new(Size::new(50.0, 50.0), Size::new(50.0, 50.0)),
            )
            .unwrap();
        g.tick(&TickContext::paused()).unwrap();
        assert_eq!(g.lookup(BlockId::intern("half")).unwrap().rect().width, 50.0);

        g.set_container(Size::new(80.0, 80.0));
        g.tick(&TickContext::paused()).unwrap();
        assert_eq!(g.lookup(BlockId::intern("half")).unwrap().rect().width, 80.0);
    }
}
