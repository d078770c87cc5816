//! Path animation: move a queue of blocks along a piecewise path at
//! constant velocity, keeping a fixed spacing between them.
//!
//! ```text
//! Path {x: 50%, y: 0} to {x: 50%, y: 100%}
//! ┌─────────────────x─────────────────┐
//! │               ┌─│─┐               │
//! │               │ │ │   ← distance  │
//! │               └─│─┘     spacing   │
//! │               ┌─│─┐               │
//! │               │ │ │   ← lead      │
//! │               └─│─┘               │
//! │                 ↓                 │
//! └───────────────────────────────────┘
//! ```
//!
//! Blocks enter from the update queue and leave through the output queue.
//! Both queues live on the generator, so pointing one hook's output at
//! another hook's update queue chains the two paths, and pointing a hook at
//! itself loops forever.

use crate::path::{PathBreakpoint, select_path};
use lg_core::{
    AnchoredRect, Axis, BlockId, Bounds, DataKey, DataValue, Generator, Hook, LayoutError,
    ParamValue, Piecewise, Point, TickContext,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::rc::Rc;

// ─── Configuration ───────────────────────────────────────────────────────

/// Horizontal edge the hook writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XRef {
    Left,
    Right,
}

/// Vertical edge the hook writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YRef {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Pixels per millisecond.
    pub velocity: f32,
    /// Distance between consecutive blocks, in pixels.
    pub spacing: f32,
    /// Place as many input blocks as fit before animating.
    pub fill: bool,
    /// Edge to move. `None` prefers left, then right.
    pub x_ref: Option<XRef>,
    /// Edge to move. `None` prefers top, then bottom.
    pub y_ref: Option<YRef>,
    /// Block tested for collisions against every moved block.
    pub sprite: Option<BlockId>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            velocity: 0.05,
            spacing: 200.0,
            fill: false,
            x_ref: None,
            y_ref: None,
            sprite: None,
        }
    }
}

/// Where the initial blocks come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Every block on a layer, in insertion order.
    Layer(i32),
    Blocks(Vec<BlockId>),
}

// ─── Hook ────────────────────────────────────────────────────────────────

pub struct PathHook {
    prefix: String,
    breakpoints: Vec<PathBreakpoint>,
    input: Option<InputSource>,
    update: String,
    output: String,
    config: PathConfig,
    on_collide: Option<Box<dyn FnMut(BlockId)>>,
    path: Option<Rc<Piecewise>>,
    built_for: Option<Bounds>,
    /// Blocks on the path; front is the most recently activated.
    active: VecDeque<BlockId>,
}

impl std::fmt::Debug for PathHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathHook")
            .field("prefix", &self.prefix)
            .field("update", &self.update)
            .field("output", &self.output)
            .field("config", &self.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl PathHook {
    /// A hook named `prefix` pulling from queue `update` and pushing
    /// finished blocks onto queue `output`.
    pub fn new(
        prefix: impl Into<String>,
        mut breakpoints: Vec<PathBreakpoint>,
        update: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        breakpoints.sort_by(|a, b| a.min.total_cmp(&b.min));
        Self {
            prefix: prefix.into(),
            breakpoints,
            input: None,
            update: update.into(),
            output: output.into(),
            config: PathConfig::default(),
            on_collide: None,
            path: None,
            built_for: None,
            active: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = Some(input);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: PathConfig) -> Self {
        self.config = config;
        self
    }

    /// Called with each block whose rect meets the sprite's after a move.
    #[must_use]
    pub fn on_collide(mut self, f: impl FnMut(BlockId) + 'static) -> Self {
        self.on_collide = Some(Box::new(f));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Blocks currently on the path, most recently activated first.
    pub fn active(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.active.iter().copied()
    }

    /// The resolved path, once a tick has seen a non-empty container.
    pub fn path(&self) -> Option<&Piecewise> {
        self.path.as_deref()
    }

    /// Params key gating initialization.
    pub fn init_key(&self) -> String {
        format!("{}init", self.prefix)
    }

    // ─── Phases ──────────────────────────────────────────────────────────

    fn input_blocks(&self, g: &Generator) -> Vec<BlockId> {
        match &self.input {
            Some(InputSource::Layer(layer)) => g.blocks().layers(*layer).map(|b| b.name()).collect(),
            Some(InputSource::Blocks(names)) => names
                .iter()
                .copied()
                .filter(|n| g.blocks().contains(*n))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Place the initial blocks (with `fill`) and queue the rest.
    fn initialize(&mut self, g: &mut Generator, path: &Piecewise, input: Vec<BlockId>) -> Result<(), LayoutError> {
        let mut input: VecDeque<BlockId> = input.into();
        let spacing = self.config.spacing;

        if self.config.fill && spacing > 0.0 {
            let needed = ((path.length() / spacing).floor() as usize).min(input.len());
            for i in 0..needed {
                let Some(name) = input.pop_front() else {
                    break;
                };
                // First placed is furthest along.
                let distance = (needed - 1 - i) as f32 * spacing;
                match path.point(distance) {
                    Some(p) => {
                        self.mark(g, name, distance, false);
                        self.place(g, name, p)?;
                        self.active.push_front(name);
                    }
                    None => self.retire(g, name),
                }
            }
        }

        for name in input {
            self.mark(g, name, 0.0, true);
            g.queue_mut(&self.update).enqueue(name);
        }

        g.params_mut().set(&self.init_key(), ParamValue::Number(1.0));
        log::debug!(
            "path {} initialized: {} active, {} queued",
            self.prefix,
            self.active.len(),
            g.queue(&self.update).map_or(0, |q| q.len())
        );
        Ok(())
    }

    fn step(&mut self, g: &mut Generator, path: &Piecewise, delta_time: f32) -> Result<(), LayoutError> {
        let advance = delta_time * self.config.velocity;

        let lead = self
            .active
            .front()
            .and_then(|name| g.lookup(*name))
            .map(|b| b.number(&DataKey::Distance, 0.0));
        let room = match lead {
            Some(d) => d + advance > self.config.spacing,
            None => true,
        };
        if room && let Some(name) = g.queue_mut(&self.update).dequeue() {
            self.activate(g, path, name)?;
        }

        // Oldest first; survivors keep newest-at-front order.
        let current = std::mem::take(&mut self.active);
        let mut kept = VecDeque::with_capacity(current.len());
        for name in current.into_iter().rev() {
            let Some(block) = g.blocks().get(name) else {
                log::trace!("path {}: {name} no longer exists", self.prefix);
                continue;
            };
            let distance = block.number(&DataKey::Distance, 0.0) + advance;

            match path.point(distance) {
                Some(p) => {
                    self.mark(g, name, distance, false);
                    self.place(g, name, p)?;
                    kept.push_front(name);
                }
                None => self.retire(g, name),
            }
        }
        self.active = kept;
        Ok(())
    }

    fn activate(&mut self, g: &mut Generator, path: &Piecewise, name: BlockId) -> Result<(), LayoutError> {
        match path.point(0.0) {
            Some(p) => {
                self.mark(g, name, 0.0, false);
                self.place(g, name, p)?;
                self.active.push_front(name);
            }
            None => self.retire(g, name),
        }
        Ok(())
    }

    /// Past the end of the path: reset, hide and hand on.
    fn retire(&mut self, g: &mut Generator, name: BlockId) {
        self.mark(g, name, 0.0, true);
        g.queue_mut(&self.output).enqueue(name);
        log::debug!("path {}: {name} exited", self.prefix);
    }

    fn mark(&self, g: &mut Generator, name: BlockId, distance: f32, hidden: bool) {
        if let Some(block) = g.blocks_mut().get_mut(name) {
            block.hidden = hidden;
            block.set_data(DataKey::Distance, DataValue::Number(distance));
            block.set_data(DataKey::Hook, DataValue::Text(self.prefix.clone()));
        }
    }

    // ─── Positioning ─────────────────────────────────────────────────────

    fn x_edge(&self, loc: &AnchoredRect) -> Option<XRef> {
        match self.config.x_ref {
            None if loc.left.is_some() => Some(XRef::Left),
            None if loc.right.is_some() => Some(XRef::Right),
            None => None,
            Some(XRef::Left) => loc.left.map(|_| XRef::Left),
            Some(XRef::Right) => loc.right.map(|_| XRef::Right),
        }
    }

    fn y_edge(&self, loc: &AnchoredRect) -> Option<YRef> {
        match self.config.y_ref {
            None if loc.top.is_some() => Some(YRef::Top),
            None if loc.bottom.is_some() => Some(YRef::Bottom),
            None => None,
            Some(YRef::Top) => loc.top.map(|_| YRef::Top),
            Some(YRef::Bottom) => loc.bottom.map(|_| YRef::Bottom),
        }
    }

    fn edge_error(&self, name: BlockId, axis: Axis) -> LayoutError {
        LayoutError::PathEdge {
            path: self.prefix.clone(),
            block: name.to_string(),
            axis,
        }
    }

    /// Write `p` into the block's edges, in their own units, re-resolve it
    /// and test it against the sprite.
    fn place(&mut self, g: &mut Generator, name: BlockId, p: Point) -> Result<(), LayoutError> {
        let bounds = g.bounds();
        let block = g.blocks_mut().require_mut(name)?;
        let x_edge = self.x_edge(block.location());
        let y_edge = self.y_edge(block.location());
        let loc = block.location_mut();

        match x_edge {
            Some(XRef::Left) => loc.left = loc.left.map(|v| v.with_pixel_x(p.x, &bounds)),
            Some(XRef::Right) => {
                let right = bounds.container.width - p.x;
                loc.right = loc.right.map(|v| v.with_pixel_x(right, &bounds));
            }
            None => return Err(self.edge_error(name, Axis::X)),
        }
        match y_edge {
            Some(YRef::Top) => loc.top = loc.top.map(|v| v.with_pixel_y(p.y, &bounds)),
            Some(YRef::Bottom) => {
                let bottom = bounds.container.height - p.y;
                loc.bottom = loc.bottom.map(|v| v.with_pixel_y(bottom, &bounds));
            }
            None => return Err(self.edge_error(name, Axis::Y)),
        }

        let rect = g.blocks_mut().resolve_one(name, &bounds)?;

        if let Some(sprite) = self.config.sprite
            && sprite != name
        {
            match g.lookup(sprite) {
                Some(s) if s.rect().intersects(&rect) => {
                    log::trace!("path {}: {name} hit sprite {sprite}", self.prefix);
                    if let Some(cb) = self.on_collide.as_mut() {
                        cb(name);
                    }
                }
                Some(_) => {}
                None => log::trace!("path {}: sprite {sprite} not found", self.prefix),
            }
        }
        Ok(())
    }
}

impl Hook for PathHook {
    fn attach(&mut self, g: &mut Generator) {
        g.params_mut().set(&self.init_key(), ParamValue::Number(0.0));
        g.queue_mut(&self.update);
        g.queue_mut(&self.output);
    }

    fn run(&mut self, g: &mut Generator, ctx: &TickContext) -> Result<(), LayoutError> {
        let bounds = g.bounds();
        if bounds.container.is_empty() {
            log::trace!("path {}: empty container", self.prefix);
            return Ok(());
        }

        if self.built_for != Some(bounds) {
            self.path = select_path(&self.breakpoints, &bounds).map(Rc::new);
            self.built_for = Some(bounds);
            log::debug!(
                "path {} rebuilt for width {}: length {:?}",
                self.prefix,
                bounds.container.width,
                self.path.as_ref().map(|p| p.length())
            );
        }
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let initialized = g.params().number(&self.init_key()).unwrap_or(0.0) != 0.0;
        if !initialized {
            let input = self.input_blocks(g);
            if self.input.is_some() && input.is_empty() {
                log::trace!("path {}: waiting for input", self.prefix);
                return Ok(());
            }
            self.initialize(g, &path, input)?;
        }

        if ctx.animate && ctx.delta_time > 0.0 {
            self.step(g, &path, ctx.delta_time)?;
        }
        Ok(())
    }
}
