//! Selection and the edit commands that act on it.
//!
//! The selection is ordered: alignment commands take the first selected
//! block as the reference and move the others onto it. Every geometric
//! edit is recorded on the selection's [`CommandStack`].

use crate::commands::{CommandStack, snapshot};
use lg_core::{BlockId, Generator, LayoutError, Rect};

// ─── Commands ────────────────────────────────────────────────────────────

/// Commands offered by the selection's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    // ── History ──
    Undo,
    Redo,

    // ── Horizontal alignment ──
    AlignLeft,
    AlignCenter,
    AlignRight,

    // ── Vertical alignment ──
    AlignTop,
    AlignMiddle,
    AlignBottom,

    // ── Z-order ──
    BringForward,
    SendBackward,
    BringFront,
    SendBack,
}

impl EditCommand {
    pub fn label(self) -> &'static str {
        match self {
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
            EditCommand::AlignLeft => "align left",
            EditCommand::AlignCenter => "align center",
            EditCommand::AlignRight => "align right",
            EditCommand::AlignTop => "align top",
            EditCommand::AlignMiddle => "align middle",
            EditCommand::AlignBottom => "align bottom",
            EditCommand::BringForward => "bring forward",
            EditCommand::SendBackward => "send backward",
            EditCommand::BringFront => "bring front",
            EditCommand::SendBack => "send back",
        }
    }
}

/// One row of the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Command { command: EditCommand, enabled: bool },
    Separator,
}

/// Which edge or center line an alignment snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snap {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Snap {
    fn reference(self, r: &Rect) -> f32 {
        match self {
            Snap::Left => r.x,
            Snap::Center => r.x + r.width / 2.0,
            Snap::Right => r.right(),
            Snap::Top => r.y,
            Snap::Middle => r.y + r.height / 2.0,
            Snap::Bottom => r.bottom(),
        }
    }

    fn apply(self, r: Rect, value: f32) -> Rect {
        match self {
            Snap::Left => Rect { x: value, ..r },
            Snap::Center => Rect { x: value - r.width / 2.0, ..r },
            Snap::Right => Rect { x: value - r.width, ..r },
            Snap::Top => Rect { y: value, ..r },
            Snap::Middle => Rect { y: value - r.height / 2.0, ..r },
            Snap::Bottom => Rect { y: value - r.height, ..r },
        }
    }
}

// ─── Selection ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Selection {
    selected: Vec<BlockId>,
    commands: CommandStack,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commands(commands: CommandStack) -> Self {
        Self {
            selected: Vec::new(),
            commands,
        }
    }

    pub fn commands_stack(&self) -> &CommandStack {
        &self.commands
    }

    /// Select `name` if the generator knows it. Returns whether it is now
    /// selected.
    pub fn select(&mut self, g: &Generator, name: BlockId) -> bool {
        if g.lookup(name).is_none() {
            log::debug!("select: unknown block {name}");
            return false;
        }
        self.add(name);
        true
    }

    /// Add without checking the registry. Already selected names keep
    /// their position.
    pub fn add(&mut self, name: BlockId) {
        if !self.selected.contains(&name) {
            self.selected.push(name);
        }
    }

    pub fn remove(&mut self, name: BlockId) {
        self.selected.retain(|n| *n != name);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, name: BlockId) -> bool {
        self.selected.contains(&name)
    }

    pub fn selected(&self) -> &[BlockId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    // ─── Alignment ───────────────────────────────────────────────────────

    pub fn align_left(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Left)
    }

    pub fn align_center(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Center)
    }

    pub fn align_right(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Right)
    }

    pub fn align_top(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Top)
    }

    pub fn align_middle(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Middle)
    }

    pub fn align_bottom(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        self.align(g, Snap::Bottom)
    }

    /// Snapshot the selection, then move every block after the first onto
    /// the first block's reference line. Needs at least two blocks.
    fn align(&mut self, g: &mut Generator, snap: Snap) -> Result<(), LayoutError> {
        if self.selected.len() < 2 {
            return Ok(());
        }
        let Some(first) = g.lookup(self.selected[0]) else {
            return Err(LayoutError::unknown_block(self.selected[0]));
        };
        let value = snap.reference(&first.rect());

        self.commands.push(snapshot(g.blocks(), &self.selected));
        for name in &self.selected[1..] {
            let Some(block) = g.lookup(*name) else {
                continue;
            };
            let rect = snap.apply(block.rect(), value);
            g.apply_rect(*name, rect)?;
        }
        log::debug!("{snap:?} align of {} block(s) at {value}", self.selected.len());
        Ok(())
    }

    // ─── Moves ───────────────────────────────────────────────────────────

    /// Offset every selected block. Inside a gesture the moves collapse into
    /// the gesture's single undo step.
    pub fn move_by(&mut self, g: &mut Generator, dx: f32, dy: f32) -> Result<(), LayoutError> {
        if self.selected.is_empty() || (dx == 0.0 && dy == 0.0) {
            return Ok(());
        }
        self.commands.push(snapshot(g.blocks(), &self.selected));
        for name in &self.selected {
            let Some(block) = g.lookup(*name) else {
                continue;
            };
            let r = block.rect();
            g.apply_rect(*name, Rect { x: r.x + dx, y: r.y + dy, ..r })?;
        }
        Ok(())
    }

    /// Start a drag gesture over the current selection.
    pub fn begin_gesture(&mut self, g: &Generator) {
        self.commands.begin_batch(g.blocks(), &self.selected);
    }

    pub fn end_gesture(&mut self, g: &Generator) {
        self.commands.end_batch(g.blocks());
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last edit and select the blocks it restored.
    pub fn undo(&mut self, g: &mut Generator) -> Result<bool, LayoutError> {
        let bounds = g.bounds();
        let restored = self.commands.undo(g.blocks_mut(), &bounds)?;
        Ok(self.reselect(g, restored))
    }

    pub fn redo(&mut self, g: &mut Generator) -> Result<bool, LayoutError> {
        let bounds = g.bounds();
        let restored = self.commands.redo(g.blocks_mut(), &bounds)?;
        Ok(self.reselect(g, restored))
    }

    /// Select the restored blocks and persist their restored places.
    fn reselect(&mut self, g: &mut Generator, restored: Option<Vec<BlockId>>) -> bool {
        match restored {
            Some(names) => {
                for name in &names {
                    g.save_edit(*name);
                }
                self.selected = names;
                true
            }
            None => false,
        }
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    pub fn bring_forward(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        for name in &self.selected {
            g.bring_forward(*name)?;
        }
        Ok(())
    }

    pub fn send_backward(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        for name in &self.selected {
            g.send_backward(*name)?;
        }
        Ok(())
    }

    pub fn bring_front(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        if self.selected.is_empty() {
            return Ok(());
        }
        g.bring_front(&self.selected)
    }

    pub fn send_back(&mut self, g: &mut Generator) -> Result<(), LayoutError> {
        if self.selected.is_empty() {
            return Ok(());
        }
        g.send_back(&self.selected)
    }

    // ─── Menu ────────────────────────────────────────────────────────────

    pub fn is_enabled(&self, command: EditCommand) -> bool {
        match command {
            EditCommand::Undo => self.commands.can_undo(),
            EditCommand::Redo => self.commands.can_redo(),
            EditCommand::AlignLeft
            | EditCommand::AlignCenter
            | EditCommand::AlignRight
            | EditCommand::AlignTop
            | EditCommand::AlignMiddle
            | EditCommand::AlignBottom => self.selected.len() > 1,
            EditCommand::BringForward
            | EditCommand::SendBackward
            | EditCommand::BringFront
            | EditCommand::SendBack => !self.selected.is_empty(),
        }
    }

    /// Context menu rows with their current enabled state.
    pub fn commands(&self) -> Vec<MenuItem> {
        use EditCommand::*;
        let groups: [&[EditCommand]; 4] = [
            &[Undo, Redo],
            &[AlignLeft, AlignCenter, AlignRight],
            &[AlignTop, AlignMiddle, AlignBottom],
            &[BringForward, SendBackward, BringFront, SendBack],
        ];

        let mut items = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                items.push(MenuItem::Separator);
            }
            items.extend(group.iter().map(|c| MenuItem::Command {
                command: *c,
                enabled: self.is_enabled(*c),
            }));
        }
        items
    }

    /// Run a menu command. Disabled commands do nothing and return `false`.
    pub fn execute(&mut self, g: &mut Generator, command: EditCommand) -> Result<bool, LayoutError> {
        if !self.is_enabled(command) {
            log::trace!("{} is disabled", command.label());
            return Ok(false);
        }
        match command {
            EditCommand::Undo => return self.undo(g),
            EditCommand::Redo => return self.redo(g),
            EditCommand::AlignLeft => self.align_left(g)?,
            EditCommand::AlignCenter => self.align_center(g)?,
            EditCommand::AlignRight => self.align_right(g)?,
            EditCommand::AlignTop => self.align_top(g)?,
            EditCommand::AlignMiddle => self.align_middle(g)?,
            EditCommand::AlignBottom => self.align_bottom(g)?,
            EditCommand::BringForward => self.bring_forward(g)?,
            EditCommand::SendBackward => self.send_backward(g)?,
            EditCommand::BringFront => self.bring_front(g)?,
            EditCommand::SendBack => self.send_back(g)?,
        }
        Ok(true)
    }
}
