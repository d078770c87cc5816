//! Row and column arrangements.
//!
//! A [`Flow`] supplies a create callback that places each new block after
//! the previous one, and a [`Reflow`] hook that re-places every block when
//! the generator's params or container change. Spacing comes from params:
//!
//! | Key          | Value      | Rows default       | Columns default |
//! |--------------|------------|--------------------|-----------------|
//! | `itemSize`   | `Size`     | 24 x 24            | 100 x 0         |
//! | `itemMargin` | `AttrRect` | 2 top, 2 bottom    | none            |
//! | `align`      | `Number`   | 0 (unused)         | 0               |
//!
//! Columns honour `align`: -1 packs them left, 0 centres them, 1 packs them
//! right. Rows are always centred horizontally and run top to bottom.

use crate::error::LayoutError;
use crate::generator::{CreateFn, Generator, Hook, TickContext};
use crate::geometry::{Insets, Rect, Size};
use crate::id::BlockId;
use crate::model::{AnchoredRect, BlockLayout};
use crate::params::{ParamValue, Params};
use crate::registry::Blocks;
use crate::units::Bounds;

pub const ITEM_SIZE: &str = "itemSize";
pub const ITEM_MARGIN: &str = "itemMargin";
pub const ALIGN: &str = "align";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// One block per row, top to bottom.
    Rows,
    /// One full-height block per column, left to right.
    Columns,
}

/// The params a flow reads, with its defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParams {
    pub item_size: Size,
    pub item_margin: Insets,
    pub align: f32,
}

impl Flow {
    pub fn name(self) -> &'static str {
        match self {
            Flow::Rows => "rows",
            Flow::Columns => "columns",
        }
    }

    fn default_params(self) -> FlowParams {
        match self {
            Flow::Rows => FlowParams {
                item_size: Size::new(24.0, 24.0),
                item_margin: Insets {
                    top: 2.0,
                    bottom: 2.0,
                    ..Insets::default()
                },
                align: 0.0,
            },
            Flow::Columns => FlowParams {
                item_size: Size::new(100.0, 0.0),
                item_margin: Insets::default(),
                align: 0.0,
            },
        }
    }

    /// Initial param values, in the order they are stored.
    pub fn defaults(self) -> Vec<(String, ParamValue)> {
        let d = self.default_params();
        vec![
            (ALIGN.to_string(), ParamValue::Number(d.align)),
            (ITEM_SIZE.to_string(), ParamValue::Size(d.item_size)),
            (ITEM_MARGIN.to_string(), ParamValue::AttrRect(d.item_margin)),
        ]
    }

    /// Read this flow's params, falling back to defaults for missing or
    /// mistyped values.
    pub fn params(self, params: &Params) -> FlowParams {
        let d = self.default_params();
        FlowParams {
            item_size: match params.get(ITEM_SIZE) {
                Some(ParamValue::Size(s)) => *s,
                _ => d.item_size,
            },
            item_margin: match params.get(ITEM_MARGIN) {
                Some(ParamValue::AttrRect(m)) => *m,
                _ => d.item_margin,
            },
            align: params.number(ALIGN).unwrap_or(d.align),
        }
    }

    /// Create callback placing each new block after the last one. The
    /// incoming location is replaced.
    pub fn create(self) -> CreateFn {
        Box::new(
            move |layout: &BlockLayout, params: &Params, blocks: &mut Blocks, bounds: &Bounds| {
                let p = self.params(params);
                let name = match self {
                    Flow::Rows => create_row(layout, &p, blocks, bounds)?,
                    Flow::Columns => create_column(layout, &p, blocks, bounds)?,
                };
                Ok(Some(name))
            },
        )
    }

    /// Re-place every block in insertion order, keeping each block's size.
    pub fn arrange(self, p: &FlowParams, blocks: &mut Blocks, bounds: &Bounds) -> Result<(), LayoutError> {
        let placed = match self {
            Flow::Rows => row_rects(p, blocks, bounds),
            Flow::Columns => column_rects(p, blocks, bounds),
        };
        for (name, rect) in placed {
            blocks.apply_rect(name, rect, bounds)?;
        }
        Ok(())
    }

    /// Install the create callback and the reflow hook on `g`.
    pub fn install(self, g: &mut Generator) {
        g.set_create(Some(self.create()));
        g.set_hook(self.name(), Box::new(Reflow::new(self)));
    }
}

// ─── Rows ────────────────────────────────────────────────────────────────

fn centered_x(container_width: f32, width: f32, margin: &Insets) -> f32 {
    (container_width - (width + margin.left + margin.right)) / 2.0 + margin.left
}

fn create_row(layout: &BlockLayout, p: &FlowParams, blocks: &mut Blocks, bounds: &Bounds) -> Result<BlockId, LayoutError> {
    let margin = &p.item_margin;
    let top = match blocks.iter().last() {
        Some(last) => last.rect().bottom() + margin.bottom + margin.top,
        None => margin.top,
    };
    let left = centered_x(bounds.container.width, p.item_size.width, margin);

    let mut row = layout.clone();
    row.location = AnchoredRect::px(left, top, p.item_size.width, p.item_size.height);
    blocks.set(&row, bounds)
}

fn row_rects(p: &FlowParams, blocks: &Blocks, bounds: &Bounds) -> Vec<(BlockId, Rect)> {
    let margin = &p.item_margin;
    let mut y = margin.top;
    let mut placed = Vec::with_capacity(blocks.len());
    for block in blocks.iter() {
        let r = block.rect();
        let x = centered_x(bounds.container.width, r.width, margin);
        placed.push((block.name(), Rect::new(x, y, r.width, r.height)));
        y += r.height + margin.top + margin.bottom;
    }
    placed
}

// ─── Columns ─────────────────────────────────────────────────────────────

fn column_height(p: &FlowParams, bounds: &Bounds) -> f32 {
    (bounds.container.height - p.item_margin.top - p.item_margin.bottom).max(0.0)
}

fn create_column(layout: &BlockLayout, p: &FlowParams, blocks: &mut Blocks, bounds: &Bounds) -> Result<BlockId, LayoutError> {
    let mut column = layout.clone();
    column.location = AnchoredRect::px(
        p.item_margin.left,
        p.item_margin.top,
        p.item_size.width,
        column_height(p, bounds),
    );
    let name = blocks.set(&column, bounds)?;
    Flow::Columns.arrange(p, blocks, bounds)?;
    Ok(name)
}

fn column_rects(p: &FlowParams, blocks: &Blocks, bounds: &Bounds) -> Vec<(BlockId, Rect)> {
    let margin = &p.item_margin;
    let height = column_height(p, bounds);
    let total: f32 = blocks
        .iter()
        .map(|b| b.rect().width + margin.left + margin.right)
        .sum();

    let width = bounds.container.width;
    let mut x = if p.align < 0.0 {
        0.0
    } else if p.align > 0.0 {
        width - total
    } else {
        (width - total) / 2.0
    };

    let mut placed = Vec::with_capacity(blocks.len());
    for block in blocks.iter() {
        let w = block.rect().width;
        placed.push((block.name(), Rect::new(x + margin.left, margin.top, w, height)));
        x += w + margin.left + margin.right;
    }
    placed
}

// ─── Reflow hook ─────────────────────────────────────────────────────────

/// Re-places the generator's blocks whenever its params or container
/// change. It consumes both change flags, so it should be the only hook on
/// its generator that reads them.
#[derive(Debug, Clone)]
pub struct Reflow {
    flow: Flow,
}

impl Reflow {
    pub fn new(flow: Flow) -> Self {
        Self { flow }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }
}

impl Hook for Reflow {
    fn attach(&mut self, g: &mut Generator) {
        g.params_mut().restore(self.flow.defaults(), false);
    }

    fn run(&mut self, g: &mut Generator, _ctx: &TickContext) -> Result<(), LayoutError> {
        let bounds = g.bounds();
        if bounds.container.is_empty() {
            return Ok(());
        }
        let params_changed = g.params_mut().changed();
        let container_changed = g.container_changed();
        if !params_changed && !container_changed {
            return Ok(());
        }

        log::debug!("{}: reflowing {} blocks", g.name(), self.flow.name());
        let p = self.flow.params(g.params());
        self.flow.arrange(&p, g.blocks_mut(), &bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bounds(width: f32, height: f32) -> Bounds {
        Bounds::new(Size::new(width, height), Size::new(width, height))
    }

    fn rects(blocks: &Blocks) -> Vec<Rect> {
        blocks.iter().map(|b| b.rect()).collect()
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let mut params = Params::new("rows");
        params.set(ITEM_SIZE, ParamValue::Number(3.0));
        let p = Flow::Rows.params(&params);
        assert_eq!(p.item_size, Size::new(24.0, 24.0));
        assert_eq!(p.item_margin.top, 2.0);
        assert_eq!(Flow::Columns.params(&params).item_size, Size::new(100.0, 0.0));
    }

    #[test]
    fn rows_stack_below_the_last_block() {
        let b = bounds(200.0, 100.0);
        let params = Params::with_values("rows", Flow::Rows.defaults());
        let mut blocks = Blocks::new();
        let mut create = Flow::Rows.create();
        for name in ["r0", "r1", "r2"] {
            let layout = BlockLayout::new(name, AnchoredRect::new());
            create(&layout, &params, &mut blocks, &b).unwrap();
        }
        assert_eq!(
            rects(&blocks),
            vec![
                Rect::new(88.0, 2.0, 24.0, 24.0),
                Rect::new(88.0, 30.0, 24.0, 24.0),
                Rect::new(88.0, 58.0, 24.0, 24.0),
            ]
        );
    }

    #[test]
    fn columns_recentre_on_every_create() {
        let b = bounds(600.0, 100.0);
        let params = Params::with_values("columns", Flow::Columns.defaults());
        let mut blocks = Blocks::new();
        let mut create = Flow::Columns.create();

        create(&BlockLayout::new("c0", AnchoredRect::new()), &params, &mut blocks, &b).unwrap();
        assert_eq!(rects(&blocks), vec![Rect::new(250.0, 0.0, 100.0, 100.0)]);

        create(&BlockLayout::new("c1", AnchoredRect::new()), &params, &mut blocks, &b).unwrap();
        assert_eq!(
            rects(&blocks),
            vec![Rect::new(200.0, 0.0, 100.0, 100.0), Rect::new(300.0, 0.0, 100.0, 100.0)]
        );
    }

    #[test]
    fn arrange_keeps_sizes() {
        let b = bounds(100.0, 100.0);
        let mut blocks = Blocks::new();
        blocks
            .set(&BlockLayout::new("wide-row", AnchoredRect::px(0.0, 0.0, 60.0, 10.0)), &b)
            .unwrap();
        blocks
            .set(&BlockLayout::new("tall-row", AnchoredRect::px(0.0, 0.0, 20.0, 30.0)), &b)
            .unwrap();
        let p = FlowParams {
            item_size: Size::new(24.0, 24.0),
            item_margin: Insets {
                left: 0.0,
                top: 5.0,
                right: 0.0,
                bottom: 5.0,
            },
            align: 0.0,
        };
        Flow::Rows.arrange(&p, &mut blocks, &b).unwrap();
        assert_eq!(
            rects(&blocks),
            vec![Rect::new(20.0, 5.0, 60.0, 10.0), Rect::new(40.0, 25.0, 20.0, 30.0)]
        );
    }
}
