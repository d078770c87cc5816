//! The live block: its declarative layout plus the resolved rect and
//! run-time state (stacking, visibility, metadata).

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::id::BlockId;
use crate::layout::{
    apply_origin, inverse_align, inverse_layout, is_height_unmanaged, is_width_unmanaged,
    layout_measured, remove_origin, resolve_align,
};
use crate::model::{Align, AnchoredRect, BlockLayout, DataKey, DataValue, Origin};
use crate::units::Bounds;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Block {
    name: BlockId,
    location: AnchoredRect,
    origin: Option<Origin>,
    align: Option<Align>,
    rect: Rect,
    measured: Size,
    /// Negative layers render above every non-negative layer.
    pub layer: i32,
    pub z_index: i32,
    pub hidden: bool,
    data: HashMap<DataKey, DataValue>,
}

impl Block {
    pub fn new(layout: &BlockLayout) -> Self {
        Self {
            name: layout.name,
            location: layout.location,
            origin: layout.origin,
            align: layout.align,
            rect: Rect::default(),
            measured: Size::ZERO,
            layer: layout.layer,
            z_index: 0,
            hidden: false,
            data: HashMap::new(),
        }
    }

    pub fn name(&self) -> BlockId {
        self.name
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Overwrite the resolved rect without touching the location.
    /// The next resolve will put it back; see `apply_rect` for edits.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn location(&self) -> &AnchoredRect {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut AnchoredRect {
        &mut self.location
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn align(&self) -> Option<&Align> {
        self.align.as_ref()
    }

    /// Replace the declarative parts, keeping rect and run-time state.
    pub(crate) fn update_layout(&mut self, layout: &BlockLayout) {
        self.location = layout.location;
        self.origin = layout.origin;
        self.align = layout.align;
        self.layer = layout.layer;
    }

    pub fn is_width_unmanaged(&self) -> bool {
        is_width_unmanaged(&self.location)
    }

    pub fn is_height_unmanaged(&self) -> bool {
        is_height_unmanaged(&self.location)
    }

    /// Size reported by whoever measures unmanaged content.
    pub fn set_measured_size(&mut self, size: Size) {
        self.measured = size;
    }

    pub fn measured_size(&self) -> Size {
        self.measured
    }

    // ─── Metadata ────────────────────────────────────────────────────────

    pub fn data(&self, key: &DataKey) -> Option<&DataValue> {
        self.data.get(key)
    }

    pub fn set_data(&mut self, key: DataKey, value: DataValue) {
        self.data.insert(key, value);
    }

    pub fn remove_data(&mut self, key: &DataKey) -> Option<DataValue> {
        self.data.remove(key)
    }

    /// Numeric metadata, or `default` when absent or not a number.
    pub fn number(&self, key: &DataKey, default: f32) -> f32 {
        self.data
            .get(key)
            .and_then(DataValue::as_number)
            .unwrap_or(default)
    }

    // ─── Resolution ──────────────────────────────────────────────────────

    /// Compute the rect this block would have, without storing it.
    pub fn compute(&self, bounds: &Bounds, align_target: Option<Rect>) -> Result<Rect, LayoutError> {
        let name = self.name.as_str();
        let rect = layout_measured(&self.location, bounds, self.measured)
            .map_err(|e| e.for_block(name))?;

        match (&self.align, align_target) {
            (Some(align), Some(target)) => Ok(resolve_align(rect.size(), align, &target)),
            (Some(align), None) => Err(LayoutError::AlignTargetMissing {
                block: name.to_string(),
                key: align.key.to_string(),
            }),
            (None, _) => Ok(match &self.origin {
                Some(origin) => apply_origin(rect, origin),
                None => rect,
            }),
        }
    }

    /// Recompute and store the rect. `align_target` is the current rect of
    /// the block named by `align`, if any.
    pub fn resolve(&mut self, bounds: &Bounds, align_target: Option<Rect>) -> Result<Rect, LayoutError> {
        self.rect = self.compute(bounds, align_target)?;
        log::trace!("resolved {} -> {:?}", self.name, self.rect);
        Ok(self.rect)
    }

    /// Move the block to `rect`, rewriting its location (or align offset)
    /// so the edit survives later re-resolution.
    pub fn apply_rect(
        &mut self,
        rect: Rect,
        bounds: &Bounds,
        align_target: Option<Rect>,
    ) -> Result<(), LayoutError> {
        let name = self.name.as_str();
        match (self.align, align_target) {
            (Some(align), Some(target)) => {
                self.align = Some(inverse_align(&rect, &align, &target));
            }
            (Some(align), None) => {
                return Err(LayoutError::AlignTargetMissing {
                    block: name.to_string(),
                    key: align.key.to_string(),
                });
            }
            (None, _) => {
                let unshifted = match &self.origin {
                    Some(origin) => remove_origin(rect, origin),
                    None => rect,
                };
                self.location = inverse_layout(&unshifted, &self.location, bounds)
                    .map_err(|e| e.for_block(name))?;
            }
        }
        self.rect = rect;
        Ok(())
    }
}
