//! Anchored-rect resolution and its inverse.
//!
//! `layout` turns a unit-bearing `AnchoredRect` into an absolute `Rect` for
//! the current `Bounds`; `inverse_layout` goes the other way, keeping the
//! caller's fields and units so an edited rect survives later resizes.
//! Origin and alignment are applied on top of the anchored rect.

use crate::error::{Axis, LayoutError};
use crate::geometry::{Point, Rect, Size};
use crate::model::{Align, AnchoredRect, ConnectionPoint, Origin};
use crate::units::{Bounds, UnitValue};

/// One axis of an anchored rect: start edge, end edge, size.
#[derive(Clone, Copy)]
struct AxisSpec {
    start: Option<UnitValue>,
    end: Option<UnitValue>,
    size: Option<UnitValue>,
}

impl AxisSpec {
    fn x(loc: &AnchoredRect) -> Self {
        Self {
            start: loc.left,
            end: loc.right,
            size: loc.width,
        }
    }

    fn y(loc: &AnchoredRect) -> Self {
        Self {
            start: loc.top,
            end: loc.bottom,
            size: loc.height,
        }
    }

    fn is_size_unmanaged(&self) -> bool {
        match (self.start, self.end, self.size) {
            (_, _, Some(size)) => size.is_unmanaged(),
            (Some(_), None, None) => true,
            _ => false,
        }
    }
}

/// Pixel conversion bound to one axis.
#[derive(Clone, Copy)]
struct AxisRef<'a> {
    axis: Axis,
    bounds: &'a Bounds,
}

impl AxisRef<'_> {
    fn extent(&self) -> f32 {
        match self.axis {
            Axis::X => self.bounds.container.width,
            Axis::Y => self.bounds.container.height,
        }
    }

    fn to_px(&self, v: &UnitValue) -> f32 {
        match self.axis {
            Axis::X => v.to_pixel_x(self.bounds),
            Axis::Y => v.to_pixel_y(self.bounds),
        }
    }

    fn from_px(&self, like: &UnitValue, px: f32) -> UnitValue {
        match self.axis {
            Axis::X => like.with_pixel_x(px, self.bounds),
            Axis::Y => like.with_pixel_y(px, self.bounds),
        }
    }
}

// ─── Forward ─────────────────────────────────────────────────────────────

/// Resolve an anchored rect with no externally measured size.
pub fn layout(loc: &AnchoredRect, bounds: &Bounds) -> Result<Rect, LayoutError> {
    layout_measured(loc, bounds, Size::ZERO)
}

/// Resolve an anchored rect. Unmanaged axes take their size from `measured`.
pub fn layout_measured(
    loc: &AnchoredRect,
    bounds: &Bounds,
    measured: Size,
) -> Result<Rect, LayoutError> {
    let x_ref = AxisRef {
        axis: Axis::X,
        bounds,
    };
    let y_ref = AxisRef {
        axis: Axis::Y,
        bounds,
    };
    let (x, width) = resolve_axis(x_ref, AxisSpec::x(loc), measured.width)?;
    let (y, height) = resolve_axis(y_ref, AxisSpec::y(loc), measured.height)?;
    Ok(Rect::new(x, y, width, height))
}

fn resolve_axis(r: AxisRef<'_>, spec: AxisSpec, measured: f32) -> Result<(f32, f32), LayoutError> {
    let size_px = |size: &UnitValue| {
        if size.is_unmanaged() {
            measured
        } else {
            r.to_px(size)
        }
    };

    match (spec.start, spec.end, spec.size) {
        (Some(start), end, Some(size)) => {
            if end.is_some() {
                log::debug!("{} axis over-specified, ignoring end edge", r.axis);
            }
            Ok((r.to_px(&start), size_px(&size)))
        }
        (Some(start), Some(end), None) => {
            let pos = r.to_px(&start);
            let size = (r.extent() - pos - r.to_px(&end)).max(0.0);
            Ok((pos, size))
        }
        (Some(start), None, None) => Ok((r.to_px(&start), measured)),
        (None, Some(end), Some(size)) => {
            let size = size_px(&size);
            Ok((r.extent() - r.to_px(&end) - size, size))
        }
        (None, Some(_), None) => Err(LayoutError::under_specified(
            r.axis,
            "an end edge requires a size",
        )),
        (None, None, _) => Err(LayoutError::under_specified(
            r.axis,
            "neither start nor end edge is set",
        )),
    }
}

/// True when the width is supplied externally rather than by the rect.
pub fn is_width_unmanaged(loc: &AnchoredRect) -> bool {
    AxisSpec::x(loc).is_size_unmanaged()
}

pub fn is_height_unmanaged(loc: &AnchoredRect) -> bool {
    AxisSpec::y(loc).is_size_unmanaged()
}

// ─── Origin ──────────────────────────────────────────────────────────────

/// Shift so that `origin` of the box sits where its top-left was.
pub fn apply_origin(rect: Rect, origin: &Origin) -> Rect {
    Rect {
        x: rect.x - origin.x * rect.width,
        y: rect.y - origin.y * rect.height,
        ..rect
    }
}

pub fn remove_origin(rect: Rect, origin: &Origin) -> Rect {
    Rect {
        x: rect.x + origin.x * rect.width,
        y: rect.y + origin.y * rect.height,
        ..rect
    }
}

// ─── Alignment ───────────────────────────────────────────────────────────

pub fn connection_point(rect: &Rect, cp: ConnectionPoint) -> Point {
    let (fx, fy) = cp.fraction();
    Point::new(rect.x + fx * rect.width, rect.y + fy * rect.height)
}

/// The rect of `size` whose connection point `cp` lies at `point`.
pub fn place_at_connection(point: Point, size: Size, cp: ConnectionPoint) -> Rect {
    let (fx, fy) = cp.fraction();
    Rect::new(
        point.x - fx * size.width,
        point.y - fy * size.height,
        size.width,
        size.height,
    )
}

/// Place a box of `size` so its `self_point` meets `source` of `target`
/// plus the offset.
pub fn resolve_align(size: Size, align: &Align, target: &Rect) -> Rect {
    let source = connection_point(target, align.source);
    let anchor = Point::new(source.x + align.offset.x, source.y + align.offset.y);
    place_at_connection(anchor, size, align.self_point)
}

/// The alignment that places a block at `rect`: only the offset changes.
pub fn inverse_align(rect: &Rect, align: &Align, target: &Rect) -> Align {
    let own = connection_point(rect, align.self_point);
    let source = connection_point(target, align.source);
    Align {
        offset: Point::new(own.x - source.x, own.y - source.y),
        ..*align
    }
}

// ─── Inverse ─────────────────────────────────────────────────────────────

/// Re-express `rect` with the fields present in `previous`, each in its own
/// unit, so that `layout` of the result reproduces `rect`.
///
/// Origin must already be removed from `rect`. Unmanaged sizes are kept.
pub fn inverse_layout(
    rect: &Rect,
    previous: &AnchoredRect,
    bounds: &Bounds,
) -> Result<AnchoredRect, LayoutError> {
    let x_ref = AxisRef {
        axis: Axis::X,
        bounds,
    };
    let y_ref = AxisRef {
        axis: Axis::Y,
        bounds,
    };
    let x = inverse_axis(x_ref, AxisSpec::x(previous), rect.x, rect.width)?;
    let y = inverse_axis(y_ref, AxisSpec::y(previous), rect.y, rect.height)?;
    Ok(AnchoredRect {
        left: x.start,
        right: x.end,
        width: x.size,
        top: y.start,
        bottom: y.end,
        height: y.size,
    })
}

fn inverse_axis(r: AxisRef<'_>, prev: AxisSpec, pos: f32, size: f32) -> Result<AxisSpec, LayoutError> {
    if prev.start.is_none() && prev.end.is_none() {
        return Err(LayoutError::under_specified(
            r.axis,
            "neither start nor end edge is set",
        ));
    }
    if prev.start.is_none() && prev.size.is_none() {
        return Err(LayoutError::under_specified(
            r.axis,
            "an end edge requires a size",
        ));
    }

    let start = prev.start.map(|s| r.from_px(&s, pos));
    let end = prev.end.map(|e| r.from_px(&e, r.extent() - pos - size));
    let size = prev.size.map(|s| {
        if s.is_unmanaged() {
            s
        } else {
            r.from_px(&s, size)
        }
    });
    Ok(AxisSpec { start, end, size })
}
