//! Geometry primitives: points, sizes, rectangles, line segments and the
//! piecewise-linear path sampled by arc length.

use crate::units::{Bounds, UnitValue, to_pixel_x, to_pixel_y};
use serde::{Deserialize, Serialize};

// ─── Points & sizes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True while either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Per-side distances (margins, paddings).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

// ─── Rect ────────────────────────────────────────────────────────────────

/// An absolute rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Axis-aligned overlap test. Touching edges count as overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (l1, t1, r1, b1) = (self.x, self.y, self.right(), self.bottom());
        let (l2, t2, r2, b2) = (other.x, other.y, other.right(), other.bottom());
        !(b1 < t2 || t1 > b2 || r1 < l2 || l1 > r2)
    }

    /// Clamp this rect inside `boundary`, keeping its size.
    #[must_use]
    pub fn pinned_within(&self, boundary: &Rect) -> Rect {
        let mut r = *self;
        if r.x < boundary.x {
            r.x = boundary.x;
        }
        if r.right() > boundary.right() {
            r.x = boundary.right() - r.width;
        }
        if r.y < boundary.y {
            r.y = boundary.y;
        }
        if r.bottom() > boundary.bottom() {
            r.y = boundary.bottom() - r.height;
        }
        r
    }

    /// The four sides as segments, in `top, bottom, left, right` order.
    fn sides(&self) -> [(Side, Line); 4] {
        let tl = Point::new(self.x, self.y);
        let tr = Point::new(self.right(), self.y);
        let bl = Point::new(self.x, self.bottom());
        let br = Point::new(self.right(), self.bottom());
        [
            (Side::Top, Line::new(tl, tr)),
            (Side::Bottom, Line::new(bl, br)),
            (Side::Left, Line::new(tl, bl)),
            (Side::Right, Line::new(tr, br)),
        ]
    }
}

// ─── Lines ───────────────────────────────────────────────────────────────

/// A side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// An immutable line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// The point at fraction `t` (0..=1) of the segment.
    pub fn lerp(&self, t: f32) -> Point {
        Point::new(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
        )
    }
}

/// Intersection point of segments `p0→p1` and `p2→p3`, if they cross.
/// Parallel and collinear segments report no intersection.
pub fn line_intersection(p0: Point, p1: Point, p2: Point, p3: Point) -> Option<Point> {
    let s1 = Point::new(p1.x - p0.x, p1.y - p0.y);
    let s2 = Point::new(p3.x - p2.x, p3.y - p2.y);

    let d = -s2.x * s1.y + s1.x * s2.y;
    if d.abs() <= f32::EPSILON {
        return None;
    }

    let s = (-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y)) / d;
    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / d;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(Point::new(p0.x + t * s1.x, p0.y + t * s1.y))
    } else {
        None
    }
}

/// The first side of `rect` crossed by `line` (checked top, bottom, left,
/// right) and the crossing point.
///
/// With `offset`, the returned point is instead the point at that fraction
/// along the crossed side, e.g. `Some(0.5)` snaps to the side's midpoint.
/// Used to attach connectors to blocks.
pub fn line_rect_intersection(line: &Line, rect: &Rect, offset: Option<f32>) -> Option<(Side, Point)> {
    rect.sides().into_iter().find_map(|(side, edge)| {
        let hit = line_intersection(line.start, line.end, edge.start, edge.end)?;
        match offset {
            Some(t) => Some((side, edge.lerp(t))),
            None => Some((side, hit)),
        }
    })
}

// ─── Piecewise path ──────────────────────────────────────────────────────

/// A path made of line segments, sampled by arc length.
///
/// Segments need not be connected: the distance runs over the concatenation
/// of segment lengths, jumping from one segment's end to the next's start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Piecewise {
    lines: Vec<Line>,
    length: f32,
}

impl Piecewise {
    pub fn new(lines: Vec<Line>) -> Self {
        let length = lines.iter().map(Line::length).sum();
        Self { lines, length }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The point `distance` pixels along the path, or `None` when the
    /// distance is negative or past the end (the path is exhausted).
    pub fn point(&self, distance: f32) -> Option<Point> {
        if distance < 0.0 || distance > self.length || self.lines.is_empty() {
            return None;
        }

        let mut remaining = distance;
        for line in &self.lines {
            let len = line.length();
            if remaining <= len {
                if len == 0.0 {
                    return Some(line.start);
                }
                return Some(line.lerp(remaining / len));
            }
            remaining -= len;
        }

        // Float drift on the final segment
        self.lines.last().map(|l| l.end)
    }
}

// ─── Unit-bearing points ─────────────────────────────────────────────────

/// A point whose coordinates carry units, e.g. `{x: 50%, y: 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub x: UnitValue,
    pub y: UnitValue,
}

impl UnitPoint {
    pub fn new(x: impl Into<UnitValue>, y: impl Into<UnitValue>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn resolve(&self, bounds: &Bounds) -> Point {
        Point::new(
            to_pixel_x(self.x.value, self.x.unit, bounds),
            to_pixel_y(self.y.value, self.y.unit, bounds),
        )
    }
}
