//! Declarative block description: anchored rects, origins, alignment and
//! the typed metadata contract shared with hooks and services.
//!
//! A block is specified relative to its container with unit-bearing edges
//! (`left: 10%, width: 200, bottom: 20`). Nothing here holds pixels except
//! `Align::offset`; pixels live on the resolved `Block`.

use crate::geometry::{Point, Rect};
use crate::id::BlockId;
use crate::units::UnitValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

// ─── Anchored rect ───────────────────────────────────────────────────────

/// Up to six optional, unit-bearing edges and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchoredRect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<UnitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<UnitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<UnitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<UnitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<UnitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<UnitValue>,
}

impl AnchoredRect {
    pub fn new() -> Self {
        Self::default()
    }

    /// `left/top/width/height`, all in pixels.
    pub fn px(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new().left(x).top(y).width(width).height(height)
    }

    #[must_use]
    pub fn left(mut self, v: impl Into<UnitValue>) -> Self {
        self.left = Some(v.into());
        self
    }

    #[must_use]
    pub fn right(mut self, v: impl Into<UnitValue>) -> Self {
        self.right = Some(v.into());
        self
    }

    #[must_use]
    pub fn top(mut self, v: impl Into<UnitValue>) -> Self {
        self.top = Some(v.into());
        self
    }

    #[must_use]
    pub fn bottom(mut self, v: impl Into<UnitValue>) -> Self {
        self.bottom = Some(v.into());
        self
    }

    #[must_use]
    pub fn width(mut self, v: impl Into<UnitValue>) -> Self {
        self.width = Some(v.into());
        self
    }

    #[must_use]
    pub fn height(mut self, v: impl Into<UnitValue>) -> Self {
        self.height = Some(v.into());
        self
    }
}

/// Which point of the box lands on the resolved left/top, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

impl Origin {
    pub const CENTER: Origin = Origin { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ─── Alignment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    RightCenter,
    BottomRight,
    BottomCenter,
    BottomLeft,
    LeftCenter,
    Center,
}

impl ConnectionPoint {
    /// Fractional position of this point within a box.
    pub fn fraction(self) -> (f32, f32) {
        match self {
            ConnectionPoint::TopLeft => (0.0, 0.0),
            ConnectionPoint::TopCenter => (0.5, 0.0),
            ConnectionPoint::TopRight => (1.0, 0.0),
            ConnectionPoint::RightCenter => (1.0, 0.5),
            ConnectionPoint::BottomRight => (1.0, 1.0),
            ConnectionPoint::BottomCenter => (0.5, 1.0),
            ConnectionPoint::BottomLeft => (0.0, 1.0),
            ConnectionPoint::LeftCenter => (0.0, 0.5),
            ConnectionPoint::Center => (0.5, 0.5),
        }
    }
}

/// The block an `Align` points at: by name, or by insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignKey {
    Name(BlockId),
    Index(usize),
}

impl fmt::Display for AlignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignKey::Name(id) => write!(f, "{id}"),
            AlignKey::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for AlignKey {
    fn from(s: &str) -> Self {
        AlignKey::Name(BlockId::intern(s))
    }
}

impl From<BlockId> for AlignKey {
    fn from(id: BlockId) -> Self {
        AlignKey::Name(id)
    }
}

impl From<usize> for AlignKey {
    fn from(i: usize) -> Self {
        AlignKey::Index(i)
    }
}

/// Pin `self_point` of this block to `source` of the block named by `key`,
/// shifted by `offset` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Align {
    pub key: AlignKey,
    pub source: ConnectionPoint,
    #[serde(rename = "self")]
    pub self_point: ConnectionPoint,
    #[serde(default)]
    pub offset: Point,
}

impl Align {
    pub fn new(key: impl Into<AlignKey>, source: ConnectionPoint, self_point: ConnectionPoint) -> Self {
        Self {
            key: key.into(),
            source,
            self_point,
            offset: Point::ZERO,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Point::new(x, y);
        self
    }
}

// ─── Block layout ────────────────────────────────────────────────────────

/// The declarative input for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub name: BlockId,
    pub location: AnchoredRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default)]
    pub layer: i32,
}

impl BlockLayout {
    pub fn new(name: impl Into<BlockId>, location: AnchoredRect) -> Self {
        Self {
            name: name.into(),
            location,
            origin: None,
            align: None,
            layer: 0,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }
}

// ─── Block metadata ──────────────────────────────────────────────────────

/// Keys of the per-block metadata map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKey {
    /// Distance travelled along an animation path.
    Distance,
    /// Prefix of the path hook driving the block.
    Hook,
    DragData,
    DragImage,
    DragEnter,
    DragLeave,
    CanDrop,
    Drop,
    EndDrop,
    Custom(String),
}

impl From<&str> for DataKey {
    fn from(s: &str) -> Self {
        DataKey::Custom(s.to_string())
    }
}

/// Values of the per-block metadata map. Callback variants are shared
/// handles, cloned cheaply out of the map before being invoked.
#[derive(Clone)]
pub enum DataValue {
    Number(f32),
    Point(Point),
    Rect(Rect),
    Text(String),
    Ids(Vec<BlockId>),
    Predicate(Rc<dyn Fn(&[BlockId]) -> bool>),
    Action(Rc<dyn Fn(&[BlockId])>),
    Provider(Rc<dyn Fn(BlockId) -> Vec<BlockId>>),
    Notify(Rc<dyn Fn()>),
}

impl DataValue {
    pub fn predicate(f: impl Fn(&[BlockId]) -> bool + 'static) -> Self {
        DataValue::Predicate(Rc::new(f))
    }

    pub fn action(f: impl Fn(&[BlockId]) + 'static) -> Self {
        DataValue::Action(Rc::new(f))
    }

    pub fn provider(f: impl Fn(BlockId) -> Vec<BlockId> + 'static) -> Self {
        DataValue::Provider(Rc::new(f))
    }

    pub fn notify(f: impl Fn() + 'static) -> Self {
        DataValue::Notify(Rc::new(f))
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            DataValue::Point(p) => f.debug_tuple("Point").field(p).finish(),
            DataValue::Rect(r) => f.debug_tuple("Rect").field(r).finish(),
            DataValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            DataValue::Ids(ids) => f.debug_tuple("Ids").field(ids).finish(),
            DataValue::Predicate(_) => f.write_str("Predicate(..)"),
            DataValue::Action(_) => f.write_str("Action(..)"),
            DataValue::Provider(_) => f.write_str("Provider(..)"),
            DataValue::Notify(_) => f.write_str("Notify(..)"),
        }
    }
}
