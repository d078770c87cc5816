//! Unit-bearing values and their conversion to and from pixels.
//!
//! Built on `winnow` 0.7 for the `"50%"` / `"10vw"` string form.

use crate::error::LayoutError;
use crate::geometry::Size;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use winnow::combinator::{alt, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::ascii::space0;
use winnow::token::take_while;

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Container and viewport extents, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub container: Size,
    pub viewport: Size,
}

impl Bounds {
    pub fn new(container: Size, viewport: Size) -> Self {
        Self {
            container,
            viewport,
        }
    }
}

// ─── Units ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    #[default]
    Px,
    /// Percent of the container extent along the same axis.
    Percent,
    Vw,
    Vh,
    Vmin,
    Vmax,
    /// Percent of the container width.
    Pw,
    /// Percent of the container height.
    Ph,
    Pmin,
    Pmax,
    /// The axis size is supplied externally (measured content).
    Unmanaged,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
            Unit::Pw => "pw",
            Unit::Ph => "ph",
            Unit::Pmin => "pmin",
            Unit::Pmax => "pmax",
            Unit::Unmanaged => "unmanaged",
        }
    }
}

/// A number plus its unit. Pixels serialize as bare numbers, everything
/// else as a suffixed string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitValue {
    pub value: f32,
    pub unit: Unit,
}

impl UnitValue {
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn px(value: f32) -> Self {
        Self::new(value, Unit::Px)
    }

    pub const fn percent(value: f32) -> Self {
        Self::new(value, Unit::Percent)
    }

    pub const fn vw(value: f32) -> Self {
        Self::new(value, Unit::Vw)
    }

    pub const fn vh(value: f32) -> Self {
        Self::new(value, Unit::Vh)
    }

    pub const fn unmanaged() -> Self {
        Self::new(0.0, Unit::Unmanaged)
    }

    pub fn is_unmanaged(&self) -> bool {
        self.unit == Unit::Unmanaged
    }

    pub fn to_pixel_x(&self, bounds: &Bounds) -> f32 {
        to_pixel_x(self.value, self.unit, bounds)
    }

    pub fn to_pixel_y(&self, bounds: &Bounds) -> f32 {
        to_pixel_y(self.value, self.unit, bounds)
    }

    /// The same unit, re-expressed from a horizontal pixel amount.
    #[must_use]
    pub fn with_pixel_x(&self, px: f32, bounds: &Bounds) -> Self {
        Self::new(from_pixel_x(px, self.unit, bounds), self.unit)
    }

    #[must_use]
    pub fn with_pixel_y(&self, px: f32, bounds: &Bounds) -> Self {
        Self::new(from_pixel_y(px, self.unit, bounds), self.unit)
    }
}

impl From<f32> for UnitValue {
    fn from(value: f32) -> Self {
        Self::px(value)
    }
}

impl From<i32> for UnitValue {
    fn from(value: i32) -> Self {
        Self::px(value as f32)
    }
}

impl FromStr for UnitValue {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_unit(s)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Px => write!(f, "{}", self.value),
            Unit::Unmanaged => f.write_str("unmanaged"),
            unit => write!(f, "{}{}", self.value, unit.suffix()),
        }
    }
}

impl Serialize for UnitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.unit {
            Unit::Px => serializer.serialize_f32(self.value),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for UnitValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(UnitValue::px(n)),
            Raw::Text(s) => parse_unit(&s).map_err(serde::de::Error::custom),
        }
    }
}

// ─── Conversion ──────────────────────────────────────────────────────────

/// Pixels per one unit of `unit` along the horizontal axis.
fn scale_x(unit: Unit, bounds: &Bounds) -> f32 {
    let c = bounds.container;
    let v = bounds.viewport;
    match unit {
        Unit::Px => 1.0,
        Unit::Unmanaged => 0.0,
        Unit::Percent | Unit::Pw => c.width / 100.0,
        Unit::Ph => c.height / 100.0,
        Unit::Pmin => c.width.min(c.height) / 100.0,
        Unit::Pmax => c.width.max(c.height) / 100.0,
        Unit::Vw => v.width / 100.0,
        Unit::Vh => v.height / 100.0,
        Unit::Vmin => v.width.min(v.height) / 100.0,
        Unit::Vmax => v.width.max(v.height) / 100.0,
    }
}

/// Vertical counterpart: only `%` changes reference axis.
fn scale_y(unit: Unit, bounds: &Bounds) -> f32 {
    match unit {
        Unit::Percent => bounds.container.height / 100.0,
        other => scale_x(other, bounds),
    }
}

pub fn to_pixel_x(value: f32, unit: Unit, bounds: &Bounds) -> f32 {
    value * scale_x(unit, bounds)
}

pub fn to_pixel_y(value: f32, unit: Unit, bounds: &Bounds) -> f32 {
    value * scale_y(unit, bounds)
}

/// Pixels back to `unit`. A zero reference extent yields 0.
pub fn from_pixel_x(px: f32, unit: Unit, bounds: &Bounds) -> f32 {
    let scale = scale_x(unit, bounds);
    if scale == 0.0 { 0.0 } else { px / scale }
}

pub fn from_pixel_y(px: f32, unit: Unit, bounds: &Bounds) -> f32 {
    let scale = scale_y(unit, bounds);
    if scale == 0.0 { 0.0 } else { px / scale }
}

// ─── Parsing ─────────────────────────────────────────────────────────────

/// Parse `"50%"`, `"10vw"`, `"-4.5"`, `".5%"`, `"10 %"` or `"unmanaged"`.
///
/// Spaces may separate the number from its suffix. An unrecognized suffix
/// leaves the number as pixels; a missing numeric prefix is an error.
pub fn parse_unit(input: &str) -> Result<UnitValue, LayoutError> {
    let trimmed = input.trim();
    if trimmed == "unmanaged" {
        return Ok(UnitValue::unmanaged());
    }

    let mut rest = trimmed;
    let value = parse_number(&mut rest).map_err(|_| LayoutError::InvalidUnit {
        input: input.to_string(),
    })?;
    let _ = space0::<_, ContextError>.parse_next(&mut rest);
    let unit = opt(parse_suffix)
        .parse_next(&mut rest)
        .ok()
        .flatten()
        .unwrap_or(Unit::Px);

    if !rest.trim().is_empty() {
        log::debug!("unrecognized unit suffix in '{input}', treating as pixels");
        return Ok(UnitValue::px(value));
    }
    Ok(UnitValue::new(value, unit))
}

fn parse_number(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let int = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut frac = "";
    if input.starts_with('.') {
        *input = &input[1..];
        frac = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    }
    if int.is_empty() && frac.is_empty() {
        *input = start;
        return Err(winnow::error::ErrMode::Backtrack(ContextError::new()));
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f32>()
        .map_err(|_| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

fn parse_suffix(input: &mut &str) -> ModalResult<Unit> {
    alt((
        "vmin".value(Unit::Vmin),
        "vmax".value(Unit::Vmax),
        "vw".value(Unit::Vw),
        "vh".value(Unit::Vh),
        "pmin".value(Unit::Pmin),
        "pmax".value(Unit::Pmax),
        "pw".value(Unit::Pw),
        "ph".value(Unit::Ph),
        "px".value(Unit::Px),
        "%".value(Unit::Percent),
    ))
    .parse_next(input)
}
