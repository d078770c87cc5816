//! Width-dependent animation paths.
//!
//! A path is declared as a list of breakpoints, each covering a range of
//! container widths. Points are unit-bearing and taken in pairs, one line
//! segment per pair, so a path may jump between disconnected segments.

use lg_core::{Bounds, Line, Piecewise, UnitPoint};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Path points used while the container width is in `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathBreakpoint {
    pub min: f32,
    pub max: f32,
    pub points: SmallVec<[UnitPoint; 8]>,
}

impl PathBreakpoint {
    pub fn new(min: f32, max: f32, points: impl IntoIterator<Item = UnitPoint>) -> Self {
        Self {
            min,
            max,
            points: points.into_iter().collect(),
        }
    }

    /// Covers every width.
    pub fn any_width(points: impl IntoIterator<Item = UnitPoint>) -> Self {
        Self::new(0.0, f32::INFINITY, points)
    }

    pub fn contains(&self, width: f32) -> bool {
        width >= self.min && width < self.max
    }
}

/// Resolve the path for `bounds` from the first breakpoint covering the
/// container width. `None` when no breakpoint matches or the match has
/// fewer than two points.
///
/// `breakpoints` must be sorted by `min`.
pub fn select_path(breakpoints: &[PathBreakpoint], bounds: &Bounds) -> Option<Piecewise> {
    let width = bounds.container.width;
    let bp = breakpoints.iter().find(|bp| bp.contains(width))?;

    if bp.points.len() % 2 != 0 {
        log::warn!(
            "path breakpoint [{}, {}) has an odd number of points, ignoring the last",
            bp.min,
            bp.max
        );
    }

    let lines: Vec<Line> = bp
        .points
        .chunks_exact(2)
        .map(|pair| Line::new(pair[0].resolve(bounds), pair[1].resolve(bounds)))
        .collect();
    if lines.is_empty() {
        log::debug!("path breakpoint [{}, {}) has no segment", bp.min, bp.max);
        return None;
    }
    Some(Piecewise::new(lines))
}
