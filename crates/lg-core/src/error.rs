//! Error types for layout resolution and persistence.
//!
//! Everything in `LayoutError` is a configuration error: the caller handed
//! the engine a specification it cannot satisfy. These are surfaced to the
//! caller of the offending operation and never retried. Transient states
//! (empty container, empty queues) are not errors and never reach here.

use std::fmt;
use thiserror::Error;

/// Layout axis, used to point at the offending half of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Placeholder block name for errors raised by the pure layout functions.
/// Replaced with the real name by [`LayoutError::for_block`].
pub(crate) const ANONYMOUS: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// An axis of an anchored rect has no usable edge/size combination.
    #[error("block '{block}' is under-specified on the {axis} axis: {reason}")]
    UnderSpecified {
        block: String,
        axis: Axis,
        reason: String,
    },

    /// An `Align` key does not resolve to a block in the registry.
    #[error("align key '{key}' not found for block '{block}'")]
    AlignTargetMissing { block: String, key: String },

    /// A path hook was asked to move a block along an edge it does not define.
    #[error("path '{path}' cannot update the {axis} position of block '{block}'")]
    PathEdge {
        path: String,
        block: String,
        axis: Axis,
    },

    /// A unit string without a numeric prefix.
    #[error("invalid unit value '{input}'")]
    InvalidUnit { input: String },

    /// An operation named a block the registry does not hold.
    #[error("unknown block '{name}'")]
    UnknownBlock { name: String },
}

impl LayoutError {
    pub fn under_specified(axis: Axis, reason: impl Into<String>) -> Self {
        Self::UnderSpecified {
            block: ANONYMOUS.to_string(),
            axis,
            reason: reason.into(),
        }
    }

    pub fn unknown_block(name: impl fmt::Display) -> Self {
        Self::UnknownBlock {
            name: name.to_string(),
        }
    }

    /// Attach the block name to an error raised by a pure layout function.
    #[must_use]
    pub fn for_block(self, name: &str) -> Self {
        match self {
            Self::UnderSpecified {
                block,
                axis,
                reason,
            } if block == ANONYMOUS => Self::UnderSpecified {
                block: name.to_string(),
                axis,
                reason,
            },
            Self::AlignTargetMissing { block, key } if block == ANONYMOUS => {
                Self::AlignTargetMissing {
                    block: name.to_string(),
                    key,
                }
            }
            other => other,
        }
    }
}

/// Failures of the binary params snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode params snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode params snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_block_names_anonymous_errors() {
        let err = LayoutError::under_specified(Axis::Y, "bottom requires height").for_block("footer");
        assert_eq!(
            err.to_string(),
            "block 'footer' is under-specified on the y axis: bottom requires height"
        );
    }

    #[test]
    fn for_block_keeps_named_errors() {
        let err = LayoutError::AlignTargetMissing {
            block: "label".into(),
            key: "icon".into(),
        };
        assert_eq!(err.clone().for_block("other"), err);
    }
}
