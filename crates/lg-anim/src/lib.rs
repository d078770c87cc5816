//! Path animation for LG generators.
//!
//! A [`PathHook`] is registered on a [`lg_core::Generator`] and, on every
//! tick, walks blocks along a width-dependent piecewise path.

pub mod hook;
pub mod path;

pub use hook::{InputSource, PathConfig, PathHook, XRef, YRef};
pub use path::{PathBreakpoint, select_path};
