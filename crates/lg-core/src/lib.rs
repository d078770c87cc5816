pub mod arrange;
pub mod block;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod params;
pub mod queue;
pub mod registry;
pub mod stacking;
pub mod units;

pub use arrange::{Flow, FlowParams, Reflow};
pub use block::Block;
pub use error::{Axis, LayoutError, PersistError};
pub use generator::{CreateFn, Generator, Hook, TickContext, location_key, offset_key};
pub use geometry::{Insets, Line, Piecewise, Point, Rect, Side, Size, UnitPoint};
pub use id::BlockId;
pub use layout::{inverse_layout, layout};
pub use model::*;
pub use params::{LocalStore, ParamValue, Params, Persist};
pub use queue::Queue;
pub use registry::Blocks;
pub use units::{Bounds, Unit, UnitValue, parse_unit};
