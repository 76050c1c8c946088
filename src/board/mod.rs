//! Board geometry.
//!
//! ## Key Types
//!
//! - `Cell`: an `(x, y)` grid position
//! - `Direction`: Assam's facing
//! - `Board`: bounds checks and the edge-reflection table that models the
//!   painted arcs around the physical board

pub mod geometry;
pub mod reflection;

pub use geometry::{Cell, Direction, ParseDirectionError, BOARD_SIZE, CELL_COUNT};
pub use reflection::Board;
