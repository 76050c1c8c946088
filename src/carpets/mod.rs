//! Carpets on the board.
//!
//! ## Key Types
//!
//! - `CarpetLayer`: per-cell stacks of placements, flood fill, removal
//! - `CarpetPlacement`: one cell of one laid carpet, tagged with its turn
//!
//! The `policy` functions decide whether a placement is legal; the layer
//! itself records whatever it is given.

pub mod layer;
pub mod policy;

pub use layer::{CarpetLayer, CarpetPlacement};
