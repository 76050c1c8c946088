//! Engine events and where they go.
//!
//! ## Key Types
//!
//! - [`GameEvent`]: everything a broadcaster needs to tell clients
//! - [`EventSink`]: the receiving side, supplied by the caller
//! - [`EventLog`]: an in-memory sink for tests and the simulator
//!
//! Delivery to clients is not the engine's concern. A sink may forward to a
//! channel, a websocket hub, or nowhere.

pub mod event;
pub mod sink;

pub use event::{CellUpdate, GameEvent};
pub use sink::{EventLog, EventSink, NullSink};
