//! **tilenav-rooms**: coarse connectivity over a tile map.
//!
//! [`RoomLayout`] splits a [`TileMap`](tilenav_core::TileMap) into rooms and
//! single-tile doors and records them in a [`RoomGraph`], which then answers
//! reachability questions, optionally limited to the doors an agent's
//! [`Clearance`](tilenav_core::Clearance) can open.

mod graph;
mod layout;

pub use graph::{GraphError, RoomGraph, RoomKind};
pub use layout::{CHUNK_SIZE, LayoutError, LayoutStats, RoomLayout};
