//! **tilenav-core**: shared types for tile-based navigation.
//!
//! This crate provides the foundations used by the pathfinder and the room
//! graph: geometry primitives, the packed per-tile room word, and the
//! [`Grid`] capability through which both read a world's tiles.

pub mod geom;
pub mod grid;
pub mod room;

pub use geom::{Point, Range, RangeIter};
pub use grid::{Grid, IMPASSABLE, MapError, ROUGH_PENALTY, Tile, TileMap};
pub use room::{Clearance, RoomError, RoomId};
