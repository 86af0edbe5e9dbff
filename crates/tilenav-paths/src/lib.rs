//! A* pathfinding over tile grids.
//!
//! - [`Pathfinder`] runs 8-way A* against any [`Grid`](tilenav_core::Grid),
//!   reusing its node arena and frontier between calls.
//! - [`OpenSet`] is the indexed min-heap behind the frontier: lookup by
//!   coordinate and in-place decrease-key.
//! - [`NodeChain`] turns the parent links of a finished search into a path.
//!
//! Costs use the octile metric ([`CARDINAL_COST`] per straight step,
//! [`DIAGONAL_COST`] per diagonal step) for both edges and the heuristic,
//! plus each entered cell's movement penalty. With diagonals turned off in
//! [`SearchConfig`] the search is 4-way and [`manhattan`] is the heuristic.

mod astar;
mod chain;
mod config;
mod distance;
mod neighbors;
mod node;
mod open_set;

pub use astar::{Pathfinder, SearchResult, SearchStats, SearchStatus, find_path};
pub use chain::{ChainIter, NodeChain, PathOrder, collapse, join_paths};
pub use config::SearchConfig;
pub use distance::{CARDINAL_COST, DIAGONAL_COST, manhattan, octile};
pub use neighbors::{DIRECTIONS_8, Neighbors};
pub use node::{NodeId, SearchNode};
pub use open_set::{OpenEntry, OpenSet};
