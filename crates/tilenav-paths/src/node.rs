//! Search nodes.

use std::hash::{Hash, Hasher};

use tilenav_core::Point;

/// Handle of a [`SearchNode`] inside a search's node arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A coordinate discovered during one search.
///
/// Equality and hashing look at `pos` only: two nodes for the same cell are
/// the same node whatever their costs.
#[derive(Copy, Clone, Debug)]
pub struct SearchNode {
    pub pos: Point,
    /// Cost accumulated from the start.
    pub g: i32,
    /// Heuristic estimate to the goal.
    pub h: i32,
    /// Predecessor on the cheapest known route; `None` for the start.
    pub parent: Option<NodeId>,
}

impl SearchNode {
    /// Create a node; `parent` is `None` only for the start node.
    #[inline]
    pub fn new(pos: Point, g: i32, h: i32, parent: Option<NodeId>) -> Self {
        Self { pos, g, h, parent }
    }

    /// Total estimated cost through this node.
    #[inline]
    pub fn f(&self) -> i32 {
        self.g.saturating_add(self.h)
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for SearchNode {}

impl Hash for SearchNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pos.hash(state);
    }
}
