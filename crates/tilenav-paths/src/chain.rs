//! Path reconstruction from parent links.

use tilenav_core::Point;

use crate::node::{NodeId, SearchNode};

/// Direction in which [`NodeChain::retrace`] lists coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PathOrder {
    #[default]
    StartToGoal,
    GoalToStart,
}

/// The chain of parent links ending at a terminal node.
///
/// Parents are assigned when a node is discovered and only replaced by a
/// strictly cheaper route while the node is still open, so the links form a
/// tree and every chain ends at the start node.
pub struct NodeChain<'a> {
    nodes: &'a [SearchNode],
    end: NodeId,
    len: usize,
}

impl<'a> NodeChain<'a> {
    /// Wrap the chain ending at `end`.
    ///
    /// # Panics
    ///
    /// Panics if `end` or any parent link is not an index into `nodes`.
    pub fn new(nodes: &'a [SearchNode], end: NodeId) -> Self {
        let mut chain = Self { nodes, end, len: 0 };
        chain.len = chain.iter().count();
        debug_assert!(chain.len <= nodes.len(), "parent links form a cycle");
        chain
    }

    /// Number of nodes from start to end inclusive.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a chain holds at least its terminal node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The terminal node.
    pub fn end(&self) -> &'a SearchNode {
        &self.nodes[self.end.0]
    }

    /// The root node, reached by following parents from the end.
    pub fn start(&self) -> &'a SearchNode {
        let mut node = self.end();
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.0];
        }
        node
    }

    /// Nodes from the terminal node back to the root.
    pub fn iter(&self) -> ChainIter<'a> {
        ChainIter {
            nodes: self.nodes,
            next: Some(self.end),
            remaining: self.nodes.len() + 1,
        }
    }

    /// Coordinates of every node in the chain.
    pub fn retrace(&self, order: PathOrder) -> Vec<Point> {
        let mut path = Vec::with_capacity(self.len);
        path.extend(self.iter().map(|n| n.pos));
        if order == PathOrder::StartToGoal {
            path.reverse();
        }
        path
    }

    /// Like [`retrace`](Self::retrace), keeping only the endpoints and the
    /// points where the direction of travel changes.
    pub fn retrace_collapsed(&self, order: PathOrder) -> Vec<Point> {
        collapse(&self.retrace(order))
    }
}

/// Iterator over a [`NodeChain`], terminal node first.
pub struct ChainIter<'a> {
    nodes: &'a [SearchNode],
    next: Option<NodeId>,
    // Guards against malformed parent links.
    remaining: usize,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a SearchNode;

    fn next(&mut self) -> Option<&'a SearchNode> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let node = &self.nodes[self.next?.0];
        self.next = node.parent;
        Some(node)
    }
}

/// Drop the interior points of every straight run in `path`.
pub fn collapse(path: &[Point]) -> Vec<Point> {
    if path.len() <= 2 {
        return path.to_vec();
    }
    let mut out = Vec::with_capacity(path.len());
    out.push(path[0]);
    for w in path.windows(3) {
        if w[0].step_toward(w[1]) != w[1].step_toward(w[2]) {
            out.push(w[1]);
        }
    }
    out.push(path[path.len() - 1]);
    out
}

/// Concatenate two paths. When `tail` starts where `head` ends, the shared
/// point appears once.
pub fn join_paths(mut head: Vec<Point>, tail: &[Point]) -> Vec<Point> {
    let skip = match (head.last(), tail.first()) {
        (Some(a), Some(b)) if a == b => 1,
        _ => 0,
    };
    head.extend_from_slice(&tail[skip..]);
    head
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an arena holding a single chain through `points`, start first.
    fn arena(points: &[(i32, i32)]) -> Vec<SearchNode> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let parent = i.checked_sub(1).map(NodeId);
                SearchNode::new(Point::new(x, y), i as i32 * 10, 0, parent)
            })
            .collect()
    }

    fn pts(points: &[(i32, i32)]) -> Vec<Point> {
        points.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn retrace_both_orders() {
        let raw = [(0, 0), (1, 1), (2, 1), (3, 1)];
        let nodes = arena(&raw);
        let chain = NodeChain::new(&nodes, NodeId(3));
        assert_eq!(chain.len(), 4);
        assert!(!chain.is_empty());
        assert_eq!(chain.start().pos, Point::new(0, 0));
        assert_eq!(chain.end().pos, Point::new(3, 1));
        assert_eq!(chain.retrace(PathOrder::StartToGoal), pts(&raw));
        let mut rev = pts(&raw);
        rev.reverse();
        assert_eq!(chain.retrace(PathOrder::GoalToStart), rev);
    }

    #[test]
    fn chain_from_the_root_is_one_node() {
        let nodes = arena(&[(5, 5), (6, 5)]);
        let chain = NodeChain::new(&nodes, NodeId(0));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.retrace(PathOrder::StartToGoal), vec![Point::new(5, 5)]);
    }

    #[test]
    fn retrace_follows_parents_not_arena_order() {
        // Arena order differs from path order after a parent was rewritten.
        let nodes = vec![
            SearchNode::new(Point::new(0, 0), 0, 0, None),
            SearchNode::new(Point::new(1, 0), 10, 0, Some(NodeId(2))),
            SearchNode::new(Point::new(1, 1), 14, 0, Some(NodeId(0))),
        ];
        let chain = NodeChain::new(&nodes, NodeId(1));
        assert_eq!(
            chain.retrace(PathOrder::StartToGoal),
            pts(&[(0, 0), (1, 1), (1, 0)])
        );
    }

    #[test]
    fn collapse_keeps_turning_points() {
        let raw = [(0, 0), (1, 0), (2, 0), (3, 1), (4, 2), (4, 3), (4, 4)];
        let nodes = arena(&raw);
        let chain = NodeChain::new(&nodes, NodeId(raw.len() - 1));
        assert_eq!(
            chain.retrace_collapsed(PathOrder::StartToGoal),
            pts(&[(0, 0), (2, 0), (4, 2), (4, 4)])
        );
        assert_eq!(collapse(&pts(&[(0, 0), (1, 1)])), pts(&[(0, 0), (1, 1)]));
        assert_eq!(collapse(&pts(&[(0, 0), (1, 1), (2, 2)])), pts(&[(0, 0), (2, 2)]));
    }

    #[test]
    fn join_drops_shared_joint() {
        let a = pts(&[(0, 0), (1, 0)]);
        let b = pts(&[(1, 0), (2, 0)]);
        assert_eq!(join_paths(a.clone(), &b), pts(&[(0, 0), (1, 0), (2, 0)]));
        let c = pts(&[(5, 5)]);
        assert_eq!(join_paths(a.clone(), &c), pts(&[(0, 0), (1, 0), (5, 5)]));
        assert_eq!(join_paths(Vec::new(), &b), b);
        assert_eq!(join_paths(a.clone(), &[]), a);
    }
}
