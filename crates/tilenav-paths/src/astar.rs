//! A* search over a [`Grid`].

use rustc_hash::FxHashSet;
use tilenav_core::{Grid, IMPASSABLE, Point};

use crate::chain::{NodeChain, PathOrder};
use crate::config::SearchConfig;
use crate::distance::{manhattan, octile};
use crate::neighbors::Neighbors;
use crate::node::{NodeId, SearchNode};
use crate::open_set::OpenSet;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    Found,
    /// The frontier emptied, or the goal itself is impassable.
    Unreachable,
    /// Start or goal lies outside the grid.
    OutOfBounds,
    /// [`SearchConfig::max_expansions`] was reached first.
    BudgetExhausted,
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Nodes moved to the closed set.
    pub expanded: usize,
    /// Distinct coordinates ever placed on the frontier.
    pub discovered: usize,
    /// Largest frontier size observed.
    pub max_open: usize,
    /// Open entries whose cost was lowered in place by a cheaper route.
    pub updated: usize,
}

/// Outcome of [`Pathfinder::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Start to goal inclusive; empty unless `status` is `Found`.
    pub path: Vec<Point>,
    pub status: SearchStatus,
    /// Total cost of `path`, when one was found.
    pub cost: Option<i32>,
    pub stats: SearchStats,
}

impl SearchResult {
    fn failed(status: SearchStatus, stats: SearchStats) -> Self {
        Self {
            path: Vec::new(),
            status,
            cost: None,
            stats,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.status == SearchStatus::Found
    }
}

/// Reusable A* state.
///
/// The node arena, open set and closed set are cleared, not freed, between
/// calls, so repeated searches stop allocating once warmed up. Each thread
/// needs its own `Pathfinder`; the grid is only read.
pub struct Pathfinder {
    config: SearchConfig,
    nodes: Vec<SearchNode>,
    open: OpenSet,
    closed: FxHashSet<Point>,
    neighbors: Neighbors,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Pathfinder {
    /// Create a pathfinder with empty scratch space.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            open: OpenSet::new(),
            closed: FxHashSet::default(),
            neighbors: Neighbors::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Shortest path from `start` to `goal`, both inclusive, or an empty
    /// vector when there is none.
    ///
    /// `start == goal` yields `[start]`.
    pub fn find_path<G: Grid + ?Sized>(
        &mut self,
        grid: &G,
        start: Point,
        goal: Point,
    ) -> Vec<Point> {
        self.search(grid, start, goal).path
    }

    /// Run A* and report the path together with how the search ended.
    pub fn search<G: Grid + ?Sized>(
        &mut self,
        grid: &G,
        start: Point,
        goal: Point,
    ) -> SearchResult {
        if !grid.contains(start) || !grid.contains(goal) {
            log::debug!("search {start} -> {goal}: endpoint outside {}", grid.bounds());
            return SearchResult::failed(SearchStatus::OutOfBounds, SearchStats::default());
        }
        if start == goal {
            return SearchResult {
                path: vec![start],
                status: SearchStatus::Found,
                cost: Some(0),
                stats: SearchStats::default(),
            };
        }
        if grid.movement_penalty(goal) == IMPASSABLE {
            log::debug!("search {start} -> {goal}: goal is impassable");
            return SearchResult::failed(SearchStatus::Unreachable, SearchStats::default());
        }

        self.nodes.clear();
        self.open.clear();
        self.closed.clear();

        let diagonals = self.config.diagonals;
        let heuristic = |p: Point| {
            if diagonals {
                octile(p, goal)
            } else {
                manhattan(p, goal)
            }
        };

        let h = heuristic(start);
        self.nodes.push(SearchNode::new(start, 0, h, None));
        self.open.push(NodeId(0), start, h, h);
        let mut stats = SearchStats {
            discovered: 1,
            max_open: 1,
            ..SearchStats::default()
        };

        let corner_cutting = self.config.corner_cutting;
        let budget = self.config.max_expansions;

        let outcome = loop {
            let Some(current) = self.open.pop() else {
                break Err(SearchStatus::Unreachable);
            };
            if current.pos == goal {
                break Ok(current.node);
            }
            if budget.is_some_and(|limit| stats.expanded >= limit) {
                break Err(SearchStatus::BudgetExhausted);
            }

            self.closed.insert(current.pos);
            stats.expanded += 1;

            let cur = self.nodes[current.node.0];
            let closed = &self.closed;
            let keep = |n: Point| {
                passable(grid, n)
                    && !closed.contains(&n)
                    && (corner_cutting || !cuts_corner(grid, cur.pos, n))
            };
            let candidates = if diagonals {
                self.neighbors.all(cur.pos, keep)
            } else {
                self.neighbors.cardinal(cur.pos, keep)
            };

            for &np in candidates {
                let g = cur
                    .g
                    .saturating_add(octile(cur.pos, np))
                    .saturating_add(grid.movement_penalty(np));

                match self.open.get(np).map(|e| e.node) {
                    None => {
                        let h = heuristic(np);
                        let id = NodeId(self.nodes.len());
                        self.nodes.push(SearchNode::new(np, g, h, Some(current.node)));
                        self.open.push(id, np, g.saturating_add(h), h);
                        stats.discovered += 1;
                    }
                    Some(id) => {
                        let node = &mut self.nodes[id.0];
                        if g < node.g {
                            node.g = g;
                            node.parent = Some(current.node);
                            self.open.decrease_key(np, node.f(), node.h);
                            stats.updated += 1;
                        }
                    }
                }
            }
            stats.max_open = stats.max_open.max(self.open.len());
        };

        match outcome {
            Ok(end) => {
                let chain = NodeChain::new(&self.nodes, end);
                let path = chain.retrace(PathOrder::StartToGoal);
                let cost = chain.end().g;
                log::debug!(
                    "search {start} -> {goal}: {} steps, cost {cost}, {} expanded",
                    path.len(),
                    stats.expanded
                );
                SearchResult {
                    path,
                    status: SearchStatus::Found,
                    cost: Some(cost),
                    stats,
                }
            }
            Err(status) => {
                if status == SearchStatus::BudgetExhausted {
                    log::warn!(
                        "search {start} -> {goal}: gave up after {} expansions",
                        stats.expanded
                    );
                } else {
                    log::debug!(
                        "search {start} -> {goal}: no path, {} expanded",
                        stats.expanded
                    );
                }
                SearchResult::failed(status, stats)
            }
        }
    }
}

/// One-shot search with the default configuration.
pub fn find_path<G: Grid + ?Sized>(grid: &G, start: Point, goal: Point) -> Vec<Point> {
    Pathfinder::default().find_path(grid, start, goal)
}

#[inline]
fn passable<G: Grid + ?Sized>(grid: &G, p: Point) -> bool {
    grid.contains(p) && grid.movement_penalty(p) != IMPASSABLE
}

/// Whether the diagonal step `from -> to` squeezes past an impassable
/// orthogonal neighbour.
#[inline]
fn cuts_corner<G: Grid + ?Sized>(grid: &G, from: Point, to: Point) -> bool {
    if from.x == to.x || from.y == to.y {
        return false;
    }
    !passable(grid, Point::new(to.x, from.y)) || !passable(grid, Point::new(from.x, to.y))
}
