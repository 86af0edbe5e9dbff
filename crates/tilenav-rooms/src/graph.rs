//! Room-level connectivity.
//!
//! A [`RoomGraph`] answers "can an agent get from room A to room B" without
//! a tile-level search. Doors are ordinary nodes tagged with the clearance
//! they require; a clearance-limited query refuses to step onto a door the
//! agent may not open.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tilenav_core::{Clearance, Grid, Point, RoomId};

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomKind {
    Room,
    Door { clearance: Clearance },
}

impl RoomKind {
    /// Kind implied by a room word: non-zero clearance marks a door.
    pub fn of(id: RoomId) -> Self {
        if id.is_door() {
            Self::Door {
                clearance: id.clearance(),
            }
        } else {
            Self::Room
        }
    }

    #[inline]
    pub fn is_door(self) -> bool {
        matches!(self, Self::Door { .. })
    }

    /// Whether an agent holding `clearance` may enter.
    #[inline]
    pub fn admits(self, clearance: Clearance) -> bool {
        match self {
            Self::Room => true,
            Self::Door { clearance: required } => clearance.permits(required),
        }
    }
}

#[derive(Debug, Clone)]
struct RoomNode {
    id: RoomId,
    kind: RoomKind,
    size: u32,
    neighbors: Vec<usize>,
}

/// Undirected graph of rooms and doors.
///
/// Nodes live in recycled slots and refer to each other by slot index.
/// Every edge is recorded on both endpoints and, once, in a set of
/// [connection keys](RoomId::connection_key). Rooms are also grouped by the
/// chunk their word names, so a chunk can be dropped without a full scan.
#[derive(Debug, Clone, Default)]
pub struct RoomGraph {
    slots: Vec<Option<RoomNode>>,
    free: Vec<usize>,
    index: FxHashMap<RoomId, usize>,
    edges: FxHashSet<u64>,
    chunks: FxHashMap<(u8, u8), Vec<RoomId>>,
}

impl RoomGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms (doors included).
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn contains(&self, id: RoomId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn kind(&self, id: RoomId) -> Option<RoomKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Number of tiles currently assigned to `id`.
    pub fn size(&self, id: RoomId) -> Option<u32> {
        self.node(id).map(|n| n.size)
    }

    /// All rooms with their kinds, in no particular order.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, RoomKind)> + '_ {
        self.slots.iter().flatten().map(|n| (n.id, n.kind))
    }

    /// Rooms whose word places them in chunk (`chunk_x`, `chunk_y`).
    pub fn rooms_in_chunk(&self, chunk_x: u8, chunk_y: u8) -> impl Iterator<Item = RoomId> + '_ {
        self.chunks
            .get(&(chunk_x, chunk_y))
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Rooms directly connected to `id`. Empty for unknown ids.
    pub fn neighbors(&self, id: RoomId) -> impl Iterator<Item = RoomId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.neighbors.iter())
            .filter_map(|&i| self.slots[i].as_ref().map(|n| n.id))
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    /// Add an unconnected node.
    pub fn insert(&mut self, id: RoomId, kind: RoomKind) -> Result<(), GraphError> {
        if id.is_obstacle() {
            return Err(GraphError::ObstacleRoom);
        }
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateRoom(id));
        }
        let node = RoomNode {
            id,
            kind,
            size: 0,
            neighbors: Vec::new(),
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        self.chunks
            .entry((id.chunk_x(), id.chunk_y()))
            .or_default()
            .push(id);
        Ok(())
    }

    /// Add a node whose kind follows from the word's clearance bits.
    pub fn insert_from_id(&mut self, id: RoomId) -> Result<(), GraphError> {
        self.insert(id, RoomKind::of(id))
    }

    /// Disconnect `id` from everything and drop it.
    pub fn remove(&mut self, id: RoomId) -> Result<(), GraphError> {
        self.isolate(id)?;
        if let Some(slot) = self.index.remove(&id) {
            self.slots[slot] = None;
            self.free.push(slot);
        }
        let chunk = (id.chunk_x(), id.chunk_y());
        if let Some(ids) = self.chunks.get_mut(&chunk) {
            if let Some(pos) = ids.iter().position(|&r| r == id) {
                ids.swap_remove(pos);
            }
            if ids.is_empty() {
                self.chunks.remove(&chunk);
            }
        }
        Ok(())
    }

    /// Drop every room whose word places it in chunk (`chunk_x`, `chunk_y`).
    /// Returns how many were removed.
    pub fn remove_chunk(&mut self, chunk_x: u8, chunk_y: u8) -> usize {
        let Some(doomed) = self.chunks.remove(&(chunk_x, chunk_y)) else {
            return 0;
        };
        for &id in &doomed {
            // Every id in the chunk list is also in the index.
            let _ = self.remove(id);
        }
        doomed.len()
    }

    /// Record one more tile for `id`. Returns the new size.
    pub fn add_tile(&mut self, id: RoomId) -> Result<u32, GraphError> {
        let node = self.node_mut(id)?;
        node.size += 1;
        Ok(node.size)
    }

    /// Record one tile fewer for `id`. Returns the new size.
    pub fn remove_tile(&mut self, id: RoomId) -> Result<u32, GraphError> {
        let node = self.node_mut(id)?;
        node.size = node.size.saturating_sub(1);
        Ok(node.size)
    }

    /// Connect `a` and `b` both ways. Returns `false` if they already were.
    pub fn connect(&mut self, a: RoomId, b: RoomId) -> Result<bool, GraphError> {
        let (ia, ib) = self.endpoints(a, b)?;
        if !self.edges.insert(a.connection_key(b)) {
            return Ok(false);
        }
        self.link(ia, ib);
        self.link(ib, ia);
        log::trace!("connect {a} <-> {b}");
        Ok(true)
    }

    /// Remove the edge between `a` and `b` on both ends. Returns `false` if
    /// there was none.
    pub fn disconnect(&mut self, a: RoomId, b: RoomId) -> Result<bool, GraphError> {
        let (ia, ib) = self.endpoints(a, b)?;
        if !self.edges.remove(&a.connection_key(b)) {
            return Ok(false);
        }
        self.unlink(ia, ib);
        self.unlink(ib, ia);
        log::trace!("disconnect {a} <-> {b}");
        Ok(true)
    }

    /// Connect every pair encoded in `keys`. Returns the number of new edges.
    pub fn connect_all(&mut self, keys: impl IntoIterator<Item = u64>) -> Result<usize, GraphError> {
        let mut added = 0;
        for key in keys {
            let (a, b) = RoomId::from_connection_key(key);
            if self.connect(a, b)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Disconnect every pair encoded in `keys`. Returns the number of edges
    /// removed.
    pub fn disconnect_all(
        &mut self,
        keys: impl IntoIterator<Item = u64>,
    ) -> Result<usize, GraphError> {
        let mut removed = 0;
        for key in keys {
            let (a, b) = RoomId::from_connection_key(key);
            if self.disconnect(a, b)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove every edge touching `id`, keeping the node. Returns the number
    /// of edges removed.
    pub fn isolate(&mut self, id: RoomId) -> Result<usize, GraphError> {
        let slot = self.slot(id)?;
        let neighbors = match self.slots[slot].as_mut() {
            Some(node) => std::mem::take(&mut node.neighbors),
            None => Vec::new(),
        };
        for &n in &neighbors {
            self.unlink(n, slot);
            if let Some(other) = self.slots[n].as_ref() {
                self.edges.remove(&id.connection_key(other.id));
            }
        }
        if !neighbors.is_empty() {
            log::trace!("isolate {id}: {} edges removed", neighbors.len());
        }
        Ok(neighbors.len())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// O(1) check for a direct edge.
    #[inline]
    pub fn are_adjacent(&self, a: RoomId, b: RoomId) -> bool {
        self.edges.contains(&a.connection_key(b))
    }

    #[inline]
    pub fn are_adjacent_or_equal(&self, a: RoomId, b: RoomId) -> bool {
        a == b || self.are_adjacent(a, b)
    }

    /// Whether some chain of edges leads from `from` to `to`.
    ///
    /// A room always reaches itself. Unknown ids reach nothing else.
    pub fn reachable(&self, from: RoomId, to: RoomId) -> bool {
        self.search(from, to, None)
    }

    /// Like [`reachable`](Self::reachable), but never steps onto a door
    /// that requires more than `clearance`.
    ///
    /// Only door nodes are gated. A refused door is skipped for this edge
    /// without being marked visited; ordinary rooms are always entered. The
    /// starting node itself is never checked.
    pub fn reachable_with_clearance(&self, from: RoomId, to: RoomId, clearance: Clearance) -> bool {
        self.search(from, to, Some(clearance))
    }

    /// Reachability between the rooms under two tiles of `grid`.
    ///
    /// Tiles outside the grid or on obstacles reach nothing.
    pub fn tiles_connected<G: Grid + ?Sized>(
        &self,
        grid: &G,
        from: Point,
        to: Point,
        clearance: Option<Clearance>,
    ) -> bool {
        if !grid.contains(from) || !grid.contains(to) {
            return false;
        }
        let a = grid.room_id(from);
        let b = grid.room_id(to);
        if a.is_obstacle() || b.is_obstacle() {
            return false;
        }
        self.search(a, b, clearance)
    }

    /// Iterative depth-first search with a visited bit per slot.
    fn search(&self, from: RoomId, to: RoomId, clearance: Option<Clearance>) -> bool {
        if from == to {
            return true;
        }
        let (Some(&start), Some(&target)) = (self.index.get(&from), self.index.get(&to)) else {
            return false;
        };

        let mut visited = Visited::new(self.slots.len());
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(i) = stack.pop() {
            let Some(node) = self.slots[i].as_ref() else {
                continue;
            };
            for &n in &node.neighbors {
                if visited.contains(n) {
                    continue;
                }
                let Some(neighbor) = self.slots[n].as_ref() else {
                    continue;
                };
                if let Some(c) = clearance {
                    if !neighbor.kind.admits(c) {
                        continue;
                    }
                }
                if n == target {
                    return true;
                }
                visited.insert(n);
                stack.push(n);
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn node(&self, id: RoomId) -> Option<&RoomNode> {
        self.index.get(&id).and_then(|&i| self.slots[i].as_ref())
    }

    fn node_mut(&mut self, id: RoomId) -> Result<&mut RoomNode, GraphError> {
        let slot = self.slot(id)?;
        self.slots[slot].as_mut().ok_or(GraphError::UnknownRoom(id))
    }

    fn slot(&self, id: RoomId) -> Result<usize, GraphError> {
        self.index.get(&id).copied().ok_or(GraphError::UnknownRoom(id))
    }

    fn endpoints(&self, a: RoomId, b: RoomId) -> Result<(usize, usize), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        Ok((self.slot(a)?, self.slot(b)?))
    }

    fn link(&mut self, from: usize, to: usize) {
        if let Some(node) = self.slots[from].as_mut() {
            node.neighbors.push(to);
        }
    }

    fn unlink(&mut self, from: usize, to: usize) {
        if let Some(node) = self.slots[from].as_mut() {
            if let Some(pos) = node.neighbors.iter().position(|&n| n == to) {
                node.neighbors.swap_remove(pos);
            }
        }
    }
}

/// Fixed-size bit set over slot indices, sized per query.
struct Visited {
    words: Vec<u64>,
}

impl Visited {
    fn new(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(64)],
        }
    }

    #[inline]
    fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }

    #[inline]
    fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }
}

/// Errors from structural graph edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The id was never inserted, or has been removed.
    UnknownRoom(RoomId),
    DuplicateRoom(RoomId),
    /// A room cannot be connected to itself.
    SelfLoop(RoomId),
    /// The obstacle word never names a room.
    ObstacleRoom,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRoom(id) => write!(f, "unknown {id}"),
            Self::DuplicateRoom(id) => write!(f, "{id} is already in the graph"),
            Self::SelfLoop(id) => write!(f, "cannot connect {id} to itself"),
            Self::ObstacleRoom => f.write_str("the obstacle word is not a room"),
        }
    }
}

impl std::error::Error for GraphError {}
