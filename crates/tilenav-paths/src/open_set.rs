//! Indexed binary min-heap used as the A* frontier.
//!
//! Entries are ordered by `f`, then `h`, then insertion order. A map from
//! coordinate to heap slot gives O(1) membership tests and lets a
//! cheaper route lower an entry's key in place instead of pushing a
//! duplicate.

use rustc_hash::FxHashMap;
use tilenav_core::Point;

use crate::node::NodeId;

/// One frontier entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenEntry {
    pub node: NodeId,
    pub pos: Point,
    pub f: i32,
    pub h: i32,
    seq: u64,
}

impl OpenEntry {
    #[inline]
    fn precedes(&self, other: &OpenEntry) -> bool {
        (self.f, self.h, self.seq) < (other.f, other.h, other.seq)
    }
}

/// Min-heap of [`OpenEntry`] with coordinate lookup.
#[derive(Debug, Default)]
pub struct OpenSet {
    heap: Vec<OpenEntry>,
    slots: FxHashMap<Point, usize>,
    next_seq: u64,
}

impl OpenSet {
    /// Create an empty open set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty open set with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove every entry, keeping allocations.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
        self.next_seq = 0;
    }

    #[inline]
    pub fn contains(&self, pos: Point) -> bool {
        self.slots.contains_key(&pos)
    }

    /// The open entry for `pos`, if any.
    pub fn get(&self, pos: Point) -> Option<&OpenEntry> {
        self.slots.get(&pos).map(|&i| &self.heap[i])
    }

    /// The entry that [`pop`](Self::pop) would return next.
    pub fn peek(&self) -> Option<&OpenEntry> {
        self.heap.first()
    }

    /// Insert a new entry for `pos`.
    ///
    /// A coordinate may be open at most once; pushing an open coordinate is
    /// a logic error caught in debug builds. Use
    /// [`decrease_key`](Self::decrease_key) instead.
    pub fn push(&mut self, node: NodeId, pos: Point, f: i32, h: i32) {
        debug_assert!(!self.contains(pos), "{pos} is already open");
        let i = self.heap.len();
        self.heap.push(OpenEntry {
            node,
            pos,
            f,
            h,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.slots.insert(pos, i);
        self.sift_up(i);
    }

    /// Remove and return the entry with the lowest key.
    pub fn pop(&mut self) -> Option<OpenEntry> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.pos);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    /// Replace the key of the open entry for `pos` and restore heap order.
    ///
    /// A* only ever lowers keys here, but raising one is handled too.
    /// Returns `false` if `pos` is not open.
    pub fn decrease_key(&mut self, pos: Point, f: i32, h: i32) -> bool {
        let Some(&i) = self.slots.get(&pos) else {
            return false;
        };
        let entry = &mut self.heap[i];
        let lowered = (f, h) < (entry.f, entry.h);
        entry.f = f;
        entry.h = h;
        if lowered {
            self.sift_up(i);
        } else {
            self.sift_down(i);
        }
        true
    }

    /// Entries in heap order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = &OpenEntry> {
        self.heap.iter()
    }

    // -----------------------------------------------------------------------
    // Heap internals
    // -----------------------------------------------------------------------

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].pos, a);
        self.slots.insert(self.heap[b].pos, b);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.heap[right].precedes(&self.heap[left]) {
                right
            } else {
                left
            };
            if !self.heap[child].precedes(&self.heap[i]) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
    }
}
