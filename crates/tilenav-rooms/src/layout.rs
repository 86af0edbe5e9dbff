//! Divide a [`TileMap`] into rooms and doors, chunk by chunk.
//!
//! The map is cut into [`CHUNK_SIZE`] square chunks. Inside a chunk every
//! 4-connected patch of open, non-door tiles becomes one room and every door
//! tile becomes a room of its own. Rooms are linked to the doors beside them
//! and to the rooms across each chunk border. The resulting ids are written
//! back into the map, so [`Grid::room_id`] reflects the layout.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashSet;
use tilenav_core::{Grid, Point, Range, RoomId, TileMap};

use crate::graph::{GraphError, RoomGraph};

/// Side length of a chunk, in tiles.
pub const CHUNK_SIZE: i32 = 16;

/// Counts reported by a rebuild.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStats {
    /// Rooms created, doors included.
    pub rooms: usize,
    pub doors: usize,
    /// New edges added to the graph.
    pub connections: usize,
}

/// Rebuilds room layouts. Holds flood-fill scratch space between calls.
#[derive(Debug, Default)]
pub struct RoomLayout {
    queue: VecDeque<Point>,
    seen: Vec<bool>,
}

impl RoomLayout {
    /// Create a builder with empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunk columns and rows covering `map`.
    pub fn chunk_dims(map: &TileMap) -> Result<(u16, u16), LayoutError> {
        let bounds = map.bounds();
        let cols = (bounds.width() + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let rows = (bounds.height() + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let limit = i32::from(u8::MAX) + 1;
        if cols > limit || rows > limit {
            return Err(LayoutError::MapTooLarge {
                width: bounds.width(),
                height: bounds.height(),
            });
        }
        Ok((cols.max(0) as u16, rows.max(0) as u16))
    }

    /// Chunk containing `p`, or `None` outside the map.
    pub fn chunk_of(map: &TileMap, p: Point) -> Option<(u8, u8)> {
        let bounds = map.bounds();
        if !bounds.contains(p) {
            return None;
        }
        let cx = u8::try_from((p.x - bounds.min.x) / CHUNK_SIZE).ok()?;
        let cy = u8::try_from((p.y - bounds.min.y) / CHUNK_SIZE).ok()?;
        Some((cx, cy))
    }

    /// Tiles covered by chunk (`chunk_x`, `chunk_y`), clipped to the map.
    pub fn chunk_area(map: &TileMap, chunk_x: u8, chunk_y: u8) -> Range {
        let bounds = map.bounds();
        let x0 = bounds.min.x + i32::from(chunk_x) * CHUNK_SIZE;
        let y0 = bounds.min.y + i32::from(chunk_y) * CHUNK_SIZE;
        Range::new(x0, y0, x0 + CHUNK_SIZE, y0 + CHUNK_SIZE).intersect(bounds)
    }

    /// Lay out every chunk of `map` from scratch.
    ///
    /// All chunks are filled before any are connected, so border links never
    /// see a neighbor's stale ids.
    pub fn rebuild_all(
        &mut self,
        map: &mut TileMap,
        graph: &mut RoomGraph,
    ) -> Result<LayoutStats, LayoutError> {
        let (cols, rows) = Self::chunk_dims(map)?;
        let mut stats = LayoutStats::default();
        for cy in 0..rows {
            for cx in 0..cols {
                self.fill_chunk(map, graph, cx as u8, cy as u8, &mut stats)?;
            }
        }
        for cy in 0..rows {
            for cx in 0..cols {
                stats.connections += Self::connect_chunk(map, graph, cx as u8, cy as u8)?;
            }
        }
        log::debug!(
            "room layout: {cols}x{rows} chunks, {} rooms ({} doors), {} connections",
            stats.rooms,
            stats.doors,
            stats.connections
        );
        Ok(stats)
    }

    /// Refresh one chunk after its tiles changed.
    ///
    /// The chunk's old rooms and their edges are dropped, the chunk is
    /// flood-filled again and relinked to its doors and to the rooms of the
    /// neighboring chunks.
    pub fn rebuild_chunk(
        &mut self,
        map: &mut TileMap,
        graph: &mut RoomGraph,
        chunk_x: u8,
        chunk_y: u8,
    ) -> Result<LayoutStats, LayoutError> {
        let (cols, rows) = Self::chunk_dims(map)?;
        if u16::from(chunk_x) >= cols || u16::from(chunk_y) >= rows {
            return Err(LayoutError::NoSuchChunk { chunk_x, chunk_y });
        }
        let mut stats = LayoutStats::default();
        self.fill_chunk(map, graph, chunk_x, chunk_y, &mut stats)?;
        stats.connections = Self::connect_chunk(map, graph, chunk_x, chunk_y)?;
        log::debug!(
            "chunk ({chunk_x}, {chunk_y}) rebuilt: {} rooms ({} doors), {} connections",
            stats.rooms,
            stats.doors,
            stats.connections
        );
        Ok(stats)
    }

    /// Assign room ids to every tile of a chunk and register the rooms.
    fn fill_chunk(
        &mut self,
        map: &mut TileMap,
        graph: &mut RoomGraph,
        chunk_x: u8,
        chunk_y: u8,
        stats: &mut LayoutStats,
    ) -> Result<(), LayoutError> {
        let removed = graph.remove_chunk(chunk_x, chunk_y);
        if removed > 0 {
            log::trace!("chunk ({chunk_x}, {chunk_y}): dropped {removed} stale rooms");
        }

        let area = Self::chunk_area(map, chunk_x, chunk_y);
        self.seen.clear();
        self.seen.resize(area.len(), false);
        let mut next_local = 0usize;

        for p in area {
            let Some(i) = area.index_of(p) else {
                continue;
            };
            if self.seen[i] {
                continue;
            }
            self.seen[i] = true;
            let Some(tile) = map.tile(p) else {
                continue;
            };
            if tile.obstacle {
                map.set_room(p, RoomId::OBSTACLE);
                continue;
            }

            let local = u8::try_from(next_local)
                .map_err(|_| LayoutError::TooManyRooms { chunk_x, chunk_y })?;
            next_local += 1;
            let id = RoomId::new(local, chunk_x, chunk_y, tile.clearance);
            graph.insert_from_id(id)?;
            stats.rooms += 1;

            if tile.is_door() {
                map.set_room(p, id);
                graph.add_tile(id)?;
                stats.doors += 1;
            } else {
                self.flood(map, graph, area, p, id)?;
            }
        }
        Ok(())
    }

    /// Breadth-first fill from `seed` over open non-door tiles of `area`.
    fn flood(
        &mut self,
        map: &mut TileMap,
        graph: &mut RoomGraph,
        area: Range,
        seed: Point,
        id: RoomId,
    ) -> Result<(), LayoutError> {
        self.queue.clear();
        self.queue.push_back(seed);
        while let Some(p) = self.queue.pop_front() {
            map.set_room(p, id);
            graph.add_tile(id)?;
            for q in p.neighbors_4() {
                let Some(i) = area.index_of(q) else {
                    continue;
                };
                if self.seen[i] {
                    continue;
                }
                // Obstacles and doors are left for the row scan.
                if map.tile(q).is_some_and(|t| !t.obstacle && !t.is_door()) {
                    self.seen[i] = true;
                    self.queue.push_back(q);
                }
            }
        }
        Ok(())
    }

    /// Link a chunk's doors to their neighbors and its border tiles to the
    /// adjacent chunks. Returns the number of new edges.
    fn connect_chunk(
        map: &TileMap,
        graph: &mut RoomGraph,
        chunk_x: u8,
        chunk_y: u8,
    ) -> Result<usize, LayoutError> {
        let area = Self::chunk_area(map, chunk_x, chunk_y);
        let mut keys = FxHashSet::default();
        for p in area {
            let here = map.room_id(p);
            if here.is_obstacle() {
                continue;
            }
            for q in p.neighbors_4() {
                if area.contains(q) && !here.is_door() {
                    continue;
                }
                let there = map.room_id(q);
                if there.is_obstacle() || there == here || !graph.contains(there) {
                    continue;
                }
                keys.insert(here.connection_key(there));
            }
        }
        Ok(graph.connect_all(keys)?)
    }
}

/// Errors from building a room layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Chunk coordinates must fit in a byte.
    MapTooLarge { width: i32, height: i32 },
    /// A chunk produced more rooms than a local id can number.
    TooManyRooms { chunk_x: u8, chunk_y: u8 },
    NoSuchChunk { chunk_x: u8, chunk_y: u8 },
    Graph(GraphError),
}

impl From<GraphError> for LayoutError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapTooLarge { width, height } => write!(
                f,
                "a {width}x{height} map needs more than 256 chunks per axis"
            ),
            Self::TooManyRooms { chunk_x, chunk_y } => {
                write!(f, "chunk ({chunk_x}, {chunk_y}) holds more than 256 rooms")
            }
            Self::NoSuchChunk { chunk_x, chunk_y } => {
                write!(f, "chunk ({chunk_x}, {chunk_y}) lies outside the map")
            }
            Self::Graph(err) => write!(f, "room graph: {err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoomKind;
    use tilenav_core::{Clearance, Tile};

    fn cl(level: u8) -> Clearance {
        Clearance::new(level).unwrap()
    }

    fn at(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn build(map: &mut TileMap) -> (RoomGraph, LayoutStats) {
        let mut graph = RoomGraph::new();
        let stats = RoomLayout::new().rebuild_all(map, &mut graph).unwrap();
        (graph, stats)
    }

    /// A 16x16 chunk split by a wall at x = 8 with a clearance-2 door at y = 5.
    fn split_chunk() -> TileMap {
        let mut map = TileMap::new(16, 16);
        for y in 0..16 {
            map.set_tile(at(8, y), Tile::WALL);
        }
        map.set_tile(at(8, 5), Tile::door(cl(2)));
        map
    }

    #[test]
    fn wall_with_door_gives_two_rooms_and_a_door() {
        let mut map = split_chunk();
        let (graph, stats) = build(&mut map);
        assert_eq!(
            stats,
            LayoutStats {
                rooms: 3,
                doors: 1,
                connections: 2
            }
        );

        let left = map.room_id(at(0, 0));
        let right = map.room_id(at(15, 15));
        let door = map.room_id(at(8, 5));
        assert_eq!(left, RoomId::new(0, 0, 0, Clearance::NONE));
        assert_eq!(right, RoomId::new(1, 0, 0, Clearance::NONE));
        assert_eq!(door, RoomId::new(2, 0, 0, cl(2)));
        assert!(map.room_id(at(8, 0)).is_obstacle());

        assert_eq!(graph.size(left), Some(128));
        assert_eq!(graph.size(right), Some(112));
        assert_eq!(graph.size(door), Some(1));
        assert_eq!(graph.kind(door), Some(RoomKind::Door { clearance: cl(2) }));
        assert!(graph.are_adjacent(left, door));
        assert!(graph.are_adjacent(door, right));
        assert!(!graph.are_adjacent(left, right));
    }

    #[test]
    fn door_clearance_gates_tile_queries() {
        let mut map = split_chunk();
        let (graph, _) = build(&mut map);
        let (a, b) = (at(0, 0), at(15, 15));
        assert!(graph.tiles_connected(&map, a, b, None));
        assert!(graph.tiles_connected(&map, a, b, Some(cl(2))));
        assert!(!graph.tiles_connected(&map, a, b, Some(cl(1))));
        assert!(graph.tiles_connected(&map, a, at(7, 15), Some(Clearance::NONE)));
        assert!(!graph.tiles_connected(&map, a, at(8, 0), None));
    }

    #[test]
    fn open_chunks_link_across_the_border() {
        let mut map = TileMap::new(32, 16);
        let (graph, stats) = build(&mut map);
        assert_eq!(stats.rooms, 2);
        assert_eq!(stats.connections, 1);
        let west = RoomId::new(0, 0, 0, Clearance::NONE);
        let east = RoomId::new(0, 1, 0, Clearance::NONE);
        assert_eq!(map.room_id(at(15, 7)), west);
        assert_eq!(map.room_id(at(16, 7)), east);
        assert!(graph.are_adjacent(west, east));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn partial_chunks_at_the_edge() {
        let mut map = TileMap::new(20, 5);
        assert_eq!(RoomLayout::chunk_dims(&map), Ok((2, 1)));
        let (graph, _) = build(&mut map);
        let east = map.room_id(at(19, 4));
        assert_eq!(east, RoomId::new(0, 1, 0, Clearance::NONE));
        assert_eq!(graph.size(east), Some(20));
        assert_eq!(graph.size(map.room_id(at(0, 0))), Some(80));
        assert_eq!(RoomLayout::chunk_of(&map, at(17, 2)), Some((1, 0)));
        assert_eq!(RoomLayout::chunk_of(&map, at(20, 0)), None);
    }

    #[test]
    fn door_on_a_chunk_border() {
        let mut map = TileMap::new(32, 16);
        for y in 0..16 {
            map.set_tile(at(16, y), Tile::WALL);
        }
        map.set_tile(at(16, 4), Tile::door(cl(1)));
        let (graph, stats) = build(&mut map);
        assert_eq!(stats.doors, 1);
        assert_eq!(graph.edge_count(), 2);
        let (a, b) = (at(0, 0), at(31, 15));
        assert!(graph.tiles_connected(&map, a, b, None));
        assert!(graph.tiles_connected(&map, a, b, Some(cl(1))));
        assert!(!graph.tiles_connected(&map, a, b, Some(Clearance::NONE)));
    }

    #[test]
    fn rebuilding_a_chunk_tracks_edits() {
        let mut map = TileMap::new(32, 16);
        let mut graph = RoomGraph::new();
        let mut layout = RoomLayout::new();
        layout.rebuild_all(&mut map, &mut graph).unwrap();
        let (a, b) = (at(0, 0), at(31, 0));

        for y in 0..16 {
            map.set_tile(at(24, y), Tile::WALL);
        }
        let stats = layout.rebuild_chunk(&mut map, &mut graph, 1, 0).unwrap();
        assert_eq!(stats.rooms, 2);
        assert_eq!(stats.connections, 1);
        assert_eq!(graph.len(), 3);
        assert!(!graph.tiles_connected(&map, a, b, None));
        assert!(graph.tiles_connected(&map, a, at(23, 15), None));

        map.set_tile(at(24, 3), Tile::door(cl(1)));
        let stats = layout.rebuild_chunk(&mut map, &mut graph, 1, 0).unwrap();
        assert_eq!(stats.rooms, 3);
        assert_eq!(stats.doors, 1);
        assert_eq!(stats.connections, 3);
        assert_eq!(graph.len(), 4);
        assert!(graph.tiles_connected(&map, a, b, None));
        assert!(graph.tiles_connected(&map, a, b, Some(cl(1))));
        assert!(!graph.tiles_connected(&map, a, b, Some(Clearance::NONE)));
    }

    #[test]
    fn every_open_tile_belongs_to_a_counted_room() {
        let mut map = TileMap::parse(
            "\
..#.~..#
.##..#..
...1#...
##..#.2.
",
        )
        .unwrap();
        let (graph, _) = build(&mut map);
        let total: u32 = graph.rooms().filter_map(|(id, _)| graph.size(id)).sum();
        assert_eq!(total as usize, map.traversable_count());
        for p in map.bounds() {
            let id = map.room_id(p);
            assert_eq!(id.is_obstacle(), !map.is_traversable(p));
            if !id.is_obstacle() {
                assert!(graph.contains(id));
            }
        }
    }

    #[test]
    fn large_maps_rebuild_chunk_by_chunk() {
        // 32x32 open chunks: one room each, linked to every side neighbor.
        let mut map = TileMap::new(32 * CHUNK_SIZE, 32 * CHUNK_SIZE);
        let mut graph = RoomGraph::new();
        let mut layout = RoomLayout::new();
        let borders = 2 * 31 * 32;
        for _ in 0..2 {
            let stats = layout.rebuild_all(&mut map, &mut graph).unwrap();
            assert_eq!(stats.rooms, 32 * 32);
            assert_eq!(stats.connections, borders);
            assert_eq!(graph.len(), 32 * 32);
            assert_eq!(graph.edge_count(), borders);
        }
        for cy in 0..32 {
            for cx in 0..32 {
                let ids: Vec<RoomId> = graph.rooms_in_chunk(cx, cy).collect();
                assert_eq!(ids, vec![RoomId::new(0, cx, cy, Clearance::NONE)]);
            }
        }
        let far = at(32 * CHUNK_SIZE - 1, 32 * CHUNK_SIZE - 1);
        assert!(graph.tiles_connected(&map, at(0, 0), far, Some(Clearance::NONE)));
    }

    #[test]
    fn layout_errors() {
        let mut map = TileMap::new(CHUNK_SIZE * 256 + 1, 1);
        let mut graph = RoomGraph::new();
        let mut layout = RoomLayout::new();
        assert_eq!(
            layout.rebuild_all(&mut map, &mut graph),
            Err(LayoutError::MapTooLarge {
                width: CHUNK_SIZE * 256 + 1,
                height: 1
            })
        );

        let mut map = TileMap::new(16, 16);
        assert_eq!(
            layout.rebuild_chunk(&mut map, &mut graph, 1, 0),
            Err(LayoutError::NoSuchChunk {
                chunk_x: 1,
                chunk_y: 0
            })
        );
    }
}
