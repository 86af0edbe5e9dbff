//! The [`Grid`] capability and a dense [`TileMap`] implementing it.
//!
//! Search and reachability code only ever sees a `&impl Grid`; the world
//! that owns the tiles decides how they are stored.

use std::fmt;

use crate::geom::{Point, Range};
use crate::room::{Clearance, RoomId};

/// Movement penalty reported for cells that can never be entered.
pub const IMPASSABLE: i32 = i32::MAX;

/// Read-only tile queries consumed by pathfinding and room lookups.
pub trait Grid {
    /// The rectangle of valid coordinates.
    fn bounds(&self) -> Range;

    /// Packed room word of the tile at `p`.
    fn room_id(&self, p: Point) -> RoomId;

    /// Extra cost of entering `p`: non-negative, or [`IMPASSABLE`].
    fn movement_penalty(&self, p: Point) -> i32;

    fn is_obstacle(&self, p: Point) -> bool;

    fn is_traversable(&self, p: Point) -> bool {
        !self.is_obstacle(p)
    }

    fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    fn width(&self) -> i32 {
        self.bounds().width()
    }

    fn height(&self) -> i32 {
        self.bounds().height()
    }
}

impl<G: Grid + ?Sized> Grid for &G {
    fn bounds(&self) -> Range {
        (**self).bounds()
    }
    fn room_id(&self, p: Point) -> RoomId {
        (**self).room_id(p)
    }
    fn movement_penalty(&self, p: Point) -> i32 {
        (**self).movement_penalty(p)
    }
    fn is_obstacle(&self, p: Point) -> bool {
        (**self).is_obstacle(p)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Per-tile terrain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub obstacle: bool,
    /// Extra movement cost. Ignored for obstacles.
    pub penalty: u16,
    /// Non-zero marks a door requiring this level.
    pub clearance: Clearance,
}

impl Tile {
    pub const FLOOR: Self = Self {
        obstacle: false,
        penalty: 0,
        clearance: Clearance::NONE,
    };

    pub const WALL: Self = Self {
        obstacle: true,
        penalty: 0,
        clearance: Clearance::NONE,
    };

    pub const fn rough(penalty: u16) -> Self {
        Self {
            obstacle: false,
            penalty,
            clearance: Clearance::NONE,
        }
    }

    pub const fn door(clearance: Clearance) -> Self {
        Self {
            obstacle: false,
            penalty: 0,
            clearance,
        }
    }

    #[inline]
    pub fn is_door(self) -> bool {
        !self.obstacle && self.clearance > Clearance::NONE
    }
}

// ---------------------------------------------------------------------------
// TileMap
// ---------------------------------------------------------------------------

/// Penalty assigned to `~` cells by [`TileMap::parse`].
pub const ROUGH_PENALTY: u16 = 20;

/// A dense rectangular map of [`Tile`]s with a room word per tile.
///
/// Room words start as [`RoomId::OBSTACLE`] on obstacles and the zero word
/// elsewhere until a room layout is written with [`set_room`](Self::set_room).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    bounds: Range,
    tiles: Vec<Tile>,
    rooms: Vec<RoomId>,
}

impl TileMap {
    /// Create a `width` x `height` map of floor tiles.
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(Range::with_size(width, height), Tile::FLOOR)
    }

    /// Create a map over `bounds` with every tile set to `tile`.
    pub fn filled(bounds: Range, tile: Tile) -> Self {
        let len = bounds.len();
        let room = if tile.obstacle {
            RoomId::OBSTACLE
        } else {
            RoomId::default()
        };
        Self {
            bounds,
            tiles: vec![tile; len],
            rooms: vec![room; len],
        }
    }

    /// Parse an ASCII map. Rows are lines; all rows must be equally wide.
    ///
    /// | char | tile |
    /// |---|---|
    /// | `.` | floor |
    /// | `#` | wall |
    /// | `~` | floor with [`ROUGH_PENALTY`] |
    /// | `1`-`3` | door requiring that clearance |
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if lines.iter().any(|l| l.chars().count() != width) {
            return Err(MapError::InconsistentSize(text.to_string()));
        }

        let mut map = Self::new(width as i32, lines.len() as i32);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let pos = Point::new(x as i32, y as i32);
                let tile = match ch {
                    '.' => Tile::FLOOR,
                    '#' => Tile::WALL,
                    '~' => Tile::rough(ROUGH_PENALTY),
                    '1'..='3' => {
                        let level = Clearance::new(ch as u8 - b'0')
                            .map_err(|_| MapError::InvalidTile { ch, pos })?;
                        Tile::door(level)
                    }
                    _ => return Err(MapError::InvalidTile { ch, pos }),
                };
                map.set_tile(pos, tile);
            }
        }
        Ok(map)
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Tile at `p`, or `None` if out of bounds.
    pub fn tile(&self, p: Point) -> Option<Tile> {
        self.bounds.index_of(p).map(|i| self.tiles[i])
    }

    /// Replace the tile at `p`. Returns `false` if `p` is out of bounds.
    ///
    /// Turning a tile into an obstacle also resets its room word; turning an
    /// obstacle into open ground leaves the zero word until the layout is
    /// rebuilt.
    pub fn set_tile(&mut self, p: Point, tile: Tile) -> bool {
        let Some(i) = self.bounds.index_of(p) else {
            return false;
        };
        self.tiles[i] = tile;
        if tile.obstacle {
            self.rooms[i] = RoomId::OBSTACLE;
        } else if self.rooms[i].is_obstacle() {
            self.rooms[i] = RoomId::default();
        }
        true
    }

    /// Overwrite the room word at `p`. Returns `false` if out of bounds.
    pub fn set_room(&mut self, p: Point, room: RoomId) -> bool {
        let Some(i) = self.bounds.index_of(p) else {
            return false;
        };
        self.rooms[i] = room;
        true
    }

    /// Number of non-obstacle tiles.
    pub fn traversable_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.obstacle).count()
    }
}

impl Grid for TileMap {
    fn bounds(&self) -> Range {
        self.bounds
    }

    fn room_id(&self, p: Point) -> RoomId {
        self.bounds
            .index_of(p)
            .map_or(RoomId::OBSTACLE, |i| self.rooms[i])
    }

    fn movement_penalty(&self, p: Point) -> i32 {
        match self.tile(p) {
            Some(t) if !t.obstacle => t.penalty as i32,
            _ => IMPASSABLE,
        }
    }

    fn is_obstacle(&self, p: Point) -> bool {
        self.tile(p).is_none_or(|t| t.obstacle)
    }
}

/// Errors that can occur when parsing an ASCII map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Lines have inconsistent widths.
    InconsistentSize(String),
    /// A character outside the map alphabet was found.
    InvalidTile { ch: char, pos: Point },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentSize(s) => write!(f, "map: inconsistent size:\n{s}"),
            Self::InvalidTile { ch, pos } => {
                write!(f, "map contains invalid tile \u{201c}{ch}\u{201d} at {pos}")
            }
        }
    }
}

impl std::error::Error for MapError {}
