//! Packed room descriptors.
//!
//! Every tile carries a 32-bit room word:
//!
//! | bits  | field       |
//! |-------|-------------|
//! | 0-7   | local id    |
//! | 8-15  | chunk x     |
//! | 16-23 | chunk y     |
//! | 24-28 | unused      |
//! | 29-30 | clearance   |
//! | 31    | obstacle    |
//!
//! The all-ones word (`-1`) marks an obstacle, so obstacle tiles are exactly
//! the negative words.
//!
//! The free functions work on raw `i32` words and truncate out-of-range
//! fields by masking. [`RoomId`] and [`Clearance`] are the checked
//! counterparts.

use std::fmt;

const BYTE: i32 = 0xFF;
const CLEARANCE_MASK: i32 = 0b11;
const CLEARANCE_SHIFT: u32 = 29;
const CHUNK_BITS: i32 = 0x00FF_FF00;

/// The reserved obstacle word.
pub const OBSTACLE: i32 = -1;

/// Pack the fields of a room word. Each field is masked to its width.
#[inline]
pub const fn encode(local_id: i32, chunk_x: i32, chunk_y: i32, clearance: i32) -> i32 {
    (local_id & BYTE)
        | ((chunk_x & BYTE) << 8)
        | ((chunk_y & BYTE) << 16)
        | ((clearance & CLEARANCE_MASK) << CLEARANCE_SHIFT)
}

/// Room number within its chunk (bits 0-7).
#[inline]
pub const fn local_id(word: i32) -> i32 {
    word & BYTE
}

/// Chunk column (bits 8-15).
#[inline]
pub const fn chunk_x(word: i32) -> i32 {
    (word >> 8) & BYTE
}

/// Chunk row (bits 16-23).
#[inline]
pub const fn chunk_y(word: i32) -> i32 {
    (word >> 16) & BYTE
}

/// Required clearance (bits 29-30).
#[inline]
pub const fn clearance(word: i32) -> i32 {
    (word >> CLEARANCE_SHIFT) & CLEARANCE_MASK
}

/// The sign bit as 0 or 1.
#[inline]
pub const fn obstacle_bit(word: i32) -> i32 {
    (word >> 31) & 1
}

#[inline]
pub const fn is_obstacle(word: i32) -> bool {
    word < 0
}

/// Whether two words lie in the same chunk.
#[inline]
pub const fn same_chunk(a: i32, b: i32) -> bool {
    (a & CHUNK_BITS) == (b & CHUNK_BITS)
}

/// Canonical key for the unordered pair `{a, b}`.
///
/// The larger word sits in the low 32 bits, the smaller in the high 32 bits,
/// so `connection_key(a, b) == connection_key(b, a)`.
#[inline]
pub const fn connection_key(a: i32, b: i32) -> u64 {
    let (low, high) = if a > b { (a, b) } else { (b, a) };
    (low as u32 as u64) | ((high as u32 as u64) << 32)
}

/// Split a key produced by [`connection_key`] into `(larger, smaller)`.
#[inline]
pub const fn split_connection_key(key: u64) -> (i32, i32) {
    ((key & 0xFFFF_FFFF) as u32 as i32, (key >> 32) as u32 as i32)
}

// ---------------------------------------------------------------------------
// Clearance
// ---------------------------------------------------------------------------

/// Permission level, 0 through 3.
///
/// On a tile it is the level required to pass; on an agent it is the level
/// the agent holds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Clearance(u8);

impl Clearance {
    pub const NONE: Self = Self(0);
    pub const MAX: Self = Self(3);

    /// Checked constructor; levels above 3 are rejected.
    pub const fn new(level: u8) -> Result<Self, RoomError> {
        if level > Self::MAX.0 {
            return Err(RoomError::ClearanceOutOfRange(level as i32));
        }
        Ok(Self(level))
    }

    #[inline]
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Whether an agent holding `self` may pass a door requiring `required`.
    #[inline]
    pub fn permits(self, required: Clearance) -> bool {
        self >= required
    }
}

impl TryFrom<u8> for Clearance {
    type Error = RoomError;
    fn try_from(level: u8) -> Result<Self, RoomError> {
        Self::new(level)
    }
}

impl TryFrom<i32> for Clearance {
    type Error = RoomError;
    fn try_from(level: i32) -> Result<Self, RoomError> {
        match u8::try_from(level) {
            Ok(l) => Self::new(l),
            Err(_) => Err(RoomError::ClearanceOutOfRange(level)),
        }
    }
}

impl From<Clearance> for u8 {
    fn from(c: Clearance) -> u8 {
        c.0
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clearance {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A packed room word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct RoomId(i32);

impl RoomId {
    pub const OBSTACLE: Self = Self(OBSTACLE);

    /// Build a room word. All fields are in range by construction.
    #[inline]
    pub const fn new(local_id: u8, chunk_x: u8, chunk_y: u8, clearance: Clearance) -> Self {
        Self(encode(
            local_id as i32,
            chunk_x as i32,
            chunk_y as i32,
            clearance.0 as i32,
        ))
    }

    /// Wrap a raw word without checking it.
    #[inline]
    pub const fn from_raw(word: i32) -> Self {
        Self(word)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn local_id(self) -> u8 {
        local_id(self.0) as u8
    }

    #[inline]
    pub const fn chunk_x(self) -> u8 {
        chunk_x(self.0) as u8
    }

    #[inline]
    pub const fn chunk_y(self) -> u8 {
        chunk_y(self.0) as u8
    }

    #[inline]
    pub const fn clearance(self) -> Clearance {
        Clearance(clearance(self.0) as u8)
    }

    #[inline]
    pub const fn is_obstacle(self) -> bool {
        is_obstacle(self.0)
    }

    /// Doors are the non-obstacle rooms with a clearance requirement.
    #[inline]
    pub const fn is_door(self) -> bool {
        !self.is_obstacle() && clearance(self.0) > 0
    }

    #[inline]
    pub const fn same_chunk(self, other: RoomId) -> bool {
        same_chunk(self.0, other.0)
    }

    #[inline]
    pub const fn connection_key(self, other: RoomId) -> u64 {
        connection_key(self.0, other.0)
    }

    /// Both endpoints of a connection key, larger word first.
    #[inline]
    pub const fn from_connection_key(key: u64) -> (RoomId, RoomId) {
        let (a, b) = split_connection_key(key);
        (Self(a), Self(b))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_obstacle() {
            return f.write_str("room(obstacle)");
        }
        write!(
            f,
            "room({}@{},{}",
            self.local_id(),
            self.chunk_x(),
            self.chunk_y()
        )?;
        if self.is_door() {
            write!(f, " door {}", self.clearance().level())?;
        }
        f.write_str(")")
    }
}

/// Errors from checked room-word construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    /// Clearance levels are 0 through 3.
    ClearanceOutOfRange(i32),
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearanceOutOfRange(v) => {
                write!(f, "clearance {v} out of range (expected 0..=3)")
            }
        }
    }
}

impl std::error::Error for RoomError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        for local in [0, 1, 17, 128, 255] {
            for cx in [0, 3, 200, 255] {
                for cy in [0, 9, 255] {
                    for c in 0..=3 {
                        let w = encode(local, cx, cy, c);
                        assert_eq!(local_id(w), local);
                        assert_eq!(chunk_x(w), cx);
                        assert_eq!(chunk_y(w), cy);
                        assert_eq!(clearance(w), c);
                        assert!(!is_obstacle(w));
                        assert_eq!(obstacle_bit(w), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn out_of_range_fields_are_masked() {
        let w = encode(0x1_02, 0x3_04, -1, 7);
        assert_eq!(local_id(w), 0x02);
        assert_eq!(chunk_x(w), 0x04);
        assert_eq!(chunk_y(w), 0xFF);
        assert_eq!(clearance(w), 3);
        // Masking never reaches the obstacle bit.
        assert!(!is_obstacle(w));
    }

    #[test]
    fn obstacle_sentinel() {
        assert!(is_obstacle(OBSTACLE));
        assert_eq!(obstacle_bit(OBSTACLE), 1);
        assert!(RoomId::OBSTACLE.is_obstacle());
        assert!(!RoomId::OBSTACLE.is_door());
    }

    #[test]
    fn same_chunk_ignores_local_id_and_clearance() {
        let a = encode(1, 4, 5, 0);
        let b = encode(200, 4, 5, 3);
        let c = encode(1, 5, 4, 0);
        assert!(same_chunk(a, b));
        assert!(!same_chunk(a, c));
    }

    #[test]
    fn connection_key_is_commutative() {
        let words = [0, 1, encode(3, 1, 2, 0), encode(255, 255, 255, 3), i32::MAX];
        for &a in &words {
            for &b in &words {
                assert_eq!(connection_key(a, b), connection_key(b, a));
            }
        }
    }

    #[test]
    fn connection_key_distinguishes_pairs() {
        let a = encode(1, 0, 0, 0);
        let b = encode(2, 0, 0, 0);
        let c = encode(3, 0, 0, 0);
        assert_ne!(connection_key(a, b), connection_key(a, c));
        assert_ne!(connection_key(a, c), connection_key(b, c));
        assert_eq!(split_connection_key(connection_key(a, c)), (c, a));
        assert_eq!(split_connection_key(connection_key(c, a)), (c, a));
    }

    #[test]
    fn clearance_is_checked() {
        assert_eq!(Clearance::new(3).map(Clearance::level), Ok(3));
        assert_eq!(Clearance::new(4), Err(RoomError::ClearanceOutOfRange(4)));
        assert!(Clearance::try_from(-1i32).is_err());
        assert!(Clearance::try_from(2i32).is_ok());
        assert!(Clearance::MAX.permits(Clearance::NONE));
        assert!(!Clearance::NONE.permits(Clearance::MAX));
    }

    #[test]
    fn room_id_accessors() {
        let door = RoomId::new(9, 2, 7, Clearance::MAX);
        assert_eq!(door.local_id(), 9);
        assert_eq!(door.chunk_x(), 2);
        assert_eq!(door.chunk_y(), 7);
        assert_eq!(door.clearance(), Clearance::MAX);
        assert!(door.is_door());
        assert!(!door.is_obstacle());

        let room = RoomId::new(9, 2, 7, Clearance::NONE);
        assert!(!room.is_door());
        assert!(room.same_chunk(door));
        assert_eq!(
            RoomId::from_connection_key(room.connection_key(door)),
            RoomId::from_connection_key(door.connection_key(room))
        );
    }

    #[test]
    fn display_names_doors() {
        let door = RoomId::new(1, 2, 3, Clearance::MAX);
        assert_eq!(door.to_string(), "room(1@2,3 door 3)");
        assert_eq!(RoomId::OBSTACLE.to_string(), "room(obstacle)");
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn clearance_rejects_out_of_range() {
        let ok: Clearance = serde_json::from_str("2").unwrap();
        assert_eq!(ok.level(), 2);
        assert!(serde_json::from_str::<Clearance>("9").is_err());
    }

    #[test]
    fn room_id_is_a_bare_word() {
        let id = RoomId::new(4, 5, 6, Clearance::NONE);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.raw().to_string());
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
