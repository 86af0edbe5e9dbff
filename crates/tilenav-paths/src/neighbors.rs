use tilenav_core::Point;

/// The eight grid directions, cardinals first.
pub const DIRECTIONS_8: [Point; 8] = [
    Point::new(0, -1),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(-1, 0),
    Point::new(1, -1),
    Point::new(1, 1),
    Point::new(-1, 1),
    Point::new(-1, -1),
];

/// Reusable neighbor buffer.
///
/// Enumerates the 4-way or 8-way neighbors of a point, filtered by a
/// predicate, without allocating after the first call.
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return 4-directional (cardinal) neighbors of `p`, keeping only those
    /// for which `keep` returns `true`.
    pub fn cardinal(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.collect(p, &DIRECTIONS_8[..4], keep)
    }

    /// Return 8-directional neighbors of `p`, keeping only those for which
    /// `keep` returns `true`.
    pub fn all(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.collect(p, &DIRECTIONS_8, keep)
    }

    fn collect(&mut self, p: Point, dirs: &[Point], keep: impl Fn(Point) -> bool) -> &[Point] {
        self.buf.clear();
        for &d in dirs {
            let n = p + d;
            if keep(n) {
                self.buf.push(n);
            }
        }
        &self.buf
    }
}
