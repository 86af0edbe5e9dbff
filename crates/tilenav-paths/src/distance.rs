use tilenav_core::Point;

/// Cost of one horizontal or vertical step.
pub const CARDINAL_COST: i32 = 10;

/// Cost of one diagonal step (≈ √2 × [`CARDINAL_COST`]).
pub const DIAGONAL_COST: i32 = 14;

/// Manhattan (L1) distance between two points, in [`CARDINAL_COST`] units.
///
/// The consistent heuristic for 4-way movement.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    CARDINAL_COST * ((a.x - b.x).abs() + (a.y - b.y).abs())
}

/// Octile distance: the cost of the cheapest unobstructed 8-way walk from
/// `a` to `b`, in [`CARDINAL_COST`] units.
///
/// Used both as the A* heuristic and, between adjacent cells, as the step
/// cost, which keeps the heuristic consistent.
#[inline]
pub fn octile(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (short, long) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * short + CARDINAL_COST * (long - short)
}
