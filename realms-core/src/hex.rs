//! Hex geometry with axial coordinates (pointy-top layout)

use serde::{Deserialize, Serialize};

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube axis, so that q + r + s == 0. Widened: it leaves the
    /// `i32` range at the edges of the coordinate space.
    pub const fn s(&self) -> i64 {
        -(self.q as i64) - self.r as i64
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> u64 {
        let dq = i64::from(self.q).abs_diff(i64::from(other.q));
        let dr = i64::from(self.r).abs_diff(i64::from(other.r));
        let ds = self.s().abs_diff(other.s());
        (dq + dr + ds) / 2
    }

    /// Neighbor in direction (0-5), or `None` past the edge of the `i32` plane
    pub fn neighbor(&self, direction: usize) -> Option<Hex> {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Some(Hex::new(self.q.checked_add(dq)?, self.r.checked_add(dr)?))
    }

    /// Neighbors in `DIRECTIONS` order; all six except at the coordinate limits
    pub fn neighbors(&self) -> impl Iterator<Item = Hex> {
        let origin = *self;
        (0..DIRECTIONS.len()).filter_map(move |direction| origin.neighbor(direction))
    }

    /// True iff `other` is one of the six neighbors
    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.distance_to(other) == 1
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q:{} r:{}", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
///
/// Order matters: the enemy chase breaks ties by it.
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

// ============================================================================
// PIXEL PROJECTION
// ============================================================================

/// Default visual tile radius in pixels
pub const DEFAULT_TILE_RADIUS: f64 = 28.0;

/// Pointy-top pixel layout for a fixed tile radius
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    pub radius: f64,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            radius: DEFAULT_TILE_RADIUS,
        }
    }
}

impl HexLayout {
    pub const fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn tile_width(&self) -> f64 {
        3f64.sqrt() * self.radius
    }

    pub fn tile_height(&self) -> f64 {
        2.0 * self.radius
    }

    pub fn vertical_step(&self) -> f64 {
        1.5 * self.radius
    }

    /// Center of `hex` in plane coordinates
    pub fn to_pixel(&self, hex: Hex) -> (f64, f64) {
        let x = self.tile_width() * (f64::from(hex.q) + f64::from(hex.r) / 2.0);
        let y = self.vertical_step() * f64::from(hex.r);
        (x, y)
    }

    /// Polygon corners of a tile centered at the origin
    pub fn corners(&self) -> [(f64, f64); 6] {
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 - 30.0).to_radians();
            (self.radius * angle.cos(), self.radius * angle.sin())
        })
    }
}
