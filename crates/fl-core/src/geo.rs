//! Planar world coordinates.
//!
//! The world is a set of independent maps, each a flat 2-D plane measured in
//! world units.  Distances between points on different maps are infinite.

/// A point on one map of the world.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Application-defined map index.
    pub map: u16,
    pub x:   f32,
    pub y:   f32,
}

impl Position {
    #[inline]
    pub fn new(map: u16, x: f32, y: f32) -> Self {
        Self { map, x, y }
    }

    /// Euclidean distance in world units, or `f32::INFINITY` across maps.
    pub fn distance(self, other: Position) -> f32 {
        if self.map != other.map {
            return f32::INFINITY;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// `true` when `other` is on the same map and no further than `range`.
    #[inline]
    pub fn within(self, other: Position, range: f32) -> bool {
        self.distance(other) <= range
    }

    /// Return a copy shifted by `(dx, dy)` on the same map.
    #[inline]
    pub fn offset(self, dx: f32, dy: f32) -> Position {
        Position { map: self.map, x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:({:.1}, {:.1})", self.map, self.x, self.y)
    }
}
