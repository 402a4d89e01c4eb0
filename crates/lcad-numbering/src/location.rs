use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Integer position of a component on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance_to(self, other: Location) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        dx + dy
    }

    /// Top-to-bottom, then left-to-right.
    pub fn reading_order(&self, other: &Location) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }

    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned integer rectangle.
///
/// For a component this is expressed relative to its [`Location`] (the
/// "offset bounds"); for a circuit it is absolute. Arithmetic saturates at
/// the `i32` range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn translate(&self, loc: Location) -> Self {
        Self::new(
            self.x.saturating_add(loc.x),
            self.y.saturating_add(loc.y),
            self.width,
            self.height,
        )
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// Round down to the grid.
pub(crate) fn snap_down(value: i32, grid: i32) -> i32 {
    value.saturating_sub(value.rem_euclid(grid))
}

/// Round up to the grid.
pub(crate) fn snap_up(value: i32, grid: i32) -> i32 {
    let down = snap_down(value, grid);
    if down == value {
        down
    } else {
        down.saturating_add(grid)
    }
}
