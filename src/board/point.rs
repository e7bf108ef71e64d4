//! Coordinates, cardinal directions and 3x3 neighbourhoods.

use serde::{Deserialize, Serialize};

/// A board coordinate.
///
/// Logical tiles live in `[0, width) x [0, height)`; the void border adds
/// `-1` and `width`/`height` on every side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (column).
    pub x: i16,
    /// Y coordinate (row).
    pub y: i16,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// The point one step away in `direction`. `Direction::None` is the identity.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset by an arbitrary delta.
    #[must_use]
    pub const fn offset(self, dx: i16, dy: i16) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Taxicab distance.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u16 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction from `self` to an orthogonally adjacent `other`, if adjacent.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::CARDINALS
            .into_iter()
            .find(|&d| self.step(d) == other)
    }

    /// The four orthogonal neighbours in [`Direction::SEARCH_ORDER`].
    #[must_use]
    pub fn orthogonal(self) -> [Self; 4] {
        Direction::SEARCH_ORDER.map(|d| self.step(d))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A path-arrow direction code (3 bits on the tile, `0` = none).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// No arrow.
    #[default]
    None = 0,
    /// Towards `y - 1`.
    Up = 1,
    /// Towards `x + 1`.
    Right = 2,
    /// Towards `y + 1`.
    Down = 3,
    /// Towards `x - 1`.
    Left = 4,
}

impl Direction {
    /// The four real directions, clockwise from up.
    pub const CARDINALS: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Neighbour visiting order for every breadth-first search.
    ///
    /// Among equally short routes the one found first in this order wins.
    pub const SEARCH_ORDER: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Packed code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode a packed code; unknown codes read as `None`.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Up,
            2 => Self::Right,
            3 => Self::Down,
            4 => Self::Left,
            _ => Self::None,
        }
    }

    /// `(dx, dy)` for one step.
    #[must_use]
    pub const fn offset(self) -> (i16, i16) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// True for the four real directions.
    #[must_use]
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A 3x3 block of samples centred on a point, stored row-major from `(-1, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood<T> {
    cells: [T; 9],
}

impl<T: Copy> Neighborhood<T> {
    /// Build from nine row-major samples.
    #[must_use]
    pub const fn new(cells: [T; 9]) -> Self {
        Self { cells }
    }

    /// Build by sampling `f(dx, dy)` for `dx, dy` in `-1..=1`.
    pub fn from_fn(mut f: impl FnMut(i16, i16) -> T) -> Self {
        let cells = std::array::from_fn(|i| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let (dx, dy) = ((i % 3) as i16 - 1, (i / 3) as i16 - 1);
            f(dx, dy)
        });
        Self { cells }
    }

    /// Sample at offset `(dx, dy)`; offsets outside `-1..=1` clamp to the ring.
    #[must_use]
    pub fn at(&self, dx: i16, dy: i16) -> T {
        #[allow(clippy::cast_sign_loss)]
        let (col, row) = ((dx.clamp(-1, 1) + 1) as usize, (dy.clamp(-1, 1) + 1) as usize);
        self.cells[row * 3 + col]
    }

    /// The centre sample.
    #[must_use]
    pub fn center(&self) -> T {
        self.cells[4]
    }

    /// Sample one step in `direction`.
    #[must_use]
    pub fn toward(&self, direction: Direction) -> T {
        let (dx, dy) = direction.offset();
        self.at(dx, dy)
    }

    /// The four orthogonal samples, clockwise from up.
    #[must_use]
    pub fn orthogonal(&self) -> [T; 4] {
        Direction::CARDINALS.map(|d| self.toward(d))
    }

    /// Map every sample.
    #[must_use]
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Neighborhood<U> {
        Neighborhood {
            cells: self.cells.map(f),
        }
    }

    /// All nine samples, row-major.
    #[must_use]
    pub const fn cells(&self) -> &[T; 9] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_codes_round_trip() {
        for d in Direction::CARDINALS {
            assert_eq!(Direction::from_code(d.code()), d);
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::from_code(7), Direction::None);
    }

    #[test]
    fn test_direction_to() {
        let a = Point::new(2, 2);
        assert_eq!(a.direction_to(Point::new(3, 2)), Some(Direction::Right));
        assert_eq!(a.direction_to(Point::new(2, 1)), Some(Direction::Up));
        assert_eq!(a.direction_to(Point::new(3, 3)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Point::new(0, 0).manhattan(Point::new(-1, 3)), 4);
    }

    #[test]
    fn test_neighborhood_layout() {
        let n = Neighborhood::from_fn(|dx, dy| (dx, dy));
        assert_eq!(n.center(), (0, 0));
        assert_eq!(n.at(-1, -1), (-1, -1));
        assert_eq!(n.toward(Direction::Left), (-1, 0));
        assert_eq!(n.orthogonal(), [(0, -1), (1, 0), (0, 1), (-1, 0)]);
    }
}
