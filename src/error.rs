//! Error types for board access and scenario loading.

use thiserror::Error;

use crate::board::point::Point;

/// A contract violation against the board.
///
/// These indicate a bug in the caller rather than a player-facing condition:
/// the orchestrating layer is expected to offer only legal commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A coordinate fell outside the grid and its border ring.
    #[error("point {point} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending coordinate.
        point: Point,
        /// Logical grid width.
        width: i16,
        /// Logical grid height.
        height: i16,
    },
    /// Grid dimensions are zero or too large to pack.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i16,
        /// Requested height.
        height: i16,
    },
    /// No unit stands at the given point.
    #[error("no unit at {point}")]
    NoUnit {
        /// Where a unit was expected.
        point: Point,
    },
    /// A unit handle outlived its unit.
    #[error("unit handle is stale")]
    StaleHandle,
    /// The target tile already holds a unit.
    #[error("tile {point} is occupied")]
    Occupied {
        /// The occupied tile.
        point: Point,
    },
    /// A command that the rules do not allow in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// A full route search failed for a destination flagged reachable.
    #[error("no route to reachable destination {destination}")]
    RouteInvariant {
        /// The destination that should have been reachable.
        destination: Point,
    },
}

/// Failure to load a persisted match.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Malformed JSON.
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    /// File could not be read or written.
    #[error("scenario I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A terrain serial with no catalog entry.
    #[error("unknown terrain serial {0}")]
    UnknownTerrain(i16),
    /// A unit serial with no catalog entry.
    #[error("unknown unit serial {0}")]
    UnknownUnit(i16),
    /// Tile list does not match the declared dimensions.
    #[error("expected {expected} tiles, found {found}")]
    TileCount {
        /// `width * height`.
        expected: usize,
        /// Tiles present in the record.
        found: usize,
    },
    /// The record decoded but violates board rules.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Result type for board operations.
pub type Result<T, E = BoardError> = std::result::Result<T, E>;
