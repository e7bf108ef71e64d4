//! Board layer for wargrid.
//!
//! Everything the pathfinder and combat resolver read and write:
//! - Bit-packed scratch and stat storage
//! - Terrain and unit archetype catalogs
//! - Tiles, units and the roster arena that owns units
//! - The bordered grid with unit lifecycle commands and fog of war
//! - Invariant checks for tests and fuzzing

pub mod bitfield;
pub mod class;
pub mod grid;
pub mod invariants;
pub mod point;
pub mod terrain;
pub mod tile;
pub mod unit;
pub mod unit_kind;

pub use bitfield::{BitAllocator, BitMask};
pub use class::{ArmorClass, Domain, Faction, MovementClass};
pub use grid::Grid;
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use point::{Direction, Neighborhood, Point};
pub use terrain::{BridgeBase, TerrainExtra, TerrainId, TerrainKind};
pub use tile::Tile;
pub use unit::{AttackMethod, Roster, Unit, UnitHandle, attack_method_for};
pub use unit_kind::{UnitId, UnitKind, Weapon};
