//! Persisted match state.
//!
//! A scenario file is JSON: dimensions, a row-major tile list and the
//! commanders in play. Catalog references are stored by serial so files stay
//! readable across catalog reorderings that keep serials stable.
//!
//! Optional terrain data that no longer matches the catalog is dropped with
//! a warning instead of failing the load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::Point;
use crate::board::terrain::{BridgeBase, TerrainExtra, TerrainId};
use crate::board::unit::Unit;
use crate::board::unit_kind::UnitId;
use crate::combat::Commander;
use crate::error::{BoardError, LoadError};

/// Persisted optional terrain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtraRecord {
    /// See [`TerrainExtra::Bridge`].
    Bridge {
        /// Underlying surface.
        over: BridgeBase,
    },
    /// See [`TerrainExtra::Charge`].
    Charge {
        /// Remaining charge.
        remaining: u8,
    },
    /// See [`TerrainExtra::Wasteland`]; the previous terrain by serial.
    Wasteland {
        /// Serial of the previous terrain.
        previous: i16,
    },
}

impl From<TerrainExtra> for ExtraRecord {
    fn from(extra: TerrainExtra) -> Self {
        match extra {
            TerrainExtra::Bridge { over } => Self::Bridge { over },
            TerrainExtra::Charge { remaining } => Self::Charge { remaining },
            TerrainExtra::Wasteland { previous } => Self::Wasteland {
                previous: previous.serial(),
            },
        }
    }
}

impl ExtraRecord {
    /// Resolve against the catalog; `None` when a serial has gone stale.
    #[must_use]
    pub fn resolve(self) -> Option<TerrainExtra> {
        Some(match self {
            Self::Bridge { over } => TerrainExtra::Bridge { over },
            Self::Charge { remaining } => TerrainExtra::Charge { remaining },
            Self::Wasteland { previous } => TerrainExtra::Wasteland {
                previous: TerrainId::from_serial(previous)?,
            },
        })
    }
}

/// Persisted unit, cargo included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Archetype serial.
    pub kind: i16,
    /// Owning faction.
    pub faction: Faction,
    /// Hit points, `1..=100`.
    pub hp: u8,
    /// Fuel left.
    pub fuel: u8,
    /// Primary ammunition left.
    pub ammo: u8,
    /// Capture progress.
    #[serde(default)]
    pub capture: u8,
    /// Veterancy rank.
    #[serde(default)]
    pub rank: u8,
    /// Carries the faction's commanding officer.
    #[serde(default)]
    pub co_aboard: bool,
    /// May still act this turn.
    #[serde(default = "default_orderable")]
    pub orderable: bool,
    /// Board coordinates; absent for cargo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Passengers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cargo: Vec<UnitRecord>,
}

const fn default_orderable() -> bool {
    true
}

impl From<&Unit> for UnitRecord {
    fn from(unit: &Unit) -> Self {
        Self {
            kind: unit.id().serial(),
            faction: unit.faction(),
            hp: unit.hp(),
            fuel: unit.fuel(),
            ammo: unit.ammo(),
            capture: unit.capture(),
            rank: unit.rank(),
            co_aboard: unit.co_aboard(),
            orderable: unit.orderable(),
            position: unit.position(),
            cargo: unit.cargo().iter().map(Self::from).collect(),
        }
    }
}

impl UnitRecord {
    /// Rebuild the unit, stats clamped to the archetype.
    ///
    /// # Errors
    ///
    /// [`LoadError::UnknownUnit`] for a stale serial and
    /// [`LoadError::Board`] when cargo cannot board its carrier.
    pub fn to_unit(&self) -> Result<Unit, LoadError> {
        let id = UnitId::from_serial(self.kind).ok_or(LoadError::UnknownUnit(self.kind))?;
        let mut unit = Unit::new(id, self.faction);
        unit.set_hp(i32::from(self.hp));
        unit.set_fuel(i32::from(self.fuel));
        unit.set_ammo(i32::from(self.ammo));
        unit.set_capture(i32::from(self.capture));
        unit.set_rank(i32::from(self.rank));
        unit.set_co_aboard(self.co_aboard);
        unit.set_orderable(self.orderable);
        for passenger in &self.cargo {
            unit.load(passenger.to_unit()?)
                .map_err(|_| BoardError::InvalidOperation("cargo cannot board its carrier"))?;
        }
        Ok(unit)
    }
}

/// Persisted tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Terrain serial.
    pub terrain: i16,
    /// Optional terrain data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraRecord>,
    /// Owning faction of a property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Faction>,
    /// Unit standing here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitRecord>,
}

/// A whole persisted match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Logical width.
    pub width: i16,
    /// Logical height.
    pub height: i16,
    /// Row-major logical tiles.
    pub tiles: Vec<TileRecord>,
    /// Commanding officers in play.
    #[serde(default)]
    pub commanders: Vec<Commander>,
}

/// A loaded match: board plus commanders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// The board.
    pub grid: Grid,
    /// Commanding officers.
    pub commanders: Vec<Commander>,
}

impl MatchRecord {
    /// Snapshot `grid` and `commanders`.
    #[must_use]
    pub fn capture(grid: &Grid, commanders: &[Commander]) -> Self {
        let tiles = grid
            .points()
            .filter_map(|p| grid.tile_at(p).ok())
            .map(|tile| TileRecord {
                terrain: tile.terrain().serial(),
                extra: tile.extra().map(ExtraRecord::from),
                owner: tile.owner(),
                unit: tile.unit().and_then(|h| grid.unit(h)).map(UnitRecord::from),
            })
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            tiles,
            commanders: commanders.to_vec(),
        }
    }

    /// Rebuild the board.
    ///
    /// # Errors
    ///
    /// [`LoadError::Board`] for bad dimensions or illegal ownership,
    /// [`LoadError::TileCount`] when the tile list does not match them and
    /// [`LoadError::UnknownTerrain`] / [`LoadError::UnknownUnit`] for stale
    /// serials. Void only exists on the border, so its serial is unknown here.
    pub fn restore(&self) -> Result<Scenario, LoadError> {
        let mut grid = Grid::new(self.width, self.height)?;
        if self.tiles.len() != grid.area() {
            return Err(LoadError::TileCount {
                expected: grid.area(),
                found: self.tiles.len(),
            });
        }

        for (point, record) in grid.points().zip(&self.tiles) {
            let terrain = TerrainId::from_serial(record.terrain)
                .filter(|&id| id != TerrainId::Void)
                .ok_or(LoadError::UnknownTerrain(record.terrain))?;
            grid.set_terrain(point, terrain)?;
            if let Some(extra) = record.extra {
                let accepted = extra
                    .resolve()
                    .is_some_and(|resolved| grid.tile_at_mut(point).is_ok_and(|t| t.set_extra(Some(resolved))));
                if !accepted {
                    warn!(?point, ?extra, terrain = terrain.kind().name, "dropping stale terrain data");
                }
            }
            grid.set_owner(point, record.owner)?;
            if let Some(unit) = &record.unit {
                if unit.position.is_some_and(|at| at != point) {
                    warn!(?point, recorded = ?unit.position, "unit coordinates disagree with its tile");
                }
                grid.spawn(unit.to_unit()?, point)?;
            }
        }

        debug!(width = self.width, height = self.height, units = grid.roster().len(), "scenario restored");
        Ok(Scenario {
            grid,
            commanders: self.commanders.clone(),
        })
    }
}

impl Scenario {
    /// Wrap a board with no commanders.
    #[must_use]
    pub const fn new(grid: Grid) -> Self {
        Self {
            grid,
            commanders: Vec::new(),
        }
    }

    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// [`LoadError::Json`] for malformed text, otherwise as
    /// [`MatchRecord::restore`].
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let record: MatchRecord = serde_json::from_str(text)?;
        record.restore()
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// [`LoadError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(&MatchRecord::capture(&self.grid, &self.commanders))?)
    }

    /// Read a scenario file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file cannot be read, otherwise as
    /// [`Scenario::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write a scenario file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file cannot be written.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::invariants::check_invariants;

    fn sample() -> Scenario {
        let mut grid = Grid::from_rows(&[".C-", ":.#"]).unwrap();
        grid.set_owner(Point::new(1, 0), Some(2)).unwrap();
        grid.tile_at_mut(Point::new(0, 1))
            .unwrap()
            .set_extra(Some(TerrainExtra::Wasteland {
                previous: TerrainId::Plasma,
            }));
        let mut apc = Unit::new(UnitId::Apc, 1);
        apc.set_fuel(33);
        apc.load(Unit::new(UnitId::Mech, 1)).unwrap();
        grid.spawn(apc, Point::new(1, 1)).unwrap();
        let mut grunt = Unit::new(UnitId::Infantry, 2);
        grunt.set_hp(41);
        grunt.set_capture(7);
        grunt.set_co_aboard(true);
        grid.spawn(grunt, Point::new(1, 0)).unwrap();
        Scenario {
            grid,
            commanders: vec![Commander {
                faction: 2,
                zone_radius: 2,
                attack_bonus: 10,
                defense_bonus: 10,
            }],
        }
    }

    #[test]
    fn test_json_restores_board() {
        let scenario = sample();
        let text = scenario.to_json().unwrap();
        let back = Scenario::from_json(&text).unwrap();
        assert_eq!(back.commanders, scenario.commanders);
        assert_eq!(MatchRecord::capture(&back.grid, &back.commanders), MatchRecord::capture(&scenario.grid, &scenario.commanders));
        let apc = back.grid.unit_at(Point::new(1, 1)).unwrap();
        assert_eq!(apc.fuel(), 33);
        assert_eq!(apc.cargo().len(), 1);
        assert!(check_invariants(&back.grid).is_empty());
    }

    #[test]
    fn test_stale_previous_terrain_is_dropped() {
        let text = r#"{
            "width": 1, "height": 1,
            "tiles": [{ "terrain": 18, "extra": { "type": "wasteland", "previous": 400 } }]
        }"#;
        let scenario = Scenario::from_json(text).unwrap();
        let tile = scenario.grid.tile_at(Point::new(0, 0)).unwrap();
        assert_eq!(tile.terrain(), TerrainId::Wasteland);
        assert_eq!(tile.extra(), None);
    }

    #[test]
    fn test_foreign_extra_is_dropped() {
        let text = r#"{ "width": 1, "height": 1,
            "tiles": [{ "terrain": 0, "extra": { "type": "charge", "remaining": 3 } }] }"#;
        let scenario = Scenario::from_json(text).unwrap();
        assert_eq!(scenario.grid.tile_at(Point::new(0, 0)).unwrap().extra(), None);
    }

    #[test]
    fn test_unknown_serials_fail() {
        let text = r#"{ "width": 1, "height": 1, "tiles": [{ "terrain": 99 }] }"#;
        assert!(matches!(Scenario::from_json(text), Err(LoadError::UnknownTerrain(99))));
        let text = r#"{ "width": 1, "height": 1, "tiles": [{ "terrain": 0,
            "unit": { "kind": 77, "faction": 1, "hp": 100, "fuel": 1, "ammo": 0 } }] }"#;
        assert!(matches!(Scenario::from_json(text), Err(LoadError::UnknownUnit(77))));
    }

    #[test]
    fn test_void_serial_inside_board_fails() {
        let text = r#"{ "width": 2, "height": 1, "tiles": [{ "terrain": 0 }, { "terrain": -1 }] }"#;
        assert!(matches!(Scenario::from_json(text), Err(LoadError::UnknownTerrain(-1))));
    }

    #[test]
    fn test_tile_count_checked() {
        let text = r#"{ "width": 2, "height": 1, "tiles": [{ "terrain": 0 }] }"#;
        assert!(matches!(
            Scenario::from_json(text),
            Err(LoadError::TileCount { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_illegal_owner_rejected() {
        let text = r#"{ "width": 1, "height": 1, "tiles": [{ "terrain": 0, "owner": 1 }] }"#;
        assert!(matches!(Scenario::from_json(text), Err(LoadError::Board(_))));
    }
}
