//! Reachability flood fill and attack projection.
//!
//! The flood is breadth-first over `(point, remaining budget)` nodes. A tile
//! is re-expanded only when reached with strictly more budget left than any
//! earlier visit, so the stored temp value ends up as the best remaining
//! budget for that tile.

use serde::Serialize;
use tracing::debug;

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::Point;
use crate::board::terrain::TerrainId;
use crate::board::tile::TEMP_MAX;
use crate::board::unit::{Unit, UnitHandle};
use crate::error::{BoardError, Result};
use crate::pathfind::search::{Flow, breadth_first};

/// Result of [`generate_reachability`]. The same data is left on the grid
/// as `move_flag`/`attack_flag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reachability {
    /// Where the unit stands.
    pub origin: Point,
    /// Movement budget the flood started with.
    pub budget: u8,
    /// Tiles with `move_flag`, row-major.
    pub tiles: Vec<Point>,
    /// Tiles with `attack_flag`, row-major.
    pub targets: Vec<Point>,
}

/// Which attack flags survive the final pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recheck {
    /// Keep only tiles holding an enemy attackable right now.
    Attackable,
    /// Keep every projected tile inside the square of influence.
    Threat,
}

pub(super) fn placed_unit(grid: &Grid, handle: UnitHandle) -> Result<(Unit, Point)> {
    let unit = grid.unit(handle).ok_or(BoardError::StaleHandle)?;
    let origin = unit
        .position()
        .ok_or(BoardError::InvalidOperation("unit is not on the board"))?;
    Ok((unit.clone(), origin))
}

/// Flood-fill the tiles the unit behind `handle` can reach this turn.
///
/// Clears the previous selection first. Budget is `min(fuel, move points)`.
///
/// # Errors
///
/// [`BoardError::StaleHandle`] for a dead handle and
/// [`BoardError::InvalidOperation`] for a unit that is not placed.
pub fn generate_reachability(grid: &mut Grid, handle: UnitHandle) -> Result<Reachability> {
    let budget = grid.unit(handle).ok_or(BoardError::StaleHandle)?.movement_budget();
    generate_reachability_with_budget(grid, handle, budget)
}

/// [`generate_reachability`] with an explicit budget, clamped to the temp
/// value range.
///
/// # Errors
///
/// Same as [`generate_reachability`].
pub fn generate_reachability_with_budget(grid: &mut Grid, handle: UnitHandle, budget: u8) -> Result<Reachability> {
    let (unit, origin) = placed_unit(grid, handle)?;
    grid.clear_selection();
    let budget = budget.min(TEMP_MAX.unsigned_abs());
    flood(grid, handle, &unit, origin, budget, Recheck::Attackable);

    let reach = Reachability {
        origin,
        budget,
        tiles: grid
            .points()
            .filter(|&p| grid.tile_at(p).is_ok_and(|t| t.move_flag()))
            .collect(),
        targets: grid
            .points()
            .filter(|&p| grid.tile_at(p).is_ok_and(|t| t.attack_flag()))
            .collect(),
    };
    debug!(
        unit = unit.kind().name,
        ?origin,
        budget,
        reached = reach.tiles.len(),
        targets = reach.targets.len(),
        "reachability generated"
    );
    Ok(reach)
}

#[allow(clippy::cast_possible_wrap)]
fn flood(grid: &mut Grid, handle: UnitHandle, unit: &Unit, origin: Point, budget: u8, recheck: Recheck) {
    let kind = unit.kind();
    let class = kind.movement_class;
    let direct = kind.is_armed() && !kind.is_indirect();

    breadth_first(
        grid,
        (origin, budget as i8),
        |grid, &(p, remaining)| {
            if remaining < 0 {
                return false;
            }
            let Ok(tile) = grid.tile_at(p) else {
                return false;
            };
            tile.terrain() != TerrainId::Void
                && (p == origin || tile.traversable(unit, grid.roster()))
                && remaining > tile.temp_value()
        },
        |grid, (p, remaining), frontier| {
            let can_stop = grid.tile_at(p).is_ok_and(|t| t.occupiable(handle, grid.roster()));
            if let Ok(tile) = grid.tile_at_mut(p) {
                tile.set_move_flag(true);
                tile.set_temp_value(remaining);
            }
            if direct && can_stop {
                for n in p.orthogonal() {
                    let fresh = grid
                        .tile_at(n)
                        .is_ok_and(|t| !t.attack_flag() && t.targetable(unit, grid.roster()));
                    if fresh && let Ok(tile) = grid.tile_at_mut(n) {
                        tile.set_attack_flag(true);
                    }
                }
            }
            for n in p.orthogonal() {
                let cost = grid.tile_at(n).map_or(0, |t| t.movement_cost(class));
                if cost > 0 {
                    frontier.push((n, remaining - cost as i8));
                }
            }
            Flow::Continue
        },
    );

    if kind.is_armed() && kind.is_indirect() {
        for p in grid.points() {
            if !kind.in_range(origin.manhattan(p)) {
                continue;
            }
            let aim = grid.tile_at(p).is_ok_and(|t| t.targetable(unit, grid.roster()));
            if aim && let Ok(tile) = grid.tile_at_mut(p) {
                tile.set_attack_flag(true);
            }
        }
    }

    // Square of influence around the origin.
    let reach = if kind.is_indirect() {
        i16::from(kind.max_range)
    } else {
        i16::from(budget) + 1
    };
    for p in grid.points() {
        let Ok(tile) = grid.tile_at(p) else { continue };
        if !tile.attack_flag() {
            continue;
        }
        let inside = (p.x - origin.x).abs() <= reach && (p.y - origin.y).abs() <= reach;
        let keep = inside
            && match recheck {
                Recheck::Attackable => tile.attackable(unit, grid.roster()),
                Recheck::Threat => true,
            };
        if !keep && let Ok(tile) = grid.tile_at_mut(p) {
            tile.set_attack_flag(false);
        }
    }
}

/// Flag every tile the unit could fire at from `from` (attack-selection mode).
///
/// Clears previous target flags. Returns the flagged points, row-major.
///
/// # Errors
///
/// [`BoardError::StaleHandle`] for a dead handle and
/// [`BoardError::OutOfBounds`] for an invalid `from`.
pub fn mark_targets(grid: &mut Grid, handle: UnitHandle, from: Point) -> Result<Vec<Point>> {
    let unit = grid.unit(handle).ok_or(BoardError::StaleHandle)?.clone();
    if !grid.valid_point(from) {
        return Err(BoardError::OutOfBounds {
            point: from,
            width: grid.width(),
            height: grid.height(),
        });
    }
    let kind = unit.kind();
    let mut targets = Vec::new();
    for p in grid.points() {
        let hit = kind.in_range(from.manhattan(p))
            && grid.tile_at(p).is_ok_and(|t| t.attackable(&unit, grid.roster()));
        if let Ok(tile) = grid.tile_at_mut(p) {
            tile.set_target_flag(hit);
        }
        if hit {
            targets.push(p);
        }
    }
    Ok(targets)
}

/// Union the threat zones of every visible enemy of `viewer` into
/// `danger_flag`.
///
/// Search flags are cleared afterwards. Returns the number of tiles in
/// danger.
pub fn mark_danger(grid: &mut Grid, viewer: Faction) -> usize {
    let threats: Vec<(UnitHandle, Point)> = grid
        .roster()
        .iter()
        .filter(|(_, unit)| unit.faction() != viewer && unit.kind().is_armed())
        .filter_map(|(handle, unit)| Some((handle, unit.position()?)))
        .filter(|&(_, at)| grid.tile_at(at).is_ok_and(|t| t.occupant_visible()))
        .collect();

    for p in grid.points() {
        if let Ok(tile) = grid.tile_at_mut(p) {
            tile.set_danger_flag(false);
        }
    }

    for (handle, origin) in threats {
        let Some(unit) = grid.unit(handle).cloned() else { continue };
        grid.clear_search();
        flood(grid, handle, &unit, origin, unit.movement_budget(), Recheck::Threat);
        for p in grid.points() {
            let hot = grid.tile_at(p).is_ok_and(|t| t.attack_flag());
            if hot && let Ok(tile) = grid.tile_at_mut(p) {
                tile.set_danger_flag(true);
            }
        }
    }
    grid.clear_search();

    grid.points()
        .filter(|&p| grid.tile_at(p).is_ok_and(|t| t.danger_flag()))
        .count()
}
