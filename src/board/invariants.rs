//! Board invariants - sanity checks that detect bugs.
//!
//! None of these should ever fire for a board driven only through the
//! [`Grid`] API. Fuzz targets and property tests call [`check_invariants`]
//! after every command.

use crate::board::grid::Grid;
use crate::board::point::{Direction, Point};
use crate::board::terrain::TerrainId;
use crate::board::unit::{CAPTURE_GOAL, MAX_HP, MAX_RANK, Unit};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(violations: &mut Vec<InvariantViolation>, message: String) {
    violations.push(InvariantViolation { message });
}

fn check_stats(unit: &Unit, label: &str, violations: &mut Vec<InvariantViolation>) {
    let kind = unit.kind();
    if unit.hp() > MAX_HP || unit.hp() == 0 {
        violation(violations, format!("{label} has HP {}", unit.hp()));
    }
    if unit.fuel() > kind.max_fuel {
        violation(violations, format!("{label} fuel {} > max {}", unit.fuel(), kind.max_fuel));
    }
    if unit.ammo() > kind.max_ammo {
        violation(violations, format!("{label} ammo {} > max {}", unit.ammo(), kind.max_ammo));
    }
    if unit.capture() > CAPTURE_GOAL || unit.rank() > MAX_RANK {
        violation(violations, format!("{label} capture/rank out of range"));
    }
    if unit.cargo().len() > usize::from(kind.cargo_capacity) {
        violation(violations, format!("{label} carries more than its capacity"));
    }
    for (i, passenger) in unit.cargo().iter().enumerate() {
        if !kind.can_carry(passenger.id()) {
            violation(violations, format!("{label} carries a {} it cannot board", passenger.kind().name));
        }
        if passenger.position().is_some() {
            violation(violations, format!("{label} cargo {i} still has board coordinates"));
        }
        check_stats(passenger, &format!("{label} cargo {i}"), violations);
    }
}

/// Check all board invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(grid: &Grid) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let (width, height) = (grid.width(), grid.height());

    // Border ring: Void and empty
    for y in -1..=height {
        for x in -1..=width {
            let p = Point::new(x, y);
            if grid.valid_point(p) {
                continue;
            }
            match grid.tile_at(p) {
                Ok(tile) if tile.terrain() != TerrainId::Void || tile.unit().is_some() => {
                    violation(&mut violations, format!("border tile {p} is not empty Void"));
                }
                Ok(_) => {}
                Err(e) => violation(&mut violations, format!("border tile {p} unreachable: {e}")),
            }
        }
    }

    for p in grid.points() {
        let Ok(tile) = grid.tile_at(p) else {
            violation(&mut violations, format!("tile {p} unreachable"));
            continue;
        };
        if tile.point() != p {
            violation(&mut violations, format!("tile {p} records coordinates {}", tile.point()));
        }
        if tile.terrain() == TerrainId::Void {
            violation(&mut violations, format!("logical tile {p} is Void"));
        }
        if !tile.terrain().kind().can_be_owned_by(tile.owner()) {
            violation(&mut violations, format!("tile {p} owned but not ownable"));
        }
        if let Some(extra) = tile.extra()
            && !tile.terrain().accepts(&extra)
        {
            violation(&mut violations, format!("tile {p} carries foreign extra data {extra:?}"));
        }

        // Tile -> unit back-reference
        if let Some(handle) = tile.unit() {
            match grid.unit(handle) {
                Some(unit) if unit.position() == Some(p) => {}
                Some(unit) => violation(
                    &mut violations,
                    format!("tile {p} holds a unit that thinks it is at {:?}", unit.position()),
                ),
                None => violation(&mut violations, format!("tile {p} holds a stale unit handle")),
            }
        }

        // Arrow pairing with the neighbour each arrow points at
        let to = tile.arrow_to();
        if to.is_some() {
            let paired = grid.tile_at(p.step(to)).is_ok_and(|next| next.arrow_from() == to.opposite());
            if !paired {
                violation(&mut violations, format!("arrow from {p} towards {to:?} is unpaired"));
            }
        }
        let from = tile.arrow_from();
        if from.is_some() {
            let paired = grid.tile_at(p.step(from)).is_ok_and(|prev| prev.arrow_to() == from.opposite());
            if !paired {
                violation(&mut violations, format!("arrow into {p} from {from:?} is unpaired"));
            }
        }
        if to == from && to != Direction::None {
            violation(&mut violations, format!("tile {p} arrows fold back on themselves"));
        }
    }

    // Unit -> tile back-reference and stat ranges
    for (handle, unit) in grid.roster().iter() {
        let label = format!("{} #{}", unit.kind().name, handle.index());
        match unit.position() {
            Some(p) if grid.handle_at(p) == Some(handle) => {}
            Some(p) => violation(&mut violations, format!("{label} at {p} is not on its tile")),
            None => violation(&mut violations, format!("{label} is in the roster but not placed")),
        }
        check_stats(unit, &label, &mut violations);
    }

    violations
}

/// Assert all board invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(grid: &Grid) {
    let violations = check_invariants(grid);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Board invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_grid: &Grid) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit_kind::UnitId;

    fn create_valid_board() -> Grid {
        let mut grid = Grid::from_rows(&["..C", ".w.", "T.."]).unwrap();
        grid.set_owner(Point::new(2, 0), Some(1)).unwrap();
        grid.spawn(Unit::new(UnitId::Infantry, 1), Point::new(0, 0)).unwrap();
        grid.spawn(Unit::new(UnitId::Apc, 2), Point::new(1, 1)).unwrap();
        grid
    }

    #[test]
    fn test_valid_board_passes() {
        let grid = create_valid_board();
        assert!(check_invariants(&grid).is_empty());
    }

    #[test]
    fn test_unpaired_arrow_detected() {
        let mut grid = create_valid_board();
        grid.tile_at_mut(Point::new(0, 0)).unwrap().set_arrow_to(Direction::Right);
        let violations = check_invariants(&grid);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("unpaired"));
    }

    #[test]
    fn test_paired_arrow_passes() {
        let mut grid = create_valid_board();
        grid.tile_at_mut(Point::new(0, 0)).unwrap().set_arrow_to(Direction::Right);
        grid.tile_at_mut(Point::new(1, 0)).unwrap().set_arrow_from(Direction::Left);
        assert!(check_invariants(&grid).is_empty());
    }

    #[test]
    fn test_dirty_border_detected() {
        let mut grid = create_valid_board();
        grid.tile_at_mut(Point::new(-1, 1)).unwrap().set_terrain(TerrainId::Plain);
        let violations = check_invariants(&grid);
        assert!(violations.iter().any(|v| v.message.contains("border")));
    }

    #[test]
    fn test_void_inside_board_detected() {
        let mut grid = create_valid_board();
        grid.tile_at_mut(Point::new(1, 2)).unwrap().set_terrain(TerrainId::Void);
        let violations = check_invariants(&grid);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("logical tile (1, 2) is Void"));
    }

    #[test]
    fn test_dangling_tile_reference_detected() {
        let mut grid = create_valid_board();
        let handle = grid.handle_at(Point::new(0, 0)).unwrap();
        grid.tile_at_mut(Point::new(2, 2)).unwrap().set_unit(Some(handle));
        let violations = check_invariants(&grid);
        assert!(violations.iter().any(|v| v.message.contains("thinks it is at")));
    }
}
