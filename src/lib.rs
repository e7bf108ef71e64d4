// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Wargrid: a deterministic tactical-map core for turn-based strategy games.
//!
//! This crate provides the board, movement and combat rules that a
//! presentation layer drives one command at a time:
//! - Bit-packed tiles and units on a bordered grid
//! - Reachability flood fill and incremental route repair
//! - Seeded, reproducible combat with neutral-luck forecasts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / presentation (render, save) │
//! ├──────────────────┬──────────────────┤
//! │    Pathfinder    │  CombatResolver  │
//! ├──────────────────┴──────────────────┤
//! │   Board (Grid, Tile, Unit, catalogs)│
//! └─────────────────────────────────────┘
//! ```

pub mod board;
pub mod combat;
pub mod config;
pub mod error;
pub mod pathfind;
pub mod render;
pub mod save;

pub use error::{BoardError, LoadError, Result};

// Re-export key types at crate root for convenience
pub use board::{Direction, Faction, Grid, Point, Tile, TerrainId, Unit, UnitHandle, UnitId};
pub use combat::{Attack, CombatOutcome, CombatResolver, Commander};
pub use config::Rules;
pub use pathfind::{MoveOutcome, Pathfinder, Reachability};
pub use save::Scenario;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_then_attack() {
        let mut grid = Grid::from_rows(&["....", "...."]).unwrap();
        let tank = grid.spawn(Unit::new(UnitId::Tank, 1), Point::new(0, 0)).unwrap();
        grid.spawn(Unit::new(UnitId::Infantry, 2), Point::new(3, 1)).unwrap();

        let finder = Pathfinder::default();
        let reach = finder.generate_reachability(&mut grid, tank).unwrap();
        assert!(reach.targets.contains(&Point::new(3, 1)));
        finder.recalculate_path_to_point(&mut grid, tank, Point::new(3, 0)).unwrap();
        let moved = finder.commit_route(&mut grid, tank).unwrap();
        assert_eq!(moved.at(), Point::new(3, 0));

        let attack = Attack {
            attacker: tank,
            from: moved.at(),
            target: Point::new(3, 1),
        };
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 7).unwrap();
        assert!(outcome.damage > 0);
        combat::execute_attack(&mut grid, attack, &outcome).unwrap();
        board::assert_invariants(&grid);
    }
}
