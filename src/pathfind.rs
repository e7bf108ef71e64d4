//! Movement search for wargrid.
//!
//! - [`search`]: the generic breadth-first driver
//! - [`reach`]: reachability flood, attack projection, danger zones
//! - [`route`]: arrow routes, incremental repair, carrying out a move
//!
//! [`Pathfinder`] bundles the free functions with the rule constants they
//! need.

pub mod reach;
pub mod route;
pub mod search;

pub use reach::{Reachability, generate_reachability, generate_reachability_with_budget, mark_danger, mark_targets};
pub use route::{MoveOutcome, clear_route, commit_route, recalculate_path_to_point, route_cost, route_points};
pub use search::{Flow, Frontier, Traversal, breadth_first};

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::Point;
use crate::board::unit::UnitHandle;
use crate::config::Rules;
use crate::error::Result;

/// Pathfinding entry points configured by [`Rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pathfinder {
    retry_limit: u8,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(&Rules::default())
    }
}

impl Pathfinder {
    /// Pathfinder using the route repair bound from `rules`.
    #[must_use]
    pub const fn new(rules: &Rules) -> Self {
        Self {
            retry_limit: rules.route_retry_limit,
        }
    }

    /// How many trailing steps route repair may drop before a full search.
    #[must_use]
    pub const fn retry_limit(&self) -> u8 {
        self.retry_limit
    }

    /// See [`generate_reachability`].
    ///
    /// # Errors
    ///
    /// Same as [`generate_reachability`].
    pub fn generate_reachability(&self, grid: &mut Grid, handle: UnitHandle) -> Result<Reachability> {
        generate_reachability(grid, handle)
    }

    /// See [`recalculate_path_to_point`].
    ///
    /// # Errors
    ///
    /// Same as [`recalculate_path_to_point`].
    pub fn recalculate_path_to_point(&self, grid: &mut Grid, handle: UnitHandle, destination: Point) -> Result<Vec<Point>> {
        recalculate_path_to_point(grid, handle, destination, self.retry_limit)
    }

    /// See [`mark_targets`].
    ///
    /// # Errors
    ///
    /// Same as [`mark_targets`].
    pub fn mark_targets(&self, grid: &mut Grid, handle: UnitHandle, from: Point) -> Result<Vec<Point>> {
        mark_targets(grid, handle, from)
    }

    /// See [`mark_danger`].
    pub fn mark_danger(&self, grid: &mut Grid, viewer: Faction) -> usize {
        mark_danger(grid, viewer)
    }

    /// See [`commit_route`].
    ///
    /// # Errors
    ///
    /// Same as [`commit_route`].
    pub fn commit_route(&self, grid: &mut Grid, handle: UnitHandle) -> Result<MoveOutcome> {
        commit_route(grid, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit::Unit;
    use crate::board::unit_kind::UnitId;

    #[test]
    fn test_retry_limit_from_rules() {
        let rules = Rules {
            route_retry_limit: 5,
            ..Rules::default()
        };
        assert_eq!(Pathfinder::new(&rules).retry_limit(), 5);
        assert_eq!(Pathfinder::default().retry_limit(), 2);
    }

    #[test]
    fn test_select_route_and_move() {
        let mut grid = Grid::new(5, 5).unwrap();
        let h = grid.spawn(Unit::new(UnitId::Infantry, 1), Point::new(2, 2)).unwrap();
        let finder = Pathfinder::default();
        let reach = finder.generate_reachability(&mut grid, h).unwrap();
        assert_eq!(reach.tiles.len(), 21);
        let route = finder.recalculate_path_to_point(&mut grid, h, Point::new(4, 3)).unwrap();
        assert_eq!(route.len(), 4);
        let outcome = finder.commit_route(&mut grid, h).unwrap();
        assert_eq!(outcome.at(), Point::new(4, 3));
        assert!(!grid.tile_at(Point::new(2, 2)).unwrap().move_flag());
    }
}
