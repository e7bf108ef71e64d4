//! Fog of war for one viewing faction.

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::Point;

impl Grid {
    /// Recompute fog as seen by `viewer`.
    ///
    /// A tile is visible when any viewer unit is within its vision range
    /// (foot units gain the terrain's vision bonus). Enemies on concealing
    /// terrain, and diving units, stay hidden unless a viewer unit is
    /// adjacent.
    pub fn apply_fog(&mut self, viewer: Faction) {
        let watchers: Vec<(Point, u16)> = self
            .roster
            .iter()
            .filter(|(_, unit)| unit.faction() == viewer)
            .filter_map(|(_, unit)| {
                let at = unit.position()?;
                let kind = unit.kind();
                let bonus = if kind.movement_class.is_foot() {
                    self.tile_at(at).map_or(0, |t| t.terrain().kind().vision_bonus)
                } else {
                    0
                };
                Some((at, u16::from(kind.vision) + u16::from(bonus)))
            })
            .collect();

        for tile in &mut self.tiles {
            tile.set_hidden_flag(true);
            tile.set_hide_unit(false);
        }
        for point in self.points() {
            let seen = watchers.iter().any(|&(at, range)| at.manhattan(point) <= range);
            if seen && let Ok(tile) = self.tile_at_mut(point) {
                tile.set_hidden_flag(false);
            }
        }

        let concealed: Vec<Point> = self
            .roster
            .iter()
            .filter(|(_, unit)| unit.faction() != viewer)
            .filter_map(|(_, unit)| {
                let at = unit.position()?;
                let covered = self.tile_at(at).is_ok_and(|t| t.terrain().kind().conceals);
                let exposed = watchers.iter().any(|&(w, _)| w.manhattan(at) <= 1);
                ((covered || unit.kind().dives) && !exposed).then_some(at)
            })
            .collect();
        for point in concealed {
            if let Ok(tile) = self.tile_at_mut(point) {
                tile.set_hide_unit(true);
            }
        }
    }

    /// Lift all fog: every tile and unit visible.
    pub fn clear_fog(&mut self) {
        for tile in &mut self.tiles {
            tile.set_hidden_flag(false);
            tile.set_hide_unit(false);
        }
    }

    /// Reveal the unit at `point`, e.g. after an ambush.
    pub fn reveal(&mut self, point: Point) {
        if let Ok(tile) = self.tile_at_mut(point) {
            tile.set_hidden_flag(false);
            tile.set_hide_unit(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::grid::Grid;
    use crate::board::point::Point;
    use crate::board::unit::Unit;
    use crate::board::unit_kind::UnitId;

    #[test]
    fn test_vision_range() {
        let mut grid = Grid::new(8, 1).unwrap();
        grid.spawn(Unit::new(UnitId::Infantry, 1), Point::new(0, 0)).unwrap();
        grid.apply_fog(1);
        assert!(!grid.tile_at(Point::new(2, 0)).unwrap().hidden_flag());
        assert!(grid.tile_at(Point::new(3, 0)).unwrap().hidden_flag());
        grid.clear_fog();
        assert!(!grid.tile_at(Point::new(7, 0)).unwrap().hidden_flag());
    }

    #[test]
    fn test_mountain_extends_foot_vision() {
        let mut grid = Grid::from_rows(&["^......"]).unwrap();
        grid.spawn(Unit::new(UnitId::Infantry, 1), Point::new(0, 0)).unwrap();
        grid.apply_fog(1);
        assert!(!grid.tile_at(Point::new(5, 0)).unwrap().hidden_flag());
        assert!(grid.tile_at(Point::new(6, 0)).unwrap().hidden_flag());
    }

    #[test]
    fn test_wood_conceals_until_adjacent() {
        let mut grid = Grid::from_rows(&["..w.."]).unwrap();
        grid.spawn(Unit::new(UnitId::Recon, 1), Point::new(0, 0)).unwrap();
        grid.spawn(Unit::new(UnitId::Infantry, 2), Point::new(2, 0)).unwrap();
        grid.apply_fog(1);
        let tile = grid.tile_at(Point::new(2, 0)).unwrap();
        assert!(!tile.hidden_flag());
        assert!(tile.hide_unit());
        assert!(!tile.occupant_visible());

        grid.move_unit(Point::new(0, 0), Point::new(1, 0)).unwrap();
        grid.apply_fog(1);
        assert!(grid.tile_at(Point::new(2, 0)).unwrap().occupant_visible());
    }
}
