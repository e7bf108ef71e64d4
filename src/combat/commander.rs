//! Commanding officers and their zones of effect.

use serde::{Deserialize, Serialize};

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::Point;
use crate::board::unit::Unit;

/// A faction's commanding officer.
///
/// The officer rides inside one unit (`co_aboard`). Friendly units within
/// `zone_radius` of that unit fight with the bonuses below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commander {
    /// Faction the officer leads.
    pub faction: Faction,
    /// Manhattan radius of the zone around the officer's unit.
    pub zone_radius: u16,
    /// Attack power added inside the zone.
    pub attack_bonus: u16,
    /// Defense power added inside the zone.
    pub defense_bonus: u16,
}

impl Commander {
    /// Is a unit of this faction fighting at `at` inside the zone?
    ///
    /// `unit` counts on its own when it carries the officer, wherever it
    /// fights from.
    #[must_use]
    pub fn covers(&self, grid: &Grid, unit: &Unit, at: Point) -> bool {
        if unit.faction() != self.faction {
            return false;
        }
        if unit.co_aboard() {
            return true;
        }
        grid.roster()
            .iter()
            .filter(|(_, other)| other.faction() == self.faction && other.co_aboard())
            .filter_map(|(_, other)| other.position())
            .any(|officer| officer.manhattan(at) <= self.zone_radius)
    }
}

/// Zone bonuses `(attack, defense)` for `unit` fighting at `at`.
#[must_use]
pub fn zone_bonus(commanders: &[Commander], grid: &Grid, unit: &Unit, at: Point) -> (u16, u16) {
    commanders
        .iter()
        .find(|co| co.faction == unit.faction())
        .filter(|co| co.covers(grid, unit, at))
        .map_or((0, 0), |co| (co.attack_bonus, co.defense_bonus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit_kind::UnitId;

    const CO: Commander = Commander {
        faction: 1,
        zone_radius: 2,
        attack_bonus: 10,
        defense_bonus: 10,
    };

    #[test]
    fn test_zone_radius() {
        let mut grid = Grid::new(8, 1).unwrap();
        let mut flagship = Unit::new(UnitId::Tank, 1);
        flagship.set_co_aboard(true);
        grid.spawn(flagship, Point::new(0, 0)).unwrap();
        let grunt = Unit::new(UnitId::Infantry, 1);
        assert_eq!(zone_bonus(&[CO], &grid, &grunt, Point::new(2, 0)), (10, 10));
        assert_eq!(zone_bonus(&[CO], &grid, &grunt, Point::new(3, 0)), (0, 0));
    }

    #[test]
    fn test_other_factions_get_nothing() {
        let mut grid = Grid::new(3, 1).unwrap();
        let mut flagship = Unit::new(UnitId::Tank, 1);
        flagship.set_co_aboard(true);
        grid.spawn(flagship, Point::new(0, 0)).unwrap();
        let enemy = Unit::new(UnitId::Infantry, 2);
        assert_eq!(zone_bonus(&[CO], &grid, &enemy, Point::new(1, 0)), (0, 0));
    }

    #[test]
    fn test_officer_carries_own_zone() {
        let grid = Grid::new(3, 1).unwrap();
        let mut flagship = Unit::new(UnitId::Tank, 1);
        flagship.set_co_aboard(true);
        assert_eq!(zone_bonus(&[CO], &grid, &flagship, Point::new(2, 0)), (10, 10));
    }
}
