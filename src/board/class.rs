//! Shared vocabularies: movement classes, armor classes and factions.

use serde::{Deserialize, Serialize};

/// Owner of units and buildings. `0` is never a real faction.
pub type Faction = u8;

/// Number of movement classes; width of every terrain cost table.
pub const MOVEMENT_CLASS_COUNT: usize = 8;

/// Number of armor classes; width of every weapon target table.
pub const ARMOR_CLASS_COUNT: usize = 6;

/// Which movement-cost column applies to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MovementClass {
    /// Foot soldiers.
    Infantry = 0,
    /// Heavy foot soldiers; climb mountains and ford rivers cheaply.
    Mech = 1,
    /// Light wheeled vehicles.
    TireA = 2,
    /// Heavy wheeled vehicles.
    TireB = 3,
    /// Tracked vehicles.
    Tread = 4,
    /// Aircraft.
    Air = 5,
    /// Warships.
    Ship = 6,
    /// Landing craft; may beach on shoals.
    Transport = 7,
}

impl MovementClass {
    /// All classes in column order.
    pub const ALL: [Self; MOVEMENT_CLASS_COUNT] = [
        Self::Infantry,
        Self::Mech,
        Self::TireA,
        Self::TireB,
        Self::Tread,
        Self::Air,
        Self::Ship,
        Self::Transport,
    ];

    /// Column index into terrain cost tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The domain this class moves through.
    #[must_use]
    pub const fn domain(self) -> Domain {
        match self {
            Self::Air => Domain::Air,
            Self::Ship | Self::Transport => Domain::Sea,
            _ => Domain::Land,
        }
    }

    /// Foot units: capture buildings and get the mountain vision bonus.
    #[must_use]
    pub const fn is_foot(self) -> bool {
        matches!(self, Self::Infantry | Self::Mech)
    }
}

/// Which weapons can hit a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ArmorClass {
    /// Foot soldiers.
    Infantry = 0,
    /// Ground vehicles.
    Vehicle = 1,
    /// Helicopters.
    Copter = 2,
    /// Fixed-wing aircraft.
    Plane = 3,
    /// Surface ships.
    Ship = 4,
    /// Submarines.
    Sub = 5,
}

impl ArmorClass {
    /// All classes in column order.
    pub const ALL: [Self; ARMOR_CLASS_COUNT] = [
        Self::Infantry,
        Self::Vehicle,
        Self::Copter,
        Self::Plane,
        Self::Ship,
        Self::Sub,
    ];

    /// Column index into weapon target tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Where a unit of this armor class can stand.
    #[must_use]
    pub const fn domain(self) -> Domain {
        match self {
            Self::Infantry | Self::Vehicle => Domain::Land,
            Self::Copter | Self::Plane => Domain::Air,
            Self::Ship | Self::Sub => Domain::Sea,
        }
    }
}

/// Coarse medium a unit occupies, used for hypothetical targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Ground.
    Land,
    /// Sky.
    Air,
    /// Water.
    Sea,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, class) in MovementClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
        for (i, class) in ArmorClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
    }

    #[test]
    fn test_domains() {
        assert_eq!(MovementClass::Transport.domain(), Domain::Sea);
        assert_eq!(MovementClass::Tread.domain(), Domain::Land);
        assert_eq!(ArmorClass::Sub.domain(), Domain::Sea);
        assert_eq!(ArmorClass::Copter.domain(), Domain::Air);
    }
}
