//! Unit archetypes and their weapons.
//!
//! Like terrain, archetypes are a closed enum indexing a static table. The
//! handful of per-archetype behaviours (what a transport carries, whether a
//! unit can capture or dive) are plain data on [`UnitKind`].

use serde::{Deserialize, Serialize};

use crate::board::class::{ARMOR_CLASS_COUNT, ArmorClass, MovementClass};

/// Identity of a unit archetype, serialised as its declaration-order serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
#[repr(u8)]
pub enum UnitId {
    /// Foot soldiers.
    Infantry = 0,
    /// Mechanised infantry with bazookas.
    Mech,
    /// Fast scout car.
    Recon,
    /// Light tank.
    Tank,
    /// Medium tank.
    MediumTank,
    /// Towed artillery.
    Artillery,
    /// Rocket launcher.
    Rockets,
    /// Anti-air gun.
    AntiAir,
    /// Surface-to-air missiles.
    Missiles,
    /// Armoured personnel carrier.
    Apc,
    /// Attack helicopter.
    BattleCopter,
    /// Transport helicopter.
    TransportCopter,
    /// Air superiority fighter.
    Fighter,
    /// Bomber.
    Bomber,
    /// Landing craft.
    Lander,
    /// Cruiser.
    Cruiser,
    /// Submarine.
    Submarine,
    /// Battleship.
    Battleship,
}

/// Number of unit archetypes; width of every damage table.
pub const UNIT_KIND_COUNT: usize = 18;

impl UnitId {
    /// Every archetype in declaration order.
    pub const ALL: [Self; UNIT_KIND_COUNT] = [
        Self::Infantry,
        Self::Mech,
        Self::Recon,
        Self::Tank,
        Self::MediumTank,
        Self::Artillery,
        Self::Rockets,
        Self::AntiAir,
        Self::Missiles,
        Self::Apc,
        Self::BattleCopter,
        Self::TransportCopter,
        Self::Fighter,
        Self::Bomber,
        Self::Lander,
        Self::Cruiser,
        Self::Submarine,
        Self::Battleship,
    ];

    /// The catalog record for this id.
    #[must_use]
    #[inline]
    pub fn kind(self) -> &'static UnitKind {
        &CATALOG[self as usize]
    }

    /// Stable serial.
    #[must_use]
    pub const fn serial(self) -> i16 {
        self as i16
    }

    /// Reconstruct from a serial.
    #[must_use]
    pub fn from_serial(serial: i16) -> Option<Self> {
        let index = usize::try_from(serial).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Column index into damage tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<UnitId> for i16 {
    fn from(id: UnitId) -> Self {
        id.serial()
    }
}

impl TryFrom<i16> for UnitId {
    type Error = String;

    fn try_from(serial: i16) -> Result<Self, Self::Error> {
        Self::from_serial(serial).ok_or_else(|| format!("unknown unit serial {serial}"))
    }
}

/// One of a unit's two weapons.
#[derive(Debug, Clone, Copy)]
pub struct Weapon {
    /// Display name.
    pub name: &'static str,
    /// Whether each armor class can be targeted at all.
    pub targets: [bool; ARMOR_CLASS_COUNT],
    /// Base damage per defending archetype.
    pub damage: [u8; UNIT_KIND_COUNT],
}

impl Weapon {
    /// Can this weapon aim at a unit wearing `armor`?
    #[must_use]
    pub const fn can_target(&self, armor: ArmorClass) -> bool {
        self.targets[armor.index()]
    }

    /// Base damage against `defender`, `0` when the table has no entry.
    #[must_use]
    pub fn base_damage(&self, defender: UnitId) -> u8 {
        self.damage.get(defender.index()).copied().unwrap_or(0)
    }
}

/// An immutable unit archetype.
#[derive(Debug, Clone, Copy)]
pub struct UnitKind {
    /// Catalog identity.
    pub id: UnitId,
    /// Display name.
    pub name: &'static str,
    /// Single-glyph map symbol.
    pub symbol: char,
    /// Terrain cost column.
    pub movement_class: MovementClass,
    /// What can hit this unit.
    pub armor_class: ArmorClass,
    /// Movement points per turn (at most 14).
    pub move_points: u8,
    /// Fuel tank size (at most 99).
    pub max_fuel: u8,
    /// Primary weapon ammunition (at most 15).
    pub max_ammo: u8,
    /// Vision range.
    pub vision: u8,
    /// Minimum attack distance.
    pub min_range: u8,
    /// Maximum attack distance.
    pub max_range: u8,
    /// Ammunition-limited main weapon.
    pub primary: Option<Weapon>,
    /// Unlimited backup weapon.
    pub secondary: Option<Weapon>,
    /// Passenger slots.
    pub cargo_capacity: u8,
    /// Archetypes this unit can carry.
    pub boardable: &'static [UnitId],
    /// Submerges and is hidden unless an enemy is adjacent.
    pub dives: bool,
}

impl UnitKind {
    /// Can capture properties.
    #[must_use]
    pub const fn can_capture(&self) -> bool {
        self.movement_class.is_foot()
    }

    /// Fires only from a standstill at range, never counters.
    #[must_use]
    pub const fn is_indirect(&self) -> bool {
        self.min_range > 1
    }

    /// Has at least one weapon.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// Could any weapon of this archetype aim at `armor`?
    #[must_use]
    pub fn can_ever_target(&self, armor: ArmorClass) -> bool {
        self.weapons().any(|w| w.can_target(armor))
    }

    /// Iterate over the weapons present, primary first.
    pub fn weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.primary.iter().chain(self.secondary.iter())
    }

    /// Whether `passenger` may board this transport.
    #[must_use]
    pub fn can_carry(&self, passenger: UnitId) -> bool {
        self.cargo_capacity > 0 && self.boardable.contains(&passenger)
    }

    /// Whether `distance` lies within the attack range.
    #[must_use]
    pub const fn in_range(&self, distance: u16) -> bool {
        distance >= self.min_range as u16 && distance <= self.max_range as u16
    }
}

const fn targets(classes: &[ArmorClass]) -> [bool; ARMOR_CLASS_COUNT] {
    let mut out = [false; ARMOR_CLASS_COUNT];
    let mut i = 0;
    while i < classes.len() {
        out[classes[i] as usize] = true;
        i += 1;
    }
    out
}

const fn damage(entries: &[(UnitId, u8)]) -> [u8; UNIT_KIND_COUNT] {
    let mut out = [0; UNIT_KIND_COUNT];
    let mut i = 0;
    while i < entries.len() {
        out[entries[i].0 as usize] = entries[i].1;
        i += 1;
    }
    out
}

use ArmorClass as A;
use UnitId as U;

const GROUND: [bool; ARMOR_CLASS_COUNT] = targets(&[A::Infantry, A::Vehicle]);
const GROUND_AND_COPTER: [bool; ARMOR_CLASS_COUNT] = targets(&[A::Infantry, A::Vehicle, A::Copter]);
const SURFACE: [bool; ARMOR_CLASS_COUNT] = targets(&[A::Infantry, A::Vehicle, A::Ship, A::Sub]);
const AIR: [bool; ARMOR_CLASS_COUNT] = targets(&[A::Copter, A::Plane]);
const NAVAL: [bool; ARMOR_CLASS_COUNT] = targets(&[A::Ship, A::Sub]);

const FOOT_CARGO: &[UnitId] = &[U::Infantry, U::Mech];
const GROUND_CARGO: &[UnitId] = &[
    U::Infantry,
    U::Mech,
    U::Recon,
    U::Tank,
    U::MediumTank,
    U::Artillery,
    U::Rockets,
    U::AntiAir,
    U::Missiles,
    U::Apc,
];
const COPTER_CARGO: &[UnitId] = &[U::BattleCopter, U::TransportCopter];

#[allow(clippy::too_many_arguments)]
const fn unit(
    id: UnitId,
    name: &'static str,
    symbol: char,
    movement_class: MovementClass,
    armor_class: ArmorClass,
    move_points: u8,
    max_fuel: u8,
    max_ammo: u8,
    vision: u8,
) -> UnitKind {
    UnitKind {
        id,
        name,
        symbol,
        movement_class,
        armor_class,
        move_points,
        max_fuel,
        max_ammo,
        vision,
        min_range: 1,
        max_range: 1,
        primary: None,
        secondary: None,
        cargo_capacity: 0,
        boardable: &[],
        dives: false,
    }
}

static CATALOG: [UnitKind; UNIT_KIND_COUNT] = [
    UnitKind {
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 55), (U::Mech, 45), (U::Recon, 12), (U::Tank, 5),
                (U::MediumTank, 1), (U::Artillery, 15), (U::Rockets, 25), (U::AntiAir, 5),
                (U::Missiles, 25), (U::Apc, 14), (U::BattleCopter, 7), (U::TransportCopter, 30),
            ]),
        }),
        ..unit(U::Infantry, "Infantry", 'i', MovementClass::Infantry, A::Infantry, 3, 99, 0, 2)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Bazooka",
            targets: GROUND,
            damage: damage(&[
                (U::Recon, 85), (U::Tank, 55), (U::MediumTank, 15), (U::Artillery, 70),
                (U::Rockets, 85), (U::AntiAir, 65), (U::Missiles, 85), (U::Apc, 75),
            ]),
        }),
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 65), (U::Mech, 55), (U::Recon, 18), (U::Tank, 6),
                (U::MediumTank, 1), (U::Artillery, 32), (U::Rockets, 35), (U::AntiAir, 6),
                (U::Missiles, 35), (U::Apc, 20), (U::BattleCopter, 9), (U::TransportCopter, 35),
            ]),
        }),
        ..unit(U::Mech, "Mech", 'm', MovementClass::Mech, A::Infantry, 2, 70, 3, 2)
    },
    UnitKind {
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 70), (U::Mech, 65), (U::Recon, 35), (U::Tank, 6),
                (U::MediumTank, 1), (U::Artillery, 45), (U::Rockets, 55), (U::AntiAir, 4),
                (U::Missiles, 28), (U::Apc, 45), (U::BattleCopter, 10), (U::TransportCopter, 35),
            ]),
        }),
        ..unit(U::Recon, "Recon", 'r', MovementClass::TireA, A::Vehicle, 8, 80, 0, 5)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Cannon",
            targets: SURFACE,
            damage: damage(&[
                (U::Recon, 85), (U::Tank, 55), (U::MediumTank, 15), (U::Artillery, 70),
                (U::Rockets, 85), (U::AntiAir, 65), (U::Missiles, 85), (U::Apc, 75),
                (U::Lander, 10), (U::Cruiser, 5), (U::Submarine, 1), (U::Battleship, 1),
            ]),
        }),
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 75), (U::Mech, 70), (U::Recon, 40), (U::Tank, 6),
                (U::MediumTank, 1), (U::Artillery, 45), (U::Rockets, 55), (U::AntiAir, 5),
                (U::Missiles, 30), (U::Apc, 45), (U::BattleCopter, 10), (U::TransportCopter, 40),
            ]),
        }),
        ..unit(U::Tank, "Tank", 't', MovementClass::Tread, A::Vehicle, 6, 70, 9, 3)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Heavy Cannon",
            targets: SURFACE,
            damage: damage(&[
                (U::Recon, 105), (U::Tank, 85), (U::MediumTank, 55), (U::Artillery, 105),
                (U::Rockets, 105), (U::AntiAir, 105), (U::Missiles, 105), (U::Apc, 105),
                (U::Lander, 35), (U::Cruiser, 45), (U::Submarine, 10), (U::Battleship, 10),
            ]),
        }),
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 105), (U::Mech, 95), (U::Recon, 45), (U::Tank, 8),
                (U::MediumTank, 1), (U::Artillery, 45), (U::Rockets, 55), (U::AntiAir, 7),
                (U::Missiles, 35), (U::Apc, 45), (U::BattleCopter, 12), (U::TransportCopter, 45),
            ]),
        }),
        ..unit(U::MediumTank, "Medium Tank", 'T', MovementClass::Tread, A::Vehicle, 5, 50, 8, 1)
    },
    UnitKind {
        min_range: 2,
        max_range: 3,
        primary: Some(Weapon {
            name: "Shells",
            targets: SURFACE,
            damage: damage(&[
                (U::Infantry, 90), (U::Mech, 85), (U::Recon, 80), (U::Tank, 70),
                (U::MediumTank, 45), (U::Artillery, 75), (U::Rockets, 80), (U::AntiAir, 75),
                (U::Missiles, 80), (U::Apc, 70), (U::Lander, 55), (U::Cruiser, 65),
                (U::Submarine, 60), (U::Battleship, 40),
            ]),
        }),
        ..unit(U::Artillery, "Artillery", 'a', MovementClass::Tread, A::Vehicle, 5, 50, 9, 1)
    },
    UnitKind {
        min_range: 3,
        max_range: 5,
        primary: Some(Weapon {
            name: "Rockets",
            targets: SURFACE,
            damage: damage(&[
                (U::Infantry, 95), (U::Mech, 90), (U::Recon, 90), (U::Tank, 80),
                (U::MediumTank, 55), (U::Artillery, 80), (U::Rockets, 85), (U::AntiAir, 85),
                (U::Missiles, 90), (U::Apc, 80), (U::Lander, 60), (U::Cruiser, 85),
                (U::Submarine, 85), (U::Battleship, 55),
            ]),
        }),
        ..unit(U::Rockets, "Rockets", 'k', MovementClass::TireB, A::Vehicle, 5, 50, 6, 1)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Vulcan",
            targets: targets(&[A::Infantry, A::Vehicle, A::Copter, A::Plane]),
            damage: damage(&[
                (U::Infantry, 105), (U::Mech, 105), (U::Recon, 60), (U::Tank, 25),
                (U::MediumTank, 10), (U::Artillery, 50), (U::Rockets, 55), (U::AntiAir, 45),
                (U::Missiles, 55), (U::Apc, 50), (U::BattleCopter, 120), (U::TransportCopter, 120),
                (U::Fighter, 65), (U::Bomber, 75),
            ]),
        }),
        ..unit(U::AntiAir, "Anti-Air", 'v', MovementClass::Tread, A::Vehicle, 6, 60, 9, 2)
    },
    UnitKind {
        min_range: 3,
        max_range: 5,
        primary: Some(Weapon {
            name: "Missiles",
            targets: AIR,
            damage: damage(&[
                (U::BattleCopter, 120), (U::TransportCopter, 120), (U::Fighter, 100), (U::Bomber, 100),
            ]),
        }),
        ..unit(U::Missiles, "Missiles", 'x', MovementClass::TireB, A::Vehicle, 4, 50, 6, 5)
    },
    UnitKind {
        cargo_capacity: 1,
        boardable: FOOT_CARGO,
        ..unit(U::Apc, "APC", 'p', MovementClass::Tread, A::Vehicle, 6, 70, 0, 1)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Air-to-Surface Missiles",
            targets: targets(&[A::Vehicle, A::Ship, A::Sub]),
            damage: damage(&[
                (U::Recon, 55), (U::Tank, 55), (U::MediumTank, 25), (U::Artillery, 65),
                (U::Rockets, 65), (U::AntiAir, 25), (U::Missiles, 65), (U::Apc, 60),
                (U::Lander, 25), (U::Cruiser, 55), (U::Submarine, 25), (U::Battleship, 25),
            ]),
        }),
        secondary: Some(Weapon {
            name: "Machine Gun",
            targets: GROUND_AND_COPTER,
            damage: damage(&[
                (U::Infantry, 75), (U::Mech, 75), (U::Recon, 30), (U::Tank, 6),
                (U::MediumTank, 1), (U::Artillery, 25), (U::Rockets, 35), (U::AntiAir, 6),
                (U::Missiles, 35), (U::Apc, 20), (U::BattleCopter, 65), (U::TransportCopter, 95),
            ]),
        }),
        ..unit(U::BattleCopter, "Battle Copter", 'b', MovementClass::Air, A::Copter, 6, 99, 6, 3)
    },
    UnitKind {
        cargo_capacity: 1,
        boardable: FOOT_CARGO,
        ..unit(U::TransportCopter, "Transport Copter", 'c', MovementClass::Air, A::Copter, 6, 99, 0, 2)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Air-to-Air Missiles",
            targets: AIR,
            damage: damage(&[
                (U::BattleCopter, 100), (U::TransportCopter, 100), (U::Fighter, 55), (U::Bomber, 100),
            ]),
        }),
        ..unit(U::Fighter, "Fighter", 'f', MovementClass::Air, A::Plane, 9, 99, 9, 2)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Bombs",
            targets: SURFACE,
            damage: damage(&[
                (U::Infantry, 110), (U::Mech, 110), (U::Recon, 105), (U::Tank, 105),
                (U::MediumTank, 95), (U::Artillery, 105), (U::Rockets, 105), (U::AntiAir, 95),
                (U::Missiles, 105), (U::Apc, 105), (U::Lander, 95), (U::Cruiser, 50),
                (U::Submarine, 95), (U::Battleship, 75),
            ]),
        }),
        ..unit(U::Bomber, "Bomber", 'B', MovementClass::Air, A::Plane, 7, 99, 9, 2)
    },
    UnitKind {
        cargo_capacity: 2,
        boardable: GROUND_CARGO,
        ..unit(U::Lander, "Lander", 'l', MovementClass::Transport, A::Ship, 6, 99, 0, 1)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Torpedoes",
            targets: NAVAL,
            damage: damage(&[
                (U::Lander, 25), (U::Cruiser, 25), (U::Submarine, 90), (U::Battleship, 5),
            ]),
        }),
        secondary: Some(Weapon {
            name: "Anti-Air Gun",
            targets: AIR,
            damage: damage(&[
                (U::BattleCopter, 115), (U::TransportCopter, 115), (U::Fighter, 55), (U::Bomber, 65),
            ]),
        }),
        cargo_capacity: 2,
        boardable: COPTER_CARGO,
        ..unit(U::Cruiser, "Cruiser", 'u', MovementClass::Ship, A::Ship, 6, 99, 9, 3)
    },
    UnitKind {
        primary: Some(Weapon {
            name: "Torpedoes",
            targets: NAVAL,
            damage: damage(&[
                (U::Lander, 95), (U::Cruiser, 25), (U::Submarine, 55), (U::Battleship, 55),
            ]),
        }),
        dives: true,
        ..unit(U::Submarine, "Submarine", 's', MovementClass::Ship, A::Sub, 5, 60, 6, 5)
    },
    UnitKind {
        min_range: 2,
        max_range: 6,
        primary: Some(Weapon {
            name: "Main Battery",
            targets: SURFACE,
            damage: damage(&[
                (U::Infantry, 95), (U::Mech, 90), (U::Recon, 90), (U::Tank, 80),
                (U::MediumTank, 55), (U::Artillery, 80), (U::Rockets, 85), (U::AntiAir, 85),
                (U::Missiles, 90), (U::Apc, 80), (U::Lander, 95), (U::Cruiser, 95),
                (U::Submarine, 95), (U::Battleship, 50),
            ]),
        }),
        ..unit(U::Battleship, "Battleship", 'S', MovementClass::Ship, A::Ship, 5, 99, 9, 2)
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_ids() {
        for id in UnitId::ALL {
            assert_eq!(id.kind().id, id);
            assert_eq!(UnitId::from_serial(id.serial()), Some(id));
        }
        assert_eq!(UnitId::from_serial(-1), None);
        assert_eq!(UnitId::from_serial(18), None);
    }

    #[test]
    fn test_packed_limits_hold() {
        for id in UnitId::ALL {
            let kind = id.kind();
            assert!(kind.move_points <= 14, "{} moves too far", kind.name);
            assert!(kind.max_fuel <= 99, "{} fuel", kind.name);
            assert!(kind.max_ammo <= 15, "{} ammo", kind.name);
            assert!(kind.min_range <= kind.max_range);
        }
    }

    #[test]
    fn test_primary_weapons_need_ammo() {
        for id in UnitId::ALL {
            let kind = id.kind();
            assert_eq!(kind.primary.is_some(), kind.max_ammo > 0, "{}", kind.name);
        }
    }

    #[test]
    fn test_damage_entries_agree_with_targets() {
        for id in UnitId::ALL {
            for weapon in id.kind().weapons() {
                for defender in UnitId::ALL {
                    if weapon.base_damage(defender) > 0 {
                        assert!(
                            weapon.can_target(defender.kind().armor_class),
                            "{} cannot aim at {}",
                            weapon.name,
                            defender.kind().name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_transports() {
        assert!(UnitId::Apc.kind().can_carry(UnitId::Infantry));
        assert!(!UnitId::Apc.kind().can_carry(UnitId::Tank));
        assert!(UnitId::Lander.kind().can_carry(UnitId::Tank));
        assert!(!UnitId::Tank.kind().can_carry(UnitId::Infantry));
    }

    #[test]
    fn test_ranges() {
        assert!(UnitId::Artillery.kind().is_indirect());
        assert!(!UnitId::Artillery.kind().in_range(1));
        assert!(UnitId::Artillery.kind().in_range(3));
        assert!(!UnitId::Tank.kind().is_indirect());
    }
}
