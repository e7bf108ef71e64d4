//! Terrain archetypes.
//!
//! Every tile refers to one [`TerrainId`]; the id indexes a static table of
//! [`TerrainKind`] records. Kinds never change after program start, so the
//! table is plain `static` data shared by every tile.
//!
//! A movement cost of `0` means the class may not enter the terrain at all.

use serde::{Deserialize, Serialize};

use crate::board::class::{Faction, MOVEMENT_CLASS_COUNT, MovementClass};
use crate::board::point::{Direction, Neighborhood};

/// Identity of a terrain archetype.
///
/// Serialised as its serial: declaration order starting at `0`, with
/// [`TerrainId::Void`] fixed at `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
#[repr(u8)]
pub enum TerrainId {
    /// Off-map border.
    Void = 0,
    /// Open field.
    Plain,
    /// Paved road.
    Road,
    /// Forest.
    Wood,
    /// Mountain.
    Mountain,
    /// River.
    River,
    /// Bridge over river or sea.
    Bridge,
    /// Open sea.
    Sea,
    /// Beach.
    Shoal,
    /// Reef.
    Reef,
    /// City.
    City,
    /// Ground unit factory.
    Factory,
    /// Airport.
    Airport,
    /// Naval port.
    Port,
    /// Headquarters.
    Headquarters,
    /// Communications tower.
    CommTower,
    /// Missile silo.
    Silo,
    /// Meteor core.
    Meteor,
    /// Plasma field around a meteor.
    Plasma,
    /// Scorched ground left behind by destroyed structures.
    Wasteland,
}

/// Number of catalog entries, Void included.
pub const TERRAIN_COUNT: usize = 20;

/// Hit points of a freshly placed meteor.
pub const METEOR_HP: u8 = 99;

impl TerrainId {
    /// Every archetype in declaration order.
    pub const ALL: [Self; TERRAIN_COUNT] = [
        Self::Void,
        Self::Plain,
        Self::Road,
        Self::Wood,
        Self::Mountain,
        Self::River,
        Self::Bridge,
        Self::Sea,
        Self::Shoal,
        Self::Reef,
        Self::City,
        Self::Factory,
        Self::Airport,
        Self::Port,
        Self::Headquarters,
        Self::CommTower,
        Self::Silo,
        Self::Meteor,
        Self::Plasma,
        Self::Wasteland,
    ];

    /// The catalog record for this id.
    #[must_use]
    #[inline]
    pub fn kind(self) -> &'static TerrainKind {
        &CATALOG[self as usize]
    }

    /// Stable serial; `-1` for Void.
    #[must_use]
    pub const fn serial(self) -> i16 {
        self as i16 - 1
    }

    /// Reconstruct from a serial.
    #[must_use]
    pub fn from_serial(serial: i16) -> Option<Self> {
        let index = usize::try_from(serial.checked_add(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Look up a terrain by its map glyph.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.kind().symbol == symbol)
    }

    /// Movement cost for `class`; `0` means forbidden.
    #[must_use]
    #[inline]
    pub fn movement_cost(self, class: MovementClass) -> u8 {
        self.kind().move_costs[class.index()]
    }

    /// Land units can stand here.
    #[must_use]
    pub fn is_ground(self) -> bool {
        self.movement_cost(MovementClass::Infantry) > 0
    }

    /// Open water: sea and reef.
    #[must_use]
    pub const fn is_open_water(self) -> bool {
        matches!(self, Self::Sea | Self::Reef)
    }

    /// Whether this terrain may be placed given its surroundings.
    ///
    /// Used by map generation and editing; the centre of `around` is ignored.
    #[must_use]
    pub fn legal_at(self, around: &Neighborhood<Self>) -> bool {
        let orthogonal = around.orthogonal();
        match self {
            Self::Shoal => {
                orthogonal.iter().any(|t| t.is_open_water())
                    && orthogonal.iter().any(|&t| t.is_ground() && t != Self::Shoal)
            }
            Self::Port => orthogonal.iter().any(|t| t.is_open_water()),
            Self::Bridge => {
                let spans = |a: Direction, b: Direction| {
                    around.toward(a).is_ground() && around.toward(b).is_ground()
                };
                spans(Direction::Left, Direction::Right) || spans(Direction::Up, Direction::Down)
            }
            Self::Plasma => orthogonal
                .iter()
                .any(|t| matches!(t, Self::Plasma | Self::Meteor)),
            _ => true,
        }
    }

    /// Extra data a freshly placed tile of this kind carries.
    #[must_use]
    pub const fn default_extra(self) -> Option<TerrainExtra> {
        match self {
            Self::Bridge => Some(TerrainExtra::Bridge {
                over: BridgeBase::Water,
            }),
            Self::Silo => Some(TerrainExtra::Charge { remaining: 1 }),
            Self::Meteor => Some(TerrainExtra::Charge {
                remaining: METEOR_HP,
            }),
            _ => None,
        }
    }

    /// Whether `extra` is meaningful on this terrain.
    #[must_use]
    pub const fn accepts(self, extra: &TerrainExtra) -> bool {
        matches!(
            (self, extra),
            (Self::Bridge, TerrainExtra::Bridge { .. })
                | (Self::Silo | Self::Meteor, TerrainExtra::Charge { .. })
                | (Self::Wasteland, TerrainExtra::Wasteland { .. })
        )
    }
}

impl From<TerrainId> for i16 {
    fn from(id: TerrainId) -> Self {
        id.serial()
    }
}

impl TryFrom<i16> for TerrainId {
    type Error = String;

    fn try_from(serial: i16) -> Result<Self, Self::Error> {
        Self::from_serial(serial).ok_or_else(|| format!("unknown terrain serial {serial}"))
    }
}

/// What a bridge spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeBase {
    /// Built over a river or dry gap.
    Land,
    /// Built over sea.
    Water,
}

/// Per-tile terrain data beyond the archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerrainExtra {
    /// Bridge memory of what lies beneath.
    Bridge {
        /// Underlying surface.
        over: BridgeBase,
    },
    /// Silo missiles or meteor hit points left.
    Charge {
        /// Remaining charge.
        remaining: u8,
    },
    /// Wasteland memory of what stood here.
    Wasteland {
        /// Previous archetype.
        previous: TerrainId,
    },
}

/// An immutable terrain archetype.
#[derive(Debug, Clone, Copy)]
pub struct TerrainKind {
    /// Catalog identity.
    pub id: TerrainId,
    /// Display name.
    pub name: &'static str,
    /// Single-glyph map symbol.
    pub symbol: char,
    /// Movement cost per [`MovementClass`]; `0` = impassable.
    pub move_costs: [u8; MOVEMENT_CLASS_COUNT],
    /// Defense stars.
    pub defense: u8,
    /// Extra vision range granted to foot units standing here.
    pub vision_bonus: u8,
    /// Hides units from viewers that are not adjacent.
    pub conceals: bool,
    /// Property that can be owned.
    pub ownable: bool,
    /// Counts as a building for supply and repair.
    pub building: bool,
    /// Structure hit points for terrain attacks; `0` = not a target.
    pub structure_hp: u8,
}

impl TerrainKind {
    /// Can a faction own this terrain?
    #[must_use]
    pub const fn can_be_owned_by(&self, faction: Option<Faction>) -> bool {
        self.ownable || faction.is_none()
    }

    /// A valid aim point for siege attacks.
    #[must_use]
    pub const fn is_structure(&self) -> bool {
        self.structure_hp > 0
    }
}

//                      Inf Mch TrA TrB Trd Air Shp Trn
const NONE: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 0];
const OPEN: [u8; 8] = [1, 1, 2, 2, 1, 1, 0, 0];
const PAVED: [u8; 8] = [1, 1, 1, 1, 1, 1, 0, 0];
const FOREST: [u8; 8] = [1, 1, 3, 3, 2, 1, 0, 0];
const PEAK: [u8; 8] = [2, 1, 0, 0, 0, 1, 0, 0];
const STREAM: [u8; 8] = [2, 1, 0, 0, 0, 1, 0, 0];
const WATER: [u8; 8] = [0, 0, 0, 0, 0, 1, 1, 1];
const BEACH: [u8; 8] = [1, 1, 1, 1, 1, 1, 0, 1];
const ROCKS: [u8; 8] = [0, 0, 0, 0, 0, 1, 2, 2];
const HARBOR: [u8; 8] = [1, 1, 1, 1, 1, 1, 1, 1];

const fn terrain(
    id: TerrainId,
    name: &'static str,
    symbol: char,
    move_costs: [u8; 8],
    defense: u8,
) -> TerrainKind {
    TerrainKind {
        id,
        name,
        symbol,
        move_costs,
        defense,
        vision_bonus: 0,
        conceals: false,
        ownable: false,
        building: false,
        structure_hp: 0,
    }
}

const fn property(id: TerrainId, name: &'static str, symbol: char, move_costs: [u8; 8], defense: u8) -> TerrainKind {
    TerrainKind {
        ownable: true,
        building: true,
        ..terrain(id, name, symbol, move_costs, defense)
    }
}

static CATALOG: [TerrainKind; TERRAIN_COUNT] = [
    terrain(TerrainId::Void, "Void", ' ', NONE, 0),
    terrain(TerrainId::Plain, "Plain", '.', OPEN, 1),
    terrain(TerrainId::Road, "Road", '=', PAVED, 0),
    TerrainKind {
        conceals: true,
        ..terrain(TerrainId::Wood, "Wood", 'w', FOREST, 2)
    },
    TerrainKind {
        vision_bonus: 3,
        ..terrain(TerrainId::Mountain, "Mountain", '^', PEAK, 4)
    },
    terrain(TerrainId::River, "River", '~', STREAM, 0),
    terrain(TerrainId::Bridge, "Bridge", '#', PAVED, 0),
    terrain(TerrainId::Sea, "Sea", '-', WATER, 0),
    terrain(TerrainId::Shoal, "Shoal", ',', BEACH, 0),
    TerrainKind {
        conceals: true,
        ..terrain(TerrainId::Reef, "Reef", '%', ROCKS, 1)
    },
    property(TerrainId::City, "City", 'C', PAVED, 3),
    property(TerrainId::Factory, "Factory", 'F', PAVED, 3),
    property(TerrainId::Airport, "Airport", 'A', PAVED, 3),
    property(TerrainId::Port, "Port", 'P', HARBOR, 3),
    property(TerrainId::Headquarters, "Headquarters", 'H', PAVED, 4),
    property(TerrainId::CommTower, "Comm Tower", 'T', PAVED, 3),
    TerrainKind {
        building: true,
        ..terrain(TerrainId::Silo, "Missile Silo", 'S', PAVED, 3)
    },
    TerrainKind {
        structure_hp: METEOR_HP,
        ..terrain(TerrainId::Meteor, "Meteor", 'M', NONE, 0)
    },
    terrain(TerrainId::Plasma, "Plasma", '&', NONE, 0),
    terrain(TerrainId::Wasteland, "Wasteland", ':', OPEN, 1),
];
