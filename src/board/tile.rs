//! One grid cell: terrain, optional occupant and packed scratch state.

use crate::board::bitfield::{BitAllocator, BitMask};
use crate::board::class::{ArmorClass, Domain, Faction, MovementClass};
use crate::board::point::{Direction, Point};
use crate::board::terrain::{TerrainExtra, TerrainId};
use crate::board::unit::{AttackMethod, Roster, Unit, UnitHandle, attack_method_for};

/// Smallest value the 4-bit temp field can hold.
pub const TEMP_MIN: i8 = -1;
/// Largest value the 4-bit temp field can hold.
pub const TEMP_MAX: i8 = 14;

/// Bit layout of [`Tile`] scratch state.
#[derive(Debug, Clone, Copy)]
struct TileLayout {
    move_flag: BitMask,
    attack_flag: BitMask,
    target_flag: BitMask,
    danger_flag: BitMask,
    hidden_flag: BitMask,
    hide_unit: BitMask,
    arrow_from: BitMask,
    arrow_to: BitMask,
    x: BitMask,
    y: BitMask,
    temp_value: BitMask,
    temp_flag: BitMask,
}

const LAYOUT: TileLayout = {
    let mut bits = BitAllocator::new();
    TileLayout {
        move_flag: bits.generate(1),
        attack_flag: bits.generate(1),
        target_flag: bits.generate(1),
        danger_flag: bits.generate(1),
        hidden_flag: bits.generate(1),
        hide_unit: bits.generate(1),
        arrow_from: bits.generate(3),
        arrow_to: bits.generate(3),
        x: bits.generate(7),
        y: bits.generate(7),
        temp_value: bits.generate(4),
        temp_flag: bits.generate(1),
    }
};

/// Largest logical coordinate a tile can record (7 bits, shifted past the border).
pub const MAX_TILE_COORD: i16 = 125;

macro_rules! flag_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident => $field:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            #[inline]
            pub const fn $get(&self) -> bool {
                LAYOUT.$field.get_bool(self.scratch)
            }

            #[doc = concat!("Set [`Tile::", stringify!($get), "`].")]
            #[inline]
            pub const fn $set(&mut self, value: bool) {
                self.scratch = LAYOUT.$field.set_bool(self.scratch, value);
            }
        )*
    };
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    terrain: TerrainId,
    extra: Option<TerrainExtra>,
    owner: Option<Faction>,
    unit: Option<UnitHandle>,
    scratch: u32,
}

impl Tile {
    /// A tile of `terrain` at `point` with default extra data and no owner.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `point` lies outside the recordable range.
    #[must_use]
    pub fn new(terrain: TerrainId, point: Point) -> Self {
        debug_assert!(
            (-1..=MAX_TILE_COORD + 1).contains(&point.x) && (-1..=MAX_TILE_COORD + 1).contains(&point.y),
            "tile coordinate {point} exceeds packed range"
        );
        #[allow(clippy::cast_sign_loss)]
        let scratch = LAYOUT.y.write(
            LAYOUT.x.write(0, (point.x + 1) as u32),
            (point.y + 1) as u32,
        );
        let mut tile = Self {
            terrain,
            extra: terrain.default_extra(),
            owner: None,
            unit: None,
            scratch,
        };
        tile.set_temp_value(TEMP_MIN);
        tile
    }

    /// Terrain archetype.
    #[must_use]
    pub const fn terrain(&self) -> TerrainId {
        self.terrain
    }

    /// Replace the terrain, resetting extra data to the new kind's default.
    ///
    /// Ownership is dropped when the new kind cannot be owned.
    pub fn set_terrain(&mut self, terrain: TerrainId) {
        self.terrain = terrain;
        self.extra = terrain.default_extra();
        if !terrain.kind().ownable {
            self.owner = None;
        }
    }

    /// Per-tile terrain data.
    #[must_use]
    pub const fn extra(&self) -> Option<TerrainExtra> {
        self.extra
    }

    /// Attach extra data; returns `false` and leaves the tile untouched when
    /// the terrain has no use for it.
    pub fn set_extra(&mut self, extra: Option<TerrainExtra>) -> bool {
        match extra {
            Some(ref data) if !self.terrain.accepts(data) => false,
            _ => {
                self.extra = extra;
                true
            }
        }
    }

    /// Owning faction of a property.
    #[must_use]
    pub const fn owner(&self) -> Option<Faction> {
        self.owner
    }

    /// Change ownership; ignored for terrain that cannot be owned.
    pub fn set_owner(&mut self, owner: Option<Faction>) {
        if self.terrain.kind().can_be_owned_by(owner) {
            self.owner = owner;
        }
    }

    /// Handle of the occupying unit.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitHandle> {
        self.unit
    }

    pub(crate) const fn set_unit(&mut self, unit: Option<UnitHandle>) {
        self.unit = unit;
    }

    /// Raw packed scratch word.
    #[must_use]
    pub const fn scratch_bits(&self) -> u32 {
        self.scratch
    }

    /// Logical coordinate recorded in the scratch word.
    #[must_use]
    pub const fn point(&self) -> Point {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        Point::new(
            LAYOUT.x.read(self.scratch) as i16 - 1,
            LAYOUT.y.read(self.scratch) as i16 - 1,
        )
    }

    flag_accessors! {
        /// Reachable in the current reachability map.
        move_flag, set_move_flag => move_flag;
        /// Attackable from somewhere in the current reachability map.
        attack_flag, set_attack_flag => attack_flag;
        /// Valid aim point in attack-selection mode.
        target_flag, set_target_flag => target_flag;
        /// Threatened by a visible enemy.
        danger_flag, set_danger_flag => danger_flag;
        /// Covered by fog for the current viewer.
        hidden_flag, set_hidden_flag => hidden_flag;
        /// The occupant is concealed from the current viewer.
        hide_unit, set_hide_unit => hide_unit;
        /// Free per-search marker.
        temp_flag, set_temp_flag => temp_flag;
    }

    /// Direction back towards the previous tile on the route.
    #[must_use]
    pub const fn arrow_from(&self) -> Direction {
        Direction::from_code(LAYOUT.arrow_from.read(self.scratch))
    }

    /// Set [`Tile::arrow_from`].
    pub const fn set_arrow_from(&mut self, direction: Direction) {
        self.scratch = LAYOUT.arrow_from.write(self.scratch, direction.code());
    }

    /// Direction on towards the next tile on the route.
    #[must_use]
    pub const fn arrow_to(&self) -> Direction {
        Direction::from_code(LAYOUT.arrow_to.read(self.scratch))
    }

    /// Set [`Tile::arrow_to`].
    pub const fn set_arrow_to(&mut self, direction: Direction) {
        self.scratch = LAYOUT.arrow_to.write(self.scratch, direction.code());
    }

    /// Search scratch value in `-1..=14`.
    #[must_use]
    pub const fn temp_value(&self) -> i8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let stored = LAYOUT.temp_value.read(self.scratch) as i8;
        stored + TEMP_MIN
    }

    /// Store a search value, clamped to `-1..=14`.
    pub const fn set_temp_value(&mut self, value: i8) {
        let clamped = if value < TEMP_MIN {
            TEMP_MIN
        } else if value > TEMP_MAX {
            TEMP_MAX
        } else {
            value
        };
        #[allow(clippy::cast_sign_loss)]
        let stored = (clamped - TEMP_MIN) as u32;
        self.scratch = LAYOUT.temp_value.write(self.scratch, stored);
    }

    /// Reset the per-search fields: move/attack/temp flags and the temp value.
    pub const fn clear_search(&mut self) {
        self.set_move_flag(false);
        self.set_attack_flag(false);
        self.set_temp_flag(false);
        self.set_temp_value(TEMP_MIN);
    }

    /// Remove both route arrows.
    pub const fn clear_arrows(&mut self) {
        self.set_arrow_from(Direction::None);
        self.set_arrow_to(Direction::None);
    }

    /// Movement cost of this tile's terrain for `class`.
    #[must_use]
    pub fn movement_cost(&self, class: MovementClass) -> u8 {
        self.terrain.movement_cost(class)
    }

    /// Whether the current viewer can see the occupant.
    #[must_use]
    pub const fn occupant_visible(&self) -> bool {
        !self.hidden_flag() && !self.hide_unit()
    }

    /// Can `mover` pass through this tile?
    ///
    /// The terrain must admit its movement class and any occupant must be a
    /// friend or invisible to the current viewer.
    #[must_use]
    pub fn traversable(&self, mover: &Unit, roster: &Roster) -> bool {
        if self.movement_cost(mover.kind().movement_class) == 0 {
            return false;
        }
        match self.unit.and_then(|h| roster.get(h)) {
            None => true,
            Some(occupant) => occupant.faction() == mover.faction() || !self.occupant_visible(),
        }
    }

    /// Can the unit behind `mover` end its move here?
    #[must_use]
    pub fn occupiable(&self, mover: UnitHandle, roster: &Roster) -> bool {
        let Some(unit) = roster.get(mover) else {
            return false;
        };
        self.traversable(unit, roster)
            && match self.unit {
                None => true,
                Some(h) => h == mover || !self.occupant_visible(),
            }
    }

    /// Could `attacker` ever aim here?
    ///
    /// A visible enemy delegates to the weapon rules. Otherwise the question is
    /// hypothetical: does the terrain admit any domain the attacker can hit.
    #[must_use]
    pub fn targetable(&self, attacker: &Unit, roster: &Roster) -> bool {
        if let Some(occupant) = self.visible_enemy(attacker, roster) {
            return attack_method_for(attacker, occupant) != AttackMethod::None;
        }
        let kind = attacker.kind();
        ArmorClass::ALL
            .into_iter()
            .filter(|&armor| kind.can_ever_target(armor))
            .any(|armor| self.admits(armor.domain()))
    }

    /// Is there a visible enemy here that `attacker` can hit right now?
    #[must_use]
    pub fn attackable(&self, attacker: &Unit, roster: &Roster) -> bool {
        self.visible_enemy(attacker, roster)
            .is_some_and(|occupant| attack_method_for(attacker, occupant) != AttackMethod::None)
    }

    fn visible_enemy<'r>(&self, attacker: &Unit, roster: &'r Roster) -> Option<&'r Unit> {
        if !self.occupant_visible() {
            return None;
        }
        self.unit
            .and_then(|h| roster.get(h))
            .filter(|occupant| occupant.faction() != attacker.faction())
    }

    fn admits(&self, domain: Domain) -> bool {
        MovementClass::ALL
            .into_iter()
            .filter(|class| class.domain() == domain)
            .any(|class| self.movement_cost(class) > 0)
    }
}
