//! Deployed units, the roster arena that owns them, and weapon selection.
//!
//! Volatile stats live in two packed words laid out by one
//! [`BitAllocator`](crate::board::bitfield::BitAllocator): the allocator is
//! reset between the stats word and the placement word. Every setter clamps
//! to the archetype's maxima, so damage and healing never need bounds checks
//! at the call site.

use crate::board::bitfield::{BitAllocator, BitMask};
use crate::board::class::Faction;
use crate::board::point::Point;
use crate::board::unit_kind::{UnitId, UnitKind, Weapon};

/// Full health.
pub const MAX_HP: u8 = 100;
/// Capture points needed to flip a property.
pub const CAPTURE_GOAL: u8 = 20;
/// Highest veterancy rank.
pub const MAX_RANK: u8 = 3;
/// Placement coordinate meaning "not on the board".
pub const UNPLACED: u32 = 255;

#[derive(Debug, Clone, Copy)]
struct UnitLayout {
    hp: BitMask,
    ammo: BitMask,
    capture: BitMask,
    fuel: BitMask,
    rank: BitMask,
    orderable: BitMask,
    co_aboard: BitMask,
    x: BitMask,
    y: BitMask,
    reversed: BitMask,
}

const LAYOUT: UnitLayout = {
    let mut bits = BitAllocator::new();
    let hp = bits.generate(7);
    let ammo = bits.generate(4);
    let capture = bits.generate(5);
    let fuel = bits.generate(7);
    let rank = bits.generate(2);
    let orderable = bits.generate(1);
    let co_aboard = bits.generate(1);
    bits.reset();
    let x = bits.generate(8);
    let y = bits.generate(8);
    let reversed = bits.generate(1);
    UnitLayout {
        hp,
        ammo,
        capture,
        fuel,
        rank,
        orderable,
        co_aboard,
        x,
        y,
        reversed,
    }
};

/// Which weapon a unit would use against a given defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum AttackMethod {
    /// Cannot attack.
    None,
    /// Ammo-limited main weapon.
    Primary,
    /// Unlimited backup weapon.
    Secondary,
}

impl AttackMethod {
    /// The archetype weapon this method refers to.
    #[must_use]
    pub fn weapon(self, kind: &UnitKind) -> Option<&Weapon> {
        match self {
            Self::None => None,
            Self::Primary => kind.primary.as_ref(),
            Self::Secondary => kind.secondary.as_ref(),
        }
    }
}

/// Pick the weapon `attacker` would fire at `defender`.
///
/// Primary needs ammo, a matching target class and a nonzero damage entry.
/// Otherwise the secondary is tried under the same conditions minus ammo.
#[must_use]
pub fn attack_method_for(attacker: &Unit, defender: &Unit) -> AttackMethod {
    let kind = attacker.kind();
    let armor = defender.kind().armor_class;
    let usable = |weapon: &Weapon| weapon.can_target(armor) && weapon.base_damage(defender.id()) > 0;
    if attacker.ammo() > 0 && kind.primary.as_ref().is_some_and(usable) {
        AttackMethod::Primary
    } else if kind.secondary.as_ref().is_some_and(usable) {
        AttackMethod::Secondary
    } else {
        AttackMethod::None
    }
}

/// A deployed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    faction: Faction,
    stats: u32,
    placement: u32,
    cargo: Vec<Unit>,
}

impl Unit {
    /// A fresh unit at full health, fuel and ammo, not yet placed.
    #[must_use]
    pub fn new(id: UnitId, faction: Faction) -> Self {
        let kind = id.kind();
        let mut unit = Self {
            id,
            faction,
            stats: 0,
            placement: 0,
            cargo: Vec::new(),
        };
        unit.set_hp(i32::from(MAX_HP));
        unit.set_fuel(i32::from(kind.max_fuel));
        unit.set_ammo(i32::from(kind.max_ammo));
        unit.set_orderable(true);
        unit.set_position(None);
        unit
    }

    /// Rebuild from packed words, re-clamping every field.
    #[must_use]
    pub fn from_bits(id: UnitId, faction: Faction, stats: u32, placement: u32) -> Self {
        let mut unit = Self {
            id,
            faction,
            stats,
            placement,
            cargo: Vec::new(),
        };
        unit.set_hp(i32::from(unit.hp()));
        unit.set_fuel(i32::from(unit.fuel()));
        unit.set_ammo(i32::from(unit.ammo()));
        unit.set_capture(i32::from(unit.capture()));
        unit
    }

    /// `(stats, placement)` packed words.
    #[must_use]
    pub const fn to_bits(&self) -> (u32, u32) {
        (self.stats, self.placement)
    }

    /// Archetype id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Archetype record.
    #[must_use]
    pub fn kind(&self) -> &'static UnitKind {
        self.id.kind()
    }

    /// Owning faction.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Hit points, `0..=100`.
    #[must_use]
    pub const fn hp(&self) -> u8 {
        Self::narrow(LAYOUT.hp.read(self.stats))
    }

    /// Set HP, clamped to `0..=100`.
    pub fn set_hp(&mut self, hp: i32) {
        self.stats = LAYOUT.hp.write(self.stats, clamp_to(hp, MAX_HP));
    }

    /// Displayed health `ceil(hp / 10)`, `0..=10`.
    #[must_use]
    pub const fn display_hp(&self) -> u8 {
        self.hp().div_ceil(10)
    }

    /// Remaining ammo for the primary weapon.
    #[must_use]
    pub const fn ammo(&self) -> u8 {
        Self::narrow(LAYOUT.ammo.read(self.stats))
    }

    /// Set ammo, clamped to the archetype maximum.
    pub fn set_ammo(&mut self, ammo: i32) {
        let max = self.kind().max_ammo;
        self.stats = LAYOUT.ammo.write(self.stats, clamp_to(ammo, max));
    }

    /// Capture progress, `0..=20`.
    #[must_use]
    pub const fn capture(&self) -> u8 {
        Self::narrow(LAYOUT.capture.read(self.stats))
    }

    /// Set capture progress, clamped to `0..=20`.
    pub fn set_capture(&mut self, capture: i32) {
        self.stats = LAYOUT.capture.write(self.stats, clamp_to(capture, CAPTURE_GOAL));
    }

    /// Remaining fuel.
    #[must_use]
    pub const fn fuel(&self) -> u8 {
        Self::narrow(LAYOUT.fuel.read(self.stats))
    }

    /// Set fuel, clamped to the archetype maximum.
    pub fn set_fuel(&mut self, fuel: i32) {
        let max = self.kind().max_fuel;
        self.stats = LAYOUT.fuel.write(self.stats, clamp_to(fuel, max));
    }

    /// Veterancy rank, `0..=3`.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        Self::narrow(LAYOUT.rank.read(self.stats))
    }

    /// Set rank, clamped to `0..=3`.
    pub fn set_rank(&mut self, rank: i32) {
        self.stats = LAYOUT.rank.write(self.stats, clamp_to(rank, MAX_RANK));
    }

    /// May still receive orders this turn.
    #[must_use]
    pub const fn orderable(&self) -> bool {
        LAYOUT.orderable.get_bool(self.stats)
    }

    /// Set [`Unit::orderable`].
    pub const fn set_orderable(&mut self, value: bool) {
        self.stats = LAYOUT.orderable.set_bool(self.stats, value);
    }

    /// Carries its faction's commander.
    #[must_use]
    pub const fn co_aboard(&self) -> bool {
        LAYOUT.co_aboard.get_bool(self.stats)
    }

    /// Set [`Unit::co_aboard`].
    pub const fn set_co_aboard(&mut self, value: bool) {
        self.stats = LAYOUT.co_aboard.set_bool(self.stats, value);
    }

    /// Sprite faces the other way.
    #[must_use]
    pub const fn reversed(&self) -> bool {
        LAYOUT.reversed.get_bool(self.placement)
    }

    /// Set [`Unit::reversed`].
    pub const fn set_reversed(&mut self, value: bool) {
        self.placement = LAYOUT.reversed.set_bool(self.placement, value);
    }

    /// Board coordinates, or `None` while off the board.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        let x = LAYOUT.x.read(self.placement);
        let y = LAYOUT.y.read(self.placement);
        if x == UNPLACED || y == UNPLACED {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        Some(Point::new(x as i16, y as i16))
    }

    /// Record board coordinates.
    ///
    /// Only the grid calls this, keeping tile and unit in agreement.
    pub(crate) fn set_position(&mut self, point: Option<Point>) {
        let (x, y) = point.map_or((UNPLACED, UNPLACED), |p| {
            let coord = |v: i16| u32::try_from(v).map_or(UNPLACED, |v| v.min(UNPLACED - 1));
            (coord(p.x), coord(p.y))
        });
        self.placement = LAYOUT.y.write(LAYOUT.x.write(self.placement, x), y);
    }

    /// Movement budget for this turn: `min(fuel, move points)`.
    #[must_use]
    pub fn movement_budget(&self) -> u8 {
        self.fuel().min(self.kind().move_points)
    }

    /// Loaded passengers.
    #[must_use]
    pub fn cargo(&self) -> &[Self] {
        &self.cargo
    }

    /// Whether `passenger` may board right now.
    #[must_use]
    pub fn can_load(&self, passenger: &Self) -> bool {
        let kind = self.kind();
        passenger.faction == self.faction
            && kind.can_carry(passenger.id)
            && self.cargo.len() < usize::from(kind.cargo_capacity)
    }

    /// Take a passenger aboard. Hands it back if it cannot board.
    ///
    /// # Errors
    ///
    /// Returns the passenger when [`Unit::can_load`] is false.
    pub fn load(&mut self, mut passenger: Self) -> Result<(), Self> {
        if !self.can_load(&passenger) {
            return Err(passenger);
        }
        passenger.set_position(None);
        self.cargo.push(passenger);
        Ok(())
    }

    /// Remove and return the passenger at `index`.
    pub fn take_cargo(&mut self, index: usize) -> Option<Self> {
        (index < self.cargo.len()).then(|| self.cargo.remove(index))
    }

    /// Refill fuel and ammo to the archetype maxima.
    pub fn resupply(&mut self) {
        let kind = self.kind();
        self.set_fuel(i32::from(kind.max_fuel));
        self.set_ammo(i32::from(kind.max_ammo));
    }

    /// Whether this unit is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp() > 0
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn narrow(value: u32) -> u8 {
        value as u8
    }
}

fn clamp_to(value: i32, max: u8) -> u32 {
    value.clamp(0, i32::from(max)).unsigned_abs()
}

/// Index into a [`Roster`]. Stale handles are detected by generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitHandle {
    index: u32,
    generation: u32,
}

impl UnitHandle {
    /// Arena slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Slot {
    generation: u32,
    unit: Option<Unit>,
}

/// Arena owning every unit standing on the board.
///
/// Tiles hold [`UnitHandle`]s into this arena; carried units live inside
/// their transport's cargo instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Roster {
    /// Store a unit and return its handle.
    pub fn insert(&mut self, unit: Unit) -> UnitHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.unit = Some(unit);
            return UnitHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            unit: Some(unit),
        });
        UnitHandle { index, generation: 0 }
    }

    /// Remove a unit, invalidating its handle.
    pub fn remove(&mut self, handle: UnitHandle) -> Option<Unit> {
        let slot = self.slot_mut(handle)?;
        let unit = slot.unit.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(unit)
    }

    /// Look up a live unit.
    #[must_use]
    pub fn get(&self, handle: UnitHandle) -> Option<&Unit> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.unit.as_ref())
    }

    /// Look up a live unit mutably.
    pub fn get_mut(&mut self, handle: UnitHandle) -> Option<&mut Unit> {
        self.slot_mut(handle).and_then(|slot| slot.unit.as_mut())
    }

    /// Whether `handle` still refers to a live unit.
    #[must_use]
    pub fn contains(&self, handle: UnitHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Live units with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitHandle, &Unit)> {
        self.slots.iter().zip(0u32..).filter_map(|(slot, index)| {
            slot.unit.as_ref().map(|unit| {
                (
                    UnitHandle {
                        index,
                        generation: slot.generation,
                    },
                    unit,
                )
            })
        })
    }

    /// Number of live units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// No live units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_mut(&mut self, handle: UnitHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits() {
        assert_eq!(LAYOUT.co_aboard.shift() + LAYOUT.co_aboard.width(), 27);
        assert_eq!(LAYOUT.reversed.shift() + LAYOUT.reversed.width(), 17);
    }

    #[test]
    fn test_new_unit_is_full() {
        let tank = Unit::new(UnitId::Tank, 1);
        assert_eq!(tank.hp(), 100);
        assert_eq!(tank.fuel(), 70);
        assert_eq!(tank.ammo(), 9);
        assert!(tank.orderable());
        assert_eq!(tank.position(), None);
        assert_eq!(tank.display_hp(), 10);
    }

    #[test]
    fn test_setters_clamp() {
        let mut unit = Unit::new(UnitId::Mech, 1);
        unit.set_hp(250);
        assert_eq!(unit.hp(), 100);
        unit.set_hp(-40);
        assert_eq!(unit.hp(), 0);
        unit.set_ammo(12);
        assert_eq!(unit.ammo(), 3);
        unit.set_capture(99);
        assert_eq!(unit.capture(), 20);
        unit.set_rank(7);
        assert_eq!(unit.rank(), 3);
        unit.set_fuel(1000);
        assert_eq!(unit.fuel(), 70);
    }

    #[test]
    fn test_display_hp_rounds_up() {
        let mut unit = Unit::new(UnitId::Infantry, 1);
        unit.set_hp(41);
        assert_eq!(unit.display_hp(), 5);
        unit.set_hp(40);
        assert_eq!(unit.display_hp(), 4);
    }

    #[test]
    fn test_position_round_trip() {
        let mut unit = Unit::new(UnitId::Recon, 2);
        unit.set_position(Some(Point::new(17, 3)));
        assert_eq!(unit.position(), Some(Point::new(17, 3)));
        unit.set_reversed(true);
        assert_eq!(unit.position(), Some(Point::new(17, 3)));
        unit.set_position(None);
        assert_eq!(unit.position(), None);
        assert!(unit.reversed());
    }

    #[test]
    fn test_bits_round_trip() {
        let mut unit = Unit::new(UnitId::Artillery, 2);
        unit.set_hp(55);
        unit.set_rank(2);
        unit.set_co_aboard(true);
        let (stats, placement) = unit.to_bits();
        let back = Unit::from_bits(UnitId::Artillery, 2, stats, placement);
        assert_eq!(back, unit);
    }

    #[test]
    fn test_from_bits_reclamps() {
        // 127 HP fits in seven bits but is above the maximum.
        let unit = Unit::from_bits(UnitId::Infantry, 1, 127, 0);
        assert_eq!(unit.hp(), 100);
    }

    #[test]
    fn test_secondary_when_out_of_ammo() {
        let mut mech = Unit::new(UnitId::Mech, 1);
        let tank = Unit::new(UnitId::Tank, 2);
        assert_eq!(attack_method_for(&mech, &tank), AttackMethod::Primary);
        mech.set_ammo(0);
        assert_eq!(attack_method_for(&mech, &tank), AttackMethod::Secondary);
    }

    #[test]
    fn test_unarmed_cannot_attack() {
        let apc = Unit::new(UnitId::Apc, 1);
        let infantry = Unit::new(UnitId::Infantry, 2);
        assert_eq!(attack_method_for(&apc, &infantry), AttackMethod::None);
        let fighter = Unit::new(UnitId::Fighter, 2);
        assert_eq!(attack_method_for(&infantry, &fighter), AttackMethod::None);
    }

    #[test]
    fn test_cargo_rules() {
        let mut apc = Unit::new(UnitId::Apc, 1);
        assert!(apc.load(Unit::new(UnitId::Tank, 1)).is_err());
        assert!(apc.load(Unit::new(UnitId::Infantry, 2)).is_err());
        assert!(apc.load(Unit::new(UnitId::Infantry, 1)).is_ok());
        assert!(apc.load(Unit::new(UnitId::Mech, 1)).is_err());
        assert_eq!(apc.cargo().len(), 1);
        let passenger = apc.take_cargo(0).unwrap();
        assert_eq!(passenger.id(), UnitId::Infantry);
        assert!(apc.take_cargo(0).is_none());
    }

    #[test]
    fn test_roster_detects_stale_handles() {
        let mut roster = Roster::default();
        let a = roster.insert(Unit::new(UnitId::Infantry, 1));
        assert!(roster.contains(a));
        assert!(roster.remove(a).is_some());
        let b = roster.insert(Unit::new(UnitId::Tank, 1));
        assert_eq!(a.index(), b.index());
        assert!(roster.get(a).is_none());
        assert_eq!(roster.get(b).map(Unit::id), Some(UnitId::Tank));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_budget_is_limited_by_fuel() {
        let mut recon = Unit::new(UnitId::Recon, 1);
        assert_eq!(recon.movement_budget(), 8);
        recon.set_fuel(3);
        assert_eq!(recon.movement_budget(), 3);
    }
}
