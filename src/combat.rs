//! Combat resolution.
//!
//! Attack power is `100 + rank + CO zone + luck + towers`. Defense power is
//! `100 + veteran + CO zone + terrain stars * displayed HP + towers`; there
//! is no defensive luck. Damage is
//! `ceil(base * ceil(hp / 10) / 10 * attack / defense)`, always rounded up.
//!
//! Every resolve produces both the neutral-luck forecast and the seeded
//! outcome so the forecast shown to a player uses the same formulas.

pub mod commander;
pub mod luck;

use serde::Serialize;
use tracing::{debug, error};

use crate::board::grid::Grid;
use crate::board::point::Point;
use crate::board::terrain::TerrainId;
use crate::board::unit::{AttackMethod, MAX_RANK, Unit, UnitHandle, attack_method_for};
use crate::config::Rules;
use crate::error::{BoardError, Result};

pub use commander::{Commander, zone_bonus};
pub use luck::{ATTACK_STREAM, COUNTER_STREAM, luck_bonus, luck_draw, simple_hash};

/// One proposed attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    /// The attacking unit.
    pub attacker: UnitHandle,
    /// Tile the attacker fires from (its origin after moving).
    pub from: Point,
    /// Tile of the defender or terrain structure.
    pub target: Point,
}

/// Damage both ways for one attack, forecast and actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatOutcome {
    /// Weapon the attacker uses.
    pub method: AttackMethod,
    /// Weapon the defender answers with; `None` when it cannot counter.
    pub counter_method: AttackMethod,
    /// Seeded damage dealt to the defender.
    pub damage: u16,
    /// Seeded counter damage dealt to the attacker.
    pub counter: u16,
    /// Neutral-luck forecast of `damage`.
    pub estimate_damage: u16,
    /// Neutral-luck forecast of `counter`.
    pub estimate_counter: u16,
}

/// Damage of an attack on a terrain structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrikeOutcome {
    /// Seeded damage.
    pub damage: u16,
    /// Neutral-luck forecast.
    pub estimate_damage: u16,
}

/// What [`execute_attack`] changed on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    /// The defender was destroyed and removed.
    pub defender_destroyed: bool,
    /// The attacker died to the counter and was removed.
    pub attacker_destroyed: bool,
    /// Counter damage actually applied.
    pub counter_applied: u16,
}

/// Side of an engagement as the formulas see it.
struct Combatant<'a> {
    unit: &'a Unit,
    at: Point,
}

/// Computes attack outcomes from board state, rules and commanders.
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    rules: Rules,
    commanders: Vec<Commander>,
}

impl CombatResolver {
    /// Resolver using `rules` and no commanders.
    #[must_use]
    pub const fn new(rules: Rules) -> Self {
        Self {
            rules,
            commanders: Vec::new(),
        }
    }

    /// Add commanding officers whose zones grant bonuses.
    #[must_use]
    pub fn with_commanders(mut self, commanders: impl IntoIterator<Item = Commander>) -> Self {
        self.commanders.extend(commanders);
        self
    }

    /// Rule constants in use.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Registered commanders.
    #[must_use]
    pub fn commanders(&self) -> &[Commander] {
        &self.commanders
    }

    fn attack_power(&self, grid: &Grid, side: &Combatant<'_>, draw: u32) -> u32 {
        let unit = side.unit;
        let (zone, _) = zone_bonus(&self.commanders, grid, unit, side.at);
        100 + u32::from(self.rules.rank_bonus(unit.rank()))
            + u32::from(zone)
            + u32::from(luck_bonus(draw, unit.hp()))
            + self.tower_bonus(grid, unit)
    }

    fn defense_power(&self, grid: &Grid, side: &Combatant<'_>) -> u32 {
        let unit = side.unit;
        let (_, zone) = zone_bonus(&self.commanders, grid, unit, side.at);
        let veteran = if unit.rank() >= MAX_RANK {
            self.rules.veteran_defense_bonus
        } else {
            0
        };
        let stars = grid.tile_at(side.at).map_or(0, |t| t.terrain().kind().defense);
        100 + u32::from(veteran)
            + u32::from(zone)
            + u32::from(stars) * u32::from(unit.display_hp())
            + self.tower_bonus(grid, unit)
    }

    fn tower_bonus(&self, grid: &Grid, unit: &Unit) -> u32 {
        let towers = grid.count_owned(unit.faction(), TerrainId::CommTower);
        u32::from(self.rules.comm_tower_bonus) * u32::try_from(towers).unwrap_or(u32::MAX)
    }

    /// Damage `attacker` deals to `defender` with luck `draw`.
    fn strike(&self, grid: &Grid, attacker: &Combatant<'_>, defender: &Combatant<'_>, method: AttackMethod, draw: u32) -> u16 {
        let base = match method.weapon(attacker.unit.kind()) {
            Some(weapon) => weapon.base_damage(defender.unit.id()),
            None => {
                if method != AttackMethod::None {
                    error!(attacker = attacker.unit.kind().name, ?method, "weapon missing from archetype");
                    debug_assert!(false, "attack method {method:?} has no weapon");
                }
                return 0;
            }
        };
        let attack = self.attack_power(grid, attacker, draw);
        let defense = self.defense_power(grid, defender);
        scaled_damage(base, attacker.unit.display_hp(), attack, 10 * defense)
    }

    /// Resolve `attack` against the unit on `attack.target`.
    ///
    /// The seed feeds two independent luck draws, one per direction. The
    /// forecast uses [`Rules::estimate_luck_draw`] for both. A defender
    /// counters only when adjacent, alive after the hit and able to target
    /// the attacker. An illegal pairing resolves to zero damage.
    ///
    /// # Errors
    ///
    /// [`BoardError::StaleHandle`] for a dead attacker, [`BoardError::NoUnit`]
    /// for an empty target and [`BoardError::OutOfBounds`] for a bad `from`.
    pub fn resolve_attack(&self, grid: &Grid, attack: Attack, seed: u64) -> Result<CombatOutcome> {
        let attacker = grid.unit(attack.attacker).ok_or(BoardError::StaleHandle)?;
        let defender = grid
            .unit_at(attack.target)
            .ok_or(BoardError::NoUnit { point: attack.target })?;
        grid.tile_at(attack.from)?;

        let method = attack_method_for(attacker, defender);
        if method == AttackMethod::None {
            error!(
                attacker = attacker.kind().name,
                defender = defender.kind().name,
                "attack without a usable weapon"
            );
        }
        let atk = Combatant {
            unit: attacker,
            at: attack.from,
        };
        let def = Combatant {
            unit: defender,
            at: attack.target,
        };
        let neutral = self.rules.estimate_luck_draw;
        let estimate_damage = self.strike(grid, &atk, &def, method, neutral);
        let damage = self.strike(grid, &atk, &def, method, luck_draw(seed, ATTACK_STREAM));

        let adjacent = attack.from.manhattan(attack.target) == 1;
        let counter_method = if adjacent && !defender.kind().is_indirect() {
            attack_method_for(defender, attacker)
        } else {
            AttackMethod::None
        };
        let counter_with = |dealt: u16, draw: u32| -> u16 {
            if counter_method == AttackMethod::None {
                return 0;
            }
            let mut survivor = defender.clone();
            survivor.set_hp(i32::from(defender.hp()) - i32::from(dealt));
            if survivor.hp() == 0 {
                return 0;
            }
            let counter_side = Combatant {
                unit: &survivor,
                at: attack.target,
            };
            self.strike(grid, &counter_side, &atk, counter_method, draw)
        };
        let estimate_counter = counter_with(estimate_damage, neutral);
        let counter = counter_with(damage, luck_draw(seed, COUNTER_STREAM));

        debug!(
            attacker = attacker.kind().name,
            defender = defender.kind().name,
            damage,
            counter,
            "attack resolved"
        );
        Ok(CombatOutcome {
            method,
            counter_method: if counter > 0 || estimate_counter > 0 {
                counter_method
            } else {
                AttackMethod::None
            },
            damage,
            counter,
            estimate_damage,
            estimate_counter,
        })
    }

    /// Resolve an attack on a terrain structure at `attack.target`.
    ///
    /// Uses the attack power formula with [`Rules::terrain_attack_base`] as
    /// base damage and a flat 100 in place of defense power. Structures never
    /// counter.
    ///
    /// # Errors
    ///
    /// [`BoardError::StaleHandle`] for a dead attacker,
    /// [`BoardError::OutOfBounds`] for bad points and
    /// [`BoardError::InvalidOperation`] when the target is not a structure.
    pub fn resolve_terrain_attack(&self, grid: &Grid, attack: Attack, seed: u64) -> Result<StrikeOutcome> {
        let attacker = grid.unit(attack.attacker).ok_or(BoardError::StaleHandle)?;
        grid.tile_at(attack.from)?;
        if !grid.tile_at(attack.target)?.terrain().kind().is_structure() {
            return Err(BoardError::InvalidOperation("not a terrain structure"));
        }
        let atk = Combatant {
            unit: attacker,
            at: attack.from,
        };
        let base = u8::try_from(self.rules.terrain_attack_base).unwrap_or(u8::MAX);
        let hit = |draw: u32| {
            let power = self.attack_power(grid, &atk, draw);
            scaled_damage(base, attacker.display_hp(), power, 10 * 100)
        };
        Ok(StrikeOutcome {
            damage: hit(luck_draw(seed, ATTACK_STREAM)),
            estimate_damage: hit(self.rules.estimate_luck_draw),
        })
    }
}

/// `ceil(base * hp_factor * attack / divisor)`.
fn scaled_damage(base: u8, hp_factor: u8, attack: u32, divisor: u32) -> u16 {
    if divisor == 0 {
        return 0;
    }
    let numerator = u64::from(base) * u64::from(hp_factor) * u64::from(attack);
    u16::try_from(numerator.div_ceil(u64::from(divisor))).unwrap_or(u16::MAX)
}

/// Apply a resolved `outcome` of `attack` to the board.
///
/// The defender loses HP and is removed at zero, promoting the attacker one
/// rank. A surviving defender deals the counter, which can in turn destroy
/// the attacker. Each side that fired its primary weapon spends one round.
/// The attacker is done for the turn.
///
/// # Errors
///
/// [`BoardError::StaleHandle`] for a dead attacker and [`BoardError::NoUnit`]
/// for an empty target.
pub fn execute_attack(grid: &mut Grid, attack: Attack, outcome: &CombatOutcome) -> Result<AttackReport> {
    let attacker_at = grid
        .unit(attack.attacker)
        .ok_or(BoardError::StaleHandle)?
        .position()
        .ok_or(BoardError::InvalidOperation("attacker is not on the board"))?;
    let mut report = AttackReport::default();

    let defender = grid.unit_at_mut(attack.target)?;
    defender.set_hp(i32::from(defender.hp()) - i32::from(outcome.damage));
    let defender_alive = defender.is_alive();
    if defender_alive && outcome.counter > 0 {
        if outcome.counter_method == AttackMethod::Primary {
            defender.set_ammo(i32::from(defender.ammo()) - 1);
        }
        report.counter_applied = outcome.counter;
    }

    if let Some(unit) = grid.unit_mut(attack.attacker) {
        if outcome.method == AttackMethod::Primary {
            unit.set_ammo(i32::from(unit.ammo()) - 1);
        }
        unit.set_orderable(false);
    }

    if defender_alive {
        if report.counter_applied > 0
            && let Some(unit) = grid.unit_mut(attack.attacker)
        {
            unit.set_hp(i32::from(unit.hp()) - i32::from(report.counter_applied));
            if !unit.is_alive() {
                grid.remove_unit(attacker_at);
                report.attacker_destroyed = true;
                if let Ok(victor) = grid.unit_at_mut(attack.target) {
                    victor.set_rank(i32::from(victor.rank()) + 1);
                }
            }
        }
    } else {
        grid.remove_unit(attack.target);
        report.defender_destroyed = true;
        if let Some(unit) = grid.unit_mut(attack.attacker) {
            unit.set_rank(i32::from(unit.rank()) + 1);
        }
    }

    debug!(target = ?attack.target, ?report, "attack applied");
    Ok(report)
}

/// Apply a resolved terrain strike. Returns `true` when the structure fell.
///
/// # Errors
///
/// Same as [`Grid::strike_terrain`].
pub fn execute_terrain_attack(grid: &mut Grid, attack: Attack, outcome: &StrikeOutcome) -> Result<bool> {
    let damage = u8::try_from(outcome.damage).unwrap_or(u8::MAX);
    let fell = grid.strike_terrain(attack.target, damage)?;
    if let Some(unit) = grid.unit_mut(attack.attacker) {
        unit.set_orderable(false);
    }
    Ok(fell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit_kind::UnitId;

    fn duel(rows: &[&str], attacker: Unit, defender: Unit) -> (Grid, Attack) {
        let mut grid = Grid::from_rows(rows).unwrap();
        let from = Point::new(0, 0);
        let target = Point::new(1, 0);
        let handle = grid.spawn(attacker, from).unwrap();
        grid.spawn(defender, target).unwrap();
        (
            grid,
            Attack {
                attacker: handle,
                from,
                target,
            },
        )
    }

    #[test]
    fn test_tank_vs_infantry_forecast() {
        let (grid, attack) = duel(&[".."], Unit::new(UnitId::Tank, 1), Unit::new(UnitId::Infantry, 2));
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 42).unwrap();
        assert_eq!(outcome.method, AttackMethod::Secondary);
        // attack 105, defense 110: ceil(75 * 10 * 105 / 1100)
        assert_eq!(outcome.estimate_damage, 72);
        // 28 HP infantry: attack 101 against the tank's 110
        assert_eq!(outcome.estimate_counter, 2);
        assert_eq!(outcome.counter_method, AttackMethod::Secondary);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (grid, attack) = duel(&[".w"], Unit::new(UnitId::Mech, 1), Unit::new(UnitId::Tank, 2));
        let resolver = CombatResolver::default();
        let a = resolver.resolve_attack(&grid, attack, 9).unwrap();
        let b = resolver.resolve_attack(&grid, attack, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.method, AttackMethod::Primary);
    }

    #[test]
    fn test_terrain_defense_reduces_damage() {
        let (open, attack) = duel(&[".."], Unit::new(UnitId::Tank, 1), Unit::new(UnitId::Tank, 2));
        let (peak, _) = duel(&[".^"], Unit::new(UnitId::Tank, 1), Unit::new(UnitId::Mech, 2));
        let resolver = CombatResolver::default();
        let on_plain = resolver.resolve_attack(&open, attack, 1).unwrap();
        assert_eq!(on_plain.estimate_damage, 53);
        let mech_on_mountain = resolver.resolve_attack(&peak, attack, 1).unwrap();
        // MG 70 vs mech, defense 100 + 4 * 10
        assert_eq!(mech_on_mountain.estimate_damage, 53);
    }

    #[test]
    fn test_indirect_never_countered() {
        let mut grid = Grid::from_rows(&["...."]).unwrap();
        let arty = grid.spawn(Unit::new(UnitId::Artillery, 1), Point::new(0, 0)).unwrap();
        grid.spawn(Unit::new(UnitId::Tank, 2), Point::new(2, 0)).unwrap();
        let attack = Attack {
            attacker: arty,
            from: Point::new(0, 0),
            target: Point::new(2, 0),
        };
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 3).unwrap();
        assert!(outcome.damage > 0);
        assert_eq!(outcome.counter, 0);
        assert_eq!(outcome.estimate_counter, 0);
        assert_eq!(outcome.counter_method, AttackMethod::None);
    }

    #[test]
    fn test_rank_and_towers_raise_attack() {
        let mut veteran = Unit::new(UnitId::Tank, 1);
        veteran.set_rank(3);
        let (mut grid, attack) = duel(&["..T"], veteran, Unit::new(UnitId::Apc, 2));
        let resolver = CombatResolver::default();
        let base = resolver.resolve_attack(&grid, attack, 5).unwrap();
        grid.set_owner(Point::new(2, 0), Some(1)).unwrap();
        let boosted = resolver.resolve_attack(&grid, attack, 5).unwrap();
        assert!(boosted.estimate_damage > base.estimate_damage);
        // 75 * 10 * (100 + 20 + 5) / (10 * 110)
        assert_eq!(base.estimate_damage, 86);
    }

    #[test]
    fn test_commander_zone() {
        let mut flagship = Unit::new(UnitId::Tank, 1);
        flagship.set_co_aboard(true);
        let (grid, attack) = duel(&[".."], flagship, Unit::new(UnitId::Tank, 2));
        let plain = CombatResolver::default().resolve_attack(&grid, attack, 0).unwrap();
        let led = CombatResolver::default()
            .with_commanders([Commander {
                faction: 1,
                zone_radius: 1,
                attack_bonus: 50,
                defense_bonus: 0,
            }])
            .resolve_attack(&grid, attack, 0)
            .unwrap();
        assert!(led.estimate_damage > plain.estimate_damage);
    }

    #[test]
    fn test_unarmed_attacker_deals_nothing() {
        let (grid, attack) = duel(&[".."], Unit::new(UnitId::Apc, 1), Unit::new(UnitId::Tank, 2));
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 0).unwrap();
        assert_eq!(outcome.method, AttackMethod::None);
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.estimate_damage, 0);
    }

    #[test]
    fn test_execute_destroys_and_promotes() {
        let mut weak = Unit::new(UnitId::Infantry, 2);
        weak.set_hp(10);
        let (mut grid, attack) = duel(&[".."], Unit::new(UnitId::Tank, 1), weak);
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 1).unwrap();
        let report = execute_attack(&mut grid, attack, &outcome).unwrap();
        assert!(report.defender_destroyed);
        assert!(grid.unit_at(Point::new(1, 0)).is_none());
        let tank = grid.unit(attack.attacker).unwrap();
        assert_eq!(tank.rank(), 1);
        assert_eq!(tank.ammo(), 9, "machine gun does not use ammo");
        assert!(!tank.orderable());
    }

    #[test]
    fn test_execute_counter_and_ammo() {
        let (mut grid, attack) = duel(&[".."], Unit::new(UnitId::Tank, 1), Unit::new(UnitId::Tank, 2));
        let outcome = CombatResolver::default().resolve_attack(&grid, attack, 11).unwrap();
        let report = execute_attack(&mut grid, attack, &outcome).unwrap();
        assert!(!report.defender_destroyed);
        assert_eq!(report.counter_applied, outcome.counter);
        let attacker = grid.unit(attack.attacker).unwrap();
        assert_eq!(attacker.ammo(), 8);
        assert_eq!(u16::from(attacker.hp()), 100 - outcome.counter);
        let defender = grid.unit_at(attack.target).unwrap();
        assert_eq!(defender.ammo(), 8);
        assert_eq!(u16::from(defender.hp()), 100 - outcome.damage);
    }

    #[test]
    fn test_terrain_attack() {
        let mut grid = Grid::from_rows(&[".M&"]).unwrap();
        let tank = grid.spawn(Unit::new(UnitId::Tank, 1), Point::new(0, 0)).unwrap();
        let attack = Attack {
            attacker: tank,
            from: Point::new(0, 0),
            target: Point::new(1, 0),
        };
        let resolver = CombatResolver::default();
        let strike = resolver.resolve_terrain_attack(&grid, attack, 4).unwrap();
        // ceil(30 * 10 * 105 / 1000)
        assert_eq!(strike.estimate_damage, 32);
        assert!(!execute_terrain_attack(&mut grid, attack, &strike).unwrap());

        let bad = Attack {
            target: Point::new(0, 0),
            ..attack
        };
        assert!(matches!(
            resolver.resolve_terrain_attack(&grid, bad, 4),
            Err(BoardError::InvalidOperation(_))
        ));
    }
}
