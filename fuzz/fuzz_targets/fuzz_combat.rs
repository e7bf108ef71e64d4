#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wargrid::board::{TerrainId, Unit, UnitId, check_invariants};
use wargrid::combat::{Attack, CombatResolver, execute_attack};
use wargrid::{Commander, Grid, Point};

/// One side of the engagement.
#[derive(Arbitrary, Debug)]
struct Side {
    kind: u8,
    hp: u8,
    ammo: u8,
    rank: u8,
    co_aboard: bool,
    terrain: u8,
}

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    attacker: Side,
    defender: Side,
    /// Defender offset along x; 1 is adjacent.
    distance: u8,
    seed: u64,
    commander_radius: u8,
    commander_bonus: u8,
}

fn build(side: &Side, faction: u8) -> Unit {
    let id = UnitId::ALL[usize::from(side.kind) % UnitId::ALL.len()];
    let mut unit = Unit::new(id, faction);
    unit.set_hp(i32::from(side.hp % 100) + 1);
    unit.set_ammo(i32::from(side.ammo));
    unit.set_rank(i32::from(side.rank % 4));
    unit.set_co_aboard(side.co_aboard);
    unit
}

fuzz_target!(|input: CombatInput| {
    let distance = i16::from(input.distance % 6) + 1;
    let Ok(mut grid) = Grid::new(8, 1) else { return };
    let from = Point::new(0, 0);
    let target = Point::new(distance, 0);
    for (p, side) in [(from, &input.attacker), (target, &input.defender)] {
        let terrain = TerrainId::ALL[usize::from(side.terrain) % TerrainId::ALL.len()];
        if grid.set_terrain(p, terrain).is_err() {
            return;
        }
    }

    let Ok(attacker) = grid.spawn(build(&input.attacker, 1), from) else { return };
    if grid.spawn(build(&input.defender, 2), target).is_err() {
        return;
    }
    assert!(check_invariants(&grid).is_empty());

    let resolver = CombatResolver::default().with_commanders([Commander {
        faction: 1,
        zone_radius: u16::from(input.commander_radius % 8),
        attack_bonus: u16::from(input.commander_bonus),
        defense_bonus: u16::from(input.commander_bonus),
    }]);
    let attack = Attack { attacker, from, target };

    // Must not panic, and must be a pure function of its inputs.
    let Ok(outcome) = resolver.resolve_attack(&grid, attack, input.seed) else { return };
    assert_eq!(resolver.resolve_attack(&grid, attack, input.seed).ok(), Some(outcome));
    if distance > 1 {
        assert_eq!(outcome.counter, 0, "counter fire at range {distance}");
    }

    let Ok(report) = execute_attack(&mut grid, attack, &outcome) else { return };
    if report.defender_destroyed {
        assert!(grid.unit_at(target).is_none());
        assert_eq!(report.counter_applied, 0);
    }
    for (_, unit) in grid.roster().iter() {
        assert!(unit.hp() > 0, "dead unit left on the board");
    }

    let violations = check_invariants(&grid);
    assert!(violations.is_empty(), "Invariants violated after combat: {violations:?}");
});
