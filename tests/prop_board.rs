//! Property-based tests for the board, pathfinder and combat resolver.
//!
//! Run with: cargo test --release prop_board

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use wargrid::board::bitfield::{BitAllocator, read_bits, write_bits};
use wargrid::board::{TerrainId, Unit, UnitHandle, UnitId, check_invariants};
use wargrid::combat::{Attack, CombatResolver, execute_attack};
use wargrid::pathfind::{generate_reachability, generate_reachability_with_budget, recalculate_path_to_point, route_cost, route_points};
use wargrid::{BoardError, Grid, Point};

const TERRAINS: [TerrainId; 7] = [
    TerrainId::Plain,
    TerrainId::Plain,
    TerrainId::Road,
    TerrainId::Wood,
    TerrainId::Mountain,
    TerrainId::River,
    TerrainId::Sea,
];

const MOVERS: [UnitId; 6] = [
    UnitId::Infantry,
    UnitId::Mech,
    UnitId::Recon,
    UnitId::Tank,
    UnitId::BattleCopter,
    UnitId::Cruiser,
];

/// A small random board with one mover at `origin` and a few other units.
#[derive(Debug, Clone)]
struct Board {
    width: i16,
    height: i16,
    terrain: Vec<usize>,
    mover: usize,
    origin: (i16, i16),
    others: Vec<(i16, i16, bool)>,
}

fn board_strategy() -> impl Strategy<Value = Board> {
    (2i16..9, 2i16..9).prop_flat_map(|(width, height)| {
        let area = usize::from(width.unsigned_abs() * height.unsigned_abs());
        (
            Just(width),
            Just(height),
            prop::collection::vec(0..TERRAINS.len(), area),
            0..MOVERS.len(),
            (0..width, 0..height),
            prop::collection::vec((0..width, 0..height, any::<bool>()), 0..4),
        )
            .prop_map(|(width, height, terrain, mover, origin, others)| Board {
                width,
                height,
                terrain,
                mover,
                origin,
                others,
            })
    })
}

fn build(board: &Board) -> (Grid, UnitHandle) {
    let mut grid = Grid::new(board.width, board.height).unwrap();
    for (p, &t) in grid.points().zip(&board.terrain) {
        grid.set_terrain(p, TERRAINS[t]).unwrap();
    }
    let origin = Point::new(board.origin.0, board.origin.1);
    let handle = grid.spawn(Unit::new(MOVERS[board.mover], 1), origin).unwrap();
    for &(x, y, enemy) in &board.others {
        let p = Point::new(x, y);
        if grid.handle_at(p).is_none() {
            grid.spawn(Unit::new(UnitId::Infantry, if enemy { 2 } else { 1 }), p).unwrap();
        }
    }
    (grid, handle)
}

fn reachable(grid: &Grid) -> BTreeSet<Point> {
    grid.points()
        .filter(|&p| grid.tile_at(p).unwrap().move_flag())
        .collect()
}

/// Cheapest movement cost from the mover's origin to every tile, computed
/// by plain relaxation over traversable tiles.
fn cheapest_costs(grid: &Grid, handle: UnitHandle) -> Vec<Option<u32>> {
    let unit = grid.unit(handle).unwrap().clone();
    let origin = unit.position().unwrap();
    let class = unit.kind().movement_class;
    let points: Vec<Point> = grid.points().collect();
    let index = |p: Point| points.iter().position(|&q| q == p);
    let mut cost = vec![None; points.len()];
    cost[index(origin).unwrap()] = Some(0u32);
    loop {
        let mut changed = false;
        for (i, &p) in points.iter().enumerate() {
            let Some(here) = cost[i] else { continue };
            if p != origin && !grid.tile_at(p).unwrap().traversable(&unit, grid.roster()) {
                continue;
            }
            for n in p.orthogonal() {
                let Some(j) = index(n) else { continue };
                let step = u32::from(grid.tile_at(n).unwrap().movement_cost(class));
                if step == 0 || !grid.tile_at(n).unwrap().traversable(&unit, grid.roster()) {
                    continue;
                }
                if cost[j].is_none_or(|c| here + step < c) {
                    cost[j] = Some(here + step);
                    changed = true;
                }
            }
        }
        if !changed {
            return cost;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Writing then reading a field returns the value and leaves other bits alone.
    #[test]
    fn prop_bits_round_trip(store in any::<u32>(), shift in 0u8..32, width in 1u8..=16, value in any::<u32>()) {
        prop_assume!(u32::from(shift) + u32::from(width) <= 32);
        let mask = BitAllocator::new().generate_at(width, shift);
        let value = value & mask.max_value();
        let written = write_bits(store, value, mask);
        prop_assert_eq!(read_bits(written, mask), value);
        let outside = !(mask.low_bits() << shift);
        prop_assert_eq!(written & outside, store & outside);
    }

    /// Every coordinate in the bordered rectangle resolves; nothing else does.
    #[test]
    fn prop_border_addressable(width in 1i16..20, height in 1i16..20, x in -5i16..30, y in -5i16..30) {
        let grid = Grid::new(width, height).unwrap();
        let inside = (-1..=width).contains(&x) && (-1..=height).contains(&y);
        match grid.tile_at(Point::new(x, y)) {
            Ok(tile) => {
                prop_assert!(inside);
                prop_assert_eq!(tile.point(), Point::new(x, y));
            }
            Err(err) => {
                prop_assert!(!inside);
                let is_out_of_bounds = matches!(err, BoardError::OutOfBounds { .. });
                prop_assert!(is_out_of_bounds);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A larger budget never loses a reachable tile.
    #[test]
    fn prop_reach_monotonic(board in board_strategy(), budget in 0u8..9) {
        let (mut grid, handle) = build(&board);
        generate_reachability_with_budget(&mut grid, handle, budget).unwrap();
        let smaller = reachable(&grid);
        generate_reachability_with_budget(&mut grid, handle, budget + 1).unwrap();
        let larger = reachable(&grid);
        prop_assert!(smaller.is_subset(&larger));
    }

    /// Every reachable tile has a path costing at most the budget.
    #[test]
    fn prop_reach_cost_bound(board in board_strategy()) {
        let (mut grid, handle) = build(&board);
        let reach = generate_reachability(&mut grid, handle).unwrap();
        let costs = cheapest_costs(&grid, handle);
        let points: Vec<Point> = grid.points().collect();
        for p in &reach.tiles {
            let i = points.iter().position(|q| q == p).unwrap();
            let cost = costs[i];
            prop_assert!(cost.is_some_and(|c| c <= u32::from(reach.budget)), "{:?} costs {:?}", p, cost);
        }
        prop_assert!(check_invariants(&grid).is_empty());
    }

    /// After any drag sequence the arrow chain ends at the last reachable
    /// destination, stays within budget and keeps arrows paired.
    #[test]
    fn prop_route_arrows_consistent(board in board_strategy(), drags in prop::collection::vec((0i16..9, 0i16..9), 1..12)) {
        let (mut grid, handle) = build(&board);
        generate_reachability(&mut grid, handle).unwrap();
        let unit = grid.unit(handle).unwrap().clone();
        let origin = unit.position().unwrap();
        let mut expected_end = origin;
        for (x, y) in drags {
            let destination = Point::new(x, y);
            let flagged = grid.tile_at(destination).is_ok_and(|t| t.move_flag());
            let route = recalculate_path_to_point(&mut grid, handle, destination, 2).unwrap();
            if flagged {
                expected_end = destination;
            }
            prop_assert_eq!(route.last().copied(), Some(expected_end));
            let walked = route_points(&grid, origin);
            prop_assert!(walked.len() <= grid.area());
            prop_assert_eq!(&walked, &route);
            prop_assert!(route_cost(&grid, &unit, &route) <= u16::from(unit.movement_budget()));
            let violations = check_invariants(&grid);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Resolution is a pure function of board and seed; damage never drives
    /// HP below zero.
    #[test]
    fn prop_combat_deterministic(
        attacker in 0..MOVERS.len(),
        defender in 0..MOVERS.len(),
        attacker_hp in 1i32..=100,
        defender_hp in 1i32..=100,
        terrain in 0..TERRAINS.len(),
        seed in any::<u64>(),
    ) {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.set_terrain(Point::new(1, 0), TERRAINS[terrain]).unwrap();
        let mut a = Unit::new(MOVERS[attacker], 1);
        a.set_hp(attacker_hp);
        let mut d = Unit::new(MOVERS[defender], 2);
        d.set_hp(defender_hp);
        let handle = grid.spawn(a, Point::new(0, 0)).unwrap();
        grid.spawn(d, Point::new(1, 0)).unwrap();
        let attack = Attack { attacker: handle, from: Point::new(0, 0), target: Point::new(1, 0) };

        let resolver = CombatResolver::default();
        let first = resolver.resolve_attack(&grid, attack, seed).unwrap();
        let second = resolver.resolve_attack(&grid, attack, seed).unwrap();
        prop_assert_eq!(first, second);

        let report = execute_attack(&mut grid, attack, &first).unwrap();
        let expect_dead = i32::from(first.damage) >= defender_hp;
        prop_assert_eq!(report.defender_destroyed, expect_dead);
        for (_, unit) in grid.roster().iter() {
            prop_assert!(unit.hp() > 0);
        }
        prop_assert!(check_invariants(&grid).is_empty());
    }
}
