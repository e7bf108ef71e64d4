#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wargrid::board::{TerrainId, Unit, UnitId, check_invariants};
use wargrid::pathfind::{Pathfinder, route_cost, route_points};
use wargrid::{Grid, Point};

/// Structured input for route fuzzing.
#[derive(Arbitrary, Debug)]
struct RouteInput {
    width: u8,
    height: u8,
    terrain: Vec<u8>,
    mover: u8,
    origin: (u8, u8),
    /// Other units as (x, y, enemy).
    others: Vec<(u8, u8, bool)>,
    fog: bool,
    /// Cursor positions in drag order.
    drags: Vec<(u8, u8)>,
    commit: bool,
}

fuzz_target!(|input: RouteInput| {
    let width = i16::from(input.width % 12) + 1;
    let height = i16::from(input.height % 12) + 1;
    let Ok(mut grid) = Grid::new(width, height) else { return };
    for (p, &t) in grid.points().zip(&input.terrain) {
        let _ = grid.set_terrain(p, TerrainId::ALL[usize::from(t) % TerrainId::ALL.len()]);
    }

    let at = |(x, y): (u8, u8)| Point::new(i16::from(x) % width, i16::from(y) % height);
    let origin = at(input.origin);
    let id = UnitId::ALL[usize::from(input.mover) % UnitId::ALL.len()];
    let Ok(handle) = grid.spawn(Unit::new(id, 1), origin) else { return };
    for &(x, y, enemy) in input.others.iter().take(16) {
        let _ = grid.spawn(Unit::new(UnitId::Infantry, if enemy { 2 } else { 1 }), at((x, y)));
    }
    if input.fog {
        grid.apply_fog(1);
    }

    let finder = Pathfinder::default();
    let Ok(reach) = finder.generate_reachability(&mut grid, handle) else { return };
    let Some(unit) = grid.unit(handle).cloned() else { return };

    for &drag in input.drags.iter().take(32) {
        let route = finder
            .recalculate_path_to_point(&mut grid, handle, at(drag))
            .expect("reachable destinations always route");
        assert_eq!(route.first(), Some(&origin));
        assert_eq!(route_points(&grid, origin), route);
        assert!(route_cost(&grid, &unit, &route) <= u16::from(reach.budget));
        let violations = check_invariants(&grid);
        assert!(violations.is_empty(), "Invariants violated while dragging: {violations:?}");
    }

    if input.commit {
        let outcome = finder.commit_route(&mut grid, handle);
        if let Ok(outcome) = outcome {
            assert_eq!(grid.handle_at(outcome.at()), Some(handle));
        }
        let violations = check_invariants(&grid);
        assert!(violations.is_empty(), "Invariants violated after move: {violations:?}");
    }
});
