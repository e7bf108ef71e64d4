//! Benchmarks for reachability and route dragging.
//!
//! Selection and cursor drags run on every input event, so these are the
//! latency-sensitive paths.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use wargrid::board::{TerrainId, Unit, UnitHandle, UnitId};
use wargrid::pathfind::{Pathfinder, mark_danger};
use wargrid::{Grid, Point};

/// A 30x20 map with bands of wood and a river, one tank in the middle and a
/// ring of enemy infantry.
fn battlefield() -> (Grid, UnitHandle) {
    let mut grid = Grid::new(30, 20).unwrap();
    for p in grid.points().collect::<Vec<_>>() {
        let terrain = match (p.x % 7, p.y % 5) {
            (3, _) => TerrainId::Wood,
            (_, 2) if p.x % 11 == 0 => TerrainId::River,
            (6, 4) => TerrainId::Mountain,
            _ => TerrainId::Plain,
        };
        grid.set_terrain(p, terrain).unwrap();
    }
    let tank = grid.spawn(Unit::new(UnitId::Tank, 1), Point::new(15, 10)).unwrap();
    for (x, y) in [(10, 10), (20, 10), (15, 5), (15, 15), (11, 6), (19, 14)] {
        grid.spawn(Unit::new(UnitId::Infantry, 2), Point::new(x, y)).unwrap();
    }
    (grid, tank)
}

fn bench_reachability(c: &mut Criterion) {
    let (mut grid, tank) = battlefield();
    let finder = Pathfinder::default();

    c.bench_function("reachability_tank", |b| {
        b.iter(|| {
            let reach = finder.generate_reachability(black_box(&mut grid), black_box(tank)).unwrap();
            black_box(reach)
        });
    });
}

fn bench_drag(c: &mut Criterion) {
    let (mut grid, tank) = battlefield();
    let finder = Pathfinder::default();
    finder.generate_reachability(&mut grid, tank).unwrap();

    // A cursor sweep that extends, doubles back and jumps.
    let sweep: Vec<Point> = [(16, 10), (17, 10), (18, 10), (18, 11), (17, 11), (14, 9), (13, 8), (12, 12), (15, 10)]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();

    c.bench_function("route_drag_sweep", |b| {
        b.iter(|| {
            for &p in &sweep {
                let route = finder.recalculate_path_to_point(&mut grid, tank, black_box(p)).unwrap();
                black_box(route);
            }
        });
    });
}

fn bench_danger(c: &mut Criterion) {
    let (mut grid, _) = battlefield();

    c.bench_function("danger_zone_6_threats", |b| {
        b.iter(|| black_box(mark_danger(black_box(&mut grid), 1)));
    });
}

criterion_group!(benches, bench_reachability, bench_drag, bench_danger);
criterion_main!(benches);
