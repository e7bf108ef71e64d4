//! Route planning on top of a reachability map.
//!
//! The planned route lives on the grid itself as a doubly linked chain of
//! arrows: each tile's `arrow_to` points at the next tile and the next
//! tile's `arrow_from` points back. Recalculation edits that chain in place
//! so a dragged cursor keeps as much of the old route as it can.

use serde::Serialize;
use tracing::{debug, error};

use crate::board::grid::Grid;
use crate::board::point::{Direction, Point};
use crate::board::unit::{Unit, UnitHandle};
use crate::error::{BoardError, Result};
use crate::pathfind::reach::placed_unit;
use crate::pathfind::search::{Flow, breadth_first};

/// Tiles of the arrow chain starting at `origin`, origin first.
///
/// The walk is capped at `width * height` steps, so a corrupted chain can
/// never loop forever.
#[must_use]
pub fn route_points(grid: &Grid, origin: Point) -> Vec<Point> {
    let mut points = vec![origin];
    let mut at = origin;
    for _ in 0..grid.area() {
        let next = match grid.tile_at(at) {
            Ok(tile) if tile.arrow_to().is_some() => at.step(tile.arrow_to()),
            _ => break,
        };
        if !grid.valid_point(next) {
            break;
        }
        points.push(next);
        at = next;
    }
    points
}

/// Summed movement cost of `points[1..]` for the unit's movement class.
#[must_use]
pub fn route_cost(grid: &Grid, unit: &Unit, points: &[Point]) -> u16 {
    let class = unit.kind().movement_class;
    points
        .iter()
        .skip(1)
        .map(|&p| grid.tile_at(p).map_or(0, |t| u16::from(t.movement_cost(class))))
        .sum()
}

/// Erase every route arrow on the board.
pub fn clear_route(grid: &mut Grid) {
    for p in grid.points() {
        if let Ok(tile) = grid.tile_at_mut(p) {
            tile.clear_arrows();
        }
    }
}

fn link(grid: &mut Grid, a: Point, b: Point) {
    let Some(dir) = a.direction_to(b) else {
        debug_assert!(false, "route step {a} -> {b} is not orthogonal");
        return;
    };
    if let Ok(tile) = grid.tile_at_mut(a) {
        tile.set_arrow_to(dir);
    }
    if let Ok(tile) = grid.tile_at_mut(b) {
        tile.set_arrow_from(dir.opposite());
    }
}

fn unlink_after(grid: &mut Grid, path: &[Point], keep: usize) {
    for &p in path.iter().skip(keep) {
        if let Ok(tile) = grid.tile_at_mut(p) {
            tile.clear_arrows();
        }
    }
    if let Some(&last) = path.get(keep.saturating_sub(1))
        && let Ok(tile) = grid.tile_at_mut(last)
    {
        tile.set_arrow_to(Direction::None);
    }
}

/// Per-search scratch for one segment search.
struct Segment<'g> {
    grid: &'g Grid,
    unit: &'g Unit,
    start: Point,
    destination: Point,
    forbidden: Vec<bool>,
    best: Vec<i16>,
    parent: Vec<Option<Point>>,
}

impl Segment<'_> {
    fn slot(&self, p: Point) -> Option<usize> {
        self.grid.tile_index(p)
    }
}

/// Breadth-first search from `start` to `destination` spending at most
/// `remaining`, never touching `forbidden_path` tiles other than `start`.
///
/// Labels are corrected whenever a tile is reached again with strictly more
/// budget left, so the search is complete. Returns the segment
/// `[start, ..., destination]`.
fn find_segment(grid: &Grid, unit: &Unit, forbidden_path: &[Point], remaining: i16, destination: Point) -> Option<Vec<Point>> {
    let start = *forbidden_path.last()?;
    let mut search = Segment {
        grid,
        unit,
        start,
        destination,
        forbidden: vec![false; grid.tiles().len()],
        best: vec![-1; grid.tiles().len()],
        parent: vec![None; grid.tiles().len()],
    };
    for &p in forbidden_path {
        if let Some(i) = search.slot(p) {
            search.forbidden[i] = p != start;
        }
    }
    let class = unit.kind().movement_class;

    let stats = breadth_first(
        &mut search,
        (start, remaining, None::<Point>),
        |s, &(p, left, _)| {
            let Some(i) = s.slot(p) else { return false };
            left >= 0
                && !s.forbidden[i]
                && left > s.best[i]
                && (p == s.start || s.grid.tile_at(p).is_ok_and(|t| t.traversable(s.unit, s.grid.roster())))
        },
        |s, (p, left, from), frontier| {
            if let Some(i) = s.slot(p) {
                s.best[i] = left;
                s.parent[i] = from;
            }
            if p == s.destination {
                return Flow::Stop;
            }
            for n in p.orthogonal() {
                let cost = s.grid.tile_at(n).map_or(0, |t| t.movement_cost(class));
                if cost > 0 {
                    frontier.push((n, left - i16::from(cost), Some(p)));
                }
            }
            Flow::Continue
        },
    );
    if !stats.stopped {
        return None;
    }

    let mut segment = vec![destination];
    let mut at = destination;
    while at != start {
        let prev = search.slot(at).and_then(|i| search.parent[i])?;
        segment.push(prev);
        at = prev;
        if segment.len() > grid.tiles().len() {
            return None;
        }
    }
    segment.reverse();
    Some(segment)
}

/// Re-route the planned path of the unit behind `handle` to `destination`.
///
/// Does nothing unless `destination` carries `move_flag`. Otherwise, in
/// order: truncate if the destination is already on the route; extend the
/// route from its end; drop up to `retry_limit` trailing steps and extend
/// again; finally replace the route with a fresh search from the origin.
/// Returns the resulting route, origin first.
///
/// # Errors
///
/// [`BoardError::StaleHandle`] / [`BoardError::InvalidOperation`] for a
/// dead or unplaced unit, and [`BoardError::RouteInvariant`] if even the
/// full search fails, which means the reachability flags were stale.
pub fn recalculate_path_to_point(grid: &mut Grid, handle: UnitHandle, destination: Point, retry_limit: u8) -> Result<Vec<Point>> {
    let (unit, origin) = placed_unit(grid, handle)?;
    let path = route_points(grid, origin);

    if !grid.tile_at(destination).is_ok_and(|t| t.move_flag()) {
        return Ok(path);
    }

    if let Some(i) = path.iter().position(|&p| p == destination) {
        unlink_after(grid, &path, i + 1);
        Ok(path[..=i].to_vec())
    } else {
        let budget = i16::from(unit.movement_budget());
        let attempts = usize::from(retry_limit) + 1;
        for dropped in 0..attempts.min(path.len()) {
            let prefix = &path[..path.len() - dropped];
            if prefix.len() == 1 {
                // Reuse exhausted; the full search below covers this.
                break;
            }
            let left = budget - i16::try_from(route_cost(grid, &unit, prefix)).unwrap_or(i16::MAX);
            if let Some(segment) = find_segment(grid, &unit, prefix, left, destination) {
                debug!(?destination, dropped, "route repaired locally");
                return Ok(splice(grid, &path, prefix.len(), &segment));
            }
        }

        match find_segment(grid, &unit, &[origin], budget, destination) {
            Some(segment) => {
                debug!(?destination, "route rebuilt from origin");
                Ok(splice(grid, &path, 1, &segment))
            }
            None => {
                error!(?origin, ?destination, "no route to a tile flagged reachable");
                debug_assert!(false, "reachability flags promised a route to {destination}");
                Err(BoardError::RouteInvariant { destination })
            }
        }
    }
}

/// Keep `old[..keep]`, drop the rest, and append `segment` (which starts at
/// `old[keep - 1]`).
fn splice(grid: &mut Grid, old: &[Point], keep: usize, segment: &[Point]) -> Vec<Point> {
    unlink_after(grid, old, keep);
    for pair in segment.windows(2) {
        link(grid, pair[0], pair[1]);
    }
    let mut route = old[..keep].to_vec();
    route.extend_from_slice(segment.get(1..).unwrap_or_default());
    route
}

/// What happened when a planned route was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    /// The unit reached the end of its route.
    Arrived {
        /// Final position.
        at: Point,
        /// Fuel spent on the way.
        fuel_spent: u16,
    },
    /// A hidden enemy blocked the route; the unit stopped short.
    Ambushed {
        /// Where the unit stopped.
        at: Point,
        /// The revealed enemy.
        ambusher: Point,
        /// Fuel spent on the way.
        fuel_spent: u16,
    },
}

impl MoveOutcome {
    /// Where the unit ended up.
    #[must_use]
    pub const fn at(self) -> Point {
        match self {
            Self::Arrived { at, .. } | Self::Ambushed { at, .. } => at,
        }
    }
}

/// Walk the unit behind `handle` along its planned route.
///
/// Fuel is spent per tile entered. A hidden enemy on the route stops the
/// unit on the last free tile before it and is revealed. The unit is done
/// for the turn and the selection is cleared.
///
/// # Errors
///
/// [`BoardError::StaleHandle`] / [`BoardError::InvalidOperation`] for a
/// dead or unplaced unit, and [`BoardError::Occupied`] when the route ends
/// on a tile another unit holds.
pub fn commit_route(grid: &mut Grid, handle: UnitHandle) -> Result<MoveOutcome> {
    let (unit, origin) = placed_unit(grid, handle)?;
    let path = route_points(grid, origin);

    let blocker = path.iter().skip(1).position(|&p| {
        grid.unit_at(p).is_some_and(|other| other.faction() != unit.faction())
    });
    let mut stop = blocker.map_or(path.len() - 1, |i| i);
    let occupied = |grid: &Grid, p: Point| grid.handle_at(p).is_some_and(|h| h != handle);
    if blocker.is_some() {
        while stop > 0 && occupied(grid, path[stop]) {
            stop -= 1;
        }
    } else if occupied(grid, path[stop]) {
        return Err(BoardError::Occupied { point: path[stop] });
    }

    let walked = &path[..=stop];
    let fuel_spent = route_cost(grid, &unit, walked);
    let at = path[stop];
    if at != origin {
        grid.place_unit(handle, at)?;
    }
    if let Some(moved) = grid.unit_mut(handle) {
        moved.set_fuel(i32::from(moved.fuel()) - i32::from(fuel_spent));
        if at != origin {
            moved.set_capture(0);
        }
        moved.set_orderable(false);
    }
    grid.clear_selection();

    Ok(match blocker {
        Some(i) => {
            let ambusher = path[i + 1];
            grid.reveal(ambusher);
            debug!(?at, ?ambusher, "move interrupted by hidden enemy");
            MoveOutcome::Ambushed {
                at,
                ambusher,
                fuel_spent,
            }
        }
        None => MoveOutcome::Arrived { at, fuel_spent },
    })
}
