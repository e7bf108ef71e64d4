//! Route command implementation.

use super::output::{JsonRoute, format_route};
use super::{CliError, OutputFormat, load_scenario, unit_handle};
use std::path::Path;
use wargrid::pathfind::route_cost;
use wargrid::render::render_ascii;
use wargrid::{Pathfinder, Point, Rules};

/// Execute the route command.
///
/// Generates reachability, then feeds every destination to route
/// recalculation in order, like a cursor dragged across the board.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded, holds no unit at
/// `unit`, or a route cannot be carried out.
pub(crate) fn execute(
    scenario: &Path,
    unit: Point,
    to: &[Point],
    commit: bool,
    rules: &Rules,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut scenario = load_scenario(scenario)?;
    let grid = &mut scenario.grid;
    let handle = unit_handle(grid, unit)?;
    let mover = grid
        .unit(handle)
        .cloned()
        .ok_or_else(|| CliError::new(format!("No unit at {unit}")))?;
    grid.apply_fog(mover.faction());

    let finder = Pathfinder::new(rules);
    finder.generate_reachability(grid, handle)?;
    let mut route = vec![unit];
    for &destination in to {
        route = finder.recalculate_path_to_point(grid, handle, destination)?;
    }
    if route.last() != to.last() {
        return Err(CliError::new(format!(
            "{} is out of reach",
            to.last().map_or_else(String::new, ToString::to_string)
        )));
    }

    let cost = route_cost(grid, &mover, &route);
    let board = (format == OutputFormat::Text).then(|| render_ascii(grid, mover.faction()));
    let outcome = if commit {
        Some(finder.commit_route(grid, handle)?)
    } else {
        None
    };
    let result = JsonRoute {
        route,
        cost,
        budget: mover.movement_budget(),
        outcome,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            if let Some(board) = board {
                print!("{board}");
                println!();
            }
            print!("{}", format_route(&result));
        }
    }
    Ok(())
}
