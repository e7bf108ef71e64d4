//! Reachability command implementation.

use super::{CliError, OutputFormat, load_scenario, unit_handle};
use std::path::Path;
use wargrid::Point;
use wargrid::pathfind::generate_reachability;
use wargrid::render::render_ascii;

/// Execute the reach command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or holds no unit at
/// `unit`.
pub(crate) fn execute(scenario: &Path, unit: Point, format: OutputFormat) -> Result<(), CliError> {
    let mut scenario = load_scenario(scenario)?;
    let grid = &mut scenario.grid;
    let handle = unit_handle(grid, unit)?;
    let faction = grid.unit(handle).map_or(0, wargrid::Unit::faction);
    grid.apply_fog(faction);
    let reach = generate_reachability(grid, handle)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reach)?),
        OutputFormat::Text => {
            print!("{}", render_ascii(grid, faction));
            println!();
            println!("Budget: {}", reach.budget);
            println!("Reachable: {} tiles", reach.tiles.len());
            println!("Targets:   {} tiles", reach.targets.len());
        }
    }
    Ok(())
}
