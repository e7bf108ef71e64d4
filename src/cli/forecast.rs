//! Forecast command implementation.

use super::output::{JsonForecast, format_forecast};
use super::{CliError, OutputFormat, load_scenario, unit_handle};
use std::path::Path;
use wargrid::{Attack, CombatResolver, Point, Rules};

/// Execute the forecast command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or either tile is
/// empty.
pub(crate) fn execute(
    scenario: &Path,
    attacker: Point,
    from: Option<Point>,
    target: Point,
    seed: u64,
    rules: Rules,
    format: OutputFormat,
) -> Result<(), CliError> {
    let scenario = load_scenario(scenario)?;
    let grid = &scenario.grid;
    let handle = unit_handle(grid, attacker)?;
    let defender = grid
        .unit_at(target)
        .ok_or_else(|| CliError::new(format!("No unit at {target}")))?;
    let attack = Attack {
        attacker: handle,
        from: from.unwrap_or(attacker),
        target,
    };

    let resolver = CombatResolver::new(rules).with_commanders(scenario.commanders.iter().copied());
    let outcome = resolver.resolve_attack(grid, attack, seed)?;
    let forecast = JsonForecast {
        attacker: grid.unit(handle).map_or("?", |u| u.kind().name),
        defender: defender.kind().name,
        seed,
        outcome,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forecast)?),
        OutputFormat::Text => print!("{}", format_forecast(&forecast)),
    }
    Ok(())
}
