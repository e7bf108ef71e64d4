//! Scenario validation command implementation.

use super::{CliError, load_scenario};
use std::path::Path;
use wargrid::board::check_invariants;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or violates a board
/// invariant.
pub(crate) fn execute(scenario: &Path) -> Result<(), CliError> {
    println!("Validating: {}", scenario.display());
    println!();

    let loaded = load_scenario(scenario);
    print_check("Scenario loads", loaded.is_ok());
    let loaded = loaded?;
    let grid = &loaded.grid;

    let violations = check_invariants(grid);
    print_check("Board invariants", violations.is_empty());
    for violation in &violations {
        println!("      {}", violation.message);
    }
    if !violations.is_empty() {
        return Err(CliError::new(format!("{} invariant violation(s)", violations.len())));
    }

    let illegal: Vec<_> = grid
        .points()
        .filter(|&p| {
            let terrain = grid.tile_at(p).map(|t| t.terrain());
            let around = grid.terrain_neighbors_at(p);
            matches!((terrain, around), (Ok(t), Ok(n)) if !t.legal_at(&n))
        })
        .collect();
    print_check("Terrain adjacency", illegal.is_empty());
    for point in &illegal {
        println!("      terrain at {point} does not fit its neighbours");
    }

    println!();
    println!("Summary:");
    println!("  Size:       {}x{}", grid.width(), grid.height());
    println!("  Units:      {}", grid.roster().len());
    println!("  Commanders: {}", loaded.commanders.len());

    println!();
    if illegal.is_empty() {
        println!("Validation successful!");
    } else {
        println!("Validation passed with adjacency warnings.");
    }

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
