//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use serde::Serialize;
use wargrid::{CombatOutcome, MoveOutcome, Point};

/// JSON-serializable route result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRoute {
    /// Route tiles, origin first.
    pub(super) route: Vec<Point>,
    /// Summed movement cost.
    pub(super) cost: u16,
    /// Movement budget of the unit.
    pub(super) budget: u8,
    /// What happened when the route was committed.
    pub(super) outcome: Option<MoveOutcome>,
}

/// JSON-serializable attack forecast.
#[derive(Debug, Serialize)]
pub(super) struct JsonForecast {
    /// Attacker archetype name.
    pub(super) attacker: &'static str,
    /// Defender archetype name.
    pub(super) defender: &'static str,
    /// Luck seed used.
    pub(super) seed: u64,
    /// Damage both ways.
    #[serde(flatten)]
    pub(super) outcome: CombatOutcome,
}

/// Format a route as human-readable text.
pub(super) fn format_route(route: &JsonRoute) -> String {
    let mut output = String::new();
    let steps: Vec<String> = route.route.iter().map(ToString::to_string).collect();
    let _ = writeln!(output, "Route: {}", steps.join(" -> "));
    let _ = writeln!(output, "  Cost: {}/{}", route.cost, route.budget);
    match route.outcome {
        Some(MoveOutcome::Arrived { at, fuel_spent }) => {
            let _ = writeln!(output, "  Arrived at {at} (fuel -{fuel_spent})");
        }
        Some(MoveOutcome::Ambushed {
            at,
            ambusher,
            fuel_spent,
        }) => {
            let _ = writeln!(output, "  Ambushed by {ambusher}, stopped at {at} (fuel -{fuel_spent})");
        }
        None => {}
    }
    output
}

/// Format an attack forecast as human-readable text.
pub(super) fn format_forecast(forecast: &JsonForecast) -> String {
    let outcome = &forecast.outcome;
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} attacks {} with {:?} (seed: {})",
        forecast.attacker, forecast.defender, outcome.method, forecast.seed
    );
    let _ = writeln!(output, "  Forecast: {} damage, {} counter", outcome.estimate_damage, outcome.estimate_counter);
    let _ = writeln!(output, "  Actual:   {} damage, {} counter", outcome.damage, outcome.counter);
    if outcome.counter_method == wargrid::board::AttackMethod::None {
        output.push_str("  No counter-attack\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use wargrid::board::AttackMethod;

    #[test]
    fn test_format_route() {
        let route = JsonRoute {
            route: vec![Point::new(0, 0), Point::new(1, 0)],
            cost: 1,
            budget: 3,
            outcome: Some(MoveOutcome::Arrived {
                at: Point::new(1, 0),
                fuel_spent: 1,
            }),
        };
        let text = format_route(&route);
        assert!(text.contains("(0, 0) -> (1, 0)"));
        assert!(text.contains("Cost: 1/3"));
        assert!(text.contains("Arrived at (1, 0)"));
    }

    #[test]
    fn test_forecast_json_is_flat() {
        let forecast = JsonForecast {
            attacker: "Tank",
            defender: "Infantry",
            seed: 3,
            outcome: CombatOutcome {
                method: AttackMethod::Secondary,
                counter_method: AttackMethod::None,
                damage: 70,
                counter: 0,
                estimate_damage: 72,
                estimate_counter: 0,
            },
        };
        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["estimate_damage"], 72);
        assert!(format_forecast(&forecast).contains("No counter-attack"));
    }
}
