//! ASCII renderer for terminal viewing with ANSI colors.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::board::class::Faction;
use crate::board::grid::Grid;
use crate::board::point::{Direction, Point};
use crate::board::tile::Tile;

/// ANSI color codes for factions.
const FACTION_COLORS: [&str; 8] = [
    "\x1b[31m", // Faction 1: Red
    "\x1b[34m", // Faction 2: Blue
    "\x1b[32m", // Faction 3: Green
    "\x1b[33m", // Faction 4: Yellow
    "\x1b[35m", // Faction 5: Magenta
    "\x1b[36m", // Faction 6: Cyan
    "\x1b[91m", // Faction 7: Bright Red
    "\x1b[94m", // Faction 8: Bright Blue
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";
const OVERLAY: &str = "\x1b[93m";

const LEGEND: &str = "Legend: *=Reachable  !=Target  x=Danger  ↑→↓←=Route  ◆=Route end  lowercase/UPPER=Units\n";

/// Render the board as `viewer` sees it, with ANSI colors.
///
/// Output format:
/// ```text
/// Board 5x3  viewer 1
/// ┌───────────┐
/// │ . → → ◆ . │
/// │ * * t * ^ │
/// │ . w . ! C │
/// └───────────┘
///
/// Legend: ...
///
/// Faction 1 (Red):   Units: 1  Properties: 0
/// ```
#[must_use]
pub fn render_ascii(grid: &Grid, viewer: Faction) -> String {
    render(grid, viewer, true)
}

/// [`render_ascii`] without color codes.
#[must_use]
pub fn render_plain(grid: &Grid, viewer: Faction) -> String {
    render(grid, viewer, false)
}

fn render(grid: &Grid, viewer: Faction, color: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Board {}x{}  viewer {viewer}", grid.width(), grid.height());
    render_map(&mut output, grid, viewer, color);
    output.push('\n');
    output.push_str(LEGEND);
    output.push('\n');
    render_faction_stats(&mut output, grid, color);
    output
}

/// Render the map rows inside a box.
fn render_map(output: &mut String, grid: &Grid, viewer: Faction, color: bool) {
    let inner = usize::from(grid.width().unsigned_abs()) * 2 + 1;
    output.push('┌');
    output.push_str(&"─".repeat(inner));
    output.push_str("┐\n");

    for y in 0..grid.height() {
        output.push_str("│ ");
        for x in 0..grid.width() {
            match grid.tile_at(Point::new(x, y)) {
                Ok(tile) => render_tile(output, grid, tile, viewer, color),
                Err(_) => output.push('?'),
            }
            output.push(' ');
        }
        output.push_str("│\n");
    }

    output.push('└');
    output.push_str(&"─".repeat(inner));
    output.push_str("┘\n");
}

/// Glyph priority: visible unit, route arrow, target, reachable, danger,
/// terrain.
fn render_tile(output: &mut String, grid: &Grid, tile: &Tile, viewer: Faction, color: bool) {
    let visible_unit = tile
        .unit()
        .and_then(|h| grid.unit(h))
        .filter(|unit| unit.faction() == viewer || tile.occupant_visible());
    if let Some(unit) = visible_unit {
        let paint = if unit.faction() == viewer { BOLD } else { "" };
        push_glyph(output, unit.kind().symbol, &[paint, faction_color(unit.faction())], color);
        return;
    }

    let overlay = match (tile.arrow_from(), tile.arrow_to()) {
        (_, to) if to.is_some() => Some(arrow_glyph(to)),
        (from, Direction::None) if from.is_some() => Some('◆'),
        _ if tile.target_flag() || tile.attack_flag() => Some('!'),
        _ if tile.move_flag() => Some('*'),
        _ if tile.danger_flag() => Some('x'),
        _ => None,
    };
    if let Some(glyph) = overlay {
        push_glyph(output, glyph, &[OVERLAY], color);
        return;
    }

    let symbol = tile.terrain().kind().symbol;
    let paint = match tile.owner() {
        _ if tile.hidden_flag() => DIM,
        Some(owner) => faction_color(owner),
        None => GRAY,
    };
    push_glyph(output, symbol, &[paint], color);
}

fn push_glyph(output: &mut String, glyph: char, paints: &[&str], color: bool) {
    if color {
        for paint in paints {
            output.push_str(paint);
        }
        output.push(glyph);
        output.push_str(RESET);
    } else {
        output.push(glyph);
    }
}

const fn arrow_glyph(direction: Direction) -> char {
    match direction {
        Direction::Up => '↑',
        Direction::Right => '→',
        Direction::Down => '↓',
        Direction::Left => '←',
        Direction::None => '·',
    }
}

/// Get ANSI color for a faction.
fn faction_color(faction: Faction) -> &'static str {
    let idx = usize::from(faction).saturating_sub(1);
    FACTION_COLORS.get(idx).copied().unwrap_or(WHITE)
}

/// Faction display names.
const FACTION_NAMES: [&str; 8] = ["Red", "Blue", "Green", "Yellow", "Magenta", "Cyan", "B.Red", "B.Blue"];

/// Per-faction unit and property counts.
fn render_faction_stats(output: &mut String, grid: &Grid, color: bool) {
    let mut stats: BTreeMap<Faction, (usize, usize)> = BTreeMap::new();
    for (_, unit) in grid.roster().iter() {
        stats.entry(unit.faction()).or_default().0 += 1;
    }
    for tile in grid.tiles() {
        if let Some(owner) = tile.owner() {
            stats.entry(owner).or_default().1 += 1;
        }
    }
    for (faction, (units, properties)) in stats {
        let name = FACTION_NAMES
            .get(usize::from(faction).saturating_sub(1))
            .copied()
            .unwrap_or("Other");
        let (start, end) = if color { (faction_color(faction), RESET) } else { ("", "") };
        let _ = writeln!(
            output,
            "{start}Faction {faction} ({name}):{end}  Units: {units}  Properties: {properties}"
        );
    }
}
