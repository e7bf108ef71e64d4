#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wargrid::board::{TerrainId, Unit, UnitId, check_invariants};
use wargrid::{Grid, Point};

/// A single board mutation.
#[derive(Arbitrary, Debug)]
enum Op {
    Terrain { at: (u8, u8), terrain: u8 },
    Owner { at: (u8, u8), owner: Option<u8> },
    Spawn { at: (u8, u8), kind: u8, faction: u8 },
    Remove { at: (u8, u8) },
    Move { from: (u8, u8), to: (u8, u8) },
    Load { passenger: (u8, u8), carrier: (u8, u8) },
    Unload { carrier: (u8, u8), index: u8, to: (u8, u8) },
    Join { from: (u8, u8), to: (u8, u8) },
    Capture { at: (u8, u8) },
    Strike { at: (u8, u8), damage: u8 },
    Fog { viewer: u8 },
    ClearFog,
    Reveal { at: (u8, u8) },
}

/// Structured input for board fuzzing.
#[derive(Arbitrary, Debug)]
struct BoardInput {
    width: u8,
    height: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: BoardInput| {
    let width = i16::from(input.width % 10) + 1;
    let height = i16::from(input.height % 10) + 1;
    let Ok(mut grid) = Grid::new(width, height) else { return };
    // Border coordinates are addressable; let some ops hit them.
    let at = |(x, y): (u8, u8)| Point::new(i16::from(x) % (width + 2) - 1, i16::from(y) % (height + 2) - 1);

    for op in input.ops.iter().take(64) {
        // Errors are contract violations the caller is told about; the board
        // must stay consistent either way.
        let _ = match *op {
            Op::Terrain { at: p, terrain } => {
                grid.set_terrain(at(p), TerrainId::ALL[usize::from(terrain) % TerrainId::ALL.len()])
            }
            Op::Owner { at: p, owner } => grid.set_owner(at(p), owner.map(|f| f % 5)),
            Op::Spawn { at: p, kind, faction } => {
                let id = UnitId::ALL[usize::from(kind) % UnitId::ALL.len()];
                grid.spawn(Unit::new(id, faction % 4 + 1), at(p)).map(drop)
            }
            Op::Remove { at: p } => {
                grid.remove_unit(at(p));
                Ok(())
            }
            Op::Move { from, to } => grid.move_unit(at(from), at(to)).map(drop),
            Op::Load { passenger, carrier } => grid.load_unit(at(passenger), at(carrier)),
            Op::Unload { carrier, index, to } => grid.unload_unit(at(carrier), usize::from(index % 3), at(to)).map(drop),
            Op::Join { from, to } => grid.join_units(at(from), at(to)),
            Op::Capture { at: p } => grid.capture(at(p)).map(drop),
            Op::Strike { at: p, damage } => grid.strike_terrain(at(p), damage).map(drop),
            Op::Fog { viewer } => {
                grid.apply_fog(viewer % 4 + 1);
                Ok(())
            }
            Op::ClearFog => {
                grid.clear_fog();
                Ok(())
            }
            Op::Reveal { at: p } => {
                grid.reveal(at(p));
                Ok(())
            }
        };
        let violations = check_invariants(&grid);
        assert!(violations.is_empty(), "Invariants violated after {op:?}: {violations:?}");
    }
});
