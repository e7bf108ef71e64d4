//! The board: a bordered array of tiles plus the roster of units on it.

mod fog;

use tracing::debug;

use crate::board::class::Faction;
use crate::board::point::{Direction, Neighborhood, Point};
use crate::board::terrain::{TerrainExtra, TerrainId};
use crate::board::tile::{MAX_TILE_COORD, Tile};
use crate::board::unit::{CAPTURE_GOAL, MAX_HP, Roster, Unit, UnitHandle};
use crate::error::{BoardError, Result};
use crate::pathfind::search::{Flow, breadth_first};

/// Largest logical width or height.
pub const MAX_SIDE: i16 = MAX_TILE_COORD + 1;

const VOID_INSIDE: BoardError = BoardError::InvalidOperation("void terrain is reserved for the border");

/// The game board.
///
/// Logical tiles occupy `[0, width) x [0, height)`. A ring of Void tiles
/// surrounds them so every coordinate in `[-1, width] x [-1, height]`
/// resolves to a real tile, which lets adjacency code sample off-map cells
/// without bounds branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i16,
    height: i16,
    /// Row-major, `(width + 2) * (height + 2)`, border included.
    tiles: Vec<Tile>,
    roster: Roster,
}

impl Grid {
    /// A grid of Plain tiles inside a Void border.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] unless both sides are in
    /// `1..=MAX_SIDE`.
    pub fn new(width: i16, height: i16) -> Result<Self> {
        Self::filled(width, height, TerrainId::Plain)
    }

    /// A grid whose logical tiles are all `terrain`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] unless both sides are in
    /// `1..=MAX_SIDE` and [`BoardError::InvalidOperation`] for Void.
    pub fn filled(width: i16, height: i16, terrain: TerrainId) -> Result<Self> {
        if !(1..=MAX_SIDE).contains(&width) || !(1..=MAX_SIDE).contains(&height) {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        if terrain == TerrainId::Void {
            return Err(VOID_INSIDE);
        }
        let mut tiles = Vec::with_capacity(usize::from(width.unsigned_abs() + 2) * usize::from(height.unsigned_abs() + 2));
        for y in -1..=height {
            for x in -1..=width {
                let border = x < 0 || y < 0 || x == width || y == height;
                let id = if border { TerrainId::Void } else { terrain };
                tiles.push(Tile::new(id, Point::new(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
            roster: Roster::default(),
        })
    }

    /// Build from rows of terrain glyphs (see [`TerrainKind::symbol`]).
    ///
    /// [`TerrainKind::symbol`]: crate::board::terrain::TerrainKind::symbol
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidDimensions`] for ragged or empty rows and
    /// [`BoardError::InvalidOperation`] for an unknown or Void glyph.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = i16::try_from(rows.len()).unwrap_or(i16::MAX);
        let width = rows
            .first()
            .map_or(0, |row| i16::try_from(row.chars().count()).unwrap_or(i16::MAX));
        let mut grid = Self::new(width, height)?;
        for (y, row) in (0..height).zip(rows) {
            if row.chars().count() != width.unsigned_abs() as usize {
                return Err(BoardError::InvalidDimensions { width, height });
            }
            for (x, symbol) in (0..width).zip(row.chars()) {
                let terrain =
                    TerrainId::from_symbol(symbol).ok_or(BoardError::InvalidOperation("unknown terrain glyph"))?;
                grid.set_terrain(Point::new(x, y), terrain)?;
            }
        }
        Ok(grid)
    }

    /// Logical width.
    #[must_use]
    pub const fn width(&self) -> i16 {
        self.width
    }

    /// Logical height.
    #[must_use]
    pub const fn height(&self) -> i16 {
        self.height
    }

    /// Number of logical tiles.
    #[must_use]
    pub fn area(&self) -> usize {
        usize::from(self.width.unsigned_abs()) * usize::from(self.height.unsigned_abs())
    }

    /// Units standing on the board.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Every tile, border included, row-major.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Whether `point` lies inside the logical, non-border region.
    #[must_use]
    pub const fn valid_point(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }

    /// Logical points, row-major.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    /// Position of `point` in [`Grid::tiles`].
    pub(crate) fn tile_index(&self, point: Point) -> Option<usize> {
        let inside = (-1..=self.width).contains(&point.x) && (-1..=self.height).contains(&point.y);
        inside.then(|| {
            let stride = usize::from((self.width + 2).unsigned_abs());
            usize::from((point.y + 1).unsigned_abs()) * stride + usize::from((point.x + 1).unsigned_abs())
        })
    }

    fn out_of_bounds(&self, point: Point) -> BoardError {
        BoardError::OutOfBounds {
            point,
            width: self.width,
            height: self.height,
        }
    }

    fn require_valid(&self, point: Point) -> Result<()> {
        if self.valid_point(point) {
            Ok(())
        } else {
            Err(self.out_of_bounds(point))
        }
    }

    /// The tile at `point`; border coordinates return Void tiles.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] outside `[-1, width] x [-1, height]`.
    pub fn tile_at(&self, point: Point) -> Result<&Tile> {
        match self.tile_index(point) {
            Some(i) => Ok(&self.tiles[i]),
            None => Err(self.out_of_bounds(point)),
        }
    }

    /// Mutable access to the tile at `point`.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] outside `[-1, width] x [-1, height]`.
    pub fn tile_at_mut(&mut self, point: Point) -> Result<&mut Tile> {
        match self.tile_index(point) {
            Some(i) => Ok(&mut self.tiles[i]),
            None => Err(self.out_of_bounds(point)),
        }
    }

    /// The 3x3 block of tiles around a logical point.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] unless `point` is a valid logical point.
    pub fn neighbors_at(&self, point: Point) -> Result<Neighborhood<&Tile>> {
        self.require_valid(point)?;
        // Every offset of a logical point lands inside the border ring.
        let fallback = &self.tiles[0];
        Ok(Neighborhood::from_fn(|dx, dy| {
            self.tile_at(point.offset(dx, dy)).unwrap_or(fallback)
        }))
    }

    /// The 3x3 block of terrain around a logical point.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] unless `point` is a valid logical point.
    pub fn terrain_neighbors_at(&self, point: Point) -> Result<Neighborhood<TerrainId>> {
        Ok(self.neighbors_at(point)?.map(Tile::terrain))
    }

    /// Replace the terrain of a logical tile.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for border or outside points and
    /// [`BoardError::InvalidOperation`] for Void.
    pub fn set_terrain(&mut self, point: Point, terrain: TerrainId) -> Result<()> {
        self.require_valid(point)?;
        if terrain == TerrainId::Void {
            return Err(VOID_INSIDE);
        }
        self.tile_at_mut(point)?.set_terrain(terrain);
        Ok(())
    }

    /// Set the owner of a property.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for border or outside points and
    /// [`BoardError::InvalidOperation`] when the terrain cannot be owned.
    pub fn set_owner(&mut self, point: Point, owner: Option<Faction>) -> Result<()> {
        self.require_valid(point)?;
        let tile = self.tile_at_mut(point)?;
        if !tile.terrain().kind().can_be_owned_by(owner) {
            return Err(BoardError::InvalidOperation("terrain cannot be owned"));
        }
        tile.set_owner(owner);
        Ok(())
    }

    /// Count tiles of `terrain` owned by `faction`.
    #[must_use]
    pub fn count_owned(&self, faction: Faction, terrain: TerrainId) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.terrain() == terrain && t.owner() == Some(faction))
            .count()
    }

    /// Handle of the unit standing at `point`.
    #[must_use]
    pub fn handle_at(&self, point: Point) -> Option<UnitHandle> {
        self.tile_at(point).ok().and_then(Tile::unit)
    }

    /// The unit standing at `point`.
    #[must_use]
    pub fn unit_at(&self, point: Point) -> Option<&Unit> {
        self.handle_at(point).and_then(|h| self.roster.get(h))
    }

    /// Look up a unit by handle.
    #[must_use]
    pub fn unit(&self, handle: UnitHandle) -> Option<&Unit> {
        self.roster.get(handle)
    }

    /// Look up a unit by handle, mutably.
    ///
    /// Position is not writable from outside the grid, so the tile and unit
    /// cannot disagree through this reference.
    pub fn unit_mut(&mut self, handle: UnitHandle) -> Option<&mut Unit> {
        self.roster.get_mut(handle)
    }

    fn require_unit(&self, point: Point) -> Result<UnitHandle> {
        self.tile_at(point)?;
        self.handle_at(point).ok_or(BoardError::NoUnit { point })
    }

    /// Mutable access to the unit standing at `point`.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `point` is empty and
    /// [`BoardError::OutOfBounds`] for bad coordinates.
    pub fn unit_at_mut(&mut self, point: Point) -> Result<&mut Unit> {
        let handle = self.require_unit(point)?;
        self.roster.get_mut(handle).ok_or(BoardError::StaleHandle)
    }

    /// Add a unit to the roster and place it on an empty logical tile.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for border or outside points,
    /// [`BoardError::Occupied`] if a unit already stands there.
    pub fn spawn(&mut self, unit: Unit, point: Point) -> Result<UnitHandle> {
        self.require_valid(point)?;
        if self.handle_at(point).is_some() {
            return Err(BoardError::Occupied { point });
        }
        let handle = self.roster.insert(unit);
        self.place_unit(handle, point)?;
        Ok(handle)
    }

    /// Put a roster unit at `point`, updating both sides of the link.
    ///
    /// Does not check legality; callers validate first. A unit already on
    /// the board is lifted off its previous tile.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for border or outside points,
    /// [`BoardError::StaleHandle`] if the handle is dead.
    pub fn place_unit(&mut self, handle: UnitHandle, point: Point) -> Result<()> {
        self.require_valid(point)?;
        let previous = self.roster.get(handle).ok_or(BoardError::StaleHandle)?.position();
        if let Some(old) = previous
            && let Ok(tile) = self.tile_at_mut(old)
            && tile.unit() == Some(handle)
        {
            tile.set_unit(None);
        }
        debug_assert!(
            self.handle_at(point).is_none_or(|h| h == handle),
            "placing over another unit at {point}"
        );
        self.tile_at_mut(point)?.set_unit(Some(handle));
        if let Some(unit) = self.roster.get_mut(handle) {
            unit.set_position(Some(point));
        }
        Ok(())
    }

    /// Take the unit at `point` off the board and out of the roster.
    ///
    /// Cargo leaves with its carrier.
    pub fn remove_unit(&mut self, point: Point) -> Option<Unit> {
        let handle = self.handle_at(point)?;
        if let Ok(tile) = self.tile_at_mut(point) {
            tile.set_unit(None);
        }
        let mut unit = self.roster.remove(handle)?;
        unit.set_position(None);
        debug!(?point, unit = unit.kind().name, "unit removed");
        Some(unit)
    }

    /// Move the unit at `src` to `dest`.
    ///
    /// Returns `Ok(false)` without changing anything when `dest` is not
    /// occupiable by the mover or physically holds another unit. Leaving a
    /// tile abandons any capture in progress.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `src` is empty and
    /// [`BoardError::OutOfBounds`] for bad coordinates.
    pub fn move_unit(&mut self, src: Point, dest: Point) -> Result<bool> {
        let handle = self.require_unit(src)?;
        let target = self.tile_at(dest)?;
        if src == dest {
            return Ok(true);
        }
        if !target.occupiable(handle, &self.roster) || target.unit().is_some() {
            return Ok(false);
        }
        self.place_unit(handle, dest)?;
        if let Some(unit) = self.roster.get_mut(handle) {
            unit.set_capture(0);
        }
        Ok(true)
    }

    /// Board the unit at `passenger` onto the orthogonally adjacent
    /// transport at `carrier`.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when either tile is empty and
    /// [`BoardError::InvalidOperation`] when the two are not neighbours or
    /// the carrier refuses.
    pub fn load_unit(&mut self, passenger: Point, carrier: Point) -> Result<()> {
        let rider = self.require_unit(passenger)?;
        let transport = self.require_unit(carrier)?;
        if rider == transport {
            return Err(BoardError::InvalidOperation("a unit cannot board itself"));
        }
        if passenger.manhattan(carrier) != 1 {
            return Err(BoardError::InvalidOperation("passenger must stand next to the carrier"));
        }
        let allowed = match (self.roster.get(transport), self.roster.get(rider)) {
            (Some(t), Some(r)) => t.can_load(r),
            _ => return Err(BoardError::StaleHandle),
        };
        if !allowed {
            return Err(BoardError::InvalidOperation("carrier cannot take this unit"));
        }
        let mut unit = self.remove_unit(passenger).ok_or(BoardError::StaleHandle)?;
        unit.set_orderable(false);
        unit.set_capture(0);
        self.unit_at_mut(carrier)?
            .load(unit)
            .map_err(|_| BoardError::InvalidOperation("carrier cannot take this unit"))
    }

    /// Tiles where cargo `index` of the transport at `carrier` could be
    /// dropped: empty orthogonal neighbours its movement class can enter.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `carrier` is empty and
    /// [`BoardError::InvalidOperation`] for a bad cargo index.
    pub fn unload_positions(&self, carrier: Point, index: usize) -> Result<Vec<Point>> {
        let handle = self.require_unit(carrier)?;
        let transport = self.roster.get(handle).ok_or(BoardError::StaleHandle)?;
        let cargo = transport
            .cargo()
            .get(index)
            .ok_or(BoardError::InvalidOperation("no cargo in that slot"))?;
        let class = cargo.kind().movement_class;
        Ok(carrier
            .orthogonal()
            .into_iter()
            .filter(|&p| self.valid_point(p))
            .filter(|&p| {
                self.tile_at(p)
                    .is_ok_and(|t| t.unit().is_none() && t.movement_cost(class) > 0)
            })
            .collect())
    }

    /// Drop cargo `index` from the transport at `carrier` onto `dest`.
    ///
    /// The unloaded unit cannot act again this turn.
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidOperation`] unless `dest` is one of
    /// [`Grid::unload_positions`].
    pub fn unload_unit(&mut self, carrier: Point, index: usize, dest: Point) -> Result<UnitHandle> {
        if !self.unload_positions(carrier, index)?.contains(&dest) {
            return Err(BoardError::InvalidOperation("cannot unload there"));
        }
        let mut cargo = self
            .unit_at_mut(carrier)?
            .take_cargo(index)
            .ok_or(BoardError::InvalidOperation("no cargo in that slot"))?;
        cargo.set_orderable(false);
        self.spawn(cargo, dest)
    }

    /// Merge the unit at `src` into the same-kind unit at `dest`, which must
    /// be an orthogonal neighbour.
    ///
    /// HP, fuel and ammo are summed and clamped; the source is destroyed.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when either tile is empty and
    /// [`BoardError::InvalidOperation`] when the pair cannot join.
    pub fn join_units(&mut self, src: Point, dest: Point) -> Result<()> {
        let from = self.require_unit(src)?;
        let into = self.require_unit(dest)?;
        if src.manhattan(dest) != 1 {
            return Err(BoardError::InvalidOperation("units must be adjacent to join"));
        }
        let (a, b) = match (self.roster.get(from), self.roster.get(into)) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(BoardError::StaleHandle),
        };
        if from == into || a.id() != b.id() || a.faction() != b.faction() {
            return Err(BoardError::InvalidOperation("only identical allied units can join"));
        }
        if b.hp() >= MAX_HP || !a.cargo().is_empty() {
            return Err(BoardError::InvalidOperation("join target is full"));
        }
        let (hp, fuel, ammo, rank) = (
            i32::from(a.hp()) + i32::from(b.hp()),
            i32::from(a.fuel()) + i32::from(b.fuel()),
            i32::from(a.ammo()) + i32::from(b.ammo()),
            a.rank().max(b.rank()),
        );
        let co = a.co_aboard() || b.co_aboard();
        self.remove_unit(src);
        let merged = self.roster.get_mut(into).ok_or(BoardError::StaleHandle)?;
        merged.set_hp(hp);
        merged.set_fuel(fuel);
        merged.set_ammo(ammo);
        merged.set_rank(i32::from(rank));
        merged.set_co_aboard(co);
        merged.set_orderable(false);
        Ok(())
    }

    /// Advance the capture of the property under the unit at `point`.
    ///
    /// Progress grows by the unit's displayed HP; at 20 the property changes
    /// hands and progress resets. Returns `true` when ownership flipped.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `point` is empty and
    /// [`BoardError::InvalidOperation`] when the unit or tile cannot capture.
    pub fn capture(&mut self, point: Point) -> Result<bool> {
        let handle = self.require_unit(point)?;
        let tile = self.tile_at(point)?;
        let unit = self.roster.get(handle).ok_or(BoardError::StaleHandle)?;
        if !unit.kind().can_capture() {
            return Err(BoardError::InvalidOperation("unit cannot capture"));
        }
        if !tile.terrain().kind().ownable || tile.owner() == Some(unit.faction()) {
            return Err(BoardError::InvalidOperation("nothing to capture here"));
        }
        let faction = unit.faction();
        let progress = unit.capture() + unit.display_hp();
        let flipped = progress >= CAPTURE_GOAL;

        let unit = self.roster.get_mut(handle).ok_or(BoardError::StaleHandle)?;
        unit.set_capture(if flipped { 0 } else { i32::from(progress) });
        unit.set_orderable(false);
        if flipped {
            self.tile_at_mut(point)?.set_owner(Some(faction));
            debug!(?point, faction, "property captured");
        }
        Ok(flipped)
    }

    /// Refill fuel and ammo of the unit at `point`.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `point` is empty.
    pub fn resupply(&mut self, point: Point) -> Result<()> {
        self.unit_at_mut(point)?.resupply();
        Ok(())
    }

    /// Heal the unit at `point` by `amount` HP, clamped to full health.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoUnit`] when `point` is empty.
    pub fn repair(&mut self, point: Point, amount: u8) -> Result<()> {
        let unit = self.unit_at_mut(point)?;
        unit.set_hp(i32::from(unit.hp()) + i32::from(amount));
        Ok(())
    }

    /// Damage a terrain structure.
    ///
    /// A Meteor whose charge runs out turns into Wasteland, and so does every
    /// Plasma tile connected to it. Returns `true` when the structure fell.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for bad points and
    /// [`BoardError::InvalidOperation`] when the tile is not a structure.
    pub fn strike_terrain(&mut self, point: Point, damage: u8) -> Result<bool> {
        self.require_valid(point)?;
        let tile = self.tile_at_mut(point)?;
        let terrain = tile.terrain();
        if !terrain.kind().is_structure() {
            return Err(BoardError::InvalidOperation("not a terrain structure"));
        }
        let remaining = match tile.extra() {
            Some(TerrainExtra::Charge { remaining }) => remaining.saturating_sub(damage),
            _ => 0,
        };
        if remaining > 0 {
            tile.set_extra(Some(TerrainExtra::Charge { remaining }));
            return Ok(false);
        }
        tile.set_terrain(TerrainId::Wasteland);
        tile.set_extra(Some(TerrainExtra::Wasteland { previous: terrain }));

        let stats = breadth_first(
            self,
            point,
            |grid, &p| p == point || grid.tile_at(p).is_ok_and(|t| t.terrain() == TerrainId::Plasma),
            |grid, p, frontier| {
                if let Ok(tile) = grid.tile_at_mut(p)
                    && tile.terrain() == TerrainId::Plasma
                {
                    tile.set_terrain(TerrainId::Wasteland);
                    tile.set_extra(Some(TerrainExtra::Wasteland {
                        previous: TerrainId::Plasma,
                    }));
                }
                frontier.extend(p.orthogonal());
                Flow::Continue
            },
        );
        debug!(?point, cleared = stats.visited - 1, "structure destroyed");
        Ok(true)
    }

    /// Reset per-search flags and temp values on every tile.
    pub fn clear_search(&mut self) {
        for tile in &mut self.tiles {
            tile.clear_search();
        }
    }

    /// Drop the current selection: search flags, target flags and arrows.
    pub fn clear_selection(&mut self) {
        for tile in &mut self.tiles {
            tile.clear_search();
            tile.clear_arrows();
            tile.set_target_flag(false);
        }
    }

    /// Reset all scratch state except fog.
    pub fn clear_scratch(&mut self) {
        self.clear_selection();
        for tile in &mut self.tiles {
            tile.set_danger_flag(false);
        }
    }

    /// Direction codes of the route arrows at `point`, `(from, to)`.
    #[must_use]
    pub fn arrows_at(&self, point: Point) -> (Direction, Direction) {
        self.tile_at(point)
            .map_or((Direction::None, Direction::None), |t| (t.arrow_from(), t.arrow_to()))
    }
}
