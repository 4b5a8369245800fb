#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for Wormgrid.
//!
//! The world owns the grid of cells and every player's worms. Commands are
//! executed strictly one at a time through [`apply`], which re-validates
//! against the state as it exists at that instant. Positional conflicts
//! between worms acting in the same round therefore resolve by execution
//! order alone: the first relocation claims the cell and the later one
//! fails its occupancy check.

use std::fmt;

use wormgrid_core::{
    CellKind, Command, CommandError, Event, Health, PlayerId, Point, WormId, WormProfile,
};

/// One grid location holding terrain and an optional occupant reference.
///
/// The occupant is recorded by id only; the cell never owns the worm. At
/// most one occupant sits in a cell, and that worm's recorded position
/// always equals the cell's coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    kind: CellKind,
    occupant: Option<WormId>,
}

impl Cell {
    const fn from_terrain(kind: CellKind) -> Self {
        Self {
            kind,
            occupant: None,
        }
    }

    /// Terrain currently occupying the cell.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Worm currently sitting in the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<WormId> {
        self.occupant
    }

    /// Reports whether any worm currently sits in the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// A combatant occupying one cell of the battlefield.
#[derive(Clone, Debug)]
pub struct Worm {
    id: WormId,
    health: Health,
    position: Point,
    previous_position: Point,
    last_moved: Option<u32>,
    profile: WormProfile,
}

impl Worm {
    /// Creates a worm at its spawn position with the provided capabilities.
    #[must_use]
    pub const fn new(id: WormId, health: Health, position: Point, profile: WormProfile) -> Self {
        Self {
            id,
            health,
            position,
            previous_position: position,
            last_moved: None,
            profile,
        }
    }

    /// Identifier assigned to the worm.
    #[must_use]
    pub const fn id(&self) -> WormId {
        self.id
    }

    /// Remaining hitpoints of the worm.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Cell the worm currently occupies.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Cell the worm vacated in its last successful relocation.
    ///
    /// Equals the current position until the worm first relocates.
    #[must_use]
    pub const fn previous_position(&self) -> Point {
        self.previous_position
    }

    /// Round of the worm's last successful relocation, if it ever moved.
    #[must_use]
    pub const fn last_moved(&self) -> Option<u32> {
        self.last_moved
    }

    /// Capability constants governing the worm's commands.
    #[must_use]
    pub const fn profile(&self) -> WormProfile {
        self.profile
    }

    /// Reports whether the worm can still act.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

/// A participant fielding one or more worms.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    worms: Vec<Worm>,
}

impl Player {
    /// Creates a player owning the provided worms.
    #[must_use]
    pub fn new(id: PlayerId, worms: Vec<Worm>) -> Self {
        Self { id, worms }
    }

    /// Identifier assigned to the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Worms fielded by the player.
    #[must_use]
    pub fn worms(&self) -> &[Worm] {
        &self.worms
    }
}

/// Errors fatal to battlefield construction.
///
/// Construction input comes from an external collaborator; a malformed
/// setup is surfaced immediately and never deferred into the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The terrain sequence length does not match the grid dimensions.
    CellCountMismatch {
        /// Cell count implied by the grid dimensions.
        expected: usize,
        /// Cell count actually supplied.
        actual: usize,
    },
    /// Two worms in the player list share an identifier.
    DuplicateWorm(WormId),
    /// A worm's spawn position lies outside the grid.
    SpawnOutOfBounds {
        /// Identifier of the misplaced worm.
        worm: WormId,
        /// Spawn position that falls off the grid.
        position: Point,
    },
    /// Two worms would spawn in the same cell.
    SpawnConflict {
        /// Identifier of the later worm contesting the cell.
        worm: WormId,
        /// Cell already claimed by an earlier worm.
        position: Point,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellCountMismatch { expected, actual } => {
                write!(
                    f,
                    "terrain sequence holds {actual} cells but the grid needs {expected}"
                )
            }
            Self::DuplicateWorm(worm) => {
                write!(f, "worm id {} appears more than once", worm.get())
            }
            Self::SpawnOutOfBounds { worm, position } => {
                write!(
                    f,
                    "worm {} spawns at ({}, {}) outside the grid",
                    worm.get(),
                    position.x(),
                    position.y()
                )
            }
            Self::SpawnConflict { worm, position } => {
                write!(
                    f,
                    "worm {} spawns at ({}, {}) which is already taken",
                    worm.get(),
                    position.x(),
                    position.y()
                )
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Represents the authoritative Wormgrid battlefield state.
#[derive(Clone, Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
    players: Vec<Player>,
}

impl World {
    /// Creates a battlefield from a player list, grid dimensions, and a
    /// flat row-major terrain sequence.
    ///
    /// Every worm is seated into its spawn cell so the occupancy invariant
    /// holds from round zero.
    pub fn new(
        players: Vec<Player>,
        columns: u32,
        rows: u32,
        terrain: Vec<CellKind>,
    ) -> Result<Self, MapError> {
        let expected_u64 = u64::from(columns) * u64::from(rows);
        let expected = usize::try_from(expected_u64).unwrap_or(usize::MAX);
        if terrain.len() != expected {
            return Err(MapError::CellCountMismatch {
                expected,
                actual: terrain.len(),
            });
        }

        let mut world = Self {
            columns,
            rows,
            cells: terrain.into_iter().map(Cell::from_terrain).collect(),
            players,
        };
        world.seat_worms()?;
        Ok(world)
    }

    fn seat_worms(&mut self) -> Result<(), MapError> {
        let placements: Vec<(WormId, Point)> = self
            .players
            .iter()
            .flat_map(|player| player.worms().iter().map(|worm| (worm.id(), worm.position())))
            .collect();

        let mut seen: Vec<WormId> = Vec::with_capacity(placements.len());
        for (worm, position) in placements {
            if seen.contains(&worm) {
                return Err(MapError::DuplicateWorm(worm));
            }
            seen.push(worm);

            let Some(index) = self.index_of(position) else {
                return Err(MapError::SpawnOutOfBounds { worm, position });
            };
            if self.cells[index].occupant.is_some() {
                return Err(MapError::SpawnConflict { worm, position });
            }
            self.cells[index].occupant = Some(worm);
        }
        Ok(())
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Retrieves the cell at the provided coordinates.
    #[must_use]
    pub fn cell(&self, position: Point) -> Option<&Cell> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    /// Retrieves the cell at the provided flat row-major index.
    ///
    /// Agrees with [`World::cell`]: both accessors reach the same cell for
    /// coordinates related through [`World::index_of`].
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Maps coordinates to the flat row-major index of the same cell.
    #[must_use]
    pub fn index_of(&self, position: Point) -> Option<usize> {
        if position.x() < self.columns && position.y() < self.rows {
            let row = usize::try_from(position.y()).ok()?;
            let column = usize::try_from(position.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Looks up a worm by identifier.
    #[must_use]
    pub fn worm(&self, id: WormId) -> Option<&Worm> {
        self.players
            .iter()
            .flat_map(|player| player.worms().iter())
            .find(|worm| worm.id() == id)
    }

    /// Players participating in the match.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    fn worm_mut(&mut self, id: WormId) -> Option<&mut Worm> {
        self.players
            .iter_mut()
            .flat_map(|player| player.worms.iter_mut())
            .find(|worm| worm.id == id)
    }

    /// Reports whether a worm honouring the provided edge margin may stand
    /// at the position.
    fn in_play(&self, position: Point, margin: u32) -> bool {
        u64::from(position.x()) >= u64::from(margin)
            && u64::from(position.y()) >= u64::from(margin)
            && u64::from(position.x()) + u64::from(margin) < u64::from(self.columns)
            && u64::from(position.y()) + u64::from(margin) < u64::from(self.rows)
    }

    /// Moves a worm between cells, keeping the occupancy reference and the
    /// worm's positional bookkeeping in lockstep.
    ///
    /// Once construction has seated the worms, this is the only routine
    /// that touches a cell occupant or a worm position; command variants
    /// never set either field directly.
    fn relocate_worm(&mut self, id: WormId, destination: Point, round: u32) {
        let Some(origin) = self.worm(id).map(Worm::position) else {
            return;
        };
        if let Some(index) = self.index_of(origin) {
            self.cells[index].occupant = None;
        }
        if let Some(index) = self.index_of(destination) {
            self.cells[index].occupant = Some(id);
        }
        if let Some(worm) = self.worm_mut(id) {
            worm.previous_position = worm.position;
            worm.position = destination;
            worm.last_moved = Some(round);
        }
    }

    fn clear_terrain(&mut self, position: Point) {
        if let Some(index) = self.index_of(position) {
            self.cells[index].kind = CellKind::Air;
        }
    }
}

/// Checks a command against the battlefield state as it exists right now.
///
/// Validity is never cached across executions: a command that passed
/// earlier in the round may fail here once another command has run.
pub fn validate(world: &World, command: &Command) -> Result<(), CommandError> {
    match *command {
        Command::Teleport { worm, target } => {
            let actor = world.worm(worm).ok_or(CommandError::UnknownWorm(worm))?;
            if !actor.is_alive() {
                return Err(CommandError::WormDown(worm));
            }

            let origin = actor.position();
            let range = actor.profile().teleport_range();
            if origin.chebyshev_distance(target) > range {
                return Err(CommandError::OutOfRange {
                    origin,
                    target,
                    range,
                });
            }
            if !world.in_play(target, actor.profile().edge_margin()) {
                return Err(CommandError::OutOfBounds { target });
            }

            let cell = world
                .cell(target)
                .ok_or(CommandError::OutOfBounds { target })?;
            if !cell.kind().is_passable() {
                return Err(CommandError::Obstructed { target });
            }
            if cell.is_occupied() {
                return Err(CommandError::Occupied { target });
            }
            Ok(())
        }
        Command::Dig { worm, target } => {
            let actor = world.worm(worm).ok_or(CommandError::UnknownWorm(worm))?;
            if !actor.is_alive() {
                return Err(CommandError::WormDown(worm));
            }

            let origin = actor.position();
            let range = actor.profile().dig_range();
            if origin.chebyshev_distance(target) > range {
                return Err(CommandError::OutOfRange {
                    origin,
                    target,
                    range,
                });
            }

            // Digging reaches the border ring; the edge margin restricts
            // where a worm may stand, not what it may excavate.
            let cell = world
                .cell(target)
                .ok_or(CommandError::OutOfBounds { target })?;
            if !cell.kind().is_diggable() {
                return Err(CommandError::NothingToDig { target });
            }
            Ok(())
        }
        Command::Rest { worm } => {
            let actor = world.worm(worm).ok_or(CommandError::UnknownWorm(worm))?;
            if !actor.is_alive() {
                return Err(CommandError::WormDown(worm));
            }
            Ok(())
        }
    }
}

/// Boolean convenience over [`validate`].
#[must_use]
pub fn is_valid(world: &World, command: &Command) -> bool {
    validate(world, command).is_ok()
}

/// Applies the provided command to the world, mutating state and pushing
/// the resulting event.
///
/// Validation runs again immediately before the mutation; an invalid
/// command fails with its rejection reason and leaves the world untouched.
/// Callers must treat that failure as a contract violation, not as a
/// recoverable outcome to retry.
pub fn apply(
    world: &mut World,
    command: Command,
    round: u32,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    validate(world, &command)?;

    match command {
        Command::Teleport { worm, target } => {
            if let Some(actor) = world.worm(worm) {
                let from = actor.position();
                world.relocate_worm(worm, target, round);
                out_events.push(Event::WormTeleported {
                    worm,
                    from,
                    to: target,
                });
            }
        }
        Command::Dig { worm, target } => {
            world.clear_terrain(target);
            out_events.push(Event::CellDug { worm, target });
        }
        Command::Rest { worm } => {
            out_events.push(Event::WormRested { worm });
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Cell, World};
    use wormgrid_core::{Health, PlayerId, Point, WormId, WormProfile};

    /// Immutable representation of a single worm's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WormSnapshot {
        /// Identifier assigned to the worm.
        pub id: WormId,
        /// Player fielding the worm.
        pub player: PlayerId,
        /// Remaining hitpoints of the worm.
        pub health: Health,
        /// Cell the worm currently occupies.
        pub position: Point,
        /// Cell the worm vacated in its last successful relocation.
        pub previous_position: Point,
        /// Round of the worm's last successful relocation, if any.
        pub last_moved: Option<u32>,
        /// Capability constants governing the worm's commands.
        pub profile: WormProfile,
    }

    /// Read-only snapshot describing all worms on the battlefield.
    #[derive(Clone, Debug, Default)]
    pub struct WormView {
        snapshots: Vec<WormSnapshot>,
    }

    impl WormView {
        /// Iterator over the captured worm snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &WormSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<WormSnapshot> {
            self.snapshots
        }
    }

    /// Captures a read-only view of every worm, in ascending id order.
    #[must_use]
    pub fn worm_view(world: &World) -> WormView {
        let mut snapshots: Vec<WormSnapshot> = world
            .players()
            .iter()
            .flat_map(|player| {
                player.worms().iter().map(move |worm| WormSnapshot {
                    id: worm.id(),
                    player: player.id(),
                    health: worm.health(),
                    position: worm.position(),
                    previous_position: worm.previous_position(),
                    last_moved: worm.last_moved(),
                    profile: worm.profile(),
                })
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        WormView { snapshots }
    }

    /// Returns the worm occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, position: Point) -> Option<WormId> {
        world.cell(position).and_then(Cell::occupant)
    }
}
