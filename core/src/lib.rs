#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wormgrid engine.
//!
//! This crate defines the message surface that connects the authoritative
//! world, the round resolver, and adapters. Callers submit [`Command`]
//! values describing a worm's intent for the round, the world validates and
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what actually happened. Rejected commands
//! surface their [`CommandError`] reason instead of mutating state.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as x and y coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: u32,
    y: u32,
}

impl Point {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Chebyshev distance between two points.
    ///
    /// This is the metric used by relocation abilities: every cell of the
    /// square neighbourhood of radius `r` lies at distance `r` or less.
    #[must_use]
    pub fn chebyshev_distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Unique identifier assigned to a worm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WormId(u32);

impl WormId {
    /// Creates a new worm identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hitpoints of a worm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric hitpoint count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the worm is out of the fight.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Terrain occupying a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open space a worm can stand in.
    Air,
    /// Solid earth that blocks relocation but can be excavated.
    Dirt,
    /// Permanently impassable void beyond the battlefield proper.
    DeepSpace,
}

impl CellKind {
    /// Reports whether a worm may occupy a cell of this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Reports whether a dig command can convert this terrain to air.
    #[must_use]
    pub const fn is_diggable(self) -> bool {
        matches!(self, Self::Dirt)
    }
}

/// Capability constants supplied by worm configuration.
///
/// The engine owns these numbers, never the validation logic: rules read
/// the profile attached to the acting worm rather than baking in a radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WormProfile {
    teleport_range: u32,
    dig_range: u32,
    edge_margin: u32,
}

impl WormProfile {
    /// Profile of the commando worm type: single-cell relocation and
    /// excavation reach, forbidden from standing on the outermost ring.
    pub const COMMANDO: WormProfile = WormProfile::new(1, 1, 1);

    /// Creates a profile with explicit capability values.
    #[must_use]
    pub const fn new(teleport_range: u32, dig_range: u32, edge_margin: u32) -> Self {
        Self {
            teleport_range,
            dig_range,
            edge_margin,
        }
    }

    /// Maximum Chebyshev distance a relocation may cover.
    #[must_use]
    pub const fn teleport_range(&self) -> u32 {
        self.teleport_range
    }

    /// Maximum Chebyshev distance a dig may reach.
    #[must_use]
    pub const fn dig_range(&self) -> u32 {
        self.dig_range
    }

    /// Width of the outer border ring excluded from relocation targets.
    #[must_use]
    pub const fn edge_margin(&self) -> u32 {
        self.edge_margin
    }
}

/// Commands that express all permissible worm intents for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a worm relocate directly to the target cell.
    Teleport {
        /// Identifier of the worm attempting to relocate.
        worm: WormId,
        /// Destination cell of the relocation.
        target: Point,
    },
    /// Requests that a worm excavate the terrain at the target cell.
    Dig {
        /// Identifier of the worm doing the digging.
        worm: WormId,
        /// Cell whose terrain should be cleared.
        target: Point,
    },
    /// Declares that a worm takes no action this round.
    Rest {
        /// Identifier of the resting worm.
        worm: WormId,
    },
}

impl Command {
    /// Creates a relocation command aimed at the provided point.
    #[must_use]
    pub const fn teleport(worm: WormId, target: Point) -> Self {
        Self::Teleport { worm, target }
    }

    /// Creates a relocation command from raw coordinates.
    ///
    /// Equivalent to [`Command::teleport`] with `Point::new(x, y)`.
    #[must_use]
    pub const fn teleport_at(worm: WormId, x: u32, y: u32) -> Self {
        Self::Teleport {
            worm,
            target: Point::new(x, y),
        }
    }

    /// Creates an excavation command aimed at the provided point.
    #[must_use]
    pub const fn dig(worm: WormId, target: Point) -> Self {
        Self::Dig { worm, target }
    }

    /// Creates an excavation command from raw coordinates.
    ///
    /// Equivalent to [`Command::dig`] with `Point::new(x, y)`.
    #[must_use]
    pub const fn dig_at(worm: WormId, x: u32, y: u32) -> Self {
        Self::Dig {
            worm,
            target: Point::new(x, y),
        }
    }

    /// Creates a do-nothing command for the provided worm.
    #[must_use]
    pub const fn rest(worm: WormId) -> Self {
        Self::Rest { worm }
    }

    /// Identifier of the worm that issued the command.
    #[must_use]
    pub const fn issuer(&self) -> WormId {
        match self {
            Self::Teleport { worm, .. } | Self::Dig { worm, .. } | Self::Rest { worm } => *worm,
        }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a worm relocated between two cells.
    WormTeleported {
        /// Identifier of the worm that relocated.
        worm: WormId,
        /// Cell the worm vacated.
        from: Point,
        /// Cell the worm occupies after the relocation.
        to: Point,
    },
    /// Confirms that a cell's terrain was excavated to open air.
    CellDug {
        /// Identifier of the worm that dug.
        worm: WormId,
        /// Cell whose terrain was cleared.
        target: Point,
    },
    /// Confirms that a worm spent the round without acting.
    WormRested {
        /// Identifier of the resting worm.
        worm: WormId,
    },
    /// Reports that a worm's command was rejected during resolution.
    CommandRejected {
        /// Identifier of the worm whose command failed.
        worm: WormId,
        /// Specific reason the command was invalid.
        reason: CommandError,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandError {
    /// No worm with the provided identifier is on the battlefield.
    UnknownWorm(WormId),
    /// The issuing worm's health is depleted.
    WormDown(WormId),
    /// The target lies beyond the worm's ability radius.
    OutOfRange {
        /// Position of the worm when the command was checked.
        origin: Point,
        /// Requested target cell.
        target: Point,
        /// Radius the ability permits.
        range: u32,
    },
    /// The target lies outside the cells the worm may occupy.
    OutOfBounds {
        /// Requested target cell.
        target: Point,
    },
    /// The target cell's terrain cannot be entered.
    Obstructed {
        /// Requested target cell.
        target: Point,
    },
    /// The target cell already holds an occupant.
    Occupied {
        /// Requested target cell.
        target: Point,
    },
    /// The target cell holds no terrain a dig can clear.
    NothingToDig {
        /// Requested target cell.
        target: Point,
    },
}
