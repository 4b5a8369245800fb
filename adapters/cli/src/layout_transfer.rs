#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use wormgrid_core::{CellKind, PlayerId, Point, WormId};

const SNAPSHOT_DOMAIN: &str = "worms";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "worms:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of an arena setup: grid dimensions, the flat row-major terrain
/// sequence, and the worms each player fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ArenaSnapshot {
    /// Number of grid columns contained in the arena.
    pub columns: u32,
    /// Number of grid rows contained in the arena.
    pub rows: u32,
    /// Terrain of every cell in row-major order.
    pub terrain: Vec<CellKind>,
    /// Worm spawns composing the match setup.
    pub spawns: Vec<WormSpawn>,
}

impl ArenaSnapshot {
    /// Encodes the snapshot into a single-line string suitable for
    /// clipboard transfer between players.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            terrain: self.terrain.clone(),
            spawns: self.spawns.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("arena snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(LayoutError::InvalidPayload)?;

        let expected = columns as usize * rows as usize;
        if decoded.terrain.len() != expected {
            return Err(LayoutError::TerrainMismatch {
                expected,
                actual: decoded.terrain.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            terrain: decoded.terrain,
            spawns: decoded.spawns,
        })
    }
}

/// Spawn description captured within an arena snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct WormSpawn {
    /// Player fielding the worm.
    pub player: PlayerId,
    /// Identifier assigned to the worm.
    pub worm: WormId,
    /// Cell the worm starts the match in.
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    terrain: Vec<CellKind>,
    spawns: Vec<WormSpawn>,
}

/// Errors that can occur while decoding arena layout strings.
#[derive(Debug)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The terrain sequence does not fill the declared grid.
    TerrainMismatch {
        /// Cell count implied by the declared dimensions.
        expected: usize,
        /// Cell count actually carried by the payload.
        actual: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "arena layout string was empty"),
            Self::MissingPrefix => write!(f, "arena layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "arena layout string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "arena layout string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "arena layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse layout payload: {error}")
            }
            Self::TerrainMismatch { expected, actual } => {
                write!(
                    f,
                    "layout terrain holds {actual} cells but the grid needs {expected}"
                )
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty_arena() {
        let snapshot = ArenaSnapshot {
            columns: 4,
            rows: 3,
            terrain: vec![CellKind::Air; 12],
            spawns: Vec::new(),
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:4x3:")));

        let decoded = ArenaSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_populated_arena() {
        let mut terrain = vec![CellKind::Air; 25];
        terrain[12] = CellKind::Dirt;
        terrain[24] = CellKind::DeepSpace;
        let spawns = vec![
            WormSpawn {
                player: PlayerId::new(1),
                worm: WormId::new(1),
                position: Point::new(1, 1),
            },
            WormSpawn {
                player: PlayerId::new(2),
                worm: WormId::new(2),
                position: Point::new(3, 3),
            },
        ];
        let snapshot = ArenaSnapshot {
            columns: 5,
            rows: 5,
            terrain,
            spawns,
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:5x5:")));

        let decoded = ArenaSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn decode_rejects_foreign_prefixes() {
        let snapshot = ArenaSnapshot {
            columns: 3,
            rows: 3,
            terrain: vec![CellKind::Air; 9],
            spawns: Vec::new(),
        };
        let encoded = snapshot.encode().replace("worms:", "tanks:");

        assert!(matches!(
            ArenaSnapshot::decode(&encoded),
            Err(LayoutError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn decode_rejects_terrain_that_does_not_fill_the_grid() {
        let snapshot = ArenaSnapshot {
            columns: 3,
            rows: 3,
            terrain: vec![CellKind::Air; 9],
            spawns: Vec::new(),
        };
        let encoded = snapshot.encode().replace(":3x3:", ":4x3:");

        assert!(matches!(
            ArenaSnapshot::decode(&encoded),
            Err(LayoutError::TerrainMismatch {
                expected: 12,
                actual: 9,
            })
        ));
    }
}
