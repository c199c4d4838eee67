//! Save/restore of a level.
//!
//! A [`SnapshotRecord`] holds the difficulty, the score counters and one
//! `(symbol, state, position)` triple per tile in position order. Capture is
//! refused while the matching engine has work in flight or any tile is
//! mid-flip, so a record never contains a transient state. Validation runs
//! in full before anything is restored: a corrupt record is rejected, never
//! partially applied.
//!
//! Two encodings are provided: a compact `bitcode` blob behind a magic
//! number, and JSON for human-readable save files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::engine::MatchingEngine;
use crate::id::SymbolId;
use crate::layout::{BoardError, Difficulty, LayoutTable};
use crate::scoring::ScoreState;
use crate::tile::TileState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a binary tilematch snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x711E_5A7E;

/// Current record schema. Increment when the record layout changes.
pub const SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Save refused. Both cases clear up once the worker drains and every flip
/// completes; retry later.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("matching engine is busy; save after pending pairs resolve")]
    EngineBusy,
    #[error("tile at position {position} is {state:?}; only Hidden and Matched can be saved")]
    TransientTile { position: u16, state: TileState },
    #[error("no level is loaded")]
    NoLevel,
}

/// A record that cannot be restored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("snapshot schema {0} is older than supported version {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),
    #[error("snapshot from future schema {0} (this build supports up to {SCHEMA_VERSION})")]
    FutureVersion(u32),
    #[error("tile at position {position} has transient state {state:?}")]
    TransientState { position: u16, state: TileState },
    #[error("layout for {difficulty:?} has {expected} tiles but the snapshot has {found}")]
    TileCountMismatch {
        difficulty: Difficulty,
        expected: usize,
        found: usize,
    },
    #[error("snapshot layout is invalid: {0}")]
    Layout(#[from] BoardError),
    #[error("tile record {index} has position {found}")]
    PositionMismatch { index: usize, found: u16 },
    #[error("symbol {symbol:?} appears {count} times")]
    UnpairedSymbol { symbol: SymbolId, count: usize },
    #[error("symbol {symbol:?} is matched on one tile and hidden on the other")]
    SplitPair { symbol: SymbolId },
}

/// Encoding or decoding failure at the byte level.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRecord {
    pub symbol: SymbolId,
    pub state: TileState,
    pub position: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub schema_version: u32,
    pub difficulty: Difficulty,
    pub coins: u32,
    pub matches: u32,
    pub attempts: u32,
    /// Ordered by position.
    pub tiles: Vec<TileRecord>,
}

impl SnapshotRecord {
    /// A record at the current schema version.
    pub fn new(difficulty: Difficulty, tiles: Vec<TileRecord>, score: ScoreState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            difficulty,
            coins: score.coins,
            matches: score.matches,
            attempts: score.attempts,
            tiles,
        }
    }

    pub fn score(&self) -> ScoreState {
        ScoreState {
            coins: self.coins,
            matches: self.matches,
            attempts: self.attempts,
        }
    }

    /// Encode as a binary blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let envelope = Envelope {
            magic: SNAPSHOT_MAGIC,
            record: self.clone(),
        };
        bitcode::serialize(&envelope).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode a binary blob. The record still has to pass [`validate`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let envelope: Envelope =
            bitcode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))?;
        if envelope.magic != SNAPSHOT_MAGIC {
            return Err(CodecError::InvalidMagic(envelope.magic));
        }
        Ok(envelope.record)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode JSON. The record still has to pass [`validate`].
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: u32,
    record: SnapshotRecord,
}

// ---------------------------------------------------------------------------
// Capture & validation
// ---------------------------------------------------------------------------

/// Capture the board and score counters.
///
/// Fails with [`SaveError::EngineBusy`] unless the engine is fully idle, and
/// with [`SaveError::TransientTile`] if any tile is Flipping or Revealed.
pub fn capture(
    engine: &MatchingEngine,
    board: &Board,
    score: ScoreState,
) -> Result<SnapshotRecord, SaveError> {
    if !engine.is_idle() {
        return Err(SaveError::EngineBusy);
    }
    let difficulty = board.difficulty().ok_or(SaveError::NoLevel)?;
    if let Some((position, state)) = board.first_transient() {
        return Err(SaveError::TransientTile { position, state });
    }

    let tiles = board
        .iter()
        .map(|(_, tile)| TileRecord {
            symbol: tile.symbol(),
            state: tile.state(),
            position: tile.position(),
        })
        .collect();
    Ok(SnapshotRecord::new(difficulty, tiles, score))
}

/// Check that `record` can be restored against `layouts`.
pub fn validate(record: &SnapshotRecord, layouts: &LayoutTable) -> Result<(), LoadError> {
    if record.schema_version > SCHEMA_VERSION {
        return Err(LoadError::FutureVersion(record.schema_version));
    }
    if record.schema_version < SCHEMA_VERSION {
        return Err(LoadError::UnsupportedVersion(record.schema_version));
    }

    if let Some(t) = record.tiles.iter().find(|t| !t.state.is_persistable()) {
        return Err(LoadError::TransientState {
            position: t.position,
            state: t.state,
        });
    }

    let resolved = layouts.resolve(record.difficulty)?;
    if resolved.tiles != record.tiles.len() {
        return Err(LoadError::TileCountMismatch {
            difficulty: record.difficulty,
            expected: resolved.tiles,
            found: record.tiles.len(),
        });
    }

    for (index, t) in record.tiles.iter().enumerate() {
        if t.position as usize != index {
            return Err(LoadError::PositionMismatch {
                index,
                found: t.position,
            });
        }
    }

    // symbol -> (count, matched count)
    let mut pairs: HashMap<SymbolId, (usize, usize)> = HashMap::new();
    for t in &record.tiles {
        let entry = pairs.entry(t.symbol).or_default();
        entry.0 += 1;
        if t.state.is_matched() {
            entry.1 += 1;
        }
    }
    let mut symbols: Vec<_> = pairs.into_iter().collect();
    symbols.sort_by_key(|(symbol, _)| *symbol);
    for (symbol, (count, matched)) in symbols {
        if count != 2 {
            return Err(LoadError::UnpairedSymbol { symbol, count });
        }
        if matched == 1 {
            return Err(LoadError::SplitPair { symbol });
        }
    }

    Ok(())
}
