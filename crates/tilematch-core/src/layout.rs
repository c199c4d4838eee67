//! Difficulty levels, grid layouts and the symbol deal.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::id::SymbolId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Configuration errors raised while building a board. A failed build never
/// creates tiles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("no layout configured for difficulty {0:?}")]
    UnknownDifficulty(Difficulty),
    #[error("layout for {difficulty:?} has {tiles} tiles, which cannot form pairs")]
    OddTileCount { difficulty: Difficulty, tiles: usize },
    #[error("layout for {difficulty:?} has no tiles")]
    EmptyLayout { difficulty: Difficulty },
    #[error("layout for {difficulty:?} needs {needed} symbols but the pool has {available}")]
    InsufficientSymbols {
        difficulty: Difficulty,
        needed: usize,
        available: usize,
    },
    #[error("layout for {difficulty:?} has {tiles} tiles, more than a board can address")]
    TooManyTiles { difficulty: Difficulty, tiles: usize },
}

// ---------------------------------------------------------------------------
// Difficulty & layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// Grid shape for one difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub difficulty: Difficulty,
    pub rows: u16,
    pub columns: u16,
    /// Overrides the table-wide symbol pool for this level.
    #[serde(default)]
    pub symbol_pool: Option<u16>,
}

impl LevelLayout {
    pub fn new(difficulty: Difficulty, rows: u16, columns: u16) -> Self {
        Self {
            difficulty,
            rows,
            columns,
            symbol_pool: None,
        }
    }

    pub fn total_tiles(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

/// Tile count and symbol pool resolved for a difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub difficulty: Difficulty,
    pub tiles: usize,
    pub pairs: usize,
    pub symbol_pool: usize,
}

/// All known layouts plus the shared symbol pool size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub symbol_pool: u16,
    pub layouts: Vec<LevelLayout>,
}

impl Default for LayoutTable {
    /// Easy 2x2, Medium 2x3, Hard 5x6, with an 18-symbol pool.
    fn default() -> Self {
        Self {
            symbol_pool: 18,
            layouts: vec![
                LevelLayout::new(Difficulty::Easy, 2, 2),
                LevelLayout::new(Difficulty::Medium, 2, 3),
                LevelLayout::new(Difficulty::Hard, 5, 6),
            ],
        }
    }
}

impl LayoutTable {
    pub fn get(&self, difficulty: Difficulty) -> Option<&LevelLayout> {
        self.layouts.iter().find(|l| l.difficulty == difficulty)
    }

    /// Resolve the tile count and symbol pool for `difficulty`, checking that
    /// the layout can be dealt as unique pairs.
    pub fn resolve(&self, difficulty: Difficulty) -> Result<ResolvedLayout, BoardError> {
        let layout = self
            .get(difficulty)
            .ok_or(BoardError::UnknownDifficulty(difficulty))?;

        let tiles = layout.total_tiles();
        if tiles == 0 {
            return Err(BoardError::EmptyLayout { difficulty });
        }
        if tiles % 2 != 0 {
            return Err(BoardError::OddTileCount { difficulty, tiles });
        }
        if tiles > u16::MAX as usize {
            return Err(BoardError::TooManyTiles { difficulty, tiles });
        }

        let pairs = tiles / 2;
        let symbol_pool = layout.symbol_pool.unwrap_or(self.symbol_pool) as usize;
        if pairs > symbol_pool {
            return Err(BoardError::InsufficientSymbols {
                difficulty,
                needed: pairs,
                available: symbol_pool,
            });
        }

        Ok(ResolvedLayout {
            difficulty,
            tiles,
            pairs,
            symbol_pool,
        })
    }

    /// Deal a shuffled symbol sequence for `difficulty`.
    ///
    /// Samples `pairs` distinct symbols uniformly from the pool without
    /// replacement, duplicates them, and shuffles the result with
    /// Fisher-Yates. The returned vector is indexed by tile position.
    pub fn deal<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Vec<SymbolId>, BoardError> {
        let resolved = self.resolve(difficulty)?;

        let sampled = rand::seq::index::sample(rng, resolved.symbol_pool, resolved.pairs);
        let mut symbols: Vec<SymbolId> = Vec::with_capacity(resolved.tiles);
        for index in sampled.iter() {
            let symbol = SymbolId(index as u16);
            symbols.push(symbol);
            symbols.push(symbol);
        }
        symbols.shuffle(rng);

        Ok(symbols)
    }
}
