//! The board: owns every tile of the current level.
//!
//! Tiles live in a [`SlotMap`] so that other components hold generation-checked
//! [`TileId`] handles instead of references. Rebuilding clears the map, which
//! invalidates every handle issued for the previous layout.

use rand::Rng;
use slotmap::SlotMap;

use crate::id::{SymbolId, TileId};
use crate::layout::{BoardError, Difficulty, LayoutTable};
use crate::snapshot::{SnapshotRecord, TileRecord};
use crate::tile::{Tile, TileState};

#[derive(Debug, Clone)]
pub struct Board {
    difficulty: Option<Difficulty>,
    tiles: SlotMap<TileId, Tile>,
    /// Tile handles by position.
    order: Vec<TileId>,
    accepting_input: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with no layout.
    pub fn new() -> Self {
        Self {
            difficulty: None,
            tiles: SlotMap::with_key(),
            order: Vec::new(),
            accepting_input: false,
        }
    }

    /// Deal a fresh shuffled layout for `difficulty`.
    ///
    /// On error the current tiles are left untouched; a half-built board is
    /// never observable.
    pub fn build<R: Rng + ?Sized>(
        &mut self,
        layouts: &LayoutTable,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        let symbols = layouts.deal(difficulty, rng)?;
        self.replace_tiles(
            difficulty,
            symbols
                .into_iter()
                .enumerate()
                .map(|(position, symbol)| Tile::new(position as u16, symbol)),
        );
        log::debug!("built {difficulty:?} board with {} tiles", self.order.len());
        Ok(())
    }

    /// Lay out tiles with a caller-chosen symbol order, skipping the deal
    /// and the pairing checks.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn build_with_symbols(&mut self, difficulty: Difficulty, symbols: &[SymbolId]) {
        self.replace_tiles(
            difficulty,
            symbols
                .iter()
                .enumerate()
                .map(|(position, &symbol)| Tile::new(position as u16, symbol)),
        );
    }

    /// Rebuild tiles straight from a snapshot's records, in position order.
    /// No sampling, no shuffle. The record is expected to be validated.
    pub fn restore_from_snapshot(&mut self, record: &SnapshotRecord) {
        let difficulty = record.difficulty;
        let mut sorted: Vec<&TileRecord> = record.tiles.iter().collect();
        sorted.sort_by_key(|r| r.position);
        self.replace_tiles(
            difficulty,
            sorted
                .into_iter()
                .map(|r| Tile::restored(r.position, r.symbol, r.state)),
        );
        log::debug!(
            "restored {difficulty:?} board with {} tiles",
            self.order.len()
        );
    }

    fn replace_tiles(&mut self, difficulty: Difficulty, tiles: impl Iterator<Item = Tile>) {
        self.tiles.clear();
        self.order.clear();
        for tile in tiles {
            let id = self.tiles.insert(tile);
            self.order.push(id);
        }
        self.difficulty = Some(difficulty);
        self.accepting_input = false;
    }

    /// Remove every tile. Outstanding handles stop resolving.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.order.clear();
        self.difficulty = None;
        self.accepting_input = false;
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn accepting_input(&self) -> bool {
        self.accepting_input
    }

    pub fn set_accepting_input(&mut self, accepting: bool) {
        self.accepting_input = accepting;
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(id)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// Handle of the tile at `position`.
    pub fn tile_at(&self, position: usize) -> Option<TileId> {
        self.order.get(position).copied()
    }

    /// Tiles in position order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> + '_ {
        self.order.iter().map(|&id| (id, &self.tiles[id]))
    }

    pub fn ids(&self) -> &[TileId] {
        &self.order
    }

    /// Symbols in position order.
    pub fn symbols(&self) -> Vec<SymbolId> {
        self.iter().map(|(_, t)| t.symbol()).collect()
    }

    /// True iff the board has tiles and every one is Matched.
    pub fn all_matched(&self) -> bool {
        !self.order.is_empty() && self.tiles.values().all(Tile::is_matched)
    }

    pub fn matched_count(&self) -> usize {
        self.tiles.values().filter(|t| t.is_matched()).count()
    }

    /// First tile (by position) whose state may not be persisted.
    pub fn first_transient(&self) -> Option<(u16, TileState)> {
        self.iter()
            .map(|(_, t)| t)
            .find(|t| !t.state().is_persistable())
            .map(|t| (t.position(), t.state()))
    }
}
