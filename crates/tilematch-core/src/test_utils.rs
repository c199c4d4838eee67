//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::event::{EventKind, GameEvent};
use crate::game::Game;
use crate::id::SymbolId;
use crate::layout::Difficulty;
use crate::scoring::ScoreState;
use crate::snapshot::{SnapshotRecord, TileRecord};
use crate::tile::TileState;
use crate::time::{Seconds, secs};

// ===========================================================================
// Symbols
// ===========================================================================

pub fn sym(v: u16) -> SymbolId {
    SymbolId(v)
}

/// Symbols from a letter string, `"ABAB"` -> `[0, 1, 0, 1]`.
pub fn symbols(pattern: &str) -> Vec<SymbolId> {
    pattern
        .bytes()
        .map(|b| SymbolId(u16::from(b.to_ascii_uppercase() - b'A')))
        .collect()
}

// ===========================================================================
// Records
// ===========================================================================

/// An all-Hidden record laying out `symbols` in order.
pub fn hidden_record(difficulty: Difficulty, symbols: &[SymbolId]) -> SnapshotRecord {
    let tiles = symbols
        .iter()
        .enumerate()
        .map(|(position, &symbol)| TileRecord {
            symbol,
            state: TileState::Hidden,
            position: position as u16,
        })
        .collect();
    SnapshotRecord::new(difficulty, tiles, ScoreState::default())
}

// ===========================================================================
// Games
// ===========================================================================

/// A game whose `difficulty` layout is replaced by a single row of `tiles`.
pub fn config_with_row(difficulty: Difficulty, tiles: u16) -> GameConfig {
    let mut config = GameConfig::default();
    config.layouts.symbol_pool = config.layouts.symbol_pool.max(tiles);
    for layout in &mut config.layouts.layouts {
        if layout.difficulty == difficulty {
            layout.rows = 1;
            layout.columns = tiles;
            layout.symbol_pool = None;
        }
    }
    config
}

/// A game with the given tile order, entry sequence finished, ready for
/// input. The layout for `difficulty` must have `symbols.len()` tiles.
pub fn ready_game_with(config: GameConfig, difficulty: Difficulty, symbols: &[SymbolId]) -> Game {
    let entry = config.entry_duration;
    let mut game = Game::new(config).expect("valid config");
    game.load(&hidden_record(difficulty, symbols))
        .expect("record matches layout");
    game.advance(entry);
    game
}

/// Default config, Easy layout, tiles in the order of `pattern`.
pub fn easy_game(pattern: &str) -> Game {
    ready_game_with(GameConfig::default(), Difficulty::Easy, &symbols(pattern))
}

/// Default config, one row of `pattern.len()` tiles under Hard.
pub fn row_game(pattern: &str) -> Game {
    let syms = symbols(pattern);
    ready_game_with(
        config_with_row(Difficulty::Hard, syms.len() as u16),
        Difficulty::Hard,
        &syms,
    )
}

/// Reveal a tile and wait for its flip to finish.
pub fn reveal_and_flip(game: &mut Game, position: usize) -> bool {
    let accepted = game.reveal_at(position);
    let flip = game.config().flip_duration;
    game.advance(flip);
    accepted
}

pub fn step(game: &mut Game, seconds: f64) {
    game.advance(secs(seconds));
}

pub fn zero() -> Seconds {
    Seconds::ZERO
}

// ===========================================================================
// Event recording
// ===========================================================================

/// Records every event the game delivers, in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    /// Subscribe to every event kind on `game`.
    pub fn attach(game: &mut Game) -> Self {
        let log = Self::default();
        for kind in EventKind::ALL {
            let events = log.events.clone();
            game.subscribe(
                kind,
                Box::new(move |e| events.borrow_mut().push(e.clone())),
            );
        }
        log
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<GameEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    /// `is_match` of each PairEvaluated, in order.
    pub fn verdicts(&self) -> Vec<bool> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::PairEvaluated { is_match, .. } => Some(*is_match),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
