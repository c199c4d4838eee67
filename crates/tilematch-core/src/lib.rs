//! Tilematch Core -- the resolution core of a tile-matching memory game.
//!
//! Players reveal tiles one at a time; this crate pairs the revealed tiles
//! in strict arrival order, evaluates each pair after a fixed delay, updates
//! tile and score state, and saves/restores a consistent snapshot of the
//! board. Everything is headless and driven by logical time.
//!
//! # Flow
//!
//! 1. [`game::Game::reveal`] flips a Hidden tile; after `flip_duration` it is
//!    Revealed and handed to the [`engine::MatchingEngine`].
//! 2. The engine holds it as pending or pairs it with the pending tile and
//!    queues the pair.
//! 3. The single worker evaluates queued pairs one at a time: wait
//!    `flip_back_delay`, compare symbols, mark both Matched or flip them back,
//!    then cool down for `pair_check_delay`.
//! 4. Each verdict feeds the [`scoring::ComboScorer`].
//! 5. When the worker drains and every tile is Matched, `LevelCompleted`
//!    fires.
//!
//! Time only moves through [`game::Game::advance`], so tests are exact and
//! deterministic:
//!
//! ```rust,ignore
//! let mut game = Game::default();
//! game.start_level(Difficulty::Easy, &mut rng::seeded(7))?;
//! game.advance(secs(2.0)); // entry sequence
//! game.reveal_at(0);
//! game.reveal_at(1);
//! game.settle();
//! ```
//!
//! # Key Types
//!
//! - [`game::Game`] -- owns every component and wires them together.
//! - [`board::Board`] -- tiles of the current level in a generation-checked
//!   slot map.
//! - [`tile::Tile`] -- per-tile reveal/match state machine.
//! - [`engine::MatchingEngine`] -- FIFO pair evaluation with a bounded backlog.
//! - [`scoring::ComboScorer`] -- coins, progress and the decaying combo.
//! - [`snapshot`] -- versioned capture, validation and byte/JSON codecs.
//! - [`event::EventBus`] -- buffered, ordered event delivery.
//! - [`scheduler::Scheduler`] -- logical-time timer queue.

pub mod board;
pub mod config;
pub mod engine;
pub mod event;
pub mod game;
pub mod id;
pub mod layout;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;
pub mod tile;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
