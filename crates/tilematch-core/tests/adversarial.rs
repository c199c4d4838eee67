//! Adversarial input tests for the tilematch core.
//!
//! Edge cases that must either return errors or be handled gracefully
//! without panics.

use tilematch_core::config::{ConfigError, GameConfig};
use tilematch_core::event::{EventKind, MIN_EVENT_CAPACITY};
use tilematch_core::game::Game;
use tilematch_core::layout::{BoardError, Difficulty, LevelLayout};
use tilematch_core::rng::seeded;
use tilematch_core::snapshot::{LoadError, SnapshotRecord};
use tilematch_core::test_utils::*;
use tilematch_core::tile::TileState;
use tilematch_core::time::{Seconds, secs};

/// Handles from a previous level must not resolve after a rebuild.
#[test]
fn stale_tile_handle_is_refused() {
    let mut game = easy_game("ABAB");
    let old = game.board().tile_at(0).unwrap();
    game.start_level(Difficulty::Easy, &mut seeded(1)).unwrap();
    game.settle();
    assert!(!game.reveal(old));
    assert!(game.board().tile(old).is_none());
}

#[test]
fn out_of_range_position_is_refused() {
    let mut game = easy_game("ABAB");
    assert!(!game.reveal_at(4));
    assert!(!game.reveal_at(usize::MAX));
}

#[test]
fn reveal_before_any_level() {
    let mut game = Game::default();
    assert!(!game.reveal_at(0));
    game.advance(secs(1.0));
    assert!(game.save().is_err());
}

#[test]
fn negative_advance_is_a_no_op() {
    let mut game = easy_game("ABAB");
    let now = game.now();
    game.advance(secs(-5.0));
    assert_eq!(game.now(), now);
}

/// A tile flipping back after a mismatch cannot be grabbed mid-flip.
#[test]
fn reveal_during_flip_back_is_refused() {
    let mut game = easy_game("ABAB");
    game.reveal_at(0);
    game.reveal_at(1);
    game.advance(secs(0.4 + 0.5));
    let board = game.board();
    assert_eq!(
        board.tile(board.tile_at(0).unwrap()).unwrap().state(),
        TileState::Flipping
    );
    assert!(!game.reveal_at(0));
    game.settle();
    assert!(game.reveal_at(0));
}

/// Tapping the same tile repeatedly only reveals it once.
#[test]
fn repeated_taps_on_one_tile() {
    let mut game = easy_game("ABAB");
    assert!(game.reveal_at(0));
    for _ in 0..10 {
        assert!(!game.reveal_at(0));
    }
    game.settle();
    assert_eq!(game.engine().pending(), game.board().tile_at(0));
    assert_eq!(game.score().attempts, 0);
}

/// Matched tiles are terminal.
#[test]
fn matched_tile_cannot_be_revealed() {
    let mut game = easy_game("AABB");
    game.reveal_at(0);
    game.reveal_at(1);
    game.settle();
    assert!(!game.reveal_at(0));
    assert!(!game.reveal_at(1));
}

/// With every delay at zero, a whole pair resolves inside one zero-length
/// advance.
#[test]
fn zero_delays_resolve_immediately() {
    let config = GameConfig {
        flip_back_delay: Seconds::ZERO,
        pair_check_delay: Seconds::ZERO,
        flip_duration: Seconds::ZERO,
        entry_duration: Seconds::ZERO,
        ..GameConfig::default()
    };
    let mut game = ready_game_with(config, Difficulty::Easy, &symbols("ABBA"));
    assert!(game.is_ready());
    let log = EventLog::attach(&mut game);

    game.reveal_at(0);
    game.reveal_at(3);
    game.advance(zero());
    assert_eq!(log.verdicts(), vec![true]);
    assert!(game.engine().is_idle());
    assert_eq!(game.pending_timers(), 0);
}

#[test]
fn unknown_difficulty_is_a_config_error() {
    let mut config = GameConfig::default();
    config.layouts.layouts.clear();
    let mut game = Game::new(config).unwrap();
    assert_eq!(
        game.start_level(Difficulty::Medium, &mut seeded(0)),
        Err(BoardError::UnknownDifficulty(Difficulty::Medium))
    );
    assert!(game.board().is_empty());
}

#[test]
fn odd_layout_is_a_config_error() {
    let mut config = GameConfig::default();
    config.layouts.layouts = vec![LevelLayout::new(Difficulty::Easy, 3, 3)];
    let mut game = Game::new(config).unwrap();
    assert!(matches!(
        game.start_level(Difficulty::Easy, &mut seeded(0)),
        Err(BoardError::OddTileCount { tiles: 9, .. })
    ));
    assert!(game.board().is_empty());
}

#[test]
fn corrupt_bytes_are_rejected() {
    for data in [&[][..], &[0u8; 3][..], &[0xAB; 64][..]] {
        assert!(SnapshotRecord::from_bytes(data).is_err());
    }
}

#[test]
fn truncated_snapshot_is_rejected() {
    let game = easy_game("ABAB");
    let bytes = game.save().unwrap().to_bytes().unwrap();
    assert!(SnapshotRecord::from_bytes(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn snapshot_with_wrong_tile_count_is_rejected() {
    let mut game = easy_game("ABAB");
    let mut record = game.save().unwrap();
    record.tiles.pop();
    assert!(matches!(
        game.load(&record),
        Err(LoadError::TileCountMismatch { .. })
    ));
    // Still playable.
    assert!(game.reveal_at(0));
}

#[test]
fn snapshot_for_other_difficulty_is_rejected() {
    let mut game = easy_game("ABAB");
    let mut record = game.save().unwrap();
    record.difficulty = Difficulty::Hard;
    assert!(game.load(&record).is_err());
    assert_eq!(game.difficulty(), Difficulty::Easy);
}

/// Loading mid-evaluation drops the old level's pending work.
#[test]
fn load_cancels_in_flight_pairs() {
    let mut game = easy_game("AABB");
    let record = game.save().unwrap();
    let log = EventLog::attach(&mut game);

    game.reveal_at(0);
    game.reveal_at(1);
    game.advance(secs(0.4));
    assert!(game.engine().is_processing());

    game.load(&record).unwrap();
    game.settle();
    assert_eq!(log.count(EventKind::PairEvaluated), 0);
    assert_eq!(game.board().matched_count(), 0);
}

/// Dropping a listener mid-game leaves play unaffected.
#[test]
fn unsubscribing_mid_game() {
    let mut game = easy_game("AABB");
    let id = game.subscribe(EventKind::PairEvaluated, Box::new(|_| {}));
    game.reveal_at(0);
    game.reveal_at(1);
    game.advance(secs(0.4));
    assert!(game.unsubscribe(id));
    game.settle();
    assert_eq!(game.score().matches, 1);
}

#[test]
fn suppressed_events_do_not_reach_listeners() {
    let mut game = easy_game("AABB");
    let log = EventLog::attach(&mut game);
    game.suppress_event(EventKind::TileRevealed);
    game.reveal_at(0);
    game.reveal_at(1);
    game.settle();
    assert_eq!(log.count(EventKind::TileRevealed), 0);
    assert_eq!(log.count(EventKind::PairEvaluated), 1);
}

#[test]
fn tiny_event_capacity_is_rejected() {
    let config = GameConfig {
        event_capacity: 2,
        ..GameConfig::default()
    };
    assert_eq!(
        Game::new(config).err(),
        Some(ConfigError::EventCapacityTooSmall { found: 2 })
    );
}

/// The smallest accepted bus still delivers every event of a level.
#[test]
fn minimum_event_capacity_loses_nothing() {
    let config = GameConfig {
        event_capacity: MIN_EVENT_CAPACITY,
        ..GameConfig::default()
    };
    let mut game = ready_game_with(config, Difficulty::Easy, &symbols("AABB"));
    let log = EventLog::attach(&mut game);
    for p in 0..4 {
        game.reveal_at(p);
    }
    game.settle();

    assert_eq!(log.count(EventKind::TileRevealed), 4);
    assert_eq!(log.verdicts(), vec![true, true]);
    assert_eq!(log.count(EventKind::CoinsChanged), 2);
    assert_eq!(log.count(EventKind::ProgressChanged), 2);
    assert_eq!(log.count(EventKind::ComboChanged), 1);
    assert_eq!(log.count(EventKind::LevelCompleted), 1);
}
