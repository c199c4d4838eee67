//! Game orchestration.
//!
//! [`Game`] owns the board, the matching engine, the combo scorer, the timer
//! scheduler and the event bus, and routes work between them:
//!
//! ```text
//! reveal() -> Tile (Hidden -> Flipping) -> flip timer -> Tile (Revealed)
//!          -> TileRevealed -> MatchingEngine -> worker timers
//!          -> verdict -> Tile (Matched | flip back) + ComboScorer
//!          -> drained? -> LevelCompleted
//! ```
//!
//! Time is logical. Nothing happens between calls; [`Game::advance`] fires
//! every timer due in the elapsed window in deadline order, ticking the combo
//! window up to each deadline first, and delivers buffered events after each
//! timer.

use rand::Rng;

use crate::board::Board;
use crate::config::{ConfigError, GameConfig};
use crate::engine::{MatchingEngine, RevealOutcome, WorkerStep};
use crate::event::{EventBus, EventKind, GameEvent, Listener};
use crate::id::{SubscriptionId, TileId};
use crate::layout::{BoardError, Difficulty};
use crate::scheduler::Scheduler;
use crate::scoring::{ComboScorer, ScoreState};
use crate::snapshot::{self, LoadError, SaveError, SnapshotRecord};
use crate::tile::TileState;
use crate::time::{Seconds, saturating_elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    /// A tile's flip animation ends.
    FlipFinished(TileId),
    /// The matching worker resumes.
    Worker,
    /// The level entry sequence ends.
    EntryFinished,
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    difficulty: Difficulty,
    board: Board,
    engine: MatchingEngine,
    scorer: ComboScorer,
    scheduler: Scheduler<Timer>,
    bus: EventBus,
    completed: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::build(GameConfig::default())
    }
}

impl Game {
    /// Create a game with no level loaded.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GameConfig) -> Self {
        Self {
            difficulty: Difficulty::Easy,
            board: Board::new(),
            engine: MatchingEngine::from_config(&config),
            scorer: ComboScorer::new(config.base_points, config.combo_duration),
            scheduler: Scheduler::new(),
            bus: EventBus::new(config.event_capacity),
            completed: false,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Level lifecycle
    // -----------------------------------------------------------------------

    /// Deal a new level and reset the score, coins included.
    ///
    /// On error the current level keeps running untouched.
    pub fn start_level<R: Rng + ?Sized>(
        &mut self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        self.begin_level(difficulty, rng, true)
    }

    /// Deal a new level, keeping the coins earned so far.
    pub fn continue_level<R: Rng + ?Sized>(
        &mut self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        self.begin_level(difficulty, rng, false)
    }

    /// Deal a fresh board at the last difficulty played.
    pub fn restart_level<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        self.begin_level(self.difficulty, rng, true)
    }

    fn begin_level<R: Rng + ?Sized>(
        &mut self,
        difficulty: Difficulty,
        rng: &mut R,
        reset_coins: bool,
    ) -> Result<(), BoardError> {
        self.config.layouts.resolve(difficulty)?;

        self.cancel_work();
        self.board.build(&self.config.layouts, difficulty, rng)?;
        self.difficulty = difficulty;
        self.completed = false;
        self.scorer.reset_score(reset_coins, &mut self.bus);
        self.schedule_entry();
        self.bus.deliver();

        log::info!(
            "started {difficulty:?} level with {} tiles",
            self.board.len()
        );
        Ok(())
    }

    /// Capture the current level.
    ///
    /// Refused while pairs are pending or any tile is mid-flip; retry once
    /// the game has settled.
    pub fn save(&self) -> Result<SnapshotRecord, SaveError> {
        snapshot::capture(&self.engine, &self.board, self.scorer.score()).inspect_err(|e| {
            log::debug!("save refused: {e}");
        })
    }

    /// Replace the current level with a saved one.
    ///
    /// The record is validated in full first; on error nothing changes.
    pub fn load(&mut self, record: &SnapshotRecord) -> Result<(), LoadError> {
        if let Err(e) = snapshot::validate(record, &self.config.layouts) {
            log::warn!("rejecting snapshot: {e}");
            return Err(e);
        }

        self.cancel_work();
        self.board.restore_from_snapshot(record);
        self.difficulty = record.difficulty;
        self.completed = self.board.all_matched();
        self.scorer.load_state(record.score(), &mut self.bus);
        self.schedule_entry();
        self.bus.deliver();

        log::info!(
            "loaded {:?} level, {}/{} tiles matched",
            record.difficulty,
            self.board.matched_count(),
            self.board.len()
        );
        Ok(())
    }

    /// Drain the engine and drop every timer before the board is replaced.
    fn cancel_work(&mut self) {
        self.engine.reset();
        self.scheduler.clear();
        self.board.set_accepting_input(false);
    }

    fn schedule_entry(&mut self) {
        self.scheduler
            .schedule(self.config.entry_duration, Timer::EntryFinished);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Ask to turn a tile face up. Returns false (and does nothing) when the
    /// level is not accepting input or the tile cannot be revealed.
    pub fn reveal(&mut self, tile: TileId) -> bool {
        if self.completed {
            return false;
        }
        let accepting = self.board.accepting_input();
        let Some(t) = self.board.tile_mut(tile) else {
            return false;
        };
        if !t.request_reveal(accepting).has_update() {
            return false;
        }
        self.scheduler
            .schedule(self.config.flip_duration, Timer::FlipFinished(tile));
        true
    }

    /// [`Game::reveal`] by board position.
    pub fn reveal_at(&mut self, position: usize) -> bool {
        match self.board.tile_at(position) {
            Some(id) => self.reveal(id),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance logical time by `dt`, firing every timer that falls due.
    /// `advance(Seconds::ZERO)` fires timers due right now.
    pub fn advance(&mut self, dt: Seconds) {
        let target = self.scheduler.now().saturating_add(dt.max(Seconds::ZERO));
        let mut last = self.scheduler.now();

        while let Some((due, timer)) = self.scheduler.pop_due(target) {
            self.scorer.tick(saturating_elapsed(due, last));
            last = due;
            self.fire(timer);
            self.bus.deliver();
        }

        self.scorer.tick(saturating_elapsed(target, last));
        self.scheduler.advance_to(target);
        self.bus.deliver();
    }

    /// Advance until no timers remain. Returns the logical time elapsed.
    pub fn settle(&mut self) -> Seconds {
        let start = self.scheduler.now();
        while let Some(deadline) = self.scheduler.next_deadline() {
            self.advance(saturating_elapsed(deadline, self.scheduler.now()));
        }
        self.scheduler.now() - start
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::FlipFinished(id) => self.finish_flip(id),
            Timer::Worker => self.drive_worker(),
            Timer::EntryFinished => {
                self.board.set_accepting_input(true);
                self.bus.emit(GameEvent::LevelReady);
                log::debug!("level ready");
            }
        }
    }

    fn finish_flip(&mut self, id: TileId) {
        let Some(tile) = self.board.tile_mut(id) else {
            log::debug!("flip finished for stale tile {id:?}");
            return;
        };
        let position = tile.position();
        if tile.finish_flip() != Some(TileState::Revealed) {
            return;
        }

        self.bus.emit(GameEvent::TileRevealed { tile: id, position });
        if let RevealOutcome::Paired { start_worker: true } =
            self.engine.on_tile_revealed(id, &self.board)
        {
            self.drive_worker();
        }
    }

    fn drive_worker(&mut self) {
        match self.engine.resume(&mut self.board) {
            WorkerStep::Wait(delay) => {
                self.scheduler.schedule(delay, Timer::Worker);
            }
            WorkerStep::Evaluated {
                pair,
                is_match,
                wait,
            } => {
                self.bus.emit(GameEvent::PairEvaluated {
                    first: pair.first,
                    second: pair.second,
                    is_match,
                });
                self.scorer.on_pair_evaluated(is_match, &mut self.bus);
                if !is_match {
                    for id in [pair.first, pair.second] {
                        self.scheduler
                            .schedule(self.config.flip_duration, Timer::FlipFinished(id));
                    }
                }
                self.scheduler.schedule(wait, Timer::Worker);
            }
            WorkerStep::Drained => self.check_completion(),
        }
    }

    fn check_completion(&mut self) {
        if self.completed || !self.board.all_matched() {
            return;
        }
        self.completed = true;
        self.bus.emit(GameEvent::LevelCompleted);
        log::info!(
            "{:?} level completed with {} coins",
            self.difficulty,
            self.scorer.score().coins
        );
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.bus.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.bus.suppress(kind);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn scorer(&self) -> &ComboScorer {
        &self.scorer
    }

    pub fn score(&self) -> ScoreState {
        self.scorer.score()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current logical time.
    pub fn now(&self) -> Seconds {
        self.scheduler.now()
    }

    /// The entry sequence has finished and the level is not yet complete.
    pub fn is_ready(&self) -> bool {
        self.board.accepting_input() && !self.completed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }
}
