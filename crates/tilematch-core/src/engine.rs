//! The matching engine: pairs revealed tiles and evaluates them one pair at
//! a time, in arrival order.
//!
//! # Pairing
//!
//! Each revealed tile is either held as `pending` or, if a tile is already
//! pending, combined with it into a [`PairCandidate`] and appended to the
//! FIFO queue. When the worker is busy and the queue already holds more than
//! `backlog_limit` pairs, new reveals are deferred instead; deferred tiles
//! stay Revealed and are re-offered in arrival order once the queue drains.
//! Reveals arriving while anything is deferred are deferred behind it.
//!
//! # Worker
//!
//! The worker is a state machine driven by its owner. [`MatchingEngine::resume`]
//! returns a [`WorkerStep`] telling the owner how long to wait before the
//! next call:
//!
//! ```text
//! Idle --resume--> AwaitingVerdict(pair)        Wait(flip_back_delay)
//! AwaitingVerdict --resume--> Cooldown          Evaluated { .. }
//! Cooldown --resume--> AwaitingVerdict(next)    Wait(flip_back_delay)
//!                  \-> Idle                     Drained
//! ```
//!
//! Exactly one pair is in evaluation at any instant; the next one cannot
//! start its wait until the previous verdict and cooldown have completed.
//! Candidates whose tiles were matched or destroyed in the meantime are
//! skipped.

use std::collections::VecDeque;

use crate::board::Board;
use crate::config::GameConfig;
use crate::id::TileId;
use crate::tile::TileState;
use crate::time::Seconds;

/// Default number of queued pairs tolerated before reveals are deferred.
pub const BACKLOG_LIMIT: usize = 3;

// ---------------------------------------------------------------------------
// Pair candidates
// ---------------------------------------------------------------------------

/// Two tiles queued for evaluation, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCandidate {
    pub first: TileId,
    pub second: TileId,
}

impl PairCandidate {
    pub fn new(first: TileId, second: TileId) -> Self {
        Self { first, second }
    }

    /// Both handles still resolve and neither tile is Matched.
    pub fn is_valid(&self, board: &Board) -> bool {
        let live = |id| board.tile(id).is_some_and(|t| !t.is_matched());
        self.first != self.second && live(self.first) && live(self.second)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to a revealed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Matched, gone, or not face up.
    Ignored,
    /// Backlog full; the tile waits for the queue to drain.
    Deferred,
    /// Held until the next reveal arrives.
    Held,
    /// Queued with the pending tile. `start_worker` is set when the worker
    /// was idle and must be resumed by the caller.
    Paired { start_worker: bool },
}

/// Instruction returned by [`MatchingEngine::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStep {
    /// Call `resume` again after this long.
    Wait(Seconds),
    /// A verdict was applied to the board. Call `resume` again after `wait`.
    Evaluated {
        pair: PairCandidate,
        is_match: bool,
        wait: Seconds,
    },
    /// Queue empty; the worker has stopped.
    Drained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingVerdict(PairCandidate),
    Cooldown,
}

// ---------------------------------------------------------------------------
// MatchingEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatchingEngine {
    backlog_limit: usize,
    flip_back_delay: Seconds,
    pair_check_delay: Seconds,
    pending: Option<TileId>,
    queue: VecDeque<PairCandidate>,
    deferred: VecDeque<TileId>,
    phase: Phase,
}

impl MatchingEngine {
    pub fn new(backlog_limit: usize, flip_back_delay: Seconds, pair_check_delay: Seconds) -> Self {
        Self {
            backlog_limit,
            flip_back_delay,
            pair_check_delay,
            pending: None,
            queue: VecDeque::new(),
            deferred: VecDeque::new(),
            phase: Phase::Idle,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.backlog_limit,
            config.flip_back_delay,
            config.pair_check_delay,
        )
    }

    /// True while the worker is running.
    pub fn is_processing(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// No pending tile, nothing queued or deferred, worker stopped.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
            && self.queue.is_empty()
            && self.deferred.is_empty()
            && self.phase == Phase::Idle
    }

    pub fn pending(&self) -> Option<TileId> {
        self.pending
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queued pairs in evaluation order.
    pub fn queued(&self) -> impl Iterator<Item = &PairCandidate> + '_ {
        self.queue.iter()
    }

    pub fn deferred(&self) -> impl Iterator<Item = TileId> + '_ {
        self.deferred.iter().copied()
    }

    /// The pair currently waiting for its verdict.
    pub fn in_evaluation(&self) -> Option<PairCandidate> {
        match self.phase {
            Phase::AwaitingVerdict(pair) => Some(pair),
            _ => None,
        }
    }

    /// Handle a tile that just finished flipping face up.
    pub fn on_tile_revealed(&mut self, tile: TileId, board: &Board) -> RevealOutcome {
        let revealed = board
            .tile(tile)
            .is_some_and(|t| t.state() == TileState::Revealed);
        if !revealed {
            log::debug!("ignoring reveal of {tile:?}: not face up");
            return RevealOutcome::Ignored;
        }

        // Once anything is deferred, later reveals queue up behind it so
        // arrival order survives the drain.
        let backlogged = self.is_processing() && self.queue.len() > self.backlog_limit;
        if backlogged || !self.deferred.is_empty() {
            log::debug!(
                "backlog of {} pairs, {} deferred; deferring {tile:?}",
                self.queue.len(),
                self.deferred.len()
            );
            self.deferred.push_back(tile);
            return RevealOutcome::Deferred;
        }

        match self.offer(tile) {
            None => RevealOutcome::Held,
            Some(_) => RevealOutcome::Paired {
                start_worker: !self.is_processing(),
            },
        }
    }

    /// Hold `tile` as pending or pair it with the pending tile.
    fn offer(&mut self, tile: TileId) -> Option<PairCandidate> {
        match self.pending.take() {
            None => {
                self.pending = Some(tile);
                None
            }
            Some(first) => {
                let pair = PairCandidate::new(first, tile);
                self.queue.push_back(pair);
                Some(pair)
            }
        }
    }

    /// Advance the worker one step. See the module docs for the protocol.
    pub fn resume(&mut self, board: &mut Board) -> WorkerStep {
        if let Phase::AwaitingVerdict(pair) = self.phase {
            if pair.is_valid(board) {
                let is_match = self.apply_verdict(pair, board);
                self.phase = Phase::Cooldown;
                return WorkerStep::Evaluated {
                    pair,
                    is_match,
                    wait: self.pair_check_delay,
                };
            }
            log::debug!("pair {pair:?} went stale during its wait; skipping");
        }

        loop {
            while let Some(pair) = self.queue.pop_front() {
                if pair.is_valid(board) {
                    self.phase = Phase::AwaitingVerdict(pair);
                    return WorkerStep::Wait(self.flip_back_delay);
                }
                log::debug!("skipping stale pair {pair:?}");
            }

            if !self.reoffer_deferred(board) {
                break;
            }
        }

        self.phase = Phase::Idle;
        WorkerStep::Drained
    }

    /// Re-offer deferred tiles in arrival order. Returns true if anything was
    /// queued.
    fn reoffer_deferred(&mut self, board: &Board) -> bool {
        let mut queued = false;
        while let Some(tile) = self.deferred.pop_front() {
            let revealed = board
                .tile(tile)
                .is_some_and(|t| t.state() == TileState::Revealed);
            if !revealed {
                log::debug!("dropping deferred {tile:?}: no longer face up");
                continue;
            }
            log::debug!("re-offering deferred {tile:?}");
            queued |= self.offer(tile).is_some();
        }
        queued
    }

    /// Compare symbols and move both tiles to Matched, or start flipping them
    /// back down.
    fn apply_verdict(&self, pair: PairCandidate, board: &mut Board) -> bool {
        let symbol = |id| board.tile(id).map(|t| t.symbol());
        let is_match = symbol(pair.first) == symbol(pair.second);

        for id in [pair.first, pair.second] {
            if let Some(tile) = board.tile_mut(id) {
                if is_match {
                    tile.mark_matched();
                } else {
                    tile.begin_conceal();
                }
            }
        }
        is_match
    }

    /// Drop all pending work and stop the worker.
    pub fn reset(&mut self) {
        self.pending = None;
        self.queue.clear();
        self.deferred.clear();
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SymbolId;
    use crate::layout::Difficulty;
    use crate::time::secs;

    fn engine() -> MatchingEngine {
        MatchingEngine::new(BACKLOG_LIMIT, secs(0.5), secs(0.1))
    }

    fn board(symbols: &[u16]) -> Board {
        let symbols: Vec<SymbolId> = symbols.iter().map(|&s| SymbolId(s)).collect();
        let mut board = Board::new();
        board.build_with_symbols(Difficulty::Hard, &symbols);
        board
    }

    fn flip_up(board: &mut Board, position: usize) -> TileId {
        let id = board.tile_at(position).unwrap();
        let tile = board.tile_mut(id).unwrap();
        tile.request_reveal(true);
        tile.finish_flip();
        id
    }

    fn state(board: &Board, id: TileId) -> TileState {
        board.tile(id).unwrap().state()
    }

    #[test]
    fn first_reveal_is_held() {
        let mut b = board(&[0, 0]);
        let mut e = engine();
        let a = flip_up(&mut b, 0);
        assert_eq!(e.on_tile_revealed(a, &b), RevealOutcome::Held);
        assert_eq!(e.pending(), Some(a));
        assert!(!e.is_processing());
        assert!(!e.is_idle());
    }

    #[test]
    fn second_reveal_pairs_and_starts_worker() {
        let mut b = board(&[0, 0]);
        let mut e = engine();
        let a = flip_up(&mut b, 0);
        let c = flip_up(&mut b, 1);
        e.on_tile_revealed(a, &b);
        assert_eq!(
            e.on_tile_revealed(c, &b),
            RevealOutcome::Paired { start_worker: true }
        );
        assert_eq!(e.pending(), None);
        assert_eq!(e.queue_len(), 1);
    }

    #[test]
    fn hidden_or_matched_tiles_ignored() {
        let mut b = board(&[0, 0]);
        let mut e = engine();
        let hidden = b.tile_at(0).unwrap();
        assert_eq!(e.on_tile_revealed(hidden, &b), RevealOutcome::Ignored);

        let a = flip_up(&mut b, 1);
        b.tile_mut(a).unwrap().mark_matched();
        assert_eq!(e.on_tile_revealed(a, &b), RevealOutcome::Ignored);
        assert!(e.is_idle());
    }

    #[test]
    fn match_verdict_after_wait() {
        let mut b = board(&[3, 3]);
        let mut e = engine();
        let a = flip_up(&mut b, 0);
        let c = flip_up(&mut b, 1);
        e.on_tile_revealed(a, &b);
        e.on_tile_revealed(c, &b);

        assert_eq!(e.resume(&mut b), WorkerStep::Wait(secs(0.5)));
        assert!(e.is_processing());
        assert_eq!(e.in_evaluation(), Some(PairCandidate::new(a, c)));
        // Nothing decided yet.
        assert_eq!(state(&b, a), TileState::Revealed);

        assert_eq!(
            e.resume(&mut b),
            WorkerStep::Evaluated {
                pair: PairCandidate::new(a, c),
                is_match: true,
                wait: secs(0.1),
            }
        );
        assert_eq!(state(&b, a), TileState::Matched);
        assert_eq!(state(&b, c), TileState::Matched);
        assert!(e.is_processing());

        assert_eq!(e.resume(&mut b), WorkerStep::Drained);
        assert!(e.is_idle());
    }

    #[test]
    fn mismatch_starts_flip_back() {
        let mut b = board(&[1, 2]);
        let mut e = engine();
        let a = flip_up(&mut b, 0);
        let c = flip_up(&mut b, 1);
        e.on_tile_revealed(a, &b);
        e.on_tile_revealed(c, &b);
        e.resume(&mut b);
        let step = e.resume(&mut b);
        assert!(matches!(step, WorkerStep::Evaluated { is_match: false, .. }));
        assert_eq!(state(&b, a), TileState::Flipping);
        assert_eq!(b.tile_mut(a).unwrap().finish_flip(), Some(TileState::Hidden));
    }

    #[test]
    fn pairs_evaluated_in_arrival_order() {
        let mut b = board(&[0, 1, 2, 0, 1, 2]);
        let mut e = engine();
        let ids: Vec<TileId> = (0..6).map(|p| flip_up(&mut b, p)).collect();
        for &id in &ids {
            e.on_tile_revealed(id, &b);
        }
        assert_eq!(e.queue_len(), 3);

        let mut verdicts = Vec::new();
        loop {
            match e.resume(&mut b) {
                WorkerStep::Wait(_) => {}
                WorkerStep::Evaluated { pair, .. } => verdicts.push(pair),
                WorkerStep::Drained => break,
            }
        }
        assert_eq!(
            verdicts,
            vec![
                PairCandidate::new(ids[0], ids[1]),
                PairCandidate::new(ids[2], ids[3]),
                PairCandidate::new(ids[4], ids[5]),
            ]
        );
    }

    #[test]
    fn stale_pair_skipped() {
        let mut b = board(&[0, 0, 1, 1]);
        let mut e = engine();
        let ids: Vec<TileId> = (0..4).map(|p| flip_up(&mut b, p)).collect();
        for &id in &ids {
            e.on_tile_revealed(id, &b);
        }
        b.tile_mut(ids[0]).unwrap().mark_matched();

        // First pair is stale; the worker moves straight to the second.
        assert_eq!(e.resume(&mut b), WorkerStep::Wait(secs(0.5)));
        assert_eq!(e.in_evaluation(), Some(PairCandidate::new(ids[2], ids[3])));
    }

    #[test]
    fn pair_going_stale_during_wait_is_skipped() {
        let mut b = board(&[0, 0]);
        let mut e = engine();
        let a = flip_up(&mut b, 0);
        let c = flip_up(&mut b, 1);
        e.on_tile_revealed(a, &b);
        e.on_tile_revealed(c, &b);
        e.resume(&mut b);

        b.clear();
        assert_eq!(e.resume(&mut b), WorkerStep::Drained);
        assert!(e.is_idle());
    }

    #[test]
    fn backlog_defers_then_reoffers() {
        let symbols: Vec<u16> = (0..6).flat_map(|s| [s, s]).collect();
        let mut b = board(&symbols);
        let mut e = engine();
        let ids: Vec<TileId> = (0..12).map(|p| flip_up(&mut b, p)).collect();

        e.on_tile_revealed(ids[0], &b);
        e.on_tile_revealed(ids[1], &b);
        e.resume(&mut b); // worker busy with pair 0
        for &id in &ids[2..10] {
            e.on_tile_revealed(id, &b);
        }
        assert_eq!(e.queue_len(), 4);
        assert_eq!(e.on_tile_revealed(ids[10], &b), RevealOutcome::Deferred);
        assert_eq!(e.on_tile_revealed(ids[11], &b), RevealOutcome::Deferred);
        assert_eq!(e.pending(), None);
        assert_eq!(e.queue_len(), 4);
        assert_eq!(state(&b, ids[10]), TileState::Revealed);
        assert_eq!(e.deferred().collect::<Vec<_>>(), vec![ids[10], ids[11]]);

        let mut last = None;
        loop {
            match e.resume(&mut b) {
                WorkerStep::Wait(_) => {}
                WorkerStep::Evaluated { pair, is_match, .. } => {
                    assert!(is_match);
                    last = Some(pair);
                }
                WorkerStep::Drained => break,
            }
        }
        assert_eq!(last, Some(PairCandidate::new(ids[10], ids[11])));
        assert!(b.all_matched());
        assert!(e.is_idle());
    }

    #[test]
    fn reveals_queue_behind_deferred_tiles() {
        let symbols: Vec<u16> = (0..7).flat_map(|s| [s, s]).collect();
        let mut b = board(&symbols);
        let mut e = engine();
        let ids: Vec<TileId> = (0..14).map(|p| flip_up(&mut b, p)).collect();

        e.on_tile_revealed(ids[0], &b);
        e.on_tile_revealed(ids[1], &b);
        e.resume(&mut b);
        for &id in &ids[2..12] {
            e.on_tile_revealed(id, &b);
        }
        assert_eq!(e.deferred().count(), 2);

        // Finish pair 0 and start pair 1: the backlog is back at the limit.
        e.resume(&mut b);
        e.resume(&mut b);
        assert_eq!(e.queue_len(), BACKLOG_LIMIT);

        assert_eq!(e.on_tile_revealed(ids[12], &b), RevealOutcome::Deferred);
        assert_eq!(e.on_tile_revealed(ids[13], &b), RevealOutcome::Deferred);
        assert_eq!(
            e.deferred().collect::<Vec<_>>(),
            vec![ids[10], ids[11], ids[12], ids[13]]
        );

        let mut order = Vec::new();
        loop {
            match e.resume(&mut b) {
                WorkerStep::Wait(_) => {}
                WorkerStep::Evaluated { pair, .. } => order.push(pair),
                WorkerStep::Drained => break,
            }
        }
        assert_eq!(
            order[order.len() - 2..],
            [
                PairCandidate::new(ids[10], ids[11]),
                PairCandidate::new(ids[12], ids[13]),
            ]
        );
        assert!(b.all_matched());
    }

    #[test]
    fn backlog_only_applies_while_processing() {
        let symbols: Vec<u16> = (0..5).flat_map(|s| [s, s]).collect();
        let mut b = board(&symbols);
        let mut e = engine();
        for p in 0..10 {
            let id = flip_up(&mut b, p);
            assert_ne!(e.on_tile_revealed(id, &b), RevealOutcome::Deferred);
        }
        assert_eq!(e.queue_len(), 5);
    }

    #[test]
    fn reset_clears_everything() {
        let mut b = board(&[0, 0, 1, 1]);
        let mut e = engine();
        for p in 0..3 {
            let id = flip_up(&mut b, p);
            e.on_tile_revealed(id, &b);
        }
        e.resume(&mut b);
        e.reset();
        assert!(e.is_idle());
        assert!(!e.is_processing());
        assert_eq!(e.in_evaluation(), None);
    }
}
