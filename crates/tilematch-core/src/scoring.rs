//! Combo scoring driven by pair-evaluation outcomes.
//!
//! Consecutive matches inside the combo window multiply the points awarded:
//! the first match pays `base_points`, the second `2 * base_points`, and so
//! on. A mismatch, or a gap of at least `combo_duration` between matches,
//! breaks the chain.

use serde::{Deserialize, Serialize};

use crate::event::{EventBus, GameEvent};
use crate::time::Seconds;

/// Cumulative score counters. Non-decreasing except on explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreState {
    pub coins: u32,
    pub matches: u32,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboState {
    pub count: u32,
    pub active: bool,
    /// Time left in the current combo window.
    pub timer: Seconds,
}

#[derive(Debug, Clone)]
pub struct ComboScorer {
    base_points: u32,
    combo_duration: Seconds,
    score: ScoreState,
    combo: ComboState,
}

impl ComboScorer {
    pub fn new(base_points: u32, combo_duration: Seconds) -> Self {
        Self {
            base_points,
            combo_duration,
            score: ScoreState::default(),
            combo: ComboState::default(),
        }
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn combo(&self) -> ComboState {
        self.combo
    }

    /// Current multiplier, at least 1.
    pub fn multiplier(&self) -> u32 {
        if self.combo.active {
            self.combo.count.max(1)
        } else {
            1
        }
    }

    /// Score one evaluated pair.
    pub fn on_pair_evaluated(&mut self, is_match: bool, bus: &mut EventBus) {
        self.score.attempts = self.score.attempts.saturating_add(1);

        if is_match {
            self.score.matches = self.score.matches.saturating_add(1);

            if self.combo.active && self.combo.timer > Seconds::ZERO {
                self.combo.count = self.combo.count.saturating_add(1);
            } else {
                self.combo.count = 1;
                self.combo.active = true;
            }
            self.combo.timer = self.combo_duration;

            let points = self.base_points.saturating_mul(self.combo.count.max(1));
            self.score.coins = self.score.coins.saturating_add(points);
            bus.emit(GameEvent::CoinsChanged {
                coins: self.score.coins,
            });
            if self.combo.count >= 2 {
                bus.emit(GameEvent::ComboChanged {
                    multiplier: self.combo.count,
                });
            }
        } else {
            self.break_combo();
        }

        bus.emit(GameEvent::ProgressChanged {
            matches: self.score.matches,
            attempts: self.score.attempts,
        });
    }

    /// Advance the combo window by `dt`. Expiry is silent.
    pub fn tick(&mut self, dt: Seconds) {
        if !self.combo.active || dt <= Seconds::ZERO {
            return;
        }
        self.combo.timer -= dt;
        if self.combo.timer <= Seconds::ZERO {
            log::trace!("combo of {} expired", self.combo.count);
            self.break_combo();
        }
    }

    /// Zero the progress counters (and coins when `reset_coins`), break the
    /// combo, and announce the reset values.
    pub fn reset_score(&mut self, reset_coins: bool, bus: &mut EventBus) {
        self.score.matches = 0;
        self.score.attempts = 0;
        if reset_coins {
            self.score.coins = 0;
        }
        self.break_combo();
        self.announce(bus);
    }

    /// Replace the counters with persisted values. The combo is never
    /// persisted, so it restarts inactive.
    pub fn load_state(&mut self, score: ScoreState, bus: &mut EventBus) {
        self.score = score;
        self.break_combo();
        self.announce(bus);
    }

    fn break_combo(&mut self) {
        self.combo = ComboState::default();
    }

    fn announce(&self, bus: &mut EventBus) {
        bus.emit(GameEvent::CoinsChanged {
            coins: self.score.coins,
        });
        bus.emit(GameEvent::ProgressChanged {
            matches: self.score.matches,
            attempts: self.score.attempts,
        });
        bus.emit(GameEvent::ComboChanged { multiplier: 0 });
    }
}
