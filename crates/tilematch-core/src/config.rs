//! Tunable game constants.

use crate::event::MIN_EVENT_CAPACITY;
use crate::layout::LayoutTable;
use crate::time::{Seconds, secs};

/// Errors from [`GameConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must not be negative")]
    NegativeDuration { field: &'static str },
    #[error("combo_duration must be positive")]
    ZeroComboWindow,
    #[error("base_points must be positive")]
    ZeroBasePoints,
    #[error("event_capacity {found} is below the minimum of {min}", min = MIN_EVENT_CAPACITY)]
    EventCapacityTooSmall { found: usize },
}

/// Timing, scoring and layout settings for a game session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Wait between a pair being dequeued and its verdict.
    pub flip_back_delay: Seconds,
    /// Cooldown after each verdict before the next pair may start.
    pub pair_check_delay: Seconds,
    /// Length of a single tile flip, face up or face down.
    pub flip_duration: Seconds,
    /// Level entry sequence; input is refused until it ends.
    pub entry_duration: Seconds,
    pub base_points: u32,
    pub combo_duration: Seconds,
    /// Queued pairs allowed before further reveals are deferred.
    pub backlog_limit: usize,
    /// Undelivered events the bus can hold between flushes.
    pub event_capacity: usize,
    pub layouts: LayoutTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            flip_back_delay: secs(0.5),
            pair_check_delay: secs(0.1),
            flip_duration: secs(0.4),
            entry_duration: secs(2.0),
            base_points: 100,
            combo_duration: secs(3.0),
            backlog_limit: crate::engine::BACKLOG_LIMIT,
            event_capacity: 1024,
            layouts: LayoutTable::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("flip_back_delay", self.flip_back_delay),
            ("pair_check_delay", self.pair_check_delay),
            ("flip_duration", self.flip_duration),
            ("entry_duration", self.entry_duration),
            ("combo_duration", self.combo_duration),
        ];
        for (field, value) in durations {
            if value < Seconds::ZERO {
                return Err(ConfigError::NegativeDuration { field });
            }
        }
        if self.combo_duration == Seconds::ZERO {
            return Err(ConfigError::ZeroComboWindow);
        }
        if self.base_points == 0 {
            return Err(ConfigError::ZeroBasePoints);
        }
        if self.event_capacity < MIN_EVENT_CAPACITY {
            return Err(ConfigError::EventCapacityTooSmall {
                found: self.event_capacity,
            });
        }
        Ok(())
    }
}
