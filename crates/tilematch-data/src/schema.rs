//! Serde data file structs for game configuration.
//!
//! These structs define the on-disk format of a game configuration file.
//! Every field is optional; anything left out keeps the core default. The
//! loader resolves them into a [`GameConfig`](tilematch_core::config::GameConfig).

use serde::Deserialize;
use tilematch_core::layout::Difficulty;

// ===========================================================================
// Top level
// ===========================================================================

/// A game configuration file.
///
/// Durations are written as plain seconds (`0.5`) and converted to
/// fixed-point on load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfigData {
    #[serde(default)]
    pub timing: TimingData,
    #[serde(default)]
    pub scoring: ScoringData,
    #[serde(default)]
    pub engine: EngineData,
    /// Replaces the default layout table when present.
    #[serde(default)]
    pub board: Option<BoardData>,
}

// ===========================================================================
// Sections
// ===========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingData {
    #[serde(default)]
    pub flip_back_delay: Option<f64>,
    #[serde(default)]
    pub pair_check_delay: Option<f64>,
    #[serde(default)]
    pub flip_duration: Option<f64>,
    #[serde(default)]
    pub entry_duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringData {
    #[serde(default)]
    pub base_points: Option<u32>,
    #[serde(default)]
    pub combo_duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineData {
    #[serde(default)]
    pub backlog_limit: Option<usize>,
    #[serde(default)]
    pub event_capacity: Option<usize>,
}

/// Level grid definitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardData {
    #[serde(default = "default_symbol_pool")]
    pub symbol_pool: u16,
    pub layouts: Vec<LayoutData>,
}

fn default_symbol_pool() -> u16 {
    18
}

/// One difficulty's grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutData {
    pub difficulty: DifficultyData,
    pub rows: u16,
    pub columns: u16,
    #[serde(default)]
    pub symbol_pool: Option<u16>,
}

/// Difficulty names as written in data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyData {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyData> for Difficulty {
    fn from(d: DifficultyData) -> Self {
        match d {
            DifficultyData::Easy => Difficulty::Easy,
            DifficultyData::Medium => Difficulty::Medium,
            DifficultyData::Hard => Difficulty::Hard,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
