//! Data-file configuration and save storage for the tilematch core.
//!
//! [`load_game_config`] reads a [`schema::GameConfigData`] file in RON, TOML
//! or JSON and resolves it into a validated [`tilematch_core::config::GameConfig`].
//! [`SaveSlot`] persists snapshot records to disk with whole-file writes.

pub mod loader;
pub mod save_slot;
pub mod schema;

pub use loader::{DataLoadError, load_game_config, load_game_config_from_dir};
pub use save_slot::{SaveFormat, SaveSlot, SaveSlotError};
