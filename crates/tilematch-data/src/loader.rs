//! Configuration loading: reads a data file and resolves it into a [`GameConfig`].
//!
//! A directory holds at most one `game_config` file, written in RON, TOML or
//! JSON; the extension picks the parser. Every field is optional and falls back
//! to the core defaults before the result is validated.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use tilematch_core::config::{ConfigError, GameConfig};
use tilematch_core::layout::{BoardError, Difficulty, LayoutTable, LevelLayout};
use tilematch_core::time::Seconds;

use crate::schema::{BoardData, GameConfigData};

/// Base name looked up by [`load_game_config_from_dir`].
pub const CONFIG_BASE_NAME: &str = "game_config";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The directory has no `game_config` file in any supported format.
    #[error("no game_config.{{ron,toml,json}} in {dir}")]
    NoConfigFile { dir: PathBuf },

    /// The directory has more than one `game_config` file.
    #[error("{} config files in {dir}, expected one: {files:?}", .files.len())]
    AmbiguousConfig { dir: PathBuf, files: Vec<PathBuf> },

    /// The file extension is not one of the supported formats.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A duration is not a finite number of seconds in range.
    #[error("invalid value {value} for '{field}' in {file}")]
    InvalidValue {
        file: PathBuf,
        field: &'static str,
        value: f64,
    },

    /// Two layouts were given for the same difficulty.
    #[error("duplicate layout for {difficulty:?} in {file}")]
    DuplicateLayout { file: PathBuf, difficulty: Difficulty },

    /// A layout cannot be dealt as unique pairs.
    #[error("invalid layout in {file}: {source}")]
    Layout {
        file: PathBuf,
        #[source]
        source: BoardError,
    },

    /// The resolved configuration failed validation.
    #[error("invalid config in {file}: {source}")]
    Config {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats and discovery
// ===========================================================================

/// Text formats a config file may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Ron,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Lookup order in [`locate_config`].
    pub const ALL: [Self; 3] = [Self::Ron, Self::Toml, Self::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Ron => "ron",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    /// Format named by the path's extension, if supported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|format| format.extension() == ext)
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            ConfigFormat::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Path of the single `game_config` file in `dir`.
pub fn locate_config(dir: &Path) -> Result<PathBuf, DataLoadError> {
    let mut files: Vec<PathBuf> = ConfigFormat::ALL
        .into_iter()
        .map(|format| dir.join(CONFIG_BASE_NAME).with_extension(format.extension()))
        .filter(|path| path.is_file())
        .collect();

    match files.len() {
        0 => Err(DataLoadError::NoConfigFile {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(files.remove(0)),
        _ => Err(DataLoadError::AmbiguousConfig {
            dir: dir.to_path_buf(),
            files,
        }),
    }
}

/// Read and parse `path` without resolving it.
pub fn read_config_data(path: &Path) -> Result<GameConfigData, DataLoadError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| DataLoadError::UnsupportedFormat {
        file: path.to_path_buf(),
    })?;
    let text = std::fs::read_to_string(path)?;
    format.parse(&text).map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Load a configuration file and resolve it into a validated [`GameConfig`].
pub fn load_game_config(path: &Path) -> Result<GameConfig, DataLoadError> {
    let data = read_config_data(path)?;
    let config = resolve_config(&data, path)?;
    log::info!("loaded game config from {}", path.display());
    Ok(config)
}

/// Load the one `game_config.{ron,toml,json}` in `dir`.
pub fn load_game_config_from_dir(dir: &Path) -> Result<GameConfig, DataLoadError> {
    load_game_config(&locate_config(dir)?)
}

/// Resolve parsed data over the core defaults. `file` is only used for errors.
pub fn resolve_config(data: &GameConfigData, file: &Path) -> Result<GameConfig, DataLoadError> {
    let mut config = GameConfig::default();

    let durations = [
        ("flip_back_delay", data.timing.flip_back_delay, &mut config.flip_back_delay),
        ("pair_check_delay", data.timing.pair_check_delay, &mut config.pair_check_delay),
        ("flip_duration", data.timing.flip_duration, &mut config.flip_duration),
        ("entry_duration", data.timing.entry_duration, &mut config.entry_duration),
        ("combo_duration", data.scoring.combo_duration, &mut config.combo_duration),
    ];
    for (field, value, slot) in durations {
        if let Some(value) = value {
            *slot = to_seconds(value, field, file)?;
        }
    }

    if let Some(points) = data.scoring.base_points {
        config.base_points = points;
    }
    if let Some(limit) = data.engine.backlog_limit {
        config.backlog_limit = limit;
    }
    if let Some(capacity) = data.engine.event_capacity {
        config.event_capacity = capacity;
    }
    if let Some(board) = &data.board {
        config.layouts = resolve_layouts(board, file)?;
    }

    config.validate().map_err(|source| DataLoadError::Config {
        file: file.to_path_buf(),
        source,
    })?;
    Ok(config)
}

fn to_seconds(value: f64, field: &'static str, file: &Path) -> Result<Seconds, DataLoadError> {
    Seconds::checked_from_num(value).ok_or_else(|| DataLoadError::InvalidValue {
        file: file.to_path_buf(),
        field,
        value,
    })
}

/// Build a layout table and check every listed difficulty can be dealt.
fn resolve_layouts(board: &BoardData, file: &Path) -> Result<LayoutTable, DataLoadError> {
    let mut table = LayoutTable {
        symbol_pool: board.symbol_pool,
        layouts: Vec::with_capacity(board.layouts.len()),
    };
    for data in &board.layouts {
        let difficulty = Difficulty::from(data.difficulty);
        if table.get(difficulty).is_some() {
            return Err(DataLoadError::DuplicateLayout {
                file: file.to_path_buf(),
                difficulty,
            });
        }
        table.layouts.push(LevelLayout {
            difficulty,
            rows: data.rows,
            columns: data.columns,
            symbol_pool: data.symbol_pool,
        });
    }
    for layout in &table.layouts {
        table
            .resolve(layout.difficulty)
            .map_err(|source| DataLoadError::Layout {
                file: file.to_path_buf(),
                source,
            })?;
    }
    Ok(table)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tilematch_core::time::secs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tilematch_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // ConfigFormat / locate_config
    // -----------------------------------------------------------------------

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.ron")), Some(ConfigFormat::Ron));
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("a")), None);
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let result = load_game_config(Path::new("does/not/exist/game_config.yaml"));
        assert!(matches!(
            result,
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn locate_finds_the_only_config() {
        let dir = make_test_dir("locate_toml");
        fs::write(dir.join("game_config.toml"), "").unwrap();
        fs::write(dir.join("other.json"), "{}").unwrap();

        assert_eq!(locate_config(&dir).unwrap(), dir.join("game_config.toml"));

        cleanup(&dir);
    }

    #[test]
    fn locate_ignores_other_base_names() {
        let dir = make_test_dir("locate_other");
        fs::write(dir.join("settings.ron"), "()").unwrap();
        fs::write(dir.join("game_config.yaml"), "").unwrap();

        assert!(matches!(
            locate_config(&dir),
            Err(DataLoadError::NoConfigFile { dir: ref found }) if found == &dir
        ));

        cleanup(&dir);
    }

    #[test]
    fn locate_ignores_directories() {
        let dir = make_test_dir("locate_dir_entry");
        fs::create_dir(dir.join("game_config.json")).unwrap();
        fs::write(dir.join("game_config.ron"), "()").unwrap();

        assert_eq!(locate_config(&dir).unwrap(), dir.join("game_config.ron"));

        cleanup(&dir);
    }

    #[test]
    fn two_config_formats_are_ambiguous() {
        let dir = make_test_dir("locate_ambiguous");
        fs::write(dir.join("game_config.ron"), "()").unwrap();
        fs::write(dir.join("game_config.json"), "{}").unwrap();

        let err = load_game_config_from_dir(&dir).unwrap_err();
        match &err {
            DataLoadError::AmbiguousConfig { files, .. } => assert_eq!(
                files,
                &vec![dir.join("game_config.ron"), dir.join("game_config.json")]
            ),
            other => panic!("expected AmbiguousConfig, got {other:?}"),
        }
        assert!(format!("{err}").contains("2 config files"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_game_config
    // -----------------------------------------------------------------------

    #[test]
    fn empty_file_gives_defaults() {
        let dir = make_test_dir("load_defaults");
        let path = dir.join("game_config.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(load_game_config(&path).unwrap(), GameConfig::default());

        cleanup(&dir);
    }

    #[test]
    fn load_ron_overrides() {
        let dir = make_test_dir("load_ron");
        let path = dir.join("game_config.ron");
        fs::write(
            &path,
            r#"(
                timing: (flip_back_delay: Some(0.25), entry_duration: Some(0.0)),
                scoring: (base_points: Some(10)),
                board: Some((
                    symbol_pool: 8,
                    layouts: [(difficulty: easy, rows: 4, columns: 4)],
                )),
            )"#,
        )
        .unwrap();

        let config = load_game_config(&path).unwrap();
        assert_eq!(config.flip_back_delay, secs(0.25));
        assert_eq!(config.entry_duration, Seconds::ZERO);
        assert_eq!(config.pair_check_delay, secs(0.1));
        assert_eq!(config.base_points, 10);
        assert_eq!(config.layouts.symbol_pool, 8);
        assert_eq!(config.layouts.layouts, vec![LevelLayout::new(Difficulty::Easy, 4, 4)]);

        cleanup(&dir);
    }

    #[test]
    fn load_from_dir_toml() {
        let dir = make_test_dir("load_dir");
        fs::write(
            dir.join("game_config.toml"),
            "[scoring]\ncombo_duration = 1.5\n\n[engine]\nbacklog_limit = 6\n",
        )
        .unwrap();

        let config = load_game_config_from_dir(&dir).unwrap();
        assert_eq!(config.combo_duration, secs(1.5));
        assert_eq!(config.backlog_limit, 6);

        cleanup(&dir);
    }

    #[test]
    fn load_from_dir_without_file() {
        let dir = make_test_dir("load_dir_missing");
        assert!(matches!(
            load_game_config_from_dir(&dir),
            Err(DataLoadError::NoConfigFile { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_file() {
        let dir = make_test_dir("load_parse_err");
        let path = dir.join("game_config.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let err = load_game_config(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(format!("{err}").contains("game_config.ron"));

        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = make_test_dir("load_io");
        let result = load_game_config(&dir.join("absent.json"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // resolve_config
    // -----------------------------------------------------------------------

    fn resolve_json(json: &str) -> Result<GameConfig, DataLoadError> {
        let data: GameConfigData = serde_json::from_str(json).unwrap();
        resolve_config(&data, Path::new("game_config.json"))
    }

    #[test]
    fn negative_duration_fails_validation() {
        let result = resolve_json(r#"{ "timing": { "flip_duration": -1.0 } }"#);
        assert!(matches!(
            result,
            Err(DataLoadError::Config {
                source: ConfigError::NegativeDuration {
                    field: "flip_duration"
                },
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_duration_is_invalid() {
        let result = resolve_json(r#"{ "scoring": { "combo_duration": 1e300 } }"#);
        assert!(matches!(
            result,
            Err(DataLoadError::InvalidValue {
                field: "combo_duration",
                ..
            })
        ));
    }

    #[test]
    fn zero_base_points_fails_validation() {
        let result = resolve_json(r#"{ "scoring": { "base_points": 0 } }"#);
        assert!(matches!(
            result,
            Err(DataLoadError::Config {
                source: ConfigError::ZeroBasePoints,
                ..
            })
        ));
    }

    #[test]
    fn odd_layout_is_rejected() {
        let result = resolve_json(
            r#"{ "board": { "layouts": [ { "difficulty": "hard", "rows": 3, "columns": 3 } ] } }"#,
        );
        assert!(matches!(
            result,
            Err(DataLoadError::Layout {
                source: BoardError::OddTileCount { tiles: 9, .. },
                ..
            })
        ));
    }

    #[test]
    fn layout_exceeding_pool_is_rejected() {
        let result = resolve_json(
            r#"{ "board": { "symbol_pool": 2, "layouts": [ { "difficulty": "medium", "rows": 2, "columns": 3 } ] } }"#,
        );
        assert!(matches!(
            result,
            Err(DataLoadError::Layout {
                source: BoardError::InsufficientSymbols { .. },
                ..
            })
        ));
    }

    #[test]
    fn duplicate_layout_is_rejected() {
        let result = resolve_json(
            r#"{ "board": { "layouts": [
                { "difficulty": "easy", "rows": 2, "columns": 2 },
                { "difficulty": "easy", "rows": 2, "columns": 4 }
            ] } }"#,
        );
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateLayout {
                difficulty: Difficulty::Easy,
                ..
            })
        ));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
