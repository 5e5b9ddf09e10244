// Configuration loading
// Read-only TOML preferences merged with command-line overrides

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::Level;

use crate::tsw_game::Difficulty;
use crate::tsw_grid::Placement;

const APP_NAME: &str = "termsweeper";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Difficulty as written in the config file or on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultySetting {
    Board(Difficulty),
    /// Bare `custom`: the board comes from the custom_* keys
    CustomKeys,
}

impl FromStr for DifficultySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("custom") {
            Ok(DifficultySetting::CustomKeys)
        } else {
            s.parse().map(DifficultySetting::Board)
        }
    }
}

impl<'de> Deserialize<'de> for DifficultySetting {
    fn deserialize<D>(deserializer: D) -> Result<DifficultySetting, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Command-line options; anything given here wins over the config file
#[derive(Parser, Debug)]
#[command(name = "termsweeper", version, about = "Minesweeper for the terminal, mouse included")]
pub struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// beginner, intermediate, expert, custom or custom:COLSxROWSxMINES
    #[arg(short, long)]
    pub difficulty: Option<DifficultySetting>,

    /// Custom board width (implies a custom difficulty)
    #[arg(long)]
    pub cols: Option<usize>,

    /// Custom board height (implies a custom difficulty)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Custom mine count (implies a custom difficulty)
    #[arg(long)]
    pub mines: Option<usize>,

    /// How mines are scattered over a new board
    #[arg(long, value_enum)]
    pub placement: Option<Placement>,

    /// Seed the board generator for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Draw tiles with plain ASCII glyphs
    #[arg(long)]
    pub ascii: bool,

    /// Interface language (en or zh)
    #[arg(long)]
    pub lang: Option<String>,

    /// Write the log here instead of the cache directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Most verbose level written to the log
    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

/// User preferences, never written back
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    difficulty: DifficultySetting,

    // Board used by the custom difficulty
    pub custom_cols: usize,
    pub custom_rows: usize,
    pub custom_mines: usize,

    pub placement: Placement,
    pub ascii_icons: bool,    // Use ASCII fallback glyphs
    pub show_indicator: bool, // Mark the hovered cell
    pub language: String,     // "en" or "zh"
}

impl Default for Config {
    fn default() -> Self {
        // Follow the system language unless told otherwise
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let language = if system_lang.to_lowercase().starts_with("zh") {
            "zh".to_string()
        } else {
            "en".to_string()
        };

        Config {
            difficulty: DifficultySetting::Board(Difficulty::Beginner),
            custom_cols: 20,
            custom_rows: 12,
            custom_mines: 30,
            placement: Placement::Scan,
            ascii_icons: false,
            show_indicator: true,
            language,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(s)
    }

    /// Board to play; a bare `custom` takes its size from the custom_* keys
    pub fn difficulty(&self) -> Difficulty {
        match self.difficulty {
            DifficultySetting::Board(difficulty) => difficulty,
            DifficultySetting::CustomKeys => self.custom_difficulty(),
        }
    }

    /// Merge command-line overrides into the file settings
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(difficulty) = cli.difficulty {
            self.difficulty = difficulty;
        }
        if cli.cols.is_some() || cli.rows.is_some() || cli.mines.is_some() {
            self.custom_cols = cli.cols.unwrap_or(self.custom_cols);
            self.custom_rows = cli.rows.unwrap_or(self.custom_rows);
            self.custom_mines = cli.mines.unwrap_or(self.custom_mines);
            self.difficulty = DifficultySetting::CustomKeys;
        }
        if let Some(placement) = cli.placement {
            self.placement = placement;
        }
        if cli.ascii {
            self.ascii_icons = true;
        }
        if let Some(lang) = &cli.lang {
            self.language = lang.clone();
        }
    }

    pub fn custom_difficulty(&self) -> Difficulty {
        Difficulty::Custom {
            mines: self.custom_mines,
            cols: self.custom_cols,
            rows: self.custom_rows,
        }
    }

    /// Board offered as "Custom" in the difficulty picker
    pub fn custom_board(&self) -> Difficulty {
        match self.difficulty() {
            custom @ Difficulty::Custom { .. } => custom,
            _ => self.custom_difficulty(),
        }
    }
}

/// Default config file location, e.g. ~/.config/termsweeper/termsweeper.toml on Linux
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|proj| proj.config_dir().join(format!("{APP_NAME}.toml")))
}

/// Default log file location under the platform cache directory
pub fn log_path() -> Option<PathBuf> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|proj| proj.cache_dir().join(format!("{APP_NAME}.log")))
}

/// Load settings from `explicit`, or from the default location
///
/// A missing default file is not an error; a missing explicit one is.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => path,
        None => return Ok(Config::default()),
    };
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    Config::from_toml(&text).map_err(|source| ConfigError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_keys() {
        let cfg = Config::from_toml(
            r#"
            difficulty = "expert"
            placement = "uniform"
            ascii_icons = true
            show_indicator = false
            language = "zh"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.difficulty(), Difficulty::Expert);
        assert_eq!(cfg.placement, Placement::Uniform);
        assert!(cfg.ascii_icons);
        assert!(!cfg.show_indicator);
        assert_eq!(cfg.language, "zh");
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_toml("").unwrap();

        assert_eq!(cfg.difficulty(), Difficulty::Beginner);
        assert_eq!(cfg.placement, Placement::Scan);
        assert_eq!(cfg.custom_cols, 20);
    }

    #[test]
    fn bare_custom_uses_custom_keys() {
        let cfg = Config::from_toml(
            r#"
            difficulty = "custom"
            custom_cols = 12
            custom_rows = 8
            custom_mines = 15
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.difficulty(),
            Difficulty::Custom { mines: 15, cols: 12, rows: 8 }
        );
    }

    #[test]
    fn explicit_empty_custom_board_is_kept() {
        let cfg = Config::from_toml(
            r#"
            difficulty = "custom:0x0x0"
            custom_cols = 12
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.difficulty(),
            Difficulty::Custom { mines: 0, cols: 0, rows: 0 }
        );
        assert_eq!(cfg.custom_board(), cfg.difficulty());
    }

    #[test]
    fn picker_custom_falls_back_to_custom_keys() {
        let cfg = Config::from_toml(r#"difficulty = "expert""#).unwrap();

        assert_eq!(
            cfg.custom_board(),
            Difficulty::Custom { mines: 30, cols: 20, rows: 12 }
        );
    }

    #[test]
    fn rejects_unknown_difficulty() {
        assert!(Config::from_toml(r#"difficulty = "nightmare""#).is_err());
    }

    #[test]
    fn cli_overrides_file_settings() {
        let mut cfg = Config::from_toml(r#"difficulty = "expert""#).unwrap();
        let cli = Cli::parse_from([
            "termsweeper",
            "--difficulty",
            "intermediate",
            "--placement",
            "uniform",
            "--ascii",
            "--lang",
            "en",
        ]);

        cfg.apply_cli(&cli);

        assert_eq!(cfg.difficulty(), Difficulty::Intermediate);
        assert_eq!(cfg.placement, Placement::Uniform);
        assert!(cfg.ascii_icons);
        assert_eq!(cfg.language, "en");
        assert_eq!(cli.log_level, Level::INFO);
    }

    #[test]
    fn board_size_flags_imply_custom() {
        let mut cfg = Config::from_toml("").unwrap();
        let cli = Cli::parse_from(["termsweeper", "--cols", "16", "--mines", "20"]);

        cfg.apply_cli(&cli);

        assert_eq!(
            cfg.difficulty(),
            Difficulty::Custom { mines: 20, cols: 16, rows: 12 }
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/termsweeper-test/config.toml");
        assert!(matches!(
            load_config(Some(path)),
            Err(ConfigError::Io { .. })
        ));
    }
}
