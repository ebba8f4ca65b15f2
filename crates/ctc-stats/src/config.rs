// Configuration loading and parsing (stats.toml).

use ctc_stats_core::{CsvDirectoryProvider, RankingDefaults, RankingOptions, RankingPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "stats.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// stats.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding one CSV snapshot per division. Relative paths are
    /// resolved against the working directory.
    pub dir: PathBuf,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    #[serde(default = "default_division")]
    pub default_division: String,
    /// Divisions known to this league. Informational; an empty list disables
    /// the check on `default_division`.
    #[serde(default)]
    pub divisions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub track_min_races: usize,
    pub track_limit: usize,
    pub roster_min_races: usize,
    pub on_track_min_races: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let tracks = RankingOptions::tracks();
        Self {
            track_min_races: tracks.min_races,
            track_limit: RankingOptions::DEFAULT_TRACK_LIMIT,
            roster_min_races: RankingOptions::roster().min_races,
            on_track_min_races: RankingOptions::on_track().min_races,
        }
    }
}

fn default_file_pattern() -> String {
    CsvDirectoryProvider::DEFAULT_FILE_PATTERN.to_string()
}

fn default_division() -> String {
    "1_2".to_string()
}

impl Config {
    /// Directory provider rooted at `data.dir`, resolved against `base_dir`
    /// when relative.
    pub fn provider(&self, base_dir: &Path) -> CsvDirectoryProvider {
        let dir = if self.data.dir.is_absolute() {
            self.data.dir.clone()
        } else {
            base_dir.join(&self.data.dir)
        };
        CsvDirectoryProvider::new(dir).with_file_pattern(self.data.file_pattern.clone())
    }

    pub fn ranking_defaults(&self) -> RankingDefaults {
        let r = &self.ranking;
        RankingDefaults {
            tracks: RankingOptions {
                min_races: r.track_min_races,
                policy: RankingPolicy::Truncate(r.track_limit),
            },
            roster: RankingOptions::roster().with_min_races(r.roster_min_races),
            on_track: RankingOptions::on_track().with_min_races(r.on_track_min_races),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/stats.toml` relative to `base_dir`.
///
/// This does not copy defaults. Prefer `load_config()` which does.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE))
}

/// Load and validate an explicit config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Copy `defaults/stats.toml` into `config/` if it is not there yet.
/// Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --config",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    let source = defaults_dir.join(CONFIG_FILE);
    if !source.is_file() {
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let target = config_dir.join(CONFIG_FILE);
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", source.display()),
            })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(vec![target])
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(vec![]),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let data = &config.data;

    if !data.file_pattern.contains("{division}") {
        return Err(ConfigError::ValidationError {
            field: "data.file_pattern".into(),
            message: format!("must contain `{{division}}`, got `{}`", data.file_pattern),
        });
    }

    if data.default_division.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.default_division".into(),
            message: "must not be empty".into(),
        });
    }

    if !data.divisions.is_empty() && !data.divisions.contains(&data.default_division) {
        return Err(ConfigError::ValidationError {
            field: "data.default_division".into(),
            message: format!(
                "`{}` is not one of the configured divisions {:?}",
                data.default_division, data.divisions
            ),
        });
    }

    if config.ranking.track_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "ranking.track_limit".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
