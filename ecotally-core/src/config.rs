//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/ecotally/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/ecotally/` (~/.config/ecotally/)
//! - Data: `$XDG_DATA_HOME/ecotally/` (~/.local/share/ecotally/)
//! - State/Logs: `$XDG_STATE_HOME/ecotally/` (~/.local/state/ecotally/)

use crate::analytics::Zone;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Scoring policy for the dashboard engine
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Calendar configuration
    #[serde(default)]
    pub clock: ClockConfig,
}

/// Policy constants used by the dashboard engine.
///
/// The defaults reproduce the shipped behavior: a "good day" stays under
/// 15 kg, a streak survives if the latest activity was today or yesterday,
/// and completing the tree-planting goal offsets 10 kg.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Daily impact (kg) a day must stay under to count as a good day
    #[serde(default = "default_good_day_threshold")]
    pub good_day_threshold_kg: f64,

    /// How many days the newest activity may lag today before the streak resets
    #[serde(default = "default_streak_grace_days")]
    pub streak_grace_days: i64,

    /// Impact logged when the plant-a-tree goal is completed
    #[serde(default = "default_plant_tree_impact")]
    pub plant_tree_impact_kg: f64,

    /// Impact logged when the volunteer goal is completed
    #[serde(default)]
    pub volunteer_impact_kg: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            good_day_threshold_kg: default_good_day_threshold(),
            streak_grace_days: default_streak_grace_days(),
            plant_tree_impact_kg: default_plant_tree_impact(),
            volunteer_impact_kg: 0.0,
        }
    }
}

impl ScoringConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.good_day_threshold_kg.is_finite() {
            return Err(Error::Config(
                "scoring.good_day_threshold_kg must be a finite number".to_string(),
            ));
        }
        if self.streak_grace_days < 0 {
            return Err(Error::Config(
                "scoring.streak_grace_days must not be negative".to_string(),
            ));
        }
        if !self.plant_tree_impact_kg.is_finite() || !self.volunteer_impact_kg.is_finite() {
            return Err(Error::Config(
                "scoring goal impacts must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_good_day_threshold() -> f64 {
    15.0
}

fn default_streak_grace_days() -> i64 {
    1
}

fn default_plant_tree_impact() -> f64 {
    -10.0
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Record store configuration
#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    /// Override path for the JSON records snapshot
    pub records_path: Option<PathBuf>,
}

/// Calendar configuration
#[derive(Debug, Deserialize, Default)]
pub struct ClockConfig {
    /// Timezone days are counted in: `local`, `UTC`, or an IANA name
    /// such as `Europe/Berlin`. Unset means the system timezone.
    pub timezone: Option<String>,
}

impl ClockConfig {
    /// The configured zone, if any
    pub fn zone(&self) -> Result<Option<Zone>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Zone>()
                    .map_err(|e| Error::Config(format!("clock.timezone: {}", e)))
            })
            .transpose()
    }
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.scoring.validate()?;
        config.clock.zone()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/ecotally/config.toml` (~/.config/ecotally/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("ecotally").join("config.toml")
    }

    /// Returns the data directory path (for record snapshots)
    ///
    /// `$XDG_DATA_HOME/ecotally/` (~/.local/share/ecotally/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("ecotally")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/ecotally/` (~/.local/state/ecotally/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("ecotally")
    }

    /// Returns the records file path, honoring `store.records_path`
    ///
    /// Defaults to `$XDG_DATA_HOME/ecotally/records.json`
    pub fn records_path(&self) -> PathBuf {
        self.store
            .records_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("records.json"))
    }

    /// Returns the directory daily log files are written to
    ///
    /// Same as [`Config::state_dir`]; files are named `ecotally.YYYY-MM-DD.log`
    pub fn log_dir() -> PathBuf {
        Self::state_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scoring.good_day_threshold_kg, 15.0);
        assert_eq!(config.scoring.streak_grace_days, 1);
        assert_eq!(config.scoring.plant_tree_impact_kg, -10.0);
        assert_eq!(config.scoring.volunteer_impact_kg, 0.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.store.records_path.is_none());
        assert_eq!(config.clock.zone().unwrap(), None);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[scoring]
good_day_threshold_kg = 12.5
streak_grace_days = 2

[logging]
level = "debug"

[store]
records_path = "/tmp/records.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.scoring.good_day_threshold_kg, 12.5);
        assert_eq!(config.scoring.streak_grace_days, 2);
        // Unspecified fields keep their defaults
        assert_eq!(config.scoring.plant_tree_impact_kg, -10.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.records_path(),
            PathBuf::from("/tmp/records.json")
        );
    }

    #[test]
    fn test_scoring_validation() {
        assert!(ScoringConfig::default().validate().is_ok());

        let config = ScoringConfig {
            streak_grace_days: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            good_day_threshold_kg: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clock_timezone() {
        let config: Config = toml::from_str("[clock]\ntimezone = \"Europe/Berlin\"\n").unwrap();
        assert!(matches!(config.clock.zone().unwrap(), Some(Zone::Named(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[clock]\ntimezone = \"Nowhere/Special\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("clock.timezone")));
    }

    #[test]
    fn test_load_from_rejects_invalid_scoring() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nstreak_grace_days = -3\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
