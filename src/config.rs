use chrono::NaiveDate;
use mealboard_core::SyncOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Sync timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between background reads
    pub poll_interval_secs: u64,
    /// Quiet period before local changes are written
    pub debounce_ms: u64,
    /// Merge-and-retry cycles before a conflicting save gives up
    pub max_conflict_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let options = SyncOptions::default();
        Self {
            poll_interval_secs: options.poll_interval.as_secs(),
            debounce_ms: options.debounce.as_millis() as u64,
            max_conflict_retries: options.max_conflict_retries,
        }
    }
}

impl SyncConfig {
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            debounce: Duration::from_millis(self.debounce_ms),
            max_conflict_retries: self.max_conflict_retries,
        }
    }
}

/// A day shown on the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayConfig {
    pub date: NaiveDate,
    pub name: String,
}

/// Layout of the board and who may use it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub roles: Vec<String>,
    /// Role allowed to approve, delete, reset and change settings
    pub organizer_role: String,
    pub meal_types: Vec<String>,
    pub days: Vec<DayConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let day = |day: u32, name: &str| DayConfig {
            date: NaiveDate::from_ymd_opt(2025, 12, day).unwrap_or(NaiveDate::MIN),
            name: name.to_string(),
        };
        Self {
            roles: ["Organisator", "Eltern", "Hamburg", "Konstanz"]
                .map(String::from)
                .to_vec(),
            organizer_role: "Organisator".to_string(),
            meal_types: ["Mittagessen", "Abendessen", "Dessert"]
                .map(String::from)
                .to_vec(),
            days: vec![
                day(23, "Anreisetag"),
                day(24, "Heiligabend"),
                day(25, "1. Weihnachtstag"),
                day(26, "2. Weihnachtstag"),
                day(27, "Abreisetag"),
            ],
        }
    }
}

impl BoardConfig {
    /// Case-insensitive role lookup returning the configured spelling.
    pub fn find_role(&self, name: &str) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn is_organizer(&self, role: &str) -> bool {
        self.organizer_role == role
    }

    /// Case-insensitive meal type lookup returning the configured spelling.
    pub fn find_meal_type(&self, name: &str) -> Option<&str> {
        self.meal_types
            .iter()
            .find(|t| t.to_lowercase() == name.to_lowercase())
            .map(String::as_str)
    }

    pub fn day_name(&self, date: NaiveDate) -> Option<&str> {
        self.days
            .iter()
            .find(|d| d.date == date)
            .map(|d| d.name.as_str())
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Board server URL
    pub server_url: ConfigValue<String>,
    /// Directory for the session file
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub sync: SyncConfig,
    pub board: BoardConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    data_dir: Option<PathBuf>,
    sync: Option<SyncConfig>,
    board: Option<BoardConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut server_url =
            ConfigValue::new("http://localhost:8080".to_string(), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();
        let mut board = BoardConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
            if let Some(board_config) = file_config.board {
                board = board_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("MEALBOARD_SERVER_URL") {
            server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("MEALBOARD_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(secs) = std::env::var("MEALBOARD_POLL_INTERVAL_SECS") {
            sync.poll_interval_secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MEALBOARD_POLL_INTERVAL_SECS", secs))?;
        }

        Ok(Self {
            server_url,
            data_dir,
            config_file,
            sync,
            board,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/mealboard/
    /// - macOS: ~/Library/Application Support/mealboard/
    /// - Windows: %APPDATA%/mealboard/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealboard")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/mealboard/
    /// - macOS: ~/Library/Application Support/mealboard/
    /// - Windows: %APPDATA%/mealboard/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealboard")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
