//! # Server Configuration
//!
//! Configuration management for the motel server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MOTEL_PORT=8080                                                    │
//! │     MOTEL_DATABASE_PATH=/var/lib/motel/ledger.db                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/motel-ledger/server.toml (Linux)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8080, motel.db, 4h rentals, log notifier                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/motel/ledger.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [report]
//! notifier = "spool"          # log | spool
//! spool_dir = "/var/spool/motel"
//! sender = "caja@motel.example"
//! recipients = ["gerencia@motel.example"]
//! bcc = []
//! utc_offset_minutes = -360
//!
//! [notifications]
//! cleaning = ["limpieza@motel.example"]
//! maintenance = ["mantenimiento@motel.example"]
//!
//! [rental]
//! default_rent_hours = 4
//! default_renewal_hours = 1
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use motel_core::{DEFAULT_RENEWAL_DURATION_HOURS, DEFAULT_RENT_DURATION_HOURS, MAX_RENT_DURATION_HOURS};
use motel_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// The SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds a writer waits for the write lock.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("motel.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

impl DatabaseSettings {
    /// Pool configuration for [`motel_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }
}

/// How turn reports leave the building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Structured log line only.
    #[default]
    Log,
    /// Write the document into `spool_dir` for a mail relay.
    Spool,
}

impl std::str::FromStr for NotifierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(NotifierKind::Log),
            "spool" => Ok(NotifierKind::Spool),
            _ => Err(ConfigError::Invalid(format!("unknown notifier: {}", s))),
        }
    }
}

/// Turn report rendering and delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub notifier: NotifierKind,

    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    #[serde(default = "default_sender")]
    pub sender: String,

    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default)]
    pub bcc: Vec<String>,

    /// Offset used to print report timestamps, in minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

fn default_sender() -> String {
    "ledger@localhost".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            notifier: NotifierKind::default(),
            spool_dir: default_spool_dir(),
            sender: default_sender(),
            recipients: Vec::new(),
            bcc: Vec::new(),
            utc_offset_minutes: 0,
        }
    }
}

impl ReportSettings {
    /// The display offset. Validated on load, so the fallback is UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// Distribution lists for status-change requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Notified when a room goes Dirty.
    #[serde(default)]
    pub cleaning: Vec<String>,

    /// Notified when a room goes to Maintenance.
    #[serde(default)]
    pub maintenance: Vec<String>,
}

/// Defaults applied when a request leaves the duration out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalSettings {
    #[serde(default = "default_rent_hours")]
    pub default_rent_hours: i64,

    #[serde(default = "default_renewal_hours")]
    pub default_renewal_hours: i64,
}

fn default_rent_hours() -> i64 {
    DEFAULT_RENT_DURATION_HOURS
}

fn default_renewal_hours() -> i64 {
    DEFAULT_RENEWAL_DURATION_HOURS
}

impl Default for RentalSettings {
    fn default() -> Self {
        RentalSettings {
            default_rent_hours: default_rent_hours(),
            default_renewal_hours: default_renewal_hours(),
        }
    }
}

// =============================================================================
// Server Config
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub report: ReportSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub rental: RentalSettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (server.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading server config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        for (name, hours) in [
            ("rental.default_rent_hours", self.rental.default_rent_hours),
            ("rental.default_renewal_hours", self.rental.default_renewal_hours),
        ] {
            if !(1..=MAX_RENT_DURATION_HOURS).contains(&hours) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_RENT_DURATION_HOURS, hours
                )));
            }
        }

        // chrono accepts strictly less than one day either way
        if self.report.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(format!(
                "report.utc_offset_minutes out of range: {}",
                self.report.utc_offset_minutes
            )));
        }

        let addresses = self
            .report
            .recipients
            .iter()
            .chain(&self.report.bcc)
            .chain(&self.notifications.cleaning)
            .chain(&self.notifications.maintenance)
            .chain(std::iter::once(&self.report.sender));
        for address in addresses {
            if !address.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "not an email address: {}",
                    address
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("MOTEL_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("MOTEL_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid MOTEL_PORT"),
            }
        }

        if let Ok(path) = std::env::var("MOTEL_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(kind) = std::env::var("MOTEL_NOTIFIER") {
            match kind.parse() {
                Ok(parsed) => self.report.notifier = parsed,
                Err(_) => warn!(notifier = %kind, "Unknown notifier in environment"),
            }
        }

        if let Ok(dir) = std::env::var("MOTEL_SPOOL_DIR") {
            self.report.spool_dir = PathBuf::from(dir);
        }

        if let Ok(list) = std::env::var("MOTEL_REPORT_RECIPIENTS") {
            self.report.recipients = split_list(&list);
        }

        if let Ok(offset) = std::env::var("MOTEL_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = offset.parse::<i32>() {
                self.report.utc_offset_minutes = minutes;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "motel", "motel-ledger")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
