//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `climahub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.
//!
//! `[control]` and `[[areas]]` only seed an empty store; once a snapshot has
//! been saved the database is authoritative.

use serde::Deserialize;

use climahub_domain::actuator::Actuator;
use climahub_domain::area::{
    Area, DEFAULT_BIAS, DEFAULT_GAIN, DEFAULT_MAX_SETPOINT, DEFAULT_MIN_SETPOINT, DEFAULT_STEP,
};
use climahub_domain::error::ClimaError;
use climahub_domain::options::ControlOptions;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
    /// Control options written on first start.
    pub control: ControlOptions,
    /// Areas written on first start.
    pub areas: Vec<AreaConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Register a simulated device and sensor for every area.
    pub virtual_enabled: bool,
    /// Reading of every simulated sensor at start, in °C.
    pub initial_temperature: f64,
    /// Outdoor temperature the simulated rooms drift toward.
    pub ambient_temperature: f64,
    /// Seconds between two simulation steps; `0` freezes the rooms.
    pub simulation_interval_seconds: u64,
}

/// One `[[areas]]` entry.
///
/// ```toml
/// [[areas]]
/// name = "Living room"
/// sensor = "sensor.living"
/// actuator = { kind = "thermostat", entity = "climate.living" }
/// supports_cool = true
/// ```
#[derive(Debug, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub sensor: String,
    pub actuator: Actuator,
    #[serde(default = "default_true")]
    pub supports_heat: bool,
    #[serde(default)]
    pub supports_cool: bool,
    #[serde(default = "default_min_setpoint")]
    pub min_setpoint: f64,
    #[serde(default = "default_max_setpoint")]
    pub max_setpoint: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_bias")]
    pub bias: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
}

fn default_true() -> bool {
    true
}

fn default_min_setpoint() -> f64 {
    DEFAULT_MIN_SETPOINT
}

fn default_max_setpoint() -> f64 {
    DEFAULT_MAX_SETPOINT
}

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_bias() -> f64 {
    DEFAULT_BIAS
}

fn default_gain() -> f64 {
    DEFAULT_GAIN
}

impl AreaConfig {
    /// Build a validated [`Area`] with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] when the entry is invalid.
    pub fn to_area(&self) -> Result<Area, ClimaError> {
        Area::builder()
            .name(self.name.clone())
            .sensor(self.sensor.clone())
            .actuator(self.actuator.clone())
            .supports_heat(self.supports_heat)
            .supports_cool(self.supports_cool)
            .bounds(self.min_setpoint, self.max_setpoint)
            .step(self.step)
            .bias(self.bias)
            .gain(self.gain)
            .build()
    }
}

impl Config {
    /// Load configuration from `climahub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("climahub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CLIMAHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CLIMAHUB_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("CLIMAHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("CLIMAHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("CLIMAHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.control.validate().map_err(ConfigError::Control)?;
        for area in &self.areas {
            area.to_area().map_err(ConfigError::Control)?;
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:climahub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "climahubd=info,climahub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
            initial_temperature: 19.0,
            ambient_temperature: 10.0,
            simulation_interval_seconds: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A `[control]` option or `[[areas]]` entry breaks a domain rule.
    #[error("invalid control configuration")]
    Control(#[source] ClimaError),
}
