//! Configuration for the takshark host.
//!
//! Supports:
//! - Loading from YAML files
//! - Environment variable overrides (`TAKSHARK__SECTION__KEY`)
//! - Validation of port routing, decoder limits and logging

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::Level;

/// Well-known TAK ports (streaming, mesh and legacy).
pub const DEFAULT_TAK_PORTS: [u16; 5] = [4242, 6969, 7171, 8087, 17012];

/// Port the OMNI feed is delivered on.
pub const DEFAULT_OMNI_PORT: u16 = 8089;

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use takshark_core::config::AppConfig;
///
/// let config = AppConfig::from_file("takshark.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which ports carry which traffic family
    #[serde(default)]
    pub ports: PortConfig,

    /// Decoder options
    #[serde(default)]
    pub dissect: DissectConfig,

    /// Listener settings for `takshark listen`
    #[serde(default)]
    pub listen: ListenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate: the optional file first,
    /// then `TAKSHARK__*` environment variables on top.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or merged.
    pub fn from_config_builder<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();
        let origin = match path.as_ref() {
            Some(path) => {
                let path = path.as_ref();
                builder = builder.add_source(config::File::from(path).required(true));
                path.display().to_string()
            }
            None => "<environment>".to_string(),
        };

        let config = builder
            .add_source(
                config::Environment::with_prefix("TAKSHARK")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ports.tak")
                    .with_list_parse_key("ports.omni")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: origin,
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    ///
    /// Checks for:
    /// - No port 0 and no port routed twice
    /// - Non-zero decoder limits
    /// - A parseable log level
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<()> {
        self.ports.validate()?;
        self.dissect.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

/// Traffic family a port is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Tak,
    Omni,
}

/// Port routing table.
///
/// The decoder itself classifies by content; ports only decide which sockets
/// the host opens and what family it expects on each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfig {
    #[serde(default = "default_tak_ports")]
    pub tak: Vec<u16>,

    #[serde(default = "default_omni_ports")]
    pub omni: Vec<u16>,
}

fn default_tak_ports() -> Vec<u16> {
    DEFAULT_TAK_PORTS.to_vec()
}

fn default_omni_ports() -> Vec<u16> {
    vec![DEFAULT_OMNI_PORT]
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            tak: default_tak_ports(),
            omni: default_omni_ports(),
        }
    }
}

impl PortConfig {
    /// Which family `port` is routed to, if any.
    pub fn role(&self, port: u16) -> Option<PortRole> {
        if self.tak.contains(&port) {
            Some(PortRole::Tak)
        } else if self.omni.contains(&port) {
            Some(PortRole::Omni)
        } else {
            None
        }
    }

    /// Every routed port with its role, TAK ports first.
    pub fn all(&self) -> impl Iterator<Item = (u16, PortRole)> + '_ {
        self.tak
            .iter()
            .map(|&p| (p, PortRole::Tak))
            .chain(self.omni.iter().map(|&p| (p, PortRole::Omni)))
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (port, role) in self.all() {
            if port == 0 {
                let field = match role {
                    PortRole::Tak => "ports.tak",
                    PortRole::Omni => "ports.omni",
                };
                return Err(ConfigError::invalid_value(field, "port 0 is not routable").into());
            }
            if !seen.insert(port) {
                return Err(ConfigError::DuplicatePort { port }.into());
            }
        }
        Ok(())
    }
}

/// Decoder options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DissectConfig {
    /// How many leading bytes to show for unsupported payloads
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,

    /// Attach the raw field map to every decoded record
    #[serde(default)]
    pub raw_fields: bool,

    /// Largest stream frame the host will buffer for reassembly
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

fn default_preview_bytes() -> usize {
    16
}

fn default_max_frame_len() -> usize {
    10 * 1024 * 1024
}

impl Default for DissectConfig {
    fn default() -> Self {
        Self {
            preview_bytes: default_preview_bytes(),
            raw_fields: false,
            max_frame_len: default_max_frame_len(),
        }
    }
}

impl DissectConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len == 0 {
            return Err(ConfigError::invalid_value("dissect.max_frame_len", "must be greater than 0").into());
        }
        Ok(())
    }
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Address to bind every configured port on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Open TCP listeners
    #[serde(default = "default_true")]
    pub tcp: bool,

    /// Open UDP sockets
    #[serde(default = "default_true")]
    pub udp: bool,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            tcp: true,
            udp: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Whether to include file/line info
    #[serde(default)]
    pub file_line: bool,

    /// Per-module log levels
    #[serde(default)]
    pub module_levels: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
            file_line: false,
            module_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }

    /// Filter directives in `EnvFilter` syntax, e.g. `info,takshark_dissect=trace`.
    pub fn directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.module_levels
                    .iter()
                    .map(|(module, level)| format!("{module}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}
