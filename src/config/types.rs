// Configuration types module
// Defines the data structures deserialized from fdsend.toml / FDSEND_* variables

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub serve: ServeConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// What gets served and how
#[derive(Debug, Deserialize, Clone)]
pub struct ServeConfig {
    /// Directory files and archives are served from
    pub root: String,
    /// Charset appended to text content types
    pub charset: String,
    /// Chunk size for emulated seeks
    pub chunk_size: usize,
    /// Send `Content-Disposition: attachment` for every file
    #[serde(default)]
    pub attachment: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}
