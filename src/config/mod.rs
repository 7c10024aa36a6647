// Configuration module entry point
// Loads serving configuration from file and environment

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{Config, LoggingConfig, ServeConfig, ServerConfig};

/// Config file looked up when no path is given (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "fdsend";

impl Config {
    /// Load configuration from the default file
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `FDSEND_*` environment variables override it,
    /// e.g. `FDSEND_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FDSEND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("serve.root", ".")?
            .set_default("serve.charset", "UTF-8")?
            .set_default("serve.chunk_size", 8192)?
            .set_default("serve.attachment", false)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from("does-not-exist/fdsend-test").unwrap();
        assert_eq!(cfg.serve.chunk_size, 8192);
        assert_eq!(cfg.serve.charset, "UTF-8");
        assert!(!cfg.serve.attachment);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.get_socket_addr().is_ok());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("FDSEND_SERVER__PORT", "9123");
        let cfg = Config::load_from("does-not-exist/fdsend-test");
        std::env::remove_var("FDSEND_SERVER__PORT");
        assert_eq!(cfg.unwrap().server.port, 9123);
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/fdsend-test").unwrap();
        cfg.server.host = "not an address".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
