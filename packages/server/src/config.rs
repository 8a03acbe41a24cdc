//! Server settings read from the environment at startup.

use road_assets_database::db::DatabaseConfig;

/// Bind address used when `BIND_ADDR` is not set.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Port used when `PORT` is not set or unparseable.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and the database variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("PORT").ok(),
            DatabaseConfig::from_env(),
        )
    }

    fn from_vars(bind_addr: Option<String>, port: Option<String>, database: DatabaseConfig) -> Self {
        Self {
            bind_addr: bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: port.and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_PORT),
            database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_vars(None, None, DatabaseConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = ServerConfig::from_vars(
            Some("0.0.0.0".to_string()),
            Some("http".to_string()),
            DatabaseConfig::default(),
        );
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
