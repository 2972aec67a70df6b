//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Rooms created at startup
    pub rooms: Vec<String>,
    /// Directory holding `index.html` and `game.html`
    pub static_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // PORT wins over SERVER_ADDR when both are set
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
        };

        let rooms: Vec<String> = lookup("ROOMS")
            .unwrap_or_else(|| "main".to_string())
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if rooms.is_empty() {
            return Err(ConfigError::NoRooms);
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr.clone()))?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            rooms,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./static")),
        })
    }

    #[cfg(test)]
    pub fn for_rooms(rooms: &[&str]) -> Self {
        Self {
            server_addr: ([127, 0, 0, 1], 0).into(),
            log_level: "debug".to_string(),
            rooms: rooms.iter().map(|r| r.to_string()).collect(),
            static_dir: PathBuf::from("./static"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("ROOMS must name at least one room")]
    NoRooms,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rooms, vec!["main"]);
        assert_eq!(config.static_dir, PathBuf::from("./static"));
    }

    #[test]
    fn port_overrides_server_addr() {
        let config =
            Config::from_lookup(lookup(&[("PORT", "9000"), ("SERVER_ADDR", "127.0.0.1:1")]))
                .unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn rooms_are_trimmed_and_filtered() {
        let config = Config::from_lookup(lookup(&[("ROOMS", " main, duel ,,")])).unwrap();
        assert_eq!(config.rooms, vec!["main", "duel"]);
    }

    #[test]
    fn empty_room_list_is_rejected() {
        let result = Config::from_lookup(lookup(&[("ROOMS", " , ")]));
        assert!(matches!(result, Err(ConfigError::NoRooms)));
    }

    #[test]
    fn bad_address_is_rejected() {
        let result = Config::from_lookup(lookup(&[("SERVER_ADDR", "not-an-addr")]));
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }
}
