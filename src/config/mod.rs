//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::GameSettings;
use crate::util::rate_limit::RELAY_RATE_LIMIT;
use crate::util::time::DEFAULT_FRAME_RATE;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, empty allows any
    pub client_origins: Vec<String>,

    /// Run a game session in this process
    pub host_session: bool,
    /// Host ticks per second
    pub frame_rate: u32,
    /// Relay publishes per second across all triggers
    pub relay_rate_limit: u32,

    /// Fixed obstacle seed for reproducible rounds
    pub game_seed: Option<u64>,
    pub scale_ratio: f32,
    pub collision_inset: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr.clone()))?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origins,

            host_session: parse_bool(&lookup, "HOST_SESSION", true)?,
            frame_rate: parse_or(&lookup, "FRAME_RATE", DEFAULT_FRAME_RATE)?,
            relay_rate_limit: parse_or(&lookup, "RELAY_RATE_LIMIT", RELAY_RATE_LIMIT)?,

            game_seed: parse_opt(&lookup, "GAME_SEED")?,
            scale_ratio: parse_or(&lookup, "SCALE_RATIO", 1.0)?,
            collision_inset: parse_or(&lookup, "COLLISION_INSET", 0.0)?,
        })
    }

    /// Game tunables with the environment overrides applied
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            seed: self.game_seed,
            scale_ratio: self.scale_ratio,
            collision_inset: self.collision_inset,
            ..GameSettings::default()
        }
    }
}

fn parse_opt<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, var)?.unwrap_or(default))
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("Invalid server address format: {0}")]
    InvalidAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.client_origins.is_empty());
        assert!(config.host_session);
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.game_seed, None);
    }

    #[test]
    fn test_port_wins_over_server_addr() {
        let config = config(&[("PORT", "8088"), ("SERVER_ADDR", "127.0.0.1:9000")]).unwrap();
        assert_eq!(config.server_addr.port(), 8088);
    }

    #[test]
    fn test_origin_list_and_overrides() {
        let config = config(&[
            ("CLIENT_ORIGIN", "http://a.test, http://b.test,"),
            ("HOST_SESSION", "false"),
            ("GAME_SEED", "7"),
            ("COLLISION_INSET", "0.1"),
        ])
        .unwrap();
        assert_eq!(config.client_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.host_session);

        let settings = config.game_settings();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.collision_inset, 0.1);
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert!(matches!(
            config(&[("FRAME_RATE", "fast")]),
            Err(ConfigError::Invalid { var: "FRAME_RATE", .. })
        ));
        assert!(matches!(
            config(&[("HOST_SESSION", "maybe")]),
            Err(ConfigError::Invalid { var: "HOST_SESSION", .. })
        ));
        assert!(matches!(
            config(&[("SERVER_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}
