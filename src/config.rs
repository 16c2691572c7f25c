use serde::Deserialize;

use crate::nodes::RotationStrategy;

/// Runtime configuration, sourced from the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Node endpoint pool, one of which serves each bundle
    pub node_urls: Vec<String>,
    /// Directory holding the three persisted bundle-hash records
    pub state_dir: String,
    /// Process every unconfirmed bundle instead of only previously-failed ones
    pub promote_all: bool,
    /// Depth for the tip-selection walk backing a promotion
    pub depth: u8,
    /// Smaller depth used when falling back to reattachment
    pub reattach_depth: u8,
    /// Proof-of-work difficulty required by the network
    pub min_weight_magnitude: u8,
    /// Maximum age of a tail still accepted as a promotion anchor
    pub max_depth_minutes: i64,
    pub rotation_strategy: RotationStrategy,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let node_urls: Vec<String> = std::env::var("NODE_URLS")
            .unwrap_or_else(|_| "https://nodes.thetangle.org:443".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rotation_strategy = match std::env::var("ROTATION_STRATEGY")
            .unwrap_or_else(|_| "round-robin".to_string())
            .as_str()
        {
            "round-robin" => RotationStrategy::RoundRobin,
            "random" => RotationStrategy::Random,
            other => {
                return Err(config::ConfigError::Message(format!(
                    "unknown ROTATION_STRATEGY: {}",
                    other
                )))
            }
        };

        Ok(Self {
            node_urls,
            state_dir: std::env::var("STATE_DIR").unwrap_or_else(|_| "state".to_string()),
            promote_all: parse_env("PROMOTE_ALL", false)?,
            depth: parse_env("DEPTH", 4)?,
            reattach_depth: parse_env("REATTACH_DEPTH", 3)?,
            min_weight_magnitude: parse_env("MIN_WEIGHT_MAGNITUDE", 14)?,
            max_depth_minutes: parse_env("MAX_DEPTH_MINUTES", 11)?,
            rotation_strategy,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, config::ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| config::ConfigError::Message(format!("invalid {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
