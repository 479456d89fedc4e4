use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Client settings. Every field has a default, so an empty JSON object is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub development: bool,
    pub endpoint_dev: String,
    pub endpoint_prod: String,
    /// How long a received challenge waits for a local answer.
    pub challenge_timeout_ms: u64,
    /// `env_logger` filter used by the binary when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            development: true,
            endpoint_dev: "http://localhost:4000".to_string(),
            endpoint_prod: String::new(),
            challenge_timeout_ms: 5000,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Environment variable naming a JSON config file.
    pub const ENV_VAR: &'static str = "CHESS_CLIENT_CONFIG";

    pub fn endpoint(&self) -> &str {
        if self.development {
            &self.endpoint_dev
        } else {
            &self.endpoint_prod
        }
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_millis(self.challenge_timeout_ms)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read the file named by [`Self::ENV_VAR`], or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::Config(format!("{path}: {e}")))?;
                Self::from_json(&text)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.challenge_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn production_endpoint_is_selected() {
        let config = ClientConfig::from_json(
            r#"{"development": false, "endpoint_prod": "https://chess.test", "challenge_timeout_ms": 250}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint(), "https://chess.test");
        assert_eq!(config.challenge_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(ClientConfig::from_json("{"), Err(ClientError::Config(_))));
    }
}
