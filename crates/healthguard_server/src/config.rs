use std::net::SocketAddr;

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:9999";
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Populate the demo account and its records at start-up.
    pub seed_demo: bool,
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 9999)),
            seed_demo: false,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> ServerResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with<F>(get: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = get("HEALTHGUARD_ADDRESS")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let address: SocketAddr = address.trim().parse().map_err(|e| {
            ServerError::Config(format!("HEALTHGUARD_ADDRESS {address:?} is not a socket address: {e}"))
        })?;

        let seed_demo = get("HEALTHGUARD_SEED_DEMO")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let max_line_bytes = match get("HEALTHGUARD_MAX_LINE_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ServerError::Config(format!(
                        "HEALTHGUARD_MAX_LINE_BYTES must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_MAX_LINE_BYTES,
        };

        Ok(Self {
            address,
            seed_demo,
            max_line_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServerConfig::from_env_with(env(&[])).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.address.to_string(), DEFAULT_ADDRESS);
    }

    #[test]
    fn reads_overrides() {
        let cfg = ServerConfig::from_env_with(env(&[
            ("HEALTHGUARD_ADDRESS", "127.0.0.1:7000"),
            ("HEALTHGUARD_SEED_DEMO", "TRUE"),
            ("HEALTHGUARD_MAX_LINE_BYTES", "4096"),
        ]))
        .unwrap();
        assert_eq!(cfg.address.port(), 7000);
        assert!(cfg.seed_demo);
        assert_eq!(cfg.max_line_bytes, 4096);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServerConfig::from_env_with(env(&[("HEALTHGUARD_ADDRESS", "nowhere")]));
        assert!(matches!(err, Err(ServerError::Config(_))));
        let err = ServerConfig::from_env_with(env(&[("HEALTHGUARD_MAX_LINE_BYTES", "0")]));
        assert!(matches!(err, Err(ServerError::Config(_))));
    }
}
