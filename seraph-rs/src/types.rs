//! Client configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connection settings, usually loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// Server root (e.g. `http://localhost:7474`).
    #[validate(length(min = 1))]
    pub server: String,

    /// REST endpoint below the server root (e.g. `/db/data`).
    pub endpoint: String,

    /// Optional basic-auth user, passed through to the HTTP transport.
    pub user: Option<String>,

    /// Optional basic-auth password.
    pub password: Option<String>,

    /// Per-request timeout in seconds (must be > 0).
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Total retry budget for idempotent requests. `None` disables retries.
    pub retry_max_elapsed_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:7474".to_string(),
            endpoint: "/db/data".to_string(),
            user: None,
            password: None,
            timeout_secs: 30,
            retry_max_elapsed_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    /// Every variable is optional; malformed numeric values return a
    /// [`crate::SeraphError::Validation`] naming the offending variable.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let server = std::env::var("SERAPH_SERVER").unwrap_or(defaults.server);
        let endpoint = std::env::var("SERAPH_ENDPOINT").unwrap_or(defaults.endpoint);
        let user = std::env::var("SERAPH_USER").ok();
        let password = std::env::var("SERAPH_PASSWORD").ok();

        let timeout_secs = parse_env_u64("SERAPH_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs);
        let retry_max_elapsed_secs = parse_env_u64("SERAPH_RETRY_MAX_ELAPSED_SECS")?;

        let config = Self {
            server,
            endpoint,
            user,
            password,
            timeout_secs,
            retry_max_elapsed_secs,
        };

        config
            .validate()
            .map_err(|e| crate::SeraphError::Validation(e.to_string()))?;

        Ok(config)
    }

    /// Server and endpoint joined without a doubled or missing slash.
    pub fn base_url(&self) -> String {
        let server = self.server.trim_end_matches('/');
        let endpoint = self.endpoint.trim_matches('/');
        if endpoint.is_empty() {
            server.to_string()
        } else {
            format!("{server}/{endpoint}")
        }
    }
}

fn parse_env_u64(name: &str) -> crate::Result<Option<u64>> {
    match std::env::var(name) {
        Ok(val) => val.parse::<u64>().map(Some).map_err(|_| {
            crate::SeraphError::Validation(format!("{name} must be a non-negative integer"))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests in this module mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SERAPH_SERVER",
        "SERAPH_ENDPOINT",
        "SERAPH_USER",
        "SERAPH_PASSWORD",
        "SERAPH_TIMEOUT_SECS",
        "SERAPH_RETRY_MAX_ELAPSED_SECS",
    ];

    /// Runs `f` with exactly `vars` set among the SERAPH_* variables, restoring originals afterward.
    fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<(&str, Option<String>)> =
            VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

        for k in VARS {
            env::remove_var(k);
        }
        for (k, v) in vars {
            env::set_var(k, v);
        }

        let result = f();

        for (k, original) in &originals {
            match original {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }

        result
    }

    #[test]
    fn test_config_defaults() {
        with_env(&[], || {
            let config = ClientConfig::from_env().expect("config should load");
            assert_eq!(config.server, "http://localhost:7474");
            assert_eq!(config.endpoint, "/db/data");
            assert_eq!(config.timeout_secs, 30);
            assert!(config.user.is_none());
            assert!(config.retry_max_elapsed_secs.is_none());
            assert_eq!(config.base_url(), "http://localhost:7474/db/data");
        });
    }

    #[test]
    fn test_config_custom_values() {
        with_env(
            &[
                ("SERAPH_SERVER", "https://graph.example.com/"),
                ("SERAPH_ENDPOINT", "db/data/"),
                ("SERAPH_USER", "neo4j"),
                ("SERAPH_PASSWORD", "secret"),
                ("SERAPH_TIMEOUT_SECS", "5"),
                ("SERAPH_RETRY_MAX_ELAPSED_SECS", "20"),
            ],
            || {
                let config = ClientConfig::from_env().expect("config should load");
                assert_eq!(config.base_url(), "https://graph.example.com/db/data");
                assert_eq!(config.user.as_deref(), Some("neo4j"));
                assert_eq!(config.password.as_deref(), Some("secret"));
                assert_eq!(config.timeout_secs, 5);
                assert_eq!(config.retry_max_elapsed_secs, Some(20));
            },
        );
    }

    #[test]
    fn test_config_invalid_timeout() {
        with_env(&[("SERAPH_TIMEOUT_SECS", "soon")], || {
            match ClientConfig::from_env().unwrap_err() {
                crate::SeraphError::Validation(msg) => assert!(msg.contains("SERAPH_TIMEOUT_SECS")),
                e => panic!("expected Validation error, got {:?}", e),
            }
        });
    }

    #[test]
    fn test_config_zero_timeout_rejected() {
        with_env(&[("SERAPH_TIMEOUT_SECS", "0")], || {
            assert!(ClientConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_config_empty_server_rejected() {
        with_env(&[("SERAPH_SERVER", "")], || {
            assert!(ClientConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_base_url_without_endpoint() {
        let config = ClientConfig {
            endpoint: String::new(),
            ..ClientConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:7474");
    }
}
