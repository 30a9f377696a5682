use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_SITE_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Pick the backend base URL: the server-only setting, then the publicly exposed
/// one, then `fallback`. Blank settings count as unset.
pub fn resolve_base_url(server: Option<&str>, public: Option<&str>, fallback: &str) -> String {
    [server, public]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(fallback)
        .trim_end_matches('/')
        .to_string()
}

/// Runtime settings, read once at start-up and handed to whatever needs them.
/// ```sh
/// API_BASE=http://backend:8000        # server-side backend
/// PUBLIC_API_BASE=http://localhost:8000
/// SITE_ORIGIN=http://localhost:3000   # where the mock endpoints live
/// BIND_ADDR=127.0.0.1
/// PORT=3000
/// POLL_INTERVAL_MS=5000
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: Option<String>,
    pub public_api_base: Option<String>,
    pub site_origin: String,
    pub bind_addr: String,
    pub port: u16,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: None,
            public_api_base: None,
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 3000,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match set("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::NotANumber {
                name: "PORT",
                value: v,
            })?,
            None => defaults.port,
        };

        let poll_interval = match set("POLL_INTERVAL_MS") {
            Some(v) => {
                let ms = v.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
                    name: "POLL_INTERVAL_MS",
                    value: v,
                })?;
                if ms == 0 {
                    return Err(ConfigError::Zero {
                        name: "POLL_INTERVAL_MS",
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.poll_interval,
        };

        let config = Config {
            api_base: set("API_BASE"),
            public_api_base: set("PUBLIC_API_BASE"),
            site_origin: set("SITE_ORIGIN")
                .map(|o| o.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_origin),
            bind_addr: set("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            poll_interval,
        };
        debug!("configuration loaded: {config:?}");
        Ok(config)
    }

    /// Base URL of the backend API.
    pub fn api_base(&self) -> String {
        resolve_base_url(
            self.api_base.as_deref(),
            self.public_api_base.as_deref(),
            DEFAULT_API_BASE,
        )
    }

    /// Whether a real backend was configured, as opposed to falling back to defaults.
    pub fn has_backend(&self) -> bool {
        [&self.api_base, &self.public_api_base]
            .into_iter()
            .flatten()
            .any(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn precedence_is_server_then_public_then_fallback() {
        assert_eq!(
            resolve_base_url(Some("http://srv"), Some("http://pub"), "http://fb"),
            "http://srv"
        );
        assert_eq!(resolve_base_url(None, Some("http://pub"), "http://fb"), "http://pub");
        assert_eq!(resolve_base_url(None, None, "http://fb"), "http://fb");
    }

    #[test]
    fn blank_settings_fall_through() {
        assert_eq!(resolve_base_url(Some(""), Some("  "), "http://fb"), "http://fb");
        assert_eq!(resolve_base_url(Some(" "), Some("http://pub/"), "http://fb"), "http://pub");
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base(), DEFAULT_API_BASE);
        assert!(!config.has_backend());
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
    }

    #[test]
    fn reads_every_setting() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE", "http://backend:8000"),
            ("PUBLIC_API_BASE", "http://localhost:8000"),
            ("SITE_ORIGIN", "http://example.test/"),
            ("PORT", "8080"),
            ("POLL_INTERVAL_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.api_base(), "http://backend:8000");
        assert!(config.has_backend());
        assert_eq!(config.site_origin, "http://example.test");
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { name: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[("POLL_INTERVAL_MS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { .. }));
    }
}
