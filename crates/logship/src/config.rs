use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_INTERVAL_SECS,
    DEFAULT_FLUSH_TIMEOUT_SECS, DEFAULT_GZIP_LEVEL,
};
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Configuration for one log-collection endpoint.
///
/// Immutable after construction and shared read-only (behind an `Arc`)
/// by the transport and the flusher.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Destination URL for event delivery (HTTP POST).
    pub url: String,
    /// Health-check URL (HTTP GET). Derived from `url` when not set
    /// explicitly.
    pub health_url: String,
    /// Value sent as the `Authorization` header.
    pub token: String,
    /// Whether request bodies are gzip-compressed.
    pub gzip: bool,
    /// Gzip compression level (0-9).
    pub gzip_level: u32,
    /// Maximum number of events per delivery batch.
    pub batch_size: usize,
    /// Maximum number of undelivered events kept across flush cycles.
    pub buffer_capacity: usize,
    /// Interval between scheduled flush cycles.
    pub flush_interval: Duration,
    /// Per-request timeout applied at the HTTP client level.
    pub flush_timeout: Duration,
    /// HTTPS proxy URL, if any.
    pub proxy_https: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            health_url: String::new(),
            token: String::new(),
            gzip: false,
            gzip_level: DEFAULT_GZIP_LEVEL,
            batch_size: DEFAULT_BATCH_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval: Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS),
            flush_timeout: Duration::from_secs(DEFAULT_FLUSH_TIMEOUT_SECS),
            proxy_https: None,
        }
    }
}

impl EndpointConfig {
    /// Creates a configuration from environment variables.
    ///
    /// `LOGSHIP_URL` and `LOGSHIP_TOKEN` are required; everything else
    /// falls back to defaults. The health-check URL defaults to
    /// `<url>/health` unless `LOGSHIP_HEALTH_URL` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("LOGSHIP_URL").map_err(|_| ConfigError::Missing("LOGSHIP_URL"))?;
        let token = env::var("LOGSHIP_TOKEN").map_err(|_| ConfigError::Missing("LOGSHIP_TOKEN"))?;
        let health_url = env::var("LOGSHIP_HEALTH_URL")
            .unwrap_or_else(|_| format!("{}/health", url.trim_end_matches('/')));
        let gzip = env::var("LOGSHIP_GZIP")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);
        let gzip_level = env::var("LOGSHIP_GZIP_LEVEL")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_GZIP_LEVEL);
        let batch_size = env::var("LOGSHIP_BATCH_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let buffer_capacity = env::var("LOGSHIP_BUFFER_CAPACITY")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BUFFER_CAPACITY);
        let flush_interval = env::var("LOGSHIP_FLUSH_INTERVAL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS));
        let flush_timeout = env::var("LOGSHIP_FLUSH_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_FLUSH_TIMEOUT_SECS));
        let proxy_https = env::var("LOGSHIP_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        let config = Self {
            url,
            health_url,
            token,
            gzip,
            gzip_level,
            batch_size,
            buffer_capacity,
            flush_interval,
            flush_timeout,
            proxy_https,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "Destination URL '{}' must be an http(s) URL",
                self.url
            )));
        }

        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Authorization token cannot be empty".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Buffer capacity must be greater than 0".to_string(),
            ));
        }

        if self.gzip_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "Gzip level {} is out of range (0-9)",
                self.gzip_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> EndpointConfig {
        EndpointConfig {
            url: "https://logs.example.com/services/collector".to_string(),
            health_url: "https://logs.example.com/services/collector/health".to_string(),
            token: "token-123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_default_config_is_rejected() {
        // No URL and no token until the caller supplies them.
        assert!(EndpointConfig::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = EndpointConfig {
            url: "ftp://logs.example.com".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = EndpointConfig {
            token: "   ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = EndpointConfig {
            batch_size: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = EndpointConfig {
            buffer_capacity: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_gzip_level() {
        let config = EndpointConfig {
            gzip_level: 10,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_gzip_levels() {
        for level in 0..=9 {
            let config = EndpointConfig {
                gzip: true,
                gzip_level: level,
                ..valid_config()
            };
            assert!(
                config.validate().is_ok(),
                "Gzip level {} should be valid",
                level
            );
        }
    }
}
