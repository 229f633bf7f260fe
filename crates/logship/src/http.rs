//! Shared HTTP client construction.
//!
//! The shipper uses one `reqwest::Client` for its whole lifetime so
//! connections are pooled and reused across batches and health probes.
//! Recreating the client per request would defeat connection reuse and
//! is not supported anywhere in this crate.

use crate::config::EndpointConfig;
use core::time::Duration;
use std::sync::Arc;
use tracing::error;

/// Creates the shared HTTP client for the shipper.
///
/// The client carries the configured per-request timeout, connection
/// pooling with an idle timeout, TCP keep-alive, and the HTTPS proxy
/// when one is configured. If the proxy configuration is invalid the
/// client falls back to a direct connection rather than failing, so a
/// misconfigured proxy cannot take the shipper down.
#[must_use]
pub fn get_client(config: &Arc<EndpointConfig>) -> reqwest::Client {
    match build_client(config, true) {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to apply proxy configuration: {e}, falling back to direct connection");
            match build_client(config, false) {
                Ok(client) => client,
                Err(inner) => {
                    error!("Failed to build HTTP client: {inner}, using reqwest defaults");
                    reqwest::Client::new()
                }
            }
        }
    }
}

fn build_client(
    config: &Arc<EndpointConfig>,
    allow_proxy: bool,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.flush_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        // Enable TCP keepalive to detect dead connections
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if allow_proxy {
        if let Some(https_uri) = &config.proxy_https {
            builder = builder.proxy(reqwest::Proxy::https(https_uri)?);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_client_without_proxy() {
        let config = Arc::new(EndpointConfig {
            url: "https://logs.example.com".to_string(),
            token: "token".to_string(),
            ..Default::default()
        });
        // Building must not panic, even with the default config.
        let _client = get_client(&config);
    }

    #[test]
    fn test_get_client_with_bad_proxy_falls_back() {
        let config = Arc::new(EndpointConfig {
            url: "https://logs.example.com".to_string(),
            token: "token".to_string(),
            proxy_https: Some("not a proxy url".to_string()),
            ..Default::default()
        });
        let _client = get_client(&config);
    }
}
