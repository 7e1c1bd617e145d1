//! Configuration management for MetalStack services.
//!
//! All configuration is driven by environment variables. The binaries layer
//! command-line flags on top of these values.

use crate::error::{MetalStackError, MetalStackResult};

/// Global configuration for MetalStack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalStackConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Directory in which the storage server keeps its data.
    pub storage_dir: Option<String>,
    /// Endpoint on which the storage server serves HTTP requests.
    pub http_listen: Option<String>,
    /// UDP endpoint on which the DHCP responder listens.
    pub dhcp_listen: String,
}

impl Default for MetalStackConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            storage_dir: None,
            http_listen: None,
            dhcp_listen: "0.0.0.0:67".to_owned(),
        }
    }
}

impl MetalStackConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("STORAGE_DIR") {
            config.storage_dir = Some(v);
        }
        if let Ok(v) = std::env::var("HTTP_LISTEN") {
            config.http_listen = Some(v);
        }
        if let Ok(v) = std::env::var("DHCP_LISTEN") {
            config.dhcp_listen = v;
        }

        config
    }

    /// The HTTP listen endpoint, or a configuration error if it is unset.
    pub fn require_http_listen(&self) -> MetalStackResult<&str> {
        require(self.http_listen.as_deref(), "http-listen")
    }

    /// The storage directory, or a configuration error if it is unset.
    pub fn require_storage_dir(&self) -> MetalStackResult<&str> {
        require(self.storage_dir.as_deref(), "storage-dir")
    }
}

fn require<'a>(value: Option<&'a str>, flag: &str) -> MetalStackResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MetalStackError::Config(format!("must specify {flag} flag"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = MetalStackConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.dhcp_listen, "0.0.0.0:67");
        assert!(config.storage_dir.is_none());
        assert!(config.http_listen.is_none());
    }

    #[test]
    fn test_should_require_http_listen() {
        let mut config = MetalStackConfig::default();
        let err = config.require_http_listen().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: must specify http-listen flag"
        );

        config.http_listen = Some("127.0.0.1:8443".to_owned());
        assert_eq!(config.require_http_listen().unwrap(), "127.0.0.1:8443");
    }

    #[test]
    fn test_should_treat_empty_storage_dir_as_missing() {
        let config = MetalStackConfig {
            storage_dir: Some(String::new()),
            ..MetalStackConfig::default()
        };
        assert!(config.require_storage_dir().is_err());
    }
}
