//! S3-specific configuration.
//!
//! Provides [`S3Config`] for configuring the MetalStack storage server.
//! Values are loaded from environment variables; the binary layers its
//! command-line flags on top.

use metalstack_core::MetalStackConfig;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default canonical owner ID recorded on new buckets.
pub const DEFAULT_OWNER_ID: &str = "metalstack";

/// S3 service configuration.
///
/// # Examples
///
/// ```
/// use metalstack_s3_core::config::S3Config;
///
/// let config = S3Config::default();
/// assert_eq!(config.owner_id, "metalstack");
/// assert!(config.storage_dir.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    /// Canonical user ID reported as the owner of buckets and objects.
    #[builder(default = String::from(DEFAULT_OWNER_ID))]
    pub owner_id: String,

    /// Optional display name reported alongside the owner ID.
    #[builder(default)]
    pub owner_display_name: Option<String>,

    /// Directory holding bucket data. `None` selects the in-memory store.
    #[builder(default)]
    pub storage_dir: Option<String>,

    /// Endpoint on which to serve HTTP requests.
    #[builder(default)]
    pub http_listen: Option<String>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            owner_id: String::from(DEFAULT_OWNER_ID),
            owner_display_name: None,
            storage_dir: None,
            http_listen: None,
            log_level: String::from("info"),
        }
    }
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_OWNER_ID` | `metalstack` |
    /// | `S3_OWNER_DISPLAY_NAME` | unset |
    /// | `STORAGE_DIR` | unset |
    /// | `HTTP_LISTEN` | unset |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::from_core(&MetalStackConfig::from_env());

        if let Ok(v) = std::env::var("S3_OWNER_ID") {
            if !v.is_empty() {
                config.owner_id = v;
            }
        }
        if let Ok(v) = std::env::var("S3_OWNER_DISPLAY_NAME") {
            config.owner_display_name = Some(v);
        }

        config
    }

    /// Seed an S3 configuration from the shared core keys.
    #[must_use]
    pub fn from_core(core: &MetalStackConfig) -> Self {
        Self {
            storage_dir: core.storage_dir.clone(),
            http_listen: core.http_listen.clone(),
            log_level: core.log_level.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = S3Config::default();
        assert_eq!(config.owner_id, "metalstack");
        assert!(config.owner_display_name.is_none());
        assert!(config.storage_dir.is_none());
        assert!(config.http_listen.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = S3Config::builder()
            .owner_id("abc123".into())
            .storage_dir(Some("/srv/s3".into()))
            .http_listen(Some("127.0.0.1:8443".into()))
            .build();

        assert_eq!(config.owner_id, "abc123");
        assert_eq!(config.storage_dir.as_deref(), Some("/srv/s3"));
        assert_eq!(config.http_listen.as_deref(), Some("127.0.0.1:8443"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_seed_from_core_config() {
        let core = MetalStackConfig {
            storage_dir: Some("/data".to_owned()),
            log_level: "debug".to_owned(),
            ..MetalStackConfig::default()
        };
        let config = S3Config::from_core(&core);
        assert_eq!(config.storage_dir.as_deref(), Some("/data"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.owner_id, DEFAULT_OWNER_ID);
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let json = serde_json::to_string(&S3Config::default()).unwrap();
        assert!(json.contains("\"ownerId\""));
        assert!(json.contains("\"ownerDisplayName\""));
    }
}
