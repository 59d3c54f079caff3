//! Named client settings.
//!
//! Each named configuration is an independent [`ClientSettings`] snapshot.
//! The factory only needs a [`SettingsSource`]; [`ClientSettingsRegistry`] is
//! the bundled implementation, loadable from JSON or from environment
//! variables.
//!
//! # Environment Variables
//!
//! [`ClientSettingsRegistry::from_env`] reads variables shaped as
//! `S3CLIENTS__<name>__<Field>`:
//!
//! | Field | Example |
//! |-------|---------|
//! | `Endpoint` | `S3CLIENTS__archive__Endpoint=minio.local:9000` |
//! | `AccessKey` | `S3CLIENTS__archive__AccessKey=AKID` |
//! | `SecretKey` | `S3CLIENTS__archive__SecretKey=secret` |
//! | `Region` | `S3CLIENTS__archive__Region=eu-west-1` |
//! | `SessionToken` | `S3CLIENTS__archive__SessionToken=token` |
//! | `Timeout` | `S3CLIENTS__archive__Timeout=30000` (milliseconds) |
//! | `SSL` | `S3CLIENTS__archive__SSL=false` |
//!
//! Field names are matched case-insensitively.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

/// Prefix for settings read from the environment.
pub const ENV_PREFIX: &str = "S3CLIENTS__";

/// Connection settings for one named client.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::ClientSettings;
///
/// let settings = ClientSettings::builder()
///     .endpoint("store.example")
///     .access_key("A")
///     .secret_key("B")
///     .ssl(false)
///     .build();
/// assert_eq!(settings.credentials(), Some(("A", "B")));
/// assert!(settings.region.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct ClientSettings {
    /// Endpoint host or address (`host[:port]`, optionally with a scheme).
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key. Only applied together with [`ClientSettings::secret_key`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret key. Only applied together with [`ClientSettings::access_key`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Region name.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub region: Option<String>,

    /// Session token for temporary credentials.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub session_token: Option<String>,

    /// Request timeout in milliseconds.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Whether to use encrypted transport.
    #[builder(default = true)]
    #[serde(rename = "SSL", alias = "Ssl", default = "default_ssl")]
    pub ssl: bool,
}

fn default_ssl() -> bool {
    true
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            secret_key: None,
            region: None,
            session_token: None,
            timeout: None,
            ssl: true,
        }
    }
}

impl ClientSettings {
    /// The access/secret key pair, only when both halves are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings document is not valid JSON for the expected shape.
    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings file could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// The variable or key holding the value.
        key: String,
        /// The rejected value.
        value: String,
    },
}

/// Read access to named settings bags.
pub trait SettingsSource: Send + Sync {
    /// Return the settings registered under `name`, if any.
    fn get(&self, name: &str) -> Option<ClientSettings>;
}

impl<S: BuildHasher + Send + Sync> SettingsSource for HashMap<String, ClientSettings, S> {
    fn get(&self, name: &str) -> Option<ClientSettings> {
        HashMap::get(self, name).cloned()
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn get(&self, name: &str) -> Option<ClientSettings> {
        (**self).get(name)
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for &T {
    fn get(&self, name: &str) -> Option<ClientSettings> {
        (**self).get(name)
    }
}

/// In-memory collection of named settings.
///
/// Serialized as a JSON object mapping client names to settings bags:
///
/// ```
/// use ruststack_client_core::{ClientSettingsRegistry, SettingsSource};
///
/// let registry = ClientSettingsRegistry::from_json_str(
///     r#"{ "archive": { "Endpoint": "minio.local:9000", "SSL": false } }"#,
/// )
/// .unwrap();
/// let settings = registry.get("archive").unwrap();
/// assert_eq!(settings.endpoint.as_deref(), Some("minio.local:9000"));
/// assert!(!settings.ssl);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSettingsRegistry {
    clients: HashMap<String, ClientSettings>,
}

impl ClientSettingsRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the settings for `name`.
    pub fn insert(&mut self, name: impl Into<String>, settings: ClientSettings) {
        self.clients.insert(name.into(), settings);
    }

    /// Builder-style variant of [`ClientSettingsRegistry::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, settings: ClientSettings) -> Self {
        self.insert(name, settings);
        self
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Parse a JSON object of named settings.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON object of named settings from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load settings from `S3CLIENTS__<name>__<Field>` environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars())
    }

    /// Load settings from an iterator of `(key, value)` pairs using the
    /// environment variable naming scheme.
    pub fn from_vars(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SettingsError> {
        let mut registry = Self::new();

        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let Some((name, field)) = rest.split_once("__") else {
                warn!(key = %key, "ignoring client setting without a field name");
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let settings = registry.clients.entry(name.to_owned()).or_default();
            match field.to_ascii_lowercase().as_str() {
                "endpoint" => settings.endpoint = Some(value),
                "accesskey" | "access_key" => settings.access_key = Some(value),
                "secretkey" | "secret_key" => settings.secret_key = Some(value),
                "region" => settings.region = Some(value),
                "sessiontoken" | "session_token" => settings.session_token = Some(value),
                "timeout" => {
                    let millis = value
                        .parse::<u64>()
                        .map_err(|_| SettingsError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                        })?;
                    settings.timeout = Some(millis);
                }
                "ssl" => {
                    settings.ssl =
                        parse_bool(&value).ok_or_else(|| SettingsError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                        })?;
                }
                _ => warn!(key = %key, "ignoring unknown client setting"),
            }
        }

        Ok(registry)
    }
}

impl SettingsSource for ClientSettingsRegistry {
    fn get(&self, name: &str) -> Option<ClientSettings> {
        self.clients.get(name).cloned()
    }
}

impl FromIterator<(String, ClientSettings)> for ClientSettingsRegistry {
    fn from_iter<I: IntoIterator<Item = (String, ClientSettings)>>(iter: I) -> Self {
        Self {
            clients: iter.into_iter().collect(),
        }
    }
}

/// Parse `1`/`0`/`true`/`false` (trimmed, case-insensitive).
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_should_default_to_ssl() {
        let settings = ClientSettings::default();
        assert!(settings.ssl);
        assert!(settings.endpoint.is_none());
        assert!(settings.credentials().is_none());

        let built = ClientSettings::builder().build();
        assert_eq!(built, settings);
    }

    #[test]
    fn test_should_require_both_keys_for_credentials() {
        let only_access = ClientSettings::builder().access_key("A").build();
        assert!(only_access.credentials().is_none());

        let only_secret = ClientSettings::builder().secret_key("B").build();
        assert!(only_secret.credentials().is_none());

        let both = ClientSettings::builder()
            .access_key("A")
            .secret_key("B")
            .build();
        assert_eq!(both.credentials(), Some(("A", "B")));
    }

    #[test]
    fn test_should_convert_timeout_to_duration() {
        let settings = ClientSettings::builder().timeout(1500).build();
        assert_eq!(
            settings.timeout_duration(),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_should_parse_pascal_case_json() {
        let registry = ClientSettingsRegistry::from_json_str(
            r#"{
                "primary": {
                    "Endpoint": "store.example",
                    "AccessKey": "A",
                    "SecretKey": "B",
                    "Region": "eu-west-1",
                    "SessionToken": "T",
                    "Timeout": 2500,
                    "SSL": false
                },
                "secondary": {}
            }"#,
        )
        .expect("valid json");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["primary", "secondary"]);

        let primary = registry.get("primary").expect("primary");
        assert_eq!(primary.endpoint.as_deref(), Some("store.example"));
        assert_eq!(primary.credentials(), Some(("A", "B")));
        assert_eq!(primary.region.as_deref(), Some("eu-west-1"));
        assert_eq!(primary.session_token.as_deref(), Some("T"));
        assert_eq!(primary.timeout, Some(2500));
        assert!(!primary.ssl);

        let secondary = registry.get("secondary").expect("secondary");
        assert!(secondary.ssl);
    }

    #[test]
    fn test_should_reject_malformed_json() {
        let result = ClientSettingsRegistry::from_json_str(r#"{ "a": { "Timeout": "soon" } }"#);
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_should_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "files": {{ "Endpoint": "files.local" }} }}"#).expect("write");

        let registry = ClientSettingsRegistry::from_json_file(file.path()).expect("load");
        assert_eq!(
            registry.get("files").and_then(|s| s.endpoint),
            Some("files.local".to_owned())
        );
    }

    #[test]
    fn test_should_report_missing_file() {
        let result = ClientSettingsRegistry::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_should_load_from_env_style_vars() {
        let registry = ClientSettingsRegistry::from_vars(vars(&[
            ("S3CLIENTS__archive__Endpoint", "minio.local:9000"),
            ("S3CLIENTS__archive__ACCESSKEY", "AKID"),
            ("S3CLIENTS__archive__secretkey", "secret"),
            ("S3CLIENTS__archive__SSL", "false"),
            ("S3CLIENTS__archive__Timeout", "30000"),
            ("S3CLIENTS__logs__Region", "us-west-2"),
            ("UNRELATED", "value"),
        ]))
        .expect("valid vars");

        assert_eq!(registry.len(), 2);

        let archive = registry.get("archive").expect("archive");
        assert_eq!(archive.endpoint.as_deref(), Some("minio.local:9000"));
        assert_eq!(archive.credentials(), Some(("AKID", "secret")));
        assert!(!archive.ssl);
        assert_eq!(archive.timeout, Some(30_000));

        let logs = registry.get("logs").expect("logs");
        assert_eq!(logs.region.as_deref(), Some("us-west-2"));
        assert!(logs.ssl);
    }

    #[test]
    fn test_should_reject_non_numeric_timeout() {
        let result =
            ClientSettingsRegistry::from_vars(vars(&[("S3CLIENTS__a__Timeout", "fast")]));
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
    }

    #[test]
    fn test_should_serve_settings_from_hash_map() {
        let mut map = HashMap::new();
        map.insert("x".to_owned(), ClientSettings::builder().region("r").build());
        let source: Arc<dyn SettingsSource> = Arc::new(map);
        assert_eq!(source.get("x").and_then(|s| s.region), Some("r".to_owned()));
        assert!(source.get("y").is_none());
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(" False"), Some(false));
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_should_reject_unrecognized_ssl_values() {
        for value in ["yes", "on", "ture", ""] {
            let result = ClientSettingsRegistry::from_vars(vars(&[("S3CLIENTS__a__SSL", value)]));
            assert!(
                matches!(result, Err(SettingsError::InvalidValue { .. })),
                "{value:?} should be rejected"
            );
        }

        let registry =
            ClientSettingsRegistry::from_vars(vars(&[("S3CLIENTS__a__SSL", "TRUE ")])).expect("registry");
        assert_eq!(registry.get("a").map(|s| s.ssl), Some(true));
    }
}
