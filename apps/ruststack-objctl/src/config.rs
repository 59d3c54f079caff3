//! Command-line configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ruststack_client_core::{ClientSettingsRegistry, SettingsSource};

/// Environment variable naming a JSON settings file.
pub const SETTINGS_FILE_VAR: &str = "S3CLIENTS_FILE";

/// Runtime configuration for `objctl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjctlConfig {
    /// JSON file mapping client names to settings.
    pub settings_file: Option<PathBuf>,
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    pub log_level: String,
}

impl Default for ObjctlConfig {
    fn default() -> Self {
        Self {
            settings_file: None,
            log_level: String::from("warn"),
        }
    }
}

impl ObjctlConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3CLIENTS_FILE` | *(unset)* |
    /// | `LOG_LEVEL` | `warn` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup(SETTINGS_FILE_VAR).filter(|v| !v.is_empty()) {
            config.settings_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Build the settings registry.
    ///
    /// Settings from the file come first; `S3CLIENTS__<name>__<Field>`
    /// environment variables then replace whole entries of the same name.
    pub fn load_registry(&self) -> Result<ClientSettingsRegistry> {
        self.load_registry_from(std::env::vars())
    }

    fn load_registry_from(
        &self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<ClientSettingsRegistry> {
        let mut registry = match &self.settings_file {
            Some(path) => ClientSettingsRegistry::from_json_file(path)
                .with_context(|| format!("failed to load client settings from {}", path.display()))?,
            None => ClientSettingsRegistry::new(),
        };

        let overrides = ClientSettingsRegistry::from_vars(vars)
            .context("invalid client settings in environment")?;
        for name in overrides.names() {
            if let Some(settings) = overrides.get(name) {
                registry.insert(name, settings);
            }
        }

        Ok(registry)
    }
}
