//! Named client factory.
//!
//! [`ClientFactory`] resolves a named [`ClientSettings`] bag from a
//! [`SettingsSource`] and drives a [`ClientBuilder`] through a fixed
//! precedence of layers:
//!
//! 1. transport encryption flag (always),
//! 2. endpoint,
//! 3. credentials (only when both keys are present),
//! 4. region,
//! 5. session token (independent of step 3),
//! 6. timeout,
//! 7. the caller's post-configure hook.
//!
//! The builder is then sealed with [`ClientBuilder::build`]. Construction
//! performs no network I/O and is not memoized: every call yields a new client.

use std::time::Duration;

use tracing::debug;

use crate::settings::{ClientSettings, SettingsSource};

/// Errors raised while creating a named client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// The client name was empty.
    #[error("client name must not be empty")]
    EmptyName,

    /// No settings are registered under the name.
    #[error("no client settings registered under {name:?}")]
    UnknownName {
        /// The requested name.
        name: String,
    },
}

/// A storage client under construction.
///
/// Implementations receive the resolved settings one layer at a time and
/// produce the finished client in [`ClientBuilder::build`].
pub trait ClientBuilder {
    /// The client produced by this builder.
    type Client;

    /// Enable or disable encrypted transport.
    fn set_ssl(&mut self, enabled: bool);

    /// Set the endpoint host or URL.
    fn set_endpoint(&mut self, endpoint: &str);

    /// Set static credentials.
    fn set_credentials(&mut self, access_key: &str, secret_key: &str);

    /// Set the region.
    fn set_region(&mut self, region: &str);

    /// Set the session token.
    fn set_session_token(&mut self, token: &str);

    /// Set the request timeout.
    fn set_timeout(&mut self, timeout: Duration);

    /// Seal the builder and return the client.
    fn build(self) -> Self::Client;
}

/// Snapshot of the settings a builder actually applied.
///
/// Builders keep one of these so that the outcome of resolution can be
/// inspected on the finished client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Whether encrypted transport is enabled.
    pub ssl: bool,
    /// Endpoint as given in the settings.
    pub endpoint: Option<String>,
    /// Applied `(access_key, secret_key)` pair.
    pub credentials: Option<(String, String)>,
    /// Applied region.
    pub region: Option<String>,
    /// Applied session token.
    pub session_token: Option<String>,
    /// Applied request timeout.
    pub timeout: Option<Duration>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            ssl: true,
            endpoint: None,
            credentials: None,
            region: None,
            session_token: None,
            timeout: None,
        }
    }
}

/// Apply `settings` to `builder` in precedence order (steps 1-6).
///
/// A lone access key or secret key is skipped. A session token is applied
/// even when no credential pair was.
pub fn apply_settings<B: ClientBuilder>(builder: &mut B, settings: &ClientSettings) {
    builder.set_ssl(settings.ssl);

    if let Some(endpoint) = settings.endpoint.as_deref() {
        builder.set_endpoint(endpoint);
    }

    match settings.credentials() {
        Some((access_key, secret_key)) => builder.set_credentials(access_key, secret_key),
        None if settings.access_key.is_some() || settings.secret_key.is_some() => {
            debug!("access key and secret key must both be set, credentials not applied");
        }
        None => {}
    }

    if let Some(region) = settings.region.as_deref() {
        builder.set_region(region);
    }

    // TODO: decide whether a token without a key pair should be rejected once
    // hook-supplied credential providers are tracked by the builder.
    if let Some(token) = settings.session_token.as_deref() {
        if settings.credentials().is_none() {
            debug!("applying session token without an access/secret key pair");
        }
        builder.set_session_token(token);
    }

    if let Some(timeout) = settings.timeout_duration() {
        builder.set_timeout(timeout);
    }
}

/// Creates storage clients from named settings.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::{ClientFactory, ClientSettings, ClientSettingsRegistry};
/// use ruststack_client_core::memory::InMemoryClientBuilder;
///
/// let registry = ClientSettingsRegistry::new()
///     .with("local", ClientSettings::builder().region("eu-west-1").build());
/// let factory = ClientFactory::new(registry);
///
/// let client = factory.create_client::<InMemoryClientBuilder>("local").unwrap();
/// assert_eq!(client.resolved().region.as_deref(), Some("eu-west-1"));
/// assert!(factory.create_client::<InMemoryClientBuilder>("missing").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ClientFactory<S> {
    source: S,
}

impl<S: SettingsSource> ClientFactory<S> {
    /// Create a factory reading settings from `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the settings source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Look up the settings registered under `name`.
    pub fn settings(&self, name: &str) -> Result<ClientSettings, FactoryError> {
        if name.is_empty() {
            return Err(FactoryError::EmptyName);
        }
        self.source
            .get(name)
            .ok_or_else(|| FactoryError::UnknownName {
                name: name.to_owned(),
            })
    }

    /// Create the client named `name` from a default builder.
    pub fn create_client<B>(&self, name: &str) -> Result<B::Client, FactoryError>
    where
        B: ClientBuilder + Default,
    {
        self.create_client_from(name, B::default(), |_| {})
    }

    /// Create the client named `name`, running `configure` after all
    /// settings-derived configuration and before the client is built.
    pub fn create_client_with<B, F>(&self, name: &str, configure: F) -> Result<B::Client, FactoryError>
    where
        B: ClientBuilder + Default,
        F: FnOnce(&mut B),
    {
        self.create_client_from(name, B::default(), configure)
    }

    /// Create the client named `name` starting from an explicit `builder`.
    pub fn create_client_from<B, F>(
        &self,
        name: &str,
        mut builder: B,
        configure: F,
    ) -> Result<B::Client, FactoryError>
    where
        B: ClientBuilder,
        F: FnOnce(&mut B),
    {
        let settings = self.settings(name)?;

        debug!(
            client = %name,
            endpoint = ?settings.endpoint,
            region = ?settings.region,
            ssl = settings.ssl,
            "resolving storage client",
        );

        apply_settings(&mut builder, &settings);
        configure(&mut builder);

        Ok(builder.build())
    }
}
