//! [`ClientBuilder`] over the `aws-sdk-s3` configuration builder.

use std::time::Duration;

use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Builder as SdkConfigBuilder, Region};
use ruststack_client_core::{ClientBuilder, ResolvedSettings};
use tracing::debug;

use crate::client::S3Client;

/// Region used when the settings do not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Provider name attached to credentials built from settings.
const PROVIDER_NAME: &str = "ruststack-client-settings";

/// Builds an [`S3Client`] from factory settings.
///
/// Custom endpoints are addressed path-style unless [`Self::set_path_style`]
/// chose otherwise; changing transport encryption later keeps that choice.
/// An endpoint without a scheme
/// gets `https://` when transport encryption is enabled and `http://`
/// otherwise; an explicit scheme is kept as given.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::ClientBuilder;
/// use ruststack_client_s3::S3ClientBuilder;
///
/// let mut builder = S3ClientBuilder::default();
/// builder.set_ssl(false);
/// builder.set_endpoint("localhost:9000");
/// builder.set_credentials("minio", "minio123");
/// let client = builder.build();
/// assert_eq!(client.endpoint_url(), Some("http://localhost:9000"));
/// ```
#[derive(Debug)]
pub struct S3ClientBuilder {
    config: SdkConfigBuilder,
    resolved: ResolvedSettings,
    path_style: Option<bool>,
}

impl Default for S3ClientBuilder {
    fn default() -> Self {
        let mut config = SdkConfigBuilder::new();
        config
            .set_behavior_version(Some(BehaviorVersion::latest()))
            .set_region(Some(Region::new(DEFAULT_REGION)));
        Self {
            config,
            resolved: ResolvedSettings::default(),
            path_style: None,
        }
    }
}

impl S3ClientBuilder {
    /// Settings applied so far.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedSettings {
        &self.resolved
    }

    /// The underlying SDK configuration, for settings the factory does not
    /// cover (HTTP client, retry policy, interceptors).
    pub fn config_mut(&mut self) -> &mut SdkConfigBuilder {
        &mut self.config
    }

    /// Choose path-style (`true`) or virtual-hosted (`false`) addressing.
    pub fn set_path_style(&mut self, enabled: bool) {
        self.path_style = Some(enabled);
        self.config.set_force_path_style(Some(enabled));
    }

    /// Addressing style chosen so far, `None` for the SDK default.
    #[must_use]
    pub fn path_style(&self) -> Option<bool> {
        self.path_style
    }

    fn endpoint_url(&self) -> Option<String> {
        self.resolved
            .endpoint
            .as_deref()
            .map(|endpoint| endpoint_url(endpoint, self.resolved.ssl))
    }

    fn apply_endpoint(&mut self) {
        if let Some(url) = self.endpoint_url() {
            self.config.set_endpoint_url(Some(url));
        }
    }

    fn apply_credentials(&mut self) {
        let Some((access_key, secret_key)) = &self.resolved.credentials else {
            return;
        };
        let credentials = Credentials::new(
            access_key,
            secret_key,
            self.resolved.session_token.clone(),
            None,
            PROVIDER_NAME,
        );
        self.config
            .set_credentials_provider(Some(SharedCredentialsProvider::new(credentials)));
    }
}

impl ClientBuilder for S3ClientBuilder {
    type Client = S3Client;

    fn set_ssl(&mut self, enabled: bool) {
        self.resolved.ssl = enabled;
        self.apply_endpoint();
    }

    fn set_endpoint(&mut self, endpoint: &str) {
        self.resolved.endpoint = Some(endpoint.to_owned());
        self.apply_endpoint();
        if self.path_style.is_none() {
            self.set_path_style(true);
        }
    }

    fn set_credentials(&mut self, access_key: &str, secret_key: &str) {
        self.resolved.credentials = Some((access_key.to_owned(), secret_key.to_owned()));
        self.apply_credentials();
    }

    fn set_region(&mut self, region: &str) {
        self.resolved.region = Some(region.to_owned());
        self.config.set_region(Some(Region::new(region.to_owned())));
    }

    fn set_session_token(&mut self, token: &str) {
        self.resolved.session_token = Some(token.to_owned());
        if self.resolved.credentials.is_some() {
            self.apply_credentials();
        } else {
            debug!("session token recorded without an access key pair, attached once credentials are set");
        }
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.resolved.timeout = Some(timeout);
        self.config.set_timeout_config(Some(
            TimeoutConfig::builder().operation_timeout(timeout).build(),
        ));
    }

    fn build(self) -> S3Client {
        let endpoint_url = self.endpoint_url();
        debug!(
            endpoint = endpoint_url.as_deref().unwrap_or("default"),
            ssl = self.resolved.ssl,
            "building S3 client"
        );
        S3Client::new(
            aws_sdk_s3::Client::from_conf(self.config.build()),
            self.resolved,
            endpoint_url,
        )
    }
}

/// Turn a configured endpoint into a URL.
fn endpoint_url(endpoint: &str, ssl: bool) -> String {
    if endpoint.contains("://") {
        endpoint.to_owned()
    } else if ssl {
        format!("https://{endpoint}")
    } else {
        format!("http://{endpoint}")
    }
}
