//! Integration tests for the RustStack storage client.
//!
//! These tests require a running S3-compatible server at `localhost:4566`.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p ruststack-client-integration -- --ignored
//! ```

use std::sync::Once;

use ruststack_client_core::{ClientFactory, ClientSettings, ClientSettingsRegistry};
use ruststack_client_s3::{S3Client, S3ClientBuilder};

static INIT: Once = Once::new();

/// Name the local server's settings are registered under.
pub const LOCAL_CLIENT: &str = "local";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Settings pointing at the local server.
#[must_use]
pub fn local_settings() -> ClientSettings {
    ClientSettings::builder()
        .endpoint(endpoint_url())
        .access_key("test")
        .secret_key("test")
        .region("us-east-1")
        .timeout(30_000_u64)
        .ssl(endpoint_url().starts_with("https://"))
        .build()
}

/// Factory with the local server registered as [`LOCAL_CLIENT`].
#[must_use]
pub fn factory() -> ClientFactory<ClientSettingsRegistry> {
    init_tracing();
    ClientFactory::new(ClientSettingsRegistry::new().with(LOCAL_CLIENT, local_settings()))
}

/// Create a client for the local server.
#[must_use]
pub fn s3_client() -> S3Client {
    factory()
        .create_client::<S3ClientBuilder>(LOCAL_CLIENT)
        .expect("local client settings are registered")
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket and return its name. Caller is responsible for cleanup.
pub async fn create_test_bucket(client: &S3Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .sdk()
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &S3Client, bucket: &str) {
    let sdk = client.sdk();
    let mut continuation_token = None;
    loop {
        let mut req = sdk.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token.take() {
            req = req.continuation_token(token);
        }
        let Ok(resp) = req.send().await else {
            return; // Bucket may not exist.
        };

        for obj in resp.contents() {
            if let Some(key) = obj.key() {
                let _ = sdk.delete_object().bucket(bucket).key(key).send().await;
            }
        }

        if resp.is_truncated() == Some(true) {
            continuation_token = resp.next_continuation_token().map(ToOwned::to_owned);
        } else {
            break;
        }
    }

    let _ = sdk.delete_bucket().bucket(bucket).send().await;
}

mod test_errors;
mod test_factory;
mod test_operations;
