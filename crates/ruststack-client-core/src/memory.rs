//! In-process object backend.
//!
//! [`InMemoryBackend`] keeps buckets and objects in [`DashMap`]s and applies
//! the same bucket-name and key rules an S3 service does, so it reports the
//! same fault categories as a remote client. It is built through
//! [`InMemoryClientBuilder`], which records the settings the factory applied.
//!
//! Closing the backend with [`InMemoryBackend::close`] makes every later call
//! fail with [`OperationFault::Disposed`].

use std::collections::BTreeMap;
use std::io::Cursor;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use md5::{Digest, Md5};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::args::{GetObjectArgs, PutObjectArgs, RemoveObjectArgs, StatObjectArgs};
use crate::backend::{ObjectBackend, ObjectReader, ObjectStat, PutObjectOutput, cancellable};
use crate::error::{OperationFault, StorageFault};
use crate::factory::{ClientBuilder, ResolvedSettings};

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    etag: String,
    content_type: Option<String>,
    metadata: BTreeMap<String, String>,
    last_modified: DateTime<Utc>,
    version_id: String,
}

impl StoredObject {
    fn stat(&self, bucket: &str, object: &str) -> ObjectStat {
        ObjectStat {
            bucket: bucket.to_owned(),
            object: object.to_owned(),
            size: self.data.len() as u64,
            etag: Some(self.etag.clone()),
            content_type: self.content_type.clone(),
            last_modified: Some(self.last_modified),
            version_id: Some(self.version_id.clone()),
            metadata: self.metadata.clone(),
        }
    }
}

/// Thread-safe in-memory object store implementing [`ObjectBackend`].
///
/// # Examples
///
/// ```
/// use ruststack_client_core::memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::new();
/// backend.create_bucket("photos").unwrap();
/// assert!(backend.bucket_exists("photos"));
/// assert!(backend.create_bucket("AB").is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    buckets: DashMap<String, DashMap<String, StoredObject>>,
    resolved: ResolvedSettings,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Create an empty backend with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings applied when this backend was built.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedSettings {
        &self.resolved
    }

    /// Create a bucket.
    pub fn create_bucket(&self, bucket: &str) -> Result<(), OperationFault> {
        self.ensure_open()?;
        validate_bucket_name(bucket)?;
        if self.buckets.contains_key(bucket) {
            return Err(StorageFault::Service {
                code: "BucketAlreadyOwnedByYou".to_owned(),
                message: format!("bucket already exists: {bucket}"),
            }
            .into());
        }
        self.buckets.insert(bucket.to_owned(), DashMap::new());
        debug!(bucket = %bucket, "created bucket");
        Ok(())
    }

    /// Remove an empty bucket.
    pub fn remove_bucket(&self, bucket: &str) -> Result<(), OperationFault> {
        self.ensure_open()?;
        let objects = self.objects_len(bucket)?;
        if objects > 0 {
            return Err(StorageFault::Service {
                code: "BucketNotEmpty".to_owned(),
                message: format!("bucket is not empty: {bucket}"),
            }
            .into());
        }
        self.buckets.remove(bucket);
        Ok(())
    }

    /// Whether `bucket` exists.
    #[must_use]
    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    /// Number of objects stored in `bucket`.
    pub fn objects_len(&self, bucket: &str) -> Result<usize, OperationFault> {
        self.buckets
            .get(bucket)
            .map(|objects| objects.len())
            .ok_or_else(|| bucket_not_found(bucket))
    }

    /// Close the backend. Subsequent calls fail with [`OperationFault::Disposed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`InMemoryBackend::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), OperationFault> {
        if self.is_closed() {
            Err(OperationFault::Disposed)
        } else {
            Ok(())
        }
    }

    fn find(
        &self,
        bucket: &str,
        object: &str,
        version_id: Option<&str>,
    ) -> Result<StoredObject, OperationFault> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| bucket_not_found(bucket))?;
        objects
            .get(object)
            .filter(|stored| version_id.is_none_or(|v| v == stored.version_id))
            .map(|stored| stored.value().clone())
            .ok_or_else(|| {
                StorageFault::ObjectNotFound {
                    bucket: bucket.to_owned(),
                    object: object.to_owned(),
                }
                .into()
            })
    }
}

#[async_trait]
impl ObjectBackend for InMemoryBackend {
    async fn put_object(
        &self,
        args: PutObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<PutObjectOutput, OperationFault> {
        cancellable(cancel, async {
            self.ensure_open()?;
            validate_bucket_name(&args.bucket)?;
            validate_object_name(&args.object)?;
            let objects = self
                .buckets
                .get(&args.bucket)
                .ok_or_else(|| bucket_not_found(&args.bucket))?;

            let stored = StoredObject {
                etag: compute_etag(&args.body),
                data: args.body,
                content_type: args.content_type,
                metadata: args.metadata,
                last_modified: Utc::now(),
                version_id: Uuid::new_v4().simple().to_string(),
            };
            let output = PutObjectOutput {
                bucket: args.bucket.clone(),
                object: args.object.clone(),
                size: stored.data.len() as u64,
                etag: Some(stored.etag.clone()),
                version_id: Some(stored.version_id.clone()),
            };
            objects.insert(args.object, stored);

            debug!(bucket = %output.bucket, key = %output.object, size = output.size, "put_object completed");
            Ok(output)
        })
        .await
    }

    async fn get_object(
        &self,
        args: GetObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectReader, OperationFault> {
        cancellable(cancel, async {
            self.ensure_open()?;
            let stored = self.find(&args.bucket, &args.object, args.version_id.as_deref())?;
            let mut stat = stored.stat(&args.bucket, &args.object);

            let data = match args.range {
                Some(range) => {
                    let len = stored.data.len() as u64;
                    if range.offset >= len {
                        return Err(StorageFault::Service {
                            code: "InvalidRange".to_owned(),
                            message: format!(
                                "range start {} is beyond object size {len}",
                                range.offset
                            ),
                        }
                        .into());
                    }
                    let end = range.last_byte().map_or(len, |last| last.min(len - 1) + 1);
                    // Offsets are bounded by the object length, which fits in usize.
                    #[allow(clippy::cast_possible_truncation)]
                    let slice = stored.data.slice(range.offset as usize..end as usize);
                    slice
                }
                None => stored.data,
            };
            stat.size = data.len() as u64;

            Ok(ObjectReader {
                stat,
                body: Box::pin(Cursor::new(data)),
            })
        })
        .await
    }

    async fn remove_object(
        &self,
        args: RemoveObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<(), OperationFault> {
        cancellable(cancel, async {
            self.ensure_open()?;
            validate_bucket_name(&args.bucket)?;
            validate_object_name(&args.object)?;
            let objects = self
                .buckets
                .get(&args.bucket)
                .ok_or_else(|| bucket_not_found(&args.bucket))?;

            // Removing a missing key succeeds, as it does on S3.
            match args.version_id.as_deref() {
                Some(version) => {
                    objects.remove_if(&args.object, |_, stored| stored.version_id == version);
                }
                None => {
                    objects.remove(&args.object);
                }
            }
            debug!(bucket = %args.bucket, key = %args.object, "delete_object completed");
            Ok(())
        })
        .await
    }

    async fn stat_object(
        &self,
        args: StatObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectStat, OperationFault> {
        cancellable(cancel, async {
            self.ensure_open()?;
            let stored = self.find(&args.bucket, &args.object, args.version_id.as_deref())?;
            Ok(stored.stat(&args.bucket, &args.object))
        })
        .await
    }
}

/// [`ClientBuilder`] producing an empty [`InMemoryBackend`].
///
/// The applied settings are kept on the backend and exposed through
/// [`InMemoryBackend::resolved`]; they do not change its behavior.
#[derive(Debug, Default)]
pub struct InMemoryClientBuilder {
    resolved: ResolvedSettings,
    buckets: Vec<String>,
}

impl InMemoryClientBuilder {
    /// Settings applied so far.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedSettings {
        &self.resolved
    }

    /// Create `bucket` when the backend is built.
    pub fn add_bucket(&mut self, bucket: impl Into<String>) {
        self.buckets.push(bucket.into());
    }
}

impl ClientBuilder for InMemoryClientBuilder {
    type Client = InMemoryBackend;

    fn set_ssl(&mut self, enabled: bool) {
        self.resolved.ssl = enabled;
    }

    fn set_endpoint(&mut self, endpoint: &str) {
        self.resolved.endpoint = Some(endpoint.to_owned());
    }

    fn set_credentials(&mut self, access_key: &str, secret_key: &str) {
        self.resolved.credentials = Some((access_key.to_owned(), secret_key.to_owned()));
    }

    fn set_region(&mut self, region: &str) {
        self.resolved.region = Some(region.to_owned());
    }

    fn set_session_token(&mut self, token: &str) {
        self.resolved.session_token = Some(token.to_owned());
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.resolved.timeout = Some(timeout);
    }

    fn build(self) -> InMemoryBackend {
        let buckets = self
            .buckets
            .into_iter()
            .map(|bucket| (bucket, DashMap::new()))
            .collect();
        InMemoryBackend {
            buckets,
            resolved: self.resolved,
            closed: AtomicBool::new(false),
        }
    }
}

fn bucket_not_found(bucket: &str) -> OperationFault {
    StorageFault::BucketNotFound {
        bucket: bucket.to_owned(),
    }
    .into()
}

fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Md5::digest(data)))
}

fn invalid_bucket(bucket: &str, reason: &str) -> StorageFault {
    StorageFault::InvalidBucketName {
        bucket: bucket.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Validate a bucket name against the S3 naming rules.
///
/// Names must be 3-63 characters of lowercase letters, digits, hyphens and
/// dots, start and end with a letter or digit, contain no `..`, and not look
/// like an IPv4 address.
pub fn validate_bucket_name(bucket: &str) -> Result<(), StorageFault> {
    let len = bucket.len();
    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid_bucket(
            bucket,
            "bucket name must be between 3 and 63 characters long",
        ));
    }

    if !bucket
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid_bucket(
            bucket,
            "bucket name must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let first = bucket.as_bytes()[0];
    let last = bucket.as_bytes()[len - 1];
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid_bucket(
            bucket,
            "bucket name must start and end with a letter or number",
        ));
    }

    if bucket.contains("..") {
        return Err(invalid_bucket(
            bucket,
            "bucket name must not contain consecutive dots",
        ));
    }

    if bucket.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid_bucket(
            bucket,
            "bucket name must not be formatted as an IP address",
        ));
    }

    Ok(())
}

/// Validate an object name: 1-1024 bytes.
pub fn validate_object_name(object: &str) -> Result<(), StorageFault> {
    if object.is_empty() || object.len() > MAX_KEY_BYTES {
        return Err(StorageFault::InvalidObjectName {
            object: object.to_owned(),
            reason: format!("object name must be between 1 and {MAX_KEY_BYTES} bytes"),
        });
    }
    Ok(())
}
