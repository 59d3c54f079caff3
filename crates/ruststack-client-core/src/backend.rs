//! The storage capability wrapped by the operation layer.
//!
//! [`ObjectBackend`] is the minimum surface a storage client must expose:
//! put, streaming get (optionally by range), remove and stat. Every call takes
//! a parameter object and a [`CancellationToken`]; implementations must stop
//! promptly once the token fires and report [`OperationFault::Cancelled`].
//!
//! The trait uses `#[async_trait]` so that clients can be held as
//! `Arc<dyn ObjectBackend>`.

use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::args::{GetObjectArgs, PutObjectArgs, RemoveObjectArgs, StatObjectArgs};
use crate::error::OperationFault;

/// Metadata describing a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStat {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object name.
    pub object: String,
    /// Object size in bytes.
    pub size: u64,
    /// Entity tag.
    pub etag: Option<String>,
    /// Stored content type.
    pub content_type: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Version identifier, for versioned buckets.
    pub version_id: Option<String>,
    /// User-defined metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Result of storing an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectOutput {
    /// Bucket the object was stored in.
    pub bucket: String,
    /// Final object name.
    pub object: String,
    /// Number of bytes stored.
    pub size: u64,
    /// Entity tag.
    pub etag: Option<String>,
    /// Version identifier, for versioned buckets.
    pub version_id: Option<String>,
}

/// Boxed body stream of an object being read.
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// An object opened for reading: its metadata plus a body stream.
pub struct ObjectReader {
    /// Metadata of the object (or of the requested range).
    pub stat: ObjectStat,
    /// The payload.
    pub body: ObjectBody,
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("stat", &self.stat)
            .finish_non_exhaustive()
    }
}

/// Storage operations offered by a client.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Store an object.
    async fn put_object(
        &self,
        args: PutObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<PutObjectOutput, OperationFault>;

    /// Open an object (or a range of it) for reading.
    async fn get_object(
        &self,
        args: GetObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectReader, OperationFault>;

    /// Remove an object.
    async fn remove_object(
        &self,
        args: RemoveObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<(), OperationFault>;

    /// Read object metadata.
    async fn stat_object(
        &self,
        args: StatObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectStat, OperationFault>;
}

#[async_trait]
impl<T: ObjectBackend + ?Sized> ObjectBackend for std::sync::Arc<T> {
    async fn put_object(
        &self,
        args: PutObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<PutObjectOutput, OperationFault> {
        (**self).put_object(args, cancel).await
    }

    async fn get_object(
        &self,
        args: GetObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectReader, OperationFault> {
        (**self).get_object(args, cancel).await
    }

    async fn remove_object(
        &self,
        args: RemoveObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<(), OperationFault> {
        (**self).remove_object(args, cancel).await
    }

    async fn stat_object(
        &self,
        args: StatObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectStat, OperationFault> {
        (**self).stat_object(args, cancel).await
    }
}

/// Run `fut` unless `cancel` fires first.
///
/// Backends use this around every awaited call to the service.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, OperationFault>
where
    F: Future<Output = Result<T, OperationFault>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(OperationFault::Cancelled),
        result = fut => result,
    }
}
