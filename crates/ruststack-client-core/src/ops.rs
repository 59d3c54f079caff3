//! Result-oriented object operations.
//!
//! Each function builds its parameter object from the required arguments,
//! applies the optional [`Configure`] callback, runs the call against an
//! [`ObjectBackend`] and folds every outcome into an [`OperationResult`].
//! Faults never escape: they are classified with [`classify`](crate::error::classify) and returned
//! as failed results.
//!
//! A `cancel` token, when given, is forwarded to the backend unchanged. When
//! omitted the call runs to completion; timeouts come from the client's own
//! configuration.
//!
//! # Examples
//!
//! ```
//! use ruststack_client_core::memory::InMemoryBackend;
//! use ruststack_client_core::{ErrorKind, ops};
//!
//! # tokio_test::block_on(async {
//! let client = InMemoryBackend::new();
//! client.create_bucket("reports").unwrap();
//!
//! let put = ops::put_object(&client, "reports", "q1.csv", "a,b\n1,2\n", None, None).await;
//! assert!(put.is_success());
//!
//! let bytes = ops::download_to_memory(&client, "reports", "q1.csv", None, None).await;
//! assert_eq!(bytes.value().map(|b| b.as_ref()), Some(&b"a,b\n1,2\n"[..]));
//!
//! let missing = ops::stat_object(&client, "missing-bucket", "obj", None, None).await;
//! assert_eq!(missing.error_kind(), ErrorKind::BucketNotFound);
//! # });
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::args::{
    Configure, GetObjectArgs, PutObjectArgs, RemoveObjectArgs, StatObjectArgs, build_args,
};
use crate::backend::{ObjectBackend, ObjectStat, PutObjectOutput, cancellable};
use crate::error::OperationFault;
use crate::naming::{MimeTypeMap, resolve_object_name};
use crate::result::OperationResult;

/// Fold a backend call into an [`OperationResult`], logging failures.
async fn wrap<T, F>(operation: &'static str, bucket: &str, object: &str, fut: F) -> OperationResult<T>
where
    F: Future<Output = Result<T, OperationFault>>,
{
    match fut.await {
        Ok(value) => OperationResult::success(value),
        Err(fault) => {
            let result = OperationResult::from_fault(&fault);
            debug!(
                operation,
                bucket = %bucket,
                object = %object,
                kind = %result.error_kind(),
                error = %fault,
                "storage operation failed"
            );
            result
        }
    }
}

fn token(cancel: Option<&CancellationToken>) -> CancellationToken {
    cancel.cloned().unwrap_or_default()
}

/// Store `body` as `bucket/object`.
///
/// `configure` may set the content type, user metadata, or override any
/// field, including the bucket and object names.
pub async fn put_object<B>(
    client: &B,
    bucket: &str,
    object: &str,
    body: impl Into<Bytes>,
    configure: Option<Configure<PutObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<PutObjectOutput>
where
    B: ObjectBackend + ?Sized,
{
    let cancel = token(cancel);
    let args = PutObjectArgs::new(bucket, object, body);
    wrap("put_object", bucket, object, async {
        let args = build_args(args, configure)?;
        client.put_object(args, &cancel).await
    })
    .await
}

/// Upload the whole of `reader` with the given content type.
///
/// When `object_name` is `None` or empty a fresh unique name is generated.
/// When `mime_map` is given, the extension mapped from `content_type` is
/// appended unless the name already ends with it. The returned output
/// carries the final object name. The payload is always the contents of
/// `reader`; a body set by `configure` is replaced.
#[allow(clippy::too_many_arguments)]
pub async fn put_stream<B, R>(
    client: &B,
    bucket: &str,
    mut reader: R,
    content_type: &str,
    object_name: Option<&str>,
    mime_map: Option<&dyn MimeTypeMap>,
    configure: Option<Configure<PutObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<PutObjectOutput>
where
    B: ObjectBackend + ?Sized,
    R: AsyncRead + Unpin + Send,
{
    let cancel = token(cancel);
    let object = resolve_object_name(object_name, content_type, mime_map);
    debug!(bucket = %bucket, object = %object, content_type, "resolved stream object name");

    wrap("put_stream", bucket, &object, async {
        // Names are checked before the source is drained.
        let args = PutObjectArgs::new(bucket, object.as_str(), Bytes::new())
            .with_content_type(content_type);
        let args = build_args(args, configure)?;

        let mut buf = Vec::new();
        cancellable(&cancel, async {
            reader.read_to_end(&mut buf).await?;
            Ok::<_, OperationFault>(())
        })
        .await?;

        client.put_object(args.with_body(buf), &cancel).await
    })
    .await
}

/// Copy `bucket/object` into `dest` and return its metadata.
///
/// The payload is written to `dest` as a side effect; `dest` is flushed on
/// success.
pub async fn download<B, W>(
    client: &B,
    bucket: &str,
    object: &str,
    dest: &mut W,
    configure: Option<Configure<GetObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<ObjectStat>
where
    B: ObjectBackend + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let cancel = token(cancel);
    let args = GetObjectArgs::new(bucket, object);
    wrap("download", bucket, object, copy_object(client, args, configure, dest, &cancel)).await
}

/// Read `bucket/object` into memory.
///
/// Unlike [`download`], the payload itself is returned.
pub async fn download_to_memory<B>(
    client: &B,
    bucket: &str,
    object: &str,
    configure: Option<Configure<GetObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<Bytes>
where
    B: ObjectBackend + ?Sized,
{
    let cancel = token(cancel);
    let args = GetObjectArgs::new(bucket, object);
    wrap("download_to_memory", bucket, object, async {
        let mut buf = Vec::new();
        copy_object(client, args, configure, &mut buf, &cancel).await?;
        Ok(Bytes::from(buf))
    })
    .await
}

/// Copy `length` bytes of `bucket/object` starting at `offset` into `dest`.
///
/// A `length` of zero reads to the end of the object. The returned metadata
/// describes the bytes actually written.
#[allow(clippy::too_many_arguments)]
pub async fn download_range<B, W>(
    client: &B,
    bucket: &str,
    object: &str,
    offset: u64,
    length: u64,
    dest: &mut W,
    configure: Option<Configure<GetObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<ObjectStat>
where
    B: ObjectBackend + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let cancel = token(cancel);
    let args = GetObjectArgs::new(bucket, object).with_offset_and_length(offset, length);
    wrap(
        "download_range",
        bucket,
        object,
        copy_object(client, args, configure, dest, &cancel),
    )
    .await
}

/// Remove `bucket/object`.
pub async fn remove_object<B>(
    client: &B,
    bucket: &str,
    object: &str,
    configure: Option<Configure<RemoveObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult
where
    B: ObjectBackend + ?Sized,
{
    let cancel = token(cancel);
    let args = RemoveObjectArgs::new(bucket, object);
    wrap("remove_object", bucket, object, async {
        let args = build_args(args, configure)?;
        client.remove_object(args, &cancel).await
    })
    .await
}

/// Read metadata of `bucket/object`.
pub async fn stat_object<B>(
    client: &B,
    bucket: &str,
    object: &str,
    configure: Option<Configure<StatObjectArgs>>,
    cancel: Option<&CancellationToken>,
) -> OperationResult<ObjectStat>
where
    B: ObjectBackend + ?Sized,
{
    let cancel = token(cancel);
    let args = StatObjectArgs::new(bucket, object);
    wrap("stat_object", bucket, object, async {
        let args = build_args(args, configure)?;
        client.stat_object(args, &cancel).await
    })
    .await
}

async fn copy_object<B, W>(
    client: &B,
    args: GetObjectArgs,
    configure: Option<Configure<GetObjectArgs>>,
    dest: &mut W,
    cancel: &CancellationToken,
) -> Result<ObjectStat, OperationFault>
where
    B: ObjectBackend + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let args = build_args(args, configure)?;
    let mut reader = client.get_object(args, cancel).await?;
    cancellable(cancel, async {
        let copied = tokio::io::copy(&mut reader.body, dest).await?;
        dest.flush().await?;
        tracing::trace!(bytes = copied, "copied object body");
        Ok::<_, OperationFault>(())
    })
    .await?;
    Ok(reader.stat)
}
