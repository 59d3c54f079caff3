//! [`ObjectBackend`] implementation over `aws_sdk_s3::Client`.

use std::collections::BTreeMap;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SdkDateTime};
use chrono::{DateTime, Utc};
use ruststack_client_core::backend::cancellable;
use ruststack_client_core::{
    GetObjectArgs, ObjectBackend, ObjectReader, ObjectStat, OperationFault, PutObjectArgs,
    PutObjectOutput, RemoveObjectArgs, ResolvedSettings, StatObjectArgs, StorageFault,
};
use ruststack_client_core::backend::ObjectBody;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Target, body_stream_error, is_not_found, map_sdk_error};

/// A storage client backed by `aws-sdk-s3`.
///
/// Created by [`crate::S3ClientBuilder`], usually through
/// [`ruststack_client_core::ClientFactory`].
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    resolved: ResolvedSettings,
    endpoint_url: Option<String>,
}

impl S3Client {
    pub(crate) fn new(
        inner: aws_sdk_s3::Client,
        resolved: ResolvedSettings,
        endpoint_url: Option<String>,
    ) -> Self {
        Self {
            inner,
            resolved,
            endpoint_url,
        }
    }

    /// Settings applied when this client was built.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedSettings {
        &self.resolved
    }

    /// Endpoint URL requests are sent to, or `None` for the AWS default.
    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// The wrapped SDK client.
    #[must_use]
    pub fn sdk(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Tell a missing bucket apart from a missing object after a bare 404.
    async fn not_found_fault(&self, bucket: &str, object: &str) -> OperationFault {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Err(err) if is_not_found(&err) => StorageFault::BucketNotFound {
                bucket: bucket.to_owned(),
            }
            .into(),
            _ => StorageFault::ObjectNotFound {
                bucket: bucket.to_owned(),
                object: object.to_owned(),
            }
            .into(),
        }
    }
}

#[async_trait]
impl ObjectBackend for S3Client {
    async fn put_object(
        &self,
        args: PutObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<PutObjectOutput, OperationFault> {
        let target = Target {
            bucket: &args.bucket,
            object: &args.object,
        };
        let size = args.body.len() as u64;
        let metadata = (!args.metadata.is_empty())
            .then(|| args.metadata.clone().into_iter().collect());

        let request = self
            .inner
            .put_object()
            .bucket(&args.bucket)
            .key(&args.object)
            .body(ByteStream::from(args.body.clone()))
            .set_content_type(args.content_type.clone())
            .set_metadata(metadata);

        let output = cancellable(cancel, async {
            request
                .send()
                .await
                .map_err(|err| map_sdk_error(err, target))
        })
        .await?;

        debug!(bucket = %args.bucket, key = %args.object, size, "put_object completed");

        Ok(PutObjectOutput {
            bucket: args.bucket.clone(),
            object: args.object.clone(),
            size,
            etag: output.e_tag().map(ToOwned::to_owned),
            version_id: output.version_id().map(ToOwned::to_owned),
        })
    }

    async fn get_object(
        &self,
        args: GetObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectReader, OperationFault> {
        let target = Target {
            bucket: &args.bucket,
            object: &args.object,
        };
        let request = self
            .inner
            .get_object()
            .bucket(&args.bucket)
            .key(&args.object)
            .set_version_id(args.version_id.clone())
            .set_range(args.range.map(|range| range.header_value()));

        let output = cancellable(cancel, async {
            request
                .send()
                .await
                .map_err(|err| map_sdk_error(err, target))
        })
        .await?;

        let stat = ObjectStat {
            bucket: args.bucket.clone(),
            object: args.object.clone(),
            size: output
                .content_length()
                .and_then(|len| u64::try_from(len).ok())
                .unwrap_or_default(),
            etag: output.e_tag().map(ToOwned::to_owned),
            content_type: output.content_type().map(ToOwned::to_owned),
            last_modified: output.last_modified().and_then(to_chrono),
            version_id: output.version_id().map(ToOwned::to_owned),
            metadata: output
                .metadata()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        };

        Ok(ObjectReader {
            stat,
            body: Box::pin(BodyReader {
                inner: Box::pin(output.body.into_async_read()),
            }),
        })
    }

    async fn remove_object(
        &self,
        args: RemoveObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<(), OperationFault> {
        let target = Target {
            bucket: &args.bucket,
            object: &args.object,
        };
        let request = self
            .inner
            .delete_object()
            .bucket(&args.bucket)
            .key(&args.object)
            .set_version_id(args.version_id.clone());

        cancellable(cancel, async {
            request
                .send()
                .await
                .map_err(|err| map_sdk_error(err, target))
        })
        .await?;

        debug!(bucket = %args.bucket, key = %args.object, "delete_object completed");
        Ok(())
    }

    async fn stat_object(
        &self,
        args: StatObjectArgs,
        cancel: &CancellationToken,
    ) -> Result<ObjectStat, OperationFault> {
        let target = Target {
            bucket: &args.bucket,
            object: &args.object,
        };
        let request = self
            .inner
            .head_object()
            .bucket(&args.bucket)
            .key(&args.object)
            .set_version_id(args.version_id.clone());

        let output = cancellable(cancel, async {
            match request.send().await {
                Ok(output) => Ok(output),
                // HEAD responses carry no error body, so a 404 does not say
                // whether the bucket or the key is missing.
                Err(err) if is_not_found(&err) => {
                    Err(self.not_found_fault(&args.bucket, &args.object).await)
                }
                Err(err) => Err(map_sdk_error(err, target)),
            }
        })
        .await?;

        Ok(ObjectStat {
            bucket: args.bucket.clone(),
            object: args.object.clone(),
            size: output
                .content_length()
                .and_then(|len| u64::try_from(len).ok())
                .unwrap_or_default(),
            etag: output.e_tag().map(ToOwned::to_owned),
            content_type: output.content_type().map(ToOwned::to_owned),
            last_modified: output.last_modified().and_then(to_chrono),
            version_id: output.version_id().map(ToOwned::to_owned),
            metadata: output
                .metadata()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<BTreeMap<_, _>>())
                .unwrap_or_default(),
        })
    }
}

/// Response body whose read errors are reported as connection faults.
struct BodyReader {
    inner: ObjectBody,
}

impl AsyncRead for BodyReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.inner.as_mut().poll_read(cx, buf) {
            Poll::Ready(Err(err)) => Poll::Ready(Err(body_stream_error(&err))),
            other => other,
        }
    }
}

fn to_chrono(time: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}
