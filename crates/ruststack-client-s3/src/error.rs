//! Mapping of SDK errors onto the storage fault hierarchy.
//!
//! Service errors are matched on their S3 error code first and on the HTTP
//! status second. Transport timeouts become [`OperationFault::Timeout`],
//! other dispatch failures become [`StorageFault::Connection`]. Failures the
//! SDK raises on its own (request construction, unparseable responses) stay in
//! the library tier as [`StorageFault::Service`] with the variant as the code.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::io;

use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use ruststack_client_core::{OperationFault, StorageFault};

/// Target of the request that failed, used to fill fault fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub bucket: &'a str,
    pub object: &'a str,
}

/// Whether the service answered with HTTP 404.
pub(crate) fn is_not_found<E>(err: &SdkError<E, HttpResponse>) -> bool {
    err.raw_response()
        .is_some_and(|raw| raw.status().as_u16() == 404)
}

/// Convert an SDK error into an [`OperationFault`].
pub(crate) fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, target: Target<'_>) -> OperationFault
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) => OperationFault::Timeout(detail),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            OperationFault::Timeout(detail)
        }
        SdkError::DispatchFailure(_) => StorageFault::Connection { message: detail }.into(),
        SdkError::ServiceError(context) => {
            let code = context.err().code().unwrap_or_default();
            let message = context.err().message().map_or(detail, ToOwned::to_owned);
            let status = context.raw().status().as_u16();
            map_service_error(code, status, message, target)
        }
        SdkError::ConstructionFailure(_) => sdk_fault("ConstructionFailure", detail),
        SdkError::ResponseError(_) => sdk_fault("ResponseError", detail),
        _ => sdk_fault("SdkError", detail),
    }
}

fn sdk_fault(code: &str, message: String) -> OperationFault {
    StorageFault::Service {
        code: code.to_owned(),
        message,
    }
    .into()
}

/// Wrap a failure while streaming a response body.
///
/// The fault rides inside the [`io::Error`] so classification still sees a
/// connection failure after the body passes through generic copy code.
pub(crate) fn body_stream_error(err: &io::Error) -> io::Error {
    io::Error::new(
        err.kind(),
        StorageFault::Connection {
            message: format!("response body stream failed: {err}"),
        },
    )
}

fn map_service_error(code: &str, status: u16, message: String, target: Target<'_>) -> OperationFault {
    let fault = match code {
        "NoSuchBucket" => StorageFault::BucketNotFound {
            bucket: target.bucket.to_owned(),
        },
        "NoSuchKey" | "NoSuchVersion" | "NotFound" => StorageFault::ObjectNotFound {
            bucket: target.bucket.to_owned(),
            object: target.object.to_owned(),
        },
        "InvalidBucketName" => StorageFault::InvalidBucketName {
            bucket: target.bucket.to_owned(),
            reason: message,
        },
        "KeyTooLongError" | "InvalidObjectName" => StorageFault::InvalidObjectName {
            object: target.object.to_owned(),
            reason: message,
        },
        "AccessDenied" | "AllAccessDisabled" => StorageFault::AccessDenied { message },
        "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken" | "InvalidToken"
        | "TokenRefreshRequired" => StorageFault::Authorization { message },
        "NotImplemented" => return OperationFault::NotImplemented(message),
        "RequestTimeout" => return OperationFault::Timeout(message),
        _ if status == 404 => StorageFault::ObjectNotFound {
            bucket: target.bucket.to_owned(),
            object: target.object.to_owned(),
        },
        _ if status == 403 => StorageFault::AccessDenied { message },
        _ => StorageFault::Service {
            code: if code.is_empty() {
                format!("HTTP{status}")
            } else {
                code.to_owned()
            },
            message,
        },
    };
    fault.into()
}
