//! Fault taxonomy and classification for object operations.
//!
//! Storage backends raise an [`OperationFault`]. Faults that originate from the
//! storage library itself are carried as [`StorageFault`]; everything else
//! (local I/O, cancellation, misuse of a closed client, arbitrary errors) uses
//! the remaining [`OperationFault`] variants.
//!
//! [`classify`] folds any fault onto the closed [`ErrorKind`] set through an
//! ordered match:
//!
//! 1. specific storage categories map to their own kind,
//! 2. any other storage fault maps to [`ErrorKind::UnknownStorageError`],
//! 3. anything outside the storage hierarchy maps to
//!    [`ErrorKind::UnexpectedError`] unless it is one of the recognised local
//!    categories (file not found, timeout, ...).
//!
//! # Usage
//!
//! ```
//! use ruststack_client_core::error::{ErrorKind, OperationFault, StorageFault, classify};
//!
//! let fault = OperationFault::from(StorageFault::BucketNotFound {
//!     bucket: "photos".to_owned(),
//! });
//! assert_eq!(classify(&fault), ErrorKind::BucketNotFound);
//! ```

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds surfaced by wrapped object operations.
///
/// [`ErrorKind::None`] is reserved for successful results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No error: the operation succeeded.
    #[default]
    None,
    /// The request was not authorized (bad key, bad signature, expired token).
    Authorization,
    /// The bucket name is not valid.
    InvalidBucketName,
    /// The object name is not valid.
    InvalidObjectName,
    /// The bucket does not exist.
    BucketNotFound,
    /// The object (or object version) does not exist.
    ObjectNotFound,
    /// The requested functionality is not implemented.
    NotImplemented,
    /// A local file involved in the operation does not exist.
    FileNotFound,
    /// The client or stream was used after being closed.
    ObjectDisposed,
    /// The requested operation is not supported.
    NotSupported,
    /// The operation is not valid in the current state.
    InvalidOperation,
    /// Access to the resource was denied.
    AccessDenied,
    /// The storage service could not be reached.
    Connection,
    /// A required argument was missing or empty.
    ArgumentNull,
    /// The operation timed out.
    Timeout,
    /// A storage library fault without a more specific category.
    UnknownStorageError,
    /// A fault outside the storage library.
    UnexpectedError,
}

impl ErrorKind {
    /// Returns the kind name as a static string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Authorization => "Authorization",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidObjectName => "InvalidObjectName",
            Self::BucketNotFound => "BucketNotFound",
            Self::ObjectNotFound => "ObjectNotFound",
            Self::NotImplemented => "NotImplemented",
            Self::FileNotFound => "FileNotFound",
            Self::ObjectDisposed => "ObjectDisposed",
            Self::NotSupported => "NotSupported",
            Self::InvalidOperation => "InvalidOperation",
            Self::AccessDenied => "AccessDenied",
            Self::Connection => "Connection",
            Self::ArgumentNull => "ArgumentNull",
            Self::Timeout => "Timeout",
            Self::UnknownStorageError => "UnknownStorageError",
            Self::UnexpectedError => "UnexpectedError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Faults raised by the storage library.
///
/// This is the storage-side hierarchy: [`StorageFault::Service`] is the
/// library-generic member used when the service reports something without a
/// dedicated variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageFault {
    /// Credentials were rejected.
    #[error("authorization failed: {message}")]
    Authorization {
        /// Diagnostic text from the service.
        message: String,
    },

    /// The bucket name is not valid.
    #[error("invalid bucket name {bucket:?}: {reason}")]
    InvalidBucketName {
        /// The offending bucket name.
        bucket: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// The object name is not valid.
    #[error("invalid object name {object:?}: {reason}")]
    InvalidObjectName {
        /// The offending object name.
        object: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// The bucket does not exist.
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// The bucket that was not found.
        bucket: String,
    },

    /// The object does not exist.
    #[error("object not found: {bucket}/{object}")]
    ObjectNotFound {
        /// The bucket that was searched.
        bucket: String,
        /// The object that was not found.
        object: String,
    },

    /// Access to the resource was denied.
    #[error("access denied: {message}")]
    AccessDenied {
        /// Diagnostic text from the service.
        message: String,
    },

    /// The service could not be reached.
    #[error("connection error: {message}")]
    Connection {
        /// Diagnostic text from the transport.
        message: String,
    },

    /// Any other service-reported error.
    #[error("storage service error {code}: {message}")]
    Service {
        /// Service error code (e.g. `InternalError`).
        code: String,
        /// Diagnostic text from the service.
        message: String,
    },
}

/// Any fault a backend or the operation wrapper can raise.
#[derive(Debug, thiserror::Error)]
pub enum OperationFault {
    /// A fault from the storage library.
    #[error(transparent)]
    Storage(#[from] StorageFault),

    /// Local I/O failure (reading a source, writing a destination).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The functionality is not implemented by this backend.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The operation is not supported by this backend.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The operation is not valid in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The client was closed before the operation ran.
    #[error("storage client has been closed")]
    Disposed,

    /// A required argument was empty.
    #[error("required argument is empty: {0}")]
    ArgumentNull(&'static str),

    /// The operation did not complete in time.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// The caller's cancellation signal fired.
    #[error("operation was cancelled")]
    Cancelled,

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Map a fault onto its [`ErrorKind`].
///
/// Storage categories are checked first, then the library-generic tier, then
/// local categories, and finally everything else becomes
/// [`ErrorKind::UnexpectedError`]. Opaque errors are searched for a wrapped
/// [`StorageFault`] or [`io::Error`] before falling through.
#[must_use]
pub fn classify(fault: &OperationFault) -> ErrorKind {
    match fault {
        OperationFault::Storage(inner) => classify_storage(inner),
        OperationFault::Io(err) => classify_io(err),
        OperationFault::NotImplemented(_) => ErrorKind::NotImplemented,
        OperationFault::NotSupported(_) => ErrorKind::NotSupported,
        OperationFault::InvalidOperation(_) => ErrorKind::InvalidOperation,
        OperationFault::Disposed => ErrorKind::ObjectDisposed,
        OperationFault::ArgumentNull(_) => ErrorKind::ArgumentNull,
        OperationFault::Timeout(_) => ErrorKind::Timeout,
        OperationFault::Cancelled => ErrorKind::UnexpectedError,
        OperationFault::Other(err) => classify_opaque(err),
    }
}

fn classify_storage(fault: &StorageFault) -> ErrorKind {
    match fault {
        StorageFault::Authorization { .. } => ErrorKind::Authorization,
        StorageFault::InvalidBucketName { .. } => ErrorKind::InvalidBucketName,
        StorageFault::InvalidObjectName { .. } => ErrorKind::InvalidObjectName,
        StorageFault::BucketNotFound { .. } => ErrorKind::BucketNotFound,
        StorageFault::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
        StorageFault::AccessDenied { .. } => ErrorKind::AccessDenied,
        StorageFault::Connection { .. } => ErrorKind::Connection,
        StorageFault::Service { .. } => ErrorKind::UnknownStorageError,
    }
}

fn classify_io(err: &io::Error) -> ErrorKind {
    // Body streams surface storage faults wrapped in io::Error.
    if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<StorageFault>()) {
        return classify_storage(inner);
    }
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::FileNotFound,
        io::ErrorKind::TimedOut => ErrorKind::Timeout,
        io::ErrorKind::Unsupported => ErrorKind::NotSupported,
        _ => ErrorKind::UnexpectedError,
    }
}

fn classify_opaque(err: &anyhow::Error) -> ErrorKind {
    for cause in err.chain() {
        if let Some(inner) = cause.downcast_ref::<StorageFault>() {
            return classify_storage(inner);
        }
        if let Some(inner) = cause.downcast_ref::<io::Error>() {
            return classify_io(inner);
        }
    }
    ErrorKind::UnexpectedError
}

/// A failed operation converted into a plain error value.
///
/// Produced by [`crate::OperationResult::into_result`] for callers that prefer
/// `?` propagation over matching on the result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OperationError {
    /// The classified failure kind (never [`ErrorKind::None`]).
    pub kind: ErrorKind,
    /// Human-readable diagnostic text.
    pub message: String,
}
