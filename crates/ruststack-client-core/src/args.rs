//! Parameter objects for object operations.
//!
//! Each operation starts from its required fields and then applies an
//! optional caller-supplied [`Configure`] function. The function runs last, so
//! it can override anything, including the bucket and object names: last
//! write wins. Required fields are re-checked afterwards and an empty bucket or
//! object name fails with [`OperationFault::ArgumentNull`].

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::OperationFault;

/// Caller-supplied adjustment applied to a parameter object.
pub type Configure<T> = Box<dyn FnOnce(T) -> T + Send>;

/// Common accessors shared by all parameter objects.
pub trait ObjectArgs {
    /// Target bucket.
    fn bucket(&self) -> &str;

    /// Target object name.
    fn object(&self) -> &str;

    /// Check that the required fields are present.
    fn validate(&self) -> Result<(), OperationFault> {
        if self.bucket().is_empty() {
            return Err(OperationFault::ArgumentNull("bucket"));
        }
        if self.object().is_empty() {
            return Err(OperationFault::ArgumentNull("object"));
        }
        Ok(())
    }
}

/// Fold `configure` over `args` and validate the result.
pub fn build_args<A: ObjectArgs>(
    args: A,
    configure: Option<Configure<A>>,
) -> Result<A, OperationFault> {
    let args = match configure {
        Some(configure) => configure(args),
        None => args,
    };
    args.validate()?;
    Ok(args)
}

/// A byte range `[offset, offset + length)` within an object.
///
/// A `length` of `None` (or zero) reads from `offset` to the end.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::args::ByteRange;
///
/// assert_eq!(ByteRange::new(10, 5).header_value(), "bytes=10-14");
/// assert_eq!(ByteRange::from_offset(10).header_value(), "bytes=10-");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte to read.
    pub offset: u64,
    /// Number of bytes to read.
    pub length: Option<u64>,
}

impl ByteRange {
    /// Range of `length` bytes starting at `offset`.
    #[must_use]
    pub fn new(offset: u64, length: u64) -> Self {
        Self {
            offset,
            length: (length > 0).then_some(length),
        }
    }

    /// Open-ended range starting at `offset`.
    #[must_use]
    pub fn from_offset(offset: u64) -> Self {
        Self {
            offset,
            length: None,
        }
    }

    /// Last byte position included in the range, if bounded.
    #[must_use]
    pub fn last_byte(&self) -> Option<u64> {
        self.length
            .map(|length| self.offset.saturating_add(length).saturating_sub(1))
    }

    /// Render as an HTTP `Range` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self.last_byte() {
            Some(last) => format!("bytes={}-{last}", self.offset),
            None => format!("bytes={}-", self.offset),
        }
    }
}

/// Parameters for storing an object.
#[derive(Debug, Clone, Default)]
pub struct PutObjectArgs {
    /// Target bucket.
    pub bucket: String,
    /// Target object name.
    pub object: String,
    /// Object payload.
    pub body: Bytes,
    /// `Content-Type` to store with the object.
    pub content_type: Option<String>,
    /// User-defined metadata.
    pub metadata: BTreeMap<String, String>,
}

impl PutObjectArgs {
    /// Parameters for storing `body` as `bucket/object`.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Replace the bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Replace the object name.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = object.into();
        self
    }

    /// Replace the payload.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a user metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl ObjectArgs for PutObjectArgs {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object(&self) -> &str {
        &self.object
    }
}

/// Parameters for reading an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectArgs {
    /// Source bucket.
    pub bucket: String,
    /// Source object name.
    pub object: String,
    /// Specific version to read.
    pub version_id: Option<String>,
    /// Byte range to read.
    pub range: Option<ByteRange>,
}

impl GetObjectArgs {
    /// Parameters for reading `bucket/object`.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    /// Replace the bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Replace the object name.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = object.into();
        self
    }

    /// Read a specific version.
    #[must_use]
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Read only `range`.
    #[must_use]
    pub fn with_range(mut self, range: ByteRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Read `length` bytes starting at `offset`.
    #[must_use]
    pub fn with_offset_and_length(self, offset: u64, length: u64) -> Self {
        self.with_range(ByteRange::new(offset, length))
    }
}

impl ObjectArgs for GetObjectArgs {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object(&self) -> &str {
        &self.object
    }
}

/// Parameters for reading object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatObjectArgs {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object name.
    pub object: String,
    /// Specific version to inspect.
    pub version_id: Option<String>,
}

impl StatObjectArgs {
    /// Parameters for inspecting `bucket/object`.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            version_id: None,
        }
    }

    /// Inspect a specific version.
    #[must_use]
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl ObjectArgs for StatObjectArgs {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object(&self) -> &str {
        &self.object
    }
}

/// Parameters for removing an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveObjectArgs {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object name.
    pub object: String,
    /// Specific version to remove.
    pub version_id: Option<String>,
}

impl RemoveObjectArgs {
    /// Parameters for removing `bucket/object`.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            version_id: None,
        }
    }

    /// Remove a specific version.
    #[must_use]
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl ObjectArgs for RemoveObjectArgs {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object(&self) -> &str {
        &self.object
    }
}
