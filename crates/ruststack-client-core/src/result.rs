//! Result values returned by wrapped object operations.
//!
//! [`OperationResult`] carries either a value or an `(ErrorKind, message)`
//! pair, never both. Callers branch with [`OperationResult::handle`] (side
//! effects) or [`OperationResult::fold`] (value-producing); both invoke exactly
//! one of the two callbacks.

use crate::error::{ErrorKind, OperationError, OperationFault, classify};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome<T> {
    Success(T),
    Failure { kind: ErrorKind, message: String },
}

/// Immutable outcome of one storage operation.
///
/// Operations without a meaningful return value use `OperationResult<()>`.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::{ErrorKind, OperationResult};
///
/// let ok = OperationResult::success(42_u64);
/// assert!(ok.is_success());
/// assert_eq!(ok.error_kind(), ErrorKind::None);
///
/// let failed = OperationResult::<u64>::failure(ErrorKind::ObjectNotFound, "no such key");
/// let text = failed.fold(|v| v.to_string(), |kind, msg| format!("{kind}: {msg}"));
/// assert_eq!(text, "ObjectNotFound: no such key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct OperationResult<T = ()> {
    outcome: Outcome<T>,
}

impl<T> OperationResult<T> {
    /// Create a successful result carrying `value`.
    pub fn success(value: T) -> Self {
        Self {
            outcome: Outcome::Success(value),
        }
    }

    /// Create a failed result.
    ///
    /// A failed result never carries [`ErrorKind::None`]; passing it is
    /// recorded as [`ErrorKind::UnexpectedError`].
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let kind = if kind == ErrorKind::None {
            ErrorKind::UnexpectedError
        } else {
            kind
        };
        Self {
            outcome: Outcome::Failure {
                kind,
                message: message.into(),
            },
        }
    }

    /// Create a failed result by classifying `fault`.
    pub fn from_fault(fault: &OperationFault) -> Self {
        Self::failure(classify(fault), fault.to_string())
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The failure kind, [`ErrorKind::None`] on success.
    #[must_use]
    pub fn error_kind(&self) -> ErrorKind {
        match &self.outcome {
            Outcome::Success(_) => ErrorKind::None,
            Outcome::Failure { kind, .. } => *kind,
        }
    }

    /// The diagnostic message, present only on failure.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure { message, .. } => Some(message.as_str()),
        }
    }

    /// The value, present only on success.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// Consume the result, returning the value if successful.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, OperationError> {
        match self.outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure { kind, message } => Err(OperationError { kind, message }),
        }
    }

    /// Transform the success value, leaving a failure untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        match self.outcome {
            Outcome::Success(value) => OperationResult::success(f(value)),
            Outcome::Failure { kind, message } => OperationResult {
                outcome: Outcome::Failure { kind, message },
            },
        }
    }

    /// Invoke `on_success` or `on_failure`, exactly one of them, once.
    pub fn handle(&self, on_success: impl FnOnce(&T), on_failure: impl FnOnce(ErrorKind, &str)) {
        match &self.outcome {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure { kind, message } => on_failure(*kind, message.as_str()),
        }
    }

    /// Produce a value from whichever branch applies.
    pub fn fold<U>(
        self,
        on_success: impl FnOnce(T) -> U,
        on_failure: impl FnOnce(ErrorKind, String) -> U,
    ) -> U {
        match self.outcome {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure { kind, message } => on_failure(kind, message),
        }
    }
}

impl<T> From<Result<T, OperationFault>> for OperationResult<T> {
    fn from(result: Result<T, OperationFault>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(fault) => Self::from_fault(&fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::StorageFault;

    #[test]
    fn test_should_report_success_fields() {
        let result = OperationResult::success("payload".to_owned());
        assert!(result.is_success());
        assert_eq!(result.error_kind(), ErrorKind::None);
        assert!(result.error_message().is_none());
        assert_eq!(result.value().map(String::as_str), Some("payload"));
    }

    #[test]
    fn test_should_report_failure_fields() {
        let result = OperationResult::<String>::failure(ErrorKind::AccessDenied, "denied");
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), ErrorKind::AccessDenied);
        assert_eq!(result.error_message(), Some("denied"));
        assert!(result.value().is_none());
    }

    #[test]
    fn test_should_never_fail_with_none_kind() {
        let result = OperationResult::<()>::failure(ErrorKind::None, "odd");
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), ErrorKind::UnexpectedError);
    }

    #[test]
    fn test_should_invoke_only_success_branch() {
        let result = OperationResult::success(7_u32);
        let successes = Cell::new(0);
        let failures = Cell::new(0);

        result.handle(
            |v| {
                assert_eq!(*v, 7);
                successes.set(successes.get() + 1);
            },
            |_, _| failures.set(failures.get() + 1),
        );

        assert_eq!(successes.get(), 1);
        assert_eq!(failures.get(), 0);
    }

    #[test]
    fn test_should_invoke_only_failure_branch() {
        let result = OperationResult::<u32>::failure(ErrorKind::Timeout, "too slow");
        let successes = Cell::new(0);
        let failures = Cell::new(0);

        result.handle(
            |_| successes.set(successes.get() + 1),
            |kind, message| {
                assert_eq!(kind, ErrorKind::Timeout);
                assert_eq!(message, "too slow");
                failures.set(failures.get() + 1);
            },
        );

        assert_eq!(successes.get(), 0);
        assert_eq!(failures.get(), 1);
    }

    #[test]
    fn test_should_fold_into_uniform_type() {
        let ok = OperationResult::success(3_usize).fold(|n| n * 2, |_, _| 0);
        assert_eq!(ok, 6);

        let failed =
            OperationResult::<usize>::failure(ErrorKind::BucketNotFound, "gone").fold(
                |n| n.to_string(),
                |kind, message| format!("{kind}/{message}"),
            );
        assert_eq!(failed, "BucketNotFound/gone");
    }

    #[test]
    fn test_should_map_success_and_keep_failure() {
        let mapped = OperationResult::success(2_i32).map(|v| v + 1);
        assert_eq!(mapped.into_value(), Some(3));

        let failed = OperationResult::<i32>::failure(ErrorKind::Connection, "down").map(|v| v + 1);
        assert_eq!(failed.error_kind(), ErrorKind::Connection);
        assert_eq!(failed.error_message(), Some("down"));
    }

    #[test]
    fn test_should_convert_from_fault_result() {
        let result: OperationResult<()> = Err(OperationFault::from(StorageFault::BucketNotFound {
            bucket: "missing".to_owned(),
        }))
        .into();
        assert_eq!(result.error_kind(), ErrorKind::BucketNotFound);
        assert!(
            result
                .error_message()
                .is_some_and(|m| m.contains("missing"))
        );

        let result: OperationResult<u8> = Ok(1).into();
        assert!(result.is_success());
    }

    #[test]
    fn test_should_convert_into_std_result() {
        let err = OperationResult::<()>::failure(ErrorKind::ArgumentNull, "bucket")
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArgumentNull);
        assert_eq!(err.message, "bucket");

        assert_eq!(OperationResult::success(5).into_result(), Ok(5));
    }
}
