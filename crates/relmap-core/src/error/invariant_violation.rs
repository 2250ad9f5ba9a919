use super::Error;

/// Error when a request would break metadata that was configured explicitly.
#[derive(Debug)]
pub(super) struct InvariantViolationError {
    message: Box<str>,
}

impl std::error::Error for InvariantViolationError {}

impl core::fmt::Display for InvariantViolationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl Error {
    /// Creates an invariant violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvariantViolation(
            InvariantViolationError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an invariant violation error.
    pub fn is_invariant_violation(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvariantViolation(_)))
    }
}
