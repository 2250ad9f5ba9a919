use super::Error;

/// Error when a relationship request matches more than one outcome and
/// nothing breaks the tie.
#[derive(Debug)]
pub(super) struct AmbiguousError {
    message: Box<str>,
}

impl std::error::Error for AmbiguousError {}

impl core::fmt::Display for AmbiguousError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "ambiguous relationship: {}", self.message)
    }
}

impl Error {
    /// Creates an ambiguity error.
    pub fn ambiguous(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Ambiguous(AmbiguousError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an ambiguity error.
    pub fn is_ambiguous(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Ambiguous(_)))
    }
}
