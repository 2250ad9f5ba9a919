use super::Error;

/// Error when a finished model fails validation.
///
/// This occurs when:
/// - An entity type has no primary key
/// - A key contains a nullable property
/// - A property and a navigation share a name
///
/// These errors are caught by `Model::validate`, typically once configuration is done.
#[derive(Debug)]
pub(super) struct InvalidModelError {
    message: Box<str>,
}

impl std::error::Error for InvalidModelError {}

impl core::fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid model: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid model error.
    pub fn invalid_model(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidModel(InvalidModelError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid model error.
    pub fn is_invalid_model(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidModel(_)))
    }
}
