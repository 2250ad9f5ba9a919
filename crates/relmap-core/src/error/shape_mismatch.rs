use super::Error;

/// Error when metadata does not line up structurally.
///
/// This occurs when:
/// - Foreign key properties and the referenced key differ in count
/// - A foreign key property's type differs from the referenced key property at the same position
/// - A relationship needs a referenced key the principal does not have
#[derive(Debug)]
pub(super) struct ShapeMismatchError {
    message: Box<str>,
}

impl std::error::Error for ShapeMismatchError {}

impl core::fmt::Display for ShapeMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "shape mismatch: {}", self.message)
    }
}

impl Error {
    /// Creates a shape mismatch error. The message should name the
    /// mismatched entity types and properties.
    pub fn shape_mismatch(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ShapeMismatch(ShapeMismatchError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a shape mismatch error.
    pub fn is_shape_mismatch(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ShapeMismatch(_)))
    }
}
