use super::Error;
use crate::model::ValueType;

/// Error when a property would have to become nullable but cannot.
///
/// Raised when relaxing a relationship to optional would require a
/// non-nullable, non-shadow property to accept null, or when a key property
/// is asked to become nullable.
#[derive(Debug)]
pub(super) struct CannotBeNullableError {
    property: Box<str>,
    entity: Box<str>,
    ty: ValueType,
}

impl std::error::Error for CannotBeNullableError {}

impl core::fmt::Display for CannotBeNullableError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "`{}` on `{}` of type `{}` cannot be nullable",
            self.property, self.entity, self.ty
        )
    }
}

impl Error {
    /// Creates an error naming the property, its entity type, and its
    /// declared type.
    pub fn cannot_be_nullable(
        property: impl Into<String>,
        entity: impl Into<String>,
        ty: ValueType,
    ) -> Error {
        Error::from(super::ErrorKind::CannotBeNullable(CannotBeNullableError {
            property: property.into().into(),
            entity: entity.into().into(),
            ty,
        }))
    }

    /// Returns `true` if this error is a "cannot be nullable" error.
    pub fn is_cannot_be_nullable(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::CannotBeNullable(_)))
    }
}
