use super::ForeignKeyBuilder;
use crate::{End, Relate, Result};
use relmap_core::Builder;

/// The single-reference side of a relationship started with
/// [`has_one`](super::EntityBuilder::has_one).
#[derive(Debug)]
pub struct ReferenceBuilder<'a> {
    builder: &'a mut Builder,
    request: Relate,
}

/// The collection side of a relationship started with
/// [`has_many`](super::EntityBuilder::has_many).
#[derive(Debug)]
pub struct CollectionBuilder<'a> {
    builder: &'a mut Builder,
    request: Relate,
}

impl<'a> ReferenceBuilder<'a> {
    pub(crate) fn new(builder: &'a mut Builder, request: Relate) -> Self {
        Self { builder, request }
    }

    /// One-to-one. Which end is the principal is inferred unless configured
    /// on the returned handle.
    pub fn with_one(self, inverse: Option<&str>) -> Result<ForeignKeyBuilder<'a>> {
        let request = with_inverse(self.request, inverse).unique(true);
        ForeignKeyBuilder::relate(self.builder, request)
    }

    /// One-to-many with the target as principal.
    pub fn with_many(self, inverse: Option<&str>) -> Result<ForeignKeyBuilder<'a>> {
        let request = with_inverse(self.request, inverse)
            .unique(false)
            .principal(End::B);
        ForeignKeyBuilder::relate(self.builder, request)
    }
}

impl<'a> CollectionBuilder<'a> {
    pub(crate) fn new(builder: &'a mut Builder, request: Relate) -> Self {
        Self { builder, request }
    }

    /// One-to-many with this entity type as principal.
    pub fn with_one(self, inverse: Option<&str>) -> Result<ForeignKeyBuilder<'a>> {
        let request = with_inverse(self.request, inverse)
            .unique(false)
            .principal(End::A);
        ForeignKeyBuilder::relate(self.builder, request)
    }
}

fn with_inverse(mut request: Relate, inverse: Option<&str>) -> Relate {
    request.navigation_on_b = inverse.map(str::to_string);
    request
}
