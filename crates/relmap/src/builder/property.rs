use crate::{Provenance, Result, ValueGenerated};
use relmap_core::model::PropertyId;
use relmap_core::Builder;

/// Configures one property.
#[derive(Debug)]
pub struct PropertyBuilder<'a> {
    builder: &'a mut Builder,
    id: PropertyId,
}

impl<'a> PropertyBuilder<'a> {
    pub(crate) fn new(builder: &'a mut Builder, id: PropertyId) -> Self {
        Self { builder, id }
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Fails with a "cannot be nullable" error for key properties and for
    /// declared properties whose type does not admit null.
    pub fn nullable(&mut self, nullable: bool) -> Result<&mut Self> {
        self.builder
            .set_property_nullable(self.id, nullable, Provenance::Explicit)?;
        Ok(self)
    }

    pub fn concurrency_token(&mut self, concurrency_token: bool) -> Result<&mut Self> {
        self.builder
            .set_concurrency_token(self.id, concurrency_token, Provenance::Explicit)?;
        Ok(self)
    }

    pub fn value_generated(&mut self, value_generated: ValueGenerated) -> Result<&mut Self> {
        self.builder
            .set_value_generated(self.id, value_generated, Provenance::Explicit)?;
        Ok(self)
    }

    pub fn annotation(&mut self, key: &str, value: impl Into<String>) -> Result<&mut Self> {
        self.builder.set_annotation(self.id, key, value)?;
        Ok(self)
    }
}
