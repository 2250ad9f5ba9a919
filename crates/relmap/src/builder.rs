mod entity;
pub use entity::EntityBuilder;

mod foreign_key;
pub use foreign_key::ForeignKeyBuilder;

mod key;
pub use key::KeyBuilder;

mod property;
pub use property::PropertyBuilder;

mod relationship;
pub use relationship::{CollectionBuilder, ReferenceBuilder};

use crate::{ConventionSet, Model, Provenance, Relate, Result, Shape};

/// Describes a model one statement at a time.
///
/// Every call made through the builder and its handles is explicit
/// configuration: it overrides whatever the conventions inferred, and the
/// conventions never undo it.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    core: relmap_core::Builder,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder running `conventions` instead of the default set.
    pub fn with_conventions(conventions: ConventionSet) -> Self {
        Self {
            core: relmap_core::Builder::with_conventions(conventions),
        }
    }

    /// Suffix identifying key properties by name. Defaults to `Id`.
    pub fn key_suffix(&mut self, suffix: &str) -> &mut Self {
        self.core.key_suffix(suffix);
        self
    }

    /// First ordinal appended to a foreign key property name that is taken.
    pub fn split_ordinal_start(&mut self, start: usize) -> &mut Self {
        self.core.split_ordinal_start(start);
        self
    }

    /// Registers a record shape. Its properties, key, and relationships are
    /// discovered by convention.
    pub fn register(&mut self, shape: Shape) -> Result<EntityBuilder<'_>> {
        let id = self.core.register(shape)?;
        Ok(EntityBuilder::new(&mut self.core, id))
    }

    /// Configures the entity type named `name`, adding it if needed.
    pub fn entity(&mut self, name: &str) -> Result<EntityBuilder<'_>> {
        let id = self.core.entity_type_or_add(name, Provenance::Explicit)?;
        Ok(EntityBuilder::new(&mut self.core, id))
    }

    /// Removes an entity type along with the relationships that involve it.
    pub fn remove_entity(&mut self, name: &str) -> Result<&mut Self> {
        let id = self.core.model().entity_type_id(name)?;
        self.core.remove_entity_type(id)?;
        Ok(self)
    }

    /// Relates two entity types from a full request.
    pub fn relate(&mut self, request: Relate) -> Result<ForeignKeyBuilder<'_>> {
        ForeignKeyBuilder::relate(&mut self.core, request)
    }

    /// The model as configured so far.
    pub fn model(&self) -> &Model {
        self.core.model()
    }

    /// Validates and returns the finished model.
    pub fn build(self) -> Result<Model> {
        let model = self.core.build()?;

        tracing::debug!(
            entity_types = model.entity_types().count(),
            foreign_keys = model.foreign_keys().count(),
            "model built"
        );
        Ok(model)
    }
}
