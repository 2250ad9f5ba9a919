use super::{CollectionBuilder, KeyBuilder, PropertyBuilder, ReferenceBuilder};
use crate::{Provenance, Relate, Result, ValueType};
use relmap_core::model::{EntityTypeId, IndexId, PropertyId};
use relmap_core::Builder;

/// Configures one entity type.
#[derive(Debug)]
pub struct EntityBuilder<'a> {
    builder: &'a mut Builder,
    id: EntityTypeId,
}

impl<'a> EntityBuilder<'a> {
    pub(crate) fn new(builder: &'a mut Builder, id: EntityTypeId) -> Self {
        Self { builder, id }
    }

    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.builder.model().entity_type(self.id).name
    }

    /// Configures the property `name`, declaring it if needed.
    pub fn property(&mut self, name: &str, ty: impl Into<ValueType>) -> Result<PropertyBuilder<'_>> {
        let id = self
            .builder
            .add_property(self.id, name, ty, Provenance::Explicit)?;
        Ok(PropertyBuilder::new(self.builder, id))
    }

    /// Keeps `name` out of the model, removing it if it was already mapped.
    pub fn ignore(&mut self, name: &str) -> Result<&mut Self> {
        self.builder.ignore(self.id, name, Provenance::Explicit)?;
        Ok(self)
    }

    /// Sets the primary key.
    pub fn key(&mut self, properties: &[&str]) -> Result<KeyBuilder<'_>> {
        let properties = self.property_ids(properties)?;
        let id = self
            .builder
            .set_primary_key(self.id, &properties, Provenance::Explicit)?
            .ok_or_else(|| relmap_core::err!("primary key of `{}` could not be set", self.name()))?;
        Ok(KeyBuilder::new(self.builder, id))
    }

    /// Adds a key that is not the primary key.
    pub fn alternate_key(&mut self, properties: &[&str]) -> Result<KeyBuilder<'_>> {
        let properties = self.property_ids(properties)?;
        let id = self
            .builder
            .add_key(self.id, &properties, Provenance::Explicit)?;
        Ok(KeyBuilder::new(self.builder, id))
    }

    pub fn index(&mut self, properties: &[&str], unique: bool) -> Result<IndexId> {
        let properties = self.property_ids(properties)?;
        self.builder
            .add_index(self.id, &properties, Some(unique), Provenance::Explicit)
    }

    pub fn annotation(&mut self, key: &str, value: impl Into<String>) -> Result<&mut Self> {
        self.builder.set_annotation(self.id, key, value)?;
        Ok(self)
    }

    /// Starts a relationship where this entity type refers to a single
    /// `target`, through `navigation` if given.
    pub fn has_one(&mut self, target: &str, navigation: Option<&str>) -> ReferenceBuilder<'_> {
        let request = self.request(target, navigation);
        ReferenceBuilder::new(self.builder, request)
    }

    /// Starts a relationship where this entity type refers to many `target`s,
    /// through `navigation` if given.
    pub fn has_many(&mut self, target: &str, navigation: Option<&str>) -> CollectionBuilder<'_> {
        let request = self.request(target, navigation);
        CollectionBuilder::new(self.builder, request)
    }

    fn request(&self, target: &str, navigation: Option<&str>) -> Relate {
        let mut request = Relate::new(self.name(), target);
        request.navigation_on_a = navigation.map(str::to_string);
        request
    }

    fn property_ids(&self, names: &[&str]) -> Result<Vec<PropertyId>> {
        self.builder.model().property_ids(self.id, names)
    }
}
