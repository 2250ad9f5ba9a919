use crate::model::{
    Annotated, DeleteBehavior, EntityType, EntityTypeId, ForeignKeyId, IndexId, KeyId,
    NavigationId, PropertyId, Shape, ValueGenerated, ValueType,
};
use crate::{ConventionSet, Model, Provenance, Relate, Result};

/// Builds a [`Model`], running conventions after every change.
///
/// Each operation, together with everything the conventions do in response,
/// either completes or leaves the model as it was.
#[derive(Debug)]
pub struct Builder {
    model: Model,
    conventions: ConventionSet,
}

impl Builder {
    pub fn new() -> Self {
        Self::with_conventions(ConventionSet::default())
    }

    pub fn with_conventions(conventions: ConventionSet) -> Self {
        let mut model = Model::new();
        model.record_events();

        Self { model, conventions }
    }

    /// Suffix identifying key properties by name. Defaults to `Id`.
    pub fn key_suffix(&mut self, suffix: &str) -> &mut Self {
        self.model.options_mut().key_suffix = suffix.to_string();
        self
    }

    /// First ordinal appended to a foreign key property name that is taken.
    /// Defaults to `1`.
    pub fn split_ordinal_start(&mut self, start: usize) -> &mut Self {
        self.model.options_mut().split_ordinal_start = start;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Validates the model and hands it over.
    pub fn build(self) -> Result<Model> {
        self.model.validate()?;

        let mut model = self.model;
        model.stop_recording_events();
        Ok(model)
    }

    /// Runs `f` against the model, then lets the conventions react to what it
    /// changed.
    pub fn apply<T>(&mut self, f: impl FnOnce(&mut Model) -> Result<T>) -> Result<T> {
        let conventions = &self.conventions;

        self.model.atomically(|model| {
            let value = f(model)?;

            while let Some(event) = model.next_event() {
                conventions.dispatch(model, event)?;
            }

            Ok(value)
        })
    }

    /// Adds an entity type for `shape` and discovers its members.
    pub fn register(&mut self, shape: Shape) -> Result<EntityTypeId> {
        self.apply(|model| model.add_shaped_entity_type(shape, Provenance::Explicit))
    }

    pub fn add_entity_type(&mut self, name: &str, source: Provenance) -> Result<EntityTypeId> {
        self.apply(|model| model.add_entity_type(name, source))
    }

    pub fn entity_type_or_add(&mut self, name: &str, source: Provenance) -> Result<EntityTypeId> {
        self.apply(|model| model.entity_type_or_add(name, source))
    }

    pub fn remove_entity_type(&mut self, entity: EntityTypeId) -> Result<EntityType> {
        self.apply(|model| model.remove_entity_type(entity))
    }

    pub fn add_property(
        &mut self,
        entity: EntityTypeId,
        name: &str,
        ty: impl Into<ValueType>,
        source: Provenance,
    ) -> Result<PropertyId> {
        self.apply(|model| model.add_property(entity, name, ty, source))
    }

    pub fn add_shadow_property(
        &mut self,
        entity: EntityTypeId,
        name: &str,
        ty: impl Into<ValueType>,
        source: Provenance,
    ) -> Result<PropertyId> {
        self.apply(|model| model.add_shadow_property(entity, name, ty, source))
    }

    pub fn ignore(&mut self, entity: EntityTypeId, name: &str, source: Provenance) -> Result<()> {
        self.apply(|model| model.ignore(entity, name, source))
    }

    pub fn set_property_nullable(
        &mut self,
        property: PropertyId,
        nullable: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_property_nullable(property, nullable, source))
    }

    pub fn set_concurrency_token(
        &mut self,
        property: PropertyId,
        concurrency_token: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_concurrency_token(property, concurrency_token, source))
    }

    pub fn set_value_generated(
        &mut self,
        property: PropertyId,
        value_generated: ValueGenerated,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_value_generated(property, value_generated, source))
    }

    pub fn add_key(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        source: Provenance,
    ) -> Result<KeyId> {
        self.apply(|model| model.add_key(entity, properties, source))
    }

    pub fn set_primary_key(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        source: Provenance,
    ) -> Result<Option<KeyId>> {
        self.apply(|model| model.set_primary_key(entity, properties, source))
    }

    pub fn add_index(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        unique: Option<bool>,
        source: Provenance,
    ) -> Result<IndexId> {
        self.apply(|model| model.add_index(entity, properties, unique, source))
    }

    pub fn add_foreign_key(
        &mut self,
        dependent: EntityTypeId,
        properties: &[PropertyId],
        principal: EntityTypeId,
        principal_key: KeyId,
        source: Provenance,
    ) -> Result<ForeignKeyId> {
        self.apply(|model| {
            model.add_foreign_key(dependent, properties, principal, principal_key, source)
        })
    }

    pub fn remove_foreign_key(&mut self, fk: ForeignKeyId) -> Result<()> {
        self.apply(|model| model.remove_foreign_key(fk))
    }

    pub fn add_navigation(
        &mut self,
        name: &str,
        fk: ForeignKeyId,
        points_to_principal: bool,
        source: Provenance,
    ) -> Result<NavigationId> {
        self.apply(|model| model.add_navigation(name, fk, points_to_principal, source))
    }

    pub fn remove_navigation(&mut self, navigation: NavigationId) -> Result<()> {
        self.apply(|model| model.remove_navigation(navigation))
    }

    pub fn set_foreign_key_unique(
        &mut self,
        fk: ForeignKeyId,
        unique: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_foreign_key_unique(fk, unique, source))
    }

    pub fn set_foreign_key_required(
        &mut self,
        fk: ForeignKeyId,
        required: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_foreign_key_required(fk, required, source))
    }

    pub fn set_delete_behavior(
        &mut self,
        fk: ForeignKeyId,
        delete_behavior: DeleteBehavior,
        source: Provenance,
    ) -> Result<bool> {
        self.apply(|model| model.set_delete_behavior(fk, delete_behavior, source))
    }

    pub fn set_annotation(
        &mut self,
        target: impl Into<Annotated>,
        key: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.apply(|model| model.set_annotation(target, key, value))
    }

    pub fn relate(&mut self, request: &Relate, source: Provenance) -> Result<ForeignKeyId> {
        self.apply(|model| model.relate(request, source))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
