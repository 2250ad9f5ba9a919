//! The entity-relationship metadata graph

mod entity_type;
pub use entity_type::{EntityType, EntityTypeId};

mod foreign_key;
pub use foreign_key::{DeleteBehavior, ForeignKey, ForeignKeyId};

mod index;
pub use index::{Index, IndexId};

mod key;
pub use key::{Key, KeyId};

mod navigation;
pub use navigation::{Navigation, NavigationId};

mod property;
pub use property::{Property, PropertyId, ValueGenerated};

mod shape;
pub use shape::{Member, MemberKind, Shape};

mod slots;
use slots::Slots;

mod ty;
pub use ty::{Type, ValueType};

mod verify;

use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Free-form key/value metadata attached to model elements.
pub type Annotations = IndexMap<String, String>;

/// The root of the metadata graph.
///
/// The model is the sole owner of every entity type. Entity types own their
/// properties, keys, navigations, and indexes by arena membership; foreign keys
/// live in a model-wide arena and are owned by their dependent entity type.
/// Elements reference each other through `Copy` handles, so cycles (self
/// references, circular navigations) are plain edges.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) entity_types: Slots<EntityType>,

    /// Entity type lookup by name, in insertion order
    names: IndexMap<String, EntityTypeId>,

    pub(crate) foreign_keys: Slots<ForeignKey>,

    options: Options,

    /// Mutations observed by the convention pipeline. `None` unless a
    /// pipeline is attached.
    events: Option<VecDeque<ModelEvent>>,

    pub(crate) annotations: Annotations,
}

/// Naming options shared by the resolver and the conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Suffix identifying key properties by convention (`Id`, `BigMakId`)
    pub key_suffix: String,

    /// First ordinal appended when a synthesized property name is taken
    pub split_ordinal_start: usize,
}

/// A graph mutation the convention pipeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    EntityTypeAdded(EntityTypeId),
    PropertyAdded(PropertyId),
    PrimaryKeyChanged(EntityTypeId),
}

/// Any model element that carries annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotated {
    Model,
    EntityType(EntityTypeId),
    Property(PropertyId),
    Key(KeyId),
    ForeignKey(ForeignKeyId),
    Index(IndexId),
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Entity types in insertion order.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> + '_ {
        self.entity_types.iter()
    }

    /// Get an entity type by ID
    #[track_caller]
    pub fn entity_type(&self, id: impl Into<EntityTypeId>) -> &EntityType {
        self.entity_types
            .get(id.into().0)
            .expect("invalid entity type ID")
    }

    #[track_caller]
    pub(crate) fn entity_type_mut(&mut self, id: impl Into<EntityTypeId>) -> &mut EntityType {
        self.entity_types
            .get_mut(id.into().0)
            .expect("invalid entity type ID")
    }

    /// Like [`Model::entity_type`], but reports stale handles as an error.
    pub fn try_entity_type(&self, id: impl Into<EntityTypeId>) -> Result<&EntityType> {
        let id = id.into();
        self.entity_types.get(id.0).ok_or_else(|| {
            Error::invalid_argument(format!("{id:?} does not refer to an entity type"))
        })
    }

    pub fn find_entity_type(&self, name: &str) -> Option<&EntityType> {
        self.names.get(name).map(|id| self.entity_type(*id))
    }

    /// Resolve an entity type name to its handle.
    pub fn entity_type_id(&self, name: &str) -> Result<EntityTypeId> {
        if name.is_empty() {
            return Err(Error::invalid_argument("entity type name must not be empty"));
        }

        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::invalid_argument(format!("unknown entity type `{name}`")))
    }

    /// Every foreign key in the model, in creation order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> + '_ {
        self.foreign_keys.iter()
    }

    #[track_caller]
    pub fn foreign_key(&self, id: ForeignKeyId) -> &ForeignKey {
        self.foreign_keys.get(id.0).expect("invalid foreign key ID")
    }

    #[track_caller]
    pub(crate) fn foreign_key_mut(&mut self, id: ForeignKeyId) -> &mut ForeignKey {
        self.foreign_keys
            .get_mut(id.0)
            .expect("invalid foreign key ID")
    }

    pub fn try_foreign_key(&self, id: ForeignKeyId) -> Result<&ForeignKey> {
        self.foreign_keys.get(id.0).ok_or_else(|| {
            Error::invalid_argument(format!("{id:?} does not refer to a foreign key"))
        })
    }

    #[track_caller]
    pub fn property(&self, id: PropertyId) -> &Property {
        self.entity_type(id.entity).property(id)
    }

    #[track_caller]
    pub(crate) fn property_mut(&mut self, id: PropertyId) -> &mut Property {
        self.entity_type_mut(id.entity)
            .properties
            .get_mut(id.index)
            .expect("invalid property ID")
    }

    #[track_caller]
    pub fn key(&self, id: KeyId) -> &Key {
        self.entity_type(id.entity).key(id)
    }

    #[track_caller]
    pub fn navigation(&self, id: NavigationId) -> &Navigation {
        self.entity_type(id.entity).navigation(id)
    }

    #[track_caller]
    pub(crate) fn navigation_mut(&mut self, id: NavigationId) -> &mut Navigation {
        self.entity_type_mut(id.entity)
            .navigations
            .get_mut(id.index)
            .expect("invalid navigation ID")
    }

    #[track_caller]
    pub fn index(&self, id: IndexId) -> &Index {
        self.entity_type(id.entity).index(id)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Sets an annotation on a model element, replacing any previous value
    /// under the same key.
    pub fn set_annotation(
        &mut self,
        target: impl Into<Annotated>,
        key: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_argument("annotation key must not be empty"));
        }

        let annotations = match target.into() {
            Annotated::Model => &mut self.annotations,
            Annotated::EntityType(id) => {
                self.try_entity_type(id)?;
                &mut self.entity_type_mut(id).annotations
            }
            Annotated::Property(id) => {
                self.try_property(id)?;
                &mut self.property_mut(id).annotations
            }
            Annotated::Key(id) => {
                self.try_key(id)?;
                &mut self.key_mut(id).annotations
            }
            Annotated::ForeignKey(id) => {
                self.try_foreign_key(id)?;
                &mut self.foreign_key_mut(id).annotations
            }
            Annotated::Index(id) => {
                self.try_index(id)?;
                &mut self
                    .entity_type_mut(id.entity)
                    .indexes
                    .get_mut(id.index)
                    .expect("invalid index ID")
                    .annotations
            }
        };

        annotations.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Runs `f`, restoring the model to its prior state if it fails.
    pub(crate) fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();

        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    /// Start recording mutation events for the convention pipeline.
    pub(crate) fn record_events(&mut self) {
        if self.events.is_none() {
            self.events = Some(VecDeque::new());
        }
    }

    pub(crate) fn stop_recording_events(&mut self) {
        self.events = None;
    }

    pub(crate) fn next_event(&mut self) -> Option<ModelEvent> {
        self.events.as_mut()?.pop_front()
    }

    pub(crate) fn emit(&mut self, event: ModelEvent) {
        if let Some(events) = &mut self.events {
            events.push_back(event);
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key_suffix: "Id".to_string(),
            split_ordinal_start: 1,
        }
    }
}

impl From<EntityTypeId> for Annotated {
    fn from(value: EntityTypeId) -> Self {
        Self::EntityType(value)
    }
}

impl From<PropertyId> for Annotated {
    fn from(value: PropertyId) -> Self {
        Self::Property(value)
    }
}

impl From<KeyId> for Annotated {
    fn from(value: KeyId) -> Self {
        Self::Key(value)
    }
}

impl From<ForeignKeyId> for Annotated {
    fn from(value: ForeignKeyId) -> Self {
        Self::ForeignKey(value)
    }
}

impl From<IndexId> for Annotated {
    fn from(value: IndexId) -> Self {
        Self::Index(value)
    }
}
