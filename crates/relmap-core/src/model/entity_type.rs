use super::{
    Annotations, ForeignKeyId, Index, IndexId, Key, KeyId, Model, ModelEvent, Navigation,
    NavigationId, Property, PropertyId, Shape, Slots,
};
use crate::{Error, Facet, Provenance, Result};
use indexmap::IndexMap;
use std::fmt;

/// One mapped record shape.
#[derive(Debug, Clone)]
pub struct EntityType {
    /// Uniquely identifies the entity type within the model
    pub id: EntityTypeId,

    /// Name of the entity type, unique within the model
    pub name: String,

    /// How the entity type came to exist
    pub(crate) source: Provenance,

    /// Properties in insertion order
    pub(crate) properties: Slots<Property>,

    /// Candidate keys, including the primary key
    pub(crate) keys: Slots<Key>,

    pub(crate) primary_key: Facet<Option<KeyId>>,

    /// Foreign keys declared on this entity type, i.e. where it is the dependent
    pub(crate) foreign_keys: Vec<ForeignKeyId>,

    pub(crate) navigations: Slots<Navigation>,

    pub(crate) indexes: Slots<Index>,

    /// Member names that conventions must not map, with who asked
    pub(crate) ignored: IndexMap<String, Provenance>,

    /// Declared record shape, when the entity type was registered from one
    pub(crate) shape: Option<Shape>,

    pub(crate) annotations: Annotations,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityTypeId(pub usize);

impl EntityType {
    fn new(id: EntityTypeId, name: &str, source: Provenance) -> Self {
        Self {
            id,
            name: name.to_string(),
            source,
            properties: Slots::new(),
            keys: Slots::new(),
            primary_key: Facet::new(None),
            foreign_keys: vec![],
            navigations: Slots::new(),
            indexes: Slots::new(),
            ignored: IndexMap::new(),
            shape: None,
            annotations: Annotations::new(),
        }
    }

    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.properties.iter()
    }

    #[track_caller]
    pub fn property(&self, id: PropertyId) -> &Property {
        assert_eq!(self.id, id.entity);
        self.properties.get(id.index).expect("invalid property ID")
    }

    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.keys.iter()
    }

    #[track_caller]
    pub fn key(&self, id: KeyId) -> &Key {
        assert_eq!(self.id, id.entity);
        self.keys.get(id.index).expect("invalid key ID")
    }

    /// The key covering exactly `properties`, in that order.
    pub fn find_key(&self, properties: &[PropertyId]) -> Option<&Key> {
        self.keys.iter().find(|key| key.properties == properties)
    }

    pub fn primary_key(&self) -> Option<&Key> {
        self.primary_key.value().map(|id| self.key(id))
    }

    /// Provenance of the primary key designation.
    pub fn primary_key_source(&self) -> Option<Provenance> {
        self.primary_key.source()
    }

    /// Foreign keys where this entity type is the dependent.
    pub fn foreign_key_ids(&self) -> &[ForeignKeyId] {
        &self.foreign_keys
    }

    pub fn navigations(&self) -> impl Iterator<Item = &Navigation> + '_ {
        self.navigations.iter()
    }

    #[track_caller]
    pub fn navigation(&self, id: NavigationId) -> &Navigation {
        assert_eq!(self.id, id.entity);
        self.navigations.get(id.index).expect("invalid navigation ID")
    }

    pub fn navigation_by_name(&self, name: &str) -> Option<&Navigation> {
        self.navigations
            .iter()
            .find(|navigation| navigation.name == name)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &Index> + '_ {
        self.indexes.iter()
    }

    #[track_caller]
    pub fn index(&self, id: IndexId) -> &Index {
        assert_eq!(self.id, id.entity);
        self.indexes.get(id.index).expect("invalid index ID")
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains_key(name)
    }

    /// Returns `true` if `name` is taken by a property or a navigation.
    pub fn is_member_name(&self, name: &str) -> bool {
        self.property_by_name(name).is_some() || self.navigation_by_name(name).is_some()
    }
}

impl Model {
    /// Adds a new entity type. Fails if the name is empty or already taken.
    pub fn add_entity_type(&mut self, name: &str, source: Provenance) -> Result<EntityTypeId> {
        if name.is_empty() {
            return Err(Error::invalid_argument("entity type name must not be empty"));
        }

        if self.names.contains_key(name) {
            return Err(Error::invalid_argument(format!(
                "entity type `{name}` already exists"
            )));
        }

        let id = EntityTypeId(self.entity_types.next_index());
        self.entity_types.push(EntityType::new(id, name, source));
        self.names.insert(name.to_string(), id);
        self.emit(ModelEvent::EntityTypeAdded(id));

        tracing::debug!(entity = name, %source, "entity type added");
        Ok(id)
    }

    /// Returns the entity type named `name`, adding it if missing. An existing
    /// entity type's provenance is upgraded to `source` if that is stronger.
    pub fn entity_type_or_add(&mut self, name: &str, source: Provenance) -> Result<EntityTypeId> {
        match self.names.get(name).copied() {
            Some(id) => {
                let entity = self.entity_type_mut(id);
                entity.source = entity.source.max(source);
                Ok(id)
            }
            None => self.add_entity_type(name, source),
        }
    }

    /// Adds an entity type described by `shape`. The shape is kept so the
    /// convention pipeline can discover members from it.
    pub fn add_shaped_entity_type(&mut self, shape: Shape, source: Provenance) -> Result<EntityTypeId> {
        let mut seen = std::collections::HashSet::new();
        for member in &shape.members {
            if member.name.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "shape `{}` has a member with an empty name",
                    shape.name
                )));
            }

            if !seen.insert(member.name.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "shape `{}` declares member `{}` more than once",
                    shape.name, member.name
                )));
            }
        }

        // Validate the name before the event is emitted
        if self.names.contains_key(&shape.name) {
            return Err(Error::invalid_argument(format!(
                "entity type `{}` already exists",
                shape.name
            )));
        }

        let id = self.add_entity_type(&shape.name.clone(), source)?;
        self.entity_type_mut(id).shape = Some(shape);
        Ok(id)
    }

    /// Removes an entity type along with everything it owns.
    ///
    /// Foreign keys on other entity types that reference this one, and
    /// navigations on other entity types backed by any removed foreign key, are
    /// removed as well.
    pub fn remove_entity_type(&mut self, id: EntityTypeId) -> Result<EntityType> {
        let name = self.try_entity_type(id)?.name.clone();

        let affected: Vec<ForeignKeyId> = self
            .foreign_keys
            .iter()
            .filter(|fk| fk.principal == id || fk.dependent == id)
            .map(|fk| fk.id)
            .collect();

        let mut dependents = vec![];
        for fk in affected {
            let removed = self.detach_foreign_key(fk);
            if removed.dependent != id && !dependents.contains(&removed.dependent) {
                dependents.push(removed.dependent);
            }
        }

        for dependent in dependents {
            self.remove_unused_shadow_properties(dependent);
        }

        let entity = self
            .entity_types
            .remove(id.0)
            .expect("invalid entity type ID");
        self.names.shift_remove(&name);

        tracing::debug!(entity = %name, "entity type removed");
        Ok(entity)
    }

    pub fn remove_entity_type_by_name(&mut self, name: &str) -> Result<EntityType> {
        let id = self.entity_type_id(name)?;
        self.remove_entity_type(id)
    }

    /// Removes convention-created shadow properties no key, foreign key, or
    /// index uses anymore.
    pub(crate) fn remove_unused_shadow_properties(&mut self, entity: EntityTypeId) {
        let unused: Vec<PropertyId> = self
            .entity_type(entity)
            .properties()
            .filter(|property| property.shadow && property.source.is_convention())
            .map(|property| property.id)
            .filter(|id| !self.is_property_in_use(*id))
            .collect();

        for id in unused {
            let removed = self
                .entity_type_mut(entity)
                .properties
                .remove(id.index)
                .expect("invalid property ID");
            tracing::debug!(
                entity = %self.entity_type(entity).name,
                property = %removed.name,
                "unused shadow property removed"
            );
        }
    }

    /// Returns `true` if a key, foreign key, or index includes the property.
    pub(crate) fn is_property_in_use(&self, id: PropertyId) -> bool {
        let entity = self.entity_type(id.entity);

        entity.keys().any(|key| key.properties.contains(&id))
            || entity.indexes().any(|index| index.properties.contains(&id))
            || entity
                .foreign_keys
                .iter()
                .any(|fk| self.foreign_key(*fk).properties.contains(&id))
    }
}

impl From<&Self> for EntityTypeId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&EntityType> for EntityTypeId {
    fn from(value: &EntityType) -> Self {
        value.id
    }
}

impl fmt::Debug for EntityTypeId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "EntityTypeId({})", self.0)
    }
}
