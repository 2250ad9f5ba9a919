use super::{Annotations, EntityTypeId, Model, ModelEvent, PropertyId};
use crate::{Error, Provenance, Result};
use std::fmt;

/// A candidate key: an ordered, non-empty list of properties of one entity
/// type. Order is the composite column order.
#[derive(Debug, Clone)]
pub struct Key {
    pub id: KeyId,

    /// Key properties, in order
    pub properties: Vec<PropertyId>,

    /// How the key came to exist
    pub(crate) source: Provenance,

    pub(crate) annotations: Annotations,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyId {
    pub entity: EntityTypeId,
    pub index: usize,
}

impl Key {
    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

impl Model {
    pub fn try_key(&self, id: KeyId) -> Result<&Key> {
        self.try_entity_type(id.entity)?
            .keys
            .get(id.index)
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} does not refer to a key")))
    }

    /// Adds a key over `properties`, or returns the key that already covers
    /// exactly that ordered list.
    ///
    /// Key properties are made non-nullable. Only an explicit key may force a
    /// nullable property; otherwise the call fails with `cannot_be_nullable`.
    pub fn add_key(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        source: Provenance,
    ) -> Result<KeyId> {
        self.check_key_properties(entity, properties)?;

        if let Some(existing) = self.entity_type(entity).find_key(properties) {
            let id = existing.id;
            let key = self.key_mut(id);
            key.source = key.source.max(source);
            return Ok(id);
        }

        for property in properties {
            let property = self.property(*property);
            if property.nullable.value() && !source.is_explicit() {
                return Err(Error::cannot_be_nullable(
                    &property.name,
                    &self.entity_type(entity).name,
                    property.ty,
                ));
            }
        }

        for property in properties {
            self.property_mut(*property).nullable.set(false, source);
        }

        let entity_type = self.entity_type_mut(entity);
        let id = KeyId {
            entity,
            index: entity_type.keys.next_index(),
        };
        entity_type.keys.push(Key {
            id,
            properties: properties.to_vec(),
            source,
            annotations: Annotations::new(),
        });

        for property in properties {
            self.refresh_foreign_keys_using(*property);
        }

        tracing::debug!(
            entity = %self.entity_type(entity).name,
            properties = ?self.property_names(properties),
            %source,
            "key added"
        );
        Ok(id)
    }

    /// Designates the key over `properties` as the primary key, adding it if
    /// needed.
    ///
    /// Returns `Ok(None)` when the current primary key was chosen by a stronger
    /// source. Foreign keys that referenced the previous primary key by
    /// default are moved to the new one, and a previous convention key that
    /// nothing references anymore is removed.
    pub fn set_primary_key(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        source: Provenance,
    ) -> Result<Option<KeyId>> {
        self.check_key_properties(entity, properties)?;

        let current = self.entity_type(entity).primary_key.value();

        if let Some(current) = current {
            if self.key(current).properties == properties {
                self.entity_type_mut(entity)
                    .primary_key
                    .set(Some(current), source);
                let key = self.key_mut(current);
                key.source = key.source.max(source);
                return Ok(Some(current));
            }
        }

        if !self.entity_type(entity).primary_key.can_set(source) {
            tracing::debug!(
                entity = %self.entity_type(entity).name,
                "primary key was configured explicitly; keeping it"
            );
            return Ok(None);
        }

        self.atomically(|model| {
            let key = model.add_key(entity, properties, source)?;
            model
                .entity_type_mut(entity)
                .primary_key
                .set(Some(key), source);

            if let Some(previous) = current {
                model.retarget_foreign_keys(previous, key)?;

                if model.key(previous).source.is_convention() && !model.is_key_referenced(previous) {
                    model.remove_key(previous);
                }
            }

            model.emit(ModelEvent::PrimaryKeyChanged(entity));

            tracing::debug!(
                entity = %model.entity_type(entity).name,
                properties = ?model.property_names(properties),
                %source,
                "primary key set"
            );
            Ok(Some(key))
        })
    }

    fn check_key_properties(&self, entity: EntityTypeId, properties: &[PropertyId]) -> Result<()> {
        let entity_type = self.try_entity_type(entity)?;

        if properties.is_empty() {
            return Err(Error::invalid_argument(format!(
                "a key on `{}` needs at least one property",
                entity_type.name
            )));
        }

        for (i, property) in properties.iter().enumerate() {
            if property.entity != entity {
                return Err(Error::invalid_argument(format!(
                    "{property:?} does not belong to `{}`",
                    entity_type.name
                )));
            }

            let property = self.try_property(*property)?;

            if properties[..i].contains(&property.id) {
                return Err(Error::invalid_argument(format!(
                    "`{}` appears more than once in a key on `{}`",
                    property.name, entity_type.name
                )));
            }
        }

        Ok(())
    }

    /// Returns `true` if any foreign key references the key.
    pub(crate) fn is_key_referenced(&self, id: KeyId) -> bool {
        self.foreign_keys.iter().any(|fk| fk.principal_key == id)
    }

    pub(crate) fn key_mut(&mut self, id: KeyId) -> &mut Key {
        self.entity_type_mut(id.entity)
            .keys
            .get_mut(id.index)
            .expect("invalid key ID")
    }

    /// Removes a key. Callers make sure no foreign key references it.
    pub(crate) fn remove_key(&mut self, id: KeyId) {
        debug_assert!(!self.is_key_referenced(id));

        let entity = self.entity_type_mut(id.entity);
        if entity.primary_key.value() == Some(id) {
            entity.primary_key = Default::default();
        }
        entity.keys.remove(id.index);
    }

    pub(crate) fn property_names(&self, properties: &[PropertyId]) -> Vec<&str> {
        properties
            .iter()
            .map(|property| self.property(*property).name.as_str())
            .collect()
    }
}

impl From<&Key> for KeyId {
    fn from(value: &Key) -> Self {
        value.id
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "KeyId({}/{})", self.entity.0, self.index)
    }
}
