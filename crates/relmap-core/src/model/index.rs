use super::{Annotations, EntityTypeId, Model, PropertyId};
use crate::{Error, Facet, Provenance, Result};
use std::fmt;

/// An index over properties of one entity type. Carried through the model as
/// metadata; relationships never consult it.
#[derive(Debug, Clone)]
pub struct Index {
    pub id: IndexId,

    pub properties: Vec<PropertyId>,

    pub(crate) unique: Facet<bool>,

    pub(crate) source: Provenance,

    pub(crate) annotations: Annotations,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexId {
    pub entity: EntityTypeId,
    pub index: usize,
}

impl Index {
    pub fn id(&self) -> IndexId {
        self.id
    }

    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    pub fn is_unique(&self) -> bool {
        self.unique.value()
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

impl Model {
    pub fn try_index(&self, id: IndexId) -> Result<&Index> {
        self.try_entity_type(id.entity)?
            .indexes
            .get(id.index)
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} does not refer to an index")))
    }

    /// Adds an index over `properties`, or updates the index that already
    /// covers that ordered list. `unique: None` leaves uniqueness as it is.
    pub fn add_index(
        &mut self,
        entity: EntityTypeId,
        properties: &[PropertyId],
        unique: Option<bool>,
        source: Provenance,
    ) -> Result<IndexId> {
        let entity_type = self.try_entity_type(entity)?;

        if properties.is_empty() {
            return Err(Error::invalid_argument(format!(
                "an index on `{}` needs at least one property",
                entity_type.name
            )));
        }

        for property in properties {
            if property.entity != entity {
                return Err(Error::invalid_argument(format!(
                    "{property:?} does not belong to `{}`",
                    entity_type.name
                )));
            }
            self.try_property(*property)?;
        }

        let existing = entity_type
            .indexes()
            .find(|index| index.properties == properties)
            .map(|index| index.id);

        let entity_type = self.entity_type_mut(entity);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = IndexId {
                    entity,
                    index: entity_type.indexes.next_index(),
                };
                entity_type.indexes.push(Index {
                    id,
                    properties: properties.to_vec(),
                    unique: Facet::new(false),
                    source,
                    annotations: Annotations::new(),
                });
                id
            }
        };

        let index = entity_type
            .indexes
            .get_mut(id.index)
            .expect("invalid index ID");
        index.source = index.source.max(source);

        if let Some(unique) = unique {
            index.unique.set(unique, source);
        }

        Ok(id)
    }
}

impl fmt::Debug for IndexId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "IndexId({}/{})", self.entity.0, self.index)
    }
}
