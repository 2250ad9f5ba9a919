use super::Convention;
use crate::model::{EntityType, EntityTypeId, PropertyId};
use crate::{Model, Provenance, Result};

/// Picks a primary key: the key declared on the shape, else a property named
/// like the key suffix (`Id`), else `<EntityType><key suffix>` (`BigMakId`).
/// Names are compared case-insensitively. Shadow and nullable properties are
/// never picked; a declared key over a nullable property is left for explicit
/// configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyDiscovery;

impl KeyDiscovery {
    fn discover(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        let entity_type = model.entity_type(entity);

        if entity_type.primary_key.is_explicit() {
            return Ok(());
        }

        let Some(candidate) = candidate(entity_type, &model.options().key_suffix) else {
            return Ok(());
        };

        if entity_type
            .primary_key()
            .is_some_and(|key| key.properties == candidate)
        {
            return Ok(());
        }

        model.set_primary_key(entity, &candidate, Provenance::Convention)?;
        Ok(())
    }
}

impl Convention for KeyDiscovery {
    fn entity_type_added(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        self.discover(model, entity)
    }

    fn property_added(&self, model: &mut Model, property: PropertyId) -> Result<()> {
        self.discover(model, property.entity)
    }
}

fn candidate(entity: &EntityType, key_suffix: &str) -> Option<Vec<PropertyId>> {
    if let Some(names) = entity.shape().and_then(|shape| shape.key.as_ref()) {
        return names
            .iter()
            .map(|name| {
                entity
                    .property_by_name(name)
                    .filter(|property| !property.is_nullable())
                    .map(|property| property.id)
            })
            .collect();
    }

    let typed = format!("{}{key_suffix}", entity.name);

    for name in [key_suffix, typed.as_str()] {
        let found = entity
            .properties()
            .find(|property| {
                !property.is_shadow()
                    && !property.is_nullable()
                    && property.name.eq_ignore_ascii_case(name)
            });

        if let Some(property) = found {
            return Some(vec![property.id]);
        }
    }

    None
}
