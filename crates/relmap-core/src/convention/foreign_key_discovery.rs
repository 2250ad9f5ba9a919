use super::Convention;
use crate::model::PropertyId;
use crate::{Model, Result};

/// Rebinds foreign keys whose properties were synthesized or discovered when
/// a property following a foreign key naming pattern shows up later.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForeignKeyDiscovery;

impl Convention for ForeignKeyDiscovery {
    fn property_added(&self, model: &mut Model, property: PropertyId) -> Result<()> {
        let foreign_keys = model.entity_type(property.entity).foreign_key_ids().to_vec();

        for fk in foreign_keys {
            if model.try_foreign_key(fk).is_ok() {
                model.rediscover_foreign_key_properties(fk)?;
            }
        }

        Ok(())
    }
}
