use super::Convention;
use crate::model::{EntityTypeId, MemberKind};
use crate::{Model, Provenance, Result};

/// Adds a property for every scalar member of a registered shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyDiscovery;

impl Convention for PropertyDiscovery {
    fn entity_type_added(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        let Some(shape) = model.entity_type(entity).shape().cloned() else {
            return Ok(());
        };

        for member in &shape.members {
            let MemberKind::Scalar(ty) = member.kind else {
                continue;
            };

            let entity_type = model.entity_type(entity);
            if entity_type.is_ignored(&member.name) || entity_type.is_member_name(&member.name) {
                continue;
            }

            model.add_property(entity, &member.name, ty, Provenance::Convention)?;
        }

        Ok(())
    }
}
