use super::Convention;
use crate::model::{EntityTypeId, Member};
use crate::resolve::{foreign_key_property_name, End, Relate};
use crate::{Model, Provenance, Result};

/// Relates entity types whose shapes have navigation members pointing at each
/// other.
///
/// A member is paired with the single member on the target shape leading back.
/// Pairs that cannot be told apart (several members to the same target) and
/// collection-to-collection pairs are left for explicit configuration.
/// Relationships whose principal has no primary key yet are retried once it
/// gets one.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationshipDiscovery;

impl RelationshipDiscovery {
    fn discover(&self, model: &mut Model, entity: EntityTypeId) {
        let mut affected = vec![entity];

        // Shapes registered earlier may point at this entity type
        let name = model.entity_type(entity).name.clone();
        for other in model.entity_types() {
            let points_here = other
                .shape()
                .is_some_and(|shape| shape.navigations().any(|member| member.target() == Some(name.as_str())));

            if other.id != entity && points_here {
                affected.push(other.id);
            }
        }

        for entity in affected {
            for request in requests(model, entity) {
                match model.relate(&request, Provenance::Convention) {
                    Ok(fk) => tracing::debug!(
                        a = %request.a,
                        b = %request.b,
                        ?fk,
                        "relationship discovered"
                    ),
                    Err(err) if err.is_shape_mismatch() => tracing::debug!(
                        a = %request.a,
                        b = %request.b,
                        %err,
                        "relationship deferred"
                    ),
                    Err(err) if err.is_ambiguous() => tracing::debug!(
                        a = %request.a,
                        b = %request.b,
                        %err,
                        "relationship discovery skipped"
                    ),
                    Err(err) => tracing::warn!(
                        a = %request.a,
                        b = %request.b,
                        %err,
                        "discovered relationship conflicts with configuration; skipped"
                    ),
                }
            }
        }
    }
}

impl Convention for RelationshipDiscovery {
    fn entity_type_added(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        self.discover(model, entity);
        Ok(())
    }

    fn primary_key_changed(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        self.discover(model, entity);
        Ok(())
    }
}

/// Relationship requests for the unmapped navigation members of `entity`.
fn requests(model: &Model, entity: EntityTypeId) -> Vec<Relate> {
    let entity_type = model.entity_type(entity);
    let Some(shape) = entity_type.shape() else {
        return vec![];
    };

    let mut requests = vec![];

    for member in shape.navigations() {
        if entity_type.is_ignored(&member.name) || entity_type.navigation_by_name(&member.name).is_some() {
            continue;
        }

        let Some(target) = member.target().and_then(|target| model.find_entity_type(target)) else {
            tracing::debug!(
                entity = %entity_type.name,
                navigation = %member.name,
                "navigation target not registered yet"
            );
            continue;
        };

        let candidates = unmapped_members(model, entity, target.id);
        let inverse = if target.id == entity {
            match candidates.as_slice() {
                [_] => None,
                [first, second] if first.is_collection() != second.is_collection() => {
                    Some(if first.name == member.name { *second } else { *first })
                }
                _ => {
                    tracing::debug!(entity = %entity_type.name, "ambiguous self reference; not pairing");
                    continue;
                }
            }
        } else {
            if candidates.len() > 1 {
                tracing::debug!(
                    entity = %entity_type.name,
                    target = %target.name,
                    "several navigations lead to the same entity type; not pairing"
                );
                continue;
            }

            let inverses = unmapped_members(model, target.id, entity);
            if inverses.len() > 1 {
                tracing::debug!(
                    entity = %target.name,
                    target = %entity_type.name,
                    "several navigations lead back; not pairing"
                );
                continue;
            }
            inverses.first().copied()
        };

        if member.is_collection() && inverse.is_some_and(Member::is_collection) {
            tracing::debug!(
                entity = %entity_type.name,
                navigation = %member.name,
                "many-to-many relationships are not discovered"
            );
            continue;
        }

        let mut request = Relate::new(&entity_type.name, &target.name).navigation_on_a(&member.name);

        if let Some(inverse) = inverse {
            request = request.navigation_on_b(&inverse.name);
        }

        let inverse_is_collection = inverse.is_some_and(Member::is_collection);
        request = request.unique(!member.is_collection() && !inverse_is_collection && inverse.is_some());

        if member.is_collection() {
            request = request.principal(End::A);
        } else if inverse_is_collection {
            request = request.principal(End::B);
        } else if let Some(end) = principal_by_key_names(model, entity, target.id) {
            request = request.principal(end);
        }

        requests.push(request);
    }

    requests
}

/// Navigation members on `entity`'s shape leading to `target` that are
/// neither ignored nor mapped yet.
fn unmapped_members(model: &Model, entity: EntityTypeId, target: EntityTypeId) -> Vec<&Member> {
    let entity_type = model.entity_type(entity);
    let target_name = &model.entity_type(target).name;

    let Some(shape) = entity_type.shape() else {
        return vec![];
    };

    shape
        .navigations()
        .filter(|member| member.target() == Some(target_name.as_str()))
        .filter(|member| !entity_type.is_ignored(&member.name))
        .filter(|member| entity_type.navigation_by_name(&member.name).is_none())
        .collect()
}

/// For a one-to-one pair, the end whose key the other end appears to hold a
/// foreign key property for.
fn principal_by_key_names(model: &Model, a: EntityTypeId, b: EntityTypeId) -> Option<End> {
    match (holds_key_of(model, a, b), holds_key_of(model, b, a)) {
        (true, false) => Some(End::B),
        (false, true) => Some(End::A),
        _ => None,
    }
}

fn holds_key_of(model: &Model, dependent: EntityTypeId, principal: EntityTypeId) -> bool {
    let principal_type = model.entity_type(principal);
    let Some(key) = principal_type.primary_key() else {
        return false;
    };

    let dependent_type = model.entity_type(dependent);
    key.properties.iter().all(|property| {
        let key_name = &model.property(*property).name;
        let name = foreign_key_property_name(&principal_type.name, key_name);
        dependent_type
            .property_by_name(&name)
            .is_some_and(|property| !property.is_shadow())
    })
}
