//! Default discovery rules applied as the model changes.
//!
//! Conventions react to [`ModelEvent`]s recorded by the model and mutate it
//! through the same operations explicit configuration uses, always with
//! [`Provenance::Convention`](crate::Provenance::Convention). A convention
//! never overrides a fact configured explicitly.

mod foreign_key_discovery;
pub use foreign_key_discovery::ForeignKeyDiscovery;

mod key_discovery;
pub use key_discovery::KeyDiscovery;

mod property_discovery;
pub use property_discovery::PropertyDiscovery;

mod relationship_discovery;
pub use relationship_discovery::RelationshipDiscovery;

use crate::model::{EntityTypeId, ModelEvent, PropertyId};
use crate::{Model, Result};
use std::fmt;

/// A rule reacting to model changes. Every hook defaults to doing nothing.
pub trait Convention: fmt::Debug {
    fn entity_type_added(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        let _ = (model, entity);
        Ok(())
    }

    fn property_added(&self, model: &mut Model, property: PropertyId) -> Result<()> {
        let _ = (model, property);
        Ok(())
    }

    fn primary_key_changed(&self, model: &mut Model, entity: EntityTypeId) -> Result<()> {
        let _ = (model, entity);
        Ok(())
    }
}

/// The ordered list of conventions a builder runs.
#[derive(Debug)]
pub struct ConventionSet {
    conventions: Vec<Box<dyn Convention>>,
}

impl ConventionSet {
    /// A set with no conventions. The model then only changes through
    /// explicit calls.
    pub fn empty() -> Self {
        Self {
            conventions: vec![],
        }
    }

    pub fn push(&mut self, convention: impl Convention + 'static) -> &mut Self {
        self.conventions.push(Box::new(convention));
        self
    }

    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }

    /// Runs every convention for `event`, in order.
    pub(crate) fn dispatch(&self, model: &mut Model, event: ModelEvent) -> Result<()> {
        for convention in &self.conventions {
            tracing::trace!(?convention, ?event, "dispatching");

            match event {
                ModelEvent::EntityTypeAdded(entity) => {
                    if model.try_entity_type(entity).is_ok() {
                        convention.entity_type_added(model, entity)?;
                    }
                }
                ModelEvent::PropertyAdded(property) => {
                    if model.try_property(property).is_ok() {
                        convention.property_added(model, property)?;
                    }
                }
                ModelEvent::PrimaryKeyChanged(entity) => {
                    if model.try_entity_type(entity).is_ok() {
                        convention.primary_key_changed(model, entity)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for ConventionSet {
    /// Property discovery, then key discovery, then foreign key discovery,
    /// then relationship discovery.
    fn default() -> Self {
        let mut conventions = Self::empty();
        conventions
            .push(PropertyDiscovery)
            .push(KeyDiscovery)
            .push(ForeignKeyDiscovery)
            .push(RelationshipDiscovery);
        conventions
    }
}
