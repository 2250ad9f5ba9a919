use super::{EntityTypeId, ForeignKeyId, Model};
use crate::{Error, Provenance, Result};
use std::fmt;

/// A named, directed traversal from one entity type to a related one.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub id: NavigationId,

    pub name: String,

    /// Foreign key backing the navigation
    pub foreign_key: ForeignKeyId,

    /// True when the navigation lives on the dependent and points at the
    /// principal
    pub points_to_principal: bool,

    /// How the navigation came to exist
    pub(crate) source: Provenance,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationId {
    pub entity: EntityTypeId,
    pub index: usize,
}

impl Navigation {
    pub fn id(&self) -> NavigationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn foreign_key(&self) -> ForeignKeyId {
        self.foreign_key
    }

    pub fn points_to_principal(&self) -> bool {
        self.points_to_principal
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    /// Entity type the navigation leads to.
    pub fn target(&self, model: &Model) -> EntityTypeId {
        let fk = model.foreign_key(self.foreign_key);
        if self.points_to_principal {
            fk.principal
        } else {
            fk.dependent
        }
    }

    /// Returns `true` if the navigation yields many records.
    pub fn is_collection(&self, model: &Model) -> bool {
        !self.points_to_principal && !model.foreign_key(self.foreign_key).is_unique()
    }

    /// The navigation on the other end of the same foreign key.
    pub fn inverse(&self, model: &Model) -> Option<NavigationId> {
        let fk = model.foreign_key(self.foreign_key);
        if self.points_to_principal {
            fk.principal_to_dependent
        } else {
            fk.dependent_to_principal
        }
    }
}

impl Model {
    pub fn try_navigation(&self, id: NavigationId) -> Result<&Navigation> {
        self.try_entity_type(id.entity)?
            .navigations
            .get(id.index)
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} does not refer to a navigation")))
    }

    /// Attaches a navigation named `name` to one end of a foreign key.
    ///
    /// A navigation pointing to the principal lives on the dependent, and one
    /// pointing to the dependent lives on the principal. Fails if the name is
    /// taken on that entity type or the foreign key already has a navigation in
    /// that direction.
    pub fn add_navigation(
        &mut self,
        name: &str,
        foreign_key: ForeignKeyId,
        points_to_principal: bool,
        source: Provenance,
    ) -> Result<NavigationId> {
        let fk = self.try_foreign_key(foreign_key)?;

        if name.is_empty() {
            return Err(Error::invalid_argument("navigation name must not be empty"));
        }

        let (owner, existing) = if points_to_principal {
            (fk.dependent, fk.dependent_to_principal)
        } else {
            (fk.principal, fk.principal_to_dependent)
        };
        let entity = self.entity_type(owner);

        if entity.is_member_name(name) {
            return Err(Error::invalid_argument(format!(
                "`{name}` on `{}` is already a property or navigation",
                entity.name
            )));
        }

        if let Some(existing) = existing {
            return Err(Error::invalid_argument(format!(
                "foreign key already has navigation `{}` on `{}` in that direction",
                self.navigation(existing).name,
                entity.name
            )));
        }

        let entity = self.entity_type_mut(owner);
        entity.ignored.shift_remove(name);

        let id = NavigationId {
            entity: owner,
            index: entity.navigations.next_index(),
        };
        entity.navigations.push(Navigation {
            id,
            name: name.to_string(),
            foreign_key,
            points_to_principal,
            source,
        });
        *self
            .foreign_key_mut(foreign_key)
            .navigation_slot(points_to_principal) = Some(id);

        tracing::debug!(
            entity = %self.entity_type(owner).name,
            navigation = name,
            points_to_principal,
            %source,
            "navigation added"
        );
        Ok(id)
    }

    /// Detaches a navigation from its foreign key and removes it. The foreign
    /// key itself stays.
    pub fn remove_navigation(&mut self, id: NavigationId) -> Result<()> {
        let navigation = self.try_navigation(id)?;
        let foreign_key = navigation.foreign_key;
        let points_to_principal = navigation.points_to_principal;

        let slot = self
            .foreign_key_mut(foreign_key)
            .navigation_slot(points_to_principal);
        if *slot == Some(id) {
            *slot = None;
        }

        let removed = self
            .entity_type_mut(id.entity)
            .navigations
            .remove(id.index)
            .expect("invalid navigation ID");

        tracing::debug!(
            entity = %self.entity_type(id.entity).name,
            navigation = %removed.name,
            "navigation removed"
        );
        Ok(())
    }
}

impl From<&Navigation> for NavigationId {
    fn from(value: &Navigation) -> Self {
        value.id
    }
}

impl fmt::Debug for NavigationId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "NavigationId({}/{})", self.entity.0, self.index)
    }
}
