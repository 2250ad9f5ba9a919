use super::{Annotations, EntityTypeId, KeyId, Model, NavigationId, PropertyId};
use crate::{Error, Facet, Provenance, Result};
use std::fmt;

/// A relationship between a dependent entity type and a key of its principal.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub id: ForeignKeyId,

    /// Entity type holding the foreign key properties
    pub dependent: EntityTypeId,

    /// Foreign key properties on the dependent, in the order of the referenced
    /// key's properties
    pub properties: Vec<PropertyId>,

    pub principal: EntityTypeId,

    /// Key on the principal the properties reference
    pub principal_key: KeyId,

    /// True for one-to-one relationships
    pub(crate) unique: Facet<bool>,

    /// Always mirrors the nullability of `properties`. The provenance records
    /// who last asked for a particular requiredness.
    pub(crate) required: Facet<bool>,

    pub(crate) delete_behavior: Facet<DeleteBehavior>,

    /// Who chose `properties`. `None` when they were synthesized or discovered
    pub(crate) properties_source: Option<Provenance>,

    /// Who chose `principal_key`. `None` when it defaulted to the primary key
    pub(crate) principal_key_source: Option<Provenance>,

    /// Who chose which end is the principal. `None` when inferred
    pub(crate) principal_end_source: Option<Provenance>,

    /// Property names a caller asked for, when conflict splitting had to pick
    /// different ones
    pub(crate) requested_properties: Option<Vec<String>>,

    pub(crate) dependent_to_principal: Option<NavigationId>,

    pub(crate) principal_to_dependent: Option<NavigationId>,

    /// How the foreign key came to exist
    pub(crate) source: Provenance,

    pub(crate) annotations: Annotations,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignKeyId(pub usize);

/// What happens to dependents when their principal is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeleteBehavior {
    Cascade,
    ClientSetNull,
    SetNull,
    Restrict,
    NoAction,
}

impl ForeignKey {
    pub fn id(&self) -> ForeignKeyId {
        self.id
    }

    pub fn dependent(&self) -> EntityTypeId {
        self.dependent
    }

    pub fn principal(&self) -> EntityTypeId {
        self.principal
    }

    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    pub fn principal_key(&self) -> KeyId {
        self.principal_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique.value()
    }

    pub fn unique_source(&self) -> Option<Provenance> {
        self.unique.source()
    }

    pub fn is_required(&self) -> bool {
        self.required.value()
    }

    pub fn required_source(&self) -> Option<Provenance> {
        self.required.source()
    }

    pub fn delete_behavior(&self) -> DeleteBehavior {
        self.delete_behavior.value()
    }

    pub fn delete_behavior_source(&self) -> Option<Provenance> {
        self.delete_behavior.source()
    }

    pub fn properties_source(&self) -> Option<Provenance> {
        self.properties_source
    }

    pub fn principal_key_source(&self) -> Option<Provenance> {
        self.principal_key_source
    }

    pub fn principal_end_source(&self) -> Option<Provenance> {
        self.principal_end_source
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    /// Navigation on the dependent pointing at the principal
    pub fn dependent_to_principal(&self) -> Option<NavigationId> {
        self.dependent_to_principal
    }

    /// Navigation on the principal pointing at the dependent(s)
    pub fn principal_to_dependent(&self) -> Option<NavigationId> {
        self.principal_to_dependent
    }

    pub fn navigations(&self) -> impl Iterator<Item = NavigationId> + '_ {
        self.dependent_to_principal
            .into_iter()
            .chain(self.principal_to_dependent)
    }

    pub fn is_self_referencing(&self) -> bool {
        self.dependent == self.principal
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The navigation slot for the given direction.
    pub(crate) fn navigation_slot(&mut self, points_to_principal: bool) -> &mut Option<NavigationId> {
        if points_to_principal {
            &mut self.dependent_to_principal
        } else {
            &mut self.principal_to_dependent
        }
    }
}

impl Model {
    /// Adds a foreign key from `properties` on `dependent` to `principal_key`
    /// on `principal`.
    ///
    /// The properties must match the referenced key in count and, position by
    /// position, in scalar type.
    pub fn add_foreign_key(
        &mut self,
        dependent: EntityTypeId,
        properties: &[PropertyId],
        principal: EntityTypeId,
        principal_key: KeyId,
        source: Provenance,
    ) -> Result<ForeignKeyId> {
        self.check_foreign_key(dependent, properties, principal, principal_key)?;

        let id = self.insert_foreign_key(dependent, properties, principal, principal_key, source);

        let fk = self.foreign_key_mut(id);
        fk.properties_source = Some(source);
        fk.principal_key_source = Some(source);
        fk.principal_end_source = Some(source);

        Ok(id)
    }

    pub(crate) fn check_foreign_key(
        &self,
        dependent: EntityTypeId,
        properties: &[PropertyId],
        principal: EntityTypeId,
        principal_key: KeyId,
    ) -> Result<()> {
        let dependent_type = self.try_entity_type(dependent)?;
        let principal_type = self.try_entity_type(principal)?;

        if principal_key.entity != principal {
            return Err(Error::invalid_argument(format!(
                "{principal_key:?} is not a key of `{}`",
                principal_type.name
            )));
        }

        let key = self.try_key(principal_key)?;

        if properties.is_empty() {
            return Err(Error::invalid_argument(format!(
                "a foreign key on `{}` needs at least one property",
                dependent_type.name
            )));
        }

        for (i, property) in properties.iter().enumerate() {
            if property.entity != dependent {
                return Err(Error::invalid_argument(format!(
                    "{property:?} does not belong to `{}`",
                    dependent_type.name
                )));
            }

            self.try_property(*property)?;

            if properties[..i].contains(property) {
                return Err(Error::invalid_argument(format!(
                    "`{}` appears more than once in a foreign key on `{}`",
                    self.property(*property).name,
                    dependent_type.name
                )));
            }
        }

        if properties.len() != key.properties.len() {
            return Err(Error::shape_mismatch(format!(
                "foreign key {:?} on `{}` has {} properties but the referenced key {:?} on `{}` has {}",
                self.property_names(properties),
                dependent_type.name,
                properties.len(),
                self.property_names(&key.properties),
                principal_type.name,
                key.properties.len(),
            )));
        }

        for (fk_property, key_property) in properties.iter().zip(&key.properties) {
            let fk_property = self.property(*fk_property);
            let key_property = self.property(*key_property);

            if !fk_property.ty.is_compatible(key_property.ty) {
                return Err(Error::shape_mismatch(format!(
                    "`{}` on `{}` has type `{}` but references `{}` on `{}` of type `{}`",
                    fk_property.name,
                    dependent_type.name,
                    fk_property.ty,
                    key_property.name,
                    principal_type.name,
                    key_property.ty,
                )));
            }
        }

        Ok(())
    }

    /// Adds an already checked foreign key with derived facets.
    pub(crate) fn insert_foreign_key(
        &mut self,
        dependent: EntityTypeId,
        properties: &[PropertyId],
        principal: EntityTypeId,
        principal_key: KeyId,
        source: Provenance,
    ) -> ForeignKeyId {
        let id = ForeignKeyId(self.foreign_keys.next_index());

        self.foreign_keys.push(ForeignKey {
            id,
            dependent,
            properties: properties.to_vec(),
            principal,
            principal_key,
            unique: Facet::new(false),
            required: Facet::new(false),
            delete_behavior: Facet::new(DeleteBehavior::ClientSetNull),
            properties_source: None,
            principal_key_source: None,
            principal_end_source: None,
            requested_properties: None,
            dependent_to_principal: None,
            principal_to_dependent: None,
            source,
            annotations: Annotations::new(),
        });
        self.entity_type_mut(dependent).foreign_keys.push(id);
        self.refresh_foreign_key(id);

        tracing::debug!(
            dependent = %self.entity_type(dependent).name,
            principal = %self.entity_type(principal).name,
            properties = ?self.property_names(properties),
            %source,
            "foreign key added"
        );
        id
    }

    /// Removes a foreign key and its navigations. Shadow properties created by
    /// convention that nothing uses anymore are removed with it.
    pub fn remove_foreign_key(&mut self, id: ForeignKeyId) -> Result<()> {
        self.try_foreign_key(id)?;

        let fk = self.detach_foreign_key(id);
        self.remove_unused_shadow_properties(fk.dependent);

        let key = self.key(fk.principal_key);
        let principal = self.entity_type(fk.principal);
        if key.source.is_convention()
            && principal.primary_key.value() != Some(key.id)
            && !self.is_key_referenced(key.id)
        {
            self.remove_key(fk.principal_key);
            self.remove_unused_shadow_properties(fk.principal);
        }

        tracing::debug!(
            dependent = %self.entity_type(fk.dependent).name,
            principal = %self.entity_type(fk.principal).name,
            "foreign key removed"
        );
        Ok(())
    }

    /// Unlinks a foreign key from the graph, leaving its properties in place.
    pub(crate) fn detach_foreign_key(&mut self, id: ForeignKeyId) -> ForeignKey {
        let fk = self.foreign_keys.remove(id.0).expect("invalid foreign key ID");

        for navigation in fk.navigations() {
            self.entity_type_mut(navigation.entity)
                .navigations
                .remove(navigation.index);
        }

        self.entity_type_mut(fk.dependent)
            .foreign_keys
            .retain(|other| *other != id);

        fk
    }

    /// Removes a convention-created foreign key that no navigation uses.
    /// Returns `true` if the foreign key was removed.
    pub(crate) fn remove_foreign_key_if_abandoned(&mut self, id: ForeignKeyId) -> bool {
        let Some(fk) = self.foreign_keys.get(id.0) else {
            return false;
        };

        if fk.source.is_explicit() || fk.navigations().next().is_some() {
            return false;
        }

        self.remove_foreign_key(id).is_ok()
    }

    pub fn set_foreign_key_unique(
        &mut self,
        id: ForeignKeyId,
        unique: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.try_foreign_key(id)?;
        Ok(self.foreign_key_mut(id).unique.set(unique, source))
    }

    /// Sets whether the relationship is required by changing the nullability of
    /// its properties.
    ///
    /// Making a relationship optional fails with `cannot_be_nullable` when one
    /// of its properties cannot hold null. Returns `Ok(false)` when the write is
    /// refused by provenance.
    pub fn set_foreign_key_required(
        &mut self,
        id: ForeignKeyId,
        required: bool,
        source: Provenance,
    ) -> Result<bool> {
        let fk = self.try_foreign_key(id)?;

        if !fk.required.can_set(source) && fk.required.value() != required {
            return Ok(false);
        }

        for property in &fk.properties {
            let property = self.property(*property);

            if !required && (!property.can_be_nullable() || self.is_key_property(property.id)) {
                return Err(Error::cannot_be_nullable(
                    &property.name,
                    &self.entity_type(property.id.entity).name,
                    property.ty,
                ));
            }

            if property.nullable.value() == required && !property.nullable.can_set(source) {
                return Ok(false);
            }
        }

        let properties = fk.properties.clone();
        for property in properties {
            self.set_property_nullable(property, !required, source)?;
        }

        self.foreign_key_mut(id).required.set(required, source);
        self.refresh_foreign_key(id);
        Ok(true)
    }

    pub fn set_delete_behavior(
        &mut self,
        id: ForeignKeyId,
        delete_behavior: DeleteBehavior,
        source: Provenance,
    ) -> Result<bool> {
        self.try_foreign_key(id)?;
        Ok(self
            .foreign_key_mut(id)
            .delete_behavior
            .set(delete_behavior, source))
    }

    /// Whether `properties` could back `id` without overturning an explicit
    /// requiredness on the foreign key or an explicit nullability on one of
    /// the properties.
    pub(crate) fn accepts_foreign_key_requiredness(
        &self,
        id: ForeignKeyId,
        properties: &[PropertyId],
    ) -> bool {
        let fk = self.foreign_key(id);
        if !fk.required.is_explicit() {
            return true;
        }

        let required = fk.required.value();
        properties.iter().all(|property| {
            let nullable = &self.property(*property).nullable;
            if nullable.is_explicit() && nullable.value() == required {
                return false;
            }

            required || (self.property(*property).can_be_nullable() && !self.is_key_property(*property))
        })
    }

    /// Writes an explicitly configured requiredness through to the current
    /// foreign key properties, which may have changed since it was set.
    pub(crate) fn carry_foreign_key_requiredness(&mut self, id: ForeignKeyId) -> Result<()> {
        let fk = self.foreign_key(id);
        if !fk.required.is_explicit() {
            return Ok(());
        }

        let required = fk.required.value();
        for property in fk.properties.clone() {
            self.set_property_nullable(property, !required, Provenance::Explicit)?;
        }

        self.refresh_foreign_key(id);
        Ok(())
    }

    /// Recomputes the facets derived from the foreign key properties.
    pub(crate) fn refresh_foreign_key(&mut self, id: ForeignKeyId) {
        let required = !self
            .foreign_key(id)
            .properties
            .iter()
            .any(|property| self.property(*property).nullable.value());

        let fk = self.foreign_key_mut(id);
        fk.required.derive(required);

        if fk.delete_behavior.source().is_none() {
            fk.delete_behavior.derive(if required {
                DeleteBehavior::Cascade
            } else {
                DeleteBehavior::ClientSetNull
            });
        }
    }
}

impl From<&ForeignKey> for ForeignKeyId {
    fn from(value: &ForeignKey) -> Self {
        value.id
    }
}

impl fmt::Debug for ForeignKeyId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ForeignKeyId({})", self.0)
    }
}
