use super::{Annotations, EntityTypeId, Model, ModelEvent, ValueType};
use crate::{Error, Facet, Provenance, Result};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Property {
    /// Uniquely identifies the property within the model
    pub id: PropertyId,

    /// The property name, unique within its entity type
    pub name: String,

    /// Declared value type
    pub(crate) ty: ValueType,

    /// True if the property exists only in the model and not on the source
    /// record shape
    pub(crate) shadow: bool,

    /// True if the property accepts null
    pub(crate) nullable: Facet<bool>,

    pub(crate) concurrency_token: Facet<bool>,

    pub(crate) value_generated: Facet<ValueGenerated>,

    /// How the property came to exist
    pub(crate) source: Provenance,

    pub(crate) annotations: Annotations,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyId {
    pub entity: EntityTypeId,
    pub index: usize,
}

/// When the store generates a value for the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueGenerated {
    #[default]
    Never,
    OnAdd,
    OnAddOrUpdate,
}

impl Property {
    fn new(id: PropertyId, name: &str, ty: ValueType, shadow: bool, source: Provenance) -> Self {
        Self {
            id,
            name: name.to_string(),
            ty,
            shadow,
            nullable: Facet::new(ty.nullable),
            concurrency_token: Facet::new(false),
            value_generated: Facet::new(ValueGenerated::Never),
            source,
            annotations: Annotations::new(),
        }
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn is_shadow(&self) -> bool {
        self.shadow
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.value()
    }

    pub fn nullable_source(&self) -> Option<Provenance> {
        self.nullable.source()
    }

    pub fn is_concurrency_token(&self) -> bool {
        self.concurrency_token.value()
    }

    pub fn value_generated(&self) -> ValueGenerated {
        self.value_generated.value()
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns `true` if the property may ever hold null. Shadow properties
    /// follow whatever the model says; declared properties follow their type.
    pub fn can_be_nullable(&self) -> bool {
        self.shadow || self.ty.nullable
    }
}

impl Model {
    pub fn try_property(&self, id: PropertyId) -> Result<&Property> {
        self.try_entity_type(id.entity)?
            .properties
            .get(id.index)
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} does not refer to a property")))
    }

    /// Resolve a property name on an entity type to its handle.
    pub fn property_id(&self, entity: EntityTypeId, name: &str) -> Result<PropertyId> {
        let entity = self.try_entity_type(entity)?;

        if name.is_empty() {
            return Err(Error::invalid_argument("property name must not be empty"));
        }

        entity
            .property_by_name(name)
            .map(|property| property.id)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown property `{name}` on `{}`",
                    entity.name
                ))
            })
    }

    /// Resolve a list of property names, preserving order.
    pub fn property_ids(&self, entity: EntityTypeId, names: &[impl AsRef<str>]) -> Result<Vec<PropertyId>> {
        names
            .iter()
            .map(|name| self.property_id(entity, name.as_ref()))
            .collect()
    }

    /// Adds a property declared on the record shape.
    ///
    /// Adding a name that already exists with the same type returns the
    /// existing property. A shadow property of the same scalar type is promoted
    /// to a declared property in place.
    pub fn add_property(
        &mut self,
        entity: EntityTypeId,
        name: &str,
        ty: impl Into<ValueType>,
        source: Provenance,
    ) -> Result<PropertyId> {
        self.add_property_impl(entity, name, ty.into(), false, source)
    }

    /// Adds a property that exists only in the model.
    pub fn add_shadow_property(
        &mut self,
        entity: EntityTypeId,
        name: &str,
        ty: impl Into<ValueType>,
        source: Provenance,
    ) -> Result<PropertyId> {
        self.add_property_impl(entity, name, ty.into(), true, source)
    }

    fn add_property_impl(
        &mut self,
        entity_id: EntityTypeId,
        name: &str,
        ty: ValueType,
        shadow: bool,
        source: Provenance,
    ) -> Result<PropertyId> {
        let entity = self.try_entity_type(entity_id)?;

        if name.is_empty() {
            return Err(Error::invalid_argument("property name must not be empty"));
        }

        if entity.navigation_by_name(name).is_some() {
            return Err(Error::invalid_argument(format!(
                "`{name}` on `{}` is already a navigation",
                entity.name
            )));
        }

        if let Some(existing) = entity.property_by_name(name) {
            let id = existing.id;

            if !existing.ty.is_compatible(ty) || (!shadow && !existing.shadow && existing.ty != ty) {
                return Err(Error::shape_mismatch(format!(
                    "property `{name}` on `{}` already exists with type `{}`, not `{ty}`",
                    entity.name, existing.ty
                )));
            }

            if !shadow && existing.shadow {
                self.promote_shadow_property(id, ty);
            }

            let property = self.property_mut(id);
            property.source = property.source.max(source);

            if source.is_explicit() {
                self.entity_type_mut(entity_id).ignored.shift_remove(name);
            }

            return Ok(id);
        }

        if entity.is_ignored(name) {
            if !source.is_explicit() {
                return Err(Error::invalid_argument(format!(
                    "`{name}` on `{}` is ignored",
                    entity.name
                )));
            }

            self.entity_type_mut(entity_id).ignored.shift_remove(name);
        }

        let entity = self.entity_type_mut(entity_id);
        let id = PropertyId {
            entity: entity_id,
            index: entity.properties.next_index(),
        };
        entity
            .properties
            .push(Property::new(id, name, ty, shadow, source));

        self.emit(ModelEvent::PropertyAdded(id));

        tracing::debug!(
            entity = %self.entity_type(entity_id).name,
            property = name,
            %ty,
            shadow,
            %source,
            "property added"
        );
        Ok(id)
    }

    fn promote_shadow_property(&mut self, id: PropertyId, ty: ValueType) {
        let in_key = self.is_key_property(id);
        let property = self.property_mut(id);
        property.shadow = false;
        property.ty = ty;

        if !property.nullable.is_explicit() {
            property.nullable.derive(ty.nullable && !in_key);
        } else if !ty.nullable {
            property.nullable.derive(false);
        }

        self.refresh_foreign_keys_using(id);
        self.emit(ModelEvent::PropertyAdded(id));
    }

    /// Changes whether a property accepts null.
    ///
    /// Returns `Ok(false)` when the write is refused by provenance. Fails if
    /// the property is part of a key, or is a declared property whose type
    /// does not admit null.
    pub fn set_property_nullable(
        &mut self,
        id: PropertyId,
        nullable: bool,
        source: Provenance,
    ) -> Result<bool> {
        let property = self.try_property(id)?;

        if nullable && (!property.can_be_nullable() || self.is_key_property(id)) {
            return Err(Error::cannot_be_nullable(
                &property.name,
                &self.entity_type(id.entity).name,
                property.ty,
            ));
        }

        let property = self.property_mut(id);
        if !property.nullable.set(nullable, source) {
            return Ok(false);
        }

        if property.shadow {
            property.ty.nullable = nullable || property.ty.nullable;
        }

        self.refresh_foreign_keys_using(id);
        Ok(true)
    }

    pub fn set_concurrency_token(
        &mut self,
        id: PropertyId,
        concurrency_token: bool,
        source: Provenance,
    ) -> Result<bool> {
        self.try_property(id)?;
        Ok(self
            .property_mut(id)
            .concurrency_token
            .set(concurrency_token, source))
    }

    pub fn set_value_generated(
        &mut self,
        id: PropertyId,
        value_generated: ValueGenerated,
        source: Provenance,
    ) -> Result<bool> {
        self.try_property(id)?;
        Ok(self
            .property_mut(id)
            .value_generated
            .set(value_generated, source))
    }

    /// Excludes a member from the model.
    ///
    /// An existing property or navigation of that name is removed, together
    /// with convention-created keys, indexes, and foreign keys that contain it.
    /// Metadata configured explicitly blocks the ignore. A convention asking to
    /// ignore something configured explicitly is a no-op.
    pub fn ignore(&mut self, entity_id: EntityTypeId, name: &str, source: Provenance) -> Result<()> {
        let entity = self.try_entity_type(entity_id)?;

        if name.is_empty() {
            return Err(Error::invalid_argument("member name must not be empty"));
        }

        if let Some(property) = entity.property_by_name(name) {
            if !source.overrides(Some(property.source)) {
                return Ok(());
            }

            let id = property.id;
            self.atomically(|model| model.remove_ignored_property(id))?;
        }

        if let Some(navigation) = self.entity_type(entity_id).navigation_by_name(name) {
            if !source.overrides(Some(navigation.source)) {
                return Ok(());
            }

            let id = navigation.id;
            let fk = navigation.foreign_key;
            self.remove_navigation(id)?;
            self.remove_foreign_key_if_abandoned(fk);
        }

        let ignored = &mut self.entity_type_mut(entity_id).ignored;
        let recorded = ignored.get(name).copied();
        ignored.insert(name.to_string(), Provenance::strongest(recorded, source));

        tracing::debug!(
            entity = %self.entity_type(entity_id).name,
            member = name,
            %source,
            "member ignored"
        );
        Ok(())
    }

    fn remove_ignored_property(&mut self, id: PropertyId) -> Result<()> {
        let entity = self.entity_type(id.entity);
        let property = entity.property(id);

        let blocked = |what: &str| {
            Error::invariant_violation(format!(
                "cannot ignore `{}` on `{}` because it is part of an explicitly configured {what}",
                property.name, entity.name
            ))
        };

        let mut fks = vec![];
        for fk in &entity.foreign_keys {
            let fk = self.foreign_key(*fk);
            if fk.properties.contains(&id) {
                if fk.source.is_explicit() || fk.properties_source().is_some_and(Provenance::is_explicit) {
                    return Err(blocked("foreign key"));
                }
                fks.push(fk.id);
            }
        }

        let mut keys = vec![];
        for key in entity.keys() {
            if key.properties.contains(&id) {
                if key.source.is_explicit()
                    || entity.primary_key.is_explicit() && entity.primary_key.value() == Some(key.id)
                {
                    return Err(blocked("key"));
                }
                if self.is_key_referenced(key.id) {
                    return Err(Error::invariant_violation(format!(
                        "cannot ignore `{}` on `{}` because its key is referenced by a foreign key",
                        property.name, entity.name
                    )));
                }
                keys.push(key.id);
            }
        }

        let mut indexes = vec![];
        for index in entity.indexes() {
            if index.properties.contains(&id) {
                if index.source.is_explicit() {
                    return Err(blocked("index"));
                }
                indexes.push(index.id);
            }
        }

        for fk in fks {
            self.remove_foreign_key(fk)?;
        }

        for key in keys {
            self.remove_key(key);
        }

        for index in indexes {
            self.entity_type_mut(id.entity).indexes.remove(index.index);
        }

        self.entity_type_mut(id.entity).properties.remove(id.index);
        Ok(())
    }

    /// Returns `true` if the property belongs to any key of its entity type.
    pub(crate) fn is_key_property(&self, id: PropertyId) -> bool {
        self.entity_type(id.entity)
            .keys()
            .any(|key| key.properties.contains(&id))
    }

    pub(crate) fn refresh_foreign_keys_using(&mut self, id: PropertyId) {
        let fks: Vec<_> = self
            .entity_type(id.entity)
            .foreign_keys
            .iter()
            .copied()
            .filter(|fk| self.foreign_key(*fk).properties.contains(&id))
            .collect();

        for fk in fks {
            self.refresh_foreign_key(fk);
        }
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "PropertyId({}/{})", self.entity.0, self.index)
    }
}
