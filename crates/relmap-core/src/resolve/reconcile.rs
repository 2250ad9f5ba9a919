use super::{foreign_key_property_name, with_ordinal, End, Resolve};
use crate::model::{EntityTypeId, ForeignKeyId, KeyId, Model, PropertyId};
use crate::{Error, Provenance, Result};

/// Foreign key properties chosen for a request.
struct Properties {
    ids: Vec<PropertyId>,

    /// Set when the request named the properties
    source: Option<Provenance>,

    /// Names the request asked for, when the chosen properties differ
    requested: Option<Vec<String>>,
}

impl Resolve<'_> {
    /// Settles the referenced key and the foreign key properties, creating the
    /// foreign key if there is none yet.
    pub(super) fn reconcile(
        &mut self,
        fk: Option<ForeignKeyId>,
        principal_end: End,
        split: bool,
    ) -> Result<ForeignKeyId> {
        let principal = self.entity(principal_end);
        let dependent = self.entity(principal_end.other());

        let (principal_key, principal_key_source) = self.principal_key(fk, principal, dependent)?;
        let properties = self.properties(fk, principal_end, principal_key, split)?;

        self.model
            .check_foreign_key(dependent, &properties.ids, principal, principal_key)?;

        let id = match fk {
            Some(id) => {
                let foreign_key = self.model.foreign_key_mut(id);
                foreign_key.properties = properties.ids;
                foreign_key.principal_key = principal_key;
                foreign_key.source = foreign_key.source.max(self.source);
                id
            }
            None => self.model.insert_foreign_key(
                dependent,
                &properties.ids,
                principal,
                principal_key,
                self.source,
            ),
        };

        let source = self.source;
        let foreign_key = self.model.foreign_key_mut(id);

        if let Some(properties_source) = properties.source {
            foreign_key.properties_source = Some(properties_source);
            foreign_key.requested_properties = properties.requested;
        }

        if let Some(principal_key_source) = principal_key_source {
            foreign_key.principal_key_source = Some(principal_key_source);
        }

        if self.request.principal.is_some() {
            foreign_key.principal_end_source =
                Some(Provenance::strongest(foreign_key.principal_end_source, source));
        }

        if let Some(unique) = self.request.unique {
            foreign_key.unique.set(unique, source);
        }

        self.model.carry_foreign_key_requiredness(id)?;
        Ok(id)
    }

    /// Returns the referenced key and, when the request named it, the
    /// provenance to record for it.
    fn principal_key(
        &mut self,
        fk: Option<ForeignKeyId>,
        principal: EntityTypeId,
        dependent: EntityTypeId,
    ) -> Result<(KeyId, Option<Provenance>)> {
        let request = self.request;
        let existing = fk.map(|fk| self.model.foreign_key(fk));

        if let Some(names) = &request.principal_key {
            let overridable = existing.map_or(true, |fk| self.source.overrides(fk.principal_key_source));

            if overridable {
                let properties = self.principal_key_properties(principal, dependent, names)?;
                let key = self.model.add_key(principal, &properties, self.source)?;
                return Ok((key, Some(self.source)));
            }
        }

        if let Some(fk) = existing {
            if fk.principal == principal && self.model.try_key(fk.principal_key).is_ok() {
                return Ok((fk.principal_key, None));
            }
        }

        let entity = self.model.entity_type(principal);
        match entity.primary_key.value() {
            Some(key) => Ok((key, None)),
            None => Err(Error::shape_mismatch(format!(
                "`{}` has no primary key to be referenced by `{}`",
                entity.name,
                self.model.entity_type(dependent).name
            ))),
        }
    }

    /// Resolves requested principal key names. A missing name becomes a shadow
    /// property typed after the foreign key property at the same position.
    fn principal_key_properties(
        &mut self,
        principal: EntityTypeId,
        dependent: EntityTypeId,
        names: &[String],
    ) -> Result<Vec<PropertyId>> {
        let mut properties = vec![];

        for (i, name) in names.iter().enumerate() {
            if let Some(property) = self.model.entity_type(principal).property_by_name(name) {
                properties.push(property.id);
                continue;
            }

            let ty = self
                .request
                .foreign_key
                .as_ref()
                .and_then(|foreign_key| {
                    self.model
                        .entity_type(dependent)
                        .property_by_name(&foreign_key[i])
                })
                .map(|property| property.ty.ty.required())
                .ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "unknown property `{name}` on `{}`",
                        self.model.entity_type(principal).name
                    ))
                })?;

            properties.push(
                self.model
                    .add_shadow_property(principal, name, ty, self.source)?,
            );
        }

        Ok(properties)
    }

    fn properties(
        &mut self,
        fk: Option<ForeignKeyId>,
        principal_end: End,
        principal_key: KeyId,
        split: bool,
    ) -> Result<Properties> {
        let principal = self.entity(principal_end);
        let dependent = self.entity(principal_end.other());
        let request = self.request;

        if let Some(names) = &request.foreign_key {
            let overridable = fk.map_or(true, |fk| {
                self.source
                    .overrides(self.model.foreign_key(fk).properties_source)
            });

            if overridable {
                return self.requested_properties(fk, dependent, principal_key, names);
            }
        }

        if let Some(fk) = fk {
            let current = &self.model.foreign_key(fk).properties;
            if self.model.fits_key(current, principal_key) {
                return Ok(Properties {
                    ids: current.clone(),
                    source: None,
                    requested: None,
                });
            }
        }

        let navigation = self
            .request
            .navigation(principal_end.other())
            .map(str::to_string)
            .or_else(|| {
                let fk = self.model.foreign_key(fk?);
                Some(self.model.navigation(fk.dependent_to_principal?).name.clone())
            });

        let unique = self.request.unique.unwrap_or_else(|| {
            fk.is_some_and(|fk| self.model.foreign_key(fk).is_unique())
        });

        let discovered = if split {
            None
        } else {
            self.model.discover_foreign_key_properties(
                fk,
                dependent,
                principal,
                principal_key,
                navigation.as_deref(),
                unique,
            )
        };

        let ids = match discovered {
            Some(ids) => {
                tracing::debug!(
                    properties = ?self.model.property_names(&ids),
                    "foreign key properties discovered by name"
                );
                ids
            }
            None => self
                .model
                .synthesize_foreign_key_properties(dependent, principal, principal_key)?,
        };

        Ok(Properties {
            ids,
            source: None,
            requested: None,
        })
    }

    /// Uses the requested names verbatim, creating shadow properties for names
    /// that do not exist yet. When the same properties already back another
    /// foreign key to the same key, fresh properties with an ordinal suffix
    /// are created instead.
    fn requested_properties(
        &mut self,
        fk: Option<ForeignKeyId>,
        dependent: EntityTypeId,
        principal_key: KeyId,
        names: &[String],
    ) -> Result<Properties> {
        if let Some(fk) = fk {
            let foreign_key = self.model.foreign_key(fk);
            if foreign_key.requested_properties.as_deref() == Some(names)
                && foreign_key.principal_key == principal_key
                && self.model.fits_key(&foreign_key.properties, principal_key)
            {
                return Ok(Properties {
                    ids: foreign_key.properties.clone(),
                    source: Some(self.source),
                    requested: Some(names.to_vec()),
                });
            }
        }

        let key_properties = self.model.key(principal_key).properties.clone();
        if key_properties.len() != names.len() {
            return Err(Error::shape_mismatch(format!(
                "foreign key {names:?} on `{}` has {} properties but the referenced key {:?} on `{}` has {}",
                self.model.entity_type(dependent).name,
                names.len(),
                self.model.property_names(&key_properties),
                self.model.entity_type(principal_key.entity).name,
                key_properties.len(),
            )));
        }

        let mut ids = vec![];
        for (name, key_property) in names.iter().zip(&key_properties) {
            let entity = self.model.entity_type(dependent);

            if let Some(property) = entity.property_by_name(name) {
                ids.push(property.id);
                continue;
            }

            if entity.navigation_by_name(name).is_some() {
                return Err(Error::invalid_argument(format!(
                    "`{name}` on `{}` is a navigation and cannot be a foreign key property",
                    entity.name
                )));
            }

            let ty = self.model.property(*key_property).ty.as_nullable();
            ids.push(
                self.model
                    .add_shadow_property(dependent, name, ty, self.source)?,
            );
        }

        let taken = self.model.foreign_keys().any(|other| {
            Some(other.id) != fk
                && other.dependent == dependent
                && other.principal_key == principal_key
                && other.properties == ids
        });

        if !taken {
            return Ok(Properties {
                ids,
                source: Some(self.source),
                requested: None,
            });
        }

        let mut split = vec![];
        for (name, key_property) in names.iter().zip(&key_properties) {
            let ty = self.model.property(*key_property).ty.as_nullable();
            let start = self.model.options().split_ordinal_start;
            let entity = self.model.entity_type(dependent);
            let name = with_ordinal(name, start, |name| {
                !entity.is_member_name(name) && !entity.is_ignored(name)
            });

            split.push(
                self.model
                    .add_shadow_property(dependent, &name, ty, Provenance::Convention)?,
            );
        }

        tracing::debug!(
            requested = ?names,
            properties = ?self.model.property_names(&split),
            "requested foreign key properties already back another relationship; renamed"
        );

        Ok(Properties {
            ids: split,
            source: Some(self.source),
            requested: Some(names.to_vec()),
        })
    }
}

impl Model {
    /// Returns `true` if `properties` can reference `key`: same count and
    /// compatible scalar types position by position.
    pub(crate) fn fits_key(&self, properties: &[PropertyId], key: KeyId) -> bool {
        let Ok(key) = self.try_key(key) else {
            return false;
        };

        !properties.is_empty()
            && properties.len() == key.properties.len()
            && properties.iter().zip(&key.properties).all(|(property, key_property)| {
                self.try_property(*property).is_ok_and(|property| {
                    property.ty.is_compatible(self.property(*key_property).ty)
                })
            })
    }

    /// Looks for existing dependent properties that follow a foreign key naming
    /// pattern for `key`. Patterns are tried in order:
    ///
    /// 1. `<navigation><key property>`
    /// 2. `<principal><key property>`
    /// 3. `<principal><key suffix>`, for single-property keys
    /// 4. the dependent's own primary key, when its property names equal the
    ///    key's (composite keys, or one-to-one relationships)
    ///
    /// Properties backing other foreign keys are skipped.
    pub(crate) fn discover_foreign_key_properties(
        &self,
        fk: Option<ForeignKeyId>,
        dependent: EntityTypeId,
        principal: EntityTypeId,
        key: KeyId,
        navigation: Option<&str>,
        unique: bool,
    ) -> Option<Vec<PropertyId>> {
        let key_properties = &self.key(key).properties;
        let key_names = self.property_names(key_properties);
        let principal_name = &self.entity_type(principal).name;
        let dependent_type = self.entity_type(dependent);

        let mut patterns: Vec<Vec<String>> = vec![];

        if let Some(navigation) = navigation {
            patterns.push(key_names.iter().map(|name| format!("{navigation}{name}")).collect());
        }

        patterns.push(
            key_names
                .iter()
                .map(|name| foreign_key_property_name(principal_name, name))
                .collect(),
        );

        if key_names.len() == 1 {
            patterns.push(vec![format!("{principal_name}{}", self.options().key_suffix)]);
        }

        let in_use = |property: PropertyId| {
            dependent_type.foreign_keys.iter().any(|other| {
                Some(*other) != fk && self.foreign_key(*other).properties.contains(&property)
            })
        };

        let usable = |property: PropertyId, key_property: PropertyId| {
            !in_use(property)
                && !(dependent == principal && key_properties.contains(&property))
                && self.property(property).ty.is_compatible(self.property(key_property).ty)
        };

        for pattern in patterns {
            let found: Option<Vec<PropertyId>> = pattern
                .iter()
                .zip(key_properties)
                .map(|(name, key_property)| {
                    let property = dependent_type.property_by_name(name)?;
                    usable(property.id, *key_property).then_some(property.id)
                })
                .collect();

            if found.is_some() {
                return found;
            }
        }

        if dependent == principal || (key_names.len() == 1 && !unique) {
            return None;
        }

        let primary_key = dependent_type.primary_key()?;
        if self.property_names(&primary_key.properties) != key_names {
            return None;
        }

        primary_key
            .properties
            .iter()
            .zip(key_properties)
            .all(|(property, key_property)| usable(*property, *key_property))
            .then(|| primary_key.properties.clone())
    }

    /// Creates shadow foreign key properties named after the principal and its
    /// key, typed as the nullable form of the key property types.
    pub(crate) fn synthesize_foreign_key_properties(
        &mut self,
        dependent: EntityTypeId,
        principal: EntityTypeId,
        key: KeyId,
    ) -> Result<Vec<PropertyId>> {
        let key_properties = self.key(key).properties.clone();
        let principal_name = self.entity_type(principal).name.clone();
        let start = self.options().split_ordinal_start;

        let mut properties = vec![];
        for key_property in key_properties {
            let key_property = self.property(key_property);
            let ty = key_property.ty.as_nullable();
            let base = foreign_key_property_name(&principal_name, &key_property.name);

            let entity = self.entity_type(dependent);
            let is_free = |name: &str| !entity.is_member_name(name) && !entity.is_ignored(name);
            let name = if is_free(&base) {
                base
            } else {
                with_ordinal(&base, start, is_free)
            };

            let property = self.add_shadow_property(dependent, &name, ty, Provenance::Convention)?;
            properties.push(property);
        }

        tracing::debug!(
            dependent = %self.entity_type(dependent).name,
            properties = ?self.property_names(&properties),
            "shadow foreign key properties synthesized"
        );
        Ok(properties)
    }

    /// Points foreign keys that reference `previous` by default at `key`,
    /// rebuilding properties that no longer fit.
    pub(crate) fn retarget_foreign_keys(&mut self, previous: KeyId, key: KeyId) -> Result<()> {
        let affected: Vec<ForeignKeyId> = self
            .foreign_keys()
            .filter(|fk| {
                fk.principal_key == previous
                    && !fk.principal_key_source.is_some_and(Provenance::is_explicit)
            })
            .map(|fk| fk.id)
            .collect();

        for id in affected {
            self.foreign_key_mut(id).principal_key = key;

            let fk = self.foreign_key(id);
            if self.fits_key(&fk.properties, key) {
                continue;
            }

            if fk.properties_source.is_some_and(Provenance::is_explicit) {
                return Err(Error::shape_mismatch(format!(
                    "foreign key {:?} on `{}` no longer matches the primary key {:?} of `{}`",
                    self.property_names(&fk.properties),
                    self.entity_type(fk.dependent).name,
                    self.property_names(&self.key(key).properties),
                    self.entity_type(fk.principal).name,
                )));
            }

            self.rebuild_foreign_key_properties(id)?;
        }

        Ok(())
    }

    /// Re-runs discovery for a foreign key whose properties were not chosen
    /// explicitly. Returns `true` if the properties changed.
    pub(crate) fn rediscover_foreign_key_properties(&mut self, id: ForeignKeyId) -> Result<bool> {
        let fk = self.foreign_key(id);
        if fk.properties_source.is_some() {
            return Ok(false);
        }

        let navigation = fk
            .dependent_to_principal
            .map(|navigation| self.navigation(navigation).name.as_str());

        let Some(discovered) = self.discover_foreign_key_properties(
            Some(id),
            fk.dependent,
            fk.principal,
            fk.principal_key,
            navigation,
            fk.is_unique(),
        ) else {
            return Ok(false);
        };

        if discovered == fk.properties {
            return Ok(false);
        }

        if !self.accepts_foreign_key_requiredness(id, &discovered) {
            tracing::debug!(
                dependent = %self.entity_type(fk.dependent).name,
                properties = ?self.property_names(&discovered),
                "discovered properties conflict with the configured requiredness; not rebinding"
            );
            return Ok(false);
        }

        let dependent = fk.dependent;
        tracing::debug!(
            dependent = %self.entity_type(dependent).name,
            properties = ?self.property_names(&discovered),
            "foreign key rebound to discovered properties"
        );

        self.foreign_key_mut(id).properties = discovered;
        self.carry_foreign_key_requiredness(id)?;
        self.refresh_foreign_key(id);
        self.remove_unused_shadow_properties(dependent);
        Ok(true)
    }

    fn rebuild_foreign_key_properties(&mut self, id: ForeignKeyId) -> Result<()> {
        let fk = self.foreign_key(id);
        let (dependent, principal, key) = (fk.dependent, fk.principal, fk.principal_key);

        let navigation = fk
            .dependent_to_principal
            .map(|navigation| self.navigation(navigation).name.as_str());

        let properties = match self.discover_foreign_key_properties(
            Some(id),
            dependent,
            principal,
            key,
            navigation,
            fk.is_unique(),
        ) {
            Some(properties) => properties,
            None => {
                self.foreign_key_mut(id).properties.clear();
                self.remove_unused_shadow_properties(dependent);
                self.synthesize_foreign_key_properties(dependent, principal, key)?
            }
        };

        self.foreign_key_mut(id).properties = properties;
        self.carry_foreign_key_requiredness(id)?;
        self.refresh_foreign_key(id);
        self.remove_unused_shadow_properties(dependent);
        Ok(())
    }
}
