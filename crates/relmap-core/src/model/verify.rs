use super::{EntityType, ForeignKey, Model};
use crate::{Error, Result};

use std::collections::HashSet;

struct Verify<'a> {
    model: &'a Model,
}

impl Model {
    /// Checks that the finished model is complete and consistent.
    pub fn validate(&self) -> Result<()> {
        Verify { model: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        debug_assert!(self.verify_links_are_mutual());

        for entity in self.model.entity_types() {
            self.verify_member_names_are_unique(entity)?;
            self.verify_has_primary_key(entity)?;
            self.verify_keys(entity)?;
        }

        for fk in self.model.foreign_keys() {
            self.verify_foreign_key(fk)?;
            self.verify_navigations(fk)?;
        }

        Ok(())
    }

    /// Every handle stored in the graph refers to a live element.
    fn verify_links_are_mutual(&self) -> bool {
        for entity in self.model.entity_types() {
            for fk in &entity.foreign_keys {
                assert_eq!(self.model.foreign_key(*fk).dependent, entity.id);
            }

            for navigation in entity.navigations() {
                let fk = self.model.foreign_key(navigation.foreign_key);
                let slot = if navigation.points_to_principal {
                    fk.dependent_to_principal
                } else {
                    fk.principal_to_dependent
                };
                assert_eq!(slot, Some(navigation.id));
            }
        }

        for fk in self.model.foreign_keys() {
            assert!(self
                .model
                .entity_type(fk.dependent)
                .foreign_keys
                .contains(&fk.id));
            self.model.key(fk.principal_key);
        }

        true
    }

    fn verify_member_names_are_unique(&self, entity: &EntityType) -> Result<()> {
        let mut names = HashSet::new();

        let members = entity
            .properties()
            .map(|property| &property.name)
            .chain(entity.navigations().map(|navigation| &navigation.name));

        for name in members {
            if !names.insert(name) {
                return Err(Error::invalid_model(format!(
                    "`{}` declares member `{name}` more than once",
                    entity.name
                )));
            }
        }

        Ok(())
    }

    fn verify_has_primary_key(&self, entity: &EntityType) -> Result<()> {
        if entity.primary_key().is_none() {
            return Err(Error::invalid_model(format!(
                "`{}` has no primary key",
                entity.name
            )));
        }

        Ok(())
    }

    fn verify_keys(&self, entity: &EntityType) -> Result<()> {
        for key in entity.keys() {
            for property in &key.properties {
                if property.entity != entity.id || self.model.try_property(*property).is_err() {
                    return Err(Error::invalid_model(format!(
                        "a key on `{}` includes {property:?}, which is not one of its properties",
                        entity.name
                    )));
                }

                let property = self.model.property(*property);
                if property.is_nullable() {
                    return Err(Error::invalid_model(format!(
                        "key property `{}` on `{}` is nullable",
                        property.name, entity.name
                    )));
                }
            }
        }

        Ok(())
    }

    fn verify_foreign_key(&self, fk: &ForeignKey) -> Result<()> {
        self.model
            .check_foreign_key(fk.dependent, &fk.properties, fk.principal, fk.principal_key)
            .map_err(|err| {
                err.context(Error::invalid_model(format!(
                    "foreign key from `{}` to `{}` is inconsistent",
                    self.model.entity_type(fk.dependent).name,
                    self.model.entity_type(fk.principal).name
                )))
            })?;

        let required = !fk
            .properties
            .iter()
            .any(|property| self.model.property(*property).is_nullable());

        if fk.is_required() != required {
            return Err(Error::invalid_model(format!(
                "requiredness of foreign key {:?} on `{}` does not match its properties",
                self.model.property_names(&fk.properties),
                self.model.entity_type(fk.dependent).name
            )));
        }

        Ok(())
    }

    fn verify_navigations(&self, fk: &ForeignKey) -> Result<()> {
        let slots = [
            (fk.dependent_to_principal, true, fk.dependent),
            (fk.principal_to_dependent, false, fk.principal),
        ];

        for (slot, points_to_principal, owner) in slots {
            let Some(id) = slot else { continue };

            let navigation = self.model.try_navigation(id).map_err(|err| {
                err.context(Error::invalid_model(format!(
                    "foreign key from `{}` to `{}` refers to a missing navigation",
                    self.model.entity_type(fk.dependent).name,
                    self.model.entity_type(fk.principal).name
                )))
            })?;

            if navigation.foreign_key != fk.id
                || navigation.points_to_principal != points_to_principal
                || id.entity != owner
            {
                return Err(Error::invalid_model(format!(
                    "navigation `{}` on `{}` is not linked back to its foreign key",
                    navigation.name,
                    self.model.entity_type(id.entity).name
                )));
            }
        }

        Ok(())
    }
}
