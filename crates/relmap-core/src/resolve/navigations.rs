use super::{End, Resolve};
use crate::model::{ForeignKeyId, NavigationId};
use crate::{Error, Provenance, Result};

impl Resolve<'_> {
    /// Adopts the foreign key of navigations that already carry the requested
    /// names.
    pub(super) fn match_navigations(&mut self) -> Result<Option<ForeignKeyId>> {
        let on_a = self.existing_navigation(End::A);
        let on_b = self.existing_navigation(End::B);

        match (on_a, on_b) {
            (Some(on_a), Some(on_b))
                if self.model.navigation(on_a).foreign_key
                    != self.model.navigation(on_b).foreign_key =>
            {
                self.merge(on_a, on_b).map(Some)
            }
            (Some(navigation), _) | (None, Some(navigation)) => {
                let fk = self.model.navigation(navigation).foreign_key;
                tracing::debug!(
                    navigation = %self.model.navigation(navigation).name,
                    "relationship matched by existing navigation"
                );
                Ok(Some(fk))
            }
            (None, None) => Ok(None),
        }
    }

    fn existing_navigation(&self, end: End) -> Option<NavigationId> {
        let name = self.request.navigation(end)?;
        self.model
            .entity_type(self.entity(end))
            .navigation_by_name(name)
            .map(|navigation| navigation.id)
    }

    /// The requested navigations live on two different foreign keys. Keeps the
    /// stronger foreign key and moves the other navigation off the weaker one.
    fn merge(&mut self, on_a: NavigationId, on_b: NavigationId) -> Result<ForeignKeyId> {
        let fk_a = self.model.foreign_key(self.model.navigation(on_a).foreign_key);
        let fk_b = self.model.foreign_key(self.model.navigation(on_b).foreign_key);

        let explicit_properties = |source: Option<Provenance>| source.is_some_and(Provenance::is_explicit);

        if explicit_properties(fk_a.properties_source) && explicit_properties(fk_b.properties_source) {
            return Err(Error::ambiguous(format!(
                "navigations `{}` on `{}` and `{}` on `{}` belong to different relationships \
                 with explicitly configured foreign keys",
                self.model.navigation(on_a).name,
                self.request.a,
                self.model.navigation(on_b).name,
                self.request.b,
            )));
        }

        let rank_a = (fk_a.source, explicit_properties(fk_a.properties_source));
        let rank_b = (fk_b.source, explicit_properties(fk_b.properties_source));

        let (winner, loser_navigation) = if rank_b > rank_a {
            (fk_b.id, on_a)
        } else {
            (fk_a.id, on_b)
        };

        let loser = self.model.navigation(loser_navigation);
        if !self.source.overrides(Some(loser.source)) {
            return Err(Error::invariant_violation(format!(
                "navigation `{}` on `{}` was configured explicitly for another relationship",
                loser.name,
                self.model.entity_type(loser_navigation.entity).name
            )));
        }

        let loser_fk = loser.foreign_key;
        tracing::debug!(
            navigation = %loser.name,
            entity = %self.model.entity_type(loser_navigation.entity).name,
            "merging navigation into the matching relationship"
        );

        self.model.remove_navigation(loser_navigation)?;
        self.model.remove_foreign_key_if_abandoned(loser_fk);
        Ok(winner)
    }

    /// Creates or reuses the requested navigations on `fk`. An absent name
    /// leaves that side alone.
    pub(super) fn attach_navigations(&mut self, fk: ForeignKeyId, principal_end: End) -> Result<()> {
        let sides = [(principal_end.other(), true), (principal_end, false)];

        for (end, points_to_principal) in sides {
            let Some(name) = self.request.navigation(end) else {
                continue;
            };

            let foreign_key = self.model.foreign_key(fk);
            let slot = if points_to_principal {
                foreign_key.dependent_to_principal
            } else {
                foreign_key.principal_to_dependent
            };

            match slot {
                Some(existing) if self.model.navigation(existing).name == name => {
                    let navigation = self.model.navigation_mut(existing);
                    navigation.source = navigation.source.max(self.source);
                }
                Some(existing) => {
                    let navigation = self.model.navigation(existing);
                    if !self.source.overrides(Some(navigation.source)) {
                        return Err(Error::invariant_violation(format!(
                            "relationship already has navigation `{}` on `{}`, configured explicitly",
                            navigation.name,
                            self.model.entity_type(existing.entity).name
                        )));
                    }

                    tracing::debug!(
                        replaced = %navigation.name,
                        navigation = name,
                        "replacing navigation"
                    );
                    self.model.remove_navigation(existing)?;
                    self.model
                        .add_navigation(name, fk, points_to_principal, self.source)?;
                }
                None => {
                    self.model
                        .add_navigation(name, fk, points_to_principal, self.source)?;
                }
            }
        }

        Ok(())
    }
}
