use super::{End, Resolve};
use crate::model::{ForeignKey, ForeignKeyId, NavigationId};

/// Outcome of searching the dependent's foreign keys.
pub(super) struct Candidate {
    /// Foreign key to reuse
    pub(super) fk: Option<ForeignKeyId>,

    /// True when an eligible foreign key was left alone because its
    /// uniqueness was set explicitly to something else
    pub(super) split: bool,
}

impl Resolve<'_> {
    /// Finds an existing foreign key from the dependent to the principal that
    /// can carry the request.
    ///
    /// Foreign keys whose uniqueness agrees with the request win. A foreign key
    /// whose uniqueness was only derived is reused and updated. When the only
    /// eligible foreign keys have explicitly different uniqueness, none is
    /// reused and the caller builds a new one beside them.
    pub(super) fn find_candidate(&self, principal_end: End) -> Candidate {
        let principal = self.entity(principal_end);
        let dependent = self.entity(principal_end.other());

        let eligible: Vec<&ForeignKey> = self
            .model
            .entity_type(dependent)
            .foreign_key_ids()
            .iter()
            .map(|id| self.model.foreign_key(*id))
            .filter(|fk| fk.principal == principal && self.is_eligible(fk, principal_end))
            .collect();

        let agrees = |fk: &ForeignKey| {
            self.request
                .unique
                .map_or(true, |unique| fk.is_unique() == unique)
        };

        if let Some(fk) = eligible.iter().find(|fk| agrees(fk)) {
            tracing::debug!(fk = ?fk.id, "reusing foreign key");
            return Candidate {
                fk: Some(fk.id),
                split: false,
            };
        }

        if let Some(fk) = eligible.iter().find(|fk| !fk.unique.is_explicit()) {
            tracing::debug!(fk = ?fk.id, "reusing foreign key with derived uniqueness");
            return Candidate {
                fk: Some(fk.id),
                split: false,
            };
        }

        if let Some(fk) = eligible.first() {
            tracing::debug!(
                existing = ?fk.id,
                unique = fk.is_unique(),
                "uniqueness conflicts with an existing foreign key; splitting"
            );
            return Candidate {
                fk: None,
                split: true,
            };
        }

        Candidate {
            fk: None,
            split: false,
        }
    }

    /// Structural eligibility: navigation slots, foreign key properties, and
    /// referenced key must not contradict the request.
    fn is_eligible(&self, fk: &ForeignKey, principal_end: End) -> bool {
        let slot_fits = |slot: Option<NavigationId>, name: Option<&str>| match (slot, name) {
            (Some(navigation), Some(name)) => self.model.navigation(navigation).name == name,
            _ => true,
        };

        if !slot_fits(
            fk.dependent_to_principal,
            self.request.navigation(principal_end.other()),
        ) || !slot_fits(
            fk.principal_to_dependent,
            self.request.navigation(principal_end),
        ) {
            return false;
        }

        if let Some(names) = &self.request.foreign_key {
            let matches = self.model.property_names(&fk.properties) == *names
                || fk.requested_properties.as_ref() == Some(names);

            if !matches && fk.properties_source.is_some_and(|source| source.is_explicit()) {
                return false;
            }
        }

        if let Some(names) = &self.request.principal_key {
            let key = self.model.key(fk.principal_key);
            let matches = self.model.property_names(&key.properties) == *names;

            if !matches && fk.principal_key_source.is_some_and(|source| source.is_explicit()) {
                return false;
            }
        }

        true
    }
}
