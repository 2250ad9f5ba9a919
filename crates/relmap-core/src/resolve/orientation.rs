use super::{End, Resolve};
use crate::model::{ForeignKeyId, MemberKind, NavigationId};
use crate::{Error, Provenance, Result};

impl Resolve<'_> {
    /// Principal end the request itself asks for: the explicit principal, or
    /// the end that does not hold the requested foreign key properties.
    fn requested_principal_end(&self) -> Result<Option<End>> {
        if let Some(end) = self.request.principal {
            return Ok(Some(end));
        }

        let Some(names) = &self.request.foreign_key else {
            return Ok(None);
        };

        if self.is_self_referencing() {
            return Ok(None);
        }

        let has_all = |end: End| {
            let entity = self.model.entity_type(self.entity(end));
            names
                .iter()
                .all(|name| entity.property_by_name(name).is_some())
        };

        match (has_all(End::A), has_all(End::B)) {
            (true, false) => Ok(Some(End::B)),
            (false, true) => Ok(Some(End::A)),
            (true, true) if self.request.unique == Some(true) => Err(Error::ambiguous(format!(
                "both `{}` and `{}` declare {names:?}; configure which end is the principal",
                self.request.a, self.request.b
            ))),
            _ => Ok(None),
        }
    }

    /// Picks the principal end for a relationship that has no foreign key yet.
    pub(super) fn infer_principal_end(&self) -> Result<End> {
        if let Some(end) = self.requested_principal_end()? {
            return Ok(end);
        }

        if let Some(end) = self.principal_end_from_shapes() {
            return Ok(end);
        }

        Ok(End::B)
    }

    /// A collection member marks its owner as principal. A lone reference
    /// marks its owner as dependent.
    fn principal_end_from_shapes(&self) -> Option<End> {
        let kind = |end: End| {
            let name = self.request.navigation(end)?;
            let shape = self.model.entity_type(self.entity(end)).shape()?;
            shape.member(name).map(|member| member.kind.clone())
        };

        match (kind(End::A), kind(End::B)) {
            (Some(MemberKind::Collection(_)), Some(MemberKind::Collection(_))) => None,
            (Some(MemberKind::Collection(_)), _) => Some(End::A),
            (_, Some(MemberKind::Collection(_))) => Some(End::B),
            (Some(MemberKind::Reference(_)), None) => Some(End::B),
            (None, Some(MemberKind::Reference(_))) => Some(End::A),
            _ => None,
        }
    }

    /// Principal end of an existing foreign key, in terms of the request.
    fn current_principal_end(&self, fk: ForeignKeyId) -> End {
        let foreign_key = self.model.foreign_key(fk);

        if !self.is_self_referencing() {
            return if foreign_key.principal == self.b {
                End::B
            } else {
                End::A
            };
        }

        for end in [End::A, End::B] {
            let Some(name) = self.request.navigation(end) else {
                continue;
            };

            let found = foreign_key
                .navigations()
                .map(|id| self.model.navigation(id))
                .find(|navigation| navigation.name == name);

            if let Some(navigation) = found {
                return if navigation.points_to_principal {
                    end.other()
                } else {
                    end
                };
            }
        }

        End::B
    }

    /// Orients an existing foreign key for the request, swapping principal and
    /// dependent in place when an explicit request requires it.
    pub(super) fn orient_existing(&mut self, fk: ForeignKeyId) -> Result<End> {
        let current = self.current_principal_end(fk);

        if !self.source.is_explicit() {
            return Ok(current);
        }

        let desired = match self.requested_principal_end()? {
            Some(desired) if desired != current => desired,
            _ => return Ok(current),
        };

        if let Some(blocking) = self.blocking_navigation(fk) {
            let navigation = self.model.navigation(blocking);
            return Err(Error::invariant_violation(format!(
                "cannot make `{}` the principal of its relationship with `{}`; \
                 navigation `{}` on `{}` was configured explicitly",
                self.request.entity(desired),
                self.request.entity(desired.other()),
                navigation.name,
                self.model.entity_type(blocking.entity).name,
            )));
        }

        self.flip(fk)?;
        Ok(desired)
    }

    /// An explicit navigation on `fk` the request does not mention. Swapping
    /// principal and dependent would change what it points at.
    fn blocking_navigation(&self, fk: ForeignKeyId) -> Option<NavigationId> {
        let requested = [self.request.navigation(End::A), self.request.navigation(End::B)];

        self.model.foreign_key(fk).navigations().find(|id| {
            let navigation = self.model.navigation(*id);
            navigation.source.is_explicit() && !requested.contains(&Some(navigation.name.as_str()))
        })
    }

    /// Swaps principal and dependent of `fk`, keeping its handle. Navigations
    /// stay on their entity types and change direction. The properties and
    /// referenced key are rebuilt during reconciliation.
    fn flip(&mut self, fk: ForeignKeyId) -> Result<()> {
        let foreign_key = self.model.foreign_key(fk);
        let old_dependent = foreign_key.dependent;
        let old_principal = foreign_key.principal;
        let self_referencing = old_dependent == old_principal;

        let principal_key = if self_referencing {
            foreign_key.principal_key
        } else {
            self.model
                .entity_type(old_dependent)
                .primary_key
                .value()
                .ok_or_else(|| {
                    Error::shape_mismatch(format!(
                        "`{}` has no primary key to be referenced",
                        self.model.entity_type(old_dependent).name
                    ))
                })?
        };

        let foreign_key = self.model.foreign_key_mut(fk);
        foreign_key.dependent = old_principal;
        foreign_key.principal = old_dependent;
        std::mem::swap(
            &mut foreign_key.dependent_to_principal,
            &mut foreign_key.principal_to_dependent,
        );
        foreign_key.principal_end_source = Some(Provenance::strongest(
            foreign_key.principal_end_source,
            self.source,
        ));

        if !self_referencing {
            foreign_key.properties.clear();
            foreign_key.principal_key = principal_key;
            foreign_key.properties_source = None;
            foreign_key.principal_key_source = None;
            foreign_key.requested_properties = None;
        }

        let navigations: Vec<_> = foreign_key.navigations().collect();
        for navigation in navigations {
            let navigation = self.model.navigation_mut(navigation);
            navigation.points_to_principal = !navigation.points_to_principal;
        }

        if !self_referencing {
            self.model
                .entity_type_mut(old_dependent)
                .foreign_keys
                .retain(|other| *other != fk);
            self.model
                .entity_type_mut(old_principal)
                .foreign_keys
                .push(fk);
        }

        tracing::debug!(
            principal = %self.model.entity_type(old_dependent).name,
            dependent = %self.model.entity_type(old_principal).name,
            "relationship orientation flipped"
        );
        Ok(())
    }
}
