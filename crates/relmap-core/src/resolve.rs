//! Relationship resolution.
//!
//! A [`Relate`] request names two entity types and, optionally, navigation
//! names, foreign key property names, referenced key property names,
//! uniqueness, and which end is the principal. [`Model::relate`] finds the
//! foreign key that satisfies the request, reusing what already exists where
//! possible, and builds whatever is missing.
//!
//! Resolution runs in phases:
//!
//! 1. Navigations with the requested names that already exist adopt their
//!    foreign key. Two navigations on two different foreign keys are merged.
//! 2. Otherwise, the dependent's foreign keys to the principal are searched
//!    for one whose uniqueness agrees with the request.
//! 3. A structurally eligible foreign key with explicitly different
//!    uniqueness is left alone and a new foreign key is created beside it.
//! 4. The referenced key and the foreign key properties are reconciled.
//! 5. An explicit request may swap principal and dependent of an existing
//!    foreign key in place.
//! 6. Requested navigations are attached.
//! 7. Requiredness and delete behavior are derived from nullability.

mod candidate;
mod naming;
pub(crate) use naming::{foreign_key_property_name, with_ordinal};

mod navigations;
mod orientation;
mod reconcile;

use crate::model::{EntityTypeId, ForeignKeyId, Model};
use crate::{Error, Provenance, Result};

/// One end of a [`Relate`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum End {
    A,
    B,
}

/// A request to relate two entity types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relate {
    /// Entity type name on end A
    pub a: String,

    /// Entity type name on end B
    pub b: String,

    /// Navigation on `a` leading to `b`
    pub navigation_on_a: Option<String>,

    /// Navigation on `b` leading to `a`
    pub navigation_on_b: Option<String>,

    /// Foreign key property names on the dependent, in order
    pub foreign_key: Option<Vec<String>>,

    /// Referenced key property names on the principal, in order
    pub principal_key: Option<Vec<String>>,

    /// `Some(true)` for one-to-one, `Some(false)` for one-to-many
    pub unique: Option<bool>,

    /// Which end is the principal
    pub principal: Option<End>,
}

impl End {
    pub fn other(self) -> End {
        match self {
            End::A => End::B,
            End::B => End::A,
        }
    }
}

impl Relate {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            navigation_on_a: None,
            navigation_on_b: None,
            foreign_key: None,
            principal_key: None,
            unique: None,
            principal: None,
        }
    }

    /// A request with a known principal on end A and dependent on end B.
    pub fn between(principal: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self::new(principal, dependent).principal(End::A)
    }

    pub fn navigation_on_a(mut self, name: impl Into<String>) -> Self {
        self.navigation_on_a = Some(name.into());
        self
    }

    pub fn navigation_on_b(mut self, name: impl Into<String>) -> Self {
        self.navigation_on_b = Some(name.into());
        self
    }

    pub fn foreign_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreign_key = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn principal_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principal_key = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    pub fn principal(mut self, end: End) -> Self {
        self.principal = Some(end);
        self
    }

    /// Entity type name on `end`.
    pub fn entity(&self, end: End) -> &str {
        match end {
            End::A => &self.a,
            End::B => &self.b,
        }
    }

    /// Navigation name requested on `end`.
    pub fn navigation(&self, end: End) -> Option<&str> {
        match end {
            End::A => self.navigation_on_a.as_deref(),
            End::B => self.navigation_on_b.as_deref(),
        }
    }
}

impl Model {
    /// Finds or builds the foreign key satisfying `request`.
    ///
    /// Repeating a request on an unchanged model returns the same foreign key
    /// and leaves the model as it is. On failure the model is left exactly as
    /// it was before the call.
    pub fn relate(&mut self, request: &Relate, source: Provenance) -> Result<ForeignKeyId> {
        self.atomically(|model| Resolve::new(model, request, source)?.resolve())
    }
}

/// State of a single [`Model::relate`] call.
struct Resolve<'a> {
    model: &'a mut Model,
    request: &'a Relate,
    source: Provenance,
    a: EntityTypeId,
    b: EntityTypeId,
}

impl<'a> Resolve<'a> {
    fn new(model: &'a mut Model, request: &'a Relate, source: Provenance) -> Result<Self> {
        let a = model.entity_type_id(&request.a)?;
        let b = model.entity_type_id(&request.b)?;

        Ok(Self {
            model,
            request,
            source,
            a,
            b,
        })
    }

    fn resolve(mut self) -> Result<ForeignKeyId> {
        self.validate()?;
        self.clear_misdirected_navigations()?;

        let (fk, principal_end, split) = match self.match_navigations()? {
            Some(fk) => {
                let end = self.orient_existing(fk)?;
                (Some(fk), end, false)
            }
            None => {
                let end = self.infer_principal_end()?;
                let candidate = self.find_candidate(end);
                (candidate.fk, end, candidate.split)
            }
        };

        let fk = self.reconcile(fk, principal_end, split)?;
        self.attach_navigations(fk, principal_end)?;
        Ok(self.finish(fk))
    }

    /// Argument checks that run before anything is mutated.
    fn validate(&self) -> Result<()> {
        for end in [End::A, End::B] {
            let Some(name) = self.request.navigation(end) else {
                continue;
            };

            let entity = self.model.entity_type(self.entity(end));

            if name.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "navigation name on `{}` must not be empty",
                    entity.name
                )));
            }

            if entity.property_by_name(name).is_some() {
                return Err(Error::invalid_argument(format!(
                    "`{name}` on `{}` is a property and cannot be used as a navigation",
                    entity.name
                )));
            }
        }

        if self.is_self_referencing()
            && self.request.navigation_on_a.is_some()
            && self.request.navigation_on_a == self.request.navigation_on_b
        {
            return Err(Error::invalid_argument(format!(
                "both ends of a relationship on `{}` are named `{}`",
                self.request.a,
                self.request.navigation_on_a.as_deref().unwrap_or_default()
            )));
        }

        check_names("foreign key", self.request.foreign_key.as_deref())?;
        check_names("principal key", self.request.principal_key.as_deref())?;

        if let (Some(foreign_key), Some(principal_key)) =
            (&self.request.foreign_key, &self.request.principal_key)
        {
            if foreign_key.len() != principal_key.len() {
                return Err(Error::shape_mismatch(format!(
                    "foreign key {foreign_key:?} has {} properties but principal key {principal_key:?} has {}",
                    foreign_key.len(),
                    principal_key.len()
                )));
            }
        }

        Ok(())
    }

    /// Removes requested-name navigations that lead to an unrelated entity
    /// type, or fails if they cannot be overridden.
    fn clear_misdirected_navigations(&mut self) -> Result<()> {
        for end in [End::A, End::B] {
            let Some(name) = self.request.navigation(end) else {
                continue;
            };

            let target = self.entity(end.other());
            let entity = self.model.entity_type(self.entity(end));
            let Some(navigation) = entity.navigation_by_name(name) else {
                continue;
            };

            if navigation.target(self.model) == target {
                continue;
            }

            if !self.source.overrides(Some(navigation.source)) {
                return Err(Error::invalid_argument(format!(
                    "navigation `{name}` on `{}` already leads to `{}`",
                    entity.name,
                    self.model.entity_type(navigation.target(self.model)).name
                )));
            }

            let id = navigation.id;
            let fk = navigation.foreign_key;
            self.model.remove_navigation(id)?;
            self.model.remove_foreign_key_if_abandoned(fk);
        }

        Ok(())
    }

    fn finish(self, fk: ForeignKeyId) -> ForeignKeyId {
        self.model.refresh_foreign_key(fk);
        self.model.remove_unused_shadow_properties(self.a);
        if self.b != self.a {
            self.model.remove_unused_shadow_properties(self.b);
        }

        let foreign_key = self.model.foreign_key(fk);
        tracing::debug!(
            dependent = %self.model.entity_type(foreign_key.dependent).name,
            principal = %self.model.entity_type(foreign_key.principal).name,
            properties = ?self.model.property_names(&foreign_key.properties),
            unique = foreign_key.is_unique(),
            required = foreign_key.is_required(),
            source = %self.source,
            "relationship resolved"
        );
        fk
    }

    fn entity(&self, end: End) -> EntityTypeId {
        match end {
            End::A => self.a,
            End::B => self.b,
        }
    }

    fn is_self_referencing(&self) -> bool {
        self.a == self.b
    }
}

fn check_names(what: &str, names: Option<&[String]>) -> Result<()> {
    let Some(names) = names else {
        return Ok(());
    };

    if names.is_empty() {
        return Err(Error::invalid_argument(format!(
            "{what} needs at least one property"
        )));
    }

    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{what} property name must not be empty"
            )));
        }

        if names[..i].contains(name) {
            return Err(Error::invalid_argument(format!(
                "`{name}` appears more than once in {what} {names:?}"
            )));
        }
    }

    Ok(())
}
