use crate::{DeleteBehavior, End, Error, Provenance, Relate, Result};
use relmap_core::model::ForeignKeyId;
use relmap_core::Builder;

/// Configures one relationship.
///
/// Settings that change how the relationship is resolved (foreign key
/// properties, principal key, principal end) re-run the resolver with the
/// extended request, which settles on the same foreign key.
#[derive(Debug)]
pub struct ForeignKeyBuilder<'a> {
    builder: &'a mut Builder,
    id: ForeignKeyId,
    request: Relate,
}

impl<'a> ForeignKeyBuilder<'a> {
    pub(crate) fn relate(builder: &'a mut Builder, request: Relate) -> Result<Self> {
        let id = builder.relate(&request, Provenance::Explicit)?;
        Ok(Self {
            builder,
            id,
            request,
        })
    }

    pub fn id(&self) -> ForeignKeyId {
        self.id
    }

    /// Uses the named dependent properties, in order.
    pub fn foreign_key(&mut self, properties: &[&str]) -> Result<&mut Self> {
        self.request.foreign_key = Some(to_strings(properties));
        self.resolve()
    }

    /// References the principal's key over the named properties instead of
    /// its primary key.
    pub fn principal_key(&mut self, properties: &[&str]) -> Result<&mut Self> {
        self.request.principal_key = Some(to_strings(properties));
        self.resolve()
    }

    /// Makes `entity` the principal end.
    pub fn principal(&mut self, entity: &str) -> Result<&mut Self> {
        let end = if self.request.a == self.request.b {
            return Err(Error::invalid_argument(format!(
                "`{entity}` is on both ends; the principal of a self reference follows its navigations"
            )));
        } else if self.request.a == entity {
            End::A
        } else if self.request.b == entity {
            End::B
        } else {
            return Err(Error::invalid_argument(format!(
                "`{entity}` is not part of the relationship between `{}` and `{}`",
                self.request.a, self.request.b
            )));
        };

        self.request.principal = Some(end);
        self.resolve()
    }

    pub fn required(&mut self, required: bool) -> Result<&mut Self> {
        self.builder
            .set_foreign_key_required(self.id, required, Provenance::Explicit)?;
        Ok(self)
    }

    pub fn unique(&mut self, unique: bool) -> Result<&mut Self> {
        self.builder
            .set_foreign_key_unique(self.id, unique, Provenance::Explicit)?;
        self.request.unique = Some(unique);
        Ok(self)
    }

    pub fn on_delete(&mut self, delete_behavior: DeleteBehavior) -> Result<&mut Self> {
        self.builder
            .set_delete_behavior(self.id, delete_behavior, Provenance::Explicit)?;
        Ok(self)
    }

    pub fn annotation(&mut self, key: &str, value: impl Into<String>) -> Result<&mut Self> {
        self.builder.set_annotation(self.id, key, value)?;
        Ok(self)
    }

    fn resolve(&mut self) -> Result<&mut Self> {
        self.id = self.builder.relate(&self.request, Provenance::Explicit)?;
        Ok(self)
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
