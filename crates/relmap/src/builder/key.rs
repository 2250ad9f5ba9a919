use crate::Result;
use relmap_core::model::KeyId;
use relmap_core::Builder;

/// Configures one key.
#[derive(Debug)]
pub struct KeyBuilder<'a> {
    builder: &'a mut Builder,
    id: KeyId,
}

impl<'a> KeyBuilder<'a> {
    pub(crate) fn new(builder: &'a mut Builder, id: KeyId) -> Self {
        Self { builder, id }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn annotation(&mut self, key: &str, value: impl Into<String>) -> Result<&mut Self> {
        self.builder.set_annotation(self.id, key, value)?;
        Ok(self)
    }
}
