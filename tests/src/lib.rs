#[macro_use]
mod macros;

pub mod fixtures;
pub mod prelude;

use relmap::model::{EntityTypeId, PropertyId};
use relmap::Model;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber filtered by `RUST_LOG`. Safe to call
/// from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Names of `properties`, in order.
pub fn names(model: &Model, properties: &[PropertyId]) -> Vec<String> {
    properties
        .iter()
        .map(|property| model.property(*property).name().to_string())
        .collect()
}

/// Looks up an entity type that the test expects to exist.
#[track_caller]
pub fn entity(model: &Model, name: &str) -> EntityTypeId {
    model
        .find_entity_type(name)
        .unwrap_or_else(|| panic!("no entity type named `{name}`"))
        .id()
}
