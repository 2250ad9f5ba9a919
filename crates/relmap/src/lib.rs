mod builder;
pub use builder::{
    CollectionBuilder, EntityBuilder, ForeignKeyBuilder, KeyBuilder, ModelBuilder,
    PropertyBuilder, ReferenceBuilder,
};

pub use relmap_core::{
    model::{self, DeleteBehavior, Shape, Type, ValueGenerated, ValueType},
    ConventionSet, End, Error, Model, Provenance, Relate, Result,
};
