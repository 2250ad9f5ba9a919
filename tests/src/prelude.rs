//! Common imports for scenario files: `use tests::prelude::*;`

pub use crate::fixtures::*;
pub use crate::{entity, names};

pub use crate::{assert_eq_unordered, models, tests};

pub use relmap::{
    DeleteBehavior, End, ModelBuilder, Provenance, Relate, Shape, Type, ValueGenerated,
};
