mod error;
pub use error::{Error, IntoError};

pub mod convention;
pub use convention::{Convention, ConventionSet};

mod builder;
pub use builder::Builder;

pub mod model;
pub use model::{Model, Options};

mod provenance;
pub use provenance::{Facet, Provenance};

pub mod resolve;
pub use resolve::{End, Relate};

/// A Result type alias that uses relmap's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
