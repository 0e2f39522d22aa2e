//! Dimensio: dimensional analysis over a mutable unit corpus
//!
//! A quantity is an `f64` paired with a composite list of unit dimensions.
//! The engine keeps arithmetic physically honest (only commensurable
//! quantities add), converts between units and folds atoms into derived
//! units.
//!
//! # Architecture
//!
//! ```text
//! Corpus (definitions, units, prefixes, systems, options)
//!    │
//!    ├── Finder / comparers ── unit identifier resolution
//!    │
//!    └── Quantity algebra ── conversion ── Simplifier ── formatting
//! ```
//!
//! `Fraction` and `Uncertainty` are standalone numeric types.
//!
//! # Example
//!
//! ```
//! use dimensio::{Corpus, Quantity};
//!
//! let corpus = Corpus::bootstrap()?;
//! let a = Quantity::parse(3.2, &["min"], &corpus)?;
//! let b = Quantity::parse(30.0, &["s"], &corpus)?;
//! let sum = a.add(&b, &corpus)?;
//! assert!((sum.value() - 3.7).abs() < 1e-12);
//! # Ok::<(), dimensio::QuantityError>(())
//! ```

pub mod algebra;
pub mod corpus;
pub mod error;
pub mod finder;
pub mod format;
pub mod fraction;
pub mod uncertainty;

pub use algebra::{Dimension, Quantity, Simplifier};
pub use corpus::{
    Corpus, DefinitionId, DimensionDefinition, MeasurementSystem, Options, Prefix, PrefixId,
    PrefixType, Signature, SystemId, Unit, UnitId,
};
pub use error::{ConfigError, ErrorKind, QuantityError, Result};
pub use finder::{Catalogued, Finder};
pub use format::{FormatOptions, Layout, Naming, QuantityFormatter};
pub use fraction::Fraction;
pub use uncertainty::Uncertainty;
