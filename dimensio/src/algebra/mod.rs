//! Dimension algebra and quantity arithmetic
//!
//! - [`Dimension`]: one unit with optional prefix and integer power
//! - [`Quantity`]: value plus ordered dimensions, with unit-aware arithmetic
//! - [`convert`]: conversion between commensurable dimension lists
//! - [`Simplifier`]: folding atoms into derived units

pub mod convert;
mod dimension;
mod quantity;
pub mod simplify;

pub use dimension::{Dimension, aggregate_scale, signature_of};
pub use quantity::Quantity;
pub use simplify::Simplifier;
