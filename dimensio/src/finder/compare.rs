//! Deterministic tie-break orders over catalog entries
//!
//! Every order is total over `Option<&T>`: a missing entry sorts before
//! any present one, two missing entries are equal, and an entry always
//! compares equal to itself.

use crate::corpus::{Corpus, DimensionDefinition, MeasurementSystem, Prefix, Unit};
use std::cmp::Ordering;

use super::Catalogued;

/// Compare two optional entries of the same catalog type
pub fn compare_entries<T: Catalogued>(corpus: &Corpus, x: Option<&T>, y: Option<&T>) -> Ordering {
    match (x, y) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.compare(y, corpus),
    }
}

/// Dimensionless first, then vector, then derived, then key
pub fn compare_definitions(x: &DimensionDefinition, y: &DimensionDefinition) -> Ordering {
    y.is_dimensionless
        .cmp(&x.is_dimensionless)
        .then_with(|| y.vector.cmp(&x.vector))
        .then_with(|| y.is_derived().cmp(&x.is_derived()))
        .then_with(|| x.key.cmp(&y.key))
}

/// Common units first: not rare, then not estimated, then key
pub fn compare_units(x: &Unit, y: &Unit) -> Ordering {
    x.is_rare
        .cmp(&y.is_rare)
        .then_with(|| x.is_estimation.cmp(&y.is_estimation))
        .then_with(|| x.key.cmp(&y.key))
}

/// Shallower systems first, then key
pub fn compare_systems(corpus: &Corpus, x: &MeasurementSystem, y: &MeasurementSystem) -> Ordering {
    if x.key == y.key {
        return Ordering::Equal;
    }
    corpus
        .system_depth(x.id())
        .cmp(&corpus.system_depth(y.id()))
        .then_with(|| x.key.cmp(&y.key))
}

/// Not rare, then prefix type, then key
pub fn compare_prefixes(x: &Prefix, y: &Prefix) -> Ordering {
    x.is_rare
        .cmp(&y.is_rare)
        .then_with(|| x.prefix_type.cmp(&y.prefix_type))
        .then_with(|| x.key.cmp(&y.key))
}
