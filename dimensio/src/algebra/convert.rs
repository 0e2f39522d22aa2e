//! Unit conversion between commensurable dimension lists
//!
//! Multiplicative conversion uses the ratio of aggregate factors. Affine
//! units (temperatures) only convert with their offsets when both sides
//! are a single dimension at power 1: a temperature difference such as
//! `°C/s` carries no offset.

use super::dimension::{Dimension, aggregate_scale, signature_of};
use crate::corpus::Corpus;
use crate::error::{QuantityError, Result};
use crate::format::describe;

/// Express `value` given in `source` units in `target` units
pub fn convert_value(
    value: f64,
    source: &[Dimension],
    target: &[Dimension],
    corpus: &Corpus,
) -> Result<f64> {
    if source == target {
        return Ok(value);
    }
    ensure_commensurable(source, target, corpus)?;

    if let ([from], [to]) = (source, target)
        && from.power == 1
        && to.power == 1
    {
        let from_offset = corpus.unit(from.unit).offset;
        let to_offset = corpus.unit(to.unit).offset;
        if from_offset != 0.0 || to_offset != 0.0 {
            // base = value * scale + offset
            let base = value * from.unit_factor(corpus) + from_offset;
            return Ok((base - to_offset) / to.unit_factor(corpus));
        }
    }

    Ok(value * aggregate_scale(source, corpus) / aggregate_scale(target, corpus))
}

/// `Incommensurable` unless both lists reduce to the same base signature
pub fn ensure_commensurable(
    left: &[Dimension],
    right: &[Dimension],
    corpus: &Corpus,
) -> Result<()> {
    if signature_of(left, corpus) == signature_of(right, corpus) {
        Ok(())
    } else {
        Err(QuantityError::Incommensurable {
            left: describe(left, corpus),
            right: describe(right, corpus),
        })
    }
}
