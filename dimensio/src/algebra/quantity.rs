//! Dimensioned quantities
//!
//! A `Quantity` is an `f64` paired with an ordered list of [`Dimension`]s.
//! Quantities are immutable; every operation returns a new value. Anything
//! that needs unit factors or signatures takes the [`Corpus`] explicitly.

use super::convert::{convert_value, ensure_commensurable};
use super::dimension::{Dimension, aggregate_scale, merge_into, signature_of};
use super::simplify::Simplifier;
use crate::corpus::{Corpus, Signature};
use crate::error::{QuantityError, Result};
use crate::format::describe;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Mul, Neg};

/// Relative slack when deciding that a rescaled power is integral
const POWER_EPSILON: f64 = 1e-9;

/// A value with composite units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuantityFields")]
pub struct Quantity {
    value: f64,
    dimensions: Vec<Dimension>,
}

/// Wire form; deserialized lists are normalised like [`Quantity::new`]
#[derive(Deserialize)]
struct QuantityFields {
    value: f64,
    dimensions: Vec<Dimension>,
}

impl From<QuantityFields> for Quantity {
    fn from(fields: QuantityFields) -> Self {
        Quantity::new(fields.value, fields.dimensions)
    }
}

impl Quantity {
    /// Build from parts; identical dimensions merge and zero powers vanish
    pub fn new(value: f64, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        let mut merged: Vec<Dimension> = Vec::new();
        for dim in dimensions {
            match merged.iter_mut().find(|d| d.same_unit(&dim)) {
                Some(existing) => existing.power = existing.power.saturating_add(dim.power),
                None => merged.push(dim),
            }
        }
        merged.retain(|d| d.power != 0);
        Quantity { value, dimensions: merged }
    }

    /// A pure number
    #[inline]
    pub fn dimensionless(value: f64) -> Self {
        Quantity { value, dimensions: Vec::new() }
    }

    /// Parse unit identifiers such as `["km", "h^-1"]`
    ///
    /// The dimensions are kept as written (merged, not simplified).
    pub fn parse(value: f64, identifiers: &[&str], corpus: &Corpus) -> Result<Self> {
        let dimensions = identifiers
            .iter()
            .map(|id| Dimension::parse(id, corpus))
            .collect::<Result<Vec<_>>>()?;
        let mut merged = Vec::with_capacity(dimensions.len());
        let factor = merge_into(&mut merged, dimensions, corpus)?;
        Ok(Quantity { value: value * factor, dimensions: merged })
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    #[inline]
    pub fn is_dimensionless(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Same dimensions, new value
    #[inline]
    pub fn with_value(&self, value: f64) -> Self {
        Quantity { value, dimensions: self.dimensions.clone() }
    }

    pub fn signature(&self, corpus: &Corpus) -> Signature {
        signature_of(&self.dimensions, corpus)
    }

    pub fn is_commensurable(&self, other: &Quantity, corpus: &Corpus) -> bool {
        self.signature(corpus) == other.signature(corpus)
    }

    /// The value expressed in coherent base units
    pub fn base_value(&self, corpus: &Corpus) -> f64 {
        self.value * aggregate_scale(&self.dimensions, corpus)
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Product, with same-unit dimensions merged and the result simplified
    pub fn multiply(&self, other: &Quantity, corpus: &Corpus) -> Result<Quantity> {
        self.combine(other.value, other.dimensions.iter().copied(), corpus)
    }

    /// Quotient: `multiply` with the right-hand powers negated
    pub fn divide(&self, other: &Quantity, corpus: &Corpus) -> Result<Quantity> {
        let inverted = other
            .dimensions
            .iter()
            .map(|d| {
                d.power.checked_neg().map(|p| d.with_power(p)).ok_or_else(|| {
                    QuantityError::InvalidOperation("dimension power out of range".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.combine(other.value.recip(), inverted, corpus)
    }

    fn combine(
        &self,
        value: f64,
        dimensions: impl IntoIterator<Item = Dimension>,
        corpus: &Corpus,
    ) -> Result<Quantity> {
        let mut merged = self.dimensions.clone();
        let factor = merge_into(&mut merged, dimensions, corpus)?;
        let product = Quantity { value: self.value * value * factor, dimensions: merged };
        Ok(Simplifier::new(corpus).simplify(&product))
    }

    /// Sum in the left operand's units
    pub fn add(&self, other: &Quantity, corpus: &Corpus) -> Result<Quantity> {
        let rhs = convert_value(other.value, &other.dimensions, &self.dimensions, corpus)?;
        Ok(self.with_value(self.value + rhs))
    }

    /// Difference in the left operand's units
    pub fn subtract(&self, other: &Quantity, corpus: &Corpus) -> Result<Quantity> {
        let rhs = convert_value(other.value, &other.dimensions, &self.dimensions, corpus)?;
        Ok(self.with_value(self.value - rhs))
    }

    /// Multiply the value by a pure number
    #[inline]
    pub fn scale(&self, factor: f64) -> Quantity {
        self.with_value(self.value * factor)
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Express this quantity in `targets`
    pub fn convert_to(&self, targets: &[Dimension], corpus: &Corpus) -> Result<Quantity> {
        let value = convert_value(self.value, &self.dimensions, targets, corpus)?;
        Ok(Quantity::new(value, targets.iter().copied()))
    }

    /// Express this quantity in units given by identifier, e.g. `["m", "s^-1"]`
    pub fn convert_to_units(&self, identifiers: &[&str], corpus: &Corpus) -> Result<Quantity> {
        let target = Quantity::parse(1.0, identifiers, corpus)?;
        self.convert_to(target.dimensions(), corpus)
    }

    /// Rewrite into derived units where possible
    pub fn simplify(&self, corpus: &Corpus) -> Quantity {
        Simplifier::new(corpus).simplify(self)
    }

    // ========================================================================
    // Elementary functions
    // ========================================================================

    pub fn abs(&self) -> Quantity {
        self.with_value(self.value.abs())
    }

    pub fn ceil(&self) -> Quantity {
        self.with_value(self.value.ceil())
    }

    pub fn floor(&self) -> Quantity {
        self.with_value(self.value.floor())
    }

    pub fn round(&self) -> Quantity {
        self.with_value(self.value.round())
    }

    /// Sine of the raw value; the result is dimensionless
    pub fn sin(&self) -> Quantity {
        Quantity::dimensionless(self.value.sin())
    }

    pub fn cos(&self) -> Quantity {
        Quantity::dimensionless(self.value.cos())
    }

    pub fn tan(&self) -> Quantity {
        Quantity::dimensionless(self.value.tan())
    }

    pub fn exp(&self) -> Quantity {
        Quantity::dimensionless(self.value.exp())
    }

    pub fn ln(&self) -> Quantity {
        Quantity::dimensionless(self.value.ln())
    }

    pub fn log10(&self) -> Quantity {
        Quantity::dimensionless(self.value.log10())
    }

    /// Square root; every power must be even
    pub fn sqrt(&self, corpus: &Corpus) -> Result<Quantity> {
        self.raise(0.5, corpus)
    }

    /// Integer power
    pub fn powi(&self, exponent: i32) -> Result<Quantity> {
        let dimensions = self
            .dimensions
            .iter()
            .map(|d| {
                d.power
                    .checked_mul(exponent)
                    .map(|p| d.with_power(p))
                    .ok_or_else(|| {
                        QuantityError::InvalidOperation("dimension power out of range".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Quantity::new(self.value.powi(exponent), dimensions))
    }

    /// Power with a dimensionless exponent
    ///
    /// The exponent is taken in coherent units, so `50 %` raises to `0.5`.
    pub fn pow(&self, exponent: &Quantity, corpus: &Corpus) -> Result<Quantity> {
        if !exponent.signature(corpus).is_empty() {
            return Err(QuantityError::DimensionedExponent(describe(
                &exponent.dimensions,
                corpus,
            )));
        }
        self.raise(exponent.base_value(corpus), corpus)
    }

    fn raise(&self, exponent: f64, corpus: &Corpus) -> Result<Quantity> {
        let fractional = || QuantityError::FractionalPower {
            dimensions: describe(&self.dimensions, corpus),
            exponent,
        };

        let mut dimensions = Vec::with_capacity(self.dimensions.len());
        for dim in &self.dimensions {
            let power = f64::from(dim.power) * exponent;
            let rounded = power.round();
            if !power.is_finite()
                || (power - rounded).abs() > POWER_EPSILON * power.abs().max(1.0)
                || rounded.abs() > f64::from(i32::MAX)
            {
                return Err(fractional());
            }
            dimensions.push(dim.with_power(rounded as i32));
        }
        Ok(Quantity::new(self.value.powf(exponent), dimensions))
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Order two commensurable quantities by physical magnitude
    pub fn compare_to(&self, other: &Quantity, corpus: &Corpus) -> Result<Ordering> {
        let rhs = convert_value(other.value, &other.dimensions, &self.dimensions, corpus)?;
        self.value.partial_cmp(&rhs).ok_or_else(|| {
            QuantityError::InvalidOperation("cannot order NaN quantities".to_string())
        })
    }

    /// The largest of `items`, returned as given
    pub fn max(items: &[Quantity], corpus: &Corpus) -> Result<Quantity> {
        Self::extremum(items, corpus, Ordering::Greater)
    }

    /// The smallest of `items`, returned as given
    pub fn min(items: &[Quantity], corpus: &Corpus) -> Result<Quantity> {
        Self::extremum(items, corpus, Ordering::Less)
    }

    fn extremum(items: &[Quantity], corpus: &Corpus, wanted: Ordering) -> Result<Quantity> {
        let (first, rest) = items.split_first().ok_or_else(|| {
            QuantityError::InvalidArgument("cannot take the extremum of no quantities".to_string())
        })?;

        let mut best = first;
        for item in rest {
            ensure_commensurable(&first.dimensions, &item.dimensions, corpus)?;
            if item.compare_to(best, corpus)? == wanted {
                best = item;
            }
        }
        Ok(best.clone())
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity { value: -self.value, dimensions: self.dimensions }
    }
}

impl Neg for &Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.with_value(-self.value)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity { value: self.value * rhs, dimensions: self.dimensions }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Quantity::dimensionless(value)
    }
}
