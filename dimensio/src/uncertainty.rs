//! Values with Asymmetric Uncertainty
//!
//! An [`Uncertainty`] is a central value with independent lower and upper
//! error bounds, stored either as absolute magnitudes or as fractions of the
//! central value.
//!
//! # Propagation Rules
//!
//! Errors combine linearly (worst case), not in quadrature:
//! - Addition: lower with lower, upper with upper, absolute
//! - Subtraction: the subtrahend's sides swap before combining
//! - Multiplication/Division: relative magnitudes add (the divisor's sides swap)
//! - Power: relative magnitudes scale by |n|
//!
//! ```ignore
//! let a = Uncertainty::new(10.0, 0.2, 0.3)?;
//! let b = Uncertainty::new(4.0, 0.1, 0.1)?;
//! let d = a - b; // 6.0 (+0.4/-0.3)
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{QuantityError, Result};

/// A central value with lower and upper uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncertaintyFields")]
pub struct Uncertainty {
    value: f64,
    lower: f64,
    upper: f64,
    is_relative: bool,
}

/// Wire form; deserialized values go through the same checks as `new`
#[derive(Deserialize)]
struct UncertaintyFields {
    value: f64,
    lower: f64,
    upper: f64,
    #[serde(default)]
    is_relative: bool,
}

impl TryFrom<UncertaintyFields> for Uncertainty {
    type Error = QuantityError;

    fn try_from(fields: UncertaintyFields) -> Result<Self> {
        Self::checked(fields.value, fields.lower, fields.upper, fields.is_relative)
    }
}

impl Uncertainty {
    /// Create a value with absolute lower/upper uncertainty
    pub fn new(value: f64, lower: f64, upper: f64) -> Result<Self> {
        Self::checked(value, lower, upper, false)
    }

    /// Create a value whose uncertainties are fractions of `value`
    pub fn relative(value: f64, lower: f64, upper: f64) -> Result<Self> {
        Self::checked(value, lower, upper, true)
    }

    /// Create a value with equal absolute uncertainty on both sides
    pub fn symmetric(value: f64, uncertainty: f64) -> Result<Self> {
        Self::checked(value, uncertainty, uncertainty, false)
    }

    /// Create an exact (zero-error) value
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            lower: 0.0,
            upper: 0.0,
            is_relative: false,
        }
    }

    fn checked(value: f64, lower: f64, upper: f64, is_relative: bool) -> Result<Self> {
        if !(lower >= 0.0 && upper >= 0.0) {
            return Err(QuantityError::NegativeUncertainty { lower, upper });
        }
        Ok(Self {
            value,
            lower,
            upper,
            is_relative,
        })
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Lower uncertainty in this value's own representation
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper uncertainty in this value's own representation
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn is_relative(&self) -> bool {
        self.is_relative
    }

    pub fn absolute_lower(&self) -> f64 {
        if self.is_relative {
            self.lower * self.value.abs()
        } else {
            self.lower
        }
    }

    pub fn absolute_upper(&self) -> f64 {
        if self.is_relative {
            self.upper * self.value.abs()
        } else {
            self.upper
        }
    }

    pub fn relative_lower(&self) -> Result<f64> {
        self.to_fraction_of_value(self.lower)
    }

    pub fn relative_upper(&self) -> Result<f64> {
        self.to_fraction_of_value(self.upper)
    }

    fn to_fraction_of_value(&self, magnitude: f64) -> Result<f64> {
        if self.is_relative || magnitude == 0.0 {
            Ok(magnitude)
        } else if self.value == 0.0 {
            Err(QuantityError::DivideByZero(format!(
                "relative uncertainty of {} around a zero value",
                magnitude
            )))
        } else {
            Ok(magnitude / self.value.abs())
        }
    }

    /// Same value with absolute magnitudes
    pub fn to_absolute(&self) -> Self {
        Self {
            value: self.value,
            lower: self.absolute_lower(),
            upper: self.absolute_upper(),
            is_relative: false,
        }
    }

    /// Same value with magnitudes expressed as fractions of the value
    pub fn to_relative(&self) -> Result<Self> {
        Ok(Self {
            value: self.value,
            lower: self.relative_lower()?,
            upper: self.relative_upper()?,
            is_relative: true,
        })
    }

    /// Absolute width of the interval
    pub fn total_uncertainty(&self) -> f64 {
        self.absolute_lower() + self.absolute_upper()
    }

    pub fn minimum(&self) -> f64 {
        self.value - self.absolute_lower()
    }

    pub fn maximum(&self) -> f64 {
        self.value + self.absolute_upper()
    }

    pub fn is_symmetric(&self) -> bool {
        self.lower == self.upper
    }

    /// True if the `[minimum, maximum]` ranges of both values overlap
    pub fn is_consistent(&self, other: &Self) -> bool {
        self.minimum() <= other.maximum() && other.minimum() <= self.maximum()
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Sum with linearly combined absolute uncertainties
    pub fn sum(&self, other: &Self) -> Self {
        Self {
            value: self.value + other.value,
            lower: self.absolute_lower() + other.absolute_lower(),
            upper: self.absolute_upper() + other.absolute_upper(),
            is_relative: false,
        }
    }

    /// Difference; the subtrahend's upper side widens the lower bound
    pub fn subtract(&self, other: &Self) -> Self {
        Self {
            value: self.value - other.value,
            lower: self.absolute_lower() + other.absolute_upper(),
            upper: self.absolute_upper() + other.absolute_lower(),
            is_relative: false,
        }
    }

    /// Product with linearly combined relative uncertainties
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        Ok(Self {
            value: self.value * other.value,
            lower: self.relative_lower()? + other.relative_lower()?,
            upper: self.relative_upper()? + other.relative_upper()?,
            is_relative: true,
        })
    }

    /// Quotient; the divisor's sides swap before combining
    pub fn divide(&self, other: &Self) -> Result<Self> {
        if other.value == 0.0 {
            return Err(QuantityError::DivideByZero(
                "uncertain value divided by a zero central value".into(),
            ));
        }
        Ok(Self {
            value: self.value / other.value,
            lower: self.relative_lower()? + other.relative_upper()?,
            upper: self.relative_upper()? + other.relative_lower()?,
            is_relative: true,
        })
    }

    /// Power; relative uncertainty scales by `|n|`
    pub fn pow(&self, n: f64) -> Result<Self> {
        let (lower, upper) = (self.relative_lower()?, self.relative_upper()?);
        let (lower, upper) = if n < 0.0 {
            (upper, lower)
        } else {
            (lower, upper)
        };
        Ok(Self {
            value: self.value.powf(n),
            lower: lower * n.abs(),
            upper: upper * n.abs(),
            is_relative: true,
        })
    }

    pub fn sqrt(&self) -> Result<Self> {
        self.pow(0.5)
    }

    /// Exponential, bounds evaluated at the interval ends
    pub fn exp(&self) -> Self {
        let centre = self.value.exp();
        Self {
            value: centre,
            lower: centre - self.minimum().exp(),
            upper: self.maximum().exp() - centre,
            is_relative: false,
        }
    }

    /// Natural logarithm, bounds evaluated at the interval ends
    pub fn ln(&self) -> Result<Self> {
        if self.minimum() <= 0.0 {
            return Err(QuantityError::InvalidOperation(format!(
                "logarithm of a range reaching {}",
                self.minimum()
            )));
        }
        let centre = self.value.ln();
        Ok(Self {
            value: centre,
            lower: centre - self.minimum().ln(),
            upper: self.maximum().ln() - centre,
            is_relative: false,
        })
    }

    /// Shift by an exact amount; magnitudes are kept absolute
    pub fn shift(&self, amount: f64) -> Self {
        Self {
            value: self.value + amount,
            lower: self.absolute_lower(),
            upper: self.absolute_upper(),
            is_relative: false,
        }
    }

    /// Scale by an exact factor, keeping the representation.
    ///
    /// A negative factor mirrors the interval, swapping the sides.
    pub fn scale(&self, factor: f64) -> Self {
        let (lower, upper) = if factor < 0.0 {
            (self.upper, self.lower)
        } else {
            (self.lower, self.upper)
        };
        let magnitude = if self.is_relative { 1.0 } else { factor.abs() };
        Self {
            value: self.value * factor,
            lower: lower * magnitude,
            upper: upper * magnitude,
            is_relative: self.is_relative,
        }
    }

    /// The operand with the larger central value
    pub fn max(self, other: Self) -> Self {
        if other.value > self.value { other } else { self }
    }

    /// The operand with the smaller central value
    pub fn min(self, other: Self) -> Self {
        if other.value < self.value { other } else { self }
    }

    /// Compare central values
    pub fn compare_value(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

// Arithmetic operators

impl Add for Uncertainty {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.sum(&rhs)
    }
}

impl Sub for Uncertainty {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(&rhs)
    }
}

impl Add<f64> for Uncertainty {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        self.shift(rhs)
    }
}

impl Sub<f64> for Uncertainty {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        self.shift(-rhs)
    }
}

impl Mul<f64> for Uncertainty {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Div<f64> for Uncertainty {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self.scale(1.0 / rhs)
    }
}

impl Neg for Uncertainty {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            value: -self.value,
            lower: self.upper,
            upper: self.lower,
            is_relative: self.is_relative,
        }
    }
}

impl From<f64> for Uncertainty {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

impl fmt::Display for Uncertainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lower, upper, suffix) = if self.is_relative {
            (self.lower * 100.0, self.upper * 100.0, "%")
        } else {
            (self.lower, self.upper, "")
        };

        if self.is_symmetric() {
            write!(f, "{} ± {}{}", self.value, upper, suffix)
        } else {
            write!(f, "{} +{}{}/-{}{}", self.value, upper, suffix, lower, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn assert_approx(actual: f64, expected: f64, msg: &str) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{}: expected {}, got {}",
            msg,
            expected,
            actual
        );
    }

    #[test]
    fn test_bounds() {
        let u = Uncertainty::new(7.6, 1.1, 0.4).unwrap();
        assert_approx(u.total_uncertainty(), 1.5, "total");
        assert_approx(u.minimum(), 6.5, "minimum");
        assert_approx(u.maximum(), 8.0, "maximum");
        assert!(!u.is_symmetric());
        assert!(Uncertainty::symmetric(3.0, 0.2).unwrap().is_symmetric());
    }

    #[test]
    fn test_negative_magnitude_rejected() {
        let err = Uncertainty::new(1.0, -0.1, 0.2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(Uncertainty::relative(1.0, 0.1, f64::NAN).is_err());
    }

    #[test]
    fn test_add_is_linear() {
        let a = Uncertainty::new(10.0, 0.2, 0.3).unwrap();
        let b = Uncertainty::new(4.0, 0.1, 0.4).unwrap();
        let sum = a + b;
        assert_approx(sum.value(), 14.0, "sum value");
        assert_approx(sum.lower(), 0.3, "sum lower");
        assert_approx(sum.upper(), 0.7, "sum upper");
        assert!(!sum.is_relative());
    }

    #[test]
    fn test_subtract_swaps_sides() {
        let a = Uncertainty::new(10.0, 0.2, 0.3).unwrap();
        let b = Uncertainty::new(4.0, 0.1, 0.4).unwrap();
        let diff = a - b;
        assert_approx(diff.value(), 6.0, "difference value");
        assert_approx(diff.lower(), 0.6, "difference lower");
        assert_approx(diff.upper(), 0.4, "difference upper");
    }

    #[test]
    fn test_add_mixed_representations() {
        let a = Uncertainty::relative(10.0, 0.1, 0.1).unwrap();
        let b = Uncertainty::new(5.0, 0.5, 0.5).unwrap();
        let sum = a + b;
        assert_approx(sum.lower(), 1.5, "absolute lower");
        assert_approx(sum.upper(), 1.5, "absolute upper");
    }

    #[test]
    fn test_multiply_is_relative() {
        let a = Uncertainty::new(2.0, 0.1, 0.2).unwrap();
        let b = Uncertainty::new(5.0, 0.5, 0.25).unwrap();
        let product = a.multiply(&b).unwrap();
        assert!(product.is_relative());
        assert_approx(product.value(), 10.0, "product value");
        assert_approx(product.lower(), 0.05 + 0.1, "product lower");
        assert_approx(product.upper(), 0.1 + 0.05, "product upper");
        assert_approx(product.absolute_lower(), 1.5, "absolute lower");
    }

    #[test]
    fn test_divide() {
        let a = Uncertainty::relative(8.0, 0.01, 0.02).unwrap();
        let b = Uncertainty::relative(2.0, 0.03, 0.04).unwrap();
        let q = a.divide(&b).unwrap();
        assert_approx(q.value(), 4.0, "quotient value");
        assert_approx(q.lower(), 0.05, "quotient lower");
        assert_approx(q.upper(), 0.05, "quotient upper");

        let zero = Uncertainty::exact(0.0);
        assert_eq!(a.divide(&zero).unwrap_err().kind(), ErrorKind::DivideByZero);
    }

    #[test]
    fn test_relative_of_zero_value() {
        let u = Uncertainty::new(0.0, 0.1, 0.1).unwrap();
        assert_eq!(u.to_relative().unwrap_err().kind(), ErrorKind::DivideByZero);
        assert!(Uncertainty::exact(0.0).to_relative().is_ok());
    }

    #[test]
    fn test_pow_and_sqrt() {
        let a = Uncertainty::relative(4.0, 0.02, 0.04).unwrap();
        let squared = a.pow(2.0).unwrap();
        assert_approx(squared.value(), 16.0, "square value");
        assert_approx(squared.lower(), 0.04, "square lower");
        assert_approx(squared.upper(), 0.08, "square upper");

        let root = a.sqrt().unwrap();
        assert_approx(root.value(), 2.0, "root value");
        assert_approx(root.lower(), 0.01, "root lower");
        assert_approx(root.upper(), 0.02, "root upper");

        let inverse = a.pow(-1.0).unwrap();
        assert_approx(inverse.lower(), 0.04, "inverse lower");
        assert_approx(inverse.upper(), 0.02, "inverse upper");
    }

    #[test]
    fn test_scalar_operations() {
        let a = Uncertainty::new(10.0, 1.0, 2.0).unwrap();
        let shifted = a + 5.0;
        assert_approx(shifted.value(), 15.0, "shifted value");
        assert_approx(shifted.lower(), 1.0, "shifted lower");
        assert_approx(shifted.upper(), 2.0, "shifted upper");

        let scaled = a * 3.0;
        assert_approx(scaled.lower(), 3.0, "scaled lower");
        assert_approx(scaled.upper(), 6.0, "scaled upper");

        let rel = Uncertainty::relative(10.0, 0.1, 0.2).unwrap();
        let halved = rel / 2.0;
        assert!(halved.is_relative());
        assert_approx(halved.value(), 5.0, "halved value");
        assert_approx(halved.lower(), 0.1, "halved lower");
        assert_approx(halved.upper(), 0.2, "halved upper");
    }

    #[test]
    fn test_negation_swaps_sides() {
        let a = Uncertainty::new(3.0, 0.1, 0.5).unwrap();
        let n = -a;
        assert_approx(n.value(), -3.0, "negated value");
        assert_approx(n.lower(), 0.5, "negated lower");
        assert_approx(n.upper(), 0.1, "negated upper");

        let mirrored = a * -2.0;
        assert_approx(mirrored.lower(), 1.0, "mirrored lower");
        assert_approx(mirrored.upper(), 0.2, "mirrored upper");
    }

    #[test]
    fn test_consistency() {
        let a = Uncertainty::new(10.0, 1.0, 1.0).unwrap();
        let b = Uncertainty::new(11.5, 0.6, 0.2).unwrap();
        let c = Uncertainty::new(13.0, 0.5, 0.5).unwrap();
        assert!(a.is_consistent(&b));
        assert!(b.is_consistent(&a));
        assert!(!a.is_consistent(&c));
    }

    #[test]
    fn test_max_min_return_operands() {
        let a = Uncertainty::new(10.0, 1.0, 1.0).unwrap();
        let b = Uncertainty::relative(12.0, 0.5, 0.1).unwrap();
        assert_eq!(a.max(b), b);
        assert_eq!(a.min(b), a);
    }

    #[test]
    fn test_exp_and_ln() {
        let a = Uncertainty::new(1.0, 0.1, 0.2).unwrap();
        let e = a.exp();
        assert_approx(e.value(), std::f64::consts::E, "exp value");
        assert_approx(e.minimum(), 0.9_f64.exp(), "exp minimum");
        assert_approx(e.maximum(), 1.2_f64.exp(), "exp maximum");

        let l = e.ln().unwrap();
        assert_approx(l.value(), 1.0, "ln value");
        assert_approx(l.lower(), 0.1, "ln lower");

        let straddling = Uncertainty::new(0.5, 1.0, 0.0).unwrap();
        assert_eq!(straddling.ln().unwrap_err().kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_display() {
        let s = Uncertainty::symmetric(3.5, 0.25).unwrap().to_string();
        assert_eq!(s, "3.5 ± 0.25");
        let a = Uncertainty::new(7.6, 1.1, 0.4).unwrap().to_string();
        assert_eq!(a, "7.6 +0.4/-1.1");
    }

    #[test]
    fn test_deserialize_checks_magnitudes() {
        let u: Uncertainty =
            serde_json::from_str(r#"{"value":1.0,"lower":0.5,"upper":0.25,"is_relative":true}"#)
                .unwrap();
        assert!(u.is_relative());
        assert_approx(u.absolute_upper(), 0.25, "relative upper");

        let text = serde_json::to_string(&u).unwrap();
        let round_trip: Uncertainty = serde_json::from_str(&text).unwrap();
        assert_eq!(round_trip, u);

        let negative = serde_json::from_str::<Uncertainty>(
            r#"{"value":1.0,"lower":-5.0,"upper":-1.0,"is_relative":false}"#,
        );
        assert!(negative.is_err());
        let negative_upper = r#"{"value":1.0,"lower":0.0,"upper":-1e-9}"#;
        assert!(serde_json::from_str::<Uncertainty>(negative_upper).is_err());
    }
}
