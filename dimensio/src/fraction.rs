//! Exact Rational Numbers
//!
//! `Fraction` stores a rational in lowest terms with the sign carried on the
//! numerator. A zero denominator is not an error: it encodes the three
//! indeterminate values.
//!
//! | numerator | denominator | value |
//! |-----------|-------------|-------|
//! | `0`       | `0`         | NaN   |
//! | `1`       | `0`         | +∞    |
//! | `-1`      | `0`         | -∞    |
//!
//! Arithmetic runs in `i128` and reduces before narrowing back to `i64`.
//! A reduced result that still does not fit saturates: large magnitudes
//! become the signed infinity, vanishing ones become zero.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuantityError;

/// An exact rational number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

impl Fraction {
    pub const ZERO: Self = Self {
        numerator: 0,
        denominator: 1,
    };
    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };
    pub const NAN: Self = Self {
        numerator: 0,
        denominator: 0,
    };
    pub const POSITIVE_INFINITY: Self = Self {
        numerator: 1,
        denominator: 0,
    };
    pub const NEGATIVE_INFINITY: Self = Self {
        numerator: -1,
        denominator: 0,
    };

    /// Create a fraction, reducing it to lowest terms
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self::reduce(numerator as i128, denominator as i128)
    }

    /// Create a whole number
    pub const fn whole(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    fn reduce(numerator: i128, denominator: i128) -> Self {
        if denominator == 0 {
            return match numerator.signum() {
                0 => Self::NAN,
                1 => Self::POSITIVE_INFINITY,
                _ => Self::NEGATIVE_INFINITY,
            };
        }

        let (mut n, mut d) = if denominator < 0 {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };

        let g = gcd(n.unsigned_abs(), d.unsigned_abs()) as i128;
        n /= g;
        d /= g;

        match (i64::try_from(n), i64::try_from(d)) {
            (Ok(numerator), Ok(denominator)) => Self {
                numerator,
                denominator,
            },
            _ if n.unsigned_abs() < d.unsigned_abs() => Self::ZERO,
            _ if n > 0 => Self::POSITIVE_INFINITY,
            _ => Self::NEGATIVE_INFINITY,
        }
    }

    #[inline]
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    #[inline]
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.denominator == 0 && self.numerator == 0
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.denominator == 0 && self.numerator != 0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.denominator != 0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.numerator == 0 && self.denominator == 1
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    /// True for `1/n` with `n >= 1`
    pub fn is_unit_fraction(&self) -> bool {
        self.numerator == 1 && self.denominator > 0
    }

    /// Reciprocal. `0` inverts to +∞ and ±∞ invert to `0`.
    pub fn inverse(self) -> Self {
        Self::reduce(self.denominator as i128, self.numerator as i128)
    }

    pub fn negate(self) -> Self {
        Self::reduce(-(self.numerator as i128), self.denominator as i128)
    }

    pub fn abs(self) -> Self {
        Self::reduce(
            (self.numerator as i128).abs(),
            self.denominator as i128,
        )
    }

    /// Nearest `f64`; indeterminate values map to their IEEE counterparts
    pub fn to_f64(&self) -> f64 {
        match (self.numerator, self.denominator) {
            (0, 0) => f64::NAN,
            (n, 0) if n > 0 => f64::INFINITY,
            (_, 0) => f64::NEG_INFINITY,
            (n, d) => n as f64 / d as f64,
        }
    }

    /// Floor-division remainder; the result takes the sign of `divisor`
    ///
    /// A finite value modulo ±∞ is the value itself when the signs agree
    /// (or it is zero) and the divisor otherwise, as `floor(x/∞) = -1` for
    /// opposite signs. An indeterminate or infinite dividend and a zero
    /// divisor give NaN.
    pub fn modulus(self, divisor: Self) -> Self {
        if !self.is_finite() || divisor.is_nan() || divisor.is_zero() {
            return Self::NAN;
        }
        if divisor.is_infinite() {
            return if self.is_zero() || self.is_negative() == divisor.is_negative() {
                self
            } else {
                divisor
            };
        }

        // a/b mod c/d == ((a*d) mod (c*b)) / (b*d)
        let x = self.numerator as i128 * divisor.denominator as i128;
        let y = divisor.numerator as i128 * self.denominator as i128;
        let m = x.rem_euclid(y);
        let m = if y < 0 && m != 0 { m + y } else { m };

        Self::reduce(m, self.denominator as i128 * divisor.denominator as i128)
    }

    /// Integer power; a negative exponent raises the reciprocal
    pub fn pow(self, exponent: i32) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.is_nan() {
            return Self::NAN;
        }

        let base = if exponent < 0 { self.inverse() } else { self };
        let e = exponent.unsigned_abs();
        let negative = base.numerator < 0 && e % 2 == 1;

        if base.is_infinite() {
            return if negative {
                Self::NEGATIVE_INFINITY
            } else {
                Self::POSITIVE_INFINITY
            };
        }

        let n = (base.numerator as i128).checked_pow(e);
        let d = (base.denominator as i128).checked_pow(e);
        match (n, d) {
            (Some(n), Some(d)) => Self::reduce(n, d),
            _ if base.numerator.unsigned_abs() < base.denominator.unsigned_abs() => Self::ZERO,
            _ if negative => Self::NEGATIVE_INFINITY,
            _ => Self::POSITIVE_INFINITY,
        }
    }

    /// Exact square root.
    ///
    /// Returns NaN when the value is negative, NaN, or not the square of a
    /// rational number.
    pub fn sqrt(self) -> Self {
        if self.is_nan() || self.numerator < 0 {
            return Self::NAN;
        }
        if self.is_infinite() {
            return Self::POSITIVE_INFINITY;
        }

        match (
            exact_isqrt(self.numerator as u64),
            exact_isqrt(self.denominator as u64),
        ) {
            (Some(n), Some(d)) => Self::new(n as i64, d as i64),
            _ => Self::NAN,
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn exact_isqrt(n: u64) -> Option<u64> {
    let mut root = (n as f64).sqrt() as u64;
    while (root as u128) * (root as u128) > n as u128 {
        root -= 1;
    }
    while ((root + 1) as u128) * ((root + 1) as u128) <= n as u128 {
        root += 1;
    }
    ((root as u128) * (root as u128) == n as u128).then_some(root)
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Self::whole(value)
    }
}

impl From<i32> for Fraction {
    fn from(value: i32) -> Self {
        Self::whole(value as i64)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_nan() || rhs.is_nan() {
            return Self::NAN;
        }
        match (self.is_infinite(), rhs.is_infinite()) {
            // ∞ - ∞ has no value
            (true, true) if self.numerator != rhs.numerator => Self::NAN,
            (true, _) => self,
            (false, true) => rhs,
            (false, false) => Self::reduce(
                self.numerator as i128 * rhs.denominator as i128
                    + rhs.numerator as i128 * self.denominator as i128,
                self.denominator as i128 * rhs.denominator as i128,
            ),
        }
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Self) -> Self::Output {
        self + rhs.negate()
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.is_nan() || rhs.is_nan() {
            return Self::NAN;
        }
        if self.is_infinite() || rhs.is_infinite() {
            // 0 × ∞ has no value
            return match self.numerator.signum() * rhs.numerator.signum() {
                0 => Self::NAN,
                1 => Self::POSITIVE_INFINITY,
                _ => Self::NEGATIVE_INFINITY,
            };
        }
        Self::reduce(
            self.numerator as i128 * rhs.numerator as i128,
            self.denominator as i128 * rhs.denominator as i128,
        )
    }
}

impl Div for Fraction {
    type Output = Fraction;

    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inverse()
    }
}

impl Rem for Fraction {
    type Output = Fraction;

    fn rem(self, rhs: Self) -> Self::Output {
        self.modulus(rhs)
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

// =============================================================================
// Comparison
// =============================================================================

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if self.is_finite() && other.is_finite() {
            let lhs = self.numerator as i128 * other.denominator as i128;
            let rhs = other.numerator as i128 * self.denominator as i128;
            return Some(lhs.cmp(&rhs));
        }
        self.to_f64().partial_cmp(&other.to_f64())
    }
}

impl PartialEq<f64> for Fraction {
    fn eq(&self, other: &f64) -> bool {
        self.to_f64() == *other
    }
}

impl PartialOrd<f64> for Fraction {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.to_f64().partial_cmp(other)
    }
}

// =============================================================================
// Text
// =============================================================================

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.numerator, self.denominator) {
            (0, 0) => write!(f, "NaN"),
            (n, 0) if n > 0 => write!(f, "Infinity"),
            (_, 0) => write!(f, "-Infinity"),
            (n, 1) => write!(f, "{}", n),
            (n, d) => write!(f, "{}/{}", n, d),
        }
    }
}

impl FromStr for Fraction {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || QuantityError::InvalidFraction(s.to_string());

        if text.eq_ignore_ascii_case("nan") {
            return Ok(Self::NAN);
        }
        if text.eq_ignore_ascii_case("infinity") || text.eq_ignore_ascii_case("+infinity") {
            return Ok(Self::POSITIVE_INFINITY);
        }
        if text.eq_ignore_ascii_case("-infinity") {
            return Ok(Self::NEGATIVE_INFINITY);
        }

        match text.split_once('/') {
            Some((n, d)) => {
                let n: i64 = n.trim().parse().map_err(|_| invalid())?;
                let d: i64 = d.trim().parse().map_err(|_| invalid())?;
                Ok(Self::new(n, d))
            }
            None => text.parse::<i64>().map(Self::whole).map_err(|_| invalid()),
        }
    }
}

impl TryFrom<String> for Fraction {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fraction> for String {
    fn from(value: Fraction) -> Self {
        value.to_string()
    }
}
