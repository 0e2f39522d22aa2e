//! Error types for quantity arithmetic and corpus resolution
//!
//! Every failure is local and synchronous. Variants are grouped into a
//! small set of [`ErrorKind`]s so callers can branch on the class of
//! failure without matching on every variant.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for corpus, finder and arithmetic operations
pub type Result<T> = std::result::Result<T, QuantityError>;

/// Classification of a [`QuantityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: blank search text, bad fraction literal,
    /// negative uncertainty, unknown identifiers
    InvalidArgument,
    /// Operands cannot be brought onto a common dimensional basis
    Incommensurable,
    /// The combination is well-formed but not supported
    InvalidOperation,
    /// A division by a zero magnitude that has no sentinel encoding
    DivideByZero,
}

/// Errors raised by the dimensional engine
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum QuantityError {
    #[error("search text must not be empty")]
    #[diagnostic(code(dimensio::blank_query))]
    BlankQuery,

    #[error("unknown unit `{0}`")]
    #[diagnostic(
        code(dimensio::unknown_unit),
        help("check the spelling, or register the unit with `Corpus::add_unit`")
    )]
    UnknownUnit(String),

    #[error("unknown {kind} `{key}`")]
    #[diagnostic(code(dimensio::unknown_entry))]
    UnknownEntry { kind: &'static str, key: String },

    #[error("duplicate {kind} key `{key}`")]
    #[diagnostic(code(dimensio::duplicate_key))]
    DuplicateKey { kind: &'static str, key: String },

    #[error("invalid derived expression `{expression}`: {reason}")]
    #[diagnostic(
        code(dimensio::derived_expression),
        help("use `key`, `key^n`, `*` and `/`, e.g. `mass*length/time^2`")
    )]
    InvalidDerivation { expression: String, reason: String },

    #[error("measurement system `{0}` would become its own ancestor")]
    #[diagnostic(code(dimensio::system_cycle))]
    SystemCycle(String),

    #[error("{what} must be positive, got {value}")]
    #[diagnostic(code(dimensio::non_positive_factor))]
    NonPositiveFactor { what: String, value: f64 },

    #[error("invalid fraction literal `{0}`")]
    #[diagnostic(code(dimensio::fraction_parse), help("expected `n/d`, `n`, `NaN` or `Infinity`"))]
    InvalidFraction(String),

    #[error("uncertainty magnitudes must be non-negative (lower {lower}, upper {upper})")]
    #[diagnostic(code(dimensio::negative_uncertainty))]
    NegativeUncertainty { lower: f64, upper: f64 },

    #[error("{0}")]
    #[diagnostic(code(dimensio::invalid_argument))]
    InvalidArgument(String),

    #[error("incommensurable quantities: [{left}] and [{right}]")]
    #[diagnostic(
        code(dimensio::incommensurable),
        help("both operands must reduce to the same base dimensions")
    )]
    Incommensurable { left: String, right: String },

    #[error("exponent must be dimensionless, found [{0}]")]
    #[diagnostic(code(dimensio::dimensioned_exponent))]
    DimensionedExponent(String),

    #[error("cannot raise [{dimensions}] to the power {exponent}: powers would not be integral")]
    #[diagnostic(code(dimensio::fractional_power))]
    FractionalPower { dimensions: String, exponent: f64 },

    #[error("unsupported operation: {0}")]
    #[diagnostic(code(dimensio::invalid_operation))]
    InvalidOperation(String),

    #[error("division by zero: {0}")]
    #[diagnostic(code(dimensio::divide_by_zero))]
    DivideByZero(String),
}

impl QuantityError {
    /// The class this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BlankQuery
            | Self::UnknownUnit(_)
            | Self::UnknownEntry { .. }
            | Self::DuplicateKey { .. }
            | Self::InvalidDerivation { .. }
            | Self::SystemCycle(_)
            | Self::NonPositiveFactor { .. }
            | Self::InvalidFraction(_)
            | Self::NegativeUncertainty { .. }
            | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Incommensurable { .. } | Self::DimensionedExponent(_) => {
                ErrorKind::Incommensurable
            }
            Self::FractionalPower { .. } | Self::InvalidOperation(_) => {
                ErrorKind::InvalidOperation
            }
            Self::DivideByZero(_) => ErrorKind::DivideByZero,
        }
    }
}

/// Errors raised while loading [`Options`](crate::corpus::Options) from disk
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read options file: {0}")]
    #[diagnostic(code(dimensio::config::io))]
    Io(#[from] std::io::Error),

    #[error("failed to parse options: {0}")]
    #[diagnostic(code(dimensio::config::parse))]
    Parse(String),

    #[error("unsupported options file format `{0}`")]
    #[diagnostic(code(dimensio::config::format), help("use a `.toml` or `.json` file"))]
    UnsupportedFormat(String),
}
