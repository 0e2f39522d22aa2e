//! Catalog entries
//!
//! The four record types held by a [`Corpus`](super::Corpus): dimension
//! definitions, units, prefixes and measurement systems. Entries are
//! built with small builder methods and registered with the corpus,
//! which assigns their ids and validates cross references.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Ids
// ============================================================================

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Placeholder carried by entries that were never registered
            pub(crate) const UNREGISTERED: Self = Self(u32::MAX);

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position in the owning corpus table
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Index of a [`DimensionDefinition`] in its corpus
    DefinitionId
);
catalog_id!(
    /// Index of a [`Unit`] in its corpus
    UnitId
);
catalog_id!(
    /// Index of a [`Prefix`] in its corpus
    PrefixId
);
catalog_id!(
    /// Index of a [`MeasurementSystem`] in its corpus
    SystemId
);

// ============================================================================
// Dimension definitions
// ============================================================================

/// One parsed factor of a derived definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedComponent {
    pub definition: DefinitionId,
    pub power: i32,
}

/// A kind of measurable quantity: length, time, speed...
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionDefinition {
    pub(crate) id: DefinitionId,
    pub key: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub aliases: Vec<String>,
    pub is_dimensionless: bool,
    pub vector: bool,
    pub(crate) derived_string: Option<String>,
    pub(crate) derived: Vec<DerivedComponent>,
}

impl DimensionDefinition {
    /// A base definition
    pub fn new(key: impl Into<String>) -> Self {
        DimensionDefinition {
            id: DefinitionId::UNREGISTERED,
            key: key.into(),
            name: None,
            symbol: None,
            aliases: Vec::new(),
            is_dimensionless: false,
            vector: false,
            derived_string: None,
            derived: Vec::new(),
        }
    }

    /// A definition derived from others, e.g. `length/time`
    pub fn derived(key: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut def = Self::new(key);
        def.derived_string = Some(expression.into());
        def
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn dimensionless(mut self) -> Self {
        self.is_dimensionless = true;
        self
    }

    pub fn vector(mut self) -> Self {
        self.vector = true;
        self
    }

    #[inline]
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    #[inline]
    pub fn is_derived(&self) -> bool {
        self.derived_string.is_some()
    }

    #[inline]
    pub fn derived_string(&self) -> Option<&str> {
        self.derived_string.as_deref()
    }

    /// Components parsed from the derived expression, empty for base definitions
    #[inline]
    pub fn components(&self) -> &[DerivedComponent] {
        &self.derived
    }
}

// ============================================================================
// Units
// ============================================================================

/// A unit of one dimension definition, scaled against its coherent base
///
/// A value `v` in this unit equals `v * factor + offset` in the coherent
/// base unit of the owning definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub key: String,
    pub symbol: String,
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub dimension: DefinitionId,
    pub factor: f64,
    pub offset: f64,
    pub systems: Vec<SystemId>,
    pub is_rare: bool,
    pub is_estimation: bool,
}

impl Unit {
    pub fn new(
        key: impl Into<String>,
        symbol: impl Into<String>,
        dimension: DefinitionId,
        factor: f64,
    ) -> Self {
        Unit {
            id: UnitId::UNREGISTERED,
            key: key.into(),
            symbol: symbol.into(),
            name: None,
            aliases: Vec::new(),
            dimension,
            factor,
            offset: 0.0,
            systems: Vec::new(),
            is_rare: false,
            is_estimation: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn in_system(mut self, system: SystemId) -> Self {
        if !self.systems.contains(&system) {
            self.systems.push(system);
        }
        self
    }

    pub fn rare(mut self) -> Self {
        self.is_rare = true;
        self
    }

    pub fn estimated(mut self) -> Self {
        self.is_estimation = true;
        self
    }

    #[inline]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// The coherent unit of its definition: factor 1, no offset
    #[inline]
    pub fn is_coherent(&self) -> bool {
        self.factor == 1.0 && self.offset == 0.0
    }

    /// Text used when printing the unit in full
    #[inline]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

// ============================================================================
// Prefixes
// ============================================================================

/// Origin of a prefix, in comparer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrefixType {
    /// kilo, milli, micro...
    Si,
    /// kibi, mebi...
    SiBinary,
    /// myria, hebdo...
    SiUnofficial,
    /// kilo-as-1024 and friends
    BinaryUnofficial,
}

impl PrefixType {
    #[inline]
    pub fn is_unofficial(self) -> bool {
        matches!(self, PrefixType::SiUnofficial | PrefixType::BinaryUnofficial)
    }
}

/// A multiplicative unit prefix
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub(crate) id: PrefixId,
    pub key: String,
    pub symbol: String,
    pub aliases: Vec<String>,
    pub factor: f64,
    pub prefix_type: PrefixType,
    pub is_rare: bool,
}

impl Prefix {
    pub fn new(
        key: impl Into<String>,
        symbol: impl Into<String>,
        factor: f64,
        prefix_type: PrefixType,
    ) -> Self {
        Prefix {
            id: PrefixId::UNREGISTERED,
            key: key.into(),
            symbol: symbol.into(),
            aliases: Vec::new(),
            factor,
            prefix_type,
            is_rare: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn rare(mut self) -> Self {
        self.is_rare = true;
        self
    }

    #[inline]
    pub fn id(&self) -> PrefixId {
        self.id
    }
}

// ============================================================================
// Measurement systems
// ============================================================================

/// A named family of units, optionally nested under a parent system
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSystem {
    pub(crate) id: SystemId,
    pub key: String,
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub(crate) parent: Option<SystemId>,
}

impl MeasurementSystem {
    pub fn root(key: impl Into<String>) -> Self {
        MeasurementSystem {
            id: SystemId::UNREGISTERED,
            key: key.into(),
            name: None,
            aliases: Vec::new(),
            parent: None,
        }
    }

    pub fn child_of(key: impl Into<String>, parent: SystemId) -> Self {
        let mut system = Self::root(key);
        system.parent = Some(parent);
        system
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[inline]
    pub fn id(&self) -> SystemId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<SystemId> {
        self.parent
    }
}
