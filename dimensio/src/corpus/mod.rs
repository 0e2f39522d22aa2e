//! The Corpus: registry of dimension definitions, units, prefixes and systems
//!
//! A `Corpus` is an explicit context value. It owns four tables indexed by
//! typed ids, a case-insensitive key index per table, and the [`Options`]
//! deciding what lookups may see. Registration validates every cross
//! reference so that:
//!
//! - derived definitions only reference registered definitions and never
//!   form a cycle
//! - system parent chains are acyclic
//! - unit and prefix factors are strictly positive
//!
//! Ids handed out by one corpus index into its tables; accessors taking an
//! id panic when given an id from another corpus, the same way slice
//! indexing does.

mod derived;
mod entry;
pub mod filter;
pub mod options;
pub mod si;

pub use entry::{
    DefinitionId, DerivedComponent, DimensionDefinition, MeasurementSystem, Prefix, PrefixId,
    PrefixType, SystemId, Unit, UnitId,
};
pub use options::Options;

pub(crate) use derived::split_power;

use crate::error::{QuantityError, Result};
use crate::finder::Finder;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Base-dimension signature: base definition -> integer power
///
/// Derived definitions are flattened, dimensionless definitions and zero
/// powers are dropped. Two dimension lists are commensurable exactly when
/// their signatures are equal.
pub type Signature = BTreeMap<DefinitionId, i32>;

/// Registry of everything the engine knows about units
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    definitions: Vec<DimensionDefinition>,
    units: Vec<Unit>,
    prefixes: Vec<Prefix>,
    systems: Vec<MeasurementSystem>,
    root_systems: Vec<SystemId>,
    definition_keys: FxHashMap<String, DefinitionId>,
    unit_keys: FxHashMap<String, UnitId>,
    prefix_keys: FxHashMap<String, PrefixId>,
    system_keys: FxHashMap<String, SystemId>,
    options: Options,
}

fn index_key(key: &str) -> String {
    key.to_lowercase()
}

fn check_key(kind: &'static str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(QuantityError::InvalidArgument(format!("{kind} key must not be blank")));
    }
    Ok(())
}

fn check_factor(what: String, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(QuantityError::NonPositiveFactor { what, value })
    }
}

impl Corpus {
    /// An empty corpus with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// A corpus preloaded with the built-in SI catalog
    pub fn bootstrap() -> Result<Self> {
        si::bootstrap()
    }

    /// Search entry point over this corpus
    pub fn finder(&self) -> Finder<'_> {
        Finder::new(self)
    }

    // ========================================================================
    // Options
    // ========================================================================

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Restore default visibility
    pub fn reset_options(&mut self) {
        debug!("resetting corpus options to defaults");
        self.options.reset_to_defaults();
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a dimension definition, parsing its derived expression
    pub fn add_definition(&mut self, mut definition: DimensionDefinition) -> Result<DefinitionId> {
        check_key("dimension", &definition.key)?;
        let index = index_key(&definition.key);
        if self.definition_keys.contains_key(&index) {
            warn!(key = %definition.key, "rejected duplicate dimension definition");
            return Err(QuantityError::DuplicateKey {
                kind: "dimension",
                key: definition.key,
            });
        }

        definition.derived = match definition.derived_string.as_deref() {
            Some(expression) => derived::parse_derived(expression, |k| self.definition_id(k))
                .inspect_err(|e| {
                    warn!(key = %definition.key, error = %e, "rejected derived definition")
                })?,
            None => Vec::new(),
        };

        let id = DefinitionId::from_index(self.definitions.len());
        definition.id = id;
        debug!(
            key = %definition.key,
            derived = ?definition.derived_string,
            "registered dimension definition"
        );
        self.definition_keys.insert(index, id);
        self.definitions.push(definition);
        Ok(id)
    }

    /// Replace (or clear) the derived expression of a registered definition
    ///
    /// Fails without modifying the corpus when the expression is invalid or
    /// would make the definition depend on itself.
    pub fn rederive_definition(
        &mut self,
        id: DefinitionId,
        expression: Option<&str>,
    ) -> Result<()> {
        let key = self.definition(id).key.clone();
        let components = match expression {
            Some(expression) => {
                let components =
                    derived::parse_derived(expression, |k| self.definition_id(k))?;
                if components.iter().any(|c| self.depends_on(c.definition, id)) {
                    warn!(key = %key, expression, "rejected cyclic derivation");
                    return Err(QuantityError::InvalidDerivation {
                        expression: expression.to_string(),
                        reason: format!("`{key}` would depend on itself"),
                    });
                }
                components
            }
            None => Vec::new(),
        };

        debug!(key = %key, expression, "re-derived dimension definition");
        let definition = &mut self.definitions[id.index()];
        definition.derived_string = expression.map(str::to_string);
        definition.derived = components;
        Ok(())
    }

    /// Register a unit of an existing definition
    pub fn add_unit(&mut self, mut unit: Unit) -> Result<UnitId> {
        check_key("unit", &unit.key)?;
        check_factor(format!("factor of unit `{}`", unit.key), unit.factor)?;
        if !unit.offset.is_finite() {
            return Err(QuantityError::InvalidArgument(format!(
                "offset of unit `{}` must be finite",
                unit.key
            )));
        }
        if self.get_definition(unit.dimension).is_none() {
            return Err(QuantityError::UnknownEntry {
                kind: "dimension",
                key: unit.dimension.to_string(),
            });
        }
        if let Some(system) = unit.systems.iter().find(|s| self.get_system(**s).is_none()) {
            return Err(QuantityError::UnknownEntry {
                kind: "measurement system",
                key: system.to_string(),
            });
        }

        let index = index_key(&unit.key);
        if self.unit_keys.contains_key(&index) {
            warn!(key = %unit.key, "rejected duplicate unit");
            return Err(QuantityError::DuplicateKey { kind: "unit", key: unit.key });
        }

        let id = UnitId::from_index(self.units.len());
        unit.id = id;
        debug!(key = %unit.key, symbol = %unit.symbol, factor = unit.factor, "registered unit");
        self.unit_keys.insert(index, id);
        self.units.push(unit);
        Ok(id)
    }

    pub fn add_prefix(&mut self, mut prefix: Prefix) -> Result<PrefixId> {
        check_key("prefix", &prefix.key)?;
        check_factor(format!("factor of prefix `{}`", prefix.key), prefix.factor)?;

        let index = index_key(&prefix.key);
        if self.prefix_keys.contains_key(&index) {
            warn!(key = %prefix.key, "rejected duplicate prefix");
            return Err(QuantityError::DuplicateKey { kind: "prefix", key: prefix.key });
        }

        let id = PrefixId::from_index(self.prefixes.len());
        prefix.id = id;
        debug!(key = %prefix.key, factor = prefix.factor, "registered prefix");
        self.prefix_keys.insert(index, id);
        self.prefixes.push(prefix);
        Ok(id)
    }

    /// Register a measurement system; its parent must already exist
    pub fn add_system(&mut self, mut system: MeasurementSystem) -> Result<SystemId> {
        check_key("measurement system", &system.key)?;
        if let Some(parent) = system.parent
            && self.get_system(parent).is_none()
        {
            return Err(QuantityError::UnknownEntry {
                kind: "measurement system",
                key: parent.to_string(),
            });
        }

        let index = index_key(&system.key);
        if self.system_keys.contains_key(&index) {
            warn!(key = %system.key, "rejected duplicate measurement system");
            return Err(QuantityError::DuplicateKey {
                kind: "measurement system",
                key: system.key,
            });
        }

        let id = SystemId::from_index(self.systems.len());
        system.id = id;
        if system.parent.is_none() {
            self.root_systems.push(id);
        }
        debug!(key = %system.key, parent = ?system.parent, "registered measurement system");
        self.system_keys.insert(index, id);
        self.systems.push(system);
        Ok(id)
    }

    /// Move a system under a new parent (or make it a root)
    pub fn set_system_parent(&mut self, id: SystemId, parent: Option<SystemId>) -> Result<()> {
        let key = self.system(id).key.clone();
        if let Some(parent) = parent {
            if self.get_system(parent).is_none() {
                return Err(QuantityError::UnknownEntry {
                    kind: "measurement system",
                    key: parent.to_string(),
                });
            }
            if self.ancestors(parent).any(|s| s.id == id) {
                warn!(key = %key, "rejected cyclic system parent");
                return Err(QuantityError::SystemCycle(key));
            }
        }

        self.systems[id.index()].parent = parent;
        self.root_systems.retain(|r| *r != id);
        if parent.is_none() {
            self.root_systems.push(id);
        }
        debug!(key = %key, parent = ?parent, "re-parented measurement system");
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// # Panics
    /// If `id` was not issued by this corpus.
    #[inline]
    pub fn definition(&self, id: DefinitionId) -> &DimensionDefinition {
        &self.definitions[id.index()]
    }

    /// # Panics
    /// If `id` was not issued by this corpus.
    #[inline]
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    /// # Panics
    /// If `id` was not issued by this corpus.
    #[inline]
    pub fn prefix(&self, id: PrefixId) -> &Prefix {
        &self.prefixes[id.index()]
    }

    /// # Panics
    /// If `id` was not issued by this corpus.
    #[inline]
    pub fn system(&self, id: SystemId) -> &MeasurementSystem {
        &self.systems[id.index()]
    }

    #[inline]
    pub fn get_definition(&self, id: DefinitionId) -> Option<&DimensionDefinition> {
        self.definitions.get(id.index())
    }

    #[inline]
    pub fn get_unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    #[inline]
    pub fn get_prefix(&self, id: PrefixId) -> Option<&Prefix> {
        self.prefixes.get(id.index())
    }

    #[inline]
    pub fn get_system(&self, id: SystemId) -> Option<&MeasurementSystem> {
        self.systems.get(id.index())
    }

    /// Id of the definition with this key (case-insensitive)
    pub fn definition_id(&self, key: &str) -> Option<DefinitionId> {
        self.definition_keys.get(&index_key(key)).copied()
    }

    pub fn unit_id(&self, key: &str) -> Option<UnitId> {
        self.unit_keys.get(&index_key(key)).copied()
    }

    pub fn prefix_id(&self, key: &str) -> Option<PrefixId> {
        self.prefix_keys.get(&index_key(key)).copied()
    }

    pub fn system_id(&self, key: &str) -> Option<SystemId> {
        self.system_keys.get(&index_key(key)).copied()
    }

    #[inline]
    pub fn definitions(&self) -> &[DimensionDefinition] {
        &self.definitions
    }

    #[inline]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[inline]
    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    #[inline]
    pub fn systems(&self) -> &[MeasurementSystem] {
        &self.systems
    }

    /// Systems without a parent, in registration order
    #[inline]
    pub fn root_systems(&self) -> &[SystemId] {
        &self.root_systems
    }

    /// Units owned by a definition, in registration order
    pub fn units_of(&self, definition: DefinitionId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.dimension == definition)
    }

    /// The system itself followed by its parent chain up to the root
    pub fn ancestors(&self, id: SystemId) -> impl Iterator<Item = &MeasurementSystem> {
        let mut next = self.get_system(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.and_then(|p| self.get_system(p));
            Some(current)
        })
    }

    /// Number of parents above a system (0 for roots)
    pub fn system_depth(&self, id: SystemId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    // ========================================================================
    // Signatures
    // ========================================================================

    /// Base-dimension signature of one definition at power 1
    pub fn definition_signature(&self, id: DefinitionId) -> Signature {
        let mut signature = Signature::new();
        self.accumulate_signature(id, 1, &mut signature);
        signature
    }

    /// Add `power` times the flattened signature of `id` into `signature`
    pub(crate) fn accumulate_signature(
        &self,
        id: DefinitionId,
        power: i32,
        signature: &mut Signature,
    ) {
        let definition = self.definition(id);
        if definition.is_dimensionless || power == 0 {
            return;
        }
        if definition.is_derived() {
            for component in &definition.derived {
                self.accumulate_signature(
                    component.definition,
                    component.power.saturating_mul(power),
                    signature,
                );
            }
        } else {
            let entry = signature.entry(id).or_insert(0);
            *entry = entry.saturating_add(power);
            if *entry == 0 {
                signature.remove(&id);
            }
        }
    }

    /// Whether `from` reaches `target` through derived components
    fn depends_on(&self, from: DefinitionId, target: DefinitionId) -> bool {
        if from == target {
            return true;
        }
        self.definition(from)
            .derived
            .iter()
            .any(|c| self.depends_on(c.definition, target))
    }
}
