//! Visibility predicates
//!
//! Each catalog type has one filter deciding whether the current
//! [`Options`](super::Options) let it through. Filters only remove
//! candidates: enabling an option never hides an entry, disabling one
//! never reveals one.

use super::{Corpus, DimensionDefinition, MeasurementSystem, Prefix, Unit};

impl Corpus {
    /// Whether a dimension definition is visible
    pub fn dimension_filter(&self, definition: &DimensionDefinition) -> bool {
        let options = self.options();
        if definition.vector && !options.allow_vector_dimensions {
            return false;
        }
        if definition.is_derived() && !options.allow_derived_dimensions {
            return false;
        }
        !options.is_dimension_ignored(&definition.key)
    }

    /// Whether a unit is visible
    ///
    /// A unit in one or more systems is hidden only when every one of its
    /// systems is hidden. Units belonging to no system stay visible.
    pub fn unit_filter(&self, unit: &Unit) -> bool {
        let options = self.options();
        if unit.is_rare && !options.use_rare_units {
            return false;
        }
        if unit.is_estimation && !options.use_estimated_units {
            return false;
        }
        if unit.systems.is_empty() {
            return true;
        }
        unit.systems
            .iter()
            .filter_map(|id| self.get_system(*id))
            .any(|system| self.system_filter(system))
    }

    /// Whether units of a measurement system are visible
    ///
    /// Ignoring a system anywhere up the parent chain hides it, even when an
    /// ancestor is explicitly allowed.
    pub fn system_filter(&self, system: &MeasurementSystem) -> bool {
        let options = self.options();
        let mut allowed = options.allowed_systems_for_units.is_empty();

        for ancestor in self.ancestors(system.id()) {
            if options.is_system_ignored(&ancestor.key) {
                return false;
            }
            allowed |= options.is_system_allowed(&ancestor.key);
        }
        allowed
    }

    /// Whether a prefix is visible
    pub fn prefix_filter(&self, prefix: &Prefix) -> bool {
        let options = self.options();
        if prefix.prefix_type.is_unofficial() && !options.use_unofficial_prefixes {
            return false;
        }
        !(prefix.is_rare && !options.use_rare_prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{DefinitionId, Options, PrefixType, SystemId};
    use super::*;

    struct Fixture {
        corpus: Corpus,
        length: DefinitionId,
        speed: DefinitionId,
        velocity: DefinitionId,
        imperial: SystemId,
        us: SystemId,
        metric: SystemId,
    }

    fn fixture() -> Fixture {
        let mut corpus = Corpus::new();
        let length = corpus.add_definition(DimensionDefinition::new("length")).unwrap();
        corpus.add_definition(DimensionDefinition::new("time")).unwrap();
        let speed = corpus
            .add_definition(DimensionDefinition::derived("speed", "length/time"))
            .unwrap();
        let velocity = corpus
            .add_definition(DimensionDefinition::derived("velocity", "length/time").vector())
            .unwrap();
        let imperial = corpus.add_system(MeasurementSystem::root("imperial")).unwrap();
        let us = corpus
            .add_system(MeasurementSystem::child_of("us-customary", imperial))
            .unwrap();
        let metric = corpus.add_system(MeasurementSystem::root("metric")).unwrap();
        Fixture { corpus, length, speed, velocity, imperial, us, metric }
    }

    #[test]
    fn test_dimension_filter() {
        let mut f = fixture();
        let corpus = &mut f.corpus;
        assert!(corpus.dimension_filter(corpus.definition(f.length)));
        assert!(corpus.dimension_filter(corpus.definition(f.speed)));
        assert!(!corpus.dimension_filter(corpus.definition(f.velocity)));

        corpus.options_mut().allow_vector_dimensions = true;
        assert!(corpus.dimension_filter(corpus.definition(f.velocity)));

        corpus.options_mut().allow_derived_dimensions = false;
        assert!(!corpus.dimension_filter(corpus.definition(f.speed)));

        corpus.options_mut().ignore_dimension("LENGTH");
        assert!(!corpus.dimension_filter(corpus.definition(f.length)));
    }

    #[test]
    fn test_unit_filter_flags() {
        let f = fixture();
        let mut corpus = f.corpus;
        let furlong = corpus
            .add_unit(Unit::new("furlong", "fur", f.length, 201.168).rare())
            .unwrap();
        let cubit = corpus
            .add_unit(Unit::new("cubit", "cbt", f.length, 0.45).estimated())
            .unwrap();
        assert!(!corpus.unit_filter(corpus.unit(furlong)));
        assert!(!corpus.unit_filter(corpus.unit(cubit)));

        corpus.set_options(Options::permissive());
        assert!(corpus.unit_filter(corpus.unit(furlong)));
        assert!(corpus.unit_filter(corpus.unit(cubit)));
    }

    #[test]
    fn test_unit_filter_systems() {
        let f = fixture();
        let mut corpus = f.corpus;
        let foot = corpus
            .add_unit(Unit::new("foot", "ft", f.length, 0.3048).in_system(f.us))
            .unwrap();
        let metre = corpus
            .add_unit(
                Unit::new("metre", "m", f.length, 1.0)
                    .in_system(f.metric)
                    .in_system(f.imperial),
            )
            .unwrap();
        let span = corpus.add_unit(Unit::new("span", "sp", f.length, 0.2286)).unwrap();

        corpus.options_mut().ignore_system("imperial");
        assert!(!corpus.unit_filter(corpus.unit(foot)));
        assert!(corpus.unit_filter(corpus.unit(metre)));
        assert!(corpus.unit_filter(corpus.unit(span)));

        corpus.options_mut().ignore_system("metric");
        assert!(!corpus.unit_filter(corpus.unit(metre)));
        assert!(corpus.unit_filter(corpus.unit(span)));
    }

    #[test]
    fn test_system_filter() {
        let f = fixture();
        let mut corpus = f.corpus;
        assert!(corpus.system_filter(corpus.system(f.us)));

        corpus.options_mut().allow_system("imperial");
        assert!(corpus.system_filter(corpus.system(f.us)));
        assert!(corpus.system_filter(corpus.system(f.imperial)));
        assert!(!corpus.system_filter(corpus.system(f.metric)));

        // ignoring beats allowing
        corpus.options_mut().ignore_system("us-customary");
        assert!(!corpus.system_filter(corpus.system(f.us)));
        assert!(corpus.system_filter(corpus.system(f.imperial)));
    }

    #[test]
    fn test_prefix_filter() {
        let mut corpus = Corpus::new();
        let kilo = corpus
            .add_prefix(Prefix::new("kilo", "k", 1e3, PrefixType::Si))
            .unwrap();
        let myria = corpus
            .add_prefix(Prefix::new("myria", "my", 1e4, PrefixType::SiUnofficial))
            .unwrap();
        let hecto = corpus
            .add_prefix(Prefix::new("hecto", "h", 1e2, PrefixType::Si).rare())
            .unwrap();

        assert!(corpus.prefix_filter(corpus.prefix(kilo)));
        assert!(!corpus.prefix_filter(corpus.prefix(myria)));
        assert!(!corpus.prefix_filter(corpus.prefix(hecto)));

        corpus.options_mut().use_unofficial_prefixes = true;
        corpus.options_mut().use_rare_prefixes = true;
        assert!(corpus.prefix_filter(corpus.prefix(myria)));
        assert!(corpus.prefix_filter(corpus.prefix(hecto)));
    }
}
