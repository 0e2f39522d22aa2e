//! Derived-unit simplification
//!
//! Rewrites a dimension list by replacing groups of atoms with a single
//! derived unit: `[m, s^-1]` becomes `[m/s]`, `[kg, m, s^-2]` becomes
//! `[N]`. Each rewrite consumes at least two atoms and inserts one, so the
//! total of absolute powers strictly decreases and the loop terminates.
//!
//! Candidate ranking: more atoms removed (consumed minus inserted), then
//! rewrites that leave the value unscaled, then units with factor 1, then
//! the unit comparer.
//! `[kg, m^2, s^-3]` therefore folds through newton and joule into watt
//! rather than into `(m/s)^2`.

use super::dimension::Dimension;
use super::quantity::Quantity;
use crate::corpus::{Corpus, DerivedComponent, Unit};
use crate::finder::compare::compare_units;
use tracing::debug;

/// Relative tolerance for treating a rewrite as scale-preserving
const COHERENCE_EPSILON: f64 = 1e-9;

/// A candidate rewrite for one derived unit
#[derive(Debug, Clone)]
struct Rewrite<'a> {
    unit: &'a Unit,
    power: i32,
    /// `(index into the dimension list, power removed from it)`
    consumed: Vec<(usize, i32)>,
    /// Net reduction of the total absolute power
    atoms: u64,
    /// Factor the value is multiplied by
    rescale: f64,
}

impl Rewrite<'_> {
    fn is_coherent(&self) -> bool {
        (self.rescale - 1.0).abs() <= COHERENCE_EPSILON
    }

    /// Higher is better; equal ranks fall back to candidate order
    fn rank(&self) -> (u64, bool, bool) {
        (self.atoms, self.is_coherent(), self.unit.is_coherent())
    }
}

/// Repeatedly folds atoms into visible derived units
#[derive(Debug, Clone)]
pub struct Simplifier<'a> {
    corpus: &'a Corpus,
    candidates: Vec<&'a Unit>,
}

impl<'a> Simplifier<'a> {
    /// Collect visible units of visible derived definitions, in comparer order
    pub fn new(corpus: &'a Corpus) -> Self {
        let mut candidates: Vec<&Unit> = corpus
            .units()
            .iter()
            .filter(|unit| corpus.unit_filter(unit))
            .filter(|unit| {
                let definition = corpus.definition(unit.dimension);
                definition.is_derived()
                    && !definition.components().is_empty()
                    && corpus.dimension_filter(definition)
            })
            .collect();
        candidates.sort_by(|a, b| compare_units(a, b));
        Simplifier { corpus, candidates }
    }

    pub fn simplify(&self, quantity: &Quantity) -> Quantity {
        let mut value = quantity.value();
        let mut dimensions = quantity.dimensions().to_vec();

        while let Some(rewrite) = self.best_rewrite(&dimensions) {
            debug!(
                unit = %rewrite.unit.key,
                power = rewrite.power,
                atoms = rewrite.atoms,
                "simplified dimensions"
            );
            value *= rewrite.rescale;
            dimensions = apply(&dimensions, &rewrite);
        }

        Quantity::new(value, dimensions)
    }

    fn best_rewrite(&self, dimensions: &[Dimension]) -> Option<Rewrite<'a>> {
        let mut best: Option<Rewrite<'a>> = None;
        for unit in &self.candidates {
            let Some(rewrite) = self.match_unit(unit, dimensions) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => rewrite.rank() > current.rank(),
            };
            if better {
                best = Some(rewrite);
            }
        }
        best
    }

    /// Largest `k` (positive preferred) such that `unit^k` can absorb atoms
    fn match_unit(&self, unit: &'a Unit, dimensions: &[Dimension]) -> Option<Rewrite<'a>> {
        let components = self.corpus.definition(unit.dimension).components();
        let footprint: u64 = components.iter().map(|c| u64::from(c.power.unsigned_abs())).sum();
        if footprint < 2 {
            return None;
        }

        let positive = self.pick(components, dimensions, 1);
        let negative = self.pick(components, dimensions, -1);
        let (sign, (k, picks)) = match (positive, negative) {
            (Some(p), Some(n)) if n.0 > p.0 => (-1, n),
            (Some(p), _) => (1, p),
            (None, Some(n)) => (-1, n),
            (None, None) => return None,
        };
        let power = sign * k;

        let mut rescale = 1.0 / unit.factor.powi(power);
        let mut consumed = Vec::with_capacity(picks.len());
        for (index, component) in picks {
            let removed = component.power * power;
            rescale *= dimensions[index].unit_factor(self.corpus).powi(removed);
            consumed.push((index, removed));
        }

        Some(Rewrite {
            unit,
            power,
            consumed,
            atoms: (footprint - 1) * u64::from(k.unsigned_abs()),
            rescale,
        })
    }

    /// For one sign, pair each component with a distinct dimension of the
    /// same definition and matching sign; returns the common multiplier
    fn pick(
        &self,
        components: &[DerivedComponent],
        dimensions: &[Dimension],
        sign: i32,
    ) -> Option<(i32, Vec<(usize, DerivedComponent)>)> {
        let mut used = vec![false; dimensions.len()];
        let mut k = i32::MAX;
        let mut picks = Vec::with_capacity(components.len());

        for component in components {
            let wanted = component.power.signum() * sign;
            let (index, dim) = dimensions
                .iter()
                .enumerate()
                .filter(|(i, d)| {
                    !used[*i]
                        && d.power.signum() == wanted
                        && d.definition(self.corpus) == component.definition
                })
                .max_by_key(|(i, d)| (d.power.unsigned_abs(), std::cmp::Reverse(*i)))?;
            used[index] = true;
            k = k.min((dim.power.unsigned_abs() / component.power.unsigned_abs()) as i32);
            picks.push((index, *component));
        }

        (k >= 1).then_some((k, picks))
    }
}

/// Remove consumed powers and insert the derived unit where the first
/// consumed atom stood
fn apply(dimensions: &[Dimension], rewrite: &Rewrite<'_>) -> Vec<Dimension> {
    let mut remaining = dimensions.to_vec();
    for &(index, removed) in &rewrite.consumed {
        remaining[index].power -= removed;
    }
    let insert_at = rewrite.consumed.iter().map(|(i, _)| *i).min().unwrap_or(0);

    let derived = Dimension::new(rewrite.unit.id(), rewrite.power);
    let mut result = Vec::with_capacity(remaining.len() + 1);
    for (index, dim) in remaining.into_iter().enumerate() {
        if index == insert_at {
            result.push(derived);
        }
        result.push(dim);
    }

    // Quantity::new merges a repeated derived unit and drops zero powers
    Quantity::new(1.0, result).dimensions().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Options;

    fn corpus() -> Corpus {
        Corpus::bootstrap().unwrap()
    }

    fn q(value: f64, ids: &[&str], corpus: &Corpus) -> Quantity {
        Quantity::parse(value, ids, corpus).unwrap()
    }

    fn keys(quantity: &Quantity, corpus: &Corpus) -> Vec<(String, i32)> {
        quantity
            .dimensions()
            .iter()
            .map(|d| (corpus.unit(d.unit).key.clone(), d.power))
            .collect()
    }

    fn assert_approx(actual: f64, expected: f64, msg: &str) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() < tolerance,
            "{msg}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_speed() {
        let corpus = corpus();
        let simplified = q(5.0, &["m", "s^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("metre-per-second".to_string(), 1)]);
        assert_eq!(simplified.value(), 5.0);
    }

    #[test]
    fn test_coherent_preference() {
        let corpus = corpus();
        let simplified = q(36.0, &["km", "h^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("kilometre-per-hour".to_string(), 1)]);
        assert_approx(simplified.value(), 36.0, "km/h stays unscaled");
    }

    #[test]
    fn test_newton() {
        let corpus = corpus();
        let simplified = q(2.0, &["kg", "m", "s^-2"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("newton".to_string(), 1)]);
        assert_approx(simplified.value(), 2.0, "value");
    }

    #[test]
    fn test_rescales_value() {
        let corpus = corpus();
        let simplified = q(1.0, &["g", "m", "s^-2"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("newton".to_string(), 1)]);
        assert_approx(simplified.value(), 1e-3, "gram rescaled");
    }

    #[test]
    fn test_negative_power() {
        let corpus = corpus();
        let simplified = q(4.0, &["s", "m^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("metre-per-second".to_string(), -1)]);
        assert_approx(simplified.value(), 4.0, "value");
    }

    #[test]
    fn test_leftover_atoms() {
        let corpus = corpus();
        let simplified = q(3.0, &["m", "s^-1", "A"], &corpus).simplify(&corpus);
        assert_eq!(
            keys(&simplified, &corpus),
            [("metre-per-second".to_string(), 1), ("ampere".to_string(), 1)]
        );
    }

    #[test]
    fn test_time_squared_untouched() {
        let corpus = corpus();
        let quantity = q(6.8, &["min^2"], &corpus);
        assert_eq!(quantity.simplify(&corpus), quantity);
    }

    #[test]
    fn test_single_atom_not_rewritten() {
        let corpus = corpus();
        let quantity = q(50.0, &["s^-1"], &corpus);
        assert_eq!(quantity.simplify(&corpus), quantity);
    }

    #[test]
    fn test_prefers_coherent_unit_when_rescaling() {
        let corpus = corpus();
        let simplified = q(3600.0, &["J", "min^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("watt".to_string(), 1)]);
        assert_approx(simplified.value(), 60.0, "J/min in W");
    }

    #[test]
    fn test_chained_rewrites() {
        let corpus = corpus();
        // after newton, joule and metre-per-second rank equally on [N, m, s^-1];
        // joule is taken because it sorts first by key
        let simplified = q(3.0, &["kg", "m^2", "s^-3"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("watt".to_string(), 1)]);
        assert_approx(simplified.value(), 3.0, "value");
    }

    #[test]
    fn test_speed_and_velocity_overlap() {
        let mut corpus = corpus();
        corpus.options_mut().allow_vector_dimensions = true;
        let velocity = corpus.definition_id("velocity").unwrap();
        corpus
            .add_unit(Unit::new("velocity-metre-per-second", "v m/s", velocity, 1.0))
            .unwrap();

        // both definitions are length/time; the unit comparer decides
        let simplified = q(5.0, &["m", "s^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("metre-per-second".to_string(), 1)]);
        assert_approx(simplified.value(), 5.0, "value");
    }

    #[test]
    fn test_equal_rank_uses_unit_comparer() {
        let mut corpus = corpus();
        corpus.options_mut().allow_vector_dimensions = true;
        let velocity = corpus.definition_id("velocity").unwrap();
        corpus
            .add_unit(Unit::new("directed-metre-per-second", "dir m/s", velocity, 1.0))
            .unwrap();
        let speed = corpus.definition_id("speed").unwrap();
        corpus
            .add_unit(Unit::new("approx-metre-per-second", "~m/s", speed, 1.0).estimated())
            .unwrap();

        let simplified = q(5.0, &["m", "s^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("directed-metre-per-second".to_string(), 1)]);

        // estimated units sort after exact ones whatever their key
        corpus.options_mut().use_estimated_units = true;
        let simplified = q(5.0, &["m", "s^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("directed-metre-per-second".to_string(), 1)]);

        // hiding vector definitions leaves the catalog unit
        corpus.options_mut().allow_vector_dimensions = false;
        let simplified = q(5.0, &["m", "s^-1"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("metre-per-second".to_string(), 1)]);
    }

    #[test]
    fn test_volume_over_area() {
        let corpus = corpus();
        let simplified = q(2.0, &["m", "m", "m"], &corpus).simplify(&corpus);
        assert_eq!(keys(&simplified, &corpus), [("cubic-metre".to_string(), 1)]);
    }

    #[test]
    fn test_idempotent() {
        let corpus = corpus();
        let cases: [&[&str]; 4] =
            [&["kg", "m^2", "s^-3"], &["km", "h^-1"], &["m", "m", "m"], &["s"]];
        for ids in cases {
            let once = q(1.5, ids, &corpus).simplify(&corpus);
            let twice = once.simplify(&corpus);
            assert_eq!(once, twice, "{ids:?}");
        }
    }

    #[test]
    fn test_derived_disabled() {
        let mut corpus = corpus();
        corpus.set_options(Options {
            allow_derived_dimensions: false,
            ..Options::default()
        });
        let quantity = q(5.0, &["m", "s^-1"], &corpus);
        assert_eq!(quantity.simplify(&corpus), quantity);
    }

    #[test]
    fn test_ignored_dimension() {
        let mut corpus = corpus();
        corpus.options_mut().ignore_dimension("speed");
        let quantity = q(5.0, &["m", "s^-1"], &corpus);
        assert_eq!(quantity.simplify(&corpus), quantity);
    }
}
