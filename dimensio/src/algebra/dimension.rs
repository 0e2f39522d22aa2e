//! Dimensions: one unit, an optional prefix and an integer power
//!
//! Also hosts unit identifier resolution (`km`, `kilometre`, `s^-1`,
//! `KiB`) against the visible part of a corpus.

use crate::corpus::{Corpus, DefinitionId, Prefix, PrefixId, Signature, Unit, UnitId, split_power};
use crate::error::{QuantityError, Result};
use crate::finder::compare::compare_prefixes;
use serde::{Deserialize, Serialize};

/// One factor of a composite unit, e.g. `km^2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub unit: UnitId,
    pub prefix: Option<PrefixId>,
    pub power: i32,
}

impl Dimension {
    #[inline]
    pub fn new(unit: UnitId, power: i32) -> Self {
        Dimension { unit, prefix: None, power }
    }

    #[inline]
    pub fn prefixed(unit: UnitId, prefix: PrefixId, power: i32) -> Self {
        Dimension { unit, prefix: Some(prefix), power }
    }

    /// Same unit and same prefix, whatever the power
    #[inline]
    pub fn same_unit(&self, other: &Dimension) -> bool {
        self.unit == other.unit && self.prefix == other.prefix
    }

    #[inline]
    pub fn with_power(self, power: i32) -> Self {
        Dimension { power, ..self }
    }

    /// Owning dimension definition of the unit
    #[inline]
    pub fn definition(&self, corpus: &Corpus) -> DefinitionId {
        corpus.unit(self.unit).dimension
    }

    /// Factor of unit times prefix, ignoring the power
    pub fn unit_factor(&self, corpus: &Corpus) -> f64 {
        let prefix = self.prefix.map_or(1.0, |p| corpus.prefix(p).factor);
        corpus.unit(self.unit).factor * prefix
    }

    /// Factor to the coherent base, power included
    pub fn scale(&self, corpus: &Corpus) -> f64 {
        self.unit_factor(corpus).powi(self.power)
    }

    /// Resolve an identifier such as `km`, `hour`, `s^-1` or `KiB`
    ///
    /// A whole unit spelled with matching case wins, then a prefix split,
    /// then a whole unit matched ignoring case. Among splits the longest
    /// prefix spelling wins, then the prefix comparer.
    pub fn parse(identifier: &str, corpus: &Corpus) -> Result<Dimension> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::BlankQuery);
        }
        let unknown = || QuantityError::UnknownUnit(identifier.to_string());
        let (name, power) = split_power(trimmed).ok_or_else(unknown)?;

        let finder = corpus.finder();
        if let Some(unit) = finder.find_exact_matching_case::<Unit>(name)? {
            return Ok(Dimension::new(unit.id(), power));
        }

        let mut best: Option<(usize, &Prefix, &Unit)> = None;
        for prefix in corpus.prefixes().iter().filter(|p| corpus.prefix_filter(p)) {
            for (spelling, rest) in prefix_splits(prefix, name) {
                if rest.is_empty() {
                    continue;
                }
                let Some(unit) = finder.find_exact::<Unit>(rest)? else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((len, current, _)) => {
                        spelling > len
                            || (spelling == len && compare_prefixes(prefix, current).is_lt())
                    }
                };
                if better {
                    best = Some((spelling, prefix, unit));
                }
            }
        }

        if let Some((_, prefix, unit)) = best {
            return Ok(Dimension::prefixed(unit.id(), prefix.id(), power));
        }
        finder
            .find_exact::<Unit>(name)?
            .map(|unit| Dimension::new(unit.id(), power))
            .ok_or_else(unknown)
    }
}

/// Ways `name` can start with `prefix`: symbol case-sensitively, key and
/// aliases ignoring case. Yields the length of the matched spelling and
/// the remainder.
fn prefix_splits<'n>(prefix: &Prefix, name: &'n str) -> Vec<(usize, &'n str)> {
    let mut splits = Vec::new();
    if let Some(rest) = name.strip_prefix(prefix.symbol.as_str()) {
        splits.push((prefix.symbol.len(), rest));
    }
    for spelling in std::iter::once(&prefix.key).chain(&prefix.aliases) {
        if let Some(head) = name.get(..spelling.len())
            && head.eq_ignore_ascii_case(spelling)
        {
            splits.push((spelling.len(), &name[spelling.len()..]));
        }
    }
    splits
}

/// Base-dimension signature of a dimension list
pub fn signature_of(dimensions: &[Dimension], corpus: &Corpus) -> Signature {
    let mut signature = Signature::new();
    for dim in dimensions {
        corpus.accumulate_signature(dim.definition(corpus), dim.power, &mut signature);
    }
    signature
}

/// Aggregate factor of a dimension list to its coherent base
pub fn aggregate_scale(dimensions: &[Dimension], corpus: &Corpus) -> f64 {
    dimensions.iter().map(|d| d.scale(corpus)).product()
}

/// Fold `incoming` into `dimensions`, merging same-unit entries
///
/// A same-unit entry with a different prefix is expressed in the prefix
/// already present; the returned factor corrects the value for that.
/// Zero powers are removed.
pub(crate) fn merge_into(
    dimensions: &mut Vec<Dimension>,
    incoming: impl IntoIterator<Item = Dimension>,
    corpus: &Corpus,
) -> Result<f64> {
    let mut factor = 1.0;
    for dim in incoming {
        match dimensions.iter_mut().find(|d| d.unit == dim.unit) {
            Some(existing) => {
                if existing.prefix != dim.prefix {
                    let ratio = dim.unit_factor(corpus) / existing.unit_factor(corpus);
                    factor *= ratio.powi(dim.power);
                }
                existing.power = existing.power.checked_add(dim.power).ok_or_else(|| {
                    QuantityError::InvalidOperation("dimension power out of range".to_string())
                })?;
            }
            None => dimensions.push(dim),
        }
    }
    dimensions.retain(|d| d.power != 0);
    Ok(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Options;

    fn corpus() -> Corpus {
        Corpus::bootstrap().unwrap()
    }

    fn unit(corpus: &Corpus, key: &str) -> UnitId {
        corpus.unit_id(key).unwrap()
    }

    fn prefix(corpus: &Corpus, key: &str) -> PrefixId {
        corpus.prefix_id(key).unwrap()
    }

    #[test]
    fn test_parse_whole_units() {
        let corpus = corpus();
        let d = Dimension::parse("min", &corpus).unwrap();
        assert_eq!(d, Dimension::new(unit(&corpus, "minute"), 1));
        let d = Dimension::parse("km/h", &corpus).unwrap();
        assert_eq!(d.unit, unit(&corpus, "kilometre-per-hour"));
        let d = Dimension::parse("cd", &corpus).unwrap();
        assert_eq!(d.unit, unit(&corpus, "candela"));
    }

    #[test]
    fn test_parse_prefixed() {
        let corpus = corpus();
        let km = Dimension::parse("km", &corpus).unwrap();
        assert_eq!(km, Dimension::prefixed(unit(&corpus, "metre"), prefix(&corpus, "kilo"), 1));

        let kilometre = Dimension::parse("kilometre", &corpus).unwrap();
        assert_eq!(kilometre, km);

        let ms = Dimension::parse("ms", &corpus).unwrap();
        assert_eq!(ms.prefix, Some(prefix(&corpus, "milli")));
        assert_eq!(ms.unit, unit(&corpus, "second"));

        let mega = Dimension::parse("Mm", &corpus).unwrap();
        assert_eq!(mega.prefix, Some(prefix(&corpus, "mega")));
    }

    #[test]
    fn test_parse_prefix_before_case_folding() {
        let corpus = corpus();
        // pascal is "Pa" and hectare is "ha"; neither matches these spellings
        let pa = Dimension::parse("pA", &corpus).unwrap();
        assert_eq!(pa, Dimension::prefixed(unit(&corpus, "ampere"), prefix(&corpus, "pico"), 1));
        let ha = Dimension::parse("hA", &corpus).unwrap();
        assert_eq!(ha, Dimension::prefixed(unit(&corpus, "ampere"), prefix(&corpus, "hecto"), 1));

        let pascal = Dimension::parse("Pa", &corpus).unwrap();
        assert_eq!(pascal, Dimension::new(unit(&corpus, "pascal"), 1));
        let hectare = Dimension::parse("ha", &corpus).unwrap();
        assert_eq!(hectare, Dimension::new(unit(&corpus, "hectare"), 1));
    }

    #[test]
    fn test_parse_falls_back_to_case_insensitive_unit() {
        let corpus = corpus();
        let kg = Dimension::parse("KG", &corpus).unwrap();
        assert_eq!(kg, Dimension::new(unit(&corpus, "kilogram"), 1));
        let metre = Dimension::parse("METRE^2", &corpus).unwrap();
        assert_eq!(metre, Dimension::new(unit(&corpus, "metre"), 2));
    }

    #[test]
    fn test_parse_longest_prefix() {
        let corpus = corpus();
        let mib = Dimension::parse("MiB", &corpus).unwrap();
        assert_eq!(mib.prefix, Some(prefix(&corpus, "mebi")));
        assert_eq!(mib.unit, unit(&corpus, "byte"));

        let dam = Dimension::parse("dam", &corpus).unwrap();
        assert_eq!(dam.prefix, Some(prefix(&corpus, "deca")));
    }

    #[test]
    fn test_parse_power() {
        let corpus = corpus();
        let d = Dimension::parse("h^-1", &corpus).unwrap();
        assert_eq!(d, Dimension::new(unit(&corpus, "hour"), -1));
        let d = Dimension::parse("cm^3", &corpus).unwrap();
        assert_eq!(d.power, 3);
        assert_eq!(d.prefix, Some(prefix(&corpus, "centi")));
    }

    #[test]
    fn test_parse_unknown() {
        let corpus = corpus();
        assert!(matches!(
            Dimension::parse("furlongs", &corpus),
            Err(QuantityError::UnknownUnit(_))
        ));
        assert!(matches!(Dimension::parse("m^x", &corpus), Err(QuantityError::UnknownUnit(_))));
        assert!(matches!(Dimension::parse(" ", &corpus), Err(QuantityError::BlankQuery)));
        // a prefix alone is not a unit
        assert!(Dimension::parse("kilo", &corpus).is_err());
    }

    #[test]
    fn test_parse_respects_filters() {
        let mut corpus = corpus();
        assert!(Dimension::parse("KB", &corpus).is_err());
        corpus.set_options(Options::permissive());
        let kb = Dimension::parse("KB", &corpus).unwrap();
        assert_eq!(kb.prefix, Some(prefix(&corpus, "binary-kilo")));
    }

    #[test]
    fn test_scale() {
        let corpus = corpus();
        let km2 = Dimension::parse("km^2", &corpus).unwrap();
        assert!((km2.scale(&corpus) - 1e6).abs() < 1e-6);
        assert_eq!(km2.definition(&corpus), corpus.definition_id("length").unwrap());
    }

    #[test]
    fn test_merge_rescales_prefix() {
        let corpus = corpus();
        let km = Dimension::parse("km", &corpus).unwrap();
        let m = Dimension::parse("m", &corpus).unwrap();
        let mut dims = vec![km];
        let factor = merge_into(&mut dims, [m], &corpus).unwrap();
        assert_eq!(dims, vec![km.with_power(2)]);
        assert!((factor - 1e-3).abs() < 1e-15);

        let factor = merge_into(&mut dims, [km.with_power(-2)], &corpus).unwrap();
        assert!(dims.is_empty());
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_signature_of() {
        let corpus = corpus();
        let length = corpus.definition_id("length").unwrap();
        let dims = [
            Dimension::parse("km/h", &corpus).unwrap(),
            Dimension::parse("s", &corpus).unwrap(),
        ];
        assert_eq!(signature_of(&dims, &corpus), Signature::from([(length, 1)]));
        let rad = [Dimension::parse("rad", &corpus).unwrap()];
        assert!(signature_of(&rad, &corpus).is_empty());
    }
}
