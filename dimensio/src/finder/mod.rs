//! Catalog search
//!
//! A [`Finder`] answers three kinds of query over any [`Catalogued`] type:
//!
//! - `find_exact`: case-insensitive equality with the key, name, symbol
//!   or an alias
//! - `find_exact_matching_case`: the same, but only with matching case
//! - `find_partial`: case-insensitive substring match, narrowed by an
//!   optional per-type hint
//! - `find_all_partial`: every partial match, best first
//!
//! Only entries that pass the corpus filters are considered. Candidates
//! are ranked by how closely the query matched (exact, then prefix, then
//! substring) and within a tier by the type's comparer.

pub mod compare;

use crate::corpus::{
    Corpus, DefinitionId, DimensionDefinition, MeasurementSystem, Prefix, PrefixId, PrefixType,
    SystemId, Unit, UnitId,
};
use crate::error::{QuantityError, Result};
use std::cmp::Ordering;
use tracing::trace;

/// A corpus table the finder can search
pub trait Catalogued: Sized {
    type Id: Copy + Eq + std::fmt::Debug;
    /// Narrows partial searches; `()` when the type has no hint
    type Hint;

    const KIND: &'static str;

    fn table(corpus: &Corpus) -> &[Self];
    fn id(&self) -> Self::Id;
    fn key(&self) -> &str;
    /// Every spelling the entry answers to
    fn search_terms(&self) -> impl Iterator<Item = &str>;
    fn is_visible(&self, corpus: &Corpus) -> bool;
    fn matches_hint(&self, hint: &Self::Hint, corpus: &Corpus) -> bool;
    fn compare(&self, other: &Self, corpus: &Corpus) -> Ordering;
}

impl Catalogued for DimensionDefinition {
    type Id = DefinitionId;
    type Hint = ();
    const KIND: &'static str = "dimension";

    fn table(corpus: &Corpus) -> &[Self] {
        corpus.definitions()
    }

    fn id(&self) -> DefinitionId {
        self.id()
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn search_terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str())
            .chain(self.name.as_deref())
            .chain(self.symbol.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
    }

    fn is_visible(&self, corpus: &Corpus) -> bool {
        corpus.dimension_filter(self)
    }

    fn matches_hint(&self, _hint: &(), _corpus: &Corpus) -> bool {
        true
    }

    fn compare(&self, other: &Self, _corpus: &Corpus) -> Ordering {
        compare::compare_definitions(self, other)
    }
}

impl Catalogued for Unit {
    type Id = UnitId;
    /// Owning dimension definition
    type Hint = DefinitionId;
    const KIND: &'static str = "unit";

    fn table(corpus: &Corpus) -> &[Self] {
        corpus.units()
    }

    fn id(&self) -> UnitId {
        self.id()
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn search_terms(&self) -> impl Iterator<Item = &str> {
        [self.key.as_str(), self.symbol.as_str()]
            .into_iter()
            .chain(self.name.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
    }

    fn is_visible(&self, corpus: &Corpus) -> bool {
        corpus.unit_filter(self)
            && corpus
                .get_definition(self.dimension)
                .is_some_and(|d| corpus.dimension_filter(d))
    }

    fn matches_hint(&self, hint: &DefinitionId, _corpus: &Corpus) -> bool {
        self.dimension == *hint
    }

    fn compare(&self, other: &Self, _corpus: &Corpus) -> Ordering {
        compare::compare_units(self, other)
    }
}

impl Catalogued for Prefix {
    type Id = PrefixId;
    type Hint = PrefixType;
    const KIND: &'static str = "prefix";

    fn table(corpus: &Corpus) -> &[Self] {
        corpus.prefixes()
    }

    fn id(&self) -> PrefixId {
        self.id()
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn search_terms(&self) -> impl Iterator<Item = &str> {
        [self.key.as_str(), self.symbol.as_str()]
            .into_iter()
            .chain(self.aliases.iter().map(String::as_str))
    }

    fn is_visible(&self, corpus: &Corpus) -> bool {
        corpus.prefix_filter(self)
    }

    fn matches_hint(&self, hint: &PrefixType, _corpus: &Corpus) -> bool {
        self.prefix_type == *hint
    }

    fn compare(&self, other: &Self, _corpus: &Corpus) -> Ordering {
        compare::compare_prefixes(self, other)
    }
}

impl Catalogued for MeasurementSystem {
    type Id = SystemId;
    /// Ancestor system: only the system itself and its descendants match
    type Hint = SystemId;
    const KIND: &'static str = "measurement system";

    fn table(corpus: &Corpus) -> &[Self] {
        corpus.systems()
    }

    fn id(&self) -> SystemId {
        self.id()
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn search_terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str())
            .chain(self.name.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
    }

    fn is_visible(&self, corpus: &Corpus) -> bool {
        corpus.system_filter(self)
    }

    fn matches_hint(&self, hint: &SystemId, corpus: &Corpus) -> bool {
        corpus.ancestors(self.id()).any(|s| s.id() == *hint)
    }

    fn compare(&self, other: &Self, corpus: &Corpus) -> Ordering {
        compare::compare_systems(corpus, self, other)
    }
}

/// How closely a query matched an entry; lower is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    Exact,
    ExactIgnoringCase,
    Prefix,
    Substring,
}

fn match_tier<'t>(
    terms: impl Iterator<Item = &'t str>,
    query: &str,
    lowered: &str,
) -> Option<MatchTier> {
    terms
        .filter_map(|term| {
            if term == query {
                return Some(MatchTier::Exact);
            }
            let term = term.to_lowercase();
            if term == lowered {
                Some(MatchTier::ExactIgnoringCase)
            } else if term.starts_with(lowered) {
                Some(MatchTier::Prefix)
            } else if term.contains(lowered) {
                Some(MatchTier::Substring)
            } else {
                None
            }
        })
        .min()
}

/// Search entry point borrowed from a [`Corpus`]
#[derive(Debug, Clone, Copy)]
pub struct Finder<'a> {
    corpus: &'a Corpus,
}

impl<'a> Finder<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Finder { corpus }
    }

    #[inline]
    pub fn corpus(&self) -> &'a Corpus {
        self.corpus
    }

    /// The best visible entry equal to `query` (ignoring case) on any term
    ///
    /// A case-sensitive hit outranks one that only matches ignoring case,
    /// so `M` finds mega and `m` finds milli.
    pub fn find_exact<T: Catalogued>(&self, query: &str) -> Result<Option<&'a T>> {
        let query = checked_query(query)?;
        let found = self
            .ranked::<T>(query, None, |tier| tier <= MatchTier::ExactIgnoringCase)
            .into_iter()
            .next();
        trace!(kind = T::KIND, query, found = ?found.map(|e| e.key()), "exact search");
        Ok(found)
    }

    /// The best visible entry spelled exactly `query`, case included
    pub fn find_exact_matching_case<T: Catalogued>(&self, query: &str) -> Result<Option<&'a T>> {
        let query = checked_query(query)?;
        let found = self
            .ranked::<T>(query, None, |tier| tier == MatchTier::Exact)
            .into_iter()
            .next();
        trace!(kind = T::KIND, query, found = ?found.map(|e| e.key()), "case-sensitive search");
        Ok(found)
    }

    /// The best visible entry containing `query` (ignoring case)
    pub fn find_partial<T: Catalogued>(
        &self,
        query: &str,
        hint: Option<&T::Hint>,
    ) -> Result<Option<&'a T>> {
        let query = checked_query(query)?;
        let found = self.ranked::<T>(query, hint, |_| true).into_iter().next();
        trace!(kind = T::KIND, query, found = ?found.map(|e| e.key()), "partial search");
        Ok(found)
    }

    /// Every visible entry containing `query`, best first
    pub fn find_all_partial<T: Catalogued>(&self, query: &str) -> Result<Vec<&'a T>> {
        let query = checked_query(query)?;
        let found = self.ranked::<T>(query, None, |_| true);
        trace!(kind = T::KIND, query, count = found.len(), "partial search (all)");
        Ok(found)
    }

    fn ranked<T: Catalogued>(
        &self,
        query: &str,
        hint: Option<&T::Hint>,
        accept: impl Fn(MatchTier) -> bool,
    ) -> Vec<&'a T> {
        let corpus = self.corpus;
        let lowered = query.to_lowercase();

        let mut hits: Vec<(MatchTier, &'a T)> = T::table(corpus)
            .iter()
            .filter(|entry| entry.is_visible(corpus))
            .filter(|entry| hint.is_none_or(|h| entry.matches_hint(h, corpus)))
            .filter_map(|entry| {
                match_tier(entry.search_terms(), query, &lowered)
                    .filter(|tier| accept(*tier))
                    .map(|tier| (tier, entry))
            })
            .collect();

        hits.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| a.compare(b, corpus)));
        hits.into_iter().map(|(_, entry)| entry).collect()
    }
}

fn checked_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        Err(QuantityError::BlankQuery)
    } else {
        Ok(query)
    }
}
