//! Highlight configuration records and the per-record best-match cache.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Molecule;
use crate::search::SubstructureMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId(pub usize);

/// Stable row identity, independent of the row's current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

/// Identifier of a row-exclusion predicate in the host table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusionFlag(pub u32);

/// Payload-free purpose tag, used as part of the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurposeKind {
    SubstructureFilter,
    SimilarityFilter,
    Clustering,
    SimilarityToCurrentRow,
}

/// Registry key: one [`ColorInfo`] per structure column and purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HighlightKey {
    pub column: ColumnId,
    pub kind: PurposeKind,
}

/// Per-row similarity of a row's structure to each reference, computed by the
/// host when the similarity filter is set up.
pub type SimilarityScores = HashMap<RowId, Vec<f32>>;

#[derive(Debug, Clone)]
pub enum Purpose {
    SubstructureFilter,
    SimilarityFilter {
        threshold: f32,
        scores: Arc<SimilarityScores>,
    },
    Clustering,
    SimilarityToCurrentRow,
}

impl Purpose {
    pub fn kind(&self) -> PurposeKind {
        match self {
            Purpose::SubstructureFilter => PurposeKind::SubstructureFilter,
            Purpose::SimilarityFilter { .. } => PurposeKind::SimilarityFilter,
            Purpose::Clustering => PurposeKind::Clustering,
            Purpose::SimilarityToCurrentRow => PurposeKind::SimilarityToCurrentRow,
        }
    }
}

/// Which exclusion (row filter) an entry is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionLink {
    /// Row-independent purposes such as current-row similarity.
    Unbound,
    Flag(ExclusionFlag),
}

// ────────────────────────────────────────────────────────────────────────────
// Best-match cache
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of best-reference selection for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestMatch {
    Reference(usize),
    NoMatch,
}

/// Row-keyed memo of [`BestMatch`] results.
///
/// Slots are filled lazily and never recomputed; the cache only goes away with
/// the [`ColorInfo`] that owns it. A miss is computed outside the lock and
/// stored insert-if-absent, so two threads racing on the same row agree on
/// the stored value.
#[derive(Debug, Default)]
pub struct BestMatchCache {
    slots: RwLock<HashMap<RowId, BestMatch>>,
}

impl BestMatchCache {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::with_capacity(rows)),
        }
    }

    pub fn get(&self, row: RowId) -> Option<BestMatch> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&row)
            .copied()
    }

    pub fn get_or_compute(&self, row: RowId, compute: impl FnOnce() -> BestMatch) -> BestMatch {
        if let Some(hit) = self.get(row) {
            return hit;
        }
        let value = compute();
        *self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(row)
            .or_insert(value)
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).capacity()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ColorInfo
// ────────────────────────────────────────────────────────────────────────────

/// Highlight configuration for one `(structure column, purpose)` pair.
///
/// `references` never changes after construction; a new query means a new
/// `ColorInfo` (and with it a fresh best-match cache).
#[derive(Debug)]
pub struct ColorInfo {
    pub(crate) column: ColumnId,
    purpose: Purpose,
    exclusion: ExclusionLink,
    pub(crate) enabled: bool,
    pub(crate) inverse: bool,
    references: Arc<[Molecule]>,
    best_match: Option<BestMatchCache>,
}

impl ColorInfo {
    fn new(
        column: ColumnId,
        purpose: Purpose,
        exclusion: ExclusionLink,
        inverse: bool,
        references: Vec<Molecule>,
        row_count: usize,
    ) -> Self {
        let best_match = (references.len() > 1).then(|| BestMatchCache::with_capacity(row_count));
        Self {
            column,
            purpose,
            exclusion,
            enabled: true,
            inverse,
            references: references.into(),
            best_match,
        }
    }

    /// Substructure filter: `fragments` are the query fragments of the filter.
    pub fn substructure_filter(
        column: ColumnId,
        flag: ExclusionFlag,
        inverse: bool,
        fragments: Vec<Molecule>,
        row_count: usize,
    ) -> Self {
        Self::new(
            column,
            Purpose::SubstructureFilter,
            ExclusionLink::Flag(flag),
            inverse,
            fragments,
            row_count,
        )
    }

    /// Similarity filter: a row matches reference `i` when `scores[row][i] >=
    /// threshold`.
    pub fn similarity_filter(
        column: ColumnId,
        flag: ExclusionFlag,
        inverse: bool,
        references: Vec<Molecule>,
        threshold: f32,
        scores: SimilarityScores,
        row_count: usize,
    ) -> Self {
        let purpose = Purpose::SimilarityFilter {
            threshold,
            scores: Arc::new(scores),
        };
        Self::new(column, purpose, ExclusionLink::Flag(flag), inverse, references, row_count)
    }

    pub fn clustering(column: ColumnId, flag: ExclusionFlag) -> Self {
        Self::new(column, Purpose::Clustering, ExclusionLink::Flag(flag), false, Vec::new(), 0)
    }

    /// Current-row tracking; `reference` is the focused row's structure.
    pub fn current_row(column: ColumnId, reference: Option<Molecule>) -> Self {
        Self::new(
            column,
            Purpose::SimilarityToCurrentRow,
            ExclusionLink::Unbound,
            false,
            reference.into_iter().collect(),
            0,
        )
    }

    /// Same entry, but configured while its filter is inactive.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn key(&self) -> HighlightKey {
        HighlightKey {
            column: self.column,
            kind: self.purpose.kind(),
        }
    }

    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn purpose(&self) -> &Purpose {
        &self.purpose
    }

    pub fn exclusion(&self) -> ExclusionLink {
        self.exclusion
    }

    pub fn is_bound_to(&self, flag: ExclusionFlag) -> bool {
        self.exclusion == ExclusionLink::Flag(flag)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    /// Enabled and not inverted: the only state in which colorization fires.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.inverse
    }

    pub fn references(&self) -> &[Molecule] {
        &self.references
    }

    pub fn best_match_cache(&self) -> Option<&BestMatchCache> {
        self.best_match.as_ref()
    }

    /// The reference governing the highlight of `row`, or `None` if nothing
    /// matches. With a single reference it is always used; otherwise the
    /// choice is memoized per row.
    pub fn best_reference<M: SubstructureMatcher + ?Sized>(
        &self,
        row: RowId,
        molecule: &Molecule,
        matcher: &M,
    ) -> Option<&Molecule> {
        match self.references.len() {
            0 => None,
            1 => self.references.first(),
            _ => {
                let best = match &self.best_match {
                    Some(cache) => {
                        cache.get_or_compute(row, || self.select_best(row, molecule, matcher))
                    }
                    None => self.select_best(row, molecule, matcher),
                };
                match best {
                    BestMatch::Reference(i) => self.references.get(i),
                    BestMatch::NoMatch => None,
                }
            }
        }
    }

    /// Largest matching reference, earliest listed on ties. References that
    /// cannot beat the current best are skipped without running a search.
    fn select_best<M: SubstructureMatcher + ?Sized>(
        &self,
        row: RowId,
        molecule: &Molecule,
        matcher: &M,
    ) -> BestMatch {
        match &self.purpose {
            Purpose::SubstructureFilter => {
                let mut best: Option<(usize, usize)> = None;
                for (i, fragment) in self.references.iter().enumerate() {
                    let size = fragment.atom_count();
                    if best.is_some_and(|(_, s)| size <= s) {
                        continue;
                    }
                    if matcher.contains(fragment, molecule) {
                        best = Some((i, size));
                    }
                }
                best.map_or(BestMatch::NoMatch, |(i, _)| BestMatch::Reference(i))
            }
            Purpose::SimilarityFilter { threshold, scores } => {
                let Some(row_scores) = scores.get(&row) else {
                    return BestMatch::NoMatch;
                };
                let mut best: Option<(usize, f32)> = None;
                for (i, &score) in row_scores.iter().enumerate().take(self.references.len()) {
                    if score >= *threshold && best.is_none_or(|(_, s)| score > s) {
                        best = Some((i, score));
                    }
                }
                best.map_or(BestMatch::NoMatch, |(i, _)| BestMatch::Reference(i))
            }
            Purpose::Clustering | Purpose::SimilarityToCurrentRow => BestMatch::Reference(0),
        }
    }
}
