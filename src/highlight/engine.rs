use tracing::{debug, trace};

use super::diff::{DiffMode, DiffOutcome, McsDiffColorizer};
use super::info::{ColorInfo, ColumnId, PurposeKind, RowId};
use super::registry::ColorInfoRegistry;
use crate::config::EngineConfig;
use crate::layout::{AnchoredLayout, CoordinateGenerator};
use crate::model::Molecule;
use crate::search::{BacktrackMcs, McsFinder, SubstructureMatcher, Vf2Matcher};
use crate::table::{TableEvent, TableSchema};

/// Engine wired to the bundled matcher, MCS and layout implementations.
pub type DefaultEngine = HighlightEngine<Vf2Matcher, BacktrackMcs, AnchoredLayout>;

/// Per-table highlighting state plus the capabilities it calls into.
///
/// Schema and filter changes take `&mut self`; [`HighlightEngine::colorize`]
/// takes `&self` and can run for many rows in parallel.
pub struct HighlightEngine<S, F, L> {
    registry: ColorInfoRegistry,
    config: EngineConfig,
    matcher: S,
    mcs: F,
    layout: L,
}

impl DefaultEngine {
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(config, Vf2Matcher, BacktrackMcs::default(), AnchoredLayout::default())
    }
}

impl<S, F, L> HighlightEngine<S, F, L>
where
    S: SubstructureMatcher,
    F: McsFinder,
    L: CoordinateGenerator,
{
    pub fn new(config: EngineConfig, matcher: S, mcs: F, layout: L) -> Self {
        Self {
            registry: ColorInfoRegistry::new(config.track_current_row),
            config,
            matcher,
            mcs,
            layout,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ColorInfoRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn handle_event(&mut self, event: TableEvent, schema: &impl TableSchema) {
        trace!(target: "molhilite::engine", ?event, "table event");
        match event {
            TableEvent::NewTable => self.registry.on_new_table(schema),
            TableEvent::ColumnsAdded { first } => self.registry.on_columns_added(schema, first),
            TableEvent::ColumnsRemoved { remap } => {
                self.registry.on_columns_removed(&remap, schema.column_count())
            }
            TableEvent::ExclusionRemoved(flag) => {
                self.registry.on_exclusion_removed(flag);
            }
            TableEvent::ExclusionFreed(flag) => {
                self.registry.on_exclusion_freed(flag);
            }
            TableEvent::ExclusionInverted(flag) => self.registry.on_exclusion_inverted(flag),
            TableEvent::ExclusionEnabled { flag, enabled } => {
                self.registry.on_exclusion_enabled(flag, enabled)
            }
            TableEvent::CurrentRowChanged(columns) => {
                for (column, reference) in columns {
                    self.registry.on_current_row_changed(column, reference);
                }
            }
        }
    }

    /// Register `info`, replacing any entry with the same column and purpose.
    pub fn install_filter(&mut self, info: ColorInfo) -> Option<ColorInfo> {
        debug!(
            target: "molhilite::engine",
            column = info.column().0,
            kind = ?info.key().kind,
            references = info.references().len(),
            "installing highlight"
        );
        self.registry.put(info)
    }

    pub fn clear_filter(&mut self, column: ColumnId, kind: PurposeKind) -> Option<ColorInfo> {
        self.registry.remove(column, kind)
    }

    /// Apply the highlight configured for `column` to `molecule`.
    ///
    /// Highlight state from an earlier call is stripped first, so repeated
    /// calls give identical results. Explicit atom colors always survive.
    /// At most one purpose applies, in order: substructure filter, similarity
    /// filter, current-row comparison.
    pub fn colorize(&self, row: RowId, column: ColumnId, molecule: &mut Molecule) {
        molecule.clear_highlights();
        if molecule.is_empty() {
            return;
        }
        let active = |kind| self.registry.get(column, kind).filter(|i| i.is_active());

        if let Some(info) = active(PurposeKind::SubstructureFilter) {
            self.colorize_substructure(info, row, molecule);
        } else if let Some(info) = active(PurposeKind::SimilarityFilter) {
            if let Some(reference) = info.best_reference(row, molecule, &self.matcher) {
                let outcome = self.diff().apply(
                    reference,
                    molecule,
                    self.config.palette.similarity_match,
                    DiffMode::Similarity,
                );
                log_outcome(row, column, outcome);
            }
        } else if let Some(info) = active(PurposeKind::SimilarityToCurrentRow) {
            if let Some(reference) = info.references().first() {
                let outcome = self.diff().apply(
                    reference,
                    molecule,
                    self.config.palette.reference_compare,
                    DiffMode::Differencing,
                );
                log_outcome(row, column, outcome);
            }
        }
    }

    fn colorize_substructure(&self, info: &ColorInfo, row: RowId, molecule: &mut Molecule) {
        let Some(fragment) = info.best_reference(row, molecule, &self.matcher) else {
            trace!(target: "molhilite::engine", row = row.0, "no fragment matches");
            return;
        };
        let matches = self.matcher.find_all(fragment, molecule, self.config.max_matches);
        let color = self.config.palette.filter_match;
        for mapping in &matches {
            for &atom in mapping {
                molecule.highlight_atom(atom, color);
            }
        }
        trace!(
            target: "molhilite::engine",
            row = row.0,
            matches = matches.len(),
            "substructure highlight"
        );
    }

    fn diff(&self) -> McsDiffColorizer<'_, S, F, L> {
        McsDiffColorizer {
            matcher: &self.matcher,
            mcs: &self.mcs,
            layout: &self.layout,
            acceptance_divisor: self.config.mcs_acceptance_divisor,
        }
    }
}

fn log_outcome(row: RowId, column: ColumnId, outcome: DiffOutcome) {
    trace!(target: "molhilite::engine", row = row.0, column = column.0, ?outcome, "mcs highlight");
}
