//! Per-table registry of [`ColorInfo`] records and their lifecycle across
//! schema and exclusion changes.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::info::{ColorInfo, ColumnId, ExclusionFlag, HighlightKey, PurposeKind};
use crate::model::Molecule;
use crate::table::{ColumnRemap, TableSchema};

#[derive(Debug, Default)]
pub struct ColorInfoRegistry {
    entries: IndexMap<HighlightKey, ColorInfo>,
    /// Create current-row entries for every structure column.
    track_current_row: bool,
}

impl ColorInfoRegistry {
    pub fn new(track_current_row: bool) -> Self {
        Self {
            entries: IndexMap::new(),
            track_current_row,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorInfo> {
        self.entries.values()
    }

    /// A missing entry just means nothing is configured.
    pub fn get(&self, column: ColumnId, kind: PurposeKind) -> Option<&ColorInfo> {
        self.entries.get(&HighlightKey { column, kind })
    }

    /// Insert `info` under its own key, returning the entry it replaced.
    pub fn put(&mut self, info: ColorInfo) -> Option<ColorInfo> {
        self.entries.insert(info.key(), info)
    }

    pub fn remove(&mut self, column: ColumnId, kind: PurposeKind) -> Option<ColorInfo> {
        self.entries.shift_remove(&HighlightKey { column, kind })
    }

    pub fn on_new_table(&mut self, schema: &impl TableSchema) {
        self.entries.clear();
        self.on_columns_added(schema, ColumnId(0));
    }

    pub fn on_columns_added(&mut self, schema: &impl TableSchema, first: ColumnId) {
        if !self.track_current_row {
            return;
        }
        for c in first.0..schema.column_count() {
            let column = ColumnId(c);
            if !schema.is_structure_column(column) {
                continue;
            }
            let key = HighlightKey {
                column,
                kind: PurposeKind::SimilarityToCurrentRow,
            };
            if !self.entries.contains_key(&key) {
                debug!(target: "molhilite::registry", column = c, "tracking current row");
                self.entries.insert(key, ColorInfo::current_row(column, None));
            }
        }
    }

    /// Drop entries whose column was removed and renumber the rest.
    ///
    /// The map is rebuilt from a drained snapshot, so no entry is visited
    /// while the key set changes.
    pub fn on_columns_removed(&mut self, remap: &ColumnRemap, column_count: usize) {
        let old = std::mem::take(&mut self.entries);
        for (key, mut info) in old {
            let new_column = match remap.get(key.column) {
                Some(Some(c)) if c.0 < column_count => c,
                Some(None) => {
                    debug!(
                        target: "molhilite::registry",
                        column = key.column.0,
                        kind = ?key.kind,
                        "column removed, dropping highlight"
                    );
                    continue;
                }
                desync => {
                    if cfg!(debug_assertions) {
                        panic!(
                            "highlight entry for column {} out of sync with schema \
                             ({:?}, {} columns)",
                            key.column.0, desync, column_count
                        );
                    }
                    warn!(
                        target: "molhilite::registry",
                        column = key.column.0,
                        kind = ?key.kind,
                        "highlight entry out of sync with schema, dropped"
                    );
                    continue;
                }
            };
            info.column = new_column;
            self.entries.insert(info.key(), info);
        }
    }

    /// Remove the entry tied to `flag`; by construction there is at most one.
    pub fn on_exclusion_removed(&mut self, flag: ExclusionFlag) -> Option<ColorInfo> {
        let index = self.entries.values().position(|i| i.is_bound_to(flag))?;
        self.entries.shift_remove_index(index).map(|(_, info)| info)
    }

    pub fn on_exclusion_freed(&mut self, flag: ExclusionFlag) -> Option<ColorInfo> {
        self.on_exclusion_removed(flag)
    }

    pub fn on_exclusion_inverted(&mut self, flag: ExclusionFlag) {
        for info in self.entries.values_mut().filter(|i| i.is_bound_to(flag)) {
            info.inverse = !info.inverse;
        }
    }

    pub fn on_exclusion_enabled(&mut self, flag: ExclusionFlag, enabled: bool) {
        for info in self.entries.values_mut().filter(|i| i.is_bound_to(flag)) {
            info.enabled = enabled;
        }
    }

    /// Replace the current-row entry of `column` with one referencing the newly
    /// focused row's structure. Columns without current-row tracking are
    /// ignored.
    pub fn on_current_row_changed(&mut self, column: ColumnId, reference: Option<Molecule>) {
        if self.get(column, PurposeKind::SimilarityToCurrentRow).is_some() {
            self.put(ColorInfo::current_row(column, reference));
        }
    }
}
