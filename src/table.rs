//! The slice of the host table model the highlighting engine depends on:
//! schema queries and change notifications.

use crate::highlight::{ColumnId, ExclusionFlag};
use crate::model::Molecule;

pub trait TableSchema {
    fn column_count(&self) -> usize;
    fn is_structure_column(&self, column: ColumnId) -> bool;
    fn row_count(&self) -> usize;
}

/// Old column index to new column index, `None` for removed columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRemap(Vec<Option<ColumnId>>);

impl ColumnRemap {
    pub fn new(map: Vec<Option<ColumnId>>) -> Self {
        Self(map)
    }

    /// Remap produced by deleting `removed` from `column_count` columns, with
    /// the remaining columns shifted down.
    pub fn removing(column_count: usize, removed: &[ColumnId]) -> Self {
        let mut next = 0usize;
        let map = (0..column_count)
            .map(|old| {
                if removed.contains(&ColumnId(old)) {
                    None
                } else {
                    next += 1;
                    Some(ColumnId(next - 1))
                }
            })
            .collect();
        Self(map)
    }

    /// `None` if `old` is outside the remap, `Some(None)` if it was removed.
    pub fn get(&self, old: ColumnId) -> Option<Option<ColumnId>> {
        self.0.get(old.0).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Option<ColumnId>> for ColumnRemap {
    fn from_iter<T: IntoIterator<Item = Option<ColumnId>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Notifications the host delivers, serially and in order, one per mutation.
#[derive(Debug, Clone)]
pub enum TableEvent {
    NewTable,
    ColumnsAdded { first: ColumnId },
    ColumnsRemoved { remap: ColumnRemap },
    ExclusionRemoved(ExclusionFlag),
    ExclusionFreed(ExclusionFlag),
    ExclusionInverted(ExclusionFlag),
    ExclusionEnabled { flag: ExclusionFlag, enabled: bool },
    /// The focused row changed; one entry per structure column with that
    /// row's molecule (or `None` when no row is focused).
    CurrentRowChanged(Vec<(ColumnId, Option<Molecule>)>),
}
