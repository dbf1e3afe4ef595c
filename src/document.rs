//! JSON table documents: columns, rows with SMILES cells, filter setup and the
//! focused row. Used by the command line tool to drive the engine the way a
//! host table would.

use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::color::Rgb;
use crate::highlight::{ColorInfo, ColumnId, ExclusionFlag, HighlightEngine, RowId};
use crate::layout::{CoordinateGenerator, LayoutOptions};
use crate::model::{AtomColor, Molecule};
use crate::search::{McsFinder, SubstructureMatcher};
use crate::smiles::parse_smiles;
use crate::source::ContentSource;
use crate::table::{TableEvent, TableSchema};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub title: String,
    /// Cells hold SMILES structures.
    #[serde(default)]
    pub structure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSpec {
    pub id: u64,
    /// Cell text by column title.
    #[serde(default)]
    pub cells: IndexMap<String, String>,
    /// Externally assigned atom colors by column title and atom index.
    #[serde(default)]
    pub atom_colors: IndexMap<String, BTreeMap<usize, Rgb>>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum FilterSpec {
    SubstructureFilter {
        column: String,
        flag: u32,
        #[serde(default)]
        inverse: bool,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
        references: Vec<String>,
    },
    SimilarityFilter {
        column: String,
        flag: u32,
        #[serde(default)]
        inverse: bool,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
        references: Vec<String>,
        threshold: f32,
        /// Row id to one similarity value per reference.
        #[serde(default)]
        scores: BTreeMap<u64, Vec<f32>>,
    },
    Clustering {
        column: String,
        flag: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDocument {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Vec<RowSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Id of the focused row.
    #[serde(default)]
    pub current_row: Option<u64>,
}

/// One colorized structure cell.
#[derive(Debug, Clone, Serialize)]
pub struct ColoredStructure {
    pub row: u64,
    pub column: String,
    pub molecule: Molecule,
}

impl TableSchema for TableDocument {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn is_structure_column(&self, column: ColumnId) -> bool {
        self.columns.get(column.0).is_some_and(|c| c.structure)
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl TableDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse table document")
    }

    pub fn load<S: ContentSource>(source: &mut S, path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = source.read_to_string(path)?;
        Self::from_json(&text).with_context(|| format!("Invalid table document {}", path))
    }

    pub fn column_index(&self, title: &str) -> Result<ColumnId> {
        self.columns
            .iter()
            .position(|c| c.title == title)
            .map(ColumnId)
            .ok_or_else(|| anyhow!("Unknown column '{}'", title))
    }

    pub fn row(&self, id: u64) -> Option<&RowSpec> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Parse and lay out the structure of `row` in `column`. Empty cells give
    /// `None`.
    pub fn structure<L: CoordinateGenerator>(
        &self,
        row: &RowSpec,
        column: ColumnId,
        layout: &L,
    ) -> Result<Option<Molecule>> {
        let title = &self
            .columns
            .get(column.0)
            .ok_or_else(|| anyhow!("Column {} out of range", column.0))?
            .title;
        let Some(smiles) = row.cells.get(title).filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let mut mol = parse_smiles(smiles)
            .with_context(|| format!("Row {} column '{}': invalid SMILES", row.id, title))?;
        layout.generate(&mut mol, LayoutOptions::default());
        if let Some(colors) = row.atom_colors.get(title) {
            for (&atom, &rgb) in colors {
                if let Some(a) = mol.atoms.get_mut(atom) {
                    a.color = AtomColor::Explicit(rgb);
                }
            }
        }
        Ok(Some(mol))
    }

    fn references(&self, column: &str, smiles: &[String]) -> Result<Vec<Molecule>> {
        smiles
            .iter()
            .map(|s| {
                parse_smiles(s)
                    .with_context(|| format!("Filter on '{}': invalid reference '{}'", column, s))
            })
            .collect()
    }

    /// Replay the document into `engine`: a new table, the filters, then the
    /// focused row.
    pub fn apply<S, F, L>(&self, engine: &mut HighlightEngine<S, F, L>) -> Result<()>
    where
        S: SubstructureMatcher,
        F: McsFinder,
        L: CoordinateGenerator,
    {
        engine.handle_event(TableEvent::NewTable, self);
        let rows = self.rows.len();
        for filter in &self.filters {
            let info = match filter {
                FilterSpec::SubstructureFilter { column, flag, inverse, enabled, references } => {
                    let info = ColorInfo::substructure_filter(
                        self.column_index(column)?,
                        ExclusionFlag(*flag),
                        *inverse,
                        self.references(column, references)?,
                        rows,
                    );
                    if *enabled { info } else { info.disabled() }
                }
                FilterSpec::SimilarityFilter {
                    column,
                    flag,
                    inverse,
                    enabled,
                    references,
                    threshold,
                    scores,
                } => {
                    let scores = scores.iter().map(|(&id, s)| (RowId(id), s.clone())).collect();
                    let info = ColorInfo::similarity_filter(
                        self.column_index(column)?,
                        ExclusionFlag(*flag),
                        *inverse,
                        self.references(column, references)?,
                        *threshold,
                        scores,
                        rows,
                    );
                    if *enabled { info } else { info.disabled() }
                }
                FilterSpec::Clustering { column, flag } => {
                    ColorInfo::clustering(self.column_index(column)?, ExclusionFlag(*flag))
                }
            };
            engine.install_filter(info);
        }

        if let Some(id) = self.current_row {
            let row = self
                .row(id)
                .ok_or_else(|| anyhow!("Current row {} not in table", id))?;
            let mut focused = Vec::new();
            for c in (0..self.columns.len()).map(ColumnId) {
                if self.is_structure_column(c) {
                    focused.push((c, self.structure(row, c, engine.layout())?));
                }
            }
            engine.handle_event(TableEvent::CurrentRowChanged(focused), self);
        }
        debug!(
            target: "molhilite::document",
            highlights = engine.registry().len(),
            "document applied"
        );
        Ok(())
    }

    /// Colorize every structure cell, rows in parallel.
    pub fn colorize_all<S, F, L>(
        &self,
        engine: &HighlightEngine<S, F, L>,
    ) -> Result<Vec<ColoredStructure>>
    where
        S: SubstructureMatcher + Sync,
        F: McsFinder + Sync,
        L: CoordinateGenerator + Sync,
    {
        let columns: Vec<ColumnId> = (0..self.columns.len())
            .map(ColumnId)
            .filter(|&c| self.is_structure_column(c))
            .collect();
        let per_row: Vec<Vec<ColoredStructure>> = self
            .rows
            .par_iter()
            .map(|row| -> Result<Vec<ColoredStructure>> {
                let mut out = Vec::new();
                for &column in &columns {
                    if let Some(mut molecule) = self.structure(row, column, engine.layout())? {
                        engine.colorize(RowId(row.id), column, &mut molecule);
                        out.push(ColoredStructure {
                            row: row.id,
                            column: self.columns[column.0].title.clone(),
                            molecule,
                        });
                    }
                }
                Ok(out)
            })
            .collect::<Result<_>>()?;
        Ok(per_row.into_iter().flatten().collect())
    }
}
