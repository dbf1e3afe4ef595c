//! Engine configuration, loadable from JSON.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::color::HighlightPalette;
use crate::source::ContentSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub palette: HighlightPalette,
    /// Keep a current-row comparison entry for every structure column.
    pub track_current_row: bool,
    /// MCS-based highlighting needs a common subgraph of at least
    /// `atoms / mcs_acceptance_divisor` atoms (integer division).
    pub mcs_acceptance_divisor: usize,
    /// Upper bound on overlapping substructure matches colored per structure.
    pub max_matches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: HighlightPalette::default(),
            track_current_row: true,
            mcs_acceptance_divisor: 2,
            max_matches: 1024,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse engine config")
    }

    pub fn load<S: ContentSource>(source: &mut S, path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = source.read_to_string(path)?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path))
    }
}
