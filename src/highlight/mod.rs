//! Structure highlighting for chemical data tables.
//!
//! - [`info`] – [`ColorInfo`] records and the per-record best-match cache
//! - [`registry`] – lifecycle of records across schema and filter changes
//! - [`diff`] – MCS-based similarity and differencing colorization
//! - [`engine`] – [`HighlightEngine`], the per-row entry point

pub mod diff;
pub mod engine;
pub mod info;
pub mod registry;

pub use diff::{DiffMode, DiffOutcome, GraftError, McsDiffColorizer};
pub use engine::{DefaultEngine, HighlightEngine};
pub use info::{
    BestMatch, BestMatchCache, ColorInfo, ColumnId, ExclusionFlag, ExclusionLink, HighlightKey,
    Purpose, PurposeKind, RowId, SimilarityScores,
};
pub use registry::ColorInfoRegistry;
