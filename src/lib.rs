//! Structure highlighting for chemical data tables.
//!
//! This crate decides which atoms and bonds of a structure shown in a table
//! row are emphasized: fragments of an active substructure filter, the part
//! shared with a similarity filter reference, or the difference to the
//! structure of the focused row. [`highlight::HighlightEngine`] keeps that
//! configuration in step with column, filter and focus changes.
//!
//! The binary `molhilite` colorizes a JSON table document and prints the
//! result as JSON.

pub mod color;
pub mod config;
pub mod document;
pub mod highlight;
pub mod layout;
pub mod model;
pub mod search;
pub mod smiles;
pub mod source;
pub mod table;
