#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use molhilite::highlight::ColumnId;
use molhilite::layout::{AnchoredLayout, CoordinateGenerator, LayoutOptions};
use molhilite::model::Molecule;
use molhilite::search::{AtomMapping, McsFinder, SubstructureMatcher, Vf2Matcher};
use molhilite::smiles::parse_smiles;
use molhilite::table::TableSchema;

pub fn mol(smiles: &str) -> Molecule {
    parse_smiles(smiles).expect("valid SMILES")
}

/// Parsed and given 2D coordinates, the way table cells reach the engine.
pub fn laid_out(smiles: &str) -> Molecule {
    let mut m = mol(smiles);
    AnchoredLayout::default().generate(&mut m, LayoutOptions::default());
    m
}

/// Schema with the given structure-column flags.
pub struct Schema {
    pub structure: Vec<bool>,
    pub rows: usize,
}

impl Schema {
    pub fn new(structure: &[bool], rows: usize) -> Self {
        Self {
            structure: structure.to_vec(),
            rows,
        }
    }
}

impl TableSchema for Schema {
    fn column_count(&self) -> usize {
        self.structure.len()
    }
    fn is_structure_column(&self, column: ColumnId) -> bool {
        self.structure.get(column.0).copied().unwrap_or(false)
    }
    fn row_count(&self) -> usize {
        self.rows
    }
}

/// VF2 matcher that counts how often each entry point is used.
#[derive(Default)]
pub struct CountingMatcher {
    pub first_calls: AtomicUsize,
    pub all_calls: AtomicUsize,
}

impl CountingMatcher {
    pub fn first_calls(&self) -> usize {
        self.first_calls.load(Ordering::SeqCst)
    }
    pub fn all_calls(&self) -> usize {
        self.all_calls.load(Ordering::SeqCst)
    }
}

impl SubstructureMatcher for CountingMatcher {
    fn find_first(&self, fragment: &Molecule, target: &Molecule) -> Option<AtomMapping> {
        self.first_calls.fetch_add(1, Ordering::SeqCst);
        Vf2Matcher.find_first(fragment, target)
    }
    fn find_all(&self, fragment: &Molecule, target: &Molecule, limit: usize) -> Vec<AtomMapping> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        Vf2Matcher.find_all(fragment, target, limit)
    }
}

/// MCS finder that always answers with the same fragment.
pub struct ScriptedMcs(pub Option<Molecule>);

impl McsFinder for ScriptedMcs {
    fn find_mcs(&self, _primary: &Molecule, _secondary: &Molecule) -> Option<Molecule> {
        self.0.clone()
    }
}

/// Answers `find_first` from a script, one entry per call, then falls back to VF2.
pub struct ScriptedMatcher {
    pub script: std::sync::Mutex<Vec<Option<AtomMapping>>>,
}

impl ScriptedMatcher {
    pub fn new(mut script: Vec<Option<AtomMapping>>) -> Self {
        script.reverse();
        Self {
            script: std::sync::Mutex::new(script),
        }
    }
}

impl SubstructureMatcher for ScriptedMatcher {
    fn find_first(&self, fragment: &Molecule, target: &Molecule) -> Option<AtomMapping> {
        match self.script.lock().unwrap().pop() {
            Some(answer) => answer,
            None => Vf2Matcher.find_first(fragment, target),
        }
    }
    fn find_all(&self, fragment: &Molecule, target: &Molecule, limit: usize) -> Vec<AtomMapping> {
        Vf2Matcher.find_all(fragment, target, limit)
    }
}
