//! Graph search capabilities the highlighting engine calls into.
//!
//! The engine only depends on the traits in this module:
//!
//! - [`SubstructureMatcher`] – where does a fragment occur in a target
//! - [`McsFinder`] – largest common subgraph of two molecules
//!
//! [`vf2`] and [`mcs`] provide default implementations.

pub mod mcs;
pub mod vf2;

pub use mcs::BacktrackMcs;
pub use vf2::Vf2Matcher;

use crate::model::{Atom, Bond, Molecule};

/// `mapping[i]` is the target atom matched by fragment atom `i`.
pub type AtomMapping = Vec<usize>;

pub trait SubstructureMatcher {
    /// First occurrence of `fragment` in `target`.
    fn find_first(&self, fragment: &Molecule, target: &Molecule) -> Option<AtomMapping>;

    /// All occurrences, overlapping ones included, deduplicated by the set of
    /// target atoms they cover. At most `limit` mappings are returned.
    fn find_all(&self, fragment: &Molecule, target: &Molecule, limit: usize) -> Vec<AtomMapping>;

    fn contains(&self, fragment: &Molecule, target: &Molecule) -> bool {
        self.find_first(fragment, target).is_some()
    }
}

pub trait McsFinder {
    /// Maximum common subgraph of `primary` and `secondary` as a standalone
    /// fragment, or `None` if the molecules share nothing.
    fn find_mcs(&self, primary: &Molecule, secondary: &Molecule) -> Option<Molecule>;
}

impl<T: SubstructureMatcher + ?Sized> SubstructureMatcher for &T {
    fn find_first(&self, fragment: &Molecule, target: &Molecule) -> Option<AtomMapping> {
        (**self).find_first(fragment, target)
    }
    fn find_all(&self, fragment: &Molecule, target: &Molecule, limit: usize) -> Vec<AtomMapping> {
        (**self).find_all(fragment, target, limit)
    }
    fn contains(&self, fragment: &Molecule, target: &Molecule) -> bool {
        (**self).contains(fragment, target)
    }
}

impl<T: McsFinder + ?Sized> McsFinder for &T {
    fn find_mcs(&self, primary: &Molecule, secondary: &Molecule) -> Option<Molecule> {
        (**self).find_mcs(primary, secondary)
    }
}

/// Shared atom compatibility rule for matching and MCS.
pub(crate) fn atoms_compatible(query: &Atom, target: &Atom) -> bool {
    query.atomic_no == target.atomic_no
        && query.charge == target.charge
        && (query.mass == 0 || query.mass == target.mass)
        && (!query.aromatic || target.aromatic)
}

pub(crate) fn bonds_compatible(query: &Bond, target: &Bond) -> bool {
    query.order == target.order
}
