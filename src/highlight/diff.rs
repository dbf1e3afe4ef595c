//! MCS-based comparison of a displayed molecule with a reference molecule.
//!
//! In [`DiffMode::Similarity`] the part of the displayed molecule shared with
//! the reference is colored. In [`DiffMode::Differencing`] the shared part
//! recedes (every other bond gets a background highlight) and the part of the
//! reference that the displayed molecule lacks is grafted on, with freshly laid
//! out coordinates for the grafted atoms only.

use std::collections::HashSet;

use tracing::debug;

use crate::color::Rgb;
use crate::layout::{CoordinateGenerator, LayoutOptions};
use crate::model::Molecule;
use crate::search::{AtomMapping, McsFinder, SubstructureMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    Similarity,
    Differencing,
}

/// How far a diff got; everything short of `Colored`, `Hilited` or `Grafted`
/// leaves the molecule unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutcome {
    NoCommonSubgraph,
    /// The common subgraph covers less than the acceptance share of the target.
    BelowThreshold { mcs_atoms: usize, target_atoms: usize },
    NotLocated,
    Colored { atoms: usize },
    /// Differencing bond highlights applied, nothing grafted.
    Hilited,
    Grafted { atoms: usize, bonds: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraftError {
    #[error("occurrence maps {found} atoms, common subgraph has {expected}")]
    OccurrenceLength { expected: usize, found: usize },
    #[error("atom index {index} out of range for a molecule of {len} atoms")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("atom {0} matched more than once")]
    DuplicateAtom(usize),
}

pub struct McsDiffColorizer<'a, S: ?Sized, F: ?Sized, L: ?Sized> {
    pub matcher: &'a S,
    pub mcs: &'a F,
    pub layout: &'a L,
    /// The common subgraph must cover at least `target atoms / divisor` atoms.
    pub acceptance_divisor: usize,
}

impl<S, F, L> McsDiffColorizer<'_, S, F, L>
where
    S: SubstructureMatcher + ?Sized,
    F: McsFinder + ?Sized,
    L: CoordinateGenerator + ?Sized,
{
    pub fn apply(
        &self,
        reference: &Molecule,
        target: &mut Molecule,
        color: Rgb,
        mode: DiffMode,
    ) -> DiffOutcome {
        let Some(mcs) = self.mcs.find_mcs(target, reference).filter(|m| !m.is_empty()) else {
            return DiffOutcome::NoCommonSubgraph;
        };
        let threshold = target.atom_count() / self.acceptance_divisor.max(1);
        if mcs.atom_count() < threshold {
            debug!(
                target: "molhilite::diff",
                mcs_atoms = mcs.atom_count(),
                target_atoms = target.atom_count(),
                "common subgraph too small"
            );
            return DiffOutcome::BelowThreshold {
                mcs_atoms: mcs.atom_count(),
                target_atoms: target.atom_count(),
            };
        }
        let Some(target_occ) = self.matcher.find_first(&mcs, target) else {
            return DiffOutcome::NotLocated;
        };

        match mode {
            DiffMode::Similarity => {
                let atoms = target_occ
                    .iter()
                    .filter(|&&a| target.highlight_atom(a, color))
                    .count();
                DiffOutcome::Colored { atoms }
            }
            DiffMode::Differencing => {
                hilite_private_bonds(target, &target_occ);
                let Some(ref_occ) = self.matcher.find_first(&mcs, reference) else {
                    return DiffOutcome::Hilited;
                };
                let Some(&first) = ref_occ.first() else {
                    return DiffOutcome::Hilited;
                };
                let fragment = reference.fragment_atoms(first);
                if fragment.len() <= mcs.atom_count() {
                    return DiffOutcome::Hilited;
                }
                let grafted = self.graft(
                    target,
                    reference,
                    mcs.atom_count(),
                    &target_occ,
                    &ref_occ,
                    &fragment,
                );
                match grafted {
                    Ok(grafted) => {
                        let atoms = grafted.atom_count() - target.atom_count();
                        let bonds = grafted.bond_count() - target.bond_count();
                        *target = grafted;
                        DiffOutcome::Grafted { atoms, bonds }
                    }
                    Err(err) => {
                        debug!(target: "molhilite::diff", %err, "grafting skipped");
                        DiffOutcome::Hilited
                    }
                }
            }
        }
    }

    /// Build the grafted molecule as a new value; `target` is only read.
    fn graft(
        &self,
        target: &Molecule,
        reference: &Molecule,
        mcs_atoms: usize,
        target_occ: &AtomMapping,
        ref_occ: &AtomMapping,
        fragment: &[usize],
    ) -> Result<Molecule, GraftError> {
        for occ in [target_occ, ref_occ] {
            if occ.len() != mcs_atoms {
                return Err(GraftError::OccurrenceLength {
                    expected: mcs_atoms,
                    found: occ.len(),
                });
            }
        }

        // reference atom -> atom in the grafted molecule
        let mut translation: Vec<Option<usize>> = vec![None; reference.atom_count()];
        let mut seen_target = HashSet::new();
        for (&r, &m) in ref_occ.iter().zip(target_occ) {
            check_index(r, reference.atom_count())?;
            check_index(m, target.atom_count())?;
            if translation[r].is_some() {
                return Err(GraftError::DuplicateAtom(r));
            }
            if !seen_target.insert(m) {
                return Err(GraftError::DuplicateAtom(m));
            }
            translation[r] = Some(m);
        }

        let original_atoms = target.atom_count();
        let mut out = target.clone();
        let mut private = vec![false; reference.atom_count()];
        for &r in fragment {
            check_index(r, reference.atom_count())?;
            if translation[r].is_none() {
                let mut atom = reference.atoms[r].chemical_copy();
                atom.grafted = true;
                translation[r] = Some(out.add_atom(atom));
                private[r] = true;
            }
        }

        for bond in &reference.bonds {
            let touches_private = [bond.atom1, bond.atom2]
                .iter()
                .any(|&a| private.get(a).copied().unwrap_or(false));
            if !touches_private {
                continue;
            }
            let (Some(a), Some(b)) = (
                translation.get(bond.atom1).copied().flatten(),
                translation.get(bond.atom2).copied().flatten(),
            ) else {
                return Err(GraftError::IndexOutOfRange {
                    index: bond.atom1.max(bond.atom2),
                    len: reference.atom_count(),
                });
            };
            let idx = out.add_bond(a, b, bond.order);
            out.bonds[idx].foreground_hilite = true;
            out.bonds[idx].grafted = true;
        }

        for atom in out.atoms.iter_mut().take(original_atoms) {
            atom.marked = true;
        }
        self.layout.generate(
            &mut out,
            LayoutOptions {
                keep_marked: true,
                remove_added_hydrogens: true,
            },
        );
        for atom in &mut out.atoms {
            atom.marked = false;
        }
        debug!(
            target: "molhilite::diff",
            grafted_atoms = out.atom_count() - original_atoms,
            "grafted reference fragment"
        );
        Ok(out)
    }
}

/// Bonds inside the occurrence lose their background highlight, all other
/// bonds get one.
fn hilite_private_bonds(target: &mut Molecule, occurrence: &[usize]) {
    let common: HashSet<usize> = occurrence.iter().copied().collect();
    for bond in &mut target.bonds {
        bond.background_hilite = !(common.contains(&bond.atom1) && common.contains(&bond.atom2));
    }
}

fn check_index(index: usize, len: usize) -> Result<(), GraftError> {
    if index < len {
        Ok(())
    } else {
        Err(GraftError::IndexOutOfRange { index, len })
    }
}
