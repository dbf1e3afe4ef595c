mod common;

use common::{ScriptedMatcher, ScriptedMcs, laid_out, mol};
use molhilite::color::Rgb;
use molhilite::highlight::{DiffMode, DiffOutcome, McsDiffColorizer};
use molhilite::layout::AnchoredLayout;
use molhilite::model::{AtomColor, Molecule};
use molhilite::search::{BacktrackMcs, McsFinder, SubstructureMatcher, Vf2Matcher};

const RED: Rgb = Rgb::new(255, 0, 0);

fn colorizer<'a, S, F>(
    matcher: &'a S,
    mcs: &'a F,
    layout: &'a AnchoredLayout,
) -> McsDiffColorizer<'a, S, F, AnchoredLayout>
where
    S: SubstructureMatcher,
    F: McsFinder,
{
    McsDiffColorizer {
        matcher,
        mcs,
        layout,
        acceptance_divisor: 2,
    }
}

fn highlighted_count(m: &Molecule) -> usize {
    m.atoms
        .iter()
        .filter(|a| matches!(a.color, AtomColor::Highlight(_)))
        .count()
}

#[test]
fn small_common_subgraph_is_rejected() {
    let layout = AnchoredLayout::default();
    let mut target = laid_out("CCCCCCCCCC");
    let before = target.clone();

    let four = ScriptedMcs(Some(mol("CCCC")));
    let diff = colorizer(&Vf2Matcher, &four, &layout);
    let outcome = diff.apply(&mol("CC"), &mut target, RED, DiffMode::Similarity);
    assert_eq!(
        outcome,
        DiffOutcome::BelowThreshold {
            mcs_atoms: 4,
            target_atoms: 10
        }
    );
    assert_eq!(target, before);

    let five = ScriptedMcs(Some(mol("CCCCC")));
    let diff = colorizer(&Vf2Matcher, &five, &layout);
    let outcome = diff.apply(&mol("CC"), &mut target, RED, DiffMode::Similarity);
    assert_eq!(outcome, DiffOutcome::Colored { atoms: 5 });
    assert_eq!(highlighted_count(&target), 5);
}

#[test]
fn divisor_one_requires_full_cover() {
    let layout = AnchoredLayout::default();
    let five = ScriptedMcs(Some(mol("CCCCC")));
    let mut target = laid_out("CCCCCCCCCC");
    let mut diff = colorizer(&Vf2Matcher, &five, &layout);
    diff.acceptance_divisor = 1;
    let outcome = diff.apply(&mol("CC"), &mut target, RED, DiffMode::Similarity);
    assert!(matches!(outcome, DiffOutcome::BelowThreshold { .. }));
}

#[test]
fn nothing_in_common_leaves_target_alone() {
    let layout = AnchoredLayout::default();
    let mut target = laid_out("CCO");
    let before = target.clone();

    let none = ScriptedMcs(None);
    let diff = colorizer(&Vf2Matcher, &none, &layout);
    let outcome = diff.apply(&mol("N"), &mut target, RED, DiffMode::Differencing);
    assert_eq!(outcome, DiffOutcome::NoCommonSubgraph);

    let empty = ScriptedMcs(Some(Molecule::new()));
    let diff = colorizer(&Vf2Matcher, &empty, &layout);
    let outcome = diff.apply(&mol("N"), &mut target, RED, DiffMode::Similarity);
    assert_eq!(outcome, DiffOutcome::NoCommonSubgraph);

    let real = BacktrackMcs::default();
    let diff = colorizer(&Vf2Matcher, &real, &layout);
    let outcome = diff.apply(&mol("N"), &mut target, RED, DiffMode::Similarity);
    assert_eq!(outcome, DiffOutcome::NoCommonSubgraph);
    assert_eq!(target, before);
}

#[test]
fn unlocatable_subgraph_leaves_target_alone() {
    let layout = AnchoredLayout::default();
    let matcher = ScriptedMatcher::new(vec![None]);
    let mcs = BacktrackMcs::default();
    let mut target = laid_out("c1ccccc1");
    let before = target.clone();

    let diff = colorizer(&matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1CCO"), &mut target, RED, DiffMode::Differencing);
    assert_eq!(outcome, DiffOutcome::NotLocated);
    assert_eq!(target, before);
}

#[test]
fn similarity_respects_explicit_colors() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let mut target = laid_out("c1ccccc1C");
    let blue = Rgb::new(0, 0, 255);
    target.atoms[0].color = AtomColor::Explicit(blue);

    let diff = colorizer(&Vf2Matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1"), &mut target, RED, DiffMode::Similarity);
    assert_eq!(outcome, DiffOutcome::Colored { atoms: 5 });
    assert_eq!(target.atoms[0].color, AtomColor::Explicit(blue));
    assert_eq!(target.atoms[6].color, AtomColor::Default);
    assert!(target.bonds.iter().all(|b| !b.background_hilite && !b.foreground_hilite));
}

#[test]
fn differencing_hilites_bonds_outside_common_part() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let mut target = laid_out("c1ccccc1CC(C)C");

    let diff = colorizer(&Vf2Matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1"), &mut target, RED, DiffMode::Differencing);
    // the reference has nothing beyond the common ring
    assert_eq!(outcome, DiffOutcome::Hilited);
    assert_eq!(target.atom_count(), 10);
    assert_eq!(highlighted_count(&target), 0, "differencing does not color atoms");
    for bond in &target.bonds {
        let in_ring = bond.atom1 < 6 && bond.atom2 < 6;
        assert_eq!(bond.background_hilite, !in_ring, "bond {}-{}", bond.atom1, bond.atom2);
    }
}

#[test]
fn grafting_adds_reference_atoms_and_keeps_coordinates() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let mut target = laid_out("c1ccccc1");
    let before = target.clone();

    let diff = colorizer(&Vf2Matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1CCO"), &mut target, RED, DiffMode::Differencing);
    assert_eq!(outcome, DiffOutcome::Grafted { atoms: 3, bonds: 3 });
    assert_eq!(target.atom_count(), 9);

    for (i, atom) in before.atoms.iter().enumerate() {
        assert_eq!((target.atoms[i].x, target.atoms[i].y), (atom.x, atom.y), "atom {i} moved");
        assert!(!target.atoms[i].grafted);
    }
    let grafted: Vec<_> = target.atoms[6..].iter().collect();
    assert!(grafted.iter().all(|a| a.grafted && !a.marked));
    assert_eq!(grafted[2].atomic_no, 8);
    assert!(target.atoms.iter().all(|a| !a.marked));

    let new_bonds: Vec<_> = target.bonds.iter().filter(|b| b.grafted).collect();
    assert_eq!(new_bonds.len(), 3);
    assert!(new_bonds.iter().all(|b| b.foreground_hilite));
    assert!(target.bonds.iter().all(|b| !b.background_hilite));

    // grafted atoms got their own positions
    for (i, a) in target.atoms.iter().enumerate() {
        for b in &target.atoms[i + 1..] {
            let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            assert!(d > 0.1, "atoms overlap");
        }
    }
}

#[test]
fn grafting_skips_other_reference_components() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let mut target = laid_out("c1ccccc1");

    let diff = colorizer(&Vf2Matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1C.O"), &mut target, RED, DiffMode::Differencing);
    assert_eq!(outcome, DiffOutcome::Grafted { atoms: 1, bonds: 1 });
    assert!(target.atoms.iter().all(|a| a.atomic_no == 6));
}

#[test]
fn reference_not_located_only_hilites() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let matcher = ScriptedMatcher::new(vec![Some(vec![0, 1, 2, 3, 4, 5]), None]);
    let mut target = laid_out("c1ccccc1");

    let diff = colorizer(&matcher, &mcs, &layout);
    let outcome = diff.apply(&mol("c1ccccc1CCO"), &mut target, RED, DiffMode::Differencing);
    assert_eq!(outcome, DiffOutcome::Hilited);
    assert_eq!(target.atom_count(), 6);
}

#[test]
fn inconsistent_occurrences_abort_grafting() {
    let layout = AnchoredLayout::default();
    let mcs = BacktrackMcs::default();
    let reference = mol("c1ccccc1CCO");
    let bad_occurrences = [vec![0, 0, 1, 2, 3, 4], vec![0, 1, 2], vec![0, 1, 2, 3, 4, 99]];

    for bad in bad_occurrences {
        let matcher = ScriptedMatcher::new(vec![Some(vec![0, 1, 2, 3, 4, 5]), Some(bad.clone())]);
        let mut target = laid_out("c1ccccc1");
        let before = target.clone();

        let diff = colorizer(&matcher, &mcs, &layout);
        let outcome = diff.apply(&reference, &mut target, RED, DiffMode::Differencing);
        assert_eq!(outcome, DiffOutcome::Hilited, "occurrence {bad:?}");
        assert_eq!(target, before, "target untouched for {bad:?}");
    }
}
