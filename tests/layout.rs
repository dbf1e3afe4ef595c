mod common;

use common::mol;
use molhilite::layout::{AnchoredLayout, Config, CoordinateGenerator, LayoutOptions};
use molhilite::model::{Atom, BondOrder, Molecule};

fn min_distance(m: &Molecule) -> f32 {
    let mut best = f32::INFINITY;
    for (i, a) in m.atoms.iter().enumerate() {
        for b in &m.atoms[i + 1..] {
            best = best.min(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt());
        }
    }
    best
}

#[test]
fn fresh_layout_spreads_atoms() {
    let mut m = mol("CC(C)(C)CCO");
    AnchoredLayout::default().generate(&mut m, LayoutOptions::default());
    assert!(min_distance(&m) >= 0.5, "atoms too close: {}", min_distance(&m));
    // acyclic, so every bond was laid out at the default length
    for bond in &m.bonds {
        let (a, b) = (&m.atoms[bond.atom1], &m.atoms[bond.atom2]);
        let len = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-4, "bond {}-{} has length {len}", bond.atom1, bond.atom2);
    }
}

#[test]
fn layout_is_deterministic() {
    let mut a = mol("c1ccccc1CC(=O)N");
    let mut b = a.clone();
    let layout = AnchoredLayout::default();
    layout.generate(&mut a, LayoutOptions::default());
    layout.generate(&mut b, LayoutOptions::default());
    assert_eq!(a, b);
}

#[test]
fn marked_atoms_are_anchors() {
    let mut m = Molecule::new();
    let c0 = m.add_atom(Atom::new(6).at(10.0, 5.0));
    let c1 = m.add_atom(Atom::new(6).at(12.0, 5.0));
    let o = m.add_atom(Atom::new(8));
    let n = m.add_atom(Atom::new(7));
    m.add_bond(c0, c1, BondOrder::Single);
    m.add_bond(c1, o, BondOrder::Single);
    m.add_bond(o, n, BondOrder::Single);
    m.atoms[c0].marked = true;
    m.atoms[c1].marked = true;

    AnchoredLayout::default().generate(
        &mut m,
        LayoutOptions {
            keep_marked: true,
            remove_added_hydrogens: true,
        },
    );
    assert_eq!((m.atoms[c0].x, m.atoms[c0].y), (10.0, 5.0));
    assert_eq!((m.atoms[c1].x, m.atoms[c1].y), (12.0, 5.0));
    // new atoms copy the anchored bond length
    let d = ((m.atoms[o].x - 12.0).powi(2) + (m.atoms[o].y - 5.0).powi(2)).sqrt();
    assert!((d - 2.0).abs() < 1e-3, "bond length {d}");
    assert!(min_distance(&m) > 1.0);
    assert_eq!(m.atom_count(), 4);
}

#[test]
fn marks_are_ignored_without_keep_marked() {
    let mut m = Molecule::new();
    let a = m.add_atom(Atom::new(6).at(50.0, 50.0));
    let b = m.add_atom(Atom::new(6));
    m.add_bond(a, b, BondOrder::Single);
    m.atoms[a].marked = true;

    AnchoredLayout::default().generate(&mut m, LayoutOptions::default());
    assert_eq!((m.atoms[a].x, m.atoms[a].y), (0.0, 0.0), "re-laid out from the origin");
}

#[test]
fn unanchored_components_go_to_the_right() {
    let mut m = mol("CC.O");
    m.atoms[0].marked = true;
    m.atoms[0].x = 3.0;
    AnchoredLayout::default().generate(
        &mut m,
        LayoutOptions {
            keep_marked: true,
            remove_added_hydrogens: false,
        },
    );
    assert_eq!(m.atoms[0].x, 3.0);
    assert!(m.atoms[2].x > m.atoms[0].x.max(m.atoms[1].x));
}

#[test]
fn custom_bond_length_is_used_without_anchors() {
    let layout = AnchoredLayout {
        cfg: Config {
            default_bond_length: 1.5,
            ..Config::default()
        },
    };
    let mut m = mol("CO");
    layout.generate(&mut m, LayoutOptions::default());
    let d = ((m.atoms[0].x - m.atoms[1].x).powi(2) + (m.atoms[0].y - m.atoms[1].y).powi(2)).sqrt();
    assert!((d - 1.5).abs() < 1e-4);
}
