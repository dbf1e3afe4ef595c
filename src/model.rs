use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::color::Rgb;

// ────────────────────────────────────────────────────────────────────────────
// Atom
// ────────────────────────────────────────────────────────────────────────────

/// Where an atom's display color came from.
///
/// `Explicit` colors are set by sources outside the highlighting engine (for
/// example a per-record property coloring) and are never overwritten.
/// `Highlight` colors are owned by the engine and are reset before every
/// colorization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "source", content = "rgb", rename_all = "snake_case")]
pub enum AtomColor {
    #[default]
    Default,
    Explicit(Rgb),
    Highlight(Rgb),
}

impl AtomColor {
    pub fn is_explicit(&self) -> bool {
        matches!(self, AtomColor::Explicit(_))
    }

    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            AtomColor::Default => None,
            AtomColor::Explicit(c) | AtomColor::Highlight(c) => Some(*c),
        }
    }
}

/// A single atom. Indices into [`Molecule::atoms`] are stable for the lifetime
/// of a molecule value; atoms are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Atomic number (6 = carbon).
    pub atomic_no: u8,
    #[serde(default)]
    pub charge: i8,
    /// Isotope mass, 0 for natural abundance.
    #[serde(default)]
    pub mass: u16,
    #[serde(default)]
    pub aromatic: bool,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub color: AtomColor,
    /// Layout anchor: a coordinate generator must not move marked atoms.
    #[serde(default)]
    pub marked: bool,
    /// Appended by differencing-mode grafting.
    #[serde(default)]
    pub grafted: bool,
}

impl Atom {
    pub fn new(atomic_no: u8) -> Self {
        Self {
            atomic_no,
            charge: 0,
            mass: 0,
            aromatic: false,
            x: 0.0,
            y: 0.0,
            color: AtomColor::Default,
            marked: false,
            grafted: false,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Copy of the chemical identity (element, charge, isotope, aromaticity)
    /// without position, color or flags.
    pub fn chemical_copy(&self) -> Self {
        Self {
            charge: self.charge,
            mass: self.mass,
            aromatic: self.aromatic,
            ..Self::new(self.atomic_no)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bond
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    #[serde(default)]
    pub order: BondOrder,
    /// Receding background highlight (the non-common part in differencing mode).
    #[serde(default)]
    pub background_hilite: bool,
    /// Emphasized foreground highlight (grafted bonds).
    #[serde(default)]
    pub foreground_hilite: bool,
    #[serde(default)]
    pub grafted: bool,
}

impl Bond {
    pub fn new(atom1: usize, atom2: usize, order: BondOrder) -> Self {
        Self {
            atom1,
            atom2,
            order,
            background_hilite: false,
            foreground_hilite: false,
            grafted: false,
        }
    }

    /// The endpoint opposite to `atom`, if `atom` is an endpoint.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.atom1 == atom {
            Some(self.atom2)
        } else if self.atom2 == atom {
            Some(self.atom1)
        } else {
            None
        }
    }

    pub fn touches(&self, atom: usize) -> bool {
        self.atom1 == atom || self.atom2 == atom
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Molecule
// ────────────────────────────────────────────────────────────────────────────

/// A molecule graph with per-atom colors and per-bond highlight flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Molecule {
    #[serde(default)]
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Append an atom and return its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Append a bond and return its index. Callers are responsible for passing
    /// valid atom indices.
    pub fn add_bond(&mut self, atom1: usize, atom2: usize, order: BondOrder) -> usize {
        self.bonds.push(Bond::new(atom1, atom2, order));
        self.bonds.len() - 1
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.bonds
            .iter()
            .find(|bond| {
                (bond.atom1 == a && bond.atom2 == b) || (bond.atom1 == b && bond.atom2 == a)
            })
    }

    /// Neighbor lists `(neighbor atom, bond index)` for every atom.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); self.atoms.len()];
        for (i, bond) in self.bonds.iter().enumerate() {
            if bond.atom1 < adj.len() && bond.atom2 < adj.len() {
                adj[bond.atom1].push((bond.atom2, i));
                adj[bond.atom2].push((bond.atom1, i));
            }
        }
        adj
    }

    /// Atoms of the connected component containing `atom`, in BFS order.
    /// Returns an empty list for an out-of-range index.
    pub fn fragment_atoms(&self, atom: usize) -> Vec<usize> {
        if atom >= self.atoms.len() {
            return Vec::new();
        }
        let adj = self.adjacency();
        let mut seen = vec![false; self.atoms.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([atom]);
        seen[atom] = true;
        while let Some(a) = queue.pop_front() {
            order.push(a);
            for &(n, _) in &adj[a] {
                if !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
        order
    }

    /// Set a highlight color on `atom` unless it carries an explicit color.
    /// Returns whether the color was applied.
    pub fn highlight_atom(&mut self, atom: usize, color: Rgb) -> bool {
        match self.atoms.get_mut(atom) {
            Some(a) if !a.color.is_explicit() => {
                a.color = AtomColor::Highlight(color);
                true
            }
            _ => false,
        }
    }

    /// Strip everything a previous highlighting pass produced: highlight colors,
    /// bond highlight flags, marks and grafted atoms/bonds. Explicit colors and
    /// coordinates of the remaining atoms are untouched.
    pub fn clear_highlights(&mut self) {
        if self.atoms.iter().any(|a| a.grafted) {
            let keep = self.atoms.iter().take_while(|a| !a.grafted).count();
            // grafted atoms are always appended after all original atoms
            self.atoms.truncate(keep);
            self.bonds
                .retain(|b| !b.grafted && b.atom1 < keep && b.atom2 < keep);
        }
        for atom in &mut self.atoms {
            if let AtomColor::Highlight(_) = atom.color {
                atom.color = AtomColor::Default;
            }
            atom.marked = false;
        }
        for bond in &mut self.bonds {
            bond.background_hilite = false;
            bond.foreground_hilite = false;
        }
    }

    /// Average bond length over bonds whose endpoints both have been placed,
    /// or `None` when no such bond exists.
    pub fn average_bond_length(&self, placed: impl Fn(usize) -> bool) -> Option<f32> {
        let mut sum = 0.0f32;
        let mut n = 0usize;
        for b in &self.bonds {
            if !(placed(b.atom1) && placed(b.atom2)) {
                continue;
            }
            if let (Some(a1), Some(a2)) = (self.atoms.get(b.atom1), self.atoms.get(b.atom2)) {
                let len = ((a1.x - a2.x).powi(2) + (a1.y - a2.y).powi(2)).sqrt();
                if len > f32::EPSILON {
                    sum += len;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| sum / n as f32)
    }
}
