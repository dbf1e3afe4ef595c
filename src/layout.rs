//! Deterministic 2D placement of unplaced atoms around fixed anchors.
//!
//! Atoms that are marked (when [`LayoutOptions::keep_marked`] is set) keep
//! their coordinates. Every other atom is placed breadth-first, one bond length
//! away from an already placed neighbor:
//! - The preferred direction points away from the neighbor's other placed
//!   bonds, so chains grow outward
//! - Candidate directions are tried in a fixed order (0, +step, -step,
//!   +2*step, -2*step, ...) and the first one that keeps a minimum separation
//!   from all placed atoms wins
//! - If no candidate is free, the one with the largest clearance is used
//! - Components without any anchor are laid out from scratch to the right of
//!   everything already placed
//!
//! The algorithm uses no randomness; the same input always gives the same
//! coordinates.

use std::collections::VecDeque;
use std::f32::consts::PI;

use crate::model::Molecule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
    pub fn from_angle(angle: f32, len: f32) -> Self {
        Self::new(angle.cos() * len, angle.sin() * len)
    }
    pub fn add(self, o: Vec2f) -> Vec2f {
        Vec2f::new(self.x + o.x, self.y + o.y)
    }
    pub fn sub(self, o: Vec2f) -> Vec2f {
        Vec2f::new(self.x - o.x, self.y - o.y)
    }
    pub fn norm(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }
}

/// Constraints for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    /// Marked atoms are anchors and must not move.
    pub keep_marked: bool,
    /// Drop hydrogens the generator added while computing the layout.
    /// [`AnchoredLayout`] never adds any.
    pub remove_added_hydrogens: bool,
}

pub trait CoordinateGenerator {
    /// Assign coordinates to the atoms of `mol` subject to `options`.
    fn generate(&self, mol: &mut Molecule, options: LayoutOptions);
}

impl<T: CoordinateGenerator + ?Sized> CoordinateGenerator for &T {
    fn generate(&self, mol: &mut Molecule, options: LayoutOptions) {
        (**self).generate(mol, options)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Used when no anchored bond gives a length to copy.
    pub default_bond_length: f32,
    pub angle_step_deg: f32,
    /// Minimum distance to other atoms as a fraction of the bond length.
    pub min_separation: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_bond_length: 1.0,
            angle_step_deg: 30.0,
            min_separation: 0.6,
        }
    }
}

/// Default [`CoordinateGenerator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredLayout {
    pub cfg: Config,
}

impl CoordinateGenerator for AnchoredLayout {
    fn generate(&self, mol: &mut Molecule, options: LayoutOptions) {
        let n = mol.atom_count();
        if n == 0 {
            return;
        }
        let mut placed: Vec<bool> = mol
            .atoms
            .iter()
            .map(|a| options.keep_marked && a.marked)
            .collect();
        let bond_len = mol
            .average_bond_length(|i| placed[i])
            .unwrap_or(self.cfg.default_bond_length);
        let adj = mol.adjacency();

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| placed[i]).collect();
        loop {
            while let Some(a) = queue.pop_front() {
                for &(nb, _) in &adj[a] {
                    if placed[nb] {
                        continue;
                    }
                    let pos = self.place_next_to(mol, &adj, &placed, a, bond_len);
                    mol.atoms[nb].x = pos.x;
                    mol.atoms[nb].y = pos.y;
                    placed[nb] = true;
                    queue.push_back(nb);
                }
            }
            // seed the next component without anchors
            let Some(root) = (0..n).find(|&i| !placed[i]) else {
                break;
            };
            let origin = right_of_placed(mol, &placed, bond_len);
            mol.atoms[root].x = origin.x;
            mol.atoms[root].y = origin.y;
            placed[root] = true;
            queue.push_back(root);
        }
    }
}

impl AnchoredLayout {
    fn place_next_to(
        &self,
        mol: &Molecule,
        adj: &[Vec<(usize, usize)>],
        placed: &[bool],
        anchor: usize,
        bond_len: f32,
    ) -> Vec2f {
        let center = pos_of(mol, anchor);
        // Direction away from the anchor's placed neighbors
        let mut pull = Vec2f::new(0.0, 0.0);
        for &(nb, _) in &adj[anchor] {
            if placed[nb] {
                let d = pos_of(mol, nb).sub(center);
                let l = d.norm();
                if l > f32::EPSILON {
                    pull = pull.add(Vec2f::new(d.x / l, d.y / l));
                }
            }
        }
        let base = if pull.norm() > 1e-3 {
            pull.angle() + PI
        } else if let Some(&(nb, _)) = adj[anchor].iter().find(|&&(nb, _)| placed[nb]) {
            // neighbors cancel out (linear), turn sideways
            pos_of(mol, nb).sub(center).angle() + PI / 2.0
        } else {
            -PI / 6.0
        };

        let step = self.cfg.angle_step_deg.to_radians().max(1e-3);
        let max_k = (PI / step).ceil() as i32;
        let min_dist = self.cfg.min_separation * bond_len;
        let mut best: Option<(Vec2f, f32)> = None;
        for k in 0..=max_k {
            let deltas: &[f32] = if k == 0 { &[0.0] } else { &[1.0, -1.0] };
            for sign in deltas {
                let angle = base + sign * k as f32 * step;
                let cand = center.add(Vec2f::from_angle(angle, bond_len));
                let clearance = clearance(mol, placed, anchor, cand);
                if clearance >= min_dist {
                    return cand;
                }
                if best.map(|(_, c)| clearance > c).unwrap_or(true) {
                    best = Some((cand, clearance));
                }
            }
        }
        best.map(|(p, _)| p)
            .unwrap_or_else(|| center.add(Vec2f::from_angle(base, bond_len)))
    }
}

fn pos_of(mol: &Molecule, atom: usize) -> Vec2f {
    Vec2f::new(mol.atoms[atom].x, mol.atoms[atom].y)
}

/// Distance from `p` to the closest placed atom other than `skip`.
fn clearance(mol: &Molecule, placed: &[bool], skip: usize, p: Vec2f) -> f32 {
    (0..mol.atom_count())
        .filter(|&i| placed[i] && i != skip)
        .map(|i| pos_of(mol, i).sub(p).norm())
        .fold(f32::INFINITY, f32::min)
}

fn right_of_placed(mol: &Molecule, placed: &[bool], bond_len: f32) -> Vec2f {
    let mut max_x: Option<f32> = None;
    let mut min_y = 0.0f32;
    for (i, atom) in mol.atoms.iter().enumerate() {
        if placed[i] {
            max_x = Some(max_x.map_or(atom.x, |m| m.max(atom.x)));
            min_y = min_y.min(atom.y);
        }
    }
    match max_x {
        Some(x) => Vec2f::new(x + 2.0 * bond_len, min_y),
        None => Vec2f::new(0.0, 0.0),
    }
}
