//! Maximum common connected subgraph by branch-and-bound growth.
//!
//! A mapping is grown from a seed atom pair by repeatedly taking the lowest
//! unmapped primary atom adjacent to the mapping and either pairing it with a
//! compatible secondary atom (joined through at least one compatible bond) or
//! excluding it. The largest mapping found wins, ties broken by bond count.
//! The search stops after `budget` expansions and returns the best so far.

use super::{McsFinder, atoms_compatible, bonds_compatible};
use crate::model::{Bond, Molecule};

#[derive(Debug, Clone, Copy)]
pub struct BacktrackMcs {
    pub budget: usize,
}

impl Default for BacktrackMcs {
    fn default() -> Self {
        Self { budget: 200_000 }
    }
}

impl McsFinder for BacktrackMcs {
    fn find_mcs(&self, primary: &Molecule, secondary: &Molecule) -> Option<Molecule> {
        if primary.is_empty() || secondary.is_empty() {
            return None;
        }
        let mut search = McsSearch::new(primary, secondary, self.budget);
        search.run();
        search.into_fragment()
    }
}

struct McsSearch<'a> {
    p: &'a Molecule,
    s: &'a Molecule,
    p_adj: Vec<Vec<(usize, usize)>>,
    s_adj: Vec<Vec<(usize, usize)>>,
    map_p: Vec<Option<usize>>,
    used_s: Vec<bool>,
    excluded: Vec<bool>,
    mapped: usize,
    best: Vec<(usize, usize)>,
    best_score: (usize, usize),
    expansions: usize,
    budget: usize,
}

impl<'a> McsSearch<'a> {
    fn new(p: &'a Molecule, s: &'a Molecule, budget: usize) -> Self {
        Self {
            p,
            s,
            p_adj: p.adjacency(),
            s_adj: s.adjacency(),
            map_p: vec![None; p.atom_count()],
            used_s: vec![false; s.atom_count()],
            excluded: vec![false; p.atom_count()],
            mapped: 0,
            best: Vec::new(),
            best_score: (0, 0),
            expansions: 0,
            budget,
        }
    }

    fn exhausted(&self) -> bool {
        self.expansions >= self.budget
    }

    fn run(&mut self) {
        let limit = self.p.atom_count().min(self.s.atom_count());
        for p0 in 0..self.p.atom_count() {
            // atoms below the seed were covered by earlier seeds
            for (i, ex) in self.excluded.iter_mut().enumerate() {
                *ex = i < p0;
            }
            for s0 in 0..self.s.atom_count() {
                if !atoms_compatible(&self.p.atoms[p0], &self.s.atoms[s0]) {
                    continue;
                }
                self.assign(p0, s0);
                self.grow();
                self.unassign(p0, s0);
                if self.exhausted() || self.best_score.0 == limit {
                    return;
                }
            }
        }
    }

    fn assign(&mut self, p: usize, s: usize) {
        self.map_p[p] = Some(s);
        self.used_s[s] = true;
        self.mapped += 1;
    }

    fn unassign(&mut self, p: usize, s: usize) {
        self.map_p[p] = None;
        self.used_s[s] = false;
        self.mapped -= 1;
    }

    fn grow(&mut self) {
        self.expansions += 1;
        self.record();
        if self.exhausted() {
            return;
        }

        let open_p = (0..self.p.atom_count())
            .filter(|&i| self.map_p[i].is_none() && !self.excluded[i])
            .count();
        let open_s = self.used_s.iter().filter(|u| !**u).count();
        if self.mapped + open_p.min(open_s) < self.best_score.0 {
            return;
        }

        let Some(p) = self.frontier() else {
            return;
        };
        for s in self.candidates(p) {
            self.assign(p, s);
            self.grow();
            self.unassign(p, s);
            if self.exhausted() {
                return;
            }
        }
        self.excluded[p] = true;
        self.grow();
        self.excluded[p] = false;
    }

    fn frontier(&self) -> Option<usize> {
        (0..self.p.atom_count()).find(|&i| {
            self.map_p[i].is_none()
                && !self.excluded[i]
                && self.p_adj[i].iter().any(|&(n, _)| self.map_p[n].is_some())
        })
    }

    fn candidates(&self, p: usize) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for &(q, pb) in &self.p_adj[p] {
            let Some(sq) = self.map_p[q] else {
                continue;
            };
            for &(s, sb) in &self.s_adj[sq] {
                if self.used_s[s] || out.contains(&s) {
                    continue;
                }
                if atoms_compatible(&self.p.atoms[p], &self.s.atoms[s])
                    && bonds_compatible(&self.p.bonds[pb], &self.s.bonds[sb])
                {
                    out.push(s);
                }
            }
        }
        out
    }

    fn common_bonds(&self) -> usize {
        self.p
            .bonds
            .iter()
            .filter(|b| self.bond_image(b.atom1, b.atom2, b).is_some())
            .count()
    }

    fn bond_image(&self, a: usize, b: usize, bond: &Bond) -> Option<usize> {
        let sa = self.map_p.get(a).copied().flatten()?;
        let sb = self.map_p.get(b).copied().flatten()?;
        self.s_adj[sa]
            .iter()
            .find(|&&(n, idx)| n == sb && bonds_compatible(bond, &self.s.bonds[idx]))
            .map(|&(_, idx)| idx)
    }

    fn record(&mut self) {
        let score = (self.mapped, self.common_bonds());
        if score > self.best_score {
            self.best_score = score;
            self.best = self
                .map_p
                .iter()
                .enumerate()
                .filter_map(|(p, s)| s.map(|s| (p, s)))
                .collect();
        }
    }

    fn into_fragment(mut self) -> Option<Molecule> {
        if self.best.is_empty() {
            return None;
        }
        self.map_p = vec![None; self.p.atom_count()];
        let mut fragment = Molecule::new();
        let mut index = vec![usize::MAX; self.p.atom_count()];
        for &(p, s) in &self.best {
            self.map_p[p] = Some(s);
            index[p] = fragment.add_atom(self.p.atoms[p].chemical_copy());
        }
        for bond in &self.p.bonds {
            if self.bond_image(bond.atom1, bond.atom2, bond).is_some() {
                fragment.add_bond(index[bond.atom1], index[bond.atom2], bond.order);
            }
        }
        Some(fragment)
    }
}
