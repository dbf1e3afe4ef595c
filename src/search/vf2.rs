//! Substructure matching via VF2-style subgraph monomorphism.
//!
//! Atoms match on element, charge, isotope (when the fragment specifies one)
//! and aromaticity; bonds match on bond order. Extra target bonds between
//! matched atoms are allowed.

use std::collections::{HashSet, VecDeque};

use super::{AtomMapping, SubstructureMatcher, atoms_compatible, bonds_compatible};
use crate::model::Molecule;

/// Default [`SubstructureMatcher`]. An empty fragment never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vf2Matcher;

impl SubstructureMatcher for Vf2Matcher {
    fn find_first(&self, fragment: &Molecule, target: &Molecule) -> Option<AtomMapping> {
        let mut state = Vf2State::new(fragment, target, 1);
        state.search();
        state.matches.into_iter().next()
    }

    fn find_all(&self, fragment: &Molecule, target: &Molecule, limit: usize) -> Vec<AtomMapping> {
        let mut state = Vf2State::new(fragment, target, limit);
        state.search();
        state.matches
    }
}

struct Vf2State<'a> {
    fragment: &'a Molecule,
    target: &'a Molecule,
    frag_adj: Vec<Vec<(usize, usize)>>,
    target_adj: Vec<Vec<(usize, usize)>>,
    order: Vec<usize>,
    // core_frag[p] = Some(t) means fragment atom p is mapped to target atom t
    core_frag: Vec<Option<usize>>,
    target_used: Vec<bool>,
    seen: HashSet<Vec<usize>>,
    matches: Vec<AtomMapping>,
    limit: usize,
}

impl<'a> Vf2State<'a> {
    fn new(fragment: &'a Molecule, target: &'a Molecule, limit: usize) -> Self {
        let frag_adj = fragment.adjacency();
        let order = connected_order(fragment, &frag_adj);
        Self {
            fragment,
            target,
            frag_adj,
            target_adj: target.adjacency(),
            order,
            core_frag: vec![None; fragment.atom_count()],
            target_used: vec![false; target.atom_count()],
            seen: HashSet::new(),
            matches: Vec::new(),
            limit,
        }
    }

    fn search(&mut self) {
        if self.fragment.is_empty()
            || self.limit == 0
            || self.fragment.atom_count() > self.target.atom_count()
            || self.fragment.bond_count() > self.target.bond_count()
        {
            return;
        }
        self.match_recursive(0);
    }

    fn done(&self) -> bool {
        self.matches.len() >= self.limit
    }

    fn match_recursive(&mut self, depth: usize) {
        if self.done() {
            return;
        }
        if depth == self.order.len() {
            let mapping: AtomMapping =
                self.core_frag.iter().map(|t| t.unwrap_or(usize::MAX)).collect();
            let mut key = mapping.clone();
            key.sort_unstable();
            if self.seen.insert(key) {
                self.matches.push(mapping);
            }
            return;
        }

        let p = self.order[depth];
        for t in self.candidates(p) {
            if self.target_used[t] || !self.is_feasible(p, t) {
                continue;
            }
            self.core_frag[p] = Some(t);
            self.target_used[t] = true;
            self.match_recursive(depth + 1);
            self.core_frag[p] = None;
            self.target_used[t] = false;
            if self.done() {
                return;
            }
        }
    }

    /// Restrict to neighbors of an already mapped neighbor's image, if any.
    fn candidates(&self, p: usize) -> Vec<usize> {
        for &(q, _) in &self.frag_adj[p] {
            if let Some(tq) = self.core_frag[q] {
                return self.target_adj[tq].iter().map(|&(n, _)| n).collect();
            }
        }
        (0..self.target.atom_count()).collect()
    }

    fn is_feasible(&self, p: usize, t: usize) -> bool {
        if !atoms_compatible(&self.fragment.atoms[p], &self.target.atoms[t]) {
            return false;
        }
        if self.frag_adj[p].len() > self.target_adj[t].len() {
            return false;
        }
        for &(q, fb) in &self.frag_adj[p] {
            let Some(tq) = self.core_frag[q] else {
                continue;
            };
            let bond = self.target_adj[t]
                .iter()
                .find(|&&(n, _)| n == tq)
                .map(|&(_, tb)| &self.target.bonds[tb]);
            match bond {
                Some(tb) if bonds_compatible(&self.fragment.bonds[fb], tb) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Fragment atoms in BFS order per component, each component rooted at its
/// highest-degree atom, so every atom after a root has a mapped neighbor.
fn connected_order(mol: &Molecule, adj: &[Vec<(usize, usize)>]) -> Vec<usize> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut roots: Vec<usize> = (0..n).collect();
    roots.sort_by(|&a, &b| adj[b].len().cmp(&adj[a].len()).then(a.cmp(&b)));
    for root in roots {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(a) = queue.pop_front() {
            order.push(a);
            for &(nb, _) in &adj[a] {
                if !visited[nb] {
                    visited[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
    }
    order
}
