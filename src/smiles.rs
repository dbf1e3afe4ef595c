//! Minimal SMILES reader used to build reference fragments and table cells.
//!
//! Supports the organic subset (`B C N O P S F Cl Br I`, aromatic lowercase),
//! bracket atoms with isotope and charge (`[13CH3+]`, `[O-]`, `[nH]`),
//! branches, ring closures (`1`..`9`, `%nn`), bond symbols `- = # :` and `.`
//! for disconnected components. Stereo marks and hydrogen counts are accepted
//! and ignored. Parsed molecules carry no coordinates.

use std::collections::BTreeMap;

use crate::model::{Atom, BondOrder, Molecule};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmilesError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("unterminated bracket atom starting at position {0}")]
    UnterminatedBracket(usize),
    #[error("unbalanced parenthesis at position {0}")]
    UnbalancedParen(usize),
    #[error("ring closure {0} never closed")]
    UnclosedRing(u16),
    #[error("bond symbol at position {0} is not followed by an atom")]
    DanglingBond(usize),
    /// Ring closure onto the opening atom itself or onto an already bonded atom.
    #[error("ring closure {0} would duplicate a bond")]
    InvalidRingBond(u16),
}

pub type Result<T> = std::result::Result<T, SmilesError>;

/// Parse a SMILES string into a [`Molecule`].
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    let mut parser = SmilesParser::new(smiles.trim());
    parser.parse()?;
    Ok(parser.mol)
}

struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    mol: Molecule,
    stack: Vec<Option<usize>>,
    prev_atom: Option<usize>,
    pending_bond: Option<(BondOrder, usize)>,
    ring_closures: BTreeMap<u16, (usize, Option<BondOrder>)>,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            mol: Molecule::new(),
            stack: Vec::new(),
            prev_atom: None,
            pending_bond: None,
            ring_closures: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn parse(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    self.advance();
                    self.stack.push(self.prev_atom);
                }
                b')' => {
                    if self.stack.is_empty() {
                        return Err(SmilesError::UnbalancedParen(self.pos));
                    }
                    self.advance();
                    self.prev_atom = self.stack.pop().flatten();
                    self.pending_bond = None;
                }
                b'-' | b'=' | b'#' | b':' => {
                    self.advance();
                    let order = match ch {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending_bond = Some((order, self.pos - 1));
                }
                // cis/trans marks do not change connectivity
                b'/' | b'\\' => {
                    self.advance();
                }
                b'.' => {
                    self.advance();
                    self.prev_atom = None;
                    self.pending_bond = None;
                }
                b'%' => {
                    self.advance();
                    let num = self.two_digit_ring()?;
                    self.ring_closure(num)?;
                }
                b'0'..=b'9' => {
                    self.advance();
                    self.ring_closure((ch - b'0') as u16)?;
                }
                b'[' => self.bracket_atom()?,
                c if c.is_ascii_alphabetic() => self.organic_atom()?,
                c => {
                    return Err(SmilesError::UnexpectedChar { ch: c as char, pos: self.pos });
                }
            }
        }
        if !self.stack.is_empty() {
            return Err(SmilesError::UnbalancedParen(self.pos));
        }
        if let Some((_, pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond(pos));
        }
        if let Some((&num, _)) = self.ring_closures.iter().next() {
            return Err(SmilesError::UnclosedRing(num));
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<()> {
        let start = self.pos;
        let ch = self.advance().unwrap_or(b'?');
        let aromatic = ch.is_ascii_lowercase();
        let atomic_no = match ch {
            b'B' if self.peek() == Some(b'r') => {
                self.advance();
                35
            }
            b'C' if self.peek() == Some(b'l') => {
                self.advance();
                17
            }
            b'B' | b'b' => 5,
            b'C' | b'c' => 6,
            b'N' | b'n' => 7,
            b'O' | b'o' => 8,
            b'P' | b'p' => 15,
            b'S' | b's' => 16,
            b'F' => 9,
            b'I' => 53,
            _ => {
                let sym = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
                return Err(SmilesError::UnknownElement(sym));
            }
        };
        let mut atom = Atom::new(atomic_no);
        atom.aromatic = aromatic;
        self.push_atom(atom);
        Ok(())
    }

    fn bracket_atom(&mut self) -> Result<()> {
        let start = self.pos;
        self.advance(); // '['
        let mut mass = 0u16;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            mass = mass.saturating_mul(10).saturating_add((d - b'0') as u16);
        }
        let sym_start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.advance();
            }
            _ => return Err(SmilesError::UnterminatedBracket(start)),
        }
        if self.peek().is_some_and(|c| c.is_ascii_lowercase()) {
            let two = &self.input[sym_start..self.pos + 1];
            if element_number(&String::from_utf8_lossy(two)).is_some() {
                self.advance();
            }
        }
        let symbol = String::from_utf8_lossy(&self.input[sym_start..self.pos]).into_owned();
        let aromatic = symbol.starts_with(|c: char| c.is_ascii_lowercase());
        let atomic_no = element_number(&symbol).ok_or(SmilesError::UnknownElement(symbol))?;

        let mut charge = 0i8;
        loop {
            match self.peek() {
                Some(b']') => {
                    self.advance();
                    break;
                }
                // chirality and hydrogen counts are not represented
                Some(b'@') | Some(b'H') => {
                    self.advance();
                }
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                }
                Some(sign @ (b'+' | b'-')) => {
                    self.advance();
                    let unit: i8 = if sign == b'+' { 1 } else { -1 };
                    let mut count = 1i8;
                    if let Some(d) = self.peek().filter(u8::is_ascii_digit) {
                        self.advance();
                        count = (d - b'0') as i8;
                    } else {
                        while self.peek() == Some(sign) {
                            self.advance();
                            count = count.saturating_add(1);
                        }
                    }
                    charge = charge.saturating_add(unit * count);
                }
                Some(c) => {
                    return Err(SmilesError::UnexpectedChar { ch: c as char, pos: self.pos });
                }
                None => return Err(SmilesError::UnterminatedBracket(start)),
            }
        }

        let mut atom = Atom::new(atomic_no).with_charge(charge);
        atom.mass = mass;
        atom.aromatic = aromatic;
        self.push_atom(atom);
        Ok(())
    }

    fn push_atom(&mut self, atom: Atom) {
        let aromatic = atom.aromatic;
        let idx = self.mol.add_atom(atom);
        if let Some(prev) = self.prev_atom {
            let order = self.pending_bond.take().map(|(o, _)| o).unwrap_or_else(|| {
                if aromatic && self.mol.atoms[prev].aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            });
            self.mol.add_bond(prev, idx, order);
        }
        self.pending_bond = None;
        self.prev_atom = Some(idx);
    }

    fn two_digit_ring(&mut self) -> Result<u16> {
        let mut num = 0u16;
        for _ in 0..2 {
            match self.advance() {
                Some(d) if d.is_ascii_digit() => num = num * 10 + (d - b'0') as u16,
                Some(c) => {
                    return Err(SmilesError::UnexpectedChar { ch: c as char, pos: self.pos - 1 });
                }
                None => return Err(SmilesError::UnclosedRing(num)),
            }
        }
        Ok(num)
    }

    fn ring_closure(&mut self, num: u16) -> Result<()> {
        let Some(current) = self.prev_atom else {
            return Err(SmilesError::UnexpectedChar {
                ch: char::from_digit((num % 10) as u32, 10).unwrap_or('?'),
                pos: self.pos - 1,
            });
        };
        let pending = self.pending_bond.take().map(|(o, _)| o);
        match self.ring_closures.remove(&num) {
            Some((opener, opener_bond)) => {
                if opener == current || self.mol.bond_between(opener, current).is_some() {
                    return Err(SmilesError::InvalidRingBond(num));
                }
                let order = pending.or(opener_bond).unwrap_or_else(|| {
                    if self.mol.atoms[opener].aromatic && self.mol.atoms[current].aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    }
                });
                self.mol.add_bond(opener, current, order);
            }
            None => {
                self.ring_closures.insert(num, (current, pending));
            }
        }
        Ok(())
    }
}

fn element_number(symbol: &str) -> Option<u8> {
    let n = match symbol {
        "H" => 1,
        "He" => 2,
        "Li" => 3,
        "Be" => 4,
        "B" | "b" => 5,
        "C" | "c" => 6,
        "N" | "n" => 7,
        "O" | "o" => 8,
        "F" => 9,
        "Ne" => 10,
        "Na" => 11,
        "Mg" => 12,
        "Al" => 13,
        "Si" => 14,
        "P" | "p" => 15,
        "S" | "s" => 16,
        "Cl" => 17,
        "Ar" => 18,
        "K" => 19,
        "Ca" => 20,
        "Fe" => 26,
        "Co" => 27,
        "Ni" => 28,
        "Cu" => 29,
        "Zn" => 30,
        "As" | "as" => 33,
        "Se" | "se" => 34,
        "Br" => 35,
        "Pd" => 46,
        "Ag" => 47,
        "Sn" => 50,
        "I" => 53,
        "Pt" => 78,
        "Au" => 79,
        "Hg" => 80,
        _ => return None,
    };
    Some(n)
}
