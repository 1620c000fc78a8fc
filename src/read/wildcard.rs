// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wildcard matching over the flattened trie.
//!
//! Patterns are byte strings with four operators:
//!
//! | Syntax | Matches                    |
//! |--------|----------------------------|
//! | `.`    | exactly one byte           |
//! | `.?`   | zero or one byte           |
//! | `.*`   | zero or more bytes         |
//! | `.+`   | one or more bytes          |
//!
//! A backslash makes the next byte literal (`\.` is a dot). Bounded
//! repetition (`.{2,3}`) is rejected.
//!
//! Search runs in two phases. The literal prefix before the first operator
//! is resolved with the same descent exact lookup uses, which yields a
//! [`ResumePoint`]: a node plus how far into its label the prefix reached.
//! From there a walker explores `(node, label position, atom)` states. At
//! every state exactly one of four cases holds, each handled by its own
//! helper:
//!
//! 1. label and pattern both consumed: the node's token matches, collect it;
//! 2. pattern consumed, label not: the token is longer than the pattern
//!    allows, dead end;
//! 3. label consumed, pattern not: fan out into the children, each one
//!    offering its first label byte;
//! 4. neither consumed: match the next label byte in place.
//!
//! `.+` is compiled to `.` followed by `.*`, so the byte that satisfied the
//! `.` is exactly where the `.*` picks up. A pattern whose remainder is only
//! `.*` collects the whole subtree under the current state without further
//! matching.
//!
//! All traversal state lives in a per-call [`Walk`], so concurrent queries
//! against one reader never share anything mutable.

use std::collections::HashSet;

use super::exact::ResumePoint;
use super::node::{NodeRecord, NodeStore};
use super::TermMatch;
use crate::error::{IndexError, Result};
use crate::trie::NodeId;

/// Longest pattern accepted. The walker recurses once per atom, and no
/// token is longer than 255 bytes anyway.
const MAX_ATOMS: usize = 1024;

/// One compiled pattern element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Atom {
    Byte(u8),
    /// `.`
    One,
    /// `.?`
    Optional,
    /// `.*`
    Star,
}

impl Atom {
    #[inline]
    fn is_literal(self) -> bool {
        matches!(self, Atom::Byte(_))
    }
}

/// A parsed wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    atoms: Vec<Atom>,
}

impl Pattern {
    pub fn parse(pattern: &[u8]) -> Result<Self> {
        let unsupported = |reason| IndexError::UnsupportedPattern {
            pattern: String::from_utf8_lossy(pattern).into_owned(),
            reason,
        };

        let mut atoms = Vec::with_capacity(pattern.len());
        let mut i = 0;
        while i < pattern.len() {
            match pattern[i] {
                b'\\' => {
                    let &escaped = pattern
                        .get(i + 1)
                        .ok_or_else(|| unsupported("dangling escape"))?;
                    atoms.push(Atom::Byte(escaped));
                    i += 2;
                }
                b'.' => {
                    match pattern.get(i + 1) {
                        Some(b'?') => {
                            atoms.push(Atom::Optional);
                            i += 2;
                        }
                        Some(b'*') => {
                            atoms.push(Atom::Star);
                            i += 2;
                        }
                        Some(b'+') => {
                            atoms.push(Atom::One);
                            atoms.push(Atom::Star);
                            i += 2;
                        }
                        Some(b'{') => return Err(unsupported("bounded repetition")),
                        _ => {
                            atoms.push(Atom::One);
                            i += 1;
                        }
                    }
                }
                byte => {
                    atoms.push(Atom::Byte(byte));
                    i += 1;
                }
            }
        }

        // `.*.*` matches what `.*` does; collapsing keeps the walker's state
        // space small.
        atoms.dedup_by(|b, a| *a == Atom::Star && *b == Atom::Star);
        if atoms.len() > MAX_ATOMS {
            return Err(unsupported("pattern too long"));
        }
        Ok(Self { atoms })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// True when the pattern has no operators at all.
    pub fn is_literal(&self) -> bool {
        self.atoms.iter().all(|a| a.is_literal())
    }

    /// The literal bytes before the first operator.
    pub fn literal_prefix(&self) -> Vec<u8> {
        self.atoms
            .iter()
            .map_while(|a| match a {
                Atom::Byte(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Brute-force matcher, independent of any trie.
    pub fn matches(&self, token: &[u8]) -> bool {
        // reachable[j]: atoms[..i] can match token[..j]
        let mut reachable = vec![false; token.len() + 1];
        reachable[0] = true;
        for atom in &self.atoms {
            let mut next = vec![false; token.len() + 1];
            for j in 0..=token.len() {
                if !reachable[j] {
                    continue;
                }
                match *atom {
                    Atom::Byte(b) => {
                        if token.get(j) == Some(&b) {
                            next[j + 1] = true;
                        }
                    }
                    Atom::One => {
                        if j < token.len() {
                            next[j + 1] = true;
                        }
                    }
                    Atom::Optional => {
                        next[j] = true;
                        if j < token.len() {
                            next[j + 1] = true;
                        }
                    }
                    Atom::Star => {
                        for slot in next.iter_mut().skip(j) {
                            *slot = true;
                        }
                    }
                }
            }
            reachable = next;
        }
        reachable[token.len()]
    }
}

/// A walker position: node, bytes of its label already matched, next atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    node: NodeId,
    pos: u32,
    atom: u32,
}

/// Call-scoped traversal context.
struct Walk<'s> {
    store: &'s NodeStore,
    atoms: &'s [Atom],
    /// Bytes from the root to the current state.
    path: Vec<u8>,
    visited: HashSet<State>,
    collected: HashSet<NodeId>,
    out: Vec<TermMatch>,
}

impl NodeStore {
    /// All tokens matching `pattern`, in lexicographic order.
    pub fn wildcard(&self, pattern: &Pattern) -> Result<Vec<TermMatch>> {
        let prefix = pattern.literal_prefix();
        let Some(resume) = self.descend(&prefix)? else {
            return Ok(Vec::new());
        };

        let mut walk = Walk {
            store: self,
            atoms: &pattern.atoms,
            path: prefix,
            visited: HashSet::new(),
            collected: HashSet::new(),
            out: Vec::new(),
        };
        walk.resume(resume)?;

        let mut out = walk.out;
        out.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(out)
    }
}

impl Walk<'_> {
    fn resume(&mut self, at: ResumePoint) -> Result<()> {
        let record = self.store.node(at.node)?;
        self.step(&record, at.label_pos, at.matched)
    }

    /// Dispatch on the four label/pattern cases.
    fn step(&mut self, record: &NodeRecord<'_>, pos: usize, atom: usize) -> Result<()> {
        let state = State {
            node: record.id,
            pos: pos as u32,
            atom: atom as u32,
        };
        if !self.visited.insert(state) {
            return Ok(());
        }

        if self.atoms[atom..].iter().all(|a| *a == Atom::Star) && atom < self.atoms.len() {
            return self.collect_subtree(record, pos);
        }

        let label_done = pos == record.label.len();
        let pattern_done = atom == self.atoms.len();
        match (label_done, pattern_done) {
            (true, true) => {
                self.collect(record);
                Ok(())
            }
            // Leftover label bytes with nothing left to match them.
            (false, true) => Ok(()),
            (true, false) => self.into_children(record, atom),
            (false, false) => self.within_label(record, pos, atom),
        }
    }

    /// Case 3: the next byte comes from a child's label.
    fn into_children(&mut self, record: &NodeRecord<'_>, atom: usize) -> Result<()> {
        self.zero_width(record, record.label.len(), atom)?;
        match self.atoms[atom] {
            Atom::Byte(b) => {
                if let Some(child) = record.find_child(b) {
                    self.enter_child(child, b, atom + 1)?;
                }
            }
            consuming => {
                let next_atom = if consuming == Atom::Star { atom } else { atom + 1 };
                for (first, child) in record.children() {
                    self.enter_child(child, first, next_atom)?;
                }
            }
        }
        Ok(())
    }

    /// Case 4: the next byte is `label[pos]`.
    fn within_label(&mut self, record: &NodeRecord<'_>, pos: usize, atom: usize) -> Result<()> {
        self.zero_width(record, pos, atom)?;
        let byte = record.label[pos];
        let next_atom = match self.atoms[atom] {
            Atom::Byte(b) if b != byte => return Ok(()),
            Atom::Star => atom,
            _ => atom + 1,
        };
        self.path.push(byte);
        let result = self.step(record, pos + 1, next_atom);
        self.path.pop();
        result
    }

    /// `.?` and `.*` may also match nothing: try skipping them first.
    fn zero_width(&mut self, record: &NodeRecord<'_>, pos: usize, atom: usize) -> Result<()> {
        match self.atoms[atom] {
            Atom::Optional | Atom::Star => self.step(record, pos, atom + 1),
            _ => Ok(()),
        }
    }

    fn enter_child(&mut self, child: NodeId, first: u8, next_atom: usize) -> Result<()> {
        let record = self.store.node(child)?;
        if record.label.first() != Some(&first) {
            return Err(IndexError::corrupt(
                "ftx.node",
                format!("child {} listed under byte {:#04x}", child, first),
            ));
        }
        self.path.push(first);
        let result = self.step(&record, 1, next_atom);
        self.path.pop();
        result
    }

    /// Case 1.
    fn collect(&mut self, record: &NodeRecord<'_>) {
        if !record.postings.is_empty() && self.collected.insert(record.id) {
            self.out.push(TermMatch {
                token: self.path.clone(),
                postings: record.postings,
            });
        }
    }

    /// Trailing `.*`: everything at or below `(record, pos)` matches.
    fn collect_subtree(&mut self, record: &NodeRecord<'_>, pos: usize) -> Result<()> {
        let depth = self.path.len();
        self.path.extend_from_slice(&record.label[pos..]);
        self.collect(record);

        let mut stack: Vec<(NodeId, usize)> = record
            .children()
            .rev()
            .map(|(_, id)| (id, self.path.len()))
            .collect();
        while let Some((id, above)) = stack.pop() {
            let node = self.store.node(id)?;
            self.path.truncate(above);
            self.path.extend_from_slice(node.label);
            self.collect(&node);
            let below = self.path.len();
            stack.extend(node.children().rev().map(|(_, child)| (child, below)));
        }

        self.path.truncate(depth);
        Ok(())
    }
}
