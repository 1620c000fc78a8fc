// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Flattening the in-memory trie into the node files.
//!
//! Compaction consumes the trie. It runs in two passes over the arena:
//!
//! 1. **Numbering.** An iterative preorder walk hands out node ids. Every
//!    child pointer is checked on the way: a pointer past the arena, or a
//!    node reached twice, is an internal consistency failure, and so is any
//!    arena slot the walk never reaches.
//! 2. **Emitting.** Nodes are written in id order. Because every child
//!    already has its final id from pass 1, each record is complete the
//!    moment it is written and never patched afterwards. Labels, child
//!    lists and payloads are moved out of the arena as they are written.
//!
//! Payloads go to the caller's `emit` callback together with the full token
//! they belong to. Preorder over first-byte-sorted children visits tokens in
//! lexicographic order, which is what the token table wants.
//!
//! Record layout (all integers little endian):
//!
//! ```text
//! [label_len:u8][label...][(child_id:u32, first:u8) × n][count:u32][pointer:u40]
//! ```

use std::mem;

use super::{Node, NodeId, RadixTrie, ROOT};
use crate::binary::encoding::{put_u32, put_u40};
use crate::error::{IndexError, Result};
use crate::types::PostingsRef;

/// Bytes taken by the child-free parts of a record, besides the label.
pub const RECORD_FIXED: usize = 1 + 4 + 5;

/// Bytes per child entry.
pub const CHILD_ENTRY: usize = 5;

/// The flat form of a trie: node sizes and concatenated node records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedTrie {
    /// Byte length of each node record, indexed by node id.
    pub node_sizes: Vec<u32>,
    pub node_data: Vec<u8>,
}

impl FlattenedTrie {
    pub fn node_count(&self) -> usize {
        self.node_sizes.len()
    }

    /// `node_sizes` as the bytes of the node-size file.
    pub fn sizes_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.node_sizes.len() * 4);
        for &size in &self.node_sizes {
            put_u32(size, &mut buf);
        }
        buf
    }
}

/// Consume `trie` and lay it out in preorder.
///
/// `emit` receives each token and its payload in lexicographic order and
/// returns where the postings ended up.
pub fn compact<T, F>(trie: RadixTrie<T>, mut emit: F) -> Result<FlattenedTrie>
where
    F: FnMut(&[u8], T) -> Result<PostingsRef>,
{
    let mut nodes = trie.nodes;
    let plan = number_nodes(&nodes)?;

    let mut out = FlattenedTrie {
        node_sizes: Vec::with_capacity(plan.order.len()),
        node_data: Vec::new(),
    };
    let mut path: Vec<u8> = Vec::new();

    for (&arena_id, &depth) in plan.order.iter().zip(&plan.depth) {
        let Node {
            label,
            children,
            value,
        } = mem::take(&mut nodes[arena_id as usize]);

        path.truncate(depth);
        path.extend_from_slice(&label);

        let label_len = u8::try_from(label.len()).map_err(|_| {
            IndexError::inconsistent(format!(
                "label of {} bytes does not fit the record length byte",
                label.len()
            ))
        })?;

        let postings = match value {
            Some(value) => emit(&path, value)?,
            None => PostingsRef::EMPTY,
        };
        if postings.pointer > PostingsRef::MAX_POINTER {
            return Err(IndexError::inconsistent(format!(
                "postings pointer {} exceeds 40 bits",
                postings.pointer
            )));
        }

        let start = out.node_data.len();
        out.node_data.push(label_len);
        out.node_data.extend_from_slice(&label);
        for (first, child) in children {
            put_u32(plan.ids[child as usize], &mut out.node_data);
            out.node_data.push(first);
        }
        put_u32(postings.count, &mut out.node_data);
        put_u40(postings.pointer, &mut out.node_data);

        out.node_sizes.push((out.node_data.len() - start) as u32);
    }

    Ok(out)
}

/// Preorder numbering of the arena.
struct Numbering {
    /// Arena ids in preorder.
    order: Vec<NodeId>,
    /// Length of the token path above each node of `order`.
    depth: Vec<usize>,
    /// Preorder id of each arena id.
    ids: Vec<NodeId>,
}

const UNASSIGNED: NodeId = NodeId::MAX;

fn number_nodes<T>(nodes: &[Node<T>]) -> Result<Numbering> {
    let mut ids = vec![UNASSIGNED; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    let mut depth = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(NodeId, usize)> = vec![(ROOT, 0)];

    while let Some((arena_id, above)) = stack.pop() {
        let node = nodes.get(arena_id as usize).ok_or_else(|| {
            IndexError::inconsistent(format!(
                "dangling child pointer to node {} (arena holds {})",
                arena_id,
                nodes.len()
            ))
        })?;

        let slot = &mut ids[arena_id as usize];
        if *slot != UNASSIGNED {
            return Err(IndexError::inconsistent(format!(
                "node {} reached twice (already assigned id {})",
                arena_id, *slot
            )));
        }
        *slot = order.len() as NodeId;
        order.push(arena_id);
        depth.push(above);

        if !node.children.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(IndexError::inconsistent(format!(
                "children of node {} out of order",
                arena_id
            )));
        }

        let below = above + node.label.len();
        for &(_, child) in node.children.iter().rev() {
            stack.push((child, below));
        }
    }

    if order.len() != nodes.len() {
        return Err(IndexError::inconsistent(format!(
            "{} of {} nodes unreachable from the root",
            nodes.len() - order.len(),
            nodes.len()
        )));
    }

    Ok(Numbering { order, depth, ids })
}
