// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Offset-addressed access to the node files.
//!
//! The node-size file is turned into a prefix-sum table once, at open. After
//! that, node `n` is the byte range `offsets[n]..offsets[n + 1]` of the node
//! blob and every record is parsed in place, borrowing from the blob.

use crate::binary::encoding::{get_u32, get_u40};
use crate::binary::DataFile;
use crate::error::{IndexError, Result};
use crate::trie::compact::{CHILD_ENTRY, RECORD_FIXED};
use crate::trie::{FlattenedTrie, NodeId, ROOT};
use crate::types::PostingsRef;

const NODE_FILE: &str = DataFile::NodeData.name();

/// The flattened trie, ready for traversal.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    /// `offsets[n]..offsets[n + 1]` is node `n`. One longer than the node count.
    offsets: Vec<usize>,
    data: Vec<u8>,
}

impl NodeStore {
    /// Build from the raw node-size file and node blob.
    pub fn from_bytes(sizes: &[u8], data: Vec<u8>) -> Result<Self> {
        if sizes.len() % 4 != 0 {
            return Err(IndexError::corrupt(
                DataFile::NodeSizes.name(),
                format!("{} bytes is not a whole number of sizes", sizes.len()),
            ));
        }
        let sizes = sizes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        Self::from_sizes(sizes, data)
    }

    /// Wrap an in-memory compaction result.
    pub fn from_flattened(trie: FlattenedTrie) -> Result<Self> {
        let FlattenedTrie {
            node_sizes,
            node_data,
        } = trie;
        Self::from_sizes(node_sizes.into_iter(), node_data)
    }

    fn from_sizes(sizes: impl Iterator<Item = u32>, data: Vec<u8>) -> Result<Self> {
        let mut offsets = vec![0usize];
        let mut end = 0usize;
        for size in sizes {
            if (size as usize) < RECORD_FIXED {
                return Err(IndexError::corrupt(
                    DataFile::NodeSizes.name(),
                    format!("node {} has size {}", offsets.len() - 1, size),
                ));
            }
            end += size as usize;
            offsets.push(end);
        }
        if offsets.len() < 2 {
            return Err(IndexError::corrupt(
                DataFile::NodeSizes.name(),
                "no root node",
            ));
        }
        if end != data.len() {
            return Err(IndexError::corrupt(
                NODE_FILE,
                format!("node sizes add up to {}, blob holds {}", end, data.len()),
            ));
        }
        let store = Self { offsets, data };
        if !store.node(ROOT)?.label.is_empty() {
            return Err(IndexError::corrupt(NODE_FILE, "root has a label"));
        }
        Ok(store)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn root(&self) -> Result<NodeRecord<'_>> {
        self.node(ROOT)
    }

    /// Parse the record of node `id`.
    pub fn node(&self, id: NodeId) -> Result<NodeRecord<'_>> {
        let i = id as usize;
        let (Some(&start), Some(&end)) = (self.offsets.get(i), self.offsets.get(i + 1)) else {
            return Err(IndexError::corrupt(
                NODE_FILE,
                format!("node id {} out of range ({} nodes)", id, self.len()),
            ));
        };
        let record = &self.data[start..end];

        let label_len = record[0] as usize;
        let Some(child_bytes) = record.len().checked_sub(RECORD_FIXED + label_len) else {
            return Err(IndexError::corrupt(
                NODE_FILE,
                format!("node {} label of {} overruns its record", id, label_len),
            ));
        };
        if child_bytes % CHILD_ENTRY != 0 {
            return Err(IndexError::corrupt(
                NODE_FILE,
                format!("node {} child table is {} bytes", id, child_bytes),
            ));
        }

        let label = &record[1..1 + label_len];
        let children = &record[1 + label_len..1 + label_len + child_bytes];
        // Preorder numbering puts every child after its parent; anything else
        // would let a walk loop.
        for entry in children.chunks_exact(CHILD_ENTRY) {
            let child = u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
            if child <= id {
                return Err(IndexError::corrupt(
                    NODE_FILE,
                    format!("node {} has child {} that does not follow it", id, child),
                ));
            }
        }
        let tail = 1 + label_len + child_bytes;
        let (Some(count), Some(pointer)) = (get_u32(record, tail), get_u40(record, tail + 4))
        else {
            return Err(IndexError::corrupt(NODE_FILE, format!("node {} truncated", id)));
        };

        Ok(NodeRecord {
            id,
            label,
            children,
            postings: PostingsRef { pointer, count },
        })
    }
}

/// One parsed node record, borrowing from the node blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord<'a> {
    pub id: NodeId,
    pub label: &'a [u8],
    children: &'a [u8],
    pub postings: PostingsRef,
}

impl<'a> NodeRecord<'a> {
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len() / CHILD_ENTRY
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `(first byte, node id)` of child `i`.
    #[inline]
    pub fn child(&self, i: usize) -> (u8, NodeId) {
        let entry = &self.children[i * CHILD_ENTRY..(i + 1) * CHILD_ENTRY];
        (
            entry[4],
            u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]),
        )
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = (u8, NodeId)> + 'a {
        let record = *self;
        (0..record.child_count()).map(move |i| record.child(i))
    }

    /// The child whose label starts with `byte`.
    ///
    /// Children are stored sorted by first byte, so the scan stops at the
    /// first byte past the target.
    pub fn find_child(&self, byte: u8) -> Option<NodeId> {
        for (first, id) in self.children() {
            if first == byte {
                return Some(id);
            }
            if first > byte {
                break;
            }
        }
        None
    }
}
