//! Huffman code tree, stored as an arena of immutable nodes.
//!
//! Nodes are pushed once and never modified; children are addressed by
//! [`NodeId`]. Dropping the tree drops the arena, so teardown is a single
//! deallocation no matter how skewed the tree is.

use std::fmt;

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, ALPHABET_SIZE};
use crate::queue::PriorityQueue;

/// Largest node count a byte alphabet can produce (`2 * 256 - 1`).
pub const MAX_NODES: usize = 2 * ALPHABET_SIZE - 1;

/// Index of a node inside its [`HuffmanTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node is either a leaf carrying a symbol or an internal node with exactly two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf holding one symbol.
    Leaf(u8),
    /// Internal node; `left` is reached with bit 0, `right` with bit 1.
    Internal {
        /// Child on bit 0.
        left: NodeId,
        /// Child on bit 1.
        right: NodeId,
    },
}

/// Huffman tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Cumulative frequency of the subtree. Zero for trees read back from a stream.
    pub weight: u64,
    /// Leaf or internal.
    pub kind: NodeKind,
}

/// A non-empty Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Build the tree for `frequencies` by repeatedly merging the two lightest nodes.
    ///
    /// Returns `Ok(None)` when no symbol has a non-zero count. A single distinct
    /// symbol yields a tree whose root is that leaf.
    ///
    /// # Errors
    /// Returns `Error::QueueOverflow` if the merge queue exceeds the alphabet size,
    /// which a byte alphabet never does.
    pub fn build(frequencies: &FrequencyTable) -> Result<Option<Self>> {
        let mut arena = TreeArena::with_capacity(MAX_NODES);
        let mut pq = PriorityQueue::with_capacity(ALPHABET_SIZE);

        for (symbol, count) in frequencies.iter() {
            let id = arena.push(count, NodeKind::Leaf(symbol))?;
            pq.insert(id, count)?;
        }

        loop {
            let Some((left, lw)) = pq.extract_min_weighted() else {
                return Ok(None);
            };
            let Some((right, rw)) = pq.extract_min_weighted() else {
                return Ok(Some(arena.finish(left)));
            };
            let weight = lw + rw;
            let parent = arena.push(weight, NodeKind::Internal { left, right })?;
            pq.insert(parent, weight)?;
        }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Symbol of `id` if it is a leaf.
    pub fn symbol(&self, id: NodeId) -> Option<u8> {
        match self.node(id).kind {
            NodeKind::Leaf(s) => Some(s),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Child of an internal node for the given bit, `None` for leaves.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some(if bit { right } else { left }),
        }
    }

    /// True when the whole tree is a single leaf.
    pub fn is_single_leaf(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Total number of nodes, leaves and internal.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        (self.nodes.len() + 1) / 2
    }

    /// Node ids in preorder (node, left subtree, right subtree).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let NodeKind::Internal { left, right } = self.node(id).kind {
                stack.push(right);
                stack.push(left);
            }
        }
        order
    }

    /// Depth of the deepest leaf; zero for a single-leaf tree.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, d)) = stack.pop() {
            match self.node(id).kind {
                NodeKind::Leaf(_) => max = max.max(d),
                NodeKind::Internal { left, right } => {
                    stack.push((left, d + 1));
                    stack.push((right, d + 1));
                }
            }
        }
        max
    }
}

/// One line per node in preorder, indented two spaces per level:
/// `* (w)` for internal nodes, `'c' (w)` or `0xNN (w)` for leaves.
impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            write!(f, "{:indent$}", "", indent = depth * 2)?;
            match node.kind {
                NodeKind::Leaf(s) if s.is_ascii_graphic() => {
                    writeln!(f, "'{}' ({})", s as char, node.weight)?
                }
                NodeKind::Leaf(s) => writeln!(f, "0x{:02X} ({})", s, node.weight)?,
                NodeKind::Internal { left, right } => {
                    writeln!(f, "* ({})", node.weight)?;
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }
        Ok(())
    }
}

/// Append-only node storage used while a tree is being assembled.
#[derive(Debug, Default)]
pub(crate) struct TreeArena {
    nodes: Vec<Node>,
}

impl TreeArena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Push a node; children must already be in the arena.
    pub(crate) fn push(&mut self, weight: u64, kind: NodeKind) -> Result<NodeId> {
        if self.nodes.len() >= MAX_NODES {
            return Err(Error::MalformedTree(format!(
                "tree exceeds {MAX_NODES} nodes"
            )));
        }
        let id = NodeId(self.nodes.len() as u16);
        self.nodes.push(Node { weight, kind });
        Ok(id)
    }

    pub(crate) fn finish(self, root: NodeId) -> HuffmanTree {
        HuffmanTree {
            nodes: self.nodes,
            root,
        }
    }
}
