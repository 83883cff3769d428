//! Stream header and preorder tree serialization.
//!
//! # Layout
//!
//! ```text
//! +----------------+---------------------+----------------------+
//! | 16-bit BE word | preorder tree bytes | bit-packed payload   |
//! | TTTNNNNNNNNNNN |  0 ... 1 s ... 1 \ s| codes, zero padded   |
//! +----------------+---------------------+----------------------+
//!   T = trash bits (3 bits), N = tree node count (13 bits)
//! ```
//!
//! Tree bytes: internal node = `'0'` then left subtree then right subtree;
//! leaf = `'1'` then its symbol. Leaf symbols `'*'` and `'\\'` are preceded
//! by a `'\\'` escape byte.

use std::io::{self, Read};

use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, NodeKind, TreeArena, MAX_NODES};

/// Marker byte introducing an internal node.
pub const INTERNAL_MARKER: u8 = b'0';
/// Marker byte introducing a leaf.
pub const LEAF_MARKER: u8 = b'1';
/// Escape byte placed before reserved leaf symbols.
pub const ESCAPE: u8 = b'\\';
/// Size of the fixed header word in bytes.
pub const HEADER_LEN: usize = 2;

const NODE_COUNT_BITS: u32 = 13;
const NODE_COUNT_MASK: u16 = (1 << NODE_COUNT_BITS) - 1;

/// Trash-bit count and tree node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    trash_bits: u8,
    node_count: u16,
}

impl Header {
    /// Create a header, validating both fields against their bit widths.
    ///
    /// # Errors
    /// Returns `Error::MalformedHeader` if `trash_bits > 7` or `node_count > 8191`.
    pub fn new(trash_bits: u8, node_count: usize) -> Result<Self> {
        if trash_bits > 7 {
            return Err(Error::MalformedHeader(format!(
                "trash bit count {trash_bits} does not fit in 3 bits"
            )));
        }
        if node_count > NODE_COUNT_MASK as usize {
            return Err(Error::MalformedHeader(format!(
                "node count {node_count} does not fit in 13 bits"
            )));
        }
        Ok(Self {
            trash_bits,
            node_count: node_count as u16,
        })
    }

    /// Padding bits at the end of the payload.
    pub fn trash_bits(&self) -> u8 {
        self.trash_bits
    }

    /// Number of tree nodes that follow the header.
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    /// Pack into the big-endian header word.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let word = ((self.trash_bits as u16) << NODE_COUNT_BITS) | self.node_count;
        word.to_be_bytes()
    }

    /// Unpack a header word. Every 16-bit value is a syntactically valid header.
    pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        let word = u16::from_be_bytes(bytes);
        Self {
            trash_bits: (word >> NODE_COUNT_BITS) as u8,
            node_count: word & NODE_COUNT_MASK,
        }
    }
}

/// Zero bits needed to round `payload_bits` up to a whole byte.
pub fn trash_bits(payload_bits: u64) -> u8 {
    ((8 - payload_bits % 8) % 8) as u8
}

/// True for leaf symbols that must be escaped.
pub fn needs_escape(symbol: u8) -> bool {
    symbol == b'*' || symbol == ESCAPE
}

/// Append the encoded form of a leaf symbol to `out`.
pub fn escape_symbol(symbol: u8, out: &mut Vec<u8>) {
    if needs_escape(symbol) {
        out.push(ESCAPE);
    }
    out.push(symbol);
}

/// Decode a leaf symbol from its first byte, pulling the escaped byte with `next`
/// when `first` is the escape.
///
/// # Errors
/// Returns `Error::MalformedTree` if the escape is followed by a byte that
/// is never escaped, and propagates whatever `next` returns.
pub fn unescape_symbol<F>(first: u8, next: F) -> Result<u8>
where
    F: FnOnce() -> Result<u8>,
{
    if first != ESCAPE {
        return Ok(first);
    }
    let symbol = next()?;
    if needs_escape(symbol) {
        Ok(symbol)
    } else {
        Err(Error::MalformedTree(format!(
            "escape followed by unreserved byte 0x{symbol:02x}"
        )))
    }
}

/// Serialize `tree` in preorder.
pub fn encode_tree(tree: &HuffmanTree) -> Vec<u8> {
    let mut out = Vec::with_capacity(tree.node_count() * 2);
    for id in tree.preorder() {
        match tree.node(id).kind {
            NodeKind::Internal { .. } => out.push(INTERNAL_MARKER),
            NodeKind::Leaf(symbol) => {
                out.push(LEAF_MARKER);
                escape_symbol(symbol, &mut out);
            }
        }
    }
    out
}

enum Token {
    Leaf(u8),
    Internal,
}

/// Read one preorder-serialized tree from `reader`.
///
/// Returns the tree and the number of bytes consumed. Reads byte by byte and
/// never past the last tree byte, so the reader is left at the payload start.
///
/// # Errors
/// - `Error::MalformedTree` on an unknown marker, a bad escape, EOF before the
///   tree is complete, more than 511 nodes, or a symbol appearing in two leaves.
/// - `Error::SourceUnreadable` on any other read failure.
pub fn decode_tree<R: Read>(reader: &mut R) -> Result<(HuffmanTree, usize)> {
    let mut consumed = 0usize;
    let mut read_byte = || -> Result<u8> {
        let mut buf = [0u8; 1];
        match reader.read_exact(&mut buf) {
            Ok(()) => {
                consumed += 1;
                Ok(buf[0])
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::MalformedTree("stream ended inside the tree".into()))
            }
            Err(e) => Err(Error::SourceUnreadable(e)),
        }
    };

    // Scan the preorder token stream. `open` counts subtrees still owed.
    let mut tokens = Vec::new();
    let mut seen = [false; 256];
    let mut open = 1usize;
    while open > 0 {
        if tokens.len() == MAX_NODES {
            return Err(Error::MalformedTree(format!(
                "tree exceeds {MAX_NODES} nodes"
            )));
        }
        match read_byte()? {
            LEAF_MARKER => {
                let first = read_byte()?;
                let symbol = unescape_symbol(first, &mut read_byte)?;
                if std::mem::replace(&mut seen[symbol as usize], true) {
                    return Err(Error::MalformedTree(format!(
                        "symbol 0x{symbol:02x} appears in more than one leaf"
                    )));
                }
                tokens.push(Token::Leaf(symbol));
                open -= 1;
            }
            INTERNAL_MARKER => {
                tokens.push(Token::Internal);
                open += 1;
            }
            other => {
                return Err(Error::MalformedTree(format!(
                    "unexpected marker byte 0x{other:02x}"
                )));
            }
        }
    }

    // Reverse preorder visits both subtrees of a node before the node itself,
    // so children are always in the arena when their parent is pushed.
    let mut arena = TreeArena::with_capacity(tokens.len());
    let mut stack = Vec::with_capacity(tokens.len());
    for token in tokens.iter().rev() {
        let id = match *token {
            Token::Leaf(symbol) => arena.push(0, NodeKind::Leaf(symbol))?,
            Token::Internal => {
                let (left, right) = match (stack.pop(), stack.pop()) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Err(Error::MalformedTree("internal node missing a child".into())),
                };
                arena.push(0, NodeKind::Internal { left, right })?
            }
        };
        stack.push(id);
    }

    debug_assert_eq!(arena.len(), tokens.len());
    let root = stack
        .pop()
        .ok_or_else(|| Error::MalformedTree("empty tree".into()))?;
    Ok((arena.finish(root), consumed))
}
