//! # Huffman Compression
//!
//! *Lossless byte-stream compression with a self-describing code tree.*
//!
//! ## Intuition First
//!
//! Most files use a few byte values far more often than others. Huffman
//! coding gives the common bytes short bit strings and the rare ones long
//! bit strings, chosen so that no code is the start of another. A reader
//! holding the same code tree can then split the bit stream back into
//! symbols without any separators.
//!
//! ## The Algorithm
//!
//! 1. Count how often each byte value occurs (one pass over the input).
//! 2. Put one leaf per present byte into a min-priority queue keyed by count.
//! 3. Repeatedly take the two lightest nodes and join them under a new
//!    internal node whose weight is their sum, until one root remains.
//! 4. Read each leaf's code off the path from the root: left is `0`, right is `1`.
//! 5. Re-read the input and emit the code of every byte.
//!
//! ```text
//! "aaab"    a:3  b:1          (4)         b -> 0
//!                            /   \        a -> 1
//!                          b:1   a:3
//! ```
//!
//! ## Stream Format
//!
//! ```text
//! [trash:3 | nodes:13]  big-endian u16
//! preorder tree         '0' = internal, '1' <sym> = leaf ('*' and '\' escaped by '\')
//! payload               codes packed MSB first, last byte zero padded
//! ```
//!
//! The trash count says how many low bits of the last payload byte are
//! padding, so the decoder knows exactly where the last code ends.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy as the fundamental limit
//! 1952  Huffman     Minimum-redundancy prefix codes
//! 1977  Ziv-Lempel  Dictionary coding; Huffman becomes its back end (DEFLATE, 1993)
//! ```
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(n + k \log k)$ for $n$ input bytes and $k \le 256$ distinct symbols.
//! - **Space**: $O(k)$; at most 511 tree nodes and one code per symbol.
//!
//! ## Failure Modes
//!
//! 1. **Single symbol**: the tree is a lone leaf. It is given the one-bit code `0`.
//! 2. **Skewed counts**: code lengths can reach 255 bits, so codes are stored
//!    as bit sequences rather than fixed-width integers.
//! 3. **Corrupt streams**: every structural problem surfaces as an [`Error`];
//!    decoding never panics on untrusted input.
//!
//! ## Usage
//!
//! ```rust
//! let packed = huffpack::compress_bytes(b"abracadabra")?;
//! let unpacked = huffpack::decompress_bytes(&packed)?;
//! assert_eq!(unpacked, b"abracadabra");
//! # Ok::<(), huffpack::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod code;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod header;
pub mod queue;
pub mod tree;

pub use bitstream::{BitReader, BitWriter};
pub use code::{Code, CodeTable};
pub use codec::{
    compress, compress_bytes, compress_with, decompress, decompress_bytes, decompress_with,
    CompressionStats, DecompressionStats,
};
pub use config::CodecConfig;
pub use decoder::HuffmanDecoder;
pub use encoder::HuffmanEncoder;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use header::{decode_tree, encode_tree, escape_symbol, unescape_symbol, Header};
pub use queue::PriorityQueue;
pub use tree::{HuffmanTree, NodeId, NodeKind};
