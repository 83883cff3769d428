//! Decompression side: header parsing and the bit-by-bit tree walk.

use std::io::{self, Read, Write};

use log::debug;

use crate::bitstream::BitReader;
use crate::error::{Error, Result};
use crate::header::{decode_tree, Header, HEADER_LEN};
use crate::tree::HuffmanTree;

/// Huffman decoder.
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    header: Header,
    tree: Option<HuffmanTree>,
    header_bytes: u64,
}

impl HuffmanDecoder {
    /// Read the header word and the serialized tree, leaving `reader` at the payload.
    ///
    /// # Errors
    /// - `Error::MalformedHeader` if the stream is shorter than the header word, a
    ///   tree-less header carries trash bits, or (with `verify_node_count`) the node
    ///   count disagrees with the decoded tree.
    /// - `Error::MalformedTree` if the tree bytes are invalid.
    pub fn read_header<R: Read>(reader: &mut R, verify_node_count: bool) -> Result<Self> {
        let mut word = [0u8; HEADER_LEN];
        reader.read_exact(&mut word).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                Error::MalformedHeader("stream is shorter than the header".into())
            }
            _ => Error::SourceUnreadable(e),
        })?;
        let header = Header::from_bytes(word);

        if header.node_count() == 0 {
            if header.trash_bits() != 0 {
                return Err(Error::MalformedHeader(
                    "empty tree with non-zero trash bits".into(),
                ));
            }
            debug!("read header: empty stream");
            return Ok(Self {
                header,
                tree: None,
                header_bytes: HEADER_LEN as u64,
            });
        }

        let (tree, tree_bytes) = decode_tree(reader)?;
        if verify_node_count && tree.node_count() != header.node_count() {
            return Err(Error::MalformedHeader(format!(
                "header declares {} nodes, tree has {}",
                header.node_count(),
                tree.node_count()
            )));
        }

        debug!(
            "read header: trash={} nodes={} ({} tree bytes)",
            header.trash_bits(),
            tree.node_count(),
            tree_bytes
        );
        Ok(Self {
            header,
            tree: Some(tree),
            header_bytes: (HEADER_LEN + tree_bytes) as u64,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> Header {
        self.header
    }

    /// The reconstructed tree, `None` for an empty stream.
    pub fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    /// Bytes taken by the header word and the tree; the payload starts here.
    pub fn header_bytes(&self) -> u64 {
        self.header_bytes
    }

    /// Code bits carried by a payload of `payload_len` bytes: all of them minus the trash bits.
    ///
    /// # Errors
    /// - `Error::MalformedHeader` if an empty stream has payload bytes.
    /// - `Error::TruncatedPayload` if a tree is present but the payload is empty;
    ///   every tree has at least one code, so at least one payload byte follows it.
    pub fn meaningful_bits(&self, payload_len: u64) -> Result<u64> {
        let trash = self.header.trash_bits() as u64;
        if self.tree.is_none() {
            if payload_len != 0 {
                return Err(Error::MalformedHeader(format!(
                    "empty stream followed by {payload_len} payload bytes"
                )));
            }
            return Ok(0);
        }
        if payload_len == 0 {
            return Err(Error::TruncatedPayload {
                expected_bits: 8 - trash,
                consumed_bits: 0,
            });
        }
        payload_len.checked_mul(8).map(|total| total - trash).ok_or_else(|| {
            Error::MalformedHeader(format!("payload of {payload_len} bytes is too long"))
        })
    }

    /// Decode a payload of exactly `payload_len` bytes from `input` into `output`.
    ///
    /// Starts at the root; each bit moves to the left (0) or right (1) child and
    /// every leaf reached emits its symbol and resets to the root. Stops after
    /// exactly [`meaningful_bits`](Self::meaningful_bits) bits. With a single-leaf
    /// tree every `0` bit is one occurrence of that symbol.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// - `Error::TruncatedPayload` if the input ends early or the last code is incomplete.
    /// - `Error::CorruptPayload` on a `1` bit under a single-leaf tree.
    /// - `Error::SourceUnreadable` / `Error::SinkUnwritable` on I/O failure.
    pub fn decode<R: Read, W: Write>(
        &self,
        input: R,
        payload_len: u64,
        mut output: W,
    ) -> Result<u64> {
        let limit = self.meaningful_bits(payload_len)?;
        let Some(tree) = &self.tree else {
            return Ok(0);
        };

        let mut bits = BitReader::new(input, limit);
        let mut emit = |symbol: u8| output.write_all(&[symbol]).map_err(Error::SinkUnwritable);
        let root = tree.root();
        let mut current = root;
        let mut written = 0u64;

        loop {
            let bit = match bits.next_bit() {
                Ok(Some(bit)) => bit,
                Ok(None) => break,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(Error::TruncatedPayload {
                        expected_bits: bits.limit(),
                        consumed_bits: bits.consumed(),
                    });
                }
                Err(e) => return Err(Error::SourceUnreadable(e)),
            };

            let next = match tree.child(current, bit) {
                Some(child) => child,
                // The root itself is the only leaf; its code is the single bit 0.
                None if !bit => current,
                None => {
                    return Err(Error::CorruptPayload {
                        bit_offset: bits.consumed() - 1,
                    });
                }
            };

            match tree.symbol(next) {
                Some(symbol) => {
                    emit(symbol)?;
                    written += 1;
                    current = root;
                }
                None => current = next,
            }
        }

        if current != root {
            return Err(Error::TruncatedPayload {
                expected_bits: bits.limit(),
                consumed_bits: bits.consumed(),
            });
        }

        debug!("decoded payload: {} bits, {} bytes", limit, written);
        Ok(written)
    }
}
