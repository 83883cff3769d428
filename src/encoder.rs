//! Compression side: header, tree and payload emission.

use std::io::{self, Read, Write};

use log::{debug, trace};

use crate::bitstream::BitWriter;
use crate::code::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::header::{encode_tree, trash_bits, Header};
use crate::tree::HuffmanTree;

/// Huffman encoder.
///
/// Holds everything derived from one frequency pass: the tree, the code
/// table and the header computed from them. The header and the payload are
/// always produced from the same code table.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    frequencies: FrequencyTable,
    tree: Option<HuffmanTree>,
    codes: CodeTable,
    header: Header,
    payload_bits: u64,
}

impl HuffmanEncoder {
    /// Create an encoder from symbol frequencies.
    ///
    /// # Errors
    /// Returns `Error::QueueOverflow` if tree construction overflows its queue.
    pub fn new(frequencies: FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::build(&frequencies)?;
        let codes = tree.as_ref().map(CodeTable::from_tree).unwrap_or_default();
        let payload_bits = frequencies.payload_bits(&codes);
        let node_count = tree.as_ref().map_or(0, HuffmanTree::node_count);
        let header = Header::new(trash_bits(payload_bits), node_count)?;

        trace!("byte frequency: {:?}", frequencies.iter().collect::<Vec<_>>());
        if log::log_enabled!(log::Level::Trace) {
            if let Some(tree) = &tree {
                trace!("huffman tree:\n{tree}");
            }
            for (symbol, code) in codes.iter() {
                trace!("code 0x{symbol:02x} -> {code}");
            }
        }
        debug!(
            "built tree: {} symbols, {} nodes, max code length {}, {} payload bits",
            frequencies.distinct(),
            node_count,
            codes.max_len(),
            payload_bits
        );

        Ok(Self {
            frequencies,
            tree,
            codes,
            header,
            payload_bits,
        })
    }

    /// Count the bytes of `reader` and build an encoder for them.
    ///
    /// # Errors
    /// Returns `Error::SourceUnreadable` if reading fails.
    pub fn from_reader<R: Read>(reader: R, chunk: usize) -> Result<Self> {
        let frequencies =
            FrequencyTable::from_reader(reader, chunk).map_err(Error::SourceUnreadable)?;
        Self::new(frequencies)
    }

    /// Build an encoder for an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(FrequencyTable::from_bytes(data))
    }

    /// The header this encoder writes.
    pub fn header(&self) -> Header {
        self.header
    }

    /// The code tree, `None` for empty input.
    pub fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    /// The code table.
    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// The frequencies the tree was built from.
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    /// Payload length in bits, excluding padding.
    pub fn payload_bits(&self) -> u64 {
        self.payload_bits
    }

    /// Write the header word followed by the serialized tree.
    ///
    /// Returns the number of bytes written.
    pub fn write_header<W: Write>(&self, mut output: W) -> Result<u64> {
        let mut bytes = self.header.to_bytes().to_vec();
        if let Some(tree) = &self.tree {
            bytes.extend_from_slice(&encode_tree(tree));
        }
        output.write_all(&bytes).map_err(Error::SinkUnwritable)?;
        debug!(
            "wrote header: trash={} nodes={} ({} bytes)",
            self.header.trash_bits(),
            self.header.node_count(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }

    /// Re-read the original bytes from `input` and write their codes to `output`.
    ///
    /// Must follow [`write_header`](Self::write_header) on the same sink.
    /// Returns the number of payload bytes written, including the padded last byte.
    ///
    /// # Errors
    /// - `Error::SourceChanged` if `input` does not hold the bytes that were counted.
    /// - `Error::SourceUnreadable` / `Error::SinkUnwritable` on I/O failure.
    pub fn encode<R: Read, W: Write>(&self, mut input: R, output: W, chunk: usize) -> Result<u64> {
        let mut writer = BitWriter::new(output);
        let mut buf = vec![0u8; chunk.max(1)];
        let mut seen = 0u64;

        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::SourceUnreadable(e)),
            };
            for &byte in &buf[..n] {
                let code = self.codes.get(byte);
                if code.is_empty() {
                    return Err(Error::SourceChanged);
                }
                writer.write_code(code).map_err(Error::SinkUnwritable)?;
            }
            seen += n as u64;
        }

        if seen != self.frequencies.total() {
            return Err(Error::SourceChanged);
        }

        let (_, written) = writer.finish().map_err(Error::SinkUnwritable)?;
        debug!("wrote payload: {} symbols, {} bytes", seen, written);
        Ok(written)
    }

    /// Compress an in-memory buffer into a complete stream (header, tree, payload).
    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_header(&mut out)?;
        self.encode(data, &mut out, data.len())?;
        Ok(out)
    }
}
