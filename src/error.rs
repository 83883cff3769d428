//! Error types for Huffman compression and decompression.

use thiserror::Error;

/// Error variants for compression and decompression runs.
///
/// Every variant aborts the current run; nothing is retried or patched up.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be read (or seeked).
    #[error("source unreadable: {0}")]
    SourceUnreadable(#[source] std::io::Error),

    /// The output could not be written.
    #[error("sink unwritable: {0}")]
    SinkUnwritable(#[source] std::io::Error),

    /// A priority queue insert went past its fixed capacity.
    #[error("priority queue overflow (capacity {capacity})")]
    QueueOverflow {
        /// Capacity the queue was created with.
        capacity: usize,
    },

    /// The 2-byte header is missing or inconsistent with the rest of the stream.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The serialized tree has an unknown marker, is truncated, or is not a valid code tree.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// The payload ended before the last code was complete, or is missing
    /// bytes the header requires.
    #[error("truncated payload: consumed {consumed_bits} of {expected_bits} expected bits")]
    TruncatedPayload {
        /// Meaningful bits implied by the header and the payload length. For an
        /// empty payload, the bits a single payload byte would carry.
        expected_bits: u64,
        /// Bits consumed when decoding stopped.
        consumed_bits: u64,
    },

    /// A payload bit that no code of the tree can produce.
    #[error("corrupt payload at bit {bit_offset}")]
    CorruptPayload {
        /// Offset of the offending bit from the start of the payload.
        bit_offset: u64,
    },

    /// The source yielded different bytes on the encoding pass than on the counting pass.
    #[error("source changed between the frequency pass and the encoding pass")]
    SourceChanged,
}

/// A specialized Result type for Huffman operations.
pub type Result<T> = std::result::Result<T, Error>;
