//! End-to-end compression and decompression over seekable streams.

use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use log::debug;

use crate::config::CodecConfig;
use crate::decoder::HuffmanDecoder;
use crate::encoder::HuffmanEncoder;
use crate::error::{Error, Result};

/// What a compression run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressionStats {
    /// Bytes read from the source (per pass).
    pub input_bytes: u64,
    /// Header word plus serialized tree.
    pub header_bytes: u64,
    /// Bit-packed payload, including the padded last byte.
    pub payload_bytes: u64,
    /// Code bits in the payload, excluding padding.
    pub payload_bits: u64,
    /// Zero bits padding the last payload byte.
    pub trash_bits: u8,
    /// Distinct byte values in the source.
    pub distinct_symbols: usize,
}

impl CompressionStats {
    /// Total bytes written to the sink.
    pub fn output_bytes(&self) -> u64 {
        self.header_bytes + self.payload_bytes
    }
}

/// What a decompression run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompressionStats {
    /// Header word plus serialized tree.
    pub header_bytes: u64,
    /// Payload bytes following the tree.
    pub payload_bytes: u64,
    /// Payload bits that carried codes.
    pub meaningful_bits: u64,
    /// Padding bits declared by the header.
    pub trash_bits: u8,
    /// Bytes written to the sink.
    pub output_bytes: u64,
}

/// Compress `input` into `output` with the default configuration.
pub fn compress<R: Read + Seek, W: Write>(input: R, output: W) -> Result<CompressionStats> {
    compress_with(input, output, &CodecConfig::default())
}

/// Compress `input` into `output`.
///
/// `input` is read twice: once to count symbols and once, after seeking back
/// to the position it had on entry, to emit codes.
///
/// # Errors
/// Returns `Error::SourceUnreadable`, `Error::SinkUnwritable` or
/// `Error::SourceChanged`; nothing is retried.
pub fn compress_with<R: Read + Seek, W: Write>(
    mut input: R,
    output: W,
    config: &CodecConfig,
) -> Result<CompressionStats> {
    let capacity = config.buffer_capacity();
    let start = input.stream_position().map_err(Error::SourceUnreadable)?;

    let encoder = HuffmanEncoder::from_reader(&mut input, capacity)?;
    debug!(
        "frequency pass: {} bytes, {} distinct",
        encoder.frequencies().total(),
        encoder.frequencies().distinct()
    );

    let mut sink = BufWriter::with_capacity(capacity, output);
    let header_bytes = encoder.write_header(&mut sink)?;

    input
        .seek(SeekFrom::Start(start))
        .map_err(Error::SourceUnreadable)?;
    let payload_bytes = encoder.encode(&mut input, &mut sink, capacity)?;
    sink.flush().map_err(Error::SinkUnwritable)?;

    let stats = CompressionStats {
        input_bytes: encoder.frequencies().total(),
        header_bytes,
        payload_bytes,
        payload_bits: encoder.payload_bits(),
        trash_bits: encoder.header().trash_bits(),
        distinct_symbols: encoder.frequencies().distinct(),
    };
    debug!(
        "compressed {} -> {} bytes",
        stats.input_bytes,
        stats.output_bytes()
    );
    Ok(stats)
}

/// Decompress `input` into `output` with the default configuration.
pub fn decompress<R: Read + Seek, W: Write>(input: R, output: W) -> Result<DecompressionStats> {
    decompress_with(input, output, &CodecConfig::default())
}

/// Decompress `input` into `output`.
///
/// After the header and tree, the payload length is measured by seeking to
/// the end of `input` and back to the payload start.
///
/// # Errors
/// Returns `Error::MalformedHeader`, `Error::MalformedTree`,
/// `Error::TruncatedPayload`, `Error::CorruptPayload` or an I/O error variant.
pub fn decompress_with<R: Read + Seek, W: Write>(
    mut input: R,
    output: W,
    config: &CodecConfig,
) -> Result<DecompressionStats> {
    let capacity = config.buffer_capacity();
    let start = input.stream_position().map_err(Error::SourceUnreadable)?;
    let mut reader = BufReader::with_capacity(capacity, input);

    let decoder = HuffmanDecoder::read_header(&mut reader, config.verify_node_count)?;
    let payload_start = start + decoder.header_bytes();

    let end = reader
        .seek(SeekFrom::End(0))
        .map_err(Error::SourceUnreadable)?;
    let payload_bytes = end.checked_sub(payload_start).ok_or_else(|| {
        Error::MalformedHeader("stream ends before the payload start".into())
    })?;
    reader
        .seek(SeekFrom::Start(payload_start))
        .map_err(Error::SourceUnreadable)?;

    let meaningful_bits = decoder.meaningful_bits(payload_bytes)?;
    let mut sink = BufWriter::with_capacity(capacity, output);
    let output_bytes = decoder.decode(&mut reader, payload_bytes, &mut sink)?;
    sink.flush().map_err(Error::SinkUnwritable)?;

    let stats = DecompressionStats {
        header_bytes: decoder.header_bytes(),
        payload_bytes,
        meaningful_bits,
        trash_bits: decoder.header().trash_bits(),
        output_bytes,
    };
    debug!(
        "decompressed {} -> {} bytes",
        stats.header_bytes + stats.payload_bytes,
        stats.output_bytes
    );
    Ok(stats)
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(Cursor::new(data), &mut out)?;
    Ok(out)
}

/// Decompress an in-memory buffer.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(Cursor::new(data), &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_aaab_roundtrip_and_stats() {
        let mut out = Vec::new();
        let stats = compress(Cursor::new(b"aaab"), &mut out).unwrap();
        assert_eq!(stats.input_bytes, 4);
        assert_eq!(stats.header_bytes, 7);
        assert_eq!(stats.payload_bytes, 1);
        assert_eq!(stats.payload_bits, 4);
        assert_eq!(stats.trash_bits, 4);
        assert_eq!(stats.distinct_symbols, 2);
        assert_eq!(out.len() as u64, stats.output_bytes());

        let mut back = Vec::new();
        let dstats = decompress(Cursor::new(&out), &mut back).unwrap();
        assert_eq!(back, b"aaab".to_vec());
        assert_eq!(dstats.meaningful_bits, 4);
        assert_eq!(dstats.trash_bits, 4);
        assert_eq!(dstats.output_bytes, 4);
    }

    #[test]
    fn test_empty_roundtrip() {
        let packed = compress_bytes(b"").unwrap();
        assert_eq!(packed, vec![0, 0]);
        assert_eq!(decompress_bytes(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_degenerate_alphabet_roundtrip() {
        let data = vec![0x41u8; 1000];
        let packed = compress_bytes(&data).unwrap();
        assert_eq!(packed.len(), 2 + 2 + 125);
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn test_input_not_at_start() {
        let mut src = Cursor::new(b"HEADERpayload bytes".to_vec());
        src.seek(SeekFrom::Start(6)).unwrap();
        let mut out = Vec::new();
        let stats = compress(&mut src, &mut out).unwrap();
        assert_eq!(stats.input_bytes, 13);

        // The compressed stream may also sit after unrelated bytes.
        let mut framed = b"junk".to_vec();
        framed.extend_from_slice(&out);
        let mut packed = Cursor::new(framed);
        packed.seek(SeekFrom::Start(4)).unwrap();
        let mut back = Vec::new();
        decompress(&mut packed, &mut back).unwrap();
        assert_eq!(back, b"payload bytes".to_vec());
    }

    #[test]
    fn test_tiny_buffers() {
        let data = b"a tiny buffer forces many refills of every stage".repeat(20);
        let config = CodecConfig::default().with_buffer_capacity(3);
        let mut packed = Vec::new();
        compress_with(Cursor::new(&data), &mut packed, &config).unwrap();
        let mut back = Vec::new();
        decompress_with(Cursor::new(&packed), &mut back, &config).unwrap();
        assert_eq!(back, data);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let err = compress(Cursor::new(b"hello"), FailingWriter).unwrap_err();
        assert!(matches!(err, Error::SinkUnwritable(_)));

        let packed = compress_bytes(b"hello").unwrap();
        let err = decompress(Cursor::new(packed), FailingWriter).unwrap_err();
        assert!(matches!(err, Error::SinkUnwritable(_)));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_source_failure_is_reported() {
        let err = compress(FailingReader, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable(_)));

        let err = decompress(FailingReader, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable(_)));
    }
}
