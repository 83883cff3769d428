//! Bit-granular writer and reader over byte streams.
//!
//! Bits are packed most significant first. The writer pads the final
//! partial byte with zeros at the low end; the reader is told up front how
//! many bits are meaningful and stops there, so the padding is never seen.

use std::io::{self, Read, Write};

use crate::code::Code;

/// Accumulates bits and writes them out a byte at a time.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    byte: u8,
    used: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Wrap a byte sink.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            byte: 0,
            used: 0,
            bytes_written: 0,
        }
    }

    /// Append one bit; a full byte is written immediately.
    pub fn add_bit(&mut self, bit: bool) -> io::Result<()> {
        self.byte = (self.byte << 1) | bit as u8;
        self.used += 1;
        if self.used == 8 {
            self.inner.write_all(&[self.byte])?;
            self.bytes_written += 1;
            self.byte = 0;
            self.used = 0;
        }
        Ok(())
    }

    /// Append every bit of `code`, first bit first.
    pub fn write_code(&mut self, code: &Code) -> io::Result<()> {
        for &bit in code.bits() {
            self.add_bit(bit)?;
        }
        Ok(())
    }

    /// Number of bits waiting in the accumulator (0..8).
    pub fn pending_bits(&self) -> u8 {
        self.used
    }

    /// Write out a partial byte, left-aligned and zero padded. No-op when empty.
    pub fn flush_partial(&mut self) -> io::Result<()> {
        if self.used == 0 {
            return Ok(());
        }
        let padded = self.byte << (8 - self.used);
        self.inner.write_all(&[padded])?;
        self.bytes_written += 1;
        self.byte = 0;
        self.used = 0;
        Ok(())
    }

    /// Flush any partial byte and return the sink with the number of bytes written.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.flush_partial()?;
        Ok((self.inner, self.bytes_written))
    }
}

/// Yields exactly `limit` bits from a byte source.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    limit: u64,
    consumed: u64,
    byte: u8,
    left_in_byte: u8,
}

impl<R: Read> BitReader<R> {
    /// Read at most `limit` bits from `inner`.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
            byte: 0,
            left_in_byte: 0,
        }
    }

    /// Next bit, or `None` once `limit` bits have been consumed.
    ///
    /// # Errors
    /// Propagates read errors; EOF before `limit` is `io::ErrorKind::UnexpectedEof`.
    pub fn next_bit(&mut self) -> io::Result<Option<bool>> {
        if self.consumed == self.limit {
            return Ok(None);
        }
        if self.left_in_byte == 0 {
            let mut buf = [0u8; 1];
            self.inner.read_exact(&mut buf)?;
            self.byte = buf[0];
            self.left_in_byte = 8;
        }
        self.left_in_byte -= 1;
        self.consumed += 1;
        Ok(Some((self.byte >> self.left_in_byte) & 1 == 1))
    }

    /// Bits handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bits this reader will hand out in total.
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_packs_msb_first() {
        let mut w = BitWriter::new(Vec::new());
        for bit in [true, false, true, true, false, false, true, false, true] {
            w.add_bit(bit).unwrap();
        }
        assert_eq!(w.pending_bits(), 1);
        let (out, n) = w.finish().unwrap();
        assert_eq!(out, vec![0b1011_0010, 0b1000_0000]);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_codes_cross_byte_boundaries() {
        let mut w = BitWriter::new(Vec::new());
        w.write_code(&Code::from("11111")).unwrap();
        w.write_code(&Code::from("0001")).unwrap();
        w.write_code(&Code::from("1")).unwrap();
        let (out, _) = w.finish().unwrap();
        assert_eq!(out, vec![0b1111_1000, 0b1100_0000]);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let w = BitWriter::new(Vec::new());
        let (out, n) = w.finish().unwrap();
        assert!(out.is_empty());
        assert_eq!(n, 0);
    }

    #[test]
    fn test_reader_stops_at_limit() {
        let data = [0b1110_0000u8];
        let mut r = BitReader::new(&data[..], 4);
        let mut bits = Vec::new();
        while let Some(b) = r.next_bit().unwrap() {
            bits.push(b);
        }
        assert_eq!(bits, vec![true, true, true, false]);
        assert_eq!(r.consumed(), 4);
        assert_eq!(r.consumed(), r.limit());
    }

    #[test]
    fn test_reader_reports_short_input() {
        let data = [0xFFu8];
        let mut r = BitReader::new(&data[..], 9);
        for _ in 0..8 {
            assert_eq!(r.next_bit().unwrap(), Some(true));
        }
        let err = r.next_bit().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
