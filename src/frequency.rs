//! Single-pass symbol frequency analysis.

use std::io::{self, Read};

use crate::code::CodeTable;

/// Number of distinct symbols in a byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count for every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    /// An all-zero table.
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Count every byte of an in-memory slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.update(data);
        table
    }

    /// Count every byte produced by `reader` until EOF, reading `chunk` bytes at a time.
    pub fn from_reader<R: Read>(mut reader: R, chunk: usize) -> io::Result<Self> {
        let mut table = Self::new();
        let mut buf = vec![0u8; chunk.max(1)];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            table.update(&buf[..n]);
        }
        Ok(table)
    }

    /// Add the bytes of `data` to the counts.
    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.counts[b as usize] += 1;
        }
    }

    /// Occurrences of `symbol`.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// `(symbol, count)` for every present symbol, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(s, &c)| (s as u8, c))
    }

    /// Payload size in bits when every symbol is written with its code from `codes`:
    /// the sum of `count * code length`.
    pub fn payload_bits(&self, codes: &CodeTable) -> u64 {
        self.iter()
            .map(|(s, c)| c * codes.get(s).len() as u64)
            .sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
