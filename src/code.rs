//! Code table generation: one prefix-free bit string per present symbol.

use std::fmt;

use crate::frequency::ALPHABET_SIZE;
use crate::tree::{HuffmanTree, NodeKind};

/// A variable-length code, most significant (first emitted) bit first.
///
/// Stored as a bit sequence rather than a fixed-width integer, so the
/// 255-bit worst case of a byte alphabet fits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for symbols absent from the input.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bits in emission order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }

    fn extended(&self, bit: bool) -> Code {
        let mut bits = Vec::with_capacity(self.bits.len() + 1);
        bits.extend_from_slice(&self.bits);
        bits.push(bit);
        Code { bits }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Code {
            bits: s.bytes().map(|c| c == b'1').collect(),
        }
    }
}

/// Symbol -> code mapping for the whole byte alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Code>,
}

impl CodeTable {
    /// A table with no codes.
    pub fn empty() -> Self {
        Self {
            codes: vec![Code::default(); ALPHABET_SIZE],
        }
    }

    /// Walk `tree` depth-first, appending 0 on every left branch and 1 on every right.
    ///
    /// A tree that is a single leaf gets the one-bit code `0`, so every
    /// occurrence still costs exactly one payload bit.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = Self::empty();

        if let NodeKind::Leaf(symbol) = tree.node(tree.root()).kind {
            table.codes[symbol as usize] = Code::from("0");
            return table;
        }

        let mut stack = vec![(tree.root(), Code::default())];
        while let Some((id, prefix)) = stack.pop() {
            match tree.node(id).kind {
                NodeKind::Leaf(symbol) => table.codes[symbol as usize] = prefix,
                NodeKind::Internal { left, right } => {
                    stack.push((right, prefix.extended(true)));
                    stack.push((left, prefix.extended(false)));
                }
            }
        }
        table
    }

    /// Code for `symbol`; empty if the symbol is absent.
    pub fn get(&self, symbol: u8) -> &Code {
        &self.codes[symbol as usize]
    }

    /// `(symbol, code)` for every present symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(s, c)| (s as u8, c))
    }

    /// Longest code length in the table.
    pub fn max_len(&self) -> usize {
        self.codes.iter().map(Code::len).max().unwrap_or(0)
    }

    /// True if no present code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let present: Vec<&Code> = self.iter().map(|(_, c)| c).collect();
        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                if a.is_prefix_of(b) || b.is_prefix_of(a) {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;

    fn table_for(data: &[u8]) -> CodeTable {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data))
            .unwrap()
            .unwrap();
        CodeTable::from_tree(&tree)
    }

    #[test]
    fn test_two_symbol_codes() {
        let table = table_for(b"aaab");
        assert_eq!(table.get(b'b').to_string(), "0");
        assert_eq!(table.get(b'a').to_string(), "1");
        assert!(table.get(b'c').is_empty());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let table = table_for(&[0x41; 1000]);
        assert_eq!(table.get(0x41).to_string(), "0");
        assert_eq!(table.max_len(), 1);
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let table = table_for(b"abracadabra, the quick brown fox! 0123456789");
        assert!(table.is_prefix_free());
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let mut data = vec![b'x'; 500];
        data.extend_from_slice(b"abcdefgh");
        let table = table_for(&data);
        assert_eq!(table.get(b'x').len(), 1);
        assert!(table.get(b'a').len() > 1);
    }

    #[test]
    fn test_prefix_detection() {
        let mut table = CodeTable::empty();
        table.codes[1] = Code::from("01");
        table.codes[2] = Code::from("011");
        assert!(!table.is_prefix_free());
        table.codes[2] = Code::from("10");
        assert!(table.is_prefix_free());
    }

    #[test]
    fn test_payload_bits_uses_lengths() {
        let data = b"aaab";
        let table = table_for(data);
        assert_eq!(FrequencyTable::from_bytes(data).payload_bits(&table), 4);
    }
}
