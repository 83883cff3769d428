use std::io::Cursor;

use huffpack::{
    compress, compress_bytes, decode_tree, decompress, decompress_bytes, encode_tree, CodeTable,
    Error, FrequencyTable, HuffmanDecoder, HuffmanTree,
};
use proptest::prelude::*;

fn tree_for(data: &[u8]) -> Option<HuffmanTree> {
    HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap()
}

proptest! {
    #[test]
    fn test_roundtrip_arbitrary_bytes(input in prop::collection::vec(any::<u8>(), 0..2000)) {
        let packed = compress_bytes(&input).unwrap();
        let unpacked = decompress_bytes(&packed).unwrap();
        prop_assert_eq!(input, unpacked);
    }

    #[test]
    fn test_roundtrip_small_alphabet(
        input in prop::collection::vec(prop::sample::select(vec![b'0', b'1', b'\\', b'*']), 0..500),
    ) {
        // Only tree marker bytes and escapable bytes.
        let packed = compress_bytes(&input).unwrap();
        prop_assert_eq!(decompress_bytes(&packed).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_single_repeated_byte(byte in any::<u8>(), len in 1usize..3000) {
        let input = vec![byte; len];
        let packed = compress_bytes(&input).unwrap();
        let tree_len = encode_tree(&tree_for(&input).unwrap()).len();
        prop_assert_eq!(packed.len(), 2 + tree_len + (len + 7) / 8);
        prop_assert_eq!(decompress_bytes(&packed).unwrap(), input);
    }

    #[test]
    fn test_codes_are_prefix_free(input in prop::collection::vec(any::<u8>(), 1..1000)) {
        let tree = tree_for(&input).unwrap();
        let table = CodeTable::from_tree(&tree);
        prop_assert!(table.is_prefix_free());
        prop_assert_eq!(table.iter().count(), FrequencyTable::from_bytes(&input).distinct());
    }

    #[test]
    fn test_tree_serialization_preserves_topology(
        input in prop::collection::vec(any::<u8>(), 1..1000),
    ) {
        let tree = tree_for(&input).unwrap();
        let bytes = encode_tree(&tree);
        let (decoded, consumed) = decode_tree(&mut &bytes[..]).unwrap();
        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(CodeTable::from_tree(&decoded), CodeTable::from_tree(&tree));
    }

    #[test]
    fn test_header_consistency(input in prop::collection::vec(any::<u8>(), 0..1000)) {
        let mut packed = Vec::new();
        let cstats = compress(Cursor::new(&input), &mut packed).unwrap();

        let mut reader = &packed[..];
        let decoder = HuffmanDecoder::read_header(&mut reader, true).unwrap();
        prop_assert_eq!(decoder.header().trash_bits(), cstats.trash_bits);
        let payload_len = reader.len() as u64;
        prop_assert_eq!(decoder.meaningful_bits(payload_len).unwrap(), cstats.payload_bits);

        let mut out = Vec::new();
        let dstats = decompress(Cursor::new(&packed), &mut out).unwrap();
        prop_assert_eq!(dstats.meaningful_bits, cstats.payload_bits);
        prop_assert_eq!(dstats.output_bytes, input.len() as u64);
    }

    #[test]
    fn test_truncated_streams_fail_cleanly(
        input in prop::collection::vec(any::<u8>(), 1..500),
        cut in any::<prop::sample::Index>(),
    ) {
        let packed = compress_bytes(&input).unwrap();
        let cut = cut.index(packed.len());
        // Any prefix either errors or decodes to a shorter, non-empty prefix of the input.
        match decompress_bytes(&packed[..cut]) {
            Ok(out) => {
                prop_assert!(!out.is_empty());
                prop_assert!(out.len() < input.len());
                prop_assert!(input.starts_with(&out));
            }
            Err(e) => {
                let expected_kind = matches!(
                    e,
                    Error::MalformedHeader(_)
                        | Error::MalformedTree(_)
                        | Error::TruncatedPayload { .. }
                );
                prop_assert!(expected_kind, "{:?}", e);
            }
        }
    }
}

#[test]
fn test_aaab_example() {
    let packed = compress_bytes(b"aaab").unwrap();
    assert_eq!(packed, vec![0x80, 0x03, b'0', b'1', b'b', b'1', b'a', 0xE0]);
    assert_eq!(decompress_bytes(&packed).unwrap(), b"aaab".to_vec());
}

#[test]
fn test_thousand_copies_of_one_byte() {
    let input = vec![0x41u8; 1000];
    let packed = compress_bytes(&input).unwrap();
    assert_eq!(&packed[..4], &[0x00, 0x01, b'1', 0x41]);
    assert_eq!(decompress_bytes(&packed).unwrap(), input);
}

#[test]
fn test_every_byte_value() {
    let input: Vec<u8> = (0..=255u8).cycle().take(256 * 9 + 17).collect();
    let packed = compress_bytes(&input).unwrap();
    assert_eq!(decompress_bytes(&packed).unwrap(), input);
}

#[test]
fn test_deep_tree_roundtrip() {
    // Fibonacci counts make every merge extend one spine.
    let (mut a, mut b) = (1usize, 1usize);
    let mut input = Vec::new();
    for s in 0..24u8 {
        input.extend(std::iter::repeat(s).take(a));
        (a, b) = (b, a + b);
    }
    let tree = tree_for(&input).unwrap();
    assert_eq!(tree.depth(), 23);
    assert_eq!(CodeTable::from_tree(&tree).max_len(), 23);
    assert_eq!(decompress_bytes(&compress_bytes(&input).unwrap()).unwrap(), input);
}
