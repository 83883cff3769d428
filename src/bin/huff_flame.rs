use huffpack::{compress_bytes, decompress_bytes};

fn main() {
    env_logger::init();

    let input = (0..100_000u32)
        .map(|i| b"etaoin shrdlu"[(i * i % 13) as usize])
        .collect::<Vec<_>>();

    for _ in 0..200 {
        let packed = compress_bytes(&input).unwrap();
        let unpacked = decompress_bytes(&packed).unwrap();
        assert_eq!(unpacked.len(), input.len());
    }
}
