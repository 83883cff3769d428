#![no_main]
use huffpack::decompress_bytes;
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must either decode or return an error, never panic.
fuzz_target!(|data: &[u8]| {
    let _ = decompress_bytes(data);
});
