#![no_main]
use libfuzzer_sys::fuzz_target;
use lzstream::{Decoder, Encoder};
use std::io::{Read, Write};

fuzz_target!(|data: &[u8]| {
    let mut compressed = Vec::new();
    {
        let mut enc = Encoder::new(&mut compressed);
        enc.write_all(data).expect("encoder write must not fail on an in-memory sink");
        enc.flush().expect("flush must not fail on an in-memory sink");
    }

    let mut dec = Decoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    dec.read_to_end(&mut decompressed)
        .expect("decoding our own encoder's output must never fail");

    assert_eq!(data, decompressed.as_slice());
});
