#![no_main]
use libfuzzer_sys::fuzz_target;
use lzstream::Decoder;
use std::io::Read;

// Arbitrary bytes are not necessarily a valid tag stream; this target only
// asserts the decoder never panics and always terminates, whatever garbage
// it is handed.
fuzz_target!(|data: &[u8]| {
    let mut dec = Decoder::new(data);
    let mut buffer = vec![0u8; 4096];
    loop {
        match dec.read(&mut buffer) {
            Ok(0) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }
});
