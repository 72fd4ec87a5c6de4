#![forbid(unsafe_code)]

//! A streaming LZ77-family compressor and decompressor.
//!
//! The codec trades compression ratio for throughput: it keeps a 4 KiB
//! sliding window, a single-byte tag alphabet, and a small fixed-size hash
//! table, and emits a framed byte stream that a peer can decode
//! incrementally, without ever seeing the whole input or output at once.
//!
//! This is not a general-purpose compression library and it is not wire
//! compatible with any standard LZ variant. There is no header, checksum,
//! or length prefix on the wire; [`Encoder`] and [`Decoder`] just speak the
//! tag format documented on [`tag`] to each other.
//!
//! ```
//! use lzstream::{Encoder, Decoder};
//! use std::io::{Read, Write};
//!
//! let mut compressed = Vec::new();
//! {
//!     let mut enc = Encoder::new(&mut compressed);
//!     enc.write_all(b"aaaaaaaa").unwrap();
//!     enc.flush().unwrap();
//! }
//!
//! let mut dec = Decoder::new(&compressed[..]);
//! let mut out = Vec::new();
//! dec.read_to_end(&mut out).unwrap();
//! assert_eq!(out, b"aaaaaaaa");
//! ```

mod decoder;
mod encoder;
mod error;
mod ring;
mod table;
mod tag;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError};

/// Maximum back-reference distance, in bytes.
pub(crate) const WINDOW: u32 = 4096;

/// Ring buffer capacity: twice the window, so a full window of history
/// always remains valid while the next window's worth of input is staged.
pub(crate) const BUFFER: usize = 2 * WINDOW as usize;

/// Absolute position counters wrap at this value; the encoder forces a
/// flush before `wpos` can reach it.
pub(crate) const WRAPSIZE: u32 = 0x1000_0000;

/// Shortest back-reference the format can express.
pub(crate) const MIN_COPY: u32 = 4;

/// Largest length a single short-literal tag can carry (`T in [1, 30]`).
pub(crate) const SHORT_LIT_MAX: u32 = 30;

/// Largest literal length the format can express in one tag
/// (`0x1F` header plus a one-byte continuation, `K in [0, 255]`).
pub(crate) const MAX_LIT: u32 = SHORT_LIT_MAX + 1 + 255;

/// Largest length a short-copy tag can carry (`L in [4, 16]`).
pub(crate) const SHORT_COPY_MAX: u32 = 16;

/// Largest length the format can express for a single copy tag
/// (long-copy header plus a one-byte continuation, `M in [0, 255]`).
pub(crate) const MAX_COPY: u32 = SHORT_COPY_MAX + 1 + 255;

/// Multiplier used to mix the rolling 4-byte window into a hash slot index.
pub(crate) const HASH_MAGIC: u32 = 0x5321_5229;

/// log2 of the number of hash slots. Compile-time tunable, `[9, 12]`.
pub(crate) const HASHLOG: u32 = 11;

/// Number of most-recent positions kept per hash slot. Compile-time
/// tunable, `[1, 4]`.
pub(crate) const BACKREF: usize = 1;

/// When set, every byte skipped while advancing past a copy is re-hashed
/// and inserted into the table (policy A in the encoder's emission
/// section). When clear, only the final position is re-hashed (policy B).
/// Both policies are valid; they simply trade encoder throughput for
/// match density differently. Only one canonical tuning (the default
/// here) is guaranteed to reproduce the worked scenarios byte-for-byte.
pub(crate) const HASHCOPY: bool = false;

/// When set, the encoder extends a candidate match backward into the
/// pending literal run to shorten it ("lookbehind"). Off by default.
pub(crate) const LOOKBEHIND: bool = false;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decoder, Encoder};
    use std::io::{Read, Write};

    fn roundtrip(input: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut enc = Encoder::new(&mut compressed);
            enc.write_all(input).unwrap();
            enc.flush().unwrap();
        }
        let mut dec = Decoder::new(&compressed[..]);
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn shakespear() {
        for s in [
            "to live or not to live",
            "Love is a wonderful terrible thing",
            "There is nothing either good or bad, but thinking makes it so.",
            "I burn, I pine, I perish.",
        ] {
            assert_eq!(roundtrip(s.as_bytes()), s.as_bytes());
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(roundtrip(b""), b"");
    }

    #[test]
    fn nulls() {
        assert_eq!(roundtrip(&[0u8; 13]), &[0u8; 13]);
    }
}
