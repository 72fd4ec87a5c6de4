use std::io::{self, BufReader, Read};

use fehler::{throw, throws};

use crate::error::DecodeError;
use crate::ring::Ring;
use crate::tag;
use crate::{BUFFER, MAX_LIT};

type Error = DecodeError; // do it this way for better docs

/// What happened the last time [`Decoder::fill`] tried to pull a tag off
/// the wire.
enum FillOutcome {
    /// The upstream source had nothing more to give, and we weren't in
    /// the middle of a tag — a clean end of stream.
    Eof,
    /// A flush mark: the current frame is over, back-references reset.
    Flush,
    /// A literal or copy tag was decoded into `ring`.
    Progress,
}

/// A streaming decoder: the inverse of [`crate::Encoder`]. Reads tags from
/// a byte source and reconstructs the original bytes.
///
/// `Decoder` implements [`std::io::Read`]. Like `Encoder`, it latches the
/// first error it sees and returns a clone of it on every later call.
pub struct Decoder<R: Read> {
    source: BufReader<R>,
    ring: Ring<BUFFER>,
    /// How much of `ring` the caller has already consumed via `read`.
    rpos: u32,
    /// How much of `ring` has been reconstructed so far.
    wpos: u32,
    err: Option<DecodeError>,
}

impl<R: Read> Decoder<R> {
    /// Wrap `source` in a new decoder. `source` is buffered internally.
    pub fn new(source: R) -> Self {
        Decoder {
            source: BufReader::with_capacity(BUFFER, source),
            ring: Ring::new(),
            rpos: 0,
            wpos: 0,
            err: None,
        }
    }

    /// Discard the decoder and recover the underlying source.
    pub fn close(self) -> R {
        self.source.into_inner()
    }

    #[throws]
    fn read_exact_byte(&mut self) -> u8 {
        let mut b = [0u8; 1];
        self.source.read_exact(&mut b)?;
        b[0]
    }

    /// Pull one tag off the wire and apply it to `ring`, advancing `wpos`
    /// (or, for a flush mark, resetting both positions to zero).
    #[throws]
    fn fill(&mut self) -> FillOutcome {
        let mut lead = [0u8; 1];
        let n = self.source.read(&mut lead)?;
        if n == 0 {
            return FillOutcome::Eof;
        }
        let t = lead[0];

        if tag::is_flush(t) {
            self.rpos = 0;
            self.wpos = 0;
            return FillOutcome::Flush;
        }

        if tag::is_literal(t) {
            let len = if tag::is_long_literal(t) {
                let k = self.read_exact_byte()?;
                tag::long_literal_len(k)
            } else {
                tag::short_literal_len(t)
            };
            let mut buf = [0u8; MAX_LIT as usize];
            let buf = &mut buf[..len as usize];
            self.source.read_exact(buf)?;
            self.ring.write(self.wpos, buf);
            self.wpos = self.wpos.wrapping_add(len);
        } else {
            let lo = self.read_exact_byte()?;
            let offset = tag::copy_offset(t, lo);
            if offset > self.wpos {
                throw!(DecodeError::InvalidOffset(offset));
            }
            let len = if tag::is_long_copy(t) {
                let m = self.read_exact_byte()?;
                tag::long_copy_len(m)
            } else {
                tag::short_copy_len(t)
            };
            self.ring.copy_run(self.wpos, offset, len);
            self.wpos = self.wpos.wrapping_add(len);
        }
        FillOutcome::Progress
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(e) = &self.err {
            return Err(e.clone().into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.rpos < self.wpos {
                let n = (self.wpos - self.rpos).min(buf.len() as u32) as usize;
                self.ring.read_into(self.rpos, &mut buf[..n]);
                self.rpos = self.rpos.wrapping_add(n as u32);
                return Ok(n);
            }
            match self.fill() {
                Ok(FillOutcome::Eof) => return Ok(0),
                Ok(FillOutcome::Flush) | Ok(FillOutcome::Progress) => continue,
                Err(e) => {
                    self.err = Some(e.clone());
                    return Err(e.into());
                }
            }
        }
    }
}
