use std::io::{self, BufWriter, Write};

use fehler::throws;

use crate::error::EncodeError;
use crate::ring::Ring;
use crate::table::HashTable;
use crate::tag;
use crate::{BUFFER, HASHCOPY, LOOKBEHIND, MAX_COPY, MAX_LIT, MIN_COPY, WINDOW, WRAPSIZE};

type Error = EncodeError; // do it this way for better docs

/// A streaming encoder: wraps a byte sink and turns whatever is written to
/// it into the tag stream documented in [`crate::tag`].
///
/// `Encoder` implements [`std::io::Write`]; `write` accepts bytes and
/// compresses opportunistically, `flush` drains any pending literal run
/// and emits a flush mark, resetting the encoder for an independent
/// logical frame. Cross-frame back-references never happen: flushing
/// zeroes the hash table and the positional counters.
///
/// Like the underlying format, an `Encoder` is single-threaded and not
/// safe to share across calls from multiple contexts; once it reports an
/// error, that error is latched and returned by every later call.
pub struct Encoder<W: Write> {
    sink: BufWriter<W>,
    ring: Ring<BUFFER>,
    table: HashTable,
    /// Bytes consumed by the compression loop.
    upos: u32,
    /// Bytes accepted from the caller into `ring`.
    wpos: u32,
    /// Rolling 4-byte window over the most recently consumed bytes.
    last: u32,
    /// Length of the currently pending (not yet emitted) literal run.
    litlen: u32,
    err: Option<EncodeError>,
}

impl<W: Write> Encoder<W> {
    /// Wrap `sink` in a new encoder. `sink` is buffered internally, so
    /// there is no need to wrap it in a `BufWriter` yourself.
    pub fn new(sink: W) -> Self {
        Encoder {
            sink: BufWriter::with_capacity(BUFFER, sink),
            ring: Ring::new(),
            table: HashTable::new(),
            upos: 0,
            wpos: 0,
            last: 0,
            litlen: 0,
            err: None,
        }
    }

    /// How many more bytes can be accepted into `ring` right now without
    /// overwriting history the compression loop hasn't processed yet.
    fn free_space(&self) -> u32 {
        if self.upos >= WINDOW {
            (BUFFER as u32 - WINDOW) - (self.wpos - self.upos)
        } else {
            BUFFER as u32 - self.wpos
        }
    }

    /// Drain `ring` as far as `wpos`, emitting literal and copy tags.
    fn compress(&mut self) -> Result<(), EncodeError> {
        let mut last = self.last;
        let mut upos = self.upos;
        let wpos = self.wpos;
        let mut litlen = self.litlen;

        let result = self.compress_loop(&mut last, &mut upos, wpos, &mut litlen);

        self.upos = upos;
        self.litlen = litlen;
        self.last = last;
        result
    }

    #[throws]
    fn compress_loop(&mut self, last: &mut u32, upos: &mut u32, wpos: u32, litlen: &mut u32) {
        while *upos < wpos {
            let cur = self.ring.get(*upos);
            *last = (*last << 8) | cur as u32;
            let h = HashTable::hash(*last);

            if *litlen < MIN_COPY - 1 {
                *upos += 1;
                if *upos >= MIN_COPY {
                    self.table.push(h, *upos);
                }
                *litlen += 1;
                continue;
            }

            let window_limit = WINDOW.min(*upos);
            let mut best_len = 0u32;
            let mut best_src = 0u32;
            let mut best_cut = 0u32;

            for &p in self.table.candidates(h) {
                if p == 0 || *upos - p + MIN_COPY > window_limit {
                    continue;
                }
                let p0 = p - 1;
                if self.ring.get(p0) != cur {
                    continue;
                }
                if self.ring.word_be(p0 + 1) != *last {
                    continue;
                }

                let (pb, pe) = self.extend_match(p0, *upos, *litlen, window_limit, wpos);
                let len = pe - pb;
                if len > best_len {
                    best_len = len;
                    best_src = pb;
                    best_cut = p0 + 1 - pb;
                }
            }

            *upos += 1;
            self.table.push(h, *upos);
            *litlen += 1;

            if best_len == 0 {
                if *litlen == MAX_LIT + MIN_COPY {
                    emit_literal(&self.ring, &mut self.sink, *upos - *litlen, MAX_LIT)?;
                    *litlen = MIN_COPY;
                }
            } else {
                if *litlen > best_cut {
                    emit_literal(
                        &self.ring,
                        &mut self.sink,
                        *upos - *litlen,
                        *litlen - best_cut,
                    )?;
                }
                *litlen = 0;
                emit_copy(&mut self.sink, *upos - best_cut - best_src, best_len)?;
                self.advance_past_copy(last, upos, best_len, best_cut);
            }
        }
    }

    /// Extend a confirmed 4-byte match at `p0` (anchored against the byte
    /// just consumed at `upos`) forward up to [`MAX_COPY`] total bytes,
    /// and, when [`LOOKBEHIND`] is enabled, backward into the pending
    /// literal run. Returns `(match_start, match_end)` in the ring's
    /// absolute coordinates; `match_end - match_start` is the match
    /// length, `p0 + 1 - match_start` is how much of it overlaps the
    /// pending literal ("cut").
    fn extend_match(
        &self,
        p0: u32,
        upos: u32,
        litlen: u32,
        window_limit: u32,
        wpos: u32,
    ) -> (u32, u32) {
        let (pb, ub) = if LOOKBEHIND {
            let mut pb = p0.wrapping_sub(4);
            let mut ub = upos.wrapping_sub(4);
            let mut lim = if p0 < litlen { 0 } else { p0 - litlen };
            if upos - lim > window_limit {
                lim = upos - window_limit;
            }
            while pb > lim && self.ring.get(pb) == self.ring.get(ub) {
                pb -= 1;
                ub -= 1;
            }
            pb = pb.wrapping_add(1);
            ub = ub.wrapping_add(1);
            (pb, ub)
        } else {
            (p0 - 3, upos - 3)
        };

        let mut pe = p0 + 1;
        let mut ue = upos + 1;
        let fwd_limit = (ub + MAX_COPY).min(wpos);
        while ue < fwd_limit && self.ring.get(pe) == self.ring.get(ue) {
            ue += 1;
            pe += 1;
        }
        (pb, pe)
    }

    /// After emitting a copy, move `upos` past the bytes it covered and
    /// re-seed the hash table, either re-hashing every skipped byte
    /// ([`HASHCOPY`]) or only the final position.
    fn advance_past_copy(&mut self, last: &mut u32, upos: &mut u32, match_len: u32, cut: u32) {
        if HASHCOPY {
            for _ in 0..(match_len - cut) {
                *last = (*last << 8) | self.ring.get(*upos) as u32;
                let h = HashTable::hash(*last);
                *upos += 1;
                self.table.push(h, *upos);
            }
        } else {
            if LOOKBEHIND && cut > 4 {
                let cutpos = *upos - cut;
                let cut_word = self.ring.word_be(cutpos + 4);
                self.table.push(HashTable::hash(cut_word), cutpos + 4);
            }
            *upos += match_len - cut;
            *last = self.ring.word_be(*upos);
            self.table.push(HashTable::hash(*last), *upos);
        }
    }

    /// Emit the pending literal (if any) and a flush mark, then reset all
    /// positional state. Cross-frame back-references never happen because
    /// the hash table is zeroed here.
    #[throws]
    fn do_flush(&mut self) {
        if self.litlen > 0 {
            emit_literal(
                &self.ring,
                &mut self.sink,
                self.upos - self.litlen,
                self.litlen,
            )?;
            self.litlen = 0;
        }
        self.sink.write_all(&[tag::FLUSH_TAG])?;
        self.sink.flush()?;
        self.table.clear();
        self.upos = 0;
        self.wpos = 0;
        self.last = 0;
    }

    /// Equivalent to calling [`std::io::Write::flush`] and then unwrapping
    /// the underlying sink.
    pub fn close(mut self) -> io::Result<W> {
        io::Write::flush(&mut self)?;
        self.sink.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(e) = &self.err {
            return Err(e.clone().into());
        }
        let mut data = buf;
        let mut total = 0usize;
        while !data.is_empty() {
            let mut free = self.free_space();
            if self.wpos >= WRAPSIZE {
                self.err = Some(EncodeError::Invariant(
                    "wpos reached WRAPSIZE without a flush",
                ));
                return Ok(total);
            }
            free = free.min(WRAPSIZE - self.wpos);
            if free == 0 {
                break;
            }
            let n = data.len().min(free as usize);
            self.ring.write(self.wpos, &data[..n]);
            self.wpos = self.wpos.wrapping_add(n as u32);
            data = &data[n..];
            // These n bytes are now durably accepted into `ring`, whether
            // or not the compression loop below succeeds.
            total += n;

            if let Err(e) = self.compress() {
                self.err = Some(e);
                return Ok(total);
            }

            if self.wpos == WRAPSIZE {
                if let Err(e) = self.do_flush() {
                    self.err = Some(e);
                    return Ok(total);
                }
            }
        }
        Ok(total)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(e) = &self.err {
            return Err(e.clone().into());
        }
        if let Err(e) = self.compress() {
            self.err = Some(e.clone());
            return Err(e.into());
        }
        if let Err(e) = self.do_flush() {
            self.err = Some(e.clone());
            return Err(e.into());
        }
        Ok(())
    }
}

#[throws]
fn emit_literal<W: Write>(ring: &Ring<BUFFER>, sink: &mut BufWriter<W>, pos: u32, len: u32) {
    let (t, k) = tag::literal_header(len);
    sink.write_all(&[t])?;
    if let Some(k) = k {
        sink.write_all(&[k])?;
    }
    let mut buf = [0u8; MAX_LIT as usize];
    let buf = &mut buf[..len as usize];
    ring.read_into(pos, buf);
    sink.write_all(buf)?;
}

#[throws]
fn emit_copy<W: Write>(sink: &mut BufWriter<W>, offset: u32, len: u32) {
    let (t, lo, m) = tag::copy_header(len, offset);
    sink.write_all(&[t, lo])?;
    if let Some(m) = m {
        sink.write_all(&[m])?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = Encoder::new(&mut out);
            enc.write_all(input).unwrap();
            enc.flush().unwrap();
        }
        out
    }

    #[test]
    fn empty_flush_is_a_single_zero_byte() {
        assert_eq!(compress(b""), vec![0x00]);
    }

    #[test]
    fn asdfasdf_matches_the_worked_scenario() {
        // literal "asdf" (len 4), copy len=4 off=4, flush.
        assert_eq!(
            compress(b"asdfasdf"),
            vec![0x04, b'a', b's', b'd', b'f', 0x20, 0x03, 0x00]
        );
    }

    #[test]
    fn aaaaaaaa_matches_the_worked_scenario() {
        // literal "a" (len 1), copy len=7 off=1, flush.
        assert_eq!(compress(b"aaaaaaaa"), vec![0x01, b'a', 0x50, 0x00, 0x00]);
    }

    #[test]
    fn long_phrase_is_one_long_literal() {
        let s = b"This is a new era of my life with all good things";
        assert_eq!(s.len(), 49);
        let mut expected = vec![0x1F, 49 - 31];
        expected.extend_from_slice(s);
        expected.push(0x00);
        assert_eq!(compress(s), expected);
    }

    #[test]
    fn run_of_290_bytes_splits_into_272_and_17_byte_copies() {
        let input = vec![b'x'; 290];
        let out = compress(&input);
        // literal "x" (len 1), copy len=272 off=1, copy len=17 off=1, flush.
        assert_eq!(out[0], 1);
        assert_eq!(out[1], b'x');
        assert!(tag::is_long_copy(out[2]));
        assert_eq!(out[3], 0x00);
        assert_eq!(out[4], 272 - 17); // continuation byte: len - 17
        assert!(tag::is_long_copy(out[5]));
        assert_eq!(out[6], 0x00);
        assert_eq!(out[7], 0); // continuation byte: 17 - 17
        assert_eq!(out[8], 0x00);
        assert_eq!(out.len(), 9);
    }
}
