use std::io;
use thiserror::Error;

/// Errors the [`Encoder`](crate::Encoder) can report.
///
/// The encoder latches the first error it sees; every later call returns a
/// clone of it without doing any further work.
#[derive(Clone, Debug, Error)]
pub enum EncodeError {
    /// Writing a tag or literal payload to the downstream sink failed.
    #[error("error writing compressed output")]
    Io(io::ErrorKind),

    /// An internal bookkeeping invariant was violated (`upos > wpos`,
    /// a literal run grown past its bound, or a positional counter about
    /// to wrap without a prior flush). These indicate a bug in the
    /// encoder, not bad input.
    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::Io(e.kind())
    }
}

impl From<EncodeError> for io::Error {
    fn from(e: EncodeError) -> io::Error {
        match e {
            EncodeError::Io(kind) => io::Error::new(kind, "lzstream: encoder I/O error"),
            EncodeError::Invariant(_) => io::Error::new(io::ErrorKind::Other, e.to_string()),
        }
    }
}

/// Errors the [`Decoder`](crate::Decoder) can report.
///
/// Same sticky-error discipline as [`EncodeError`]: once set, every later
/// call returns it immediately.
#[derive(Clone, Debug, Error)]
pub enum DecodeError {
    /// Reading a tag or its payload from the upstream source failed.
    #[error("error reading compressed input")]
    Io(io::ErrorKind),

    /// The stream ended in the middle of a tag's body.
    #[error("unexpected end of input inside a tag body")]
    UnexpectedEnd,

    /// A copy tag's offset reached further back than any byte produced so
    /// far. A well-formed stream never emits this; it can only come from
    /// corrupted or adversarial input.
    #[error("copy tag referenced offset {0} before the start of the stream")]
    InvalidOffset(u32),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::UnexpectedEnd
        } else {
            DecodeError::Io(e.kind())
        }
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> io::Error {
        match e {
            DecodeError::Io(kind) => io::Error::new(kind, "lzstream: decoder I/O error"),
            DecodeError::UnexpectedEnd => {
                io::Error::new(io::ErrorKind::UnexpectedEof, e.to_string())
            }
            DecodeError::InvalidOffset(_) => {
                io::Error::new(io::ErrorKind::InvalidData, e.to_string())
            }
        }
    }
}
