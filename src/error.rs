use std::io;

use crate::stream::{Stream, StreamError};

/// Errors surfaced by the firmware-container codec.
///
/// Stream-level failures (short read, bad open) and decode-level failures
/// (CRC mismatch, malformed index) are both represented here so that a
/// caller driving [`crate::blob::Blob::decode`] gets a single diagnostic
/// back, per the propagation policy: stream primitives fail quietly and
/// the first logical read group that notices translates that into one of
/// these variants via [`Error::from_stream`].
///
/// There is no `WriteShort` variant: every encode path in this crate
/// writes into a growable [`crate::stream::VecStream`], whose writes never
/// fail, so a short write never actually occurs.
#[derive(Debug)]
pub enum Error {
    OpenFailed(String),
    ReadShort { expected: usize, actual: usize },
    HeaderCrcMismatch,
    SuperCrcMismatch { index: usize },
    SubCrcMismatch { index: usize },
    BadIndex(String),
    TrailingBytes { expected: u32, actual: u64 },
    DecodeFailed(String),
    IOError(io::Error),
    SerdeJSONError(serde_json::Error),
}

impl Error {
    /// Translates a stream's sticky [`StreamError`] into a codec error,
    /// filling in the short-transfer byte counts when the stream recorded
    /// them. `context` names what was being read/opened, for the
    /// human-readable variants. Returns `None` when the stream hasn't
    /// failed.
    pub fn from_stream<S: Stream + ?Sized>(stream: &S, context: &str) -> Option<Error> {
        match stream.error() {
            StreamError::Ok => None,
            StreamError::OpenFailed => Some(Error::OpenFailed(context.to_string())),
            StreamError::ReadFailed => {
                let (expected, actual) = stream.short_transfer().unwrap_or((0, 0));
                Some(Error::ReadShort { expected, actual })
            }
            // No call site in this crate ever writes into a stream that can
            // refuse a write; kept as a fallback so the match stays total.
            StreamError::WriteFailed => {
                Some(Error::DecodeFailed(format!("unexpected write failure ({context})")))
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerdeJSONError(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Endian, SliceStream};

    #[test]
    fn from_stream_is_none_on_a_healthy_stream() {
        let s = SliceStream::new(&[1, 2, 3], Endian::Little);
        assert!(Error::from_stream(&s, "test").is_none());
    }

    #[test]
    fn from_stream_reports_read_short_with_byte_counts() {
        let mut s = SliceStream::new(&[1, 2, 3], Endian::Little);
        let mut buf = [0u8; 8];
        s.read(&mut buf);
        assert!(matches!(
            Error::from_stream(&s, "test"),
            Some(Error::ReadShort { expected: 8, actual: 3 })
        ));
    }

    #[test]
    fn from_stream_reports_open_failed_with_context() {
        let s = crate::stream::FileStream::open("/nonexistent/path.bin", Endian::Little);
        match Error::from_stream(&s, "/nonexistent/path.bin") {
            Some(Error::OpenFailed(msg)) => assert_eq!(msg, "/nonexistent/path.bin"),
            other => panic!("expected OpenFailed, got {other:?}"),
        }
    }
}
