use std::io;

use nix::errno::Errno;

/// Why a bounded write could not commit the whole buffer.
///
/// None of these report partial progress: on error, the part of the sink past
/// the last fully acknowledged chunk is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The raw write failed. Under [`Policy::Tolerant`](crate::Policy) this is
    /// never `EINTR`.
    #[error("write failed: {0}")]
    Io(Errno),

    /// Strict policy only: a chunk was accepted without error but not in full.
    #[error("short write: requested {expected} bytes, {actual} written")]
    ShortWrite { expected: usize, actual: usize },

    /// The sink accepted zero bytes of a non-empty request.
    #[error("write of {expected} bytes made no progress")]
    WriteZero { expected: usize },

    /// The sink claimed to have written more than it was handed.
    #[error("sink reported {reported} bytes written for a {requested} byte request")]
    Overrun { requested: usize, reported: usize },

    #[error("range starting at offset {offset} with length {length} does not fit in off_t")]
    OffsetOverflow { offset: u64, length: usize },

    #[error("invalid chunk limits: size {size} must be non-zero and below ceiling {ceiling}")]
    InvalidLimits { ceiling: usize, size: usize },
}

impl WriteError {
    /// Error code reported by the raw write, if that is what failed.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            WriteError::Io(errno) => Some(*errno),
            _ => None,
        }
    }
}

impl From<WriteError> for io::Error {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Io(errno) => io::Error::from(errno),
            WriteError::ShortWrite { .. } | WriteError::WriteZero { .. } => {
                io::Error::new(io::ErrorKind::WriteZero, err)
            }
            WriteError::Overrun { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
            WriteError::OffsetOverflow { .. } | WriteError::InvalidLimits { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_is_only_reported_for_io() {
        assert_eq!(WriteError::Io(Errno::ENOSPC).errno(), Some(Errno::ENOSPC));
        let short = WriteError::ShortWrite {
            expected: 10,
            actual: 3,
        };
        assert_eq!(short.errno(), None);
    }

    #[test]
    fn io_conversion_keeps_the_os_code() {
        let err = io::Error::from(WriteError::Io(Errno::EBADF));
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn short_and_zero_writes_map_to_write_zero() {
        let err = io::Error::from(WriteError::ShortWrite {
            expected: 8,
            actual: 4,
        });
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(err.to_string(), "short write: requested 8 bytes, 4 written");

        let err = io::Error::from(WriteError::WriteZero { expected: 8 });
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn bad_arguments_map_to_invalid_input() {
        let err = io::Error::from(WriteError::OffsetOverflow {
            offset: u64::MAX,
            length: 1,
        });
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
