use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use nix::errno::Errno;

use crate::chunk::ChunkLimits;
use crate::error::WriteError;
use crate::sink::{RawWrite, RawWriteAt};

/// How the writer reacts to an interrupted or short raw write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Retry `EINTR` with the same request and accept short writes by
    /// advancing past whatever was written.
    #[default]
    Tolerant,
    /// Every chunk must be accepted in full on the first attempt. A short
    /// write is [`WriteError::ShortWrite`] and `EINTR` is [`WriteError::Io`].
    Strict,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Tolerant => f.write_str("tolerant"),
            Policy::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown write policy {0:?}, expected \"tolerant\" or \"strict\"")]
pub struct ParsePolicyError(String);

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tolerant" => Ok(Policy::Tolerant),
            "strict" => Ok(Policy::Strict),
            other => Err(ParsePolicyError(other.to_owned())),
        }
    }
}

/// Writes whole buffers through a raw sink, one bounded chunk at a time.
///
/// Each call owns its own cursor; nothing is shared between calls, and the
/// caller's buffer is only ever read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundedWriter {
    policy: Policy,
    limits: ChunkLimits,
}

impl BoundedWriter {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            limits: ChunkLimits::default(),
        }
    }

    pub fn with_limits(policy: Policy, limits: ChunkLimits) -> Self {
        Self { policy, limits }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn limits(&self) -> ChunkLimits {
        self.limits
    }

    /// Write all of `data` at the sink's current position.
    ///
    /// The sink is borrowed mutably for the whole call since its cursor is
    /// shared state.
    pub fn write_all<S>(&self, sink: &mut S, data: &[u8]) -> Result<(), WriteError>
    where
        S: RawWrite + ?Sized,
    {
        self.drive(data, |chunk, _| sink.raw_write(chunk))
    }

    /// Write all of `data` to `[offset, offset + data.len())`.
    ///
    /// Bytes outside the range are never touched, so disjoint ranges of one
    /// descriptor may be written from several threads at once.
    pub fn write_all_at<S>(&self, sink: &S, data: &[u8], offset: u64) -> Result<(), WriteError>
    where
        S: RawWriteAt + ?Sized,
    {
        if data.is_empty() {
            return Ok(());
        }
        check_range(offset, data.len())?;

        // check_range guarantees offset + cursor fits
        self.drive(data, |chunk, cursor| {
            sink.raw_write_at(chunk, offset + cursor as u64)
        })
    }

    fn drive<F>(&self, data: &[u8], mut raw: F) -> Result<(), WriteError>
    where
        F: FnMut(&[u8], usize) -> Result<usize, Errno>,
    {
        let mut cursor = 0;

        while cursor < data.len() {
            let remaining = data.len() - cursor;
            let request = self.limits.request_size(remaining);
            let chunk = &data[cursor..cursor + request];

            trace!("raw write of {} bytes at cursor {} ({} remaining)", request, cursor, remaining);

            let written = match raw(chunk, cursor) {
                Ok(n) => n,
                Err(Errno::EINTR) if self.policy == Policy::Tolerant => {
                    debug!("write of {} bytes interrupted, retrying", request);
                    continue;
                }
                Err(errno) => return Err(WriteError::Io(errno)),
            };

            if written > request {
                return Err(WriteError::Overrun {
                    requested: request,
                    reported: written,
                });
            }

            if written < request {
                match self.policy {
                    Policy::Strict => {
                        return Err(WriteError::ShortWrite {
                            expected: request,
                            actual: written,
                        });
                    }
                    Policy::Tolerant if written == 0 => {
                        return Err(WriteError::WriteZero { expected: request });
                    }
                    Policy::Tolerant => {
                        debug!("short write: {} of {} bytes, continuing", written, request);
                    }
                }
            }

            cursor += written;
        }

        Ok(())
    }
}

fn check_range(offset: u64, length: usize) -> Result<(), WriteError> {
    let end = u64::try_from(length)
        .ok()
        .and_then(|length| offset.checked_add(length));

    match end.map(libc::off_t::try_from) {
        Some(Ok(_)) => Ok(()),
        _ => Err(WriteError::OffsetOverflow { offset, length }),
    }
}

/// [`BoundedWriter::write_all`] with the tolerant policy and default limits.
pub fn write_all<S>(sink: &mut S, data: &[u8]) -> Result<(), WriteError>
where
    S: RawWrite + ?Sized,
{
    BoundedWriter::default().write_all(sink, data)
}

/// [`BoundedWriter::write_all_at`] with the tolerant policy and default limits.
pub fn write_all_at<S>(sink: &S, data: &[u8], offset: u64) -> Result<(), WriteError>
where
    S: RawWriteAt + ?Sized,
{
    BoundedWriter::default().write_all_at(sink, data, offset)
}
