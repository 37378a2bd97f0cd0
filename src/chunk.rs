//! Chunk sizing for large transfers.
//!
//! Linux caps a single `write(2)` at `0x7ffff000` bytes and other kernels have
//! been seen to fail or truncate around 2 GiB. Anything at or above
//! [`CHUNK_CEILING`] is therefore split into [`CHUNK_SIZE`] pieces, which stay
//! well clear of the boundary instead of probing it.

use crate::error::WriteError;

/// Largest request the raw write primitive is trusted with in one call.
pub const CHUNK_CEILING: usize = 1 << 31;

/// Size requested per call once the remaining data reaches the ceiling.
pub const CHUNK_SIZE: usize = 1 << 30;

/// Ceiling and per-call size used by a [`BoundedWriter`](crate::BoundedWriter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    ceiling: usize,
    size: usize,
}

impl ChunkLimits {
    /// Build limits for a sink with a smaller (or larger) trusted ceiling.
    ///
    /// `size` must be non-zero and strictly below `ceiling`.
    pub const fn new(ceiling: usize, size: usize) -> Result<Self, WriteError> {
        if size == 0 || size >= ceiling {
            return Err(WriteError::InvalidLimits { ceiling, size });
        }
        Ok(Self { ceiling, size })
    }

    pub const fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    /// Bytes to request next when `remaining` bytes are still unwritten.
    #[inline]
    pub const fn request_size(&self, remaining: usize) -> usize {
        if remaining < self.ceiling {
            remaining
        } else {
            self.size
        }
    }
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            ceiling: CHUNK_CEILING,
            size: CHUNK_SIZE,
        }
    }
}
