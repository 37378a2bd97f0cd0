//! Write whole buffers to file descriptors, however large.
//!
//! A single `write(2)` or `pwrite(2)` cannot be trusted with transfers around
//! 2 GiB and may return early for many ordinary reasons. [`write_all`] and
//! [`write_all_at`] split the buffer into bounded chunks and keep issuing raw
//! writes until every byte is committed or an error is worth giving up on.
//!
//! ```no_run
//! use std::fs::File;
//! use bulkwrite::{BoundedWriter, FdSink, Policy};
//!
//! # fn main() -> std::io::Result<()> {
//! let file = File::create("big.bin")?;
//! let data = vec![0x03u8; 1 << 31];
//!
//! bulkwrite::write_all(&mut FdSink::new(&file), &data)?;
//! BoundedWriter::new(Policy::Strict).write_all_at(&FdSink::new(&file), &data, 10)?;
//! # Ok(())
//! # }
//! ```

mod chunk;
mod error;
mod sink;
mod writer;

pub use chunk::{CHUNK_CEILING, CHUNK_SIZE, ChunkLimits};
pub use error::WriteError;
pub use sink::{FdSink, RawWrite, RawWriteAt};
pub use writer::{BoundedWriter, ParsePolicyError, Policy, write_all, write_all_at};

pub use nix::errno::Errno;
