//! Raw write primitives the bounded writer drives.
//!
//! A sink makes exactly one attempt per call and reports what the kernel
//! said: a byte count, possibly short, or the errno. Retrying, chunking and
//! deciding what is fatal all happen in [`BoundedWriter`](crate::BoundedWriter).

use std::os::fd::{AsFd, BorrowedFd};

use nix::errno::Errno;

/// Sequential sink with its own write cursor (`write(2)`).
pub trait RawWrite {
    /// Attempt to write `buf`, returning how many bytes were accepted.
    fn raw_write(&mut self, buf: &[u8]) -> Result<usize, Errno>;
}

/// Positioned sink addressed by absolute offset (`pwrite(2)`).
///
/// Takes `&self`: positioned writes do not touch a shared cursor.
pub trait RawWriteAt {
    /// Attempt to write `buf` starting at `offset`.
    fn raw_write_at(&self, buf: &[u8], offset: u64) -> Result<usize, Errno>;
}

impl<T: RawWrite + ?Sized> RawWrite for &mut T {
    fn raw_write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        (**self).raw_write(buf)
    }
}

impl<T: RawWriteAt + ?Sized> RawWriteAt for &T {
    fn raw_write_at(&self, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        (**self).raw_write_at(buf, offset)
    }
}

/// Sink over a file descriptor the caller keeps ownership of.
///
/// Wrap a `&File`, `BorrowedFd` or `OwnedFd`; dropping the sink closes the
/// descriptor only when it was handed an owned one.
#[derive(Debug)]
pub struct FdSink<F> {
    fd: F,
}

impl<F: AsFd> FdSink<F> {
    pub fn new(fd: F) -> Self {
        Self { fd }
    }

    pub fn into_inner(self) -> F {
        self.fd
    }
}

impl<F: AsFd> AsFd for FdSink<F> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl<F: AsFd> RawWrite for FdSink<F> {
    fn raw_write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        nix::unistd::write(self.fd.as_fd(), buf)
    }
}

impl<F: AsFd> RawWriteAt for FdSink<F> {
    fn raw_write_at(&self, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        let offset = libc::off_t::try_from(offset).map_err(|_| Errno::EOVERFLOW)?;
        nix::sys::uio::pwrite(self.fd.as_fd(), buf, offset)
    }
}
