//! Resource abstraction module
//!
//! A resource is anything that produces bytes on demand. Seeking and closing
//! are optional capabilities: a resource that cannot seek reports
//! [`Error::SeekUnsupported`] and callers emulate the seek by reading forward.

#[cfg(test)]
pub(crate) mod mock;
mod ranged;
mod seek;

pub use ranged::{range_iter, RangeIter, RangeWrapper};
pub use seek::{emulate_seek, force_seek};

use crate::error::{Error, Result};
use hyper::body::Bytes;
use std::io::{Read, Seek, SeekFrom};

/// Default chunk size for reads and emulated seeks
pub const CHUNK: usize = 8192;

/// Byte source consumed by the range readers and the response builder
pub trait Resource {
    /// Read at most `size` bytes. An empty result means the resource is exhausted.
    fn read(&mut self, size: usize) -> Result<Bytes>;

    /// Move to an absolute byte offset
    fn seek(&mut self, _offset: u64) -> Result<()> {
        Err(Error::SeekUnsupported)
    }

    /// Release the resource. Resources without a close capability do nothing.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether `read` can be called at all
    fn is_readable(&self) -> bool {
        true
    }
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        (**self).read(size)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        (**self).seek(offset)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }
}

/// Fill up to `size` bytes from a reader, stopping early only at EOF
pub(crate) fn read_up_to<T: Read>(reader: &mut T, size: usize) -> Result<Bytes> {
    let mut buf = Vec::with_capacity(size.min(CHUNK * 8));
    reader
        .take(u64::try_from(size).unwrap_or(u64::MAX))
        .read_to_end(&mut buf)?;
    Ok(Bytes::from(buf))
}

/// Resource over a reader with native seek support (files, cursors)
#[derive(Debug)]
pub struct SeekableReader<T> {
    inner: Option<T>,
}

impl<T: Read + Seek> SeekableReader<T> {
    pub const fn new(inner: T) -> Self {
        Self { inner: Some(inner) }
    }
}

impl SeekableReader<std::fs::File> {
    /// Open a file on disk for reading
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::File::open(path)?))
    }
}

impl<T: Read + Seek> Resource for SeekableReader<T> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        read_up_to(inner, size)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }

    fn is_readable(&self) -> bool {
        self.inner.is_some()
    }
}

/// Resource over a forward-only reader, such as a decompression stream
#[derive(Debug)]
pub struct StreamReader<T> {
    inner: Option<T>,
}

impl<T: Read> StreamReader<T> {
    pub const fn new(inner: T) -> Self {
        Self { inner: Some(inner) }
    }
}

impl<T: Read> Resource for StreamReader<T> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        read_up_to(inner, size)
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }

    fn is_readable(&self) -> bool {
        self.inner.is_some()
    }
}
