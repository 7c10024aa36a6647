//! Ranged reader module
//!
//! Two views over the same bounded read: [`RangeIter`] streams chunks and
//! [`RangeWrapper`] is itself a [`Resource`] with a fixed byte budget.
//! Both position the underlying resource on construction and release it
//! once the budget is spent, the resource runs dry, or the view is dropped.

use super::{force_seek, Resource, CHUNK};
use crate::error::{Error, Result};
use hyper::body::Bytes;

/// Size of the next read: `chunk` capped by what is left, or everything left for 0
fn next_step(remaining: u64, chunk: usize) -> usize {
    let cap = if chunk == 0 { usize::MAX } else { chunk };
    usize::try_from(remaining).map_or(cap, |r| r.min(cap))
}

/// Drop anything a resource returned past the budget
fn clamp(data: Bytes, remaining: u64) -> Bytes {
    match usize::try_from(remaining) {
        Ok(r) if data.len() > r => data.slice(..r),
        _ => data,
    }
}

/// Lazy chunk sequence over `length` bytes starting at `offset`
///
/// Single pass: once exhausted it yields nothing more, and the resource has
/// been closed.
#[derive(Debug)]
pub struct RangeIter<R: Resource> {
    resource: Option<R>,
    remaining: u64,
    chunk: usize,
}

/// Seek `resource` to `offset` and return an iterator over the next `length` bytes
pub fn range_iter<R: Resource>(
    mut resource: R,
    offset: u64,
    length: u64,
    chunk: usize,
) -> Result<RangeIter<R>> {
    force_seek(&mut resource, offset, chunk)?;
    Ok(RangeIter {
        resource: Some(resource),
        remaining: length,
        chunk,
    })
}

impl<R: Resource> RangeIter<R> {
    /// Bytes still owed to the consumer
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    fn finish(&mut self) -> Result<()> {
        match self.resource.take() {
            Some(mut resource) => resource.close(),
            None => Ok(()),
        }
    }
}

impl<R: Resource> Iterator for RangeIter<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        let resource = self.resource.as_mut()?;
        if self.remaining == 0 {
            return self.finish().err().map(Err);
        }

        match resource.read(next_step(self.remaining, self.chunk)) {
            Ok(data) if data.is_empty() => self.finish().err().map(Err),
            Ok(data) => {
                let data = clamp(data, self.remaining);
                self.remaining -= data.len() as u64;
                if self.remaining == 0 {
                    if let Err(e) = self.finish() {
                        return Some(Err(e));
                    }
                }
                Some(Ok(data))
            }
            Err(e) => {
                let _ = self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<R: Resource> Drop for RangeIter<R> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

/// Resource view limited to `length` bytes starting at `offset`
#[derive(Debug)]
pub struct RangeWrapper<R: Resource> {
    resource: Option<R>,
    remaining: u64,
}

impl<R: Resource> RangeWrapper<R> {
    /// Wrap `resource`, seeking to `offset` with the default chunk size
    pub fn new(resource: R, offset: u64, length: u64) -> Result<Self> {
        Self::with_chunk(resource, offset, length, CHUNK)
    }

    /// Wrap `resource`, using `chunk` for an emulated seek if needed
    pub fn with_chunk(mut resource: R, offset: u64, length: u64, chunk: usize) -> Result<Self> {
        force_seek(&mut resource, offset, chunk)?;
        Ok(Self {
            resource: Some(resource),
            remaining: length,
        })
    }

    /// Read at most `size` bytes, or the whole remaining budget when `size` is `None`
    ///
    /// Once the budget is spent this returns empty data without touching the
    /// underlying resource.
    pub fn read_at_most(&mut self, size: Option<usize>) -> Result<Bytes> {
        let resource = self.resource.as_mut().ok_or(Error::Closed)?;
        let step = match size {
            Some(size) => usize::try_from(self.remaining).map_or(size, |r| r.min(size)),
            None => next_step(self.remaining, 0),
        };
        if step == 0 {
            return Ok(Bytes::new());
        }

        let data = clamp(resource.read(step)?, self.remaining);
        self.remaining -= data.len() as u64;
        Ok(data)
    }

    /// Read the whole remaining budget with one underlying read
    pub fn read_all(&mut self) -> Result<Bytes> {
        self.read_at_most(None)
    }

    /// Bytes left in the budget
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    pub const fn is_closed(&self) -> bool {
        self.resource.is_none()
    }
}

impl<R: Resource> Resource for RangeWrapper<R> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        self.read_at_most(Some(size))
    }

    /// Close the wrapped resource and forget it. Safe to call repeatedly.
    fn close(&mut self) -> Result<()> {
        match self.resource.take() {
            Some(mut resource) => resource.close(),
            None => Ok(()),
        }
    }

    fn is_readable(&self) -> bool {
        self.resource.is_some()
    }
}

impl<R: Resource> Drop for RangeWrapper<R> {
    fn drop(&mut self) {
        let _ = Resource::close(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::{Call, MockResource, SeekMode};
    use crate::io::SeekableReader;
    use std::io::Cursor;

    #[test]
    fn test_range_iter() {
        let fd = MockResource::new();
        let log = fd.log();
        let chunks: Vec<Bytes> = range_iter(fd, 20, 24576, CHUNK)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == CHUNK));
        assert_eq!(log.seeks(), vec![20]);
        assert_eq!(log.reads(), vec![8192, 8192, 8192]);
        assert_eq!(log.calls().last(), Some(&Call::Close));
    }

    #[test]
    fn test_range_iter_closes_fd() {
        let fd = MockResource::new();
        let log = fd.log();
        let total: usize = range_iter(fd, 20, 30, CHUNK)
            .unwrap()
            .map(|c| c.unwrap().len())
            .sum();
        assert_eq!(total, 30);
        assert_eq!(log.reads(), vec![30]);
        assert_eq!(log.close_count(), 1);
    }

    #[test]
    fn test_range_iter_interruption() {
        let fd = MockResource::new().script(&[b"chunk", b"chunk"]);
        let log = fd.log();
        let ret: Vec<_> = range_iter(fd, 0, 3 * CHUNK as u64, CHUNK).unwrap().collect();
        assert_eq!(ret.len(), 2);
        assert_eq!(log.reads().len(), 3);
        assert_eq!(log.close_count(), 1);
    }

    #[test]
    fn test_range_iter_support_fd_with_no_seek() {
        let length = 3 * CHUNK as u64;
        for mode in [SeekMode::IoUnsupported, SeekMode::Missing] {
            let fd = MockResource::new().seek_mode(mode);
            let log = fd.log();
            let ret: Vec<_> = range_iter(fd, 20, length, CHUNK).unwrap().collect();
            assert_eq!(ret.len(), 3);
            assert_eq!(log.reads(), vec![20, 8192, 8192, 8192]);
        }
    }

    #[test]
    fn test_range_iter_closes_on_early_drop() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut it = range_iter(fd, 0, 100, 10).unwrap();
        assert!(it.next().is_some());
        drop(it);
        assert_eq!(log.close_count(), 1);
    }

    #[test]
    fn test_range_iter_real_data() {
        let fd = SeekableReader::new(Cursor::new((0u8..100).collect::<Vec<_>>()));
        let data: Vec<u8> = range_iter(fd, 10, 25, 10)
            .unwrap()
            .flat_map(|c| c.unwrap().to_vec())
            .collect();
        assert_eq!(data, (10u8..35).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_wrapper_seeks() {
        let fd = MockResource::new();
        let log = fd.log();
        let _ret = RangeWrapper::new(fd, 20, 20).unwrap();
        assert_eq!(log.seeks(), vec![20]);
    }

    #[test]
    fn test_range_wrapper_close() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut ret = RangeWrapper::new(fd, 20, 20).unwrap();
        assert!(!ret.is_closed());
        ret.close().unwrap();
        assert!(ret.is_closed());
        assert_eq!(log.close_count(), 1);
        // idempotent, and dropping afterwards does not close again
        ret.close().unwrap();
        drop(ret);
        assert_eq!(log.close_count(), 1);
    }

    #[test]
    fn test_range_wrapper_close_fails_silently() {
        let fd = MockResource::new().without_close();
        let mut ret = RangeWrapper::new(fd, 20, 20).unwrap();
        ret.close().unwrap();
        assert!(ret.is_closed());
    }

    #[test]
    fn test_range_wrapper_read_on_closed_descriptor() {
        let mut ret = RangeWrapper::new(MockResource::new(), 20, 20).unwrap();
        ret.close().unwrap();
        assert!(matches!(ret.read_all(), Err(Error::Closed)));
        assert!(matches!(ret.read(5), Err(Error::Closed)));
    }

    #[test]
    fn test_range_wrapper_read_without_size() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut ret = RangeWrapper::new(fd, 20, 20).unwrap();
        let data = ret.read_all().unwrap();
        assert_eq!(data.len(), 20);
        assert_eq!(log.reads(), vec![20]);
        assert!(ret.read_all().unwrap().is_empty());
        assert_eq!(log.reads(), vec![20]);
    }

    #[test]
    fn test_range_wrapper_read_with_size() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut ret = RangeWrapper::new(fd, 20, 20).unwrap();
        ret.read(10).unwrap();
        assert_eq!(log.reads(), vec![10]);
    }

    #[test]
    fn test_range_wrapper_multiple_reads() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut ret = RangeWrapper::new(fd, 20, 20).unwrap();
        assert_eq!(ret.read(10).unwrap().len(), 10);
        assert_eq!(ret.read(10).unwrap().len(), 10);
        assert!(ret.read(10).unwrap().is_empty());
        assert!(ret.read(10).unwrap().is_empty());
        assert_eq!(log.reads(), vec![10, 10]);
    }

    #[test]
    fn test_range_wrapper_never_exceeds_budget() {
        let fd = MockResource::new();
        let log = fd.log();
        let mut ret = RangeWrapper::new(fd, 0, 15).unwrap();
        assert_eq!(ret.read(10).unwrap().len(), 10);
        assert_eq!(ret.read(10).unwrap().len(), 5);
        assert_eq!(log.reads(), vec![10, 5]);
        assert_eq!(ret.remaining(), 0);
    }

    #[test]
    fn test_forms_agree_on_total_bytes() {
        let data: Vec<u8> = (0..=255).collect();
        let from_iter: Vec<u8> =
            range_iter(SeekableReader::new(Cursor::new(data.clone())), 40, 77, 16)
                .unwrap()
                .flat_map(|c| c.unwrap().to_vec())
                .collect();

        let mut view =
            RangeWrapper::with_chunk(SeekableReader::new(Cursor::new(data)), 40, 77, 16).unwrap();
        let mut from_view = Vec::new();
        loop {
            let chunk = view.read(16).unwrap();
            if chunk.is_empty() {
                break;
            }
            from_view.extend_from_slice(&chunk);
        }
        assert_eq!(from_iter, from_view);
        assert_eq!(from_view.len(), 77);
    }
}
