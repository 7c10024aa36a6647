//! Seek adapter
//!
//! Positions a resource at a byte offset, falling back to read-and-discard
//! when the resource has no native seek.

use super::Resource;
use crate::error::{Error, Result};

/// Move `resource` to `offset`, emulating the seek if it is not supported
///
/// Only the "seek unsupported" signal triggers emulation. Every other error
/// is returned unchanged.
pub fn force_seek<R: Resource + ?Sized>(resource: &mut R, offset: u64, chunk: usize) -> Result<()> {
    match resource.seek(offset) {
        Err(e) if e.is_seek_unsupported() => emulate_seek(resource, offset, chunk),
        other => other,
    }
}

/// Advance a forward-only resource by reading and discarding `offset` bytes
///
/// Reads happen in `chunk`-sized pieces, the last one carrying the remainder.
/// A `chunk` of 0 discards the whole offset with a single read.
pub fn emulate_seek<R: Resource + ?Sized>(
    resource: &mut R,
    offset: u64,
    chunk: usize,
) -> Result<()> {
    if chunk == 0 {
        let size = usize::try_from(offset).map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("offset {offset} exceeds addressable read size"),
            ))
        })?;
        resource.read(size)?;
        return Ok(());
    }

    let mut remaining = offset;
    while remaining > 0 {
        // Bounded by `chunk`, so the cast back to usize cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let step = remaining.min(chunk as u64) as usize;
        resource.read(step)?;
        remaining -= step as u64;
    }
    Ok(())
}
