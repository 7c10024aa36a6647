//! ZIP archive adapter
//!
//! Serves a single member of a ZIP file through the file response builder.
//! Stored members can seek natively; deflated members are forward-only
//! decompression streams, so ranged reads over them skip ahead by reading.

use crate::error::{Error, Result};
use crate::http::body::{Body, PartialBody};
use crate::http::request::RequestContext;
use crate::io::{read_up_to, RangeWrapper, Resource};
use crate::sendfile::{send_file_with, SendOptions};
use chrono::{DateTime, Utc};
use flate2::read::DeflateDecoder;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Take};
use std::path::Path;
use zip::{CompressionMethod, ZipArchive};

/// Reader over the member's bytes inside the archive file
enum MemberReader {
    Stored(Take<File>),
    Deflated(Box<DeflateDecoder<Take<File>>>),
}

/// Uncompressed content of one archive member
pub struct ZipMember {
    reader: Option<MemberReader>,
    data_start: u64,
    size: u64,
}

/// Metadata of an opened member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// File name with any directory part stripped
    pub filename: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

impl ZipMember {
    /// Open `member_path` inside the archive at `archive_path`
    ///
    /// Returns the archive container alongside the member so the caller
    /// decides when the container is released.
    pub fn open(
        archive_path: &Path,
        member_path: &str,
    ) -> Result<(ZipArchive<File>, Self, MemberInfo)> {
        let mut archive = ZipArchive::new(File::open(archive_path)?)?;
        let (name, method, data_start, compressed_size, size) = {
            let entry = archive.by_name(member_path)?;
            (
                entry.name().to_string(),
                entry.compression(),
                entry.data_start(),
                entry.compressed_size(),
                entry.size(),
            )
        };

        let mut raw = File::open(archive_path)?;
        raw.seek(SeekFrom::Start(data_start))?;
        let raw = raw.take(compressed_size);
        let reader = match method {
            CompressionMethod::Stored => MemberReader::Stored(raw),
            CompressionMethod::Deflated => {
                MemberReader::Deflated(Box::new(DeflateDecoder::new(raw)))
            }
            _ => return Err(Error::UnsupportedCompression(name)),
        };

        let filename = Path::new(&name)
            .file_name()
            .map_or_else(|| name.clone(), |n| n.to_string_lossy().into_owned());

        let member = Self {
            reader: Some(reader),
            data_start,
            size,
        };
        Ok((archive, member, MemberInfo { filename, size }))
    }

    /// Whether the member supports native seeking
    pub const fn is_seekable(&self) -> bool {
        matches!(self.reader, Some(MemberReader::Stored(_)))
    }
}

impl Resource for ZipMember {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        match self.reader.as_mut().ok_or(Error::Closed)? {
            MemberReader::Stored(reader) => read_up_to(reader, size),
            MemberReader::Deflated(reader) => read_up_to(reader, size),
        }
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        match self.reader.as_mut().ok_or(Error::Closed)? {
            MemberReader::Stored(reader) => {
                let offset = offset.min(self.size);
                reader.get_mut().seek(SeekFrom::Start(self.data_start + offset))?;
                reader.set_limit(self.size - offset);
                Ok(())
            }
            MemberReader::Deflated(_) => Err(Error::SeekUnsupported),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }

    fn is_readable(&self) -> bool {
        self.reader.is_some()
    }
}

/// Bounded view over a member that also releases its archive container
///
/// When the view is drained or closed, the member is closed first and the
/// container is dropped right after.
pub struct ArchiveRange<R: Resource, C> {
    view: RangeWrapper<R>,
    container: Option<C>,
}

impl<R: Resource, C> ArchiveRange<R, C> {
    pub fn new(resource: R, offset: u64, length: u64, chunk: usize, container: C) -> Result<Self> {
        Ok(Self {
            view: RangeWrapper::with_chunk(resource, offset, length, chunk)?,
            container: Some(container),
        })
    }

    pub const fn is_closed(&self) -> bool {
        self.container.is_none()
    }
}

impl<R: Resource, C> Resource for ArchiveRange<R, C> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        let data = self.view.read(size)?;
        if data.is_empty() && size > 0 {
            self.close()?;
        }
        Ok(data)
    }

    fn close(&mut self) -> Result<()> {
        let result = self.view.close();
        drop(self.container.take());
        result
    }

    fn is_readable(&self) -> bool {
        self.view.is_readable()
    }
}

impl<R: Resource, C> Drop for ArchiveRange<R, C> {
    fn drop(&mut self) {
        let _ = Resource::close(self);
    }
}

/// Range wrapper for the response builder that carries the archive container along
pub fn zip_range_wrapper<R, C>(
    container: C,
    chunk: usize,
) -> impl FnOnce(R, u64, u64) -> Result<PartialBody>
where
    R: Resource + Send + 'static,
    C: Send + 'static,
{
    move |resource, offset, length| {
        let view = ArchiveRange::new(resource, offset, length, chunk, container)?;
        Ok(Box::new(view) as PartialBody)
    }
}

/// Build a response serving `member_path` from the ZIP file at `archive_path`
///
/// The modification time is that of the archive file itself. Type and
/// disposition come from the member's base name unless `content_type` is given.
pub fn send_from_zip(
    archive_path: impl AsRef<Path>,
    member_path: &str,
    content_type: Option<&str>,
    attachment: bool,
    request: &RequestContext,
) -> Result<Response<Body<ZipMember>>> {
    let archive_path = archive_path.as_ref();
    let (archive, member, info) = ZipMember::open(archive_path, member_path)?;
    let timestamp = DateTime::<Utc>::from(std::fs::metadata(archive_path)?.modified()?);

    let mut options = SendOptions::new(info.filename)
        .size(info.size)
        .timestamp(timestamp)
        .attachment(attachment);
    if let Some(content_type) = content_type {
        options = options.content_type(content_type);
    }

    let chunk = options.chunk_size;
    send_file_with(member, &options, request, zip_range_wrapper(archive, chunk))
}
