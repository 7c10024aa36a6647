//! fdsend
//!
//! Builds HTTP responses from open files and ZIP archive members, with byte
//! range and conditional GET support. Bodies are pulled lazily from a
//! [`Resource`], so nothing is read before the transport asks for it.

pub mod archive;
pub mod config;
pub mod error;
pub mod http;
pub mod io;
pub mod logger;
pub mod sendfile;
pub mod server;

pub use archive::{send_from_zip, zip_range_wrapper, ArchiveRange, MemberInfo, ZipMember};
pub use error::{Error, Result};
pub use http::{Body, PartialBody, RequestContext};
pub use io::{
    emulate_seek, force_seek, range_iter, RangeIter, RangeWrapper, Resource, SeekableReader,
    StreamReader, CHUNK,
};
pub use sendfile::{send_file, send_file_with, SendOptions};
