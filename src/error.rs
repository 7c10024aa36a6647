//! Error types shared by the resource, range and response layers.

use hyper::header::InvalidHeaderValue;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The object handed to the response builder cannot be read from.
    #[error("resource does not support reading")]
    NotReadable,
    /// Read or seek attempted after the resource was closed.
    #[error("I/O operation on closed resource")]
    Closed,
    /// Native seek is not available; callers fall back to emulation.
    #[error("seek is not supported by this resource")]
    SeekUnsupported,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("unsupported compression method for '{0}'")]
    UnsupportedCompression(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl Error {
    /// Whether this error only signals that native seeking is unavailable
    pub fn is_seek_unsupported(&self) -> bool {
        match self {
            Self::SeekUnsupported => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::Unsupported,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_unsupported_detection() {
        assert!(Error::SeekUnsupported.is_seek_unsupported());
        assert!(Error::from(std::io::Error::from(std::io::ErrorKind::Unsupported))
            .is_seek_unsupported());
        assert!(!Error::Closed.is_seek_unsupported());
        assert!(!Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
            .is_seek_unsupported());
    }
}
