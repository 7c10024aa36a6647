//! Response body module
//!
//! The body of a file response is pull-based: nothing is read until the
//! transport asks for the next frame.

use crate::error::{Error, Result};
use crate::io::{Resource, CHUNK};
use hyper::body::{Bytes, Frame, SizeHint};
use std::fmt;
use tokio::runtime::{Handle, RuntimeFlavor};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Boxed resource used for ranged bodies
pub type PartialBody = Box<dyn Resource + Send>;

/// Body of a file response
pub enum Body<R> {
    /// The original resource, served from its current position to the end
    Full(R),
    /// A bounded view produced for a Range request
    Partial(PartialBody),
    /// No payload (HEAD, 304, 416)
    Empty,
}

impl<R> Body<R> {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    /// Take the original resource back out of a full body
    pub fn into_full(self) -> Option<R> {
        match self {
            Self::Full(resource) => Some(resource),
            _ => None,
        }
    }
}

impl<R> fmt::Debug for Body<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Body::Full"),
            Self::Partial(_) => f.write_str("Body::Partial"),
            Self::Empty => f.write_str("Body::Empty"),
        }
    }
}

impl<R: Resource> Resource for Body<R> {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        match self {
            Self::Full(resource) => resource.read(size),
            Self::Partial(resource) => resource.read(size),
            Self::Empty => Ok(Bytes::new()),
        }
    }

    fn close(&mut self) -> Result<()> {
        let result = match self {
            Self::Full(resource) => resource.close(),
            Self::Partial(resource) => resource.close(),
            Self::Empty => Ok(()),
        };
        *self = Self::Empty;
        result
    }

    fn is_readable(&self) -> bool {
        match self {
            Self::Full(resource) => resource.is_readable(),
            Self::Partial(resource) => resource.is_readable(),
            Self::Empty => true,
        }
    }
}

impl<R: Resource> Body<R> {
    /// Read the next chunk, moving off the async worker when the runtime allows it
    ///
    /// `block_in_place` panics on a current-thread runtime, where the read
    /// runs inline instead.
    fn read_chunk(&mut self) -> Result<Bytes> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.read(CHUNK))
            }
            _ => self.read(CHUNK),
        }
    }
}

/// Lets hyper drain the body directly, one `CHUNK` per frame
///
/// The resource is closed as soon as it runs dry.
impl<R: Resource + Unpin> hyper::body::Body for Body<R> {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>>>> {
        let this = self.get_mut();
        if this.is_empty() {
            return Poll::Ready(None);
        }

        match this.read_chunk() {
            Ok(data) if data.is_empty() => match this.close() {
                Ok(()) => Poll::Ready(None),
                Err(e) => Poll::Ready(Some(Err(e))),
            },
            Ok(data) => Poll::Ready(Some(Ok(Frame::data(data)))),
            Err(e) => {
                let _ = this.close();
                Poll::Ready(Some(Err(e)))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        if self.is_empty() {
            SizeHint::with_exact(0)
        } else {
            SizeHint::default()
        }
    }
}
