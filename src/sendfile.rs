//! File response builder
//!
//! Turns a resource plus its metadata into a response description:
//! conditional GET, content headers, HEAD short-circuit and single byte
//! ranges. The resource is never read here, except for positioning a
//! ranged view.

use crate::error::{Error, Result};
use crate::http::body::{Body, PartialBody};
use crate::http::date::{format_http_date, parse_http_date};
use crate::http::range::{content_range, parse_range_header, RANGE_UNIT};
use crate::http::request::RequestContext;
use crate::http::response::{build_304_response, build_416_response, build_response};
use crate::http::mime;
use crate::io::{RangeWrapper, Resource, CHUNK};
use chrono::{DateTime, SubsecRound, Utc};
use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::fmt::Write;

/// Metadata and switches for a single file response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    /// Name used for type guessing and `Content-Disposition`
    pub filename: String,
    /// Total size in bytes; enables `Content-Length` and Range support
    pub size: Option<u64>,
    /// Modification time; enables `Last-Modified` and conditional GET
    pub timestamp: Option<DateTime<Utc>>,
    /// Explicit content type, overriding the guessed one
    pub content_type: Option<String>,
    /// Charset appended to text types
    pub charset: String,
    /// Ask the client to save rather than display
    pub attachment: bool,
    /// Chunk size for emulated seeks in the default range wrapper
    pub chunk_size: usize,
}

impl SendOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size: None,
            timestamp: None,
            content_type: None,
            charset: "UTF-8".to_string(),
            attachment: false,
            chunk_size: CHUNK,
        }
    }

    #[must_use]
    pub const fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: impl Into<DateTime<Utc>>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub const fn attachment(mut self, attachment: bool) -> Self {
        self.attachment = attachment;
        self
    }

    #[must_use]
    pub const fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Default for SendOptions {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Build a response for `resource`, wrapping ranged requests in a [`RangeWrapper`]
pub fn send_file<R>(
    resource: R,
    options: &SendOptions,
    request: &RequestContext,
) -> Result<Response<Body<R>>>
where
    R: Resource + Send + 'static,
{
    let chunk = options.chunk_size;
    send_file_with(resource, options, request, move |resource, offset, length| {
        let view = RangeWrapper::with_chunk(resource, offset, length, chunk)?;
        Ok(Box::new(view) as PartialBody)
    })
}

/// Build a response for `resource`, letting `wrapper` produce the ranged body
///
/// `wrapper` is called at most once, with the resource, the first byte of the
/// range and its length.
pub fn send_file_with<R, W>(
    resource: R,
    options: &SendOptions,
    request: &RequestContext,
    wrapper: W,
) -> Result<Response<Body<R>>>
where
    R: Resource,
    W: FnOnce(R, u64, u64) -> Result<PartialBody>,
{
    if !resource.is_readable() {
        return Err(Error::NotReadable);
    }

    let mut headers = content_headers(options)?;

    if let Some(size) = options.size {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static(RANGE_UNIT));
    }

    if let Some(timestamp) = options.timestamp {
        headers.insert(
            LAST_MODIFIED,
            HeaderValue::from_str(&format_http_date(timestamp))?,
        );
        if not_modified_since(request.if_modified_since.as_deref(), timestamp) {
            return build_304_response(headers.get(LAST_MODIFIED));
        }
    }

    if request.is_head {
        return Ok(build_response(StatusCode::OK, headers, Body::Empty));
    }

    let range_header = request.range_header.as_deref().filter(|h| !h.is_empty());
    if let (Some(size), Some(range_header)) = (options.size, range_header) {
        let Some(range) = parse_range_header(range_header, size).into_iter().next() else {
            return Ok(build_416_response());
        };
        let length = range.end - range.start;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(
            CONTENT_RANGE,
            HeaderValue::from_str(&content_range(&range, size))?,
        );
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static(RANGE_UNIT));
        let body = wrapper(resource, range.start, length)?;
        return Ok(build_response(
            StatusCode::PARTIAL_CONTENT,
            headers,
            Body::Partial(body),
        ));
    }

    Ok(build_response(StatusCode::OK, headers, Body::Full(resource)))
}

/// `Content-Type`, `Content-Encoding` and `Content-Disposition`
fn content_headers(options: &SendOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let (guessed, encoding) = mime::guess_type(&options.filename);

    if let Some(ctype) = options.content_type.as_deref().or(guessed) {
        let value = mime::content_type_with_charset(ctype, &options.charset);
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(&value)?);
    }
    if let Some(encoding) = encoding {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
    }
    if options.attachment {
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&content_disposition(&options.filename))?,
        );
    }
    Ok(headers)
}

/// `attachment` disposition with an RFC 6266 `filename*` for non-ASCII names
///
/// The plain `filename` parameter always carries an ASCII fallback.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    let quoted = fallback.replace('\\', "\\\\").replace('"', "\\\"");
    if fallback == filename {
        return format!("attachment; filename=\"{quoted}\"");
    }
    format!(
        "attachment; filename=\"{quoted}\"; filename*=UTF-8''{}",
        encode_ext_value(filename)
    )
}

/// Percent-encode everything outside RFC 5987 `attr-char`
fn encode_ext_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Whether an `If-Modified-Since` value says the client copy is current
///
/// HTTP dates have whole-second resolution, so the comparison drops the
/// fractional part of `timestamp`. Unparsable values never match.
fn not_modified_since(if_modified_since: Option<&str>, timestamp: DateTime<Utc>) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| since >= timestamp.trunc_subsecs(0))
}
