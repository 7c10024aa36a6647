//! HTTP response building module
//!
//! Builders for the fixed-shape responses of the file sender, decoupled from
//! how the headers of a normal response are computed.

use super::body::Body;
use super::date::http_date_now;
use crate::error::Result;
use hyper::ext::ReasonPhrase;
use hyper::header::{HeaderMap, HeaderValue, DATE, LAST_MODIFIED};
use hyper::{Response, StatusCode};

/// Reason phrase sent with 416 responses
pub const RANGE_NOT_SATISFIABLE_REASON: &str = "Request Range Not Satisfiable";

/// Assemble a response from its parts
pub fn build_response<R>(
    status: StatusCode,
    headers: HeaderMap,
    body: Body<R>,
) -> Response<Body<R>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Build 304 Not Modified response
///
/// Carries only `Last-Modified` (when known) and a fresh `Date`.
pub fn build_304_response<R>(last_modified: Option<&HeaderValue>) -> Result<Response<Body<R>>> {
    let mut headers = HeaderMap::new();
    if let Some(value) = last_modified {
        headers.insert(LAST_MODIFIED, value.clone());
    }
    headers.insert(DATE, HeaderValue::from_str(&http_date_now())?);
    Ok(build_response(StatusCode::NOT_MODIFIED, headers, Body::Empty))
}

/// Build 416 Range Not Satisfiable response
///
/// No headers at all; the reason phrase is attached for HTTP/1 transports.
pub fn build_416_response<R>() -> Response<Body<R>> {
    let mut response = build_response(
        StatusCode::RANGE_NOT_SATISFIABLE,
        HeaderMap::new(),
        Body::Empty,
    );
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(RANGE_NOT_SATISFIABLE_REASON.as_bytes()));
    response
}

/// Reason phrase of a response, preferring a custom one over the canonical
pub fn reason_phrase<B>(response: &Response<B>) -> Option<String> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
        .or_else(|| response.status().canonical_reason().map(ToString::to_string))
}
