//! Request context module
//!
//! The few request facts the file sender looks at, extracted once.

use hyper::header::{HeaderMap, HeaderName, IF_MODIFIED_SINCE, RANGE};
use hyper::{Method, Request};

/// Request information needed to build a file response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    /// Extract the context from a request method and its headers
    pub fn from_parts(method: &Method, headers: &HeaderMap) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            is_head: *method == Method::HEAD,
            if_modified_since: header(IF_MODIFIED_SINCE),
            range_header: header(RANGE),
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::from_parts(req.method(), req.headers())
    }

    /// Plain GET without conditional or range headers
    pub fn get() -> Self {
        Self::default()
    }

    pub fn head() -> Self {
        Self {
            is_head: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range_header = Some(range.into());
        self
    }

    #[must_use]
    pub fn with_if_modified_since(mut self, value: impl Into<String>) -> Self {
        self.if_modified_since = Some(value.into());
        self
    }
}
