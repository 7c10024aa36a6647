//! HTTP protocol layer module
//!
//! Range parsing, HTTP dates, MIME guessing and response building, decoupled
//! from how the bytes of a file are obtained.

pub mod body;
pub mod date;
pub mod mime;
pub mod range;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use body::{Body, PartialBody};
pub use date::{format_http_date, parse_http_date};
pub use range::parse_range_header;
pub use request::RequestContext;
pub use response::{build_304_response, build_416_response, reason_phrase};
