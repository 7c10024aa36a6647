//! Request handler module
//!
//! Maps request paths onto files below the serving root, or onto members of
//! ZIP archives found along the path, and answers them with `send_file`.

use crate::archive::send_from_zip;
use crate::config::{Config, ServeConfig};
use crate::error::{Error, Result};
use crate::http::RequestContext;
use crate::io::SeekableReader;
use crate::logger::{self, AccessLogEntry};
use crate::sendfile::{send_file, SendOptions};
use chrono::{DateTime, Utc};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Body type of every response the server writes
pub type ResponseBody = UnsyncBoxBody<Bytes, Error>;

/// What a request path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Archive { archive: PathBuf, member: String },
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    config: Arc<Config>,
    remote_addr: SocketAddr,
) -> std::result::Result<Response<ResponseBody>, Infallible> {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let request = RequestContext::from_request(&req);
    let response = dispatch(req.method(), req.uri().path(), request, &config).await;

    if config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(
    method: &Method,
    path: &str,
    request: RequestContext,
    config: &Config,
) -> Response<ResponseBody> {
    if !matches!(*method, Method::GET | Method::HEAD) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    let Some(target) = resolve_target(Path::new(&config.serve.root), path) else {
        return text_response(StatusCode::NOT_FOUND, "Not Found");
    };

    let serve = config.serve.clone();
    let joined =
        tokio::task::spawn_blocking(move || serve_target(target, &serve, &request)).await;

    match joined {
        Ok(Ok(response)) => response,
        Ok(Err(e)) if is_not_found(&e) => text_response(StatusCode::NOT_FOUND, "Not Found"),
        Ok(Err(e)) => {
            logger::log_error(&format!("Failed to serve '{path}': {e}"));
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
        Err(e) => {
            logger::log_error(&format!("File task failed: {e}"));
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Resolve a request path below `root`
///
/// A path segment naming a `.zip` file with further segments after it
/// selects a member of that archive. Parent references are refused.
pub fn resolve_target(root: &Path, uri_path: &str) -> Option<Target> {
    let segments: Vec<&str> = uri_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == ".." || s.contains('\\')) {
        logger::log_warning(&format!("Path traversal attempt blocked: {uri_path}"));
        return None;
    }

    let mut path = root.to_path_buf();
    for (i, segment) in segments.iter().enumerate() {
        path.push(segment);
        let rest = &segments[i + 1..];
        if !rest.is_empty()
            && Path::new(segment)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
            && path.is_file()
        {
            return Some(Target::Archive {
                archive: path,
                member: rest.join("/"),
            });
        }
    }

    path.is_file().then_some(Target::File(path))
}

/// Build the response for a resolved target (blocking)
fn serve_target(
    target: Target,
    serve: &ServeConfig,
    request: &RequestContext,
) -> Result<Response<ResponseBody>> {
    match target {
        Target::File(path) => {
            let metadata = std::fs::metadata(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = SendOptions::new(filename)
                .size(metadata.len())
                .timestamp(DateTime::<Utc>::from(metadata.modified()?))
                .charset(serve.charset.clone())
                .attachment(serve.attachment)
                .chunk_size(serve.chunk_size);
            let resource = SeekableReader::open(&path)?;
            Ok(send_file(resource, &options, request)?.map(BodyExt::boxed_unsync))
        }
        Target::Archive { archive, member } => {
            let response = send_from_zip(&archive, &member, None, serve.attachment, request)?;
            Ok(response.map(BodyExt::boxed_unsync))
        }
    }
}

fn is_not_found(err: &Error) -> bool {
    match err {
        Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
        Error::Archive(zip::result::ZipError::FileNotFound) => true,
        _ => false,
    }
}

fn text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    let body = Full::new(Bytes::from_static(message.as_bytes()))
        .map_err(|never| match never {})
        .boxed_unsync();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=UTF-8"),
    );
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(message.len()));
    response
}
