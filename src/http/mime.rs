//! MIME type detection module
//!
//! Guesses the Content-Type and Content-Encoding of a file from its name.

/// Encoding suffixes, checked before the type extension
const ENCODINGS: &[(&str, &str)] = &[
    ("gz", "gzip"),
    ("bz2", "bzip2"),
    ("xz", "xz"),
    ("br", "br"),
    ("Z", "compress"),
];

/// Shorthand extensions standing for a type plus an encoding
const SUFFIX_ALIASES: &[(&str, &str)] = &[
    ("tgz", "tar.gz"),
    ("taz", "tar.gz"),
    ("tz", "tar.gz"),
    ("tbz2", "tar.bz2"),
    ("txz", "tar.xz"),
    ("svgz", "svg.gz"),
];

/// Get MIME type based on file extension (lowercase, without dot)
fn type_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "text" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",

        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/x-wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents and archives
        "pdf" => "application/pdf",
        "epub" => "application/epub+zip",
        "zip" => "application/zip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(mime)
}

/// Split the last extension off a file name
fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// Guess `(content_type, content_encoding)` from a file name
///
/// # Examples
/// ```
/// use fdsend::http::mime::guess_type;
/// assert_eq!(guess_type("foo.pdf"), (Some("application/pdf"), None));
/// assert_eq!(guess_type("foo.tar.gz"), (Some("application/x-tar"), Some("gzip")));
/// assert_eq!(guess_type("foo.gz"), (None, Some("gzip")));
/// assert_eq!(guess_type("foo"), (None, None));
/// ```
pub fn guess_type(filename: &str) -> (Option<&'static str>, Option<&'static str>) {
    let mut name = filename.to_string();
    if let Some((stem, ext)) = split_extension(filename) {
        if let Some((_, expanded)) = SUFFIX_ALIASES
            .iter()
            .find(|(alias, _)| ext.eq_ignore_ascii_case(alias))
        {
            name = format!("{stem}.{expanded}");
        }
    }

    let mut encoding = None;
    let mut rest = name.as_str();
    if let Some((stem, ext)) = split_extension(rest) {
        // "Z" is case sensitive, the rest are not
        if let Some((_, enc)) = ENCODINGS.iter().find(|(suffix, _)| {
            ext == *suffix || (*suffix != "Z" && ext.eq_ignore_ascii_case(suffix))
        }) {
            encoding = Some(*enc);
            rest = stem;
        }
    }

    let mime = split_extension(rest)
        .and_then(|(_, ext)| type_for_extension(&ext.to_ascii_lowercase()));
    (mime, encoding)
}

/// Whether a charset parameter belongs on this type
pub fn is_text(mime: &str) -> bool {
    mime.starts_with("text/")
}

/// Content-Type value with the charset appended for text types
pub fn content_type_with_charset(mime: &str, charset: &str) -> String {
    if is_text(mime) && !charset.is_empty() && !mime.contains("charset=") {
        format!("{mime}; charset={charset}")
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(guess_type("foo.html").0, Some("text/html"));
        assert_eq!(guess_type("foo.PDF").0, Some("application/pdf"));
        assert_eq!(guess_type("dir.v2/clip.mp4").0, Some("video/mp4"));
        assert_eq!(guess_type("style.css").0, Some("text/css"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(guess_type("foo.xyz"), (None, None));
        assert_eq!(guess_type(".bashrc"), (None, None));
        assert_eq!(guess_type("foo"), (None, None));
    }

    #[test]
    fn test_encodings() {
        assert_eq!(guess_type("foo.tar.gz"), (Some("application/x-tar"), Some("gzip")));
        assert_eq!(guess_type("foo.tgz"), (Some("application/x-tar"), Some("gzip")));
        assert_eq!(guess_type("notes.txt.bz2"), (Some("text/plain"), Some("bzip2")));
        assert_eq!(guess_type("foo.gz"), (None, Some("gzip")));
        assert_eq!(guess_type("old.tar.Z"), (Some("application/x-tar"), Some("compress")));
        assert_eq!(guess_type("image.svgz"), (Some("image/svg+xml"), Some("gzip")));
    }

    #[test]
    fn test_charset() {
        assert_eq!(
            content_type_with_charset("text/html", "UTF-8"),
            "text/html; charset=UTF-8"
        );
        assert_eq!(
            content_type_with_charset("text/html; charset=latin1", "UTF-8"),
            "text/html; charset=latin1"
        );
        assert_eq!(content_type_with_charset("application/pdf", "UTF-8"), "application/pdf");
    }
}
