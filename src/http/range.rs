//! HTTP Range request parsing module
//!
//! Byte-range header parsing per RFC 7233. Ranges are returned half-open
//! (`start..end`), clamped to the resource size, in header order.

use std::ops::Range;

/// Range unit accepted by this parser and advertised in `Accept-Ranges`
pub const RANGE_UNIT: &str = "bytes";

/// Parse a `Range` header into satisfiable byte ranges
///
/// Supported specifiers, comma separated:
/// - `bytes=start-end` - Specific range (inclusive end)
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// Specifiers that are malformed or fall outside `size` are skipped, so an
/// empty result means nothing in the header can be served.
///
/// # Examples
/// ```
/// use fdsend::http::range::parse_range_header;
///
/// assert_eq!(parse_range_header("bytes=0-99", 1000), vec![0..100]);
/// assert_eq!(parse_range_header("bytes=-100", 1000), vec![900..1000]);
/// assert!(parse_range_header("lines=1-2", 1000).is_empty());
/// ```
pub fn parse_range_header(header: &str, size: u64) -> Vec<Range<u64>> {
    let Some(specs) = header
        .strip_prefix(RANGE_UNIT)
        .and_then(|rest| rest.trim_start().strip_prefix('='))
    else {
        return Vec::new();
    };

    specs
        .split(',')
        .filter_map(|spec| spec.trim().split_once('-'))
        .filter_map(|(start, end)| parse_spec(start.trim(), end.trim(), size))
        .collect()
}

/// Parse one `start-end` specifier and check it against `size`
fn parse_spec(start_str: &str, end_str: &str, size: u64) -> Option<Range<u64>> {
    let range = if start_str.is_empty() {
        // Suffix range: "-500" means last 500 bytes
        let suffix = end_str.parse::<u64>().ok()?;
        size.saturating_sub(suffix)..size
    } else if end_str.is_empty() {
        start_str.parse::<u64>().ok()?..size
    } else {
        let start = start_str.parse::<u64>().ok()?;
        let end = end_str.parse::<u64>().ok()?;
        start..end.saturating_add(1).min(size)
    };

    (range.start < range.end && range.end <= size).then_some(range)
}

/// Render the `Content-Range` value for a half-open range
pub fn content_range(range: &Range<u64>, size: u64) -> String {
    format!(
        "{RANGE_UNIT} {}-{}/{size}",
        range.start,
        range.end.saturating_sub(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_range() {
        assert_eq!(parse_range_header("bytes=0-9", 100), vec![0..10]);
    }

    #[test]
    fn test_open_range() {
        assert_eq!(parse_range_header("bytes=50-", 100), vec![50..100]);
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(parse_range_header("bytes=-20", 100), vec![80..100]);
        // Suffix larger than the resource covers all of it
        assert_eq!(parse_range_header("bytes=-500", 100), vec![0..100]);
    }

    #[test]
    fn test_end_is_clamped() {
        assert_eq!(parse_range_header("bytes=90-1000", 100), vec![90..100]);
    }

    #[test]
    fn test_multiple_ranges_keep_order() {
        assert_eq!(
            parse_range_header("bytes=20-29, 0-9", 100),
            vec![20..30, 0..10]
        );
    }

    #[test]
    fn test_not_satisfiable() {
        assert!(parse_range_header("bytes=200-", 100).is_empty());
        assert!(parse_range_header("bytes=50-10", 100).is_empty());
        assert!(parse_range_header("bytes=-0", 100).is_empty());
        assert!(parse_range_header("bytes=0-0", 0).is_empty());
    }

    #[test]
    fn test_invalid_format() {
        assert!(parse_range_header("bytes=a-b", 100).is_empty());
        assert!(parse_range_header("bytes=10", 100).is_empty());
        assert!(parse_range_header("items=0-9", 100).is_empty());
        assert!(parse_range_header("", 100).is_empty());
        // Bad specifiers are dropped, good ones survive
        assert_eq!(parse_range_header("bytes=x-1,5-6", 100), vec![5..7]);
    }

    #[test]
    fn test_content_range() {
        assert_eq!(content_range(&(20..300), 400), "bytes 20-299/400");
        assert_eq!(content_range(&(0..1), 1), "bytes 0-0/1");
    }
}
