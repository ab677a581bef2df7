//! HTTP Range header handling for file streaming.
//!
//! Implements the `bytes=<start>-<end>` form of RFC 7233 range requests,
//! which is the only form media players emit in practice.

use axum::http::{HeaderMap, header};

/// A resolved byte window within a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
    pub length: u64,
}

/// The requested range starts beyond the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeUnsatisfiable;

/// Extracts and parses a `Range` header into `(start, end)`.
///
/// `end` is `None` for open-ended requests (`bytes=500-`). Returns `None`
/// when the header is absent or not in the `bytes=start-end` form, in
/// which case the caller serves the whole file.
pub fn parse_range_header(headers: &HeaderMap) -> Option<(u64, Option<u64>)> {
    let value = headers.get(header::RANGE)?.to_str().ok()?;
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;

    let start = start.parse::<u64>().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse::<u64>().ok()?)
    };

    Some((start, end))
}

/// Resolves a parsed range against the file size.
///
/// An omitted end defaults to the last byte; an end past the last byte is
/// clamped to it. `Ok(None)` means no range was requested and the full
/// file should be served with status 200.
///
/// # Errors
/// - `RangeUnsatisfiable` - Start position is at or past end of file
pub fn resolve_range(
    range: Option<(u64, Option<u64>)>,
    size: u64,
) -> Result<Option<RangeSpec>, RangeUnsatisfiable> {
    let Some((start, end)) = range else {
        return Ok(None);
    };

    if start >= size {
        return Err(RangeUnsatisfiable);
    }

    let end = end.unwrap_or(size - 1).min(size - 1);
    if end < start {
        return Err(RangeUnsatisfiable);
    }

    Ok(Some(RangeSpec {
        start,
        end,
        length: end - start + 1,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    use super::*;

    fn headers_with_range(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_bounded_range() {
        let headers = headers_with_range("bytes=100-199");
        assert_eq!(parse_range_header(&headers), Some((100, Some(199))));
    }

    #[test]
    fn test_parse_open_ended_range() {
        let headers = headers_with_range("bytes=500-");
        assert_eq!(parse_range_header(&headers), Some((500, None)));
    }

    #[test]
    fn test_parse_rejects_other_units_and_garbage() {
        assert_eq!(parse_range_header(&headers_with_range("items=0-10")), None);
        assert_eq!(parse_range_header(&headers_with_range("bytes=abc-")), None);
        assert_eq!(parse_range_header(&HeaderMap::new()), None);
    }

    #[test]
    fn test_resolve_bounded_range() {
        let spec = resolve_range(Some((0, Some(99))), 1000).unwrap().unwrap();
        assert_eq!(
            spec,
            RangeSpec {
                start: 0,
                end: 99,
                length: 100
            }
        );
    }

    #[test]
    fn test_resolve_open_end_defaults_to_last_byte() {
        let spec = resolve_range(Some((500, None)), 1000).unwrap().unwrap();
        assert_eq!(spec.end, 999);
        assert_eq!(spec.length, 500);
    }

    #[test]
    fn test_resolve_clamps_end_past_eof() {
        let spec = resolve_range(Some((0, Some(5000))), 1000).unwrap().unwrap();
        assert_eq!(spec.end, 999);
        assert_eq!(spec.length, 1000);
    }

    #[test]
    fn test_resolve_no_range_serves_full_file() {
        assert_eq!(resolve_range(None, 1000), Ok(None));
    }

    #[test]
    fn test_resolve_start_past_eof_unsatisfiable() {
        assert_eq!(resolve_range(Some((1000, None)), 1000), Err(RangeUnsatisfiable));
        assert_eq!(resolve_range(Some((2000, Some(2100))), 1000), Err(RangeUnsatisfiable));
    }

    proptest! {
        #[test]
        fn prop_resolved_ranges_stay_within_file(start in 0u64..10_000, end in 0u64..20_000, size in 1u64..10_000) {
            match resolve_range(Some((start, Some(end))), size) {
                Ok(Some(spec)) => {
                    prop_assert!(spec.start < size);
                    prop_assert!(spec.end < size);
                    prop_assert!(spec.start <= spec.end);
                    prop_assert_eq!(spec.length, spec.end - spec.start + 1);
                }
                Ok(None) => prop_assert!(false, "range was provided"),
                Err(RangeUnsatisfiable) => {
                    prop_assert!(start >= size || end < start);
                }
            }
        }
    }
}
