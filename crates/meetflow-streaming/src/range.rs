//! Pure `Range: bytes=...` header parsing (spec.md §4.11). No I/O: takes the
//! header value and the resource size, returns the resolved byte range or
//! `None` when the request should degrade to a full 200 response.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a `Range` header value against a known resource `size`.
///
/// Returns `None` for an absent header, a malformed header, a range with
/// `start > end`, or a zero-size resource — all of which degrade to a full
/// 200 response per spec.
#[must_use]
pub fn parse_range(header: Option<&str>, size: u64) -> Option<ByteRange> {
    if size == 0 {
        return None;
    }
    let spec = header?.strip_prefix("bytes=")?;
    let (start_str, end_str) = spec.split_once('-')?;

    let range = if start_str.is_empty() {
        // suffix range: bytes=-N
        let n: u64 = end_str.parse().ok()?;
        let start = size.saturating_sub(n);
        ByteRange { start, end: size - 1 }
    } else if end_str.is_empty() {
        // open range: bytes=N-
        let start: u64 = start_str.parse().ok()?;
        ByteRange { start, end: size - 1 }
    } else {
        let start: u64 = start_str.parse().ok()?;
        let end: u64 = end_str.parse().ok()?;
        ByteRange { start, end }
    };

    let start = range.start.min(size - 1);
    let end = range.end.min(size - 1);
    if start > end {
        return None;
    }
    Some(ByteRange { start, end })
}

#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "mp4" => "audio/mp4",
        "m4a" => "audio/mp4",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}
