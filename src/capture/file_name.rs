//! File-name derivation from request URLs.

use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Name used when a URL yields no usable path segment.
pub(crate) const DEFAULT_FILE_NAME: &str = "downloaded_file";

// ============================================================================
// Derivation
// ============================================================================

/// Derives a file name from a request URL.
///
/// Takes the final `/`-delimited path segment, ignoring any query or
/// fragment. Falls back to [`DEFAULT_FILE_NAME`] when the URL does not
/// parse or has no non-empty segment.
pub(crate) fn file_name_from_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return DEFAULT_FILE_NAME.to_string();
    };

    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| DEFAULT_FILE_NAME.to_string(), ToString::to_string)
}

// ============================================================================
// Tests
// ============================================================================
