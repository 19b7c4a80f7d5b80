//! Target URL validation.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Validates a target URL and returns the form that gets stored.
///
/// The input is trimmed of surrounding whitespace and must parse as an
/// absolute URL with scheme `http` or `https`. The trimmed input is
/// returned verbatim rather than the parser's re-serialization, so the
/// redirect goes to exactly what the user submitted.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] if the URL does not parse, is relative,
/// or uses any other scheme.
pub fn validate_target_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();

    let parsed = Url::parse(trimmed).map_err(|e| {
        AppError::invalid_url("Invalid URL", json!({ "reason": e.to_string() }))
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::invalid_url(
                "Invalid URL",
                json!({ "reason": format!("unsupported scheme '{other}'") }),
            ));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_url(
            "Invalid URL",
            json!({ "reason": "missing host" }),
        ));
    }

    Ok(trimmed.to_string())
}

/// Returns a header-safe rendition of a stored target URL.
///
/// Stored targets are the user's original text, which may contain
/// characters that are not valid in a `Location` header. Those are
/// replaced by the URL's percent-encoded serialization.
pub fn header_safe_target(target: &str) -> String {
    if target.bytes().all(|b| b.is_ascii_graphic()) {
        return target.to_string();
    }

    Url::parse(target)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_target_url("https://example.com/a/b").unwrap(),
            "https://example.com/a/b"
        );
        assert_eq!(
            validate_target_url("http://example.com").unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn test_keeps_query_and_fragment() {
        let url = "https://example.com/search?q=rust&page=2#results";
        assert_eq!(validate_target_url(url).unwrap(), url);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_target_url("  https://x.com  ").unwrap(),
            "https://x.com"
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        for url in [
            "ftp://example.com",
            "mailto:user@example.com",
            "javascript:alert(1)",
            "file:///etc/passwd",
            "data:text/plain,hello",
        ] {
            let err = validate_target_url(url).unwrap_err();
            assert!(matches!(err, AppError::InvalidUrl { .. }), "{url}");
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for url in ["", "not-a-url", "example.com", "/relative/path", "http://"] {
            assert!(validate_target_url(url).is_err(), "{url}");
        }
    }

    #[test]
    fn test_header_safe_target_passthrough() {
        assert_eq!(
            header_safe_target("https://example.com/a?b=c"),
            "https://example.com/a?b=c"
        );
    }

    #[test]
    fn test_header_safe_target_encodes_unicode() {
        let safe = header_safe_target("https://example.com/café");
        assert_eq!(safe, "https://example.com/caf%C3%A9");
    }
}
