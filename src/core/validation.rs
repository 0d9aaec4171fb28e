//! URL extraction and validation for incoming messages
//!
//! Only links that point at YouTube are accepted: a URL-looking token must
//! contain `youtube.com` or `youtu.be` to be picked up.

use lazy_regex::regex;
use thiserror::Error;
use url::Url;

/// Domain substrings that mark a URL as a YouTube link.
pub const YOUTUBE_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Link could not be parsed or has no host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Returns the first YouTube URL found in `text`.
///
/// URLs are whitespace-delimited `http(s)://` tokens; the first one containing
/// a YouTube domain wins. Non-YouTube links before it are skipped.
///
/// # Examples
/// ```
/// use doraboost::core::validation::extract_youtube_url;
///
/// assert_eq!(
///     extract_youtube_url("check this out https://youtu.be/abc123"),
///     Some("https://youtu.be/abc123")
/// );
/// assert_eq!(extract_youtube_url("https://vimeo.com/42"), None);
/// ```
pub fn extract_youtube_url(text: &str) -> Option<&str> {
    regex!(r"https?://\S+")
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|url| YOUTUBE_DOMAINS.iter().any(|domain| url.contains(domain)))
}

/// Replaces the host of a YouTube URL with `mirror_host`.
///
/// Path and query are kept, so `https://www.youtube.com/watch?v=x` becomes
/// `https://<mirror>/watch?v=x` and `https://youtu.be/x` becomes `https://<mirror>/x`.
pub fn substitute_host(url: &str, mirror_host: &str) -> Result<String, ValidationError> {
    let mut parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl(url.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(ValidationError::InvalidUrl(format!("{} (no host)", url)));
    }
    parsed
        .set_host(Some(mirror_host.trim()))
        .map_err(|e| ValidationError::InvalidUrl(format!("{} ({})", mirror_host, e)))?;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_short_link_from_sentence() {
        assert_eq!(
            extract_youtube_url("check this out https://youtu.be/abc123"),
            Some("https://youtu.be/abc123")
        );
    }

    #[test]
    fn test_extracts_watch_link() {
        assert_eq!(
            extract_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ please"),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_skips_foreign_links_before_youtube() {
        let text = "see https://example.com/a and http://m.youtube.com/watch?v=1";
        assert_eq!(extract_youtube_url(text), Some("http://m.youtube.com/watch?v=1"));
    }

    #[test]
    fn test_no_url_yields_none() {
        assert_eq!(extract_youtube_url("hello there"), None);
        assert_eq!(extract_youtube_url("youtube.com/watch?v=1 without scheme"), None);
        assert_eq!(extract_youtube_url(""), None);
    }

    #[test]
    fn test_non_youtube_url_yields_none() {
        assert_eq!(extract_youtube_url("https://vimeo.com/12345"), None);
        assert_eq!(extract_youtube_url("ftp://youtube.com/x"), None);
    }

    #[test]
    fn test_substitute_host_keeps_path_and_query() {
        assert_eq!(
            substitute_host("https://www.youtube.com/watch?v=abc", "yewtu.be").unwrap(),
            "https://yewtu.be/watch?v=abc"
        );
        assert_eq!(
            substitute_host("https://youtu.be/abc123", "inv.example.org").unwrap(),
            "https://inv.example.org/abc123"
        );
    }

    #[test]
    fn test_substitute_host_rejects_garbage() {
        assert!(substitute_host("not a url", "yewtu.be").is_err());
    }
}
