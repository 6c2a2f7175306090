//! Destination URL validation and own-domain detection.
//!
//! Destinations are validated but never rewritten: the stored URL is
//! byte-for-byte what the caller submitted.

use url::Url;

/// Reasons a destination URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is a well-formed absolute HTTP(S) URL with a host.
///
/// # Security
///
/// Rejects `javascript:`, `data:`, `file:` and every other non-HTTP scheme.
///
/// # Errors
///
/// See [`UrlValidationError`].
pub fn validate_destination(input: &str) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(())
}

/// Returns true if `url` points at one of the service's own origins.
///
/// Matching is a case-insensitive prefix test on the origin, bounded so that
/// `https://sho.rt` does not match `https://sho.rt.example.com`.
pub fn is_self_referential(url: &str, own_origins: &[String]) -> bool {
    let url = url.to_ascii_lowercase();

    own_origins.iter().any(|origin| {
        let origin = origin.trim_end_matches('/').to_ascii_lowercase();
        if origin.is_empty() {
            return false;
        }

        url.strip_prefix(&origin)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#', ':']))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_and_https() {
        assert!(validate_destination("http://example.com").is_ok());
        assert!(validate_destination("https://example.com/path?q=1#frag").is_ok());
        assert!(validate_destination("https://192.168.1.1:8080/x").is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_destination(""), Err(UrlValidationError::Empty));
        assert_eq!(validate_destination("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_validate_no_protocol() {
        assert!(matches!(
            validate_destination("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_destination("not-a-valid-url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validate_dangerous_protocols() {
        for input in [
            "javascript:alert(1)",
            "data:text/html,<h1>x</h1>",
            "file:///etc/passwd",
            "ftp://example.com",
            "mailto:a@b.c",
        ] {
            assert_eq!(
                validate_destination(input),
                Err(UrlValidationError::UnsupportedProtocol),
                "{input}"
            );
        }
    }

    #[test]
    fn test_self_referential_prefix_match() {
        let own = vec!["https://sho.rt".to_string(), "https://sho.rt/".to_string()];
        assert!(is_self_referential("https://sho.rt/abc", &own));
        assert!(is_self_referential("HTTPS://SHO.RT/abc", &own));
        assert!(is_self_referential("https://sho.rt", &own));
        assert!(is_self_referential("https://sho.rt?x=1", &own));
    }

    #[test]
    fn test_self_referential_requires_origin_boundary() {
        let own = vec!["https://sho.rt".to_string()];
        assert!(!is_self_referential("https://sho.rt.example.com/abc", &own));
        assert!(!is_self_referential("https://example.com/https://sho.rt", &own));
        assert!(!is_self_referential("http://sho.rt/abc", &own));
    }

    #[test]
    fn test_self_referential_ignores_empty_origins() {
        assert!(!is_self_referential("https://a.com", &[String::new()]));
        assert!(!is_self_referential("https://a.com", &[]));
    }
}
