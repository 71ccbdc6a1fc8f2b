//! URL and address format checks

use once_cell::sync::Lazy;
use regex::Regex;

/// Scheme prefix an image link must carry
static HTTP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://.+").expect("valid http url regex")
});

/// Absolute URL as accepted by `<input type="url">`
static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("valid absolute url regex")
});

/// Address as accepted by `<input type="email">`
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*$")
        .expect("valid email regex")
});

/// True when `url` starts with `http://` or `https://` (any case) and has
/// something after the scheme
pub fn is_http_url(url: &str) -> bool {
    HTTP_URL.is_match(url)
}

/// Browser `type=url` rule: any scheme followed by non-whitespace
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL.is_match(url)
}

/// Browser `type=email` rule
pub fn is_email_address(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_url() {
        assert!(is_http_url("https://example.com"));
        assert!(is_http_url("http://test.co.uk/a.png"));
        assert!(is_http_url("HTTPS://EXAMPLE.COM/X.JPG"));

        assert!(!is_http_url(""));
        assert!(!is_http_url("example.com"));
        assert!(!is_http_url("ftp://example.com/x.png"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url(" https://example.com"));
    }

    #[test]
    fn test_absolute_url() {
        assert!(is_absolute_url("ftp://example.com/x.png"));
        assert!(is_absolute_url("mailto:me@example.com"));
        assert!(!is_absolute_url("example.com"));
        assert!(!is_absolute_url("http://exa mple.com"));
    }

    #[test]
    fn test_email_address() {
        assert!(is_email_address("user@example.com"));
        assert!(is_email_address("a@localhost"));
        assert!(!is_email_address("invalid-email"));
        assert!(!is_email_address("@example.com"));
    }
}
