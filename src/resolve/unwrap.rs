//! Offline unwrapping of Facebook's `l.php` redirector.
//!
//! `l.php?u=<percent-encoded target>` is a single-hop indirection that can
//! be unwrapped with pure URL parsing, no network round trip.

use url::Url;

/// If `url` is an `l.php` redirector carrying a `u` parameter, return the
/// percent-decoded inner target. Any other shape is returned unchanged, so
/// the function is a fixed point on non-redirector input.
pub fn unwrap_redirector(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.path().ends_with("/l.php") {
        return url.to_string();
    }
    // query_pairs percent-decodes the value for us.
    parsed
        .query_pairs()
        .find(|(k, _)| k == "u")
        .map(|(_, v)| v.into_owned())
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_encoded_target() {
        assert_eq!(
            unwrap_redirector("https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com%2Fv%2F1"),
            "https://example.com/v/1"
        );
    }

    #[test]
    fn ignores_other_parameters() {
        assert_eq!(
            unwrap_redirector("https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com&h=AT0x&__tn__=R"),
            "https://example.com"
        );
    }

    #[test]
    fn non_matching_shapes_are_fixed_points() {
        for url in [
            "https://www.facebook.com/reel/123",
            "https://l.facebook.com/l.php?h=AT0x",
            "https://example.com/l.php.html?u=x",
            "plain text",
        ] {
            assert_eq!(unwrap_redirector(url), url);
        }
    }
}
