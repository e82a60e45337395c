//! Tracking-parameter stripping.
//!
//! Drops known clickthrough/analytics keys from a URL's query string while
//! leaving every other pair byte-for-byte intact, in its original position.
//! Values are never re-encoded; the raw query segments are filtered as text
//! so the pass is trivially idempotent.

use percent_encoding::percent_decode_str;
use url::Url;

/// Remove blocklisted query keys from `url`.
///
/// Unparsable input is returned unchanged — the stripper is total.
pub fn strip_tracking_params(url: &str, blocklist: &[String]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let Some(query) = parsed.query().map(str::to_string) else {
        return url.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|&segment| {
            let raw_key = segment.split('=').next().unwrap_or(segment);
            // Keys may themselves be percent-encoded; match on the decoded form.
            let key = percent_decode_str(raw_key)
                .decode_utf8()
                .map(|k| k.to_string())
                .unwrap_or_else(|_| raw_key.to_string());
            !blocklist.iter().any(|bad| bad == &key)
        })
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.set_query(Some(&kept.join("&")));
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;

    fn strip(url: &str) -> String {
        let config = ResolverConfig::default();
        strip_tracking_params(url, &config.tracking_blocklist)
    }

    #[test]
    fn drops_blocklisted_keys_and_keeps_the_rest() {
        assert_eq!(strip("https://x.test/y?fbclid=abc&keep=1"), "https://x.test/y?keep=1");
        assert_eq!(
            strip("https://x.test/y?a=1&utm_source=tg&b=2&mibextid=Nif5oz"),
            "https://x.test/y?a=1&b=2"
        );
    }

    #[test]
    fn preserves_order_and_multiplicity() {
        assert_eq!(
            strip("https://x.test/y?b=2&gclid=g&a=1&a=3"),
            "https://x.test/y?b=2&a=1&a=3"
        );
    }

    #[test]
    fn preserves_raw_values() {
        assert_eq!(
            strip("https://x.test/y?next=https%3A%2F%2Fexample.com&fbclid=z"),
            "https://x.test/y?next=https%3A%2F%2Fexample.com"
        );
    }

    #[test]
    fn removes_query_entirely_when_nothing_survives() {
        assert_eq!(strip("https://x.test/y?fbclid=abc&sfnsn=wa"), "https://x.test/y");
    }

    #[test]
    fn is_idempotent() {
        for url in [
            "https://x.test/y?fbclid=abc&keep=1",
            "https://x.test/y",
            "https://x.test/y?a=1&b=2",
            "not even a url",
        ] {
            let once = strip(url);
            assert_eq!(strip(&once), once);
        }
    }

    #[test]
    fn unparsable_input_passes_through() {
        assert_eq!(strip("nonsense"), "nonsense");
    }
}
