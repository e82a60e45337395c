//! Extraction heuristics for Facebook front-end markup.
//!
//! Each battery is an ordered, data-driven list of (provenance-tag,
//! extractor-fn) pairs applied uniformly to a fetched payload. DOM-shaped
//! heuristics (meta properties, data attributes) go through `scraper`;
//! text-shaped ones (meta refresh, anchor hrefs, inline JSON fragments) are
//! regexes. Everything here is synchronous — `scraper`'s types are `!Send`,
//! so callers run a battery between awaits, never across one.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// One value pulled out of a payload, tagged with the heuristic that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub value: String,
    pub heuristic: &'static str,
}

pub type ExtractFn = fn(&str, &Html) -> Vec<String>;

/// Full battery applied to the mobile and desktop front-ends, in the fixed
/// order the candidates should be discovered in.
pub const FULL_BATTERY: &[(&str, ExtractFn)] = &[
    ("meta-refresh", meta_refresh),
    ("og:video:url", og_video_url),
    ("og:video:secure_url", og_video_secure_url),
    ("og:video", og_video),
    ("og:url", og_url),
    ("anchor reel", anchor_reel),
    ("anchor watch", anchor_watch),
    ("anchor video.php", anchor_video_php),
    ("anchor story.php", anchor_story_php),
    ("anchor l.php", anchor_l_php),
    ("data-lynx-uri", data_lynx_uri),
    ("data-store", data_store),
    ("inline video_id", inline_video_id),
    ("inline reel_id", inline_reel_id),
];

/// Reduced battery for the markup-stripped mbasic front-end, which exposes
/// `video_redirect` anchors pointing straight at the media file.
pub const BASIC_BATTERY: &[(&str, ExtractFn)] = &[
    ("video_redirect", anchor_video_redirect),
    ("anchor reel", anchor_reel),
    ("anchor watch", anchor_watch),
    ("anchor video.php", anchor_video_php),
];

/// Parse `html` once and run every battery heuristic over it, preserving
/// battery order. A heuristic that matches nothing contributes nothing.
pub fn run_battery(battery: &[(&'static str, ExtractFn)], html: &str) -> Vec<RawHit> {
    let doc = Html::parse_document(html);
    let mut hits = Vec::new();
    for &(tag, extract) in battery {
        for value in extract(html, &doc) {
            hits.push(RawHit {
                value,
                heuristic: tag,
            });
        }
    }
    hits
}

/// Resolve an extracted value to an absolute URL against the page that
/// produced it, after HTML-entity unescaping. `None` when the result is not
/// a joinable URL.
pub fn absolutize(page_url: &str, value: &str) -> Option<String> {
    let unescaped = html_escape::decode_html_entities(value);
    let base = Url::parse(page_url).ok()?;
    base.join(unescaped.as_ref()).ok().map(|u| u.to_string())
}

// ── Text-shaped heuristics ───────────────────────────────────────────────────

static RE_META_REFRESH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv=['"]refresh['"][^>]+content=['"]\s*\d+\s*;\s*url=([^'"]+)['"]"#,
    )
    .expect("meta refresh regex is valid")
});

static RE_ANCHOR_REEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/reel/[^'"]+)['"]"#).expect("reel regex is valid")
});

static RE_ANCHOR_WATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/watch/\?v=\d+)['"]"#).expect("watch regex is valid")
});

static RE_ANCHOR_VIDEO_PHP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/video\.php\?[^'"]*v=\d+)[^'"]*['"]"#)
        .expect("video.php regex is valid")
});

static RE_ANCHOR_STORY_PHP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/story\.php\?[^'"]*story_fbid=\d+[^'"]*)['"]"#)
        .expect("story.php regex is valid")
});

static RE_ANCHOR_L_PHP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/l\.php\?u=[^'"]+)['"]"#).expect("l.php regex is valid")
});

static RE_ANCHOR_VIDEO_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=['"](/video_redirect/\?src=[^'"]+)['"]"#)
        .expect("video_redirect regex is valid")
});

static RE_INLINE_VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{"video_id":"(\d+)"\}"#).expect("video_id regex is valid")
});

static RE_INLINE_REEL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""reel_id":"(\d+)""#).expect("reel_id regex is valid")
});

fn first_capture(re: &Regex, html: &str) -> Vec<String> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| vec![m.as_str().to_string()])
        .unwrap_or_default()
}

fn meta_refresh(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_META_REFRESH, html)
}

fn anchor_reel(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_ANCHOR_REEL, html)
}

fn anchor_watch(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_ANCHOR_WATCH, html)
}

fn anchor_video_php(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_ANCHOR_VIDEO_PHP, html)
}

fn anchor_story_php(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_ANCHOR_STORY_PHP, html)
}

fn anchor_l_php(html: &str, _doc: &Html) -> Vec<String> {
    first_capture(&RE_ANCHOR_L_PHP, html)
}

fn anchor_video_redirect(html: &str, _doc: &Html) -> Vec<String> {
    RE_ANCHOR_VIDEO_REDIRECT
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn inline_video_id(html: &str, _doc: &Html) -> Vec<String> {
    RE_INLINE_VIDEO_ID
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|id| vec![format!("https://m.facebook.com/watch/?v={}", id.as_str())])
        .unwrap_or_default()
}

fn inline_reel_id(html: &str, _doc: &Html) -> Vec<String> {
    RE_INLINE_REEL_ID
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|id| vec![format!("https://m.facebook.com/reel/{}", id.as_str())])
        .unwrap_or_default()
}

// ── DOM-shaped heuristics ────────────────────────────────────────────────────

fn og_property(doc: &Html, property: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse("meta[property]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter(|el| {
            el.value()
                .attr("property")
                .is_some_and(|p| p.eq_ignore_ascii_case(property))
        })
        .filter_map(|el| el.value().attr("content"))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .take(1)
        .collect()
}

fn og_video_url(_html: &str, doc: &Html) -> Vec<String> {
    og_property(doc, "og:video:url")
}

fn og_video_secure_url(_html: &str, doc: &Html) -> Vec<String> {
    og_property(doc, "og:video:secure_url")
}

fn og_video(_html: &str, doc: &Html) -> Vec<String> {
    og_property(doc, "og:video")
}

fn og_url(_html: &str, doc: &Html) -> Vec<String> {
    og_property(doc, "og:url")
}

/// `data-lynx-uri` attributes carry a percent-encoded outbound target in
/// mobile markup.
fn data_lynx_uri(_html: &str, doc: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("[data-lynx-uri]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|el| el.value().attr("data-lynx-uri"))
        .filter_map(|v| percent_decode_str(v).decode_utf8().ok())
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// `data-store` attributes hold an entity-escaped JSON object whose
/// `href`/`src`/`finalUrl` field points at the playable resource. Malformed
/// JSON is skipped.
fn data_store(_html: &str, doc: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("[data-store]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|el| el.value().attr("data-store"))
        .filter_map(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .filter_map(|json| {
            ["href", "src", "finalUrl"]
                .into_iter()
                .find_map(|key| json.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(html: &str) -> Vec<RawHit> {
        run_battery(FULL_BATTERY, html)
    }

    #[test]
    fn meta_refresh_target_is_extracted() {
        let html = r#"<meta http-equiv="refresh" content="0; url=https://m.facebook.com/reel/1">"#;
        let hits = full(html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].heuristic, "meta-refresh");
        assert_eq!(hits[0].value, "https://m.facebook.com/reel/1");
    }

    #[test]
    fn og_video_url_is_extracted() {
        let html = r#"<html><head>
            <meta property="og:video:url" content="https://cdn.example/v.mp4">
        </head></html>"#;
        let hits = full(html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].heuristic, "og:video:url");
        assert_eq!(hits[0].value, "https://cdn.example/v.mp4");
    }

    #[test]
    fn og_properties_come_out_in_fixed_order() {
        let html = r#"
            <meta property="og:url" content="https://www.facebook.com/watch/?v=5">
            <meta property="og:video" content="https://cdn.example/v.mp4">
        "#;
        let tags: Vec<&str> = full(html).iter().map(|h| h.heuristic).collect();
        assert_eq!(tags, vec!["og:video", "og:url"]);
    }

    #[test]
    fn anchor_patterns_take_first_match_each() {
        let html = r#"
            <a href="/reel/111">first</a>
            <a href="/reel/222">second</a>
            <a href="/watch/?v=333">watch</a>
            <a href="/story.php?story_fbid=444&id=9">story</a>
        "#;
        let hits = full(html);
        let values: Vec<&str> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(values, vec!["/reel/111", "/watch/?v=333", "/story.php?story_fbid=444&id=9"]);
    }

    #[test]
    fn data_lynx_uri_is_percent_decoded() {
        let html = r#"<div data-lynx-uri="https%3A%2F%2Fexample.com%2Fv%2F1"></div>"#;
        let hits = full(html);
        assert_eq!(hits[0].heuristic, "data-lynx-uri");
        assert_eq!(hits[0].value, "https://example.com/v/1");
    }

    #[test]
    fn data_store_json_yields_href() {
        let html = r#"<div data-store="{&quot;href&quot;:&quot;/watch/?v=77&quot;}"></div>"#;
        let hits = full(html);
        assert!(hits
            .iter()
            .any(|h| h.heuristic == "data-store" && h.value == "/watch/?v=77"));
    }

    #[test]
    fn malformed_data_store_json_is_skipped() {
        let html = r#"<div data-store="{not json"></div>"#;
        assert!(full(html).is_empty());
    }

    #[test]
    fn inline_ids_synthesize_canonical_urls() {
        let html = r#"<script>{"video_id":"123"} "reel_id":"456"</script>"#;
        let hits = full(html);
        assert!(hits.contains(&RawHit {
            value: "https://m.facebook.com/watch/?v=123".to_string(),
            heuristic: "inline video_id",
        }));
        assert!(hits.contains(&RawHit {
            value: "https://m.facebook.com/reel/456".to_string(),
            heuristic: "inline reel_id",
        }));
    }

    #[test]
    fn basic_battery_collects_every_video_redirect() {
        let html = r#"
            <a href="/video_redirect/?src=https%3A%2F%2Fcdn.example%2Fa.mp4">a</a>
            <a href="/video_redirect/?src=https%3A%2F%2Fcdn.example%2Fb.mp4">b</a>
        "#;
        let hits = run_battery(BASIC_BATTERY, html);
        assert_eq!(
            hits.iter().filter(|h| h.heuristic == "video_redirect").count(),
            2
        );
    }

    #[test]
    fn empty_page_contributes_nothing() {
        assert!(full("").is_empty());
        assert!(full("<html><body>plain</body></html>").is_empty());
    }

    #[test]
    fn absolutize_joins_and_unescapes() {
        assert_eq!(
            absolutize("https://m.facebook.com/share/r/abc/", "/reel/9876").as_deref(),
            Some("https://m.facebook.com/reel/9876")
        );
        assert_eq!(
            absolutize(
                "https://m.facebook.com/x",
                "/watch/?v=1&amp;ref=share"
            )
            .as_deref(),
            Some("https://m.facebook.com/watch/?v=1&ref=share")
        );
        assert!(absolutize("not a url", "/reel/1").is_none());
    }
}
