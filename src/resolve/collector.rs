//! Facebook candidate collection.
//!
//! For a share link that plain redirect-following failed to resolve, fetch
//! the page from the mobile, desktop, and mbasic front-ends plus the public
//! oEmbed endpoint, and run the heuristic batteries over whatever came back.
//! The four sub-fetches are independent: they fan out concurrently under a
//! shared wallclock budget and any failure contributes zero candidates.

use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientProfile, ResolverConfig};
use crate::resolve::fetch::PageFetcher;
use crate::resolve::heuristics::{self, RawHit, BASIC_BATTERY, FULL_BATTERY};
use crate::resolve::unwrap::unwrap_redirector;
use crate::resolve::Candidate;

/// Collect candidate target URLs for an unresolved share link.
///
/// The returned list is raw discovery order across the fixed source order
/// (l.php unwrap, mobile, desktop, mbasic, oEmbed); dedup and ranking are a
/// separate pass.
pub async fn collect(
    config: &ResolverConfig,
    fetcher: &dyn PageFetcher,
    url: &str,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    // The redirector can wrap the share link itself; unwrap before fetching.
    let mut page_url = url.to_string();
    let unwrapped = unwrap_redirector(&page_url);
    if unwrapped != page_url {
        candidates.push(Candidate::new(unwrapped.clone(), "l.php unwrap"));
        page_url = unwrapped;
    }

    let budget = config.collect_budget;
    let mobile = bounded(budget, fetch_front_end(
        config,
        fetcher,
        &page_url,
        &config.profiles.mobile,
        "m",
    ));
    let desktop = bounded(budget, fetch_front_end(
        config,
        fetcher,
        &page_url,
        &config.profiles.desktop,
        "www",
    ));
    let basic = bounded(budget, fetch_basic(config, fetcher, &page_url));
    let oembed = bounded(budget, fetch_oembed(config, fetcher, &page_url));

    let (mobile, desktop, basic, oembed) = futures::join!(mobile, desktop, basic, oembed);

    candidates.extend(mobile);
    candidates.extend(desktop);
    candidates.extend(basic);
    candidates.extend(oembed);
    candidates
}

/// Cap a sub-fetch at the shared budget; a timeout contributes nothing.
async fn bounded(
    budget: std::time::Duration,
    fut: impl std::future::Future<Output = Vec<Candidate>>,
) -> Vec<Candidate> {
    match tokio::time::timeout(budget, fut).await {
        Ok(candidates) => candidates,
        Err(_) => {
            warn!("collector sub-fetch exceeded the {budget:?} budget");
            Vec::new()
        }
    }
}

/// Fetch one front-end and run the full heuristic battery over the payload.
async fn fetch_front_end(
    config: &ResolverConfig,
    fetcher: &dyn PageFetcher,
    url: &str,
    profile: &ClientProfile,
    front_end: &'static str,
) -> Vec<Candidate> {
    let page = match fetcher.get_text(url, profile, config.fetch_timeout).await {
        Ok(page) if (200..300).contains(&page.status) => page,
        Ok(page) => {
            warn!("{front_end} fetch of {url} returned {}", page.status);
            return Vec::new();
        }
        Err(e) => {
            warn!("{front_end} fetch of {url} failed: {e}");
            return Vec::new();
        }
    };
    let hits = heuristics::run_battery(FULL_BATTERY, &page.body);
    debug!("{front_end} battery produced {} hits", hits.len());
    finalize_hits(url, front_end, hits)
}

/// Fetch the same logical resource from the markup-reduced front-end, which
/// most often exposes a `video_redirect` link straight to the media file.
async fn fetch_basic(
    config: &ResolverConfig,
    fetcher: &dyn PageFetcher,
    url: &str,
) -> Vec<Candidate> {
    let basic_url = match swap_host(url, &config.basic_host) {
        Some(u) => u,
        None => return Vec::new(),
    };
    let page = match fetcher
        .get_text(&basic_url, &config.profiles.basic, config.fetch_timeout)
        .await
    {
        Ok(page) if (200..300).contains(&page.status) => page,
        Ok(page) => {
            warn!("mbasic fetch of {basic_url} returned {}", page.status);
            return Vec::new();
        }
        Err(e) => {
            warn!("mbasic fetch of {basic_url} failed: {e}");
            return Vec::new();
        }
    };
    let hits = heuristics::run_battery(BASIC_BATTERY, &page.body);
    finalize_hits(&basic_url, "mbasic", hits)
}

/// Query the public oEmbed endpoint and pull the embedded player iframe src.
async fn fetch_oembed(
    config: &ResolverConfig,
    fetcher: &dyn PageFetcher,
    url: &str,
) -> Vec<Candidate> {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

    let encoded = utf8_percent_encode(url, NON_ALPHANUMERIC);
    let oembed_url = format!("{}?url={}", config.oembed_endpoint, encoded);
    let json = match fetcher
        .get_json(&oembed_url, &config.profiles.desktop, config.oembed_timeout)
        .await
    {
        Ok(json) => json,
        Err(e) => {
            warn!("oEmbed fetch failed: {e}");
            return Vec::new();
        }
    };

    static RE_PLUGIN_SRC: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r#"src=['"]([^'"]+plugins/video\.php\?href=[^'"]+)['"]"#)
            .expect("plugin src regex is valid")
    });

    let Some(embed_html) = json.get("html").and_then(|h| h.as_str()) else {
        return Vec::new();
    };
    let Some(src) = RE_PLUGIN_SRC.captures(embed_html).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    let decoded = percent_encoding::percent_decode_str(src.as_str())
        .decode_utf8()
        .map(|s| s.to_string())
        .unwrap_or_else(|_| src.as_str().to_string());

    match heuristics::absolutize(url, &decoded) {
        Some(abs) => vec![Candidate::new(abs, "oembed plugins/video.php")],
        None => Vec::new(),
    }
}

/// Turn raw battery hits into provenance-tagged candidates: unescape,
/// resolve absolute against the fetched page, and re-unwrap any extracted
/// redirector-shaped href.
fn finalize_hits(page_url: &str, front_end: &'static str, hits: Vec<RawHit>) -> Vec<Candidate> {
    hits.into_iter()
        .filter_map(|hit| {
            let absolute = heuristics::absolutize(page_url, &hit.value)?;
            let target = unwrap_redirector(&absolute);
            Some(Candidate::new(
                target,
                format!("{front_end} {}", hit.heuristic),
            ))
        })
        .collect()
}

fn swap_host(url: &str, host: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_host(Some(host)).ok()?;
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_host_replaces_only_the_host() {
        assert_eq!(
            swap_host("https://www.facebook.com/share/v/abc/?x=1", "mbasic.facebook.com").as_deref(),
            Some("https://mbasic.facebook.com/share/v/abc/?x=1")
        );
        assert_eq!(swap_host("not a url", "mbasic.facebook.com"), None);
    }

    #[test]
    fn finalize_resolves_and_unwraps() {
        let hits = vec![
            RawHit {
                value: "/reel/9876".to_string(),
                heuristic: "anchor reel",
            },
            RawHit {
                value: "/l.php?u=https%3A%2F%2Fexample.com%2Fv%2F1".to_string(),
                heuristic: "anchor l.php",
            },
        ];
        let cands = finalize_hits("https://m.facebook.com/share/r/abc/", "m", hits);
        assert_eq!(cands[0].url, "https://m.facebook.com/reel/9876");
        assert_eq!(cands[0].rationale, "m anchor reel");
        assert_eq!(cands[1].url, "https://example.com/v/1");
        assert_eq!(cands[1].rationale, "m anchor l.php");
    }
}
