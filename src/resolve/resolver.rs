//! Normalization orchestrator — the pipeline's public entry point.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::classify::Platform;
use crate::config::ResolverConfig;
use crate::resolve::collector;
use crate::resolve::fetch::{HttpFetcher, PageFetcher};
use crate::resolve::rank::dedup_and_rank;
use crate::resolve::tracking::strip_tracking_params;
use crate::resolve::unwrap::unwrap_redirector;
use crate::resolve::Resolution;

/// Turns a raw social-media link into a URL the extraction engine can fetch.
///
/// Holds only shared read-only state (config plus the fetcher seam); every
/// normalization call is self-contained, so one `Resolver` is safe to share
/// across concurrent callers.
pub struct Resolver {
    config: Arc<ResolverConfig>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Resolver {
    /// Resolver backed by the production HTTP fetcher.
    pub fn new(config: Arc<ResolverConfig>) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    /// Resolver with an injected fetch layer (tests, instrumentation).
    pub fn with_fetcher(config: Arc<ResolverConfig>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Normalize `raw_url` for the given platform.
    ///
    /// Never fails: every step only overwrites the working URL when it has
    /// something better, and total failure falls back to the
    /// tracking-stripped input with an empty candidate list.
    pub async fn normalize(&self, raw_url: &str, platform: Platform) -> Resolution {
        let mut working = ensure_scheme(raw_url.trim());
        working = strip_tracking_params(&working, &self.config.tracking_blocklist);
        working = unwrap_redirector(&working);

        for profile in self.redirect_profiles(platform) {
            match self
                .fetcher
                .final_url(&working, profile, self.config.fetch_timeout)
                .await
            {
                Ok(final_url) if !final_url.is_empty() => working = final_url,
                Ok(_) => {}
                Err(e) => warn!("redirect resolution of {working} failed: {e}"),
            }
        }

        let mut candidates = Vec::new();
        if platform == Platform::Facebook && self.is_unresolved_share(&working) {
            info!("unresolved share link, collecting candidates: {working}");
            let collected = collector::collect(&self.config, &*self.fetcher, &working).await;
            candidates = dedup_and_rank(collected, &self.config.score_policy);
            if let Some(top) = candidates.first() {
                info!("adopted top candidate [{}]: {}", top.rationale, top.url);
                working = self.rewrite_to_mobile_host(&top.url);
            }
        }

        Resolution {
            resolved_url: working,
            candidates,
        }
    }

    /// Facebook links are probed under both the mobile and desktop
    /// identities, since the front-ends redirect differently; everything
    /// else gets one pass under the default profile.
    fn redirect_profiles(&self, platform: Platform) -> Vec<&crate::config::ClientProfile> {
        match platform {
            Platform::Facebook => vec![&self.config.profiles.mobile, &self.config.profiles.desktop],
            _ => vec![&self.config.profiles.default],
        }
    }

    /// True while the URL is still a Facebook share indirection rather than
    /// a concrete video page.
    fn is_unresolved_share(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let host_matches = parsed
            .host_str()
            .is_some_and(|h| h.contains("facebook.com"));
        host_matches && parsed.path().contains(&self.config.share_path_marker)
    }

    /// Downstream extraction tooling is more reliable against the mobile
    /// surface, so a generic Facebook host gets rewritten to it — unless the
    /// URL already points at a direct-file `video_redirect` resource.
    fn rewrite_to_mobile_host(&self, url: &str) -> String {
        if url.contains("video_redirect") {
            return url.to_string();
        }
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };
        let needs_rewrite = parsed
            .host_str()
            .is_some_and(|h| h.contains("facebook.com") && !h.starts_with("m."));
        if needs_rewrite && parsed.set_host(Some(&self.config.mobile_host)).is_ok() {
            return parsed.to_string();
        }
        url.to_string()
    }
}

fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        // The fetcher is never exercised by these tests.
        Resolver::new(Arc::new(ResolverConfig::default()))
    }

    #[test]
    fn scheme_is_prepended_when_missing() {
        assert_eq!(ensure_scheme("facebook.com/reel/1"), "https://facebook.com/reel/1");
        assert_eq!(ensure_scheme("http://x.test/a"), "http://x.test/a");
        assert_eq!(ensure_scheme("https://x.test/a"), "https://x.test/a");
    }

    #[test]
    fn share_shape_detection() {
        let r = resolver();
        assert!(r.is_unresolved_share("https://www.facebook.com/share/r/abc123/"));
        assert!(r.is_unresolved_share("https://m.facebook.com/share/v/xyz/"));
        assert!(!r.is_unresolved_share("https://www.facebook.com/reel/123"));
        assert!(!r.is_unresolved_share("https://example.com/share/r/abc/"));
        assert!(!r.is_unresolved_share("not a url"));
    }

    #[test]
    fn generic_host_is_rewritten_to_mobile() {
        let r = resolver();
        assert_eq!(
            r.rewrite_to_mobile_host("https://www.facebook.com/reel/123"),
            "https://m.facebook.com/reel/123"
        );
        assert_eq!(
            r.rewrite_to_mobile_host("https://m.facebook.com/reel/123"),
            "https://m.facebook.com/reel/123"
        );
        // Direct-file resources keep their host.
        assert_eq!(
            r.rewrite_to_mobile_host(
                "https://mbasic.facebook.com/video_redirect/?src=https%3A%2F%2Fcdn%2Fv.mp4"
            ),
            "https://mbasic.facebook.com/video_redirect/?src=https%3A%2F%2Fcdn%2Fv.mp4"
        );
        // Non-Facebook hosts are untouched.
        assert_eq!(
            r.rewrite_to_mobile_host("https://cdn.example/v.mp4"),
            "https://cdn.example/v.mp4"
        );
    }
}
