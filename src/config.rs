//! Process-wide resolver configuration.
//!
//! Everything the pipeline treats as a constant lives here: platform domain
//! tables, the tracking-parameter blocklist, client identity profiles, the
//! Facebook front-end hosts, timeouts, and the candidate score policy. The
//! config is built once at startup, wrapped in an `Arc`, and passed
//! explicitly into every stage — no module-level mutable state anywhere.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::Platform;

/// Client identity used for an outbound fetch.
///
/// Which markup variant Facebook serves depends on this triple, so the
/// collector fetches the same logical page under several of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

impl ClientProfile {
    fn new(user_agent: &str, referer: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            accept_language: "en-US,en;q=0.9,vi;q=0.8".to_string(),
            referer: referer.to_string(),
        }
    }
}

/// The named client profiles the pipeline fetches under.
#[derive(Debug, Clone)]
pub struct ClientProfiles {
    /// Mobile-web Facebook surface (`m.facebook.com` referer).
    pub mobile: ClientProfile,
    /// Desktop-web Facebook surface.
    pub desktop: ClientProfile,
    /// Markup-reduced `mbasic` surface.
    pub basic: ClientProfile,
    /// Everything that is not Facebook.
    pub default: ClientProfile,
}

const UA_MOBILE: &str = "Mozilla/5.0 (Linux; Android 10; SM-G973F) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0.0.0 Mobile Safari/537.36";
const UA_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/124.0.0.0 Safari/537.36";
const UA_BASIC: &str = "Mozilla/5.0 (Linux; Android 9; Nexus 5) \
                        AppleWebKit/537.36 (KHTML, like Gecko) \
                        Chrome/99.0.4844.94 Mobile Safari/537.36";

impl Default for ClientProfiles {
    fn default() -> Self {
        Self {
            mobile: ClientProfile::new(UA_MOBILE, "https://m.facebook.com/"),
            desktop: ClientProfile::new(UA_DESKTOP, "https://www.facebook.com/"),
            basic: ClientProfile::new(UA_BASIC, "https://mbasic.facebook.com/"),
            default: ClientProfile::new(UA_DESKTOP, "https://www.google.com"),
        }
    }
}

/// Ordered specificity rules for ranking candidates.
///
/// Lower score = more likely to be directly fetchable. The first rule whose
/// marker substring appears in the candidate URL wins; URLs matching nothing
/// get `fallback`. The default table is a judgment call about which Facebook
/// URL shape tends to be playable, so embedders can swap in their own.
#[derive(Debug, Clone)]
pub struct ScorePolicy {
    pub rules: Vec<(String, u8)>,
    pub fallback: u8,
}

impl ScorePolicy {
    /// Score a candidate URL against the rule table.
    pub fn score(&self, url: &str) -> u8 {
        self.rules
            .iter()
            .find(|(marker, _)| url.contains(marker.as_str()))
            .map(|(_, score)| *score)
            .unwrap_or(self.fallback)
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        let rules = [
            ("video_redirect/?src=", 0),
            ("/watch/?", 1),
            ("/reel/", 2),
            ("/video.php", 3),
            ("plugins/video.php", 4),
            ("/story.php", 5),
            ("/l.php", 6),
        ]
        .into_iter()
        .map(|(m, s)| (m.to_string(), s))
        .collect();
        Self { rules, fallback: 7 }
    }
}

/// Immutable configuration for the whole resolution pipeline.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Platform domain table for classification, checked in order.
    pub platform_domains: Vec<(Platform, Vec<String>)>,
    /// Query keys dropped by the tracking stripper.
    pub tracking_blocklist: Vec<String>,
    /// Client identity profiles.
    pub profiles: ClientProfiles,
    /// Mobile-web host the final URL is rewritten onto.
    pub mobile_host: String,
    /// Markup-reduced front-end host.
    pub basic_host: String,
    /// oEmbed metadata endpoint (the original URL is appended percent-encoded).
    pub oembed_endpoint: String,
    /// Path marker identifying an unresolved share link.
    pub share_path_marker: String,
    /// Per-fetch timeout for page fetches and redirect resolution.
    pub fetch_timeout: Duration,
    /// Shorter timeout for the oEmbed call.
    pub oembed_timeout: Duration,
    /// Shared wallclock budget for the collector fan-out.
    pub collect_budget: Duration,
    /// Candidate ranking policy.
    pub score_policy: ScorePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let platform_domains = vec![
            (
                Platform::Douyin,
                vec!["douyin.com", "iesdouyin.com", "v.douyin.com"],
            ),
            (Platform::TikTok, vec!["tiktok.com", "vm.tiktok.com"]),
            (
                Platform::Facebook,
                vec![
                    "facebook.com",
                    "fb.watch",
                    "l.facebook.com",
                    "m.facebook.com",
                    "mbasic.facebook.com",
                ],
            ),
            (Platform::Instagram, vec!["instagram.com"]),
        ]
        .into_iter()
        .map(|(p, ds)| (p, ds.into_iter().map(str::to_string).collect()))
        .collect();

        let tracking_blocklist = [
            "mibextid",
            "sfnsn",
            "s",
            "fbclid",
            "gclid",
            "utm_source",
            "utm_medium",
            "utm_campaign",
            "utm_term",
            "utm_content",
            "wtsid",
            "refsrc",
            "_rdr",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            platform_domains,
            tracking_blocklist,
            profiles: ClientProfiles::default(),
            mobile_host: "m.facebook.com".to_string(),
            basic_host: "mbasic.facebook.com".to_string(),
            oembed_endpoint: "https://www.facebook.com/plugins/video/oembed.json/".to_string(),
            share_path_marker: "/share/".to_string(),
            fetch_timeout: Duration::from_secs(15),
            oembed_timeout: Duration::from_secs(10),
            collect_budget: Duration::from_secs(25),
            score_policy: ScorePolicy::default(),
        }
    }
}
