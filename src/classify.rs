//! Platform classification by domain substring.

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;

/// Platform a URL belongs to, derived once per input and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Douyin,
    TikTok,
    Facebook,
    Instagram,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Douyin => "douyin",
            Platform::TikTok => "tiktok",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw URL by case-insensitive substring match against the
/// configured domain table. Total and deterministic: anything that matches
/// no table entry is `Unknown`, and no input can fail.
pub fn classify(config: &ResolverConfig, url: &str) -> Platform {
    let lower = url.to_ascii_lowercase();
    for (platform, domains) in &config.platform_domains {
        if domains.iter().any(|d| lower.contains(d.as_str())) {
            return *platform;
        }
    }
    Platform::Unknown
}
