// Copyright 2026 Linkprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linkprobe — share-link normalizer for social video URLs.
//!
//! Takes an arbitrary Douyin/TikTok/Facebook/Instagram link and produces a
//! concrete, directly fetchable video-page URL for a downstream extraction
//! engine. Facebook share links are the hard case: they get unwrapped,
//! redirect-resolved under several client identities, and — when still
//! unresolved — probed across multiple front-ends for ranked candidate
//! target URLs.

pub mod classify;
pub mod config;
pub mod resolve;

pub use classify::{classify, Platform};
pub use config::ResolverConfig;
pub use resolve::{Candidate, Resolution, Resolver};
