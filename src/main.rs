// Copyright 2026 Linkprobe Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use linkprobe::{classify, Platform, Resolution, Resolver, ResolverConfig};

#[derive(Parser)]
#[command(
    name = "linkprobe",
    about = "Linkprobe — normalize social video links into fetchable video-page URLs",
    version,
    after_help = "Run 'linkprobe trace <url>' to see every candidate a Facebook share link resolves to."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a link and print the final URL
    Resolve {
        /// The link to resolve
        url: String,
    },
    /// Resolve a link and print the full diagnostic trace
    Trace {
        /// The link to trace
        url: String,
        /// Emit the trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the platform a link belongs to
    Classify {
        /// The link to classify
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "linkprobe=debug" } else { "linkprobe=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(ResolverConfig::default());

    match cli.command {
        Commands::Resolve { url } => {
            let platform = classify(&config, &url);
            let resolver = Resolver::new(config);
            let resolution = resolver.normalize(&url, platform).await;
            println!("{}", resolution.resolved_url);
        }
        Commands::Trace { url, json } => {
            let platform = classify(&config, &url);
            let resolver = Resolver::new(config);
            let resolution = resolver.normalize(&url, platform).await;
            if json {
                print_trace_json(platform, &url, &resolution)?;
            } else {
                print_trace(platform, &url, &resolution);
            }
        }
        Commands::Classify { url } => {
            println!("{}", classify(&config, &url));
        }
    }

    Ok(())
}

fn print_trace(platform: Platform, original: &str, resolution: &Resolution) {
    println!("platform:   {platform}");
    println!("original:   {original}");
    println!("normalized: {}", resolution.resolved_url);
    if !resolution.candidates.is_empty() {
        println!("candidates:");
        for candidate in resolution.candidates.iter().take(10) {
            println!("  - {}  [{}]", candidate.url, candidate.rationale);
        }
    }
}

/// The machine-readable trace. Reuses `Resolution`'s field names so the
/// document deserializes straight back into a `Resolution`.
fn trace_document(platform: Platform, original: &str, resolution: &Resolution) -> serde_json::Value {
    serde_json::json!({
        "platform": platform,
        "original": original,
        "resolved_url": resolution.resolved_url,
        "candidates": resolution.candidates,
    })
}

fn print_trace_json(platform: Platform, original: &str, resolution: &Resolution) -> Result<()> {
    let doc = trace_document(platform, original, resolution);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkprobe::Candidate;

    #[test]
    fn trace_document_deserializes_back_into_resolution() {
        let resolution = Resolution {
            resolved_url: "https://m.facebook.com/reel/9876".to_string(),
            candidates: vec![Candidate::new("https://m.facebook.com/reel/9876", "m anchor reel")],
        };
        let doc = trace_document(
            Platform::Facebook,
            "https://www.facebook.com/share/r/abc123/?mibextid=xyz",
            &resolution,
        );
        let back: Resolution = serde_json::from_value(doc).unwrap();
        assert_eq!(back, resolution);
    }
}
