//! Resolve configuration and convenience entry points
//!
//! [`resolve`] and [`resolve_with_options`] build a throwaway [`Resolver`];
//! callers resolving many links should build one with [`Resolver::builder`]
//! and reuse it.

use crate::resolver::Resolver;
use crate::sources::booru::DEFAULT_BOORU_SUFFIX;
use crate::types::NormalizedRecord;
use std::time::Duration;
use tracing::warn;

/// Timeout for status, note and booru API calls
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for instance metadata probes
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolve options that can be configured via the resolver builder
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    pub api_timeout: Duration,
    pub probe_timeout: Duration,
    /// Always call APIs over https, whatever the link's scheme
    pub https_only: bool,
    /// Host suffixes identifying booru boards
    pub booru_suffixes: Vec<String>,
    /// Hand webm videos to the configured transcoder
    pub convert_webm: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            api_timeout: DEFAULT_API_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            https_only: true,
            booru_suffixes: vec![DEFAULT_BOORU_SUFFIX.to_string()],
            convert_webm: false,
        }
    }
}

/// Resolve a post link with default options
///
/// Returns `None` when the link is unsupported or the lookup fails.
pub async fn resolve(url: &str) -> Option<NormalizedRecord> {
    resolve_with_options(url, ResolveOptions::default()).await
}

/// Resolve a post link with custom options
pub async fn resolve_with_options(url: &str, options: ResolveOptions) -> Option<NormalizedRecord> {
    let resolver = match Resolver::with_options(options) {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!(error = %e, "Couldn't build resolver");
            return None;
        }
    };
    resolver.resolve(url).await
}
