//! Link resolver and its builder

use crate::client::ResolveOptions;
use crate::error::ResolveError;
use crate::http::{HttpClient, ReqwestClient};
use crate::instance::{classify_instance, InstanceKind};
use crate::sources::{booru, mastodon, sharkey, PostRef};
use crate::transcode::{Transcoder, VideoPolicy};
use crate::types::NormalizedRecord;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Builder for configuring a [`Resolver`]
#[derive(Default)]
pub struct ResolverBuilder {
    options: ResolveOptions,
    http_client: Option<Arc<dyn HttpClient>>,
    transcoder: Option<Arc<dyn Transcoder>>,
}

impl ResolverBuilder {
    /// Create a builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options
    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Timeout for post lookups
    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.options.api_timeout = timeout;
        self
    }

    /// Timeout for instance probes
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.options.probe_timeout = timeout;
        self
    }

    /// When false, API calls reuse the link's scheme
    pub fn https_only(mut self, https_only: bool) -> Self {
        self.options.https_only = https_only;
        self
    }

    /// Add a host suffix identifying booru boards
    pub fn booru_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.options.booru_suffixes.push(suffix.into());
        self
    }

    /// Convert webm videos with the configured transcoder
    pub fn convert_webm(mut self, enable: bool) -> Self {
        self.options.convert_webm = enable;
        self
    }

    /// Use a custom HTTP transport
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the transcoder used when webm conversion is on
    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// Build the resolver
    pub fn build(self) -> Result<Resolver, ResolveError> {
        let http = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::new(self.options.user_agent.as_deref())?),
        };

        let video = match (self.options.convert_webm, self.transcoder) {
            (true, Some(transcoder)) => VideoPolicy::convert_with(transcoder),
            (true, None) => {
                warn!("Webm conversion requested without a transcoder, using original videos");
                VideoPolicy::passthrough()
            }
            (false, _) => VideoPolicy::passthrough(),
        };

        Ok(Resolver {
            http,
            options: self.options,
            video,
        })
    }
}

/// Resolves post links into [`NormalizedRecord`]s
///
/// Cheap to share behind an `Arc`; all configuration is fixed at build time.
pub struct Resolver {
    http: Arc<dyn HttpClient>,
    options: ResolveOptions,
    video: VideoPolicy,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("options", &self.options)
            .field("video", &self.video)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a new resolver builder
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolver with default options and the reqwest transport
    pub fn new() -> Result<Self, ResolveError> {
        Self::builder().build()
    }

    pub fn with_options(options: ResolveOptions) -> Result<Self, ResolveError> {
        Self::builder().options(options).build()
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// True when `url` has the shape of a supported post link
    pub fn recognizes(&self, url: &str) -> bool {
        PostRef::parse(url, &self.options).is_some()
    }

    /// Resolve `url`, or `None` when it is unsupported or the lookup fails
    pub async fn resolve(&self, url: &str) -> Option<NormalizedRecord> {
        match self.try_resolve(url).await {
            Ok(record) => Some(record),
            Err(e) if e.is_unrecognized() => None,
            Err(e) => {
                debug!(url, error = %e, "Couldn't resolve post");
                None
            }
        }
    }

    /// Resolve `url`, reporting why it failed
    pub async fn try_resolve(&self, url: &str) -> Result<NormalizedRecord, ResolveError> {
        let post = PostRef::parse(url, &self.options).ok_or(ResolveError::Unrecognized)?;
        debug!(site = %post.site(), url, "Resolving post");

        let http = self.http.as_ref();
        let timeout = self.options.api_timeout;

        match post {
            PostRef::Booru { base, id } => {
                let image = booru::fetch(http, &base, id, timeout)
                    .await
                    .inspect_err(|e| warn!(%base, id, error = %e, "Booru lookup failed"))?;
                Ok(booru::into_record(image, &base, &self.video).await)
            }
            PostRef::Mastodon { base, status_id } => {
                let status = mastodon::fetch(http, &base, &status_id, timeout).await?;
                Ok(mastodon::into_record(status, url))
            }
            PostRef::Sharkey { base, note_id } => {
                let note = sharkey::fetch(http, &base, &note_id, timeout).await?;
                Ok(sharkey::into_record(note, url))
            }
        }
    }

    /// Classify the server behind `domain`
    ///
    /// `domain` may be a bare host (`mastodon.social`) or carry a scheme and
    /// trailing path, which is ignored.
    pub async fn classify(&self, domain: &str) -> InstanceKind {
        let Some(base) = instance_base(domain, self.options.https_only) else {
            return InstanceKind::Unknown;
        };
        let kind = classify_instance(self.http.as_ref(), &base, self.options.probe_timeout).await;
        debug!(%base, %kind, "Classified instance");
        kind
    }
}

/// `scheme://host[:port]` for a user-supplied domain
fn instance_base(domain: &str, https_only: bool) -> Option<String> {
    let domain = domain.trim();
    let (scheme, rest) = if let Some(rest) = domain.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = domain.strip_prefix("http://") {
        (if https_only { "https" } else { "http" }, rest)
    } else {
        ("https", domain)
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return None;
    }
    Some(format!("{}://{}", scheme, host))
}
