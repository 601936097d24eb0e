//! Mastodon statuses
//!
//! Handles `https://<server>/@<handle>/<status id>` links. The status API is
//! probed at each of [`FEDERATED_API_VERSIONS`] in order and the first
//! version that answers 200 with a decodable status wins.

use crate::convert::html_to_text;
use crate::error::ResolveError;
use crate::http::HttpClient;
use crate::sources::{is_decimal, FEDERATED_API_VERSIONS};
use crate::types::{MediaItem, MediaKind, NormalizedRecord, Site};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Status as returned by the Mastodon API (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// HTML body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_attachments: Vec<Attachment>,
    #[serde(default)]
    pub account: Option<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub acct: String,
}

/// Status id from `/@<handle>/<digits>`
pub(crate) fn parse_status_id(segments: &[&str]) -> Option<String> {
    let handle = segments.first()?.strip_prefix('@')?;
    let status_id = segments.get(1)?;
    if handle.is_empty() || !is_decimal(status_id) {
        return None;
    }
    Some(status_id.to_string())
}

/// Fetch a status, trying each API version in order
pub(crate) async fn fetch(
    http: &dyn HttpClient,
    base: &str,
    status_id: &str,
    timeout: Duration,
) -> Result<Status, ResolveError> {
    for version in FEDERATED_API_VERSIONS {
        let api_url = format!("{}/api/{}/statuses/{}", base, version, status_id);
        match fetch_version(http, &api_url, timeout).await {
            Ok(status) => return Ok(status),
            Err(e) => {
                debug!(version, url = %api_url, error = %e, "Status lookup failed, trying next version");
            }
        }
    }

    Err(ResolveError::AllVersionsFailed {
        url: format!("{}/api/*/statuses/{}", base, status_id),
    })
}

async fn fetch_version(
    http: &dyn HttpClient,
    api_url: &str,
    timeout: Duration,
) -> Result<Status, ResolveError> {
    http.get(api_url, timeout).await?.require_ok()?.json()
}

/// Map a status to a record; `link` is kept verbatim as both id and url
pub(crate) fn into_record(status: Status, link: &str) -> NormalizedRecord {
    let media = status
        .media_attachments
        .iter()
        .filter_map(|attachment| {
            let kind = match attachment.media_type.as_str() {
                "image" => MediaKind::Photo,
                "video" | "gifv" => MediaKind::Video,
                _ => return None,
            };
            let url = attachment.url.as_deref()?;
            Some(MediaItem::new(url, kind))
        })
        .collect();

    NormalizedRecord::new(Site::Mastodon, link, link, html_to_text(&status.content))
        .with_author(status.account.map(|account| account.acct))
        .with_media(media)
        .with_spoiler(false)
}
