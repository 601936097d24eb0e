//! Misskey and Sharkey notes
//!
//! Handles `https://<server>/notes/<note id>` links with a single
//! `POST /api/notes/show` lookup.

use crate::convert::html_to_text;
use crate::error::ResolveError;
use crate::http::HttpClient;
use crate::types::{MediaItem, MediaKind, NormalizedRecord, Site};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Note as returned by the Misskey API (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    /// Plain text body
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
    /// Content warning
    #[serde(default)]
    pub cw: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    /// MIME type
    #[serde(rename = "type", default)]
    pub mime: String,
    #[serde(default)]
    pub url: String,
}

/// Note id from `/notes/<alphanumeric>`
pub(crate) fn parse_note_id(segments: &[&str]) -> Option<String> {
    if segments.first() != Some(&"notes") {
        return None;
    }
    let note_id = segments.get(1)?;
    if note_id.is_empty() || !note_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(note_id.to_string())
}

/// Look up a note
pub(crate) async fn fetch(
    http: &dyn HttpClient,
    base: &str,
    note_id: &str,
    timeout: Duration,
) -> Result<Note, ResolveError> {
    let api_url = format!("{}/api/notes/show", base);
    let body = json!({ "noteId": note_id });
    http.post_json(&api_url, &body, timeout)
        .await?
        .require_ok()?
        .json()
}

/// Map a note to a record; `link` is kept verbatim as both id and url
pub(crate) fn into_record(note: Note, link: &str) -> NormalizedRecord {
    let media = note
        .files
        .iter()
        .filter(|file| !file.url.is_empty())
        .filter_map(|file| {
            let kind = if file.mime.starts_with("image/") {
                MediaKind::Photo
            } else if file.mime.starts_with("video/") {
                MediaKind::Video
            } else {
                return None;
            };
            Some(MediaItem::new(&file.url, kind))
        })
        .collect();

    let spoiler = note.cw.as_deref().is_some_and(|cw| !cw.is_empty());
    let text = html_to_text(note.text.as_deref().unwrap_or_default());

    NormalizedRecord::new(Site::Sharkey, link, link, text)
        .with_author(note.user.map(|user| user.username))
        .with_media(media)
        .with_spoiler(spoiler)
}
