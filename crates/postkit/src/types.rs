//! Core types for PostKit

use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// Source family a record was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// Image board exposing the booru JSON API
    Booru,
    /// Mastodon-API server
    Mastodon,
    /// Misskey/Sharkey server
    Sharkey,
}

impl Site {
    /// Lowercase tag used in serialized output and transcoder keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Booru => "booru",
            Site::Mastodon => "mastodon",
            Site::Sharkey => "sharkey",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a record carries attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Media,
    Text,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Media => "media",
            RecordKind::Text => "text",
        }
    }
}

/// How the messaging layer should send an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Gif,
    /// Remote video locator
    Video,
    /// Local file produced by a transcoder
    VideoFile,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Gif => "gif",
            MediaKind::Video => "video",
            MediaKind::VideoFile => "video_file",
        }
    }
}

/// One attachment: where it lives and how to send it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct MediaItem {
    /// Remote URL or local file path
    pub locator: String,
    /// Attachment kind
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn new(locator: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            locator: locator.into(),
            kind,
        }
    }
}

/// Normalized description of a single post
///
/// Built once per resolve and never mutated afterwards; fields are read
/// through accessors. `media` is non-empty exactly when `kind` is
/// [`RecordKind::Media`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct NormalizedRecord {
    site: Site,
    kind: RecordKind,
    id: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    text: String,
    media: Vec<MediaItem>,
    spoiler: bool,
}

impl NormalizedRecord {
    /// Start a text-only record
    pub fn new(
        site: Site,
        id: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            site,
            kind: RecordKind::Text,
            id: id.into(),
            url: url.into(),
            author: None,
            text: text.into(),
            media: Vec::new(),
            spoiler: false,
        }
    }

    /// Set the author; empty names count as absent
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.is_empty());
        self
    }

    /// Set attachments and derive the kind from them
    pub fn with_media(mut self, media: Vec<MediaItem>) -> Self {
        self.kind = if media.is_empty() {
            RecordKind::Text
        } else {
            RecordKind::Media
        };
        self.media = media;
        self
    }

    pub fn with_spoiler(mut self, spoiler: bool) -> Self {
        self.spoiler = spoiler;
        self
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Source-native identifier (post number, status id or note id)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-followable link back to the post
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    /// True when the source marked the post sensitive
    pub fn spoiler(&self) -> bool {
        self.spoiler
    }
}
