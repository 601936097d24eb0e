//! Booru image boards
//!
//! Handles `https://<board>.booru.org/[images/]<id>` links through the
//! board's JSON API (`/api/v1/json/images/<id>`).

use crate::error::ResolveError;
use crate::http::HttpClient;
use crate::sources::is_decimal;
use crate::transcode::VideoPolicy;
use crate::types::{MediaItem, MediaKind, NormalizedRecord, Site};
use serde::Deserialize;
use std::time::Duration;

/// Domain suffix shared by booru boards
pub const DEFAULT_BOORU_SUFFIX: &str = "booru.org";

/// Images whose height + width exceed this are sent at `large` size.
/// Messaging APIs reject photos near a 10000 dimension sum, so this keeps
/// a margin.
const MAX_FULL_DIMENSION_SUM: u64 = 8000;

/// API response envelope
#[derive(Debug, Deserialize)]
struct ImageEnvelope {
    image: BooruImage,
}

/// Image post as returned by the booru API (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct BooruImage {
    pub id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub format: String,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub width: u64,
    pub representations: Representations,
    #[serde(default)]
    pub spoilered: bool,
}

/// Named size variants of an image
#[derive(Debug, Clone, Deserialize)]
pub struct Representations {
    pub full: String,
    #[serde(default)]
    pub large: Option<String>,
}

/// Format buckets the mapper distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat<'a> {
    /// jpg, jpeg, png and svg (served rasterized)
    Raster,
    Gif,
    Webm,
    Unknown(&'a str),
}

impl<'a> ImageFormat<'a> {
    fn parse(format: &'a str) -> Self {
        match format.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "svg" => ImageFormat::Raster,
            "gif" => ImageFormat::Gif,
            "webm" => ImageFormat::Webm,
            _ => ImageFormat::Unknown(format),
        }
    }
}

/// True when `host` belongs to a booru board
pub(crate) fn matches_host(host: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| host.ends_with(suffix.as_str()))
}

/// Post id from the path segments after the host
///
/// The first segment is the id unless it is `images`, in which case the
/// id follows it.
pub(crate) fn parse_post_id(segments: &[&str]) -> Option<u64> {
    let candidate = match segments.first() {
        Some(&"images") => segments.get(1)?,
        Some(first) => first,
        None => return None,
    };

    if !is_decimal(candidate) {
        return None;
    }
    candidate.parse().ok()
}

/// Fetch a single image post
pub(crate) async fn fetch(
    http: &dyn HttpClient,
    base: &str,
    id: u64,
    timeout: Duration,
) -> Result<BooruImage, ResolveError> {
    let api_url = format!("{}/api/v1/json/images/{}", base, id);
    let envelope: ImageEnvelope = http.get(&api_url, timeout).await?.require_ok()?.json()?;
    Ok(envelope.image)
}

/// Map an image post to a record
pub(crate) async fn into_record(
    image: BooruImage,
    base: &str,
    video: &VideoPolicy,
) -> NormalizedRecord {
    let id = image.id.to_string();
    let url = format!("{}/{}", base, id);
    let description = image.description.clone().unwrap_or_default();

    let (text, media) = match ImageFormat::parse(&image.format) {
        ImageFormat::Raster => {
            let locator = if image.height.saturating_add(image.width) > MAX_FULL_DIMENSION_SUM {
                image
                    .representations
                    .large
                    .as_deref()
                    .unwrap_or(image.representations.full.as_str())
            } else {
                image.representations.full.as_str()
            };
            (description, vec![MediaItem::new(locator, MediaKind::Photo)])
        }
        ImageFormat::Gif => (
            description,
            vec![MediaItem::new(&image.representations.full, MediaKind::Gif)],
        ),
        ImageFormat::Webm => {
            let item = video
                .webm_attachment(&image.representations.full, Site::Booru, &id)
                .await;
            (description, vec![item])
        }
        ImageFormat::Unknown(format) => {
            let notice = format!("Unknown image format: {}", format);
            let text = if description.is_empty() {
                notice
            } else {
                format!("{}\n{}", notice, description)
            };
            (text, Vec::new())
        }
    };

    NormalizedRecord::new(Site::Booru, id, url, text)
        .with_author(author_from_tags(&image.tags))
        .with_media(media)
        .with_spoiler(image.spoilered)
}

/// Artists named by `artist:` tags, joined with `, `
fn author_from_tags(tags: &[String]) -> Option<String> {
    let artists: Vec<&str> = tags
        .iter()
        .filter_map(|tag| tag.strip_prefix("artist:"))
        .collect();

    if artists.is_empty() {
        None
    } else {
        Some(artists.join(", "))
    }
}
