//! PostKit - resolve social media post links into chat-ready records
//!
//! Given a link to a post on a booru image board, a Mastodon server or a
//! Misskey/Sharkey server, PostKit fetches the post through the site's JSON
//! API and normalizes it into a [`NormalizedRecord`]: text, author, media
//! attachments and a spoiler flag.
//!
//! ## Source families
//!
//! Links are classified by shape without any network I/O:
//! - `https://<board>.booru.org/[images/]<id>` - booru image posts
//! - `https://<server>/@<handle>/<status id>` - Mastodon statuses
//! - `https://<server>/notes/<note id>` - Misskey and Sharkey notes
//!
//! Anything else resolves to `None`. So does every network or decode
//! failure; use [`Resolver::try_resolve`] for the reason.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), postkit::ResolveError> {
//! let resolver = postkit::Resolver::builder()
//!     .user_agent("MyBot/1.0")
//!     .build()?;
//!
//! if let Some(record) = resolver.resolve("https://mastodon.social/@alice/42").await {
//!     println!("{}", record.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
mod convert;
mod error;
pub mod http;
pub mod instance;
mod resolver;
pub mod sources;
pub mod transcode;
mod types;

pub use client::{resolve, resolve_with_options, ResolveOptions};
pub use convert::{escape_markdown, extract_links, html_to_escaped_markdown, html_to_text};
pub use error::ResolveError;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use instance::InstanceKind;
pub use resolver::{Resolver, ResolverBuilder};
pub use sources::PostRef;
pub use transcode::Transcoder;
pub use types::{MediaItem, MediaKind, NormalizedRecord, RecordKind, Site};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Social Media Downloader Bot";
