//! Federated instance classification
//!
//! Decides whether a bare domain runs a Mastodon-API server, and whether
//! that server is Sharkey, by probing its instance metadata endpoint.

use crate::http::HttpClient;
use crate::sources::FEDERATED_API_VERSIONS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Substring of the instance `version` reported by Sharkey servers
const SHARKEY_VERSION_MARKER: &str = "Sharkey";

/// API family implemented by a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Mastodon,
    Sharkey,
    Unknown,
}

impl InstanceKind {
    /// True for any server answering the Mastodon instance API
    pub fn is_mastodon_family(&self) -> bool {
        matches!(self, InstanceKind::Mastodon | InstanceKind::Sharkey)
    }

    pub fn is_sharkey(&self) -> bool {
        matches!(self, InstanceKind::Sharkey)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Mastodon => "mastodon",
            InstanceKind::Sharkey => "sharkey",
            InstanceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct InstanceInfo {
    #[serde(default)]
    version: Option<String>,
}

/// Probe `base` (`scheme://host[:port]`) and classify it
///
/// Any version whose `/api/<version>/instance` answers 200 with a JSON
/// content type makes the server Mastodon-family. Probing continues until a
/// `version` carrying the Sharkey marker is seen. Network failures only
/// move on to the next version.
pub async fn classify_instance(http: &dyn HttpClient, base: &str, timeout: Duration) -> InstanceKind {
    let mut kind = InstanceKind::Unknown;

    for version in FEDERATED_API_VERSIONS {
        let probe_url = format!("{}/api/{}/instance", base, version);
        let response = match http.get(&probe_url, timeout).await {
            Ok(response) if response.is_ok() && response.is_json() => response,
            Ok(response) => {
                debug!(url = %probe_url, status = response.status, "Instance probe missed");
                continue;
            }
            Err(e) => {
                debug!(url = %probe_url, error = %e, "Instance probe failed");
                continue;
            }
        };

        let is_sharkey = response
            .json::<InstanceInfo>()
            .ok()
            .and_then(|info| info.version)
            .is_some_and(|v| v.contains(SHARKEY_VERSION_MARKER));

        if is_sharkey {
            return InstanceKind::Sharkey;
        }
        kind = InstanceKind::Mastodon;
    }

    kind
}
