//! arXiv identifier extraction and the image grouping key.
//!
//! Paper notes usually mention the paper's arXiv id somewhere in their
//! metadata section. The id becomes the *grouping key* `arxiv-<id>`, which
//! namespaces the note's images under `img/arxiv-<id>/` so that figures from
//! different papers never collide (every paper has a `fig1.png`).
//!
//! ## Lookup order
//!
//! Three patterns are tried in order and the first match wins:
//!
//! 1. inline `arXiv:2504.18829`
//! 2. labelled `ArXiv id: arXiv:2504.18829`
//! 3. abstract URL `https://arxiv.org/abs/2504.18829`
//!
//! ## Verification
//!
//! A typo in the id would scatter images into a directory nobody will ever
//! find again, so the id is checked against the abstract page before use.
//! The check goes through the [`ArxivIndex`] trait; [`HttpArxivIndex`] is the
//! default network-backed implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Prefix of every grouping key.
pub const KEY_PREFIX: &str = "arxiv";

static RE_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\barxiv:\s*([0-9]{4}\.[0-9]{4,5}(?:v\d+)?)").unwrap()
});

static RE_LABELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)arxiv\s*id\s*[:：]\s*arxiv:\s*([0-9]{4}\.[0-9]{4,5}(?:v\d+)?)").unwrap()
});

static RE_ABS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://arxiv\.org/abs/([0-9]{4}\.[0-9]{4,5}(?:v\d+)?)").unwrap()
});

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").unwrap());

/// An arXiv identifier such as `2504.18829` or `2401.12345v2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArxivId(String);

impl ArxivId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id carries a `v<N>` version suffix.
    pub fn has_version(&self) -> bool {
        RE_VERSION.is_match(&self.0)
    }

    /// The id with any version suffix removed.
    pub fn without_version(&self) -> ArxivId {
        ArxivId(RE_VERSION.replace(&self.0, "").into_owned())
    }

    /// The grouping key, e.g. `arxiv-2504.18829`.
    pub fn image_key(&self) -> String {
        format!("{KEY_PREFIX}-{}", self.0)
    }
}

impl fmt::Display for ArxivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the first arXiv id mentioned in `content`.
///
/// Patterns are tried in priority order; a later pattern is only consulted
/// when every earlier one found nothing.
pub fn extract_arxiv_id(content: &str) -> Option<ArxivId> {
    [&*RE_INLINE, &*RE_LABELLED, &*RE_ABS_URL]
        .into_iter()
        .find_map(|re| re.captures(content))
        .map(|caps| ArxivId(caps[1].to_string()))
}

/// Existence check for arXiv abstract pages.
///
/// Implementations must not fail: anything other than a positive answer is
/// reported as `false`.
#[async_trait]
pub trait ArxivIndex: Send + Sync {
    /// Whether the abstract page for `id` exists.
    async fn abs_exists(&self, id: &ArxivId) -> bool;
}

/// [`ArxivIndex`] backed by an HTTP GET of the abstract page.
///
/// Any 2xx or 3xx status counts as "exists"; other statuses, timeouts and
/// connection errors count as "does not exist".
#[derive(Debug, Clone)]
pub struct HttpArxivIndex {
    client: reqwest::Client,
    abs_url: String,
}

impl HttpArxivIndex {
    /// Build an index that queries `<abs_url>/<id>`.
    pub fn new(
        abs_url: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            abs_url: abs_url.into(),
        })
    }

    fn page_url(&self, id: &ArxivId) -> String {
        format!("{}/{}", self.abs_url.trim_end_matches('/'), id)
    }
}

#[async_trait]
impl ArxivIndex for HttpArxivIndex {
    async fn abs_exists(&self, id: &ArxivId) -> bool {
        let url = self.page_url(id);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                debug!("GET {} -> {}", url, status);
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                debug!("GET {} failed: {}", url, e);
                false
            }
        }
    }
}

/// How the grouping key was (or was not) obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyResolution {
    /// The note mentions no arXiv id.
    NoIdentifier,
    /// The id was confirmed by the index.
    Verified { id: ArxivId },
    /// The versioned id was unknown; its unversioned form was confirmed.
    VersionStripped { requested: ArxivId, id: ArxivId },
    /// Neither the id nor its unversioned form was confirmed.
    NotFound { requested: ArxivId },
    /// Verification was disabled; the id is used as written.
    Unverified { id: ArxivId },
}

impl KeyResolution {
    /// The grouping key to use, if any.
    pub fn image_key(&self) -> Option<String> {
        match self {
            KeyResolution::Verified { id }
            | KeyResolution::VersionStripped { id, .. }
            | KeyResolution::Unverified { id } => Some(id.image_key()),
            KeyResolution::NoIdentifier | KeyResolution::NotFound { .. } => None,
        }
    }

    /// A human-readable warning when the resolution was not clean.
    pub fn warning(&self) -> Option<String> {
        match self {
            KeyResolution::VersionStripped { requested, id } => Some(format!(
                "arXiv page not found for {requested}, using {id} instead"
            )),
            KeyResolution::NotFound { requested } => Some(format!(
                "arXiv page not found for {requested}, images will not be grouped"
            )),
            _ => None,
        }
    }
}

/// Extract the arXiv id from `content` and confirm it against `index`.
///
/// With `index = None` the extracted id is trusted without a lookup.
pub async fn resolve_image_key(content: &str, index: Option<&dyn ArxivIndex>) -> KeyResolution {
    let Some(id) = extract_arxiv_id(content) else {
        debug!("No arXiv id found in note");
        return KeyResolution::NoIdentifier;
    };

    let Some(index) = index else {
        debug!("arXiv verification disabled, trusting {}", id);
        return KeyResolution::Unverified { id };
    };

    let resolution = if index.abs_exists(&id).await {
        KeyResolution::Verified { id }
    } else if id.has_version() {
        let base = id.without_version();
        if index.abs_exists(&base).await {
            KeyResolution::VersionStripped {
                requested: id,
                id: base,
            }
        } else {
            KeyResolution::NotFound { requested: id }
        }
    } else {
        KeyResolution::NotFound { requested: id }
    };

    match resolution.warning() {
        Some(w) => warn!("{}", w),
        None => info!("Image grouping key: {:?}", resolution.image_key()),
    }
    resolution
}
