//! Configuration types for note-to-post conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The project root that the Jekyll site
//! lives in is an ordinary field here; nothing is derived from the location of
//! the executable or from process-wide state.

use crate::error::Note2PostError;
use crate::pipeline::arxiv::ArxivIndex;
use crate::templates::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_TAG};
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Date format accepted for the post date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default site prefix for rewritten image links.
pub const DEFAULT_IMAGE_BASE_URL: &str = "/img";

/// Default arXiv abstract-page prefix used for the existence check.
pub const DEFAULT_ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

/// Configuration for a note-to-post conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use note2post::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .project_root("site")
///     .date("2025-04-28")
///     .image_base_url("/assets/img")
///     .build()
///     .unwrap();
/// assert_eq!(config.effective_output_dir(), std::path::Path::new("site/_posts"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root of the Jekyll site. Default: current directory.
    ///
    /// `output_dir` and `images_output_dir` default to `_posts` and `img`
    /// below this root.
    pub project_root: PathBuf,

    /// Publication date, `YYYY-MM-DD`. Default: today (local time).
    pub date: String,

    /// Directory the post is written to. Default: `<project_root>/_posts`.
    pub output_dir: Option<PathBuf>,

    /// Site prefix for relative image links. Default: `/img`.
    ///
    /// `None` or an empty string disables link rewriting; alt text is still
    /// renumbered.
    pub image_base_url: Option<String>,

    /// Directory relative images are copied into. Default: `<project_root>/img`.
    pub images_output_dir: Option<PathBuf>,

    /// Copy relative images next to the post. Default: true.
    pub copy_images: bool,

    /// Check the extracted arXiv id against the abstract page. Default: true.
    ///
    /// When disabled the extracted id is trusted as-is.
    pub verify_arxiv: bool,

    /// Prefix of the arXiv abstract pages. Default: `https://arxiv.org/abs`.
    pub arxiv_abs_url: String,

    /// Timeout for the existence check in seconds. Default: 5.
    pub lookup_timeout_secs: u64,

    /// `User-Agent` header sent with the existence check.
    pub user_agent: String,

    /// Pre-constructed arXiv index. Takes precedence over the HTTP index.
    pub index: Option<Arc<dyn ArxivIndex>>,

    /// Front-matter `categories:` entry.
    pub category: String,

    /// Front-matter `tags:` entries.
    pub tags: Vec<String>,

    /// Front-matter `description:` entry.
    pub description: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            date: today(),
            output_dir: None,
            image_base_url: Some(DEFAULT_IMAGE_BASE_URL.to_string()),
            images_output_dir: None,
            copy_images: true,
            verify_arxiv: true,
            arxiv_abs_url: DEFAULT_ARXIV_ABS_URL.to_string(),
            lookup_timeout_secs: 5,
            user_agent: format!("note2post/{}", env!("CARGO_PKG_VERSION")),
            index: None,
            category: DEFAULT_CATEGORY.to_string(),
            tags: vec![DEFAULT_TAG.to_string()],
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("project_root", &self.project_root)
            .field("date", &self.date)
            .field("output_dir", &self.output_dir)
            .field("image_base_url", &self.image_base_url)
            .field("images_output_dir", &self.images_output_dir)
            .field("copy_images", &self.copy_images)
            .field("verify_arxiv", &self.verify_arxiv)
            .field("arxiv_abs_url", &self.arxiv_abs_url)
            .field("lookup_timeout_secs", &self.lookup_timeout_secs)
            .field("index", &self.index.as_ref().map(|_| "<dyn ArxivIndex>"))
            .field("category", &self.category)
            .field("tags", &self.tags)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory the post is written to.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.project_root.join("_posts"))
    }

    /// Directory relative images are copied into, or `None` when copying is off.
    pub fn effective_images_dir(&self) -> Option<PathBuf> {
        if !self.copy_images {
            return None;
        }
        Some(
            self.images_output_dir
                .clone()
                .unwrap_or_else(|| self.project_root.join("img")),
        )
    }

    /// Base URL for rewritten links, or `None` when rewriting is off.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.image_base_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.project_root = root.into();
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.config.date = date.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_base_url = Some(url.into());
        self
    }

    /// Keep relative image links untouched.
    pub fn no_image_rewrite(mut self) -> Self {
        self.config.image_base_url = None;
        self
    }

    pub fn images_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.images_output_dir = Some(dir.into());
        self
    }

    pub fn copy_images(mut self, v: bool) -> Self {
        self.config.copy_images = v;
        self
    }

    pub fn verify_arxiv(mut self, v: bool) -> Self {
        self.config.verify_arxiv = v;
        self
    }

    pub fn arxiv_abs_url(mut self, url: impl Into<String>) -> Self {
        self.config.arxiv_abs_url = url.into();
        self
    }

    pub fn lookup_timeout_secs(mut self, secs: u64) -> Self {
        self.config.lookup_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn index(mut self, index: Arc<dyn ArxivIndex>) -> Self {
        self.config.index = Some(index);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.config.category = category.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = description.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Note2PostError> {
        let c = &self.config;
        validate_date(&c.date)?;
        if c.verify_arxiv && c.index.is_none() && c.lookup_timeout_secs == 0 {
            return Err(Note2PostError::InvalidConfig(
                "Lookup timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Check that `date` is a real `YYYY-MM-DD` calendar date.
pub fn validate_date(date: &str) -> Result<NaiveDate, Note2PostError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| Note2PostError::InvalidDate {
        date: date.to_string(),
    })
}

/// Today's local date in [`DATE_FORMAT`].
pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
