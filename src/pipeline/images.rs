//! Image-reference rewriting.
//!
//! Notes are written in an editor where images sit next to the note
//! (`![](figs/overview.png)`), but the published post needs site paths
//! (`/img/arxiv-2504.18829/overview.png`). This module finds every image
//! reference, both Markdown `![alt](src "title")` and HTML
//! `<img ... src="..." ...>`, and:
//!
//! - rewrites relative sources onto the site prefix, keeping only the file name;
//! - plans a copy of each relative source into the images directory;
//! - renumbers every alt text to `fig1`, `fig2`, … .
//!
//! Rewriting is a pure text transformation: the copies are returned as
//! [`CopyJob`]s and executed separately by [`crate::pipeline::assets`].
//!
//! ## Numbering order
//!
//! The Markdown pass runs over the whole document before the HTML pass, and
//! the figure counter is shared between them. A note with
//! `<img src="a.png">` followed by `![](b.png)` therefore yields `fig2` for
//! the HTML image and `fig1` for the Markdown one. Existing posts were
//! numbered this way, so the order is kept.
//!
//! ## Idempotence
//!
//! Running the rewriter over its own output is not a no-op: alt texts are
//! renumbered again and already rewritten root-relative sources are left
//! alone, so a second run with a different base URL does not move them.

use crate::output::{Figure, ImageSyntax, Locality};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `![alt](src)` with an optional `"title"` after whitespace.
static RE_MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(\s+"[^"]*")?\)"#).unwrap());

/// `<img ... src="..." ...>`; groups are the attributes before and after `src`.
static RE_HTML_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img([^>]*)src="([^"]+)"([^>]*)>"#).unwrap());

static RE_ALT_PRESENT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\balt\s*=\s*""#).unwrap());

static RE_ALT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\balt\s*=\s*"[^"]*""#).unwrap());

/// Inputs to a rewrite.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Directory of the input note; relative sources resolve against it.
    pub input_dir: Option<PathBuf>,
    /// Site prefix for rewritten links. Empty or `None` disables rewriting.
    pub base_url: Option<String>,
    /// Directory relative images are copied into.
    pub copy_dir: Option<PathBuf>,
    /// Grouping key; adds a subdirectory to both the link and the copy target.
    pub image_key: Option<String>,
}

/// A planned image copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Source resolved against the note's directory.
    pub source: PathBuf,
    /// Directory the file lands in.
    pub target_dir: PathBuf,
    /// File name kept from the source.
    pub file_name: String,
}

impl CopyJob {
    pub fn target(&self) -> PathBuf {
        self.target_dir.join(&self.file_name)
    }
}

/// Result of [`rewrite_images`].
#[derive(Debug, Clone, Default)]
pub struct Rewrite {
    pub markdown: String,
    pub figures: Vec<Figure>,
    pub copy_jobs: Vec<CopyJob>,
}

impl Locality {
    /// Classify an image source.
    ///
    /// `http://`, `https://` and root-relative `/` sources are absolute;
    /// everything else resolves against the note's directory.
    pub fn of(src: &str) -> Self {
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with('/') {
            Locality::Absolute
        } else {
            Locality::Relative
        }
    }
}

/// Final path segment of a source: the text after the last `/`.
pub fn file_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

/// Rewrite every image reference in `content`.
///
/// Never fails; references that cannot be handled are left as they are.
pub fn rewrite_images(content: &str, opts: &ImageOptions) -> Rewrite {
    let mut rewriter = Rewriter::new(opts);

    let after_md = RE_MD_IMAGE
        .replace_all(content, |caps: &Captures<'_>| rewriter.markdown(caps))
        .into_owned();
    let markdown = RE_HTML_IMAGE
        .replace_all(&after_md, |caps: &Captures<'_>| rewriter.html(caps))
        .into_owned();

    debug!(
        "Rewrote {} image references, {} copies planned",
        rewriter.figures.len(),
        rewriter.copy_jobs.len()
    );

    Rewrite {
        markdown,
        figures: rewriter.figures,
        copy_jobs: rewriter.copy_jobs,
    }
}

/// Per-document rewrite state: the figure counter and what has been planned.
struct Rewriter<'a> {
    opts: &'a ImageOptions,
    base_url: Option<&'a str>,
    next_figure: usize,
    figures: Vec<Figure>,
    copy_jobs: Vec<CopyJob>,
}

impl<'a> Rewriter<'a> {
    fn new(opts: &'a ImageOptions) -> Self {
        Self {
            opts,
            base_url: opts.base_url.as_deref().filter(|u| !u.is_empty()),
            next_figure: 1,
            figures: Vec::new(),
            copy_jobs: Vec::new(),
        }
    }

    fn markdown(&mut self, caps: &Captures<'_>) -> String {
        let src = &caps[2];
        let title = caps.get(3).map_or("", |m| m.as_str());
        let (number, new_src) = self.visit(ImageSyntax::Markdown, src);
        format!("![fig{number}]({new_src}{title})")
    }

    fn html(&mut self, caps: &Captures<'_>) -> String {
        let pre = &caps[1];
        let src = &caps[2];
        let post = &caps[3];
        let (number, new_src) = self.visit(ImageSyntax::Html, src);
        let attrs = format!("{pre}src=\"{new_src}\"{post}");
        format!("<img{}>", set_alt(&attrs, &format!("fig{number}")))
    }

    /// Record one reference: plan its copy, compute its new source and
    /// take the next figure number.
    fn visit(&mut self, syntax: ImageSyntax, src: &str) -> (usize, String) {
        let locality = Locality::of(src);
        if locality == Locality::Relative {
            self.plan_copy(src);
        }
        let new_src = self.rewrite_src(src, locality);

        let number = self.next_figure;
        self.next_figure += 1;
        self.figures.push(Figure {
            number,
            syntax,
            locality,
            original_src: src.to_string(),
            src: new_src.clone(),
        });
        (number, new_src)
    }

    fn plan_copy(&mut self, src: &str) {
        let (Some(copy_dir), Some(input_dir)) = (&self.opts.copy_dir, &self.opts.input_dir) else {
            return;
        };
        let target_dir = match &self.opts.image_key {
            Some(key) => copy_dir.join(key),
            None => copy_dir.clone(),
        };
        self.copy_jobs.push(CopyJob {
            source: resolve_source(input_dir, src),
            target_dir,
            file_name: file_name(src).to_string(),
        });
    }

    fn rewrite_src(&self, src: &str, locality: Locality) -> String {
        let Some(base_url) = self.base_url else {
            return src.to_string();
        };
        if locality == Locality::Absolute {
            return src.to_string();
        }
        let base = base_url.trim_end_matches('/');
        let name = file_name(src);
        match &self.opts.image_key {
            Some(key) => format!("{base}/{key}/{name}"),
            None => format!("{base}/{name}"),
        }
    }
}

/// Resolve a relative source against the note's directory.
fn resolve_source(input_dir: &Path, src: &str) -> PathBuf {
    if input_dir.as_os_str().is_empty() {
        PathBuf::from(src)
    } else {
        input_dir.join(src)
    }
}

/// Replace any existing `alt="..."` in `attrs`, or insert one at the front.
fn set_alt(attrs: &str, alt: &str) -> String {
    if RE_ALT_PRESENT.is_match(attrs) {
        let replacement = format!("alt=\"{alt}\"");
        RE_ALT_ATTR
            .replace_all(attrs, regex::NoExpand(&replacement))
            .into_owned()
    } else {
        format!(" alt=\"{alt}\"{attrs}")
    }
}
