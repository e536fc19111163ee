//! # note2post
//!
//! Turn raw Markdown paper notes into Jekyll blog posts.
//!
//! A note written next to its figures (`![](figs/overview.png)`) becomes a
//! post with front matter, site-relative image links, and its images copied
//! into the site under a directory named after the paper's arXiv id.
//!
//! ## Pipeline Overview
//!
//! ```text
//! note.md
//!  │
//!  ├─ 1. Input    read the note, remember its directory
//!  ├─ 2. Key      find the arXiv id, confirm it on arxiv.org → arxiv-<id>
//!  ├─ 3. Images   rewrite ![..](..) then <img ..>, renumber alt to figN
//!  ├─ 4. Assets   copy relative images into img/arxiv-<id>/
//!  ├─ 5. Body     PDF-embed reminder, close the container
//!  └─ 6. Output   front matter + body → _posts/<date>-<slug>.md
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use note2post::{convert_note, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .project_root("my-blog")
//!         .date("2025-04-28")
//!         .build()?;
//!     let post = convert_note("notes/paper.md", "Paper Title", &config).await?;
//!     println!("wrote {}", post.path.display());
//!     for e in &post.output.asset_errors {
//!         eprintln!("skipped: {e}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `note2post` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_note, convert_sync, convert_to_file, post_file_name};
pub use error::{AssetError, Note2PostError};
pub use output::{ConversionOutput, ConversionStats, Figure, ImageSyntax, Locality, PostFile};
pub use pipeline::arxiv::{ArxivId, ArxivIndex, HttpArxivIndex, KeyResolution};
