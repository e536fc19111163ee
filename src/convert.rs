//! Conversion entry points.
//!
//! [`convert`] produces the post in memory; [`convert_to_file`] and
//! [`convert_note`] also write it. Image copies happen in every variant,
//! since they are part of turning a note into a publishable post.

use crate::config::{validate_date, ConversionConfig};
use crate::error::Note2PostError;
use crate::output::{ConversionOutput, ConversionStats, PostFile};
use crate::pipeline::arxiv::{self, ArxivIndex, HttpArxivIndex};
use crate::pipeline::images::{self, ImageOptions};
use crate::pipeline::{assets, input, postprocess};
use crate::templates;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a note into a blog post.
///
/// # Arguments
/// * `input_path`: the raw Markdown note
/// * `title`: post title for the front matter
/// * `config`: conversion configuration
///
/// # Returns
/// `Ok(ConversionOutput)` even if some images could not be copied
/// (check `output.asset_errors`).
///
/// # Errors
/// Returns `Err(Note2PostError)` only for fatal errors:
/// - Note not found / unreadable / not UTF-8
/// - Malformed date
pub async fn convert(
    input_path: impl AsRef<Path>,
    title: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Note2PostError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting conversion: {}", input_path.display());

    // ── Step 1: Validate date before any side effect ────────────────────
    validate_date(&config.date)?;

    // ── Step 2: Read note ────────────────────────────────────────────────
    let note = input::resolve_input(input_path).await?;

    // ── Step 3: Resolve grouping key ─────────────────────────────────────
    let lookup_start = Instant::now();
    let index = resolve_index(config)?;
    let key_resolution = arxiv::resolve_image_key(&note.content, index.as_deref()).await;
    let lookup_duration_ms = lookup_start.elapsed().as_millis() as u64;
    let image_key = key_resolution.image_key();

    // ── Step 4: Rewrite image references ─────────────────────────────────
    let opts = ImageOptions {
        input_dir: Some(note.dir.clone()),
        base_url: config.effective_base_url().map(str::to_string),
        copy_dir: config.effective_images_dir(),
        image_key: image_key.clone(),
    };
    let rewrite = images::rewrite_images(&note.content, &opts);

    // ── Step 5: Copy images ──────────────────────────────────────────────
    let copies = assets::copy_assets(&rewrite.copy_jobs).await;

    // ── Step 6: Assemble post ────────────────────────────────────────────
    let body = postprocess::finish_body(&rewrite.markdown);
    let markdown = format!("{}{}", front_matter(title, config), body);

    let stats = ConversionStats {
        figures: rewrite.figures.len(),
        rewritten: rewrite.figures.iter().filter(|f| f.was_rewritten()).count(),
        copied: copies.copied.len(),
        copy_failures: copies.errors.len(),
        lookup_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} figures, {} copied, {} copy failures, {}ms total",
        stats.figures, stats.copied, stats.copy_failures, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        image_key,
        key_resolution,
        figures: rewrite.figures,
        copied_images: copies.copied,
        asset_errors: copies.errors,
        stats,
    })
}

/// Convert a note and write the post to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    title: &str,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Note2PostError> {
    let output = convert(input_path, title, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Note2PostError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.markdown)
        .await
        .map_err(|e| Note2PostError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Note2PostError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Wrote {}", path.display());
    Ok(output)
}

/// Convert a note and write it into the configured posts directory as
/// `<date>-<slug>.md`.
pub async fn convert_note(
    input_path: impl AsRef<Path>,
    title: &str,
    config: &ConversionConfig,
) -> Result<PostFile, Note2PostError> {
    let path = post_path(title, config);
    let output = convert_to_file(input_path, title, &path, config).await?;
    info!("Post written to {}", path.display());
    Ok(PostFile { path, output })
}

/// Synchronous wrapper around [`convert_note`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    title: &str,
    config: &ConversionConfig,
) -> Result<PostFile, Note2PostError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Note2PostError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_note(input_path, title, config))
}

/// Jekyll file name for a post: `<date>-<slug>.md`.
///
/// The slug is the lowercased title with spaces replaced by `-`; no other
/// characters are touched.
pub fn post_file_name(date: &str, title: &str) -> String {
    format!("{}-{}.md", date, title.to_lowercase().replace(' ', "-"))
}

/// Full output path for a post under `config`.
pub fn post_path(title: &str, config: &ConversionConfig) -> PathBuf {
    config
        .effective_output_dir()
        .join(post_file_name(&config.date, title))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn front_matter(title: &str, config: &ConversionConfig) -> String {
    templates::front_matter(
        title,
        &config.date,
        &config.category,
        &config.tags,
        &config.description,
    )
}

/// Resolve the arXiv index, from most-specific to least-specific.
///
/// 1. Verification disabled: no index; the extracted id is trusted.
/// 2. Pre-built index (`config.index`): used as-is.
/// 3. HTTP index against `config.arxiv_abs_url`.
fn resolve_index(config: &ConversionConfig) -> Result<Option<Arc<dyn ArxivIndex>>, Note2PostError> {
    if !config.verify_arxiv {
        return Ok(None);
    }
    if let Some(ref index) = config.index {
        return Ok(Some(Arc::clone(index)));
    }
    let index = HttpArxivIndex::new(
        config.arxiv_abs_url.as_str(),
        config.lookup_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| Note2PostError::Internal(format!("Failed to build HTTP client: {e}")))?;
    Ok(Some(Arc::new(index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_file_name() {
        assert_eq!(
            post_file_name("2025-04-28", "Attention Is All You Need"),
            "2025-04-28-attention-is-all-you-need.md"
        );
        assert_eq!(post_file_name("2025-04-28", "GPT-4 Report"), "2025-04-28-gpt-4-report.md");
    }

    #[test]
    fn test_post_path_uses_output_dir() {
        let config = ConversionConfig::builder()
            .project_root("site")
            .date("2025-04-28")
            .build()
            .unwrap();
        assert_eq!(
            post_path("My Note", &config),
            PathBuf::from("site/_posts/2025-04-28-my-note.md")
        );
    }

    #[test]
    fn test_resolve_index_disabled() {
        let config = ConversionConfig::builder().verify_arxiv(false).build().unwrap();
        assert!(resolve_index(&config).unwrap().is_none());
    }

    #[test]
    fn test_resolve_index_default_http() {
        let config = ConversionConfig::default();
        assert!(resolve_index(&config).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_date_fails_before_reading() {
        let mut config = ConversionConfig::default();
        // Bypass the builder to reach the in-conversion check.
        config.date = "2025-13-40".into();
        let err = convert("/definitely/not/a/real/note.md", "t", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Note2PostError::InvalidDate { .. }));
    }
}
