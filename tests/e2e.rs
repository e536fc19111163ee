//! End-to-end integration tests for note2post.
//!
//! Most tests build a scratch site in a temp directory and use an in-memory
//! arXiv index, so they run offline. Tests that talk to arxiv.org are gated
//! behind the `E2E_ENABLED` environment variable.
//!
//! Run the live tests with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use note2post::templates::PDF_REMINDER;
use note2post::{
    convert, convert_note, convert_sync, post_file_name, ArxivId, ArxivIndex, AssetError,
    ConversionConfig, KeyResolution, Note2PostError,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Index that knows a fixed set of ids.
struct StaticIndex(HashSet<&'static str>);

impl StaticIndex {
    fn new(known: &[&'static str]) -> Arc<Self> {
        Arc::new(Self(known.iter().copied().collect()))
    }
}

#[async_trait]
impl ArxivIndex for StaticIndex {
    async fn abs_exists(&self, id: &ArxivId) -> bool {
        self.0.contains(id.as_str())
    }
}

/// A scratch site: `notes/` holds the note and its figures, the site lives
/// under `blog/`.
struct Site {
    tmp: TempDir,
}

impl Site {
    fn new() -> Self {
        let site = Self {
            tmp: TempDir::new().expect("temp dir"),
        };
        std::fs::create_dir_all(site.notes().join("figs")).unwrap();
        site
    }

    fn notes(&self) -> PathBuf {
        self.tmp.path().join("notes")
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("blog")
    }

    fn write_note(&self, text: &str) -> PathBuf {
        let path = self.notes().join("note.md");
        std::fs::write(&path, text).unwrap();
        path
    }

    fn write_figure(&self, rel: &str, bytes: &[u8]) {
        let path = self.notes().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    fn config(&self, known: &[&'static str]) -> ConversionConfig {
        ConversionConfig::builder()
            .project_root(self.root())
            .date("2025-04-28")
            .index(StaticIndex::new(known))
            .build()
            .expect("valid config")
    }
}

const NOTE: &str = r#"

# Paper: Something Useful

### Meta Data
- **ArXiv id:** arXiv:2504.18829v2
- Authors: A. Author

***

## Method

![overview](figs/overview.png)

<img src="figs/table.png" width="80%">

![remote](https://example.org/remote.png "Remote figure")

![missing](figs/missing.png)

<img alt="old" src="/img/shared/logo.png">
"#;

// ── Full conversion ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_note_end_to_end() {
    let site = Site::new();
    let note = site.write_note(NOTE);
    site.write_figure("figs/overview.png", b"overview-bytes");
    site.write_figure("figs/table.png", b"table-bytes");

    let config = site.config(&["2504.18829"]);
    let post = convert_note(&note, "Something Useful", &config)
        .await
        .expect("conversion should succeed");

    // Post location and name
    assert_eq!(
        post.path,
        site.root().join("_posts/2025-04-28-something-useful.md")
    );
    let written = std::fs::read_to_string(&post.path).unwrap();
    assert_eq!(written, post.output.markdown);

    // Version was stripped after the versioned lookup failed
    assert_eq!(post.output.image_key.as_deref(), Some("arxiv-2504.18829"));
    assert!(matches!(
        post.output.key_resolution,
        KeyResolution::VersionStripped { .. }
    ));

    // Front matter then body
    assert!(written.starts_with("---\ntitle: Something Useful\ndate: 2025-04-28\n"));
    assert!(written.contains("<div class=\"paper-note-container\" markdown=\"1\">\n# Paper"));
    assert!(written.ends_with("\n\n</div>"));

    // Reminder lands right before the metadata rule
    assert!(written.contains(&format!("A. Author\n\n\n{PDF_REMINDER}***")));

    // Markdown pass first, then HTML
    assert!(written.contains("![fig1](/img/arxiv-2504.18829/overview.png)"));
    assert!(written.contains(r#"![fig2](https://example.org/remote.png "Remote figure")"#));
    assert!(written.contains("![fig3](/img/arxiv-2504.18829/missing.png)"));
    assert!(written.contains(r#"<img alt="fig4" src="/img/arxiv-2504.18829/table.png" width="80%">"#));
    assert!(written.contains(r#"<img alt="fig5" src="/img/shared/logo.png">"#));

    // Copies: existing files landed, the missing one is reported
    let images = site.root().join("img/arxiv-2504.18829");
    assert_eq!(std::fs::read(images.join("overview.png")).unwrap(), b"overview-bytes");
    assert_eq!(std::fs::read(images.join("table.png")).unwrap(), b"table-bytes");
    assert!(!images.join("missing.png").exists());
    assert_eq!(post.output.copied_images.len(), 2);
    assert!(matches!(
        post.output.asset_errors.as_slice(),
        [AssetError::SourceMissing { .. }]
    ));

    let stats = &post.output.stats;
    assert_eq!(stats.figures, 5);
    assert_eq!(stats.rewritten, 3);
    assert_eq!(stats.copied, 2);
    assert_eq!(stats.copy_failures, 1);
}

#[tokio::test]
async fn test_unknown_id_means_no_grouping() {
    let site = Site::new();
    let note = site.write_note("arXiv:2504.18829\n\n![a](a.png)\n");
    site.write_figure("a.png", b"a");

    let config = site.config(&[]);
    let out = convert(&note, "T", &config).await.unwrap();

    assert_eq!(out.image_key, None);
    assert!(out.markdown.contains("![fig1](/img/a.png)"));
    assert!(site.root().join("img/a.png").is_file());
}

#[tokio::test]
async fn test_note_inside_images_dir_keeps_its_figures() {
    let site = Site::new();
    let img = site.root().join("img");
    std::fs::create_dir_all(&img).unwrap();
    std::fs::write(img.join("a.png"), b"precious-bytes").unwrap();
    let note = img.join("note.md");
    std::fs::write(&note, "![x](a.png)\n").unwrap();

    let config = site.config(&[]);
    let out = convert(&note, "T", &config).await.unwrap();

    assert!(out.markdown.contains("![fig1](/img/a.png)"));
    assert!(out.copied_images.is_empty());
    assert!(matches!(
        out.asset_errors.as_slice(),
        [AssetError::SameFile { .. }]
    ));
    assert_eq!(std::fs::read(img.join("a.png")).unwrap(), b"precious-bytes");
}

#[tokio::test]
async fn test_note_without_images() {
    let site = Site::new();
    let body = "# Title\n\n### Meta Data\n- x\n***\n\nPlain text.\n";
    let note = site.write_note(body);

    let config = site.config(&[]);
    let out = convert(&note, "T", &config).await.unwrap();

    let expected_body = format!(
        "# Title\n\n### Meta Data\n- x\n\n{PDF_REMINDER}***\n\nPlain text.\n\n</div>"
    );
    assert!(out.markdown.ends_with(&expected_body), "{}", out.markdown);
    assert!(out.figures.is_empty());
    assert_eq!(out.key_resolution, KeyResolution::NoIdentifier);
    assert!(!site.root().join("img").exists());
}

#[tokio::test]
async fn test_rewrite_and_copy_can_be_disabled() {
    let site = Site::new();
    let note = site.write_note("![x](figs/a.png)\n");
    site.write_figure("figs/a.png", b"a");

    let config = ConversionConfig::builder()
        .project_root(site.root())
        .date("2025-04-28")
        .image_base_url("")
        .copy_images(false)
        .verify_arxiv(false)
        .build()
        .unwrap();
    let out = convert(&note, "T", &config).await.unwrap();

    assert!(out.markdown.contains("![fig1](figs/a.png)"));
    assert!(out.copied_images.is_empty());
    assert!(!site.root().join("img").exists());
}

#[tokio::test]
async fn test_offline_trusts_versioned_id() {
    let site = Site::new();
    let note = site.write_note("https://arxiv.org/abs/2401.12345v3\n\n![](a.png)\n");

    let config = ConversionConfig::builder()
        .project_root(site.root())
        .date("2025-04-28")
        .verify_arxiv(false)
        .build()
        .unwrap();
    let out = convert(&note, "T", &config).await.unwrap();

    assert_eq!(out.image_key.as_deref(), Some("arxiv-2401.12345v3"));
    assert!(out.markdown.contains("![fig1](/img/arxiv-2401.12345v3/a.png)"));
}

#[tokio::test]
async fn test_custom_front_matter_placeholders() {
    let site = Site::new();
    let note = site.write_note("text");

    let config = ConversionConfig::builder()
        .project_root(site.root())
        .date("2025-04-28")
        .verify_arxiv(false)
        .category("Paper Notes")
        .tags(["llm", "agents"])
        .description("TBD")
        .build()
        .unwrap();
    let out = convert(&note, "T", &config).await.unwrap();

    assert!(out.markdown.contains("categories: [Paper Notes]\n"));
    assert!(out.markdown.contains("tags: [llm, agents]\n"));
    assert!(out.markdown.contains("description: TBD\n"));
}

#[tokio::test]
async fn test_overwrites_existing_post() {
    let site = Site::new();
    let note = site.write_note("first");
    let config = site.config(&[]);

    convert_note(&note, "Same Title", &config).await.unwrap();
    site.write_note("second");
    let post = convert_note(&note, "Same Title", &config).await.unwrap();

    let written = std::fs::read_to_string(&post.path).unwrap();
    assert!(written.contains("second"));
    assert!(!written.contains("first"));
    assert!(!post.path.with_extension("md.tmp").exists());
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_input_writes_nothing() {
    let site = Site::new();
    let config = site.config(&[]);

    let err = convert_note(site.notes().join("nope.md"), "T", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Note2PostError::FileNotFound { .. }), "{err}");
    assert!(!site.root().join("_posts").exists());
}

#[test]
fn test_malformed_date_rejected_by_builder() {
    let err = ConversionConfig::builder()
        .date("2025-4-31")
        .build()
        .unwrap_err();
    assert!(matches!(err, Note2PostError::InvalidDate { .. }));
}

#[test]
fn test_convert_sync() {
    let site = Site::new();
    let note = site.write_note("![](figs/a.png)");
    site.write_figure("figs/a.png", b"a");

    let post = convert_sync(&note, "Sync Note", &site.config(&[])).unwrap();
    assert!(post.path.ends_with(post_file_name("2025-04-28", "Sync Note")));
    assert!(site.root().join("img/a.png").is_file());
}

#[test]
fn test_report_serialises() {
    let site = Site::new();
    let note = site.write_note("arXiv:2504.18829 ![](a.png)");
    let post = convert_sync(&note, "T", &site.config(&["2504.18829"])).unwrap();

    let json = serde_json::to_value(&post).unwrap();
    assert_eq!(json["image_key"], "arxiv-2504.18829");
    assert_eq!(json["key_resolution"]["status"], "verified");
    assert_eq!(json["figures"][0]["syntax"], "markdown");
    assert!(Path::new(json["path"].as_str().unwrap()).ends_with("2025-04-28-t.md"));
}

// ── Live arXiv tests ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_arxiv_lookup() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let site = Site::new();
    let note = site.write_note("**ArXiv id:** arXiv:1706.03762\n");
    let config = ConversionConfig::builder()
        .project_root(site.root())
        .date("2025-04-28")
        .build()
        .unwrap();

    let out = convert(&note, "Attention", &config).await.unwrap();
    assert_eq!(out.image_key.as_deref(), Some("arxiv-1706.03762"));
    println!("lookup took {}ms", out.stats.lookup_duration_ms);
}

#[tokio::test]
async fn test_live_arxiv_unknown_id() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let site = Site::new();
    let note = site.write_note("arXiv:9999.99999\n");
    let config = ConversionConfig::builder()
        .project_root(site.root())
        .date("2025-04-28")
        .build()
        .unwrap();

    let out = convert(&note, "T", &config).await.unwrap();
    assert_eq!(out.image_key, None);
}
