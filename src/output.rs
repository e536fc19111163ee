//! Output types returned by the conversion entry points.

use crate::error::AssetError;
use crate::pipeline::arxiv::KeyResolution;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where an image source points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
    /// `http://`, `https://` or root-relative `/`; never rewritten or copied.
    Absolute,
    /// Resolved against the note's directory.
    Relative,
}

/// Which syntax an image reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSyntax {
    /// `![alt](src "title")`
    Markdown,
    /// `<img ... src="..." ...>`
    Html,
}

/// One image reference as it was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// The `N` in the `figN` alt text.
    pub number: usize,
    pub syntax: ImageSyntax,
    pub locality: Locality,
    /// Source as written in the note.
    pub original_src: String,
    /// Source as emitted in the post.
    pub src: String,
}

impl Figure {
    pub fn alt(&self) -> String {
        format!("fig{}", self.number)
    }

    pub fn was_rewritten(&self) -> bool {
        self.src != self.original_src
    }
}

/// Counters for a single conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Image references found (both syntaxes).
    pub figures: usize,
    /// References whose source changed.
    pub rewritten: usize,
    /// Files copied into the images directory.
    pub copied: usize,
    /// Copy jobs that failed.
    pub copy_failures: usize,
    /// Time spent on the arXiv existence check.
    pub lookup_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of converting one note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The full post: front matter followed by the rewritten body.
    pub markdown: String,
    /// Grouping key used for images, e.g. `arxiv-2504.18829`.
    pub image_key: Option<String>,
    /// How the grouping key was obtained.
    pub key_resolution: KeyResolution,
    /// Every image reference in rewrite order.
    pub figures: Vec<Figure>,
    /// Files written into the images directory.
    pub copied_images: Vec<PathBuf>,
    /// Non-fatal copy failures.
    pub asset_errors: Vec<AssetError>,
    pub stats: ConversionStats,
}

/// A post written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFile {
    /// Path of the written post.
    pub path: PathBuf,
    #[serde(flatten)]
    pub output: ConversionOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_alt_and_rewrite_flag() {
        let f = Figure {
            number: 3,
            syntax: ImageSyntax::Html,
            locality: Locality::Relative,
            original_src: "figs/a.png".into(),
            src: "/img/a.png".into(),
        };
        assert_eq!(f.alt(), "fig3");
        assert!(f.was_rewritten());
    }

    #[test]
    fn output_serialises_to_json() {
        let out = ConversionOutput {
            markdown: "---\n".into(),
            image_key: Some("arxiv-2504.18829".into()),
            key_resolution: KeyResolution::NoIdentifier,
            figures: vec![],
            copied_images: vec![],
            asset_errors: vec![AssetError::SourceMissing {
                path: PathBuf::from("a.png"),
            }],
            stats: ConversionStats::default(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["image_key"], "arxiv-2504.18829");
        assert_eq!(json["key_resolution"]["status"], "no_identifier");
        assert!(json["asset_errors"][0]["SourceMissing"].is_object());
    }
}
