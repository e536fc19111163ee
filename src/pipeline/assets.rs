//! Execution of planned image copies.
//!
//! Copies run after the text has been rewritten. Each job either lands a file
//! in the images directory or yields an [`AssetError`]; neither outcome
//! affects the post itself. The rewritten link is kept even when its file
//! could not be copied, so a missing image shows up as a broken link in the
//! preview rather than as an aborted conversion.

use crate::error::AssetError;
use crate::pipeline::images::CopyJob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of [`copy_assets`].
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// Target paths that were written.
    pub copied: Vec<PathBuf>,
    /// Jobs that failed, in job order.
    pub errors: Vec<AssetError>,
}

/// Run every copy job in order.
///
/// The target directory is created before the source is checked, so the
/// grouping directory exists even when the note references missing files.
pub async fn copy_assets(jobs: &[CopyJob]) -> CopyReport {
    let mut report = CopyReport::default();
    for job in jobs {
        match copy_one(job).await {
            Ok(target) => {
                debug!("Copied {} -> {}", job.source.display(), target.display());
                report.copied.push(target);
            }
            Err(e) => {
                warn!("{}", e);
                report.errors.push(e);
            }
        }
    }
    report
}

async fn copy_one(job: &CopyJob) -> Result<PathBuf, AssetError> {
    tokio::fs::create_dir_all(&job.target_dir)
        .await
        .map_err(|e| AssetError::CreateDirFailed {
            dir: job.target_dir.clone(),
            detail: e.to_string(),
        })?;

    let is_file = tokio::fs::metadata(&job.source)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file || job.file_name.is_empty() {
        return Err(AssetError::SourceMissing {
            path: job.source.clone(),
        });
    }

    let target = job.target();
    if same_file(&job.source, &target).await {
        return Err(AssetError::SameFile { path: target });
    }

    tokio::fs::copy(&job.source, &target)
        .await
        .map_err(|e| AssetError::CopyFailed {
            from: job.source.clone(),
            to: target.clone(),
            detail: e.to_string(),
        })?;
    Ok(target)
}

/// Whether `a` and `b` name the same existing file.
///
/// Copying a file onto itself truncates it, so this must be checked before
/// the target is opened.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
