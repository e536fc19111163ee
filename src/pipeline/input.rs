//! Input resolution: read the note and remember where it lives.
//!
//! The note's directory is kept alongside its text because relative image
//! sources (`figs/overview.png`) resolve against it, not against the
//! process working directory.

use crate::error::Note2PostError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A note read from disk.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    /// Path as given by the caller.
    pub path: PathBuf,
    /// Directory containing the note; empty for a bare file name.
    pub dir: PathBuf,
    /// Full UTF-8 text of the note.
    pub content: String,
}

/// Read the note at `path`.
pub async fn resolve_input(path: &Path) -> Result<ResolvedInput, Note2PostError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => return Err(map_read_error(path, e)),
    };

    let content = String::from_utf8(bytes).map_err(|_| Note2PostError::InvalidEncoding {
        path: path.to_path_buf(),
    })?;

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    debug!(
        "Read note {} ({} bytes, dir {:?})",
        path.display(),
        content.len(),
        dir
    );

    Ok(ResolvedInput {
        path: path.to_path_buf(),
        dir,
        content,
    })
}

fn map_read_error(path: &Path, e: std::io::Error) -> Note2PostError {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => Note2PostError::FileNotFound { path },
        ErrorKind::PermissionDenied => Note2PostError::PermissionDenied { path },
        _ => Note2PostError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_note_and_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        std::fs::write(&path, "# Note\n").unwrap();

        let input = resolve_input(&path).await.unwrap();
        assert_eq!(input.content, "# Note\n");
        assert_eq!(input.dir, tmp.path());
        assert_eq!(input.path, path);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = resolve_input(Path::new("/definitely/not/a/real/note.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, Note2PostError::FileNotFound { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = resolve_input(&path).await.unwrap_err();
        assert!(matches!(err, Note2PostError::InvalidEncoding { .. }));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_note() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_input(tmp.path()).await.unwrap_err();
        assert!(!matches!(err, Note2PostError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_bare_file_name_has_empty_dir() {
        assert_eq!(
            Path::new("note.md").parent().map(Path::to_path_buf).unwrap_or_default(),
            PathBuf::new()
        );
    }
}
