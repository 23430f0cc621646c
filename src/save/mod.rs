//! Save dispatcher
//!
//! Hands a final artifact to the platform's local-file-save facility. The
//! shipped `DiskSaver` writes into a target directory; embedding shells can
//! provide their own `SaveSink` (download prompt, share sheet, ...).

use crate::transcode::FinalArtifact;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported while saving
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for save operations
pub type SaveResult<T> = Result<T, SaveError>;

/// File-save facility collaborator. Not cancellable.
pub trait SaveSink: Send + Sync {
    /// Persist the artifact; returns where it landed.
    fn save(&self, artifact: &FinalArtifact) -> SaveResult<PathBuf>;
}

/// Saves artifacts as plain files in a target directory.
pub struct DiskSaver {
    target_dir: PathBuf,
}

impl DiskSaver {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }
}

impl SaveSink for DiskSaver {
    fn save(&self, artifact: &FinalArtifact) -> SaveResult<PathBuf> {
        validate_filename(&artifact.filename)?;
        std::fs::create_dir_all(&self.target_dir)?;

        let path = self.target_dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes)?;

        tracing::info!(
            "saved {} bytes ({}) to {}",
            artifact.bytes.len(),
            artifact.mime_type,
            path.display()
        );
        Ok(path)
    }
}

/// Filenames must stay inside the target directory.
fn validate_filename(name: &str) -> SaveResult<()> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.contains("..")
        || Path::new(name).is_absolute();
    if bad {
        return Err(SaveError::InvalidFilename(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gif(filename: &str) -> FinalArtifact {
        FinalArtifact {
            bytes: b"GIF89a".to_vec(),
            mime_type: "image/gif".to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn saves_into_the_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DiskSaver::new(dir.path());

        let path = saver.save(&gif("demo.gif")).unwrap();
        assert_eq!(path, dir.path().join("demo.gif"));
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("captures").join("gifs");
        let saver = DiskSaver::new(&nested);

        let path = saver.save(&gif("recording.gif")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rejects_traversal_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DiskSaver::new(dir.path());

        for name in ["../escape.gif", "a/b.gif", "", "/etc/owned.gif"] {
            assert!(
                matches!(saver.save(&gif(name)), Err(SaveError::InvalidFilename(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
