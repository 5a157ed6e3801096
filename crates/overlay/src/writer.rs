//! Crash-safe overlay publishing.
//!
//! The document is written to `<dest>.tmp` next to the destination, synced, and
//! renamed over it. Readers see the old file or the new one, never a mix.

use anyhow::{Context, Result};
use match_engine::MatchState;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::document::render_overlay;

pub fn temporary_path(dest: &Path) -> PathBuf {
    let Some(file_name) = dest.file_name().and_then(|name| name.to_str()) else {
        return dest.with_extension("tmp");
    };
    dest.with_file_name(format!("{file_name}.tmp"))
}

/// On error the destination keeps its previous contents.
pub fn write_atomically(dest: &Path, contents: &str) -> Result<()> {
    let tmp = temporary_path(dest);

    let result: Result<()> = (|| {
        let mut file = File::create(&tmp)
            .with_context(|| format!("create temporary overlay {}", tmp.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("write temporary overlay {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("sync temporary overlay {}", tmp.display()))?;
        drop(file);
        fs::rename(&tmp, dest)
            .with_context(|| format!("replace overlay {}", dest.display()))?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Owns the destination path for one poller.
#[derive(Debug, Clone)]
pub struct OverlayWriter {
    path: PathBuf,
}

impl OverlayWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the destination directory if it is missing.
    pub fn ensure_parent(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create overlay directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn publish(&self, state: &MatchState) -> Result<()> {
        let doc = render_overlay(state);
        write_atomically(&self.path, doc.as_str())?;
        debug!(path = %self.path.display(), bytes = doc.as_str().len(), "overlay written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_path_sits_beside_destination() {
        assert_eq!(
            temporary_path(Path::new("html/scoreboard.xml")),
            PathBuf::from("html/scoreboard.xml.tmp")
        );
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("scoreboard.xml");
        fs::write(&dest, "old").expect("seed");

        write_atomically(&dest, "new").expect("write");
        assert_eq!(fs::read_to_string(&dest).expect("read"), "new");
        assert!(!temporary_path(&dest).exists());
    }

    #[test]
    fn failed_write_leaves_previous_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        // destination is a non-empty directory, so the rename cannot replace it
        let dest = dir.path().join("scoreboard.xml");
        fs::create_dir(&dest).expect("dir");
        fs::write(dest.join("keep"), "previous").expect("seed");

        assert!(write_atomically(&dest, "new").is_err());
        assert_eq!(fs::read_to_string(dest.join("keep")).expect("read"), "previous");
        assert!(!temporary_path(&dest).exists());
    }

    #[test]
    fn missing_directory_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("missing").join("scoreboard.xml");
        let err = write_atomically(&dest, "x").expect_err("no parent directory");
        assert!(err.to_string().contains("create temporary overlay"));

        OverlayWriter::new(&dest).ensure_parent().expect("mkdir");
        write_atomically(&dest, "x").expect("write after mkdir");
    }
}
