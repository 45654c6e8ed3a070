//! Scratch files handed to external tools.
//!
//! Every file created here is removed when its guard drops, so early returns
//! and panics clean up the same way a successful run does.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};

use crate::{OutlineError, OutlineResult};

/// Create an empty, uniquely named file in `dir` (or the system temp directory).
pub fn scratch_file(dir: Option<&Path>, prefix: &str, suffix: &str) -> OutlineResult<TempPath> {
    let mut builder = Builder::new();
    builder.prefix(prefix).suffix(suffix);
    let file = match dir {
        Some(dir) => builder
            .tempfile_in(dir)
            .map_err(|e| OutlineError::file(dir, e))?,
        None => builder
            .tempfile()
            .map_err(|e| OutlineError::file(std::env::temp_dir(), e))?,
    };
    Ok(file.into_temp_path())
}

/// Removes a file a tool wrote next to its input, whether or not it exists.
#[derive(Debug)]
pub struct SiblingFile {
    path: PathBuf,
}

impl SiblingFile {
    /// Guard the file that shares `input`'s basename with `extension`.
    pub fn of(input: &Path, extension: &str) -> Self {
        Self {
            path: input.with_extension(extension),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SiblingFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path)
            && err.kind() != ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), %err, "failed to remove scratch file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn scratch_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(Some(dir.path()), "vtrace.", ".png").unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("vtrace."));
        assert!(name.ends_with(".png"));
        assert_eq!(entries(dir.path()), 1);
        drop(path);
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn scratch_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = scratch_file(Some(dir.path()), "vtrace.", ".svg").unwrap();
        let b = scratch_file(Some(dir.path()), "vtrace.", ".svg").unwrap();
        assert_ne!(a.to_path_buf(), b.to_path_buf());
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scratch_file(Some(&missing), "x.", ".png").unwrap_err();
        assert!(matches!(err, OutlineError::File { path, .. } if path == missing));
    }

    #[test]
    fn sibling_replaces_extension_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("vtrace.abc.svg");
        let guard = SiblingFile::of(&svg, "png");
        assert_eq!(guard.path(), dir.path().join("vtrace.abc.png"));
        fs::write(guard.path(), b"png").unwrap();
        drop(guard);
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn sibling_absent_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        drop(SiblingFile::of(&dir.path().join("a.svg"), "png"));
    }
}
