//! Temp-file-then-rename writes shared by the state, page and config writers.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Filesystem step that failed during [`write_atomic`].
#[derive(Debug, Error)]
#[error("write {}", .path.display())]
pub struct AtomicWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Write `contents` to `<path>.tmp`, then rename it over `path`.
///
/// Missing parent directories are created. On failure the temp file is removed
/// and `path` keeps its previous contents.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), AtomicWriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| AtomicWriteError {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp_path = temp_path(path);
    if let Err(source) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AtomicWriteError {
            path: tmp_path,
            source,
        });
    }
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AtomicWriteError {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parents_and_leaves_no_temp_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("out.txt");

        write_atomic(&path, "hello\n").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "hello\n");
        assert!(!temp.path().join("nested").join("out.txt.tmp").exists());
    }

    #[test]
    fn temp_name_keeps_original_extension() {
        assert_eq!(
            temp_path(Path::new("site/state.txt")),
            PathBuf::from("site/state.txt.tmp")
        );
    }

    #[test]
    fn failed_rename_keeps_previous_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        // A non-empty directory at the target makes the rename fail.
        let path = temp.path().join("out.txt");
        fs::create_dir_all(path.join("blocker")).expect("mkdir");

        let err = write_atomic(&path, "new").expect_err("rename fails");

        assert_eq!(err.path, path);
        assert!(path.join("blocker").exists());
        assert!(!temp.path().join("out.txt.tmp").exists());
    }
}
