//! Filesystem operations
//!
//! Thin wrappers that attach the offending path to every I/O error.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a single file, replacing the destination
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| FilesystemError::CopyFile {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })
}

/// Size of a file in bytes
pub fn file_size(path: &Path) -> Result<u64, FilesystemError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| FilesystemError::Metadata {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_and_size() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.bin");
        let to = temp.path().join("b.bin");
        std::fs::write(&from, b"12345").unwrap();
        std::fs::write(&to, b"old contents").unwrap();

        copy_file(&from, &to).unwrap();
        assert_eq!(file_size(&to).unwrap(), 5);
    }

    #[test]
    fn test_copy_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_file(&temp.path().join("nope"), &temp.path().join("b")).unwrap_err();
        assert!(matches!(err, FilesystemError::CopyFile { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_file_size_missing() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            file_size(&temp.path().join("absent")),
            Err(FilesystemError::Metadata { .. })
        ));
    }
}
