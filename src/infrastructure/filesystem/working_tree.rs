use super::METADATA_DIR;
use crate::common::result::{PublishResult, ResultExt};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Remove every top-level entry of `checkout` except the git metadata directory
///
/// Directories are removed recursively; files and symlinks are unlinked.
/// Returns the number of top-level entries removed.
pub fn clean_working_tree(checkout: &Path) -> PublishResult<usize> {
    let entries = fs::read_dir(checkout)
        .with_filesystem_error("Failed to read working tree", Some(checkout.to_path_buf()))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry
            .with_filesystem_error("Failed to read working tree entry", Some(checkout.to_path_buf()))?;

        if entry.file_name() == METADATA_DIR {
            continue;
        }

        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_filesystem_error("Failed to inspect entry", Some(path.clone()))?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path)
                .with_filesystem_error("Failed to remove directory", Some(path.clone()))?;
        } else {
            fs::remove_file(&path).with_filesystem_error("Failed to remove file", Some(path.clone()))?;
        }

        debug!("Removed {}", path.display());
        removed += 1;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_only_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git").join("objects")).unwrap();
        fs::write(root.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(root.join("README.md"), "old").unwrap();
        fs::create_dir_all(root.join("docs").join("nested")).unwrap();
        fs::write(root.join("docs").join("nested").join("page.html"), "old").unwrap();
        fs::write(root.join(".gitignore"), "target\n").unwrap();

        let removed = clean_working_tree(root).unwrap();

        assert_eq!(removed, 3);
        let remaining: Vec<_> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from(".git")]);
        assert!(root.join(".git").join("HEAD").exists());
    }

    #[test]
    fn test_clean_empty_checkout() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();

        assert_eq!(clean_working_tree(temp_dir.path()).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_unlinks_symlink_without_following() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("keep.txt"), "keep").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("link")).unwrap();

        clean_working_tree(temp_dir.path()).unwrap();

        assert!(!temp_dir.path().join("link").exists());
        assert!(outside.path().join("keep.txt").exists());
    }

    #[test]
    fn test_clean_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(clean_working_tree(&temp_dir.path().join("missing")).is_err());
    }
}
