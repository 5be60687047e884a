use super::METADATA_DIR;
use crate::common::error::PublishError;
use crate::common::result::{PublishResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// What a mirror pass copied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Regular files copied
    pub files: usize,
    /// Directories created below the destination root
    pub directories: usize,
    /// Total file bytes copied
    pub bytes: u64,
}

fn is_metadata_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == METADATA_DIR
}

/// Copy the tree under `source` into `destination`
///
/// Any directory named `.git` is skipped together with its contents. File
/// contents and permission bits are copied; directory permission bits are
/// applied once the directory has been filled. Symlinks are not special-cased:
/// they go through [`std::fs::copy`], which follows links to regular files and
/// rejects anything else. The first failure aborts the mirror.
pub fn mirror_directory(source: &Path, destination: &Path) -> PublishResult<MirrorSummary> {
    let mut summary = MirrorSummary::default();
    let mut directory_permissions: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_metadata_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf);
            PublishError::filesystem_error_with_source("Failed to walk source directory", path, e.into())
        })?;

        let relative = pathdiff::diff_paths(entry.path(), source).ok_or_else(|| {
            PublishError::internal_error(format!(
                "'{}' is not inside '{}'",
                entry.path().display(),
                source.display()
            ))
        })?;

        // The source root maps onto the destination root, which already exists
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = destination.join(&relative);

        if entry.file_type().is_dir() {
            let metadata = entry
                .metadata()
                .map_err(|e| {
                    PublishError::filesystem_error_with_source(
                        "Failed to read directory metadata",
                        Some(entry.path().to_path_buf()),
                        e.into(),
                    )
                })?;
            fs::create_dir_all(&target)
                .with_filesystem_error("Failed to create directory", Some(target.clone()))?;
            directory_permissions.push((target, metadata.permissions()));
            summary.directories += 1;
        } else {
            summary.bytes += copy_file(entry.path(), &target)?;
            summary.files += 1;
            trace!("Copied {}", relative.display());
        }
    }

    // Deepest first, so a read-only parent never blocks a child
    for (directory, permissions) in directory_permissions.into_iter().rev() {
        fs::set_permissions(&directory, permissions)
            .with_filesystem_error("Failed to set directory permissions", Some(directory.clone()))?;
    }

    debug!(
        "Mirrored {} files and {} directories ({} bytes) from {}",
        summary.files,
        summary.directories,
        summary.bytes,
        source.display()
    );

    Ok(summary)
}

/// Copy one file byte-for-byte and duplicate its permission bits
fn copy_file(source: &Path, target: &Path) -> PublishResult<u64> {
    let bytes = fs::copy(source, target)
        .with_filesystem_error("Failed to copy file", Some(source.to_path_buf()))?;

    let permissions = fs::metadata(source)
        .with_filesystem_error("Failed to read file metadata", Some(source.to_path_buf()))?
        .permissions();
    fs::set_permissions(target, permissions)
        .with_filesystem_error("Failed to set file permissions", Some(target.to_path_buf()))?;

    Ok(bytes)
}
