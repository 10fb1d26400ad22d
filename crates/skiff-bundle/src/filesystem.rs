//! Build directory enumeration.
//!
//! Lists every regular file under a build directory as a root-relative
//! POSIX path with a leading slash. Classification is `stat`-based, so
//! symlinks are always followed. The listing is sorted byte-wise before
//! being returned, which keeps regenerated manifests byte-identical
//! across platforms whose readdir order differs.

use std::path::Path;

use crate::error::{BundleError, BundleResult};

/// Recursively list all regular files under `root`.
///
/// Returned paths are root-relative, `/`-separated and carry a leading
/// slash (`/index.html`, `/assets/app.js`), sorted lexicographically.
/// Directory entries themselves are never returned.
pub fn list_files(root: &Path) -> BundleResult<Vec<String>> {
    if !root.is_dir() {
        return Err(BundleError::BuildDirNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    walk(root, "", &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, prefix: &str, acc: &mut Vec<String>) -> BundleResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| BundleError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| BundleError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let child = entry.path();
        let rel = format!("{prefix}/{name}");

        // stat, not lstat: symlinked files and directories are followed.
        let meta = std::fs::metadata(&child).map_err(|e| BundleError::io(&child, e))?;
        if meta.is_dir() {
            walk(&child, &rel, acc)?;
        } else if meta.is_file() {
            acc.push(rel);
        }
    }

    Ok(())
}
