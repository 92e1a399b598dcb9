use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use super::errors::{GpError, Result};
use super::task::FileTask;

/// Extensions the backend accepts, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // photos
    "jpg", "jpeg", "jpe", "png", "gif", "webp", "heic", "heif", "avif", "bmp", "ico", "tif", "tiff",
    // raw
    "arw", "cr2", "cr3", "crw", "dng", "nef", "nrw", "orf", "pef", "raf", "rw2", "sr2", "srf", "srw",
    // videos
    "3g2", "3gp", "asf", "avi", "divx", "m2t", "m2ts", "m4v", "mkv", "mmv", "mod", "mov", "mp4",
    "mpeg", "mpg", "mts", "tod", "wmv",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Collect the files under `root` that make up one batch.
///
/// A file root is a batch of one and bypasses the extension filter. Any I/O
/// error while walking aborts discovery.
pub fn discover(root: &Path, recursive: bool, disable_filter: bool) -> Result<Vec<FileTask>> {
    let root = std::path::absolute(root).map_err(|err| GpError::discovery(root, err))?;
    let metadata = std::fs::metadata(&root).map_err(|err| GpError::discovery(&root, err))?;

    if metadata.is_file() {
        return Ok(vec![FileTask::new(root, metadata.len())]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut tasks = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(walk_error)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !disable_filter && !is_supported(entry.path()) {
            continue;
        }

        let size = entry.metadata().map_err(walk_error)?.len();
        tasks.push(FileTask::new(entry.path().to_path_buf(), size));
    }

    Ok(tasks)
}

fn walk_error(err: walkdir::Error) -> GpError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    let source = match err.into_io_error() {
        Some(io) => io,
        None => std::io::Error::other("filesystem loop detected"),
    };
    GpError::discovery(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(tasks: &[FileTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_is_supported_ignores_case() {
        assert!(is_supported(Path::new("a/IMG_0001.JPG")));
        assert!(is_supported(Path::new("clip.Mp4")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_discover_filters_and_skips_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"b").unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join("readme.md"), b"r").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.heic"), b"c").unwrap();

        let tasks = discover(dir.path(), false, false).unwrap();
        assert_eq!(names(&tasks), vec!["a.jpg", "b.png"]);
        assert!(tasks.iter().all(|t| t.path.is_absolute()));

        let tasks = discover(dir.path(), true, false).unwrap();
        assert_eq!(names(&tasks), vec!["a.jpg", "b.png", "c.heic"]);

        let tasks = discover(dir.path(), false, true).unwrap();
        assert_eq!(names(&tasks), vec!["a.jpg", "b.png", "readme.md"]);
    }

    #[test]
    fn test_discover_single_file_bypasses_filter() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("document.pdf");
        fs::write(&file, b"12345").unwrap();

        let tasks = discover(&file, false, false).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].size, 5);
    }

    #[test]
    fn test_discover_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("missing"), false, false).unwrap_err();
        assert!(matches!(err, GpError::Discovery { .. }));
    }
}
