//! Path helpers used by the scanner, extractor and compiler invoker

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute without requiring it to exist.
///
/// Existing paths are canonicalized with `dunce` so Windows paths stay free of the
/// `\\?\` prefix. Missing paths are joined onto the current directory and have
/// `.` and `..` components folded lexically.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return Ok(canonical);
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_lexically(&joined))
}

/// Make `path` absolute lexically, without touching the filesystem.
///
/// Relative paths are joined onto the current directory. Symlinks are not resolved,
/// so the result stays comparable with paths built from the same root.
pub fn to_absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize_lexically(&joined)
}

/// Fold `.` and `..` components without consulting the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether `path` ends in `.<extension>`.
///
/// An empty extension matches every path. The comparison is case-sensitive to
/// match how schema compilers look up include files.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return true;
    }
    path.extension()
        .map(|ext| ext == extension)
        .unwrap_or(false)
}
