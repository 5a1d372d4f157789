use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` / `..` lexically while ensuring the path never escapes the sandbox root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Joins a relative path to the root and ensures the result stays inside it.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let safe_rel = normalize_relative(path.as_ref())?;
    let joined = root.join(safe_rel);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_missing(root, &joined),
        Err(e) => Err(StorageError::Io {
            source: e,
            context: Some(format!("Failed to resolve {}", joined.display()).into()),
        }),
    }
}

/// Applies the hash-prefix layout to the final file name.
///
/// `ab/cdef0123.json` with width 3 becomes `ab/cde/f0123.json`. Subdirectories
/// are preserved; names that are not longer than `width` stay unsharded.
pub(crate) fn shard_relative(path: &Path, width: usize) -> Result<PathBuf, StorageError> {
    let file_name =
        path.file_name().and_then(|s| s.to_str()).ok_or_else(|| StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Sharded target must be a file name".into()),
        })?;

    let mut sharded = path.parent().map(Path::to_path_buf).unwrap_or_default();

    match file_name.char_indices().nth(width) {
        Some((split, _)) if width > 0 => {
            let (prefix, rest) = file_name.split_at(split);
            sharded.push(prefix);
            sharded.push(rest);
        },
        _ => sharded.push(file_name),
    }

    Ok(sharded)
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Path resolves outside the catalog root".into()),
        })
    }
}

/// Validates a path that doesn't exist yet through its first existing ancestor.
///
/// The ancestor is canonicalized so a symlinked directory inside the root cannot
/// redirect writes elsewhere.
fn validate_missing(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}
