//! Path containment checks
//!
//! A path is resolved in two steps: `.` and `..` are folded lexically, then
//! the longest prefix that exists on disk is canonicalized so that symlinks
//! inside it are followed. The part that does not exist yet is appended as is.
//! Containment is decided on whole path components, never on string prefixes.

use crate::store::PathError;
use std::path::{Component, Path, PathBuf};

/// Resolves a path to an absolute, canonical form
///
/// Relative paths are taken relative to the current directory.
pub fn resolve_path(path: &Path) -> Result<PathBuf, PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| PathError::Resolve {
                path: path.display().to_string(),
                source,
            })?
            .join(path)
    };

    let normalized = normalize_lexically(&absolute);

    for existing in normalized.ancestors() {
        if std::fs::symlink_metadata(existing).is_err() {
            continue;
        }

        let canonical = existing.canonicalize().map_err(|source| PathError::Resolve {
            path: path.display().to_string(),
            source,
        })?;
        let rest = normalized.strip_prefix(existing).unwrap_or_else(|_| Path::new(""));
        return Ok(if rest.as_os_str().is_empty() {
            canonical
        } else {
            canonical.join(rest)
        });
    }

    Ok(normalized)
}

/// Returns true if `target` resolves to a location inside `root`
///
/// Fails closed: if either path cannot be resolved the answer is `false`.
///
/// # Examples
///
/// ```
/// use page_trawl::store::is_contained;
/// use std::path::Path;
///
/// let root = Path::new("/srv/output");
/// assert!(is_contained(Path::new("/srv/output/a/../b.md"), root));
/// assert!(!is_contained(Path::new("/srv/output/../secret"), root));
/// ```
pub fn is_contained(target: &Path, root: &Path) -> bool {
    match (resolve_path(target), resolve_path(root)) {
        (Ok(target), Ok(root)) => target.starts_with(&root),
        _ => false,
    }
}

/// Resolves `target` and checks that it lies inside `root`
///
/// Callers must operate on the returned path rather than on `target`, since
/// only the resolved form was checked.
pub fn ensure_contained(target: &Path, root: &Path) -> Result<PathBuf, PathError> {
    let resolved_root = resolve_path(root)?;
    let resolved = resolve_path(target)?;

    if resolved.starts_with(&resolved_root) {
        Ok(resolved)
    } else {
        tracing::warn!(
            "Rejected path {} outside of {}",
            target.display(),
            resolved_root.display()
        );
        Err(PathError::Escapes {
            path: target.display().to_string(),
            root: resolved_root.display().to_string(),
        })
    }
}

/// Folds `.` and `..` components without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
