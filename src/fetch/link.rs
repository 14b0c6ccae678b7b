//! Symlink placement in the model tree
//!
//! Every downloaded artifact lives in the cache; the model tree only
//! holds links. Placement is idempotent: a correct link is kept, a
//! broken or wrong-target link is replaced, and anything that is not a
//! symlink is refused.

use crate::error::{ComfyPodError, ComfyPodResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Create (or repair) a symlink at `link` pointing at `target`.
///
/// The link's parent directory must already exist; creating it is the
/// caller's decision.
pub fn place_link(target: &Path, link: &Path) -> ComfyPodResult<()> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(link).map(|t| t == target).unwrap_or(false) {
                debug!("Link {} already current", link.display());
                return Ok(());
            }
            warn!("Replacing stale link {}", link.display());
            fs::remove_file(link).map_err(|e| ComfyPodError::LinkCreate {
                link: link.to_path_buf(),
                source: e,
            })?;
        }
        Ok(_) => {
            return Err(ComfyPodError::LinkCollision {
                path: link.to_path_buf(),
            })
        }
        Err(_) => {}
    }

    std::os::unix::fs::symlink(target, link).map_err(|e| ComfyPodError::LinkCreate {
        link: link.to_path_buf(),
        source: e,
    })
}

/// Whether `path` is a symlink whose target no longer exists
pub fn is_broken(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => !path.exists(),
        _ => false,
    }
}

/// Recursively collect broken symlinks under a directory.
///
/// Used by `cache verify` to surface links orphaned by an external
/// cache wipe.
pub fn find_broken_links(root: &Path) -> ComfyPodResult<Vec<PathBuf>> {
    let mut broken = Vec::new();
    if !root.exists() {
        return Ok(broken);
    }
    walk(root, &mut broken)?;
    broken.sort();
    Ok(broken)
}

fn walk(dir: &Path, broken: &mut Vec<PathBuf>) -> ComfyPodResult<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ComfyPodError::io(format!("reading directory {}", dir.display()), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| ComfyPodError::io(format!("reading entry in {}", dir.display()), e))?;
        let path = entry.path();

        let meta = fs::symlink_metadata(&path)
            .map_err(|e| ComfyPodError::io(format!("inspecting {}", path.display()), e))?;

        if meta.file_type().is_symlink() {
            if is_broken(&path) {
                broken.push(path);
            }
        } else if meta.is_dir() {
            walk(&path, broken)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_link_resolving_into_cache() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache");
        let models = dir.path().join("models");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&models).unwrap();

        let target = cache.join("weights.safetensors");
        fs::write(&target, b"data").unwrap();

        let link = models.join("weights.safetensors");
        place_link(&target, &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), target);
        assert!(link.canonicalize().unwrap().starts_with(&cache));
    }

    #[test]
    fn placing_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"data").unwrap();

        let link = dir.path().join("link");
        place_link(&target, &link).unwrap();
        place_link(&target, &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn replaces_wrong_target() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();

        let link = dir.path().join("link");
        place_link(&old, &link).unwrap();
        place_link(&new, &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), new);
    }

    #[test]
    fn refuses_non_symlink_collision() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"data").unwrap();

        let link = dir.path().join("link");
        fs::write(&link, b"a real file").unwrap();

        let result = place_link(&target, &link);
        assert!(matches!(result, Err(ComfyPodError::LinkCollision { .. })));
    }

    #[test]
    fn missing_parent_errors() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"data").unwrap();

        let link = dir.path().join("no-such-dir").join("link");
        let result = place_link(&target, &link);
        assert!(matches!(result, Err(ComfyPodError::LinkCreate { .. })));
    }

    #[test]
    fn finds_broken_links() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("checkpoints");
        fs::create_dir_all(&sub).unwrap();

        let target = dir.path().join("gone");
        fs::write(&target, b"data").unwrap();
        let link = sub.join("model.safetensors");
        place_link(&target, &link).unwrap();

        assert!(find_broken_links(dir.path()).unwrap().is_empty());

        fs::remove_file(&target).unwrap();
        assert!(is_broken(&link));
        assert_eq!(find_broken_links(dir.path()).unwrap(), vec![link]);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let broken = find_broken_links(&dir.path().join("absent")).unwrap();
        assert!(broken.is_empty());
    }
}
