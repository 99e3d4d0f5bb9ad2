//! Ancestor chains for symlink loop protection.

use std::fs::Metadata;
use std::path::Path;
#[cfg(not(unix))]
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Identity of a directory on disk: device and inode number.
#[cfg(unix)]
type DirKey = (u64, u64);

/// Identity of a directory on disk: its canonical path.
#[cfg(not(unix))]
type DirKey = PathBuf;

#[derive(Debug)]
struct Link {
    key: DirKey,
    parent: Option<Arc<Link>>,
}

/// The directories entered on the way from the root down to one directory.
///
/// Only a directory that is one of its own ancestors closes a loop. The same
/// directory reached through two sibling paths is walked both times. Chains
/// share their prefixes, so cloning one for every pending child is cheap.
#[derive(Debug, Clone, Default)]
pub struct Ancestors {
    tail: Option<Arc<Link>>,
    depth: usize,
}

impl Ancestors {
    /// The empty chain, above the walk root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain for entering `path` below this one, or `None` if `path` is
    /// already on it.
    pub fn enter(&self, path: &Path, metadata: &Metadata) -> Option<Self> {
        let key = dir_key(path, metadata);
        if self.contains(&key) {
            return None;
        }
        Some(Self {
            tail: Some(Arc::new(Link {
                key,
                parent: self.tail.clone(),
            })),
            depth: self.depth + 1,
        })
    }

    /// Number of directories on the chain.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn contains(&self, key: &DirKey) -> bool {
        let mut link = self.tail.as_deref();
        while let Some(current) = link {
            if current.key == *key {
                return true;
            }
            link = current.parent.as_deref();
        }
        false
    }
}

#[cfg(unix)]
fn dir_key(_path: &Path, metadata: &Metadata) -> DirKey {
    (metadata.dev(), metadata.ino())
}

#[cfg(not(unix))]
fn dir_key(path: &Path, _metadata: &Metadata) -> DirKey {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_enter_nested_directories() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let root = Ancestors::new()
            .enter(temp.path(), &fs::metadata(temp.path()).unwrap())
            .unwrap();
        let chain = root.enter(&sub, &fs::metadata(&sub).unwrap()).unwrap();

        assert_eq!(Ancestors::new().depth(), 0);
        assert_eq!(root.depth(), 1);
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_ancestor_is_refused() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let root_meta = fs::metadata(temp.path()).unwrap();

        let chain = Ancestors::new()
            .enter(temp.path(), &root_meta)
            .and_then(|c| c.enter(&sub, &fs::metadata(&sub).unwrap()))
            .unwrap();

        assert!(chain.enter(temp.path(), &root_meta).is_none());
        assert!(chain.enter(&sub, &fs::metadata(&sub).unwrap()).is_none());
    }

    #[test]
    fn test_sibling_is_not_an_ancestor() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        let a_meta = fs::metadata(&a).unwrap();

        let root = Ancestors::new()
            .enter(temp.path(), &fs::metadata(temp.path()).unwrap())
            .unwrap();
        let under_b = root.enter(&b, &fs::metadata(&b).unwrap()).unwrap();

        // `a` may be entered from the root and again from below `b`.
        assert!(root.enter(&a, &a_meta).is_some());
        assert!(under_b.enter(&a, &a_meta).is_some());
    }
}
