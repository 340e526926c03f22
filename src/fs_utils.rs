use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copies the contents of `from` into `to`, creating `to` if needed.
/// Symlinks are recreated as links rather than followed. Directory permissions,
/// `to`'s included, are copied from their source directories.
pub fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    let mut dirs = vec![(from.to_path_buf(), to.to_path_buf())];
    for entry in WalkDir::new(from).min_depth(1).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let dst = to.join(rel);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dst)?;
            dirs.push((entry.path().to_path_buf(), dst));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dst)?;
        } else {
            fs::copy(entry.path(), &dst)?;
        }
    }

    // Deepest first, so a read-only directory is only locked once it is full.
    for (src, dst) in dirs.iter().rev() {
        fs::set_permissions(dst, fs::metadata(src)?.permissions())?;
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// Removes every entry inside `dir`, keeping `dir` itself.
pub fn clear_dir(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryDigest {
    Dir,
    File(String),
    Link(PathBuf),
}

/// Content fingerprint of a directory tree: every relative path with an MD5
/// digest of its bytes (files) or its link target (symlinks).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeFingerprint {
    entries: BTreeMap<String, EntryDigest>,
}

impl TreeFingerprint {
    pub fn capture(root: &Path) -> io::Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(io::Error::other)?;
            let key = rel.to_string_lossy().replace('\\', "/");
            let file_type = entry.file_type();
            let digest = if file_type.is_dir() {
                EntryDigest::Dir
            } else if file_type.is_symlink() {
                EntryDigest::Link(fs::read_link(entry.path())?)
            } else {
                let bytes = fs::read(entry.path())?;
                EntryDigest::File(format!("{:x}", md5::compute(bytes)))
            };
            entries.insert(key, digest);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths that were added, removed or changed between `self` and `other`.
    pub fn diff(&self, other: &TreeFingerprint) -> Vec<String> {
        let mut changed: Vec<String> = self
            .entries
            .iter()
            .filter(|(path, digest)| other.entries.get(*path) != Some(digest))
            .map(|(path, _)| path.clone())
            .collect();
        changed.extend(
            other
                .entries
                .keys()
                .filter(|path| !self.entries.contains_key(*path))
                .cloned(),
        );
        changed.sort();
        changed
    }
}
