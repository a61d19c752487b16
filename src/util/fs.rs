//! Filesystem access.
//!
//! The parser never touches the disk directly: it asks a [`FileSystem`] whether
//! paths exist and for their bytes. [`LiveFileSystem`] reads the real disk,
//! [`MemoryFileSystem`] serves fixtures from memory.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// Read-only filesystem capabilities needed by the parser.
pub trait FileSystem {
    /// Check if a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a file's contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// In-memory filesystem.
///
/// Directories exist implicitly as ancestors of added files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    /// Create a new empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize_path(path.as_ref());
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        self.files.insert(path, content.into());
    }

    /// Builder form of [`add_file`](Self::add_file).
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    /// Copy every file below `source` on the real disk into memory,
    /// re-rooted at `mount`.
    pub fn load_dir(&mut self, source: &Path, mount: &Path) -> io::Result<()> {
        for entry in WalkDir::new(source) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let content = std::fs::read(entry.path())?;
            self.add_file(mount.join(relative), content);
        }
        Ok(())
    }

    /// Check if a path is a file.
    pub fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    /// Check if a path is a directory.
    pub fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(&normalize_path(path))
    }

    /// Number of files held.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(&normalize_path(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )
        })
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Never touches the disk, so symlinks are not followed.
///
/// Leading `..` of a relative path are kept; `..` directly below the root is
/// dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(normalize_path(Path::new("../x/../y")), PathBuf::from("../y"));
        assert_eq!(normalize_path(Path::new("a/b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_memory_fs_exists_and_read() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/Example.xcodeproj/project.pbxproj", "{}")
            .with_file("/p/Pkg/Package.swift", "// swift-tools-version:5.7");

        assert!(fs.exists(Path::new("/p/Pkg/Package.swift")));
        assert!(fs.exists(Path::new("/p/Pkg")));
        assert!(fs.exists(Path::new("/p/Example.xcodeproj/../Pkg/Package.swift")));
        assert!(!fs.exists(Path::new("/p/Other/Package.swift")));

        assert_eq!(fs.read(Path::new("/p/Example.xcodeproj/project.pbxproj")).unwrap(), b"{}");
        let err = fs.read(Path::new("/p/Pkg")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_dir_mirrors_disk() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Nested/Pkg")).unwrap();
        std::fs::write(tmp.path().join("Nested/Pkg/Package.swift"), "pkg").unwrap();
        std::fs::write(tmp.path().join("top.txt"), "top").unwrap();

        let mut fs = MemoryFileSystem::new();
        fs.load_dir(tmp.path(), Path::new("/mnt/fixture")).unwrap();

        assert_eq!(fs.file_count(), 2);
        assert!(fs.is_dir(Path::new("/mnt/fixture/Nested")));
        assert_eq!(
            fs.read(Path::new("/mnt/fixture/Nested/Pkg/Package.swift")).unwrap(),
            b"pkg"
        );
    }

    #[test]
    fn test_live_fs_reads_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.txt");
        std::fs::write(&path, "content").unwrap();

        assert!(LiveFileSystem.exists(&path));
        assert_eq!(LiveFileSystem.read(&path).unwrap(), b"content");
        assert!(LiveFileSystem.read(&tmp.path().join("missing")).is_err());
    }
}
