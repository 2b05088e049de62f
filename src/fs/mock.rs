use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory file system for tests and dry runs
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<HashSet<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let mut dirs = HashSet::new();
        dirs.insert(root.clone());
        Self {
            files: RwLock::new(BTreeMap::new()),
            dirs: RwLock::new(dirs),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.write().unwrap().insert(path, content.to_string());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut dirs = self.dirs.write().unwrap();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            dirs.insert(current.clone());
        }
    }

    /// Paths of every file currently held, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.read().unwrap().keys().cloned().collect()
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path) || self.dirs.read().unwrap().contains(&path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let path = self.normalize_path(path);
        let parent_exists = path
            .parent()
            .map(|p| self.dirs.read().unwrap().contains(p))
            .unwrap_or(false);
        if !parent_exists {
            return Err(anyhow!("Directory not found for {:?}", path));
        }
        self.files
            .write()
            .unwrap()
            .insert(path, contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("requirements.txt", "flask\n");

        assert!(fs.exists(Path::new("/mock/requirements.txt")));
        assert!(fs.is_file(Path::new("/mock/requirements.txt")));
        assert!(fs.exists(Path::new("/mock")));
    }

    #[test]
    fn test_parent_directories_created() {
        let fs = MockFileSystem::new();
        fs.add_file("a/b/package.json", "{}");

        assert!(fs.exists(Path::new("/mock/a")));
        assert!(fs.exists(Path::new("/mock/a/b")));
        assert!(!fs.is_file(Path::new("/mock/a/b")));
    }

    #[test]
    fn test_write_requires_existing_directory() {
        let fs = MockFileSystem::new();

        assert!(fs.write(Path::new("/mock/Dockerfile"), "FROM x").is_ok());
        assert!(fs.write(Path::new("/mock/missing/Dockerfile"), "FROM x").is_err());
    }

    #[test]
    fn test_write_overwrites() {
        let fs = MockFileSystem::new();
        fs.write(Path::new("Dockerfile"), "one").unwrap();
        fs.write(Path::new("Dockerfile"), "two").unwrap();

        assert_eq!(fs.read_to_string(Path::new("/mock/Dockerfile")).unwrap(), "two");
        assert_eq!(fs.file_paths(), vec![PathBuf::from("/mock/Dockerfile")]);
    }

    #[test]
    fn test_with_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/work"));
        fs.add_file("app.py", "print('hi')");

        assert_eq!(fs.root(), Path::new("/work"));
        assert!(fs.is_file(Path::new("/work/app.py")));
    }
}
