//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// Abstraction over the working-directory files the engine touches
///
/// Writes replace the whole file; callers assemble the full content first.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create or overwrite a file with the given contents
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}
