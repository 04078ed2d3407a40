//! Source provider abstraction for filesystem-independent compilation.
//!
//! The [`SourceProvider`] trait abstracts file I/O so the compiler core can
//! be driven without touching `std::fs` -- the integration tests compile
//! entire include graphs out of an [`InMemoryProvider`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File I/O as seen by the compile pipeline: source reading, `include`
/// path resolution, and canonicalization for the include cycle guard.
pub trait SourceProvider {
    /// Read the source text for a given path.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Resolve an `include` argument against the directory of the file
    /// that named it.
    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf;

    /// Canonicalize a path for the visited set and cycle detection.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error>;
}

/// Default filesystem-backed provider; delegates to `std::fs`.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        base.join(include)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        path.canonicalize()
    }
}

/// In-memory provider for tests: maps paths to source text.
/// Canonicalization normalizes `.` and `..` without filesystem access.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        Self { files }
    }

    /// Build a provider from `(path, source)` pairs.
    pub fn from_files<P: Into<PathBuf>, S: Into<String>>(
        files: impl IntoIterator<Item = (P, S)>,
    ) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        }
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                std::path::Component::CurDir => {}
                std::path::Component::ParentDir => {
                    if !components.is_empty() {
                        components.pop();
                    }
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }

    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        Self::normalize_path(&base.join(include))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        let normalized = Self::normalize_path(path);
        if self.files.contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("path not found in memory provider: {}", normalized.display()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_resolves_dot_and_dotdot() {
        let p = Path::new("/a/b/../c/./d");
        assert_eq!(InMemoryProvider::normalize_path(p), PathBuf::from("/a/c/d"));
    }

    #[test]
    fn in_memory_read_source_found() {
        let provider = InMemoryProvider::from_files([("/game.sini", "[Weapons]\n")]);
        let content = provider.read_source(Path::new("/game.sini")).unwrap();
        assert_eq!(content, "[Weapons]\n");
    }

    #[test]
    fn in_memory_read_source_not_found() {
        let provider = InMemoryProvider::new(HashMap::new());
        let err = provider.read_source(Path::new("/missing.sini")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn in_memory_resolve_include_joins_base_dir() {
        let provider = InMemoryProvider::from_files([("/dir/common.sini", "x = 1\n")]);
        let resolved = provider.resolve_include(Path::new("/dir"), "common.sini");
        assert_eq!(resolved, PathBuf::from("/dir/common.sini"));
    }

    #[test]
    fn in_memory_canonicalize_missing_returns_error() {
        let provider = InMemoryProvider::new(HashMap::new());
        assert!(provider.canonicalize(Path::new("/nonexistent")).is_err());
    }
}
