//! Fixture sources: a directory of response files, and an in-memory map.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use covenant_application::ports::{FileSystem, FileSystemError, FixtureSource, FixtureSourceError};
use tracing::trace;

use super::file_system::TokioFileSystem;

/// Serves fixtures from `<config dir>/data/<dataset>/response/<name>`.
#[derive(Debug, Clone)]
pub struct FileFixtureSource<F: FileSystem = TokioFileSystem> {
    fs: F,
    dir: PathBuf,
}

impl FileFixtureSource<TokioFileSystem> {
    /// Serves fixtures of `dataset` under the config directory `root`.
    #[must_use]
    pub fn for_dataset(root: &Path, dataset: &str) -> Self {
        Self::new(root.join("data").join(dataset).join("response"))
    }

    /// Serves fixtures from `dir` on the real file system.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_system(TokioFileSystem::new(), dir)
    }
}

impl<F: FileSystem> FileFixtureSource<F> {
    /// Serves fixtures from `dir` through a custom file system.
    #[must_use]
    pub fn with_file_system(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// The directory fixtures are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fixture names are relative paths that stay inside the directory.
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        contained.then(|| self.dir.join(relative))
    }
}

#[async_trait]
impl<F: FileSystem> FixtureSource for FileFixtureSource<F> {
    async fn load(&self, name: &str) -> Result<Vec<u8>, FixtureSourceError> {
        let Some(path) = self.path_for(name) else {
            return Err(FixtureSourceError::NotFound(name.to_string()));
        };
        trace!(path = %path.display(), "Reading fixture");

        self.fs.read_file(&path).await.map_err(|e| match e {
            FileSystemError::NotFound(_) | FileSystemError::NotADirectory(_) => {
                FixtureSourceError::NotFound(name.to_string())
            }
            other => FixtureSourceError::Io {
                name: name.to_string(),
                message: other.to_string(),
            },
        })
    }
}

/// Fixtures held in memory, for tests and generated suites.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFixtureSource {
    fixtures: HashMap<String, Vec<u8>>,
}

impl InMemoryFixtureSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a fixture.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    /// Adds (or replaces) a fixture in place.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.fixtures.insert(name.into(), content.into());
    }
}

#[async_trait]
impl FixtureSource for InMemoryFixtureSource {
    async fn load(&self, name: &str) -> Result<Vec<u8>, FixtureSourceError> {
        self.fixtures
            .get(name)
            .cloned()
            .ok_or_else(|| FixtureSourceError::NotFound(name.to_string()))
    }
}
