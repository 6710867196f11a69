//! Suite file loader.
//!
//! A suite is either a single YAML file or a directory of them. Directory
//! entries are read in file-name order and their scenarios concatenated.

use std::path::{Path, PathBuf};

use covenant_application::ports::{FileSystem, FileSystemError};
use covenant_domain::SuiteSpec;
use tracing::debug;

use super::file_system::TokioFileSystem;

/// Default suite directory, relative to the config directory.
pub const SUITES_DIR: &str = "suites";

const SUITE_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Errors loading suite files.
#[derive(Debug, thiserror::Error)]
pub enum SuiteLoadError {
    /// The suite path does not exist.
    #[error("suite not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was given but holds no suite files.
    #[error("no .yml suite files in {}", .0.display())]
    Empty(PathBuf),

    /// A suite file could not be read.
    #[error("cannot read suite {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: FileSystemError,
    },

    /// A suite file is not a valid suite document.
    #[error("invalid suite {}: {message}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser message, with line and column when available.
        message: String,
    },
}

/// Loads `SuiteSpec`s from YAML files.
#[derive(Debug, Clone, Default)]
pub struct SuiteLoader<F: FileSystem = TokioFileSystem> {
    fs: F,
}

impl<F: FileSystem> SuiteLoader<F> {
    /// Creates a loader over the given file system.
    #[must_use]
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Loads a suite file, or every suite file in a directory.
    ///
    /// # Errors
    ///
    /// Returns `SuiteLoadError` if the path is missing, an empty directory,
    /// unreadable or not a valid suite.
    pub async fn load(&self, path: &Path) -> Result<SuiteSpec, SuiteLoadError> {
        if self.fs.is_dir(path).await {
            return self.load_dir(path).await;
        }
        if !self.fs.is_file(path).await {
            return Err(SuiteLoadError::NotFound(path.to_path_buf()));
        }
        self.load_file(path).await
    }

    async fn load_dir(&self, dir: &Path) -> Result<SuiteSpec, SuiteLoadError> {
        let entries = self.fs.read_dir(dir).await.map_err(|source| SuiteLoadError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut suite = SuiteSpec::default();
        let mut files = 0_usize;
        for entry in entries {
            if !is_suite_file(&entry) || !self.fs.is_file(&entry).await {
                continue;
            }
            let part = self.load_file(&entry).await?;
            suite.scenarios.extend(part.scenarios);
            files += 1;
        }

        if files == 0 {
            return Err(SuiteLoadError::Empty(dir.to_path_buf()));
        }
        debug!(dir = %dir.display(), files, scenarios = suite.scenarios.len(), "Loaded suite directory");
        Ok(suite)
    }

    async fn load_file(&self, path: &Path) -> Result<SuiteSpec, SuiteLoadError> {
        let content = self
            .fs
            .read_file_string(path)
            .await
            .map_err(|source| SuiteLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        // An empty file is an empty suite rather than a YAML error.
        if content.trim().is_empty() {
            return Ok(SuiteSpec::default());
        }

        let suite: SuiteSpec =
            serde_yaml::from_str(&content).map_err(|e| SuiteLoadError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), scenarios = suite.scenarios.len(), "Loaded suite file");
        Ok(suite)
    }
}

fn is_suite_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUITE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use covenant_domain::{Count, ModeSpec};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const USERS_YML: &str = r#"
scenarios:
  - name: users_getAll_OK
    tags: ["@functional"]
    endpoint: users
    checks:
      - mode: is_array_with_min_size
        min: "{{minExpectedAllUsers}}"
      - mode: array_element_equality
        index: 0
        fixture: sampleUser.json
      - mode: node_absent
        path: "[0].city"
"#;

    const USER_YML: &str = r#"
scenarios:
  - name: user_validUserId_OK
    endpoint: user
    path_params: { userId: "{{validUserId}}" }
    checks:
      - mode: full_equality
        fixture: "user_{{validUserId}}.json"
  - name: user_userIdNotFound_NotFound
    endpoint: user
    path_params: { userId: "9999999" }
    expect: { status: 404 }
"#;

    fn loader() -> SuiteLoader {
        SuiteLoader::new(TokioFileSystem::new())
    }

    #[tokio::test]
    async fn test_loads_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.yml");
        std::fs::write(&path, USERS_YML).unwrap();

        let suite = loader().load(&path).await.unwrap();
        let scenario = &suite.scenarios[0];
        assert_eq!(scenario.name, "users_getAll_OK");
        assert_eq!(scenario.tags, vec!["@functional"]);
        assert_eq!(
            scenario.checks[0].mode,
            ModeSpec::IsArrayWithMinSize {
                min: Count::Text("{{minExpectedAllUsers}}".to_string())
            }
        );
        assert_eq!(
            scenario.checks[1].mode,
            ModeSpec::ArrayElementEquality {
                index: Count::Number(0)
            }
        );
        assert_eq!(scenario.checks[1].fixture.as_deref(), Some("sampleUser.json"));
    }

    #[tokio::test]
    async fn test_directory_merges_in_name_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_users.yml"), USERS_YML).unwrap();
        std::fs::write(dir.path().join("a_user.yaml"), USER_YML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a suite").unwrap();

        let suite = loader().load(dir.path()).await.unwrap();
        let names: Vec<_> = suite.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "user_validUserId_OK",
                "user_userIdNotFound_NotFound",
                "users_getAll_OK"
            ]
        );
        assert_eq!(suite.scenarios[1].expect.status, Some(404));
    }

    #[tokio::test]
    async fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            loader().load(dir.path()).await.unwrap_err(),
            SuiteLoadError::Empty(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            loader().load(&dir.path().join("none.yml")).await.unwrap_err(),
            SuiteLoadError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_invalid_suite_reports_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, "scenarios:\n  - endpoint: users\n").unwrap();

        let err = loader().load(&path).await.unwrap_err();
        assert!(matches!(&err, SuiteLoadError::Parse { path: p, .. } if p == &path));
        assert!(err.to_string().contains("name"));
    }
}
