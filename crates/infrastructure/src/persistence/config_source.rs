//! File-backed configuration source.
//!
//! Layout under the config directory:
//!
//! ```text
//! application.yml                  profiles, shared base keys, defaults
//! data/<dataset>/test.properties   dataset key/value pairs (UTF-8)
//! data/<dataset>/response/<name>   fixtures (see `FileFixtureSource`)
//! ```
//!
//! Nested YAML maps flatten to dotted keys. For a profile, keys resolve in
//! this order, last wins: `base`, the profile's own map, then
//! `COVENANT_<KEY>` environment overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use covenant_application::ports::{
    ConfigSource, ConfigSourceError, FileSystem, FileSystemError, KeyTable,
};
use java_properties::PropertiesIter;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tokio::sync::OnceCell;
use tracing::debug;

use super::file_system::TokioFileSystem;

/// Name of the main configuration file.
pub const CONFIG_FILE: &str = "application.yml";

/// Name of the per-dataset properties file.
pub const DATASET_FILE: &str = "test.properties";

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "COVENANT_";

/// Keys an environment override may introduce even when no file declares them.
const SERVER_KEYS: [&str; 3] = ["server.scheme", "server.host", "server.port"];

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    default_profile: Option<String>,
    #[serde(default)]
    default_dataset: Option<String>,
    #[serde(default)]
    base: Mapping,
    #[serde(default)]
    profiles: Mapping,
}

/// Reads profiles from `application.yml` and datasets from
/// `data/<name>/test.properties`.
///
/// `application.yml` is parsed once, on first use.
#[derive(Debug)]
pub struct FileConfigSource<F: FileSystem = TokioFileSystem> {
    fs: F,
    root: PathBuf,
    env: BTreeMap<String, String>,
    document: OnceCell<ConfigDocument>,
}

impl FileConfigSource<TokioFileSystem> {
    /// Creates a source rooted at `root` on the real file system.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_system(TokioFileSystem::new(), root)
    }
}

impl<F: FileSystem> FileConfigSource<F> {
    /// Creates a source over a custom file system.
    #[must_use]
    pub fn with_file_system(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            env: BTreeMap::new(),
            document: OnceCell::new(),
        }
    }

    /// Applies `COVENANT_<KEY>` overrides from the given variables, typically
    /// `std::env::vars()`. Other variables are ignored.
    #[must_use]
    pub fn with_env_overrides<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        self
    }

    /// The configuration directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a dataset's files.
    #[must_use]
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join("data").join(dataset)
    }

    async fn document(&self) -> Result<&ConfigDocument, ConfigSourceError> {
        self.document
            .get_or_try_init(|| async {
                let path = self.root.join(CONFIG_FILE);
                let text = self
                    .fs
                    .read_file_string(&path)
                    .await
                    .map_err(|e| unreadable(&path, &e))?;
                let document: ConfigDocument =
                    serde_yaml::from_str(&text).map_err(|e| ConfigSourceError::Parse {
                        location: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                debug!(path = %path.display(), profiles = document.profiles.len(), "Loaded configuration");
                Ok(document)
            })
            .await
    }

    fn apply_env(&self, table: &mut KeyTable) {
        let candidates: Vec<String> = table
            .keys()
            .cloned()
            .chain(SERVER_KEYS.iter().map(ToString::to_string))
            .collect();
        for key in candidates {
            if let Some(value) = self.env.get(&env_name(&key)) {
                debug!(key = %key, "Configuration key overridden from environment");
                table.insert(key, value.clone());
            }
        }
    }
}

#[async_trait]
impl<F: FileSystem> ConfigSource for FileConfigSource<F> {
    async fn profile_names(&self) -> Result<Vec<String>, ConfigSourceError> {
        let document = self.document().await?;
        Ok(document.profiles.keys().filter_map(scalar).collect())
    }

    async fn default_profile(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(self.document().await?.default_profile.clone())
    }

    async fn default_dataset(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(self.document().await?.default_dataset.clone())
    }

    async fn profile(&self, name: &str) -> Result<Option<KeyTable>, ConfigSourceError> {
        let document = self.document().await?;
        let Some(own) = document.profiles.get(name) else {
            return Ok(None);
        };

        let location = self.root.join(CONFIG_FILE);
        let mut table = KeyTable::new();
        flatten("", &Value::Mapping(document.base.clone()), &mut table, &location)?;
        flatten("", own, &mut table, &location)?;
        self.apply_env(&mut table);
        Ok(Some(table))
    }

    async fn dataset(&self, name: &str) -> Result<Option<KeyTable>, ConfigSourceError> {
        let path = self.dataset_dir(name).join(DATASET_FILE);
        let bytes = match self.fs.read_file(&path).await {
            Ok(bytes) => bytes,
            Err(FileSystemError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(unreadable(&path, &e)),
        };

        let mut table = KeyTable::new();
        PropertiesIter::new_with_encoding(bytes.as_slice(), encoding_rs::UTF_8)
            .read_into(|key, value| {
                table.insert(key, value);
            })
            .map_err(|e| ConfigSourceError::Parse {
                location: path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(dataset = %name, keys = table.len(), "Loaded dataset");
        Ok(Some(table))
    }
}

/// `server.host` -> `COVENANT_SERVER_HOST`.
#[must_use]
pub fn env_name(key: &str) -> String {
    let suffix: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{ENV_PREFIX}{suffix}")
}

fn unreadable(path: &Path, error: &FileSystemError) -> ConfigSourceError {
    ConfigSourceError::Unreadable {
        location: path.display().to_string(),
        message: error.to_string(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flatten(
    prefix: &str,
    value: &Value,
    out: &mut KeyTable,
    location: &Path,
) -> Result<(), ConfigSourceError> {
    match value {
        Value::Mapping(map) => {
            for (key, nested) in map {
                let Some(key) = scalar(key) else {
                    return Err(parse_error(location, format!("non-scalar key under '{prefix}'")));
                };
                let full = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&full, nested, out, location)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out, location),
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
            Ok(())
        }
        Value::Sequence(_) => Err(parse_error(
            location,
            format!("lists are not supported (at '{prefix}')"),
        )),
        scalar_value => {
            let text = scalar(scalar_value).unwrap_or_default();
            out.insert(prefix.to_string(), text);
            Ok(())
        }
    }
}

fn parse_error(location: &Path, message: String) -> ConfigSourceError {
    ConfigSourceError::Parse {
        location: location.display().to_string(),
        message,
    }
}
