//! Lazy, read-only access to a `composer.lock` file.
//!
//! Nothing touches the runtime until the first accessor call. That call reads
//! and decodes the whole document once; every later accessor answers from the
//! decoded copy. A failed parse is not remembered, the next call tries again.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::{Document, decode_document, json_kind};
use crate::error::{LockError, Result};
use crate::index::PackageIndex;
use crate::options::ReaderOptions;
use crate::package::PackageRecord;
use crate::runtime::{NativeRuntime, Runtime};

const PRODUCTION_KEY: &str = "packages";
const DEVELOPMENT_KEY: &str = "packages-dev";

/// Which package lists [`LockfileReader::packages`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageSelector {
    /// Production packages followed by development packages.
    #[default]
    All,
    /// Only the `packages` list.
    Production,
    /// Only the `packages-dev` list.
    Development,
}

impl PackageSelector {
    pub fn includes_production(self) -> bool {
        matches!(self, Self::All | Self::Production)
    }

    pub fn includes_development(self) -> bool {
        matches!(self, Self::All | Self::Development)
    }
}

/// Reader over one lockfile path.
///
/// The decoded document lives in an unsynchronised cell, so a reader is
/// `!Sync`. Give each thread its own reader.
///
/// Any successful decode is kept, including an empty `{}` document: an empty
/// lockfile is read once, not on every call.
///
/// # Example
///
/// ```
/// use composer_lock::{LockfileReader, MemoryRuntime, PackageSelector};
///
/// let runtime = MemoryRuntime::new().with_file(
///     "composer.lock",
///     r#"{
///         "content-hash": "0237925805aa43707df01262464d6bd8",
///         "packages": [{"name": "psr/log", "version": "3.0.0"}],
///         "packages-dev": [{"name": "phpunit/phpunit", "version": "10.5.0"}]
///     }"#,
/// );
/// let reader = LockfileReader::with_runtime("composer.lock", runtime);
///
/// assert!(!reader.is_parsed());
/// assert_eq!(reader.packages(PackageSelector::All).unwrap().len(), 2);
/// assert_eq!(reader.packages(PackageSelector::Development).unwrap()[0].name(), "phpunit/phpunit");
/// assert!(reader.is_parsed());
/// ```
#[derive(Debug)]
pub struct LockfileReader<R: Runtime = NativeRuntime> {
    path: PathBuf,
    runtime: R,
    options: ReaderOptions,
    document: OnceCell<Document>,
}

impl LockfileReader<NativeRuntime> {
    /// Reader backed by the local filesystem. Does no I/O.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_runtime(path, NativeRuntime)
    }
}

impl<R: Runtime> LockfileReader<R> {
    /// Reader backed by a custom [`Runtime`]. Does no I/O.
    pub fn with_runtime(path: impl Into<PathBuf>, runtime: R) -> Self {
        Self {
            path: path.into(),
            runtime,
            options: ReaderOptions::default(),
            document: OnceCell::new(),
        }
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Whether a parse has already succeeded.
    pub fn is_parsed(&self) -> bool {
        self.document.get().is_some()
    }

    /// The `content-hash` recorded by Composer.
    ///
    /// # Errors
    ///
    /// Any error from the first parse (see [`packages`](Self::packages)).
    pub fn hash(&self) -> Result<Option<&str>> {
        self.str_field("content-hash")
    }

    /// The `minimum-stability` setting (`stable`, `dev`, ...).
    pub fn minimum_stability(&self) -> Result<Option<&str>> {
        self.str_field("minimum-stability")
    }

    pub fn prefer_stable(&self) -> Result<Option<bool>> {
        Ok(self.document()?.get("prefer-stable").and_then(Value::as_bool))
    }

    pub fn prefer_lowest(&self) -> Result<Option<bool>> {
        Ok(self.document()?.get("prefer-lowest").and_then(Value::as_bool))
    }

    pub fn plugin_api_version(&self) -> Result<Option<&str>> {
        self.str_field("plugin-api-version")
    }

    /// Platform requirements (`php`, `ext-*`) of the root package.
    pub fn platform(&self) -> Result<IndexMap<String, String>> {
        self.map_field("platform")
    }

    pub fn platform_dev(&self) -> Result<IndexMap<String, String>> {
        self.map_field("platform-dev")
    }

    /// Per-package stability overrides, as Composer's numeric levels.
    pub fn stability_flags(&self) -> Result<IndexMap<String, u64>> {
        self.map_field("stability-flags")
    }

    /// Build a fresh index of the selected package lists.
    ///
    /// Production entries come first, then development entries, each in
    /// file order. A missing list contributes nothing.
    ///
    /// # Errors
    ///
    /// - `LockError::FileNotReadable` if the path is not a readable file.
    /// - `LockError::TooLarge` if the file exceeds `max_file_size`.
    /// - `LockError::Runtime` if reading fails.
    /// - `LockError::Parse` if the content is not a JSON object.
    /// - `LockError::InvalidField` / `LockError::InvalidPackage` for entries
    ///   of the wrong shape.
    pub fn packages(&self, selector: PackageSelector) -> Result<PackageIndex> {
        let document = self.document()?;
        let mut index = PackageIndex::new();

        if selector.includes_production() {
            collect_entries(document, PRODUCTION_KEY, &mut index)?;
        }
        if selector.includes_development() {
            collect_entries(document, DEVELOPMENT_KEY, &mut index)?;
        }

        Ok(index)
    }

    fn str_field(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.document()?.get(key).and_then(Value::as_str))
    }

    fn map_field<T: DeserializeOwned>(&self, key: &str) -> Result<IndexMap<String, T>> {
        match self.document()?.get(key) {
            None | Some(Value::Null) => Ok(IndexMap::new()),
            Some(Value::Array(items)) if items.is_empty() => Ok(IndexMap::new()),
            Some(value) => {
                IndexMap::<String, T>::deserialize(value).map_err(|e| LockError::InvalidField {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document.get_or_try_init(|| {
            self.parse().inspect_err(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to parse lockfile");
            })
        })
    }

    fn parse(&self) -> Result<Document> {
        let path = self.path.as_path();
        tracing::debug!(path = %path.display(), "Parsing lockfile");

        if !self.runtime.is_readable(path) {
            return Err(LockError::FileNotReadable(path.to_path_buf()));
        }

        let metadata = self.runtime.metadata(path)?;
        if metadata.size > self.options.max_file_size {
            return Err(LockError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.size,
                limit: self.options.max_file_size,
            });
        }

        let bytes = self.runtime.read_file(path)?;
        let document = decode_document(&bytes, self.options.max_depth)?;

        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            packages = entry_count(&document, PRODUCTION_KEY),
            dev_packages = entry_count(&document, DEVELOPMENT_KEY),
            "Parsed lockfile"
        );

        Ok(document)
    }
}

/// Append every entry under `key`. Objects are walked by value, in order.
fn collect_entries(document: &Document, key: &str, index: &mut PackageIndex) -> Result<()> {
    let entries: Box<dyn Iterator<Item = &Value> + '_> = match document.get(key) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(items)) => Box::new(items.iter()),
        Some(Value::Object(map)) => Box::new(map.values()),
        Some(other) => {
            return Err(LockError::InvalidField {
                key: key.to_string(),
                message: format!("expected a list of packages, found {}", json_kind(other)),
            });
        }
    };

    for (position, entry) in entries.enumerate() {
        let record = PackageRecord::from_value(entry.clone()).map_err(|err| match err {
            LockError::InvalidPackage(message) => {
                LockError::InvalidPackage(format!("{key}[{position}]: {message}"))
            }
            other => other,
        })?;
        index.append(record);
    }

    Ok(())
}

fn entry_count(document: &Document, key: &str) -> usize {
    match document.get(key) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}
