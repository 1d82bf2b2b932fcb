//! Package records decoded from lockfile entries.
//!
//! A lockfile lists each resolved package as a loosely-typed JSON object.
//! [`PackageRecord::from_value`] turns one such object into an immutable
//! record, filling every absent optional field with its default.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::decode::json_kind;
use crate::error::{LockError, Result};

/// Where the package sources were fetched from (usually a VCS).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub reference: String,
}

impl Source {
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.url.is_empty() && self.reference.is_empty()
    }
}

/// Where the packaged archive was fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dist {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub reference: String,
    #[serde(default, deserialize_with = "lenient")]
    pub shasum: String,
}

impl Dist {
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
            && self.url.is_empty()
            && self.reference.is_empty()
            && self.shasum.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient")]
    pub homepage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// One autoload strategy (`psr-0`, `psr-4`, `classmap`, `files`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoloadRule {
    /// Namespace prefix to path(s), in file order.
    Namespaces(IndexMap<String, AutoloadPaths>),
    /// Bare path list.
    Paths(Vec<String>),
    /// Any other shape, kept verbatim.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoloadPaths {
    One(String),
    Many(Vec<String>),
}

impl AutoloadPaths {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let paths: &[String] = match self {
            Self::One(path) => std::slice::from_ref(path),
            Self::Many(paths) => paths,
        };
        paths.iter().map(String::as_str)
    }
}

/// A resolved package entry. Fields never change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageRecord {
    name: String,
    version: String,
    source: Source,
    dist: Dist,
    require: IndexMap<String, String>,
    require_dev: IndexMap<String, String>,
    suggest: IndexMap<String, String>,
    provide: IndexMap<String, String>,
    replace: IndexMap<String, String>,
    conflict: IndexMap<String, String>,
    #[serde(rename = "type")]
    kind: String,
    extra: Map<String, Value>,
    autoload: IndexMap<String, AutoloadRule>,
    autoload_dev: IndexMap<String, AutoloadRule>,
    bin: Vec<String>,
    notification_url: String,
    license: Vec<String>,
    authors: Vec<Author>,
    description: String,
    homepage: String,
    keywords: Vec<String>,
    support: Map<String, Value>,
    installation_source: Option<String>,
    #[serde(rename = "time")]
    release_time: Option<DateTime<FixedOffset>>,
}

/// Wire shape of a package entry before timestamps are parsed.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default, deserialize_with = "lenient")]
    source: Source,
    #[serde(default, deserialize_with = "lenient")]
    dist: Dist,
    #[serde(default, deserialize_with = "lenient")]
    require: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient")]
    require_dev: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient")]
    suggest: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient")]
    provide: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient")]
    replace: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient")]
    conflict: IndexMap<String, String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: String,
    #[serde(default, deserialize_with = "lenient")]
    extra: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    autoload: IndexMap<String, AutoloadRule>,
    #[serde(default, deserialize_with = "lenient")]
    autoload_dev: IndexMap<String, AutoloadRule>,
    #[serde(default, deserialize_with = "one_or_many")]
    bin: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    notification_url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    license: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    authors: Vec<Author>,
    #[serde(default, deserialize_with = "lenient")]
    description: String,
    #[serde(default, deserialize_with = "lenient")]
    homepage: String,
    #[serde(default, deserialize_with = "lenient")]
    keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    support: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    installation_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    time: Option<String>,
}

/// Absent, `null` and `[]` all mean "use the default".
///
/// PHP encodes an empty map as `[]`, so lockfiles in the wild carry
/// `"extra": []` and similar.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::Array(items) if items.is_empty() => Ok(T::default()),
        other => T::deserialize(other).map_err(D::Error::custom),
    }
}

/// Accepts a single string where a list is expected (`"license": "MIT"`).
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(item) => Ok(vec![item]),
        other => Vec::<String>::deserialize(other).map_err(D::Error::custom),
    }
}

/// Parse a package `time` value.
///
/// Composer writes RFC 3339 (`2020-01-15T12:34:56+00:00`); older lockfiles
/// carry `2013-01-15 12:34:56` without an offset, which is read as UTC.
pub fn parse_release_time(value: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = value.trim();

    let rfc3339 = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(time) => return Ok(time),
        Err(err) => err,
    };

    for format in ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(time) = DateTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().fixed_offset());
    }

    Err(LockError::MalformedTimestamp {
        value: value.to_string(),
        reason: rfc3339.to_string(),
    })
}

impl PackageRecord {
    /// Create a record from one decoded lockfile entry.
    ///
    /// # Errors
    ///
    /// - `LockError::InvalidPackage` if the entry is not an object, lacks a
    ///   string `name` or `version`, or has a field of the wrong shape.
    /// - `LockError::MalformedTimestamp` if `time` is present but unparsable.
    ///
    /// # Example
    ///
    /// ```
    /// use composer_lock::PackageRecord;
    /// use serde_json::json;
    ///
    /// let record = PackageRecord::from_value(json!({
    ///     "name": "monolog/monolog",
    ///     "version": "3.5.0",
    ///     "autoload": {"psr-4": {"Monolog\\": "src/Monolog"}}
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(record.namespace(), "Monolog");
    /// assert!(record.release_time().is_none());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(LockError::InvalidPackage(format!(
                "expected an object, found {}",
                json_kind(&value)
            )));
        }

        let raw: RawPackage =
            serde_json::from_value(value).map_err(|e| LockError::InvalidPackage(e.to_string()))?;

        let release_time = raw.time.as_deref().map(parse_release_time).transpose()?;

        Ok(Self {
            name: raw.name,
            version: raw.version,
            source: raw.source,
            dist: raw.dist,
            require: raw.require,
            require_dev: raw.require_dev,
            suggest: raw.suggest,
            provide: raw.provide,
            replace: raw.replace,
            conflict: raw.conflict,
            kind: raw.kind,
            extra: raw.extra,
            autoload: raw.autoload,
            autoload_dev: raw.autoload_dev,
            bin: raw.bin,
            notification_url: raw.notification_url,
            license: raw.license,
            authors: raw.authors,
            description: raw.description,
            homepage: raw.homepage,
            keywords: raw.keywords,
            support: raw.support,
            installation_source: raw.installation_source,
            release_time,
        })
    }

    /// Start a record in code. Every field other than name and version
    /// starts at its default.
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> PackageBuilder {
        PackageBuilder {
            record: Self {
                name: name.into(),
                version: version.into(),
                source: Source::default(),
                dist: Dist::default(),
                require: IndexMap::new(),
                require_dev: IndexMap::new(),
                suggest: IndexMap::new(),
                provide: IndexMap::new(),
                replace: IndexMap::new(),
                conflict: IndexMap::new(),
                kind: String::new(),
                extra: Map::new(),
                autoload: IndexMap::new(),
                autoload_dev: IndexMap::new(),
                bin: Vec::new(),
                notification_url: String::new(),
                license: Vec::new(),
                authors: Vec::new(),
                description: String::new(),
                homepage: String::new(),
                keywords: Vec::new(),
                support: Map::new(),
                installation_source: None,
                release_time: None,
            },
        }
    }

    /// Package name as registered on Packagist (`vendor/package`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installed version according to the lockfile.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn dist(&self) -> &Dist {
        &self.dist
    }

    /// Runtime requirements: package name to version constraint.
    pub fn require(&self) -> &IndexMap<String, String> {
        &self.require
    }

    /// Development requirements: package name to version constraint.
    pub fn require_dev(&self) -> &IndexMap<String, String> {
        &self.require_dev
    }

    /// Suggested packages: package name to free-text reason.
    pub fn suggest(&self) -> &IndexMap<String, String> {
        &self.suggest
    }

    pub fn provide(&self) -> &IndexMap<String, String> {
        &self.provide
    }

    pub fn replace(&self) -> &IndexMap<String, String> {
        &self.replace
    }

    pub fn conflict(&self) -> &IndexMap<String, String> {
        &self.conflict
    }

    /// Package type, usually `library`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn autoload(&self) -> &IndexMap<String, AutoloadRule> {
        &self.autoload
    }

    pub fn autoload_dev(&self) -> &IndexMap<String, AutoloadRule> {
        &self.autoload_dev
    }

    pub fn bin(&self) -> &[String] {
        &self.bin
    }

    pub fn notification_url(&self) -> &str {
        &self.notification_url
    }

    pub fn license(&self) -> &[String] {
        &self.license
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn homepage(&self) -> &str {
        &self.homepage
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn support(&self) -> &Map<String, Value> {
        &self.support
    }

    pub fn installation_source(&self) -> Option<&str> {
        self.installation_source.as_deref()
    }

    /// Release date of this version, when the entry records one.
    pub fn release_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.release_time.as_ref()
    }

    /// Best-effort PHP namespace of the package.
    ///
    /// Takes the first prefix of the `psr-0` rule, or of `psr-4` when there
    /// is no `psr-0`, with surrounding `\` stripped. A package exposing
    /// several roots reports whichever the lockfile lists first. Returns
    /// `""` when neither rule maps a prefix.
    pub fn namespace(&self) -> &str {
        let rule = self
            .autoload
            .get("psr-0")
            .filter(|rule| !matches!(rule, AutoloadRule::Other(Value::Null)))
            .or_else(|| self.autoload.get("psr-4"));

        let first_prefix = match rule {
            Some(AutoloadRule::Namespaces(prefixes)) => prefixes.keys().next(),
            // A map whose path values have an unexpected shape still names prefixes.
            Some(AutoloadRule::Other(Value::Object(prefixes))) => prefixes.keys().next(),
            _ => None,
        };

        first_prefix
            .map(|prefix| prefix.trim_matches('\\'))
            .unwrap_or("")
    }
}

/// Builder returned by [`PackageRecord::builder`].
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    record: PackageRecord,
}

impl PackageBuilder {
    pub fn source(mut self, source: Source) -> Self {
        self.record.source = source;
        self
    }

    pub fn dist(mut self, dist: Dist) -> Self {
        self.record.dist = dist;
        self
    }

    pub fn require(mut self, package: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.record.require.insert(package.into(), constraint.into());
        self
    }

    pub fn require_dev(mut self, package: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.record
            .require_dev
            .insert(package.into(), constraint.into());
        self
    }

    pub fn suggest(mut self, package: impl Into<String>, reason: impl Into<String>) -> Self {
        self.record.suggest.insert(package.into(), reason.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.record.kind = kind.into();
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.record.extra.insert(key.into(), value);
        self
    }

    pub fn autoload(mut self, strategy: impl Into<String>, rule: AutoloadRule) -> Self {
        self.record.autoload.insert(strategy.into(), rule);
        self
    }

    /// Shorthand for a `psr-4` rule mapping `prefix` to `path`.
    pub fn psr4(mut self, prefix: impl Into<String>, path: impl Into<String>) -> Self {
        let rule = self
            .record
            .autoload
            .entry("psr-4".to_string())
            .or_insert_with(|| AutoloadRule::Namespaces(IndexMap::new()));
        if let AutoloadRule::Namespaces(prefixes) = rule {
            prefixes.insert(prefix.into(), AutoloadPaths::One(path.into()));
        }
        self
    }

    pub fn notification_url(mut self, url: impl Into<String>) -> Self {
        self.record.notification_url = url.into();
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.record.license.push(license.into());
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.record.authors.push(author);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    pub fn homepage(mut self, homepage: impl Into<String>) -> Self {
        self.record.homepage = homepage.into();
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.record.keywords.push(keyword.into());
        self
    }

    pub fn release_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.record.release_time = Some(time);
        self
    }

    pub fn build(self) -> PackageRecord {
        self.record
    }
}
