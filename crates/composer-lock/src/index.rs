//! Ordered package collection with lazily built lookup maps.

use std::ops::Index;

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap as HashMap;

use crate::error::{LockError, Result};
use crate::package::PackageRecord;

/// Lookup key to position in the record sequence.
type KeyIndex = HashMap<String, usize>;

/// Append-only sequence of [`PackageRecord`]s, queryable by name and by
/// derived namespace.
///
/// Records keep insertion order and duplicate names are stored as-is. In
/// the lookup maps the last record inserted for a key wins.
///
/// Both maps start unbuilt. The first lookup of each kind builds it from the
/// whole sequence, later lookups reuse it. [`append`](Self::append) updates
/// maps that are already built; [`reset_index`](Self::reset_index) drops
/// them so the next lookup rebuilds.
///
/// # Example
///
/// ```
/// use composer_lock::{PackageIndex, PackageRecord};
///
/// let mut index = PackageIndex::new();
/// index.append(PackageRecord::builder("psr/log", "1.0.0").psr4("Psr\\Log\\", "src/").build());
/// index.append(PackageRecord::builder("psr/log", "3.0.0").psr4("Psr\\Log\\", "src/").build());
///
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.by_name("psr/log").unwrap().version(), "3.0.0");
/// assert!(index.has_namespace("Psr\\Log"));
/// assert!(index.by_name("monolog/monolog").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    records: Vec<PackageRecord>,
    by_name: OnceCell<KeyIndex>,
    by_namespace: OnceCell<KeyIndex>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record at the end of the sequence.
    pub fn append(&mut self, record: PackageRecord) {
        let position = self.records.len();

        if let Some(names) = self.by_name.get_mut() {
            names.insert(record.name().to_string(), position);
        }
        if let Some(namespaces) = self.by_namespace.get_mut() {
            namespaces.insert(record.namespace().to_string(), position);
        }

        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&PackageRecord> {
        self.records.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageRecord> {
        self.records.iter()
    }

    /// Record names in insertion order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(PackageRecord::name)
    }

    pub fn as_slice(&self) -> &[PackageRecord] {
        &self.records
    }

    /// Find a package by name.
    ///
    /// # Errors
    ///
    /// Returns `LockError::NotFound` if no record has that name.
    pub fn by_name(&self, name: &str) -> Result<&PackageRecord> {
        self.name_index()
            .get(name)
            .map(|&position| &self.records[position])
            .ok_or_else(|| LockError::NotFound(name.to_string()))
    }

    /// Find a package by its derived namespace (see
    /// [`PackageRecord::namespace`]).
    ///
    /// # Errors
    ///
    /// Returns `LockError::NotFound` if no record derives that namespace.
    pub fn by_namespace(&self, namespace: &str) -> Result<&PackageRecord> {
        self.namespace_index()
            .get(namespace)
            .map(|&position| &self.records[position])
            .ok_or_else(|| LockError::NotFound(namespace.to_string()))
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name_index().contains_key(name)
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespace_index().contains_key(namespace)
    }

    /// Drop both lookup maps. The stored records are untouched.
    pub fn reset_index(&mut self) {
        tracing::trace!(records = self.records.len(), "Resetting package lookup maps");
        self.by_name.take();
        self.by_namespace.take();
    }

    fn name_index(&self) -> &KeyIndex {
        self.by_name
            .get_or_init(|| build_key_index(&self.records, "name", PackageRecord::name))
    }

    fn namespace_index(&self) -> &KeyIndex {
        self.by_namespace
            .get_or_init(|| build_key_index(&self.records, "namespace", PackageRecord::namespace))
    }
}

/// Later records overwrite earlier ones with the same key.
fn build_key_index(
    records: &[PackageRecord],
    kind: &'static str,
    key: fn(&PackageRecord) -> &str,
) -> KeyIndex {
    tracing::trace!(records = records.len(), kind, "Building package lookup map");

    let mut index = KeyIndex::default();
    for (position, record) in records.iter().enumerate() {
        index.insert(key(record).to_string(), position);
    }
    index
}

impl PartialEq for PackageIndex {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Index<usize> for PackageIndex {
    type Output = PackageRecord;

    fn index(&self, position: usize) -> &PackageRecord {
        &self.records[position]
    }
}

impl<'a> IntoIterator for &'a PackageIndex {
    type Item = &'a PackageRecord;
    type IntoIter = std::slice::Iter<'a, PackageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for PackageIndex {
    type Item = PackageRecord;
    type IntoIter = std::vec::IntoIter<PackageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Extend<PackageRecord> for PackageIndex {
    fn extend<I: IntoIterator<Item = PackageRecord>>(&mut self, iter: I) {
        for record in iter {
            self.append(record);
        }
    }
}

impl FromIterator<PackageRecord> for PackageIndex {
    fn from_iter<I: IntoIterator<Item = PackageRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
