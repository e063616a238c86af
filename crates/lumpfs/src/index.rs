//! Lump index
//!
//! A flat, ordered catalogue of entries from many containers. Records are
//! appended in mount order and lookups prefer the most recently appended
//! match, which is how a patch WAD overrides the lumps of the game it
//! patches.
//!
//! Lookups go through a hash from case-folded path to record positions. The
//! hash is built on first use and dropped whenever the record list changes.

use crate::container::Container;
use crate::entry::{ContainerId, EntryInfo};
use crate::{LUMP_EXTENSION, path};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Ordered catalogue of entries
#[derive(Debug, Default)]
pub struct LumpIndex {
    records: Vec<Arc<EntryInfo>>,
    unique_paths: bool,
    hash: OnceLock<HashMap<String, Vec<usize>>>,
}

impl LumpIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index that keeps one record per path within each
    /// container, the last one
    pub fn with_unique_paths() -> Self {
        Self {
            unique_paths: true,
            ..Self::default()
        }
    }

    /// Check if duplicate paths within a container are pruned
    pub fn has_unique_paths(&self) -> bool {
        self.unique_paths
    }

    /// Append `count` entries of `container` starting at `first`.
    ///
    /// Returns the number of records appended.
    pub fn catalog_lumps<C: Container + ?Sized>(
        &mut self,
        container: &C,
        first: usize,
        count: usize,
    ) -> usize {
        let entries = container.core().entries();
        let end = first.saturating_add(count).min(entries.len());
        if first >= end {
            return 0;
        }

        let batch_start = self.records.len();
        self.records.extend(entries[first..end].iter().cloned());

        if self.unique_paths {
            self.prune_batch_duplicates(batch_start);
        }

        self.invalidate();
        self.records.len() - batch_start
    }

    /// Keep only the last record of each path among those appended since
    /// `batch_start`.
    fn prune_batch_duplicates(&mut self, batch_start: usize) {
        let batch = self.records.split_off(batch_start);
        let mut seen = HashSet::new();
        let mut keep = vec![false; batch.len()];
        for (i, record) in batch.iter().enumerate().rev() {
            keep[i] = seen.insert(path::lookup_key(&record.path));
        }

        self.records.extend(
            batch
                .into_iter()
                .zip(keep)
                .filter_map(|(record, keep)| keep.then_some(record)),
        );
    }

    /// Position of the newest record with this path (case-insensitive).
    ///
    /// The path is normalized but not made absolute; callers resolve it
    /// against the base path first.
    pub fn index_for_path(&self, path: &str) -> Option<usize> {
        self.positions(path).and_then(|positions| positions.last().copied())
    }

    /// Position of the newest record with this lump name.
    ///
    /// A name without an extension is looked up as `NAME.lmp`.
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.index_for_path(&Self::name_key(name))
    }

    /// Positions of every record with this path, newest first
    pub fn find_all(&self, path: &str) -> Vec<usize> {
        self.positions(path)
            .map(|positions| positions.iter().rev().copied().collect())
            .unwrap_or_default()
    }

    /// Positions of every record with this lump name, newest first
    pub fn find_all_by_name(&self, name: &str) -> Vec<usize> {
        self.find_all(&Self::name_key(name))
    }

    /// Remove every record of `container`, keeping the order of the rest.
    ///
    /// Returns the number of records removed.
    pub fn prune_by_file(&mut self, container: ContainerId) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.container != container);
        let removed = before - self.records.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Check if the index holds any record of `container`
    pub fn catalogues(&self, container: ContainerId) -> bool {
        self.records
            .iter()
            .any(|record| record.container == container)
    }

    /// Check if `index` addresses a record
    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.records.len()
    }

    /// Record at a position
    pub fn get(&self, index: usize) -> Option<&Arc<EntryInfo>> {
        self.records.get(index)
    }

    /// Records in index order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntryInfo>> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.records.clear();
        self.invalidate();
    }

    fn name_key(name: &str) -> String {
        if path::extension(name).is_some() {
            name.to_string()
        } else {
            format!("{name}.{LUMP_EXTENSION}")
        }
    }

    fn positions(&self, path: &str) -> Option<&Vec<usize>> {
        self.hash().get(&path::lookup_key(path))
    }

    fn hash(&self) -> &HashMap<String, Vec<usize>> {
        self.hash.get_or_init(|| {
            let mut hash: HashMap<String, Vec<usize>> = HashMap::new();
            for (position, record) in self.records.iter().enumerate() {
                hash.entry(path::lookup_key(&record.path))
                    .or_default()
                    .push(position);
            }
            hash
        })
    }

    fn invalidate(&mut self) {
        self.hash.take();
    }
}
