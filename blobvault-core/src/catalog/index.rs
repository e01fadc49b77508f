use std::collections::{BTreeMap, HashSet};

use crate::domain::{ArchiveEntry, EntryRow};
use crate::error::{Result, VaultError};

/// Chunk digests per entry id, in sequence order.
#[derive(Clone, Debug, Default)]
pub struct HashBuckets {
    data: BTreeMap<i64, Vec<String>>,
}

impl HashBuckets {
    /// Append `hash` to the bucket for `entry_id`; `seq` must be the next
    /// position in that bucket.
    pub fn push(&mut self, entry_id: i64, seq: i64, hash: String) -> Result<()> {
        let bucket = self.data.entry(entry_id).or_default();
        bucket.push(hash);
        if bucket.len() as i64 != seq + 1 {
            return Err(VaultError::Consistency(format!(
                "entry {entry_id}: hash row seq {seq} found at position {}",
                bucket.len() - 1
            )));
        }
        Ok(())
    }

    pub fn get(&self, entry_id: i64) -> Option<&[String]> {
        self.data.get(&entry_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &Vec<String>)> {
        self.data.iter()
    }
}

/// Result of [`CatalogIndex::dir`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<EntryRow>,
    pub dirs: Vec<String>,
}

/// Read-only snapshot of one archive, taken when the catalog is read.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    pub archive_id: Option<i64>,
    pub entries: BTreeMap<i64, EntryRow>,
    pub ihashes: HashBuckets,
    pub all_hashes: HashSet<String>,
}

impl CatalogIndex {
    /// Snapshot for an archive name the catalog has never seen.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(archive_id: i64, entries: BTreeMap<i64, EntryRow>, ihashes: HashBuckets) -> Self {
        let all_hashes = ihashes
            .iter()
            .flat_map(|(_, hashes)| hashes.iter().cloned())
            .collect();
        Self {
            archive_id: Some(archive_id),
            entries,
            ihashes,
            all_hashes,
        }
    }

    pub fn has_hash(&self, digest: &str) -> bool {
        self.all_hashes.contains(digest)
    }

    /// Full entry view (row plus ordered digests) for `entry_id`.
    pub fn entry(&self, entry_id: i64) -> Option<ArchiveEntry> {
        let row = self.entries.get(&entry_id)?;
        let hashes = self.ihashes.get(entry_id).unwrap_or_default().to_vec();
        Some(ArchiveEntry::persisted(
            self.archive_id.unwrap_or(-1),
            row,
            hashes,
        ))
    }

    pub fn iter_entries(&self) -> impl Iterator<Item = ArchiveEntry> + '_ {
        self.entries.keys().filter_map(|id| self.entry(*id))
    }

    /// Files directly under `prefix` and the distinct child directories
    /// below it. Scans every entry.
    pub fn dir(&self, prefix: &str) -> DirListing {
        let mut prefix = prefix.to_string();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        let depth = prefix.matches('/').count();

        let mut out = DirListing::default();
        for row in self.entries.values() {
            let lpath = row.libpath.as_str();
            if !lpath.starts_with(&prefix) {
                continue;
            }
            if lpath.matches('/').count() == depth {
                out.files.push(row.clone());
            } else if let Some(off) = lpath[prefix.len()..].find('/') {
                let ldir = &lpath[..prefix.len() + off];
                if !out.dirs.iter().any(|d| d == ldir) {
                    out.dirs.push(ldir.to_string());
                }
            }
        }
        out
    }
}
