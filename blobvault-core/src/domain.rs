// blobvault_core/src/domain.rs
use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out placeholder ids (`-1, -2, ...`) for entries that the catalog
/// has not assigned a row id yet. Scoped to one archive session.
#[derive(Debug, Default)]
pub struct IdIssuer {
    last: AtomicI64,
}

impl IdIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.last.fetch_sub(1, Ordering::Relaxed) - 1
    }
}

/// One archived file: where it lives under the mirror, how big it is and
/// which chunk digests make it up, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub archive_id: i64,
    pub id: i64,
    pub libpath: String,
    pub size: u64,
    pub hashlist: Vec<String>,
}

impl ArchiveEntry {
    pub fn new(
        ids: &IdIssuer,
        archive_id: i64,
        libpath: String,
        hashlist: Vec<String>,
        size: u64,
    ) -> Self {
        Self {
            archive_id,
            id: ids.next(),
            libpath,
            size,
            hashlist,
        }
    }

    /// Entry rebuilt from catalog rows.
    pub fn persisted(archive_id: i64, row: &EntryRow, hashlist: Vec<String>) -> Self {
        Self {
            archive_id,
            id: row.id,
            libpath: row.libpath.clone(),
            size: row.size,
            hashlist,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id >= 0
    }
}

/// An `ArchiveEntry` row without its hash list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRow {
    pub id: i64,
    pub libpath: String,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveRow {
    pub id: i64,
    pub name: String,
    pub entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_distinct_and_decreasing() {
        let ids = IdIssuer::new();
        let a = ArchiveEntry::new(&ids, 1, "a".into(), vec![], 0);
        let b = ArchiveEntry::new(&ids, 1, "b".into(), vec![], 0);
        assert_eq!(a.id, -1);
        assert_eq!(b.id, -2);
        assert!(!a.is_persisted());
    }

    #[test]
    fn issuers_do_not_share_state() {
        let first = IdIssuer::new();
        first.next();
        first.next();
        assert_eq!(IdIssuer::new().next(), -1);
    }
}
