use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::catalog::{Catalog, CatalogIndex, DirListing};
use crate::chunk::{ChunkStore, FileCheck};
use crate::config::ArchiveConfig;
use crate::domain::IdIssuer;
use crate::error::Result;
use crate::store_factory::open_store;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub archive_id: i64,
    pub files: u64,
    pub bytes: u64,
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub checked: usize,
    pub failures: Vec<FileCheck>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One session over a named archive. The catalog snapshot is taken when
/// the session opens; later writes only show up after [`Archiver::reload`].
pub struct Archiver {
    name: String,
    catalog: Catalog,
    chunks: ChunkStore,
    index: CatalogIndex,
    ids: IdIssuer,
}

impl Archiver {
    pub fn open(cfg: &ArchiveConfig) -> Result<Self> {
        let catalog = Catalog::open(&cfg.database)?;
        let backend = open_store(&cfg.object_store)?;
        let chunks = ChunkStore::new(backend, &cfg.mirror, cfg.verify_reads);
        Self::new(&cfg.name, catalog, chunks)
    }

    pub fn new(name: &str, catalog: Catalog, chunks: ChunkStore) -> Result<Self> {
        let index = load_index(&catalog, name)?;
        Ok(Self {
            name: name.to_string(),
            catalog,
            chunks,
            index,
            ids: IdIssuer::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog id of the snapshotted archive, if the name was known at open.
    pub fn archive_id(&self) -> Option<i64> {
        self.index.archive_id
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    /// Replace the snapshot with a fresh read of the catalog.
    pub fn reload(&mut self) -> Result<()> {
        self.index = load_index(&self.catalog, &self.name)?;
        Ok(())
    }

    /// Record every regular file under the mirror as a new archive.
    pub fn backup(&mut self) -> Result<BackupSummary> {
        let archive_id = self.catalog.write_archive(&self.name)?;
        let mut summary = BackupSummary {
            archive_id,
            ..Default::default()
        };
        for e in WalkDir::new(self.chunks.mirror()).follow_links(false) {
            let e = e?;
            if !e.file_type().is_file() {
                continue;
            }
            let mut entry = self.chunks.put_file(&self.ids, archive_id, e.path())?;
            self.catalog.write_entry(&mut entry)?;
            info!(libpath = %entry.libpath, size = entry.size, "backed up");
            summary.files += 1;
            summary.bytes += entry.size;
        }
        info!(
            archive = %self.name,
            archive_id,
            files = summary.files,
            bytes = summary.bytes,
            "backup complete"
        );
        Ok(summary)
    }

    /// Rebuild every snapshotted entry under the mirror.
    pub fn restore(&self) -> Result<usize> {
        let mut restored = 0;
        for entry in self.index.iter_entries() {
            info!(libpath = %entry.libpath, "restoring");
            self.chunks.get_file(&entry)?;
            restored += 1;
        }
        Ok(restored)
    }

    pub fn has_blob(&self, digest: &str) -> bool {
        self.index.has_hash(digest)
    }

    pub fn dir(&self, prefix: &str) -> DirListing {
        self.index.dir(prefix)
    }

    /// Check every snapshotted entry against the mirror; keeps going past
    /// failures.
    pub fn verify(&self) -> VerifyReport {
        let entries: Vec<_> = self.index.iter_entries().collect();
        let chunks = &self.chunks;
        let checks: Vec<FileCheck> = entries
            .par_iter()
            .map(|e| chunks.verify_file(e))
            .collect();
        let failures: Vec<FileCheck> = checks.into_iter().filter(|c| !c.ok).collect();
        for f in &failures {
            warn!(libpath = %f.libpath, detail = f.detail.as_deref().unwrap_or(""), "verify failed");
        }
        VerifyReport {
            checked: entries.len(),
            failures,
        }
    }
}

fn load_index(catalog: &Catalog, name: &str) -> Result<CatalogIndex> {
    let index = catalog.read_entries(name)?;
    if index.is_none() {
        info!(archive = name, "no catalog entries yet");
    }
    Ok(index.unwrap_or_else(CatalogIndex::empty))
}
