#![forbid(unsafe_code)]

pub mod error;

pub mod hash {
    pub mod digest;
}

pub mod config;
pub mod domain;

pub mod store;
pub mod store_factory;
pub mod store_fs;
pub mod store_mem;

pub mod chunk;

pub mod catalog;

pub mod archive;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;

// Re-exports: stable API surface
pub use archive::{Archiver, BackupSummary, VerifyReport};
pub use catalog::{Catalog, CatalogIndex, DirListing};
pub use chunk::{ChunkParams, ChunkStore, FileCheck, MAXBLOB};
pub use config::{ArchiveConfig, ObjectStoreConfig};
pub use domain::{ArchiveEntry, EntryRow, IdIssuer};
pub use error::{Result, VaultError};
pub use store::ObjectStore;
