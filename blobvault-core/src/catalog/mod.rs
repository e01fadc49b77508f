//! Durable SQLite catalog: archives, their entries, and each entry's
//! ordered chunk digests.

pub mod index;
pub mod schema;

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::domain::{ArchiveEntry, ArchiveRow, EntryRow};
use crate::error::{Result, VaultError};
pub use index::{CatalogIndex, DirListing, HashBuckets};

pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open (creating if needed) the catalog at `path` and bring its schema
    /// up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    VaultError::Config(format!(
                        "bad directory for database {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }
        debug!(database = %path.display(), "opening catalog");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<i64> {
        schema::current_version(&self.conn)
    }

    pub fn write_archive(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO Archive (name) VALUES (?1)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or update `entry` and store its hash rows, all in one
    /// transaction. New entries get their catalog id written back.
    pub fn write_entry(&mut self, entry: &mut ArchiveEntry) -> Result<()> {
        let size = i64::try_from(entry.size).map_err(|_| {
            VaultError::Consistency(format!("{}: size {} too large", entry.libpath, entry.size))
        })?;
        let tx = self.conn.transaction()?;
        let id = if entry.is_persisted() {
            let n = tx.execute(
                "UPDATE ArchiveEntry SET archive_id = ?1, libpath = ?2, size = ?3 WHERE id = ?4",
                params![entry.archive_id, entry.libpath, size, entry.id],
            )?;
            if n == 0 {
                return Err(VaultError::Consistency(format!(
                    "no catalog entry with id {}",
                    entry.id
                )));
            }
            tx.execute(
                "DELETE FROM EntryHashes WHERE archive_entry_id = ?1",
                [entry.id],
            )?;
            entry.id
        } else {
            tx.execute(
                "INSERT INTO ArchiveEntry (archive_id, libpath, size) VALUES (?1, ?2, ?3)",
                params![entry.archive_id, entry.libpath, size],
            )?;
            tx.last_insert_rowid()
        };
        {
            let mut stmt = tx.prepare(
                "INSERT INTO EntryHashes (archive_id, archive_entry_id, seq, hash) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (seq, hash) in entry.hashlist.iter().enumerate() {
                stmt.execute(params![entry.archive_id, id, seq as i64, hash])?;
            }
        }
        tx.commit()?;
        debug!(id, libpath = %entry.libpath, parts = entry.hashlist.len(), "wrote entry");
        entry.id = id;
        Ok(())
    }

    /// Snapshot of the newest archive called `name`, or `None` if there is
    /// no such archive.
    pub fn read_entries(&self, name: &str) -> Result<Option<CatalogIndex>> {
        let archive_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM Archive WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(archive_id) = archive_id else {
            return Ok(None);
        };

        let mut entries = BTreeMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT id, libpath, size FROM ArchiveEntry WHERE archive_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([archive_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        for r in rows {
            let (id, libpath, size) = r?;
            let size = u64::try_from(size).map_err(|_| {
                VaultError::Consistency(format!("entry {id} has negative size {size}"))
            })?;
            entries.insert(id, EntryRow { id, libpath, size });
        }

        let mut ihashes = HashBuckets::default();
        let mut stmt = self.conn.prepare(
            "SELECT archive_entry_id, seq, hash FROM EntryHashes WHERE archive_id = ?1 ORDER BY archive_entry_id, seq",
        )?;
        let rows = stmt.query_map([archive_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for r in rows {
            let (entry_id, seq, hash) = r?;
            ihashes.push(entry_id, seq, hash)?;
        }

        debug!(
            archive = name,
            archive_id,
            entries = entries.len(),
            hashed = ihashes.len(),
            "read catalog"
        );
        Ok(Some(CatalogIndex::new(archive_id, entries, ihashes)))
    }

    /// Remove an entry and all of its hash rows.
    pub fn del_entry(&mut self, entry_id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        // hash rows reference the entry, so they go first
        tx.execute(
            "DELETE FROM EntryHashes WHERE archive_entry_id = ?1",
            [entry_id],
        )?;
        tx.execute("DELETE FROM ArchiveEntry WHERE id = ?1", [entry_id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_archives(&self) -> Result<Vec<ArchiveRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, COUNT(e.id) FROM Archive a \
             LEFT JOIN ArchiveEntry e ON e.archive_id = a.id \
             GROUP BY a.id ORDER BY a.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ArchiveRow {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                entries: row.get::<_, i64>(2)? as u64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
