//! Catalog schema versions and the upgrade path between them.
//!
//! `SchemaVersion` holds a single row. A fresh database starts at version 0
//! with no other tables; script `i` in [`MIGRATIONS`] upgrades version `i`
//! to `i + 1`.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Result, VaultError};

pub const TARGET_VERSION: i64 = MIGRATIONS.len() as i64;

pub const MIGRATIONS: &[&str] = &[
    // 0 -> 1
    r#"
CREATE TABLE IF NOT EXISTS Archive (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT
);
CREATE TABLE IF NOT EXISTS ArchiveEntry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    archive_id INTEGER,
    libpath TEXT,
    size INTEGER,
    FOREIGN KEY(archive_id) REFERENCES Archive (id)
);
CREATE TABLE IF NOT EXISTS EntryHashes (
    archive_id INTEGER,
    archive_entry_id INTEGER,
    seq INTEGER,
    hash TEXT,
    FOREIGN KEY(archive_id) REFERENCES Archive (id),
    FOREIGN KEY(archive_entry_id) REFERENCES ArchiveEntry (id)
);
"#,
];

/// Current version, creating and seeding the version table at 0 if needed.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let has_table = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'SchemaVersion'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .is_some();
    if !has_table {
        conn.execute("CREATE TABLE IF NOT EXISTS SchemaVersion (version INTEGER)", [])?;
    }
    let ver = conn
        .query_row("SELECT version FROM SchemaVersion", [], |row| row.get(0))
        .optional()?;
    match ver {
        Some(v) => Ok(v),
        None => {
            conn.execute("INSERT INTO SchemaVersion (version) VALUES (0)", [])?;
            Ok(0)
        }
    }
}

pub fn migrate(conn: &mut Connection) -> Result<i64> {
    migrate_with(conn, MIGRATIONS)
}

/// Apply `scripts[current..]` in order, bumping the stored version after each.
pub fn migrate_with(conn: &mut Connection, scripts: &[&str]) -> Result<i64> {
    let target = scripts.len() as i64;
    let current = current_version(conn)?;
    debug!(current, target, "catalog schema");
    if current > target {
        return Err(VaultError::Consistency(format!(
            "catalog schema version {current} is newer than supported version {target}"
        )));
    }
    if current < 0 {
        return Err(VaultError::Consistency(format!(
            "catalog schema version {current} is invalid"
        )));
    }
    for (from, script) in scripts.iter().enumerate().skip(current as usize) {
        let to = from as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(script)?;
        tx.execute("UPDATE SchemaVersion SET version = ?1", [to])?;
        tx.commit()?;
        info!("migrated catalog schema from version {from} to {to}");
    }
    Ok(target)
}
