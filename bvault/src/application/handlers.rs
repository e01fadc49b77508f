use std::path::Path;

use blobvault_core::error::{Result, VaultError};
use blobvault_core::hash::digest::normalize_digest;
use blobvault_core::{ArchiveConfig, Archiver};
use tracing::debug;

use crate::presentation::format::human_readable;

fn open_archiver(config: Option<&Path>, archive: &str, debug: bool) -> Result<Archiver> {
    let cfg = ArchiveConfig::load(config, archive, debug)?;
    debug!(
        archive,
        mirror = %cfg.mirror.display(),
        database = %cfg.database.display(),
        "resolved config"
    );
    Archiver::open(&cfg)
}

pub fn handle_backup(config: Option<&Path>, archive: &str, debug: bool) -> Result<()> {
    let mut arch = open_archiver(config, archive, debug)?;
    let summary = arch.backup()?;
    println!(
        "archive {} (id {}): {} files, {}",
        arch.name(),
        summary.archive_id,
        summary.files,
        human_readable(summary.bytes)
    );
    Ok(())
}

pub fn handle_restore(config: Option<&Path>, archive: &str, debug: bool) -> Result<()> {
    let arch = open_archiver(config, archive, debug)?;
    if arch.archive_id().is_none() {
        return Err(VaultError::Config(format!(
            "no archive named '{archive}' in the catalog"
        )));
    }
    let n = arch.restore()?;
    println!("restored {n} files into {}", arch.chunks().mirror().display());
    Ok(())
}

pub fn handle_ls(config: Option<&Path>, archive: &str, prefix: &str, debug: bool) -> Result<()> {
    let arch = open_archiver(config, archive, debug)?;
    let listing = arch.dir(prefix);
    for row in &listing.files {
        println!("{:>10} {}", human_readable(row.size), row.libpath);
    }
    for dir in &listing.dirs {
        println!("{:>10} {}", "[dir]", dir);
    }
    Ok(())
}

pub fn handle_verify(config: Option<&Path>, archive: &str, debug: bool) -> Result<()> {
    let arch = open_archiver(config, archive, debug)?;
    let report = arch.verify();
    for f in &report.failures {
        println!("FAIL {}: {}", f.libpath, f.detail.as_deref().unwrap_or("unknown"));
    }
    if !report.is_ok() {
        return Err(VaultError::Integrity(format!(
            "{} of {} files failed verification",
            report.failures.len(),
            report.checked
        )));
    }
    eprintln!("verify: OK ({} files)", report.checked);
    Ok(())
}

pub fn handle_has(config: Option<&Path>, archive: &str, digest: &str, debug: bool) -> Result<()> {
    let digest = normalize_digest(digest)?;
    let arch = open_archiver(config, archive, debug)?;
    println!("{}", if arch.has_blob(&digest) { "yes" } else { "no" });
    Ok(())
}

pub fn handle_archives(config: Option<&Path>, archive: &str, debug: bool) -> Result<()> {
    let arch = open_archiver(config, archive, debug)?;
    for row in arch.catalog().list_archives()? {
        println!("{:>6} {:>8} {}", row.id, row.entries, row.name);
    }
    Ok(())
}
