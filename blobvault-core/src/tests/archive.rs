use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::archive::Archiver;
use crate::catalog::Catalog;
use crate::hash::digest::blob_digest;
use crate::store_mem::MemoryStore;
use crate::testutil::{TEST_BLOB, mem_chunks, patterned, write_file};

struct Fixture {
    _dir: tempfile::TempDir,
    mirror: std::path::PathBuf,
    db: std::path::PathBuf,
    mem: Arc<MemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        fs::create_dir_all(&mirror).unwrap();
        let db = dir.path().join("catalog.db");
        Self {
            mirror,
            db,
            mem: Arc::new(MemoryStore::new()),
            _dir: dir,
        }
    }

    fn archiver(&self, name: &str) -> Archiver {
        let catalog = Catalog::open(&self.db).unwrap();
        Archiver::new(name, catalog, mem_chunks(&self.mirror, &self.mem, true)).unwrap()
    }

    fn populate(&self) -> Vec<(&'static str, Vec<u8>)> {
        let files = vec![
            ("top.txt", patterned(5, 1)),
            ("docs/a.bin", patterned(TEST_BLOB * 2, 2)),
            ("docs/b.bin", patterned(TEST_BLOB * 2 + 3, 3)),
            ("docs/deep/c.bin", patterned(7, 4)),
            ("empty", Vec::new()),
        ];
        for (rel, data) in &files {
            write_file(&self.mirror, rel, data);
        }
        files
    }
}

fn wipe(mirror: &Path) {
    for e in fs::read_dir(mirror).unwrap() {
        let p = e.unwrap().path();
        if p.is_dir() {
            fs::remove_dir_all(p).unwrap();
        } else {
            fs::remove_file(p).unwrap();
        }
    }
}

#[test]
fn backup_leaves_open_snapshot_untouched() {
    let fx = Fixture::new();
    fx.populate();
    let mut arch = fx.archiver("docs");
    assert!(arch.archive_id().is_none());

    let summary = arch.backup().unwrap();
    assert_eq!(summary.files, 5);
    assert!(arch.index().entries.is_empty());
    assert_eq!(arch.restore().unwrap(), 0);

    arch.reload().unwrap();
    assert_eq!(arch.archive_id(), Some(summary.archive_id));
    assert_eq!(arch.index().entries.len(), 5);
}

#[test]
fn restore_after_reload_rebuilds_every_file() {
    let fx = Fixture::new();
    let files = fx.populate();
    let mut arch = fx.archiver("docs");
    let summary = arch.backup().unwrap();
    let total: u64 = files.iter().map(|(_, d)| d.len() as u64).sum();
    assert_eq!(summary.bytes, total);

    arch.reload().unwrap();
    wipe(&fx.mirror);
    assert_eq!(arch.restore().unwrap(), files.len());
    for (rel, data) in &files {
        assert_eq!(&fs::read(fx.mirror.join(rel)).unwrap(), data, "{rel}");
    }
}

#[test]
fn new_session_sees_previous_backup() {
    let fx = Fixture::new();
    fx.populate();
    fx.archiver("docs").backup().unwrap();

    let arch = fx.archiver("docs");
    assert_eq!(arch.index().entries.len(), 5);
    assert!(arch.has_blob(&blob_digest(&patterned(7, 4))));
}

#[test]
fn has_blob_only_after_reload() {
    let fx = Fixture::new();
    fx.populate();
    let mut arch = fx.archiver("docs");
    let head = blob_digest(&patterned(TEST_BLOB * 2, 2)[..TEST_BLOB]);

    arch.backup().unwrap();
    assert!(!arch.has_blob(&head));
    arch.reload().unwrap();
    assert!(arch.has_blob(&head));
    assert!(!arch.has_blob(&blob_digest(b"not in archive")));
}

#[test]
fn dir_lists_backed_up_tree() {
    let fx = Fixture::new();
    fx.populate();
    let mut arch = fx.archiver("docs");
    arch.backup().unwrap();
    arch.reload().unwrap();

    let root = arch.dir("");
    let mut files: Vec<_> = root.files.iter().map(|r| r.libpath.as_str()).collect();
    files.sort();
    assert_eq!(files, ["empty", "top.txt"]);
    assert_eq!(root.dirs, ["docs"]);

    let docs = arch.dir("docs");
    let mut files: Vec<_> = docs.files.iter().map(|r| r.libpath.as_str()).collect();
    files.sort();
    assert_eq!(files, ["docs/a.bin", "docs/b.bin"]);
    assert_eq!(docs.dirs, ["docs/deep"]);
}

#[test]
fn second_backup_gets_new_archive_and_reuploads() {
    let fx = Fixture::new();
    fx.populate();
    let mut arch = fx.archiver("docs");
    let first = arch.backup().unwrap();
    let puts = fx.mem.put_count();
    let objects = fx.mem.len();

    let second = arch.backup().unwrap();
    assert_ne!(first.archive_id, second.archive_id);
    assert_eq!(fx.mem.put_count(), puts * 2);
    assert_eq!(fx.mem.len(), objects);

    arch.reload().unwrap();
    assert_eq!(arch.archive_id(), Some(second.archive_id));
    let rows = arch.catalog().list_archives().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.name == "docs" && r.entries == 5));
}

#[test]
fn verify_reports_modified_file() {
    let fx = Fixture::new();
    fx.populate();
    let mut arch = fx.archiver("docs");
    arch.backup().unwrap();
    arch.reload().unwrap();

    let report = arch.verify();
    assert!(report.is_ok(), "{:?}", report.failures);
    assert_eq!(report.checked, 5);

    let mut changed = patterned(TEST_BLOB * 2 + 3, 3);
    changed[0] ^= 0x55;
    fs::write(fx.mirror.join("docs/b.bin"), changed).unwrap();
    let report = arch.verify();
    assert_eq!(report.checked, 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].libpath, "docs/b.bin");
}

#[test]
fn backup_of_missing_mirror_fails() {
    let fx = Fixture::new();
    fs::remove_dir_all(&fx.mirror).unwrap();
    let mut arch = fx.archiver("docs");
    assert!(arch.backup().is_err());
}
