use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::window::{ChunkParams, read_window};
use crate::domain::{ArchiveEntry, IdIssuer};
use crate::error::{Result, VaultError};
use crate::hash::digest::{blob_digest, object_key};
use crate::store::ObjectStore;

/// Outcome of checking one on-disk file against its catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileCheck {
    pub libpath: String,
    pub ok: bool,
    pub detail: Option<String>,
}

/// Splits mirror files into content-addressed chunks and puts them back
/// together.
pub struct ChunkStore {
    backend: Box<dyn ObjectStore>,
    mirror: PathBuf,
    verify_reads: bool,
    params: ChunkParams,
}

impl ChunkStore {
    pub fn new(backend: Box<dyn ObjectStore>, mirror: &Path, verify_reads: bool) -> Self {
        Self::with_params(backend, mirror, verify_reads, ChunkParams::default())
    }

    pub fn with_params(
        backend: Box<dyn ObjectStore>,
        mirror: &Path,
        verify_reads: bool,
        params: ChunkParams,
    ) -> Self {
        Self {
            backend,
            mirror: mirror.to_path_buf(),
            verify_reads,
            params,
        }
    }

    pub fn mirror(&self) -> &Path {
        &self.mirror
    }

    pub fn params(&self) -> ChunkParams {
        self.params
    }

    /// Store one chunk under its digest and return the digest. Always writes.
    pub fn put_blob(&self, blob: &[u8]) -> Result<String> {
        let digest = blob_digest(blob);
        let key = object_key(&digest)?;
        debug!(%key, len = blob.len(), "put blob");
        self.backend.put(&key, blob)?;
        Ok(digest)
    }

    pub fn get_blob(&self, digest: &str) -> Result<Vec<u8>> {
        let key = object_key(digest)?;
        let buf = self.backend.get(&key)?;
        if self.verify_reads {
            let got = blob_digest(&buf);
            if got != digest {
                return Err(VaultError::Integrity(format!(
                    "blob {digest} read back with digest {got}"
                )));
            }
        }
        Ok(buf)
    }

    /// Chunk and upload `path`, which must live under the mirror. The
    /// returned entry carries a placeholder id and is not yet in the catalog.
    pub fn put_file(&self, ids: &IdIssuer, archive_id: i64, path: &Path) -> Result<ArchiveEntry> {
        let libpath = self.libpath_for(path)?;
        let mut f = BufReader::new(File::open(path)?);
        let mut buf = Vec::new();
        let mut hashlist = Vec::new();
        let mut size = 0u64;
        loop {
            let n = read_window(&mut f, self.params.max_blob, &mut buf)?;
            if n == 0 {
                break;
            }
            hashlist.push(self.put_blob(&buf)?);
            size += n as u64;
        }
        Ok(ArchiveEntry::new(ids, archive_id, libpath, hashlist, size))
    }

    /// Rebuild the file for `entry` under the mirror.
    pub fn get_file(&self, entry: &ArchiveEntry) -> Result<()> {
        let path = self.local_path(&entry.libpath)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&path)?;
        if entry.size == 0 {
            return Ok(());
        }

        let nparts = self.params.part_count(entry.size);
        if entry.hashlist.len() != nparts {
            return Err(VaultError::Consistency(format!(
                "{}: {} bytes need {} parts, catalog lists {}",
                entry.libpath,
                entry.size,
                nparts,
                entry.hashlist.len()
            )));
        }

        let mut total = 0u64;
        for (part, digest) in entry.hashlist.iter().enumerate() {
            let buf = self.get_blob(digest)?;
            let want = self.params.part_len(entry.size, part);
            if part + 1 < nparts && buf.len() != want {
                return Err(VaultError::Integrity(format!(
                    "{} part {part}: expected {want} bytes, got {}",
                    entry.libpath,
                    buf.len()
                )));
            }
            out.write_all(&buf)?;
            total += buf.len() as u64;
        }
        out.flush()?;

        if total != entry.size {
            return Err(VaultError::Integrity(format!(
                "{}: wrote {total} bytes, expected {}",
                entry.libpath, entry.size
            )));
        }
        Ok(())
    }

    /// Compare the on-disk copy of `entry` with its recorded chunks. Never
    /// fails; problems land in `FileCheck::detail`.
    pub fn verify_file(&self, entry: &ArchiveEntry) -> FileCheck {
        let problem = match self.check_file(entry) {
            Ok(problem) => problem,
            Err(e) => Some(e.to_string()),
        };
        FileCheck {
            libpath: entry.libpath.clone(),
            ok: problem.is_none(),
            detail: problem,
        }
    }

    fn check_file(&self, entry: &ArchiveEntry) -> Result<Option<String>> {
        let path = self.local_path(&entry.libpath)?;
        let file = File::open(&path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Ok(Some(format!("{} is not a regular file", path.display())));
        }
        let on_disk = meta.len();
        if entry.size == 0 {
            return Ok((on_disk != 0)
                .then(|| format!("size mismatch {}: expected 0, got {on_disk}", path.display())));
        }
        if on_disk != entry.size {
            return Ok(Some(format!(
                "size mismatch {}: expected {}, got {on_disk}",
                path.display(),
                entry.size
            )));
        }

        let nparts = self.params.part_count(entry.size);
        if entry.hashlist.len() != nparts {
            return Ok(Some(format!(
                "{}: {} parts recorded, size implies {nparts}",
                path.display(),
                entry.hashlist.len()
            )));
        }

        let mut f = BufReader::new(file);
        let mut buf = Vec::new();
        let mut total = 0u64;
        for (part, expected) in entry.hashlist.iter().enumerate() {
            let n = read_window(&mut f, self.params.max_blob, &mut buf)?;
            if part + 1 < nparts && n != self.params.max_blob {
                return Ok(Some(format!(
                    "{} part {part}: short read of {n} bytes",
                    path.display()
                )));
            }
            let got = blob_digest(&buf);
            if &got != expected {
                return Ok(Some(format!(
                    "hash mismatch {} part {part}: expected {expected}, got {got}",
                    path.display()
                )));
            }
            total += n as u64;
        }
        if total != entry.size {
            return Ok(Some(format!(
                "size mismatch {}: expected {}, got {total}",
                path.display(),
                entry.size
            )));
        }
        Ok(None)
    }

    /// Mirror-relative, `/`-separated path for a file under the mirror.
    pub fn libpath_for(&self, path: &Path) -> Result<String> {
        let outside = || VaultError::OutsideMirror {
            path: path.to_path_buf(),
            mirror: self.mirror.clone(),
        };
        let rel = path.strip_prefix(&self.mirror).map_err(|_| outside())?;
        let mut parts = Vec::new();
        for c in rel.components() {
            match c {
                Component::Normal(s) => parts.push(
                    s.to_str()
                        .ok_or_else(|| VaultError::NonUtf8Path(path.to_path_buf()))?,
                ),
                _ => return Err(outside()),
            }
        }
        if parts.is_empty() {
            return Err(outside());
        }
        Ok(parts.join("/"))
    }

    /// Absolute path under the mirror for a catalog `libpath`.
    pub fn local_path(&self, libpath: &str) -> Result<PathBuf> {
        let mut path = self.mirror.clone();
        for seg in libpath.split('/').filter(|s| !s.is_empty()) {
            if seg == "." || seg == ".." {
                return Err(VaultError::Consistency(format!("unsafe libpath: {libpath}")));
            }
            path.push(seg);
        }
        if path == self.mirror {
            return Err(VaultError::Consistency(format!("empty libpath: {libpath:?}")));
        }
        Ok(path)
    }
}
