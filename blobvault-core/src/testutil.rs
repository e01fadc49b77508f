use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chunk::{ChunkParams, ChunkStore};
use crate::store_mem::MemoryStore;

/// Small window so multi-chunk files stay tiny in tests.
pub const TEST_BLOB: usize = 16;

pub fn mem_chunks(mirror: &Path, mem: &Arc<MemoryStore>, verify_reads: bool) -> ChunkStore {
    ChunkStore::with_params(
        Box::new(Arc::clone(mem)),
        mirror,
        verify_reads,
        ChunkParams {
            max_blob: TEST_BLOB,
        },
    )
}

pub fn write_file(root: &Path, rel: &str, data: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, data).unwrap();
    path
}

/// Deterministic, non-repeating-looking bytes.
pub fn patterned(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 31 + seed as usize * 7) % 251) as u8)
        .collect()
}
