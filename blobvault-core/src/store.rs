// blobvault_core/src/store.rs
use crate::error::Result;

/// Raw byte storage addressed by a `/`-separated logical key.
///
/// Writes are durable once `put` returns. Writing identical bytes to an
/// existing key must be harmless; chunk uploads never check for prior
/// existence.
pub trait ObjectStore: Send + Sync {
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).put(key, data)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).put(key, data)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key)
    }
}
