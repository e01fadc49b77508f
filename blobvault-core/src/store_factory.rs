use crate::config::ObjectStoreConfig;
use crate::error::Result;
use crate::store::ObjectStore;
use crate::store_fs::FsObjectStore;

pub fn open_store(cfg: &ObjectStoreConfig) -> Result<Box<dyn ObjectStore>> {
    match cfg {
        ObjectStoreConfig::Fs { root } => Ok(Box::new(FsObjectStore::new(root)?)),
    }
}
