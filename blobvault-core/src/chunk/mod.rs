pub mod store;
pub mod window;

pub use store::{ChunkStore, FileCheck};
pub use window::{ChunkParams, MAXBLOB};
