use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// Chunk bytes, part lengths or file sizes disagree with what was recorded.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Catalog metadata is internally inconsistent.
    #[error("catalog consistency error: {0}")]
    Consistency(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("path {} is outside mirror {}", .path.display(), .mirror.display())]
    OutsideMirror { path: PathBuf, mirror: PathBuf },
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, VaultError>;
