use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "bvault: deduplicating backup archiver", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $BVAULT_CONFIG, ./config.yaml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk and upload every file under this host's mirror as a new archive
    Backup { archive: String },

    /// Rebuild the mirror from the newest archive with this name
    Restore { archive: String },

    /// List files and subdirectories under a prefix
    Ls {
        archive: String,
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Re-hash mirror files against the catalog
    Verify { archive: String },

    /// Report whether a chunk digest is referenced by the archive
    Has { archive: String, digest: String },

    /// List every archive recorded in the catalog
    Archives {
        /// Archive whose config section supplies the catalog database; not a filter
        archive: String,
    },
}
