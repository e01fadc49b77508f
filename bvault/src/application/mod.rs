pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use blobvault_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Backup { archive } => handlers::handle_backup(config, &archive, cli.debug),
        Commands::Restore { archive } => handlers::handle_restore(config, &archive, cli.debug),
        Commands::Ls { archive, prefix } => {
            handlers::handle_ls(config, &archive, &prefix, cli.debug)
        }
        Commands::Verify { archive } => handlers::handle_verify(config, &archive, cli.debug),
        Commands::Has { archive, digest } => {
            handlers::handle_has(config, &archive, &digest, cli.debug)
        }
        Commands::Archives { archive } => handlers::handle_archives(config, &archive, cli.debug),
    }
}
