//! larder-cli: command-line front end for the Larder backend.
//!
//! Reads go through the entity caches, writes call the backend and patch
//! the caches in place, and every command settles pending cross-store
//! invalidations before exiting.
#![deny(clippy::all)]

mod args;
mod context;
mod handlers;
mod print;

use clap::Parser;

use args::{Cli, Commands};
use context::{CliError, Ctx};
use handlers::{auth, catalog, costs, export, menu, menus, week};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = Ctx::build(&cli)?;

    match cli.command {
        Commands::Auth(cmd) => auth::handle(&ctx, cmd.action).await?,
        Commands::Catalog(cmd) => catalog::handle(&ctx, cmd.action).await?,
        Commands::Menus(cmd) => menus::handle(&ctx, cmd.action).await?,
        Commands::Menu(cmd) => menu::handle(&ctx, cmd.action).await?,
        Commands::Week(cmd) => week::handle(&ctx, cmd.action).await?,
        Commands::Export(cmd) => export::handle(&ctx, cmd.action).await?,
        Commands::Costs(cmd) => costs::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
