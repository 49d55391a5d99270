pub mod pair;
pub mod probe;
pub mod profiles;
pub mod scan;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Scan(args) => scan::handle(args).await,
        Command::Probe(args) => probe::handle(args).await,
        Command::Pair(args) => pair::handle(args).await,
        Command::Profiles(args) => profiles::handle(args, &cli.global),
    }
}
