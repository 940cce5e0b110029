//! `version` subcommand

use abscissa_core::{clap::Parser, Command, Runnable};

use super::CliCmd;

/// `version` subcommand
///
/// Same output as the `--version` flag handled by clap, but usable
/// without a configuration file.
#[derive(Command, Debug, Default, Parser)]
#[clap(hide = true)]
pub struct VersionCmd {}

impl Runnable for VersionCmd {
    /// Print version message
    fn run(&self) {
        println!("{} {}", CliCmd::name(), clap::crate_version!());
    }
}
