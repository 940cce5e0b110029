//! `config` subcommand

use abscissa_core::{clap::Parser, Command, Runnable};

mod validate;

/// `config` subcommand
#[derive(Command, Debug, Parser, Runnable)]
pub enum ConfigCmd {
    /// Validate the refresher configuration
    Validate(validate::ValidateCmd),
}
