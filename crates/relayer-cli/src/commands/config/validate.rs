//! `config validate` subcommand

use abscissa_core::{clap::Parser, Command, Runnable};
use ibc_refresher::config::Diagnostic;

use crate::{conclude::Output, prelude::*};

/// `config validate` subcommand
#[derive(Command, Debug, Parser, PartialEq, Eq)]
pub struct ValidateCmd {}

impl Runnable for ValidateCmd {
    /// Validate the loaded configuration.
    fn run(&self) {
        let Some(path) = crate::config::config_path() else {
            Output::error("no configuration file to validate").exit()
        };

        let config = app_config();
        trace!("loaded configuration: {:#?}", *config);

        // Errors already prevent the application from booting, so only
        // warnings can show up here.
        match config.validate_config() {
            Ok(()) => Output::success_msg(format!(
                "configuration at '{}' is valid",
                path.display()
            ))
            .exit(),
            Err(Diagnostic::Warning(e)) => Output::success_msg(format!(
                "configuration at '{}' is valid, with warning: {}",
                path.display(),
                e
            ))
            .exit(),
            Err(Diagnostic::Error(e)) => Output::error(format!(
                "configuration at '{}' is invalid: {}",
                path.display(),
                e
            ))
            .exit(),
        }
    }
}
