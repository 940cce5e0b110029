//! Cli Subcommands
//!
//! This is where you specify the subcommands of your application.
//!
//! See the `impl Configurable` below for how to specify the path to the
//! application's configuration file.

use std::path::PathBuf;

use abscissa_core::{clap::Parser, Command, Configurable, FrameworkError, Runnable};
use tracing::{error, info};

use crate::DEFAULT_CONFIG_PATH;
use ibc_refresher::config::Config;

use self::{config::ConfigCmd, start::StartCmd, version::VersionCmd};

mod config;
mod start;
mod version;

/// Default configuration file path
pub fn default_config_file() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(DEFAULT_CONFIG_PATH))
}

/// Cli Subcommands
#[derive(Command, Debug, Parser, Runnable)]
pub enum CliCmd {
    /// Validate the refresher configuration file
    #[clap(subcommand)]
    Config(ConfigCmd),

    /// Keep the light clients of both ends of a path fresh
    Start(StartCmd),

    /// Display version information
    Version(VersionCmd),
}

/// This trait allows you to define how application configuration is loaded.
impl Configurable<Config> for CliCmd {
    /// Location of the configuration file
    /// This is called only when the `--config` command-line option is omitted.
    fn config_path(&self) -> Option<PathBuf> {
        match default_config_file() {
            Some(path) if path.exists() => {
                info!("using default configuration from '{}'", path.display());
                Some(path)
            }
            Some(path) => {
                error!("could not find configuration file at '{}'", path.display());
                None
            }
            None => {
                error!(
                    "could not find default configuration file, please create one at '~/{}' \
                     or specify it with the '--config' flag",
                    DEFAULT_CONFIG_PATH
                );
                None
            }
        }
    }

    /// Apply changes to the config after it's been loaded, e.g. overriding
    /// values in a config file using command-line options.
    fn process_config(&self, config: Config) -> Result<Config, FrameworkError> {
        match self {
            CliCmd::Start(cmd) => cmd.override_config(config),
            _ => Ok(config),
        }
    }
}
