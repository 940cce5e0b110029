//! Cli Config
//!
//! See instructions in `commands.rs` to specify the path to your
//! application's configuration file and/or command-line options
//! for specifying it.

use std::path::PathBuf;

pub use ibc_refresher::config::Config;

use crate::prelude::app_reader;

/// Path of the configuration file the application was started with,
/// if any was loaded.
pub fn config_path() -> Option<PathBuf> {
    app_reader().config_path().cloned()
}
