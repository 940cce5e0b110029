//! Various components for internal use by the Abscissa subsystem.

use abscissa_core::{Component, FrameworkError, FrameworkErrorKind};
use ibc_refresher::config::{Error, GlobalConfig, LogLevel};
use tracing_subscriber::{filter::EnvFilter, util::SubscriberInitExt, FmtSubscriber};

/// The name of the environment variable through which one can override
/// the tracing filter built in [`build_tracing_filter`].
const REFRESHER_LOG_VAR: &str = "RUST_LOG";

/// A custom component for parametrizing `tracing` in the refresher,
/// emitting JSON-formatted output without coloring.
#[derive(Component, Debug)]
pub struct JsonTracing;

impl JsonTracing {
    /// Creates a new [`JsonTracing`] component
    pub fn new(cfg: GlobalConfig) -> Result<Self, FrameworkError> {
        let filter = build_tracing_filter(cfg.log_level)?;

        // The JSON formatter ignores the ANSI option.
        let builder = FmtSubscriber::builder()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .with_thread_ids(true)
            .json();

        let subscriber = builder.finish();
        subscriber.init();

        Ok(Self)
    }
}

/// A custom component for parametrizing `tracing` in the refresher,
/// pretty-printing to the terminal with coloring when supported.
#[derive(Component, Debug)]
pub struct PrettyTracing;

impl PrettyTracing {
    /// Creates a new [`PrettyTracing`] component
    pub fn new(cfg: GlobalConfig) -> Result<Self, FrameworkError> {
        let filter = build_tracing_filter(cfg.log_level)?;

        let builder = FmtSubscriber::builder()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(enable_ansi())
            .with_thread_ids(true);

        let subscriber = builder.finish();
        subscriber.init();

        Ok(Self)
    }
}

/// Check if both stdout and stderr are proper terminal (tty),
/// so that we know whether or not to enable colored output,
/// using ANSI escape codes. If either is not, eg. because
/// stdout is redirected to a file, we don't enable colored output.
pub fn enable_ansi() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// The crates targeted by the default log level.
const TARGET_CRATES: [&str; 3] = ["ibc_refresher", "ibc_refresher_types", "ibc_refresher_cli"];

/// Build a tracing directive setting the log level for the refresher crates to the
/// given `log_level`.
pub fn default_directive(log_level: LogLevel) -> String {
    use itertools::Itertools;

    TARGET_CRATES
        .iter()
        .map(|&c| format!("{c}={log_level}"))
        .join(",")
}

/// Builds a tracing filter based on the input `log_level`, unless overridden
/// through the `RUST_LOG` environment variable.
/// Returns error if the filter failed to build.
fn build_tracing_filter(default_level: LogLevel) -> Result<EnvFilter, FrameworkError> {
    let directive =
        std::env::var(REFRESHER_LOG_VAR).unwrap_or_else(|_| default_directive(default_level));

    match EnvFilter::try_new(&directive) {
        Ok(out) => Ok(out),
        Err(e) => {
            eprintln!(
                "ERROR: unable to initialize the refresher with log filtering directive {directive:?}: {e}"
            );

            Err(FrameworkErrorKind::ConfigError
                .context(Error::invalid_log_directive(directive, e))
                .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_targets_every_crate() {
        assert_eq!(
            default_directive(LogLevel::Debug),
            "ibc_refresher=debug,ibc_refresher_types=debug,ibc_refresher_cli=debug"
        );
    }
}
