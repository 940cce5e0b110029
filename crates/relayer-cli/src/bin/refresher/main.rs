//! Main entry point for the refresher

#![deny(warnings, missing_docs, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use ibc_refresher_cli::application::APPLICATION;
use ibc_refresher_cli::components::enable_ansi;

fn main() -> eyre::Result<()> {
    install_error_reporter()?;

    abscissa_core::boot(&APPLICATION);
}

fn install_error_reporter() -> eyre::Result<()> {
    if !backtrace_enabled() {
        // Without backtraces, display errors on a single line.
        oneline_eyre::install()
    } else if enable_ansi() {
        color_eyre::install()
    } else {
        Ok(())
    }
}

fn backtrace_enabled() -> bool {
    match std::env::var("RUST_BACKTRACE").as_deref() {
        Ok("" | "0") | Err(_) => false,
        Ok(_) => true,
    }
}
