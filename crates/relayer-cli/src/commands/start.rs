use core::time::Duration;
use std::io;

use abscissa_core::{clap::Parser, Command, FrameworkError, FrameworkErrorKind, Runnable};
use crossbeam_channel::Sender;
use ibc_refresher::{
    config::Config,
    supervisor::{spawn_relay, RelayOptions, SupervisorCmd},
};
use ibc_refresher_types::identifier::ChainId;

use crate::{
    conclude::{json, Output},
    prelude::*,
};

/// `start` subcommand
#[derive(Clone, Command, Debug, Parser, PartialEq, Eq)]
pub struct StartCmd {
    #[clap(
        long = "src",
        value_name = "CHAIN_ID",
        value_parser,
        default_value = "ibc-0",
        help = "Identifier of the source chain"
    )]
    src_chain_id: ChainId,

    #[clap(
        long = "dst",
        value_name = "CHAIN_ID",
        value_parser,
        default_value = "ibc-1",
        help = "Identifier of the destination chain"
    )]
    dst_chain_id: ChainId,

    #[clap(
        long = "path",
        value_name = "PATH_NAME",
        default_value = "ibc0ibc1",
        help = "Name of the configured path connecting both chains"
    )]
    path: String,

    #[clap(
        long = "refresh-interval",
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        help = "Time between two updates of the same client, eg. '2m' or '90s'. \
                Overrides the refresh interval of the configuration"
    )]
    refresh_interval: Option<Duration>,
}

impl StartCmd {
    /// Apply the `--refresh-interval` override, so that it goes through
    /// the same validation as the configured value.
    pub fn override_config(&self, mut config: Config) -> Result<Config, FrameworkError> {
        if let Some(interval) = self.refresh_interval {
            if interval.is_zero() {
                return Err(FrameworkErrorKind::ConfigError
                    .context("the refresh interval must be greater than zero")
                    .into());
            }

            config.relay.refresh_interval = interval;
        }

        Ok(config)
    }

    fn options(&self) -> RelayOptions {
        RelayOptions {
            src: self.src_chain_id.clone(),
            dst: self.dst_chain_id.clone(),
            path: self.path.clone(),
            refresh_interval: self.refresh_interval,
        }
    }
}

impl Runnable for StartCmd {
    fn run(&self) {
        let config = (*app_config()).clone();

        let handle = spawn_relay(&config, self.options()).unwrap_or_else(|e| {
            Output::error(format!("refresher failed to start, last error: {e}")).exit()
        });

        register_signals(handle.sender.clone()).unwrap_or_else(|e| {
            warn!("failed to install signal handler: {}", e);
        });

        info!(
            "refresher has started, relaying between {} and {} over path {}",
            self.src_chain_id, self.dst_chain_id, self.path
        );

        handle.wait();

        Output::success_msg("refresher stopped").exit()
    }
}

/// Register the SIGINT, SIGTERM and SIGUSR1 signals, and notify the supervisor.
/// - SIGINT, SIGTERM: stop both directors and exit.
/// - SIGUSR1: ask the supervisor for its cycle counters and print them to the console.
fn register_signals(tx_cmd: Sender<SupervisorCmd>) -> Result<(), io::Error> {
    use signal_hook::{consts::signal::*, iterator::Signals};

    let sigs = vec![
        SIGINT,  // Stop
        SIGTERM, // Stop
        SIGUSR1, // Dump stats
    ];

    let mut signals = Signals::new(sigs)?;

    std::thread::spawn(move || {
        for signal in &mut signals {
            match signal {
                SIGINT | SIGTERM => {
                    info!("shutting down (triggered by signal {})", signal);

                    if tx_cmd.send(SupervisorCmd::Stop).is_err() {
                        warn!("supervisor is already stopped");
                    }

                    break;
                }

                SIGUSR1 => {
                    info!("dumping stats (triggered by SIGUSR1)");

                    let (tx, rx) = crossbeam_channel::bounded(1);

                    if tx_cmd.try_send(SupervisorCmd::DumpStats(tx)).is_err() {
                        warn!("supervisor is not accepting commands, cannot dump stats");
                        continue;
                    }

                    std::thread::spawn(move || {
                        if let Ok(stats) = rx.recv() {
                            if json() {
                                match serde_json::to_string(&stats) {
                                    Ok(out) => println!("{out}"),
                                    Err(e) => {
                                        error!("failed to serialize relay stats to JSON: {}", e)
                                    }
                                }
                            } else {
                                println!("{stats}");
                            }
                        }
                    });
                }

                _ => (),
            }
        }
    });

    Ok(())
}
