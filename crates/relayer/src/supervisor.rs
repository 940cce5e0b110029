//! Starts and stops the two directors relaying over a path, one per direction.

use core::{
    fmt::{Display, Error as FmtError, Formatter},
    time::Duration,
};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, error_span, info, warn};

use ibc_refresher_types::identifier::ChainId;

use crate::{
    broadcast::RetryPolicy,
    chain::handle::{BaseChainHandle, ChainHandle},
    config::{Config, Error as ConfigError},
    director::{CycleStats, CycleStatsSnapshot, Director},
    schedule::RefreshSchedule,
    spawn::spawn_chain_runtime,
    util::task::TaskHandle,
    worker::spawn_director_worker,
};

pub mod error;
pub use error::Error;

/// What to relay, as selected on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOptions {
    pub src: ChainId,
    pub dst: ChainId,
    /// Name of the path in the configuration.
    pub path: String,
    /// Overrides the refresh interval of the configuration.
    pub refresh_interval: Option<Duration>,
}

/// Commands accepted by a running supervisor.
#[derive(Clone, Debug)]
pub enum SupervisorCmd {
    /// Stop both directors and the chain runtimes.
    Stop,

    /// Report the cycle counters of both directors.
    DumpStats(Sender<RelayStats>),
}

/// Cycle counters of both directions of the relayed path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    /// Updates of the client hosted on the source chain.
    pub forward: CycleStatsSnapshot,
    /// Updates of the client hosted on the destination chain.
    pub backward: CycleStatsSnapshot,
}

impl Display for RelayStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "forward: [{}], backward: [{}]", self.forward, self.backward)
    }
}

/// A handle to the running directors.
pub struct SupervisorHandle {
    pub sender: Sender<SupervisorCmd>,
    receiver: Receiver<SupervisorCmd>,
    chains: Vec<BaseChainHandle>,
    workers: Vec<TaskHandle>,
    forward: Arc<CycleStats>,
    backward: Arc<CycleStats>,
}

impl SupervisorHandle {
    pub fn stats(&self) -> RelayStats {
        RelayStats {
            forward: self.forward.snapshot(),
            backward: self.backward.snapshot(),
        }
    }

    /// Block until a [`SupervisorCmd::Stop`] is received, then shut everything down.
    pub fn wait(self) {
        loop {
            match self.receiver.recv() {
                Ok(SupervisorCmd::Stop) | Err(_) => break,
                Ok(SupervisorCmd::DumpStats(reply_to)) => {
                    let _ = reply_to.try_send(self.stats());
                }
            }
        }

        self.shutdown();
    }

    /// Stop both directors, then the chain runtimes.
    pub fn shutdown(self) {
        info!("shutting down relay");

        for worker in &self.workers {
            worker.shutdown();
        }

        for worker in self.workers {
            worker.join();
        }

        for chain in &self.chains {
            if let Err(e) = chain.shutdown() {
                warn!(chain = %chain.id(), "failed to shut down chain runtime: {}", e);
            }
        }

        let stats = RelayStats {
            forward: self.forward.snapshot(),
            backward: self.backward.snapshot(),
        };

        debug!("relay stopped, {}", stats);
    }
}

/// Spawn the runtimes of the two chains and one director per direction of
/// the configured path connecting them.
///
/// The path is registered on both chains before any director starts. Any
/// failure up to that point is returned and nothing keeps running.
pub fn spawn_relay(config: &Config, options: RelayOptions) -> Result<SupervisorHandle, Error> {
    let _span = error_span!("spawn_relay", path = %options.path).entered();

    for chain_id in [&options.src, &options.dst] {
        if config.find_chain(chain_id).is_none() {
            return Err(Error::unknown_chain(chain_id.clone()));
        }
    }

    if options.src == options.dst {
        return Err(Error::same_chain(options.src));
    }

    let path = config
        .find_path(&options.path)
        .ok_or_else(|| Error::unknown_path(options.path.clone()))?;

    if !path.connects(&options.src, &options.dst) {
        return Err(Error::path_does_not_connect(
            options.path,
            options.src,
            options.dst,
        ));
    }

    let refresh_interval = options
        .refresh_interval
        .unwrap_or(config.relay.refresh_interval);

    if refresh_interval.is_zero() {
        return Err(Error::config(ConfigError::zero_refresh_interval()));
    }

    if config.relay.retry.max_attempts == 0 {
        return Err(Error::config(ConfigError::zero_retry_attempts()));
    }

    if let Err(e) = config.validate_refresh_interval(refresh_interval) {
        warn!("{}", e);
    }

    let src = spawn_chain_runtime(config, &options.src).map_err(Error::spawn)?;
    let dst = spawn_chain_runtime(config, &options.dst).map_err(Error::spawn)?;

    let schedule = RefreshSchedule::new(refresh_interval);
    let retry = RetryPolicy::from_config(&config.relay.retry);

    let forward = Director::new(src.clone(), dst.clone(), &path, schedule, retry)
        .map_err(Error::binding)?;
    let backward = Director::new(dst.clone(), src.clone(), &path, schedule, retry)
        .map_err(Error::binding)?;

    forward.register().map_err(Error::binding)?;
    backward.register().map_err(Error::binding)?;

    info!(
        "Source -> {} | Destination -> {} | relaying over path {} every {}",
        src.id(),
        dst.id(),
        options.path,
        humantime::format_duration(refresh_interval)
    );

    let forward_stats = forward.stats();
    let backward_stats = backward.stats();

    let cycle_error_pause = config.relay.cycle_error_pause;
    let workers = vec![
        spawn_director_worker(forward, cycle_error_pause),
        spawn_director_worker(backward, cycle_error_pause),
    ];

    let (sender, receiver) = crossbeam_channel::unbounded();

    Ok(SupervisorHandle {
        sender,
        receiver,
        chains: vec![src, dst],
        workers,
        forward: forward_stats,
        backward: backward_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainConfig, PathConfig, PathEndConfig};
    use crate::supervisor::error::ErrorDetail;
    use ibc_refresher_types::{
        identifier::{ChannelId, ClientId, ConnectionId, PortId},
        path::Order,
    };
    use test_log::test;

    fn end(chain: &str, n: u64) -> PathEndConfig {
        PathEndConfig {
            chain_id: ChainId::from_string(chain),
            client_id: ClientId::new("9999-mock", n).unwrap(),
            connection_id: ConnectionId::new(n),
            channel_id: ChannelId::new(n),
            port_id: PortId::transfer(),
        }
    }

    fn config() -> Config {
        let mut config = Config {
            chains: vec![
                ChainConfig::new(ChainId::from_string("ibc-0")),
                ChainConfig::new(ChainId::from_string("ibc-1")),
                ChainConfig::new(ChainId::from_string("ibc-2")),
            ],
            ..Config::default()
        };

        config.paths.insert(
            "ibc0ibc1".to_string(),
            PathConfig {
                ordering: Order::Unordered,
                src: end("ibc-0", 0),
                dst: end("ibc-1", 0),
            },
        );

        config
    }

    fn options(src: &str, dst: &str, path: &str) -> RelayOptions {
        RelayOptions {
            src: ChainId::from_string(src),
            dst: ChainId::from_string(dst),
            path: path.to_string(),
            refresh_interval: None,
        }
    }

    fn start_err(options: RelayOptions) -> Error {
        match spawn_relay(&config(), options) {
            Ok(_) => panic!("relay should not start"),
            Err(e) => e,
        }
    }

    #[test]
    fn unknown_chain_is_rejected() {
        let err = start_err(options("ibc-0", "ibc-9", "ibc0ibc1"));
        assert!(matches!(err.detail(), ErrorDetail::UnknownChain(_)));
    }

    #[test]
    fn same_chain_is_rejected() {
        let err = start_err(options("ibc-0", "ibc-0", "ibc0ibc1"));
        assert!(matches!(err.detail(), ErrorDetail::SameChain(_)));
    }

    #[test]
    fn unknown_path_is_rejected() {
        let err = start_err(options("ibc-0", "ibc-1", "nope"));
        assert!(matches!(err.detail(), ErrorDetail::UnknownPath(_)));
    }

    #[test]
    fn path_must_connect_the_chains() {
        let err = start_err(options("ibc-0", "ibc-2", "ibc0ibc1"));
        assert!(matches!(err.detail(), ErrorDetail::PathDoesNotConnect(_)));
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut options = options("ibc-0", "ibc-1", "ibc0ibc1");
        options.refresh_interval = Some(Duration::ZERO);

        let err = start_err(options);
        assert!(matches!(err.detail(), ErrorDetail::Config(_)));
    }

    #[test]
    fn relay_starts_in_either_orientation_and_stops() {
        for (src, dst) in [("ibc-0", "ibc-1"), ("ibc-1", "ibc-0")] {
            let handle = spawn_relay(&config(), options(src, dst, "ibc0ibc1")).unwrap();

            let (reply_to, stats) = crossbeam_channel::bounded(1);
            handle
                .sender
                .send(SupervisorCmd::DumpStats(reply_to))
                .unwrap();
            handle.sender.send(SupervisorCmd::Stop).unwrap();

            handle.wait();

            assert_eq!(stats.recv().unwrap(), RelayStats::default());
        }
    }
}
