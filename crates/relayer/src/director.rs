//! The relay director drives one direction of a path: it keeps the light
//! client hosted on the source chain, which tracks the destination chain,
//! fresh.
//!
//! Each cycle queries the client on the source chain, waits until the client
//! is due for a refresh, fetches a header from the destination chain and
//! submits an update-client transaction for it on the source chain.

use core::fmt::{Display, Error as FmtError, Formatter};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crossbeam_channel::Receiver;
use flex_error::define_error;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use ibc_refresher_types::{
    client_state::ClientState,
    identifier::{ChainId, ClientId},
    msgs::MsgUpdateClient,
    path::Path,
};

use crate::{
    broadcast::{broadcast_with_retry, BroadcastOutcome, RetryPolicy},
    chain::handle::ChainHandle,
    error::Error as RelayerError,
    header_sync::{fetch_update_header, HeaderSyncError},
    schedule::{wait_until, Clock, Deadline, RefreshSchedule, ScheduleError, SystemClock, Wait},
};

define_error! {
    BindingError {
        Register
            {
                chain_id: ChainId,
                client_id: ClientId,
            }
            [ RelayerError ]
            |e| {
                format_args!("chain {} rejected the binding of client {}",
                    e.chain_id, e.client_id)
            },

        PathMismatch
            {
                path: Path,
                src_chain: ChainId,
                dst_chain: ChainId,
            }
            |e| {
                format_args!("path {} does not connect chain {} to chain {}",
                    e.path, e.src_chain, e.dst_chain)
            },
    }
}

define_error! {
    CycleError {
        Query
            {
                chain_id: ChainId,
                client_id: ClientId,
            }
            [ RelayerError ]
            |e| {
                format_args!("failed to query the state of client {} on chain {}",
                    e.client_id, e.chain_id)
            },

        Schedule
            [ ScheduleError ]
            |_| { "failed to compute the next refresh time" },

        HeaderSync
            [ HeaderSyncError ]
            |_| { "failed to obtain an update header" },

        Signer
            { chain_id: ChainId }
            [ RelayerError ]
            |e| { format_args!("failed to get the signer of chain {}", e.chain_id) },

        Sign
            { chain_id: ChainId }
            [ RelayerError ]
            |e| { format_args!("failed to build and sign the update tx on chain {}", e.chain_id) },
    }
}

/// What a relay cycle ended with.
#[derive(Debug)]
pub enum CycleOutcome {
    /// An update tx was broadcast, with the given outcome.
    Broadcast(BroadcastOutcome),

    /// The shutdown signal was received while waiting for the deadline.
    Cancelled,
}

/// Counters of the cycles run by a director.
#[derive(Debug, Default)]
pub struct CycleStats {
    cycles: AtomicU64,
    committed: AtomicU64,
    already_current: AtomicU64,
    rejected: AtomicU64,
    exhausted: AtomicU64,
    errors: AtomicU64,
}

/// A point-in-time copy of [`CycleStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStatsSnapshot {
    /// Cycles that reached the broadcast step.
    pub cycles: u64,
    pub committed: u64,
    pub already_current: u64,
    pub rejected: u64,
    pub exhausted: u64,
    /// Cycles that failed before broadcasting.
    pub errors: u64,
}

impl CycleStats {
    pub fn record_outcome(&self, outcome: &BroadcastOutcome) {
        let counter = match outcome {
            BroadcastOutcome::Committed { .. } => &self.committed,
            BroadcastOutcome::AlreadyCurrent { .. } => &self.already_current,
            BroadcastOutcome::Rejected { .. } => &self.rejected,
            BroadcastOutcome::Exhausted { .. } => &self.exhausted,
        };

        counter.fetch_add(1, Ordering::SeqCst);
        self.cycles.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CycleStatsSnapshot {
        CycleStatsSnapshot {
            cycles: self.cycles.load(Ordering::SeqCst),
            committed: self.committed.load(Ordering::SeqCst),
            already_current: self.already_current.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
            exhausted: self.exhausted.load(Ordering::SeqCst),
            errors: self.errors.load(Ordering::SeqCst),
        }
    }
}

impl Display for CycleStatsSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "cycles: {}, committed: {}, already current: {}, rejected: {}, exhausted: {}, errors: {}",
            self.cycles,
            self.committed,
            self.already_current,
            self.rejected,
            self.exhausted,
            self.errors
        )
    }
}

/// Keeps the client of `path.src`, hosted on the `src` chain, up to date
/// with the `dst` chain.
pub struct Director<SrcChain: ChainHandle, DstChain: ChainHandle> {
    src: SrcChain,
    dst: DstChain,
    path: Path,
    schedule: RefreshSchedule,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    stats: Arc<CycleStats>,
}

impl<SrcChain: ChainHandle, DstChain: ChainHandle> Director<SrcChain, DstChain> {
    /// Create a director for the direction of `path` going from `src` to `dst`.
    ///
    /// Fails if the path does not have one end on each of the two chains.
    pub fn new(
        src: SrcChain,
        dst: DstChain,
        path: &Path,
        schedule: RefreshSchedule,
        retry: RetryPolicy,
    ) -> Result<Self, BindingError> {
        let path = path
            .oriented_from(&src.id())
            .filter(|p| p.dst.chain_id == dst.id() && p.src.chain_id != p.dst.chain_id)
            .ok_or_else(|| BindingError::path_mismatch(path.clone(), src.id(), dst.id()))?;

        Ok(Self {
            src,
            dst,
            path,
            schedule,
            retry,
            clock: Arc::new(SystemClock),
            stats: Arc::new(CycleStats::default()),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn src_chain(&self) -> &SrcChain {
        &self.src
    }

    pub fn dst_chain(&self) -> &DstChain {
        &self.dst
    }

    /// The path, oriented so that its `src` end is on the source chain.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn client_id(&self) -> &ClientId {
        &self.path.src.client_id
    }

    pub fn stats(&self) -> Arc<CycleStats> {
        self.stats.clone()
    }

    /// Bind the path on the source chain. Must succeed before any cycle runs.
    pub fn register(&self) -> Result<(), BindingError> {
        self.src
            .register_path(&self.path)
            .map_err(|e| BindingError::register(self.src.id(), self.client_id().clone(), e))?;

        info!(
            "Source -> {} | Destination -> {} | registered path {}",
            self.src.id(),
            self.dst.id(),
            self.path
        );

        Ok(())
    }

    /// Run one relay cycle. Blocks until the client is due for a refresh,
    /// unless a shutdown signal is received on `shutdown` in the meantime.
    #[instrument(
        name = "relay_cycle",
        level = "debug",
        skip_all,
        fields(src_chain = %self.src.id(), dst_chain = %self.dst.id(), client = %self.client_id()),
    )]
    pub fn run_cycle(&self, shutdown: &Receiver<()>) -> Result<CycleOutcome, CycleError> {
        let result = self.try_run_cycle(shutdown);

        match &result {
            Ok(CycleOutcome::Broadcast(outcome)) => self.stats.record_outcome(outcome),
            Ok(CycleOutcome::Cancelled) => {}
            Err(_) => self.stats.record_error(),
        }

        result
    }

    fn try_run_cycle(&self, shutdown: &Receiver<()>) -> Result<CycleOutcome, CycleError> {
        let client_state = self
            .src
            .query_client_state(self.client_id())
            .map_err(|e| CycleError::query(self.src.id(), self.client_id().clone(), e))?;

        let (next, deadline) = self
            .schedule
            .deadline(&client_state, self.clock.as_ref())
            .map_err(CycleError::schedule)?;

        match deadline {
            Deadline::Due => debug!(%next, "client is due for a refresh"),
            Deadline::Pending(remaining) => debug!(
                %next,
                "waiting {} for the next refresh",
                humantime::format_duration(remaining)
            ),
        }

        if wait_until(deadline, shutdown) == Wait::Cancelled {
            debug!("shutdown requested while waiting for the next refresh");
            return Ok(CycleOutcome::Cancelled);
        }

        let header =
            fetch_update_header(&self.dst, &client_state).map_err(CycleError::header_sync)?;

        let signer = self
            .src
            .get_signer()
            .map_err(|e| CycleError::signer(self.src.id(), e))?;

        let msg = MsgUpdateClient::new(self.client_id().clone(), header, signer);

        let tx = self
            .src
            .build_and_sign_tx(vec![msg.into()])
            .map_err(|e| CycleError::sign(self.src.id(), e))?;

        info!(
            tx_hash = %tx.hash(),
            "Source -> {} | Destination -> {} | updating client {} from height {}",
            self.src.id(),
            self.dst.id(),
            self.client_id(),
            client_state.latest_height(),
        );

        let outcome = broadcast_with_retry(&self.src, &tx, &self.retry);

        Ok(CycleOutcome::Broadcast(outcome))
    }
}
