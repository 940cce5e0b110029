//! Broadcasting of signed update transactions, with a bounded number of
//! attempts and a classification of the commit result reported by the chain.

use core::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use ibc_refresher_types::tx::{Code, SignedTx, TxResponse};

use crate::{
    chain::handle::ChainHandle,
    config::{default, RetryConfig},
    error::Error,
    util::retry::{fixed_delays, retry_with_index, RetryResult},
};

/// Commit codes meaning the update was a no-op because the client was already
/// current, eg. because another relayer or an earlier cycle got there first.
pub const REDUNDANT_UPDATE_CODES: [Code; 3] = [Code::new(19), Code::new(20), Code::new(21)];

/// Whether the commit code reports an update that was already applied.
pub fn is_redundant(code: Code) -> bool {
    REDUNDANT_UPDATE_CODES.contains(&code)
}

/// Bounded re-attempts with a fixed delay between two attempts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.delay)
    }

    /// The delays to wait between consecutive attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        fixed_delays(self.delay, self.max_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(default::max_attempts(), default::retry_delay())
    }
}

/// Final result of broadcasting a transaction under a [`RetryPolicy`].
#[derive(Debug)]
pub enum BroadcastOutcome {
    /// The transaction was committed and the update applied.
    Committed { response: TxResponse },

    /// The chain reported the update as redundant. `confirmation` holds the
    /// result of looking the transaction up by hash, if that succeeded.
    AlreadyCurrent {
        response: TxResponse,
        confirmation: Option<TxResponse>,
    },

    /// The chain refused the transaction with a code that is neither success
    /// nor redundant. Not retried.
    Rejected { response: TxResponse },

    /// Every attempt failed to reach the chain.
    Exhausted { attempts: u64, last_error: Error },
}

impl BroadcastOutcome {
    /// The commit response of the chain, if one was received.
    pub fn response(&self) -> Option<&TxResponse> {
        match self {
            Self::Committed { response }
            | Self::AlreadyCurrent { response, .. }
            | Self::Rejected { response } => Some(response),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Broadcast `tx` on `chain` and wait for it to be committed.
///
/// Only failures to reach the chain are retried. Once the chain answers with
/// a commit code, no further attempt is made:
/// - a redundant code is confirmed with a single lookup of the tx by hash,
/// - any other non-zero code is final.
#[instrument(
    name = "broadcast",
    level = "info",
    skip_all,
    fields(chain = %chain.id(), tx_hash = %tx.hash()),
)]
pub fn broadcast_with_retry<Chain: ChainHandle>(
    chain: &Chain,
    tx: &SignedTx,
    policy: &RetryPolicy,
) -> BroadcastOutcome {
    let result = retry_with_index(policy.delays(), |index| {
        match chain.broadcast_tx_commit(tx) {
            Ok(response) => RetryResult::Ok(response),
            Err(e) => {
                warn!(
                    attempt = index,
                    max_attempts = policy.max_attempts,
                    "failed to broadcast tx: {}",
                    e
                );

                RetryResult::Retry(e)
            }
        }
    });

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!(
                attempts = e.tries,
                "giving up on tx after {} attempts: {}", e.tries, e.error
            );

            return BroadcastOutcome::Exhausted {
                attempts: e.tries,
                last_error: e.error,
            };
        }
    };

    if response.is_ok() {
        info!(code = %response.code, "{}", response);
        return BroadcastOutcome::Committed { response };
    }

    if is_redundant(response.code) {
        info!(code = %response.code, "client already up to date: {}", response);

        let confirmation = match chain.query_tx(&response.hash) {
            Ok(confirmation) => {
                debug!("confirmed: {}", confirmation);
                Some(confirmation)
            }
            Err(e) => {
                warn!("failed to look up redundant tx: {}", e);
                None
            }
        };

        return BroadcastOutcome::AlreadyCurrent {
            response,
            confirmation,
        };
    }

    warn!(
        code = %response.code,
        log = %response.log,
        "tx rejected, not retrying: {}",
        response
    );

    BroadcastOutcome::Rejected { response }
}
