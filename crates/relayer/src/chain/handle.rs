use core::fmt::{Debug, Display};

use ibc_refresher_types::{
    client_state::AnyClientState,
    header::AnyHeader,
    identifier::{ChainId, ClientId},
    msgs::AnyMsg,
    path::Path,
    signer::Signer,
    tx::{SignedTx, TxHash, TxResponse},
};

use crate::{config::ChainConfig, error::Error};

mod base;

pub use base::BaseChainHandle;

pub type ReplyTo<T> = crossbeam_channel::Sender<Result<T, Error>>;
pub type Reply<T> = crossbeam_channel::Receiver<Result<T, Error>>;

pub fn reply_channel<T>() -> (ReplyTo<T>, Reply<T>) {
    crossbeam_channel::bounded(1)
}

/// Requests that a `ChainHandle` may send to a `ChainRuntime`.
#[derive(Clone, Debug)]
pub enum ChainRequest {
    Shutdown {
        reply_to: ReplyTo<()>,
    },

    Config {
        reply_to: ReplyTo<ChainConfig>,
    },

    RegisterPath {
        path: Path,
        reply_to: ReplyTo<()>,
    },

    QueryClientState {
        client_id: ClientId,
        reply_to: ReplyTo<AnyClientState>,
    },

    FetchLatestHeader {
        reply_to: ReplyTo<AnyHeader>,
    },

    Signer {
        reply_to: ReplyTo<Signer>,
    },

    BuildAndSignTx {
        msgs: Vec<AnyMsg>,
        reply_to: ReplyTo<SignedTx>,
    },

    BroadcastTxCommit {
        tx: SignedTx,
        reply_to: ReplyTo<TxResponse>,
    },

    QueryTx {
        hash: TxHash,
        reply_to: ReplyTo<TxResponse>,
    },
}

/// Cheaply cloneable handle to a chain, shared by every worker that needs
/// to talk to it. See [`ChainEndpoint`](super::endpoint::ChainEndpoint) for
/// the meaning of each operation.
pub trait ChainHandle: Clone + Display + Debug + Send + Sync + 'static {
    /// Get the [`ChainId`] of this chain.
    fn id(&self) -> ChainId;

    /// Shutdown the chain runtime.
    fn shutdown(&self) -> Result<(), Error>;

    fn config(&self) -> Result<ChainConfig, Error>;

    /// Bind the `src` end of the given path on this chain.
    fn register_path(&self, path: &Path) -> Result<(), Error>;

    fn query_client_state(&self, client_id: &ClientId) -> Result<AnyClientState, Error>;

    fn fetch_latest_header(&self) -> Result<AnyHeader, Error>;

    fn get_signer(&self) -> Result<Signer, Error>;

    fn build_and_sign_tx(&self, msgs: Vec<AnyMsg>) -> Result<SignedTx, Error>;

    fn broadcast_tx_commit(&self, tx: &SignedTx) -> Result<TxResponse, Error>;

    fn query_tx(&self, hash: &TxHash) -> Result<TxResponse, Error>;
}
