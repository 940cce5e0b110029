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

/// Defines a blockchain as understood by the relayer.
///
/// An endpoint is owned by exactly one [`ChainRuntime`](super::runtime::ChainRuntime)
/// thread, so its methods are never called concurrently.
pub trait ChainEndpoint: Sized {
    /// Constructs the chain
    fn bootstrap(config: ChainConfig) -> Result<Self, Error>;

    /// Returns the chain's identifier
    fn id(&self) -> &ChainId;

    /// Returns the chain configuration
    fn config(&self) -> ChainConfig;

    /// Shutdown the chain runtime
    fn shutdown(self) -> Result<(), Error>;

    /// Binds the identifiers of the `src` end of the given path on this chain.
    /// The `dst` end names the counterparty chain tracked by the bound client.
    fn register_path(&mut self, path: &Path) -> Result<(), Error>;

    /// Query the state of a light client hosted on this chain.
    fn query_client_state(&self, client_id: &ClientId) -> Result<AnyClientState, Error>;

    /// Fetch a header of this chain's latest block, suitable for updating a
    /// light client of this chain hosted on a counterparty.
    fn fetch_latest_header(&mut self) -> Result<AnyHeader, Error>;

    /// Get the signer (account address) of the configured key.
    fn get_signer(&self) -> Result<Signer, Error>;

    /// Build and sign a transaction carrying the given messages.
    fn build_and_sign_tx(&mut self, msgs: Vec<AnyMsg>) -> Result<SignedTx, Error>;

    /// Broadcast a signed transaction and block until it is committed.
    fn broadcast_tx_commit(&mut self, tx: &SignedTx) -> Result<TxResponse, Error>;

    /// Look up a committed transaction by hash.
    fn query_tx(&self, hash: &TxHash) -> Result<TxResponse, Error>;
}
