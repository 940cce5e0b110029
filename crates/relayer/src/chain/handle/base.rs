use core::fmt::{Debug, Display, Error as FmtError, Formatter};

use crossbeam_channel as channel;
use tracing::Span;

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

use super::{reply_channel, ChainHandle, ChainRequest, ReplyTo};

/// A basic chain handle implementation, forwarding every call to the
/// runtime thread of the chain.
#[derive(Debug, Clone)]
pub struct BaseChainHandle {
    /// Chain identifier
    chain_id: ChainId,

    /// The handle's channel for sending requests to the runtime
    runtime_sender: channel::Sender<(Span, ChainRequest)>,
}

impl BaseChainHandle {
    pub fn new(chain_id: ChainId, sender: channel::Sender<(Span, ChainRequest)>) -> Self {
        Self {
            chain_id,
            runtime_sender: sender,
        }
    }

    fn send<F, O>(&self, f: F) -> Result<O, Error>
    where
        F: FnOnce(ReplyTo<O>) -> ChainRequest,
        O: Debug,
    {
        let (sender, receiver) = reply_channel();

        let span = Span::current();
        let input = f(sender);

        self.runtime_sender
            .send((span, input))
            .map_err(Error::send)?;

        receiver.recv().map_err(Error::channel_receive)?
    }
}

impl Display for BaseChainHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "BaseChainHandle {{ chain_id: {} }}", self.chain_id)
    }
}

impl ChainHandle for BaseChainHandle {
    fn id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn shutdown(&self) -> Result<(), Error> {
        self.send(|reply_to| ChainRequest::Shutdown { reply_to })
    }

    fn config(&self) -> Result<ChainConfig, Error> {
        self.send(|reply_to| ChainRequest::Config { reply_to })
    }

    fn register_path(&self, path: &Path) -> Result<(), Error> {
        self.send(|reply_to| ChainRequest::RegisterPath {
            path: path.clone(),
            reply_to,
        })
    }

    fn query_client_state(&self, client_id: &ClientId) -> Result<AnyClientState, Error> {
        self.send(|reply_to| ChainRequest::QueryClientState {
            client_id: client_id.clone(),
            reply_to,
        })
    }

    fn fetch_latest_header(&self) -> Result<AnyHeader, Error> {
        self.send(|reply_to| ChainRequest::FetchLatestHeader { reply_to })
    }

    fn get_signer(&self) -> Result<Signer, Error> {
        self.send(|reply_to| ChainRequest::Signer { reply_to })
    }

    fn build_and_sign_tx(&self, msgs: Vec<AnyMsg>) -> Result<SignedTx, Error> {
        self.send(|reply_to| ChainRequest::BuildAndSignTx { msgs, reply_to })
    }

    fn broadcast_tx_commit(&self, tx: &SignedTx) -> Result<TxResponse, Error> {
        self.send(|reply_to| ChainRequest::BroadcastTxCommit {
            tx: tx.clone(),
            reply_to,
        })
    }

    fn query_tx(&self, hash: &TxHash) -> Result<TxResponse, Error> {
        self.send(|reply_to| ChainRequest::QueryTx {
            hash: *hash,
            reply_to,
        })
    }
}
