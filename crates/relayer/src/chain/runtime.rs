use std::thread;

use crossbeam_channel as channel;
use tracing::{debug, error, Span};

use ibc_refresher_types::{
    client_state::AnyClientState,
    header::AnyHeader,
    identifier::ClientId,
    msgs::AnyMsg,
    path::Path,
    signer::Signer,
    tx::{SignedTx, TxHash, TxResponse},
};

use crate::{config::ChainConfig, error::Error};

use super::{
    endpoint::ChainEndpoint,
    handle::{BaseChainHandle, ChainRequest, ReplyTo},
};

pub struct ChainRuntime<Endpoint: ChainEndpoint> {
    /// The specific chain this runtime runs against
    chain: Endpoint,

    /// The receiving side of a channel to this runtime. The runtime consumes chain requests coming
    /// in through this channel.
    request_receiver: channel::Receiver<(Span, ChainRequest)>,
}

impl<Endpoint> ChainRuntime<Endpoint>
where
    Endpoint: ChainEndpoint + Send + 'static,
{
    /// Spawns a new runtime for a specific Chain implementation.
    pub fn spawn(config: ChainConfig) -> Result<BaseChainHandle, Error> {
        let chain = Endpoint::bootstrap(config)?;

        // Instantiate & spawn the runtime
        let (handle, _) = Self::init(chain);

        Ok(handle)
    }

    /// Initializes a runtime for a given chain, and spawns the associated thread
    pub fn init(chain: Endpoint) -> (BaseChainHandle, thread::JoinHandle<()>) {
        let chain_id = chain.id().clone();
        let (request_sender, request_receiver) = channel::unbounded();

        let chain_runtime = Self {
            chain,
            request_receiver,
        };

        let handle = BaseChainHandle::new(chain_id.clone(), request_sender);

        let thread = thread::spawn(move || {
            if let Err(e) = chain_runtime.run() {
                error!("failed to run runtime for chain '{}': {}", chain_id, e);
            }
        });

        (handle, thread)
    }

    fn run(mut self) -> Result<(), Error> {
        loop {
            let (span, request) = match self.request_receiver.recv() {
                Ok(request) => request,
                Err(_) => {
                    // Every handle was dropped, nobody can talk to this chain anymore.
                    debug!(chain = %self.chain.id(), "all chain handles dropped, stopping runtime");
                    return Ok(());
                }
            };

            let _span = span.entered();

            match request {
                ChainRequest::Shutdown { reply_to } => {
                    let res = self.chain.shutdown();

                    reply_to.send(res).map_err(Error::send)?;

                    break;
                }

                ChainRequest::Config { reply_to } => self.get_config(reply_to)?,

                ChainRequest::RegisterPath { path, reply_to } => {
                    self.register_path(path, reply_to)?
                }

                ChainRequest::QueryClientState {
                    client_id,
                    reply_to,
                } => self.query_client_state(client_id, reply_to)?,

                ChainRequest::FetchLatestHeader { reply_to } => {
                    self.fetch_latest_header(reply_to)?
                }

                ChainRequest::Signer { reply_to } => self.get_signer(reply_to)?,

                ChainRequest::BuildAndSignTx { msgs, reply_to } => {
                    self.build_and_sign_tx(msgs, reply_to)?
                }

                ChainRequest::BroadcastTxCommit { tx, reply_to } => {
                    self.broadcast_tx_commit(tx, reply_to)?
                }

                ChainRequest::QueryTx { hash, reply_to } => self.query_tx(hash, reply_to)?,
            }
        }

        Ok(())
    }

    fn get_config(&self, reply_to: ReplyTo<ChainConfig>) -> Result<(), Error> {
        let result = Ok(self.chain.config());
        reply_to.send(result).map_err(Error::send)
    }

    fn register_path(&mut self, path: Path, reply_to: ReplyTo<()>) -> Result<(), Error> {
        let result = self.chain.register_path(&path);
        reply_to.send(result).map_err(Error::send)
    }

    fn query_client_state(
        &self,
        client_id: ClientId,
        reply_to: ReplyTo<AnyClientState>,
    ) -> Result<(), Error> {
        let result = self.chain.query_client_state(&client_id);
        reply_to.send(result).map_err(Error::send)
    }

    fn fetch_latest_header(&mut self, reply_to: ReplyTo<AnyHeader>) -> Result<(), Error> {
        let result = self.chain.fetch_latest_header();
        reply_to.send(result).map_err(Error::send)
    }

    fn get_signer(&self, reply_to: ReplyTo<Signer>) -> Result<(), Error> {
        let result = self.chain.get_signer();
        reply_to.send(result).map_err(Error::send)
    }

    fn build_and_sign_tx(
        &mut self,
        msgs: Vec<AnyMsg>,
        reply_to: ReplyTo<SignedTx>,
    ) -> Result<(), Error> {
        let result = self.chain.build_and_sign_tx(msgs);
        reply_to.send(result).map_err(Error::send)
    }

    fn broadcast_tx_commit(
        &mut self,
        tx: SignedTx,
        reply_to: ReplyTo<TxResponse>,
    ) -> Result<(), Error> {
        let result = self.chain.broadcast_tx_commit(&tx);
        reply_to.send(result).map_err(Error::send)
    }

    fn query_tx(&self, hash: TxHash, reply_to: ReplyTo<TxResponse>) -> Result<(), Error> {
        let result = self.chain.query_tx(&hash);
        reply_to.send(result).map_err(Error::send)
    }
}
