#![allow(dead_code)]

use core::{
    fmt::{Display, Error as FmtError, Formatter},
    time::Duration,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use ibc_refresher::{
    chain::handle::ChainHandle,
    config::ChainConfig,
    error::Error,
};
use ibc_refresher_types::{
    client_state::{AnyClientState, MockClientState},
    header::{AnyHeader, Header, MockHeader},
    height::Height,
    identifier::{ChainId, ChannelId, ClientId, ConnectionId, PortId},
    msgs::AnyMsg,
    path::{Order, Path, PathEnd},
    signer::Signer,
    timestamp::Timestamp,
    tx::{Code, SignedTx, TxHash, TxResponse},
};

/// How a [`ScriptedChain`] answers broadcasts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BroadcastScript {
    /// Commit the tx and apply the update to the hosted client.
    Commit,
    /// Answer with the given code, without applying anything.
    Code(u32),
    /// Fail to reach the chain.
    Unreachable,
}

#[derive(Debug)]
pub struct ScriptedState {
    pub client_state: AnyClientState,
    pub broadcast: BroadcastScript,
    pub fail_queries: bool,
    pub fail_headers: bool,
    pub fail_tx_lookups: bool,
    pub fail_registration: bool,
    pub header_height: u64,
    pub sequence: u8,

    pub registered: Vec<Path>,
    pub queries: usize,
    pub header_fetches: Vec<Instant>,
    pub broadcasts: usize,
    pub tx_lookups: usize,
}

/// A chain handle answering from an in-memory script, and recording the
/// calls it receives.
#[derive(Clone, Debug)]
pub struct ScriptedChain {
    chain_id: ChainId,
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedChain {
    /// A chain hosting a client of `counterparty`, whose latest trusted header
    /// has the given timestamp.
    pub fn new(chain_id: &str, counterparty: &str, latest_timestamp: Timestamp) -> Self {
        let counterparty = ChainId::from_string(counterparty);

        let client_state = MockClientState {
            latest_height: Height::new(counterparty.version(), 1).unwrap(),
            chain_id: counterparty,
            latest_timestamp,
            trusting_period: Duration::from_secs(14 * 24 * 3600),
            frozen: false,
        };

        Self {
            chain_id: ChainId::from_string(chain_id),
            state: Arc::new(Mutex::new(ScriptedState {
                client_state: client_state.into(),
                broadcast: BroadcastScript::Commit,
                fail_queries: false,
                fail_headers: false,
                fail_tx_lookups: false,
                fail_registration: false,
                header_height: 1,
                sequence: 0,
                registered: Vec::new(),
                queries: 0,
                header_fetches: Vec::new(),
                broadcasts: 0,
                tx_lookups: 0,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap()
    }

    fn unreachable(&self) -> Error {
        Error::rpc(self.chain_id.clone(), "connection refused".to_string())
    }

    fn signer() -> Signer {
        Signer::new("cosmos1scripted").unwrap()
    }
}

impl Display for ScriptedChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "ScriptedChain {{ chain_id: {} }}", self.chain_id)
    }
}

impl ChainHandle for ScriptedChain {
    fn id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn shutdown(&self) -> Result<(), Error> {
        Ok(())
    }

    fn config(&self) -> Result<ChainConfig, Error> {
        Ok(ChainConfig::new(self.chain_id.clone()))
    }

    fn register_path(&self, path: &Path) -> Result<(), Error> {
        let mut state = self.state();

        if state.fail_registration {
            return Err(Error::path_conflict(
                self.chain_id.clone(),
                path.src.client_id.clone(),
            ));
        }

        state.registered.push(path.clone());
        Ok(())
    }

    fn query_client_state(&self, _client_id: &ClientId) -> Result<AnyClientState, Error> {
        let mut state = self.state();
        state.queries += 1;

        if state.fail_queries {
            return Err(self.unreachable());
        }

        Ok(state.client_state.clone())
    }

    fn fetch_latest_header(&self) -> Result<AnyHeader, Error> {
        let mut state = self.state();
        state.header_fetches.push(Instant::now());

        if state.fail_headers {
            return Err(self.unreachable());
        }

        state.header_height += 1;

        Ok(MockHeader {
            chain_id: self.chain_id.clone(),
            height: Height::new(self.chain_id.version(), state.header_height).unwrap(),
            timestamp: Timestamp::now(),
        }
        .into())
    }

    fn get_signer(&self) -> Result<Signer, Error> {
        Ok(Self::signer())
    }

    fn build_and_sign_tx(&self, msgs: Vec<AnyMsg>) -> Result<SignedTx, Error> {
        let mut state = self.state();
        state.sequence = state.sequence.wrapping_add(1);

        Ok(SignedTx::new(
            TxHash::new([state.sequence; TxHash::LENGTH]),
            Vec::new(),
            msgs,
        ))
    }

    fn broadcast_tx_commit(&self, tx: &SignedTx) -> Result<TxResponse, Error> {
        let mut state = self.state();
        state.broadcasts += 1;

        let code = match state.broadcast {
            BroadcastScript::Unreachable => return Err(self.unreachable()),
            BroadcastScript::Code(code) => Code::new(code),
            BroadcastScript::Commit => {
                for msg in tx.msgs() {
                    let AnyMsg::UpdateClient(msg) = msg;

                    if let AnyClientState::Mock(client) = &mut state.client_state {
                        client.advance(msg.header.height(), msg.header.timestamp());
                    }
                }

                Code::OK
            }
        };

        Ok(TxResponse {
            hash: tx.hash(),
            code,
            height: Some(Height::new(self.chain_id.version(), 10).unwrap()),
            log: String::new(),
        })
    }

    fn query_tx(&self, hash: &TxHash) -> Result<TxResponse, Error> {
        let mut state = self.state();
        state.tx_lookups += 1;

        if state.fail_tx_lookups {
            return Err(Error::tx_not_found(self.chain_id.clone(), *hash));
        }

        Ok(TxResponse {
            hash: *hash,
            code: Code::new(19),
            height: Some(Height::new(self.chain_id.version(), 10).unwrap()),
            log: String::new(),
        })
    }
}

pub fn path_end(chain: &str) -> PathEnd {
    PathEnd {
        chain_id: ChainId::from_string(chain),
        client_id: ClientId::new("9999-mock", 0).unwrap(),
        connection_id: ConnectionId::new(0),
        channel_id: ChannelId::new(0),
        port_id: PortId::transfer(),
        order: Order::Unordered,
    }
}

/// A path between chains `a` and `b`.
pub fn path(a: &str, b: &str) -> Path {
    Path {
        src: path_end(a),
        dst: path_end(b),
    }
}

/// Timestamp `ago` in the past.
pub fn ago(ago: Duration) -> Timestamp {
    (Timestamp::now() - ago).unwrap()
}
