//! An in-process chain, used to run the refresher end-to-end without a
//! network. Blocks are produced at the configured block time, light clients
//! of counterparty chains are hosted in memory and committed transactions
//! can be looked up by hash.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use ibc_refresher_types::{
    client_state::{AnyClientState, ClientState, MockClientState},
    header::{AnyHeader, Header, MockHeader},
    height::Height,
    identifier::{ChainId, ClientId},
    msgs::{AnyMsg, Msg, MsgUpdateClient},
    path::Path,
    signer::Signer,
    timestamp::Timestamp,
    tx::{Code, SignedTx, TxHash, TxResponse},
};

use crate::{config::ChainConfig, error::Error};

use super::endpoint::ChainEndpoint;

/// Result codes reported by the mock chain when delivering a transaction.
pub mod code {
    use ibc_refresher_types::tx::Code;

    pub const CLIENT_NOT_FOUND: Code = Code::new(5);
    pub const INVALID_HEADER: Code = Code::new(7);
    pub const CLIENT_NOT_ACTIVE: Code = Code::new(8);

    /// The header is not newer than the client's latest height, or the very
    /// same transaction was already submitted.
    pub const REDUNDANT_UPDATE: Code = Code::new(19);
}

/// Number of committed transactions a mock chain remembers for `query_tx`.
pub const TX_HISTORY: usize = 1024;

/// Responses of the most recently committed transactions, oldest evicted first.
struct TxHistory {
    capacity: usize,
    order: VecDeque<TxHash>,
    responses: HashMap<TxHash, TxResponse>,
}

impl TxHistory {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            responses: HashMap::with_capacity(capacity),
        }
    }

    fn contains(&self, hash: &TxHash) -> bool {
        self.responses.contains_key(hash)
    }

    fn get(&self, hash: &TxHash) -> Option<&TxResponse> {
        self.responses.get(hash)
    }

    fn insert(&mut self, response: TxResponse) {
        if self.responses.insert(response.hash, response.clone()).is_some() {
            return;
        }

        self.order.push_back(response.hash);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.responses.remove(&oldest);
            }
        }
    }
}

#[derive(Serialize)]
struct TxBody<'a> {
    chain_id: &'a ChainId,
    sequence: u64,
    msgs: &'a [AnyMsg],
}

/// The representation of a mocked chain as the relayer sees it.
pub struct MockChain {
    config: ChainConfig,
    genesis: Timestamp,
    signer: Signer,
    sequence: u64,
    paths: HashMap<ClientId, Path>,
    clients: HashMap<ClientId, MockClientState>,
    txs: TxHistory,
}

impl MockChain {
    /// Height of the latest block, derived from the time elapsed since genesis.
    fn current_height(&self) -> Result<Height, Error> {
        let elapsed = Timestamp::now()
            .duration_since(&self.genesis)
            .unwrap_or_default();

        let block_time = self.config.block_time.as_nanos().max(1);
        let blocks = u64::try_from(elapsed.as_nanos() / block_time).unwrap_or(u64::MAX);

        Height::new(self.config.id.version(), blocks.saturating_add(1)).map_err(Error::validation)
    }

    fn deliver(&mut self, msgs: &[AnyMsg]) -> (Code, String) {
        for msg in msgs {
            let (code, log) = match msg {
                AnyMsg::UpdateClient(msg) => self.update_client(msg),
            };

            if code.is_err() {
                return (code, log);
            }
        }

        (Code::OK, String::new())
    }

    fn update_client(&mut self, msg: &MsgUpdateClient) -> (Code, String) {
        let Some(client) = self.clients.get_mut(&msg.client_id) else {
            return (
                code::CLIENT_NOT_FOUND,
                format!("light client {} not found", msg.client_id),
            );
        };

        let AnyHeader::Mock(header) = &msg.header else {
            return (
                code::INVALID_HEADER,
                format!("client {} only accepts mock headers", msg.client_id),
            );
        };

        if header.chain_id != client.chain_id {
            return (
                code::INVALID_HEADER,
                format!(
                    "header of chain {} cannot update client {} of chain {}",
                    header.chain_id, msg.client_id, client.chain_id
                ),
            );
        }

        let elapsed = Timestamp::now()
            .duration_since(&client.latest_timestamp)
            .unwrap_or_default();

        if client.is_frozen() || client.expired(elapsed) {
            return (
                code::CLIENT_NOT_ACTIVE,
                format!("client {} is frozen or expired", msg.client_id),
            );
        }

        if header.height <= client.latest_height {
            return (
                code::REDUNDANT_UPDATE,
                format!(
                    "header height {} is not newer than client {} height {}",
                    header.height, msg.client_id, client.latest_height
                ),
            );
        }

        client.advance(header.height, header.timestamp);

        debug!(
            client = %msg.client_id,
            height = %header.height,
            "client updated"
        );

        (Code::OK, String::new())
    }
}

impl ChainEndpoint for MockChain {
    fn bootstrap(config: ChainConfig) -> Result<Self, Error> {
        let digest = Sha256::digest(config.key_name.as_bytes());
        let signer = Signer::new(format!(
            "{}1{}",
            config.account_prefix,
            hex::encode(&digest[..20])
        ))
        .map_err(Error::validation)?;

        info!(chain = %config.id, %signer, "bootstrapped mock chain");

        Ok(Self {
            config,
            genesis: Timestamp::now(),
            signer,
            sequence: 0,
            paths: HashMap::new(),
            clients: HashMap::new(),
            txs: TxHistory::new(TX_HISTORY),
        })
    }

    fn id(&self) -> &ChainId {
        &self.config.id
    }

    fn config(&self) -> ChainConfig {
        self.config.clone()
    }

    fn shutdown(self) -> Result<(), Error> {
        debug!(chain = %self.config.id, "shutting down mock chain");
        Ok(())
    }

    fn register_path(&mut self, path: &Path) -> Result<(), Error> {
        if path.src.chain_id != self.config.id {
            return Err(Error::path_chain_mismatch(
                self.config.id.clone(),
                path.src.chain_id.clone(),
            ));
        }

        let client_id = &path.src.client_id;

        match self.paths.get(client_id) {
            Some(bound) if bound == path => return Ok(()),
            Some(_) => {
                return Err(Error::path_conflict(
                    self.config.id.clone(),
                    client_id.clone(),
                ))
            }
            None => {}
        }

        let client_state = MockClientState {
            chain_id: path.dst.chain_id.clone(),
            latest_height: Height::new(path.dst.chain_id.version(), 1)
                .map_err(Error::validation)?,
            latest_timestamp: Timestamp::now(),
            trusting_period: self.config.trusting_period,
            frozen: false,
        };

        info!(
            chain = %self.config.id,
            client = %client_id,
            counterparty = %path.dst.chain_id,
            "registered path {}", path
        );

        self.clients.insert(client_id.clone(), client_state);
        self.paths.insert(client_id.clone(), path.clone());

        Ok(())
    }

    fn query_client_state(&self, client_id: &ClientId) -> Result<AnyClientState, Error> {
        self.clients
            .get(client_id)
            .cloned()
            .map(AnyClientState::from)
            .ok_or_else(|| Error::client_not_found(self.config.id.clone(), client_id.clone()))
    }

    fn fetch_latest_header(&mut self) -> Result<AnyHeader, Error> {
        let header = MockHeader {
            chain_id: self.config.id.clone(),
            height: self.current_height()?,
            timestamp: Timestamp::now(),
        };

        debug!(chain = %self.config.id, height = %header.height(), "fetched latest header");

        Ok(header.into())
    }

    fn get_signer(&self) -> Result<Signer, Error> {
        Ok(self.signer.clone())
    }

    fn build_and_sign_tx(&mut self, msgs: Vec<AnyMsg>) -> Result<SignedTx, Error> {
        if msgs.is_empty() {
            return Err(Error::empty_tx(self.config.id.clone()));
        }

        if let Some(msg) = msgs.iter().find(|msg| *msg.signer() != self.signer) {
            return Err(Error::signer_mismatch(
                self.config.id.clone(),
                self.signer.to_string(),
                msg.signer().to_string(),
            ));
        }

        self.sequence += 1;

        let body = TxBody {
            chain_id: &self.config.id,
            sequence: self.sequence,
            msgs: &msgs,
        };

        let bytes = serde_json::to_vec(&body).map_err(Error::tx_encode)?;

        let mut hash = [0u8; TxHash::LENGTH];
        hash.copy_from_slice(&Sha256::digest(&bytes));

        Ok(SignedTx::new(TxHash::new(hash), bytes, msgs))
    }

    fn broadcast_tx_commit(&mut self, tx: &SignedTx) -> Result<TxResponse, Error> {
        if self.txs.contains(&tx.hash()) {
            return Ok(TxResponse {
                hash: tx.hash(),
                code: code::REDUNDANT_UPDATE,
                height: None,
                log: "tx already in mempool cache".to_string(),
            });
        }

        let height = self.current_height()?;
        let (code, log) = self.deliver(tx.msgs());

        let response = TxResponse {
            hash: tx.hash(),
            code,
            height: Some(height),
            log,
        };

        self.txs.insert(response.clone());

        Ok(response)
    }

    fn query_tx(&self, hash: &TxHash) -> Result<TxResponse, Error> {
        self.txs
            .get(hash)
            .cloned()
            .ok_or_else(|| Error::tx_not_found(self.config.id.clone(), *hash))
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::thread::sleep;

    use super::*;
    use crate::error::ErrorDetail;
    use ibc_refresher_types::{
        identifier::{ChannelId, ConnectionId, PortId},
        path::{Order, PathEnd},
    };
    use test_log::test;

    fn end(chain: &str, n: u64) -> PathEnd {
        PathEnd {
            chain_id: ChainId::from_string(chain),
            client_id: ClientId::new("9999-mock", n).unwrap(),
            connection_id: ConnectionId::new(n),
            channel_id: ChannelId::new(n),
            port_id: PortId::transfer(),
            order: Order::Unordered,
        }
    }

    fn chain(id: &str) -> MockChain {
        let mut config = ChainConfig::new(ChainId::from_string(id));
        config.block_time = Duration::from_millis(5);
        MockChain::bootstrap(config).unwrap()
    }

    fn update_tx(src: &mut MockChain, dst: &mut MockChain, client_id: &ClientId) -> SignedTx {
        let header = dst.fetch_latest_header().unwrap();
        let msg = MsgUpdateClient::new(client_id.clone(), header, src.get_signer().unwrap());
        src.build_and_sign_tx(vec![msg.into()]).unwrap()
    }

    fn committed(n: u8) -> TxResponse {
        TxResponse {
            hash: TxHash::new([n; TxHash::LENGTH]),
            code: Code::OK,
            height: Some(Height::new(1, u64::from(n) + 1).unwrap()),
            log: String::new(),
        }
    }

    #[test]
    fn tx_history_evicts_the_oldest_responses() {
        let mut history = TxHistory::new(3);

        for n in 0..5 {
            history.insert(committed(n));
        }

        assert_eq!(history.order.len(), 3);
        assert_eq!(history.responses.len(), 3);
        assert!(!history.contains(&committed(0).hash));
        assert!(!history.contains(&committed(1).hash));
        assert_eq!(history.get(&committed(4).hash), Some(&committed(4)));
    }

    #[test]
    fn tx_history_ignores_known_hashes() {
        let mut history = TxHistory::new(2);

        history.insert(committed(0));
        history.insert(committed(0));
        history.insert(committed(1));

        assert!(history.contains(&committed(0).hash));
        assert_eq!(history.order.len(), 2);
    }

    #[test]
    fn newer_header_updates_the_client() {
        let mut a = chain("ibc-0");
        let mut b = chain("ibc-1");
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-1", 1),
        };
        a.register_path(&path).unwrap();

        sleep(Duration::from_millis(20));

        let tx = update_tx(&mut a, &mut b, &path.src.client_id);
        let response = a.broadcast_tx_commit(&tx).unwrap();
        assert_eq!(response.code, Code::OK);
        assert_eq!(a.query_tx(&tx.hash()).unwrap(), response);

        let state = a.query_client_state(&path.src.client_id).unwrap();
        assert!(state.latest_height() > Height::new(1, 1).unwrap());
        assert_eq!(state.chain_id(), ChainId::from_string("ibc-1"));
    }

    #[test]
    fn tendermint_header_is_rejected() {
        use ibc_refresher_types::header::TendermintHeader;

        let mut a = chain("ibc-0");
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-1", 1),
        };
        a.register_path(&path).unwrap();

        let header = TendermintHeader {
            chain_id: ChainId::from_string("ibc-1"),
            height: Height::new(1, 10).unwrap(),
            time: Timestamp::now(),
            trusted_height: Height::new(1, 1).unwrap(),
            signed_header: vec![0xab],
            validator_set: vec![0xcd],
        };

        let msg = MsgUpdateClient::new(
            path.src.client_id.clone(),
            header.into(),
            a.get_signer().unwrap(),
        );
        let tx = a.build_and_sign_tx(vec![msg.into()]).unwrap();

        let before = a.query_client_state(&path.src.client_id).unwrap();
        let response = a.broadcast_tx_commit(&tx).unwrap();

        assert_eq!(response.code, code::INVALID_HEADER);
        assert_eq!(a.query_client_state(&path.src.client_id).unwrap(), before);
    }

    #[test]
    fn stale_header_and_duplicate_tx_are_redundant() {
        let mut a = chain("ibc-0");
        let mut b = chain("ibc-1");
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-1", 1),
        };
        a.register_path(&path).unwrap();

        sleep(Duration::from_millis(20));

        let header = b.fetch_latest_header().unwrap();
        let signer = a.get_signer().unwrap();
        let msg = MsgUpdateClient::new(path.src.client_id.clone(), header, signer);

        let first = a.build_and_sign_tx(vec![msg.clone().into()]).unwrap();
        let second = a.build_and_sign_tx(vec![msg.into()]).unwrap();
        assert_ne!(first.hash(), second.hash());

        assert_eq!(a.broadcast_tx_commit(&first).unwrap().code, Code::OK);

        // Same header again, in a fresh transaction
        let response = a.broadcast_tx_commit(&second).unwrap();
        assert_eq!(response.code, code::REDUNDANT_UPDATE);
        assert_eq!(a.query_tx(&second.hash()).unwrap().code, code::REDUNDANT_UPDATE);

        // Same transaction again
        let response = a.broadcast_tx_commit(&first).unwrap();
        assert_eq!(response.code, code::REDUNDANT_UPDATE);
        assert_eq!(a.query_tx(&first.hash()).unwrap().code, Code::OK);
    }

    #[test]
    fn unknown_client_is_rejected() {
        let mut a = chain("ibc-0");
        let mut b = chain("ibc-1");

        let client_id = ClientId::new("9999-mock", 7).unwrap();
        let tx = update_tx(&mut a, &mut b, &client_id);

        assert_eq!(
            a.broadcast_tx_commit(&tx).unwrap().code,
            code::CLIENT_NOT_FOUND
        );
        assert!(a.query_client_state(&client_id).is_err());
    }

    #[test]
    fn path_must_start_on_this_chain() {
        let mut a = chain("ibc-0");
        let path = Path {
            src: end("ibc-1", 0),
            dst: end("ibc-0", 1),
        };

        let err = a.register_path(&path).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::PathChainMismatch(_)));
    }

    #[test]
    fn registering_twice_is_idempotent_but_rebinding_fails() {
        let mut a = chain("ibc-0");
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-1", 1),
        };

        a.register_path(&path).unwrap();
        a.register_path(&path).unwrap();

        let mut other = path.clone();
        other.dst = end("ibc-2", 2);
        let err = a.register_path(&other).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::PathConflict(_)));
    }

    #[test]
    fn signing_requires_messages_from_own_key() {
        let mut a = chain("ibc-0");
        let mut b = chain("ibc-1");

        assert!(a.build_and_sign_tx(vec![]).is_err());

        let header = b.fetch_latest_header().unwrap();
        let msg = MsgUpdateClient::new(
            ClientId::new("9999-mock", 0).unwrap(),
            header,
            b.get_signer().unwrap(),
        );

        // Same key name and account prefix, same address
        assert_eq!(a.get_signer().unwrap(), b.get_signer().unwrap());

        let mut config = a.config();
        config.key_name = "other".to_string();
        let mut c = MockChain::bootstrap(config).unwrap();
        let err = c.build_and_sign_tx(vec![msg.into()]).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::SignerMismatch(_)));
    }
}
