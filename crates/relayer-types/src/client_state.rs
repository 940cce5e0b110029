//! Client states are the on-chain view that a light client keeps of its
//! counterparty chain. The relayer only ever reads them: they change as a
//! side effect of an update transaction committed on the hosting chain.

use core::{
    fmt::{Display, Error as FmtError, Formatter},
    time::Duration,
};

use serde_derive::{Deserialize, Serialize};

use crate::{height::Height, identifier::ChainId, timestamp::Timestamp};

/// Type of the light client, which also determines the prefix of its identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientType {
    Tendermint,
    Mock,
}

impl ClientType {
    const TENDERMINT_STR: &'static str = "07-tendermint";
    const MOCK_STR: &'static str = "9999-mock";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tendermint => Self::TENDERMINT_STR,
            Self::Mock => Self::MOCK_STR,
        }
    }
}

impl Display for ClientType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.as_str())
    }
}

/// Capabilities the relayer needs from any light client variant.
pub trait ClientState {
    /// Identifier of the chain tracked by this client.
    fn chain_id(&self) -> ChainId;

    fn client_type(&self) -> ClientType;

    /// Height of the latest consensus state installed in the client.
    fn latest_height(&self) -> Height;

    /// Timestamp of the latest trusted header, ie. the anchor from which the
    /// next refresh deadline is computed.
    fn latest_timestamp(&self) -> Timestamp;

    /// Window after which the latest trusted state is considered stale.
    fn trusting_period(&self) -> Duration;

    fn is_frozen(&self) -> bool;

    /// Check if the state is expired when `elapsed` time has passed since the
    /// latest consensus state was installed.
    fn expired(&self, elapsed: Duration) -> bool {
        elapsed > self.trusting_period()
    }
}

/// Client state of a Tendermint light client, as reported by endpoints that
/// host one. The mock chains only host [`MockClientState`]s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendermintClientState {
    pub chain_id: ChainId,
    #[serde(with = "humantime_serde")]
    pub trusting_period: Duration,
    #[serde(with = "humantime_serde")]
    pub unbonding_period: Duration,
    #[serde(with = "humantime_serde")]
    pub max_clock_drift: Duration,
    pub latest_height: Height,
    pub latest_timestamp: Timestamp,
    pub frozen_height: Option<Height>,
}

impl ClientState for TendermintClientState {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn client_type(&self) -> ClientType {
        ClientType::Tendermint
    }

    fn latest_height(&self) -> Height {
        self.latest_height
    }

    fn latest_timestamp(&self) -> Timestamp {
        self.latest_timestamp
    }

    fn trusting_period(&self) -> Duration {
        self.trusting_period
    }

    fn is_frozen(&self) -> bool {
        self.frozen_height.is_some()
    }
}

/// Client state of the in-process mock chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockClientState {
    pub chain_id: ChainId,
    pub latest_height: Height,
    pub latest_timestamp: Timestamp,
    #[serde(with = "humantime_serde")]
    pub trusting_period: Duration,
    pub frozen: bool,
}

impl MockClientState {
    pub fn advance(&mut self, height: Height, timestamp: Timestamp) {
        self.latest_height = height;
        self.latest_timestamp = timestamp;
    }
}

impl ClientState for MockClientState {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn client_type(&self) -> ClientType {
        ClientType::Mock
    }

    fn latest_height(&self) -> Height {
        self.latest_height
    }

    fn latest_timestamp(&self) -> Timestamp {
        self.latest_timestamp
    }

    fn trusting_period(&self) -> Duration {
        self.trusting_period
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Tagged union over the supported light client variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyClientState {
    Tendermint(TendermintClientState),
    Mock(MockClientState),
}

impl AnyClientState {
    fn inner(&self) -> &dyn ClientState {
        match self {
            Self::Tendermint(state) => state,
            Self::Mock(state) => state,
        }
    }
}

impl ClientState for AnyClientState {
    fn chain_id(&self) -> ChainId {
        self.inner().chain_id()
    }

    fn client_type(&self) -> ClientType {
        self.inner().client_type()
    }

    fn latest_height(&self) -> Height {
        self.inner().latest_height()
    }

    fn latest_timestamp(&self) -> Timestamp {
        self.inner().latest_timestamp()
    }

    fn trusting_period(&self) -> Duration {
        self.inner().trusting_period()
    }

    fn is_frozen(&self) -> bool {
        self.inner().is_frozen()
    }
}

impl From<TendermintClientState> for AnyClientState {
    fn from(state: TendermintClientState) -> Self {
        Self::Tendermint(state)
    }
}

impl From<MockClientState> for AnyClientState {
    fn from(state: MockClientState) -> Self {
        Self::Mock(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn mock_state(latest_timestamp: Timestamp) -> AnyClientState {
        MockClientState {
            chain_id: ChainId::from_string("ibc-1"),
            latest_height: Height::new(1, 10).unwrap(),
            latest_timestamp,
            trusting_period: Duration::from_secs(60),
            frozen: false,
        }
        .into()
    }

    #[test]
    fn any_client_state_dispatches_to_variant() {
        let now = Timestamp::now();
        let state = mock_state(now);

        assert_eq!(state.latest_timestamp(), now);
        assert_eq!(state.client_type(), ClientType::Mock);
        assert_eq!(state.chain_id().as_str(), "ibc-1");
        assert!(!state.is_frozen());
    }

    #[test]
    fn client_expires_after_trusting_period() {
        let state = mock_state(Timestamp::now());

        assert!(!state.expired(Duration::from_secs(59)));
        assert!(state.expired(Duration::from_secs(61)));
    }

    #[test]
    fn tendermint_client_state_serde() {
        let state = AnyClientState::Tendermint(TendermintClientState {
            chain_id: ChainId::from_string("ibc-0"),
            trusting_period: Duration::from_secs(14 * 24 * 3600),
            unbonding_period: Duration::from_secs(21 * 24 * 3600),
            max_clock_drift: Duration::from_secs(5),
            latest_height: Height::new(0, 12).unwrap(),
            latest_timestamp: Timestamp::from_nanoseconds(1_600_000_000_000_000_000).unwrap(),
            frozen_height: None,
        });

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"type\":\"Tendermint\""));
        assert!(json.contains("\"trusting_period\":\"14days\""));

        let decoded: AnyClientState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);
    }
}
