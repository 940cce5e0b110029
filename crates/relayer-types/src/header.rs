use serde_derive::{Deserialize, Serialize};

use crate::{height::Height, identifier::ChainId, timestamp::Timestamp};

/// Abstract of consensus state update information
pub trait Header {
    /// The chain that produced this header.
    fn chain_id(&self) -> ChainId;

    /// The height of the header
    fn height(&self) -> Height;

    /// The timestamp of the header
    fn timestamp(&self) -> Timestamp;
}

/// A signed header together with the validator sets needed to verify it
/// against a trusted consensus state.
///
/// Fetched from Tendermint-based endpoints; the mock chains reject it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendermintHeader {
    pub chain_id: ChainId,
    pub height: Height,
    pub time: Timestamp,
    /// Height of the consensus state this header is verified against.
    pub trusted_height: Height,
    /// Encoded signed header (block header + commit).
    #[serde(with = "hex_bytes")]
    pub signed_header: Vec<u8>,
    /// Encoded validator set that signed `signed_header`.
    #[serde(with = "hex_bytes")]
    pub validator_set: Vec<u8>,
}

impl Header for TendermintHeader {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn height(&self) -> Height {
        self.height
    }

    fn timestamp(&self) -> Timestamp {
        self.time
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockHeader {
    pub chain_id: ChainId,
    pub height: Height,
    pub timestamp: Timestamp,
}

impl Header for MockHeader {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn height(&self) -> Height {
        self.height
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyHeader {
    Tendermint(TendermintHeader),
    Mock(MockHeader),
}

impl Header for AnyHeader {
    fn chain_id(&self) -> ChainId {
        match self {
            Self::Tendermint(header) => header.chain_id(),
            Self::Mock(header) => header.chain_id(),
        }
    }

    fn height(&self) -> Height {
        match self {
            Self::Tendermint(header) => header.height(),
            Self::Mock(header) => header.height(),
        }
    }

    fn timestamp(&self) -> Timestamp {
        match self {
            Self::Tendermint(header) => header.timestamp(),
            Self::Mock(header) => header.timestamp(),
        }
    }
}

impl From<TendermintHeader> for AnyHeader {
    fn from(header: TendermintHeader) -> Self {
        Self::Tendermint(header)
    }
}

impl From<MockHeader> for AnyHeader {
    fn from(header: MockHeader) -> Self {
        Self::Mock(header)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
