//! Signed transactions and the responses chains return for them.

use core::{
    fmt::{Display, Error as FmtError, Formatter},
    str::FromStr,
};

use serde_derive::{Deserialize, Serialize};

use crate::{error::ValidationError, height::Height, msgs::AnyMsg};

/// Transaction outcome code reported by the chain. Zero means success.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(u32);

impl Code {
    pub const OK: Code = Code(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

impl From<u32> for Code {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 digest of an encoded transaction. Displayed as upper-case hex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; Self::LENGTH];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| ValidationError::invalid_tx_hash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for TxHash {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_string()
    }
}

/// A transaction ready for broadcast. Immutable once built: retrying a
/// broadcast always resubmits the exact same bytes under the same hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTx {
    hash: TxHash,
    bytes: Vec<u8>,
    msgs: Vec<AnyMsg>,
}

impl SignedTx {
    pub fn new(hash: TxHash, bytes: Vec<u8>, msgs: Vec<AnyMsg>) -> Self {
        Self { hash, bytes, msgs }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn msgs(&self) -> &[AnyMsg] {
        &self.msgs
    }
}

/// Result of a committed broadcast or of a transaction lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub hash: TxHash,
    pub code: Code,
    /// Height at which the transaction was included, if it was.
    pub height: Option<Height>,
    #[serde(default)]
    pub log: String,
}

impl TxResponse {
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

impl Display for TxResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self.height {
            Some(height) => write!(f, "tx {} code {} at height {}", self.hash, self.code, height),
            None => write!(f, "tx {} code {}", self.hash, self.code),
        }
    }
}
