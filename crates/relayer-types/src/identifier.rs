use core::{
    fmt::{Display, Error as FmtError, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    validate::{
        validate_channel_identifier, validate_client_identifier, validate_connection_identifier,
        validate_identifier, validate_port_identifier,
    },
};

/// Network identifier of a chain, eg. `ibc-0` or `cosmoshub-4`.
///
/// When the identifier is in epoch format (`{name}-{revision}`) the revision
/// number is extracted and kept alongside the raw string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChainId {
    id: String,
    version: u64,
}

impl ChainId {
    /// Creates a new `ChainId` given a chain name and an epoch number.
    ///
    /// The returned `ChainId` will have the format: `{chain name}-{epoch number}`.
    /// ```
    /// use ibc_refresher_types::identifier::ChainId;
    ///
    /// let epoch_number = 10;
    /// let id = ChainId::new("chainA".to_string(), epoch_number);
    /// assert_eq!(id.version(), epoch_number);
    /// ```
    pub fn new(name: String, version: u64) -> Self {
        Self {
            id: format!("{name}-{version}"),
            version,
        }
    }

    pub fn from_string(id: &str) -> Self {
        let version = if Self::is_epoch_format(id) {
            Self::chain_version(id)
        } else {
            0
        };

        Self {
            id: id.to_string(),
            version,
        }
    }

    /// Get a reference to the underlying string.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Extract the version from this chain identifier.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Extract the version from the given chain identifier.
    /// ```
    /// use ibc_refresher_types::identifier::ChainId;
    ///
    /// assert_eq!(ChainId::chain_version("chain--a-0"), 0);
    /// assert_eq!(ChainId::chain_version("ibc-10"), 10);
    /// assert_eq!(ChainId::chain_version("cosmos-hub-97"), 97);
    /// assert_eq!(ChainId::chain_version("testnet-helloworld-2"), 2);
    /// ```
    pub fn chain_version(chain_id: &str) -> u64 {
        if !ChainId::is_epoch_format(chain_id) {
            return 0;
        }

        let split: Vec<_> = chain_id.split('-').collect();
        split
            .last()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// is_epoch_format() checks if a chain_id is in the format required for parsing epochs
    /// The chainID must be in the form: `{chainID}-{version}`
    /// ```
    /// use ibc_refresher_types::identifier::ChainId;
    /// assert_eq!(ChainId::is_epoch_format("chainA-0"), false);
    /// assert_eq!(ChainId::is_epoch_format("chainA"), false);
    /// assert_eq!(ChainId::is_epoch_format("chainA-1"), true);
    /// ```
    pub fn is_epoch_format(chain_id: &str) -> bool {
        let Some((name, version)) = chain_id.rsplit_once('-') else {
            return false;
        };

        !name.is_empty()
            && !version.is_empty()
            && version.chars().all(|c| c.is_ascii_digit())
            && !version.starts_with('0')
    }
}

impl FromStr for ChainId {
    type Err = ValidationError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        validate_identifier(id, 1, 64)?;
        Ok(Self::from_string(id))
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.id)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> String {
        value.id
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self::from_string(&value)
    }
}

/// Generates the boilerplate shared by the ICS-024 identifiers: a validated
/// string newtype that (de)serializes through its `FromStr` implementation.
macro_rules! ics24_identifier {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Get this identifier as a borrowed `&str`
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get this identifier as a borrowed byte slice
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $validate(s).map(|_| Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        /// Equality check against string literal (satisfies &ClientId == &str).
        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str().eq(other)
            }
        }
    };
}

ics24_identifier!(
    /// Identifier of a light client hosted on a chain, eg. `07-tendermint-0`.
    ClientId,
    validate_client_identifier
);

ics24_identifier!(
    /// Identifier of a connection end, eg. `connection-0`.
    ConnectionId,
    validate_connection_identifier
);

ics24_identifier!(
    /// Identifier of a channel end, eg. `channel-0`.
    ChannelId,
    validate_channel_identifier
);

ics24_identifier!(
    /// Identifier of a port bound by an application module, eg. `transfer`.
    PortId,
    validate_port_identifier
);

impl ClientId {
    /// Builds a new client identifier. Client identifiers are deterministically formed from two
    /// elements: a prefix derived from the client type `client_type`, and a monotonically
    /// increasing `counter`; these are separated by a dash "-".
    ///
    /// ```
    /// # use ibc_refresher_types::identifier::ClientId;
    /// let tm_client_id = ClientId::new("07-tendermint", 0);
    /// assert!(tm_client_id.is_ok());
    /// tm_client_id.map(|id| { assert_eq!(&id, "07-tendermint-0") });
    /// ```
    pub fn new(client_type_prefix: &str, counter: u64) -> Result<Self, ValidationError> {
        format!("{client_type_prefix}-{counter}").parse()
    }
}

impl ConnectionId {
    /// Builds a new connection identifier. Connection identifiers are deterministically formed from
    /// two elements: a prefix `prefix`, and a monotonically increasing `counter`; these are
    /// separated by a dash "-". The prefix is currently determined statically (see
    /// `ConnectionId::prefix()`) so this method accepts a single argument, the `counter`.
    ///
    /// ```
    /// # use ibc_refresher_types::identifier::ConnectionId;
    /// let conn_id = ConnectionId::new(11);
    /// assert_eq!(&conn_id, "connection-11");
    /// ```
    pub fn new(identifier: u64) -> Self {
        Self(format!("{}-{}", Self::prefix(), identifier))
    }

    /// Returns the static prefix to be used across all connection identifiers.
    pub fn prefix() -> &'static str {
        "connection"
    }
}

impl ChannelId {
    /// Builds a new channel identifier. Like client and connection identifiers, channel ids are
    /// deterministically formed from two elements: a prefix `prefix`, and a monotonically
    /// increasing `counter`, separated by a dash "-".
    ///
    /// ```
    /// # use ibc_refresher_types::identifier::ChannelId;
    /// let chan_id = ChannelId::new(27);
    /// assert_eq!(chan_id.to_string(), "channel-27");
    /// ```
    pub fn new(identifier: u64) -> Self {
        Self(format!("{}-{}", Self::prefix(), identifier))
    }

    pub fn prefix() -> &'static str {
        "channel"
    }
}

impl PortId {
    pub fn transfer() -> Self {
        Self("transfer".to_string())
    }
}
