//! Path ends bind a light client, connection, channel and port on one chain.
//! A [`Path`] pairs two such ends, each one referencing the other's chain as
//! its counterparty.

use core::{
    fmt::{Display, Error as FmtError, Formatter},
    str::FromStr,
};

use serde_derive::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    identifier::{ChainId, ChannelId, ClientId, ConnectionId, PortId},
};

/// Channel delivery ordering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Unordered,
    Ordered,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unordered => "ORDER_UNORDERED",
            Self::Ordered => "ORDER_ORDERED",
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Order {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches("order_") {
            "unordered" => Ok(Self::Unordered),
            "ordered" => Ok(Self::Ordered),
            _ => Err(ValidationError::invalid_order(s.to_string())),
        }
    }
}

/// One chain-side binding of a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathEnd {
    pub chain_id: ChainId,
    pub client_id: ClientId,
    pub connection_id: ConnectionId,
    pub channel_id: ChannelId,
    pub port_id: PortId,
    #[serde(default)]
    pub order: Order,
}

impl Display for PathEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}:{}/{}/{}/{}",
            self.chain_id, self.client_id, self.connection_id, self.port_id, self.channel_id
        )
    }
}

/// A pair of path ends on two distinct chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Path {
    pub src: PathEnd,
    pub dst: PathEnd,
}

impl Path {
    /// Returns `true` if the two ends are on two distinct chains and agree on
    /// the channel ordering.
    pub fn is_mirrored(&self) -> bool {
        self.src.chain_id != self.dst.chain_id && self.src.order == self.dst.order
    }

    /// Returns `true` if this path connects exactly the two given chains.
    pub fn connects(&self, a: &ChainId, b: &ChainId) -> bool {
        (self.src.chain_id == *a && self.dst.chain_id == *b)
            || (self.src.chain_id == *b && self.dst.chain_id == *a)
    }

    /// Orients the path so that its `src` end lives on the given chain.
    /// Returns `None` if neither end is on that chain.
    pub fn oriented_from(&self, chain_id: &ChainId) -> Option<Path> {
        if self.src.chain_id == *chain_id {
            Some(self.clone())
        } else if self.dst.chain_id == *chain_id {
            Some(self.clone().reversed())
        } else {
            None
        }
    }

    /// Swap the two ends.
    pub fn reversed(self) -> Path {
        Path {
            src: self.dst,
            dst: self.src,
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{} <-> {}", self.src, self.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn end(chain: &str, n: u64) -> PathEnd {
        PathEnd {
            chain_id: ChainId::from_string(chain),
            client_id: ClientId::new("07-tendermint", n).unwrap(),
            connection_id: ConnectionId::new(n),
            channel_id: ChannelId::new(n),
            port_id: PortId::transfer(),
            order: Order::Unordered,
        }
    }

    #[test]
    fn orientation() {
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-1", 1),
        };

        let a = ChainId::from_string("ibc-0");
        let b = ChainId::from_string("ibc-1");
        let c = ChainId::from_string("ibc-2");

        assert!(path.is_mirrored());
        assert!(path.connects(&a, &b));
        assert!(path.connects(&b, &a));
        assert!(!path.connects(&a, &c));

        let from_b = path.oriented_from(&b).unwrap();
        assert_eq!(from_b.src.chain_id, b);
        assert_eq!(from_b.dst.chain_id, a);
        assert!(path.oriented_from(&c).is_none());
    }

    #[test]
    fn same_chain_is_not_mirrored() {
        let path = Path {
            src: end("ibc-0", 0),
            dst: end("ibc-0", 1),
        };

        assert!(!path.is_mirrored());
    }

    #[test]
    fn parse_order() {
        assert_eq!("ordered".parse::<Order>().unwrap(), Order::Ordered);
        assert_eq!("ORDER_UNORDERED".parse::<Order>().unwrap(), Order::Unordered);
        assert!("fifo".parse::<Order>().is_err());
    }
}
