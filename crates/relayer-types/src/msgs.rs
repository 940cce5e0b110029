//! Messages the relayer submits to a chain.

use serde_derive::{Deserialize, Serialize};

use crate::{header::AnyHeader, identifier::ClientId, signer::Signer};

pub const UPDATE_CLIENT_TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";

pub trait Msg: Clone {
    /// Unique type identifier for this message.
    fn type_url(&self) -> String;

    fn signer(&self) -> &Signer;
}

/// A message that triggers the update of an on-chain light client with a new header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateClient {
    pub client_id: ClientId,
    pub header: AnyHeader,
    pub signer: Signer,
}

impl MsgUpdateClient {
    pub fn new(client_id: ClientId, header: AnyHeader, signer: Signer) -> Self {
        MsgUpdateClient {
            client_id,
            header,
            signer,
        }
    }
}

impl Msg for MsgUpdateClient {
    fn type_url(&self) -> String {
        UPDATE_CLIENT_TYPE_URL.to_string()
    }

    fn signer(&self) -> &Signer {
        &self.signer
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type_url", content = "value")]
pub enum AnyMsg {
    #[serde(rename = "/ibc.core.client.v1.MsgUpdateClient")]
    UpdateClient(MsgUpdateClient),
}

impl Msg for AnyMsg {
    fn type_url(&self) -> String {
        match self {
            Self::UpdateClient(msg) => msg.type_url(),
        }
    }

    fn signer(&self) -> &Signer {
        match self {
            Self::UpdateClient(msg) => msg.signer(),
        }
    }
}

impl From<MsgUpdateClient> for AnyMsg {
    fn from(msg: MsgUpdateClient) -> Self {
        Self::UpdateClient(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        header::{Header, MockHeader},
        height::Height,
        identifier::ChainId,
        timestamp::Timestamp,
    };
    use test_log::test;

    #[test]
    fn update_client_is_tagged_with_type_url() {
        let header = MockHeader {
            chain_id: ChainId::from_string("ibc-1"),
            height: Height::new(1, 42).unwrap(),
            timestamp: Timestamp::from_nanoseconds(1_700_000_000_000_000_000).unwrap(),
        };

        let msg: AnyMsg = MsgUpdateClient::new(
            ClientId::new("9999-mock", 0).unwrap(),
            header.into(),
            Signer::new("cosmos1relayer").unwrap(),
        )
        .into();

        assert_eq!(msg.type_url(), UPDATE_CLIENT_TYPE_URL);
        assert_eq!(msg.signer().as_str(), "cosmos1relayer");

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type_url"], UPDATE_CLIENT_TYPE_URL);
        assert_eq!(json["value"]["client_id"], "9999-mock-0");

        let AnyMsg::UpdateClient(inner) = serde_json::from_value(json).unwrap();
        assert_eq!(inner.header.height(), Height::new(1, 42).unwrap());
    }
}
