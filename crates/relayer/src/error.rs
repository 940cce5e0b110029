//! This module defines the various errors that can be raised by a chain
//! endpoint and the machinery that talks to it.

use flex_error::{define_error, TraceError};

use ibc_refresher_types::{
    error::ValidationError,
    identifier::{ChainId, ClientId},
    timestamp::TimestampOverflowError,
    tx::TxHash,
};

define_error! {
    Error {
        ChannelSend
            |_| { "internal message-passing failure while sending inter-thread request/response" },

        ChannelReceive
            [ TraceError<crossbeam_channel::RecvError> ]
            |_| { "internal message-passing failure while receiving inter-thread request/response" },

        Validation
            [ ValidationError ]
            |_| { "invalid identifier or message" },

        TimestampOverflow
            [ TimestampOverflowError ]
            |_| { "timestamp overflow" },

        TxEncode
            [ TraceError<serde_json::Error> ]
            |_| { "failed to encode transaction" },

        EmptyTx
            { chain_id: ChainId }
            |e| { format_args!("refusing to sign an empty transaction for chain {}", e.chain_id) },

        SignerMismatch
            {
                chain_id: ChainId,
                expected: String,
                actual: String,
            }
            |e| {
                format_args!("message signer {} does not match the key {} configured for chain {}",
                    e.actual, e.expected, e.chain_id)
            },

        ClientNotFound
            {
                chain_id: ChainId,
                client_id: ClientId,
            }
            |e| { format_args!("light client {} not found on chain {}", e.client_id, e.chain_id) },

        PathChainMismatch
            {
                chain_id: ChainId,
                path_chain_id: ChainId,
            }
            |e| {
                format_args!("cannot bind a path end of chain {} on chain {}",
                    e.path_chain_id, e.chain_id)
            },

        PathConflict
            {
                chain_id: ChainId,
                client_id: ClientId,
            }
            |e| {
                format_args!("client {} on chain {} is already bound to a different path",
                    e.client_id, e.chain_id)
            },

        TxNotFound
            {
                chain_id: ChainId,
                hash: TxHash,
            }
            |e| { format_args!("transaction {} not found on chain {}", e.hash, e.chain_id) },

        Rpc
            {
                chain_id: ChainId,
                reason: String,
            }
            |e| { format_args!("RPC error to chain {}: {}", e.chain_id, e.reason) },
    }
}

impl Error {
    pub fn send<T>(_: crossbeam_channel::SendError<T>) -> Error {
        Error::channel_send()
    }
}
