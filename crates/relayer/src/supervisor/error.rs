use flex_error::define_error;

use ibc_refresher_types::identifier::ChainId;

use crate::{config::Error as ConfigError, director::BindingError, spawn::SpawnError};

define_error! {
    Error {
        UnknownChain
            { chain_id: ChainId }
            |e| { format_args!("chain {} is not present in the configuration", e.chain_id) },

        SameChain
            { chain_id: ChainId }
            |e| {
                format_args!("source and destination must be different chains, both are {}",
                    e.chain_id)
            },

        UnknownPath
            { path: String }
            |e| { format_args!("path '{}' is not present in the configuration", e.path) },

        PathDoesNotConnect
            {
                path: String,
                src_chain: ChainId,
                dst_chain: ChainId,
            }
            |e| {
                format_args!("path '{}' does not connect chain {} to chain {}",
                    e.path, e.src_chain, e.dst_chain)
            },

        Config
            [ ConfigError ]
            |_| { "invalid relay configuration" },

        Spawn
            [ SpawnError ]
            |_| { "supervisor was not able to spawn chain runtime" },

        Binding
            [ BindingError ]
            |_| { "failed to register the path" },

        HandleSend
            |_| { "failed to send a command to the supervisor through a channel" },

        HandleRecv
            |_| { "failed to receive the result of a command from the supervisor through a channel" },
    }
}
