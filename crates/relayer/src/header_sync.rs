use flex_error::define_error;
use tracing::{debug, instrument};

use ibc_refresher_types::{
    client_state::{AnyClientState, ClientState},
    header::{AnyHeader, Header},
    height::Height,
    identifier::ChainId,
};

use crate::{chain::handle::ChainHandle, error::Error};

define_error! {
    HeaderSyncError {
        Fetch
            { chain_id: ChainId }
            [ Error ]
            |e| { format_args!("failed to fetch the latest header from chain {}", e.chain_id) },

        ChainMismatch
            {
                expected: ChainId,
                actual: ChainId,
            }
            |e| {
                format_args!("header from chain {} cannot update a client tracking chain {}",
                    e.actual, e.expected)
            },

        NodeBehind
            {
                chain_id: ChainId,
                header_height: Height,
                client_height: Height,
            }
            |e| {
                format_args!("node of chain {} is behind: latest header is at height {}, client is already at height {}",
                    e.chain_id, e.header_height, e.client_height)
            },
    }
}

/// Fetch from the `dst` chain a header of its own that can update a client
/// in state `client_state` tracking it.
///
/// The header is fetched fresh on every call and never retried here.
#[instrument(
    name = "fetch_update_header",
    level = "debug",
    skip_all,
    fields(dst_chain = %dst.id(), client_height = %client_state.latest_height()),
)]
pub fn fetch_update_header<DstChain: ChainHandle>(
    dst: &DstChain,
    client_state: &AnyClientState,
) -> Result<AnyHeader, HeaderSyncError> {
    let header = dst
        .fetch_latest_header()
        .map_err(|e| HeaderSyncError::fetch(dst.id(), e))?;

    let tracked_chain = client_state.chain_id();
    if header.chain_id() != tracked_chain {
        return Err(HeaderSyncError::chain_mismatch(
            tracked_chain,
            header.chain_id(),
        ));
    }

    if header.height() <= client_state.latest_height() {
        return Err(HeaderSyncError::node_behind(
            header.chain_id(),
            header.height(),
            client_state.latest_height(),
        ));
    }

    debug!(height = %header.height(), timestamp = %header.timestamp(), "fetched header");

    Ok(header)
}
