pub mod endpoint;
pub mod handle;
pub mod mock;
pub mod runtime;

use serde::{Deserialize, Serialize};

/// Kind of chain endpoint to bootstrap for a configured chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainType {
    /// In-process chain, see [`mock::MockChain`].
    Mock,
}
