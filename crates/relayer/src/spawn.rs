use flex_error::define_error;

use ibc_refresher_types::identifier::ChainId;

use crate::{
    chain::{handle::BaseChainHandle, mock::MockChain, runtime::ChainRuntime, ChainType},
    config::{ChainConfig, Config},
    error::Error as RelayerError,
};

define_error! {
    SpawnError {
        Relayer
            [ RelayerError ]
            | _ | { "relayer error" },

        MissingChainConfig
            { chain_id: ChainId }
            | e | {
                format_args!("missing chain config for '{}' in configuration file", e.chain_id)
            },
    }
}

/// Spawns a chain runtime from the configuration and given a chain identifier.
/// Returns the corresponding handle if successful.
pub fn spawn_chain_runtime(
    config: &Config,
    chain_id: &ChainId,
) -> Result<BaseChainHandle, SpawnError> {
    let chain_config = config
        .find_chain(chain_id)
        .cloned()
        .ok_or_else(|| SpawnError::missing_chain_config(chain_id.clone()))?;

    spawn_chain_runtime_with_config(chain_config)
}

/// Spawns a chain runtime for the given chain config.
/// Returns the corresponding handle if successful.
pub fn spawn_chain_runtime_with_config(
    config: ChainConfig,
) -> Result<BaseChainHandle, SpawnError> {
    let handle = match config.r#type {
        ChainType::Mock => ChainRuntime::<MockChain>::spawn(config),
    }
    .map_err(SpawnError::relayer)?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::handle::ChainHandle;
    use test_log::test;

    #[test]
    fn spawns_configured_chain() {
        let chain_id = ChainId::from_string("ibc-0");
        let config = Config {
            chains: vec![ChainConfig::new(chain_id.clone())],
            ..Config::default()
        };

        let handle = spawn_chain_runtime(&config, &chain_id).unwrap();

        assert_eq!(handle.id(), chain_id);
        assert_eq!(handle.config().unwrap().id, chain_id);

        handle.shutdown().unwrap();
    }

    #[test]
    fn unknown_chain_is_missing() {
        let err = spawn_chain_runtime(&Config::default(), &ChainId::from_string("ibc-9"))
            .unwrap_err();

        assert!(matches!(
            err.detail(),
            SpawnErrorDetail::MissingChainConfig(_)
        ));
    }
}
