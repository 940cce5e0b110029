//! Refresher configuration

pub mod error;

use alloc::collections::BTreeMap;
use core::{
    fmt::{Display, Error as FmtError, Formatter},
    time::Duration,
};
use std::{fs, fs::File, io::Write, path::Path as FsPath};

use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};

use ibc_refresher_types::{
    identifier::{ChainId, ChannelId, ClientId, ConnectionId, PortId},
    path::{Order, Path, PathEnd},
};

use crate::chain::ChainType;

pub use error::Error;

pub mod default {
    use super::*;

    pub fn chain_type() -> ChainType {
        ChainType::Mock
    }

    pub fn account_prefix() -> String {
        "cosmos".to_string()
    }

    pub fn key_name() -> String {
        "testkey".to_string()
    }

    pub fn block_time() -> Duration {
        Duration::from_secs(1)
    }

    /// Two weeks, the usual trusting period of a Cosmos SDK client.
    pub fn trusting_period() -> Duration {
        Duration::from_secs(14 * 24 * 3600)
    }

    pub fn refresh_interval() -> Duration {
        Duration::from_secs(2 * 60)
    }

    pub fn cycle_error_pause() -> Duration {
        Duration::from_secs(1)
    }

    pub fn max_attempts() -> u32 {
        100
    }

    pub fn retry_delay() -> Duration {
        Duration::from_millis(100)
    }
}

/// Outcome of [`Config::validate_config`] when the configuration is not
/// entirely sound. Warnings are logged, errors prevent the refresher from
/// starting.
#[derive(Debug)]
pub enum Diagnostic<E> {
    Warning(E),
    Error(E),
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<ChainConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathConfig>,
}

impl Config {
    pub fn find_chain(&self, id: &ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.id == *id)
    }

    pub fn find_chain_mut(&mut self, id: &ChainId) -> Option<&mut ChainConfig> {
        self.chains.iter_mut().find(|c| c.id == *id)
    }

    /// Look up a path by name.
    pub fn find_path(&self, name: &str) -> Option<Path> {
        self.paths.get(name).map(PathConfig::to_path)
    }

    /// Syntactic and semantic validation of the configuration.
    ///
    /// Returns the first problem found. Problems that would prevent a relay
    /// from working are reported as [`Diagnostic::Error`], problems that only
    /// risk degrading it are reported as [`Diagnostic::Warning`].
    pub fn validate_config(&self) -> Result<(), Diagnostic<Error>> {
        if self.chains.is_empty() {
            return Err(Diagnostic::Error(Error::zero_chains()));
        }

        if let Some(chain_id) = self.chains.iter().map(|c| &c.id).duplicates().next() {
            return Err(Diagnostic::Error(Error::duplicate_chains(chain_id.clone())));
        }

        for chain in &self.chains {
            if chain.block_time.is_zero() {
                return Err(Diagnostic::Error(Error::zero_block_time(chain.id.clone())));
            }
        }

        for (name, path) in &self.paths {
            for end in [&path.src, &path.dst] {
                if self.find_chain(&end.chain_id).is_none() {
                    return Err(Diagnostic::Error(Error::unknown_chain(
                        name.clone(),
                        end.chain_id.clone(),
                    )));
                }
            }

            if !path.to_path().is_mirrored() {
                return Err(Diagnostic::Error(Error::path_not_mirrored(name.clone())));
            }
        }

        if self.relay.refresh_interval.is_zero() {
            return Err(Diagnostic::Error(Error::zero_refresh_interval()));
        }

        if self.relay.retry.max_attempts == 0 {
            return Err(Diagnostic::Error(Error::zero_retry_attempts()));
        }

        self.validate_refresh_interval(self.relay.refresh_interval)
            .map_err(Diagnostic::Warning)
    }

    /// Checks that the given refresh interval is shorter than the trusting
    /// period of every configured chain.
    pub fn validate_refresh_interval(&self, refresh_interval: Duration) -> Result<(), Error> {
        match self
            .chains
            .iter()
            .find(|c| refresh_interval >= c.trusting_period)
        {
            Some(chain) => Err(Error::refresh_exceeds_trusting_period(
                chain.id.clone(),
                refresh_interval,
                chain.trusting_period,
            )),
            None => Ok(()),
        }
    }
}

/// Log levels are wrappers over [`tracing_core::Level`].
///
/// [`tracing_core::Level`]: https://docs.rs/tracing-core/0.1.17/tracing_core/struct.Level.html
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Time between two updates of a light client, measured from the
    /// timestamp of the latest header the client trusts.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,

    /// Pause before the next relay cycle when a cycle failed or its
    /// broadcast did not update the client.
    #[serde(with = "humantime_serde")]
    pub cycle_error_pause: Duration,

    pub retry: RetryConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default::refresh_interval(),
            cycle_error_pause: default::cycle_error_pause(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default::max_attempts(),
            delay: default::retry_delay(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    pub id: ChainId,
    #[serde(rename = "type", default = "default::chain_type")]
    pub r#type: ChainType,
    #[serde(default = "default::account_prefix")]
    pub account_prefix: String,
    #[serde(default = "default::key_name")]
    pub key_name: String,
    #[serde(default = "default::block_time", with = "humantime_serde")]
    pub block_time: Duration,
    #[serde(default = "default::trusting_period", with = "humantime_serde")]
    pub trusting_period: Duration,
}

impl ChainConfig {
    pub fn new(id: ChainId) -> Self {
        Self {
            id,
            r#type: default::chain_type(),
            account_prefix: default::account_prefix(),
            key_name: default::key_name(),
            block_time: default::block_time(),
            trusting_period: default::trusting_period(),
        }
    }
}

/// Identifiers of one end of a configured path.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathEndConfig {
    pub chain_id: ChainId,
    pub client_id: ClientId,
    pub connection_id: ConnectionId,
    pub channel_id: ChannelId,
    pub port_id: PortId,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    #[serde(default)]
    pub ordering: Order,
    pub src: PathEndConfig,
    pub dst: PathEndConfig,
}

impl PathConfig {
    pub fn to_path(&self) -> Path {
        let end = |c: &PathEndConfig| PathEnd {
            chain_id: c.chain_id.clone(),
            client_id: c.client_id.clone(),
            connection_id: c.connection_id.clone(),
            channel_id: c.channel_id.clone(),
            port_id: c.port_id.clone(),
            order: self.ordering,
        };

        Path {
            src: end(&self.src),
            dst: end(&self.dst),
        }
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<FsPath>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path).map_err(Error::io)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::decode)?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given config file.
pub fn store(config: &Config, path: impl AsRef<FsPath>) -> Result<(), Error> {
    let mut file = if path.as_ref().exists() {
        fs::OpenOptions::new().write(true).truncate(true).open(path)
    } else {
        File::create(path)
    }
    .map_err(Error::io)?;

    store_writer(config, &mut file)
}

/// Serialize the given `Config` as TOML to the given writer.
pub fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::encode)?;

    writeln!(writer, "{toml_config}").map_err(Error::io)?;

    Ok(())
}
