use core::time::Duration;

use flex_error::{define_error, TraceError};

use ibc_refresher_types::identifier::ChainId;

define_error! {
    Error {
        Io
            [ TraceError<std::io::Error> ]
            |_| { "config I/O error" },

        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },

        Encode
            [ TraceError<toml::ser::Error> ]
            |_| { "invalid configuration" },

        InvalidLogDirective
            { directive: String, }
            [ TraceError<tracing_subscriber::filter::ParseError> ]
            |e| { format!("invalid log directive: {0:?}", e.directive) },

        ZeroChains
            |_| { "config file does not specify any chain" },

        DuplicateChains
            { chain_id: ChainId }
            |e| { format!("config file has duplicate entry for the chain with id {}", e.chain_id) },

        UnknownChain
            {
                path: String,
                chain_id: ChainId,
            }
            |e| { format!("path '{}' references chain {} which is not configured", e.path, e.chain_id) },

        PathNotMirrored
            { path: String }
            |e| {
                format!("path '{}' must connect two distinct chains with the same channel ordering", e.path)
            },

        ZeroRefreshInterval
            |_| { "relay refresh interval must be greater than zero" },

        ZeroRetryAttempts
            |_| { "retry max_attempts must be at least 1" },

        ZeroBlockTime
            { chain_id: ChainId }
            |e| { format!("block time of chain {} must be greater than zero", e.chain_id) },

        RefreshExceedsTrustingPeriod
            {
                chain_id: ChainId,
                refresh_interval: Duration,
                trusting_period: Duration,
            }
            |e| {
                format!("refresh interval {} is not shorter than the trusting period {} of chain {}, \
                    its light clients will expire between refreshes",
                    humantime::format_duration(e.refresh_interval),
                    humantime::format_duration(e.trusting_period),
                    e.chain_id)
            },
    }
}
