use flex_error::define_error;
use serde::Serialize;

define_error! {
    #[derive(Debug, PartialEq, Eq, Serialize)]
    ValidationError {
        ContainSeparator
            { id : String }
            | e | { format_args!("identifier {0} cannot contain separator '/'", e.id) },

        InvalidLength
            {
                id: String,
                length: usize,
                min: usize,
                max: usize,
            }
            | e | { format_args!("identifier {0} has invalid length {1} must be between {2}-{3} characters", e.id, e.length, e.min, e.max) },

        InvalidCharacter
            { id: String }
            | e | { format_args!("identifier {0} must only contain alphanumeric characters or `.`, `_`, `+`, `-`, `#`, - `[`, `]`, `<`, `>`", e.id) },

        Empty
            | _ | { "identifier cannot be empty" },

        ChainIdInvalidFormat
            { id: String }
            | e | { format_args!("chain identifiers are expected to be in epoch format {0}", e.id) },

        EmptySigner
            | _ | { "signer cannot be empty" },

        ZeroHeight
            | _ | { "revision height cannot be zero" },

        InvalidHeight
            { height: String }
            | e | { format_args!("cannot parse height '{0}', expected format `<revision>-<height>`", e.height) },

        InvalidOrder
            { order: String }
            | e | { format_args!("unknown channel ordering '{0}', expected `ordered` or `unordered`", e.order) },

        InvalidTxHash
            { hash: String }
            | e | { format_args!("invalid transaction hash '{0}', expected 64 hexadecimal characters", e.hash) },
    }
}
