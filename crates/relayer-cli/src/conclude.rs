//! Output of a CLI command, either as plain text or as JSON, together with
//! the matching process exit code.
//!
//! ```ignore
//! Output::error(format!("refresher failed to start: {e}")).exit();
//! Output::success_msg("configuration is valid").exit();
//! ```

use core::fmt::{Display, Error as FmtError, Formatter};
use std::process;

use serde::Serialize;
use tracing::error;

use crate::prelude::app_reader;

/// Print the given output, then exit the process with the matching code.
pub fn exit_with(out: Output) -> ! {
    let status = out.status;

    if json() {
        match serde_json::to_string(&out) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("failed to serialize output to JSON: {}", e),
        }
    } else {
        match &out.result {
            serde_json::Value::Null => println!("{status}"),
            serde_json::Value::String(msg) => println!("{status}: {msg}"),
            result => println!("{status}: {result:#}"),
        }
    }

    match status {
        Status::Success => process::exit(0),
        Status::Error => process::exit(1),
    }
}

/// Returns true if the global `--json` flag is enabled.
pub fn json() -> bool {
    app_reader().json_output()
}

/// A CLI output with support for JSON serialization.
#[derive(Serialize, Debug)]
pub struct Output {
    /// The return status
    pub status: Status,

    /// The result of the command
    pub result: serde_json::Value,
}

impl Output {
    /// An output with the given `status` and an empty `result`.
    pub fn new(status: Status) -> Self {
        Output {
            status,
            result: serde_json::Value::Null,
        }
    }

    /// Builder-style method for attaching a result to an output.
    pub fn with_result(mut self, result: impl Serialize + core::fmt::Debug) -> Self {
        self.result = Self::serialize_result(result);
        self
    }

    /// Builder-style method for attaching a message to an output.
    pub fn with_msg(mut self, msg: impl ToString) -> Self {
        self.result = serde_json::Value::String(msg.to_string());
        self
    }

    /// A successful output carrying `result`.
    pub fn success(result: impl Serialize + core::fmt::Debug) -> Self {
        Output::new(Status::Success).with_result(result)
    }

    /// A successful output carrying a message.
    pub fn success_msg(msg: impl ToString) -> Self {
        Output::new(Status::Success).with_msg(msg)
    }

    /// A failed output carrying an error message.
    pub fn error(msg: impl ToString) -> Self {
        Output::new(Status::Error).with_msg(msg)
    }

    fn serialize_result(res: impl Serialize + core::fmt::Debug) -> serde_json::Value {
        let last_resort = format!("{res:?}");

        match serde_json::to_value(res) {
            Ok(json_val) => json_val,
            Err(e) => {
                error!(
                    "Output constructor failed with non-recoverable error {} for input {}",
                    e, last_resort
                );

                serde_json::Value::String(last_resort)
            }
        }
    }

    /// Exits from the process with the current output. Convenience wrapper over `exit_with`.
    pub fn exit(self) -> ! {
        exit_with(self)
    }
}

/// Represents the exit status of any CLI command
#[derive(Copy, Clone, Serialize, Debug, PartialEq, Eq)]
pub enum Status {
    /// The command succeeded
    #[serde(rename(serialize = "success"))]
    Success,

    /// The command failed
    #[serde(rename(serialize = "error"))]
    Error,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Status::Success => write!(f, "SUCCESS"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}
