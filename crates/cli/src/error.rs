//! Failure reporting for `holofield`.
//!
//! Scripts that batch-render scenes branch on the exit status, so each
//! failure class has its own code. Clap exits with 2 on bad flags before
//! `run` is reached.
//!
//! | code | cause |
//! |------|-------|
//! | 10 | field rejected the scene: unknown name, bad params, zero size, bad color |
//! | 11 | scene file unreadable or PNG not writable |
//! | 12 | malformed `--params`, `--pointer` or scene JSON, or no field given |
//! | 13 | report could not be encoded as JSON |

use holofield_core::FieldError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Field(FieldError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Field(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Field(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

/// A failed PNG write surfaces from the field layer as `FieldError::Io` but
/// is reported with the I/O code.
impl From<FieldError> for CliError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Io(msg) => CliError::Io(msg),
            other => CliError::Field(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
