//! CLI-specific error types.
//!
//! Everything here is fatal to the command that raised it; the process
//! prints one line and exits non-zero.

use std::fmt;
use std::io;

use crate::ledger::LedgerError;
use crate::service::ServiceError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// A file argument could not be read or written
    IoError,
    /// Ledger input unreadable or not a delivery array
    BadLedger,
    /// A stdin command line could not be understood
    BadCommand,
    /// The service refused or failed an operation
    MatchFailed,
    /// Async runtime could not start
    RuntimeError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "SCORE_CLI_IO_ERROR",
            Self::BadLedger => "SCORE_CLI_BAD_LEDGER",
            Self::BadCommand => "SCORE_CLI_BAD_COMMAND",
            Self::MatchFailed => "SCORE_CLI_MATCH_FAILED",
            Self::RuntimeError => "SCORE_CLI_RUNTIME_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Ledger input error
    pub fn bad_ledger(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadLedger, msg)
    }

    /// Malformed stdin command
    pub fn bad_command(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadCommand, msg)
    }

    /// Service-level failure
    pub fn match_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::MatchFailed, msg)
    }

    /// Runtime failure
    pub fn runtime_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RuntimeError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        Self::bad_ledger(format!("{}: {}", e.code(), e))
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        Self::match_failed(format!("{}: {}", e.code(), e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::match_failed(format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
