// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the command line driver.

use prompt_math_expr::{EvaluationError, ParseError};
use prompt_math_schedule::{ErrorKind, ScheduleError};
use std::path::PathBuf;

/// Anything that can stop a command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read or written
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid RON
    #[error("Invalid settings file {}: {source}", path.display())]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Parser failure
        #[source]
        source: ron::error::SpannedError,
    },

    /// Token library could not be decoded or is unusable
    #[error("Invalid token library {}: {message}", path.display())]
    Library {
        /// Library file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Library file extension is neither `json` nor `ron`
    #[error("Unsupported token library format: {}", path.display())]
    UnsupportedFormat {
        /// Library file
        path: PathBuf,
    },

    /// Configured pad token is missing from the library
    #[error("Pad token {0:?} is not present in the token library")]
    MissingPadToken(String),

    /// Expression did not parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Expression did not evaluate
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Timestep conversion failed
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Output could not be serialized
    #[error("Failed to serialize output: {0}")]
    Output(String),

    /// `log_filter` or `RUST_LOG` is not a valid filter
    #[error("Invalid log filter: {0}")]
    LogFilter(String),
}

impl CliError {
    /// Category of the failure, when it comes from the core crates
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(err) => err.kind(),
            Self::Evaluation(err) => err.kind(),
            Self::Schedule(err) => err.kind(),
            Self::MissingPadToken(_) => ErrorKind::Lookup,
            Self::Io { .. }
            | Self::Settings { .. }
            | Self::Library { .. }
            | Self::UnsupportedFormat { .. }
            | Self::Output(_)
            | Self::LogFilter(_) => ErrorKind::Configuration,
        }
    }

    /// Process exit code: 2 for malformed input, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Grammar | ErrorKind::Validation => 2,
            ErrorKind::Lookup | ErrorKind::Configuration => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<ron::Error> for CliError {
    fn from(err: ron::Error) -> Self {
        Self::Output(err.to_string())
    }
}
