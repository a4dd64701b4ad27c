// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types shared by the scheduling primitives.

/// Broad failure category used by every prompt math error type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed expression or schedule annotation
    Grammar,
    /// A value was rejected at construction time
    Validation,
    /// A name did not resolve to a curve or schedule function
    Lookup,
    /// The caller did not provide enough configuration to proceed
    Configuration,
}

/// Error raised while building or converting schedules
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// Window does not cover a positive duration
    #[error("end_time must be greater than start_time (start={start}, end={end})")]
    InvalidWindow {
        /// Requested start time
        start: f64,
        /// Requested end time
        end: f64,
    },

    /// Curve name did not match any known curve
    #[error("Unknown curve type: {0}")]
    UnknownCurve(String),

    /// A schedule annotation named a curve that does not exist
    #[error("Invalid curve argument: {0:?}")]
    InvalidCurveArgument(String),

    /// Conversion mode requires a parameter that was not supplied
    #[error("{parameter} must be provided for {mode} mode")]
    MissingParameter {
        /// Conversion mode name
        mode: &'static str,
        /// Missing parameter name
        parameter: &'static str,
    },

    /// Conversion parameter must be strictly positive
    #[error("{parameter} must be positive, got {value}")]
    NonPositiveParameter {
        /// Parameter name
        parameter: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Unknown timestep conversion mode
    #[error("Unsupported timestep mode: {0}")]
    UnsupportedMode(String),

    /// Failure reported by a custom schedule builder
    #[error("{0}")]
    Custom(String),
}

impl ScheduleError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCurve(_) => ErrorKind::Lookup,
            Self::InvalidWindow { .. }
            | Self::InvalidCurveArgument(_)
            | Self::MissingParameter { .. }
            | Self::NonPositiveParameter { .. }
            | Self::UnsupportedMode(_)
            | Self::Custom(_) => ErrorKind::Validation,
        }
    }
}
