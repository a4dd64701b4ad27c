// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while parsing and evaluating expressions.

use crate::ast::BinaryOp;
use prompt_math_schedule::{ErrorKind, ScheduleError};

/// Error when parsing an expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Input was empty
    #[error("Expression must not be empty")]
    EmptyExpression,

    /// A `[` or `]` has no partner
    #[error("Unbalanced bracket at byte {position}")]
    UnbalancedBrackets {
        /// Byte offset of the offending bracket
        position: usize,
    },

    /// Text after `@` was blank
    #[error("Schedule declaration is empty")]
    EmptySchedule,

    /// Text after `@` is not `name(...)`
    #[error("Invalid schedule syntax: {0:?}")]
    InvalidSchedule(String),

    /// A token literal was blank
    #[error("Empty token expression encountered")]
    EmptyToken,
}

impl ParseError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyToken => ErrorKind::Validation,
            Self::EmptyExpression
            | Self::UnbalancedBrackets { .. }
            | Self::EmptySchedule
            | Self::InvalidSchedule(_) => ErrorKind::Grammar,
        }
    }
}

/// Error when instantiating a schedule from an annotation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    /// No builder registered under this name
    #[error("Unknown schedule function: {0}")]
    UnknownFunction(String),

    /// The builder rejected its arguments
    #[error("Failed to build {function} schedule: {source}")]
    Build {
        /// Schedule function name
        function: String,
        /// Underlying failure
        #[source]
        source: ScheduleError,
    },
}

impl FactoryError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFunction(_) => ErrorKind::Lookup,
            Self::Build { source, .. } => source.kind(),
        }
    }
}

/// Error during evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// Schedule instantiation failed
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// Token had no vector and nothing could pad it
    #[error("No vector for token {token:?}; provide a pad source or a shape hint")]
    MissingVector {
        /// Unresolved token
        token: String,
    },

    /// Operands have different lengths
    #[error("Cannot apply {op} to vectors of length {left} and {right}")]
    ShapeMismatch {
        /// Operator
        op: BinaryOp,
        /// Left length
        left: usize,
        /// Right length
        right: usize,
    },
}

impl EvaluationError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Factory(err) => err.kind(),
            Self::MissingVector { .. } => ErrorKind::Configuration,
            Self::ShapeMismatch { .. } => ErrorKind::Validation,
        }
    }
}
