// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal values carried by schedule annotations and schedule metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coerced annotation argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Boolean literal (`true` / `false`, any case)
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal (contains `.` or an exponent marker)
    Float(f64),
    /// Quoted string, or any text that is not a number or boolean
    Str(String),
}

impl Literal {
    /// Coerce raw argument text.
    ///
    /// The order is fixed: quoted string, then number (float when the text
    /// contains `.`, `e` or `E`, integer otherwise), then boolean, and
    /// finally the raw text itself.
    pub fn coerce(text: &str) -> Self {
        if let Some(inner) = unquote(text, '"').or_else(|| unquote(text, '\'')) {
            return Self::Str(inner.to_string());
        }

        let looks_float = text.contains('.') || text.contains('e') || text.contains('E');
        let number = if looks_float {
            text.trim().parse::<f64>().ok().map(Self::Float)
        } else {
            text.trim().parse::<i64>().ok().map(Self::Int)
        };
        if let Some(number) = number {
            return number;
        }

        match text.to_lowercase().as_str() {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Str(text.to_string()),
        }
    }

    /// Lenient float view: numbers as-is, booleans as 1/0, numeric strings parsed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Str(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Whether the value counts as "unset" when picking between alternatives
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Str(s) => s.is_empty(),
        }
    }
}

/// Strip a matching pair of quotes. A lone quote character yields an empty string.
fn unquote(text: &str, quote: char) -> Option<&str> {
    if !text.starts_with(quote) || !text.ends_with(quote) {
        return None;
    }
    if text.len() < 2 {
        return Some("");
    }
    Some(&text[1..text.len() - 1])
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}
