// SPDX-License-Identifier: MIT OR Apache-2.0
//! Abstract syntax tree for prompt math expressions.

use indexmap::IndexMap;
use prompt_math_schedule::Literal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed `@ name(args, key=value)` annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCall {
    /// Schedule function name
    pub function_name: String,
    /// Positional arguments in order
    pub args: Vec<Literal>,
    /// Keyword arguments in first-appearance order
    pub kwargs: IndexMap<String, Literal>,
}

impl ScheduleCall {
    /// Create a call with no arguments
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            args: Vec::new(),
            kwargs: IndexMap::new(),
        }
    }

    /// Append a positional argument
    pub fn with_arg(mut self, value: impl Into<Literal>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Positional argument at `index`
    pub fn arg(&self, index: usize) -> Option<&Literal> {
        self.args.get(index)
    }

    /// Keyword argument by name
    pub fn kwarg(&self, key: &str) -> Option<&Literal> {
        self.kwargs.get(key)
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `-`
    Sub,
    /// `+`
    Add,
    /// `*`
    Mul,
}

impl BinaryOp {
    /// Order in which the parser looks for a top-level split
    pub const PRIORITY: [BinaryOp; 3] = [BinaryOp::Sub, BinaryOp::Add, BinaryOp::Mul];

    /// Operator character
    pub fn symbol(&self) -> char {
        match self {
            Self::Sub => '-',
            Self::Add => '+',
            Self::Mul => '*',
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    /// Token leaf, optionally scheduled
    Token {
        /// Token identifier
        value: String,
        /// Attached annotation
        schedule: Option<ScheduleCall>,
    },
    /// Binary operation
    Operator {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<AstNode>,
        /// Right operand
        right: Box<AstNode>,
    },
}

impl AstNode {
    /// Unscheduled token leaf
    pub fn token(value: impl Into<String>) -> Self {
        Self::Token {
            value: value.into(),
            schedule: None,
        }
    }

    /// Operator node
    pub fn operator(op: BinaryOp, left: AstNode, right: AstNode) -> Self {
        Self::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Whether this node is a token leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Token { .. })
    }

    /// Annotation on a token leaf
    pub fn schedule(&self) -> Option<&ScheduleCall> {
        match self {
            Self::Token { schedule, .. } => schedule.as_ref(),
            Self::Operator { .. } => None,
        }
    }

    /// Token leaves in left-to-right order
    pub fn tokens(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Token { value, .. } => out.push(value),
            Self::Operator { left, right, .. } => {
                left.collect_tokens(out);
                right.collect_tokens(out);
            }
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token { value, schedule: None } => write!(f, "[{value}]"),
            Self::Token {
                value,
                schedule: Some(call),
            } => {
                write!(f, "[{value}] @ {}(", call.function_name)?;
                let args = call.args.iter().map(display_literal);
                let kwargs = call
                    .kwargs
                    .iter()
                    .map(|(k, v)| format!("{k}={}", display_literal(v)));
                let parts: Vec<String> = args.chain(kwargs).collect();
                write!(f, "{})", parts.join(", "))
            }
            Self::Operator { op, left, right } => write!(f, "[{left} {op} {right}]"),
        }
    }
}

fn display_literal(value: &Literal) -> String {
    match value {
        Literal::Str(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_in_order() {
        let ast = AstNode::operator(
            BinaryOp::Add,
            AstNode::operator(BinaryOp::Sub, AstNode::token("king"), AstNode::token("man")),
            AstNode::token("woman"),
        );
        assert_eq!(ast.tokens(), vec!["king", "man", "woman"]);
        assert!(!ast.is_leaf());
        assert!(ast.schedule().is_none());
    }

    #[test]
    fn test_display() {
        let scheduled = AstNode::Token {
            value: "a".into(),
            schedule: Some(ScheduleCall::new("fade_in").with_arg(0.2).with_arg("smooth").with_kwarg("tag", true)),
        };
        let ast = AstNode::operator(BinaryOp::Mul, scheduled, AstNode::token("b"));
        assert_eq!(ast.to_string(), "[[a] @ fade_in(0.2, \"smooth\", tag=true) * [b]]");
    }

    #[test]
    fn test_json_shape() {
        let scheduled = AstNode::Token {
            value: "a".into(),
            schedule: Some(ScheduleCall::new("fade_out").with_arg(0.5).with_kwarg("curve", "smooth")),
        };
        let ast = AstNode::operator(BinaryOp::Sub, scheduled, AstNode::token("b"));

        let json = serde_json::to_value(&ast).unwrap();
        assert_eq!(json["Operator"]["op"], "Sub");
        assert_eq!(json["Operator"]["right"]["Token"]["schedule"], serde_json::Value::Null);
        let call = &json["Operator"]["left"]["Token"]["schedule"];
        assert_eq!(call["function_name"], "fade_out");
        assert_eq!(call["args"], serde_json::json!([0.5]));
        assert_eq!(call["kwargs"], serde_json::json!({"curve": "smooth"}));

        let loaded: AstNode = serde_json::from_value(json).unwrap();
        assert_eq!(loaded, ast);
    }
}
