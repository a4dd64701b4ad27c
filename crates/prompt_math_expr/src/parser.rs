// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive-descent parser for bracketed prompt math expressions.
//!
//! Grammar, informally:
//! - any number of `[ ... ]` pairs wrapping the whole input are stripped
//! - a top-level `@` splits an operand from its `name(args)` annotation
//! - otherwise the first top-level `-`, then `+`, then `*` splits the input
//!   into two operands (operators are tried in that order, not by position)
//! - operands containing a top-level operator or `@` are reparsed the same
//!   way; anything else is a token literal
//!
//! "Top-level" means outside every `[...]` and `(...)` group. Inside an
//! argument list, brackets and commas within `'...'` or `"..."` are text.

use crate::ast::{AstNode, BinaryOp, ScheduleCall};
use crate::error::ParseError;
use indexmap::IndexMap;
use prompt_math_schedule::Literal;

/// Parse an expression such as `"[[ [king] - [man] + [woman] ]]"`
pub fn parse(expression: &str) -> Result<AstNode, ParseError> {
    if expression.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    check_brackets(expression)?;

    let ast = parse_expression(expression)?;
    tracing::debug!(expression, tokens = ?ast.tokens(), "parsed expression");
    Ok(ast)
}

/// Parse an annotation body such as `"fade_in(0.2, 0.8, curve=\"smooth\")"`
pub fn parse_schedule(text: &str) -> Result<ScheduleCall, ParseError> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Err(ParseError::EmptySchedule);
    }
    if !stripped.ends_with(')') {
        return Err(ParseError::InvalidSchedule(text.to_string()));
    }
    let Some((name, rest)) = stripped.split_once('(') else {
        return Err(ParseError::InvalidSchedule(text.to_string()));
    };

    // `rest` ends with the closing parenthesis
    let (args, kwargs) = parse_arguments(&rest[..rest.len() - 1]);
    Ok(ScheduleCall {
        function_name: name.trim().to_string(),
        args,
        kwargs,
    })
}

fn parse_expression(expression: &str) -> Result<AstNode, ParseError> {
    if expression.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let inner = strip_outer(expression);

    if let Some((operand, annotation)) = split_top_level(inner, '@') {
        let mut node = parse_operand(operand)?;
        let call = parse_schedule(annotation)?;
        attach_schedule(&mut node, call);
        return Ok(node);
    }

    for op in BinaryOp::PRIORITY {
        if let Some((left, right)) = split_top_level(inner, op.symbol()) {
            let left = parse_operand(left)?;
            let right = parse_operand(right)?;
            return Ok(AstNode::operator(op, left, right));
        }
    }

    parse_operand(inner)
}

fn parse_operand(text: &str) -> Result<AstNode, ParseError> {
    let stripped = strip_outer(text);
    if looks_like_binary(stripped) || split_top_level(stripped, '@').is_some() {
        return parse_expression(stripped);
    }
    Ok(AstNode::token(parse_token(stripped)?))
}

fn parse_token(text: &str) -> Result<String, ParseError> {
    let mut token = text.trim();
    if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        token = inner.trim();
    }
    if token.is_empty() {
        return Err(ParseError::EmptyToken);
    }
    Ok(token.to_string())
}

fn attach_schedule(node: &mut AstNode, call: ScheduleCall) {
    match node {
        AstNode::Token { schedule, .. } => *schedule = Some(call),
        AstNode::Operator { op, .. } => {
            tracing::warn!(
                function = %call.function_name,
                %op,
                "schedule annotation on an operator sub-expression is ignored"
            );
        }
    }
}

fn parse_arguments(text: &str) -> (Vec<Literal>, IndexMap<String, Literal>) {
    let mut args = Vec::new();
    let mut kwargs = IndexMap::new();
    if text.trim().is_empty() {
        return (args, kwargs);
    }

    for chunk in split_arguments(text) {
        match chunk.split_once('=') {
            Some((key, value)) => {
                kwargs.insert(key.trim().to_string(), Literal::coerce(value.trim()));
            }
            None => args.push(Literal::coerce(chunk)),
        }
    }
    (args, kwargs)
}

/// Split on commas that are not nested in brackets, parentheses or quotes
fn split_arguments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut quotes = QuoteState::in_arguments();

    for (index, ch) in text.char_indices() {
        if quotes.quoted(ch) {
            continue;
        }
        match ch {
            ',' if depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + 1;
            }
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    parts.push(text[start..].trim());

    parts.retain(|part| !part.is_empty());
    parts
}

/// Split around the first top-level `separator`
fn split_top_level(text: &str, separator: char) -> Option<(&str, &str)> {
    let mut depth: i64 = 0;
    let mut quotes = QuoteState::default();
    for (index, ch) in text.char_indices() {
        if quotes.quoted(ch) {
            continue;
        }
        match ch {
            '[' | '(' => depth += 1,
            ']' => depth = (depth - 1).max(0),
            ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                return Some((&text[..index], &text[index + c.len_utf8()..]));
            }
            _ => {}
        }
    }
    None
}

fn looks_like_binary(text: &str) -> bool {
    BinaryOp::PRIORITY
        .iter()
        .any(|op| split_top_level(text, op.symbol()).is_some())
}

/// Strip `[...]` pairs that wrap the entire text
fn strip_outer(text: &str) -> &str {
    let mut stripped = text.trim();
    while stripped.starts_with('[') {
        let last = last_char_index(stripped);
        let closing = matching_bracket(stripped).unwrap_or(last);
        if closing != last {
            break;
        }
        stripped = if closing >= 1 {
            stripped[1..closing].trim()
        } else {
            ""
        };
    }
    stripped
}

/// Byte index of the `]` matching the `[` at index 0
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0i64;
    let mut quotes = QuoteState::default();
    for (index, ch) in text.char_indices() {
        if quotes.quoted(ch) {
            continue;
        }
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn last_char_index(text: &str) -> usize {
    text.char_indices().last().map_or(0, |(index, _)| index)
}

fn check_brackets(text: &str) -> Result<(), ParseError> {
    let mut open = Vec::new();
    let mut quotes = QuoteState::default();
    for (index, ch) in text.char_indices() {
        if quotes.quoted(ch) {
            continue;
        }
        match ch {
            '[' => open.push(index),
            ']' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedBrackets { position: index });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(ParseError::UnbalancedBrackets { position }),
        None => Ok(()),
    }
}

/// Tracks string literals in annotation argument lists.
///
/// Quotes only open a string inside parentheses, so apostrophes in token
/// text stay plain characters.
#[derive(Default)]
struct QuoteState {
    parens: usize,
    quote: Option<char>,
}

impl QuoteState {
    fn in_arguments() -> Self {
        Self {
            parens: 1,
            quote: None,
        }
    }

    /// Feed the next character; true when it belongs to a string literal
    fn quoted(&mut self, ch: char) -> bool {
        if let Some(quote) = self.quote {
            if ch == quote {
                self.quote = None;
            }
            return true;
        }
        match ch {
            '(' => self.parens += 1,
            ')' => self.parens = self.parens.saturating_sub(1),
            '"' | '\'' if self.parens > 0 => {
                self.quote = Some(ch);
                return true;
            }
            _ => {}
        }
        false
    }
}
