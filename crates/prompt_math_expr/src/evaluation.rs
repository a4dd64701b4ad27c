// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression evaluation and schedule collection.
//!
//! Evaluation walks the tree depth-first, left to right. Token leaves are
//! resolved through a [`TokenLookup`]; annotated leaves also produce a
//! [`TokenSchedule`] through the context's [`ScheduleFactory`]. Schedules are
//! returned in discovery order and, when `auto_register` is set, appended to
//! the context's scheduler as they are found. A context reused across calls
//! keeps accumulating schedules until its scheduler is cleared.

use crate::ast::AstNode;
use crate::error::EvaluationError;
use crate::factory::ScheduleFactory;
use crate::vector::Vector;
use prompt_math_schedule::{AttentionScheduler, TokenIndex, TokenSchedule};
use std::fmt;

/// Resolves token identifiers to vectors
pub trait TokenLookup {
    /// Vector for `token` under `encoder`, if known
    fn lookup(&self, token: &str, encoder: &str) -> Option<Vector>;

    /// Embedding indices forwarded into schedules for `token`
    fn indices(&self, _token: &str, _encoder: &str) -> Vec<TokenIndex> {
        Vec::new()
    }
}

impl<F> TokenLookup for F
where
    F: Fn(&str, &str) -> Option<Vector>,
{
    fn lookup(&self, token: &str, encoder: &str) -> Option<Vector> {
        self(token, encoder)
    }
}

/// Supplies the vector used in place of unresolved tokens
pub trait PadSource {
    /// Pad vector, if one is available
    fn pad(&self) -> Option<Vector>;
}

impl<F> PadSource for F
where
    F: Fn() -> Option<Vector>,
{
    fn pad(&self) -> Option<Vector> {
        self()
    }
}

/// Reusable state for evaluating expressions
pub struct EvaluationContext {
    /// Encoder identifier passed to token lookups
    pub encoder: String,
    /// Registry receiving discovered schedules
    pub scheduler: AttentionScheduler,
    /// Lookup taking precedence over the one passed to [`evaluate`]
    pub token_lookup: Option<Box<dyn TokenLookup>>,
    /// Pad source taking precedence over the one passed to [`evaluate`]
    pub pad_fallback: Option<Box<dyn PadSource>>,
    /// Builders for annotations
    pub factory: ScheduleFactory,
    /// Register schedules in `scheduler` as they are discovered
    pub auto_register: bool,
    /// Length of the zero vector used when no pad vector is available
    pub shape_hint: Option<usize>,
}

impl EvaluationContext {
    /// Create a context with a fresh scheduler and the default factory
    pub fn new(encoder: impl Into<String>) -> Self {
        Self {
            encoder: encoder.into(),
            scheduler: AttentionScheduler::new(),
            token_lookup: None,
            pad_fallback: None,
            factory: ScheduleFactory::new(),
            auto_register: true,
            shape_hint: None,
        }
    }

    /// Use an existing scheduler
    pub fn with_scheduler(mut self, scheduler: AttentionScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Use a custom factory
    pub fn with_factory(mut self, factory: ScheduleFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Enable or disable automatic registration
    pub fn with_auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Set the zero-padding length
    pub fn with_shape_hint(mut self, len: usize) -> Self {
        self.shape_hint = Some(len);
        self
    }

    /// Override the token lookup
    pub fn with_token_lookup(mut self, lookup: impl TokenLookup + 'static) -> Self {
        self.token_lookup = Some(Box::new(lookup));
        self
    }

    /// Override the pad source
    pub fn with_pad_fallback(mut self, pad: impl PadSource + 'static) -> Self {
        self.pad_fallback = Some(Box::new(pad));
        self
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("encoder", &self.encoder)
            .field("scheduler", &self.scheduler)
            .field("token_lookup", &self.token_lookup.is_some())
            .field("pad_fallback", &self.pad_fallback.is_some())
            .field("factory", &self.factory)
            .field("auto_register", &self.auto_register)
            .field("shape_hint", &self.shape_hint)
            .finish()
    }
}

/// Resolve a pad vector for an unresolved token.
///
/// Uses the pad source when it yields a vector, otherwise zeros of
/// `shape_hint` length. Without either the token cannot be evaluated.
pub fn pad_vector(
    pad: Option<&dyn PadSource>,
    shape_hint: Option<usize>,
    token: &str,
) -> Result<Vector, EvaluationError> {
    if let Some(vector) = pad.and_then(|source| source.pad()) {
        return Ok(vector);
    }
    match shape_hint {
        Some(len) => Ok(Vector::zeros(len)),
        None => Err(EvaluationError::MissingVector {
            token: token.to_string(),
        }),
    }
}

/// Evaluate `ast`, returning its vector and the schedules found in it.
///
/// Without a `context` a fresh one is used for this call only. With a
/// context, its own lookup and pad source (when set) take precedence over
/// the arguments, and its encoder is replaced by `encoder`.
pub fn evaluate(
    ast: &AstNode,
    lookup: &dyn TokenLookup,
    encoder: &str,
    pad: Option<&dyn PadSource>,
    context: Option<&mut EvaluationContext>,
) -> Result<(Vector, Vec<TokenSchedule>), EvaluationError> {
    let mut local;
    let ctx = match context {
        Some(ctx) => ctx,
        None => {
            local = EvaluationContext::new(encoder);
            &mut local
        }
    };
    ctx.encoder = encoder.to_string();

    let EvaluationContext {
        encoder,
        scheduler,
        token_lookup,
        pad_fallback,
        factory,
        auto_register,
        shape_hint,
    } = ctx;

    let lookup: &dyn TokenLookup = match token_lookup.as_deref() {
        Some(own) => own,
        None => lookup,
    };
    let pad: Option<&dyn PadSource> = match pad_fallback.as_deref() {
        Some(own) => Some(own as &dyn PadSource),
        None => pad,
    };

    let mut walker = Walker {
        lookup,
        pad,
        encoder: encoder.as_str(),
        scheduler,
        factory,
        auto_register: *auto_register,
        shape_hint: *shape_hint,
    };
    let mut schedules = Vec::new();
    let vector = walker.walk(ast, &mut schedules)?;

    tracing::debug!(
        encoder = %walker.encoder,
        len = vector.len(),
        schedules = schedules.len(),
        "evaluated expression"
    );
    Ok((vector, schedules))
}

struct Walker<'a> {
    lookup: &'a dyn TokenLookup,
    pad: Option<&'a dyn PadSource>,
    encoder: &'a str,
    scheduler: &'a mut AttentionScheduler,
    factory: &'a ScheduleFactory,
    auto_register: bool,
    shape_hint: Option<usize>,
}

impl Walker<'_> {
    fn walk(
        &mut self,
        node: &AstNode,
        schedules: &mut Vec<TokenSchedule>,
    ) -> Result<Vector, EvaluationError> {
        match node {
            AstNode::Token { value, schedule } => {
                let vector = match self.lookup.lookup(value, self.encoder) {
                    Some(vector) => {
                        tracing::trace!(token = %value, len = vector.len(), "resolved token");
                        vector
                    }
                    None => {
                        tracing::warn!(token = %value, "token not found, using pad vector");
                        pad_vector(self.pad, self.shape_hint, value)?
                    }
                };

                if let Some(call) = schedule {
                    let indices = self.lookup.indices(value, self.encoder);
                    let built = self.factory.create(call, value, &indices)?;
                    if self.auto_register {
                        self.scheduler.register(built.clone());
                    }
                    schedules.push(built);
                }
                Ok(vector)
            }
            AstNode::Operator { op, left, right } => {
                let left = self.walk(left, schedules)?;
                let right = self.walk(right, schedules)?;
                left.apply(*op, &right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ScheduleCall;
    use crate::error::FactoryError;
    use crate::parser::parse;
    use prompt_math_schedule::{
        CurveType, Direction, ErrorKind, Literal, ScheduleError, ScheduleParams,
    };

    fn lookup(token: &str, _encoder: &str) -> Option<Vector> {
        match token {
            "a" => Some(Vector::ones(4)),
            "b" => Some(Vector::zeros(4)),
            "c" => Some(Vector::from(vec![2.0, 2.0, 2.0, 2.0])),
            _ => None,
        }
    }

    fn pad() -> Option<Vector> {
        Some(Vector::zeros(4))
    }

    fn run(expression: &str) -> Result<(Vector, Vec<TokenSchedule>), EvaluationError> {
        let ast = parse(expression).unwrap();
        evaluate(&ast, &lookup, "clip_l", Some(&pad), None)
    }

    #[test]
    fn test_subtraction() {
        let (vector, schedules) = run("[[[a]-[b]]]").unwrap();
        assert_eq!(vector, Vector::ones(4));
        assert!(schedules.is_empty());
    }

    #[test]
    fn test_addition() {
        let (vector, schedules) = run("[[[a]+[b]]]").unwrap();
        assert_eq!(vector, Vector::ones(4));
        assert!(schedules.is_empty());
    }

    #[test]
    fn test_multiplication_and_nesting() {
        let (vector, _) = run("[[ [c] * [[a] + [c]] ]]").unwrap();
        assert_eq!(vector, Vector::from(vec![6.0; 4]));
    }

    #[test]
    fn test_scheduled_curve() {
        let (_, schedules) = run("[[[a] @ fade_in(0.0, 1.0, \"ease_in_out\")]]").unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].token_expr, "a");
        assert_eq!(schedules[0].params.curve_type(), CurveType::EaseInOut);
        assert_eq!(schedules[0].direction, Direction::FadeIn);
    }

    #[test]
    fn test_discovery_order_and_registration() {
        let ast = parse(
            "[[ [[a] @ fade_out(0.0, 0.5)] + [[b] @ fade_in(0.5, 1.0)] - [[c] @ fade_in(0.2, 0.4)] ]]",
        )
        .unwrap();
        let mut ctx = EvaluationContext::new("clip_l");
        let (vector, schedules) = evaluate(&ast, &lookup, "clip_g", Some(&pad), Some(&mut ctx)).unwrap();

        // `-` splits first: ([a] + [b]) - [c]
        assert_eq!(vector, Vector::from(vec![-1.0; 4]));
        let owners: Vec<&str> = schedules.iter().map(|s| s.token_expr.as_str()).collect();
        assert_eq!(owners, vec!["a", "b", "c"]);

        assert_eq!(ctx.encoder, "clip_g");
        assert_eq!(ctx.scheduler.len(), 3);
        let registered: Vec<_> = ctx.scheduler.iter().map(|s| s.id).collect();
        let returned: Vec<_> = schedules.iter().map(|s| s.id).collect();
        assert_eq!(registered, returned);
        assert!((ctx.scheduler.weight_at("a", 0.25) - 0.5).abs() < 1e-12);
        assert_eq!(ctx.scheduler.weight_at("unscheduled", 0.25), 1.0);
    }

    #[test]
    fn test_context_accumulates_until_cleared() {
        let ast = parse("[[ [a] @ fade_in(0.2, 0.8) ]]").unwrap();
        let mut ctx = EvaluationContext::new("clip_l");
        evaluate(&ast, &lookup, "clip_l", Some(&pad), Some(&mut ctx)).unwrap();
        evaluate(&ast, &lookup, "clip_l", Some(&pad), Some(&mut ctx)).unwrap();
        assert_eq!(ctx.scheduler.schedules_for(Some("a")).len(), 2);

        ctx.scheduler.clear();
        evaluate(&ast, &lookup, "clip_l", Some(&pad), Some(&mut ctx)).unwrap();
        assert_eq!(ctx.scheduler.len(), 1);
    }

    #[test]
    fn test_auto_register_disabled() {
        let ast = parse("[[ [a] @ fade_in(0.2, 0.8) ]]").unwrap();
        let mut ctx = EvaluationContext::new("clip_l").with_auto_register(false);
        let (_, schedules) = evaluate(&ast, &lookup, "clip_l", Some(&pad), Some(&mut ctx)).unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(ctx.scheduler.is_empty());
    }

    #[test]
    fn test_missing_token_uses_pad() {
        let ast = parse("[[ [a] + [unknown] ]]").unwrap();
        let custom_pad = || Some(Vector::from(vec![0.5; 4]));
        let (vector, _) = evaluate(&ast, &lookup, "clip_l", Some(&custom_pad), None).unwrap();
        assert_eq!(vector, Vector::from(vec![1.5; 4]));
    }

    #[test]
    fn test_missing_token_uses_shape_hint() {
        let ast = parse("[[ [a] - [unknown] ]]").unwrap();
        let empty_pad = || -> Option<Vector> { None };
        let mut ctx = EvaluationContext::new("clip_l").with_shape_hint(4);
        let (vector, _) = evaluate(&ast, &lookup, "clip_l", Some(&empty_pad), Some(&mut ctx)).unwrap();
        assert_eq!(vector, Vector::ones(4));
    }

    #[test]
    fn test_missing_token_without_fallback_is_fatal() {
        let ast = parse("[[ [unknown] ]]").unwrap();
        let err = evaluate(&ast, &lookup, "clip_l", None, None).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::MissingVector {
                token: "unknown".into()
            }
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_shape_mismatch() {
        let short = |token: &str, _: &str| match token {
            "a" => Some(Vector::ones(3)),
            _ => Some(Vector::ones(4)),
        };
        let ast = parse("[a] * [b]").unwrap();
        let err = evaluate(&ast, &short, "clip_l", None, None).unwrap_err();
        assert!(matches!(err, EvaluationError::ShapeMismatch { left: 3, right: 4, .. }));
    }

    #[test]
    fn test_unknown_schedule_function() {
        let err = run("[[ [a] @ fade_inn(0.0, 1.0) ]]").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Factory(FactoryError::UnknownFunction("fade_inn".into()))
        );
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_custom_builder_through_grammar() {
        let mut factory = ScheduleFactory::new();
        factory.register(
            "late",
            |token: &str,
             indices: &[TokenIndex],
             call: &ScheduleCall|
             -> Result<TokenSchedule, ScheduleError> {
                let params = ScheduleParams::new(0.75, 1.0)?.with_curve(CurveType::Smooth);
                let mut schedule = TokenSchedule::new(token, indices.to_vec(), params, Direction::FadeIn);
                schedule
                    .metadata
                    .insert("builder".into(), call.function_name.as_str().into());
                Ok(schedule)
            },
            None,
        );

        let ast = parse("[[ [b] - [[a] @ late()] ]]").unwrap();
        let mut ctx = EvaluationContext::new("clip_l").with_factory(factory);
        let (vector, schedules) = evaluate(&ast, &lookup, "clip_l", Some(&pad), Some(&mut ctx)).unwrap();

        assert_eq!(vector, Vector::from(vec![-1.0; 4]));
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].token_expr, "a");
        assert_eq!(schedules[0].params.start_time(), 0.75);
        assert_eq!(schedules[0].metadata["builder"], Literal::from("late"));
    }

    #[test]
    fn test_context_lookup_and_indices() {
        struct Library;

        impl TokenLookup for Library {
            fn lookup(&self, _token: &str, encoder: &str) -> Option<Vector> {
                (encoder == "clip_l").then(|| Vector::ones(2))
            }

            fn indices(&self, token: &str, _encoder: &str) -> Vec<TokenIndex> {
                vec![TokenIndex::Name(token.to_string()), TokenIndex::Position(7)]
            }
        }

        let ast = parse("[[ [z] @ fade_out(0.1, 0.9) ]]").unwrap();
        let mut ctx = EvaluationContext::new("clip_l").with_token_lookup(Library);
        let (vector, schedules) = evaluate(&ast, &lookup, "clip_l", None, Some(&mut ctx)).unwrap();
        assert_eq!(vector, Vector::ones(2));
        assert_eq!(
            schedules[0].token_indices,
            vec![TokenIndex::Name("z".into()), TokenIndex::Position(7)]
        );
    }
}
