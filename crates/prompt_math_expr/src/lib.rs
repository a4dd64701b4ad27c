// SPDX-License-Identifier: MIT OR Apache-2.0
//! Prompt math expressions.
//!
//! Bracketed arithmetic over token vectors, for example
//! `[[ [king] - [man] + [woman] ]]`, with optional per-token schedule
//! annotations such as `[[ [detailed] @ fade_in(0.2, 0.8) ]]`.
//!
//! ## Pipeline
//!
//! 1. [`parse`] turns text into an [`AstNode`] tree
//! 2. [`evaluate`] resolves tokens through a [`TokenLookup`], combines the
//!    vectors element-wise and builds a schedule per annotation through the
//!    [`ScheduleFactory`]
//! 3. The schedules land in the context's
//!    [`AttentionScheduler`](prompt_math_schedule::AttentionScheduler), which
//!    is queried with a normalized time during sampling
//!
//! ```
//! use prompt_math_expr::{evaluate, parse, EvaluationContext, Vector};
//!
//! let ast = parse("[[ [a] + [[b] @ fade_in(0.2, 0.8)] ]]").unwrap();
//! let lookup = |_: &str, _: &str| Some(Vector::ones(3));
//! let mut ctx = EvaluationContext::new("clip_l");
//! let (vector, schedules) = evaluate(&ast, &lookup, "clip_l", None, Some(&mut ctx)).unwrap();
//!
//! assert_eq!(vector, Vector::from(vec![2.0; 3]));
//! assert_eq!(schedules.len(), 1);
//! assert_eq!(ctx.scheduler.weight_at("b", 0.1), 0.0);
//! assert_eq!(ctx.scheduler.weight_at("a", 0.1), 1.0);
//! ```

pub mod ast;
pub mod catalog;
pub mod error;
pub mod evaluation;
pub mod factory;
pub mod parser;
pub mod vector;

pub use ast::{AstNode, BinaryOp, ScheduleCall};
pub use catalog::{
    default_function_info, ParameterInfo, ScheduleFunctionInfo, Template, WindowDefaults,
    DEFAULT_TEMPLATES,
};
pub use error::{EvaluationError, FactoryError, ParseError};
pub use evaluation::{evaluate, pad_vector, EvaluationContext, PadSource, TokenLookup};
pub use factory::{FadeBuilder, ScheduleBuilder, ScheduleFactory, WindowArgs};
pub use parser::{parse, parse_schedule};
pub use vector::Vector;
