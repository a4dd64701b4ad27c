// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON documents printed by the commands.

use indexmap::IndexMap;
use prompt_math_expr::{AstNode, ScheduleFactory, ScheduleFunctionInfo, Template, Vector, DEFAULT_TEMPLATES};
use prompt_math_schedule::{CurveType, Direction, Literal, TimestepMode, TokenIndex, TokenSchedule};
use serde::Serialize;

/// Flat view of one schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePayload {
    /// Owning token
    pub token: String,
    /// Fade direction
    pub direction: Direction,
    /// Window start
    pub start: f64,
    /// Window end
    pub end: f64,
    /// Curve name
    pub curve: CurveType,
    /// Whether weights are clamped into `[0, 1]`
    pub clamp_output: bool,
    /// Backend indices
    pub indices: Vec<TokenIndex>,
    /// Extra annotation keywords
    pub metadata: IndexMap<String, Literal>,
}

impl From<&TokenSchedule> for SchedulePayload {
    fn from(schedule: &TokenSchedule) -> Self {
        Self {
            token: schedule.token_expr.clone(),
            direction: schedule.direction,
            start: schedule.params.start_time(),
            end: schedule.params.end_time(),
            curve: schedule.params.curve_type(),
            clamp_output: schedule.params.clamp_output(),
            indices: schedule.token_indices.clone(),
            metadata: schedule.metadata.clone(),
        }
    }
}

/// Output of `parse`
#[derive(Debug, Clone, Serialize)]
pub struct ParsePayload<'a> {
    /// Canonical rendering of the tree
    pub canonical: String,
    /// Token leaves in order
    pub tokens: Vec<&'a str>,
    /// The tree itself
    pub ast: &'a AstNode,
}

impl<'a> ParsePayload<'a> {
    /// Describe a parsed tree
    pub fn new(ast: &'a AstNode) -> Self {
        Self {
            canonical: ast.to_string(),
            tokens: ast.tokens(),
            ast,
        }
    }
}

/// Output of `eval`
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPayload {
    /// Encoder used for lookups
    pub encoder: String,
    /// Resulting vector
    pub vector: Vector,
    /// Schedules in discovery order
    pub schedules: Vec<SchedulePayload>,
}

/// One sampled time in the `weights` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRow {
    /// Step index
    pub step: u32,
    /// Normalized time
    pub time: f64,
    /// Time in the configured sampler units
    pub raw: f64,
    /// Weight per token
    pub weights: IndexMap<String, f64>,
}

/// Output of `weights`
#[derive(Debug, Clone, Serialize)]
pub struct WeightTable {
    /// Encoder used for lookups
    pub encoder: String,
    /// Unit of the `raw` column
    pub mode: TimestepMode,
    /// Schedules driving the table
    pub schedules: Vec<SchedulePayload>,
    /// Sampled rows
    pub rows: Vec<WeightRow>,
}

/// Easing curve offered in annotations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePayload {
    /// Identifier accepted by `curve=`
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
}

impl From<CurveType> for CurvePayload {
    fn from(curve: CurveType) -> Self {
        Self {
            name: curve.name(),
            label: curve.label(),
        }
    }
}

/// Output of `functions`: everything an editor needs to offer annotations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    /// Described schedule functions
    pub schedule_functions: IndexMap<String, ScheduleFunctionInfo>,
    /// Every registered function name
    pub registered: Vec<String>,
    /// Easing curves in declaration order
    pub curves: Vec<CurvePayload>,
    /// Example expressions
    pub templates: &'static [Template],
}

impl FrontendConfig {
    /// Describe `factory`
    pub fn new(factory: &ScheduleFactory) -> Self {
        Self {
            schedule_functions: factory.metadata(),
            registered: factory
                .registered_functions()
                .into_iter()
                .map(String::from)
                .collect(),
            curves: CurveType::ALL.into_iter().map(CurvePayload::from).collect(),
            templates: DEFAULT_TEMPLATES,
        }
    }
}
