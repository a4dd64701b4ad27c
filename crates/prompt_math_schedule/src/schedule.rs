// SPDX-License-Identifier: MIT OR Apache-2.0
//! Token schedules and their time-window parameters.

use crate::curve::CurveType;
use crate::error::ScheduleError;
use crate::literal::Literal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a registered schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub Uuid);

impl ScheduleId {
    /// Create a new random schedule ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a schedule raises or lowers its token's weight over the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Weight goes from 0 to 1
    #[default]
    FadeIn,
    /// Weight goes from 1 to 0
    FadeOut,
}

impl Direction {
    /// Identifier used in serialized schedules
    pub fn name(&self) -> &'static str {
        match self {
            Self::FadeIn => "fade_in",
            Self::FadeOut => "fade_out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque embedding index forwarded to the encoder backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenIndex {
    /// Numeric token position
    Position(i64),
    /// Named token slot
    Name(String),
}

impl From<i64> for TokenIndex {
    fn from(value: i64) -> Self {
        Self::Position(value)
    }
}

impl From<&str> for TokenIndex {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

/// Unvalidated mirror of [`ScheduleParams`] used during deserialization
#[derive(Deserialize)]
struct RawScheduleParams {
    start_time: f64,
    end_time: f64,
    #[serde(default)]
    curve_type: CurveType,
    #[serde(default = "default_clamp")]
    clamp_output: bool,
}

fn default_clamp() -> bool {
    true
}

/// Time window and curve shared by token schedules.
///
/// The window always covers a positive duration; construction fails
/// otherwise, including when either bound is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScheduleParams")]
pub struct ScheduleParams {
    start_time: f64,
    end_time: f64,
    curve_type: CurveType,
    clamp_output: bool,
}

impl ScheduleParams {
    /// Create parameters with a linear curve and clamped output
    pub fn new(start_time: f64, end_time: f64) -> Result<Self, ScheduleError> {
        if !start_time.is_finite() || !end_time.is_finite() || end_time <= start_time {
            return Err(ScheduleError::InvalidWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
            curve_type: CurveType::Linear,
            clamp_output: true,
        })
    }

    /// Set the easing curve
    pub fn with_curve(mut self, curve_type: CurveType) -> Self {
        self.curve_type = curve_type;
        self
    }

    /// Enable or disable clamping of computed weights into `[0, 1]`
    pub fn with_clamp_output(mut self, clamp_output: bool) -> Self {
        self.clamp_output = clamp_output;
        self
    }

    /// Normalized start of the transition
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Normalized end of the transition
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Length of the window
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Easing curve
    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Whether output weights are clamped
    pub fn clamp_output(&self) -> bool {
        self.clamp_output
    }
}

impl TryFrom<RawScheduleParams> for ScheduleParams {
    type Error = ScheduleError;

    fn try_from(raw: RawScheduleParams) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.start_time, raw.end_time)?
            .with_curve(raw.curve_type)
            .with_clamp_output(raw.clamp_output))
    }
}

/// A time-windowed weighting bound to one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSchedule {
    /// Unique schedule ID
    pub id: ScheduleId,
    /// Owning token identifier
    pub token_expr: String,
    /// Embedding indices, passed through untouched
    pub token_indices: Vec<TokenIndex>,
    /// Window and curve
    pub params: ScheduleParams,
    /// Fade direction
    pub direction: Direction,
    /// Application metadata, passed through untouched
    pub metadata: IndexMap<String, Literal>,
}

impl TokenSchedule {
    /// Create a schedule with no metadata
    pub fn new(
        token_expr: impl Into<String>,
        token_indices: Vec<TokenIndex>,
        params: ScheduleParams,
        direction: Direction,
    ) -> Self {
        Self {
            id: ScheduleId::new(),
            token_expr: token_expr.into(),
            token_indices,
            params,
            direction,
            metadata: IndexMap::new(),
        }
    }

    /// Fade-in schedule over `[start_time, end_time]`
    pub fn fade_in(
        token_expr: impl Into<String>,
        token_indices: Vec<TokenIndex>,
        start_time: f64,
        end_time: f64,
        curve_type: CurveType,
    ) -> Result<Self, ScheduleError> {
        let params = ScheduleParams::new(start_time, end_time)?.with_curve(curve_type);
        Ok(Self::new(token_expr, token_indices, params, Direction::FadeIn))
    }

    /// Fade-out schedule over `[start_time, end_time]`
    pub fn fade_out(
        token_expr: impl Into<String>,
        token_indices: Vec<TokenIndex>,
        start_time: f64,
        end_time: f64,
        curve_type: CurveType,
    ) -> Result<Self, ScheduleError> {
        let params = ScheduleParams::new(start_time, end_time)?.with_curve(curve_type);
        Ok(Self::new(token_expr, token_indices, params, Direction::FadeOut))
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: IndexMap<String, Literal>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Weight at a normalized time.
    ///
    /// Times at or before the window start map to base progress 0 and times
    /// at or after the end map to 1 without evaluating the curve. Inside the
    /// window the curve is applied to the normalized position. Fade-out
    /// inverts the progress.
    pub fn weight_at(&self, time: f64) -> f64 {
        let start = self.params.start_time;
        let end = self.params.end_time;

        let base = if time <= start {
            0.0
        } else if time >= end {
            1.0
        } else {
            let normalized = ((time - start) / (end - start)).clamp(0.0, 1.0);
            self.params.curve_type.apply(normalized, 0.0, 1.0)
        };

        let weight = match self.direction {
            Direction::FadeIn => base,
            Direction::FadeOut => 1.0 - base,
        };

        if self.params.clamp_output {
            weight.clamp(0.0, 1.0)
        } else {
            weight
        }
    }
}
