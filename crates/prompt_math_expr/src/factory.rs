// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry mapping annotation function names to schedule builders.

use crate::ast::ScheduleCall;
use crate::catalog::{default_function_info, ScheduleFunctionInfo};
use crate::error::FactoryError;
use indexmap::IndexMap;
use prompt_math_schedule::{
    CurveType, Direction, Literal, ScheduleError, ScheduleParams, TokenIndex, TokenSchedule,
};
use std::fmt;
use std::sync::Arc;

/// Keyword arguments consumed by the built-in builders
const WINDOW_KEYS: [&str; 4] = ["start", "end", "curve", "curve_type"];

/// Trait for turning a parsed annotation into a schedule
pub trait ScheduleBuilder: Send + Sync {
    /// Build a schedule owned by `token_expr`
    fn build(
        &self,
        token_expr: &str,
        token_indices: &[TokenIndex],
        call: &ScheduleCall,
    ) -> Result<TokenSchedule, ScheduleError>;
}

impl<F> ScheduleBuilder for F
where
    F: Fn(&str, &[TokenIndex], &ScheduleCall) -> Result<TokenSchedule, ScheduleError> + Send + Sync,
{
    fn build(
        &self,
        token_expr: &str,
        token_indices: &[TokenIndex],
        call: &ScheduleCall,
    ) -> Result<TokenSchedule, ScheduleError> {
        self(token_expr, token_indices, call)
    }
}

/// Builder for the `fade_in` / `fade_out` annotations
#[derive(Debug, Clone, Copy)]
pub struct FadeBuilder {
    /// Direction of the produced schedules
    pub direction: Direction,
}

impl ScheduleBuilder for FadeBuilder {
    fn build(
        &self,
        token_expr: &str,
        token_indices: &[TokenIndex],
        call: &ScheduleCall,
    ) -> Result<TokenSchedule, ScheduleError> {
        let args = WindowArgs::extract(call)?;
        let params = ScheduleParams::new(args.start, args.end)?.with_curve(args.curve);
        Ok(
            TokenSchedule::new(token_expr, token_indices.to_vec(), params, self.direction)
                .with_metadata(args.metadata),
        )
    }
}

/// Window, curve and passthrough metadata read from an annotation
#[derive(Debug, Clone, PartialEq)]
pub struct WindowArgs {
    /// Window start, `0.0` when absent or not numeric
    pub start: f64,
    /// Window end, `1.0` when absent or not numeric
    pub end: f64,
    /// Curve, linear when absent
    pub curve: CurveType,
    /// Remaining keyword arguments
    pub metadata: IndexMap<String, Literal>,
}

impl WindowArgs {
    /// Read `start`, `end` and `curve` from positional or keyword arguments.
    ///
    /// A positional argument takes precedence over its keyword. Unknown
    /// curve names are rejected as invalid arguments; a blank curve counts
    /// as absent.
    pub fn extract(call: &ScheduleCall) -> Result<Self, ScheduleError> {
        let start = call
            .arg(0)
            .or_else(|| call.kwarg("start"))
            .and_then(Literal::as_f64)
            .unwrap_or(0.0);
        let end = call
            .arg(1)
            .or_else(|| call.kwarg("end"))
            .and_then(Literal::as_f64)
            .unwrap_or(1.0);

        let curve_arg = call
            .kwarg("curve")
            .filter(|v| !v.is_falsy())
            .or_else(|| call.kwarg("curve_type"))
            .filter(|v| !v.is_falsy())
            .or_else(|| call.arg(2));
        let curve = match curve_arg {
            None => CurveType::Linear,
            Some(value) => {
                let name = value.to_string();
                if name.trim().is_empty() {
                    CurveType::Linear
                } else {
                    name.parse::<CurveType>()
                        .map_err(|_| ScheduleError::InvalidCurveArgument(name))?
                }
            }
        };

        let metadata = call
            .kwargs
            .iter()
            .filter(|(key, _)| !WINDOW_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            start,
            end,
            curve,
            metadata,
        })
    }
}

/// Registry of schedule builders keyed by annotation name
#[derive(Clone)]
pub struct ScheduleFactory {
    /// Builders in registration order
    builders: IndexMap<String, Arc<dyn ScheduleBuilder>>,
    /// Optional descriptions by function name
    metadata: IndexMap<String, ScheduleFunctionInfo>,
}

impl ScheduleFactory {
    /// Create a factory with `fade_in` and `fade_out` registered
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register(
            "fade_in",
            FadeBuilder {
                direction: Direction::FadeIn,
            },
            None,
        );
        factory.register(
            "fade_out",
            FadeBuilder {
                direction: Direction::FadeOut,
            },
            None,
        );
        factory
    }

    /// Create a factory with no builders
    pub fn empty() -> Self {
        Self {
            builders: IndexMap::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Register (or replace) a builder.
    ///
    /// Without explicit metadata a built-in name falls back to its default
    /// description, unless one is already recorded.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        builder: impl ScheduleBuilder + 'static,
        metadata: Option<ScheduleFunctionInfo>,
    ) {
        let name = name.into();
        match metadata {
            Some(info) => {
                self.metadata.insert(name.clone(), info);
            }
            None => {
                if !self.metadata.contains_key(&name) {
                    if let Some(info) = default_function_info(&name) {
                        self.metadata.insert(name.clone(), info);
                    }
                }
            }
        }
        tracing::debug!(function = %name, "registered schedule builder");
        self.builders.insert(name, Arc::new(builder));
    }

    /// Whether a builder is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered function names in registration order
    pub fn registered_functions(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }

    /// Descriptions of registered functions that have one
    pub fn metadata(&self) -> IndexMap<String, ScheduleFunctionInfo> {
        self.builders
            .keys()
            .filter_map(|name| {
                self.metadata
                    .get(name)
                    .map(|info| (name.clone(), info.clone()))
            })
            .collect()
    }

    /// Instantiate the schedule described by `call` for `token_expr`
    pub fn create(
        &self,
        call: &ScheduleCall,
        token_expr: &str,
        token_indices: &[TokenIndex],
    ) -> Result<TokenSchedule, FactoryError> {
        let builder = self
            .builders
            .get(&call.function_name)
            .ok_or_else(|| FactoryError::UnknownFunction(call.function_name.clone()))?;
        builder
            .build(token_expr, token_indices, call)
            .map_err(|source| FactoryError::Build {
                function: call.function_name.clone(),
                source,
            })
    }
}

impl Default for ScheduleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScheduleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleFactory")
            .field("functions", &self.registered_functions())
            .finish()
    }
}
