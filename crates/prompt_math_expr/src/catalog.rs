// SPDX-License-Identifier: MIT OR Apache-2.0
//! Introspection data for schedule functions and expression templates.
//!
//! A frontend uses these to list the available annotations, their default
//! windows and parameter names, and a few ready-made expressions.

use serde::{Deserialize, Serialize};

/// One parameter accepted by a schedule function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Value type (`"float"`, `"string"`, ...)
    pub kind: String,
    /// Whether the parameter must be supplied
    pub required: bool,
}

impl ParameterInfo {
    /// Create a parameter description
    pub fn new(name: impl Into<String>, kind: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            required,
        }
    }
}

/// Default time window of a schedule function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowDefaults {
    /// Default start
    pub start: f64,
    /// Default end
    pub end: f64,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self { start: 0.0, end: 1.0 }
    }
}

/// Description of a registered schedule function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFunctionInfo {
    /// Display label
    pub label: String,
    /// `"increase"` or `"decrease"` for the built-ins
    pub direction: String,
    /// Short description
    pub description: String,
    /// Default window
    pub defaults: WindowDefaults,
    /// Accepted parameters
    pub parameters: Vec<ParameterInfo>,
    /// Annotation template with `{start}` / `{end}` placeholders
    pub template: String,
}

impl ScheduleFunctionInfo {
    /// Parameter names in declaration order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Fill the template with concrete window bounds
    pub fn render(&self, start: f64, end: f64) -> String {
        self.template
            .replace("{start}", &format!("{start:?}"))
            .replace("{end}", &format!("{end:?}"))
    }
}

fn window_parameters() -> Vec<ParameterInfo> {
    vec![
        ParameterInfo::new("start", "float", true),
        ParameterInfo::new("end", "float", true),
        ParameterInfo::new("curve", "string", false),
    ]
}

/// Built-in description for `name`, if it is one of the default functions
pub fn default_function_info(name: &str) -> Option<ScheduleFunctionInfo> {
    match name {
        "fade_in" => Some(ScheduleFunctionInfo {
            label: "Fade In".into(),
            direction: "increase".into(),
            description: "Gradually raise attention between start and end timesteps.".into(),
            defaults: WindowDefaults::default(),
            parameters: window_parameters(),
            template: "@ fade_in({start}, {end})".into(),
        }),
        "fade_out" => Some(ScheduleFunctionInfo {
            label: "Fade Out".into(),
            direction: "decrease".into(),
            description: "Gradually lower attention between start and end timesteps.".into(),
            defaults: WindowDefaults::default(),
            parameters: window_parameters(),
            template: "@ fade_out({start}, {end})".into(),
        }),
        _ => None,
    }
}

/// A ready-made expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Display name
    pub name: &'static str,
    /// Expression text
    pub code: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Example expressions offered to editors.
///
/// Some reference schedule functions (`emphasis`, `bell`, `pulse`) that are
/// only available once a matching builder is registered.
pub const DEFAULT_TEMPLATES: &[Template] = &[
    Template {
        name: "Basic Analogy",
        code: "[[ [king] - [man] + [woman] ]]",
        description: "Classic vector arithmetic analogy",
    },
    Template {
        name: "Temporal Fade In",
        code: "[[ [detailed] @ fade_in(0.2, 0.8) ]]",
        description: "Gradually introduce details during sampling",
    },
    Template {
        name: "Style Morphing",
        code: "[[ [[oil_painting] @ fade_out(0.0, 0.5)] + [[watercolor] @ fade_in(0.5, 1.0)] ]]",
        description: "Transition from one style to another",
    },
    Template {
        name: "Emphasis Burst",
        code: "[[ [sharp] @ emphasis(2.0, 0.0, 0.3) ]]",
        description: "Strong emphasis early in sampling",
    },
    Template {
        name: "Bell Curve Focus",
        code: "[[ [glowing] @ bell(0.5, 0.2, 2.0) ]]",
        description: "Peak attention in the middle of sampling",
    },
    Template {
        name: "Pulsing Effect",
        code: "[[ [dynamic] @ pulse(3, 0.5) ]]",
        description: "Oscillating attention throughout sampling",
    },
];
