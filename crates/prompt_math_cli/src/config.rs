// SPDX-License-Identifier: MIT OR Apache-2.0
//! User settings stored as RON.

use crate::error::CliError;
use prompt_math_expr::EvaluationContext;
use prompt_math_schedule::TimestepConverter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default log filter when neither the settings nor `RUST_LOG` set one
pub const DEFAULT_LOG_FILTER: &str = "prompt_math=info";

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptMathSettings {
    /// Encoder passed to token lookups
    pub encoder: String,
    /// Register schedules with the scheduler while evaluating
    pub auto_register: bool,
    /// Zero-padding length for unresolved tokens
    pub shape_hint: Option<usize>,
    /// Library entry used in place of unresolved tokens
    pub pad_token: Option<String>,
    /// Sampler units reported by `weights`
    pub timestep: TimestepConverter,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for PromptMathSettings {
    fn default() -> Self {
        Self {
            encoder: "clip_l".to_string(),
            auto_register: true,
            shape_hint: None,
            pad_token: None,
            timestep: TimestepConverter::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PromptMathSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str, path: &Path) -> Result<Self, CliError> {
        ron::from_str(content).map_err(|source| CliError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content, path)
    }

    /// Load settings from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, CliError> {
        let config = ron::ser::PrettyConfig::default().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Write settings to a file
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fresh evaluation context for `encoder` honoring these settings
    pub fn context(&self, encoder: &str) -> EvaluationContext {
        let ctx = EvaluationContext::new(encoder).with_auto_register(self.auto_register);
        match self.shape_hint {
            Some(len) => ctx.with_shape_hint(len),
            None => ctx,
        }
    }
}
