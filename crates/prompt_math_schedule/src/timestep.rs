// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between sampler units and the normalized `[0, 1]` time axis.

use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How raw sampler values relate to normalized time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestepMode {
    /// Step index out of `total_steps`
    StepBased,
    /// Absolute time out of `max_time`
    TimeBased,
    /// Already normalized
    #[default]
    Percent,
}

impl TimestepMode {
    /// Mode identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::StepBased => "step_based",
            Self::TimeBased => "time_based",
            Self::Percent => "percent",
        }
    }
}

impl fmt::Display for TimestepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimestepMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step_based" => Ok(Self::StepBased),
            "time_based" => Ok(Self::TimeBased),
            "percent" => Ok(Self::Percent),
            other => Err(ScheduleError::UnsupportedMode(other.to_string())),
        }
    }
}

/// Bidirectional converter for one timestep mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimestepConverter {
    /// Conversion mode
    pub mode: TimestepMode,
    /// Step count, required by [`TimestepMode::StepBased`]
    pub total_steps: Option<u32>,
    /// Time horizon, required by [`TimestepMode::TimeBased`]
    pub max_time: Option<f64>,
}

impl TimestepConverter {
    /// Create a converter with no parameters set
    pub fn new(mode: TimestepMode) -> Self {
        Self {
            mode,
            total_steps: None,
            max_time: None,
        }
    }

    /// Create a converter from a mode name
    pub fn parse(mode: &str) -> Result<Self, ScheduleError> {
        Ok(Self::new(mode.parse()?))
    }

    /// Step-based converter
    pub fn steps(total_steps: u32) -> Self {
        Self::new(TimestepMode::StepBased).with_total_steps(total_steps)
    }

    /// Set the step count
    pub fn with_total_steps(mut self, total_steps: u32) -> Self {
        self.total_steps = Some(total_steps);
        self
    }

    /// Set the time horizon
    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Convert a raw value into normalized time
    pub fn to_normalized(&self, value: f64) -> Result<f64, ScheduleError> {
        Ok(value / self.scale()?)
    }

    /// Convert normalized time back into raw units
    pub fn from_normalized(&self, value: f64) -> Result<f64, ScheduleError> {
        Ok(value * self.scale()?)
    }

    /// Denominator for the current mode, validated
    fn scale(&self) -> Result<f64, ScheduleError> {
        match self.mode {
            TimestepMode::StepBased => {
                let total_steps = self.total_steps.ok_or(ScheduleError::MissingParameter {
                    mode: "step_based",
                    parameter: "total_steps",
                })?;
                if total_steps == 0 {
                    return Err(ScheduleError::NonPositiveParameter {
                        parameter: "total_steps",
                        value: 0.0,
                    });
                }
                Ok(f64::from(total_steps))
            }
            TimestepMode::TimeBased => {
                let max_time = self.max_time.ok_or(ScheduleError::MissingParameter {
                    mode: "time_based",
                    parameter: "max_time",
                })?;
                if max_time.is_nan() || max_time <= 0.0 {
                    return Err(ScheduleError::NonPositiveParameter {
                        parameter: "max_time",
                        value: max_time,
                    });
                }
                Ok(max_time)
            }
            TimestepMode::Percent => Ok(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_based() {
        let converter = TimestepConverter::steps(20);
        assert!((converter.to_normalized(10.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((converter.from_normalized(0.25).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_round_trip() {
        for total_steps in [1u32, 7, 20, 30, 1000] {
            let converter = TimestepConverter::steps(total_steps);
            for step in 0..=total_steps {
                let normalized = converter.to_normalized(f64::from(step)).unwrap();
                let back = converter.from_normalized(normalized).unwrap();
                assert!((back - f64::from(step)).abs() < 1e-9, "{step}/{total_steps}");
            }
        }
    }

    #[test]
    fn test_time_based() {
        let converter = TimestepConverter::new(TimestepMode::TimeBased).with_max_time(8.0);
        assert!((converter.to_normalized(2.0).unwrap() - 0.25).abs() < 1e-12);
        assert!((converter.from_normalized(0.5).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_percent_is_identity() {
        let converter = TimestepConverter::parse("percent").unwrap();
        assert_eq!(converter.to_normalized(0.3).unwrap(), 0.3);
        assert_eq!(converter.from_normalized(0.7).unwrap(), 0.7);
    }

    #[test]
    fn test_missing_and_non_positive_parameters() {
        let missing = TimestepConverter::new(TimestepMode::StepBased);
        assert!(matches!(
            missing.to_normalized(1.0),
            Err(ScheduleError::MissingParameter { parameter: "total_steps", .. })
        ));

        let zero = TimestepConverter::steps(0);
        assert!(matches!(
            zero.from_normalized(1.0),
            Err(ScheduleError::NonPositiveParameter { .. })
        ));

        let negative = TimestepConverter::new(TimestepMode::TimeBased).with_max_time(-1.0);
        assert!(negative.to_normalized(1.0).is_err());
        let absent = TimestepConverter::new(TimestepMode::TimeBased);
        assert!(absent.from_normalized(1.0).is_err());
    }

    #[test]
    fn test_unsupported_mode() {
        assert!(matches!(
            TimestepConverter::parse("sigma"),
            Err(ScheduleError::UnsupportedMode(mode)) if mode == "sigma"
        ));
    }
}
