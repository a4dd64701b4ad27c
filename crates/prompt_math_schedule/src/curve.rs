// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves used to shape schedule weights.

use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature shared by every easing curve: `(t, start, end) -> value`
pub type CurveFn = fn(f64, f64, f64) -> f64;

/// Easing curve applied between a schedule's start and end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Straight interpolation
    #[default]
    Linear,
    /// Hermite blend `t²(3 − 2t)`
    Smooth,
    /// Quadratic, slow start
    EaseIn,
    /// Quadratic, slow finish
    EaseOut,
    /// Ease in on the first half, ease out on the second
    EaseInOut,
    /// Always the start value
    Constant,
}

impl CurveType {
    /// Every curve, in declaration order
    pub const ALL: [CurveType; 6] = [
        CurveType::Linear,
        CurveType::Smooth,
        CurveType::EaseIn,
        CurveType::EaseOut,
        CurveType::EaseInOut,
        CurveType::Constant,
    ];

    /// Identifier used in annotations and serialized schedules
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Smooth => "smooth",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::Constant => "constant",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Smooth => "Smooth",
            Self::EaseIn => "Ease In",
            Self::EaseOut => "Ease Out",
            Self::EaseInOut => "Ease In/Out",
            Self::Constant => "Constant",
        }
    }

    /// Resolve the easing function for this curve
    pub fn function(&self) -> CurveFn {
        match self {
            Self::Linear => linear,
            Self::Smooth => smooth,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
            Self::Constant => constant,
        }
    }

    /// Evaluate the curve at `t`, mapping `[0, 1]` onto `[start, end]`
    pub fn apply(&self, t: f64, start: f64, end: f64) -> f64 {
        (self.function())(t, start, end)
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveType {
    type Err = ScheduleError;

    /// Accepts the curve name, trimmed and case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|curve| curve.name() == normalized)
            .ok_or_else(|| ScheduleError::UnknownCurve(s.to_string()))
    }
}

/// Linear interpolation between `start` and `end`
pub fn linear(t: f64, start: f64, end: f64) -> f64 {
    start + (end - start) * t
}

/// Hermite smoothstep between `start` and `end`
pub fn smooth(t: f64, start: f64, end: f64) -> f64 {
    let hermite = t * t * (3.0 - 2.0 * t);
    start + (end - start) * hermite
}

/// Quadratic ease-in
pub fn ease_in(t: f64, start: f64, end: f64) -> f64 {
    start + (end - start) * (t * t)
}

/// Quadratic ease-out
pub fn ease_out(t: f64, start: f64, end: f64) -> f64 {
    let eased = 1.0 - (1.0 - t) * (1.0 - t);
    start + (end - start) * eased
}

/// Piecewise quadratic ease-in-out, split at `t = 0.5`
pub fn ease_in_out(t: f64, start: f64, end: f64) -> f64 {
    let eased = if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    };
    start + (end - start) * eased
}

/// Ignores `t` and `end`
pub fn constant(_t: f64, start: f64, _end: f64) -> f64 {
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_midpoints() {
        assert!(close(CurveType::Linear.apply(0.5, 0.0, 1.0), 0.5));
        assert!(close(CurveType::Smooth.apply(0.5, 0.0, 1.0), 0.5));
        assert!(close(CurveType::EaseIn.apply(0.5, 0.0, 1.0), 0.25));
        assert!(close(CurveType::EaseOut.apply(0.5, 0.0, 1.0), 0.75));
        assert!(close(CurveType::EaseInOut.apply(0.5, 0.0, 1.0), 0.5));
    }

    #[test]
    fn test_endpoints() {
        for curve in CurveType::ALL {
            if curve == CurveType::Constant {
                continue;
            }
            assert!(close(curve.apply(0.0, 0.0, 1.0), 0.0), "{curve} at 0");
            assert!(close(curve.apply(1.0, 0.0, 1.0), 1.0), "{curve} at 1");
        }
    }

    #[test]
    fn test_ease_in_out_quarters() {
        assert!(close(ease_in_out(0.25, 0.0, 1.0), 0.125));
        assert!(close(ease_in_out(0.75, 0.0, 1.0), 0.875));
    }

    #[test]
    fn test_constant_ignores_time() {
        assert_eq!(constant(0.0, 0.3, 1.0), 0.3);
        assert_eq!(constant(0.9, 0.3, 1.0), 0.3);
    }

    #[test]
    fn test_rescaled_range() {
        assert!(close(linear(0.5, 2.0, 4.0), 3.0));
        assert!(close(ease_in(0.5, 1.0, 0.0), 0.75));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ease_in_out".parse::<CurveType>().unwrap(), CurveType::EaseInOut);
        assert_eq!("  SMOOTH ".parse::<CurveType>().unwrap(), CurveType::Smooth);
        assert!(matches!(
            "wobble".parse::<CurveType>(),
            Err(ScheduleError::UnknownCurve(name)) if name == "wobble"
        ));
    }

    #[test]
    fn test_serde_names() {
        let ron = ron::to_string(&CurveType::EaseOut).unwrap();
        assert_eq!(ron, "ease_out");
        let json = serde_json::to_string(&CurveType::EaseInOut).unwrap();
        assert_eq!(json, "\"ease_in_out\"");
    }
}
