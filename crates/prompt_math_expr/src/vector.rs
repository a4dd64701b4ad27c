// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dense feature vectors combined by expressions.

use crate::ast::BinaryOp;
use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};

/// A flat `f32` feature vector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(pub Vec<f32>);

impl Vector {
    /// All zeros
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// All ones
    pub fn ones(len: usize) -> Self {
        Self(vec![1.0; len])
    }

    /// Zeros with the same length as `self`
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.len())
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the elements
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Multiply every element by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        Self(self.0.iter().map(|v| v * factor).collect())
    }

    /// Linear interpolation toward `other`
    pub fn lerp(&self, other: &Vector, weight: f32) -> Result<Self, EvaluationError> {
        let delta = other.apply(BinaryOp::Sub, self)?;
        self.apply(BinaryOp::Add, &delta.scale(weight))
    }

    /// Element-wise binary operation; lengths must match
    pub fn apply(&self, op: BinaryOp, other: &Vector) -> Result<Self, EvaluationError> {
        if self.len() != other.len() {
            return Err(EvaluationError::ShapeMismatch {
                op,
                left: self.len(),
                right: other.len(),
            });
        }
        let combine: fn(f32, f32) -> f32 = match op {
            BinaryOp::Add => |a, b| a + b,
            BinaryOp::Sub => |a, b| a - b,
            BinaryOp::Mul => |a, b| a * b,
        };
        Ok(Self(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| combine(*a, *b))
                .collect(),
        ))
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_ops() {
        let a = Vector::from(vec![1.0, 2.0, 3.0]);
        let b = Vector::from(vec![0.5, 0.5, 2.0]);
        assert_eq!(a.apply(BinaryOp::Add, &b).unwrap().0, vec![1.5, 2.5, 5.0]);
        assert_eq!(a.apply(BinaryOp::Sub, &b).unwrap().0, vec![0.5, 1.5, 1.0]);
        assert_eq!(a.apply(BinaryOp::Mul, &b).unwrap().0, vec![0.5, 1.0, 6.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Vector::ones(3).apply(BinaryOp::Mul, &Vector::ones(4)).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::ShapeMismatch {
                op: BinaryOp::Mul,
                left: 3,
                right: 4
            }
        );
    }

    #[test]
    fn test_scale_and_lerp() {
        let a = Vector::zeros(2);
        let b = Vector::from(vec![2.0, 4.0]);
        assert_eq!(b.scale(0.5).0, vec![1.0, 2.0]);
        assert_eq!(a.lerp(&b, 0.25).unwrap().0, vec![0.5, 1.0]);
        assert_eq!(b.zeros_like(), Vector::zeros(2));
    }
}
