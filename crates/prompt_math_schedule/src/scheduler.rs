// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of token schedules queried by a time-stepped caller.
//!
//! Schedules are kept in registration order. Several schedules may target
//! the same token; they are never merged and only combine at query time,
//! where the strongest weight wins. A scheduler reused across evaluations
//! keeps accumulating schedules until [`AttentionScheduler::clear`] is called.

use crate::schedule::{ScheduleId, TokenSchedule};
use indexmap::IndexMap;

/// Weight reported for tokens without any schedule
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Ordered collection of token schedules
#[derive(Debug, Clone, Default)]
pub struct AttentionScheduler {
    /// Schedules in registration order, duplicates included
    schedules: Vec<TokenSchedule>,
}

impl AttentionScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a schedule
    pub fn register(&mut self, schedule: TokenSchedule) -> ScheduleId {
        let id = schedule.id;
        tracing::debug!(
            token = %schedule.token_expr,
            direction = %schedule.direction,
            start = schedule.params.start_time(),
            end = schedule.params.end_time(),
            "registered schedule"
        );
        self.schedules.push(schedule);
        id
    }

    /// Remove the first schedule registered under `schedule_id`
    pub fn remove(&mut self, schedule_id: ScheduleId) -> Option<TokenSchedule> {
        let position = self.schedules.iter().position(|s| s.id == schedule_id)?;
        Some(self.schedules.remove(position))
    }

    /// Remove every schedule
    pub fn clear(&mut self) {
        self.schedules.clear();
    }

    /// First schedule registered under `schedule_id`
    pub fn schedule(&self, schedule_id: ScheduleId) -> Option<&TokenSchedule> {
        self.schedules.iter().find(|s| s.id == schedule_id)
    }

    /// All schedules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TokenSchedule> {
        self.schedules.iter()
    }

    /// Number of registered schedules
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    /// Whether no schedule is registered
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Schedules owned by `token_expr`, or every schedule when `None`
    pub fn schedules_for(&self, token_expr: Option<&str>) -> Vec<&TokenSchedule> {
        match token_expr {
            None => self.schedules.iter().collect(),
            Some(token) => self
                .schedules
                .iter()
                .filter(|s| s.token_expr == token)
                .collect(),
        }
    }

    /// Distinct scheduled tokens in first-registration order
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        for schedule in &self.schedules {
            if !tokens.contains(&schedule.token_expr.as_str()) {
                tokens.push(&schedule.token_expr);
            }
        }
        tokens
    }

    /// Strongest weight for `token_expr` at `time`.
    ///
    /// Returns [`NEUTRAL_WEIGHT`] when the token has no schedule.
    pub fn weight_at(&self, token_expr: &str, time: f64) -> f64 {
        self.schedules
            .iter()
            .filter(|s| s.token_expr == token_expr)
            .map(|s| s.weight_at(time))
            .reduce(f64::max)
            .unwrap_or(NEUTRAL_WEIGHT)
    }

    /// Aggregated weight of every scheduled token at `time`
    pub fn weights_at(&self, time: f64) -> IndexMap<String, f64> {
        self.tokens()
            .into_iter()
            .map(|token| (token.to_string(), self.weight_at(token, time)))
            .collect()
    }
}
