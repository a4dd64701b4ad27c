// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scheduling primitives for prompt math.
//!
//! This crate maps normalized sampling progress onto token weights:
//! - Easing curves
//! - Validated schedule windows
//! - Fade-in / fade-out token schedules
//! - The attention scheduler registry
//! - Timestep unit conversion
//!
//! ## Architecture
//!
//! Everything here is synchronous and pure apart from the scheduler, which
//! owns the registered schedules and is mutated explicitly by its caller.

pub mod curve;
pub mod error;
pub mod literal;
pub mod schedule;
pub mod scheduler;
pub mod timestep;

pub use curve::{CurveFn, CurveType};
pub use error::{ErrorKind, ScheduleError};
pub use literal::Literal;
pub use schedule::{Direction, ScheduleId, ScheduleParams, TokenIndex, TokenSchedule};
pub use scheduler::{AttentionScheduler, NEUTRAL_WEIGHT};
pub use timestep::{TimestepConverter, TimestepMode};
