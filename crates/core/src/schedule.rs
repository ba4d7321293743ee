//! Cadence arithmetic and the per-loop state machine.
//!
//! Both cadences reduce to the same rule: fire at the smallest
//! `anchor + k * period` strictly after now. A boundary-aligned cadence anchors
//! at the unix epoch plus its offset; a fixed interval anchors at loop start.
//! On top of that, a [`LoopMachine`] never arms for a window it already fired
//! in, even when the wall clock reads earlier than the boundary it just served.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Resource;

/// Invalid cadence settings or an out-of-order loop transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Period or offset out of range.
    #[error("invalid cadence: {0}")]
    InvalidCadence(String),
    /// `fire` while a cycle is running.
    #[error("{0} loop fired while a cycle is still in flight")]
    Overlap(Resource),
    /// `fire` before `arm`.
    #[error("{0} loop fired without being armed")]
    NotArmed(Resource),
    /// `arm` outside Idle.
    #[error("{0} loop armed while not idle")]
    NotIdle(Resource),
    /// `finish` outside Fetching.
    #[error("{0} loop finished a cycle it never started")]
    NotFetching(Resource),
}

/// When a loop fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Every `period` on the wall clock, `offset` past the boundary.
    Aligned {
        /// Boundary spacing.
        period_ms: i64,
        /// Delay past each boundary.
        offset_ms: i64,
    },
    /// Every `period` measured from loop start.
    Interval {
        /// Tick spacing.
        period_ms: i64,
    },
}

impl Cadence {
    /// Boundary-aligned cadence. The offset must be shorter than the period.
    pub fn aligned(period: Duration, offset: Duration) -> Result<Self, ScheduleError> {
        let period_ms = positive_ms(period)?;
        let offset_ms = offset.as_millis() as i64;
        if offset_ms >= period_ms {
            return Err(ScheduleError::InvalidCadence(format!(
                "offset {offset_ms}ms must be shorter than period {period_ms}ms"
            )));
        }
        Ok(Self::Aligned {
            period_ms,
            offset_ms,
        })
    }

    /// Fixed-interval cadence.
    pub fn interval(period: Duration) -> Result<Self, ScheduleError> {
        Ok(Self::Interval {
            period_ms: positive_ms(period)?,
        })
    }

    /// Spacing between fires.
    pub fn period_ms(&self) -> i64 {
        match *self {
            Self::Aligned { period_ms, .. } | Self::Interval { period_ms } => period_ms,
        }
    }

    fn anchor_ms(&self, started_at_ms: i64) -> i64 {
        match *self {
            Self::Aligned { offset_ms, .. } => offset_ms,
            Self::Interval { .. } => started_at_ms,
        }
    }

    /// Next fire time (epoch ms) strictly after `now_ms`.
    pub fn next_fire_ms(&self, started_at_ms: i64, now_ms: i64) -> i64 {
        let anchor = self.anchor_ms(started_at_ms);
        let period = self.period_ms();
        let k = (now_ms - anchor).div_euclid(period) + 1;
        anchor + k * period
    }

    /// [`Cadence::next_fire_ms`] on chrono timestamps.
    pub fn next_fire_at(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        let next = self.next_fire_ms(started_at.timestamp_millis(), now.timestamp_millis());
        DateTime::from_timestamp_millis(next).unwrap_or(now)
    }
}

fn positive_ms(period: Duration) -> Result<i64, ScheduleError> {
    let ms = period.as_millis() as i64;
    if ms <= 0 {
        return Err(ScheduleError::InvalidCadence(
            "period must be at least one millisecond".into(),
        ));
    }
    Ok(ms)
}

/// Delay from `now_ms` until `next_fire_ms`; zero if that time has passed.
pub fn delay_until(next_fire_ms: i64, now_ms: i64) -> Duration {
    Duration::from_millis((next_fire_ms - now_ms).max(0) as u64)
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Between cycles, not yet re-armed.
    Idle,
    /// Timer set.
    Armed {
        /// Boundary the timer waits for.
        next_fire_ms: i64,
    },
    /// A fetch/detect/notify cycle is running.
    Fetching {
        /// Boundary this cycle serves.
        target_ms: i64,
        /// Wall clock when the timer went off.
        fired_at_ms: i64,
    },
}

/// State machine for one polling loop.
///
/// `arm` (Idle -> Armed), `fire` (Armed -> Fetching), `finish` (Fetching ->
/// Idle). Re-arming is only possible from Idle, so a new cycle can never
/// start while the previous one is in flight. Each window is served at most
/// once: after firing for boundary `b`, the next arm targets `b + period` or
/// later.
#[derive(Debug, Clone)]
pub struct LoopMachine {
    resource: Resource,
    cadence: Cadence,
    started_at_ms: i64,
    state: LoopState,
    last_target_ms: Option<i64>,
    cycles: u64,
}

impl LoopMachine {
    /// Idle machine for a loop started at `started_at_ms`.
    pub fn new(resource: Resource, cadence: Cadence, started_at_ms: i64) -> Self {
        Self {
            resource,
            cadence,
            started_at_ms,
            state: LoopState::Idle,
            last_target_ms: None,
            cycles: 0,
        }
    }

    /// Resource this loop polls.
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Cadence the loop runs on.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Boundary served by the last fired cycle.
    pub fn last_target_ms(&self) -> Option<i64> {
        self.last_target_ms
    }

    /// Completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Compute the next fire time and return how long to wait for it.
    pub fn arm(&mut self, now_ms: i64) -> Result<Duration, ScheduleError> {
        if self.state != LoopState::Idle {
            return Err(ScheduleError::NotIdle(self.resource));
        }
        let mut next_fire_ms = self.cadence.next_fire_ms(self.started_at_ms, now_ms);
        if let Some(last) = self.last_target_ms {
            next_fire_ms = next_fire_ms.max(last + self.cadence.period_ms());
        }
        self.state = LoopState::Armed { next_fire_ms };
        Ok(delay_until(next_fire_ms, now_ms))
    }

    /// Timer elapsed: begin a cycle.
    pub fn fire(&mut self, now_ms: i64) -> Result<(), ScheduleError> {
        match self.state {
            LoopState::Armed { next_fire_ms } => {
                self.state = LoopState::Fetching {
                    target_ms: next_fire_ms,
                    fired_at_ms: now_ms,
                };
                self.last_target_ms = Some(next_fire_ms);
                Ok(())
            }
            LoopState::Fetching { .. } => Err(ScheduleError::Overlap(self.resource)),
            LoopState::Idle => Err(ScheduleError::NotArmed(self.resource)),
        }
    }

    /// Cycle reached its terminal step, whatever its outcome.
    pub fn finish(&mut self) -> Result<(), ScheduleError> {
        match self.state {
            LoopState::Fetching { .. } => {
                self.state = LoopState::Idle;
                self.cycles += 1;
                Ok(())
            }
            _ => Err(ScheduleError::NotFetching(self.resource)),
        }
    }
}
