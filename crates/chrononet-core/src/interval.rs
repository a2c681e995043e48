//! Half-open time intervals over integer ticks.

use crate::fixed::Ticks;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised when constructing an interval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("interval start {start} is after end {end}")]
    StartAfterEnd { start: Ticks, end: Ticks },
}

/// A time interval `[start, end)` with `start <= end`.
///
/// Ordering is by `start`, then `end`, which is the order snapshots are
/// sequenced in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeInterval {
    start: Ticks,
    end: Ticks,
}

impl TimeInterval {
    pub fn new(start: Ticks, end: Ticks) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Ticks {
        self.start
    }

    pub fn end(&self) -> Ticks {
        self.end
    }

    /// Length in ticks. Saturates for intervals wider than `i64::MAX`.
    pub fn duration(&self) -> Ticks {
        self.end.saturating_sub(self.start)
    }

    /// True if `point` lies within `[start, end]`.
    pub fn contains(&self, point: Ticks) -> bool {
        self.start <= point && point <= self.end
    }

    /// True if `other` lies entirely within this interval.
    pub fn covers(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// True if the two intervals share a non-empty stretch of time.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The common sub-interval, or `None` if the intervals are disjoint.
    ///
    /// Touching intervals (`[0, 3)` and `[3, 5)`) intersect in the empty
    /// interval `[3, 3)`.
    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(TimeInterval { start, end })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
