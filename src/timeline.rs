use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{AudiocutError, Result};

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: f64,
    end: f64,
}

impl TimeInterval {
    /// Create an interval. Negative, empty, or non-finite ranges are rejected.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(AudiocutError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, non-overlapping time intervals sorted ascending by start.
///
/// Canonical form: consecutive intervals are strictly separated; anything
/// that overlaps or merely touches has been fused by [`IntervalSet::merge`].
/// An empty set is valid and means "nothing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    intervals: Vec<TimeInterval>,
}

impl IntervalSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge an unordered collection of intervals into canonical form.
    ///
    /// Sorts by start (stable, so equal starts keep input order) and fuses
    /// in a single scan whenever `next.start <= current.end`. Idempotent:
    /// merging an already-merged set returns it unchanged.
    pub fn merge(intervals: Vec<TimeInterval>) -> Self {
        let mut sorted = intervals;
        sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

        let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
        for next in sorted {
            match merged.last_mut() {
                Some(current) if next.start <= current.end => {
                    if next.end > current.end {
                        current.end = next.end;
                    }
                }
                _ => merged.push(next),
            }
        }

        Self { intervals: merged }
    }

    /// Segments of `[0, total_duration)` not covered by this set, in
    /// timeline order.
    ///
    /// Intervals overhanging `total_duration` are clamped here; an empty
    /// result means the set covers the whole range.
    pub fn complement(&self, total_duration: f64) -> Result<IntervalSet> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(AudiocutError::InvalidInterval {
                start: 0.0,
                end: total_duration,
            });
        }

        let mut kept = Vec::new();
        let mut cursor = 0.0;

        for interval in &self.intervals {
            let deletion_start = interval.start.min(total_duration);
            if deletion_start > cursor {
                kept.push(TimeInterval {
                    start: cursor,
                    end: deletion_start,
                });
            }
            cursor = cursor.max(interval.end);
        }

        if cursor < total_duration {
            kept.push(TimeInterval {
                start: cursor,
                end: total_duration,
            });
        }

        Ok(IntervalSet { intervals: kept })
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Total covered time in seconds.
    pub fn covered_duration(&self) -> f64 {
        self.intervals.iter().map(TimeInterval::duration).sum()
    }
}
