use serde::Serialize;

use crate::error::Result;
use crate::timeline::{IntervalSet, TimeInterval};
use crate::transcript::KeywordMatch;

/// Padding applied around each keyword match before merging.
#[derive(Debug, Clone, Copy)]
pub struct DeletionBuffers {
    /// Seconds removed before the match starts.
    pub before: f64,
    /// Seconds removed after the match ends.
    pub after: f64,
}

impl Default for DeletionBuffers {
    fn default() -> Self {
        Self {
            before: 0.5,
            after: 0.5,
        }
    }
}

/// Compute the merged deletion window set for a list of keyword matches.
///
/// Each match contributes `[max(0, start - before), end + after)`; overlapping
/// or touching windows are fused. Duration-agnostic: a window may overhang the
/// end of the audio, and the keep-segment complement clamps it later. An empty
/// match list yields an empty set, which callers treat as "nothing to delete".
pub fn plan_deletions(matches: &[KeywordMatch], buffers: DeletionBuffers) -> Result<IntervalSet> {
    let mut windows = Vec::with_capacity(matches.len());
    for m in matches {
        let start = (m.start - buffers.before).max(0.0);
        let end = m.end + buffers.after;
        windows.push(TimeInterval::new(start, end)?);
    }
    Ok(IntervalSet::merge(windows))
}

/// Timeline-ordered segments to retain: `[0, total_duration)` minus the
/// deletion set. Empty when the deletions cover everything.
pub fn keep_segments(deletions: &IntervalSet, total_duration: f64) -> Result<IntervalSet> {
    deletions.complement(total_duration)
}

/// Serializable record of a planned cut, written beside the output file.
#[derive(Debug, Clone, Serialize)]
pub struct DeletePlan {
    pub delete_segments: Vec<(f64, f64)>,
    pub total_duration: f64,
    pub matches: Vec<KeywordMatch>,
}

impl DeletePlan {
    pub fn new(deletions: &IntervalSet, total_duration: f64, matches: &[KeywordMatch]) -> Self {
        Self {
            delete_segments: deletions
                .intervals()
                .iter()
                .map(|iv| (iv.start(), iv.end()))
                .collect(),
            total_duration,
            matches: matches.to_vec(),
        }
    }

    /// Seconds of audio the plan removes, ignoring any overhang past the end.
    pub fn deleted_duration(&self) -> f64 {
        self.delete_segments
            .iter()
            .map(|&(start, end)| end.min(self.total_duration) - start.min(self.total_duration))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_match(start: f64, end: f64) -> KeywordMatch {
        KeywordMatch {
            keyword: "test".to_string(),
            start,
            end,
            position: 0,
            context: String::new(),
            matched_text: "test".to_string(),
        }
    }

    #[test]
    fn test_overlapping_buffered_windows_merge() {
        // Matches at 10.0-10.5 and 10.6-11.0 with 0.5s buffers produce raw
        // windows [9.5, 11.0) and [10.1, 11.5), which fuse into one.
        let matches = vec![keyword_match(10.0, 10.5), keyword_match(10.6, 11.0)];
        let deletions = plan_deletions(&matches, DeletionBuffers::default()).unwrap();

        assert_eq!(deletions.len(), 1);
        let only = deletions.intervals()[0];
        assert!((only.start() - 9.5).abs() < 1e-9);
        assert!((only.end() - 11.5).abs() < 1e-9);
    }

    #[test]
    fn test_buffer_clamped_at_zero() {
        let matches = vec![keyword_match(0.2, 0.8)];
        let buffers = DeletionBuffers {
            before: 0.5,
            after: 0.5,
        };
        let deletions = plan_deletions(&matches, buffers).unwrap();

        assert_eq!(deletions.intervals()[0].start(), 0.0);
        assert!((deletions.intervals()[0].end() - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_matches_empty_plan() {
        let deletions = plan_deletions(&[], DeletionBuffers::default()).unwrap();
        assert!(deletions.is_empty());
    }

    #[test]
    fn test_planner_is_duration_agnostic() {
        // A window past the end of the audio is kept as-is; clamping is the
        // keep-segment resolver's job.
        let matches = vec![keyword_match(99.8, 100.0)];
        let deletions = plan_deletions(&matches, DeletionBuffers::default()).unwrap();
        assert!(deletions.intervals()[0].end() > 100.0);

        let kept = keep_segments(&deletions, 100.0).unwrap();
        assert_eq!(kept.len(), 1);
        assert!((kept.intervals()[0].end() - 99.3).abs() < 1e-9);
    }

    #[test]
    fn test_keep_segments_scenario() {
        let matches = vec![keyword_match(10.0, 11.0)];
        let deletions = plan_deletions(&matches, DeletionBuffers::default()).unwrap();
        let kept = keep_segments(&deletions, 100.0).unwrap();

        assert_eq!(kept.len(), 2);
        assert!((kept.intervals()[0].start()).abs() < 1e-9);
        assert!((kept.intervals()[0].end() - 9.5).abs() < 1e-9);
        assert!((kept.intervals()[1].start() - 11.5).abs() < 1e-9);
        assert!((kept.intervals()[1].end() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_delete_plan_record() {
        let matches = vec![keyword_match(10.0, 11.0)];
        let deletions = plan_deletions(&matches, DeletionBuffers::default()).unwrap();
        let plan = DeletePlan::new(&deletions, 100.0, &matches);

        assert_eq!(plan.delete_segments, vec![(9.5, 11.5)]);
        assert!((plan.deleted_duration() - 2.0).abs() < 1e-9);

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("delete_segments"));
        assert!(json.contains("total_duration"));
    }
}
