use std::fmt::Write as _;

use crate::error::{AudiocutError, Result};
use crate::timeline::IntervalSet;

/// Ordered trim-and-concatenate description handed to the codec executor.
///
/// Pure data: building one performs no I/O. Extract ops are emitted in
/// keep-segment order so the concatenated output preserves the original
/// chronology minus the removed spans.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    extract_ops: Vec<(f64, f64)>,
}

impl FilterGraph {
    /// Build a graph from the keep segments.
    ///
    /// An empty set means the deletion plan covered the whole file; that is
    /// reported as `NoContentRemains` rather than producing a zero-length
    /// output.
    pub fn build(keep: &IntervalSet) -> Result<Self> {
        if keep.is_empty() {
            return Err(AudiocutError::NoContentRemains);
        }
        Ok(Self {
            extract_ops: keep
                .intervals()
                .iter()
                .map(|iv| (iv.start(), iv.end()))
                .collect(),
        })
    }

    /// Ordered `(start, end)` extract operations.
    pub fn extract_ops(&self) -> &[(f64, f64)] {
        &self.extract_ops
    }

    pub fn concat_count(&self) -> usize {
        self.extract_ops.len()
    }

    /// Output pad label referenced by `-map`.
    pub fn output_label(&self) -> &'static str {
        "[outa]"
    }

    /// Render as an ffmpeg `filter_complex` expression.
    ///
    /// Each `atrim` is followed by `asetpts=PTS-STARTPTS` so every extracted
    /// segment restarts its timestamp base at zero and the concat sees no
    /// gaps.
    pub fn render(&self) -> String {
        let mut expr = String::new();
        for (i, (start, end)) in self.extract_ops.iter().enumerate() {
            let _ = write!(
                expr,
                "[0:a]atrim=start={start:.2}:end={end:.2},asetpts=PTS-STARTPTS[a{i}];"
            );
        }
        for i in 0..self.extract_ops.len() {
            let _ = write!(expr, "[a{i}]");
        }
        let _ = write!(expr, "concat=n={}:v=0:a=1[outa]", self.extract_ops.len());
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimeInterval;

    fn keep_set(ranges: &[(f64, f64)]) -> IntervalSet {
        IntervalSet::merge(
            ranges
                .iter()
                .map(|&(s, e)| TimeInterval::new(s, e).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_empty_keep_set_is_an_error() {
        let result = FilterGraph::build(&IntervalSet::empty());
        assert!(matches!(result, Err(AudiocutError::NoContentRemains)));
    }

    #[test]
    fn test_single_segment_passthrough() {
        // No deletions: one extract op spanning the whole file.
        let graph = FilterGraph::build(&keep_set(&[(0.0, 60.0)])).unwrap();
        assert_eq!(graph.extract_ops(), &[(0.0, 60.0)]);
        assert_eq!(graph.concat_count(), 1);
        assert_eq!(
            graph.render(),
            "[0:a]atrim=start=0.00:end=60.00,asetpts=PTS-STARTPTS[a0];[a0]concat=n=1:v=0:a=1[outa]"
        );
    }

    #[test]
    fn test_two_segment_graph() {
        let graph = FilterGraph::build(&keep_set(&[(0.0, 9.5), (11.5, 100.0)])).unwrap();
        assert_eq!(graph.extract_ops(), &[(0.0, 9.5), (11.5, 100.0)]);
        assert_eq!(
            graph.render(),
            "[0:a]atrim=start=0.00:end=9.50,asetpts=PTS-STARTPTS[a0];\
             [0:a]atrim=start=11.50:end=100.00,asetpts=PTS-STARTPTS[a1];\
             [a0][a1]concat=n=2:v=0:a=1[outa]"
        );
    }

    #[test]
    fn test_ops_follow_timeline_order() {
        let graph =
            FilterGraph::build(&keep_set(&[(50.0, 60.0), (0.0, 10.0), (20.0, 30.0)])).unwrap();
        let starts: Vec<f64> = graph.extract_ops().iter().map(|op| op.0).collect();
        assert_eq!(starts, vec![0.0, 20.0, 50.0]);
    }
}
