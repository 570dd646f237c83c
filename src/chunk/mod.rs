pub mod executor;
pub mod plan;
pub mod reassemble;

pub use executor::{ChunkExecutor, ExecutorConfig, ProcessedChunk};
pub use plan::plan_windows;
pub use reassemble::{reassemble_files, trim_and_concat, ChunkSamples};

/// One planned span of source audio, processed independently by the
/// per-chunk transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkWindow {
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
}

impl ChunkWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
