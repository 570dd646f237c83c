use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::audio::codec::extract_segment;
use crate::error::{AudiocutError, Result};
use crate::transform::ChunkTransform;

use super::ChunkWindow;

/// Executor settings.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum chunks in flight at once.
    pub concurrency: usize,
    /// Per-chunk transform timeout; a timeout counts as a transform failure.
    pub timeout: Duration,
    /// Show a progress bar.
    pub show_progress: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            timeout: Duration::from_secs(300),
            show_progress: true,
        }
    }
}

/// A successfully transformed chunk, ready for reassembly.
#[derive(Debug, Clone)]
pub struct ProcessedChunk {
    pub window: ChunkWindow,
    pub path: PathBuf,
}

/// Runs the per-chunk transform over every planned window.
///
/// All-or-nothing: the first chunk failure aborts the whole job, already
/// produced outputs are discarded, and the error is surfaced with the
/// offending chunk index. A mixed-quality reassembled result is worse than an
/// explicit failure, so there is no retry and no fallback.
pub struct ChunkExecutor {
    transform: Arc<dyn ChunkTransform>,
    config: ExecutorConfig,
}

impl ChunkExecutor {
    pub fn new(transform: Box<dyn ChunkTransform>, config: ExecutorConfig) -> Self {
        Self {
            transform: Arc::from(transform),
            config,
        }
    }

    /// Extract and transform every window, returning outputs in window-index
    /// order regardless of completion order.
    ///
    /// Chunk files live in `work_dir`, which the caller owns; the directory
    /// as a whole is removed by its owner on both success and failure.
    pub async fn process(
        &self,
        source: &Path,
        windows: &[ChunkWindow],
        work_dir: &Path,
    ) -> Result<Vec<ProcessedChunk>> {
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        info!(
            "Processing {} chunks with {} in flight using {} transform",
            windows.len(),
            self.config.concurrency,
            self.transform.name()
        );

        let progress_bar = if self.config.show_progress {
            let pb = ProgressBar::new(windows.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut futures = FuturesUnordered::new();

        for window in windows.iter().copied() {
            let sem = semaphore.clone();
            let transform = self.transform.clone();
            let pb = progress_bar.clone();
            let source = source.to_path_buf();
            let input = work_dir.join(format!("chunk_{:04}.wav", window.index));
            let output = work_dir.join(format!("chunk_{:04}_out.wav", window.index));
            let timeout = self.config.timeout;

            futures.push(async move {
                let _permit = sem.acquire().await.map_err(|_| {
                    AudiocutError::ChunkTransformFailure {
                        index: window.index,
                        reason: "executor shut down".to_string(),
                    }
                })?;

                debug!(
                    "Extracting chunk {} ({:.2}s - {:.2}s)",
                    window.index, window.start, window.end
                );
                extract_segment(&source, &input, window.start, window.end)?;

                match tokio::time::timeout(timeout, transform.apply(&input, &output, &window))
                    .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(_) => {
                        return Err(AudiocutError::ChunkTransformFailure {
                            index: window.index,
                            reason: format!(
                                "timed out after {:.0}s",
                                timeout.as_secs_f64()
                            ),
                        })
                    }
                }

                if let Some(pb) = &pb {
                    pb.inc(1);
                }

                debug!("Chunk {} transformed", window.index);
                Ok(ProcessedChunk {
                    window,
                    path: output,
                })
            });
        }

        let mut processed: Vec<ProcessedChunk> = Vec::with_capacity(windows.len());
        while let Some(result) = futures.next().await {
            match result {
                Ok(chunk) => processed.push(chunk),
                Err(e) => {
                    warn!("Aborting chunk pipeline: {e}");
                    if let Some(pb) = &progress_bar {
                        pb.abandon_with_message("aborted");
                    }
                    // Dropping the stream cancels everything queued or in
                    // flight; discard outputs that already succeeded.
                    drop(futures);
                    for chunk in &processed {
                        let _ = std::fs::remove_file(&chunk.path);
                    }
                    return Err(e);
                }
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Chunks processed");
        }

        // Completion order is arbitrary; reassembly trims overlaps
        // positionally, so index order is required correctness.
        processed.sort_by_key(|c| c.window.index);

        info!(
            "Processed {} chunks in {:.2}s",
            processed.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(processed)
    }
}
