use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::chunk::ChunkWindow;
use crate::error::{AudiocutError, Result};

/// A per-chunk audio transform: one WAV file in, one WAV file out.
///
/// The chunk executor wraps every call with a timeout and aborts the whole
/// job on the first failure; implementations only do the work or fail. Which
/// backend performs the transform (an external model process, ffmpeg filter,
/// anything honoring the file contract) is invisible to the rest of the
/// pipeline.
#[async_trait]
pub trait ChunkTransform: Send + Sync {
    async fn apply(&self, input: &Path, output: &Path, window: &ChunkWindow) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Transform backed by an external command.
///
/// The argv template is run once per chunk with `{input}` and `{output}`
/// substituted by the chunk file paths, e.g.
/// `["python3", "rvc_infer.py", "{input}", "-o", "{output}"]`.
pub struct CommandTransform {
    argv: Vec<String>,
}

impl CommandTransform {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(AudiocutError::Config(
                "transform command is empty".to_string(),
            ));
        }
        Ok(Self { argv })
    }

    /// Parse a whitespace-separated command line into a transform.
    pub fn parse(command_line: &str) -> Result<Self> {
        Self::new(command_line.split_whitespace().map(String::from).collect())
    }
}

#[async_trait]
impl ChunkTransform for CommandTransform {
    async fn apply(&self, input: &Path, output: &Path, window: &ChunkWindow) -> Result<()> {
        let args: Vec<String> = self
            .argv
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.display().to_string())
                    .replace("{output}", &output.display().to_string())
            })
            .collect();

        debug!("Running transform for chunk {}: {:?}", window.index, args);

        let result = Command::new(&args[0])
            .args(&args[1..])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AudiocutError::ChunkTransformFailure {
                index: window.index,
                reason: format!("failed to spawn transform: {e}"),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AudiocutError::ChunkTransformFailure {
                index: window.index,
                reason: stderr.trim().to_string(),
            });
        }

        if !output.exists() {
            return Err(AudiocutError::ChunkTransformFailure {
                index: window.index,
                reason: "transform produced no output file".to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
