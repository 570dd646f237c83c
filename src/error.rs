use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudiocutError {
    #[error("Invalid interval [{start}, {end})")]
    InvalidInterval { start: f64, end: f64 },

    #[error("Deletion plan covers the entire audio; nothing would remain")]
    NoContentRemains,

    #[error("Codec failure: {0}")]
    CodecFailure(String),

    #[error("Chunk {index} transform failed: {reason}")]
    ChunkTransformFailure { index: usize, reason: String },

    #[error("Chunk {index} has sample rate {found} Hz, expected {expected} Hz")]
    SampleRateMismatch {
        index: usize,
        expected: u32,
        found: u32,
    },

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, AudiocutError>;
