use crate::error::{AudiocutError, Result};

use super::ChunkWindow;

/// Plan fixed-length overlapping windows covering `[0, total_duration)`.
///
/// Window starts advance by `chunk_length - overlap`, so consecutive windows
/// overlap by exactly `overlap` seconds. The final window shrinks to end at
/// `total_duration`; the reassembler still trims the full overlap from it, so
/// the shrink never double-counts samples.
pub fn plan_windows(
    total_duration: f64,
    chunk_length: f64,
    overlap: f64,
) -> Result<Vec<ChunkWindow>> {
    if total_duration <= 0.0 {
        return Err(AudiocutError::Config(format!(
            "total duration must be positive, got {total_duration}"
        )));
    }
    if chunk_length <= 0.0 {
        return Err(AudiocutError::Config(format!(
            "chunk length must be positive, got {chunk_length}"
        )));
    }
    if overlap < 0.0 || overlap >= chunk_length {
        return Err(AudiocutError::Config(format!(
            "overlap must satisfy 0 <= overlap < chunk length, got {overlap}"
        )));
    }

    let step = chunk_length - overlap;
    let mut windows = Vec::new();
    let mut start = 0.0;

    loop {
        let end = (start + chunk_length).min(total_duration);
        windows.push(ChunkWindow {
            index: windows.len(),
            start,
            end,
        });
        if end >= total_duration {
            break;
        }
        start += step;
    }

    Ok(windows)
}
