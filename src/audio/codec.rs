use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::cut::FilterGraph;
use crate::error::{AudiocutError, Result};

use super::AudioMetadata;

/// Check that FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg").arg("-version").output().map_err(|e| {
        AudiocutError::CodecFailure(format!(
            "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(AudiocutError::CodecFailure("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Check that FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe").arg("-version").output().map_err(|e| {
        AudiocutError::CodecFailure(format!(
            "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(AudiocutError::CodecFailure("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Get audio duration in seconds using FFprobe.
pub fn get_audio_duration(input: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AudiocutError::CodecFailure(format!("FFprobe failed: {stderr}")));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    duration_str.trim().parse().map_err(|e| {
        AudiocutError::CodecFailure(format!(
            "Failed to parse duration '{}': {e}",
            duration_str.trim()
        ))
    })
}

/// Get audio metadata (sample rate, channels) using FFprobe.
pub fn get_audio_info(input: &Path) -> Result<(u32, u16)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=sample_rate,channels",
            "-of",
            "csv=s=,:p=0",
        ])
        .arg(input)
        .output()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AudiocutError::CodecFailure(format!("FFprobe failed: {stderr}")));
    }

    let info_str = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = info_str.trim().split(',').collect();

    if parts.len() < 2 {
        return Err(AudiocutError::CodecFailure(format!(
            "Failed to parse audio info: {}",
            info_str.trim()
        )));
    }

    let sample_rate: u32 = parts[0]
        .parse()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to parse sample rate: {e}")))?;

    let channels: u16 = parts[1]
        .parse()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to parse channels: {e}")))?;

    Ok((sample_rate, channels))
}

/// Probe duration, sample rate, and channel count in one call.
pub fn probe(input: &Path) -> Result<AudioMetadata> {
    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }
    let duration = get_audio_duration(input)?;
    let (sample_rate, channels) = get_audio_info(input)?;
    Ok(AudioMetadata {
        duration,
        sample_rate,
        channels,
    })
}

/// Extract `[start, end)` of the source into a mono 16-bit PCM WAV at the
/// source sample rate.
pub fn extract_segment(input: &Path, output: &Path, start: f64, end: f64) -> Result<()> {
    if end <= start || start < 0.0 {
        return Err(AudiocutError::InvalidInterval { start, end });
    }
    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }

    let start_secs = format!("{:.3}", start);
    let duration_secs = format!("{:.3}", end - start);

    debug!(
        "Extracting segment: start={}, duration={}",
        start_secs, duration_secs
    );

    let output_cmd = Command::new("ffmpeg")
        .args(["-y", "-ss"])
        .arg(&start_secs)
        .arg("-t")
        .arg(&duration_secs)
        .arg("-i")
        .arg(input)
        .args(["-vn", "-acodec", "pcm_s16le", "-ac", "1"])
        .arg(output)
        .output()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to run FFmpeg: {e}")))?;

    if !output_cmd.status.success() {
        let stderr = String::from_utf8_lossy(&output_cmd.stderr);
        return Err(AudiocutError::CodecFailure(format!(
            "FFmpeg segment extraction failed: {}",
            stderr.trim()
        )));
    }

    Ok(())
}

/// Run a trim-and-concat filter graph over the source audio.
pub fn apply_filter_graph(input: &Path, output: &Path, graph: &FilterGraph) -> Result<()> {
    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }

    let expr = graph.render();
    debug!("filter_complex: {expr}");

    let output_cmd = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args(["-filter_complex", &expr, "-map", graph.output_label()])
        .arg(output)
        .output()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to run FFmpeg: {e}")))?;

    if !output_cmd.status.success() {
        let stderr = String::from_utf8_lossy(&output_cmd.stderr);
        return Err(AudiocutError::CodecFailure(format!(
            "FFmpeg filter graph failed: {}",
            stderr.trim()
        )));
    }

    info!(
        "Applied {}-segment filter graph to {}",
        graph.concat_count(),
        output.display()
    );
    Ok(())
}

/// Convert the merged WAV to the requested output format.
///
/// WAV targets are copied as-is. MP3 targets are resampled to 48 kHz, since
/// voice-conversion models commonly emit rates MP3 encoders reject.
pub fn convert_audio(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }

    let extension = output
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if extension == "wav" {
        std::fs::copy(input, output)?;
        return Ok(());
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-i"]).arg(input);
    if extension == "mp3" {
        cmd.args(["-ar", "48000", "-acodec", "libmp3lame", "-b:a", "192k"]);
    }
    cmd.arg(output);

    let output_cmd = cmd
        .output()
        .map_err(|e| AudiocutError::CodecFailure(format!("Failed to run FFmpeg: {e}")))?;

    if !output_cmd.status.success() {
        let stderr = String::from_utf8_lossy(&output_cmd.stderr);
        return Err(AudiocutError::CodecFailure(format!(
            "FFmpeg format conversion failed: {}",
            stderr.trim()
        )));
    }

    info!("Converted {} to {}", input.display(), output.display());
    Ok(())
}
