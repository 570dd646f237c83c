use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::audio::codec::{
    apply_filter_graph, check_ffmpeg, check_ffprobe, convert_audio, get_audio_duration,
};
use crate::chunk::{plan_windows, reassemble_files, ChunkExecutor, ExecutorConfig};
use crate::config::Config;
use crate::cut::{keep_segments, plan_deletions, DeletePlan, DeletionBuffers, FilterGraph};
use crate::error::{AudiocutError, Result};
use crate::transcript::{find_keyword_matches, load_keywords, Transcript};
use crate::transform::ChunkTransform;

fn spinner(message: &str, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Outcome of the keyword-cut pipeline.
#[derive(Debug)]
pub enum CutOutcome {
    /// No keyword matched; the source is left untouched and no output file
    /// is written.
    NothingToDelete,
    Cut(CutReport),
}

/// Summary of a completed cut.
#[derive(Debug)]
pub struct CutReport {
    pub output_path: PathBuf,
    pub plan_path: PathBuf,
    pub match_count: usize,
    pub deleted_segments: usize,
    pub kept_segments: usize,
    pub deleted_duration: f64,
    pub total_duration: f64,
    pub total_time: Duration,
}

/// Delete every keyword span from an audio file.
///
/// Stages: load the transcript and keyword list, locate matches, plan merged
/// deletion windows, resolve keep segments, build the trim+concat filter
/// graph, and hand it to ffmpeg. A delete-plan JSON record is written beside
/// the output for auditing.
pub async fn cut_keywords(
    input: &Path,
    output: &Path,
    transcript_path: &Path,
    keywords_path: &Path,
    buffers: DeletionBuffers,
    show_progress: bool,
) -> Result<CutOutcome> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }
    check_ffmpeg()?;

    // Stage 1: collaborator inputs
    info!("Stage 1/4: Loading transcript and keywords");
    let transcript = Transcript::load(transcript_path)?;
    let keywords = load_keywords(keywords_path)?;
    info!(
        "Transcript: {} chars over {:.2}s; {} keywords",
        transcript.chars.len(),
        transcript.duration,
        keywords.len()
    );

    // Stage 2: keyword matches
    info!("Stage 2/4: Searching keywords");
    let matches = find_keyword_matches(&transcript, &keywords)?;
    if matches.is_empty() {
        info!("No keyword matches; nothing to delete");
        return Ok(CutOutcome::NothingToDelete);
    }

    // Stage 3: deletion plan and filter graph
    info!("Stage 3/4: Planning deletions");
    let deletions = plan_deletions(&matches, buffers)?;
    let kept = keep_segments(&deletions, transcript.duration)?;
    let graph = FilterGraph::build(&kept)?;

    let plan = DeletePlan::new(&deletions, transcript.duration, &matches);
    let deleted_duration = plan.deleted_duration();
    info!(
        "Deleting {} merged segments ({:.2}s of {:.2}s, {:.1}%)",
        deletions.len(),
        deleted_duration,
        transcript.duration,
        deleted_duration / transcript.duration * 100.0
    );
    for (i, interval) in deletions.intervals().iter().enumerate() {
        debug!(
            "  segment {}: {:.2}s - {:.2}s",
            i + 1,
            interval.start(),
            interval.end()
        );
    }

    let plan_path = delete_plan_path(output);
    fs::write(&plan_path, serde_json::to_string_pretty(&plan)?)?;
    debug!("Wrote delete plan to {}", plan_path.display());

    // Stage 4: codec invocation
    info!("Stage 4/4: Cutting audio");
    let pb = spinner("Cutting audio...", show_progress);
    apply_filter_graph(input, output, &graph)?;
    if let Some(pb) = pb {
        pb.finish_with_message(format!(
            "✓ Cut {} segments ({:.2}s removed)",
            deletions.len(),
            deleted_duration
        ));
    }

    Ok(CutOutcome::Cut(CutReport {
        output_path: output.to_path_buf(),
        plan_path,
        match_count: matches.len(),
        deleted_segments: deletions.len(),
        kept_segments: kept.len(),
        deleted_duration,
        total_duration: transcript.duration,
        total_time: start_time.elapsed(),
    }))
}

/// Where the delete-plan record lands: `<output stem>_delete_plan.json`
/// beside the output file.
fn delete_plan_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    output.with_file_name(format!("{stem}_delete_plan.json"))
}

/// Summary of a completed voice conversion.
#[derive(Debug)]
pub struct ConvertReport {
    pub output_path: PathBuf,
    pub chunks: usize,
    pub sample_rate: u32,
    pub total_duration: f64,
    pub total_time: Duration,
}

/// Run the per-chunk voice transform over long audio and reassemble.
///
/// The whole invocation owns one temporary working directory, removed on
/// every exit path. A single chunk failure aborts the job with no output
/// file left behind.
pub async fn convert_voice(
    input: &Path,
    output: &Path,
    transform: Box<dyn ChunkTransform>,
    config: &Config,
    show_progress: bool,
) -> Result<ConvertReport> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(AudiocutError::FileNotFound(input.display().to_string()));
    }
    check_ffmpeg()?;
    check_ffprobe()?;

    // Stage 1: probe and plan
    info!("Stage 1/3: Planning chunks");
    let total_duration = get_audio_duration(input)?;
    let windows = plan_windows(total_duration, config.chunk_length, config.overlap)?;
    info!(
        "{:.2}s of audio split into {} chunks of up to {:.0}s ({:.0}s overlap)",
        total_duration,
        windows.len(),
        config.chunk_length,
        config.overlap
    );

    let work_dir = TempDir::new()?;
    debug!("Working directory: {:?}", work_dir.path());

    // Stage 2: transform every chunk
    info!("Stage 2/3: Transforming chunks");
    let executor = ChunkExecutor::new(
        transform,
        ExecutorConfig {
            concurrency: config.concurrency,
            timeout: Duration::from_secs(config.transform_timeout),
            show_progress,
        },
    );
    let processed = executor.process(input, &windows, work_dir.path()).await?;

    // Stage 3: reassemble and convert
    info!("Stage 3/3: Reassembling");
    let pb = spinner("Merging chunks...", show_progress);
    let merged_path = work_dir.path().join("merged.wav");
    let sample_rate = reassemble_files(&processed, config.overlap, &merged_path)?;
    convert_audio(&merged_path, output)?;
    if let Some(pb) = pb {
        pb.finish_with_message(format!("✓ Merged {} chunks", processed.len()));
    }

    Ok(ConvertReport {
        output_path: output.to_path_buf(),
        chunks: processed.len(),
        sample_rate,
        total_duration,
        total_time: start_time.elapsed(),
    })
}

/// Print a summary of a finished cut.
pub fn print_cut_summary(report: &CutReport) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                         Cut Complete                           ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", report.output_path.display());
    println!("  Plan:       {}", report.plan_path.display());
    println!("  Matches:    {}", report.match_count);
    println!(
        "  Removed:    {} segments, {:.2}s of {:.2}s ({:.1}%)",
        report.deleted_segments,
        report.deleted_duration,
        report.total_duration,
        report.deleted_duration / report.total_duration * 100.0
    );
    println!("  Kept:       {} segments", report.kept_segments);
    println!("  Time:       {:.2}s", report.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

/// Print a summary of a finished voice conversion.
pub fn print_convert_summary(report: &ConvertReport) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                    Voice Conversion Complete                   ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:      {}", report.output_path.display());
    println!(
        "  Audio:       {:.1}s in {} chunks at {} Hz",
        report.total_duration, report.chunks, report.sample_rate
    );
    println!("  Time:        {:.2}s", report.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_plan_path() {
        let path = delete_plan_path(Path::new("/music/track_filtered.mp3"));
        assert_eq!(
            path,
            PathBuf::from("/music/track_filtered_delete_plan.json")
        );
    }

    #[tokio::test]
    async fn test_cut_missing_input() {
        let result = cut_keywords(
            Path::new("/nonexistent/input.mp3"),
            Path::new("/tmp/out.mp3"),
            Path::new("/tmp/transcript.json"),
            Path::new("/tmp/keywords.json"),
            DeletionBuffers::default(),
            false,
        )
        .await;

        assert!(matches!(result, Err(AudiocutError::FileNotFound(_))));
    }
}
