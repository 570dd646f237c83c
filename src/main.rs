use anyhow::{Context, Result};
use audiocut::config::Config;
use audiocut::cut::DeletionBuffers;
use audiocut::pipeline::{
    convert_voice, cut_keywords, print_convert_summary, print_cut_summary, CutOutcome,
};
use audiocut::transform::CommandTransform;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "audiocut")]
#[command(version, about = "Keyword-based audio cutting and chunked voice conversion")]
#[command(
    long_about = "Delete keyword spans from audio using character-timestamped transcripts, \
or run an external per-chunk voice transform over long audio and reassemble the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete keyword spans from an audio file
    Cut {
        /// Input audio file
        input: PathBuf,

        /// Character-timestamped transcript JSON produced by the ASR step
        #[arg(short, long)]
        transcript: PathBuf,

        /// Keyword list JSON ({"keywords": [...]})
        #[arg(short, long)]
        keywords: PathBuf,

        /// Output audio file (defaults to <input>_filtered.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds removed before each match
        #[arg(long)]
        buffer_before: Option<f64>,

        /// Seconds removed after each match
        #[arg(long)]
        buffer_after: Option<f64>,
    },

    /// Transform long audio chunk by chunk and reassemble
    Convert {
        /// Input audio file
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Transform command; {input} and {output} are substituted per chunk
        #[arg(short, long)]
        transform: Option<String>,

        /// Chunk length in seconds
        #[arg(long)]
        chunk_length: Option<f64>,

        /// Overlap between chunks in seconds
        #[arg(long)]
        overlap: Option<f64>,

        /// Chunks transformed in parallel
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Per-chunk timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let extension = input.extension().unwrap_or_default().to_string_lossy();
    let mut output = input.to_path_buf();
    if extension.is_empty() {
        output.set_file_name(format!("{stem}_filtered"));
    } else {
        output.set_file_name(format!("{stem}_filtered.{extension}"));
    }
    output
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Cut {
            input,
            transcript,
            keywords,
            output,
            buffer_before,
            buffer_after,
        } => {
            if let Some(b) = buffer_before {
                config.buffer_before = b;
            }
            if let Some(b) = buffer_after {
                config.buffer_after = b;
            }
            config.validate().context("Configuration validation failed")?;

            let output = output.unwrap_or_else(|| derive_output_path(&input));
            let buffers = DeletionBuffers {
                before: config.buffer_before,
                after: config.buffer_after,
            };

            info!("Input:      {}", input.display());
            info!("Output:     {}", output.display());
            info!("Transcript: {}", transcript.display());
            info!("Keywords:   {}", keywords.display());

            let outcome =
                cut_keywords(&input, &output, &transcript, &keywords, buffers, true)
                    .await
                    .context("Cut pipeline failed")?;

            match outcome {
                CutOutcome::NothingToDelete => {
                    println!("No keywords found; audio left untouched: {}", input.display());
                }
                CutOutcome::Cut(report) => print_cut_summary(&report),
            }
        }

        Commands::Convert {
            input,
            output,
            transform,
            chunk_length,
            overlap,
            concurrency,
            timeout,
        } => {
            if let Some(v) = chunk_length {
                config.chunk_length = v;
            }
            if let Some(v) = overlap {
                config.overlap = v;
            }
            if let Some(v) = concurrency {
                config.concurrency = v;
            }
            if let Some(v) = timeout {
                config.transform_timeout = v;
            }
            config.validate().context("Configuration validation failed")?;

            let transform: CommandTransform = match (transform, &config.transform_command) {
                (Some(command_line), _) => CommandTransform::parse(&command_line)?,
                (None, Some(argv)) => CommandTransform::new(argv.clone())?,
                (None, None) => anyhow::bail!(
                    "No transform command configured. Pass --transform or set \
                     transform_command in the config file."
                ),
            };

            info!("Input:  {}", input.display());
            info!("Output: {}", output.display());
            info!(
                "Chunks: {:.0}s with {:.0}s overlap, {} in parallel",
                config.chunk_length, config.overlap, config.concurrency
            );

            let report = convert_voice(&input, &output, Box::new(transform), &config, true)
                .await
                .context("Voice conversion failed")?;

            print_convert_summary(&report);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("/music/track.mp3")),
            PathBuf::from("/music/track_filtered.mp3")
        );
        assert_eq!(
            derive_output_path(Path::new("/music/track")),
            PathBuf::from("/music/track_filtered")
        );
    }
}
