use std::path::Path;

use tracing::info;

use crate::audio::wav::{read_wav_mono, write_wav_mono};
use crate::error::{AudiocutError, Result};

use super::ProcessedChunk;

/// Samples for one processed chunk at its native rate.
#[derive(Debug, Clone)]
pub struct ChunkSamples {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Concatenate chunk outputs into one continuous buffer, dropping the
/// duplicated overlap lead-in from every chunk after the first.
///
/// All chunks must share the first chunk's sample rate; a mismatch is an
/// error, never a silent resample. Resampling, if wanted, belongs to the
/// codec step after reassembly.
pub fn trim_and_concat(chunks: &[ChunkSamples], overlap: f64) -> Result<(Vec<i16>, u32)> {
    let first = chunks.first().ok_or_else(|| {
        AudiocutError::CodecFailure("no chunks to reassemble".to_string())
    })?;

    let sample_rate = first.sample_rate;
    let overlap_samples = (overlap * sample_rate as f64).round() as usize;

    let total: usize = chunks.iter().map(|c| c.samples.len()).sum();
    let mut merged = Vec::with_capacity(total);

    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.sample_rate != sample_rate {
            return Err(AudiocutError::SampleRateMismatch {
                index: i,
                expected: sample_rate,
                found: chunk.sample_rate,
            });
        }
        let skip = if i == 0 {
            0
        } else {
            overlap_samples.min(chunk.samples.len())
        };
        merged.extend_from_slice(&chunk.samples[skip..]);
    }

    Ok((merged, sample_rate))
}

/// Read processed chunk files in window order and write the merged WAV.
pub fn reassemble_files(
    chunks: &[ProcessedChunk],
    overlap: f64,
    output: &Path,
) -> Result<u32> {
    let mut loaded = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let (samples, sample_rate) = read_wav_mono(&chunk.path)?;
        loaded.push(ChunkSamples {
            samples,
            sample_rate,
        });
    }

    let (merged, sample_rate) = trim_and_concat(&loaded, overlap)?;
    write_wav_mono(output, &merged, sample_rate)?;

    info!(
        "Merged {} chunks into {} samples at {} Hz ({:.0}s overlap trimmed per chunk)",
        chunks.len(),
        merged.len(),
        sample_rate,
        overlap
    );
    Ok(sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(len: usize, rate: u32, value: i16) -> ChunkSamples {
        ChunkSamples {
            samples: vec![value; len],
            sample_rate: rate,
        }
    }

    #[test]
    fn test_first_chunk_kept_whole() {
        let chunks = vec![chunk(100, 100, 1)];
        let (merged, rate) = trim_and_concat(&chunks, 0.2).unwrap();
        assert_eq!(merged.len(), 100);
        assert_eq!(rate, 100);
    }

    #[test]
    fn test_overlap_trimmed_from_later_chunks() {
        // 1s chunks at 100 Hz with 0.2s overlap: 100 + 2 * (100 - 20).
        let chunks = vec![chunk(100, 100, 1), chunk(100, 100, 2), chunk(100, 100, 3)];
        let (merged, _) = trim_and_concat(&chunks, 0.2).unwrap();

        assert_eq!(merged.len(), 260);
        assert_eq!(merged[99], 1);
        assert_eq!(merged[100], 2);
        assert_eq!(merged[179], 2);
        assert_eq!(merged[180], 3);
    }

    #[test]
    fn test_duration_conservation() {
        // N=3 chunks of L=30s with O=2s at 16kHz covers exactly
        // N*L - (N-1)*O = 86s of source.
        let rate = 16000;
        let chunks = vec![
            chunk(30 * rate as usize, rate, 0),
            chunk(30 * rate as usize, rate, 0),
            chunk(30 * rate as usize, rate, 0),
        ];
        let (merged, _) = trim_and_concat(&chunks, 2.0).unwrap();
        assert_eq!(merged.len(), 86 * rate as usize);
    }

    #[test]
    fn test_sample_rate_mismatch_rejected() {
        let chunks = vec![chunk(100, 16000, 0), chunk(100, 40000, 0)];
        let err = trim_and_concat(&chunks, 0.0).unwrap_err();

        match err {
            AudiocutError::SampleRateMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, 16000);
                assert_eq!(found, 40000);
            }
            other => panic!("Expected SampleRateMismatch, got: {other}"),
        }
    }

    #[test]
    fn test_overlap_larger_than_chunk_drops_it_entirely() {
        let chunks = vec![chunk(100, 100, 1), chunk(10, 100, 2)];
        let (merged, _) = trim_and_concat(&chunks, 0.2).unwrap();
        assert_eq!(merged.len(), 100);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(trim_and_concat(&[], 2.0).is_err());
    }

    #[test]
    fn test_zero_overlap_plain_concat() {
        let chunks = vec![chunk(50, 8000, 1), chunk(50, 8000, 2)];
        let (merged, _) = trim_and_concat(&chunks, 0.0).unwrap();
        assert_eq!(merged.len(), 100);
    }

    #[test]
    fn test_reassemble_files_round_trip() {
        use crate::chunk::ChunkWindow;

        let dir = tempfile::tempdir().unwrap();
        let rate = 1000;
        let mut processed = Vec::new();
        for i in 0..3 {
            let path = dir.path().join(format!("chunk_{i:04}_out.wav"));
            write_wav_mono(&path, &vec![i as i16; 500], rate).unwrap();
            processed.push(ProcessedChunk {
                window: ChunkWindow {
                    index: i,
                    start: i as f64 * 0.4,
                    end: i as f64 * 0.4 + 0.5,
                },
                path,
            });
        }

        let output = dir.path().join("merged.wav");
        let out_rate = reassemble_files(&processed, 0.1, &output).unwrap();
        assert_eq!(out_rate, rate);

        let (merged, _) = read_wav_mono(&output).unwrap();
        // 500 + 2 * (500 - 100) samples.
        assert_eq!(merged.len(), 1300);
    }
}
