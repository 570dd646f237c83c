use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::Result;

/// Read a WAV file into 16-bit mono samples plus its sample rate.
///
/// Multi-channel input is averaged down to mono; float samples are scaled to
/// the i16 range. Chunk extraction already normalizes to mono PCM, so the
/// downmix only fires on transform backends that emit something wider.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<i16>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<i16> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<_, _>>()?,
    };

    let mono = if channels <= 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| {
                (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16
            })
            .collect()
    };

    Ok((mono, spec.sample_rate))
}

/// Write 16-bit mono samples as a WAV file.
pub fn write_wav_mono(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
