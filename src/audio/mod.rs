pub mod codec;
pub mod wav;

pub use codec::{
    apply_filter_graph, check_ffmpeg, check_ffprobe, convert_audio, extract_segment,
    get_audio_duration, get_audio_info, probe,
};
pub use wav::{read_wav_mono, write_wav_mono};

/// Metadata about an audio file.
#[derive(Debug, Clone)]
pub struct AudioMetadata {
    /// Total duration in seconds.
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}
